use opencv::core::{Mat, Point, Scalar};
use opencv::imgproc;

pub fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

pub fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

/// Draws a status label on a frame before it is shown.
pub fn put_label(frame: &mut Mat, text: &str, origin: Point, color: Scalar) -> opencv::Result<()> {
    imgproc::put_text(
        frame,
        text,
        origin,
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        color,
        2,
        imgproc::LINE_8,
        false,
    )
}
