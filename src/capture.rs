use crate::camera::Camera;
use crate::overlay::{green, put_label};
use anyhow::{Context, Result};
use opencv::calib3d;
use opencv::core::{Mat, Point, Point2f, Size, Vector};
use opencv::prelude::*;
use opencv::{highgui, imgcodecs, imgproc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const WINDOW_NAME: &str = "Camera Calibration";
const KEY_ESCAPE: i32 = 27;

pub struct CaptureOptions {
    pub camera_id: i32,
    /// Inner corners per chessboard row.
    pub rows: i32,
    /// Inner corners per chessboard column.
    pub cols: i32,
    pub output_dir: PathBuf,
}

/// Path of the nth captured image, zero-padded so files sort in capture order.
pub fn image_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("calibration_{index:02}.jpg"))
}

fn detect_chessboard(frame: &Mat, pattern_size: Size) -> Result<Option<Vector<Point2f>>> {
    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
    let mut corners = Vector::<Point2f>::new();
    let found = calib3d::find_chessboard_corners(
        &gray,
        pattern_size,
        &mut corners,
        calib3d::CALIB_CB_ADAPTIVE_THRESH + calib3d::CALIB_CB_NORMALIZE_IMAGE,
    )?;
    Ok(found.then_some(corners))
}

pub fn run_capture(opts: &CaptureOptions) -> Result<()> {
    fs::create_dir_all(&opts.output_dir)
        .with_context(|| format!("failed to create {}", opts.output_dir.display()))?;

    let mut camera = Camera::open(opts.camera_id)?;
    let size = camera.frame_size()?;
    let pattern_size = Size::new(opts.rows, opts.cols);

    info!("press 'c' to capture an image");
    info!("press 'q' or Escape to quit");
    info!("images will be saved to {}", opts.output_dir.display());

    let mut frame = Mat::default();
    let mut counter = 0u32;

    loop {
        camera.read(&mut frame)?;

        if let Some(corners) = detect_chessboard(&frame, pattern_size)? {
            calib3d::draw_chessboard_corners(&mut frame, pattern_size, &corners, true)?;
            put_label(&mut frame, "Chessboard detected!", Point::new(50, 50), green())?;
        }
        put_label(
            &mut frame,
            &format!("Captured: {counter}"),
            Point::new(50, size.height - 50),
            green(),
        )?;

        highgui::imshow(WINDOW_NAME, &frame)?;

        let key = highgui::wait_key(1)? & 0xff;
        if key == i32::from(b'q') || key == KEY_ESCAPE {
            break;
        }
        if key == i32::from(b'c') {
            let path = image_path(&opts.output_dir, counter);
            let name = path.to_str().context("output path is not valid UTF-8")?;
            imgcodecs::imwrite(name, &frame, &Vector::new())?;
            info!("captured {}", path.display());
            counter += 1;
        }
    }

    highgui::destroy_all_windows()?;
    info!("captured {counter} images for calibration");
    Ok(())
}
