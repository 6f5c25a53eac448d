use crate::calibration::Calibration;
use crate::camera::Camera;
use crate::overlay::{green, put_label, red};
use anyhow::Result;
use opencv::core::{self, Mat, Point, Rect, Scalar, Size};
use opencv::prelude::*;
use opencv::{calib3d, highgui, imgproc};
use std::path::Path;
use tracing::info;

const WINDOW_NAME: &str = "Camera Feed";

/// Which image the viewer shows each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    Undistorted,
    Original,
}

impl FrameSource {
    pub fn toggled(self) -> Self {
        match self {
            Self::Undistorted => Self::Original,
            Self::Original => Self::Undistorted,
        }
    }
}

/// Rectification maps precomputed once for a camera resolution.
pub struct UndistortMaps {
    mapx: Mat,
    mapy: Mat,
    roi: Rect,
    size: Size,
}

impl UndistortMaps {
    pub fn new(calibration: &Calibration, size: Size) -> Result<Self> {
        let camera_matrix = calibration.camera_matrix_mat()?;
        let dist_coeffs = calibration.dist_coeffs_mat()?;

        let mut roi = Rect::default();
        let new_camera_matrix = calib3d::get_optimal_new_camera_matrix(
            &camera_matrix,
            &dist_coeffs,
            size,
            1.0,
            size,
            Some(&mut roi),
            false,
        )?;

        let mut mapx = Mat::default();
        let mut mapy = Mat::default();
        calib3d::init_undistort_rectify_map(
            &camera_matrix,
            &dist_coeffs,
            &Mat::default(), // empty rectification, treated as identity
            &new_camera_matrix,
            size,
            core::CV_32FC1,
            &mut mapx,
            &mut mapy,
        )?;

        Ok(Self {
            mapx,
            mapy,
            roi,
            size,
        })
    }

    /// Remaps a frame, crops to the valid region, and scales back to full size.
    pub fn apply(&self, frame: &Mat) -> Result<Mat> {
        let mut remapped = Mat::default();
        imgproc::remap(
            frame,
            &mut remapped,
            &self.mapx,
            &self.mapy,
            imgproc::INTER_LINEAR,
            core::BORDER_CONSTANT,
            Scalar::default(),
        )?;
        let cropped = Mat::roi(&remapped, self.roi)?.try_clone()?;
        let mut resized = Mat::default();
        imgproc::resize(&cropped, &mut resized, self.size, 0.0, 0.0, imgproc::INTER_LINEAR)?;
        Ok(resized)
    }
}

pub fn run_undistort(camera_id: i32, calibration_file: &Path) -> Result<()> {
    let calibration = Calibration::load(calibration_file)?;
    info!("loaded calibration data from {}", calibration_file.display());
    info!("camera matrix: {:?}", calibration.camera_matrix);
    info!(
        "distortion coefficients: {:?}",
        calibration.distortion_coefficients
    );

    let mut camera = Camera::open(camera_id)?;
    let size = camera.frame_size()?;
    let maps = UndistortMaps::new(&calibration, size)?;

    info!("press 'q' to quit, 'd' to toggle distortion correction");

    let mut source = FrameSource::Undistorted;
    let mut frame = Mat::default();

    loop {
        camera.read(&mut frame)?;

        match source {
            FrameSource::Undistorted => {
                let mut undistorted = maps.apply(&frame)?;
                put_label(&mut undistorted, "Undistorted", Point::new(50, 50), green())?;
                highgui::imshow(WINDOW_NAME, &undistorted)?;
            }
            FrameSource::Original => {
                put_label(&mut frame, "Original", Point::new(50, 50), red())?;
                highgui::imshow(WINDOW_NAME, &frame)?;
            }
        }

        let key = highgui::wait_key(1)? & 0xff;
        if key == i32::from(b'q') {
            break;
        }
        if key == i32::from(b'd') {
            source = source.toggled();
            info!(
                "distortion correction {}",
                if source == FrameSource::Undistorted {
                    "on"
                } else {
                    "off"
                }
            );
        }
    }

    highgui::destroy_all_windows()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_distortion() -> Calibration {
        Calibration {
            camera_matrix: [[100.0, 0.0, 16.0], [0.0, 100.0, 12.0], [0.0, 0.0, 1.0]],
            distortion_coefficients: vec![0.0, 0.0, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn toggle_flips_between_sources() {
        let source = FrameSource::Undistorted;
        assert_eq!(source.toggled(), FrameSource::Original);
        assert_eq!(source.toggled().toggled(), FrameSource::Undistorted);
    }

    #[test]
    fn toggle_leaves_calibration_untouched() {
        let calibration = zero_distortion();
        let before = calibration.clone();
        let mut source = FrameSource::Undistorted;
        source = source.toggled();
        let _ = source;
        assert_eq!(calibration, before);
    }

    #[test]
    fn apply_preserves_camera_resolution() {
        let size = Size::new(32, 24);
        let maps = UndistortMaps::new(&zero_distortion(), size).unwrap();
        let frame =
            Mat::new_rows_cols_with_default(24, 32, core::CV_8UC3, Scalar::all(0.0)).unwrap();
        let out = maps.apply(&frame).unwrap();
        assert_eq!(out.size().unwrap(), size);
    }

    #[test]
    fn zero_distortion_keeps_full_roi() {
        let size = Size::new(32, 24);
        let maps = UndistortMaps::new(&zero_distortion(), size).unwrap();
        assert_eq!(maps.roi, Rect::new(0, 0, 32, 24));
    }
}
