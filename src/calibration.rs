use anyhow::{Context, Result};
use opencv::core::Mat;
use opencv::prelude::MatTraitConst;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Camera intrinsics and lens distortion produced by a calibration session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Calibration {
    pub camera_matrix: [[f64; 3]; 3],
    pub distortion_coefficients: Vec<f64>,
}

pub fn calibration_path() -> PathBuf {
    env::var_os("CALIBCAM_CALIBRATION_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output/calibration_data.json"))
}

impl Calibration {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| {
            format!(
                "calibration file not found at {}; run a calibration session first",
                path.display()
            )
        })?;
        serde_json::from_slice(&data)
            .with_context(|| format!("invalid calibration file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// 3x3 CV_64F intrinsic matrix for the calib3d calls.
    pub fn camera_matrix_mat(&self) -> opencv::Result<Mat> {
        Mat::from_slice_2d(&self.camera_matrix)
    }

    /// 1xN CV_64F distortion coefficient row.
    pub fn dist_coeffs_mat(&self) -> opencv::Result<Mat> {
        Mat::from_slice(&self.distortion_coefficients)?.try_clone()
    }
}
