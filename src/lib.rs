pub mod calibration;
pub mod camera;
pub mod capture;
pub mod cli;
pub mod overlay;
pub mod undistort;

pub use calibration::{calibration_path, Calibration};
pub use capture::image_path;
pub use cli::{execute, run_cli, Cli, Commands};
pub use undistort::FrameSource;
