use crate::calibration::calibration_path;
use crate::capture::{run_capture, CaptureOptions};
use crate::undistort::run_undistort;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(
    name = "calibcam",
    version,
    about = "Chessboard capture and live undistortion tools"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture chessboard images for camera calibration
    Capture {
        /// Camera device index
        #[arg(long, default_value_t = 0)]
        camera_id: i32,
        /// Inner corners per chessboard row
        #[arg(long, default_value_t = 23)]
        rows: i32,
        /// Inner corners per chessboard column
        #[arg(long, default_value_t = 15)]
        cols: i32,
        /// Directory to save captured images
        #[arg(short, long, default_value = "calibration_images")]
        output_dir: PathBuf,
    },
    /// Show a live feed corrected with saved calibration data
    Undistort {
        /// Camera device index
        #[arg(long, default_value_t = 0)]
        camera_id: i32,
        /// Path to the calibration file
        #[arg(short, long)]
        calibration_file: Option<PathBuf>,
    },
}

pub fn run_cli() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Capture {
            camera_id,
            rows,
            cols,
            output_dir,
        } => run_capture(&CaptureOptions {
            camera_id,
            rows,
            cols,
            output_dir,
        }),
        Commands::Undistort {
            camera_id,
            calibration_file,
        } => {
            let path = calibration_file.unwrap_or_else(calibration_path);
            run_undistort(camera_id, &path)
        }
    }
}
