use anyhow::{bail, Context, Result};
use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::info;

/// Live camera handle. The underlying device is released on drop.
pub struct Camera {
    cap: VideoCapture,
}

impl Camera {
    pub fn open(camera_id: i32) -> Result<Self> {
        let cap = VideoCapture::new(camera_id, videoio::CAP_ANY)
            .with_context(|| format!("could not open camera {camera_id}"))?;
        if !cap.is_opened()? {
            bail!("could not open camera {camera_id}");
        }
        let camera = Self { cap };
        let size = camera.frame_size()?;
        info!("camera resolution: {}x{}", size.width, size.height);
        Ok(camera)
    }

    pub fn frame_size(&self) -> Result<Size> {
        let width = self.cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = self.cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        Ok(Size::new(width, height))
    }

    /// Reads the next frame into `frame`. A failed grab is terminal.
    pub fn read(&mut self, frame: &mut Mat) -> Result<()> {
        if !self.cap.read(frame)? {
            bail!("failed to read frame from camera");
        }
        Ok(())
    }
}
