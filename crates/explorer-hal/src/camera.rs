//! Camera frames and the [`FrameSource`] boundary.

/// A raw image frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data (e.g. BGR24).
    pub data: Vec<u8>,
}

impl CameraFrame {
    /// An all-black BGR24 frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 3],
        }
    }
}

/// Anything that can hand out camera frames: a robot camera, AR glasses, a
/// webcam.
pub trait FrameSource: Send {
    /// The next frame, or `None` when nothing is available this tick (device
    /// disconnected, buffer empty).  Callers skip detection on `None`.
    fn get_frame(&mut self) -> Option<CameraFrame>;
}
