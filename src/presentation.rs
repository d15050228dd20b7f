//! The presentation boundary (§6): the only trait the core exposes to the
//! outside world. A concrete GPU/window backend (`upload_rgb(width, height,
//! bytes)`) implements this; the core ships only in-memory test doubles.

use crate::error::Result;
use crate::packer::RgbFrame;

/// Receives completed RGB frames for display. Mirrors the narrow
/// upload-and-blit boundary a GPU backend would implement
/// (`GsDisplay::upload_and_present` in spirit), but generic: GPU/window
/// specifics are out of scope for this crate.
pub trait PresentationSink {
    /// Called once before the first frame, to create whatever surface the
    /// backend needs. Not called again unless the backend is torn down and
    /// re-initialized.
    fn init(&mut self, width: usize, height: usize) -> Result<()>;

    /// Upload and present one frame. Backends that block on vsync do so
    /// here; this is the only suspension point the driver loop exposes
    /// (§5).
    fn present(&mut self, frame: &RgbFrame) -> Result<()>;
}

/// Discards every frame. Useful for benchmarking the pipeline without a
/// display.
#[derive(Debug, Default)]
pub struct NullSink {
    initialized: bool,
}

impl PresentationSink for NullSink {
    fn init(&mut self, _width: usize, _height: usize) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn present(&mut self, _frame: &RgbFrame) -> Result<()> {
        Ok(())
    }
}

/// Collects every presented frame in memory. Used by the demo binary and by
/// driver-loop tests that need to inspect what would have been shown.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub width: usize,
    pub height: usize,
    pub frames: Vec<RgbFrame>,
}

impl PresentationSink for BufferSink {
    fn init(&mut self, width: usize, height: usize) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn present(&mut self, frame: &RgbFrame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_collects_presented_frames() {
        let mut sink = BufferSink::default();
        sink.init(4, 4).unwrap();
        let frame = RgbFrame::zeroed(4, 4);
        sink.present(&frame).unwrap();
        sink.present(&frame).unwrap();
        assert_eq!(sink.frames.len(), 2);
        assert_eq!(sink.width, 4);
    }
}
