//! Source trait for acquisition frames.

use crate::Result;
use crate::protocol::frame::SensorFrame;

/// Trait for acquisition frame sources.
///
/// Sources abstract over where frames come from (a live TCP connection,
/// a scripted sequence in tests) and block internally until a frame is
/// available.
#[async_trait::async_trait]
pub trait FrameSource: Send + 'static {
    /// Get the next sensor frame.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - a complete frame was read
    /// - `Ok(None)` - the peer closed the stream (normal termination)
    /// - `Err(e)` - a read error occurred; the stream is unusable
    async fn next_frame(&mut self) -> Result<Option<SensorFrame>>;
}
