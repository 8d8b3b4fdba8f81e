//! TCP frame source for live acquisition.

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tracing::debug;

use crate::error::DeviceError;
use crate::protocol::frame::{FRAME_SIZE, SensorFrame};
use crate::source::FrameSource;
use crate::Result;

/// Reads fixed-size sensor frames from the read half of the device
/// connection.
///
/// Stream frames are pushed by the board with no header, so each read is
/// exactly [`FRAME_SIZE`] bytes. There is no read timeout; a silent peer
/// blocks until the driver's cancellation token fires or the connection
/// closes.
pub struct TcpFrameSource {
    reader: OwnedReadHalf,
    buf: [u8; FRAME_SIZE],
}

impl TcpFrameSource {
    pub(crate) fn new(reader: OwnedReadHalf) -> Self {
        Self { reader, buf: [0u8; FRAME_SIZE] }
    }
}

#[async_trait::async_trait]
impl FrameSource for TcpFrameSource {
    async fn next_frame(&mut self) -> Result<Option<SensorFrame>> {
        match self.reader.read_exact(&mut self.buf).await {
            Ok(_) => Ok(Some(SensorFrame::decode(&self.buf))),
            // EOF, including a partial trailing frame, means the peer closed.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("device closed the acquisition stream");
                Ok(None)
            }
            Err(e) => Err(DeviceError::stream_failed(e)),
        }
    }
}
