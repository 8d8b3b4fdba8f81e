//! Driver spawns and manages the acquisition read loop.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::protocol::frame::SensorFrame;
use crate::source::FrameSource;

/// Result of spawning the driver task.
pub struct DriverChannels {
    /// Receiver for the latest sensor frame; `None` once the stream ends.
    pub frames: watch::Receiver<Option<Arc<SensorFrame>>>,
    /// Cancellation token for stopping the read loop.
    pub cancel: CancellationToken,
}

/// Driver spawns the background task that owns the frame source.
///
/// The task publishes every frame on a watch channel (latest-wins, so a
/// slow consumer never applies backpressure to the socket) and exits on
/// cancellation, peer close, or the first read error. Errors are logged
/// and terminal; there is no retry.
pub struct Driver;

impl Driver {
    /// Spawn the read loop for the given source.
    pub fn spawn<S>(source: S) -> DriverChannels
    where
        S: FrameSource,
    {
        let (frame_tx, frame_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let cancel_loop = cancel.clone();
        tokio::spawn(async move {
            Self::read_loop(source, frame_tx, cancel_loop).await;
        });

        DriverChannels { frames: frame_rx, cancel }
    }

    async fn read_loop<S>(
        mut source: S,
        frame_tx: watch::Sender<Option<Arc<SensorFrame>>>,
        cancel: CancellationToken,
    ) where
        S: FrameSource,
    {
        debug!("acquisition read loop started");
        let mut frame_count = 0u64;

        loop {
            // Cancellation wins even while a read is in flight, so a stop
            // request is bounded by one loop iteration, not peer activity.
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("read loop cancelled after {} frames", frame_count);
                    return;
                }
                result = source.next_frame() => result,
            };

            match result {
                Ok(Some(frame)) => {
                    frame_count += 1;
                    trace!(timestamp = frame.timestamp, "frame {}", frame_count);

                    if frame_tx.send(Some(Arc::new(frame))).is_err() {
                        debug!("all frame receivers dropped, shutting down");
                        return;
                    }
                }
                Ok(None) => {
                    info!("stream ended after {} frames", frame_count);
                    let _ = frame_tx.send(None);
                    return;
                }
                Err(e) => {
                    error!("stream read failed after {} frames: {}", frame_count, e);
                    let _ = frame_tx.send(None);
                    return;
                }
            }
        }
    }
}
