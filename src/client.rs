//! Device client: connection, commands, queries, and the acquisition
//! session.
//!
//! One TCP connection, two halves: the caller keeps the write half and
//! issues commands; `start_streaming` hands the read half to a background
//! [`Driver`](crate::driver::Driver) task that publishes frames on a
//! latest-wins channel. Typed queries use the read half directly and are
//! therefore only available while no stream is active.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;
use crate::config::DeviceConfig;
use crate::driver::Driver;
use crate::error::DeviceError;
use crate::offset::{AdjustedFrame, ChannelOffset};
use crate::protocol::adc::{ConversionMode, DataRate};
use crate::protocol::command::{COMMAND_HEADER_SIZE, CommandHeader, FunctionId};
use crate::protocol::frame::SensorFrame;
use crate::protocol::response::{EncoderReading, FtReading, SystemInfo, SystemStatus};
use crate::sources::tcp::TcpFrameSource;
use crate::stream::StreamRate;

/// Push rate of the acquisition stream: the firmware emits a frame every
/// 10 ms.
pub const NATIVE_STREAM_HZ: f64 = 100.0;

/// Where the read half of the connection currently lives.
#[derive(Debug)]
enum Reader {
    /// Available for typed queries.
    Idle(OwnedReadHalf),
    /// Owned by the driver task.
    Streaming(StreamSession),
    /// Connection closed.
    Spent,
}

#[derive(Debug)]
struct StreamSession {
    frames: watch::Receiver<Option<Arc<SensorFrame>>>,
    offset_tx: watch::Sender<ChannelOffset>,
    offset_rx: watch::Receiver<ChannelOffset>,
    cancel: CancellationToken,
}

/// Client for one needle-controller board.
#[derive(Debug)]
pub struct DeviceClient {
    writer: Option<OwnedWriteHalf>,
    reader: Reader,
    endpoint: String,
}

impl DeviceClient {
    /// Open a TCP connection to the board.
    ///
    /// There is no retry and no connect timeout; on failure the error is
    /// surfaced and no client exists.
    pub async fn connect(config: DeviceConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        info!(%endpoint, "connecting to device");

        let stream = TcpStream::connect(&endpoint)
            .await
            .map_err(|e| DeviceError::connect_failed(endpoint.clone(), e))?;
        // Command headers are 4 bytes; don't let Nagle sit on them.
        stream
            .set_nodelay(true)
            .map_err(|e| DeviceError::connect_failed(endpoint.clone(), e))?;

        let (read_half, write_half) = stream.into_split();
        info!(%endpoint, "connected");

        Ok(Self { writer: Some(write_half), reader: Reader::Idle(read_half), endpoint })
    }

    /// Endpoint this client was connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether an acquisition session has been started on this connection.
    pub fn is_streaming(&self) -> bool {
        matches!(self.reader, Reader::Streaming(_))
    }

    /// Send a bare command header, fire-and-forget.
    ///
    /// Fails with [`DeviceError::NotConnected`] after [`disconnect`]
    /// without touching the socket.
    ///
    /// [`disconnect`]: DeviceClient::disconnect
    pub async fn send_command(&mut self, function: FunctionId) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(DeviceError::NotConnected)?;
        let header = CommandHeader::command(function);
        writer
            .write_all(&header.encode())
            .await
            .map_err(|e| DeviceError::command_failed(function, e))?;
        debug!(?function, "command sent");
        Ok(())
    }

    /// Send a command with a one-byte settings payload.
    pub async fn send_setting(&mut self, function: FunctionId, value: u8) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(DeviceError::NotConnected)?;
        let header = CommandHeader::with_payload(function, 1);
        let mut packet = [0u8; COMMAND_HEADER_SIZE + 1];
        packet[..COMMAND_HEADER_SIZE].copy_from_slice(&header.encode());
        packet[COMMAND_HEADER_SIZE] = value;
        writer
            .write_all(&packet)
            .await
            .map_err(|e| DeviceError::command_failed(function, e))?;
        debug!(?function, value, "setting sent");
        Ok(())
    }

    /// Restart the force/torque ADC.
    pub async fn reset_adc(&mut self) -> Result<()> {
        self.send_command(FunctionId::ResetAdc).await
    }

    /// Trigger the ADC's SPI communication self-check.
    pub async fn check_adc(&mut self) -> Result<()> {
        self.send_command(FunctionId::CheckAdc).await
    }

    /// Set the ADC conversion mode.
    pub async fn set_conversion_mode(&mut self, mode: ConversionMode) -> Result<()> {
        self.send_setting(FunctionId::SetAdcConversionMode, mode.code()).await
    }

    /// Set the ADC sample rate.
    pub async fn set_data_rate(&mut self, rate: DataRate) -> Result<()> {
        self.send_setting(FunctionId::SetAdcDataRate, rate.code()).await
    }

    /// Query the board's connection state.
    pub async fn query_status(&mut self) -> Result<SystemStatus> {
        let body = self.query(FunctionId::GetStatus).await?;
        SystemStatus::parse(&body)
    }

    /// Query firmware identity and network addresses.
    pub async fn query_system_info(&mut self) -> Result<SystemInfo> {
        let body = self.query(FunctionId::GetSystemInfo).await?;
        SystemInfo::parse(&body)
    }

    /// Query a single force/torque sample.
    pub async fn query_ft_sensors(&mut self) -> Result<FtReading> {
        let body = self.query(FunctionId::GetFtSensorData).await?;
        FtReading::parse(&body)
    }

    /// Query a single encoder position sample.
    pub async fn query_encoders(&mut self) -> Result<EncoderReading> {
        let body = self.query(FunctionId::GetEncoderSensorData).await?;
        EncoderReading::parse(&body)
    }

    /// Query one complete sensor frame.
    pub async fn query_all_sensors(&mut self) -> Result<SensorFrame> {
        let body = self.query(FunctionId::GetAllSensorData).await?;
        SensorFrame::from_slice(&body)
    }

    /// Query one sensor frame averaged over `samples` ADC conversions.
    pub async fn query_all_sensors_averaged(&mut self, samples: u8) -> Result<SensorFrame> {
        self.ensure_idle()?;
        self.send_setting(FunctionId::GetAllSensorDataMultiple, samples).await?;
        let reader = self.idle_reader()?;
        // The firmware echoes the single-shot function id in averaged replies.
        let body = read_reply(reader, FunctionId::GetAllSensorData).await?;
        SensorFrame::from_slice(&body)
    }

    /// Start the acquisition stream.
    ///
    /// Sends `StartAcquisitionStream`, then moves the read half into a
    /// background driver task. From here on the board pushes a frame every
    /// 10 ms; consume them with [`subscribe`](DeviceClient::subscribe).
    pub async fn start_streaming(&mut self) -> Result<()> {
        let read_half = match std::mem::replace(&mut self.reader, Reader::Spent) {
            Reader::Idle(read_half) => read_half,
            Reader::Streaming(session) => {
                self.reader = Reader::Streaming(session);
                return Err(DeviceError::StreamingActive);
            }
            Reader::Spent => return Err(DeviceError::NotConnected),
        };

        if let Err(e) = self.send_command(FunctionId::StartAcquisitionStream).await {
            self.reader = Reader::Idle(read_half);
            return Err(e);
        }

        let channels = Driver::spawn(TcpFrameSource::new(read_half));
        let (offset_tx, offset_rx) = watch::channel(ChannelOffset::ZERO);
        self.reader = Reader::Streaming(StreamSession {
            frames: channels.frames,
            offset_tx,
            offset_rx,
            cancel: channels.cancel,
        });
        info!("acquisition stream started");
        Ok(())
    }

    /// Stop the acquisition stream.
    ///
    /// Sends `StopAcquisitionStream`, then cancels the read loop. The call
    /// does not wait for the loop to exit; termination is bounded by one
    /// read cycle. The loop is cancelled even if the stop command cannot
    /// be written.
    pub async fn stop_streaming(&mut self) -> Result<()> {
        let session = match &self.reader {
            Reader::Streaming(session) => session,
            _ => return Err(DeviceError::NotStreaming),
        };
        let cancel = session.cancel.clone();

        let sent = self.send_command(FunctionId::StopAcquisitionStream).await;
        cancel.cancel();
        info!("acquisition stream stopping");
        sent
    }

    /// Subscribe to offset-adjusted frames.
    ///
    /// The stream skips the initial empty state, then yields the latest
    /// frame per poll (intermediate frames are conflated, never queued)
    /// and ends when the driver stops. Each emission has the offset
    /// baseline current at that moment subtracted.
    pub fn subscribe(&self, rate: StreamRate) -> Result<BoxStream<'static, AdjustedFrame>> {
        let session = match &self.reader {
            Reader::Streaming(session) => session,
            _ => return Err(DeviceError::NotStreaming),
        };

        let offset_rx = session.offset_rx.clone();
        let frames = WatchStream::new(session.frames.clone())
            .skip_while(|slot| {
                // Leading None = no frame received yet.
                let waiting = slot.is_none();
                async move { waiting }
            })
            .take_while(|slot| {
                // A None after the first frame means the driver stopped.
                let live = slot.is_some();
                async move { live }
            })
            .filter_map(|slot| async move { slot })
            .map(move |frame: Arc<SensorFrame>| offset_rx.borrow().adjust(&frame));

        Ok(match rate.normalize(NATIVE_STREAM_HZ) {
            StreamRate::Native => frames.boxed(),
            StreamRate::Max(hz) => {
                let pace = Duration::from_secs_f64(1.0 / f64::from(hz));
                tokio_stream::StreamExt::throttle(frames, pace).boxed()
            }
        })
    }

    /// Capture the most recent frame as the zero baseline.
    ///
    /// With no frame received yet the baseline resets to zero. Returns the
    /// captured baseline.
    pub fn zero_offset(&self) -> Result<ChannelOffset> {
        let session = match &self.reader {
            Reader::Streaming(session) => session,
            _ => return Err(DeviceError::NotStreaming),
        };
        let offset = match session.frames.borrow().as_deref() {
            Some(frame) => ChannelOffset::capture(frame),
            None => ChannelOffset::ZERO,
        };
        let _ = session.offset_tx.send(offset);
        debug!(?offset, "offset baseline updated");
        Ok(offset)
    }

    /// The most recent raw frame, if any has arrived.
    pub fn latest_frame(&self) -> Option<Arc<SensorFrame>> {
        match &self.reader {
            Reader::Streaming(session) => session.frames.borrow().clone(),
            _ => None,
        }
    }

    /// The offset baseline currently applied to subscriptions.
    pub fn current_offset(&self) -> ChannelOffset {
        match &self.reader {
            Reader::Streaming(session) => *session.offset_rx.borrow(),
            _ => ChannelOffset::ZERO,
        }
    }

    /// Close the connection. Idempotent; any active stream is cancelled.
    pub fn disconnect(&mut self) {
        if let Reader::Streaming(session) = &self.reader {
            session.cancel.cancel();
        }
        self.reader = Reader::Spent;
        if self.writer.take().is_some() {
            info!(endpoint = %self.endpoint, "connection closed");
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.reader {
            Reader::Idle(_) => Ok(()),
            Reader::Streaming(_) => Err(DeviceError::StreamingActive),
            Reader::Spent => Err(DeviceError::NotConnected),
        }
    }

    fn idle_reader(&mut self) -> Result<&mut OwnedReadHalf> {
        match &mut self.reader {
            Reader::Idle(read_half) => Ok(read_half),
            Reader::Streaming(_) => Err(DeviceError::StreamingActive),
            Reader::Spent => Err(DeviceError::NotConnected),
        }
    }

    async fn query(&mut self, function: FunctionId) -> Result<Vec<u8>> {
        self.ensure_idle()?;
        self.send_command(function).await?;
        let reader = self.idle_reader()?;
        read_reply(reader, function).await
    }
}

impl Drop for DeviceClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Read a reply envelope: header, rejection/id check, then the body.
async fn read_reply(reader: &mut OwnedReadHalf, expected: FunctionId) -> Result<Vec<u8>> {
    let mut head = [0u8; COMMAND_HEADER_SIZE];
    reader.read_exact(&mut head).await.map_err(DeviceError::stream_failed)?;
    let header = CommandHeader::decode(head);
    header.expect_reply(expected)?;

    let mut body = vec![0u8; header.body_len()];
    reader.read_exact(&mut body).await.map_err(DeviceError::stream_failed)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn local_device() -> (TcpListener, DeviceConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        (listener, DeviceConfig::new(addr.ip().to_string(), addr.port()))
    }

    #[tokio::test]
    async fn send_command_after_disconnect_is_not_connected() {
        let (listener, config) = local_device().await;
        let accept = tokio::spawn(async move { listener.accept().await });

        let mut client = DeviceClient::connect(config).await.expect("connect");
        let _socket = accept.await.expect("join").expect("accept");

        client.disconnect();
        client.disconnect(); // idempotent

        let err = client.send_command(FunctionId::GetStatus).await.unwrap_err();
        assert!(matches!(err, DeviceError::NotConnected));
    }

    #[tokio::test]
    async fn connect_failure_reports_endpoint() {
        // Bind then drop to find a port with nothing listening.
        let (listener, config) = local_device().await;
        drop(listener);

        let err = DeviceClient::connect(config.clone()).await.unwrap_err();
        match err {
            DeviceError::Connect { endpoint, .. } => assert_eq!(endpoint, config.endpoint()),
            other => panic!("expected Connect error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscribe_requires_an_active_stream() {
        let (listener, config) = local_device().await;
        let accept = tokio::spawn(async move { listener.accept().await });

        let client = DeviceClient::connect(config).await.expect("connect");
        let _socket = accept.await.expect("join").expect("accept");

        assert!(!client.is_streaming());
        assert!(matches!(
            client.subscribe(StreamRate::Native).map(|_| ()),
            Err(DeviceError::NotStreaming)
        ));
        assert!(matches!(client.zero_offset(), Err(DeviceError::NotStreaming)));
    }

    #[tokio::test]
    async fn query_status_round_trip() {
        let (listener, config) = local_device().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut head = [0u8; COMMAND_HEADER_SIZE];
            socket.read_exact(&mut head).await.expect("command header");
            assert_eq!(head, [4, 0, 0, 0]);
            // packet_length = 5: header + one board-state byte
            socket.write_all(&[5, 0, 0, 0, 1]).await.expect("reply");
        });

        let mut client = DeviceClient::connect(config).await.expect("connect");
        let status = client.query_status().await.expect("status");
        assert_eq!(status.state, crate::protocol::response::BoardState::Connected);
    }

    #[tokio::test]
    async fn rejected_query_surfaces_error_code() {
        let (listener, config) = local_device().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut head = [0u8; COMMAND_HEADER_SIZE];
            socket.read_exact(&mut head).await.expect("command header");
            // Header-only rejection, error code 1 (not supported).
            socket.write_all(&[4, 0, head[2], 1]).await.expect("reply");
        });

        let mut client = DeviceClient::connect(config).await.expect("connect");
        let err = client.query_system_info().await.unwrap_err();
        assert!(matches!(err, DeviceError::Rejected { function_id: 1, code: 1 }));
    }
}
