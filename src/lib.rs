//! Async client for the needle-controller sensor rig.
//!
//! The rig is a K64F board that serves force/torque and 3-axis encoder
//! telemetry over a raw TCP protocol: single-byte function-id commands
//! out, fixed 40-byte sensor frames back. This crate provides:
//!
//! - **Typed commands and queries**: status, system info, single-shot
//!   sensor reads, ADC configuration
//! - **Acquisition streaming**: a background read loop publishing frames
//!   on a latest-wins channel, consumed as a `Stream`
//! - **Zero offsetting**: capture the current reading as a baseline and
//!   report subsequent frames relative to it
//! - **Report rendering**: one-shot markdown to PDF conversion for rig
//!   documentation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cannula::{Cannula, StreamRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> cannula::Result<()> {
//!     let mut client = Cannula::connect().await?;
//!     client.start_streaming().await?;
//!
//!     let mut frames = client.subscribe(StreamRate::Max(10))?;
//!     client.zero_offset()?;
//!     while let Some(frame) = frames.next().await {
//!         println!("t={}us force={:?}", frame.timestamp, frame.force());
//!     }
//!
//!     client.stop_streaming().await?;
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod offset;
pub mod protocol;

// Stream-based acquisition architecture
pub mod client;
pub mod config;
pub mod driver;
pub mod source;
pub mod sources;
pub mod stream;

// Report rendering
pub mod render;

// Core exports
pub use error::{DeviceError, Result};
pub use offset::{AdjustedFrame, ChannelOffset};
pub use protocol::adc::{ConversionMode, DataRate};
pub use protocol::command::{COMMAND_HEADER_SIZE, CommandHeader, FunctionId};
pub use protocol::frame::{CHANNEL_COUNT, FRAME_SIZE, SensorFrame};
pub use protocol::response::{BoardState, EncoderReading, FtReading, SystemInfo, SystemStatus};

// Main API exports
pub use client::{DeviceClient, NATIVE_STREAM_HZ};
pub use config::DeviceConfig;
pub use render::DocumentRenderer;
pub use stream::StreamRate;

/// Unified entry point for device connections.
///
/// # Examples
///
/// ```rust,no_run
/// use cannula::Cannula;
///
/// #[tokio::main]
/// async fn main() -> cannula::Result<()> {
///     let client = Cannula::connect().await?;
///     println!("connected to {}", client.endpoint());
///     Ok(())
/// }
/// ```
pub struct Cannula;

impl Cannula {
    /// Connect to the rig at its fixed factory endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError::Connect`] if the board is unreachable;
    /// there is no retry.
    pub async fn connect() -> Result<DeviceClient> {
        DeviceClient::connect(DeviceConfig::default()).await
    }

    /// Connect to a rig at a custom endpoint.
    pub async fn connect_to(config: DeviceConfig) -> Result<DeviceClient> {
        DeviceClient::connect(config).await
    }
}
