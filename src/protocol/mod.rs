//! Wire protocol for the needle-controller rig.
//!
//! The rig speaks a little-endian binary protocol over a single TCP
//! connection:
//!
//! 1. **Commands** — a fixed 4-byte header ([`CommandHeader`]) identifying an
//!    operation by numeric function id, optionally followed by a one-byte
//!    settings payload.
//! 2. **Replies** — the same header echoed back (with the error code set on
//!    rejection) followed by a typed body ([`response`]).
//! 3. **Stream frames** — bare 40-byte sensor records ([`frame`]) pushed
//!    continuously while acquisition streaming is active, with no header.

pub mod adc;
pub mod command;
pub mod frame;
pub mod response;

pub use adc::{ConversionMode, DataRate};
pub use command::{COMMAND_HEADER_SIZE, CommandHeader, FunctionId};
pub use frame::{CHANNEL_COUNT, FRAME_SIZE, SensorFrame};
pub use response::{BoardState, EncoderReading, FtReading, SystemInfo, SystemStatus};
