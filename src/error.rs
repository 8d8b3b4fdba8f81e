//! Error types for device communication and report rendering.
//!
//! All fallible operations in the crate return [`Result`], built on a single
//! [`DeviceError`] enum. Error categories:
//!
//! - **Connection errors**: failure to reach the rig's TCP endpoint
//! - **Command errors**: a header could not be written to the socket
//! - **Stream errors**: the acquisition read loop failed mid-read
//! - **Reply errors**: a response was rejected, malformed, or mismatched
//! - **State errors**: an operation was invoked in the wrong client state
//! - **File / render errors**: report input or PDF output failures

use std::path::PathBuf;
use thiserror::Error;

use crate::protocol::command::FunctionId;

/// Result type alias for device and rendering operations.
pub type Result<T, E = DeviceError> = std::result::Result<T, E>;

/// Main error type for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DeviceError {
    #[error("failed to connect to device at {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("not connected to the device")]
    NotConnected,

    #[error("failed to send {function:?} command")]
    Command {
        function: FunctionId,
        #[source]
        source: std::io::Error,
    },

    #[error("acquisition stream read failed")]
    Stream {
        #[source]
        source: std::io::Error,
    },

    #[error("reply parse error in {context}: {details}")]
    Reply { context: String, details: String },

    #[error("device rejected function id {function_id} with error code {code}")]
    Rejected { function_id: u8, code: u8 },

    #[error("unexpected reply: expected {expected:?}, received function id {received}")]
    UnexpectedReply { expected: FunctionId, received: u8 },

    #[error("an acquisition stream is already active on this connection")]
    StreamingActive,

    #[error("no acquisition stream is active")]
    NotStreaming,

    #[error("report file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report rendering failed: {details}")]
    Render { details: String },
}

impl DeviceError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Only connection establishment is retryable; every other failure is
    /// terminal for the operation in progress.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeviceError::Connect { .. })
    }

    /// Helper constructor for connection errors.
    pub fn connect_failed(endpoint: impl Into<String>, source: std::io::Error) -> Self {
        DeviceError::Connect { endpoint: endpoint.into(), source }
    }

    /// Helper constructor for command write errors.
    pub fn command_failed(function: FunctionId, source: std::io::Error) -> Self {
        DeviceError::Command { function, source }
    }

    /// Helper constructor for stream read errors.
    pub fn stream_failed(source: std::io::Error) -> Self {
        DeviceError::Stream { source }
    }

    /// Helper constructor for reply parse errors.
    pub fn reply_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        DeviceError::Reply { context: context.into(), details: details.into() }
    }

    /// Helper constructor for report file errors with path context.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeviceError::File { path: path.into(), source }
    }

    /// Helper constructor for PDF build failures.
    pub fn render_failed(details: impl Into<String>) -> Self {
        DeviceError::Render { details: details.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_constructors_validation() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let connect = DeviceError::connect_failed("192.168.5.101:7851", io);
        assert!(matches!(connect, DeviceError::Connect { .. }));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let command = DeviceError::command_failed(FunctionId::GetStatus, io);
        assert!(matches!(command, DeviceError::Command { .. }));

        let reply = DeviceError::reply_error("status reply", "short body");
        assert!(matches!(reply, DeviceError::Reply { .. }));
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<DeviceError>();

        let error = DeviceError::NotConnected;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retryability_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(DeviceError::connect_failed("host:1", io).is_retryable());
        assert!(!DeviceError::NotConnected.is_retryable());
        assert!(!DeviceError::Rejected { function_id: 12, code: 1 }.is_retryable());
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(!DeviceError::stream_failed(io).is_retryable());
    }

    #[test]
    fn messages_contain_context() {
        let msg = DeviceError::Rejected { function_id: 99, code: 1 }.to_string();
        assert!(msg.contains("99"));
        assert!(msg.contains("error code 1"));

        let msg = DeviceError::reply_error("system info reply", "expected 58 bytes").to_string();
        assert!(msg.contains("system info reply"));
        assert!(msg.contains("expected 58 bytes"));
    }
}
