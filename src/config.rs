//! Device endpoint configuration.

use serde::{Deserialize, Serialize};

/// TCP endpoint of the needle-controller board.
///
/// The rig lives on a fixed address on its own subnet; [`Default`] carries
/// the address flashed into the firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { host: "192.168.5.101".to_string(), port: 7851 }
    }
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// `host:port` form used for the socket connect.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_rig_endpoint() {
        let config = DeviceConfig::default();
        assert_eq!(config.endpoint(), "192.168.5.101:7851");
    }

    #[test]
    fn custom_endpoint() {
        let config = DeviceConfig::new("127.0.0.1", 9000);
        assert_eq!(config.endpoint(), "127.0.0.1:9000");
    }
}
