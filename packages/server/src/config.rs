//! Relay configuration.

use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8181;
pub const DEFAULT_OUTBOUND_BUFFER: usize = 32;
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(1000);

/// Runtime settings of the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Frames that may wait in each connection's outbound buffer
    pub outbound_buffer: usize,
    /// How long one recipient may hold up a fan-out before it is evicted
    pub send_timeout: Duration,
    /// Queue a `Leave` as soon as a connection's reader stops.
    ///
    /// When disabled, a dead connection is only evicted by the next failed send.
    pub leave_on_disconnect: bool,
}

impl RelayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            leave_on_disconnect: true,
        }
    }
}
