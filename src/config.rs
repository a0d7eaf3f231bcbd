use std::net::SocketAddr;
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_EVENT_BUFFER: usize = 1024;
const DEFAULT_OUTBOUND_BUFFER: usize = 256;
const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Runtime configuration, read from `SIGNALING_*` environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Capacity of the dispatcher's inbound event channel
    pub event_buffer: usize,
    /// Frames queued per connection before further frames to it are dropped
    pub outbound_buffer: usize,
    /// Largest WebSocket message accepted from a client
    pub max_message_bytes: usize,
    /// Re-broadcast presence when a participant joins a room it is already in
    pub echo_presence_on_duplicate_join: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            event_buffer: DEFAULT_EVENT_BUFFER,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            echo_presence_on_duplicate_join: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for missing or unparseable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            bind_addr: parse_or(&lookup, "SIGNALING_BIND_ADDR", defaults.bind_addr),
            event_buffer: parse_or(&lookup, "SIGNALING_EVENT_BUFFER", defaults.event_buffer)
                .max(1),
            outbound_buffer: parse_or(
                &lookup,
                "SIGNALING_OUTBOUND_BUFFER",
                defaults.outbound_buffer,
            )
            .max(1),
            max_message_bytes: parse_or(
                &lookup,
                "SIGNALING_MAX_MESSAGE_BYTES",
                defaults.max_message_bytes,
            ),
            echo_presence_on_duplicate_join: parse_or(
                &lookup,
                "SIGNALING_ECHO_PRESENCE_ON_DUPLICATE_JOIN",
                defaults.echo_presence_on_duplicate_join,
            ),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    key = key,
                    value = %raw,
                    default = ?default,
                    "Invalid config value, using default"
                );
                default
            }
        },
        None => default,
    }
}
