//! Bus session — broker connection, subscription, and message delivery.
//!
//! Thin collaborator around the rumqttc sync client. The session hands
//! every inbound publish on the configured topic to a handler closure;
//! decode/apply failures stay inside the handler and never reach the
//! delivery loop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};

use crate::config::Config;

/// Keep-alive doubles as the delivery loop's wakeup interval: the broker
/// ping forces an event at least this often, so the shutdown flag is
/// honored within a few seconds even on an idle topic.
const KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Pause before the client retries after a connection error, so a dead
/// broker does not turn the loop into a busy spin.
const ERROR_PAUSE: Duration = Duration::from_secs(1);

// ── Error type ──

/// Bus session errors. Fatal at startup; the delivery loop itself only
/// logs and keeps polling.
#[derive(Debug)]
pub enum BusError {
    /// The subscription request could not be queued.
    SubscribeFailed(String),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::SubscribeFailed(e) => write!(f, "Bus subscribe failed: {e}"),
        }
    }
}

impl std::error::Error for BusError {}

pub type Result<T> = std::result::Result<T, BusError>;

// ── Session ──

/// A connected-pending bus session: client, event stream, and topic.
pub struct BusSession {
    client: Client,
    connection: Connection,
    topic: String,
}

impl BusSession {
    /// Create the client and queue the subscription to the configured
    /// topic. The TCP connection itself is established lazily by the
    /// delivery loop.
    pub fn connect(config: &Config) -> Result<Self> {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(KEEP_ALIVE);

        let (client, connection) = Client::new(options, 16);
        client
            .subscribe(&config.topic, QoS::AtLeastOnce)
            .map_err(|e| BusError::SubscribeFailed(e.to_string()))?;

        Ok(BusSession {
            client,
            connection,
            topic: config.topic.clone(),
        })
    }

    /// Deliver messages until `running` clears.
    ///
    /// Each inbound publish payload is handed to `handler` on this thread,
    /// one at a time. Connection errors are logged and the loop keeps
    /// polling; a transport-level reconnect gets the subscription
    /// re-issued on its ConnAck so the bridge never stays deaf.
    pub fn run(mut self, running: &AtomicBool, mut handler: impl FnMut(&[u8])) {
        for event in self.connection.iter() {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    log::info!("broker session up, subscribing to {}", self.topic);
                    if let Err(e) = self.client.subscribe(&self.topic, QoS::AtLeastOnce) {
                        log::warn!("resubscribe failed: {e}");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    log::debug!(
                        "message on {} ({} bytes)",
                        publish.topic,
                        publish.payload.len()
                    );
                    handler(&publish.payload);
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("bus connection error: {e}");
                    std::thread::sleep(ERROR_PAUSE);
                }
            }
        }
        // Courtesy disconnect; the broker drops the session either way.
        let _ = self.client.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_config() -> Config {
        Config {
            // Connection refused is instant on loopback; no DNS involved.
            broker_host: "127.0.0.1".into(),
            broker_port: 18837,
            topic: "lights/strip".into(),
            client_id: "ledbus-test".into(),
            ..Config::default()
        }
    }

    #[test]
    fn connect_is_lazy_and_succeeds_without_broker() {
        // Client creation and the queued subscribe must not require a
        // reachable broker.
        let session = BusSession::connect(&session_config()).unwrap();
        assert_eq!(session.topic, "lights/strip");
    }

    #[test]
    fn run_stops_when_flag_already_cleared() {
        let session = BusSession::connect(&session_config()).unwrap();
        let running = AtomicBool::new(false);
        let mut delivered = 0u32;
        // The first event (a connection error for the unreachable broker)
        // hits the cleared flag and the loop exits without delivering.
        session.run(&running, |_| delivered += 1);
        assert_eq!(delivered, 0);
    }

    #[test]
    fn display_subscribe_failed() {
        let e = BusError::SubscribeFailed("request queue closed".into());
        assert_eq!(e.to_string(), "Bus subscribe failed: request queue closed");
    }
}
