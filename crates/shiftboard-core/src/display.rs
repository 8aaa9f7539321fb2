use crate::config::MqttConfig;
use crate::error::{Result, ShiftboardError};
use crate::line::LineRecord;
use crate::store::StateStore;
use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DisplayFrame
// ---------------------------------------------------------------------------

/// The wire payload for one line: id plus the six counters. Timestamps and
/// the month tracker are internal and never leave the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFrame {
    pub prod_id: u32,
    pub plan_day: i64,
    pub actual_day: i64,
    pub gap_day: i64,
    pub plan_month: i64,
    pub actual_month: i64,
    pub gap_month: i64,
}

impl From<&LineRecord> for DisplayFrame {
    fn from(line: &LineRecord) -> Self {
        Self {
            prod_id: line.id,
            plan_day: line.plan_day,
            actual_day: line.actual_day,
            gap_day: line.gap_day,
            plan_month: line.plan_month,
            actual_month: line.actual_month,
            gap_month: line.gap_month,
        }
    }
}

// ---------------------------------------------------------------------------
// DisplaySink
// ---------------------------------------------------------------------------

/// Outbound side of the physical display. Publishing is best-effort: a
/// failure comes back as a value and never unwinds a committed state change.
pub trait DisplaySink: Send + Sync {
    fn is_connected(&self) -> bool;

    fn publish_line(&self, line: &LineRecord) -> Result<()>;

    /// Publish every line in ascending id order. Returns whether all
    /// publishes succeeded.
    fn publish_all(&self, store: &StateStore) -> bool;
}

/// Build the sink the config asks for.
pub fn sink_from_config(cfg: &MqttConfig) -> Arc<dyn DisplaySink> {
    if cfg.enabled {
        Arc::new(MqttDisplay::connect(cfg))
    } else {
        Arc::new(NullDisplay)
    }
}

// ---------------------------------------------------------------------------
// MqttDisplay
// ---------------------------------------------------------------------------

/// MQTT-backed sink. A background thread drives the connection (and its
/// reconnect cycle) and tracks connectedness; publishes are QoS 1 so the
/// broker redelivers to a display controller that was briefly away.
pub struct MqttDisplay {
    client: Client,
    topic: String,
    spacing: Duration,
    connected: Arc<AtomicBool>,
}

/// Upper bound on how long `connect` waits for the ConnAck before handing
/// the sink back. Short-lived callers publish immediately after connecting;
/// without this wait their first frames race the handshake and drop.
const CONNECT_SETTLE: Duration = Duration::from_secs(1);

impl MqttDisplay {
    /// Start the connection thread. Always returns a sink; an unreachable
    /// broker just leaves it disconnected until the retry loop gets through.
    pub fn connect(cfg: &MqttConfig) -> Self {
        let mut options = MqttOptions::new(cfg.client_id.clone(), cfg.host.clone(), cfg.port);
        options.set_keep_alive(Duration::from_secs(60));
        let (client, mut connection) = Client::new(options, 10);

        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);
        let spawned = std::thread::Builder::new()
            .name("display-mqtt".to_string())
            .spawn(move || {
                for event in connection.iter() {
                    match event {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            flag.store(true, Ordering::SeqCst);
                            tracing::info!("display broker connected");
                        }
                        Ok(Event::Incoming(Packet::Disconnect)) => {
                            flag.store(false, Ordering::SeqCst);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            if flag.swap(false, Ordering::SeqCst) {
                                tracing::warn!("display broker connection lost: {e}");
                            }
                            std::thread::sleep(Duration::from_secs(1));
                        }
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::error!("could not spawn display connection thread: {e}");
        }

        // Wait briefly for the handshake; an unreachable broker just leaves
        // the sink disconnected once the bound expires.
        let deadline = Instant::now() + CONNECT_SETTLE;
        while !connected.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(25));
        }

        Self {
            client,
            topic: cfg.topic.clone(),
            spacing: Duration::from_millis(cfg.publish_spacing_ms),
            connected,
        }
    }
}

impl DisplaySink for MqttDisplay {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn publish_line(&self, line: &LineRecord) -> Result<()> {
        if !self.is_connected() {
            return Err(ShiftboardError::Publish(
                "display broker not connected".to_string(),
            ));
        }
        let payload = serde_json::to_vec(&DisplayFrame::from(line))?;
        // try_publish keeps the request path bounded when the queue is full.
        self.client
            .try_publish(self.topic.as_str(), QoS::AtLeastOnce, false, payload)
            .map_err(|e| ShiftboardError::Publish(e.to_string()))?;
        tracing::debug!(line = line.id, topic = %self.topic, "published display frame");
        Ok(())
    }

    fn publish_all(&self, store: &StateStore) -> bool {
        let mut all_ok = true;
        for (i, line) in store.lines().enumerate() {
            // Give the display controller time to process each frame.
            if i > 0 {
                std::thread::sleep(self.spacing);
            }
            if let Err(e) = self.publish_line(line) {
                tracing::warn!(line = line.id, "display publish failed: {e}");
                all_ok = false;
            }
        }
        all_ok
    }
}

// ---------------------------------------------------------------------------
// NullDisplay
// ---------------------------------------------------------------------------

/// Sink that accepts and discards every frame. Used when MQTT is disabled
/// in config, and in tests.
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn is_connected(&self) -> bool {
        true
    }

    fn publish_line(&self, _line: &LineRecord) -> Result<()> {
        Ok(())
    }

    fn publish_all(&self, _store: &StateStore) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::UpdateMode;
    use chrono::{Local, TimeZone};

    #[test]
    fn frame_carries_only_id_and_counters() {
        let now = Local.with_ymd_and_hms(2026, 8, 3, 6, 0, 0).unwrap();
        let mut line = LineRecord::new(2);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, now);
        line.update_actual(UpdateMode::Explicit, 42, now);

        let frame = DisplayFrame::from(&line);
        assert_eq!(frame.prod_id, 2);
        assert_eq!(frame.plan_day, 100);
        assert_eq!(frame.actual_day, 42);
        assert_eq!(frame.gap_day, 58);

        let json = serde_json::to_value(&frame).unwrap();
        let mut keys: Vec<&str> =
            json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "actual_day",
                "actual_month",
                "gap_day",
                "gap_month",
                "plan_day",
                "plan_month",
                "prod_id"
            ]
        );
    }

    #[test]
    fn null_sink_always_succeeds() {
        let store = StateStore::new();
        let sink = NullDisplay;
        assert!(sink.is_connected());
        assert!(sink.publish_all(&store));
    }

    fn unreachable_broker_config(spacing_ms: u64) -> MqttConfig {
        MqttConfig {
            enabled: true,
            host: "127.0.0.1".to_string(),
            // Nothing listens here; the connection thread keeps retrying.
            port: 59999,
            publish_spacing_ms: spacing_ms,
            ..MqttConfig::default()
        }
    }

    #[test]
    fn connect_to_unreachable_broker_returns_within_bound() {
        let start = Instant::now();
        let sink = sink_from_config(&unreachable_broker_config(100));
        assert!(
            start.elapsed() < Duration::from_secs(3),
            "connect must give up waiting for the handshake"
        );
        assert!(!sink.is_connected());
        assert!(!sink.publish_all(&StateStore::new()));
    }

    #[test]
    fn broadcast_paces_between_lines_only() {
        let sink = MqttDisplay::connect(&unreachable_broker_config(150));
        let store = StateStore::new();

        let start = Instant::now();
        assert!(!sink.publish_all(&store));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "two gaps for three lines");
        assert!(
            elapsed < Duration::from_millis(450),
            "no sleep after the last line, got {elapsed:?}"
        );
    }

    #[test]
    fn disabled_config_yields_null_sink() {
        let cfg = MqttConfig {
            enabled: false,
            ..MqttConfig::default()
        };
        let sink = sink_from_config(&cfg);
        assert!(sink.publish_all(&StateStore::new()));
    }
}
