//! Outbound progress events and the sinks that deliver them.
//!
//! Field names are the compatibility contract with the UI. On the wire an
//! event is `{"event": <name>, "data": <payload>}`; `simulation_reset` has no
//! `data`.

use intersection::{Action, Lights, QueueState};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::mpsc::Sender;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Event {
    SimulationReset,
    TrainingStatus { training: bool },
    UpdateUi(StepEvent),
    EpisodeSummary(EpisodeSummary),
}

/// Per-step progress (`update_ui`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub episode: u64,
    pub step: u32,
    pub action: Action,
    /// Rounded to 2 decimal places.
    pub reward: f64,
    pub waiting_time: u32,
    pub cars_passed: u64,
    pub queues: QueueState,
    pub lights: Lights,
    /// Rounded to 4 decimal places.
    pub epsilon: f64,
    pub training: bool,
}

/// End-of-episode report (`episode_summary`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u64,
    /// Rounded to 2 decimal places.
    pub avg_reward: f64,
    /// Lifetime total of the current environment.
    pub total_waiting_time: u64,
    /// Lifetime total of the current environment.
    pub cars_passed: u64,
    pub action_history: Vec<Action>,
}

/// Rounds half away from zero to `places` decimals.
#[must_use]
pub fn round_to(value: f32, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (f64::from(value) * scale).round() / scale
}

/// Destination for controller events.
pub trait EventSink: Send {
    fn emit(&mut self, event: Event);
}

/// Forwards events over a channel, e.g. to a transport thread.
pub struct ChannelSink {
    tx: Sender<Event>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: Sender<Event>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: Event) {
        // A closed receiver means nobody is listening; the simulation goes on.
        let _ = self.tx.send(event);
    }
}

/// Writes one JSON object per line and flushes after each event.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &Event) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: Event) {
        if let Err(e) = self.write_event(&event) {
            warn!("Failed to write event: {e:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rounding() {
        assert!((round_to(-3.141_59, 2) + 3.14).abs() < 1e-9);
        assert!((round_to(0.995_f32.powi(3), 4) - 0.9851).abs() < 1e-9);
        assert!((round_to(-7.0, 2) + 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wire_shapes() {
        let reset = serde_json::to_value(Event::SimulationReset).unwrap();
        assert_eq!(reset, json!({"event": "simulation_reset"}));

        let status = serde_json::to_value(Event::TrainingStatus { training: true }).unwrap();
        assert_eq!(status, json!({"event": "training_status", "data": {"training": true}}));

        let summary = Event::EpisodeSummary(EpisodeSummary {
            episode: 3,
            avg_reward: -4.5,
            total_waiting_time: 900,
            cars_passed: 120,
            action_history: vec![Action::Hold, Action::Switch],
        });
        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            json!({
                "event": "episode_summary",
                "data": {
                    "episode": 3,
                    "avg_reward": -4.5,
                    "total_waiting_time": 900,
                    "cars_passed": 120,
                    "action_history": ["Keep", "Switch"]
                }
            })
        );
    }

    #[test]
    fn json_lines_sink_writes_one_line_per_event() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(Event::SimulationReset);
        sink.emit(Event::TrainingStatus { training: false });
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"event":"simulation_reset"}"#);
        assert_eq!(lines[1], r#"{"event":"training_status","data":{"training":false}}"#);
    }
}
