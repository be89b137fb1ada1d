use serde::{Deserialize, Serialize};

use crate::achievements::Achievement;
use crate::error::FeedbackError;

/// Every observable change in the core produces a GameEvent.
/// The presentation layer consumes them; nothing in the core waits on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    SessionStarted {
        duration_secs: u32,
    },
    TickUpdated {
        remaining_secs: u32,
        total_secs: u32,
    },
    ClickRegistered {
        count: u32,
    },
    SessionEnded {
        clicks: u32,
        cps: f64,
    },
    SessionReset {
        duration_secs: u32,
    },
    AchievementUnlocked {
        id: Achievement,
    },
}

/// A cosmetic collaborator (sound, click effects, banners).
pub trait EventSink {
    fn name(&self) -> &'static str;

    fn handle(&mut self, event: &GameEvent) -> Result<(), FeedbackError>;
}

/// Hand each event to every sink. A failing sink is logged and skipped;
/// the remaining sinks still see the event.
pub fn dispatch(events: &[GameEvent], sinks: &mut [&mut dyn EventSink]) {
    for event in events {
        for sink in sinks.iter_mut() {
            if let Err(err) = sink.handle(event) {
                tracing::warn!(sink = sink.name(), ?event, error = %err, "feedback failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        seen: Vec<GameEvent>,
    }

    impl EventSink for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn handle(&mut self, event: &GameEvent) -> Result<(), FeedbackError> {
            self.seen.push(event.clone());
            Ok(())
        }
    }

    struct Broken;

    impl EventSink for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn handle(&mut self, _event: &GameEvent) -> Result<(), FeedbackError> {
            Err(FeedbackError::Unavailable("no audio device".into()))
        }
    }

    #[test]
    fn failing_sink_does_not_starve_others() {
        let mut broken = Broken;
        let mut recorder = Recorder { seen: vec![] };
        let events = vec![
            GameEvent::ClickRegistered { count: 1 },
            GameEvent::ClickRegistered { count: 2 },
        ];

        let mut sinks: [&mut dyn EventSink; 2] = [&mut broken, &mut recorder];
        dispatch(&events, &mut sinks);

        assert_eq!(recorder.seen, events);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_string(&GameEvent::SessionEnded {
            clicks: 12,
            cps: 1.2,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"SessionEnded","clicks":12,"cps":1.2}"#);

        let json = serde_json::to_string(&GameEvent::AchievementUnlocked {
            id: Achievement::SpeedDemon,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"AchievementUnlocked","id":"speed_demon"}"#);
    }
}
