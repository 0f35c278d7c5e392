//! Events: the append-only record of what happened within a point.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

use crate::PlayerName;

/// Kind of event recorded during a point.
///
/// Serialized in upper case. Unknown strings are rejected on load rather than
/// coerced, since a misread event type corrupts score and possession.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Opening throw of a point.
    Pull,
    /// Completed pass.
    Pass,
    /// Goal scored.
    Point,
    /// Defensive block.
    Defense,
    /// Errant throw.
    Throwaway,
    /// Dropped catch.
    Drop,
}

/// A single recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    event_type: EventType,
    first_actor: PlayerName,
    #[serde(default, deserialize_with = "empty_as_none")]
    second_actor: Option<PlayerName>,
    timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time.
    #[instrument(skip(first_actor, second_actor))]
    pub fn new(
        event_type: EventType,
        first_actor: impl Into<PlayerName>,
        second_actor: Option<PlayerName>,
    ) -> Self {
        Self {
            event_type,
            first_actor: first_actor.into(),
            second_actor,
            timestamp: Utc::now(),
        }
    }

    /// Human-readable description, e.g. "Alice passed to Bob".
    pub fn describe(&self) -> String {
        let second = self.second_actor.as_deref().unwrap_or("someone");
        match self.event_type {
            EventType::Pull => format!("{} pulled", self.first_actor),
            EventType::Pass => format!("{} passed to {}", self.first_actor, second),
            EventType::Point => format!("{} scored!", self.first_actor),
            EventType::Defense => format!("{} got a block", self.first_actor),
            EventType::Throwaway => format!("{} threw it away", self.first_actor),
            EventType::Drop => format!("{} dropped it", self.first_actor),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<PlayerName>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
