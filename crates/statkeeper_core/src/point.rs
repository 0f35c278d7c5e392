//! A point of play: the two lines on the field and the events between them.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{Event, EventType, PlayerName};

/// One point, from pull or pickup to a score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    offense_players: Vec<PlayerName>,
    defense_players: Vec<PlayerName>,
    events: Vec<Event>,
}

impl Point {
    /// Creates an empty point with the given lines.
    #[instrument]
    pub fn new(offense_players: Vec<PlayerName>, defense_players: Vec<PlayerName>) -> Self {
        Self {
            offense_players,
            defense_players,
            events: Vec::new(),
        }
    }

    /// Appends an event.
    #[instrument(skip(self), fields(events = self.events.len()))]
    pub fn add_event(&mut self, event: Event) {
        debug!(event = %event.describe(), "Adding event");
        self.events.push(event);
    }

    /// Removes and returns the most recent event.
    pub fn remove_last_event(&mut self) -> Option<Event> {
        self.events.pop()
    }

    /// Swaps the offense and defense lines (a pull hands the disc over).
    pub fn swap_offense_and_defense(&mut self) {
        std::mem::swap(&mut self.offense_players, &mut self.defense_players);
    }

    /// Type of the most recent event, if any.
    pub fn last_event_type(&self) -> Option<EventType> {
        self.events.last().map(|e| *e.event_type())
    }

    /// Number of recorded events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// One human-readable line per event.
    pub fn pretty_print(&self) -> Vec<String> {
        self.events.iter().map(Event::describe).collect()
    }

    /// Player who scored, when the point is complete.
    pub fn scorer(&self) -> Option<&PlayerName> {
        self.events
            .last()
            .filter(|e| *e.event_type() == EventType::Point)
            .map(|e| e.first_actor())
    }

    pub(crate) fn replace_players(&mut self, offense: Vec<PlayerName>, defense: Vec<PlayerName>) {
        self.offense_players = offense;
        self.defense_players = defense;
    }

    pub(crate) fn truncate_events(&mut self, len: usize) {
        self.events.truncate(len);
    }

    pub(crate) fn retain_players(&mut self, keep: impl Fn(&PlayerName) -> bool) {
        self.offense_players.retain(|p| keep(p));
        self.defense_players.retain(|p| keep(p));
    }
}
