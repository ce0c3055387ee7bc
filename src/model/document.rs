//! Per-document record: entities plus time-ordered events.

use serde::{Deserialize, Serialize};

use super::{Entity, Event};
use crate::chain::StopList;
use crate::Result;

/// A processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub entities: Vec<Entity>,
    /// Sorted by `(sent_id, verb_pos)`.
    pub events: Vec<Event>,
}

impl Document {
    /// Events with `entity` among their role fillers, minus stop-listed
    /// `(predicate, role)` pairs.
    pub fn chain(&self, entity: &Entity, stoplist: Option<&StopList>) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.contains(entity))
            .filter(|e| match (stoplist, e.predicate_gr(entity)) {
                (Some(stop), Some((predicate, role))) => !stop.contains(predicate, role),
                _ => true,
            })
            .collect()
    }

    /// `(entity, chain)` for every entity, in entity order.
    pub fn chains<'a>(&'a self, stoplist: Option<&'a StopList>) -> impl Iterator<Item = (&'a Entity, Vec<&'a Event>)> + 'a {
        self.entities.iter().map(move |entity| (entity, self.chain(entity, stoplist)))
    }

    /// Events whose position lies in `[start, end]`; `None` leaves that side open.
    pub fn events_between(&self, start: Option<(usize, usize)>, end: Option<(usize, usize)>) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| {
                let pos = e.position();
                start.is_none_or(|s| s <= pos) && end.is_none_or(|t| pos <= t)
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
