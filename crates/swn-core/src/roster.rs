//! The roster that owns every actor in play.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorDirectory, ActorId};
use crate::error::{CoreError, CoreResult};

/// Owns every actor in play, indexed by ID and by lowercase name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Actor>", into = "Vec<Actor>")]
pub struct Roster {
    actors: HashMap<ActorId, Actor>,
    order: Vec<ActorId>,
    by_name_lower: HashMap<String, ActorId>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor. Names must be unique (case-insensitive).
    pub fn add_actor(&mut self, actor: Actor) -> CoreResult<ActorId> {
        let name_lower = actor.name.to_lowercase();
        if self.by_name_lower.contains_key(&name_lower) {
            return Err(CoreError::DuplicateName(actor.name.clone()));
        }
        let id = actor.id;
        self.by_name_lower.insert(name_lower, id);
        self.order.push(id);
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Get a reference to an actor by ID.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Get a mutable reference to an actor by ID.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Find an actor by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Actor> {
        self.by_name_lower
            .get(&name.to_lowercase())
            .and_then(|id| self.actors.get(id))
    }

    /// Find an actor ID by name (case-insensitive).
    pub fn find_id_by_name(&self, name: &str) -> Option<ActorId> {
        self.by_name_lower.get(&name.to_lowercase()).copied()
    }

    /// Remove an actor.
    pub fn remove_actor(&mut self, id: ActorId) -> CoreResult<Actor> {
        let actor = self.actors.remove(&id).ok_or(CoreError::ActorNotFound(id))?;
        self.by_name_lower.remove(&actor.name.to_lowercase());
        self.order.retain(|a| *a != id);
        Ok(actor)
    }

    /// Iterate over actors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.order.iter().filter_map(|id| self.actors.get(id))
    }

    /// Number of actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if the roster holds no actors.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl ActorDirectory for Roster {
    fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.get(id)
    }
}

impl TryFrom<Vec<Actor>> for Roster {
    type Error = CoreError;

    fn try_from(actors: Vec<Actor>) -> Result<Self, Self::Error> {
        let mut roster = Roster::new();
        for actor in actors {
            roster.add_actor(actor)?;
        }
        Ok(roster)
    }
}

impl From<Roster> for Vec<Actor> {
    fn from(mut roster: Roster) -> Self {
        roster
            .order
            .iter()
            .filter_map(|id| roster.actors.remove(id))
            .collect()
    }
}
