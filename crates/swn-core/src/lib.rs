//! Core types for the SWN combat engine: actors, items, and the roster.
//!
//! This crate is the data contract between the mechanics engine and the
//! host that persists characters. It is independent of any dice or combat
//! logic: you can construct actors programmatically or deserialize them
//! from JSON.

/// Actors, ability scores, and the lookup contract used by combat.
pub mod actor;
/// Error types used throughout the crate.
pub mod error;
/// Owned items as a closed set of kinds.
pub mod item;
/// The roster that owns every actor in play.
pub mod roster;
/// Clamped numeric resources such as hit points.
pub mod track;

/// Re-export actor types.
pub use actor::{Ability, AbilityScores, Actor, ActorDirectory, ActorId, ActorKind, AlertLevel};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export item types.
pub use item::{Armor, Charges, Item, ItemId, ItemKind, Weapon};
/// Re-export the roster.
pub use roster::Roster;
/// Re-export the track type.
pub use track::Track;
