//! Bounded counters such as hit points and system strain.

use serde::{Deserialize, Serialize};

/// A value that never leaves `min..=max`.
///
/// Damage and healing both go through [`Track::adjust`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Label shown next to the value.
    #[serde(default)]
    pub name: String,
    /// Current value.
    pub current: i32,
    /// Upper bound.
    pub max: i32,
    /// Lower bound; zero for hit points.
    #[serde(default)]
    pub min: i32,
}

impl Track {
    /// A full track from 0 to `max`.
    pub fn new(name: impl Into<String>, max: i32) -> Self {
        Self {
            name: name.into(),
            current: max,
            max,
            min: 0,
        }
    }

    /// Add `delta` (negative for damage) and clamp. Returns the new value.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        self.current = self.current.saturating_add(delta).clamp(self.min, self.max);
        self.current
    }

    /// Replace the upper bound and fill the track to it. A bound below the
    /// minimum is raised to the minimum.
    pub fn reset_max(&mut self, max: i32) {
        self.max = max.max(self.min);
        self.current = self.max;
    }

    /// Returns true once the value has hit the lower bound.
    pub fn is_empty(&self) -> bool {
        self.current <= self.min
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new("HP", 1)
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_stops_at_zero() {
        let mut hp = Track::new("HP", 6);
        assert_eq!(hp.adjust(-4), 2);
        assert!(!hp.is_empty());
        assert_eq!(hp.adjust(-9), 0);
        assert!(hp.is_empty());
    }

    #[test]
    fn healing_stops_at_max() {
        let mut hp = Track::new("HP", 6);
        hp.adjust(-5);
        assert_eq!(hp.adjust(20), 6);
    }

    #[test]
    fn extreme_deltas_do_not_overflow() {
        let mut hp = Track::new("HP", 6);
        assert_eq!(hp.adjust(i32::MIN), 0);
        assert_eq!(hp.adjust(i32::MAX), 6);
    }

    #[test]
    fn reset_max_refills() {
        let mut hp = Track::new("HP", 4);
        hp.adjust(-3);
        hp.reset_max(9);
        assert_eq!((hp.current, hp.max), (9, 9));
        hp.reset_max(-5);
        assert_eq!((hp.current, hp.max), (0, 0));
    }

    #[test]
    fn display_shows_current_over_max() {
        let mut hp = Track::new("HP", 7);
        hp.adjust(-2);
        assert_eq!(hp.to_string(), "5/7");
    }
}
