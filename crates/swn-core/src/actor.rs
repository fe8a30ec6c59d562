//! Actors: player characters and statblock NPCs.
//!
//! An [`Actor`] carries everything the engine reads from a character sheet:
//! ability scores, skills, hit points, items and the compact NPC statblock
//! fields. Combatants refer to actors by [`ActorId`] through the
//! [`ActorDirectory`] trait.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::item::{Item, ItemId};
use crate::track::Track;

/// Unique identifier for every actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Generate a new random actor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Whether an actor is a player character or a statblock NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A player character with full ability scores and skills.
    #[default]
    Character,
    /// A non-player character described by a compact statblock.
    Npc,
}

/// One of the six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    /// Strength.
    #[serde(alias = "str")]
    Strength,
    /// Dexterity.
    #[serde(alias = "dex")]
    Dexterity,
    /// Constitution.
    #[serde(alias = "con")]
    Constitution,
    /// Intelligence.
    #[serde(alias = "int")]
    Intelligence,
    /// Wisdom.
    #[serde(alias = "wis")]
    Wisdom,
    /// Charisma.
    #[serde(alias = "cha")]
    Charisma,
}

impl Ability {
    /// All abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Self::Strength,
        Self::Dexterity,
        Self::Constitution,
        Self::Intelligence,
        Self::Wisdom,
        Self::Charisma,
    ];

    /// Three-letter abbreviation used in formulas (`@str`, `@dex`, ...).
    pub fn short(self) -> &'static str {
        match self {
            Self::Strength => "str",
            Self::Dexterity => "dex",
            Self::Constitution => "con",
            Self::Intelligence => "int",
            Self::Wisdom => "wis",
            Self::Charisma => "cha",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

impl FromStr for Ability {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Ok(Self::Strength),
            "dex" | "dexterity" => Ok(Self::Dexterity),
            "con" | "constitution" => Ok(Self::Constitution),
            "int" | "intelligence" => Ok(Self::Intelligence),
            "wis" | "wisdom" => Ok(Self::Wisdom),
            "cha" | "charisma" => Ok(Self::Charisma),
            other => Err(CoreError::Validation(format!("unknown ability: {other}"))),
        }
    }
}

/// The six ability scores (3-18).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores {
    /// Strength score.
    pub strength: i32,
    /// Dexterity score.
    pub dexterity: i32,
    /// Constitution score.
    pub constitution: i32,
    /// Intelligence score.
    pub intelligence: i32,
    /// Wisdom score.
    pub wisdom: i32,
    /// Charisma score.
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    /// The raw score for an ability.
    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Set the raw score for an ability.
    pub fn set(&mut self, ability: Ability, score: i32) {
        let slot = match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        };
        *slot = score;
    }

    /// The modifier for an ability: 3 is -2, 4-7 is -1, 8-13 is 0,
    /// 14-17 is +1, 18 is +2.
    pub fn modifier(&self, ability: Ability) -> i32 {
        score_modifier(self.score(ability))
    }
}

/// Convert an ability score to its modifier.
pub fn score_modifier(score: i32) -> i32 {
    match score {
        i32::MIN..=3 => -2,
        4..=7 => -1,
        8..=13 => 0,
        14..=17 => 1,
        _ => 2,
    }
}

/// Rank of the Alert focus, which changes how an actor rolls initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// No Alert focus.
    #[default]
    None,
    /// Level 1: rolls initiative individually, twice, keeping the best.
    Alert,
    /// Level 2: additionally always acts before the normal order.
    Vigilant,
}

impl AlertLevel {
    /// Returns true for either level of the focus.
    pub fn is_alert(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A character or NPC, as far as the mechanics engine needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    /// Stable identifier.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Character or NPC.
    pub kind: ActorKind,
    /// Character level, or hit dice for NPCs that lack one.
    pub level: u32,
    /// Ability scores.
    pub abilities: AbilityScores,
    /// Skill ranks by name. A rank below zero means untrained.
    pub skills: HashMap<String, i32>,
    /// NPC statblock skill bonus, applied to every skill.
    pub skill_bonus: Option<i32>,
    /// Owned items.
    pub items: Vec<Item>,
    /// Hit points.
    pub hit_points: Track,
    /// Number of d8 hit dice (NPCs).
    pub hit_dice: u32,
    /// Base attack bonus.
    pub attack_bonus: i32,
    /// Class-derived damage bonus added to every weapon hit.
    pub damage_bonus: i32,
    /// Fixed armor class from an NPC statblock. Overrides worn armor.
    pub armor_class: Option<i32>,
    /// Extra initiative bonus on top of the Dexterity modifier.
    pub initiative_bonus: i32,
    /// Rank of the Alert focus.
    pub alert: AlertLevel,
    /// NPC morale score (2-12).
    pub morale: i32,
    /// NPC instinct score (0-10).
    pub instinct: i32,
    /// Saving throw target.
    pub save_target: i32,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            id: ActorId::new(),
            name: String::new(),
            kind: ActorKind::Character,
            level: 1,
            abilities: AbilityScores::default(),
            skills: HashMap::new(),
            skill_bonus: None,
            items: Vec::new(),
            hit_points: Track::new("HP", 1),
            hit_dice: 1,
            attack_bonus: 0,
            damage_bonus: 0,
            armor_class: None,
            initiative_bonus: 0,
            alert: AlertLevel::None,
            morale: 7,
            instinct: 5,
            save_target: 15,
        }
    }
}

impl Actor {
    /// Create an actor with default statistics.
    pub fn new(kind: ActorKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ..Self::default()
        }
    }

    /// The modifier for one ability.
    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    /// The actor's rank in a skill, or `None` if untrained.
    ///
    /// NPCs with a statblock skill bonus use it for every skill.
    pub fn skill_rank(&self, skill: &str) -> Option<i32> {
        if let Some(bonus) = self.skill_bonus {
            return Some(bonus);
        }
        self.skills
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(skill))
            .map(|(_, rank)| *rank)
            .filter(|rank| *rank >= 0)
    }

    /// Modifier added to initiative rolls.
    pub fn initiative_modifier(&self) -> i32 {
        self.ability_modifier(Ability::Dexterity) + self.initiative_bonus
    }

    /// The armor class an attack roll must meet or beat.
    ///
    /// A statblock armor class is used as is; otherwise the best worn armor
    /// (or 10 unarmored) plus the Dexterity modifier.
    pub fn defense(&self) -> i32 {
        if let Some(ac) = self.armor_class {
            return ac;
        }
        let base = self
            .items
            .iter()
            .filter_map(Item::armor_class)
            .max()
            .unwrap_or(10);
        base + self.ability_modifier(Ability::Dexterity)
    }

    /// Look up a carried item.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Mutable access to a carried item.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Find a carried item by name (case-insensitive).
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Apply damage scaled by a multiplier: `floor(amount * multiplier)` is
    /// removed from hit points. A negative multiplier heals. Returns the new
    /// hit point total.
    pub fn apply_damage(&mut self, amount: i32, multiplier: f64) -> i32 {
        let value = (f64::from(amount) * multiplier).floor() as i32;
        self.hit_points.adjust(-value)
    }

    /// Returns true once hit points reach zero.
    pub fn is_down(&self) -> bool {
        self.hit_points.is_empty()
    }
}

/// Read access to actors by ID.
///
/// Combatants hold only an [`ActorId`]; whoever owns the actors implements
/// this so the initiative engine can resolve modifiers without taking
/// ownership.
pub trait ActorDirectory {
    /// Look up an actor. `None` means the reference is dangling.
    fn actor(&self, id: ActorId) -> Option<&Actor>;
}
