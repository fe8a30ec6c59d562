//! Items an actor can carry.
//!
//! Item behavior is resolved through the closed [`ItemKind`] enum rather
//! than by looking up a type string at runtime: every kind carries its own
//! data, and the accessors on [`Item`] match on it.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Ability;

/// Unique identifier for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A consumable counter: magazine rounds, power cells, ammo boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charges {
    /// Remaining charges.
    pub value: u32,
    /// Capacity when full.
    pub max: u32,
}

impl Charges {
    /// A full counter with the given capacity.
    pub fn full(max: u32) -> Self {
        Self { value: max, max }
    }

    /// Returns true if at least `need` charges remain.
    pub fn covers(&self, need: u32) -> bool {
        self.value >= need
    }

    /// Remove `amount` charges. Callers check [`Charges::covers`] first;
    /// the counter saturates at zero.
    pub fn spend(&mut self, amount: u32) {
        self.value = self.value.saturating_sub(amount);
    }

    /// Refill to capacity.
    pub fn reload(&mut self) {
        self.value = self.max;
    }
}

/// Weapon statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Damage formula, e.g. `1d8` or `2d6`.
    pub damage: String,
    /// Abilities whose best modifier applies to hit and damage.
    #[serde(default = "default_weapon_abilities")]
    pub abilities: Vec<Ability>,
    /// Combat skill used with this weapon.
    #[serde(default = "default_weapon_skill")]
    pub skill: String,
    /// Enchantment or mastercraft bonus to hit.
    #[serde(default)]
    pub to_hit: i32,
    /// Internal magazine, if the weapon tracks its own rounds.
    #[serde(default)]
    pub magazine: Option<Charges>,
    /// Whether an attack spends a magazine charge.
    #[serde(default)]
    pub uses_charges: bool,
    /// Name of a separate ammunition item the weapon draws from.
    #[serde(default)]
    pub ammo: Option<String>,
    /// Whether the weapon can fire a burst.
    #[serde(default)]
    pub burst_capable: bool,
    /// Whether the skill rank is added to damage as well as to hit.
    #[serde(default)]
    pub skill_adds_damage: bool,
}

fn default_weapon_abilities() -> Vec<Ability> {
    vec![Ability::Strength]
}

fn default_weapon_skill() -> String {
    "Stab".to_string()
}

impl Weapon {
    /// A melee weapon with the given damage formula and no ammunition.
    pub fn melee(damage: impl Into<String>) -> Self {
        Self {
            damage: damage.into(),
            abilities: default_weapon_abilities(),
            skill: default_weapon_skill(),
            to_hit: 0,
            magazine: None,
            uses_charges: false,
            ammo: None,
            burst_capable: false,
            skill_adds_damage: false,
        }
    }

    /// A ranged weapon fed from an internal magazine.
    pub fn ranged(damage: impl Into<String>, magazine: u32) -> Self {
        Self {
            damage: damage.into(),
            abilities: vec![Ability::Dexterity],
            skill: "Shoot".to_string(),
            to_hit: 0,
            magazine: Some(Charges::full(magazine)),
            uses_charges: true,
            ammo: None,
            burst_capable: false,
            skill_adds_damage: false,
        }
    }
}

/// Armor statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    /// Base armor class granted while worn.
    pub armor_class: i32,
    /// Whether the armor is currently worn.
    #[serde(default = "default_worn")]
    pub worn: bool,
}

fn default_worn() -> bool {
    true
}

/// The closed set of item kinds the engine understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Something to hit people with.
    Weapon(Weapon),
    /// Protective gear.
    Armor(Armor),
    /// An ammunition supply referenced by name from weapons.
    Ammo(Charges),
    /// Anything else.
    Gear {
        /// Number carried.
        #[serde(default)]
        quantity: u32,
    },
}

/// An item carried by an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Display name; ammunition is matched against it.
    pub name: String,
    /// Kind-specific data.
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    /// Create an item with a fresh ID.
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
        }
    }

    /// Weapon data, if this is a weapon.
    pub fn weapon(&self) -> Option<&Weapon> {
        match &self.kind {
            ItemKind::Weapon(w) => Some(w),
            _ => None,
        }
    }

    /// Armor class contributed by this item: only worn armor counts.
    pub fn armor_class(&self) -> Option<i32> {
        match &self.kind {
            ItemKind::Armor(a) if a.worn => Some(a.armor_class),
            _ => None,
        }
    }

    /// The charge counter this item exposes, if any.
    ///
    /// Weapons expose their magazine; ammunition exposes its supply.
    pub fn charges(&self) -> Option<Charges> {
        match &self.kind {
            ItemKind::Weapon(w) => w.magazine,
            ItemKind::Ammo(c) => Some(*c),
            _ => None,
        }
    }

    /// Mutable access to the charge counter.
    pub fn charges_mut(&mut self) -> Option<&mut Charges> {
        match &mut self.kind {
            ItemKind::Weapon(w) => w.magazine.as_mut(),
            ItemKind::Ammo(c) => Some(c),
            _ => None,
        }
    }

    /// Returns true if this is an ammunition supply with the given name
    /// (case-insensitive).
    pub fn is_ammo_named(&self, name: &str) -> bool {
        matches!(self.kind, ItemKind::Ammo(_)) && self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_spend_saturates() {
        let mut c = Charges::full(2);
        assert!(c.covers(2));
        assert!(!c.covers(3));
        c.spend(5);
        assert_eq!(c.value, 0);
        c.reload();
        assert_eq!(c.value, 2);
    }

    #[test]
    fn armor_class_only_when_worn() {
        let worn = Item::new(
            "Woven Body Armor",
            ItemKind::Armor(Armor {
                armor_class: 15,
                worn: true,
            }),
        );
        let packed = Item::new(
            "Spare Vest",
            ItemKind::Armor(Armor {
                armor_class: 13,
                worn: false,
            }),
        );
        assert_eq!(worn.armor_class(), Some(15));
        assert_eq!(packed.armor_class(), None);
    }

    #[test]
    fn charges_by_kind() {
        let rifle = Item::new("Laser Rifle", ItemKind::Weapon(Weapon::ranged("1d10", 30)));
        let cells = Item::new("Type A Cell", ItemKind::Ammo(Charges::full(10)));
        let rope = Item::new("Rope", ItemKind::Gear { quantity: 1 });
        assert_eq!(rifle.charges().map(|c| c.value), Some(30));
        assert_eq!(cells.charges().map(|c| c.value), Some(10));
        assert_eq!(rope.charges(), None);
    }

    #[test]
    fn ammo_name_match_is_case_insensitive() {
        let cells = Item::new("Type A Cell", ItemKind::Ammo(Charges::full(10)));
        assert!(cells.is_ammo_named("type a cell"));
        let rifle = Item::new("Type A Cell", ItemKind::Weapon(Weapon::melee("1d4")));
        assert!(!rifle.is_ammo_named("Type A Cell"));
    }

    #[test]
    fn deserialize_tagged_kind() {
        let json = r#"{"name":"Knife","type":"weapon","damage":"1d4"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        let weapon = item.weapon().unwrap();
        assert_eq!(weapon.damage, "1d4");
        assert_eq!(weapon.skill, "Stab");
        assert_eq!(weapon.abilities, vec![Ability::Strength]);
    }
}
