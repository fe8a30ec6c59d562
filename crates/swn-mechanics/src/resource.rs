//! The resource guard: checks and spends magazine charges and ammunition.
//!
//! [`ActionCost::for_weapon`] computes what an attack will consume without
//! touching the actor. [`reserve`] checks every requirement first and only
//! then decrements, so a shortage leaves the actor exactly as it was.
//! Nothing else in the engine writes to charge counters.

use serde::{Deserialize, Serialize};
use swn_core::{Actor, ItemId, Weapon};

use crate::error::{MechError, MechResult, ResourceKind};

/// Charges a burst of fire consumes.
pub const BURST_CHARGES: u32 = 3;

/// What one use of an action consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCost {
    /// Charges taken from the weapon's own magazine.
    pub charges: u32,
    /// Name of the ammunition item drawn from, if any.
    pub ammo: Option<String>,
}

impl ActionCost {
    /// An action that consumes nothing.
    pub fn free() -> Self {
        Self::default()
    }

    /// The cost of attacking once with `weapon`.
    ///
    /// Charge-fed weapons need one charge, or [`BURST_CHARGES`] for a burst.
    /// Weapons that name an ammunition supply need one unit of it.
    pub fn for_weapon(weapon: &Weapon, burst: bool) -> Self {
        let charges = match (weapon.uses_charges, burst) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => BURST_CHARGES,
        };
        Self {
            charges,
            ammo: weapon.ammo.clone(),
        }
    }

    /// Returns true if the action consumes nothing.
    pub fn is_free(&self) -> bool {
        self.charges == 0 && self.ammo.is_none()
    }
}

/// What a successful reservation spent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Charges removed from the weapon's magazine.
    pub charges: u32,
    /// The ammunition item a unit was drawn from.
    pub ammo_item: Option<ItemId>,
    /// Units of ammunition drawn.
    pub ammo: u32,
}

impl Reservation {
    /// Returns true if nothing was spent.
    pub fn is_empty(&self) -> bool {
        self.charges == 0 && self.ammo == 0
    }
}

/// Check every requirement of `cost` against the actor without mutating.
///
/// Returns the ammunition item that will be drawn from, if one is needed.
pub fn check(actor: &Actor, weapon: Option<ItemId>, cost: &ActionCost) -> MechResult<Option<ItemId>> {
    if cost.charges > 0 {
        let have = weapon
            .and_then(|id| actor.item(id))
            .and_then(|item| item.charges())
            .map_or(0, |c| c.value);
        if have < cost.charges {
            return Err(MechError::InsufficientResource {
                kind: ResourceKind::Charges,
                have,
                need: cost.charges,
            });
        }
    }

    let Some(name) = &cost.ammo else {
        return Ok(None);
    };
    let supply = actor
        .items
        .iter()
        .filter(|item| item.is_ammo_named(name))
        .find(|item| item.charges().is_some_and(|c| c.value > 0));
    match supply {
        Some(item) => Ok(Some(item.id)),
        None => Err(MechError::InsufficientResource {
            kind: ResourceKind::Ammo,
            have: 0,
            need: 1,
        }),
    }
}

/// Check and spend the resources of one action.
///
/// On error the actor is untouched.
pub fn reserve(actor: &mut Actor, weapon: Option<ItemId>, cost: &ActionCost) -> MechResult<Reservation> {
    let ammo_item = check(actor, weapon, cost)?;
    let mut reservation = Reservation::default();

    if cost.charges > 0 {
        if let Some(magazine) = weapon
            .and_then(|id| actor.item_mut(id))
            .and_then(|item| item.charges_mut())
        {
            magazine.spend(cost.charges);
            reservation.charges = cost.charges;
        }
    }
    if let Some(id) = ammo_item {
        if let Some(supply) = actor.item_mut(id).and_then(|item| item.charges_mut()) {
            supply.spend(1);
            reservation.ammo_item = Some(id);
            reservation.ammo = 1;
        }
    }

    if !reservation.is_empty() {
        tracing::debug!(
            actor = %actor.name,
            charges = reservation.charges,
            ammo = reservation.ammo,
            "resources spent"
        );
    }
    Ok(reservation)
}
