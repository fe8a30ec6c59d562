//! Random hit points for newly placed NPCs.

use swn_core::{Actor, ActorKind};

use crate::dice::{DiceTerm, Die, DieRoller, Keep, RollContext, RollResult, RollSpec};
use crate::error::MechResult;

/// The hit point roll for an actor: one d8 per hit die.
pub fn hit_point_spec(actor: &Actor) -> MechResult<RollSpec> {
    let dice = DiceTerm::new(actor.hit_dice, Die::D8.sides(), Keep::All)?;
    Ok(RollSpec::builder().dice("hit dice", dice).build())
}

/// Roll hit points for an NPC and reset its track to the result (at least
/// 1). Characters keep their sheet values and return `None`.
pub fn roll_hit_points<R: DieRoller + ?Sized>(
    actor: &mut Actor,
    roller: &mut R,
) -> MechResult<Option<RollResult>> {
    if actor.kind != ActorKind::Npc {
        return Ok(None);
    }
    let roll = hit_point_spec(actor)?.evaluate(&RollContext::new(), roller)?;
    actor.hit_points.reset_max(roll.total.max(1));
    tracing::debug!(actor = %actor.name, hp = roll.total, "rolled hit points");
    Ok(Some(roll))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{FormulaError, ScriptedRoller};
    use crate::error::MechError;

    #[test]
    fn npc_rolls_one_d8_per_hit_die() {
        let mut npc = Actor::new(ActorKind::Npc, "Guard");
        npc.hit_dice = 2;
        let mut roller = ScriptedRoller::new([3, 6]);
        let roll = roll_hit_points(&mut npc, &mut roller).unwrap().unwrap();
        assert_eq!(roll.total, 9);
        assert_eq!(npc.hit_points.max, 9);
        assert_eq!(npc.hit_points.current, 9);
    }

    #[test]
    fn characters_are_left_alone() {
        let mut pc = Actor::new(ActorKind::Character, "Ilsa");
        pc.hit_points.reset_max(12);
        let mut roller = ScriptedRoller::always(8);
        assert!(roll_hit_points(&mut pc, &mut roller).unwrap().is_none());
        assert_eq!(pc.hit_points.max, 12);
    }

    #[test]
    fn zero_hit_dice_is_an_error() {
        let mut npc = Actor::new(ActorKind::Npc, "Drone");
        npc.hit_dice = 0;
        let mut roller = ScriptedRoller::always(4);
        let err = roll_hit_points(&mut npc, &mut roller).unwrap_err();
        assert_eq!(err, MechError::Formula(FormulaError::InvalidCount(0)));
    }
}
