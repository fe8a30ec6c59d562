//! The encounter state machine.
//!
//! ```text
//! Inactive --start--> RoundInProgress --advance (wrap)--> RoundEnded
//!     ^                    ^                                  |
//!     |                    +-------- round + 1 ---------------+
//!     +-- any state --end--> Ended
//! ```
//!
//! The turn pointer always indexes the current turn order. Whenever the
//! order is rebuilt from a fresh batch of initiative values the pointer
//! goes back to the first entry.

pub mod combatant;
pub mod config;
pub mod event;

pub use combatant::{Combatant, CombatantId};
pub use config::CombatConfig;
pub use event::CombatEvent;

use serde::{Deserialize, Serialize};
use swn_core::{Actor, ActorDirectory};

use crate::dice::DieRoller;
use crate::error::{MechError, MechResult};
use crate::initiative::{self, InitiativeBatch, InitiativeEngine, InitiativeValue, RerollPolicy};

/// Where an encounter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    /// Combatants may be added; nothing has happened yet.
    #[default]
    Inactive,
    /// Turns are being taken.
    RoundInProgress,
    /// The round-end policy is being applied.
    RoundEnded,
    /// Frozen.
    Ended,
}

/// What [`Combat::advance_turn`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvance {
    /// Round after the advance.
    pub round: u32,
    /// Whether the advance wrapped into a new round.
    pub new_round: bool,
    /// Whose turn it is now.
    pub current: Option<CombatantId>,
}

/// One combat encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combat {
    config: CombatConfig,
    combatants: Vec<Combatant>,
    order: Vec<usize>,
    turn: usize,
    round: u32,
    phase: CombatPhase,
    log: Vec<CombatEvent>,
}

impl Combat {
    /// Create an inactive encounter.
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            combatants: Vec::new(),
            order: Vec::new(),
            turn: 0,
            round: 0,
            phase: CombatPhase::Inactive,
            log: Vec::new(),
        }
    }

    /// The configuration the encounter runs under.
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Current round; 0 before the encounter starts.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Index of the current turn in [`Combat::turn_order`].
    pub fn turn_index(&self) -> usize {
        self.turn
    }

    /// Combatants in insertion order.
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    /// Look up a combatant.
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// The actor a combatant stands for.
    pub fn actor_of<'a, D>(&self, id: CombatantId, actors: &'a D) -> MechResult<&'a Actor>
    where
        D: ActorDirectory + ?Sized,
    {
        let combatant = self.combatant(id).ok_or(MechError::CombatantNotFound(id))?;
        combatant
            .actor
            .and_then(|actor| actors.actor(actor))
            .ok_or(MechError::MissingActorBinding(id))
    }

    /// Combatants in turn order.
    pub fn turn_order(&self) -> impl Iterator<Item = &Combatant> {
        self.order.iter().map(|&i| &self.combatants[i])
    }

    /// The combatant whose turn it is, once the encounter has started.
    pub fn current(&self) -> Option<&Combatant> {
        if self.phase == CombatPhase::Inactive {
            return None;
        }
        self.order.get(self.turn).map(|&i| &self.combatants[i])
    }

    /// Everything that has happened so far.
    pub fn log(&self) -> &[CombatEvent] {
        &self.log
    }

    /// Add a combatant. During a round the current turn is preserved.
    pub fn add_combatant(&mut self, combatant: Combatant) -> MechResult<CombatantId> {
        self.ensure_not_ended()?;
        let id = combatant.id;
        let current = self.current_id();
        self.combatants.push(combatant);
        self.rebuild(current);
        Ok(id)
    }

    /// Remove a combatant. If it was their turn, the next combatant in
    /// order takes the slot; if nobody is left to act, the round ends.
    pub fn remove_combatant<D, R>(
        &mut self,
        id: CombatantId,
        actors: &D,
        roller: &mut R,
    ) -> MechResult<Combatant>
    where
        D: ActorDirectory + ?Sized,
        R: DieRoller + ?Sized,
    {
        self.ensure_not_ended()?;
        let index = self.index_of(id)?;
        let current = self.current_id();
        let turn = self.turn;
        let removed = self.combatants.remove(index);
        if current != Some(id) {
            self.rebuild(current);
            return Ok(removed);
        }

        self.rebuild(None);
        match self.next_turn_from(turn) {
            Some(next) => {
                self.turn = next;
                self.log_turn_started();
            }
            None if !self.order.is_empty() => self.end_round(actors, roller)?,
            None => {}
        }
        Ok(removed)
    }

    /// Begin round 1. Unless the reroll policy is `reset`, initiative is
    /// rolled for everyone.
    pub fn start<D, R>(&mut self, actors: &D, roller: &mut R) -> MechResult<()>
    where
        D: ActorDirectory + ?Sized,
        R: DieRoller + ?Sized,
    {
        match self.phase {
            CombatPhase::Inactive => {}
            CombatPhase::Ended => return Err(MechError::CombatEnded),
            _ => return Err(MechError::CombatAlreadyStarted),
        }
        self.round = 1;
        self.phase = CombatPhase::RoundInProgress;
        self.log.push(CombatEvent::Started { round: self.round });
        tracing::debug!(combatants = self.combatants.len(), "combat started");

        if self.config.reroll_policy == RerollPolicy::Reset {
            self.rebuild(None);
        } else {
            self.roll_initiative(actors, roller)?;
        }
        Ok(())
    }

    /// Roll initiative for everyone and apply it as one batch.
    pub fn roll_initiative<D, R>(&mut self, actors: &D, roller: &mut R) -> MechResult<InitiativeBatch>
    where
        D: ActorDirectory + ?Sized,
        R: DieRoller + ?Sized,
    {
        self.ensure_not_ended()?;
        let batch = InitiativeEngine::new(self.config).roll_all(&self.combatants, actors, roller);
        self.apply_batch(batch.clone())?;
        Ok(batch)
    }

    /// Write a batch of initiative values at once, rebuild the order and
    /// reset the pointer to the first entry.
    ///
    /// Every id is checked before anything is written.
    pub fn apply_batch(&mut self, batch: InitiativeBatch) -> MechResult<()> {
        self.ensure_not_ended()?;
        let mut targets = Vec::with_capacity(batch.updates.len());
        for (id, value) in &batch.updates {
            targets.push((self.index_of(*id)?, *value));
        }
        for (index, value) in targets {
            let combatant = &mut self.combatants[index];
            combatant.initiative = value;
            combatant.defeated = value == InitiativeValue::Defeated;
        }
        self.rebuild(None);
        self.log.push(CombatEvent::InitiativeRolled {
            round: self.round,
            values: batch.updates,
            rolls: batch.rolls,
            skipped: batch.skipped,
        });
        if self.phase == CombatPhase::RoundInProgress {
            self.settle_on_active();
            self.log_turn_started();
        }
        Ok(())
    }

    /// Move to the next turn. Wrapping past the last combatant ends the
    /// round.
    pub fn advance_turn<D, R>(&mut self, actors: &D, roller: &mut R) -> MechResult<TurnAdvance>
    where
        D: ActorDirectory + ?Sized,
        R: DieRoller + ?Sized,
    {
        self.ensure_in_round()?;
        if self.order.is_empty() {
            return Err(MechError::NoActiveCombatant);
        }
        self.ensure_rolled()?;

        let Some(next) = self.next_turn_from(self.turn + 1) else {
            self.end_round(actors, roller)?;
            return Ok(TurnAdvance {
                round: self.round,
                new_round: true,
                current: self.current_id(),
            });
        };

        self.turn = next;
        self.log_turn_started();
        Ok(TurnAdvance {
            round: self.round,
            new_round: false,
            current: self.current_id(),
        })
    }

    /// End the current round: apply the reroll policy, then start the next
    /// round from the top of the order.
    pub fn end_round<D, R>(&mut self, actors: &D, roller: &mut R) -> MechResult<()>
    where
        D: ActorDirectory + ?Sized,
        R: DieRoller + ?Sized,
    {
        self.ensure_in_round()?;
        self.phase = CombatPhase::RoundEnded;
        self.log.push(CombatEvent::RoundEnded { round: self.round });
        tracing::debug!(round = self.round, policy = %self.config.reroll_policy, "round ended");
        self.round += 1;

        match self.config.reroll_policy {
            RerollPolicy::Reset => {
                for combatant in &mut self.combatants {
                    if !is_out(combatant) {
                        combatant.initiative = InitiativeValue::Pending;
                    }
                }
                self.rebuild(None);
            }
            RerollPolicy::Reroll => {
                let batch =
                    InitiativeEngine::new(self.config).roll_all(&self.combatants, actors, roller);
                self.apply_batch(batch)?;
            }
            RerollPolicy::Keep => self.turn = 0,
        }

        self.phase = CombatPhase::RoundInProgress;
        if self.has_rolled() {
            self.settle_on_active();
            self.log_turn_started();
        }
        Ok(())
    }

    /// Mark a combatant defeated, or bring them back with a pending
    /// initiative. The turn stays with whoever had it; if that combatant is
    /// the one defeated, the turn passes to the next active combatant.
    pub fn set_defeated(&mut self, id: CombatantId, defeated: bool) -> MechResult<()> {
        self.ensure_not_ended()?;
        let index = self.index_of(id)?;
        if self.combatants[index].defeated == defeated {
            return Ok(());
        }
        let current = self.current_id();
        let successor = if defeated && current == Some(id) {
            self.order
                .iter()
                .skip(self.turn + 1)
                .map(|&i| &self.combatants[i])
                .find(|c| c.id != id && !is_out(c))
                .map(|c| c.id)
        } else {
            None
        };

        let combatant = &mut self.combatants[index];
        combatant.defeated = defeated;
        combatant.initiative = if defeated {
            InitiativeValue::Defeated
        } else {
            InitiativeValue::Pending
        };
        let name = combatant.name.clone();

        self.rebuild(successor.or(current));
        if defeated {
            self.log.push(CombatEvent::CombatantDefeated {
                round: self.round,
                combatant: id,
                name,
            });
        }
        if successor.is_some() {
            self.log_turn_started();
        }
        Ok(())
    }

    /// Set a combatant's initiative by hand. The current turn is preserved.
    pub fn set_initiative(&mut self, id: CombatantId, score: i32) -> MechResult<()> {
        self.ensure_not_ended()?;
        let index = self.index_of(id)?;
        let current = self.current_id();
        let combatant = &mut self.combatants[index];
        combatant.initiative = InitiativeValue::Rolled(score);
        combatant.defeated = false;
        self.rebuild(current);
        Ok(())
    }

    /// End the encounter. Round and turn are frozen.
    pub fn end(&mut self) -> MechResult<()> {
        self.ensure_not_ended()?;
        self.phase = CombatPhase::Ended;
        self.log.push(CombatEvent::Ended { round: self.round });
        tracing::debug!(round = self.round, "combat ended");
        Ok(())
    }

    fn current_id(&self) -> Option<CombatantId> {
        self.current().map(|c| c.id)
    }

    fn index_of(&self, id: CombatantId) -> MechResult<usize> {
        self.combatants
            .iter()
            .position(|c| c.id == id)
            .ok_or(MechError::CombatantNotFound(id))
    }

    fn ensure_not_ended(&self) -> MechResult<()> {
        if self.phase == CombatPhase::Ended {
            return Err(MechError::CombatEnded);
        }
        Ok(())
    }

    fn ensure_in_round(&self) -> MechResult<()> {
        match self.phase {
            CombatPhase::Inactive => Err(MechError::CombatNotStarted),
            CombatPhase::Ended => Err(MechError::CombatEnded),
            CombatPhase::RoundInProgress | CombatPhase::RoundEnded => Ok(()),
        }
    }

    fn has_rolled(&self) -> bool {
        self.combatants.iter().any(|c| c.initiative.score().is_some())
    }

    /// A round cannot proceed until somebody has a rolled score.
    fn ensure_rolled(&self) -> MechResult<()> {
        if self.has_rolled() {
            return Ok(());
        }
        let pending = self
            .combatants
            .iter()
            .filter(|c| c.initiative.is_pending() && !c.defeated)
            .count();
        if pending > 0 {
            return Err(MechError::InitiativePending(pending));
        }
        Ok(())
    }

    /// Recompute the order, keeping the pointer on `keep` if given.
    fn rebuild(&mut self, keep: Option<CombatantId>) {
        self.order = initiative::turn_order(&self.combatants);
        self.turn = keep
            .and_then(|id| self.order.iter().position(|&i| self.combatants[i].id == id))
            .unwrap_or(0);
    }

    /// First position at or after `start` that gets a turn this round.
    fn next_turn_from(&self, start: usize) -> Option<usize> {
        (start..self.order.len()).find(|&pos| {
            !(self.config.skip_defeated && is_out(&self.combatants[self.order[pos]]))
        })
    }

    fn settle_on_active(&mut self) {
        if !self.config.skip_defeated {
            return;
        }
        if let Some(pos) = self
            .order
            .iter()
            .skip(self.turn)
            .position(|&i| !is_out(&self.combatants[i]))
        {
            self.turn += pos;
        }
    }

    fn log_turn_started(&mut self) {
        if let Some(&i) = self.order.get(self.turn) {
            let combatant = &self.combatants[i];
            self.log.push(CombatEvent::TurnStarted {
                round: self.round,
                combatant: combatant.id,
                name: combatant.name.clone(),
            });
        }
    }
}

impl Default for Combat {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

fn is_out(combatant: &Combatant) -> bool {
    combatant.defeated || combatant.initiative == InitiativeValue::Defeated
}
