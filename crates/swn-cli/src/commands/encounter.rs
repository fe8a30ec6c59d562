use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use swn_core::Roster;
use swn_mechanics::{
    Combat, CombatEvent, Combatant, DieRoller, InitiativeMode, InitiativeValue, RerollPolicy,
};

use super::EncounterFile;

pub fn run<R: DieRoller + ?Sized>(
    file: &Path,
    rounds: u32,
    mode: Option<&str>,
    policy: Option<&str>,
    json: bool,
    roller: &mut R,
) -> Result<(), String> {
    if rounds == 0 {
        return Err("--rounds must be at least 1".into());
    }
    let mut encounter = EncounterFile::load(file)?;
    if let Some(mode) = mode {
        encounter.config.initiative_mode =
            mode.parse::<InitiativeMode>().map_err(|e| e.to_string())?;
    }
    if let Some(policy) = policy {
        encounter.config.reroll_policy =
            policy.parse::<RerollPolicy>().map_err(|e| e.to_string())?;
    }

    let mut roster = encounter.take_roster()?;
    let mut combat = encounter.build_combat(&mut roster, roller)?;
    if combat.combatants().is_empty() {
        return Err("encounter has no combatants".into());
    }

    let err = |e: swn_mechanics::MechError| e.to_string();
    combat.start(&roster, roller).map_err(err)?;
    let mut printed = 0;
    for round in 1..=rounds {
        if !has_rolled(&combat) {
            combat.roll_initiative(&roster, roller).map_err(err)?;
        }
        if !json {
            print_round(&combat, &roster, printed);
            printed = combat.log().len();
        }
        if round == rounds {
            break;
        }
        while !combat.advance_turn(&roster, roller).map_err(err)?.new_round {}
    }
    while !is_last_turn(&combat) {
        combat.advance_turn(&roster, roller).map_err(err)?;
    }
    combat.end().map_err(err)?;

    if json {
        let text = serde_json::to_string_pretty(combat.log()).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        println!("  {}", "Log".bold());
        for event in combat.log() {
            println!("  {event}");
        }
    }
    Ok(())
}

fn has_rolled(combat: &Combat) -> bool {
    combat
        .combatants()
        .iter()
        .any(|c| c.initiative.score().is_some())
}

/// Nobody after the current combatant will take a turn this round.
fn is_last_turn(combat: &Combat) -> bool {
    let skip = combat.config().skip_defeated;
    combat
        .turn_order()
        .skip(combat.turn_index() + 1)
        .all(|c| skip && (c.defeated || c.initiative == InitiativeValue::Defeated))
}

/// Print the turn order, with any initiative rolled since log entry `since`.
fn print_round(combat: &Combat, roster: &Roster, since: usize) {
    println!(
        "  {} {}",
        format!("Round {}", combat.round()).bold(),
        format!(
            "({} initiative, {} at round end)",
            combat.config().initiative_mode,
            combat.config().reroll_policy
        )
        .dimmed()
    );

    for event in combat.log().iter().skip(since) {
        let CombatEvent::InitiativeRolled { rolls, .. } = event else {
            continue;
        };
        for roll in rolls {
            let who = match roll.group {
                Some(group) => group.to_string(),
                None => roll
                    .combatants
                    .iter()
                    .filter_map(|id| combat.combatant(*id))
                    .map(|c| c.name.clone())
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            println!("  {} {}", format!("{who}:").dimmed(), roll.roll);
        }
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Name", "Group", "Init", "HP"]);
    let current = combat.current().map(|c| c.id);
    for (i, combatant) in combat.turn_order().enumerate() {
        let marker = if Some(combatant.id) == current {
            format!("> {}", i + 1)
        } else {
            (i + 1).to_string()
        };
        let hp = combat
            .actor_of(combatant.id, roster)
            .map_or_else(|_| "-".to_string(), |a| a.hit_points.to_string());
        table.add_row(vec![
            marker,
            combatant.name.clone(),
            combatant.effective_group().to_string(),
            initiative_cell(combat, combatant),
            hp,
        ]);
    }
    println!("{table}");
    println!();
}

/// Initiative as rolled, without the offset that puts vigilant combatants
/// first.
fn initiative_cell(combat: &Combat, combatant: &Combatant) -> String {
    let vigilant = combat
        .log()
        .iter()
        .rev()
        .find_map(|event| match event {
            CombatEvent::InitiativeRolled { rolls, .. } => {
                rolls.iter().find(|r| r.combatants.contains(&combatant.id))
            }
            _ => None,
        })
        .filter(|roll| roll.offset != 0 && roll.value() == combatant.initiative);
    match vigilant {
        Some(roll) => format!("{} (vigilant)", roll.display_score()),
        None => combatant.initiative.to_string(),
    }
}
