use std::path::Path;

use colored::Colorize;
use swn_core::Ability;
use swn_mechanics::check::{
    attribute_check, instinct_check, morale_check, reaction_roll, saving_throw, skill_check,
};
use swn_mechanics::{DieRoller, RollContext, RollSpec, commit};

use super::{CheckKind, EncounterFile, find_actor};

pub struct CheckArgs {
    pub kind: CheckKind,
    pub skill: Option<String>,
    pub abilities: Vec<String>,
    pub difficulty: i32,
    pub bonus: i32,
}

pub fn run<R: DieRoller + ?Sized>(
    file: &Path,
    actor_name: &str,
    args: &CheckArgs,
    roller: &mut R,
) -> Result<(), String> {
    let mut encounter = EncounterFile::load(file)?;
    let roster = encounter.take_roster()?;
    let actor = find_actor(&roster, actor_name)?;

    let abilities = args
        .abilities
        .iter()
        .map(|a| a.parse::<Ability>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    let spec: RollSpec = match args.kind {
        CheckKind::Skill => {
            let skill = args
                .skill
                .as_deref()
                .ok_or("skill checks need --skill")?;
            skill_check(actor, skill, &abilities, args.difficulty)
        }
        CheckKind::Save => saving_throw(actor, &abilities, args.bonus),
        CheckKind::Attribute => {
            let ability = match abilities.as_slice() {
                [ability] => *ability,
                _ => return Err("attribute checks need exactly one --ability".into()),
            };
            attribute_check(actor, ability)
        }
        CheckKind::Morale => morale_check(actor),
        CheckKind::Instinct => instinct_check(actor),
        CheckKind::Reaction => {
            reaction_roll(actor.ability_modifier(Ability::Charisma) + args.bonus)
        }
    };

    let result = commit(&spec, &RollContext::for_actor(actor), roller).map_err(|e| e.to_string())?;

    println!("  {} {}", actor.name.bold(), describe(args.kind).dimmed());
    super::roll::print_result(&result);
    if result
        .outcome
        .as_ref()
        .is_some_and(|o| o.needs_instinct_lookup())
    {
        println!("  {}", "Roll on the instinct table.".yellow());
    }
    Ok(())
}

fn describe(kind: CheckKind) -> &'static str {
    match kind {
        CheckKind::Skill => "skill check",
        CheckKind::Save => "saving throw",
        CheckKind::Attribute => "attribute check",
        CheckKind::Morale => "morale check",
        CheckKind::Instinct => "instinct check",
        CheckKind::Reaction => "reaction roll",
    }
}
