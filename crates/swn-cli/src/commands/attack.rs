use std::path::Path;

use colored::Colorize;
use swn_mechanics::{AttackEffect, AttackOptions, DieRoller, resolve_attack};

use super::{EncounterFile, find_actor};

pub struct AttackArgs {
    pub attacker: String,
    pub target: String,
    pub weapon: Option<String>,
    pub burst: bool,
    pub charge: bool,
    pub situational: i32,
    pub apply: bool,
}

pub fn run<R: DieRoller + ?Sized>(
    file: &Path,
    args: &AttackArgs,
    roller: &mut R,
) -> Result<(), String> {
    let mut encounter = EncounterFile::load(file)?;
    let mut roster = encounter.take_roster()?;

    let target = find_actor(&roster, &args.target)?;
    let (target_id, defense) = (target.id, target.defense());
    let attacker = find_actor(&roster, &args.attacker)?;
    let attacker_id = attacker.id;
    let weapon = match &args.weapon {
        Some(name) => Some(
            attacker
                .item_by_name(name)
                .ok_or_else(|| format!("{} carries no '{name}'", attacker.name))?
                .id,
        ),
        None => None,
    };

    let options = AttackOptions::against(defense)
        .with_situational(args.situational)
        .with_charge(args.charge)
        .with_burst(args.burst);
    let attacker = roster
        .get_mut(attacker_id)
        .ok_or_else(|| format!("actor '{}' not found", args.attacker))?;
    let report = resolve_attack(attacker, weapon, &options, roller).map_err(|e| e.to_string())?;
    let attacker_name = attacker.name.clone();

    println!(
        "  {} attacks {} with {}",
        attacker_name.bold(),
        args.target.bold(),
        report.weapon_name
    );
    println!("  {}", report.attack);
    println!("  {}", super::roll::paint(&report.outcome));
    if report.hit() {
        println!("  {}", report.damage);
    }
    if report.reservation.charges > 0 {
        println!("  {}", format!("spent {} charge(s)", report.reservation.charges).dimmed());
    }
    if report.reservation.ammo > 0 {
        println!("  {}", format!("spent {} ammo", report.reservation.ammo).dimmed());
    }
    for effect in &report.effects {
        match effect {
            AttackEffect::DefensePenalty { amount, rounds } => println!(
                "  {}",
                format!("{attacker_name} is at -{amount} defense for {rounds} round(s)").dimmed()
            ),
        }
    }

    if args.apply {
        let dealt = report.damage_dealt();
        let target = roster
            .get_mut(target_id)
            .ok_or_else(|| format!("actor '{}' not found", args.target))?;
        let hp = target.apply_damage(dealt, 1.0);
        println!("  {} has {hp} HP left", target.name);
        if target.is_down() {
            println!("  {}", format!("{} is down", target.name).red().bold());
        }
        encounter.actors = roster.into();
        encounter.save(file)?;
    }
    Ok(())
}
