use colored::Colorize;
use swn_mechanics::{CheckResult, ComparisonPolicy, DieRoller, Outcome, RollContext, RollSpec, commit};

pub fn run<R: DieRoller + ?Sized>(
    formula: &str,
    vars: &[String],
    policy: Option<&str>,
    target: Option<i32>,
    roller: &mut R,
) -> Result<(), String> {
    let mut spec = RollSpec::parse(formula).map_err(|e| e.to_string())?;
    if let Some(tag) = policy {
        spec.policy = Some(ComparisonPolicy::from_tag(tag, None).map_err(|e| e.to_string())?);
        spec.target = target;
    }

    let ctx = parse_vars(vars)?;
    let result = commit(&spec, &ctx, roller).map_err(|e| e.to_string())?;
    print_result(&result);
    Ok(())
}

/// Parse `name=value` bindings into a roll context.
fn parse_vars(vars: &[String]) -> Result<RollContext, String> {
    let mut ctx = RollContext::new();
    for var in vars {
        let (name, value) = var
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got '{var}'"))?;
        let value: i32 = value
            .trim()
            .parse()
            .map_err(|_| format!("variable '{}' needs an integer value", name.trim()))?;
        ctx.insert(name.trim().trim_start_matches('@'), value);
    }
    Ok(ctx)
}

pub(crate) fn print_result(result: &CheckResult) {
    println!("  {}", result.roll);
    if let Some(outcome) = &result.outcome {
        println!("  {}", paint(outcome));
    }
}

pub(crate) fn paint(outcome: &Outcome) -> colored::ColoredString {
    let text = outcome.to_string();
    match outcome {
        Outcome::Success { .. } => text.green().bold(),
        Outcome::Failure { .. } => text.red().bold(),
        Outcome::Lookup { .. } => text.bold(),
    }
}
