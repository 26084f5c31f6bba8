//! The `rules` module: tabletop checks and rolls.
//!
//! Imported with `(meta Library "rules")`. Every roll draws from the
//! executing room's random stream, so results are reproducible for a given
//! seed and state.

use rand::Rng;

use quire_foundation::{Arity, DiceExpr, Error, ErrorKind, Host, NativeFn, Result, Type, Value};

/// Functions in the `rules` module.
pub static FUNCTIONS: &[NativeFn] = &[
    NativeFn::new("roll", Arity::Exact(1), native_roll),
    NativeFn::new("attack", Arity::Range(0, 2), native_attack),
    NativeFn::new("dl-check", Arity::Range(1, 2), native_dl_check),
    NativeFn::new("stat-check", Arity::Range(1, 2), native_stat_check),
    NativeFn::new("initiative", Arity::Range(0, 2), native_initiative),
    NativeFn::new("random-encounter", Arity::Range(0, 2), native_random_encounter),
];

/// Named difficulty levels and their targets.
pub const DIFFICULTIES: [(&str, i64); 5] = [
    ("Easy", 5),
    ("Routine", 7),
    ("Challenging", 9),
    ("Hard", 11),
    ("Extreme", 13),
];

/// What a random encounter may turn up.
pub const ENCOUNTERS: [&str; 6] = [
    "2d4 spiders",
    "2d4 giant rats",
    "1 giant beetle",
    "1d5 skeletons",
    "1d3 zombies",
    "loot",
];

/// Looks up a difficulty target by name, ignoring case.
#[must_use]
pub fn difficulty(name: &str) -> Option<i64> {
    DIFFICULTIES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(_, target)| *target)
}

fn int_arg(args: &[Value], index: usize, default: i64) -> Result<i64> {
    args.get(index).map_or(Ok(default), Value::expect_int)
}

fn roll_notation(notation: &str, host: &mut dyn Host) -> Result<i64> {
    let expr = DiceExpr::parse(notation)?;
    Ok(expr.roll(host.rng()).total)
}

/// A `1d6` roll that explodes on a six.
fn exploding_d6(host: &mut dyn Host) -> i64 {
    let rng = host.rng();
    let mut total = 0;
    loop {
        let face: i64 = rng.gen_range(1..=6);
        total += face;
        if face != 6 {
            return total;
        }
    }
}

/// `(roll dice)`: rolls a dice literal or notation string and returns the total.
fn native_roll(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    match &args[0] {
        Value::String(notation) => Ok(Value::Int(roll_notation(notation, host)?)),
        Value::Int(n) => Ok(Value::Int(*n)),
        other => Err(Error::type_mismatch(Type::String, other.value_type())),
    }
}

/// `(attack [attribute] [defense])`: `1d6 + attribute` against a defense.
fn native_attack(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    let attribute = int_arg(args, 0, 0)?;
    let defense = int_arg(args, 1, 0)?;
    let check = host.rng().gen_range(1..=6_i64).saturating_add(attribute);
    Ok(Value::from(if check >= defense {
        format!("Success ({check}>={defense})")
    } else {
        format!("Fail ({check}<{defense})")
    }))
}

/// `(dl-check "Hard" [bonus])`: exploding `1d6 + bonus` against a named
/// difficulty.
fn native_dl_check(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    let name = args[0].expect_str()?;
    let bonus = int_arg(args, 1, 0)?;
    let Some(target) = difficulty(name) else {
        let known: Vec<String> = DIFFICULTIES
            .iter()
            .map(|(n, t)| format!("{n} ({t})"))
            .collect();
        return Err(Error::new(ErrorKind::InvalidArgument {
            function: "dl-check".to_string(),
            message: format!("unknown difficulty '{name}'; expected one of {}", known.join(", ")),
        }));
    };
    let check = exploding_d6(host).saturating_add(bonus);
    Ok(Value::from(if check >= target {
        format!("PASS {check} >= {target}")
    } else {
        format!("FAIL {check} < {target}")
    }))
}

/// `(stat-check stat [bonus])`: true if exploding `1d6 + bonus` reaches `stat`.
fn native_stat_check(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    let stat = int_arg(args, 0, 0)?;
    let bonus = int_arg(args, 1, 0)?;
    Ok(Value::Bool(exploding_d6(host).saturating_add(bonus) >= stat))
}

/// `(initiative [player-bonus] [npc-bonus])`: `"PLAYER"` or `"NPC"`, ties to
/// the player.
fn native_initiative(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    let player_bonus = int_arg(args, 0, 0)?;
    let npc_bonus = int_arg(args, 1, 0)?;
    let rng = host.rng();
    let player = rng.gen_range(1..=6_i64).saturating_add(player_bonus);
    let npc = rng.gen_range(1..=6_i64).saturating_add(npc_bonus);
    Ok(Value::from(if player >= npc { "PLAYER" } else { "NPC" }))
}

/// `(random-encounter [die] [yes-if-under])`: rolls `1d<die>`; under the
/// threshold picks an encounter, otherwise nil.
fn native_random_encounter(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    let die = int_arg(args, 0, 6)?;
    let threshold = int_arg(args, 1, 2)?;
    if die < 1 {
        return Err(Error::new(ErrorKind::InvalidArgument {
            function: "random-encounter".to_string(),
            message: format!("die must have at least one side, got {die}"),
        }));
    }
    let rng = host.rng();
    if rng.gen_range(1..=die) >= threshold {
        return Ok(Value::Nil);
    }
    let pick = rng.gen_range(0..ENCOUNTERS.len());
    Ok(Value::from(ENCOUNTERS[pick]))
}
