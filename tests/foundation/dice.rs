//! Integration tests for dice expressions
//!
//! Tests notation parsing, display and rolling with a seeded stream.

use proptest::prelude::*;
use quire_foundation::{DiceExpr, ErrorKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn parse_basic_notation() {
    let expr = DiceExpr::parse("2d6").unwrap();
    assert_eq!(expr.terms.len(), 1);
    assert_eq!(expr.terms[0].count, 2);
    assert_eq!(expr.terms[0].sides, 6);
    assert_eq!(expr.modifier, 0);
}

#[test]
fn parse_implicit_count_and_modifier() {
    let expr = DiceExpr::parse("d20+3").unwrap();
    assert_eq!(expr.terms[0].count, 1);
    assert_eq!(expr.terms[0].sides, 20);
    assert_eq!(expr.modifier, 3);
}

#[test]
fn parse_exploding_and_total_suffix() {
    let expr = DiceExpr::parse("1d6xt").unwrap();
    assert!(expr.terms[0].exploding);
    assert_eq!(expr.to_string(), "1d6x");
}

#[test]
fn parse_multiple_terms() {
    let expr = DiceExpr::parse("2d6 + 1d4 - 1").unwrap();
    assert_eq!(expr.terms.len(), 2);
    assert_eq!(expr.modifier, -1);
    assert_eq!(expr.to_string(), "2d6+1d4-1");
}

#[test]
fn parse_rejects_malformed_notation() {
    for bad in ["", "d", "2d", "0d6", "2d0", "++1", "xyz"] {
        let err = DiceExpr::parse(bad).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidDice(_)), "{bad}");
    }
}

#[test]
fn from_str_matches_parse() {
    let parsed: DiceExpr = "3d8".parse().unwrap();
    assert_eq!(parsed, DiceExpr::parse("3d8").unwrap());
}

// =============================================================================
// Rolling
// =============================================================================

#[test]
fn same_seed_same_roll() {
    let expr = DiceExpr::parse("4d6").unwrap();
    let a = expr.roll(&mut ChaCha8Rng::seed_from_u64(9));
    let b = expr.roll(&mut ChaCha8Rng::seed_from_u64(9));
    assert_eq!(a, b);
    assert_eq!(a.faces.len(), 4);
}

#[test]
fn min_accounts_for_negative_terms() {
    assert_eq!(DiceExpr::parse("2d6+1").unwrap().min(), 3);
    assert_eq!(DiceExpr::parse("1d6-1d4").unwrap().min(), -3);
}

proptest! {
    #[test]
    fn rolls_stay_in_range(seed in any::<u64>(), count in 1u32..10, sides in 1u32..30) {
        let expr = DiceExpr::parse(&format!("{count}d{sides}")).unwrap();
        let roll = expr.roll(&mut ChaCha8Rng::seed_from_u64(seed));
        let count = i64::from(count);
        prop_assert!(roll.total >= count);
        prop_assert!(roll.total <= count * i64::from(sides));
        prop_assert!(roll.faces.iter().all(|f| (1..=sides).contains(f)));
    }

    #[test]
    fn parse_never_panics(s in "[0-9dx+\\- t]{0,12}") {
        let _ = DiceExpr::parse(&s);
    }
}
