//! Integration tests for Facing and Item

use quire_foundation::{Facing, Item, inventory_line};

// =============================================================================
// Facing
// =============================================================================

#[test]
fn codes_and_compass_names() {
    let codes: Vec<_> = Facing::ALL.iter().map(|f| f.code()).collect();
    assert_eq!(codes, vec!["n", "e", "s", "w"]);
    assert_eq!(Facing::West.compass(), "west");
}

#[test]
fn parse_accepts_words_and_codes() {
    assert_eq!("n".parse::<Facing>().unwrap(), Facing::North);
    assert_eq!("East".parse::<Facing>().unwrap(), Facing::East);
    assert_eq!(" south ".parse::<Facing>().unwrap(), Facing::South);
    assert!("up".parse::<Facing>().is_err());
}

#[test]
fn relative_positions() {
    assert_eq!(Facing::North.relative(Facing::North), "front");
    assert_eq!(Facing::North.relative(Facing::East), "right");
    assert_eq!(Facing::North.relative(Facing::South), "rear");
    assert_eq!(Facing::North.relative(Facing::West), "left");
    assert_eq!(Facing::West.relative(Facing::North), "right");
}

#[test]
fn direction_labels() {
    assert_eq!(Facing::East.direction_label(Facing::East), "Continue forwards.");
    assert_eq!(Facing::East.direction_label(Facing::South), "Turn right and continue.");
    assert_eq!(Facing::East.direction_label(Facing::West), "Go back.");
    assert_eq!(Facing::East.direction_label(Facing::North), "Turn left and continue.");
}

#[test]
fn behind_is_an_involution() {
    for facing in Facing::ALL {
        assert_eq!(facing.behind().behind(), facing);
        assert_ne!(facing.behind(), facing);
    }
}

// =============================================================================
// Items
// =============================================================================

#[test]
fn inventory_line_sorts_names() {
    let items = [Item::new("Torch"), Item::new("Key"), Item::new("Apple")];
    assert_eq!(inventory_line(&items), "Items: Apple, Key, Torch");
}

#[test]
fn inventory_line_singular_and_empty() {
    assert_eq!(inventory_line(&[Item::new("Rope")]), "Item: Rope");
    assert_eq!(inventory_line(&[]), "");
}
