//! Integration tests for the lexer
//!
//! Tests tokenization of whole gamebook forms.

use proptest::prelude::*;
use quire_language::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize_all(source)
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// =============================================================================
// Whole Forms
// =============================================================================

#[test]
fn tokenize_room_form() {
    assert_eq!(
        kinds(r#"(room "Hall" (set hp 2d6) (goto "Yard" :s))"#),
        vec![
            TokenKind::LParen,
            TokenKind::Symbol("room".into()),
            TokenKind::String("Hall".into()),
            TokenKind::LParen,
            TokenKind::Symbol("set".into()),
            TokenKind::Symbol("hp".into()),
            TokenKind::Dice("2d6".into()),
            TokenKind::RParen,
            TokenKind::LParen,
            TokenKind::Symbol("goto".into()),
            TokenKind::String("Yard".into()),
            TokenKind::Keyword("s".into()),
            TokenKind::RParen,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn tokenize_list_literal_and_operators() {
    assert_eq!(
        kinds("[1 -2 3.5] (>= world.gold 10)"),
        vec![
            TokenKind::LBracket,
            TokenKind::Int(1),
            TokenKind::Int(-2),
            TokenKind::Float(3.5),
            TokenKind::RBracket,
            TokenKind::LParen,
            TokenKind::Symbol(">=".into()),
            TokenKind::Symbol("world.gold".into()),
            TokenKind::Int(10),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_kept_as_trivia() {
    let tokens = kinds("; header\n(meta Title \"X\") ; trailing");
    assert!(matches!(tokens[0], TokenKind::Comment(_)));
    assert!(matches!(tokens[tokens.len() - 2], TokenKind::Comment(_)));
    assert_eq!(tokens[tokens.len() - 1], TokenKind::Eof);
}

#[test]
fn spans_track_lines() {
    let tokens = Lexer::tokenize_all("(room\n  \"A\"\n  \"text\")");
    let text = &tokens[3];
    assert_eq!(text.kind, TokenKind::String("text".into()));
    assert_eq!((text.span.line, text.span.column), (3, 3));
}

proptest! {
    #[test]
    fn lexer_always_ends_with_eof(s in "\\PC{0,64}") {
        let tokens = Lexer::tokenize_all(&s);
        prop_assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
    }
}
