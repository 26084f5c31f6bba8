//! Integration tests for Layer 1: Language
//!
//! Tests for the lexer, parser, reader and scope resolver working together.

mod lexer;
mod parser;
mod program;
