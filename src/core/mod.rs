//! Core markup primitives
//!
//! - Token: kind plus the matched slice of input
//! - Rules: ordered classification table with history guards
//! - Lexer: drives the rules over the input, one token per step
//! - Entities: escaping of the five reserved characters

pub mod entities;
pub mod lexer;
pub mod rules;
pub mod token;
