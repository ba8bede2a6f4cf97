//! DOM Module - Element tree
//!
//! - Element: tag, ordered attributes, optional text value, children
//! - Parser: recursive descent over the token stream, with explicit
//!   cursor threading

pub mod element;
pub mod parser;

pub use element::{Attributes, Element};
pub use parser::{parse, parse_with, ParseOptions, Parser};
