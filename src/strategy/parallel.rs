//! Parallel Parsing
//!
//! Uses Rayon to parse many independent documents at once. Each parse
//! owns its own token stream, so no synchronization is needed.

use rayon::prelude::*;

use crate::dom::{parse_with, Element, ParseOptions};
use crate::error::SyntaxError;

/// Parse every input in parallel. Results keep input order.
pub fn parse_parallel(inputs: &[&str], options: ParseOptions) -> Vec<Result<Element, SyntaxError>> {
    tracing::trace!(documents = inputs.len(), "parsing batch");
    inputs
        .par_iter()
        .map(|input| parse_with(input, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_parse_keeps_order() {
        let inputs = ["<a/>", "<b>1</b>", "<c></d>", "<e><f/></e>"];
        let results = parse_parallel(&inputs, ParseOptions::default());

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().map(Element::tag), Ok("a"));
        assert_eq!(results[1].as_ref().ok().and_then(Element::value), Some("1"));
        assert!(matches!(results[2], Err(SyntaxError::MismatchedTag { .. })));
        assert_eq!(results[3].as_ref().map(|e| e.children().len()), Ok(1));
    }

    #[test]
    fn test_parallel_parse_empty_batch() {
        assert!(parse_parallel(&[], ParseOptions::default()).is_empty());
    }
}
