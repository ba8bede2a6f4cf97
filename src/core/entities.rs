//! XML Entity Transform
//!
//! Escapes and unescapes the five reserved characters:
//! `<` `&lt;`, `>` `&gt;`, `&` `&amp;`, `'` `&apos;`, `"` `&quot;`
//!
//! Both directions are a single left-to-right pass, so text produced by
//! one substitution is never substituted again. Uses Cow for zero-copy
//! when nothing needs replacing.

use memchr::memchr;
use std::borrow::Cow;

/// Direction of an entity transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Entities to characters (reading markup)
    Decode,
    /// Characters to entities (writing markup)
    Encode,
}

/// Apply the entity transform in the given direction
pub fn transform(text: &str, direction: Direction) -> Cow<'_, str> {
    match direction {
        Direction::Decode => decode(text),
        Direction::Encode => encode(text),
    }
}

/// Replace the five named entities with their characters.
///
/// Unknown or unterminated entities are kept as literal text.
pub fn decode(input: &str) -> Cow<'_, str> {
    // Fast path: no '&' means no entities
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp_offset;
        // Copy everything before the entity
        result.push_str(&input[pos..amp]);

        match decode_entity(&input[amp..]) {
            Some((ch, len)) => {
                result.push(ch);
                pos = amp + len;
            }
            None => {
                result.push('&');
                pos = amp + 1;
            }
        }
    }
    result.push_str(&input[pos..]);

    Cow::Owned(result)
}

/// Decode the entity at the start of `text` (which begins with '&').
/// Returns the character and the entity length in bytes.
fn decode_entity(text: &str) -> Option<(char, usize)> {
    const ENTITIES: [(&str, char); 5] = [
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&amp;", '&'),
        ("&apos;", '\''),
        ("&quot;", '"'),
    ];
    ENTITIES
        .iter()
        .find(|(entity, _)| text.starts_with(entity))
        .map(|&(entity, ch)| (ch, entity.len()))
}

/// Replace the five reserved characters with their entities
pub fn encode(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    if !input
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'\'' | b'"'))
    {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
