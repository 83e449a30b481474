use chumsky::prelude::*;

/// Parser for whitespace between tokens.
///
/// Tokens only consume whitespace after themselves, so the start of the next
/// token can tell whether it was written directly against the previous one
/// (`4x`) or not (`4 x`).
pub fn ws<'a>() -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
    one_of(" \t\r\n").ignored().repeated()
}

/// A character that may continue an identifier
pub fn ident_char<'a>() -> impl Parser<'a, &'a str, char, extra::Err<Rich<'a, char>>> + Clone {
    any().filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
}

/// Identifier, without trailing whitespace
pub fn ident<'a>() -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> + Clone {
    text::ident().try_map(|s: &str, span| {
        if KEYWORDS.contains(&s) {
            Err(Rich::custom(
                span,
                format!("'{s}' is reserved and cannot be used as a variable"),
            ))
        } else {
            Ok(s)
        }
    })
}

/// Reserved words
pub const KEYWORDS: &[&str] = &["im"];

/// Operator tokens accept both ASCII and the Unicode spellings used in
/// notebooks
pub const MINUS_SIGNS: &str = "-\u{2212}";
