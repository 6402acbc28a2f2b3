use std::fmt::Write;

use regex::bytes::Regex;

use crate::core::{
    db_type::SlotWidth,
    error::{Result, ScanError},
};

/// Compiled SQL LIKE pattern matched against raw slot bytes.
#[derive(Debug, Clone)]
pub struct LikePattern {
    pattern: String,
    regex: Regex,
}

impl LikePattern {
    pub fn compile(pattern: &[u8]) -> Result<Self> {
        let expression = like_to_regex(pattern);
        let pattern = String::from_utf8_lossy(pattern).into_owned();

        match Regex::new(&expression) {
            Ok(regex) => Ok(Self { pattern, regex }),
            Err(source) => Err(ScanError::InvalidLikePattern { pattern, source }),
        }
    }

    /// Pattern taken from a comparison value stored in a slot.
    pub fn from_slot(bits: u64, width: SlotWidth) -> Result<Self> {
        let raw = bits.to_le_bytes();
        Self::compile(until_nul(&raw[..width.bytes()]))
    }

    #[inline(always)]
    pub fn is_match(&self, subject: &[u8]) -> bool {
        self.regex.is_match(subject)
    }

    /// Matches the string stored in a slot, read in natural order up to its first NUL.
    #[inline(always)]
    pub fn matches_slot(&self, bits: u64, width: SlotWidth) -> bool {
        let raw = bits.to_le_bytes();
        self.is_match(until_nul(&raw[..width.bytes()]))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[inline(always)]
fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Translates a LIKE pattern into an anchored byte-oriented regular expression.
/// `%` and `_` are wildcards, `\` escapes `%`, `_` and itself.
pub fn like_to_regex(pattern: &[u8]) -> String {
    let mut result = String::with_capacity(pattern.len() * 4 + 8);
    result.push_str("(?s-u)^");

    let mut bytes = pattern.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        match b {
            b'%' => result.push_str(".*"),
            b'_' => result.push('.'),
            b'\\' => match bytes.peek() {
                Some(&next) if next == b'%' || next == b'_' || next == b'\\' => {
                    bytes.next();
                    push_literal(&mut result, next);
                }
                _ => push_literal(&mut result, b),
            },
            _ => push_literal(&mut result, b),
        }
    }

    result.push('$');
    result
}

#[inline]
fn push_literal(out: &mut String, b: u8) {
    if b.is_ascii_alphanumeric() {
        out.push(b as char);
    } else {
        _ = write!(out, "\\x{:02X}", b);
    }
}
