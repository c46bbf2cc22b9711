//! Public share slug
//!
//! Published tables are reachable without authentication through an
//! 8-character slug drawn from the URL-safe alphabet `[A-Za-z0-9_-]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SLUG_LENGTH: usize = 8;

/// 64 symbols, so a uniform index in 0..64 maps to a uniform symbol
pub const SLUG_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid public slug format. Must be exactly 8 characters.")]
pub struct InvalidSlug;

/// Check a candidate slug without allocating
pub fn is_valid_slug(candidate: &str) -> bool {
    candidate.len() == SLUG_LENGTH
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicSlug(String);

impl PublicSlug {
    pub fn parse(candidate: &str) -> Result<Self, InvalidSlug> {
        if is_valid_slug(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(InvalidSlug)
        }
    }

    /// Build a slug from `SLUG_LENGTH` symbol indices. Each index is reduced
    /// modulo 64, which is exact for the 64-symbol alphabet.
    pub fn from_indices(mut next_index: impl FnMut() -> usize) -> Self {
        let slug = (0..SLUG_LENGTH)
            .map(|_| SLUG_ALPHABET[next_index() % SLUG_ALPHABET.len()] as char)
            .collect();
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PublicSlug {
    type Error = InvalidSlug;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_slug(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidSlug)
        }
    }
}

impl From<PublicSlug> for String {
    fn from(slug: PublicSlug) -> String {
        slug.0
    }
}

impl std::fmt::Display for PublicSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
