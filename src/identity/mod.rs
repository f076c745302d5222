//! Page identity module
//!
//! Every URL the crawler touches is reduced to a [`PageId`], a 128-bit digest
//! used as the dedup key for the frontier and the visited set. Identity is
//! content-addressed on the URL string, so equal strings always map to equal
//! identifiers.
//!
//! By default no canonicalization happens before hashing, which means
//! `http://x/` and `http://x` are distinct pages. [`IdentityPolicy::Canonical`]
//! opts into [`canonicalize_url`] first.

mod canonical;

pub use canonical::canonicalize_url;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of digest bytes kept for a page identifier
pub const PAGE_ID_LEN: usize = 16;

/// Stable identifier for a page, derived from its URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId([u8; PAGE_ID_LEN]);

impl PageId {
    /// Returns the lowercase hex form used in the database
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the hex form produced by [`PageId::to_hex`]
    ///
    /// Returns None for anything that is not exactly 32 hex characters.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let array: [u8; PAGE_ID_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Derives the page identifier for a URL by hashing the exact string
///
/// # Examples
///
/// ```
/// use spidey::identity::identify;
///
/// assert_eq!(identify("https://example.com/"), identify("https://example.com/"));
/// assert_ne!(identify("https://example.com/"), identify("https://example.com"));
/// ```
pub fn identify(url: &str) -> PageId {
    let digest = Sha256::digest(url.as_bytes());
    let mut id = [0u8; PAGE_ID_LEN];
    id.copy_from_slice(&digest[..PAGE_ID_LEN]);
    PageId(id)
}

/// How URLs are prepared before hashing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPolicy {
    /// Hash the URL exactly as discovered
    #[default]
    Exact,

    /// Canonicalize the URL first; unparseable URLs fall back to exact hashing
    Canonical,
}

impl IdentityPolicy {
    /// Derives the page identifier for a URL under this policy
    pub fn identify(&self, url: &str) -> PageId {
        match self {
            Self::Exact => identify(url),
            Self::Canonical => match canonicalize_url(url) {
                Ok(canonical) => identify(canonical.as_str()),
                Err(e) => {
                    tracing::trace!("Hashing {} verbatim, canonicalization failed: {}", url, e);
                    identify(url)
                }
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Canonical => "canonical",
        }
    }
}
