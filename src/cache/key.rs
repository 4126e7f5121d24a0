//! Cache key derivation.

use std::fmt;

use crate::types::OutputFormat;

/// Prefix shared by every cache entry name.
pub const KEY_PREFIX: &str = "thumb-";

/// Derive the cache file name for a locator and format extension.
///
/// `"thumb-" + lowercase hex md5(locator) + "." + format`. Pure and total:
/// an empty locator hashes like any other input.
///
/// ```rust
/// # use vidthumb::cache::derive_key;
/// assert_eq!(
///     derive_key("", "jpeg"),
///     "thumb-d41d8cd98f00b204e9800998ecf8427e.jpeg"
/// );
/// ```
pub fn derive_key(locator: &str, format: &str) -> String {
    let digest = md5::compute(locator.as_bytes());
    format!("{KEY_PREFIX}{digest:x}.{format}")
}

/// A derived cache entry name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    format: OutputFormat,
}

impl CacheKey {
    /// Key for a locator in the given output format.
    pub fn derive(locator: &str, format: OutputFormat) -> Self {
        Self {
            name: derive_key(locator, format.extension()),
            format,
        }
    }

    /// File name of the entry under the cache root.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Encoding the entry is stored in.
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
