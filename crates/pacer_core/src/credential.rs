//! API credentials attached to authenticated requests.

use serde::{Deserialize, Serialize};

/// Header name and value attached to authenticated requests.
///
/// The value is redacted from `Debug` output.
///
/// # Examples
///
/// ```
/// use pacer_core::Credential;
///
/// let credential = Credential::new("API-Key", "secret");
/// assert_eq!(credential.header(), "API-Key");
/// assert!(!format!("{:?}", credential).contains("secret"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct Credential {
    /// Header the key is sent under.
    header: String,
    /// The key itself.
    value: String,
}

impl Credential {
    /// Create a credential sent as `header: value`.
    pub fn new(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}
