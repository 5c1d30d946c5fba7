//! Credentials: the hub base URL and the bearer token presented to it.
//!
//! Credentials are all-or-nothing: a value of this type always carries both a
//! non-empty base URL and a non-empty token. Partial input is represented as
//! "no credentials" (`None`) by [`Credentials::from_parts`].

use std::fmt;

/// Hub base URL plus bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: String,
    token: String,
}

impl Credentials {
    /// Build credentials from user input.
    ///
    /// Surrounding whitespace is trimmed from both parts and trailing slashes
    /// are stripped from the base URL. Returns `None` when either part ends
    /// up empty.
    #[must_use]
    pub fn from_parts(base_url: &str, token: &str) -> Option<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        let token = token.trim();
        if base_url.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self {
            base_url: base_url.to_string(),
            token: token.to_string(),
        })
    }

    /// Base URL without trailing slash (e.g. `http://192.168.0.3:8123`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_credentials_when_both_parts_present() {
        let creds = Credentials::from_parts("http://h", "t").unwrap();
        assert_eq!(creds.base_url(), "http://h");
        assert_eq!(creds.token(), "t");
    }

    #[test]
    fn should_return_none_when_token_missing() {
        assert!(Credentials::from_parts("http://h", "").is_none());
        assert!(Credentials::from_parts("http://h", "   ").is_none());
    }

    #[test]
    fn should_return_none_when_base_url_missing() {
        assert!(Credentials::from_parts("", "t").is_none());
        assert!(Credentials::from_parts("/", "t").is_none());
    }

    #[test]
    fn should_strip_trailing_slash_and_whitespace() {
        let creds = Credentials::from_parts(" http://192.168.0.3:8123/ ", " abc\n").unwrap();
        assert_eq!(creds.base_url(), "http://192.168.0.3:8123");
        assert_eq!(creds.token(), "abc");
    }

    #[test]
    fn should_format_bearer_header() {
        let creds = Credentials::from_parts("http://h", "t").unwrap();
        assert_eq!(creds.bearer(), "Bearer t");
    }

    #[test]
    fn should_redact_token_in_debug_output() {
        let creds = Credentials::from_parts("http://h", "super-secret").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("http://h"));
        assert!(!debug.contains("super-secret"));
    }
}
