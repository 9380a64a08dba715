//! Caller identity extraction.
//!
//! The raw value is usually a forwarded-for header: a comma-separated chain
//! of addresses where each proxy appends the hop it saw. Only the left-most
//! entry is used. Later hops are attacker-influenceable, and even the first
//! is a best-effort signal without real authentication.

use std::fmt;

/// Shared bucket for callers that arrive without an identity.
///
/// All unidentified callers compete for one budget.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Normalized caller identity used as the limiter key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Extract the identity from a raw, possibly comma-separated value.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum_core::rate_limit::Identity;
    ///
    /// let identity = Identity::from_forwarded(Some("10.0.0.1, 192.168.1.1"));
    /// assert_eq!(identity.as_str(), "10.0.0.1");
    /// assert!(Identity::from_forwarded(None).is_unknown());
    /// ```
    pub fn from_forwarded(raw: Option<&str>) -> Self {
        let first = raw
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .unwrap_or_default();
        if first.is_empty() {
            Identity(UNKNOWN_IDENTITY.to_string())
        } else {
            Identity(first.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_IDENTITY
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_address() {
        assert_eq!(Identity::from_forwarded(Some("203.0.113.7")).as_str(), "203.0.113.7");
    }

    #[test]
    fn test_first_hop_of_chain() {
        let identity = Identity::from_forwarded(Some("10.0.0.1, 192.168.1.1, 172.16.0.1"));
        assert_eq!(identity.as_str(), "10.0.0.1");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(Identity::from_forwarded(Some("  10.0.0.1  ,x")).as_str(), "10.0.0.1");
    }

    #[test]
    fn test_missing_identity_uses_sentinel() {
        assert!(Identity::from_forwarded(None).is_unknown());
        assert!(Identity::from_forwarded(Some("")).is_unknown());
        assert!(Identity::from_forwarded(Some("   ")).is_unknown());
        assert!(Identity::from_forwarded(Some(" , 10.0.0.1")).is_unknown());
    }

    #[test]
    fn test_display_matches_key() {
        assert_eq!(Identity::from_forwarded(Some("::1")).to_string(), "::1");
    }
}
