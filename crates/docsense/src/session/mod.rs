//! Session-scoped document state

mod store;

pub use store::{IngestOutcome, SessionIndex, SessionStore, SessionView};

use crate::error::{Error, Result};

/// Session id used when a request does not name one
pub const DEFAULT_SESSION_ID: &str = "default";

/// Longest accepted session id, in bytes
pub const MAX_SESSION_ID_LEN: usize = 256;

/// Session ids are opaque but must be non-empty, bounded and free of
/// control characters. They are compared exactly (no trimming or case folding).
pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(Error::invalid_input("session id must not be empty"));
    }
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(Error::invalid_input(format!(
            "session id longer than {} bytes",
            MAX_SESSION_ID_LEN
        )));
    }
    if session_id.chars().any(char::is_control) {
        return Err(Error::invalid_input("session id contains control characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("default").is_ok());
        assert!(validate_session_id(" spaced id ").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("tab\there").is_err());
        assert!(validate_session_id(&"x".repeat(MAX_SESSION_ID_LEN)).is_ok());
        assert!(validate_session_id(&"x".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }
}
