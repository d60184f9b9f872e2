use std::fmt;

/// API key wrapper that never prints its contents.
///
/// `Debug` and `Display` both render `[REDACTED]`; call [`SecretString::unsecure`]
/// only where the raw value goes on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Raw value, for the Authorization header
    pub fn unsecure(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted_in_output() {
        let secret = SecretString::new("sk-live-value");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.unsecure(), "sk-live-value");
    }
}
