//! # Credentials
//!
//! Passwords are reduced to a checksum with a 31-multiplier rolling hash over
//! the password bytes, printed as lowercase hex. It keeps plain text out of the
//! credential files and nothing more: it is not salted, not slow, and trivially
//! reversible by brute force. Do not reuse real passwords here.
//!
//! Failed logins are tracked per account in the lockouts file so a lock holds
//! across runs of the program. See [`crate::commands::auth`].

use crate::config::DepotConfig;
use crate::model::Role;
use chrono::Duration;

/// Bytes are folded as signed values sign-extended to 64 bits, which is how
/// existing credential files hash non-ASCII passwords.
pub fn checksum(password: &str) -> String {
    let hash = password
        .bytes()
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(b as i8 as u64));
    format!("{:x}", hash)
}

/// Key for an account in the lockouts file.
pub fn account_key(role: Role, username: &str) -> String {
    format!("{}:{}", role, username)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::from_config(&DepotConfig::default())
    }
}

impl LockoutPolicy {
    pub fn from_config(config: &DepotConfig) -> Self {
        Self {
            max_failed_attempts: config.max_failed_attempts.max(1),
            lock_duration: Duration::minutes(config.lockout_minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable() {
        assert_eq!(checksum(""), "0");
        // 'a' = 97 = 0x61
        assert_eq!(checksum("a"), "61");
        // 97 * 31 + 98 = 3105 = 0xc21
        assert_eq!(checksum("ab"), "c21");
        assert_eq!(checksum("hunter2"), checksum("hunter2"));
        assert_ne!(checksum("hunter2"), checksum("hunter3"));
    }

    #[test]
    fn non_ascii_bytes_are_sign_extended() {
        // "é" is 0xC3 0xA9, folded as -61 and -87
        assert_eq!(checksum("é"), "fffffffffffff846");
    }

    #[test]
    fn long_passwords_wrap_instead_of_overflowing() {
        let long = "x".repeat(500);
        assert!(!checksum(&long).is_empty());
    }

    #[test]
    fn policy_from_config() {
        let mut config = DepotConfig::default();
        config.lockout_minutes = 5;
        let policy = LockoutPolicy::from_config(&config);
        assert_eq!(policy.max_failed_attempts, 3);
        assert_eq!(policy.lock_duration, Duration::minutes(5));
    }

    #[test]
    fn account_keys_are_scoped_by_role() {
        assert_ne!(
            account_key(Role::Admin, "sam"),
            account_key(Role::Customer, "sam")
        );
    }
}
