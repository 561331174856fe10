// ABOUTME: Tenant name validation against the lowercase alphanumeric pattern
// ABOUTME: Also answers whether a name belongs to a reserved system tenant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::tenant_names::{PATTERN, PROTECTED};
use crate::errors::{AppError, AppResult};

const INVALID_NAME: &str = "Tenant name must be 3-30 lowercase letters or digits with no spaces.";

fn name_pattern() -> Option<&'static Regex> {
    static NAME: OnceLock<Option<Regex>> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(PATTERN).ok()).as_ref()
}

/// Check a user-supplied tenant name
///
/// Names are taken as given: no trimming or case folding.
///
/// # Errors
///
/// Returns `InvalidInput` unless the name is 3-30 lowercase letters or digits
pub fn validate_tenant_name(name: &str) -> AppResult<()> {
    let valid = match name_pattern() {
        Some(pattern) => pattern.is_match(name),
        None => {
            (3..=30).contains(&name.len())
                && name
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        }
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_input(INVALID_NAME))
    }
}

/// Whether `name` is a reserved system tenant that can never be removed
#[must_use]
pub fn is_protected(name: &str) -> bool {
    PROTECTED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn accepts_lowercase_alphanumerics() {
        for name in ["acme", "abc", "tenant42", "123", &"a".repeat(30)] {
            assert!(validate_tenant_name(name).is_ok(), "rejected {name:?}");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "",
            "ab",
            "Acme",
            "ac me",
            " acme",
            "acme-corp",
            "acme_corp",
            "ácme",
            &"a".repeat(31),
        ] {
            let error = validate_tenant_name(name).unwrap_err();
            assert_eq!(error.code, ErrorCode::InvalidInput, "{name:?}");
            assert_eq!(error.message, INVALID_NAME);
        }
    }

    #[test]
    fn reserved_names_are_protected() {
        assert!(is_protected("freeflow"));
        assert!(is_protected("system"));
        assert!(!is_protected("acme"));
        assert!(!is_protected("System"));
    }
}
