// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, normalize_email, require_max_chars, require_non_empty};

#[test]
fn test_require_non_empty_trims() {
    let value = require_non_empty("subject", "  hello  ").expect("non-empty value");
    assert_eq!(value, "hello");
}

#[test]
fn test_require_non_empty_rejects_whitespace() {
    let result = require_non_empty("subject", " \t\n ");
    assert_eq!(result, Err(DomainError::EmptyField { field: "subject" }));
}

#[test]
fn test_require_max_chars_counts_characters_not_bytes() {
    // Four characters, more than four bytes.
    assert!(require_max_chars("comment", "héllo", 5).is_ok());
    assert!(require_max_chars("comment", "héllo!", 5).is_err());
}

#[test]
fn test_normalize_email_lowercases() {
    let email = normalize_email("  Diner@Example.COM ").expect("valid email");
    assert_eq!(email, "diner@example.com");
}

#[test]
fn test_normalize_email_rejects_malformed() {
    for bad in ["", "no-at-sign", "@example.com", "user@", "user@nodot"] {
        assert!(
            matches!(normalize_email(bad), Err(DomainError::InvalidEmail(_))),
            "'{bad}' should be rejected"
        );
    }
}
