// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Role};
use std::str::FromStr;

#[test]
fn test_role_string_round_trip() {
    for role in [Role::Customer, Role::Staff, Role::Admin] {
        let parsed = Role::from_str(role.as_str()).expect("role strings must round-trip");
        assert_eq!(role, parsed);
    }
}

#[test]
fn test_invalid_role_rejected() {
    for bad in ["manager", "Admin", "STAFF", ""] {
        let result = Role::from_str(bad);
        assert_eq!(result, Err(DomainError::InvalidRole(bad.to_string())));
    }
}

#[test]
fn test_agent_roles() {
    assert!(!Role::Customer.is_agent());
    assert!(Role::Staff.is_agent());
    assert!(Role::Admin.is_agent());
}
