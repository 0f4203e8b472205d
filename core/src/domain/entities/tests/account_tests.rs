//! Unit tests for account entities

use crate::domain::entities::account::{Account, Role};

#[test]
fn test_role_parsing() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("Owner".parse::<Role>().unwrap(), Role::Owner);
    assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
    assert!("guest".parse::<Role>().is_err());
}

#[test]
fn test_role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
}

#[test]
fn test_account_debug_hides_hash() {
    let account = Account::new("r-1", "$2b$04$secrethash", Role::Owner);
    let rendered = format!("{:?}", account);
    assert!(rendered.contains("r-1"));
    assert!(!rendered.contains("secrethash"));
}
