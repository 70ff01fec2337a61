use std::collections::HashSet;

use super::{error_codes, ValidationError};
use crate::command::SetupFile;

/// Validate a setup file: users are unique, and every owner/member/issuer
/// email mentioned by later sections names a user from the `users` section.
pub fn validate(file: &SetupFile) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut user_ids: HashSet<&str> = HashSet::new();
    for (index, user) in file.users.iter().enumerate() {
        if user.id.trim().is_empty() {
            errors.push(ValidationError {
                code: error_codes::INVALID_SETUP_ITEM,
                message: "User id must not be empty".to_string(),
                path: Some(format!("users[{}]", index)),
            });
            continue;
        }
        if !user_ids.insert(user.id.as_str()) {
            errors.push(ValidationError {
                code: error_codes::INVALID_SETUP_ITEM,
                message: format!("Duplicate user id: {}", user.id),
                path: Some(format!("users[{}]", index)),
            });
        }
    }

    let mut check_user = |email: &str, path: String, errors: &mut Vec<ValidationError>| {
        if !user_ids.contains(email) {
            errors.push(ValidationError {
                code: error_codes::INVALID_SETUP_ITEM,
                message: format!("References unknown user: {}", email),
                path: Some(path),
            });
        }
    };

    let mut group_names: HashSet<&str> = HashSet::new();
    for (index, group) in file.groups.iter().enumerate() {
        if !group_names.insert(group.name.as_str()) {
            errors.push(ValidationError {
                code: error_codes::INVALID_SETUP_ITEM,
                message: format!("Duplicate group name: {}", group.name),
                path: Some(format!("groups[{}]", index)),
            });
        }
        check_user(&group.owner, format!("groups[{}].owner", index), &mut errors);
        for (m, member) in group.members.iter().enumerate() {
            check_user(member, format!("groups[{}].members[{}]", index, m), &mut errors);
        }
    }

    for (index, token) in file.tokens.iter().enumerate() {
        check_user(&token.user, format!("tokens[{}].user", index), &mut errors);
        if !group_names.contains(token.group.as_str()) {
            errors.push(ValidationError {
                code: error_codes::INVALID_SETUP_ITEM,
                message: format!("Token references unknown group: {}", token.group),
                path: Some(format!("tokens[{}].group", index)),
            });
        }
    }

    for (index, asset) in file.assets.iter().enumerate() {
        check_user(&asset.issuer, format!("assets[{}].issuer", index), &mut errors);
        if asset.symbol.trim().is_empty() {
            errors.push(ValidationError {
                code: error_codes::INVALID_SETUP_ITEM,
                message: "Asset symbol must not be empty".to_string(),
                path: Some(format!("assets[{}]", index)),
            });
        }
    }

    for (index, account) in file.bank_accounts.iter().enumerate() {
        check_user(
            &account.owner,
            format!("bank_accounts[{}].owner", index),
            &mut errors,
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SetupFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_setup_passes() {
        let setup = parse(
            r#"
            version: "1.0"
            users:
              - id: alice@example.com
                password: secret
              - id: bob@example.com
                password: secret
            groups:
              - name: treasury
                owner: alice@example.com
                members: [bob@example.com]
            tokens:
              - user: bob@example.com
                group: treasury
            assets:
              - symbol: USD
                name: US Dollar
                issuer: alice@example.com
            bank_accounts:
              - owner: alice@example.com
                account_number: "12345678"
                routing_number: "021000021"
            "#,
        );
        assert!(validate(&setup).is_empty());
    }

    #[test]
    fn test_unknown_owner_rejected() {
        let setup = parse(
            r#"
            version: "1.0"
            users:
              - id: alice@example.com
                password: secret
            groups:
              - name: treasury
                owner: ghost@example.com
            "#,
        );
        let errors = validate(&setup);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, error_codes::INVALID_SETUP_ITEM);
        assert!(errors[0].message.contains("ghost@example.com"));
    }

    #[test]
    fn test_token_for_unknown_group_rejected() {
        let setup = parse(
            r#"
            version: "1.0"
            users:
              - id: alice@example.com
                password: secret
            tokens:
              - user: alice@example.com
                group: nonexistent
            "#,
        );
        let errors = validate(&setup);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("nonexistent"));
    }

    #[test]
    fn test_duplicate_users_rejected() {
        let setup = parse(
            r#"
            version: "1.0"
            users:
              - id: alice@example.com
                password: secret
              - id: alice@example.com
                password: other
            "#,
        );
        let errors = validate(&setup);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Duplicate user id"));
    }
}
