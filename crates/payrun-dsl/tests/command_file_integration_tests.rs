use payrun_dsl::{
    parse_and_validate_command_file, parse_and_validate_setup_file, CommandKind, DslError,
};
use pretty_assertions::assert_eq;

#[test]
fn parses_a_full_command_file() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: dep1
        type: deposit
        description: Seed alice's account
        user:
          id: alice@example.com
          password: secret
        parameters:
          amount: "250"
          asset: USD
      - name: grp1
        type: create_group
        user:
          id: alice@example.com
          password: secret
        parameters:
          name: treasury
      - name: member1
        type: add_group_member
        user:
          id: alice@example.com
          password: secret
          group: treasury
        parameters:
          group_id: "$grp1.id"
          member: bob@example.com
      - name: swap1
        type: swap
        user:
          id: alice@example.com
          password: secret
        parameters:
          from_asset: USD
          to_asset: EUR
          amount: "$dep1.amount"
      - name: status1
        type: transaction_status
        user:
          id: alice@example.com
          password: secret
        parameters:
          transaction_id: "$swap1.id"
    "#;

    let file = parse_and_validate_command_file(yaml).expect("valid file");
    assert_eq!(file.commands.len(), 5);

    let kinds: Vec<CommandKind> = file.commands.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CommandKind::Deposit,
            CommandKind::CreateGroup,
            CommandKind::AddGroupMember,
            CommandKind::Swap,
            CommandKind::TransactionStatus,
        ]
    );

    let member = &file.commands[2];
    assert_eq!(member.user.group.as_deref(), Some("treasury"));
    assert_eq!(
        member.parameters.get("group_id").and_then(|v| v.as_str()),
        Some("$grp1.id")
    );
}

#[test]
fn rejects_unknown_command_type() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: bad
        type: teleport
        user:
          id: alice@example.com
          password: secret
    "#;

    let err = parse_and_validate_command_file(yaml).unwrap_err();
    assert!(matches!(err, DslError::YamlError(_)));
}

#[test]
fn collects_multiple_validation_errors() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: dup
        type: deposit
        user:
          id: alice@example.com
          password: secret
      - name: dup
        type: deposit
        user:
          id: ""
          password: secret
    "#;

    let err = parse_and_validate_command_file(yaml).unwrap_err();
    match err {
        DslError::MultipleValidationErrors(errors) => assert_eq!(errors.len(), 2),
        other => panic!("Expected MultipleValidationErrors, got {:?}", other),
    }
}

#[test]
fn parses_a_full_setup_file() {
    let yaml = r#"
    version: "1.0"
    users:
      - id: alice@example.com
        password: secret
        display_name: Alice
      - id: bob@example.com
        password: hunter2
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
        decimals: 2
    bank_accounts:
      - owner: alice@example.com
        account_number: "12345678"
        routing_number: "021000021"
        label: primary
    "#;

    let setup = parse_and_validate_setup_file(yaml).expect("valid setup");
    assert_eq!(setup.users.len(), 2);
    assert_eq!(setup.groups[0].members, vec!["bob@example.com"]);
    assert_eq!(setup.assets[0].decimals, Some(2));
}
