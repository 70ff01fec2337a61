use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::eq;
use serde_json::{json, Value};

use payrun_core::{
    AccessToken, AuthGateway, CommandRunner, CoreError, OutputStore, PaymentsGateway,
    Provisioner, RequestPayload, RestMethod,
};
use payrun_dsl::{parse_command_file, parse_setup_file, UserCredentials};

mock! {
    Auth {}

    #[async_trait]
    impl AuthGateway for Auth {
        async fn token_for(&self, user: &UserCredentials) -> Result<AccessToken, CoreError>;
        async fn register_user<'a>(
            &self,
            id: &str,
            password: &str,
            display_name: Option<&'a str>,
        ) -> Result<(), CoreError>;
        async fn health(&self) -> Result<(), CoreError>;
    }
}

mock! {
    Payments {}

    #[async_trait]
    impl PaymentsGateway for Payments {
        async fn send_rest(
            &self,
            method: RestMethod,
            path: &str,
            token: &AccessToken,
            payload: &RequestPayload,
        ) -> Result<Value, CoreError>;
        async fn send_graphql(
            &self,
            token: &AccessToken,
            operation: &str,
            document: &str,
            variables: &Value,
        ) -> Result<Value, CoreError>;
        async fn health(&self) -> Result<(), CoreError>;
    }
}

fn healthy_auth() -> MockAuth {
    let mut auth = MockAuth::new();
    auth.expect_health().returning(|| Ok(()));
    auth.expect_token_for()
        .returning(|_| Ok(AccessToken::base("test-token")));
    auth
}

fn healthy_payments() -> MockPayments {
    let mut payments = MockPayments::new();
    payments.expect_health().returning(|| Ok(()));
    payments
}

#[tokio::test]
async fn failed_command_does_not_stop_the_run() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: dep1
        type: deposit
        user: { id: alice@example.com, password: secret }
        parameters: { amount: "100", asset: USD }
      - name: dep2
        type: deposit
        user: { id: alice@example.com, password: secret }
        parameters: { amount: "50", asset: USD }
    "#;
    let file = parse_command_file(yaml).unwrap();

    let auth = healthy_auth();
    let mut payments = healthy_payments();
    let mut call = 0;
    payments.expect_send_rest().times(2).returning(move |_, _, _, _| {
        call += 1;
        if call == 1 {
            Err(CoreError::ServiceError("insufficient funds".to_string()))
        } else {
            Ok(json!({"id": "dep-2", "amount": "50", "status": "success"}))
        }
    });

    let runner = CommandRunner::new(Arc::new(auth), Arc::new(payments));
    let mut store = OutputStore::new();
    let report = runner.execute(&file, &mut store).await.unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.succeeded(), 1);
    assert!(!report.all_succeeded());
    assert!(!report.outcomes[0].success);
    assert!(report.outcomes[1].success);
    assert_eq!(report.outcomes[0].name, "dep1");
    assert_eq!(report.outcomes[1].name, "dep2");
    // Only the successful command stored outputs
    assert_eq!(store.get("dep1_id"), None);
    assert_eq!(store.get("dep2_id"), Some("dep-2"));
}

#[tokio::test]
async fn outputs_chain_between_commands() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: dep1
        type: deposit
        user: { id: alice@example.com, password: secret }
        parameters: { amount: "100", asset: USD }
      - name: tr1
        type: transfer
        user: { id: alice@example.com, password: secret }
        parameters:
          amount: "$dep1.amount"
          asset: USD
          to: bob@example.com
    "#;
    let file = parse_command_file(yaml).unwrap();

    let auth = healthy_auth();
    let mut payments = healthy_payments();

    payments
        .expect_send_rest()
        .with(
            eq(RestMethod::Post),
            eq("/api/v1/deposits"),
            mockall::predicate::always(),
            mockall::predicate::always(),
        )
        .times(1)
        .returning(|_, _, _, _| Ok(json!({"id": "dep-1", "amount": "100", "status": "success"})));

    // The transfer must carry the deposit's stored amount, not the literal
    payments
        .expect_send_rest()
        .withf(|method, path, _, payload| {
            *method == RestMethod::Post
                && path == "/api/v1/transfers"
                && matches!(payload, RequestPayload::Json(body) if body["amount"] == "100")
        })
        .times(1)
        .returning(|_, _, _, _| Ok(json!({"id": "tx-1", "amount": "100", "status": "success"})));

    let runner = CommandRunner::new(Arc::new(auth), Arc::new(payments));
    let mut store = OutputStore::new();
    let report = runner.execute(&file, &mut store).await.unwrap();

    assert!(report.all_succeeded());
    assert_eq!(store.get("tr1_id"), Some("tx-1"));
}

#[tokio::test]
async fn unresolved_reference_fails_the_command_without_a_backend_call() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: tr1
        type: transfer
        user: { id: alice@example.com, password: secret }
        parameters:
          amount: "$ghost.amount"
          asset: USD
          to: bob@example.com
      - name: bal1
        type: balance
        user: { id: alice@example.com, password: secret }
        parameters: { asset: USD }
    "#;
    let file = parse_command_file(yaml).unwrap();

    let auth = healthy_auth();
    let mut payments = healthy_payments();
    // Only the balance command may reach the backend
    payments
        .expect_send_rest()
        .withf(|_, path, _, _| path == "/api/v1/balance")
        .times(1)
        .returning(|_, _, _, _| Ok(json!({"amount": "0", "asset": "USD"})));

    let runner = CommandRunner::new(Arc::new(auth), Arc::new(payments));
    let mut store = OutputStore::new();
    let report = runner.execute(&file, &mut store).await.unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.succeeded(), 1);
    assert!(!report.outcomes[0].success);
    assert!(report.outcomes[0].detail.contains("$ghost.amount"));
}

#[tokio::test]
async fn graphql_commands_dispatch_through_the_graphql_wire() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: grp1
        type: create_group
        user: { id: alice@example.com, password: secret }
        parameters: { name: treasury }
    "#;
    let file = parse_command_file(yaml).unwrap();

    let auth = healthy_auth();
    let mut payments = healthy_payments();
    payments
        .expect_send_graphql()
        .withf(|_, operation, document, variables| {
            operation == "CreateGroup"
                && document.contains("createGroup")
                && variables["name"] == "treasury"
        })
        .times(1)
        .returning(|_, _, _, _| Ok(json!({"createGroup": {"id": "grp-1", "name": "treasury"}})));

    let runner = CommandRunner::new(Arc::new(auth), Arc::new(payments));
    let mut store = OutputStore::new();
    let report = runner.execute(&file, &mut store).await.unwrap();

    assert!(report.all_succeeded());
    assert_eq!(store.get("grp1_id"), Some("grp-1"));
    assert_eq!(store.get("grp1_name"), Some("treasury"));
}

#[tokio::test]
async fn failed_health_check_aborts_before_any_command() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: dep1
        type: deposit
        user: { id: alice@example.com, password: secret }
        parameters: { amount: "100", asset: USD }
    "#;
    let file = parse_command_file(yaml).unwrap();

    let mut auth = MockAuth::new();
    auth.expect_health()
        .returning(|| Err(CoreError::TransportError("connection refused".to_string())));
    let payments = MockPayments::new();

    let runner = CommandRunner::new(Arc::new(auth), Arc::new(payments));
    let mut store = OutputStore::new();
    let result = runner.execute(&file, &mut store).await;

    assert!(matches!(result, Err(CoreError::HealthCheckError(_))));
}

#[tokio::test]
async fn login_failure_is_recorded_and_the_run_continues() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: bal1
        type: balance
        user: { id: mallory@example.com, password: wrong }
        parameters: { asset: USD }
      - name: bal2
        type: balance
        user: { id: alice@example.com, password: secret }
        parameters: { asset: USD }
    "#;
    let file = parse_command_file(yaml).unwrap();

    let mut auth = MockAuth::new();
    auth.expect_health().returning(|| Ok(()));
    auth.expect_token_for().returning(|user| {
        if user.id == "mallory@example.com" {
            Err(CoreError::AuthenticationError("invalid credentials".to_string()))
        } else {
            Ok(AccessToken::base("test-token"))
        }
    });

    let mut payments = healthy_payments();
    payments
        .expect_send_rest()
        .times(1)
        .returning(|_, _, _, _| Ok(json!({"amount": "10", "asset": "USD"})));

    let runner = CommandRunner::new(Arc::new(auth), Arc::new(payments));
    let mut store = OutputStore::new();
    let report = runner.execute(&file, &mut store).await.unwrap();

    assert_eq!(report.succeeded(), 1);
    assert!(!report.outcomes[0].success);
    assert!(report.outcomes[0].detail.contains("invalid credentials"));
}

#[tokio::test(start_paused = true)]
async fn delay_runs_between_commands_but_not_after_the_last() {
    let yaml = r#"
    version: "1.0"
    commands:
      - name: bal1
        type: balance
        user: { id: alice@example.com, password: secret }
        parameters: { asset: USD }
      - name: bal2
        type: balance
        user: { id: alice@example.com, password: secret }
        parameters: { asset: USD }
    "#;
    let file = parse_command_file(yaml).unwrap();

    let auth = healthy_auth();
    let mut payments = healthy_payments();
    payments
        .expect_send_rest()
        .times(2)
        .returning(|_, _, _, _| Ok(json!({"amount": "10", "asset": "USD"})));

    let runner = CommandRunner::new(Arc::new(auth), Arc::new(payments))
        .with_delay(Duration::from_secs(5));
    let mut store = OutputStore::new();

    // With the clock paused, elapsed time is exactly the slept time: one
    // pause between the two commands, none after the last.
    let start = tokio::time::Instant::now();
    let report = runner.execute(&file, &mut store).await.unwrap();

    assert!(report.all_succeeded());
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[tokio::test]
async fn provisioner_continues_past_failed_items() {
    let yaml = r#"
    version: "1.0"
    users:
      - id: alice@example.com
        password: secret
      - id: bob@example.com
        password: hunter2
    groups:
      - name: treasury
        owner: alice@example.com
        members: [bob@example.com]
    "#;
    let setup = parse_setup_file(yaml).unwrap();

    let mut auth = MockAuth::new();
    auth.expect_health().returning(|| Ok(()));
    auth.expect_register_user().returning(|id, _, _| {
        if id == "bob@example.com" {
            Err(CoreError::ServiceError("already exists".to_string()))
        } else {
            Ok(())
        }
    });
    auth.expect_token_for()
        .returning(|_| Ok(AccessToken::base("test-token")));

    let mut payments = healthy_payments();
    payments
        .expect_send_graphql()
        .withf(|_, operation, _, _| operation == "CreateGroup")
        .times(1)
        .returning(|_, _, _, _| Ok(json!({"createGroup": {"id": "grp-1", "name": "treasury"}})));
    payments
        .expect_send_graphql()
        .withf(|_, operation, _, variables| {
            operation == "AddGroupMember" && variables["groupId"] == "grp-1"
        })
        .times(1)
        .returning(|_, _, _, _| {
            Ok(json!({"addGroupMember": {"groupId": "grp-1", "memberId": "usr-2"}}))
        });

    let provisioner = Provisioner::new(Arc::new(auth), Arc::new(payments));
    let report = provisioner.provision(&setup).await.unwrap();

    // Two users (one failed) plus the group
    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded(), 2);
}
