//! Table-driven command descriptors.
//!
//! Every command kind maps to one static `CommandDescriptor`: the wire shape
//! (REST path or GraphQL document), a payload builder over the resolved
//! parameters, and the response fields to extract into the output store.
//! One generic dispatch routine in the runner replaces what would otherwise
//! be a per-kind handler function.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::gateway::{RequestPayload, RestMethod};
use payrun_dsl::CommandKind;

/// Parameters of one command after variable substitution
#[derive(Debug, Clone, Default)]
pub struct ResolvedParams {
    values: BTreeMap<String, Value>,
}

impl ResolvedParams {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Required parameter as a string; numbers are coerced
    pub fn require_str(&self, name: &str) -> Result<String, CoreError> {
        match self.values.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(CoreError::ValidationError(format!(
                "Parameter '{}' must be a string, got: {}",
                name, other
            ))),
            None => Err(CoreError::ValidationError(format!(
                "Missing required parameter '{}'",
                name
            ))),
        }
    }

    /// Optional parameter as a string; numbers are coerced
    pub fn optional_str(&self, name: &str) -> Option<String> {
        match self.values.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A response field to extract and store after a command completes
#[derive(Debug, Clone, Copy)]
pub struct OutputField {
    /// Field name; stored under `"{command}_{name}"`
    pub name: &'static str,

    /// JSON pointer into the response body (GraphQL: into the `data` object)
    pub pointer: &'static str,
}

/// Wire shape of a command
#[derive(Debug, Clone, Copy)]
pub enum Wire {
    Rest {
        method: RestMethod,
        path: &'static str,
    },
    GraphQl {
        operation: &'static str,
        document: &'static str,
    },
}

/// Everything the runner needs to execute one command kind
pub struct CommandDescriptor {
    pub kind: CommandKind,
    pub wire: Wire,
    pub build: fn(&ResolvedParams) -> Result<RequestPayload, CoreError>,
    pub outputs: &'static [OutputField],
}

/// Look up the descriptor for a command kind.
pub fn descriptor_for(kind: CommandKind) -> &'static CommandDescriptor {
    DESCRIPTORS
        .iter()
        .find(|descriptor| descriptor.kind == kind)
        .expect("descriptor table covers every CommandKind")
}

// GraphQL operation documents. Variables are serialized by serde_json; no
// string-concatenated bodies and no manual quote escaping.
const SWAP_DOCUMENT: &str = "mutation Swap($fromAsset: String!, $toAsset: String!, $amount: String!, $idempotencyKey: String) { swap(fromAsset: $fromAsset, toAsset: $toAsset, amount: $amount, idempotencyKey: $idempotencyKey) { id fromAmount toAmount status } }";

const QUOTE_SWAP_DOCUMENT: &str = "query QuoteSwap($fromAsset: String!, $toAsset: String!, $amount: String!) { quoteSwap(fromAsset: $fromAsset, toAsset: $toAsset, amount: $amount) { rate toAmount } }";

const CREATE_GROUP_DOCUMENT: &str = "mutation CreateGroup($name: String!) { createGroup(name: $name) { id name } }";

const ADD_GROUP_MEMBER_DOCUMENT: &str = "mutation AddGroupMember($groupId: ID!, $member: String!) { addGroupMember(groupId: $groupId, member: $member) { groupId memberId } }";

const REMOVE_GROUP_MEMBER_DOCUMENT: &str = "mutation RemoveGroupMember($groupId: ID!, $member: String!) { removeGroupMember(groupId: $groupId, member: $member) { groupId memberId } }";

const GROUP_BALANCE_DOCUMENT: &str = "query GroupBalance($groupId: ID!, $asset: String) { groupBalance(groupId: $groupId, asset: $asset) { amount asset } }";

const CREATE_ASSET_DOCUMENT: &str = "mutation CreateAsset($symbol: String!, $name: String!, $decimals: Int) { createAsset(symbol: $symbol, name: $name, decimals: $decimals) { id symbol } }";

const MINT_ASSET_DOCUMENT: &str = "mutation MintAsset($asset: String!, $amount: String!, $to: String) { mintAsset(asset: $asset, amount: $amount, to: $to) { id amount status } }";

fn build_deposit(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    let mut body = Map::new();
    body.insert("amount".to_string(), json!(params.require_str("amount")?));
    body.insert("asset".to_string(), json!(params.require_str("asset")?));
    if let Some(account) = params.optional_str("account") {
        body.insert("account".to_string(), json!(account));
    }
    if let Some(key) = params.optional_str("idempotency_key") {
        body.insert("idempotency_key".to_string(), json!(key));
    }
    Ok(RequestPayload::Json(Value::Object(body)))
}

fn build_withdraw(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    let mut body = Map::new();
    body.insert("amount".to_string(), json!(params.require_str("amount")?));
    body.insert("asset".to_string(), json!(params.require_str("asset")?));
    if let Some(destination) = params.optional_str("destination") {
        body.insert("destination".to_string(), json!(destination));
    }
    if let Some(key) = params.optional_str("idempotency_key") {
        body.insert("idempotency_key".to_string(), json!(key));
    }
    Ok(RequestPayload::Json(Value::Object(body)))
}

fn build_transfer(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    let mut body = Map::new();
    body.insert("amount".to_string(), json!(params.require_str("amount")?));
    body.insert("asset".to_string(), json!(params.require_str("asset")?));
    body.insert("to".to_string(), json!(params.require_str("to")?));
    if let Some(memo) = params.optional_str("memo") {
        body.insert("memo".to_string(), json!(memo));
    }
    if let Some(key) = params.optional_str("idempotency_key") {
        body.insert("idempotency_key".to_string(), json!(key));
    }
    Ok(RequestPayload::Json(Value::Object(body)))
}

fn build_balance(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    let mut query = vec![("asset".to_string(), params.require_str("asset")?)];
    if let Some(account) = params.optional_str("account") {
        query.push(("account".to_string(), account));
    }
    Ok(RequestPayload::Query(query))
}

fn build_account_info(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    let mut query = Vec::new();
    if let Some(account) = params.optional_str("account") {
        query.push(("account".to_string(), account));
    }
    Ok(RequestPayload::Query(query))
}

fn build_transaction_status(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    Ok(RequestPayload::Query(vec![(
        "transaction_id".to_string(),
        params.require_str("transaction_id")?,
    )]))
}

fn build_link_bank_account(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    let mut body = Map::new();
    body.insert(
        "account_number".to_string(),
        json!(params.require_str("account_number")?),
    );
    body.insert(
        "routing_number".to_string(),
        json!(params.require_str("routing_number")?),
    );
    if let Some(label) = params.optional_str("label") {
        body.insert("label".to_string(), json!(label));
    }
    Ok(RequestPayload::Json(Value::Object(body)))
}

fn build_swap(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    Ok(RequestPayload::Json(json!({
        "fromAsset": params.require_str("from_asset")?,
        "toAsset": params.require_str("to_asset")?,
        "amount": params.require_str("amount")?,
        "idempotencyKey": params.optional_str("idempotency_key"),
    })))
}

fn build_quote_swap(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    Ok(RequestPayload::Json(json!({
        "fromAsset": params.require_str("from_asset")?,
        "toAsset": params.require_str("to_asset")?,
        "amount": params.require_str("amount")?,
    })))
}

fn build_create_group(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    Ok(RequestPayload::Json(json!({
        "name": params.require_str("name")?,
    })))
}

fn build_group_member(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    Ok(RequestPayload::Json(json!({
        "groupId": params.require_str("group_id")?,
        "member": params.require_str("member")?,
    })))
}

fn build_group_balance(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    Ok(RequestPayload::Json(json!({
        "groupId": params.require_str("group_id")?,
        "asset": params.optional_str("asset"),
    })))
}

fn build_create_asset(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    let decimals = match params.get("decimals") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse::<u64>().ok(),
        _ => None,
    };
    Ok(RequestPayload::Json(json!({
        "symbol": params.require_str("symbol")?,
        "name": params.require_str("name")?,
        "decimals": decimals,
    })))
}

fn build_mint_asset(params: &ResolvedParams) -> Result<RequestPayload, CoreError> {
    Ok(RequestPayload::Json(json!({
        "asset": params.require_str("asset")?,
        "amount": params.require_str("amount")?,
        "to": params.optional_str("to"),
    })))
}

static DESCRIPTORS: &[CommandDescriptor] = &[
    CommandDescriptor {
        kind: CommandKind::Deposit,
        wire: Wire::Rest {
            method: RestMethod::Post,
            path: "/api/v1/deposits",
        },
        build: build_deposit,
        outputs: &[
            OutputField { name: "id", pointer: "/id" },
            OutputField { name: "amount", pointer: "/amount" },
            OutputField { name: "status", pointer: "/status" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::Withdraw,
        wire: Wire::Rest {
            method: RestMethod::Post,
            path: "/api/v1/withdrawals",
        },
        build: build_withdraw,
        outputs: &[
            OutputField { name: "id", pointer: "/id" },
            OutputField { name: "amount", pointer: "/amount" },
            OutputField { name: "status", pointer: "/status" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::Transfer,
        wire: Wire::Rest {
            method: RestMethod::Post,
            path: "/api/v1/transfers",
        },
        build: build_transfer,
        outputs: &[
            OutputField { name: "id", pointer: "/id" },
            OutputField { name: "amount", pointer: "/amount" },
            OutputField { name: "status", pointer: "/status" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::Balance,
        wire: Wire::Rest {
            method: RestMethod::Get,
            path: "/api/v1/balance",
        },
        build: build_balance,
        outputs: &[
            OutputField { name: "amount", pointer: "/amount" },
            OutputField { name: "asset", pointer: "/asset" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::AccountInfo,
        wire: Wire::Rest {
            method: RestMethod::Get,
            path: "/api/v1/account",
        },
        build: build_account_info,
        outputs: &[
            OutputField { name: "id", pointer: "/id" },
            OutputField { name: "owner", pointer: "/owner" },
            OutputField { name: "status", pointer: "/status" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::TransactionStatus,
        wire: Wire::Rest {
            method: RestMethod::Get,
            path: "/api/v1/transactions",
        },
        build: build_transaction_status,
        outputs: &[
            OutputField { name: "id", pointer: "/id" },
            OutputField { name: "status", pointer: "/status" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::LinkBankAccount,
        wire: Wire::Rest {
            method: RestMethod::Post,
            path: "/api/v1/bank-accounts",
        },
        build: build_link_bank_account,
        outputs: &[
            OutputField { name: "id", pointer: "/id" },
            OutputField { name: "status", pointer: "/status" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::Swap,
        wire: Wire::GraphQl {
            operation: "Swap",
            document: SWAP_DOCUMENT,
        },
        build: build_swap,
        outputs: &[
            OutputField { name: "id", pointer: "/swap/id" },
            OutputField { name: "from_amount", pointer: "/swap/fromAmount" },
            OutputField { name: "to_amount", pointer: "/swap/toAmount" },
            OutputField { name: "status", pointer: "/swap/status" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::QuoteSwap,
        wire: Wire::GraphQl {
            operation: "QuoteSwap",
            document: QUOTE_SWAP_DOCUMENT,
        },
        build: build_quote_swap,
        outputs: &[
            OutputField { name: "rate", pointer: "/quoteSwap/rate" },
            OutputField { name: "to_amount", pointer: "/quoteSwap/toAmount" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::CreateGroup,
        wire: Wire::GraphQl {
            operation: "CreateGroup",
            document: CREATE_GROUP_DOCUMENT,
        },
        build: build_create_group,
        outputs: &[
            OutputField { name: "id", pointer: "/createGroup/id" },
            OutputField { name: "name", pointer: "/createGroup/name" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::AddGroupMember,
        wire: Wire::GraphQl {
            operation: "AddGroupMember",
            document: ADD_GROUP_MEMBER_DOCUMENT,
        },
        build: build_group_member,
        outputs: &[
            OutputField { name: "group_id", pointer: "/addGroupMember/groupId" },
            OutputField { name: "member_id", pointer: "/addGroupMember/memberId" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::RemoveGroupMember,
        wire: Wire::GraphQl {
            operation: "RemoveGroupMember",
            document: REMOVE_GROUP_MEMBER_DOCUMENT,
        },
        build: build_group_member,
        outputs: &[
            OutputField { name: "group_id", pointer: "/removeGroupMember/groupId" },
            OutputField { name: "member_id", pointer: "/removeGroupMember/memberId" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::GroupBalance,
        wire: Wire::GraphQl {
            operation: "GroupBalance",
            document: GROUP_BALANCE_DOCUMENT,
        },
        build: build_group_balance,
        outputs: &[
            OutputField { name: "amount", pointer: "/groupBalance/amount" },
            OutputField { name: "asset", pointer: "/groupBalance/asset" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::CreateAsset,
        wire: Wire::GraphQl {
            operation: "CreateAsset",
            document: CREATE_ASSET_DOCUMENT,
        },
        build: build_create_asset,
        outputs: &[
            OutputField { name: "id", pointer: "/createAsset/id" },
            OutputField { name: "symbol", pointer: "/createAsset/symbol" },
        ],
    },
    CommandDescriptor {
        kind: CommandKind::MintAsset,
        wire: Wire::GraphQl {
            operation: "MintAsset",
            document: MINT_ASSET_DOCUMENT,
        },
        build: build_mint_asset,
        outputs: &[
            OutputField { name: "id", pointer: "/mintAsset/id" },
            OutputField { name: "amount", pointer: "/mintAsset/amount" },
            OutputField { name: "status", pointer: "/mintAsset/status" },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(entries: &[(&str, Value)]) -> ResolvedParams {
        ResolvedParams::new(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_every_kind_has_a_descriptor() {
        for kind in CommandKind::ALL {
            let descriptor = descriptor_for(*kind);
            assert_eq!(descriptor.kind, *kind);
            assert!(!descriptor.outputs.is_empty());
        }
    }

    #[test]
    fn test_deposit_payload() {
        let payload = (descriptor_for(CommandKind::Deposit).build)(&params(&[
            ("amount", json!("100")),
            ("asset", json!("USD")),
            ("idempotency_key", json!("key-1")),
        ]))
        .unwrap();

        match payload {
            RequestPayload::Json(body) => {
                assert_eq!(body["amount"], "100");
                assert_eq!(body["asset"], "USD");
                assert_eq!(body["idempotency_key"], "key-1");
            }
            other => panic!("Expected Json payload, got {:?}", other),
        }
    }

    #[test]
    fn test_deposit_missing_amount_rejected() {
        let result =
            (descriptor_for(CommandKind::Deposit).build)(&params(&[("asset", json!("USD"))]));
        match result {
            Err(CoreError::ValidationError(msg)) => assert!(msg.contains("amount")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_amount_coerced() {
        let payload = (descriptor_for(CommandKind::Deposit).build)(&params(&[
            ("amount", json!(100)),
            ("asset", json!("USD")),
        ]))
        .unwrap();

        match payload {
            RequestPayload::Json(body) => assert_eq!(body["amount"], "100"),
            other => panic!("Expected Json payload, got {:?}", other),
        }
    }

    #[test]
    fn test_balance_builds_query_string() {
        let payload =
            (descriptor_for(CommandKind::Balance).build)(&params(&[("asset", json!("USD"))]))
                .unwrap();

        assert_eq!(
            payload,
            RequestPayload::Query(vec![("asset".to_string(), "USD".to_string())])
        );
    }

    #[test]
    fn test_swap_variables() {
        let payload = (descriptor_for(CommandKind::Swap).build)(&params(&[
            ("from_asset", json!("USD")),
            ("to_asset", json!("EUR")),
            ("amount", json!("50")),
        ]))
        .unwrap();

        match payload {
            RequestPayload::Json(variables) => {
                assert_eq!(variables["fromAsset"], "USD");
                assert_eq!(variables["toAsset"], "EUR");
                assert_eq!(variables["amount"], "50");
                assert!(variables["idempotencyKey"].is_null());
            }
            other => panic!("Expected Json payload, got {:?}", other),
        }
    }

    #[test]
    fn test_graphql_wire_carries_operation() {
        match descriptor_for(CommandKind::CreateGroup).wire {
            Wire::GraphQl { operation, document } => {
                assert_eq!(operation, "CreateGroup");
                assert!(document.contains("createGroup"));
            }
            _ => panic!("create_group should be GraphQL"),
        }
    }
}
