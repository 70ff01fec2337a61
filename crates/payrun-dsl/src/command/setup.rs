use serde::{Deserialize, Serialize};

/// A parsed setup file: ordered provisioning items processed before any
/// command run that depends on them.
///
/// Unlike the command file, the top-level keys are per-entity arrays; items
/// are processed section by section in the order below (users first, bank
/// accounts last) and within a section in file order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupFile {
    /// File format version (only "1.0" is supported)
    pub version: String,

    #[serde(default)]
    pub users: Vec<UserDefinition>,

    #[serde(default)]
    pub groups: Vec<GroupDefinition>,

    #[serde(default)]
    pub tokens: Vec<TokenDefinition>,

    #[serde(default)]
    pub assets: Vec<AssetDefinition>,

    #[serde(default)]
    pub bank_accounts: Vec<BankAccountDefinition>,
}

/// A user to register against the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDefinition {
    /// User identifier (email)
    pub id: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A group to create, with its owner and initial members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    /// Email of the user that owns (and authenticates) the creation
    pub owner: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// A long-lived delegation token to mint for a user/group pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDefinition {
    /// Email of the user the token delegates for
    pub user: String,
    /// Group the token is scoped to
    pub group: String,
}

/// An asset to register with the payments service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub symbol: String,
    pub name: String,
    /// Email of the user that authenticates the creation
    pub issuer: String,
    #[serde(default)]
    pub decimals: Option<u8>,
}

/// A bank account to link for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccountDefinition {
    /// Email of the owning user
    pub owner: String,
    pub account_number: String,
    pub routing_number: String,
    #[serde(default)]
    pub label: Option<String>,
}
