use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod setup;

pub use setup::{
    AssetDefinition, BankAccountDefinition, GroupDefinition, SetupFile, TokenDefinition,
    UserDefinition,
};

/// A parsed command file: an ordered list of commands executed strictly in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandFile {
    /// File format version (only "1.0" is supported)
    pub version: String,

    /// Commands in execution order
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
}

/// Definition of a single command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Unique name of the command; output fields are stored under "{name}_{field}"
    pub name: String,

    /// The command type, which selects the request descriptor
    #[serde(rename = "type")]
    pub kind: CommandKind,

    /// Credentials of the user the command runs as
    pub user: UserCredentials,

    /// Command parameters; string values may be `$command.field` references
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,

    /// Optional human-readable description
    #[serde(default)]
    pub description: Option<String>,
}

/// Credentials used to authenticate a command against the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    /// User identifier (email)
    pub id: String,

    /// Password for the login call
    pub password: String,

    /// Optional group name; when set, the base token is exchanged for a
    /// delegation token scoped to this group
    #[serde(default)]
    pub group: Option<String>,
}

/// All supported command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Deposit,
    Withdraw,
    Transfer,
    Balance,
    AccountInfo,
    TransactionStatus,
    LinkBankAccount,
    Swap,
    QuoteSwap,
    CreateGroup,
    AddGroupMember,
    RemoveGroupMember,
    GroupBalance,
    CreateAsset,
    MintAsset,
}

impl CommandKind {
    /// All known kinds, in a stable order
    pub const ALL: &'static [CommandKind] = &[
        CommandKind::Deposit,
        CommandKind::Withdraw,
        CommandKind::Transfer,
        CommandKind::Balance,
        CommandKind::AccountInfo,
        CommandKind::TransactionStatus,
        CommandKind::LinkBankAccount,
        CommandKind::Swap,
        CommandKind::QuoteSwap,
        CommandKind::CreateGroup,
        CommandKind::AddGroupMember,
        CommandKind::RemoveGroupMember,
        CommandKind::GroupBalance,
        CommandKind::CreateAsset,
        CommandKind::MintAsset,
    ];

    /// The snake_case name used in YAML `type` fields
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Deposit => "deposit",
            CommandKind::Withdraw => "withdraw",
            CommandKind::Transfer => "transfer",
            CommandKind::Balance => "balance",
            CommandKind::AccountInfo => "account_info",
            CommandKind::TransactionStatus => "transaction_status",
            CommandKind::LinkBankAccount => "link_bank_account",
            CommandKind::Swap => "swap",
            CommandKind::QuoteSwap => "quote_swap",
            CommandKind::CreateGroup => "create_group",
            CommandKind::AddGroupMember => "add_group_member",
            CommandKind::RemoveGroupMember => "remove_group_member",
            CommandKind::GroupBalance => "group_balance",
            CommandKind::CreateAsset => "create_asset",
            CommandKind::MintAsset => "mint_asset",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
