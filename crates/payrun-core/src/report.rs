use uuid::Uuid;

/// Result of one command or provisioning item
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Command name (or setup item label)
    pub name: String,

    /// Command type label
    pub kind: String,

    /// Whether the command succeeded
    pub success: bool,

    /// Human-readable detail: stored outputs on success, the error otherwise
    pub detail: String,
}

impl CommandOutcome {
    pub fn success(name: impl Into<String>, kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failure(name: impl Into<String>, kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            success: false,
            detail: detail.into(),
        }
    }
}

/// Tally of one run: every command in file order with its outcome
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Unique id for this run
    pub run_id: Uuid,

    /// Per-command outcomes in execution order
    pub outcomes: Vec<CommandOutcome>,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: CommandOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }
}

impl Default for ExecutionReport {
    fn default() -> Self {
        Self::new()
    }
}
