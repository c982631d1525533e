use std::fmt;

/// Machine-readable error codes for callers that render or branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    NodeNotFound,
    NoChildSelected,
    ChildAlreadyHasParent,
    SelfParenting,
    CycleWouldForm,
    CorruptHierarchy,
    StoreWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::NodeNotFound => "E2001",
            Self::NoChildSelected => "E2002",
            Self::ChildAlreadyHasParent => "E2003",
            Self::SelfParenting => "E2004",
            Self::CycleWouldForm => "E2005",
            Self::CorruptHierarchy => "E3001",
            Self::StoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::NodeNotFound => "Node not found",
            Self::NoChildSelected => "No child selected",
            Self::ChildAlreadyHasParent => "Child already has a parent",
            Self::SelfParenting => "Node cannot be its own parent",
            Self::CycleWouldForm => "Cycle would be created",
            Self::CorruptHierarchy => "Existing hierarchy is not a forest",
            Self::StoreWriteFailed => "Store write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `horilla-hier init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .horilla/config.toml and retry."),
            Self::NodeNotFound | Self::SelfParenting => None,
            Self::NoChildSelected => Some("Pick a child before submitting."),
            Self::ChildAlreadyHasParent => {
                Some("Detach the child first, or set hierarchy.reparent = \"detach\".")
            }
            Self::CycleWouldForm => Some("Pick a parent outside the child's own subtree."),
            Self::CorruptHierarchy => {
                Some("Run `horilla-hier check` and detach one node on each reported cycle.")
            }
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other writer commits."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
