use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! node_kinds {
    ( $( $variant:ident => $name:literal ),* $(,)? ) => {
        /// The closed set of constructs a flow node can represent.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeKind {
            $( #[serde(rename = $name)] $variant, )*
        }

        impl NodeKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[ $( NodeKind::$variant, )* ];

            /// The wire name of the kind, e.g. `REMOTE_ACTION_CALL`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant => $name, )*
                }
            }
        }

        impl FromStr for NodeKind {
            type Err = UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(NodeKind::$variant), )*
                    other => Err(UnknownKind(other.to_string())),
                }
            }
        }
    };
}

node_kinds! {
    EventStart => "EVENT_START",
    If => "IF",
    Match => "MATCH",
    While => "WHILE",
    Foreach => "FOREACH",
    Break => "BREAK",
    Continue => "CONTINUE",
    Return => "RETURN",
    Panic => "PANIC",
    Fail => "FAIL",
    Stop => "STOP",
    Expression => "EXPRESSION",
    Variable => "VARIABLE",
    Assign => "ASSIGN",
    ConfigVariable => "CONFIG_VARIABLE",
    Comment => "COMMENT",
    ErrorHandler => "ERROR_HANDLER",
    Lock => "LOCK",
    Transaction => "TRANSACTION",
    Retry => "RETRY",
    Commit => "COMMIT",
    Rollback => "ROLLBACK",
    Start => "START",
    Wait => "WAIT",
    Fork => "FORK",
    ParallelFlow => "PARALLEL_FLOW",
    FunctionCall => "FUNCTION_CALL",
    MethodCall => "METHOD_CALL",
    RemoteActionCall => "REMOTE_ACTION_CALL",
    ResourceActionCall => "RESOURCE_ACTION_CALL",
    NewConnection => "NEW_CONNECTION",
    ClassInit => "CLASS_INIT",
    DataMapper => "DATA_MAPPER",
    DataMapperDefinition => "DATA_MAPPER_DEFINITION",
    FunctionDefinition => "FUNCTION_DEFINITION",
    NpFunction => "NP_FUNCTION",
    Automation => "AUTOMATION",
    XmlPayload => "XML_PAYLOAD",
    JsonPayload => "JSON_PAYLOAD",
    BinaryData => "BINARY_DATA",
}

impl NodeKind {
    /// Kinds whose nodes carry child branches.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            NodeKind::If
                | NodeKind::Match
                | NodeKind::While
                | NodeKind::Foreach
                | NodeKind::ErrorHandler
                | NodeKind::Lock
                | NodeKind::Transaction
                | NodeKind::Retry
                | NodeKind::Fork
                | NodeKind::ParallelFlow
        )
    }

    /// Kinds rendered as module-level declarations rather than statements.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::ConfigVariable
                | NodeKind::DataMapperDefinition
                | NodeKind::FunctionDefinition
                | NodeKind::NpFunction
                | NodeKind::Automation
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name any known [`NodeKind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown node kind '{0}'")]
pub struct UnknownKind(pub String);
