use super::NodeBuilder;
use super::call::{
    ClassInitBuilder, FunctionCallBuilder, MethodCallBuilder, NewConnectionBuilder,
    RemoteActionCallBuilder, ResourceActionCallBuilder,
};
use super::concurrency::{ForkBuilder, ParallelFlowBuilder, StartBuilder, WaitBuilder};
use super::control::{
    BreakBuilder, CommitBuilder, ContinueBuilder, ErrorHandlerBuilder, EventStartBuilder,
    FailBuilder, ForeachBuilder, IfBuilder, LockBuilder, MatchBuilder, PanicBuilder,
    RetryBuilder, ReturnBuilder, RollbackBuilder, StopBuilder, TransactionBuilder, WhileBuilder,
};
use super::data_mapper::{DataMapperBuilder, DataMapperDefinitionBuilder};
use super::definition::{AutomationBuilder, FunctionDefinitionBuilder, NpFunctionBuilder};
use super::statement::{
    AssignBuilder, BinaryDataBuilder, CommentBuilder, ConfigVariableBuilder, ExpressionBuilder,
    JsonPayloadBuilder, VariableBuilder, XmlPayloadBuilder,
};
use crate::error::FlowError;
use crate::model::NodeKind;
use ahash::AHashMap;
use std::str::FromStr;

/// Declares the default builder of every kind, generating the registration function and
/// the by-kind constructor from one table.
macro_rules! define_node_builders {
    ( $( ($builder:path, $kind:path) ),* $(,)? ) => {
        pub(crate) fn register_default_builders(
            registry: &mut AHashMap<NodeKind, Box<dyn NodeBuilder>>,
        ) {
            $( registry.insert($kind, Box::new($builder)); )*
        }

        /// A fresh default builder for `kind`.
        pub fn create_builder(kind: NodeKind) -> Option<Box<dyn NodeBuilder>> {
            match kind {
                $( $kind => Some(Box::new($builder)), )*
                #[allow(unreachable_patterns)]
                _ => None,
            }
        }
    };
}

define_node_builders! {
    // Control flow
    (EventStartBuilder, NodeKind::EventStart),
    (IfBuilder, NodeKind::If),
    (MatchBuilder, NodeKind::Match),
    (WhileBuilder, NodeKind::While),
    (ForeachBuilder, NodeKind::Foreach),
    (BreakBuilder, NodeKind::Break),
    (ContinueBuilder, NodeKind::Continue),
    (ReturnBuilder, NodeKind::Return),
    (PanicBuilder, NodeKind::Panic),
    (FailBuilder, NodeKind::Fail),
    (StopBuilder, NodeKind::Stop),
    (ErrorHandlerBuilder, NodeKind::ErrorHandler),
    (LockBuilder, NodeKind::Lock),
    (TransactionBuilder, NodeKind::Transaction),
    (RetryBuilder, NodeKind::Retry),
    (CommitBuilder, NodeKind::Commit),
    (RollbackBuilder, NodeKind::Rollback),

    // Statements
    (ExpressionBuilder, NodeKind::Expression),
    (VariableBuilder, NodeKind::Variable),
    (AssignBuilder, NodeKind::Assign),
    (ConfigVariableBuilder, NodeKind::ConfigVariable),
    (CommentBuilder, NodeKind::Comment),
    (XmlPayloadBuilder, NodeKind::XmlPayload),
    (JsonPayloadBuilder, NodeKind::JsonPayload),
    (BinaryDataBuilder, NodeKind::BinaryData),

    // Concurrency
    (StartBuilder, NodeKind::Start),
    (WaitBuilder, NodeKind::Wait),
    (ForkBuilder, NodeKind::Fork),
    (ParallelFlowBuilder, NodeKind::ParallelFlow),

    // Calls
    (FunctionCallBuilder, NodeKind::FunctionCall),
    (MethodCallBuilder, NodeKind::MethodCall),
    (RemoteActionCallBuilder, NodeKind::RemoteActionCall),
    (ResourceActionCallBuilder, NodeKind::ResourceActionCall),
    (NewConnectionBuilder, NodeKind::NewConnection),
    (ClassInitBuilder, NodeKind::ClassInit),

    // Data mapping and definitions
    (DataMapperBuilder, NodeKind::DataMapper),
    (DataMapperDefinitionBuilder, NodeKind::DataMapperDefinition),
    (FunctionDefinitionBuilder, NodeKind::FunctionDefinition),
    (NpFunctionBuilder, NodeKind::NpFunction),
    (AutomationBuilder, NodeKind::Automation),
}

/// Maps each node kind to the builder that handles it.
pub struct NodeRegistry {
    builders: AHashMap<NodeKind, Box<dyn NodeBuilder>>,
}

pub struct NodeRegistryBuilder {
    builders: AHashMap<NodeKind, Box<dyn NodeBuilder>>,
}

impl Default for NodeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistryBuilder {
    /// Starts from the default builders of every kind.
    pub fn new() -> Self {
        let mut builders: AHashMap<NodeKind, Box<dyn NodeBuilder>> = AHashMap::new();
        register_default_builders(&mut builders);
        Self { builders }
    }

    /// Starts with no builders at all.
    pub fn empty() -> Self {
        Self {
            builders: AHashMap::new(),
        }
    }

    /// Registers the default builder of `kind`.
    pub fn with_default(mut self, kind: NodeKind) -> Self {
        if let Some(builder) = create_builder(kind) {
            self.builders.insert(kind, builder);
        }
        self
    }

    /// Registers `builder` for its kind, replacing any builder already there.
    pub fn with_builder(mut self, builder: Box<dyn NodeBuilder>) -> Self {
        self.builders.insert(builder.kind(), builder);
        self
    }

    pub fn without(mut self, kind: NodeKind) -> Self {
        self.builders.remove(&kind);
        self
    }

    pub fn build(self) -> NodeRegistry {
        NodeRegistry {
            builders: self.builders,
        }
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        NodeRegistryBuilder::new().build()
    }
}

impl NodeRegistry {
    pub fn builder() -> NodeRegistryBuilder {
        NodeRegistryBuilder::new()
    }

    pub fn resolve(&self, kind: NodeKind) -> Result<&dyn NodeBuilder, FlowError> {
        match self.builders.get(&kind) {
            Some(builder) => {
                tracing::debug!("Resolved builder for {}", kind);
                Ok(builder.as_ref())
            }
            None => Err(FlowError::unsupported(kind.as_str(), self.builders.keys())),
        }
    }

    /// The builder of `kind`, if registered.
    pub fn get(&self, kind: NodeKind) -> Option<&dyn NodeBuilder> {
        self.builders.get(&kind).map(|builder| builder.as_ref())
    }

    /// Resolves a kind by its wire name, e.g. `"REMOTE_ACTION_CALL"`.
    pub fn resolve_name(&self, name: &str) -> Result<&dyn NodeBuilder, FlowError> {
        let kind = NodeKind::from_str(name)
            .map_err(|_| FlowError::unsupported(name, self.builders.keys()))?;
        self.resolve(kind)
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut kinds: Vec<NodeKind> = self.builders.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.builders.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}
