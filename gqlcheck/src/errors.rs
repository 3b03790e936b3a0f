use std::fmt;

use thiserror::Error;

use crate::diff::DiffRule;

/// A supplied type graph violates one of its structural invariants.
///
/// These abort a comparison before any change is computed; a comparison never
/// reports a partial change list alongside an integrity error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// The graph has no query root operation type.
    #[error("schema has no query root type")]
    MissingQueryRoot,

    /// A root operation names a type that is not defined.
    #[error("{operation} root type '{type_name}' is not defined")]
    UnknownRootType { operation: Operation, type_name: String },

    /// A root operation names a type that is not an object type.
    #[error("{operation} root type '{type_name}' must be an object type")]
    RootTypeNotObject { operation: Operation, type_name: String },

    /// The same type is used for more than one root operation.
    #[error("type '{type_name}' is used as root for both {first} and {second}")]
    DuplicateRootType {
        type_name: String,
        first: Operation,
        second: Operation,
    },

    /// Two types share one name.
    #[error("type '{0}' is defined more than once")]
    DuplicateType(String),

    /// Two directives share one name.
    #[error("directive '@{0}' is defined more than once")]
    DuplicateDirective(String),

    /// A type reference points at a name the graph does not define.
    #[error("'{path}' references undefined type '{type_name}'")]
    DanglingReference { path: String, type_name: String },

    /// A non-null wrapper directly wraps another non-null wrapper.
    #[error("'{path}' wraps a non-null type in another non-null")]
    NestedNonNull { path: String },

    /// A union lists a member that is not an object type.
    #[error("union '{union_name}' member '{member}' is not an object type")]
    InvalidUnionMember { union_name: String, member: String },

    /// A type claims to implement something that is not an interface.
    #[error("'{type_name}' implements '{interface}', which is not an interface")]
    InvalidInterface { type_name: String, interface: String },

    /// An argument or input field references an output-only type.
    #[error("'{path}' must be an input type but references '{type_name}'")]
    InputTypeExpected { path: String, type_name: String },

    /// A field of an object or interface references an input object.
    #[error("'{path}' must be an output type but references '{type_name}'")]
    OutputTypeExpected { path: String, type_name: String },
}

/// Invalid comparison options, rejected before any comparison starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error("rule '{0}' is listed more than once")]
    DuplicateRule(DiffRule),

    #[error("unknown severity '{0}' (expected breaking, dangerous, safe or none)")]
    UnknownSeverity(String),
}

/// Which input of a comparison a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => write!(f, "old"),
            Side::New => write!(f, "new"),
        }
    }
}

/// Root operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Query,
    Mutation,
    Subscription,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Query, Operation::Mutation, Operation::Subscription];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Query => write!(f, "query"),
            Operation::Mutation => write!(f, "mutation"),
            Operation::Subscription => write!(f, "subscription"),
        }
    }
}

/// Error returned by [`compare_schemas`](crate::compare_schemas).
///
/// Finding breaking changes is not an error; this only covers inputs the
/// comparison cannot be run on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("invalid diff options: {0}")]
    Config(#[from] ConfigError),

    #[error("{side} schema is malformed: {source}")]
    Integrity {
        side: Side,
        #[source]
        source: IntegrityError,
    },
}

impl CompareError {
    pub(crate) fn integrity(side: Side) -> impl FnOnce(IntegrityError) -> Self {
        move |source| CompareError::Integrity { side, source }
    }
}

/// Failure to turn schema source into a type graph.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read schema from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse SDL: {0}")]
    Syntax(#[from] async_graphql_parser::Error),

    #[error("cannot extend undefined type '{0}'")]
    ExtendUndefined(String),

    #[error("cannot extend '{name}' as {found}, it is defined as {expected}")]
    ExtendKindMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("'{owner}' defines '{name}' more than once")]
    DuplicateMember { owner: String, name: String },

    #[error("schema definition declares the {0} root more than once")]
    DuplicateRootDeclaration(Operation),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}
