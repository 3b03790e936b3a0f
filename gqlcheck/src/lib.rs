//! gqlcheck core library.
//!
//! Compares two versions of a GraphQL schema and classifies every structural
//! difference as breaking, dangerous or safe for existing clients.
//!
//! ```no_run
//! use gqlcheck::{DiffOptions, compare_schemas, parse_schema};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let old = parse_schema("type Query { user: String! }")?;
//! let new = parse_schema("type Query { user: String }")?;
//! for change in compare_schemas(&old, &new, &DiffOptions::default())? {
//!     println!("{change}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod change;
mod compare;
pub mod diff;
pub mod errors;
pub mod loader;
pub mod types;
pub mod variance;

pub use change::{Change, ChangeKind, ChangeSummary, Criticality, Severity, sort_changes};
pub use diff::{DiffOptions, DiffRule, compare_schemas};
pub use errors::{CompareError, ConfigError, IntegrityError, LoadError, Operation, Side};
pub use loader::{LoadedSchema, load_schema, parse_schema};
pub use types::{
    ArgumentDef, Deprecation, DirectiveDef, DirectiveLocation, EnumValue, FieldDef, InputFieldDef, NamedType,
    Position, RootOperations, TypeDef, TypeGraph, TypeKind, TypeRef,
};
pub use variance::VarianceResolver;
