//! Type graph model: an immutable, name-indexed snapshot of one schema version.
//!
//! Named types reference each other by name only. Wrapper kinds (`List`,
//! `NonNull`) are held by value at each usage site, so a single reference is
//! always a finite chain ending in a name, while named types may form cycles
//! through their fields.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{IntegrityError, Operation};

/// Built-in scalar names every schema implicitly contains.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Whether values of this kind may appear in argument or input-field position.
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }

    /// Whether values of this kind may appear as a field result.
    pub fn is_output(self) -> bool {
        !matches!(self, TypeKind::InputObject)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Scalar => write!(f, "SCALAR"),
            TypeKind::Object => write!(f, "OBJECT"),
            TypeKind::Interface => write!(f, "INTERFACE"),
            TypeKind::Union => write!(f, "UNION"),
            TypeKind::Enum => write!(f, "ENUM"),
            TypeKind::InputObject => write!(f, "INPUT_OBJECT"),
        }
    }
}

/// A reference to a type at a usage site (field, argument, input field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Wrap in non-null. Wrapping an already non-null reference is a no-op.
    pub fn non_null(inner: TypeRef) -> Self {
        match inner {
            TypeRef::NonNull(_) => inner,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    /// Name of the innermost named type.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Number of list wrappers along the chain.
    pub fn list_depth(&self) -> usize {
        match self {
            TypeRef::Named(_) => 0,
            TypeRef::List(inner) => 1 + inner.list_depth(),
            TypeRef::NonNull(inner) => inner.list_depth(),
        }
    }

    fn has_nested_non_null(&self) -> bool {
        match self {
            TypeRef::Named(_) => false,
            TypeRef::NonNull(inner) => inner.is_non_null() || inner.has_nested_non_null(),
            TypeRef::List(inner) => inner.has_nested_non_null(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// Deprecation marker. `reason` is `None` when `@deprecated` carries no reason.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deprecation {
    pub reason: Option<String>,
}

impl Deprecation {
    pub fn new(reason: Option<String>) -> Self {
        Self { reason }
    }
}

/// An argument of a field or directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDef {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Default value rendered as a GraphQL literal.
    pub default_value: Option<String>,
    pub deprecation: Option<Deprecation>,
}

impl ArgumentDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
            deprecation: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Callers must supply a value: non-null with no default.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

/// A field of an object or interface type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub arguments: IndexMap<String, ArgumentDef>,
    pub deprecation: Option<Deprecation>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: IndexMap::new(),
            deprecation: None,
        }
    }

    pub fn with_argument(mut self, argument: ArgumentDef) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation = Some(Deprecation::new(reason.map(str::to_string)));
        self
    }
}

/// A field of an input object type.
pub type InputFieldDef = ArgumentDef;

/// A value of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation: None,
        }
    }
}

/// Kind-specific content of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDef {
    Scalar,
    Object {
        fields: IndexMap<String, FieldDef>,
        interfaces: Vec<String>,
    },
    Interface {
        fields: IndexMap<String, FieldDef>,
        interfaces: Vec<String>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: IndexMap<String, EnumValue>,
    },
    InputObject {
        fields: IndexMap<String, InputFieldDef>,
    },
}

/// A named type in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    pub description: Option<String>,
    pub def: TypeDef,
}

impl NamedType {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, TypeDef::Scalar)
    }

    pub fn object(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self::new(
            name,
            TypeDef::Object {
                fields: index_fields(fields),
                interfaces: Vec::new(),
            },
        )
    }

    pub fn interface(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self::new(
            name,
            TypeDef::Interface {
                fields: index_fields(fields),
                interfaces: Vec::new(),
            },
        )
    }

    pub fn union(name: impl Into<String>, members: &[&str]) -> Self {
        Self::new(
            name,
            TypeDef::Union {
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        )
    }

    pub fn enumeration(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(
            name,
            TypeDef::Enum {
                values: values.iter().map(|v| (v.to_string(), EnumValue::new(*v))).collect(),
            },
        )
    }

    pub fn input_object(name: impl Into<String>, fields: Vec<InputFieldDef>) -> Self {
        Self::new(
            name,
            TypeDef::InputObject {
                fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
            },
        )
    }

    pub fn new(name: impl Into<String>, def: TypeDef) -> Self {
        Self {
            name: name.into(),
            description: None,
            def,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add implemented interfaces. Ignored for kinds that cannot implement.
    pub fn implementing(mut self, names: &[&str]) -> Self {
        if let TypeDef::Object { interfaces, .. } | TypeDef::Interface { interfaces, .. } = &mut self.def {
            interfaces.extend(names.iter().map(|n| n.to_string()));
        }
        self
    }

    pub fn kind(&self) -> TypeKind {
        match self.def {
            TypeDef::Scalar => TypeKind::Scalar,
            TypeDef::Object { .. } => TypeKind::Object,
            TypeDef::Interface { .. } => TypeKind::Interface,
            TypeDef::Union { .. } => TypeKind::Union,
            TypeDef::Enum { .. } => TypeKind::Enum,
            TypeDef::InputObject { .. } => TypeKind::InputObject,
        }
    }

    pub fn interfaces(&self) -> &[String] {
        match &self.def {
            TypeDef::Object { interfaces, .. } | TypeDef::Interface { interfaces, .. } => interfaces,
            _ => &[],
        }
    }
}

fn index_fields(fields: Vec<FieldDef>) -> IndexMap<String, FieldDef> {
    fields.into_iter().map(|f| (f.name.clone(), f)).collect()
}

/// Valid placements of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
            DirectiveLocation::Schema => "SCHEMA",
            DirectiveLocation::Scalar => "SCALAR",
            DirectiveLocation::Object => "OBJECT",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
            DirectiveLocation::Interface => "INTERFACE",
            DirectiveLocation::Union => "UNION",
            DirectiveLocation::Enum => "ENUM",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
            DirectiveLocation::InputObject => "INPUT_OBJECT",
            DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        };
        write!(f, "{name}")
    }
}

/// A directive definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveDef {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, ArgumentDef>,
    pub locations: BTreeSet<DirectiveLocation>,
    pub repeatable: bool,
}

impl DirectiveDef {
    pub fn new(name: impl Into<String>, locations: &[DirectiveLocation]) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: IndexMap::new(),
            locations: locations.iter().copied().collect(),
            repeatable: false,
        }
    }

    pub fn with_argument(mut self, argument: ArgumentDef) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }
}

/// Names of the root operation types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RootOperations {
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl RootOperations {
    pub fn get(&self, operation: Operation) -> Option<&str> {
        match operation {
            Operation::Query => self.query.as_deref(),
            Operation::Mutation => self.mutation.as_deref(),
            Operation::Subscription => self.subscription.as_deref(),
        }
    }

    pub fn set(&mut self, operation: Operation, type_name: Option<String>) {
        match operation {
            Operation::Query => self.query = type_name,
            Operation::Mutation => self.mutation = type_name,
            Operation::Subscription => self.subscription = type_name,
        }
    }
}

/// A complete schema: named types, directives and root operation types.
///
/// Construction goes through [`TypeGraph::insert_type`] and
/// [`TypeGraph::insert_directive`], which reject duplicate names. Reference
/// integrity is checked by [`TypeGraph::validate`], which every comparison
/// runs on both inputs before looking at them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeGraph {
    types: IndexMap<String, NamedType>,
    directives: IndexMap<String, DirectiveDef>,
    roots: RootOperations,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph pre-populated with the built-in scalars.
    pub fn with_builtins() -> Self {
        let mut graph = Self::new();
        for name in BUILTIN_SCALARS {
            graph.types.insert(name.to_string(), NamedType::scalar(name));
        }
        graph
    }

    pub fn insert_type(&mut self, ty: NamedType) -> Result<(), IntegrityError> {
        if self.types.contains_key(&ty.name) {
            return Err(IntegrityError::DuplicateType(ty.name));
        }
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    pub fn insert_directive(&mut self, directive: DirectiveDef) -> Result<(), IntegrityError> {
        if self.directives.contains_key(&directive.name) {
            return Err(IntegrityError::DuplicateDirective(directive.name));
        }
        self.directives.insert(directive.name.clone(), directive);
        Ok(())
    }

    pub(crate) fn type_mut(&mut self, name: &str) -> Option<&mut NamedType> {
        self.types.get_mut(name)
    }

    pub fn set_root(&mut self, operation: Operation, type_name: Option<String>) {
        self.roots.set(operation, type_name);
    }

    pub fn roots(&self) -> &RootOperations {
        &self.roots
    }

    pub fn get(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values()
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDef> {
        self.directives.values()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Resolve a named type, failing on a dangling reference.
    pub fn resolve(&self, name: &str, path: &str) -> Result<&NamedType, IntegrityError> {
        self.types.get(name).ok_or_else(|| IntegrityError::DanglingReference {
            path: path.to_string(),
            type_name: name.to_string(),
        })
    }

    /// Whether `member` is a valid runtime type of the abstract type `abstract_name`:
    /// a member of that union, or an implementor of that interface.
    pub fn is_possible_type(&self, abstract_name: &str, member: &str) -> bool {
        match self.get(abstract_name).map(|t| &t.def) {
            Some(TypeDef::Union { members }) => members.iter().any(|m| m == member),
            Some(TypeDef::Interface { .. }) => self
                .get(member)
                .is_some_and(|t| t.interfaces().iter().any(|i| i == abstract_name)),
            _ => false,
        }
    }

    /// Check every structural invariant of the graph.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        self.validate_roots()?;

        for ty in self.types.values() {
            match &ty.def {
                TypeDef::Scalar => {}
                TypeDef::Object { fields, interfaces } | TypeDef::Interface { fields, interfaces } => {
                    for interface in interfaces {
                        let target = self.resolve(interface, &ty.name)?;
                        if target.kind() != TypeKind::Interface {
                            return Err(IntegrityError::InvalidInterface {
                                type_name: ty.name.clone(),
                                interface: interface.clone(),
                            });
                        }
                    }
                    for field in fields.values() {
                        let path = format!("{}.{}", ty.name, field.name);
                        self.validate_ref(&field.ty, &path, Position::Output)?;
                        for argument in field.arguments.values() {
                            let arg_path = format!("{path}({}:)", argument.name);
                            self.validate_ref(&argument.ty, &arg_path, Position::Input)?;
                        }
                    }
                }
                TypeDef::Union { members } => {
                    for member in members {
                        let target = self.resolve(member, &ty.name)?;
                        if target.kind() != TypeKind::Object {
                            return Err(IntegrityError::InvalidUnionMember {
                                union_name: ty.name.clone(),
                                member: member.clone(),
                            });
                        }
                    }
                }
                TypeDef::Enum { .. } => {}
                TypeDef::InputObject { fields } => {
                    for field in fields.values() {
                        let path = format!("{}.{}", ty.name, field.name);
                        self.validate_ref(&field.ty, &path, Position::Input)?;
                    }
                }
            }
        }

        for directive in self.directives.values() {
            for argument in directive.arguments.values() {
                let path = format!("@{}({}:)", directive.name, argument.name);
                self.validate_ref(&argument.ty, &path, Position::Input)?;
            }
        }

        Ok(())
    }

    fn validate_roots(&self) -> Result<(), IntegrityError> {
        if self.roots.query.is_none() {
            return Err(IntegrityError::MissingQueryRoot);
        }

        let mut seen: Vec<(Operation, &str)> = Vec::new();
        for operation in Operation::ALL {
            let Some(type_name) = self.roots.get(operation) else {
                continue;
            };
            let Some(ty) = self.get(type_name) else {
                return Err(IntegrityError::UnknownRootType {
                    operation,
                    type_name: type_name.to_string(),
                });
            };
            if ty.kind() != TypeKind::Object {
                return Err(IntegrityError::RootTypeNotObject {
                    operation,
                    type_name: type_name.to_string(),
                });
            }
            if let Some((first, _)) = seen.iter().find(|(_, name)| *name == type_name) {
                return Err(IntegrityError::DuplicateRootType {
                    type_name: type_name.to_string(),
                    first: *first,
                    second: operation,
                });
            }
            seen.push((operation, type_name));
        }
        Ok(())
    }

    fn validate_ref(&self, ty: &TypeRef, path: &str, position: Position) -> Result<(), IntegrityError> {
        if ty.has_nested_non_null() {
            return Err(IntegrityError::NestedNonNull { path: path.to_string() });
        }
        let named = self.resolve(ty.named_type(), path)?;
        match position {
            Position::Input if !named.kind().is_input() => Err(IntegrityError::InputTypeExpected {
                path: path.to_string(),
                type_name: named.name.clone(),
            }),
            Position::Output if !named.kind().is_output() => Err(IntegrityError::OutputTypeExpected {
                path: path.to_string(),
                type_name: named.name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Names of all types reachable from the root operation types or from
    /// directive arguments.
    pub fn reachable_types(&self) -> HashSet<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = Operation::ALL.iter().filter_map(|op| self.roots.get(*op)).collect();
        queue.extend(
            self.directives
                .values()
                .flat_map(|directive| directive.arguments.values())
                .map(|argument| argument.ty.named_type()),
        );

        while let Some(name) = queue.pop_front() {
            let Some(ty) = self.types.get(name) else {
                continue;
            };
            if !seen.insert(ty.name.as_str()) {
                continue;
            }
            let mut visit = |next: &'_ str| {
                if let Some((key, _)) = self.types.get_key_value(next) {
                    queue.push_back(key.as_str());
                }
            };
            match &ty.def {
                TypeDef::Scalar | TypeDef::Enum { .. } => {}
                TypeDef::Object { fields, interfaces } | TypeDef::Interface { fields, interfaces } => {
                    interfaces.iter().for_each(|i| visit(i.as_str()));
                    for field in fields.values() {
                        visit(field.ty.named_type());
                        for argument in field.arguments.values() {
                            visit(argument.ty.named_type());
                        }
                    }
                }
                TypeDef::Union { members } => members.iter().for_each(|m| visit(m.as_str())),
                TypeDef::InputObject { fields } => {
                    for field in fields.values() {
                        visit(field.ty.named_type());
                    }
                }
            }
            if ty.kind() == TypeKind::Interface {
                for implementor in self.types.values() {
                    if implementor.interfaces().iter().any(|i| i == name) {
                        queue.push_back(implementor.name.as_str());
                    }
                }
            }
        }

        seen
    }
}

/// Which side of the data flow a type reference sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Field result, flowing from server to client.
    Output,
    /// Argument or input field, flowing from client to server.
    Input,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_query(fields: Vec<FieldDef>) -> TypeGraph {
        let mut graph = TypeGraph::with_builtins();
        graph.insert_type(NamedType::object("Query", fields)).unwrap();
        graph.set_root(Operation::Query, Some("Query".to_string()));
        graph
    }

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("String"))));
        assert_eq!(ty.to_string(), "[String!]!");
        assert_eq!(ty.named_type(), "String");
        assert_eq!(ty.list_depth(), 1);
    }

    #[test]
    fn test_non_null_is_idempotent() {
        let ty = TypeRef::non_null(TypeRef::non_null(TypeRef::named("Int")));
        assert_eq!(ty.to_string(), "Int!");
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut graph = TypeGraph::with_builtins();
        let err = graph.insert_type(NamedType::scalar("String")).unwrap_err();
        assert_eq!(err, IntegrityError::DuplicateType("String".to_string()));
    }

    #[test]
    fn test_validate_dangling_reference() {
        let graph = graph_with_query(vec![FieldDef::new("me", TypeRef::named("User"))]);
        let err = graph.validate().unwrap_err();
        assert_eq!(
            err,
            IntegrityError::DanglingReference {
                path: "Query.me".to_string(),
                type_name: "User".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_missing_query_root() {
        let graph = TypeGraph::with_builtins();
        assert_eq!(graph.validate().unwrap_err(), IntegrityError::MissingQueryRoot);
    }

    #[test]
    fn test_validate_duplicate_root_type() {
        let mut graph = graph_with_query(vec![FieldDef::new("ok", TypeRef::named("Boolean"))]);
        graph.set_root(Operation::Mutation, Some("Query".to_string()));
        assert!(matches!(
            graph.validate().unwrap_err(),
            IntegrityError::DuplicateRootType { .. }
        ));
    }

    #[test]
    fn test_validate_nested_non_null() {
        let nested = TypeRef::NonNull(Box::new(TypeRef::NonNull(Box::new(TypeRef::named("Int")))));
        let graph = graph_with_query(vec![FieldDef::new("count", nested)]);
        assert_eq!(
            graph.validate().unwrap_err(),
            IntegrityError::NestedNonNull {
                path: "Query.count".to_string()
            }
        );
    }

    #[test]
    fn test_validate_argument_must_be_input_type() {
        let mut graph = graph_with_query(vec![
            FieldDef::new("user", TypeRef::named("User")).with_argument(ArgumentDef::new("like", TypeRef::named("User"))),
        ]);
        graph
            .insert_type(NamedType::object("User", vec![FieldDef::new("id", TypeRef::named("ID"))]))
            .unwrap();
        assert!(matches!(
            graph.validate().unwrap_err(),
            IntegrityError::InputTypeExpected { .. }
        ));
    }

    #[test]
    fn test_cyclic_types_validate() {
        let mut graph = graph_with_query(vec![FieldDef::new("user", TypeRef::named("User"))]);
        graph
            .insert_type(NamedType::object(
                "User",
                vec![FieldDef::new("comments", TypeRef::list(TypeRef::named("Comment")))],
            ))
            .unwrap();
        graph
            .insert_type(NamedType::object("Comment", vec![FieldDef::new("author", TypeRef::named("User"))]))
            .unwrap();
        assert!(graph.validate().is_ok());

        let reachable = graph.reachable_types();
        assert!(reachable.contains("User"));
        assert!(reachable.contains("Comment"));
        assert!(!reachable.contains("Float"));
    }

    #[test]
    fn test_is_possible_type() {
        let mut graph = graph_with_query(vec![FieldDef::new("node", TypeRef::named("Node"))]);
        graph
            .insert_type(NamedType::interface("Node", vec![FieldDef::new("id", TypeRef::named("ID"))]))
            .unwrap();
        graph
            .insert_type(NamedType::object("User", vec![FieldDef::new("id", TypeRef::named("ID"))]).implementing(&["Node"]))
            .unwrap();
        graph.insert_type(NamedType::union("Result", &["User"])).unwrap();

        assert!(graph.is_possible_type("Node", "User"));
        assert!(graph.is_possible_type("Result", "User"));
        assert!(!graph.is_possible_type("User", "User"));
    }
}
