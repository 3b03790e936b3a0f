//! Schema loader: turns SDL text into a validated [`TypeGraph`].

use std::path::Path;

use async_graphql_parser::Positioned;
use async_graphql_parser::types::{self as ast, ConstDirective, TypeSystemDefinition};
use async_graphql_value::{ConstValue, Name};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::change::{directive_path, field_path};
use crate::errors::{LoadError, Operation};
use crate::types::{
    ArgumentDef, BUILTIN_SCALARS, Deprecation, DirectiveDef, DirectiveLocation, EnumValue, FieldDef, NamedType,
    RootOperations, TypeDef, TypeGraph, TypeKind, TypeRef,
};

const SDL_EXTENSIONS: [&str; 3] = ["graphql", "graphqls", "gql"];

/// A parsed schema together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// File path, or `<inline>` for SDL passed directly.
    pub source: String,
    pub graph: TypeGraph,
    pub loaded_at: DateTime<Utc>,
}

/// Load a schema from a file path, or treat `source` as inline SDL when no
/// such file exists.
pub async fn load_schema(source: &str) -> Result<LoadedSchema, LoadError> {
    let path = Path::new(source);
    let is_file = tokio::fs::try_exists(path).await.unwrap_or(false);
    let looks_like_file = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SDL_EXTENSIONS.contains(&ext));

    let (label, sdl) = if is_file || looks_like_file {
        let sdl = tokio::fs::read_to_string(path).await.map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        (path.display().to_string(), sdl)
    } else {
        ("<inline>".to_string(), source.to_string())
    };

    log::debug!("loading schema from {label} ({} bytes)", sdl.len());
    let graph = parse_schema(&sdl)?;
    log::debug!("loaded {} types from {label}", graph.type_count());

    Ok(LoadedSchema {
        source: label,
        graph,
        loaded_at: Utc::now(),
    })
}

/// Parse SDL into a validated type graph.
///
/// Built-in scalars and directives are added unless the document defines
/// them. Extensions are applied after all base definitions, so they may
/// appear anywhere in the document.
pub fn parse_schema(sdl: &str) -> Result<TypeGraph, LoadError> {
    let document = async_graphql_parser::parse_schema(sdl)?;

    let mut builder = GraphBuilder::default();
    let mut extensions = Vec::new();
    for definition in &document.definitions {
        if is_extension(definition) {
            extensions.push(definition);
        } else {
            builder.define(definition)?;
        }
    }
    for extension in extensions {
        builder.extend(extension)?;
    }

    let graph = builder.finish()?;
    graph.validate()?;
    Ok(graph)
}

fn is_extension(definition: &TypeSystemDefinition) -> bool {
    match definition {
        TypeSystemDefinition::Schema(schema) => schema.node.extend,
        TypeSystemDefinition::Type(ty) => ty.node.extend,
        TypeSystemDefinition::Directive(_) => false,
    }
}

#[derive(Default)]
struct GraphBuilder {
    graph: TypeGraph,
    roots: RootOperations,
    has_schema_definition: bool,
}

impl GraphBuilder {
    fn define(&mut self, definition: &TypeSystemDefinition) -> Result<(), LoadError> {
        match definition {
            TypeSystemDefinition::Schema(schema) => {
                self.has_schema_definition = true;
                self.declare_roots(&schema.node)
            }
            TypeSystemDefinition::Type(ty) => {
                let ty = &ty.node;
                let owner = ty.name.node.as_str();
                let def = match &ty.kind {
                    ast::TypeKind::Scalar => TypeDef::Scalar,
                    ast::TypeKind::Object(object) => TypeDef::Object {
                        fields: add_fields(owner, IndexMap::new(), &object.fields)?,
                        interfaces: add_names(owner, Vec::new(), &object.implements)?,
                    },
                    ast::TypeKind::Interface(interface) => TypeDef::Interface {
                        fields: add_fields(owner, IndexMap::new(), &interface.fields)?,
                        interfaces: add_names(owner, Vec::new(), &interface.implements)?,
                    },
                    ast::TypeKind::Union(union) => TypeDef::Union {
                        members: add_names(owner, Vec::new(), &union.members)?,
                    },
                    ast::TypeKind::Enum(enumeration) => TypeDef::Enum {
                        values: add_enum_values(owner, IndexMap::new(), &enumeration.values)?,
                    },
                    ast::TypeKind::InputObject(input) => TypeDef::InputObject {
                        fields: add_inputs(owner, IndexMap::new(), &input.fields)?,
                    },
                };
                let mut named = NamedType::new(ty.name.node.as_str(), def);
                named.description = description(&ty.description);
                self.graph.insert_type(named)?;
                Ok(())
            }
            TypeSystemDefinition::Directive(directive) => {
                let directive = &directive.node;
                let mut def = DirectiveDef::new(directive.name.node.as_str(), &[]);
                def.description = description(&directive.description);
                def.arguments = add_inputs(&directive_path(&def.name), IndexMap::new(), &directive.arguments)?;
                def.locations = directive.locations.iter().map(|loc| convert_location(&loc.node)).collect();
                def.repeatable = directive.is_repeatable;
                self.graph.insert_directive(def)?;
                Ok(())
            }
        }
    }

    fn extend(&mut self, definition: &TypeSystemDefinition) -> Result<(), LoadError> {
        let ty = match definition {
            TypeSystemDefinition::Schema(schema) => return self.declare_roots(&schema.node),
            TypeSystemDefinition::Type(ty) => &ty.node,
            TypeSystemDefinition::Directive(_) => return Ok(()),
        };
        let name = ty.name.node.as_str();
        let target = self
            .graph
            .type_mut(name)
            .ok_or_else(|| LoadError::ExtendUndefined(name.to_string()))?;
        let expected = target.kind();

        match (&mut target.def, &ty.kind) {
            (TypeDef::Scalar, ast::TypeKind::Scalar) => {}
            (TypeDef::Object { fields, interfaces }, ast::TypeKind::Object(object)) => {
                *fields = add_fields(name, std::mem::take(fields), &object.fields)?;
                *interfaces = add_names(name, std::mem::take(interfaces), &object.implements)?;
            }
            (TypeDef::Interface { fields, interfaces }, ast::TypeKind::Interface(interface)) => {
                *fields = add_fields(name, std::mem::take(fields), &interface.fields)?;
                *interfaces = add_names(name, std::mem::take(interfaces), &interface.implements)?;
            }
            (TypeDef::Union { members }, ast::TypeKind::Union(union)) => {
                *members = add_names(name, std::mem::take(members), &union.members)?;
            }
            (TypeDef::Enum { values }, ast::TypeKind::Enum(enumeration)) => {
                *values = add_enum_values(name, std::mem::take(values), &enumeration.values)?;
            }
            (TypeDef::InputObject { fields }, ast::TypeKind::InputObject(input)) => {
                *fields = add_inputs(name, std::mem::take(fields), &input.fields)?;
            }
            (_, kind) => {
                return Err(LoadError::ExtendKindMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    found: ast_kind(kind).to_string(),
                });
            }
        }
        Ok(())
    }

    fn declare_roots(&mut self, schema: &ast::SchemaDefinition) -> Result<(), LoadError> {
        let declared = [
            (Operation::Query, &schema.query),
            (Operation::Mutation, &schema.mutation),
            (Operation::Subscription, &schema.subscription),
        ];
        for (operation, name) in declared {
            let Some(name) = name else {
                continue;
            };
            if self.roots.get(operation).is_some() {
                return Err(LoadError::DuplicateRootDeclaration(operation));
            }
            self.roots.set(operation, Some(name.node.to_string()));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<TypeGraph, LoadError> {
        for name in BUILTIN_SCALARS {
            if !self.graph.contains(name) {
                self.graph.insert_type(NamedType::scalar(name))?;
            }
        }
        for directive in builtin_directives() {
            if self.graph.directive(&directive.name).is_none() {
                self.graph.insert_directive(directive)?;
            }
        }

        // Without a base schema definition, operations that no `extend schema`
        // declared fall back to the conventional type names.
        if !self.has_schema_definition {
            for (operation, name) in [
                (Operation::Query, "Query"),
                (Operation::Mutation, "Mutation"),
                (Operation::Subscription, "Subscription"),
            ] {
                if self.roots.get(operation).is_none() && self.graph.contains(name) {
                    self.roots.set(operation, Some(name.to_string()));
                }
            }
        }
        for operation in Operation::ALL {
            self.graph
                .set_root(operation, self.roots.get(operation).map(str::to_string));
        }

        Ok(self.graph)
    }
}

fn builtin_directives() -> Vec<DirectiveDef> {
    use DirectiveLocation as Loc;

    let condition = || ArgumentDef::new("if", TypeRef::non_null(TypeRef::named("Boolean")));
    let mut skip = DirectiveDef::new("skip", &[Loc::Field, Loc::FragmentSpread, Loc::InlineFragment])
        .with_argument(condition());
    skip.description = Some("Directs the executor to skip this field or fragment when the `if` argument is true.".into());
    let mut include = DirectiveDef::new("include", &[Loc::Field, Loc::FragmentSpread, Loc::InlineFragment])
        .with_argument(condition());
    include.description =
        Some("Directs the executor to include this field or fragment only when the `if` argument is true.".into());

    let mut deprecated = DirectiveDef::new(
        "deprecated",
        &[Loc::FieldDefinition, Loc::ArgumentDefinition, Loc::InputFieldDefinition, Loc::EnumValue],
    )
    .with_argument(ArgumentDef::new("reason", TypeRef::named("String")).with_default("\"No longer supported\""));
    deprecated.description = Some("Marks an element of a GraphQL schema as no longer supported.".into());

    let mut specified_by = DirectiveDef::new("specifiedBy", &[Loc::Scalar])
        .with_argument(ArgumentDef::new("url", TypeRef::non_null(TypeRef::named("String"))));
    specified_by.description = Some("Exposes a URL that specifies the behavior of this scalar.".into());

    vec![skip, include, deprecated, specified_by]
}

/// Append `name` to `into`, rejecting a second definition under `owner`.
fn insert_member<T>(owner: &str, into: &mut IndexMap<String, T>, name: String, value: T) -> Result<(), LoadError> {
    if into.contains_key(&name) {
        return Err(LoadError::DuplicateMember {
            owner: owner.to_string(),
            name,
        });
    }
    into.insert(name, value);
    Ok(())
}

fn add_names(owner: &str, mut into: Vec<String>, names: &[Positioned<Name>]) -> Result<Vec<String>, LoadError> {
    for name in names {
        let name = name.node.to_string();
        if into.contains(&name) {
            return Err(LoadError::DuplicateMember {
                owner: owner.to_string(),
                name,
            });
        }
        into.push(name);
    }
    Ok(into)
}

fn description(description: &Option<Positioned<String>>) -> Option<String> {
    description.as_ref().map(|d| d.node.clone())
}

fn deprecation(directives: &[Positioned<ConstDirective>]) -> Option<Deprecation> {
    let directive = directives
        .iter()
        .find(|d| d.node.name.node.as_str() == "deprecated")?;
    let reason = directive
        .node
        .arguments
        .iter()
        .find(|(name, _)| name.node.as_str() == "reason")
        .and_then(|(_, value)| match &value.node {
            ConstValue::String(reason) => Some(reason.clone()),
            _ => None,
        });
    Some(Deprecation::new(reason))
}

fn convert_type(ty: &ast::Type) -> TypeRef {
    let base = match &ty.base {
        ast::BaseType::Named(name) => TypeRef::named(name.as_str()),
        ast::BaseType::List(inner) => TypeRef::list(convert_type(inner)),
    };
    if ty.nullable { base } else { TypeRef::non_null(base) }
}

fn add_fields(
    owner: &str,
    mut into: IndexMap<String, FieldDef>,
    fields: &[Positioned<ast::FieldDefinition>],
) -> Result<IndexMap<String, FieldDef>, LoadError> {
    for field in fields {
        let field = &field.node;
        let name = field.name.node.to_string();
        let def = FieldDef {
            arguments: add_inputs(&field_path(owner, &name), IndexMap::new(), &field.arguments)?,
            name: name.clone(),
            description: description(&field.description),
            ty: convert_type(&field.ty.node),
            deprecation: deprecation(&field.directives),
        };
        insert_member(owner, &mut into, name, def)?;
    }
    Ok(into)
}

fn add_inputs(
    owner: &str,
    mut into: IndexMap<String, ArgumentDef>,
    values: &[Positioned<ast::InputValueDefinition>],
) -> Result<IndexMap<String, ArgumentDef>, LoadError> {
    for value in values {
        let value = &value.node;
        let def = ArgumentDef {
            name: value.name.node.to_string(),
            description: description(&value.description),
            ty: convert_type(&value.ty.node),
            default_value: value.default_value.as_ref().map(|v| v.node.to_string()),
            deprecation: deprecation(&value.directives),
        };
        insert_member(owner, &mut into, def.name.clone(), def)?;
    }
    Ok(into)
}

fn add_enum_values(
    owner: &str,
    mut into: IndexMap<String, EnumValue>,
    values: &[Positioned<ast::EnumValueDefinition>],
) -> Result<IndexMap<String, EnumValue>, LoadError> {
    for value in values {
        let value = &value.node;
        let def = EnumValue {
            name: value.value.node.to_string(),
            description: description(&value.description),
            deprecation: deprecation(&value.directives),
        };
        insert_member(owner, &mut into, def.name.clone(), def)?;
    }
    Ok(into)
}

fn ast_kind(kind: &ast::TypeKind) -> TypeKind {
    match kind {
        ast::TypeKind::Scalar => TypeKind::Scalar,
        ast::TypeKind::Object(_) => TypeKind::Object,
        ast::TypeKind::Interface(_) => TypeKind::Interface,
        ast::TypeKind::Union(_) => TypeKind::Union,
        ast::TypeKind::Enum(_) => TypeKind::Enum,
        ast::TypeKind::InputObject(_) => TypeKind::InputObject,
    }
}

fn convert_location(location: &ast::DirectiveLocation) -> DirectiveLocation {
    match location {
        ast::DirectiveLocation::Query => DirectiveLocation::Query,
        ast::DirectiveLocation::Mutation => DirectiveLocation::Mutation,
        ast::DirectiveLocation::Subscription => DirectiveLocation::Subscription,
        ast::DirectiveLocation::Field => DirectiveLocation::Field,
        ast::DirectiveLocation::FragmentDefinition => DirectiveLocation::FragmentDefinition,
        ast::DirectiveLocation::FragmentSpread => DirectiveLocation::FragmentSpread,
        ast::DirectiveLocation::InlineFragment => DirectiveLocation::InlineFragment,
        ast::DirectiveLocation::VariableDefinition => DirectiveLocation::VariableDefinition,
        ast::DirectiveLocation::Schema => DirectiveLocation::Schema,
        ast::DirectiveLocation::Scalar => DirectiveLocation::Scalar,
        ast::DirectiveLocation::Object => DirectiveLocation::Object,
        ast::DirectiveLocation::FieldDefinition => DirectiveLocation::FieldDefinition,
        ast::DirectiveLocation::ArgumentDefinition => DirectiveLocation::ArgumentDefinition,
        ast::DirectiveLocation::Interface => DirectiveLocation::Interface,
        ast::DirectiveLocation::Union => DirectiveLocation::Union,
        ast::DirectiveLocation::Enum => DirectiveLocation::Enum,
        ast::DirectiveLocation::EnumValue => DirectiveLocation::EnumValue,
        ast::DirectiveLocation::InputObject => DirectiveLocation::InputObject,
        ast::DirectiveLocation::InputFieldDefinition => DirectiveLocation::InputFieldDefinition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IntegrityError;

    #[test]
    fn test_parse_object_with_arguments() {
        let graph = parse_schema(
            r#"
            type Query {
                "Look up users"
                users(limit: Int = 10, filter: UserFilter): [User!]!
            }
            type User { id: ID! name: String }
            input UserFilter { name: String role: Role = GUEST }
            enum Role { ADMIN GUEST }
            "#,
        )
        .unwrap();

        assert_eq!(graph.roots().query.as_deref(), Some("Query"));
        let Some(TypeDef::Object { fields, .. }) = graph.get("Query").map(|t| &t.def) else {
            panic!("Query should be an object");
        };
        let users = &fields["users"];
        assert_eq!(users.ty.to_string(), "[User!]!");
        assert_eq!(users.description.as_deref(), Some("Look up users"));
        assert_eq!(users.arguments["limit"].default_value.as_deref(), Some("10"));
        assert!(users.arguments["filter"].default_value.is_none());

        let Some(TypeDef::InputObject { fields }) = graph.get("UserFilter").map(|t| &t.def) else {
            panic!("UserFilter should be an input object");
        };
        assert_eq!(fields["role"].default_value.as_deref(), Some("GUEST"));
    }

    #[test]
    fn test_builtins_are_added() {
        let graph = parse_schema("type Query { ok: Boolean }").unwrap();
        for name in BUILTIN_SCALARS {
            assert!(graph.contains(name), "missing builtin scalar {name}");
        }
        for name in ["skip", "include", "deprecated", "specifiedBy"] {
            assert!(graph.directive(name).is_some(), "missing builtin directive @{name}");
        }
    }

    #[test]
    fn test_deprecation_reason() {
        let graph = parse_schema(
            r#"
            type Query {
                old: String @deprecated(reason: "Use new")
                bare: String @deprecated
                new: String
            }
            "#,
        )
        .unwrap();
        let Some(TypeDef::Object { fields, .. }) = graph.get("Query").map(|t| &t.def) else {
            panic!("Query should be an object");
        };
        assert_eq!(fields["old"].deprecation, Some(Deprecation::new(Some("Use new".to_string()))));
        assert_eq!(fields["bare"].deprecation, Some(Deprecation::new(None)));
        assert_eq!(fields["new"].deprecation, None);
    }

    #[test]
    fn test_schema_definition_sets_roots() {
        let graph = parse_schema(
            r#"
            schema { query: RootQuery mutation: RootMutation }
            type RootQuery { ok: Boolean }
            type RootMutation { ping: Boolean }
            type Query { unused: Boolean }
            "#,
        )
        .unwrap();
        assert_eq!(graph.roots().query.as_deref(), Some("RootQuery"));
        assert_eq!(graph.roots().mutation.as_deref(), Some("RootMutation"));
        assert_eq!(graph.roots().subscription, None);
    }

    #[test]
    fn test_extensions_are_applied() {
        let graph = parse_schema(
            r#"
            extend type Query { extra: Int }
            type Query { ok: Boolean }
            enum Color { RED }
            extend enum Color { GREEN }
            "#,
        )
        .unwrap();
        let Some(TypeDef::Object { fields, .. }) = graph.get("Query").map(|t| &t.def) else {
            panic!("Query should be an object");
        };
        assert!(fields.contains_key("ok"));
        assert!(fields.contains_key("extra"));
        let Some(TypeDef::Enum { values }) = graph.get("Color").map(|t| &t.def) else {
            panic!("Color should be an enum");
        };
        assert_eq!(values.keys().collect::<Vec<_>>(), vec!["RED", "GREEN"]);
    }

    #[test]
    fn test_schema_extension_keeps_conventional_roots() {
        let graph = parse_schema(
            r#"
            type Query { a: Int }
            type Mutation { b: Int }
            type Events { c: Int }
            extend schema { subscription: Events }
            "#,
        )
        .unwrap();
        assert_eq!(graph.roots().query.as_deref(), Some("Query"));
        assert_eq!(graph.roots().mutation.as_deref(), Some("Mutation"));
        assert_eq!(graph.roots().subscription.as_deref(), Some("Events"));
    }

    #[test]
    fn test_duplicate_members_are_rejected() {
        let cases = [
            ("type Query { a: Int a: String }", "Query", "a"),
            ("type Query { a: Int! } extend type Query { a: String }", "Query", "a"),
            ("type Query { a(x: Int, x: Int): Int }", "Query.a", "x"),
            ("type Query { ok: Boolean } input In { f: Int } extend input In { f: Int }", "In", "f"),
            ("type Query { ok: Boolean } enum Color { RED RED }", "Color", "RED"),
            ("type Query { ok: Boolean } enum Color { RED } extend enum Color { RED }", "Color", "RED"),
            ("type Query { ok: Boolean } directive @d(x: Int, x: Int) on FIELD", "@d", "x"),
        ];
        for (sdl, expected_owner, expected_name) in cases {
            match parse_schema(sdl) {
                Err(LoadError::DuplicateMember { owner, name }) => {
                    assert_eq!((owner.as_str(), name.as_str()), (expected_owner, expected_name), "{sdl}");
                }
                other => panic!("expected duplicate member for {sdl}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_extending_undefined_type_fails() {
        let err = parse_schema("type Query { ok: Boolean } extend type Missing { x: Int }").unwrap_err();
        assert!(matches!(err, LoadError::ExtendUndefined(name) if name == "Missing"));
    }

    #[test]
    fn test_extending_with_wrong_kind_fails() {
        let err = parse_schema("type Query { ok: Boolean } enum Color { RED } extend type Color { x: Int }").unwrap_err();
        assert!(matches!(err, LoadError::ExtendKindMismatch { .. }));
    }

    #[test]
    fn test_repeatable_directive() {
        let graph = parse_schema(
            r#"
            type Query { ok: Boolean }
            directive @tag(name: String!) repeatable on OBJECT | FIELD_DEFINITION
            "#,
        )
        .unwrap();
        let tag = graph.directive("tag").unwrap();
        assert!(tag.repeatable);
        assert_eq!(tag.locations.len(), 2);
        assert!(tag.arguments["name"].is_required());
    }

    #[test]
    fn test_missing_query_root_is_an_integrity_error() {
        let err = parse_schema("type User { id: ID }").unwrap_err();
        assert!(matches!(err, LoadError::Integrity(IntegrityError::MissingQueryRoot)));
    }

    #[test]
    fn test_dangling_reference_is_rejected() {
        let err = parse_schema("type Query { user: User }").unwrap_err();
        assert!(matches!(err, LoadError::Integrity(IntegrityError::DanglingReference { .. })));
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let err = parse_schema("type Query { ok: Boolean } type Query { other: Int }").unwrap_err();
        assert!(matches!(err, LoadError::Integrity(IntegrityError::DuplicateType(name)) if name == "Query"));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_schema("type Query {").unwrap_err(), LoadError::Syntax(_)));
    }

    #[tokio::test]
    async fn test_load_inline_sdl() {
        let loaded = load_schema("type Query { ok: Boolean }").await.unwrap();
        assert_eq!(loaded.source, "<inline>");
        assert!(loaded.graph.contains("Query"));
    }

    #[tokio::test]
    async fn test_load_missing_sdl_file() {
        let err = load_schema("does/not/exist.graphql").await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
