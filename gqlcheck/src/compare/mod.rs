//! Per-kind type comparators.
//!
//! [`compare_named_types`] is the single dispatch point over [`TypeDef`]; the
//! match is exhaustive so a new kind cannot be left uncompared.

mod directives;
mod fields;
mod inputs;
mod members;

use crate::change::{Change, ChangeKind, Severity};
use crate::diff::{DiffOptions, DiffRule};
use crate::errors::CompareError;
use crate::types::{Deprecation, NamedType, TypeDef, TypeGraph};
use crate::variance::VarianceResolver;

pub(crate) use directives::compare_directives;

/// Shared state for one comparison run: both graphs, the options and the
/// changes found so far.
pub(crate) struct Comparison<'a> {
    pub old: &'a TypeGraph,
    pub new: &'a TypeGraph,
    pub options: &'a DiffOptions,
    pub variance: VarianceResolver<'a>,
    changes: Vec<Change>,
}

impl<'a> Comparison<'a> {
    pub fn new(old: &'a TypeGraph, new: &'a TypeGraph, options: &'a DiffOptions) -> Self {
        Self {
            old,
            new,
            options,
            variance: VarianceResolver::new(old, new),
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Severity for removing something that may already have been deprecated.
    pub fn removal_severity(&self, deprecation: Option<&Deprecation>) -> Severity {
        if deprecation.is_some() && self.options.has_rule(DiffRule::SuppressRemovalOfDeprecatedField) {
            Severity::Dangerous
        } else {
            Severity::Breaking
        }
    }

    /// Record a description change on `path`, unless descriptions are ignored.
    pub fn description(&mut self, path: &str, subject: &str, old: Option<&str>, new: Option<&str>) {
        if self.options.ignores_descriptions() || old == new {
            return;
        }
        let message = match (old, new) {
            (None, Some(_)) => format!("Description was added to {subject}"),
            (Some(_), None) => format!("Description was removed from {subject}"),
            _ => format!("Description of {subject} changed"),
        };
        let mut change = Change::new(ChangeKind::DescriptionChanged, Severity::Safe, path, message);
        if let Some(old) = old {
            change = change.with_meta("oldDescription", old);
        }
        if let Some(new) = new {
            change = change.with_meta("newDescription", new);
        }
        self.push(change);
    }

    /// Record deprecation added, removed, or reason changed on `path`.
    pub fn deprecation(&mut self, path: &str, subject: &str, old: Option<&Deprecation>, new: Option<&Deprecation>) {
        let change = match (old, new) {
            (None, Some(dep)) => {
                let change = Change::new(
                    ChangeKind::DeprecationAdded,
                    Severity::Safe,
                    path,
                    format!("{subject} was deprecated"),
                );
                match &dep.reason {
                    Some(reason) => change.with_meta("deprecationReason", reason.as_str()),
                    None => change,
                }
            }
            (Some(_), None) => Change::new(
                ChangeKind::DeprecationRemoved,
                Severity::Safe,
                path,
                format!("{subject} is no longer deprecated"),
            ),
            (Some(old_dep), Some(new_dep)) if old_dep.reason != new_dep.reason => Change::new(
                ChangeKind::DeprecationReasonChanged,
                Severity::Safe,
                path,
                format!("Deprecation reason of {subject} changed"),
            )
            .with_meta("oldReason", old_dep.reason.clone().unwrap_or_default())
            .with_meta("newReason", new_dep.reason.clone().unwrap_or_default()),
            _ => return,
        };
        self.push(change);
    }
}

/// Compare two same-named types of the same kind.
///
/// Callers report kind changes themselves and must not dispatch them here.
pub(crate) fn compare_named_types(cmp: &mut Comparison<'_>, old: &NamedType, new: &NamedType) -> Result<(), CompareError> {
    let type_name = old.name.as_str();
    cmp.description(
        type_name,
        &format!("type '{type_name}'"),
        old.description.as_deref(),
        new.description.as_deref(),
    );

    match (&old.def, &new.def) {
        (TypeDef::Scalar, TypeDef::Scalar) => {}
        (
            TypeDef::Object {
                fields: old_fields,
                interfaces: old_interfaces,
            },
            TypeDef::Object {
                fields: new_fields,
                interfaces: new_interfaces,
            },
        )
        | (
            TypeDef::Interface {
                fields: old_fields,
                interfaces: old_interfaces,
            },
            TypeDef::Interface {
                fields: new_fields,
                interfaces: new_interfaces,
            },
        ) => {
            fields::compare_fields(cmp, type_name, old_fields, new_fields)?;
            members::compare_interfaces(cmp, type_name, old_interfaces, new_interfaces);
        }
        (TypeDef::Union { members: old_members }, TypeDef::Union { members: new_members }) => {
            members::compare_union_members(cmp, type_name, old_members, new_members);
        }
        (TypeDef::Enum { values: old_values }, TypeDef::Enum { values: new_values }) => {
            members::compare_enum_values(cmp, type_name, old_values, new_values);
        }
        (TypeDef::InputObject { fields: old_fields }, TypeDef::InputObject { fields: new_fields }) => {
            inputs::compare_input_fields(cmp, type_name, old_fields, new_fields)?;
        }
        _ => debug_assert!(false, "'{type_name}' dispatched with differing kinds"),
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::errors::Operation;
    use crate::types::{FieldDef, NamedType, TypeGraph, TypeRef};

    /// Graph with builtins, a `Query` root, and the given extra types.
    pub fn graph(types: Vec<NamedType>) -> TypeGraph {
        let mut graph = TypeGraph::with_builtins();
        let mut has_query = false;
        for ty in types {
            has_query |= ty.name == "Query";
            graph.insert_type(ty).unwrap();
        }
        if !has_query {
            graph
                .insert_type(NamedType::object("Query", vec![FieldDef::new("ok", TypeRef::named("Boolean"))]))
                .unwrap();
        }
        graph.set_root(Operation::Query, Some("Query".to_string()));
        graph
    }
}
