use indexmap::IndexMap;

use super::Comparison;
use crate::change::{Change, ChangeKind, Severity, argument_path, field_path};
use crate::errors::CompareError;
use crate::types::{ArgumentDef, FieldDef, Position};

/// Compare the fields of two object or interface types.
pub(super) fn compare_fields(
    cmp: &mut Comparison<'_>,
    type_name: &str,
    old_fields: &IndexMap<String, FieldDef>,
    new_fields: &IndexMap<String, FieldDef>,
) -> Result<(), CompareError> {
    // Removed fields
    for (name, old_field) in old_fields {
        if !new_fields.contains_key(name) {
            let path = field_path(type_name, name);
            let severity = cmp.removal_severity(old_field.deprecation.as_ref());
            let mut change = Change::new(
                ChangeKind::FieldRemoved,
                severity,
                &path,
                format!("Field '{path}' was removed"),
            )
            .with_meta("typeName", type_name)
            .with_meta("fieldName", name.as_str());
            if old_field.deprecation.is_some() {
                change = change.with_meta("deprecated", "true");
            }
            cmp.push(change);
        }
    }

    // Added fields
    for (name, new_field) in new_fields {
        if !old_fields.contains_key(name) {
            let path = field_path(type_name, name);
            cmp.push(
                Change::new(ChangeKind::FieldAdded, Severity::Safe, &path, format!("Field '{path}' was added"))
                    .with_meta("typeName", type_name)
                    .with_meta("fieldName", name.as_str())
                    .with_meta("fieldType", new_field.ty.to_string()),
            );
        }
    }

    // Modified fields
    for (name, old_field) in old_fields {
        if let Some(new_field) = new_fields.get(name) {
            compare_field(cmp, type_name, old_field, new_field)?;
        }
    }

    Ok(())
}

fn compare_field(
    cmp: &mut Comparison<'_>,
    type_name: &str,
    old_field: &FieldDef,
    new_field: &FieldDef,
) -> Result<(), CompareError> {
    let path = field_path(type_name, &old_field.name);

    if let Some(severity) = cmp
        .variance
        .classify(&path, &old_field.ty, &new_field.ty, Position::Output)?
    {
        let old_ty = old_field.ty.to_string();
        let new_ty = new_field.ty.to_string();
        cmp.push(
            Change::new(
                ChangeKind::FieldTypeChanged,
                severity,
                &path,
                format!("Field '{path}' changed type from '{old_ty}' to '{new_ty}'"),
            )
            .with_meta("typeName", type_name)
            .with_meta("fieldName", old_field.name.as_str())
            .with_meta("oldType", old_ty)
            .with_meta("newType", new_ty),
        );
    }

    let subject = format!("field '{path}'");
    cmp.description(
        &path,
        &subject,
        old_field.description.as_deref(),
        new_field.description.as_deref(),
    );
    cmp.deprecation(
        &path,
        &format!("Field '{path}'"),
        old_field.deprecation.as_ref(),
        new_field.deprecation.as_ref(),
    );

    compare_arguments(cmp, &path, &subject, &old_field.arguments, &new_field.arguments)
}

/// Compare the argument lists of a field or directive located at `owner_path`.
pub(super) fn compare_arguments(
    cmp: &mut Comparison<'_>,
    owner_path: &str,
    owner: &str,
    old_args: &IndexMap<String, ArgumentDef>,
    new_args: &IndexMap<String, ArgumentDef>,
) -> Result<(), CompareError> {
    for name in old_args.keys() {
        if !new_args.contains_key(name) {
            cmp.push(
                Change::new(
                    ChangeKind::ArgumentRemoved,
                    Severity::Breaking,
                    argument_path(owner_path, name),
                    format!("Argument '{name}' was removed from {owner}"),
                )
                .with_meta("ownerPath", owner_path)
                .with_meta("argName", name.as_str()),
            );
        }
    }

    for (name, new_arg) in new_args {
        if !old_args.contains_key(name) {
            let (severity, message) = if new_arg.is_required() {
                (
                    Severity::Breaking,
                    format!("Required argument '{name}' was added to {owner}"),
                )
            } else {
                (Severity::Safe, format!("Optional argument '{name}' was added to {owner}"))
            };
            cmp.push(
                Change::new(ChangeKind::ArgumentAdded, severity, argument_path(owner_path, name), message)
                    .with_meta("ownerPath", owner_path)
                    .with_meta("argName", name.as_str())
                    .with_meta("argType", new_arg.ty.to_string()),
            );
        }
    }

    for (name, old_arg) in old_args {
        let Some(new_arg) = new_args.get(name) else {
            continue;
        };
        let path = argument_path(owner_path, name);

        if let Some(severity) = cmp
            .variance
            .classify(&path, &old_arg.ty, &new_arg.ty, Position::Input)?
        {
            let old_ty = old_arg.ty.to_string();
            let new_ty = new_arg.ty.to_string();
            cmp.push(
                Change::new(
                    ChangeKind::ArgumentTypeChanged,
                    severity,
                    &path,
                    format!("Type of argument '{name}' on {owner} changed from '{old_ty}' to '{new_ty}'"),
                )
                .with_meta("ownerPath", owner_path)
                .with_meta("argName", name.as_str())
                .with_meta("oldType", old_ty)
                .with_meta("newType", new_ty),
            );
        }

        if old_arg.default_value != new_arg.default_value {
            let old_default = old_arg.default_value.as_deref().unwrap_or("none");
            let new_default = new_arg.default_value.as_deref().unwrap_or("none");
            cmp.push(
                Change::new(
                    ChangeKind::ArgumentDefaultChanged,
                    Severity::Dangerous,
                    &path,
                    format!("Default value of argument '{name}' on {owner} changed from {old_default} to {new_default}"),
                )
                .with_meta("ownerPath", owner_path)
                .with_meta("argName", name.as_str())
                .with_meta("oldDefault", old_default)
                .with_meta("newDefault", new_default),
            );
        }

        let subject = format!("argument '{name}' on {owner}");
        cmp.description(
            &path,
            &subject,
            old_arg.description.as_deref(),
            new_arg.description.as_deref(),
        );
        cmp.deprecation(
            &path,
            &format!("Argument '{name}' on {owner}"),
            old_arg.deprecation.as_ref(),
            new_arg.deprecation.as_ref(),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::test_support::graph;
    use crate::compare::{Comparison, compare_named_types};
    use crate::diff::{DiffOptions, DiffRule};
    use crate::types::{NamedType, TypeRef};

    fn named(name: &str) -> TypeRef {
        TypeRef::named(name)
    }

    fn run(old: NamedType, new: NamedType, options: &DiffOptions) -> Vec<Change> {
        let name = old.name.clone();
        let old_graph = graph(vec![old]);
        let new_graph = graph(vec![new]);
        let mut cmp = Comparison::new(&old_graph, &new_graph, options);
        compare_named_types(&mut cmp, old_graph.get(&name).unwrap(), new_graph.get(&name).unwrap()).unwrap();
        cmp.into_changes()
    }

    #[test]
    fn test_field_removed_and_added() {
        let old = NamedType::object("User", vec![FieldDef::new("id", named("ID")), FieldDef::new("legacy", named("String"))]);
        let new = NamedType::object("User", vec![FieldDef::new("id", named("ID")), FieldDef::new("avatar", named("String"))]);

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind(), ChangeKind::FieldRemoved);
        assert_eq!(changes[0].severity(), Severity::Breaking);
        assert_eq!(changes[0].path(), "User.legacy");
        assert_eq!(changes[1].kind(), ChangeKind::FieldAdded);
        assert_eq!(changes[1].severity(), Severity::Safe);
        assert_eq!(changes[1].path(), "User.avatar");
    }

    #[test]
    fn test_interface_field_added_is_safe() {
        let old = NamedType::interface("Node", vec![FieldDef::new("id", named("ID"))]);
        let new = NamedType::interface(
            "Node",
            vec![FieldDef::new("id", named("ID")), FieldDef::new("createdAt", named("String"))],
        );

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].severity(), Severity::Safe);
        assert_eq!(changes[0].path(), "Node.createdAt");
    }

    #[test]
    fn test_field_type_change_metadata() {
        let old = NamedType::object("User", vec![FieldDef::new("name", TypeRef::non_null(named("String")))]);
        let new = NamedType::object("User", vec![FieldDef::new("name", named("String"))]);

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::FieldTypeChanged);
        assert_eq!(changes[0].severity(), Severity::Dangerous);
        assert_eq!(changes[0].meta()["oldType"], "String!");
        assert_eq!(changes[0].meta()["newType"], "String");
    }

    #[test]
    fn test_required_argument_added_is_breaking() {
        let old = NamedType::object("Query", vec![FieldDef::new("users", TypeRef::list(named("String")))]);
        let new = NamedType::object(
            "Query",
            vec![
                FieldDef::new("users", TypeRef::list(named("String")))
                    .with_argument(ArgumentDef::new("limit", TypeRef::non_null(named("Int")))),
            ],
        );

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::ArgumentAdded);
        assert_eq!(changes[0].severity(), Severity::Breaking);
        assert_eq!(changes[0].path(), "Query.users(limit:)");
    }

    #[test]
    fn test_non_null_argument_with_default_is_optional() {
        let old = NamedType::object("Query", vec![FieldDef::new("users", TypeRef::list(named("String")))]);
        let new = NamedType::object(
            "Query",
            vec![
                FieldDef::new("users", TypeRef::list(named("String")))
                    .with_argument(ArgumentDef::new("limit", TypeRef::non_null(named("Int"))).with_default("10")),
            ],
        );

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].severity(), Severity::Safe);
    }

    #[test]
    fn test_argument_removed_and_default_changed() {
        let old = NamedType::object(
            "Query",
            vec![
                FieldDef::new("users", named("String"))
                    .with_argument(ArgumentDef::new("limit", named("Int")).with_default("10"))
                    .with_argument(ArgumentDef::new("offset", named("Int"))),
            ],
        );
        let new = NamedType::object(
            "Query",
            vec![FieldDef::new("users", named("String")).with_argument(ArgumentDef::new("limit", named("Int")).with_default("20"))],
        );

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind(), ChangeKind::ArgumentRemoved);
        assert_eq!(changes[0].severity(), Severity::Breaking);
        assert_eq!(changes[0].path(), "Query.users(offset:)");
        assert_eq!(changes[1].kind(), ChangeKind::ArgumentDefaultChanged);
        assert_eq!(changes[1].severity(), Severity::Dangerous);
    }

    #[test]
    fn test_argument_made_required_is_breaking() {
        let old = NamedType::object(
            "Query",
            vec![FieldDef::new("users", named("String")).with_argument(ArgumentDef::new("limit", named("Int")))],
        );
        let new = NamedType::object(
            "Query",
            vec![FieldDef::new("users", named("String")).with_argument(ArgumentDef::new("limit", TypeRef::non_null(named("Int"))))],
        );

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::ArgumentTypeChanged);
        assert_eq!(changes[0].severity(), Severity::Breaking);
    }

    #[test]
    fn test_field_deprecation_is_safe() {
        let old = NamedType::object("User", vec![FieldDef::new("login", named("String"))]);
        let new = NamedType::object("User", vec![FieldDef::new("login", named("String")).deprecated(Some("Use handle"))]);

        let changes = run(old, new, &DiffOptions::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::DeprecationAdded);
        assert_eq!(changes[0].severity(), Severity::Safe);
        assert_eq!(changes[0].meta()["deprecationReason"], "Use handle");
    }

    #[test]
    fn test_removal_of_deprecated_field_can_be_suppressed() {
        let old = NamedType::object(
            "User",
            vec![FieldDef::new("id", named("ID")), FieldDef::new("login", named("String")).deprecated(None)],
        );
        let new = NamedType::object("User", vec![FieldDef::new("id", named("ID"))]);
        let options = DiffOptions {
            rules: vec![DiffRule::SuppressRemovalOfDeprecatedField],
            ..Default::default()
        };

        let changes = run(old, new, &options);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].severity(), Severity::Dangerous);
        assert_eq!(changes[0].meta()["deprecated"], "true");
    }
}
