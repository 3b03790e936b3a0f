use super::Comparison;
use super::fields::compare_arguments;
use crate::change::{Change, ChangeKind, Severity, directive_path};
use crate::errors::CompareError;
use crate::types::DirectiveDef;

/// Compare the directive definitions of both graphs.
pub(crate) fn compare_directives(cmp: &mut Comparison<'_>) -> Result<(), CompareError> {
    let (old, new) = (cmp.old, cmp.new);

    for directive in old.directives() {
        if new.directive(&directive.name).is_none() {
            let path = directive_path(&directive.name);
            cmp.push(
                Change::new(
                    ChangeKind::DirectiveRemoved,
                    Severity::Breaking,
                    &path,
                    format!("Directive '{path}' was removed"),
                )
                .with_meta("directiveName", directive.name.as_str()),
            );
        }
    }

    for directive in new.directives() {
        if old.directive(&directive.name).is_none() {
            let path = directive_path(&directive.name);
            cmp.push(
                Change::new(
                    ChangeKind::DirectiveAdded,
                    Severity::Safe,
                    &path,
                    format!("Directive '{path}' was added"),
                )
                .with_meta("directiveName", directive.name.as_str()),
            );
        }
    }

    for old_directive in old.directives() {
        if let Some(new_directive) = new.directive(&old_directive.name) {
            compare_directive(cmp, old_directive, new_directive)?;
        }
    }

    Ok(())
}

fn compare_directive(cmp: &mut Comparison<'_>, old: &DirectiveDef, new: &DirectiveDef) -> Result<(), CompareError> {
    let path = directive_path(&old.name);
    let subject = format!("directive '{path}'");

    cmp.description(&path, &subject, old.description.as_deref(), new.description.as_deref());

    for location in old.locations.difference(&new.locations) {
        cmp.push(
            Change::new(
                ChangeKind::DirectiveLocationRemoved,
                Severity::Breaking,
                &path,
                format!("Location '{location}' was removed from directive '{path}'"),
            )
            .with_meta("directiveName", old.name.as_str())
            .with_meta("location", location.to_string()),
        );
    }
    for location in new.locations.difference(&old.locations) {
        cmp.push(
            Change::new(
                ChangeKind::DirectiveLocationAdded,
                Severity::Safe,
                &path,
                format!("Location '{location}' was added to directive '{path}'"),
            )
            .with_meta("directiveName", old.name.as_str())
            .with_meta("location", location.to_string()),
        );
    }

    match (old.repeatable, new.repeatable) {
        (true, false) => cmp.push(
            Change::new(
                ChangeKind::DirectiveRepeatableRemoved,
                Severity::Breaking,
                &path,
                format!("Directive '{path}' is no longer repeatable"),
            )
            .with_meta("directiveName", old.name.as_str()),
        ),
        (false, true) => cmp.push(
            Change::new(
                ChangeKind::DirectiveRepeatableAdded,
                Severity::Safe,
                &path,
                format!("Directive '{path}' is now repeatable"),
            )
            .with_meta("directiveName", old.name.as_str()),
        ),
        _ => {}
    }

    compare_arguments(cmp, &path, &subject, &old.arguments, &new.arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::test_support::graph;
    use crate::diff::DiffOptions;
    use crate::types::{ArgumentDef, DirectiveLocation, TypeGraph, TypeRef};

    fn with_directive(directive: DirectiveDef) -> TypeGraph {
        let mut g = graph(vec![]);
        g.insert_directive(directive).unwrap();
        g
    }

    fn run(old: &TypeGraph, new: &TypeGraph) -> Vec<Change> {
        let options = DiffOptions::default();
        let mut cmp = Comparison::new(old, new, &options);
        compare_directives(&mut cmp).unwrap();
        cmp.into_changes()
    }

    #[test]
    fn test_builtin_directives_produce_no_changes() {
        let g = graph(vec![]);
        assert!(run(&g, &g).is_empty());
    }

    #[test]
    fn test_directive_removed_and_added() {
        let old = with_directive(DirectiveDef::new("auth", &[DirectiveLocation::FieldDefinition]));
        let new = with_directive(DirectiveDef::new("cache", &[DirectiveLocation::FieldDefinition]));

        let changes = run(&old, &new);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind(), ChangeKind::DirectiveRemoved);
        assert_eq!(changes[0].severity(), Severity::Breaking);
        assert_eq!(changes[0].path(), "@auth");
        assert_eq!(changes[1].kind(), ChangeKind::DirectiveAdded);
        assert_eq!(changes[1].severity(), Severity::Safe);
    }

    #[test]
    fn test_directive_locations_and_repeatable() {
        let old = with_directive(DirectiveDef::new(
            "tag",
            &[DirectiveLocation::Object, DirectiveLocation::FieldDefinition],
        ));
        let mut tag = DirectiveDef::new("tag", &[DirectiveLocation::Object, DirectiveLocation::Enum]);
        tag.repeatable = true;
        let new = with_directive(tag);

        let changes = run(&old, &new);
        let kinds: Vec<_> = changes.iter().map(|c| (c.kind(), c.severity())).collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::DirectiveLocationRemoved, Severity::Breaking),
                (ChangeKind::DirectiveLocationAdded, Severity::Safe),
                (ChangeKind::DirectiveRepeatableAdded, Severity::Safe),
            ]
        );
        assert_eq!(changes[0].meta()["location"], "FIELD_DEFINITION");
    }

    #[test]
    fn test_required_directive_argument_added() {
        let old = with_directive(DirectiveDef::new("auth", &[DirectiveLocation::FieldDefinition]));
        let new = with_directive(
            DirectiveDef::new("auth", &[DirectiveLocation::FieldDefinition])
                .with_argument(ArgumentDef::new("role", TypeRef::non_null(TypeRef::named("String")))),
        );

        let changes = run(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::ArgumentAdded);
        assert_eq!(changes[0].severity(), Severity::Breaking);
        assert_eq!(changes[0].path(), "@auth(role:)");
    }
}
