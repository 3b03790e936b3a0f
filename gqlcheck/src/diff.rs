//! Diff orchestration: pairs the entities of two type graphs by name and
//! collects the classified changes in report order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::change::{Change, ChangeKind, ChangeSummary, Severity, sort_changes};
use crate::compare::{Comparison, compare_directives, compare_named_types};
use crate::errors::{CompareError, ConfigError, Operation, Side};
use crate::types::TypeGraph;

/// Optional classification rules layered on top of the default severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffRule {
    /// Removing something already deprecated is dangerous rather than breaking.
    SuppressRemovalOfDeprecatedField,
    /// Same as [`DiffOptions::ignore_descriptions`].
    IgnoreDescriptionChanges,
    /// Changes on types unreachable from the old roots are safe.
    SafeUnreachable,
}

impl DiffRule {
    pub const ALL: [DiffRule; 3] = [
        DiffRule::SuppressRemovalOfDeprecatedField,
        DiffRule::IgnoreDescriptionChanges,
        DiffRule::SafeUnreachable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiffRule::SuppressRemovalOfDeprecatedField => "suppress-removal-of-deprecated-field",
            DiffRule::IgnoreDescriptionChanges => "ignore-description-changes",
            DiffRule::SafeUnreachable => "safe-unreachable",
        }
    }
}

impl fmt::Display for DiffRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DiffRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiffRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRule(s.to_string()))
    }
}

/// Options for schema diffing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Skip description changes entirely
    pub ignore_descriptions: bool,

    /// Skip directive definitions entirely
    pub ignore_directives: bool,

    /// Extra classification rules
    pub rules: Vec<DiffRule>,
}

impl DiffOptions {
    /// Reject option sets that cannot be applied unambiguously.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, rule) in self.rules.iter().enumerate() {
            if self.rules[..i].contains(rule) {
                return Err(ConfigError::DuplicateRule(*rule));
            }
        }
        Ok(())
    }

    pub fn has_rule(&self, rule: DiffRule) -> bool {
        self.rules.contains(&rule)
    }

    pub fn ignores_descriptions(&self) -> bool {
        self.ignore_descriptions || self.has_rule(DiffRule::IgnoreDescriptionChanges)
    }
}

/// Compare two schema versions and return every change, most severe first.
///
/// Both graphs are validated before anything is compared, so a malformed
/// input fails the whole call instead of yielding a partial list. Finding
/// breaking changes is a normal result.
pub fn compare_schemas(old: &TypeGraph, new: &TypeGraph, options: &DiffOptions) -> Result<Vec<Change>, CompareError> {
    options.validate()?;
    old.validate().map_err(CompareError::integrity(Side::Old))?;
    new.validate().map_err(CompareError::integrity(Side::New))?;

    let mut cmp = Comparison::new(old, new, options);
    compare_type_sets(&mut cmp)?;
    compare_roots(&mut cmp);
    if !options.ignore_directives {
        compare_directives(&mut cmp)?;
    }

    let mut changes = cmp.into_changes();
    if options.has_rule(DiffRule::SafeUnreachable) {
        changes = downgrade_unreachable(old, changes);
    }
    sort_changes(&mut changes);

    let summary = ChangeSummary::from_changes(&changes);
    log::debug!(
        "compared {} old / {} new types: {} breaking, {} dangerous, {} safe",
        old.type_count(),
        new.type_count(),
        summary.breaking,
        summary.dangerous,
        summary.safe
    );
    Ok(changes)
}

fn compare_type_sets(cmp: &mut Comparison<'_>) -> Result<(), CompareError> {
    let (old, new) = (cmp.old, cmp.new);

    for ty in old.types().filter(|ty| !new.contains(&ty.name)) {
        let kind = ty.kind();
        cmp.push(
            Change::new(
                ChangeKind::TypeRemoved,
                Severity::Breaking,
                &ty.name,
                format!("Type '{}' was removed", ty.name),
            )
            .with_meta("typeName", ty.name.as_str())
            .with_meta("typeKind", kind.to_string()),
        );
    }

    for ty in new.types().filter(|ty| !old.contains(&ty.name)) {
        cmp.push(
            Change::new(
                ChangeKind::TypeAdded,
                Severity::Safe,
                &ty.name,
                format!("Type '{}' was added", ty.name),
            )
            .with_meta("typeName", ty.name.as_str())
            .with_meta("typeKind", ty.kind().to_string()),
        );
    }

    for old_ty in old.types() {
        let Some(new_ty) = new.get(&old_ty.name) else {
            continue;
        };
        let (old_kind, new_kind) = (old_ty.kind(), new_ty.kind());
        if old_kind != new_kind {
            cmp.push(
                Change::new(
                    ChangeKind::TypeKindChanged,
                    Severity::Breaking,
                    &old_ty.name,
                    format!("'{}' kind changed from {old_kind} to {new_kind}", old_ty.name),
                )
                .with_meta("typeName", old_ty.name.as_str())
                .with_meta("oldKind", old_kind.to_string())
                .with_meta("newKind", new_kind.to_string()),
            );
            continue;
        }
        log::trace!("comparing type '{}'", old_ty.name);
        compare_named_types(cmp, old_ty, new_ty)?;
    }

    Ok(())
}

fn compare_roots(cmp: &mut Comparison<'_>) {
    let (old, new) = (cmp.old, cmp.new);
    let (old, new) = (old.roots(), new.roots());

    for operation in Operation::ALL {
        let change = match (old.get(operation), new.get(operation)) {
            (Some(before), None) => Change::new(
                ChangeKind::RootTypeRemoved,
                Severity::Breaking,
                before,
                format!("Schema {operation} root type '{before}' was removed"),
            )
            .with_meta("operation", operation.to_string())
            .with_meta("oldType", before),
            (None, Some(after)) => Change::new(
                ChangeKind::RootTypeAdded,
                Severity::Safe,
                after,
                format!("Schema {operation} root type '{after}' was added"),
            )
            .with_meta("operation", operation.to_string())
            .with_meta("newType", after),
            (Some(before), Some(after)) if before != after => Change::new(
                ChangeKind::RootTypeChanged,
                Severity::Breaking,
                before,
                format!("Schema {operation} root type changed from '{before}' to '{after}'"),
            )
            .with_meta("operation", operation.to_string())
            .with_meta("oldType", before)
            .with_meta("newType", after),
            _ => continue,
        };
        cmp.push(change);
    }
}

fn downgrade_unreachable(old: &TypeGraph, changes: Vec<Change>) -> Vec<Change> {
    let reachable = old.reachable_types();
    changes
        .into_iter()
        .map(|change| match change.type_name() {
            Some(name) if !reachable.contains(name) && change.severity() != Severity::Safe => {
                log::trace!("'{}' is unreachable, downgrading to safe", change.path());
                change.reclassified(Severity::Safe)
            }
            _ => change,
        })
        .collect()
}
