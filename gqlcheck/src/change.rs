//! Types for representing schema changes between versions.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Compatibility class of a change.
///
/// Variants are declared most severe first, so the derived `Ord` sorts
/// breaking changes ahead of dangerous and safe ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Can make a previously valid client interaction fail.
    Breaking,
    /// Not guaranteed to break clients, but risky.
    Dangerous,
    /// Cannot invalidate any existing client interaction.
    Safe,
}

impl Severity {
    pub fn criticality(self) -> Criticality {
        match self {
            Severity::Breaking => Criticality::High,
            Severity::Dangerous => Criticality::Medium,
            Severity::Safe => Criticality::Low,
        }
    }

    /// The more severe of the two.
    pub fn escalate(self, other: Severity) -> Severity {
        self.min(other)
    }

    /// Whether this severity is `threshold` or worse.
    pub fn is_at_least(self, threshold: Severity) -> bool {
        self <= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Breaking => write!(f, "BREAKING"),
            Severity::Dangerous => write!(f, "DANGEROUS"),
            Severity::Safe => write!(f, "SAFE"),
        }
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breaking" => Ok(Severity::Breaking),
            "dangerous" => Ok(Severity::Dangerous),
            "safe" | "non-breaking" | "non_breaking" => Ok(Severity::Safe),
            _ => Err(ConfigError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Criticality label, one-to-one with [`Severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    High,
    Medium,
    Low,
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criticality::High => write!(f, "HIGH"),
            Criticality::Medium => write!(f, "MEDIUM"),
            Criticality::Low => write!(f, "LOW"),
        }
    }
}

/// What kind of structural delta a change records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    TypeAdded,
    TypeRemoved,
    TypeKindChanged,
    DescriptionChanged,
    DeprecationAdded,
    DeprecationRemoved,
    DeprecationReasonChanged,
    FieldAdded,
    FieldRemoved,
    FieldTypeChanged,
    ArgumentAdded,
    ArgumentRemoved,
    ArgumentTypeChanged,
    ArgumentDefaultChanged,
    InterfaceAdded,
    InterfaceRemoved,
    UnionMemberAdded,
    UnionMemberRemoved,
    EnumValueAdded,
    EnumValueRemoved,
    InputFieldAdded,
    InputFieldRemoved,
    InputFieldTypeChanged,
    InputFieldDefaultChanged,
    RootTypeAdded,
    RootTypeRemoved,
    RootTypeChanged,
    DirectiveAdded,
    DirectiveRemoved,
    DirectiveLocationAdded,
    DirectiveLocationRemoved,
    DirectiveRepeatableAdded,
    DirectiveRepeatableRemoved,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::TypeAdded => "TYPE_ADDED",
            ChangeKind::TypeRemoved => "TYPE_REMOVED",
            ChangeKind::TypeKindChanged => "TYPE_KIND_CHANGED",
            ChangeKind::DescriptionChanged => "DESCRIPTION_CHANGED",
            ChangeKind::DeprecationAdded => "DEPRECATION_ADDED",
            ChangeKind::DeprecationRemoved => "DEPRECATION_REMOVED",
            ChangeKind::DeprecationReasonChanged => "DEPRECATION_REASON_CHANGED",
            ChangeKind::FieldAdded => "FIELD_ADDED",
            ChangeKind::FieldRemoved => "FIELD_REMOVED",
            ChangeKind::FieldTypeChanged => "FIELD_TYPE_CHANGED",
            ChangeKind::ArgumentAdded => "ARGUMENT_ADDED",
            ChangeKind::ArgumentRemoved => "ARGUMENT_REMOVED",
            ChangeKind::ArgumentTypeChanged => "ARGUMENT_TYPE_CHANGED",
            ChangeKind::ArgumentDefaultChanged => "ARGUMENT_DEFAULT_CHANGED",
            ChangeKind::InterfaceAdded => "INTERFACE_ADDED",
            ChangeKind::InterfaceRemoved => "INTERFACE_REMOVED",
            ChangeKind::UnionMemberAdded => "UNION_MEMBER_ADDED",
            ChangeKind::UnionMemberRemoved => "UNION_MEMBER_REMOVED",
            ChangeKind::EnumValueAdded => "ENUM_VALUE_ADDED",
            ChangeKind::EnumValueRemoved => "ENUM_VALUE_REMOVED",
            ChangeKind::InputFieldAdded => "INPUT_FIELD_ADDED",
            ChangeKind::InputFieldRemoved => "INPUT_FIELD_REMOVED",
            ChangeKind::InputFieldTypeChanged => "INPUT_FIELD_TYPE_CHANGED",
            ChangeKind::InputFieldDefaultChanged => "INPUT_FIELD_DEFAULT_CHANGED",
            ChangeKind::RootTypeAdded => "ROOT_TYPE_ADDED",
            ChangeKind::RootTypeRemoved => "ROOT_TYPE_REMOVED",
            ChangeKind::RootTypeChanged => "ROOT_TYPE_CHANGED",
            ChangeKind::DirectiveAdded => "DIRECTIVE_ADDED",
            ChangeKind::DirectiveRemoved => "DIRECTIVE_REMOVED",
            ChangeKind::DirectiveLocationAdded => "DIRECTIVE_LOCATION_ADDED",
            ChangeKind::DirectiveLocationRemoved => "DIRECTIVE_LOCATION_REMOVED",
            ChangeKind::DirectiveRepeatableAdded => "DIRECTIVE_REPEATABLE_ADDED",
            ChangeKind::DirectiveRepeatableRemoved => "DIRECTIVE_REPEATABLE_REMOVED",
        }
    }

    /// Direction marker used in compact output.
    pub fn marker(self) -> &'static str {
        match self {
            ChangeKind::TypeAdded
            | ChangeKind::FieldAdded
            | ChangeKind::ArgumentAdded
            | ChangeKind::InterfaceAdded
            | ChangeKind::UnionMemberAdded
            | ChangeKind::EnumValueAdded
            | ChangeKind::InputFieldAdded
            | ChangeKind::RootTypeAdded
            | ChangeKind::DirectiveAdded
            | ChangeKind::DirectiveLocationAdded
            | ChangeKind::DirectiveRepeatableAdded
            | ChangeKind::DeprecationAdded => "+",
            ChangeKind::TypeRemoved
            | ChangeKind::FieldRemoved
            | ChangeKind::ArgumentRemoved
            | ChangeKind::InterfaceRemoved
            | ChangeKind::UnionMemberRemoved
            | ChangeKind::EnumValueRemoved
            | ChangeKind::InputFieldRemoved
            | ChangeKind::RootTypeRemoved
            | ChangeKind::DirectiveRemoved
            | ChangeKind::DirectiveLocationRemoved
            | ChangeKind::DirectiveRepeatableRemoved
            | ChangeKind::DeprecationRemoved => "-",
            _ => "~",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified structural difference between two schemas.
///
/// Changes are values: comparators create them and nothing mutates them
/// afterwards. Reclassification produces a new change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    kind: ChangeKind,
    #[serde(rename = "type")]
    severity: Severity,
    criticality: Criticality,
    message: String,
    path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    meta: BTreeMap<String, String>,
}

impl Change {
    pub fn new(kind: ChangeKind, severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            criticality: severity.criticality(),
            message: message.into(),
            path: path.into(),
            meta: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    /// Same change, classified at a different severity.
    pub fn reclassified(self, severity: Severity) -> Self {
        Self {
            severity,
            criticality: severity.criticality(),
            ..self
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn criticality(&self) -> Criticality {
        self.criticality
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    /// Name of the named type this change is located in, or `None` for
    /// directive-level changes.
    pub fn type_name(&self) -> Option<&str> {
        if self.path.starts_with('@') {
            return None;
        }
        let end = self.path.find(['.', '(']).unwrap_or(self.path.len());
        Some(&self.path[..end])
    }

    /// Report order: severity (most severe first), then path, then kind and
    /// message so that equal keys never depend on input iteration order.
    pub fn report_order(&self, other: &Change) -> Ordering {
        self.severity
            .cmp(&other.severity)
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.message.cmp(&other.message))
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.severity, self.message, self.path)
    }
}

/// Sort changes into report order.
pub fn sort_changes(changes: &mut [Change]) {
    changes.sort_by(Change::report_order);
}

/// Counts of changes per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub breaking: usize,
    pub dangerous: usize,
    pub safe: usize,
}

impl ChangeSummary {
    pub fn from_changes(changes: &[Change]) -> Self {
        changes.iter().fold(Self::default(), |mut summary, change| {
            match change.severity {
                Severity::Breaking => summary.breaking += 1,
                Severity::Dangerous => summary.dangerous += 1,
                Severity::Safe => summary.safe += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.breaking + self.dangerous + self.safe
    }

    /// Whether any change is `threshold` or worse.
    pub fn has_at_least(&self, threshold: Severity) -> bool {
        match threshold {
            Severity::Breaking => self.breaking > 0,
            Severity::Dangerous => self.breaking + self.dangerous > 0,
            Severity::Safe => self.total() > 0,
        }
    }
}

pub(crate) fn field_path(type_name: &str, field: &str) -> String {
    format!("{type_name}.{field}")
}

pub(crate) fn argument_path(owner_path: &str, argument: &str) -> String {
    format!("{owner_path}({argument}:)")
}

pub(crate) fn directive_path(directive: &str) -> String {
    format!("@{directive}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_is_most_severe_first() {
        let mut severities = vec![Severity::Safe, Severity::Breaking, Severity::Dangerous];
        severities.sort();
        assert_eq!(severities, vec![Severity::Breaking, Severity::Dangerous, Severity::Safe]);
        assert_eq!(Severity::Dangerous.escalate(Severity::Breaking), Severity::Breaking);
        assert_eq!(Severity::Safe.escalate(Severity::Dangerous), Severity::Dangerous);
    }

    #[test]
    fn test_criticality_follows_severity() {
        let change = Change::new(ChangeKind::FieldRemoved, Severity::Breaking, "User.email", "removed");
        assert_eq!(change.criticality(), Criticality::High);

        let change = change.reclassified(Severity::Dangerous);
        assert_eq!(change.criticality(), Criticality::Medium);
        assert_eq!(change.kind(), ChangeKind::FieldRemoved);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("Breaking".parse::<Severity>().unwrap(), Severity::Breaking);
        assert_eq!("non-breaking".parse::<Severity>().unwrap(), Severity::Safe);
        assert!(matches!("fatal".parse::<Severity>(), Err(ConfigError::UnknownSeverity(_))));
    }

    #[test]
    fn test_type_name_from_path() {
        let field = Change::new(ChangeKind::ArgumentAdded, Severity::Safe, "Query.users(limit:)", "");
        assert_eq!(field.type_name(), Some("Query"));
        let ty = Change::new(ChangeKind::TypeAdded, Severity::Safe, "User", "");
        assert_eq!(ty.type_name(), Some("User"));
        let directive = Change::new(ChangeKind::DirectiveAdded, Severity::Safe, "@auth", "");
        assert_eq!(directive.type_name(), None);
    }

    #[test]
    fn test_sort_changes() {
        let mut changes = vec![
            Change::new(ChangeKind::FieldAdded, Severity::Safe, "User.avatar", "a"),
            Change::new(ChangeKind::FieldTypeChanged, Severity::Dangerous, "User.name", "b"),
            Change::new(ChangeKind::FieldRemoved, Severity::Breaking, "User.email", "c"),
            Change::new(ChangeKind::TypeRemoved, Severity::Breaking, "Account", "d"),
        ];
        sort_changes(&mut changes);
        let paths: Vec<_> = changes.iter().map(Change::path).collect();
        assert_eq!(paths, vec!["Account", "User.email", "User.name", "User.avatar"]);
    }

    #[test]
    fn test_summary() {
        let changes = vec![
            Change::new(ChangeKind::FieldAdded, Severity::Safe, "User.avatar", ""),
            Change::new(ChangeKind::FieldTypeChanged, Severity::Dangerous, "User.name", ""),
        ];
        let summary = ChangeSummary::from_changes(&changes);
        assert_eq!(summary.total(), 2);
        assert!(!summary.has_at_least(Severity::Breaking));
        assert!(summary.has_at_least(Severity::Dangerous));
    }

    #[test]
    fn test_change_serialization() {
        let change = Change::new(ChangeKind::FieldRemoved, Severity::Breaking, "User.email", "Field 'User.email' was removed")
            .with_meta("typeName", "User")
            .with_meta("fieldName", "email");
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["type"], "BREAKING");
        assert_eq!(json["criticality"], "HIGH");
        assert_eq!(json["kind"], "FIELD_REMOVED");
        assert_eq!(json["meta"]["fieldName"], "email");
    }
}
