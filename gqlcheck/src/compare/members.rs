use indexmap::IndexMap;

use super::Comparison;
use crate::change::{Change, ChangeKind, Severity, field_path};
use crate::types::EnumValue;

pub(super) fn compare_interfaces(cmp: &mut Comparison<'_>, type_name: &str, old: &[String], new: &[String]) {
    for interface in old.iter().filter(|i| !new.contains(*i)) {
        cmp.push(
            Change::new(
                ChangeKind::InterfaceRemoved,
                Severity::Breaking,
                type_name,
                format!("'{type_name}' no longer implements interface '{interface}'"),
            )
            .with_meta("typeName", type_name)
            .with_meta("interfaceName", interface.as_str()),
        );
    }

    for interface in new.iter().filter(|i| !old.contains(*i)) {
        cmp.push(
            Change::new(
                ChangeKind::InterfaceAdded,
                Severity::Safe,
                type_name,
                format!("'{type_name}' now implements interface '{interface}'"),
            )
            .with_meta("typeName", type_name)
            .with_meta("interfaceName", interface.as_str()),
        );
    }
}

pub(super) fn compare_union_members(cmp: &mut Comparison<'_>, type_name: &str, old: &[String], new: &[String]) {
    for member in old.iter().filter(|m| !new.contains(*m)) {
        cmp.push(
            Change::new(
                ChangeKind::UnionMemberRemoved,
                Severity::Breaking,
                type_name,
                format!("Member '{member}' was removed from union type '{type_name}'"),
            )
            .with_meta("typeName", type_name)
            .with_meta("memberName", member.as_str()),
        );
    }

    // Clients switching on __typename may not handle the new member.
    for member in new.iter().filter(|m| !old.contains(*m)) {
        cmp.push(
            Change::new(
                ChangeKind::UnionMemberAdded,
                Severity::Dangerous,
                type_name,
                format!("Member '{member}' was added to union type '{type_name}'"),
            )
            .with_meta("typeName", type_name)
            .with_meta("memberName", member.as_str()),
        );
    }
}

pub(super) fn compare_enum_values(
    cmp: &mut Comparison<'_>,
    type_name: &str,
    old: &IndexMap<String, EnumValue>,
    new: &IndexMap<String, EnumValue>,
) {
    for (name, old_value) in old {
        let path = field_path(type_name, name);
        let Some(new_value) = new.get(name) else {
            let severity = cmp.removal_severity(old_value.deprecation.as_ref());
            cmp.push(
                Change::new(
                    ChangeKind::EnumValueRemoved,
                    severity,
                    &path,
                    format!("Enum value '{name}' was removed from enum '{type_name}'"),
                )
                .with_meta("typeName", type_name)
                .with_meta("enumValue", name.as_str()),
            );
            continue;
        };

        let subject = format!("enum value '{path}'");
        cmp.description(
            &path,
            &subject,
            old_value.description.as_deref(),
            new_value.description.as_deref(),
        );
        cmp.deprecation(
            &path,
            &format!("Enum value '{path}'"),
            old_value.deprecation.as_ref(),
            new_value.deprecation.as_ref(),
        );
    }

    for name in new.keys().filter(|name| !old.contains_key(*name)) {
        cmp.push(
            Change::new(
                ChangeKind::EnumValueAdded,
                Severity::Dangerous,
                field_path(type_name, name),
                format!("Enum value '{name}' was added to enum '{type_name}'"),
            )
            .with_meta("typeName", type_name)
            .with_meta("enumValue", name.as_str()),
        );
    }
}
