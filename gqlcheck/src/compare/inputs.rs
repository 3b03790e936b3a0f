use indexmap::IndexMap;

use super::Comparison;
use crate::change::{Change, ChangeKind, Severity, field_path};
use crate::errors::CompareError;
use crate::types::{InputFieldDef, Position};

pub(super) fn compare_input_fields(
    cmp: &mut Comparison<'_>,
    type_name: &str,
    old_fields: &IndexMap<String, InputFieldDef>,
    new_fields: &IndexMap<String, InputFieldDef>,
) -> Result<(), CompareError> {
    for (name, old_field) in old_fields {
        if !new_fields.contains_key(name) {
            let path = field_path(type_name, name);
            let severity = cmp.removal_severity(old_field.deprecation.as_ref());
            cmp.push(
                Change::new(
                    ChangeKind::InputFieldRemoved,
                    severity,
                    &path,
                    format!("Input field '{path}' was removed"),
                )
                .with_meta("typeName", type_name)
                .with_meta("fieldName", name.as_str()),
            );
        }
    }

    for (name, new_field) in new_fields {
        if old_fields.contains_key(name) {
            continue;
        }
        let path = field_path(type_name, name);
        let (severity, message) = if new_field.is_required() {
            (Severity::Breaking, format!("Required input field '{path}' was added"))
        } else {
            (Severity::Safe, format!("Optional input field '{path}' was added"))
        };
        cmp.push(
            Change::new(ChangeKind::InputFieldAdded, severity, &path, message)
                .with_meta("typeName", type_name)
                .with_meta("fieldName", name.as_str())
                .with_meta("fieldType", new_field.ty.to_string()),
        );
    }

    for (name, old_field) in old_fields {
        let Some(new_field) = new_fields.get(name) else {
            continue;
        };
        let path = field_path(type_name, name);

        if let Some(severity) = cmp
            .variance
            .classify(&path, &old_field.ty, &new_field.ty, Position::Input)?
        {
            let old_ty = old_field.ty.to_string();
            let new_ty = new_field.ty.to_string();
            cmp.push(
                Change::new(
                    ChangeKind::InputFieldTypeChanged,
                    severity,
                    &path,
                    format!("Input field '{path}' changed type from '{old_ty}' to '{new_ty}'"),
                )
                .with_meta("typeName", type_name)
                .with_meta("fieldName", name.as_str())
                .with_meta("oldType", old_ty)
                .with_meta("newType", new_ty),
            );
        }

        if old_field.default_value != new_field.default_value {
            let old_default = old_field.default_value.as_deref().unwrap_or("none");
            let new_default = new_field.default_value.as_deref().unwrap_or("none");
            cmp.push(
                Change::new(
                    ChangeKind::InputFieldDefaultChanged,
                    Severity::Dangerous,
                    &path,
                    format!("Default value of input field '{path}' changed from {old_default} to {new_default}"),
                )
                .with_meta("typeName", type_name)
                .with_meta("fieldName", name.as_str())
                .with_meta("oldDefault", old_default)
                .with_meta("newDefault", new_default),
            );
        }

        cmp.description(
            &path,
            &format!("input field '{path}'"),
            old_field.description.as_deref(),
            new_field.description.as_deref(),
        );
        cmp.deprecation(
            &path,
            &format!("Input field '{path}'"),
            old_field.deprecation.as_ref(),
            new_field.deprecation.as_ref(),
        );
    }

    Ok(())
}
