use crate::model::FieldType;
use serde::{Deserialize, Serialize};

/// Storage kind of the observable variable backing a field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    String,
    Double,
    Int,
    Bool,
}

/// Closed set of input controls a field can be rendered with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    TextEntry,
    MultilineText,
    Checkbox,
    ToggleButton,
    RadioGroup,
    Dropdown,
    Spinbox,
}

/// How a control consumes its variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Checked/selected value source (toggle-style controls).
    Value,
    /// Text content source.
    Text,
}

impl InputKind {
    pub fn binding(self) -> Binding {
        match self {
            InputKind::Checkbox | InputKind::ToggleButton | InputKind::RadioGroup => {
                Binding::Value
            }
            _ => Binding::Text,
        }
    }

    /// Buttons draw their own caption, so no label row is built for them.
    pub fn has_inline_label(self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::ToggleButton)
    }
}

const VARIABLE_KINDS: &[(FieldType, VariableKind)] = &[
    (FieldType::String, VariableKind::String),
    (FieldType::StringList, VariableKind::String),
    (FieldType::ShortStringList, VariableKind::String),
    (FieldType::IsoDateString, VariableKind::String),
    (FieldType::LongString, VariableKind::String),
    (FieldType::Decimal, VariableKind::Double),
    (FieldType::Integer, VariableKind::Int),
    (FieldType::Boolean, VariableKind::Bool),
];

const DEFAULT_INPUTS: &[(FieldType, InputKind)] = &[
    (FieldType::StringList, InputKind::Dropdown),
    (FieldType::ShortStringList, InputKind::RadioGroup),
    (FieldType::LongString, InputKind::MultilineText),
    (FieldType::Decimal, InputKind::Spinbox),
    (FieldType::Integer, InputKind::Spinbox),
    (FieldType::Boolean, InputKind::Checkbox),
];

/// Variable kind registered for a field type. `None` means the registry is
/// missing an entry, which form construction reports as a configuration error.
pub fn variable_kind_for(field_type: FieldType) -> Option<VariableKind> {
    VARIABLE_KINDS
        .iter()
        .find(|(ft, _)| *ft == field_type)
        .map(|(_, kind)| *kind)
}

pub fn default_input_kind_for(field_type: FieldType) -> Option<InputKind> {
    DEFAULT_INPUTS
        .iter()
        .find(|(ft, _)| *ft == field_type)
        .map(|(_, kind)| *kind)
}

/// Explicit override first, then the registry default, then a plain entry.
pub fn resolve_input_kind(explicit: Option<InputKind>, field_type: Option<FieldType>) -> InputKind {
    explicit
        .or_else(|| field_type.and_then(default_input_kind_for))
        .unwrap_or(InputKind::TextEntry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_type_has_a_variable_kind() {
        for ft in FieldType::ALL {
            assert!(variable_kind_for(ft).is_some(), "{ft:?} unmapped");
        }
        assert_eq!(variable_kind_for(FieldType::Decimal), Some(VariableKind::Double));
        assert_eq!(variable_kind_for(FieldType::Integer), Some(VariableKind::Int));
        assert_eq!(variable_kind_for(FieldType::Boolean), Some(VariableKind::Bool));
        assert_eq!(variable_kind_for(FieldType::LongString), Some(VariableKind::String));
    }

    #[test]
    fn input_kind_resolution_prefers_explicit_choice() {
        assert_eq!(
            resolve_input_kind(Some(InputKind::TextEntry), Some(FieldType::LongString)),
            InputKind::TextEntry
        );
        assert_eq!(
            resolve_input_kind(None, Some(FieldType::LongString)),
            InputKind::MultilineText
        );
        assert_eq!(resolve_input_kind(None, Some(FieldType::IsoDateString)), InputKind::TextEntry);
        assert_eq!(resolve_input_kind(None, None), InputKind::TextEntry);
    }

    #[test]
    fn toggle_controls_bind_by_value() {
        assert_eq!(InputKind::Checkbox.binding(), Binding::Value);
        assert_eq!(InputKind::RadioGroup.binding(), Binding::Value);
        assert_eq!(InputKind::ToggleButton.binding(), Binding::Value);
        assert_eq!(InputKind::Spinbox.binding(), Binding::Text);
        assert!(InputKind::Checkbox.has_inline_label());
        assert!(!InputKind::RadioGroup.has_inline_label());
    }
}
