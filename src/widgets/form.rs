use crate::blueprint_core::observable::{FieldValue, FieldVariable, Variable};
use crate::blueprint_core::registry::{variable_kind_for, VariableKind};
use crate::error::FormError;
use crate::model::{FieldConfig, FieldSpec};
use crate::widgets::label_input::{LabelInput, LabelInputConfig};
use ratatui::prelude::*;
use std::collections::BTreeMap;

pub type FormData = BTreeMap<String, FieldValue>;

pub struct FormField {
    pub name: String,
    pub spec: FieldSpec,
    pub input: LabelInput,
}

impl FormField {
    pub fn variable(&self) -> &FieldVariable {
        self.input.variable()
    }
}

/// One variable and one labelled input per model field, plus a shared disable flag.
pub struct Form {
    pub title: String,
    fields: Vec<FormField>,
    disable: Variable<bool>,
}

impl Form {
    pub fn new(title: impl Into<String>, configs: &[FieldConfig]) -> Result<Self, FormError> {
        // Resolve every variable kind before building any input.
        let mut vars: Vec<FieldVariable> = Vec::with_capacity(configs.len());
        for fc in configs {
            let kind = variable_kind_for(fc.spec.field_type).ok_or_else(|| {
                FormError::UnsupportedFieldType {
                    field: fc.name.clone(),
                    field_type: fc.spec.field_type,
                }
            })?;
            vars.push(FieldVariable::new(kind));
        }
        let disable = Variable::new(false);
        let fields = configs
            .iter()
            .zip(vars)
            .map(|(fc, var)| FormField {
                name: fc.name.clone(),
                spec: fc.spec.clone(),
                input: LabelInput::new(
                    fc.label(),
                    var,
                    LabelInputConfig {
                        input: fc.input,
                        field_spec: Some(fc.spec.clone()),
                        disable: Some(disable.clone()),
                        ..Default::default()
                    },
                ),
            })
            .collect::<Vec<_>>();
        tracing::info!(fields = fields.len(), "form built");
        Ok(Self {
            title: title.into(),
            fields,
            disable,
        })
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [FormField] {
        &mut self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn variable(&self, name: &str) -> Option<&FieldVariable> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(FormField::variable)
    }

    pub fn disable_flag(&self) -> &Variable<bool> {
        &self.disable
    }

    /// Read every field. The first unreadable field fails the whole read.
    pub fn get(&self) -> Result<FormData, FormError> {
        let mut data = FormData::new();
        for fld in &self.fields {
            match fld.variable().get() {
                Ok(v) => {
                    data.insert(fld.name.clone(), v);
                }
                Err(message) => {
                    tracing::warn!(field = %fld.name, %message, "form read failed");
                    return Err(FormError::FieldRead {
                        field: fld.name.clone(),
                        message,
                    });
                }
            }
        }
        Ok(data)
    }

    /// Disable, clear every field, enable again.
    pub fn reset(&self) {
        self.disable.set(true);
        for fld in &self.fields {
            let var = fld.variable();
            match var.kind() {
                VariableKind::Bool => var.set(FieldValue::Bool(false)),
                _ => var.clear(),
            }
        }
        self.disable.set(false);
        tracing::info!("form reset");
    }
}

/// Stack the field inputs top to bottom; fields that do not fit are skipped.
pub fn draw_fields(f: &mut Frame, area: Rect, form: &Form, selected: Option<usize>, editing: bool) {
    let mut y = area.y;
    let bottom = area.y + area.height;
    for (i, fld) in form.fields().iter().enumerate() {
        let h = fld.input.height();
        if y + h > bottom {
            break;
        }
        let focused = selected == Some(i);
        fld.input.render(
            f,
            Rect {
                x: area.x,
                y,
                width: area.width,
                height: h,
            },
            focused,
            focused && editing,
        );
        y += h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;

    fn field(name: &str, ft: FieldType) -> FieldConfig {
        FieldConfig::new(name, FieldSpec::new(ft))
    }

    #[test]
    fn builds_one_variable_per_field_with_registry_kind() {
        let form = Form::new(
            "T",
            &[
                field("Name", FieldType::String),
                field("Age", FieldType::Integer),
                field("Weight", FieldType::Decimal),
                field("Ok", FieldType::Boolean),
            ],
        )
        .unwrap();
        assert_eq!(form.len(), 4);
        assert_eq!(form.variable("Age").map(|v| v.kind()), Some(VariableKind::Int));
        assert_eq!(
            form.variable("Weight").map(|v| v.kind()),
            Some(VariableKind::Double)
        );
        // one shared disable flag, one subscription per input
        assert_eq!(form.disable_flag().listener_count(), 4);
    }

    #[test]
    fn reset_clears_values_and_ends_enabled() {
        let form = Form::new(
            "T",
            &[field("Flag", FieldType::Boolean), field("Name", FieldType::String)],
        )
        .unwrap();
        form.variable("Flag").unwrap().set(FieldValue::Bool(true));
        form.variable("Name").unwrap().set_text("x");
        form.reset();
        assert_eq!(
            form.variable("Flag").unwrap().get(),
            Ok(FieldValue::Bool(false))
        );
        assert_eq!(
            form.variable("Name").unwrap().get(),
            Ok(FieldValue::Text(String::new()))
        );
        assert!(!form.disable_flag().get());
        assert!(form.fields().iter().all(|f| f.input.is_enabled()));
    }

    #[test]
    fn get_fails_whole_read_naming_bad_field() {
        let form = Form::new(
            "T",
            &[field("Name", FieldType::String), field("Age", FieldType::Integer)],
        )
        .unwrap();
        form.variable("Name").unwrap().set_text("Ada");
        form.variable("Age").unwrap().set_text("forty");
        let err = form.get().unwrap_err();
        assert_eq!(err.field(), "Age");
        assert!(matches!(err, FormError::FieldRead { .. }));
        assert!(err.to_string().contains("Error in field: Age. Data not saved!"));

        form.variable("Age").unwrap().set_text("40");
        let data = form.get().unwrap();
        assert_eq!(data.get("Name"), Some(&FieldValue::Text("Ada".into())));
        assert_eq!(data.get("Age"), Some(&FieldValue::Int(40)));
    }

    #[test]
    fn reset_makes_numeric_fields_readable_again() {
        let form = Form::new("T", &[field("Weight", FieldType::Decimal)]).unwrap();
        form.variable("Weight").unwrap().set_text("heavy");
        assert!(form.get().is_err());
        form.reset();
        assert_eq!(
            form.get().unwrap().get("Weight"),
            Some(&FieldValue::Double(0.0))
        );
    }

    #[test]
    fn long_string_field_uses_multiline_input() {
        let form = Form::new("T", &[field("Notes", FieldType::LongString)]).unwrap();
        assert!(form.fields()[0].input.is_modal());
        form.variable("Notes").unwrap().set_text("a\nb");
        form.reset();
        assert_eq!(form.variable("Notes").unwrap().text(), "");
    }
}
