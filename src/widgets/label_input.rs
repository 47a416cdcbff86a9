use crate::blueprint_core::observable::{parse_bool, FieldValue, FieldVariable, Subscription, Variable};
use crate::blueprint_core::registry::{resolve_input_kind, Binding, InputKind, VariableKind};
use crate::model::FieldSpec;
use crate::widgets::bound_text::BoundText;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::cell::Cell;
use std::rc::Rc;

pub const DEFAULT_TEXT_HEIGHT: u16 = 5;

/// Construction options for the input control. Values set here win over the field spec.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputOptions {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub increment: Option<f64>,
    pub values: Option<Vec<String>>,
    pub height: Option<u16>,
}

impl InputOptions {
    fn merge_field_spec(&mut self, spec: &FieldSpec) {
        if self.from.is_none() {
            self.from = spec.min;
        }
        if self.to.is_none() {
            self.to = spec.max;
        }
        if self.increment.is_none() {
            self.increment = spec.increment;
        }
        if self.values.is_none() {
            self.values = spec.values.clone();
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LabelOptions {
    pub style: Style,
}

#[derive(Default)]
pub struct LabelInputConfig {
    pub input: Option<InputKind>,
    pub input_options: InputOptions,
    pub label_options: LabelOptions,
    pub field_spec: Option<FieldSpec>,
    pub disable: Option<Variable<bool>>,
}

enum Control {
    Entry,
    Text(BoundText),
    Checkbox,
    ToggleButton,
    RadioGroup { values: Vec<String>, cursor: usize },
    Dropdown { values: Vec<String> },
    Spinbox,
}

/// A label row above an input row, bound to one field variable.
pub struct LabelInput {
    label: String,
    kind: InputKind,
    variable: FieldVariable,
    options: InputOptions,
    label_options: LabelOptions,
    control: Control,
    enabled: Rc<Cell<bool>>,
    disable: Option<(Variable<bool>, Subscription)>,
}

impl LabelInput {
    pub fn new(label: impl Into<String>, variable: FieldVariable, cfg: LabelInputConfig) -> Self {
        let LabelInputConfig {
            input,
            mut input_options,
            label_options,
            field_spec,
            disable,
        } = cfg;
        let kind = resolve_input_kind(input, field_spec.as_ref().map(|s| s.field_type));
        if let Some(spec) = &field_spec {
            input_options.merge_field_spec(spec);
        }
        let control = match kind {
            InputKind::TextEntry => Control::Entry,
            InputKind::MultilineText => Control::Text(BoundText::new(Some(variable.cell().clone()))),
            InputKind::Checkbox => Control::Checkbox,
            InputKind::ToggleButton => Control::ToggleButton,
            InputKind::RadioGroup => Control::RadioGroup {
                // one button per value, all sharing the variable
                values: input_options.values.take().unwrap_or_default(),
                cursor: 0,
            },
            InputKind::Dropdown => Control::Dropdown {
                values: input_options.values.clone().unwrap_or_default(),
            },
            InputKind::Spinbox => Control::Spinbox,
        };
        // The multi-line editor shares the flag so it also renders disabled.
        let enabled = match &control {
            Control::Text(bt) => bt.enabled_flag(),
            _ => Rc::new(Cell::new(true)),
        };
        let disable = disable.map(|flag| {
            enabled.set(!flag.get());
            let en = Rc::clone(&enabled);
            let var = variable.clone();
            let sub = flag.on_write(move |disabled: &bool| {
                if *disabled {
                    en.set(false);
                    var.clear();
                } else {
                    en.set(true);
                }
            });
            (flag, sub)
        });
        Self {
            label: label.into(),
            kind,
            variable,
            options: input_options,
            label_options,
            control,
            enabled,
            disable,
        }
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn binding(&self) -> Binding {
        self.kind.binding()
    }

    pub fn variable(&self) -> &FieldVariable {
        &self.variable
    }

    pub fn options(&self) -> &InputOptions {
        &self.options
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn radio_values(&self) -> Option<&[String]> {
        match &self.control {
            Control::RadioGroup { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Multi-line inputs take over the keyboard while being edited.
    pub fn is_modal(&self) -> bool {
        matches!(self.control, Control::Text(_))
    }

    pub fn height(&self) -> u16 {
        let label_rows = if self.kind.has_inline_label() { 0 } else { 1 };
        let input_rows = match self.control {
            Control::Text(_) => self.options.height.unwrap_or(DEFAULT_TEXT_HEIGHT) + 2,
            _ => 1,
        };
        label_rows + input_rows
    }

    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if !self.enabled.get() {
            return false;
        }
        match &mut self.control {
            Control::Text(bt) => bt.input(key),
            Control::Entry => edit_text(&self.variable, key.code),
            Control::Spinbox => match key.code {
                KeyCode::Up => {
                    step(&self.variable, &self.options, 1.0);
                    true
                }
                KeyCode::Down => {
                    step(&self.variable, &self.options, -1.0);
                    true
                }
                code => edit_text(&self.variable, code),
            },
            Control::Checkbox | Control::ToggleButton => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let on = parse_bool(&self.variable.text()).unwrap_or(false);
                    self.variable.set(FieldValue::Bool(!on));
                    true
                }
                _ => false,
            },
            Control::RadioGroup { values, cursor } => match key.code {
                KeyCode::Left if !values.is_empty() => {
                    *cursor = (*cursor + values.len() - 1) % values.len();
                    true
                }
                KeyCode::Right if !values.is_empty() => {
                    *cursor = (*cursor + 1) % values.len();
                    true
                }
                KeyCode::Char(' ') | KeyCode::Enter => match values.get(*cursor) {
                    Some(v) => {
                        self.variable.set_text(v.clone());
                        true
                    }
                    None => false,
                },
                _ => false,
            },
            Control::Dropdown { values } => {
                if values.is_empty() {
                    return false;
                }
                let cur = self.variable.text();
                let pos = values.iter().position(|v| *v == cur);
                let next = match (key.code, pos) {
                    (KeyCode::Down, Some(i)) => (i + 1) % values.len(),
                    (KeyCode::Up, Some(i)) => (i + values.len() - 1) % values.len(),
                    (KeyCode::Down, None) => 0,
                    (KeyCode::Up, None) => values.len() - 1,
                    _ => return false,
                };
                self.variable.set_text(values[next].clone());
                true
            }
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool, editing: bool) {
        if area.height == 0 {
            return;
        }
        let enabled = self.enabled.get();
        let mut input_area = area;
        if !self.kind.has_inline_label() {
            let marker = if focused { '›' } else { ' ' };
            let label = Paragraph::new(Line::from(Span::styled(
                format!("{marker} {}", self.label),
                self.label_options.style,
            )));
            f.render_widget(label, Rect { height: 1, ..area });
            input_area = Rect {
                y: area.y + 1,
                height: area.height.saturating_sub(1),
                ..area
            };
        }
        if input_area.height == 0 {
            return;
        }
        let value_style = if !enabled {
            crate::theme::text_muted()
        } else if focused && editing {
            crate::theme::text_editing_bold()
        } else if focused {
            crate::theme::text_active_bold()
        } else {
            Style::default()
        };
        let text = self.variable.text();
        let line = match &self.control {
            Control::Text(bt) => {
                let title = if focused && editing {
                    "Esc done"
                } else {
                    ""
                };
                bt.render(f, input_area, title, focused);
                return;
            }
            Control::Entry => Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("{text}▏"), value_style),
            ]),
            Control::Spinbox => Line::from(vec![
                Span::raw("  "),
                Span::styled(text, value_style),
                Span::styled(" ▲▼", crate::theme::text_muted()),
            ]),
            Control::Checkbox => {
                let mark = if parse_bool(&text).unwrap_or(false) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let marker = if focused { '›' } else { ' ' };
                Line::from(vec![
                    Span::raw(format!("{marker} ")),
                    Span::styled(format!("{mark} {}", self.label), value_style),
                ])
            }
            Control::ToggleButton => {
                let on = parse_bool(&text).unwrap_or(false);
                let style = if on && enabled {
                    crate::theme::list_cursor_style()
                } else {
                    value_style
                };
                let marker = if focused { '›' } else { ' ' };
                Line::from(vec![
                    Span::raw(format!("{marker} ")),
                    Span::styled(format!("[ {} ]", self.label), style),
                ])
            }
            Control::RadioGroup { values, cursor } => {
                let mut spans = vec![Span::raw("  ")];
                for (i, v) in values.iter().enumerate() {
                    let mark = if *v == text { "(•)" } else { "( )" };
                    let st = if focused && i == *cursor && enabled {
                        crate::theme::list_cursor_style()
                    } else {
                        value_style
                    };
                    spans.push(Span::styled(format!("{mark} {v}"), st));
                    spans.push(Span::raw("  "));
                }
                Line::from(spans)
            }
            Control::Dropdown { .. } => {
                let shown = if text.is_empty() { "(none)".to_string() } else { text };
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(shown, value_style),
                    Span::styled(" ▾", crate::theme::text_muted()),
                ])
            }
        };
        f.render_widget(Paragraph::new(line), Rect { height: 1, ..input_area });
    }
}

fn step(variable: &FieldVariable, options: &InputOptions, direction: f64) {
    let inc = options.increment.unwrap_or(1.0);
    let base = options.from.unwrap_or(0.0);
    let cur = variable.text().trim().parse::<f64>().unwrap_or(base);
    let mut next = cur + direction * inc;
    if let Some(lo) = options.from {
        next = next.max(lo);
    }
    if let Some(hi) = options.to {
        next = next.min(hi);
    }
    match variable.kind() {
        VariableKind::Int => variable.set(FieldValue::Int(next.round() as i64)),
        _ => variable.set(FieldValue::Double(round_to(next, decimals(inc)))),
    }
}

/// Decimal places in an increment's shortest text form, capped at 12.
fn decimals(inc: f64) -> i32 {
    let text = format!("{}", inc.abs());
    text.split_once('.')
        .map(|(_, frac)| frac.len().min(12) as i32)
        .unwrap_or(0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn edit_text(variable: &FieldVariable, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => {
            let mut s = variable.text();
            s.push(c);
            variable.set_text(s);
            true
        }
        KeyCode::Backspace => {
            let mut s = variable.text();
            if s.pop().is_some() {
                variable.set_text(s);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

impl Drop for LabelInput {
    fn drop(&mut self) {
        if let Some((flag, sub)) = &self.disable {
            flag.unsubscribe(*sub);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn field_spec_fills_only_missing_options() {
        let spec = FieldSpec::new(FieldType::Integer).with_range(0.0, 10.0, 2.0);
        let li = LabelInput::new(
            "Count",
            FieldVariable::new(VariableKind::Int),
            LabelInputConfig {
                input_options: InputOptions {
                    to: Some(99.0),
                    ..Default::default()
                },
                field_spec: Some(spec),
                ..Default::default()
            },
        );
        assert_eq!(li.kind(), InputKind::Spinbox);
        assert_eq!(li.options().from, Some(0.0));
        assert_eq!(li.options().to, Some(99.0));
        assert_eq!(li.options().increment, Some(2.0));
    }

    #[test]
    fn spinbox_steps_and_clamps() {
        let spec = FieldSpec::new(FieldType::Integer).with_range(0.0, 3.0, 2.0);
        let var = FieldVariable::new(VariableKind::Int);
        let mut li = LabelInput::new(
            "N",
            var.clone(),
            LabelInputConfig {
                field_spec: Some(spec),
                ..Default::default()
            },
        );
        li.on_key(press(KeyCode::Up));
        assert_eq!(var.get(), Ok(FieldValue::Int(2)));
        li.on_key(press(KeyCode::Up));
        assert_eq!(var.get(), Ok(FieldValue::Int(3)));
        li.on_key(press(KeyCode::Down));
        li.on_key(press(KeyCode::Down));
        assert_eq!(var.get(), Ok(FieldValue::Int(0)));
    }

    #[test]
    fn radio_group_builds_one_button_per_value_sharing_variable() {
        let spec = FieldSpec::new(FieldType::ShortStringList).with_values(["S", "M", "L"]);
        let var = FieldVariable::new(VariableKind::String);
        let mut li = LabelInput::new(
            "Size",
            var.clone(),
            LabelInputConfig {
                field_spec: Some(spec),
                ..Default::default()
            },
        );
        assert_eq!(li.kind(), InputKind::RadioGroup);
        assert_eq!(li.binding(), Binding::Value);
        assert_eq!(li.radio_values().map(|v| v.len()), Some(3));
        li.on_key(press(KeyCode::Right));
        li.on_key(press(KeyCode::Char(' ')));
        assert_eq!(var.text(), "M");
        li.on_key(press(KeyCode::Left));
        li.on_key(press(KeyCode::Left));
        li.on_key(press(KeyCode::Enter));
        assert_eq!(var.text(), "L");
    }

    #[test]
    fn checkbox_toggles_bool_and_has_no_label_row() {
        let var = FieldVariable::new(VariableKind::Bool);
        let mut li = LabelInput::new(
            "Agree",
            var.clone(),
            LabelInputConfig {
                field_spec: Some(FieldSpec::new(FieldType::Boolean)),
                ..Default::default()
            },
        );
        assert_eq!(li.height(), 1);
        li.on_key(press(KeyCode::Char(' ')));
        assert_eq!(var.get(), Ok(FieldValue::Bool(true)));
        li.on_key(press(KeyCode::Enter));
        assert_eq!(var.get(), Ok(FieldValue::Bool(false)));
    }

    #[test]
    fn dropdown_cycles_values() {
        let var = FieldVariable::new(VariableKind::String);
        let mut li = LabelInput::new(
            "Color",
            var.clone(),
            LabelInputConfig {
                input: Some(InputKind::Dropdown),
                input_options: InputOptions {
                    values: Some(vec!["red".into(), "blue".into()]),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        li.on_key(press(KeyCode::Down));
        assert_eq!(var.text(), "red");
        li.on_key(press(KeyCode::Down));
        assert_eq!(var.text(), "blue");
        li.on_key(press(KeyCode::Down));
        assert_eq!(var.text(), "red");
    }

    #[test]
    fn disable_flag_locks_and_clears_then_unlocks() {
        let flag = Variable::new(false);
        let var = FieldVariable::new(VariableKind::String);
        var.set_text("keep me?");
        let mut li = LabelInput::new(
            "Name",
            var.clone(),
            LabelInputConfig {
                disable: Some(flag.clone()),
                ..Default::default()
            },
        );
        assert!(li.is_enabled());
        flag.set(true);
        assert!(!li.is_enabled());
        assert_eq!(var.text(), "");
        assert!(!li.on_key(press(KeyCode::Char('a'))));
        flag.set(false);
        assert!(li.is_enabled());
        assert!(li.on_key(press(KeyCode::Char('a'))));
        assert_eq!(var.text(), "a");
    }

    #[test]
    fn disabling_numeric_field_resets_to_zero() {
        let flag = Variable::new(false);
        let var = FieldVariable::new(VariableKind::Double);
        var.set_text("3.5");
        let _li = LabelInput::new(
            "Weight",
            var.clone(),
            LabelInputConfig {
                field_spec: Some(FieldSpec::new(FieldType::Decimal)),
                disable: Some(flag.clone()),
                ..Default::default()
            },
        );
        flag.set(true);
        assert_eq!(var.get(), Ok(FieldValue::Double(0.0)));
    }

    #[test]
    fn multiline_input_writes_through_to_variable() {
        let var = FieldVariable::new(VariableKind::String);
        var.set_text("x");
        let mut li = LabelInput::new(
            "Notes",
            var.clone(),
            LabelInputConfig {
                field_spec: Some(FieldSpec::new(FieldType::LongString)),
                ..Default::default()
            },
        );
        assert!(li.is_modal());
        assert_eq!(li.height(), 1 + DEFAULT_TEXT_HEIGHT + 2);
        li.on_key(press(KeyCode::Char('y')));
        assert_eq!(var.text(), "xy");
    }

    #[test]
    fn disable_flag_reaches_multiline_editor() {
        let flag = Variable::new(false);
        let var = FieldVariable::new(VariableKind::String);
        let mut li = LabelInput::new(
            "Notes",
            var.clone(),
            LabelInputConfig {
                field_spec: Some(FieldSpec::new(FieldType::LongString)),
                disable: Some(flag.clone()),
                ..Default::default()
            },
        );
        flag.set(true);
        let Control::Text(bt) = &mut li.control else {
            panic!("expected multi-line control");
        };
        assert!(!bt.input(press(KeyCode::Char('x'))));
        flag.set(false);
        let Control::Text(bt) = &mut li.control else {
            panic!("expected multi-line control");
        };
        assert!(bt.input(press(KeyCode::Char('x'))));
        assert_eq!(var.text(), "x");
    }

    #[test]
    fn fractional_spinbox_step_keeps_increment_precision() {
        let spec = FieldSpec::new(FieldType::Decimal).with_range(0.0, 1.0, 0.1);
        let var = FieldVariable::new(VariableKind::Double);
        let mut li = LabelInput::new(
            "Ratio",
            var.clone(),
            LabelInputConfig {
                input: Some(InputKind::Spinbox),
                field_spec: Some(spec),
                ..Default::default()
            },
        );
        for _ in 0..3 {
            li.on_key(press(KeyCode::Up));
        }
        assert_eq!(var.text(), "0.3");
        li.on_key(press(KeyCode::Down));
        assert_eq!(var.text(), "0.2");
    }

    #[test]
    fn renders_label_above_entry() {
        let var = FieldVariable::new(VariableKind::String);
        var.set_text("Ada");
        let li = LabelInput::new("Name", var, LabelInputConfig::default());
        let backend = TestBackend::new(20, 2);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                li.render(f, area, false, false);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let row = |y: u16| -> String {
            (0..buf.area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        };
        assert!(row(0).contains("Name"));
        assert!(row(1).contains("Ada"));
    }
}
