use crate::app::Effect;
use crate::ui::ToastLevel;
use crate::widgets::chrome::panel_block;
use crate::widgets::form::{draw_fields, Form};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormButton {
    TextToBinary,
    BinaryToText,
    Reset,
}

impl FormButton {
    pub const ALL: [FormButton; 3] = [
        FormButton::TextToBinary,
        FormButton::BinaryToText,
        FormButton::Reset,
    ];

    pub fn caption(self) -> &'static str {
        match self {
            FormButton::TextToBinary => "Text to Binary",
            FormButton::BinaryToText => "Binary to Text",
            FormButton::Reset => "Reset",
        }
    }

    // Binary to Text has no handler yet and is shown greyed out.
    pub fn is_enabled(self) -> bool {
        !matches!(self, FormButton::BinaryToText)
    }
}

/// Focus, modal editing and the button row around a `Form`.
pub struct FormWidget {
    pub form: Form,
    pub selected: usize,
    pub editing: bool,
    pub message: Option<String>,
}

impl FormWidget {
    pub fn new(form: Form) -> Self {
        Self {
            form,
            selected: 0,
            editing: false,
            message: None,
        }
    }

    fn slots(&self) -> usize {
        self.form.len() + FormButton::ALL.len()
    }

    pub fn focused_button(&self) -> Option<FormButton> {
        self.selected
            .checked_sub(self.form.len())
            .and_then(|i| FormButton::ALL.get(i).copied())
    }

    fn focus_next(&mut self) {
        self.selected = (self.selected + 1) % self.slots();
    }

    fn focus_prev(&mut self) {
        self.selected = (self.selected + self.slots() - 1) % self.slots();
    }

    pub fn activate(&mut self, button: FormButton) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !button.is_enabled() {
            return effects;
        }
        match button {
            FormButton::TextToBinary => match self.form.get() {
                Ok(data) => {
                    self.message = None;
                    effects.push(Effect::Translate { data });
                }
                Err(e) => {
                    self.message = Some(e.to_string());
                    effects.push(Effect::ShowToast {
                        text: e.to_string(),
                        level: ToastLevel::Error,
                        seconds: 4,
                    });
                }
            },
            FormButton::Reset => {
                self.form.reset();
                self.message = Some("Form reset".into());
                effects.push(Effect::ShowToast {
                    text: "Form reset".into(),
                    level: ToastLevel::Info,
                    seconds: 2,
                });
            }
            FormButton::BinaryToText => {}
        }
        effects
    }
}

impl crate::widgets::Widget for FormWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        let title = if self.editing {
            format!("{} (editing)", self.form.title)
        } else {
            self.form.title.clone()
        };
        let block = panel_block(&title, focused);
        let inner = block.inner(area);
        f.render_widget(block, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);
        let selected = (self.selected < self.form.len()).then_some(self.selected);
        if self.form.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("(no fields)", crate::theme::text_muted())),
                chunks[0],
            );
        } else {
            draw_fields(f, chunks[0], &self.form, selected, self.editing);
        }

        let mut spans: Vec<Span> = Vec::new();
        for b in FormButton::ALL {
            let style = if !b.is_enabled() {
                crate::theme::text_muted()
            } else if self.focused_button() == Some(b) {
                crate::theme::list_cursor_style()
            } else {
                crate::theme::text_active_bold()
            };
            spans.push(Span::styled(format!("[ {} ]", b.caption()), style));
            spans.push(Span::raw("  "));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
        if let Some(msg) = &self.message {
            f.render_widget(
                Paragraph::new(Span::styled(msg.clone(), crate::theme::text_muted())),
                chunks[2],
            );
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let effects: Vec<Effect> = Vec::new();
        if self.editing {
            if key.code == KeyCode::Esc {
                self.editing = false;
                self.message = None;
            } else if let Some(fld) = self.form.fields_mut().get_mut(self.selected) {
                fld.input.on_key(key);
            }
            return effects;
        }
        match key.code {
            KeyCode::Tab => {
                self.focus_next();
                return effects;
            }
            KeyCode::BackTab => {
                self.focus_prev();
                return effects;
            }
            _ => {}
        }
        if let Some(button) = self.focused_button() {
            let idx = self.selected - self.form.len();
            match key.code {
                KeyCode::Left if idx > 0 => self.selected -= 1,
                KeyCode::Right if idx + 1 < FormButton::ALL.len() => self.selected += 1,
                KeyCode::Up => self.focus_prev(),
                KeyCode::Enter | KeyCode::Char(' ') => return self.activate(button),
                _ => {}
            }
            return effects;
        }
        let Some(fld) = self.form.fields_mut().get_mut(self.selected) else {
            return effects;
        };
        if fld.input.is_modal() {
            if key.code == KeyCode::Enter && fld.input.is_enabled() {
                self.editing = true;
                self.message = Some("Editing: Esc to finish".into());
                return effects;
            }
        } else if fld.input.on_key(key) {
            return effects;
        }
        match key.code {
            KeyCode::Up if self.selected > 0 => self.focus_prev(),
            KeyCode::Down => self.focus_next(),
            _ => {}
        }
        effects
    }

    fn is_editing(&self) -> bool {
        self.editing
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
