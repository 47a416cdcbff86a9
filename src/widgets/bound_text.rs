use crate::blueprint_core::observable::{Subscription, Variable};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tui_textarea::{CursorMove, Input, TextArea};

struct Buffer {
    textarea: TextArea<'static>,
    // Set by user edits, cleared once the variable has been updated.
    modified: bool,
}

impl Buffer {
    fn content(&self) -> String {
        self.textarea.lines().join("\n")
    }

    fn load(&mut self, text: &str) {
        let lines: Vec<String> = text.split('\n').map(String::from).collect();
        let mut ta = TextArea::new(lines);
        ta.move_cursor(CursorMove::Bottom);
        ta.move_cursor(CursorMove::End);
        self.textarea = ta;
    }
}

/// Multi-line text buffer kept in sync with a `Variable<String>` in both directions.
pub struct BoundText {
    buffer: Rc<RefCell<Buffer>>,
    variable: Option<Variable<String>>,
    subscription: Option<Subscription>,
    enabled: Rc<Cell<bool>>,
}

impl BoundText {
    pub fn new(variable: Option<Variable<String>>) -> Self {
        let mut buf = Buffer {
            textarea: TextArea::default(),
            modified: false,
        };
        if let Some(var) = &variable {
            buf.load(&var.get());
        }
        let buffer = Rc::new(RefCell::new(buf));
        let subscription = variable.as_ref().map(|var| {
            let weak: Weak<RefCell<Buffer>> = Rc::downgrade(&buffer);
            var.on_write(move |value: &String| {
                if let Some(buf) = weak.upgrade() {
                    let mut b = buf.borrow_mut();
                    // Our own edits come back with identical content; keep the cursor.
                    if b.content() != *value {
                        b.load(value);
                    }
                    b.modified = false;
                }
            })
        });
        Self {
            buffer,
            variable,
            subscription,
            enabled: Rc::new(Cell::new(true)),
        }
    }

    pub fn variable(&self) -> Option<&Variable<String>> {
        self.variable.as_ref()
    }

    pub fn text(&self) -> String {
        self.buffer.borrow().content()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.borrow().modified
    }

    /// Shared enabled state, for owners that toggle it from a listener.
    pub fn enabled_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.enabled)
    }

    /// Feed a key to the editor. User edits are pushed into the variable.
    pub fn input(&mut self, input: impl Into<Input>) -> bool {
        if !self.enabled.get() {
            return false;
        }
        let changed = {
            let mut b = self.buffer.borrow_mut();
            let changed = b.textarea.input(input);
            if changed {
                b.modified = true;
            }
            changed
        };
        if changed {
            self.sync_to_variable();
        }
        changed
    }

    /// Replace the buffer as an edit would (marks it modified) without syncing yet.
    pub fn edit_text(&mut self, text: &str) {
        let mut b = self.buffer.borrow_mut();
        b.load(text);
        b.modified = true;
    }

    /// Push a pending edit into the variable. Returns whether a write happened.
    pub fn sync_to_variable(&mut self) -> bool {
        let Some(var) = &self.variable else {
            return false;
        };
        let content = {
            let mut b = self.buffer.borrow_mut();
            if !b.modified {
                return false;
            }
            b.modified = false;
            b.content()
        };
        var.set(content);
        true
    }

    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, focused: bool) {
        let mut b = self.buffer.borrow_mut();
        let mut block = Block::default().borders(Borders::ALL).title(title.to_string());
        if focused {
            block = block.border_style(crate::theme::border_focused());
        }
        b.textarea.set_block(block);
        if self.enabled.get() {
            b.textarea.set_style(Style::default());
            b.textarea
                .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        } else {
            b.textarea.set_style(crate::theme::text_muted());
            b.textarea.set_cursor_style(Style::default());
        }
        f.render_widget(&b.textarea, area);
    }
}

impl Drop for BoundText {
    fn drop(&mut self) {
        if let (Some(var), Some(sub)) = (&self.variable, self.subscription) {
            var.unsubscribe(sub);
        }
    }
}
