pub mod bound_text;
pub mod chrome;
pub mod form;
pub mod form_widget;
pub mod header;
pub mod label_input;
pub mod line_chart;
pub mod status_bar;
pub mod yield_chart;

use crate::app::Effect;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use std::any::Any;

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64);
    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let _ = key;
        Vec::new()
    }
    /// True while the widget holds the keyboard (e.g. a multi-line editor).
    fn is_editing(&self) -> bool {
        false
    }
    fn as_any(&self) -> &dyn Any;
}
