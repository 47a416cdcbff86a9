use crate::ui::{AppState, ToastLevel};
use crate::widgets::form::FormData;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub enum AppMsg {
    Key(KeyEvent),
    Tick,
}

#[derive(Debug)]
pub enum Effect {
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
    /// Form data read for the "Text to Binary" action.
    Translate { data: FormData },
    Quit,
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        AppMsg::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if let Some(t) = &state.toast {
                if state.tick >= t.expires_at_tick {
                    state.toast = None;
                }
            }
        }
        AppMsg::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return effects;
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
                effects.push(Effect::Quit);
                return effects;
            }
            if key.code == KeyCode::Esc && !state.form.is_editing() {
                effects.push(Effect::Quit);
                return effects;
            }
            effects.extend(state.form.on_key(key));
        }
    }
    effects
}
