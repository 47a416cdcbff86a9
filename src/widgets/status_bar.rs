use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::AppState;

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let mut spans: Vec<Span> = Vec::new();
    if let Some(t) = &state.toast {
        let color = crate::theme::toast_color(t.level);
        let tag = match t.level {
            crate::ui::ToastLevel::Success => "[OK]",
            crate::ui::ToastLevel::Error => "[ERROR]",
            crate::ui::ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    // Focus / editing indicator
    if let Some(fw) = state.form_widget() {
        let focus = match fw.focused_button() {
            Some(b) => b.caption().to_string(),
            None => fw
                .form
                .fields()
                .get(fw.selected)
                .map(|fld| {
                    if fld.spec.required {
                        format!("{} (required)", fld.name)
                    } else {
                        fld.name.clone()
                    }
                })
                .unwrap_or_default(),
        };
        spans.push(Span::styled(
            format!("focus: {focus}"),
            Style::default().fg(Color::Magenta),
        ));
        if fw.editing {
            spans.push(Span::raw("  |  editing"));
        }
        spans.push(Span::raw("  |  "));
    }
    spans.push(Span::styled(
        help_text.to_string(),
        Style::default().fg(Color::DarkGray),
    ));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AppConfig;
    use crate::ui::{build_application, Toast, ToastLevel};
    use ratatui::backend::TestBackend;

    #[test]
    fn footer_shows_toast_focus_and_help() {
        let mut app = build_application(AppConfig::default()).unwrap();
        app.state.toast = Some(Toast {
            text: "Form reset".into(),
            level: ToastLevel::Info,
            expires_at_tick: 10,
        });
        let state = &app.state;
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_footer(f, area, state, "Esc: quit");
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let line: String = (0..buf.area.width).map(|x| buf[(x, 0)].symbol()).collect();
        assert!(line.contains("[INFO] Form reset"));
        assert!(line.contains("focus: Notes (required)"));
        assert!(line.contains("Esc: quit"));
    }
}
