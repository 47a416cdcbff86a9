use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::AppState;

/// Window title in the frame, configured header text centred inside.
pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let block = crate::widgets::chrome::panel_block(&state.config.title, false);
    let p = Paragraph::new(Line::from(Span::styled(
        state.config.header.clone(),
        crate::theme::text_active_bold(),
    )))
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(p, area);
}
