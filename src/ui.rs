use crate::app::{update, AppMsg, Effect};
use crate::model::{nodes, seeds, AppConfig, Record, Scalar, YieldChartConfig};
use crate::widgets::form::Form;
use crate::widgets::form_widget::FormWidget;
use crate::widgets::line_chart::LineChartView;
use crate::widgets::yield_chart::YieldChartView;
use crate::widgets::Widget;
use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(200);
const DEBUG_PANE_H: u16 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub(crate) struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) form: Box<dyn Widget>,
    pub(crate) line_chart: LineChartView,
    pub(crate) yield_chart: YieldChartView,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) quit: bool,
    pub(crate) theme: crate::theme::Theme,
    // Debug log (rendered in bottom debug pane)
    pub(crate) debug_log: VecDeque<String>,
}

impl AppState {
    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }

    pub(crate) fn form_widget(&self) -> Option<&FormWidget> {
        self.form.as_any().downcast_ref::<FormWidget>()
    }
}

/// A fully built window: form and both charts, no terminal attached yet.
pub struct Application {
    pub(crate) state: AppState,
}

impl Application {
    pub fn title(&self) -> &str {
        &self.state.config.title
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                state.dbg(format!("toast {level:?}: {text}"));
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
            Effect::Translate { data } => {
                tracing::info!(fields = data.len(), "text to binary requested");
                let json = serde_json::to_string(&data).unwrap_or_default();
                state.dbg(format!("text to binary: {json}"));
                state.toast = Some(Toast {
                    text: format!("Read {} field(s); translation is not available", data.len()),
                    level: ToastLevel::Info,
                    expires_at_tick: state.tick.saturating_add(15),
                });
            }
            Effect::Quit => {
                tracing::info!("quit requested");
                state.quit = true;
            }
        }
    }
}

/// Points `(x, y, size)` of one seed sample, skipping records with non-numeric cells.
pub(crate) fn scatter_points(records: &[Record], cfg: &YieldChartConfig, label: &str) -> Vec<(f64, f64, f64)> {
    records
        .iter()
        .filter(|r| matches!(r.get(&cfg.series_field), Some(Scalar::Text(t)) if t == label))
        .filter_map(|r| {
            Some((
                r.get(&cfg.x_field)?.as_f64()?,
                r.get(&cfg.y_field)?.as_f64()?,
                r.get(&cfg.size_field)?.as_f64()?,
            ))
        })
        .collect()
}

pub fn build_application(config: AppConfig) -> Result<Application> {
    let form = Form::new("Form", &config.fields)
        .with_context(|| format!("building form for '{}'", config.title))?;

    let lc = &config.line_chart;
    let line_chart = LineChartView::new(
        &nodes(),
        (lc.width, lc.height),
        &lc.x_field,
        &lc.y_field,
        &lc.series_field,
    );

    let yc = &config.yield_chart;
    let mut yield_chart = YieldChartView::new(&yc.x_label, &yc.y_label, &yc.title);
    let seed_rows = seeds();
    let mut notes: Vec<String> = Vec::new();
    for s in &yc.series {
        let data = scatter_points(&seed_rows, yc, &s.label);
        if data.is_empty() {
            tracing::debug!(series = %s.label, "no yield data");
            continue;
        }
        let color = match crate::theme::color_from_name(&s.color) {
            Some(c) => c,
            None => {
                tracing::warn!(series = %s.label, color = %s.color, "unknown colour, using white");
                notes.push(format!("unknown colour '{}' for {}", s.color, s.label));
                Color::White
            }
        };
        yield_chart.draw_scatter(&data, color, &s.label);
    }
    notes.extend(line_chart.plot.errors().map(|e| e.to_string()));

    tracing::info!(
        title = %config.title,
        fields = form.len(),
        series = line_chart.plot.series.len(),
        scatters = yield_chart.legend().len(),
        "application built"
    );
    let mut state = AppState {
        config,
        form: Box::new(FormWidget::new(form)),
        line_chart,
        yield_chart,
        toast: None,
        tick: 0,
        quit: false,
        theme: crate::theme::Theme::default(),
        debug_log: VecDeque::new(),
    };
    for note in notes {
        state.dbg(note);
    }
    Ok(Application { state })
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run_application(app: Application) -> Result<()> {
    if env_flag("BLUEPRINT_TUI_HEADLESS") {
        let ticks: u64 = std::env::var("BLUEPRINT_TUI_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        let summary = run_headless(app, ticks)?;
        if env_flag("BLUEPRINT_TUI_SMOKE_SUMMARY") {
            println!("{summary}");
        }
        return Ok(());
    }
    let mut state = app.state;
    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let mut last_tick = Instant::now();
    while !state.quit {
        terminal.draw(|f| ui(f, state))?;
        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                let effects = update(state, AppMsg::Key(key));
                run_effects(state, effects);
            }
        }
        if last_tick.elapsed() >= TICK_RATE {
            let effects = update(state, AppMsg::Tick);
            run_effects(state, effects);
            last_tick = Instant::now();
        }
    }
    Ok(())
}

/// Render `ticks` frames off-screen and summarise the form.
pub(crate) fn run_headless(app: Application, ticks: u64) -> Result<JsonValue> {
    let mut state = app.state;
    let backend = ratatui::backend::TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend)?;
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, &mut state))?;
        let effects = update(&mut state, AppMsg::Tick);
        run_effects(&mut state, effects);
    }
    let read = state
        .form_widget()
        .map(|fw| fw.form.get())
        .context("form widget missing")?;
    let summary = match read {
        Ok(data) => serde_json::json!({
            "ok": true,
            "ticks": ticks,
            "data": data,
            "series": state.line_chart.plot.series.len(),
            "scatters": state.yield_chart.legend(),
        }),
        Err(e) => serde_json::json!({
            "ok": false,
            "ticks": ticks,
            "error": e.to_string(),
        }),
    };
    Ok(summary)
}

pub(crate) fn parse_config(text: &str) -> Result<AppConfig> {
    serde_yaml::from_str(text).context("parsing application config")
}

pub fn load_config() -> Result<AppConfig> {
    match std::env::var("BLUEPRINT_TUI_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            let cfg = parse_config(&text).with_context(|| format!("in {path}"))?;
            tracing::info!(%path, "config loaded");
            Ok(cfg)
        }
        Err(_) => Ok(AppConfig::default()),
    }
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    let app = build_application(cfg)?;
    run_application(app)
}

fn ui(f: &mut Frame, state: &mut AppState) {
    let screen = f.area();
    let bg = Block::default().style(Style::default().bg(state.theme.bg));
    f.render_widget(bg, screen);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(DEBUG_PANE_H),
            Constraint::Length(1),
        ])
        .split(screen);
    crate::widgets::header::draw_header(f, rows[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);
    let tick = state.tick;
    state.form.render(f, body[0], true, tick);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);
    state.line_chart.render(f, charts[0], "Growth", false);
    state.yield_chart.render(f, charts[1], false);

    draw_debug(f, rows[2], state);
    crate::widgets::status_bar::draw_footer(f, rows[3], state, help_text(state));
}

fn help_text(state: &AppState) -> &'static str {
    if state.form.is_editing() {
        "Esc: finish editing"
    } else {
        "Tab/Shift-Tab: focus  Enter: edit/activate  Space: toggle  Esc: quit"
    }
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let h = area.height.saturating_sub(2) as usize;
    let start = state.debug_log.len().saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|l| Line::from(Span::styled(l.clone(), crate::theme::text_muted())))
        .collect();
    let p = Paragraph::new(lines).block(crate::widgets::chrome::panel_block("Debug", false));
    f.render_widget(p, area);
}
