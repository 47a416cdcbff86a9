mod app;
mod blueprint_core;
mod error;
mod model;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;
use std::path::Path;

fn init_logging() {
    // Default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "blueprint_tui=info");
    }
    use tracing_subscriber::{fmt, EnvFilter};

    // The terminal belongs to the UI, so logs only go to a file
    let path = std::env::var("BLUEPRINT_TUI_LOG").unwrap_or_else(|_| "blueprint-tui.log".into());
    let path = Path::new(&path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "blueprint-tui.log".into());
    let file_appender = tracing_appender::rolling::never(dir, file);

    fmt()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn main() -> Result<()> {
    init_logging();
    tracing::info!("starting blueprint-tui");
    ui::run()
}
