use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use wellwatch_types::TimeWindow;

use wellwatch::config::DashboardConfig;
use wellwatch::data::{project, RosterStore};
use wellwatch::ui::{self, Theme};
use wellwatch::{events, ApiClient, App, HttpTransport};

#[derive(Parser, Debug)]
#[command(name = "wellwatch")]
#[command(about = "Terminal dashboard for live staff wellness metrics")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the provider's REST API
    #[arg(short, long)]
    server: Option<String>,

    /// Push stream address (host:port)
    #[arg(short, long)]
    push: Option<String>,

    /// Initial time window (1m, 5m, 10m, 30m, 1h, 6h, 1d, 2d, All)
    #[arg(short, long)]
    window: Option<TimeWindow>,

    /// Initial sort key (status, name, mwi, hr, hrv, sleep_index, steadiness)
    #[arg(long)]
    sort: Option<String>,

    /// Initial role filter ("All" or a role name)
    #[arg(long)]
    role: Option<String>,

    /// Color theme (auto, dark, light)
    #[arg(long)]
    theme: Option<String>,

    /// Write logs to this file (the terminal is used by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch the roster once, write it to this JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, cfg: &mut DashboardConfig) {
        if let Some(ref server) = self.server {
            cfg.server_url = server.clone();
        }
        if let Some(ref push) = self.push {
            cfg.push_addr = push.clone();
        }
        if let Some(window) = self.window {
            cfg.window = window;
        }
        if let Some(ref sort) = self.sort {
            cfg.sort = sort.clone();
        }
        if let Some(ref role) = self.role {
            cfg.role = role.clone();
        }
        if let Some(ref theme) = self.theme {
            cfg.theme = theme.clone();
        }
        if let Some(ref path) = self.log_file {
            cfg.log_file = Some(path.clone());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = DashboardConfig::load(args.config.as_deref())?;
    args.apply(&mut cfg);
    cfg.validate()?;

    // Dropping the guard flushes buffered log lines, so it lives until exit.
    let _log_guard = init_logging(&cfg)?;

    let runtime = Runtime::new()?;
    let api = ApiClient::new(cfg.server_url.clone(), cfg.request_timeout())?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&runtime, &api, &cfg, export_path);
    }

    info!(server = %cfg.server_url, push = %cfg.push_addr, "Starting dashboard");

    let mut transport = HttpTransport::new(api, runtime.handle().clone());
    transport.connect_push(&cfg.push_addr, cfg.backoff());

    let app = App::new(Box::new(transport))
        .with_sort(cfg.sort_state()?)
        .with_window(cfg.window)
        .with_role_filter(cfg.role_filter())
        .with_theme(Theme::from_mode(cfg.theme_mode()?));

    let result = run_tui(app, cfg.tick());

    runtime.shutdown_timeout(Duration::from_millis(500));
    result
}

/// Log to the configured file, or not at all.
///
/// Lines are written by a background worker so the UI thread never blocks
/// on file I/O.
fn init_logging(cfg: &DashboardConfig) -> Result<Option<WorkerGuard>> {
    let Some(ref path) = cfg.log_file else {
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    Ok(Some(guard))
}

/// Run the TUI until the user quits
fn run_tui(mut app: App, tick: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app, tick);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        app.pump();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                frame.render_widget(paragraph, too_small_message_area(area));
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Window tabs
                Constraint::Min(8),    // Roster
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);
            ui::roster::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(tick)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table border (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }
    }

    info!("Dashboard exiting");
    Ok(())
}

/// Five rows around the vertical middle, clipped to the terminal.
fn too_small_message_area(area: Rect) -> Rect {
    Rect::new(area.x, area.y + (area.height / 2).saturating_sub(2), area.width, 5).intersection(area)
}

/// Fetch the roster once and write the configured projection to a file
fn export_to_file(
    runtime: &Runtime,
    api: &ApiClient,
    cfg: &DashboardConfig,
    export_path: &Path,
) -> Result<()> {
    let records = runtime
        .block_on(api.fetch_roster())
        .with_context(|| format!("failed to fetch roster from {}", api.base_url()))?;

    let mut store = RosterStore::new();
    store.initialize(records);
    let rows = project(store.snapshot(), &cfg.role_filter(), cfg.sort_state()?);

    let json = serde_json::to_string_pretty(&rows)?;
    std::fs::write(export_path, json)?;

    println!("Exported {} staff to {}", rows.len(), export_path.display());
    Ok(())
}
