use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use instance_monitor::app::{export_document, write_export};
use instance_monitor::data::duration::parse_duration;
use instance_monitor::{
    collect_once, events, source, ui, App, InstanceConfig, Sampler, Settings, SharedThresholds,
};

#[derive(Parser, Debug)]
#[command(name = "instance-monitor")]
#[command(about = "Terminal dashboard for remote instance metrics and threshold alerts")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Instance to monitor as NAME=URL or a bare URL/path (repeatable).
    /// Replaces the instances from the settings file.
    #[arg(short, long = "instance", value_name = "NAME=URL")]
    instances: Vec<String>,

    /// Polling interval (e.g., "5s", "500ms")
    #[arg(long)]
    interval: Option<String>,

    /// HTTP request timeout (e.g., "4s")
    #[arg(long)]
    timeout: Option<String>,

    /// CPU usage threshold in percent
    #[arg(long)]
    cpu: Option<f64>,

    /// Memory usage threshold in percent
    #[arg(long)]
    memory: Option<f64>,

    /// Disk usage threshold in percent
    #[arg(long)]
    disk: Option<f64>,

    /// Inbound threshold (I/O megabytes and active sockets)
    #[arg(long)]
    network_in: Option<f64>,

    /// Outbound threshold (I/O megabytes and established sockets)
    #[arg(long)]
    network_out: Option<f64>,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Sample the first instance once, write the dashboard as JSON and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let settings = resolve_settings(&args)?;
    info!(
        "Loaded settings: {} instance(s), interval {:?}",
        settings.instances.len(),
        settings.interval
    );

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_once(&settings, export_path));
    }

    // Sampler tasks are spawned from the UI thread
    let _guard = rt.enter();
    run_tui(settings)
}

/// Install a file-backed tracing subscriber. `RUST_LOG` overrides the level.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Settings file and environment, then command line overrides.
fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if !args.instances.is_empty() {
        settings.instances = args
            .instances
            .iter()
            .enumerate()
            .map(|(i, spec)| InstanceConfig::parse(spec, i))
            .collect::<Result<_>>()?;
    }
    if let Some(ref interval) = args.interval {
        settings.interval = parse_duration(interval).context("Invalid --interval")?;
    }
    if let Some(ref timeout) = args.timeout {
        settings.request_timeout = parse_duration(timeout).context("Invalid --timeout")?;
    }

    let thresholds = &mut settings.thresholds;
    let overrides = [
        (args.cpu, &mut thresholds.cpu),
        (args.memory, &mut thresholds.memory),
        (args.disk, &mut thresholds.disk),
        (args.network_in, &mut thresholds.network_in),
        (args.network_out, &mut thresholds.network_out),
    ];
    for (value, slot) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }

    settings.validate()?;
    Ok(settings)
}

/// Run one sampling cycle against the first instance and export it.
async fn export_once(settings: &Settings, export_path: &Path) -> Result<()> {
    let Some(instance) = settings.instances.first() else {
        bail!("No instance configured");
    };
    let source = source::open(&instance.url, settings.request_timeout)?;
    let state = collect_once(source.as_ref(), &settings.thresholds)
        .await
        .with_context(|| format!("Failed to sample {}", instance.url))?;

    let document = export_document(Some(instance), &state, &settings.thresholds);
    write_export(export_path, &document)?;

    println!("Exported dashboard to: {}", export_path.display());
    Ok(())
}

/// Run the TUI until the user quits.
fn run_tui(settings: Settings) -> Result<()> {
    let mut app = App::new(
        Sampler::new(settings.interval),
        settings.instances,
        SharedThresholds::new(settings.thresholds),
        settings.request_timeout,
    );
    app.connect()?;

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

    let result = run_app(&mut terminal, &mut app);

    app.disconnect();

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

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.refresh();
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            events::handle_event(app, event);
        }
    }

    Ok(())
}
