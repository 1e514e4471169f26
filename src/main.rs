mod config;

use bus::{Bus, LoaderCommand, LoaderEvent};
use clap::Parser;
use config::{Config, ConfigError};
use core_types::Rect;
use html::dom_utils::outline_from_dom;
use html::{Id, Node};
use runtime_lazyload::{LoaderSetup, start_lazyload_runtime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;
use url::Url;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Longest we wait for any single runtime event (a slow image fetch).
const EVENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "lazybg")]
#[command(about = "Scroll an HTML page through a viewport and lazy load its background images")]
struct Cli {
    /// HTML page to load
    page: PathBuf,

    /// TOML file with [lazyload] and [viewport] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Selector for lazily loaded elements
    #[arg(long)]
    selector: Option<String>,

    /// Class added once an element's background is set
    #[arg(long)]
    loaded_class: Option<String>,

    /// Base URL for relative image sources (defaults to the page's directory)
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    viewport_width: Option<f32>,

    #[arg(long)]
    viewport_height: Option<f32>,

    /// Distance scrolled between visibility checks
    #[arg(long)]
    scroll_step: Option<f32>,

    /// Grow the viewport by this much on every side when checking visibility
    #[arg(long)]
    root_margin: Option<f32>,

    /// Do not fetch images; every load succeeds immediately
    #[arg(long)]
    offline: bool,

    /// Print at most this many lines of the final document outline
    #[arg(long, default_value_t = 40)]
    outline: usize,
}

impl Cli {
    /// CLI flags win over the config file, which wins over defaults.
    fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(selector) = &self.selector {
            config.lazyload.selector = selector.clone();
        }
        if let Some(class) = &self.loaded_class {
            config.lazyload.loaded_class_name = class.clone();
        }
        let viewport = &mut config.viewport;
        for (flag, field) in [
            (self.viewport_width, &mut viewport.width),
            (self.viewport_height, &mut viewport.height),
            (self.scroll_step, &mut viewport.scroll_step),
            (self.root_margin, &mut viewport.root_margin),
        ] {
            if let Some(v) = flag {
                *field = v;
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn resolve_base_url(&self) -> Result<Option<Url>, ConfigError> {
        if let Some(base) = &self.base_url {
            return Ok(Some(Url::parse(base)?));
        }
        Ok(page_directory_url(&self.page))
    }
}

fn page_directory_url(page: &Path) -> Option<Url> {
    let dir = fs::canonicalize(page).ok()?.parent()?.to_path_buf();
    Url::from_directory_path(dir).ok()
}

#[derive(Default)]
struct RunReport {
    tracked: usize,
    loaded: Vec<(Id, String)>,
    disconnected: bool,
}

impl RunReport {
    fn record(&mut self, event: LoaderEvent) -> Option<usize> {
        match event {
            LoaderEvent::Ready { tracked, started } => {
                self.tracked = tracked;
                return Some(started);
            }
            LoaderEvent::ScrollHandled { started } => return Some(started),
            LoaderEvent::NodeLoaded { id, source } => self.loaded.push((id, source)),
            LoaderEvent::ObserverDisconnected => self.disconnected = true,
        }
        None
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let base_url = cli.resolve_base_url()?;

    let source = fs::read_to_string(&cli.page)?;
    let document = html::parse_document(&source);
    let page_height = layout::layout_page(&document, config.viewport.width).page_height;
    log::info!(
        target: "lazybg",
        "{}: page height {page_height}px, viewport {}x{}",
        cli.page.display(),
        config.viewport.width,
        config.viewport.height
    );

    let viewport_at = |y: f32| Rect::new(0.0, y, config.viewport.width, config.viewport.height);
    let (bus, cmd_rx) = Bus::new();
    let runtime = start_lazyload_runtime(
        LoaderSetup {
            document,
            options: config.lazyload.clone(),
            viewport: viewport_at(0.0),
            root_margin: config.viewport.root_margin,
            base_url,
            load_images: !cli.offline,
        },
        cmd_rx,
        bus.evt_tx.clone(),
    )?;

    let mut report = RunReport::default();
    let mut y = 0.0;
    'scroll: loop {
        // The starting viewport is already reported by `Ready`.
        if y > 0.0 {
            bus.cmd_tx.send(LoaderCommand::Scroll {
                viewport: viewport_at(y),
            })?;
        }

        // Everything started by this step is loaded before scrolling on.
        let mut waiting_for: Option<usize> = None;
        let before = report.loaded.len();
        while waiting_for.is_none_or(|started| report.loaded.len() < before + started) {
            match bus.evt_rx.recv_timeout(EVENT_TIMEOUT) {
                Ok(event) => {
                    if let Some(started) = report.record(event) {
                        waiting_for = Some(started);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(target: "lazybg", "gave up waiting for images at y={y}");
                    break 'scroll;
                }
                Err(RecvTimeoutError::Disconnected) => break 'scroll,
            }
        }

        if report.disconnected || y + config.viewport.height >= page_height {
            break;
        }
        y += config.viewport.scroll_step;
    }

    let (reply, document_rx) = mpsc::channel();
    bus.cmd_tx.send(LoaderCommand::Shutdown { reply })?;
    let document: Node = document_rx.recv()?;
    // The runtime has sent everything by the time it replies.
    for event in bus.evt_rx.try_iter() {
        report.record(event);
    }
    if runtime.join().is_err() {
        log::error!(target: "lazybg", "loader runtime panicked");
    }

    for (id, source) in &report.loaded {
        println!("loaded {id:?} {source}");
    }
    println!(
        "tracked {}, loaded {}, pending {}, observer {}",
        report.tracked,
        report.loaded.len(),
        report.tracked.saturating_sub(report.loaded.len()),
        if report.disconnected {
            "disconnected"
        } else {
            "connected"
        }
    );
    if cli.outline > 0 {
        println!();
        for line in outline_from_dom(&document, cli.outline) {
            println!("{line}");
        }
    }
    Ok(())
}
