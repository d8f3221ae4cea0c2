//! CLI binary for liteswitch.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConverterConfig`, runs one batch and prints the outcome. This is also
//! the command the shell context menu invokes (`liteswitch "%1" --to pdf`).

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use liteswitch::{
    default_log_path, menu_entries, BatchController, BatchOutcome, BatchProgressCallback,
    ConsolePrompt, ConverterConfig, FileOutcome, Format, PageSeparator, Platform,
    ProgressCallback, Registry,
};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// file. The bar stays hidden until the target is known so it never draws
/// over the format prompt.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::hidden(),
        })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize, target: &Format) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix(format!("→ {}", target.label()));
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_file_start(&self, _index: usize, _total: usize, input: &Path) {
        self.bar.set_message(file_name(input));
    }

    fn on_file_complete(&self, index: usize, total: usize, input: &Path, succeeded: bool) {
        let mark = if succeeded { green("✓") } else { red("✗") };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            mark,
            index,
            total,
            file_name(input)
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _skipped: usize) {
        self.bar.finish_and_clear();
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one file
  liteswitch report.docx --to pdf

  # Convert several files; files that cannot become PDF are skipped
  liteswitch *.docx *.pptx notes.txt --to pdf

  # Let liteswitch ask for the target (list built from the first file)
  liteswitch slides.pdf

  # Every page of a PDF as PNG: slides_LiteSwitch_1.png, _2.png, ...
  liteswitch slides.pdf --to png

  # What can be converted to what
  liteswitch --list-formats

  # Context-menu entries for an installer, as JSON
  liteswitch --menu-entries

OUTPUT NAMING:
  Outputs are written next to the input as <name>_LiteSwitch.<ext>
  (change the suffix with --suffix). Converting again overwrites.

BACKENDS:
  Windows        Microsoft Office (via PowerShell), then LibreOffice
  Linux / macOS  LibreOffice (soffice)
  Everywhere     pandoc >= 2.0 for docx → odt/txt/md/tex/html,
                 PDFium for pdf → txt/html/md/png and png/jpg → pdf

ENVIRONMENT VARIABLES:
  LITESWITCH_LOG_DIR   Directory of liteswitch.log
  PDFIUM_LIB_PATH      Path to an existing libpdfium
  PDFIUM_CACHE_DIR     Directory searched for libpdfium
  RUST_LOG             Override the terminal log filter
"#;

/// Convert documents between office, PDF, text and image formats.
#[derive(Parser, Debug)]
#[command(
    name = "liteswitch",
    version,
    about = "Convert documents between office, PDF, text and image formats",
    long_about = "Convert documents between office, PDF, text and image formats. Each file is \
routed to the right backend (Microsoft Office, LibreOffice, pandoc or PDFium) and written next \
to the input with a predictable name.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to convert.
    #[arg(required_unless_present_any = ["list_formats", "menu_entries"])]
    inputs: Vec<PathBuf>,

    /// Target format (pdf, docx, png, …). Prompted for when omitted.
    #[arg(short, long, env = "LITESWITCH_TO")]
    to: Option<Format>,

    /// Print the supported conversions and exit.
    #[arg(long)]
    list_formats: bool,

    /// Print shell context-menu entries as JSON and exit.
    #[arg(long)]
    menu_entries: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "LITESWITCH_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "LITESWITCH_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level logs on the terminal.
    #[arg(short, long, env = "LITESWITCH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LITESWITCH_QUIET")]
    quiet: bool,

    /// Log file (default: per-user data directory).
    #[arg(long, env = "LITESWITCH_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Suffix added to output names.
    #[arg(long, env = "LITESWITCH_SUFFIX", default_value = "LiteSwitch")]
    suffix: String,

    /// LibreOffice executable.
    #[arg(long, env = "LITESWITCH_SOFFICE", default_value = "soffice")]
    soffice: String,

    /// Pandoc executable.
    #[arg(long, env = "LITESWITCH_PANDOC", default_value = "pandoc")]
    pandoc: String,

    /// PowerShell executable used for Office automation.
    #[arg(long, env = "LITESWITCH_POWERSHELL", default_value = "powershell")]
    powershell: String,

    /// Use another platform's toolchain.
    #[arg(long, env = "LITESWITCH_PLATFORM", value_enum)]
    platform: Option<Platform>,

    /// Page separator for txt/md output: none, hr, comment, or custom string.
    #[arg(long, env = "LITESWITCH_SEPARATOR", default_value = "none")]
    separator: String,
    /// Longest edge of rendered page images, in pixels (100 to 20000).
    /// Longest edge of rendered page images, in pixels.
    #[arg(long, env = "LITESWITCH_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "LITESWITCH_PASSWORD")]
    password: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{} {:#}", red("✘"), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.list_formats {
        return list_formats(cli.json);
    }
    if cli.menu_entries {
        let program = std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "liteswitch".to_string());
        let groups = menu_entries(Registry::standard(), &program);
        println!(
            "{}",
            serde_json::to_string_pretty(&groups).context("Failed to serialise menu entries")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&cli, show_progress, &log_path);

    // ── Inputs ───────────────────────────────────────────────────────────
    // Shell menus launch us with the selected file's folder as the working
    // directory; do the same for consistency once paths are absolute.
    let inputs: Vec<PathBuf> = cli
        .inputs
        .iter()
        .map(|p| std::path::absolute(p).unwrap_or_else(|_| p.clone()))
        .collect();
    if let Some(dir) = inputs.first().and_then(|p| p.parent()) {
        if let Err(e) = std::env::set_current_dir(dir) {
            debug!("Cannot change directory to {}: {}", dir.display(), e);
        }
    }
    info!("liteswitch {} on {} file(s)", env!("CARGO_PKG_VERSION"), inputs.len());

    // ── Build config and run ─────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let controller = BatchController::from_config(&config);

    let outcome = controller
        .convert_batch(&inputs, cli.to.as_ref(), &ConsolePrompt)
        .context("Nothing to convert")?;

    report(&cli, &outcome, &log_path)?;

    if outcome.cancelled || outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Terminal layer honouring -v/-q/RUST_LOG plus a DEBUG file layer.
fn init_logging(cli: &Cli, show_progress: bool, log_path: &Path) {
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)));

    let file_layer = open_log(log_path).map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn open_log(path: &Path) -> Option<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .output_suffix(&cli.suffix)
        .soffice_program(&cli.soffice)
        .pandoc_program(&cli.pandoc)
        .powershell_program(&cli.powershell)
        .max_rendered_pixels(cli.max_pixels)
        .page_separator(PageSeparator::parse(&cli.separator));

    if let Some(platform) = cli.platform {
        builder = builder.platform(platform);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn report(cli: &Cli, outcome: &BatchOutcome, log_path: &Path) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(&outcome.report())
            .context("Failed to serialise report")?;
        println!("{json}");
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    let summary = outcome.summary(Some(log_path));
    let mark = if outcome.cancelled {
        dim("•")
    } else if outcome.failed() == 0 && outcome.skipped() == 0 {
        green("✔")
    } else if outcome.is_success() {
        yellow("⚠")
    } else {
        red("✘")
    };
    let mut lines = summary.lines();
    if let Some(first) = lines.next() {
        eprintln!("{} {}", mark, bold(first));
    }
    for line in lines {
        eprintln!("  {}", line);
    }
    for o in &outcome.outcomes {
        if let FileOutcome::Success { output, .. } = o {
            eprintln!("  {} {}", green("→"), dim(&output.display().to_string()));
        }
    }
    Ok(())
}

fn list_formats(json: bool) -> Result<ExitCode> {
    let registry = Registry::standard();
    let table: BTreeMap<String, Vec<String>> = registry
        .sources()
        .map(|s| {
            let targets = registry
                .lookup(s)
                .unwrap_or_default()
                .iter()
                .map(|t| t.to_string())
                .collect();
            (s.to_string(), targets)
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&table).context("Failed to serialise formats")?
        );
    } else {
        for (source, targets) in &table {
            println!("{:>5}  →  {}", bold(source), targets.join(", "));
        }
    }
    Ok(ExitCode::SUCCESS)
}
