//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use hautu_core::pipeline::{BuildProgress, BuildReport};
use hautu_shared::{
    AppConfig, BuildConfig, BuildStage, CONFIG_FILE_NAME, HautuError, ValidationWarning,
    init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Hautū Waka: build the single-page site from its content files.
#[derive(Parser)]
#[command(
    name = "hautu",
    version,
    about = "Merge the Hautū Waka content documents into one self-contained HTML page.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to hautu.toml (defaults to ./hautu.toml when present).
    #[arg(long, global = true, env = "HAUTU_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Path overrides shared by `build` and `check`.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct PathArgs {
    /// Directory containing intro/stages/tools/muscles/sources.json.
    #[arg(long, env = "HAUTU_CONTENT_DIR")]
    pub content_dir: Option<PathBuf>,

    /// Template file with {{SLOT}} insertion points (defaults to the built-in one).
    #[arg(long, env = "HAUTU_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Treat every validation warning as an error.
    #[arg(long)]
    pub strict: bool,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load, validate, render and write the site.
    Build {
        #[command(flatten)]
        paths: PathArgs,

        /// Output HTML file.
        #[arg(short, long, env = "HAUTU_OUTPUT")]
        out: Option<PathBuf>,
    },

    /// Load and validate the content without writing anything.
    Check {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// List the template insertion points the builder fills.
    Slots,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default hautu.toml in the current directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "hautu=info",
        1 => "hautu=debug",
        _ => "hautu=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    match cli.command {
        Command::Build { paths, out } => cmd_build(config_path.as_deref(), &paths, out),
        Command::Check { paths } => cmd_check(config_path.as_deref(), &paths),
        Command::Slots => cmd_slots(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

/// Load the project config and merge CLI overrides into a [`BuildConfig`].
///
/// Paths from the config file are relative to the file's directory; CLI paths
/// are relative to the working directory.
fn resolve_build_config(
    config_path: Option<&Path>,
    paths: &PathArgs,
    out: Option<PathBuf>,
) -> Result<BuildConfig> {
    let (app, base) = load_app_config(config_path)?;
    let mut build = BuildConfig::from(&app).resolved_against(&base);

    if let Some(dir) = &paths.content_dir {
        build.content_dir = dir.clone();
    }
    if let Some(template) = &paths.template {
        build.template = Some(template.clone());
    }
    if let Some(out) = out {
        build.output = out;
    }
    build.strict |= paths.strict;

    Ok(build)
}

fn load_app_config(config_path: Option<&Path>) -> Result<(AppConfig, PathBuf)> {
    let cwd = std::env::current_dir().wrap_err("cannot determine working directory")?;
    match config_path {
        Some(path) => {
            let app = load_config_from(path)?;
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or(cwd);
            Ok((app, base))
        }
        None => Ok((load_config(&cwd)?, cwd)),
    }
}

fn cmd_build(config_path: Option<&Path>, paths: &PathArgs, out: Option<PathBuf>) -> Result<()> {
    let build = resolve_build_config(config_path, paths, out)?;

    info!(
        content_dir = %build.content_dir.display(),
        output = %build.output.display(),
        strict = build.strict,
        "building site"
    );

    let progress = CliProgress::new();
    let result = hautu_core::build_site(&build, &progress);
    progress.finish();

    let report = result.map_err(stage_error)?;
    print_warnings(&report.validation.warnings);

    println!();
    println!("  Built:    {}", report.output.display());
    println!("  Size:     {:.1} KB", report.bytes as f64 / 1024.0);
    println!("  SHA-256:  {}", report.sha256);
    println!("  Warnings: {}", report.validation.warnings.len());
    println!("  Time:     {:.2}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_check(config_path: Option<&Path>, paths: &PathArgs) -> Result<()> {
    let build = resolve_build_config(config_path, paths, None)?;

    let progress = CliProgress::new();
    let result = hautu_core::check_content(&build, &progress);
    progress.finish();

    let report = result.map_err(stage_error)?;
    print_warnings(&report.warnings);

    if report.is_clean() {
        println!("  Content is consistent: no warnings.");
    } else {
        println!(
            "  {} warning(s); run with --strict to fail on them.",
            report.warnings.len()
        );
    }
    Ok(())
}

fn cmd_slots() -> Result<()> {
    for slot in hautu_core::SLOTS {
        let source = slot.document.map(|d| d.file_name()).unwrap_or_else(|| "config".into());
        let kind = if slot.mandatory { "mandatory" } else { "optional" };
        println!("  {{{{{}}}}}  {kind:<9}  {source}", slot.name);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let cwd = std::env::current_dir().wrap_err("cannot determine working directory")?;
    let path = init_config(&cwd)?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let (app, base) = load_app_config(config_path)?;
    let rendered =
        toml::to_string_pretty(&app).map_err(|e| eyre!("failed to render config: {e}"))?;
    println!("# resolved relative to {}", base.display());
    if config_path.is_none() && !base.join(CONFIG_FILE_NAME).exists() {
        println!("# no {CONFIG_FILE_NAME} found, showing defaults");
    }
    println!("{rendered}");
    Ok(())
}

/// Attach the failing build stage to the error report.
fn stage_error(err: HautuError) -> color_eyre::Report {
    let stage = err.stage();
    color_eyre::Report::new(err).wrap_err(format!("build failed during {stage} stage"))
}

fn print_warnings(warnings: &[ValidationWarning]) {
    for warning in warnings {
        eprintln!("  warning: {warning}");
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl BuildProgress for CliProgress {
    fn phase(&self, stage: BuildStage) {
        let message = match stage {
            BuildStage::Idle => "Starting",
            BuildStage::Loaded => "Loading content",
            BuildStage::Validated => "Checking cross-references",
            BuildStage::Rendered => "Rendering page",
            BuildStage::Written => "Writing output",
        };
        self.spinner.set_message(message);
    }

    fn warning(&self, warning: &ValidationWarning) {
        self.spinner.set_message(format!("Checking cross-references ({warning})"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}
