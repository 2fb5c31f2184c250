//! trivalid - triangle checks by geometry and by model.

mod app;
mod cli;
mod ui;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use trivalid::{BackendKind, SideTriple, ThresholdProfile, TriangleValidator, ValidatorConfig};

use app::ViewState;
use cli::{Cli, Commands, ConfigAction};

const CONFIG_FILE_NAME: &str = "trivalid.toml";
const HOME_ENV: &str = "TRIVALID_HOME";

/// Exit status of `check` when a side is not a finite number.
const EXIT_INPUT_ERROR: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let root = install_root();
    let config = effective_config(&cli, &root)?;

    match cli.command {
        Commands::Check { a, b, c, json } => run_check(&config, &a, &b, &c, json),
        Commands::Watch => run_watch(&config),
        Commands::Config { action } => run_config(action, &config, &root),
    }
}

/// Directory the relative artifact paths are anchored at: `$TRIVALID_HOME`,
/// else the directory holding the executable, else the working directory.
fn install_root() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn effective_config(cli: &Cli, root: &Path) -> anyhow::Result<ValidatorConfig> {
    let default_file = root.join(CONFIG_FILE_NAME);
    let mut config = match &cli.config {
        Some(path) => ValidatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None if default_file.exists() => {
            debug!(path = %default_file.display(), "using config beside the executable");
            ValidatorConfig::load(&default_file)?
        }
        None => ValidatorConfig::default(),
    }
    .resolve_paths(root);

    // Command-line paths are taken relative to the working directory.
    if let Some(backend) = &cli.backend {
        let switched = match (backend.parse::<BackendKind>(), config.backend.parse::<BackendKind>()) {
            (Ok(new), Ok(old)) => (new != old).then_some(new),
            _ => None,
        };
        if let (Some(kind), None) = (switched, &cli.model) {
            config.model_path = root.join(kind.default_model_path());
        }
        config.backend = backend.clone();
    }
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    if let Some(scaler) = &cli.scaler {
        config.scaler_path = scaler.clone();
    }
    if cli.strict {
        config = config.with_profile(ThresholdProfile::Strict);
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    Ok(config)
}

fn build_validator(config: &ValidatorConfig) -> anyhow::Result<TriangleValidator> {
    let validator = TriangleValidator::from_config(config).context("invalid configuration")?;
    if let Some(reason) = validator.degraded_reason() {
        warn!(%reason, "running without a model");
    } else {
        info!(backend = ?validator.backend_name(), threshold = validator.threshold(), "validator ready");
    }
    Ok(validator)
}

fn run_check(
    config: &ValidatorConfig,
    a: &str,
    b: &str,
    c: &str,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let validator = build_validator(config)?;
    let status = check(&validator, [a, b, c], json, &mut std::io::stdout().lock())?;
    Ok(ExitCode::from(status))
}

/// Validates one triple and writes the result to `out`. Returns the exit status.
fn check(
    validator: &TriangleValidator,
    [a, b, c]: [&str; 3],
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<u8> {
    let verdict = match validator.validate_str(a, b, c) {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("Invalid input: {}", e);
            return Ok(EXIT_INPUT_ERROR);
        }
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&verdict)?)?;
    } else {
        writeln!(out, "{}", ui::summary(&verdict))?;
    }
    Ok(0)
}

fn run_watch(config: &ValidatorConfig) -> anyhow::Result<ExitCode> {
    let validator = build_validator(config)?;
    let mut state = ViewState::new();

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sides: SideTriple = match line.parse() {
            Ok(sides) => sides,
            Err(e) => {
                println!("Invalid input: {}", e);
                continue;
            }
        };
        let verdict = validator.validate_sides(&sides);
        let changes = state.apply(verdict);
        println!("{}", ui::summary(&verdict));
        for change in &changes {
            println!("  {}", ui::describe_change(change, &verdict));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_config(
    action: ConfigAction,
    config: &ValidatorConfig,
    root: &Path,
) -> anyhow::Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            config.validate()?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            ValidatorConfig::default().save(&path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
