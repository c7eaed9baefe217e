use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gateway_xds::config::ControllerConfig;
use gateway_xds::validation::{validate_manifests, validate_prefix_rewrite, validate_route_path};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Controller configuration file (TOML)
    #[arg(long, env = "GATEWAY_XDS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, env = "GATEWAY_XDS_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the paths and rewrites of every HTTPRoute in the given manifests
    Validate(ValidateArgs),
    /// Check a single route path
    CheckPath { path: String },
    /// Check a single prefix rewrite
    CheckRewrite { rewrite: String },
    /// Show version information
    Version,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Multi-document YAML files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print problems as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ControllerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    config.log_json |= args.log_json;
    init_tracing(config.log_json);

    debug!(controller_name = %config.controller_name, "configuration loaded");

    match args.command {
        Commands::Version => {
            println!("gateway-xds v{}", env!("CARGO_PKG_VERSION"));
            println!("Controller: {}", config.controller_name);
            Ok(())
        }
        Commands::CheckPath { path } => {
            validate_route_path(&path).with_context(|| format!("path {path:?} is invalid"))?;
            println!("ok");
            Ok(())
        }
        Commands::CheckRewrite { rewrite } => {
            validate_prefix_rewrite(&rewrite)
                .with_context(|| format!("rewrite {rewrite:?} is invalid"))?;
            println!("ok");
            Ok(())
        }
        Commands::Validate(validate_args) => run_validate(validate_args),
    }
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn run_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let mut problems = Vec::new();

    for file in &args.files {
        let raw = std::fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;
        let errors =
            validate_manifests(&raw).with_context(|| format!("parsing {}", file.display()))?;
        info!("{}: {} problem(s)", file.display(), errors.len());
        problems.extend(errors.into_iter().map(|err| (file.display().to_string(), err)));
    }

    if args.json {
        let out: Vec<_> = problems
            .iter()
            .map(|(file, err)| {
                serde_json::json!({
                    "file": file,
                    "route": err.route,
                    "message": err.message,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (file, err) in &problems {
            println!("{file}: {err}");
        }
    }

    if !problems.is_empty() {
        bail!("{} invalid path(s) found", problems.len());
    }
    Ok(())
}
