use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use p2j::{
    notebook_to_script, script_to_notebook, ConvertError, ConvertOptions, ConvertOutcome,
    ConvertRequest, ExitCode, FixedUrlResolver, GitRemoteResolver, RepositoryUrlResolver,
    ScanOptions,
};
use p2j_config::{Config, LoadOptions};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Convert a Python script to Jupyter notebook and vice versa",
    long_about = None
)]
struct Cli {
    /// Python script to convert (a notebook with --reverse)
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Convert a Jupyter notebook to a Python script
    #[arg(short, long)]
    reverse: bool,

    /// Target filename; defaults to the source name with the other extension
    #[arg(short, long, value_name = "PATH")]
    target: Option<PathBuf>,

    /// Overwrite an existing target file
    #[arg(short, long)]
    overwrite: bool,

    /// Read configuration from this file on top of the discovered ones
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not prepend the "Open In Colab" badge cell
    #[arg(long)]
    no_badge: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match run(&cli) {
        Ok(exit) | Err(exit) => std::process::ExitCode::from(exit as u8),
    }
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "p2j=warn" } else { "p2j=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, ExitCode> {
    let config = load_config(cli).map_err(|err| {
        eprintln!("{err:#}");
        ExitCode::Failure
    })?;
    debug!(layers = config.sources.layers.len(), "configuration loaded");

    let request = ConvertRequest {
        source: cli.source.clone(),
        target: cli.target.clone(),
        overwrite: cli.overwrite,
        options: build_options(cli, &config),
    };

    let result = if cli.reverse {
        notebook_to_script(request)
    } else {
        let resolver = build_resolver(&config);
        script_to_notebook(request, resolver.as_ref())
    };

    match result {
        Ok(outcome) => {
            handle_success(cli, &outcome);
            Ok(outcome.exit_code)
        }
        Err(err) => {
            let exit = err.exit_code();
            handle_error(&err);
            Err(exit)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut options = LoadOptions::default();
    if let Some(path) = &cli.config {
        options = options.with_override_path(path);
    }
    Config::load(options).context("Unable to load configuration")
}

fn build_options(cli: &Cli, config: &Config) -> ConvertOptions {
    ConvertOptions {
        scan: ScanOptions {
            one_line_comments: config.convert.one_line_comments,
            unindent_block_comments: config.convert.unindent_block_comments,
        },
        badge: config.badge.enabled && !cli.no_badge,
    }
}

fn build_resolver(config: &Config) -> Box<dyn RepositoryUrlResolver> {
    match &config.badge.repository_url {
        Some(url) => Box::new(FixedUrlResolver(url.clone())),
        None => Box::new(GitRemoteResolver),
    }
}

fn handle_success(cli: &Cli, outcome: &ConvertOutcome) {
    if cli.reverse {
        println!("Python script {} written.", outcome.target.display());
    } else {
        println!("Notebook written to {}", outcome.target.display());
    }
}

fn handle_error(err: &ConvertError) {
    match err {
        ConvertError::InvalidExtension { .. }
        | ConvertError::SourceNotFound(_)
        | ConvertError::TargetExists(_) => eprintln!("{err}"),
        ConvertError::MalformedDocument(json_err) => {
            eprintln!("Notebook could not be read: {json_err}");
        }
        ConvertError::Io(io_err) => eprintln!("I/O error: {io_err}"),
    }
}
