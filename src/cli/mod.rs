//! CLI module for archmark

mod args;

pub use args::Args;

use crate::analysis::{check_root, AnalysisResult, Analyzer};
use crate::config::{Config, LiveConfig, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::console;
use crate::output::{LiveOutcome, LiveReport, ReportExporter};
use clap::Parser;
use std::future::Future;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};
#[cfg(not(unix))]
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "ARCHMARK_LOG";

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here too and are not failures.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(args.verbose);

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_not_found() {
                eprintln!("Please provide the path to an existing folder of markdown files.");
            }
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber; a second call is a no-op
pub fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        if let Ok(directive) = "archmark=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

/// Analyze, print the console report, then export and go live as requested.
///
/// Validation failures are part of the report, not errors. Export and live
/// failures are reported after the summary and turn into an error.
pub fn execute(args: Args) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    cfg.merge_cli(
        args.recursive,
        args.export,
        args.output_dir.clone(),
        args.export_html,
    );
    cfg.validate()?;

    check_root(&args.folder)?;

    debug!(
        folder = %args.folder.display(),
        recursive = cfg.scan.recursive,
        required = cfg.schema.required_fields.len(),
        "starting analysis"
    );

    let analyzer = Analyzer::new(cfg.clone())?.with_verbose(args.verbose);
    let result = analyzer.analyze(&args.folder)?;

    print!("{}", console::render_report(&result, args.show_structure));

    let mut failed = 0usize;

    if let Some(target) = cfg.output.export {
        let exporter = ReportExporter::new(&cfg.output.directory);
        let report = exporter.export(&result, &target.formats());

        if !report.written.is_empty() {
            println!("\nExported files:");
            for (format, path) in &report.written {
                println!("  {}: {}", format, path.display());
            }
        }
        for (format, error) in &report.failures {
            eprintln!("{} export failed: {}", format, error);
        }
        failed += report.failures.len();
    }

    if cfg.live.enabled {
        // The live session runs its own analyses without a progress bar.
        let live_analyzer = Analyzer::new(cfg.clone())?;
        match run_live(live_analyzer, &args.folder, &cfg.live, &result) {
            Ok(outcome) => info!(regenerations = outcome.regenerations, "live report stopped"),
            Err(e) => {
                eprintln!("Live HTML report failed: {}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(Error::other(format!("{} output(s) could not be written", failed)));
    }
    Ok(())
}

/// Keep a live HTML report fresh until Ctrl+C or SIGTERM
fn run_live(
    analyzer: Analyzer,
    root: &Path,
    config: &LiveConfig,
    result: &AnalysisResult,
) -> Result<LiveOutcome> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        // Handlers go in before the page exists so no signal can skip cleanup.
        let shutdown = shutdown_signal()?;

        let mut live = LiveReport::new(analyzer, root, config)?;
        live.start(result)?;

        println!("\nLive HTML report: {}", live.path().display());
        println!(
            "Checking for changes every {}s; press Ctrl+C to stop",
            config.refresh_secs
        );

        live.run_until(shutdown).await
    })
}

/// Resolves on SIGINT or SIGTERM
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => debug!("received SIGINT"),
            _ = terminate.recv() => debug!("received SIGTERM"),
        }
    })
}

/// Resolves on Ctrl+C
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl+C, stopping live report: {}", e);
        }
    })
}
