use actionmap::cli::{
    configure_colors, configure_thread_pool, get_worker_count, parse_args, resolve_config,
    write_summary,
};
use actionmap::observability::{init_logging, install_panic_hook};
use actionmap::pipeline::Orchestrator;
use anyhow::{Context, Result};
use std::io::Write;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    install_panic_hook();
    let cli = parse_args();
    init_logging(cli.verbosity, cli.json);
    configure_colors(cli.plain || cli.json);
    configure_thread_pool(cli.jobs);
    tracing::debug!("Using {} worker threads", get_worker_count(cli.jobs));

    let config = resolve_config(&cli.project, cli.config.as_deref(), cli.namespace.as_deref())
        .context("Failed to load configuration")?;

    let report = Orchestrator::new(&config)
        .dry_run(cli.dry_run)
        .run(&cli.project)
        .with_context(|| format!("Failed to process {}", cli.project.display()))?;

    let mut stdout = std::io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        write_summary(&mut stdout, &report)?;
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
