use clap::Parser;
use std::io;
use std::process;
use tracing::{error, info};
use upside_ampl::AmplProcess;
use upside_cli::cli::Cli;
use upside_cli::config::UpsideConfig;
use upside_core::{pipeline, report, ExitCode, UpsideResult};

fn main() {
    let cli = Cli::parse();

    let config = match UpsideConfig::load(cli.config.as_deref()) {
        Ok(config) => config.merge_cli(&cli),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(ExitCode::Failure as i32);
        }
    };
    let level = match config.log_level() {
        Ok(level) => level,
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(ExitCode::Failure as i32);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&config) {
        Ok(report) => print!("{report}"),
        Err(err) => {
            let code = ExitCode::from(&err);
            error!("Run aborted with exit code {}", code as i32);
            eprintln!("error: {} stage failed: {err}", err.stage());
            process::exit(code as i32);
        }
    }
}

fn run(config: &UpsideConfig) -> UpsideResult<String> {
    info!("Using model {}", config.paths.model.display());
    let backend = AmplProcess::open(&config.paths.model, config.paths.ampl.clone())?;
    let schedule = pipeline::run(
        &config.paths.data_dir,
        config.limits,
        &backend,
        &config.solver,
    )?;
    Ok(report::render(&schedule, config.report.show_accepted))
}
