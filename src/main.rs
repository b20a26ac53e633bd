use std::process::ExitCode;

use anyhow::Context;
use env_logger::Env;
use torfetch::{
    cli::Cli,
    configuration::{get_configuration_from, Settings},
    errors::error_chain,
    startup::run,
};

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let settings = get_configuration_from(cli.config.as_deref())
        .context("Failed to read configuration")?;
    settings.validate()?;

    Ok(settings)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let cli = match Cli::from_args() {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            return ExitCode::from(1);
        }
    };

    match run(&settings, &cli.targets_file).await {
        Ok(report) => {
            println!("--- Scan finished ---");
            println!(
                "Targets: {}, succeeded: {}, failed: {}",
                report.summary.total, report.summary.succeeded, report.summary.failed
            );
            println!("Report: {}", report.log_file.display());
            println!("Outputs: {}", report.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) if e.is_critical() => {
            eprintln!("CRITICAL ERROR: {}", error_chain(&e));
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("ERROR: {}", error_chain(&e));
            ExitCode::from(1)
        }
    }
}
