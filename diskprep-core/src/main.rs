use anyhow::bail;
use clap::Parser;
use diskprep_core::app;
use diskprep_core::cli::{Cli, Command};
use diskprep_core::config::DiskprepConfig;
use diskprep_core::{logging, DeviceLocks};
use diskprep_hal::LinuxHal;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DiskprepConfig::load_or_default(cli.config.as_deref())?;
    logging::init(&config.log_file, cli.verbose);

    let hal = LinuxHal::new();
    match &cli.command {
        Command::Probe { device } => {
            let identity = app::run_probe(&hal, &config, device)?;
            println!("{}", identity);
        }
        Command::Format {
            targets,
            dry_run,
            yes_i_know,
        } => {
            let reports = app::run_format(
                &hal,
                &config,
                DeviceLocks::global(),
                targets,
                *dry_run,
                *yes_i_know,
            );

            let mut failed = 0;
            for report in &reports {
                match &report.result {
                    Ok(_) => println!("{}", report.summary()),
                    Err(err) => {
                        log::error!("{}", err);
                        eprintln!("{}", report.summary());
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} targets failed", failed, reports.len());
            }
        }
    }

    Ok(())
}
