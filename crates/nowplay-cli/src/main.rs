//! nowplay - Now Playing provisioning tool
//!
//! Usage:
//!   nowplay install   # Install dependencies, clone, configure, register service
//!   nowplay update    # Stop service, reset to remote, optionally refresh packages

mod interactive;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nowplay_core::error::{ProvisionError, Stage, StageContext};
use nowplay_core::exec::SystemRunner;
use nowplay_core::orchestration::{InstallReport, Orchestrator, UpdateReport};
use nowplay_core::privilege::PrivilegeGuard;
use nowplay_core::service::TeardownOutcome;
use nowplay_core::settings::SettingsStore;

use crate::interactive::DialoguerPrompter;

#[derive(Parser)]
#[command(name = "nowplay")]
#[command(about = "Now Playing installer and updater", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Full install: packages, fresh clone, configuration, systemd unit
    Install,
    /// Stop the service and reset the working copy to the remote
    Update,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nowplay=info,nowplay_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(
        cli.command,
        PrivilegeGuard::effective(),
        SettingsStore::from_default_location,
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "{} {}",
                style("error:").red().bold(),
                format_chain(&err)
            );
            ExitCode::from(err.exit_code())
        }
    }
}

/// The privilege check runs before the settings file is even located.
fn run(
    command: Commands,
    guard: PrivilegeGuard,
    locate_store: impl FnOnce() -> anyhow::Result<SettingsStore>,
) -> Result<(), ProvisionError> {
    guard.check()?;

    let settings = locate_store()
        .and_then(|store| store.load())
        .stage(Stage::Settings)?;

    let orchestrator =
        Orchestrator::new(&settings, Arc::new(SystemRunner::new())).with_guard(guard);
    let prompter = DialoguerPrompter::new();

    match command {
        Commands::Install => {
            let report = orchestrator.install(&prompter)?;
            print_install_report(&report);
        }
        Commands::Update => {
            let report = orchestrator.update(&prompter)?;
            print_update_report(&report);
        }
    }
    Ok(())
}

fn format_chain(err: &ProvisionError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    message
}

fn print_install_report(report: &InstallReport) {
    println!();
    println!("{}", style("  Installation complete").bold().green());
    println!("  ───────────────────────────");
    println!("  Commit:   {}", style(&report.commit).cyan());
    println!(
        "  Config:   {} ({})",
        report.config_path.display(),
        style(short_digest(&report.config_digest)).dim()
    );
    println!(
        "  Unit:     {} ({})",
        report.unit_path.display(),
        style(short_digest(&report.unit_digest)).dim()
    );
    if report.replaced_root {
        println!("  Replaced the previous installation directory");
    }
    if report.prior_unit == TeardownOutcome::Removed {
        println!("  Replaced a previously registered unit");
    }
    println!();
}

fn print_update_report(report: &UpdateReport) {
    println!();
    println!("{}", style("  Update complete").bold().green());
    println!("  ───────────────────────────");
    println!("  Commit:   {}", style(&report.commit).cyan());
    println!(
        "  Packages: {}",
        if report.refreshed_dependencies {
            "refreshed"
        } else {
            "unchanged"
        }
    );
    println!();
    println!(
        "  The service is stopped. Start it with: {}",
        style(format!("sudo systemctl start {}", report.unit_name)).yellow()
    );
    println!();
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
