//! Minimal host process for the multiloader pipeline.
//!
//! # Responsibility
//! - Initialize stderr logging and run one bootstrap in the working directory.
//! - Print the loaded extension summary to stdout.
//!
//! Extension entrypoints resolve only against symbols registered in
//! `host_runtime`. This binary registers `HOST_READY_SYMBOL`; an extension
//! listing it as an entrypoint gets a log line and nothing else. Every other
//! target is reported as a resolution failure.

use log::{error, info};
use multiloader_core::{
    default_log_level, init_logging, Bootstrap, BootstrapConfig, BoxError, ConfigLedger,
    ExtensionRegistry, HostRuntime, LogTarget, Runnable, TypeDefinition,
};
use std::process::ExitCode;

/// Entrypoint target the host binary provides to every archive.
const HOST_READY_SYMBOL: &str = "multiloader.host.Ready";

#[derive(Default)]
struct HostReady;

impl Runnable for HostReady {
    fn run(&mut self) -> Result<(), BoxError> {
        info!("event=host_ready module=cli core={}", multiloader_core::core_version());
        Ok(())
    }
}

fn host_runtime() -> HostRuntime {
    let mut runtime = HostRuntime::new();
    runtime.define_host(TypeDefinition::runnable::<HostReady>(HOST_READY_SYMBOL));
    runtime
}

fn main() -> ExitCode {
    if let Err(err) = init_logging(default_log_level(), LogTarget::Stderr) {
        eprintln!("multiloader: logging disabled: {err}");
    }

    let runtime = host_runtime();
    let mut transform = ConfigLedger::new();
    let mut registry = ExtensionRegistry::new();

    println!("[multiloader] Booting... (core {})", multiloader_core::core_version());
    match Bootstrap::new(BootstrapConfig::default()).run(&runtime, &mut transform, &mut registry) {
        Ok(report) => {
            println!("[multiloader] Loaded mods:");
            for line in report.summary_lines() {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=bootstrap module=cli status=error error={err}");
            eprintln!("[multiloader] {err}");
            ExitCode::FAILURE
        }
    }
}
