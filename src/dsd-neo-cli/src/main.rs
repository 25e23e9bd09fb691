// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

mod cli;
mod csv_import;
mod engine;

use clap::Parser;
use dsd_neo_app::{init_logging, ConfigFile, EngineConfig};
use dsd_neo_core::hooks::HookRegistryBuilder;
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::engine::{Engine, ExitCode};

fn apply_cli_overrides(mut config: EngineConfig, cli: &Cli) -> EngineConfig {
    if cli.trunk {
        config.trunk_enable = true;
        config.p25_trunk = true;
    }
    if cli.trunk_tune_group_calls {
        config.trunk_tune_group_calls = true;
    }
    if cli.trunk_tune_private_calls {
        config.trunk_tune_private_calls = true;
    }
    if cli.trunk_tune_enc_calls {
        config.trunk_tune_enc_calls = true;
    }
    if let Some(secs) = cli.trunk_hangtime_secs {
        config.trunk_hangtime_secs = secs;
    }
    if cli.trunk_use_allow_list {
        config.trunk_use_allow_list = true;
    }
    if let Some(ms) = cli.watchdog_ms {
        config.p25_watchdog_ms = Some(ms);
    }
    config
}

/// Run every CSV import the CLI was asked for. Each import is independent;
/// a failure in one is reported and does not block the others, but each
/// leaves its own target table untouched on failure.
fn run_csv_imports(cli: &Cli) -> bool {
    let mut all_ok = true;

    if let Some(path) = &cli.import_group_policy {
        match csv_import::import_group_policy(path) {
            Ok(table) => info!(rows = table.len(), "imported group/TG policy"),
            Err(e) => {
                error!("group policy import failed: {}", e);
                all_ok = false;
            }
        }
    }
    if let Some(path) = &cli.import_lcn_map {
        match csv_import::import_lcn_map(path) {
            Ok(table) => info!(rows = table.len(), "imported LCN map"),
            Err(e) => {
                error!("LCN map import failed: {}", e);
                all_ok = false;
            }
        }
    }
    if let Some(path) = &cli.import_channel_map {
        match csv_import::import_channel_map(path) {
            Ok(table) => info!(rows = table.len(), "imported channel map"),
            Err(e) => {
                error!("channel map import failed: {}", e);
                all_ok = false;
            }
        }
    }
    if let Some(path) = &cli.import_key_table {
        match csv_import::import_key_table(path) {
            Ok(table) => info!(rows = table.len(), "imported key table"),
            Err(e) => {
                error!("key table import failed: {}", e);
                all_ok = false;
            }
        }
    }
    if let Some(path) = &cli.import_nxdn_vertex_keys {
        match csv_import::import_nxdn_vertex_keys(path) {
            Ok(table) => info!(rows = table.len(), "imported NXDN vertex keys"),
            Err(e) => {
                error!("NXDN vertex key import failed: {}", e);
                all_ok = false;
            }
        }
    }

    all_ok
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config_result = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path),
        None => EngineConfig::load_from_default_paths().map(|(config, _path)| config),
    };
    let base_config = match config_result {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let config = apply_cli_overrides(base_config, &cli);

    if cli.print_config {
        println!("{:#?}", config);
        return;
    }

    if !run_csv_imports(&cli) {
        warn!("one or more CSV imports failed; continuing with unmodified tables");
    }

    let hooks = HookRegistryBuilder::new().build();
    let engine = Engine::new(&config, hooks, true);

    let exitflag = engine.exitflag();
    if let Err(e) = ctrlc::set_handler(move || exitflag.signal()) {
        warn!("failed to install Ctrl-C handler: {}", e);
    }

    match engine.run() {
        ExitCode::Continue => {}
        ExitCode::Exit(code) => std::process::exit(code),
        ExitCode::Error => std::process::exit(1),
    }
}
