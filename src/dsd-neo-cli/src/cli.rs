// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::path::PathBuf;

use clap::Parser;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - ", env!("CARGO_PKG_DESCRIPTION"));

/// dsd-neo: SDR digital-voice-decoder core with P25 trunking support.
#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION
)]
pub struct Cli {
    /// Path to a dsd-neo.toml config file; overrides default search paths.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Enable P25 trunking.
    #[arg(long = "trunk")]
    pub trunk: bool,

    /// Tune group (talkgroup) calls.
    #[arg(long = "trunk-tune-group-calls")]
    pub trunk_tune_group_calls: bool,

    /// Tune private (individual) calls.
    #[arg(long = "trunk-tune-private-calls")]
    pub trunk_tune_private_calls: bool,

    /// Tune encrypted calls (audio will still be muted unless unlocked).
    #[arg(long = "trunk-tune-enc-calls")]
    pub trunk_tune_enc_calls: bool,

    /// Seconds to hold a voice channel after a call ends before releasing.
    #[arg(long = "trunk-hangtime")]
    pub trunk_hangtime_secs: Option<u64>,

    /// Block all TGs not on the allow list.
    #[arg(long = "trunk-use-allow-list")]
    pub trunk_use_allow_list: bool,

    /// Override the watchdog tick cadence in milliseconds (clamped to [20, 2000]).
    #[arg(long = "watchdog-ms")]
    pub watchdog_ms: Option<u64>,

    /// Import group/TG policy from a CSV file (groupNumber, groupMode).
    #[arg(long = "import-group-policy")]
    pub import_group_policy: Option<PathBuf>,

    /// Import the LCN → frequency map from a CSV file (lcn, freqHz).
    #[arg(long = "import-lcn-map")]
    pub import_lcn_map: Option<PathBuf>,

    /// Import the channel → frequency map from a CSV file (channel16, freqHz).
    #[arg(long = "import-channel-map")]
    pub import_channel_map: Option<PathBuf>,

    /// Import a key table from a CSV file (keyId, keyValue — decimal or 0x-hex).
    #[arg(long = "import-key-table")]
    pub import_key_table: Option<PathBuf>,

    /// Import NXDN vertex keys from a CSV file (vertexId, keyValue).
    #[arg(long = "import-nxdn-vertex-keys")]
    pub import_nxdn_vertex_keys: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Print resolved configuration and exit without starting the engine.
    #[arg(long = "print-config")]
    pub print_config: bool,
}
