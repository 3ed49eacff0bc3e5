//! movecodec CLI: Move type inspection, ABI-driven decoding and dependency
//! resolution for Aptos and Sui.
//!
//! # Commands
//! ```text
//! movecodec parse-type <SIGNATURE>
//! movecodec match-type <PATTERN> <CANDIDATE>
//! movecodec decode     --data <file.json> [--type <T>] [--abi-dir <dir>] [--chain aptos|sui]
//! movecodec deps       [--abi-dir <dir>] [--chain aptos|sui] [--endpoint <url>] [--out <dir>]
//! movecodec bcs        --type <T> --data <text> [--encoding hex|base64|base58]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Chain, MoveCodecConfig};
use movecodec_observability::init_tracing;
use std::path::PathBuf;

mod abi;
mod cmd_bcs;
mod cmd_decode;
mod cmd_deps;
mod cmd_types;
mod config;

#[derive(Parser)]
#[command(
    name = "movecodec",
    about = "Move ABI type toolkit for Aptos and Sui",
    long_about = "
movecodec: parse and match Move type signatures, decode node JSON and BCS
bytes against on-chain ABIs, and resolve the accounts a set of ABIs depends on.

Settings come from --config (YAML or JSON); command-line flags win.
Log filtering also honours RUST_LOG-style directives in --log-level.
",
    version
)]
struct Cli {
    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or EnvFilter directives, e.g. "debug" or "info,movecodec_registry=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by the commands that load ABIs.
#[derive(clap::Args)]
struct SourceArgs {
    /// Chain whose ABI format the files use
    #[arg(long, value_enum)]
    chain: Option<Chain>,
    /// Directory of ABI files, one `<account>.json` per account
    #[arg(long)]
    abi_dir: Option<PathBuf>,
    /// Fullnode URL for modules missing locally
    #[arg(long)]
    endpoint: Option<String>,
}

impl SourceArgs {
    fn apply(self, config: &mut MoveCodecConfig) {
        if let Some(chain) = self.chain {
            config.chain = chain;
        }
        if let Some(dir) = self.abi_dir {
            config.abi_dir = dir;
        }
        if self.endpoint.is_some() {
            config.endpoint = self.endpoint;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a type signature and show its normalized form and dependencies
    #[command(name = "parse-type")]
    ParseType {
        signature: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a concrete type against a pattern (`any` matches anything)
    #[command(name = "match-type")]
    MatchType { pattern: String, candidate: String },

    /// Decode node JSON (events, resources, objects, values)
    Decode {
        #[command(flatten)]
        source: SourceArgs,
        /// Decode every value as this type instead of its own type tag
        #[arg(long = "type")]
        ty: Option<String>,
        /// JSON file with one value or an array of values
        #[arg(long)]
        data: PathBuf,
    },

    /// Resolve the foreign accounts local ABIs depend on
    Deps {
        #[command(flatten)]
        source: SourceArgs,
        /// Write one manifest per output unit into this directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Save fetched ABIs into the ABI directory
        #[arg(long)]
        cache: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode BCS bytes (Sui layouts)
    Bcs {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long = "type")]
        ty: String,
        /// Encoded bytes
        #[arg(long)]
        data: String,
        #[arg(long, default_value = "hex")]
        encoding: String,
        /// Decode the BCS JSON further into typed values
        #[arg(long)]
        typed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MoveCodecConfig::load(path)?,
        None => MoveCodecConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    if cli.json_logs {
        config.log.json = true;
    }
    init_tracing(&config.log);

    match cli.command {
        Commands::ParseType { signature, json } => cmd_types::parse(&signature, json),

        Commands::MatchType { pattern, candidate } => cmd_types::matches(&pattern, &candidate),

        Commands::Decode { source, ty, data } => {
            source.apply(&mut config);
            cmd_decode::run(&config, ty.as_deref(), &data).await
        }

        Commands::Deps { source, out, cache, json } => {
            source.apply(&mut config);
            cmd_deps::run(&config, out.as_deref(), cache, json).await
        }

        Commands::Bcs { source, ty, data, encoding, typed } => {
            source.apply(&mut config);
            config.chain = Chain::Sui;
            cmd_bcs::run(&config, &ty, &data, &encoding, typed).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "movecodec",
            "decode",
            "--chain",
            "sui",
            "--abi-dir",
            "fixtures/sui/abi",
            "--data",
            "pool.json",
        ])
        .unwrap();
        let Commands::Decode { source, ty, .. } = cli.command else {
            panic!("expected decode");
        };
        let mut config = MoveCodecConfig::default();
        source.apply(&mut config);
        assert_eq!(config.chain, Chain::Sui);
        assert_eq!(config.abi_dir, PathBuf::from("fixtures/sui/abi"));
        assert_eq!(config.endpoint, None);
        assert!(ty.is_none());
    }
}
