//! # CLI Interface
//!
//! Defines the command-line argument structure for `glint-node` using
//! `clap` derive. Two simulations share one binary: the SPV wallet and the
//! NiPoPoW client, each generating its own demo chain at startup.

use clap::{Parser, Subcommand};

use glint_protocol::config::{
    DEFAULT_BLOCK_COUNT, DEFAULT_COINBASE, DEFAULT_GOODNESS, DEFAULT_SUFFIX_LEN,
    NIPOPOW_DEMO_TARGET, SPV_DEMO_TARGET,
};

/// GLINT light-client verification demo.
///
/// Generates a proof-of-work chain in memory, then drops into an
/// interactive loop where pasted transaction ids are verified by the chosen
/// light-client protocol.
#[derive(Parser, Debug)]
#[command(
    name = "glint-node",
    about = "GLINT light-client verification demo",
    version,
    propagate_version = true
)]
pub struct GlintCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `glint-node` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the SPV wallet simulation (header-holding light client).
    Spv(SpvArgs),
    /// Run the NiPoPoW client simulation (superchain-holding light client).
    Nipopow(NipopowArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `spv` subcommand.
#[derive(Parser, Debug)]
pub struct SpvArgs {
    /// Number of blocks to pre-generate, genesis included.
    #[arg(long, short = 'b', env = "GLINT_BLOCKS", default_value_t = 8)]
    pub blocks: usize,

    /// Coinbase reward per block.
    #[arg(long, env = "GLINT_COINBASE", default_value_t = DEFAULT_COINBASE)]
    pub coinbase: u64,

    /// Proof-of-work target as 40 hex characters; blocks hash below it.
    #[arg(long, env = "GLINT_DIFFICULTY", default_value = SPV_DEMO_TARGET)]
    pub difficulty: String,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Arguments for the `nipopow` subcommand.
#[derive(Parser, Debug)]
pub struct NipopowArgs {
    /// Number of blocks to pre-generate, genesis included.
    #[arg(long, short = 'b', env = "GLINT_BLOCKS", default_value_t = DEFAULT_BLOCK_COUNT)]
    pub blocks: usize,

    /// Coinbase reward per block.
    #[arg(long, env = "GLINT_COINBASE", default_value_t = DEFAULT_COINBASE)]
    pub coinbase: u64,

    /// Proof-of-work target as 40 hex characters; loose by default so
    /// superblock levels stay populated.
    #[arg(long, env = "GLINT_DIFFICULTY", default_value = NIPOPOW_DEMO_TARGET)]
    pub difficulty: String,

    /// Stability parameter: proofs ship the last k blocks verbatim.
    #[arg(short, default_value_t = DEFAULT_SUFFIX_LEN)]
    pub k: usize,

    /// Goodness parameter: minimum blocks per populated superblock level.
    #[arg(short, default_value_t = DEFAULT_GOODNESS)]
    pub m: usize,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Logging options shared by both simulations.
#[derive(Parser, Debug)]
pub struct LogArgs {
    /// Default log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit JSON log lines instead of pretty-printed ones.
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        GlintCli::command().debug_assert();
    }

    #[test]
    fn spv_defaults_match_the_demo_parameters() {
        let cli = GlintCli::parse_from(["glint-node", "spv"]);
        match cli.command {
            Commands::Spv(args) => {
                assert_eq!(args.blocks, 8);
                assert_eq!(args.coinbase, 25);
                assert_eq!(args.difficulty, SPV_DEMO_TARGET);
            }
            _ => panic!("expected spv subcommand"),
        }
    }

    #[test]
    fn nipopow_accepts_k_and_m() {
        let cli = GlintCli::parse_from(["glint-node", "nipopow", "-k", "2", "-m", "5"]);
        match cli.command {
            Commands::Nipopow(args) => {
                assert_eq!(args.k, 2);
                assert_eq!(args.m, 5);
            }
            _ => panic!("expected nipopow subcommand"),
        }
    }
}
