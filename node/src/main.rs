// Copyright (c) 2026 Glint Labs. MIT License.
// See LICENSE for details.

//! # GLINT Demo Node
//!
//! Entry point for the `glint-node` binary. Parses CLI arguments,
//! initializes logging, mines a demo chain in memory, and drops into an
//! interactive loop where every pasted transaction id is verified by the
//! chosen light-client protocol.
//!
//! The binary supports three subcommands:
//!
//! - `spv`     — Simple Payment Verification wallet simulation
//! - `nipopow` — NiPoPoW client simulation
//! - `version` — print build version information

mod cli;
mod logging;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;

use glint_protocol::chain::generate_blockchain;
use glint_protocol::crypto::hash::Digest;
use glint_protocol::fullnode::FullNode;
use glint_protocol::nipopow::{NipopowClient, Verdict};
use glint_protocol::spv::SpvClient;

use cli::{Commands, GlintCli, LogArgs, NipopowArgs, SpvArgs};
use logging::LogFormat;

/// Where the STORE command dumps the chain.
const STORE_PATH: &str = "blockchain.txt";

const BANNER_RULE: &str =
    "---------------------------------------------------------------------";

fn main() -> Result<()> {
    let cli = GlintCli::parse();

    match cli.command {
        Commands::Spv(args) => run_spv(args),
        Commands::Nipopow(args) => run_nipopow(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Simulations
// ---------------------------------------------------------------------------

fn run_spv(args: SpvArgs) -> Result<()> {
    init_logs(&args.log);
    let difficulty = parse_target(&args.difficulty)?;

    banner("Simple Payment Verification Simulation");
    let chain = generate_blockchain(args.blocks, args.coinbase, difficulty);
    let node = FullNode::new(chain);
    let wallet = SpvClient::new(&node);
    println!("Blockchain generated: {} blocks.", node.chain().len());
    println!("Paste a transaction id to verify it; LIST shows ids, HELP lists commands.\n");

    repl(|line| match parse_command(line) {
        Command::Quit => Flow::Quit,
        Command::List => {
            list_chain(&node);
            Flow::Continue
        }
        Command::Store => {
            store_chain(&node);
            Flow::Continue
        }
        Command::Header => {
            println!("The SPV simulation stores block headers, not a superchain.");
            Flow::Continue
        }
        Command::Help => {
            print_help(false);
            Flow::Continue
        }
        Command::Empty => Flow::Continue,
        Command::Verify(raw) => {
            match wallet.verify_transaction(raw) {
                Ok(height) => println!("transaction verified by SPV (block {height})\n"),
                Err(err) => println!("rejected: {err}\n"),
            }
            Flow::Continue
        }
    })
}

fn run_nipopow(args: NipopowArgs) -> Result<()> {
    init_logs(&args.log);
    let difficulty = parse_target(&args.difficulty)?;

    banner("Non-Interactive Proof of Proof-of-Work Client Simulation");
    let chain = generate_blockchain(args.blocks, args.coinbase, difficulty);
    let node = FullNode::new(chain);
    let client = NipopowClient::bootstrap(&node, args.k, args.m);
    println!("Blockchain generated: {} blocks.", node.chain().len());
    println!(
        "Client bootstrapped with a {}-block superchain snapshot (k={}, m={}).",
        client.stored_superchain().len(),
        args.k,
        args.m
    );
    println!("Paste a transaction id to verify it; LIST shows ids, HELP lists commands.\n");

    repl(|line| match parse_command(line) {
        Command::Quit => Flow::Quit,
        Command::List => {
            list_chain(&node);
            Flow::Continue
        }
        Command::Store => {
            store_chain(&node);
            Flow::Continue
        }
        Command::Header => {
            println!("stored superchain:");
            for hash in client.stored_superchain() {
                println!("  {hash}");
            }
            println!();
            Flow::Continue
        }
        Command::Help => {
            print_help(true);
            Flow::Continue
        }
        Command::Empty => Flow::Continue,
        Command::Verify(raw) => {
            match client.verify_transaction(raw) {
                Verdict::Accept { block_height } => {
                    println!("transaction verified by NiPoPoW (block {block_height})\n")
                }
                Verdict::Reject { reason } => println!("rejected: {reason}\n"),
            }
            Flow::Continue
        }
    })
}

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

enum Flow {
    Continue,
    Quit,
}

enum Command<'a> {
    Quit,
    List,
    Store,
    Header,
    Help,
    Empty,
    Verify(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    match line.trim() {
        "QUIT" | "quit" | "q" | "EXIT" | "exit" => Command::Quit,
        "LIST" | "l" => Command::List,
        "STORE" | "s" => Command::Store,
        "HEADER" | "HEADERS" | "HEAD" => Command::Header,
        "HELP" | "h" => Command::Help,
        "" => Command::Empty,
        other => Command::Verify(other),
    }
}

/// Prompt, read, dispatch, repeat. EOF counts as a clean quit.
fn repl<F: FnMut(&str) -> Flow>(mut handle: F) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("$ ");
        io::stdout().flush().context("flushing prompt")?;
        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line.context("reading input")?;
        if let Flow::Quit = handle(&line) {
            return Ok(());
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_logs(log: &LogArgs) {
    let filter = format!(
        "glint_node={level},glint_protocol={level}",
        level = log.log_level
    );
    let format = if log.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(&filter, format);
}

fn parse_target(hex: &str) -> Result<Digest> {
    hex.parse()
        .with_context(|| format!("invalid difficulty target {hex:?}"))
}

fn banner(title: &str) {
    println!("\n{BANNER_RULE}");
    println!("{title}");
    println!("{BANNER_RULE}\n");
}

fn list_chain(node: &FullNode) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = node.write_transactions(&mut stdout) {
        println!("could not list the chain: {err}");
    }
}

fn store_chain(node: &FullNode) {
    match node.store_transactions(STORE_PATH) {
        Ok(()) => println!("chain stored in '{STORE_PATH}'\n"),
        Err(err) => println!("could not store the chain: {err}\n"),
    }
}

fn print_help(nipopow: bool) {
    println!("{BANNER_RULE}");
    println!("Commands:");
    println!("  HELP / h      show this screen");
    println!("  LIST / l      list all blocks and their transaction ids");
    println!("  STORE / s     dump the chain to '{STORE_PATH}'");
    if nipopow {
        println!("  HEADER        print the stored superchain snapshot");
    }
    println!("  QUIT / q      exit");
    println!();
    println!("Anything else is treated as a transaction id and verified.");
    println!("Use LIST and copy any id to see an accept; mistype it to see");
    println!("a reject.");
    println!("{BANNER_RULE}\n");
}

fn print_version() {
    println!("glint-node {}", env!("CARGO_PKG_VERSION"));
}
