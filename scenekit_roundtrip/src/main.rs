// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `node-roundtrip`: checks that a node stream survives decode and re-encode.
//!
//! Exits with status 0 when the re-encoded bytes are identical to the input
//! and the decoded trees are structurally equal, and 1 on a mismatch or any
//! failure. Set `RUST_LOG` to see decoder diagnostics.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use scenekit_core::codec::DecodeLimits;
use scenekit_debug::{json, pretty::TreePrinter};
use scenekit_roundtrip::round_trip;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Round-trip a scenekit node stream through the codec
#[derive(Parser, Debug)]
#[command(name = "node-roundtrip", version)]
struct Args {
    /// Node stream to read
    input: PathBuf,

    /// Where to write the re-encoded stream
    output: Option<PathBuf>,

    /// Print the decoded tree to stdout
    #[arg(long)]
    dump: bool,

    /// Print the decoded tree as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Apply the limits meant for streams from untrusted sources
    #[arg(long)]
    untrusted: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // Help and version requests are not failures.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Returns whether the round-trip passed.
fn run(args: &Args) -> Result<bool> {
    let input = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let limits = if args.untrusted {
        DecodeLimits::untrusted()
    } else {
        DecodeLimits::standard()
    };
    let rt = round_trip(&input, limits)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    let mut stdout = io::stdout().lock();
    if args.dump {
        TreePrinter::with_writer(&mut stdout)
            .print(&rt.root)
            .context("writing tree dump")?;
    }
    if args.json {
        json::export(&rt.root, &mut stdout).context("writing JSON export")?;
    }
    stdout.flush()?;

    if let Some(path) = &args.output {
        write_output(path, &rt.reencoded)?;
    }

    if let Some(offset) = rt.first_difference {
        tracing::error!(
            offset,
            input_len = input.len(),
            output_len = rt.reencoded.len(),
            "re-encoded stream differs from input"
        );
    }
    if !rt.structurally_equal {
        tracing::error!("decoded trees differ after re-encoding");
    }
    if rt.passed() {
        tracing::info!(nodes = rt.root.node_count(), "round-trip ok");
    }
    Ok(rt.passed())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
