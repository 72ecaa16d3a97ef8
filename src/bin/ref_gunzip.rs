//! `ref-gunzip`: a subject that is correct by construction.
//!
//! Honors the subject contract (`-d`, gzip on stdin, payload on stdout,
//! non-zero exit with a message on stderr when decoding fails) using the
//! harness's own reference codec. Pointing `gzcheck` at it checks the harness
//! itself.

use std::io::{self, Read, Write};

use clap::Parser;

use gzcheck::{GzipOracle, Oracle};

#[derive(Parser, Debug)]
#[command(name = "ref-gunzip", version)]
struct Opts {
    /// Decompress data
    #[arg(short = 'd', long = "decompress")]
    decompress: bool,
}

fn run() -> anyhow::Result<()> {
    let mut input = Vec::new();
    io::stdin().lock().read_to_end(&mut input)?;
    let output = GzipOracle::default().decompress(&input)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    let opts = Opts::parse();
    if !opts.decompress {
        return;
    }
    if let Err(err) = run() {
        eprintln!("ref-gunzip: {:#}", err);
        std::process::exit(1);
    }
}
