//! Renders the dvspi(1) manual from the clap definition
//!
//! The page covers the write/read/control subcommands together with the
//! shared session flags (backend, chip select, poll limit, buffered mode).
//! Takes an optional output directory, `man/` by default.

use clap::CommandFactory;
use std::fs;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "../backends.rs"]
mod backends;
#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let output_dir = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("man")
    };

    fs::create_dir_all(&output_dir)?;

    let man = clap_mangen::Man::new(cli::Cli::command());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    let output_path = output_dir.join("dvspi.1");
    fs::write(&output_path, buffer)?;

    println!("Wrote dvspi(1) to {}", output_path.display());
    println!("Inspect with: man -l {}", output_path.display());

    Ok(())
}
