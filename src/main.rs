//! `cinder-dis`: disassembler for serialized Cinder bytecode.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cinder::bytecode::{
    Bytecode, disassemble,
    disasm::{hex_dump, list_constants, op_counts},
};

#[derive(Debug, Parser)]
#[command(name = "cinder-dis", version, about = "Disassemble Cinder bytecode files")]
struct Args {
    /// Serialized bytecode file (.cbc)
    file: PathBuf,

    /// Also list the constant pool
    #[arg(short, long)]
    constants: bool,

    /// Dump the raw instruction bytes
    #[arg(long)]
    hex: bool,

    /// Print opcode frequencies
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.file.extension().and_then(|e| e.to_str()) != Some("cbc") {
        eprintln!("Error: expected a .cbc file, got {}", args.file.display());
        return ExitCode::FAILURE;
    }

    let bytes = match fs::read(&args.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    debug!(bytes = bytes.len(), file = %args.file.display(), "loaded");

    let bytecode = match Bytecode::from_bytes(&bytes) {
        Ok(bytecode) => bytecode,
        Err(e) => {
            eprintln!("Invalid bytecode file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.hex {
        print!("{}", hex_dump(&bytecode.instructions));
        println!();
    }

    match disassemble(&bytecode.instructions) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Disassembly error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if args.constants {
        println!();
        println!("constants ({}):", bytecode.constants.len());
        print!("{}", list_constants(&bytecode.constants));
    }

    if args.stats {
        let counts = match op_counts(&bytecode.instructions) {
            Ok(counts) => counts,
            Err(e) => {
                eprintln!("Disassembly error: {}", e);
                return ExitCode::FAILURE;
            }
        };

        println!();
        println!("Op frequency:");
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        for (op, count) in counts {
            let pct = (count as f64 / total as f64) * 100.0;
            println!("  {:<8} {:>6} ({:>5.1}%)", op.name(), count, pct);
        }
    }

    ExitCode::SUCCESS
}
