// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run Intcode programs from the command line

use intcode::network::{Wiring, max_signal};
use intcode::prelude::*;
use std::error::Error;
use std::fmt::{self, Display};
use std::fs::{self, read_to_string};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use itertools::Itertools;

#[derive(PartialEq, Clone, Copy, ValueEnum)]
enum CodeFormat {
    /// comma-separated ASCII-encoded decimal numbers
    #[value(alias("text"))]
    #[value(alias("aoc"))]
    Ascii,
    /// little-endian 64-bit integers
    #[cfg_attr(target_endian = "little", value(alias("binary-native")))]
    #[value(name("binary-little-endian"), alias("binle"))]
    LittleEndian,
    #[cfg_attr(target_endian = "big", value(alias("binary-native")))]
    #[value(name("binary-big-endian"), alias("binbe"))]
    /// big-endian 64-bit integers
    BigEndian,
}

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "Intcode virtual machine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Source {
    #[arg(help = "File containing the intcode program")]
    source: PathBuf,
    #[arg(help = "Input format for the intcode")]
    #[arg(short, long)]
    #[arg(default_value = "ascii")]
    format: CodeFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program, printing each output on its own line
    Run {
        #[command(flatten)]
        source: Source,
        #[arg(short, long = "input", help = "Input values, in order")]
        #[arg(value_delimiter = ',', allow_negative_numbers = true)]
        inputs: Vec<i64>,
        #[arg(short, long, help = "Log every executed instruction to stderr")]
        trace: bool,
        #[arg(short, long, help = "Print the memory tape to stderr once stopped")]
        dump: bool,
        #[arg(long = "set", value_name = "ADDR=VALUE", value_parser = parse_patch)]
        #[arg(help = "Patch memory before running")]
        patches: Vec<(i64, i64)>,
    },
    /// Find the phase order that gives the highest signal from a series of amplifiers
    Amplify {
        #[command(flatten)]
        source: Source,
        #[arg(short, long, value_delimiter = ',', default_value = "0,1,2,3,4")]
        #[arg(help = "Phase settings to arrange")]
        phases: Vec<i64>,
        #[arg(long, help = "Wire the last amplifier back into the first")]
        feedback: bool,
    },
}

fn parse_patch(s: &str) -> Result<(i64, i64), String> {
    let (addr, val) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got {s:?}"))?;
    let parse = |n: &str| {
        n.trim()
            .parse::<i64>()
            .map_err(|e| format!("{n:?} is not a valid integer: {e}"))
    };
    Ok((parse(addr)?, parse(val)?))
}

fn read_bin_file<F: Fn([u8; 8]) -> i64>(file: &Path, func: F) -> Result<Vec<i64>, Box<dyn Error>> {
    let input = fs::read(file)?;
    let (chunks, remainder) = input.as_chunks::<8>();
    if !remainder.is_empty() {
        return Err(Box::new(IncompleteI64(Box::from(remainder))));
    }
    Ok(chunks.iter().map(|c| func(*c)).collect())
}

impl Source {
    fn load(&self) -> Result<Vec<i64>, Box<dyn Error>> {
        let read_err =
            |e: std::io::Error| format!("failed to read {}: {}", self.source.display(), e);
        Ok(match self.format {
            CodeFormat::Ascii => read_to_string(&self.source)
                .map_err(read_err)?
                .split(',')
                .map(str::trim)
                .map(str::parse)
                .collect::<Result<Vec<i64>, _>>()?,
            CodeFormat::LittleEndian => read_bin_file(&self.source, i64::from_le_bytes)?,
            CodeFormat::BigEndian => read_bin_file(&self.source, i64::from_be_bytes)?,
        })
    }
}

fn run(
    mut interp: Interpreter,
    inputs: Vec<i64>,
    trace: bool,
    dump: bool,
) -> Result<(), Box<dyn Error>> {
    if trace {
        interp.start_trace();
    }
    let result = interp.run_through_inputs(inputs);
    if let Some(trace) = interp.end_trace() {
        eprint!("{trace}");
    }
    if dump {
        eprintln!("{}", interp.debug_dump());
    }
    let (outputs, state) = result.map_err(|error| RunError {
        instr_ptr: interp.instr_ptr(),
        error,
    })?;
    for out in outputs {
        println!("{out}");
    }
    if state == State::Awaiting {
        eprintln!("program is waiting for more input");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    match Cli::parse().command {
        Command::Run {
            source,
            inputs,
            trace,
            dump,
            patches,
        } => {
            let mut interp = Interpreter::new(source.load()?);
            for (addr, val) in patches {
                interp.poke(addr, val)?;
            }
            run(interp, inputs, trace, dump)
        }
        Command::Amplify {
            source,
            phases,
            feedback,
        } => {
            let wiring = if feedback { Wiring::Ring } else { Wiring::Chain };
            match max_signal(&source.load()?, &phases, wiring)? {
                Some((order, signal)) => {
                    println!("phases: {}", order.iter().join(","));
                    println!("signal: {signal}");
                }
                None => eprintln!("no phase settings given"),
            }
            Ok(())
        }
    }
}

#[derive(Debug)]
struct IncompleteI64(Box<[u8]>);

impl Display for IncompleteI64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected 8 bytes, got {}: {:02x?}", self.0.len(), self.0)
    }
}
impl Error for IncompleteI64 {}

#[derive(Debug)]
struct RunError {
    instr_ptr: u64,
    error: intcode::InterpreterError,
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instruction at {}: {}", self.instr_ptr, self.error)
    }
}
impl Error for RunError {}
