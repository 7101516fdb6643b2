use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ls8_core::{ProgramLoader, StdoutSink, TextImageLoader};
use ls8_cpu::{Ls8Machine, MachineConfig, MEMORY_SIZE};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

/// Runs an LS-8 program image.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Program image: one binary byte per line, `#` starts a comment.
    program: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log every executed instruction.
    #[arg(long)]
    trace: bool,

    /// Stop after this many instructions.
    #[arg(long)]
    max_steps: Option<u64>,
}

impl Args {
    fn level(&self) -> LevelFilter {
        if self.trace {
            return LevelFilter::TRACE;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

const EXIT_FAULT: u8 = 1;
const EXIT_LOAD: u8 = 2;

fn load(args: &Args) -> anyhow::Result<Ls8Machine> {
    let loader = TextImageLoader::new(&args.program, MEMORY_SIZE);
    let program = loader
        .load()
        .with_context(|| format!("failed to load {}", loader.path().display()))?;
    let config = MachineConfig {
        max_steps: args.max_steps,
        ..Default::default()
    };
    Ok(Ls8Machine::with_config(&program, config)?)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let stderr_format = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(stderr_format.with_filter(args.level()))
        .init();

    let mut machine = match load(&args) {
        Ok(machine) => machine,
        Err(err) => {
            tracing::error!("{:#}", err);
            return ExitCode::from(EXIT_LOAD);
        }
    };

    match machine.run(&mut StdoutSink) {
        Ok(summary) => {
            tracing::info!(
                "halted after {} instructions, PC 0x{:02X}",
                summary.steps,
                summary.pc
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::from(EXIT_FAULT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_level() {
        let cases = [
            (vec!["ls8", "p.ls8"], LevelFilter::WARN),
            (vec!["ls8", "-v", "p.ls8"], LevelFilter::INFO),
            (vec!["ls8", "-vv", "p.ls8"], LevelFilter::DEBUG),
            (vec!["ls8", "-vvvv", "p.ls8"], LevelFilter::TRACE),
            (vec!["ls8", "--trace", "p.ls8"], LevelFilter::TRACE),
        ];
        for (argv, level) in cases {
            let args = Args::try_parse_from(argv.clone()).unwrap();
            assert_eq!(args.level(), level, "{:?}", argv);
        }
    }

    #[test]
    fn max_steps_reaches_machine() {
        let args = Args::try_parse_from(["ls8", "--max-steps", "12", "p.ls8"]).unwrap();
        assert_eq!(args.max_steps, Some(12));
        assert_eq!(args.program, PathBuf::from("p.ls8"));
        assert!(Args::try_parse_from(["ls8"]).is_err());
    }

    #[test]
    fn missing_program_fails_to_load() {
        let args = Args::try_parse_from(["ls8", "/nonexistent/ls8/program.ls8"]).unwrap();
        let err = load(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to load /nonexistent/ls8/program.ls8"));
    }
}
