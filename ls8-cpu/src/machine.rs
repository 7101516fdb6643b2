use ls8_core::{MemoryError, OutputSink};
use thiserror::Error;

use crate::cpu::Ls8Cpu;
use crate::fault::Fault;
use crate::registers::INITIAL_SP;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("failed to load program: {0}")]
    Memory(#[from] MemoryError),
    #[error("step limit of {0} instructions reached before HLT")]
    StepLimitExceeded(u64),
    #[error("machine has already halted, construct a new one to run again")]
    Halted,
}

pub type Result<T> = std::result::Result<T, MachineError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    pub initial_sp: u8,
    /// Stop with `StepLimitExceeded` after this many instructions. `None` runs forever.
    pub max_steps: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            initial_sp: INITIAL_SP,
            max_steps: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub pc: u8,
    pub sp: u8,
}

#[derive(Debug)]
pub struct Ls8Machine {
    cpu: Ls8Cpu,
    config: MachineConfig,
    stopped: bool,
}

impl Ls8Machine {
    pub fn new(program: &[u8]) -> Result<Ls8Machine> {
        Self::with_config(program, MachineConfig::default())
    }

    pub fn with_config(program: &[u8], config: MachineConfig) -> Result<Ls8Machine> {
        let mut cpu = Ls8Cpu::new(config.initial_sp);
        cpu.load(program)?;
        tracing::info!("loaded {} byte LS-8 program", program.len());
        Ok(Ls8Machine {
            cpu,
            config,
            stopped: false,
        })
    }

    pub fn cpu(&self) -> &Ls8Cpu {
        &self.cpu
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Runs the program to HLT. A machine runs at most once; faults are final.
    pub fn run(&mut self, sink: &mut dyn OutputSink) -> Result<RunSummary> {
        if self.stopped {
            return Err(MachineError::Halted);
        }
        self.stopped = true;

        tracing::info!("starting LS-8 machine");
        let steps = self.cpu.run(sink, self.config.max_steps)?;
        if !self.cpu.is_halted() {
            tracing::debug!("reached maximum steps ({}), stopping execution", steps);
            return Err(MachineError::StepLimitExceeded(steps));
        }

        Ok(RunSummary {
            steps,
            pc: self.cpu.pc(),
            sp: self.cpu.sp(),
        })
    }
}
