pub mod alu;
pub mod cpu;
pub mod decoder;
pub mod fault;
pub mod flags;
pub mod instructions;
pub mod machine;
pub mod registers;

mod stack;

pub use crate::cpu::{Effect, Ls8Cpu, Ls8Ram, MEMORY_SIZE};
pub use crate::fault::Fault;
pub use crate::flags::{Condition, Flags};
pub use crate::instructions::Ls8Instruction;
pub use crate::machine::{Ls8Machine, MachineConfig, MachineError, RunSummary};
pub use crate::registers::{Register, INITIAL_SP};
