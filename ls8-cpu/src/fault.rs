use ls8_core::{DecodeError, MemoryError};
use thiserror::Error;

use crate::alu::{AluError, AluOp};

/// Conditions that stop the machine. None of them can be resumed from.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    #[error("invalid instruction 0b{opcode:08b} at 0x{address:02X}")]
    InvalidInstruction { address: u8, opcode: u8 },
    #[error("{operation} by zero at 0x{address:02X}")]
    ArithmeticFault { operation: AluOp, address: u8 },
    #[error("unsupported ALU operation 0x{operation:X}")]
    UnsupportedOperation { operation: u8 },
    #[error("invalid register index {index} at 0x{address:02X}")]
    InvalidRegister { address: u8, index: u8 },
    #[error("invalid interrupt {vector} at 0x{address:02X}, must be [0, 8)")]
    InvalidInterrupt { address: u8, vector: u8 },
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

pub type Result<T> = std::result::Result<T, Fault>;

impl From<DecodeError> for Fault {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidOpcode { address, opcode } => Fault::InvalidInstruction {
                address,
                opcode: opcode.value(),
            },
            DecodeError::InvalidRegister { address, index } => {
                Fault::InvalidRegister { address, index }
            }
            DecodeError::Truncated {
                address, available, ..
            } => Fault::Memory(MemoryError::AddressOutOfRange {
                address: address as usize + available,
                size: crate::cpu::MEMORY_SIZE,
            }),
        }
    }
}

impl Fault {
    pub(crate) fn from_alu(err: AluError, address: u8) -> Self {
        match err {
            AluError::DivideByZero(operation) => Fault::ArithmeticFault { operation, address },
            AluError::UnsupportedOperation(operation) => Fault::UnsupportedOperation { operation },
        }
    }

    /// Address of the instruction that raised the fault, when known.
    pub fn address(&self) -> Option<u8> {
        match self {
            Fault::InvalidInstruction { address, .. }
            | Fault::ArithmeticFault { address, .. }
            | Fault::InvalidRegister { address, .. }
            | Fault::InvalidInterrupt { address, .. } => Some(*address),
            Fault::UnsupportedOperation { .. } | Fault::Memory(_) => None,
        }
    }
}
