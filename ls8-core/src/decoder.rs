use thiserror::Error;

use crate::opcode::Opcode8;

#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum DecodeError {
    #[error("invalid opcode {opcode} at 0x{address:02X}")]
    InvalidOpcode { address: u8, opcode: Opcode8 },
    #[error("invalid register index {index} at 0x{address:02X}")]
    InvalidRegister { address: u8, index: u8 },
    #[error("instruction at 0x{address:02X} needs {needed} bytes, only {available} available")]
    Truncated {
        address: u8,
        needed: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

pub trait Instruction {
    fn len_bytes(&self) -> usize;
}

pub trait DecodeOne {
    type Instruction: Instruction;

    /// Decodes the instruction whose opcode is `bytes[0]`, located at `address`.
    fn decode_one(&self, address: u8, bytes: &[u8]) -> Result<Self::Instruction>;
}
