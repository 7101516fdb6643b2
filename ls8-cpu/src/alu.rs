use std::fmt;

use thiserror::Error;

use crate::flags::Flags;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum AluError {
    #[error("{0} with a zero divisor")]
    DivideByZero(AluOp),
    #[error("no ALU operation with identifier 0x{0:X}")]
    UnsupportedOperation(u8),
}

pub type Result<T> = std::result::Result<T, AluError>;

/// ALU operations, numbered by the low nybble of their opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Cmp,
    And,
    Not,
    Or,
    Xor,
    Shl,
    Shr,
}

impl AluOp {
    pub fn from_identifier(identifier: u8) -> Result<Self> {
        let op = match identifier {
            0x0 => AluOp::Add,
            0x1 => AluOp::Sub,
            0x2 => AluOp::Mul,
            0x3 => AluOp::Div,
            0x4 => AluOp::Mod,
            0x5 => AluOp::Inc,
            0x6 => AluOp::Dec,
            0x7 => AluOp::Cmp,
            0x8 => AluOp::And,
            0x9 => AluOp::Not,
            0xA => AluOp::Or,
            0xB => AluOp::Xor,
            0xC => AluOp::Shl,
            0xD => AluOp::Shr,
            _ => return Err(AluError::UnsupportedOperation(identifier)),
        };
        Ok(op)
    }

    pub fn identifier(self) -> u8 {
        match self {
            AluOp::Add => 0x0,
            AluOp::Sub => 0x1,
            AluOp::Mul => 0x2,
            AluOp::Div => 0x3,
            AluOp::Mod => 0x4,
            AluOp::Inc => 0x5,
            AluOp::Dec => 0x6,
            AluOp::Cmp => 0x7,
            AluOp::And => 0x8,
            AluOp::Not => 0x9,
            AluOp::Or => 0xA,
            AluOp::Xor => 0xB,
            AluOp::Shl => 0xC,
            AluOp::Shr => 0xD,
        }
    }

    /// Operations that only read and write their first register.
    pub fn is_unary(self) -> bool {
        matches!(self, AluOp::Inc | AluOp::Dec | AluOp::Not)
    }

    pub fn operand_count(self) -> u8 {
        if self.is_unary() {
            1
        } else {
            2
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Div => "DIV",
            AluOp::Mod => "MOD",
            AluOp::Inc => "INC",
            AluOp::Dec => "DEC",
            AluOp::Cmp => "CMP",
            AluOp::And => "AND",
            AluOp::Not => "NOT",
            AluOp::Or => "OR",
            AluOp::Xor => "XOR",
            AluOp::Shl => "SHL",
            AluOp::Shr => "SHR",
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOutput {
    /// New value for the destination register.
    Value(u8),
    Flags(Flags),
}

/// Applies `op` to `a` and `b`. Results wrap to 8 bits; `b` is ignored by unary ops.
pub fn execute(op: AluOp, a: u8, b: u8) -> Result<AluOutput> {
    let value = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => a.checked_div(b).ok_or(AluError::DivideByZero(op))?,
        AluOp::Mod => a.checked_rem(b).ok_or(AluError::DivideByZero(op))?,
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::Cmp => return Ok(AluOutput::Flags(Flags::compare(a, b))),
        AluOp::And => a & b,
        AluOp::Not => !a,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Shl => a.checked_shl(b as u32).unwrap_or(0),
        AluOp::Shr => a.checked_shr(b as u32).unwrap_or(0),
    };
    Ok(AluOutput::Value(value))
}
