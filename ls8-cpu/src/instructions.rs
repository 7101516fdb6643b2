use std::fmt;

use ls8_core::Instruction;

use crate::alu::AluOp;
use crate::flags::Condition;
use crate::registers::Register;

/// Opcode bytes, laid out as `AABCDDDD`: operand count, ALU bit, sets-PC bit, identifier.
pub mod opcodes {
    pub const NOP: u8 = 0b0000_0000;
    pub const HLT: u8 = 0b0000_0001;
    pub const RET: u8 = 0b0001_0001;
    pub const IRET: u8 = 0b0001_0011;
    pub const PUSH: u8 = 0b0100_0101;
    pub const POP: u8 = 0b0100_0110;
    pub const PRN: u8 = 0b0100_0111;
    pub const PRA: u8 = 0b0100_1000;
    pub const CALL: u8 = 0b0101_0000;
    pub const INT: u8 = 0b0101_0010;
    pub const JMP: u8 = 0b0101_0100;
    pub const JEQ: u8 = 0b0101_0101;
    pub const JNE: u8 = 0b0101_0110;
    pub const JGT: u8 = 0b0101_0111;
    pub const JLT: u8 = 0b0101_1000;
    pub const JLE: u8 = 0b0101_1001;
    pub const JGE: u8 = 0b0101_1010;
    pub const INC: u8 = 0b0110_0101;
    pub const DEC: u8 = 0b0110_0110;
    pub const NOT: u8 = 0b0110_1001;
    pub const LDI: u8 = 0b1000_0010;
    pub const LD: u8 = 0b1000_0011;
    pub const ST: u8 = 0b1000_0100;
    pub const ADD: u8 = 0b1010_0000;
    pub const SUB: u8 = 0b1010_0001;
    pub const MUL: u8 = 0b1010_0010;
    pub const DIV: u8 = 0b1010_0011;
    pub const MOD: u8 = 0b1010_0100;
    pub const CMP: u8 = 0b1010_0111;
    pub const AND: u8 = 0b1010_1000;
    pub const OR: u8 = 0b1010_1010;
    pub const XOR: u8 = 0b1010_1011;
    pub const SHL: u8 = 0b1010_1100;
    pub const SHR: u8 = 0b1010_1101;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ls8Instruction {
    Nop,
    Hlt,
    Ret,
    Iret,
    Push(Register),
    Pop(Register),
    Prn(Register),
    Pra(Register),
    Call(Register),
    Int(Register),
    Jmp(Register),
    Branch {
        condition: Condition,
        target: Register,
    },
    Ldi {
        reg: Register,
        value: u8,
    },
    /// `a := [b]`
    Ld {
        a: Register,
        b: Register,
    },
    /// `[a] := b`
    St {
        a: Register,
        b: Register,
    },
    /// `b` is `None` for the single-operand operations.
    Alu {
        op: AluOp,
        a: Register,
        b: Option<Register>,
    },
}

impl Ls8Instruction {
    pub fn opcode(&self) -> u8 {
        use opcodes::*;

        match self {
            Ls8Instruction::Nop => NOP,
            Ls8Instruction::Hlt => HLT,
            Ls8Instruction::Ret => RET,
            Ls8Instruction::Iret => IRET,
            Ls8Instruction::Push(_) => PUSH,
            Ls8Instruction::Pop(_) => POP,
            Ls8Instruction::Prn(_) => PRN,
            Ls8Instruction::Pra(_) => PRA,
            Ls8Instruction::Call(_) => CALL,
            Ls8Instruction::Int(_) => INT,
            Ls8Instruction::Jmp(_) => JMP,
            Ls8Instruction::Branch { condition, .. } => match condition {
                Condition::Equal => JEQ,
                Condition::NotEqual => JNE,
                Condition::Greater => JGT,
                Condition::GreaterOrEqual => JGE,
                Condition::Less => JLT,
                Condition::LessOrEqual => JLE,
            },
            Ls8Instruction::Ldi { .. } => LDI,
            Ls8Instruction::Ld { .. } => LD,
            Ls8Instruction::St { .. } => ST,
            Ls8Instruction::Alu { op, .. } => {
                let group = if op.is_unary() { 0b0110_0000 } else { 0b1010_0000 };
                group | op.identifier()
            }
        }
    }

    /// Machine code for this instruction, opcode first.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![self.opcode()];
        match *self {
            Ls8Instruction::Nop
            | Ls8Instruction::Hlt
            | Ls8Instruction::Ret
            | Ls8Instruction::Iret => {}
            Ls8Instruction::Push(r)
            | Ls8Instruction::Pop(r)
            | Ls8Instruction::Prn(r)
            | Ls8Instruction::Pra(r)
            | Ls8Instruction::Call(r)
            | Ls8Instruction::Int(r)
            | Ls8Instruction::Jmp(r)
            | Ls8Instruction::Branch { target: r, .. } => bytes.push(r.index()),
            Ls8Instruction::Ldi { reg, value } => bytes.extend([reg.index(), value]),
            Ls8Instruction::Ld { a, b } | Ls8Instruction::St { a, b } => {
                bytes.extend([a.index(), b.index()])
            }
            Ls8Instruction::Alu { a, b, .. } => {
                bytes.push(a.index());
                if let Some(b) = b {
                    bytes.push(b.index());
                }
            }
        }
        bytes
    }
}

impl Instruction for Ls8Instruction {
    fn len_bytes(&self) -> usize {
        (self.opcode() >> 6) as usize + 1
    }
}

impl fmt::Display for Ls8Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ls8Instruction::Nop => write!(f, "NOP"),
            Ls8Instruction::Hlt => write!(f, "HLT"),
            Ls8Instruction::Ret => write!(f, "RET"),
            Ls8Instruction::Iret => write!(f, "IRET"),
            Ls8Instruction::Push(r) => write!(f, "PUSH {}", r),
            Ls8Instruction::Pop(r) => write!(f, "POP {}", r),
            Ls8Instruction::Prn(r) => write!(f, "PRN {}", r),
            Ls8Instruction::Pra(r) => write!(f, "PRA {}", r),
            Ls8Instruction::Call(r) => write!(f, "CALL {}", r),
            Ls8Instruction::Int(r) => write!(f, "INT {}", r),
            Ls8Instruction::Jmp(r) => write!(f, "JMP {}", r),
            Ls8Instruction::Branch { condition, target } => {
                write!(f, "{} {}", condition.mnemonic(), target)
            }
            Ls8Instruction::Ldi { reg, value } => write!(f, "LDI {}, 0x{:02X}", reg, value),
            Ls8Instruction::Ld { a, b } => write!(f, "LD {}, [{}]", a, b),
            Ls8Instruction::St { a, b } => write!(f, "ST [{}], {}", a, b),
            Ls8Instruction::Alu { op, a, b: Some(b) } => write!(f, "{} {}, {}", op, a, b),
            Ls8Instruction::Alu { op, a, b: None } => write!(f, "{} {}", op, a),
        }
    }
}
