use ls8_core::decoder::{DecodeError, DecodeOne, Result};
use ls8_core::Opcode8;

use crate::alu::AluOp;
use crate::flags::Condition;
use crate::instructions::{opcodes::*, Ls8Instruction};
use crate::registers::Register;

#[derive(Clone, Copy, Debug, Default)]
pub struct Ls8Decoder {}

impl DecodeOne for Ls8Decoder {
    type Instruction = Ls8Instruction;

    fn decode_one(&self, address: u8, bytes: &[u8]) -> Result<Self::Instruction> {
        let opcode = Opcode8::new(*bytes.first().ok_or(DecodeError::Truncated {
            address,
            needed: 1,
            available: 0,
        })?);

        // operands are only required once the opcode is known to be valid
        let byte = |idx: usize| {
            bytes.get(idx).copied().ok_or(DecodeError::Truncated {
                address,
                needed: idx + 1,
                available: bytes.len(),
            })
        };
        let reg = |idx: usize| -> Result<Register> {
            let index = byte(idx)?;
            Register::new(index).ok_or(DecodeError::InvalidRegister { address, index })
        };
        let branch = |condition: Condition| -> Result<Ls8Instruction> {
            Ok(Ls8Instruction::Branch {
                condition,
                target: reg(1)?,
            })
        };

        if opcode.is_alu() && !opcode.sets_pc() {
            let op = AluOp::from_identifier(opcode.identifier())
                .ok()
                .filter(|op| op.operand_count() == opcode.operand_count())
                .ok_or(DecodeError::InvalidOpcode { address, opcode })?;
            let a = reg(1)?;
            let b = if op.is_unary() { None } else { Some(reg(2)?) };
            return Ok(Ls8Instruction::Alu { op, a, b });
        }

        let ins: Ls8Instruction = match opcode.value() {
            NOP => Ls8Instruction::Nop,
            HLT => Ls8Instruction::Hlt,
            RET => Ls8Instruction::Ret,
            IRET => Ls8Instruction::Iret,
            PUSH => Ls8Instruction::Push(reg(1)?),
            POP => Ls8Instruction::Pop(reg(1)?),
            PRN => Ls8Instruction::Prn(reg(1)?),
            PRA => Ls8Instruction::Pra(reg(1)?),
            CALL => Ls8Instruction::Call(reg(1)?),
            INT => Ls8Instruction::Int(reg(1)?),
            JMP => Ls8Instruction::Jmp(reg(1)?),
            JEQ => branch(Condition::Equal)?,
            JNE => branch(Condition::NotEqual)?,
            JGT => branch(Condition::Greater)?,
            JGE => branch(Condition::GreaterOrEqual)?,
            JLT => branch(Condition::Less)?,
            JLE => branch(Condition::LessOrEqual)?,
            LDI => Ls8Instruction::Ldi {
                reg: reg(1)?,
                value: byte(2)?,
            },
            LD => Ls8Instruction::Ld {
                a: reg(1)?,
                b: reg(2)?,
            },
            ST => Ls8Instruction::St {
                a: reg(1)?,
                b: reg(2)?,
            },
            _ => Err(DecodeError::InvalidOpcode { address, opcode })?,
        };
        Ok(ins)
    }
}
