use std::fmt;

use ls8_core::{DecodeOne, Instruction, Memory, MemoryError, Opcode8, Output, OutputSink};

use crate::alu::{self, AluOutput};
use crate::decoder::Ls8Decoder;
use crate::fault::{Fault, Result};
use crate::flags::Flags;
use crate::instructions::Ls8Instruction;
use crate::registers::{Ls8Registers, Register, INITIAL_SP};
use crate::stack::Stack;

pub const MEMORY_SIZE: usize = 256;

pub type Ls8Ram = Memory<MEMORY_SIZE>;

/// Interrupt `n` jumps to the address stored at `VECTOR_TABLE + n`.
pub const VECTOR_TABLE: u8 = 0xF8;
pub const NUM_INTERRUPTS: u8 = 8;

/// What the loop does with PC once a handler has run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Move past the instruction and its operands.
    Advance,
    Jump(u8),
    Halt,
}

#[derive(Clone, Debug)]
pub struct Ls8Cpu {
    ram: Ls8Ram,
    regs: Ls8Registers,
    flags: Flags,
    pc: u8,
    ir: Option<Opcode8>,
    halted: bool,
    fault: Option<Fault>,
    cycles: u64,
    decoder: Ls8Decoder,
}

impl Default for Ls8Cpu {
    fn default() -> Self {
        Self::new(INITIAL_SP)
    }
}

/// One trace line: PC, flags, the three bytes at PC, then R0-R7.
impl fmt::Display for Ls8Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |offset: usize| self.ram.peek(self.pc as usize + offset).unwrap_or(0);
        write!(
            f,
            "{:02X} | {:03b} | {:02X} {:02X} {:02X} |",
            self.pc,
            self.flags.bits(),
            byte(0),
            byte(1),
            byte(2)
        )?;
        for value in self.regs.values() {
            write!(f, " {:02X}", value)?;
        }
        Ok(())
    }
}

impl Ls8Cpu {
    pub fn new(initial_sp: u8) -> Self {
        Self {
            ram: Ls8Ram::new(),
            regs: Ls8Registers::new(initial_sp),
            flags: Flags::default(),
            pc: 0,
            ir: None,
            halted: false,
            fault: None,
            cycles: 0,
            decoder: Ls8Decoder {},
        }
    }

    /// Copies `program` into memory at address 0.
    pub fn load(&mut self, program: &[u8]) -> std::result::Result<(), MemoryError> {
        self.ram.load(0, program)
    }

    pub fn pc(&self) -> u8 {
        self.pc
    }

    pub fn sp(&self) -> u8 {
        self.regs.sp()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn register(&self, reg: Register) -> u8 {
        self.regs[reg]
    }

    pub fn set_register(&mut self, reg: Register, value: u8) {
        self.regs[reg] = value;
    }

    pub fn registers(&self) -> &Ls8Registers {
        &self.regs
    }

    /// Opcode of the instruction most recently fetched.
    pub fn ir(&self) -> Option<Opcode8> {
        self.ir
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The fault that stopped this CPU, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Number of instructions executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn memory(&self) -> &Ls8Ram {
        &self.ram
    }

    pub fn memory_mut(&mut self) -> &mut Ls8Ram {
        &mut self.ram
    }

    /// Runs until HLT, a fault, or `max_steps` instructions. Returns the number executed.
    pub fn run(&mut self, sink: &mut dyn OutputSink, max_steps: Option<u64>) -> Result<u64> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        let mut steps = 0;
        while !self.halted && max_steps.map_or(true, |max| steps < max) {
            self.step(sink)?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Executes one instruction. A fault halts the CPU for good and is returned
    /// again by every later call.
    pub fn step(&mut self, sink: &mut dyn OutputSink) -> Result<Effect> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if self.halted {
            return Ok(Effect::Halt);
        }

        let address = self.pc;
        self.try_step(sink).map_err(|fault| {
            tracing::debug!("halting on fault at 0x{:02X}: {}", address, fault);
            self.halted = true;
            self.fault = Some(fault.clone());
            fault
        })
    }

    fn try_step(&mut self, sink: &mut dyn OutputSink) -> Result<Effect> {
        let address = self.pc;
        let instruction = self.fetch()?;
        tracing::trace!("{} | {}", self, instruction);

        let effect = self.execute(address, instruction, sink)?;
        match effect {
            Effect::Advance => self.pc = next_address(address, &instruction)?,
            Effect::Jump(target) => self.pc = target,
            Effect::Halt => {
                self.halted = true;
                tracing::info!("halted at 0x{:02X} after {} cycles", address, self.cycles + 1);
            }
        }
        self.cycles += 1;
        Ok(effect)
    }

    fn fetch(&mut self) -> Result<Ls8Instruction> {
        let address = self.pc as usize;
        let opcode = Opcode8::new(self.ram.read(address)?);
        self.ir = Some(opcode);

        // operand bytes past the end of memory are left for the decoder to reject
        let end = (address + opcode.len_bytes()).min(MEMORY_SIZE);
        let mut bytes = [opcode.value(), 0, 0, 0];
        for (slot, operand_address) in bytes.iter_mut().zip(address..end).skip(1) {
            *slot = self.ram.read(operand_address)?;
        }
        Ok(self.decoder.decode_one(self.pc, &bytes[..end - address])?)
    }

    fn stack(&mut self) -> Stack<'_> {
        Stack::new(&mut self.regs, &mut self.ram)
    }

    fn execute(
        &mut self,
        address: u8,
        instruction: Ls8Instruction,
        sink: &mut dyn OutputSink,
    ) -> Result<Effect> {
        let effect = match instruction {
            Ls8Instruction::Nop => Effect::Advance,
            Ls8Instruction::Hlt => Effect::Halt,
            Ls8Instruction::Ldi { reg, value } => {
                self.regs[reg] = value;
                Effect::Advance
            }
            Ls8Instruction::Ld { a, b } => {
                let value = self.ram.read(self.regs[b] as usize)?;
                self.regs[a] = value;
                Effect::Advance
            }
            Ls8Instruction::St { a, b } => {
                self.ram.write(self.regs[a] as usize, self.regs[b])?;
                Effect::Advance
            }
            Ls8Instruction::Prn(reg) => {
                sink.emit(Output::Number(self.regs[reg]));
                Effect::Advance
            }
            Ls8Instruction::Pra(reg) => {
                sink.emit(Output::Char(self.regs[reg] as char));
                Effect::Advance
            }
            Ls8Instruction::Push(reg) => {
                self.stack().push_register(reg)?;
                Effect::Advance
            }
            Ls8Instruction::Pop(reg) => {
                self.stack().pop_register(reg)?;
                Effect::Advance
            }
            Ls8Instruction::Call(reg) => {
                let next = next_address(address, &instruction)?;
                self.stack().push(next)?;
                Effect::Jump(self.regs[reg])
            }
            Ls8Instruction::Ret => Effect::Jump(self.stack().pop()?),
            Ls8Instruction::Jmp(reg) => Effect::Jump(self.regs[reg]),
            Ls8Instruction::Branch { condition, target } => {
                if condition.holds(self.flags) {
                    Effect::Jump(self.regs[target])
                } else {
                    Effect::Advance
                }
            }
            Ls8Instruction::Int(reg) => {
                let next = next_address(address, &instruction)?;
                let vector = self.regs[reg];
                self.interrupt(address, vector, next)?
            }
            Ls8Instruction::Iret => self.return_from_interrupt()?,
            Ls8Instruction::Alu { op, a, b } => {
                let rhs = b.map(|b| self.regs[b]).unwrap_or(0);
                let output = alu::execute(op, self.regs[a], rhs)
                    .map_err(|err| Fault::from_alu(err, address))?;
                match output {
                    AluOutput::Value(value) => self.regs[a] = value,
                    AluOutput::Flags(flags) => self.flags = flags,
                }
                Effect::Advance
            }
        };
        Ok(effect)
    }

    /// Saves PC, flags and R0-R6, then enters the handler for `vector`.
    fn interrupt(&mut self, address: u8, vector: u8, resume: u8) -> Result<Effect> {
        if vector >= NUM_INTERRUPTS {
            return Err(Fault::InvalidInterrupt { address, vector });
        }
        let handler = self.ram.read((VECTOR_TABLE + vector) as usize)?;
        let flags = self.flags.bits();

        let mut stack = self.stack();
        stack.push(resume)?;
        stack.push(flags)?;
        for reg in Register::all().filter(|r| *r != Register::SP) {
            stack.push_register(reg)?;
        }

        tracing::debug!(
            "interrupt {} at 0x{:02X}, handler at 0x{:02X}",
            vector,
            address,
            handler
        );
        Ok(Effect::Jump(handler))
    }

    fn return_from_interrupt(&mut self) -> Result<Effect> {
        let mut stack = self.stack();
        for reg in Register::all().filter(|r| *r != Register::SP).rev() {
            stack.pop_register(reg)?;
        }
        let flags = stack.pop()?;
        let pc = stack.pop()?;
        self.flags = Flags::from_bits(flags);
        Ok(Effect::Jump(pc))
    }
}

/// Address of the instruction following the one at `address`. There is no wrap past 0xFF.
fn next_address(address: u8, instruction: &Ls8Instruction) -> Result<u8> {
    let next = address as usize + instruction.len_bytes();
    u8::try_from(next).map_err(|_| {
        Fault::Memory(MemoryError::AddressOutOfRange {
            address: next,
            size: MEMORY_SIZE,
        })
    })
}

#[cfg(test)]
mod tests {
    use ls8_core::BufferSink;
    use rand::Rng;

    use super::*;
    use crate::alu::AluOp;
    use crate::flags::Condition;
    use crate::instructions::opcodes;

    use crate::instructions::Ls8Instruction::*;

    fn assemble(program: &[Ls8Instruction]) -> Vec<u8> {
        program.iter().flat_map(|ins| ins.encode()).collect()
    }

    fn setup(program: &[u8]) -> Ls8Cpu {
        let mut cpu = Ls8Cpu::default();
        cpu.load(program).unwrap();
        cpu
    }

    fn run(program: &[u8]) -> (Ls8Cpu, BufferSink, Result<u64>) {
        let mut cpu = setup(program);
        let mut sink = BufferSink::new();
        let result = cpu.run(&mut sink, None);
        (cpu, sink, result)
    }

    fn ldi(reg: Register, value: u8) -> Ls8Instruction {
        Ldi { reg, value }
    }

    fn alu(op: AluOp, a: Register, b: Register) -> Ls8Instruction {
        let b = (!op.is_unary()).then_some(b);
        Alu { op, a, b }
    }

    #[test]
    fn new_works() {
        let cpu = Ls8Cpu::default();
        assert_eq!(cpu.pc(), 0);
        assert_eq!(cpu.sp(), 0xF4);
        assert_eq!(cpu.flags().bits(), 0);
        assert_eq!(cpu.ir(), None);
        assert!(!cpu.is_halted());
    }

    #[test]
    fn print8() {
        let program = assemble(&[ldi(Register::R0, 8), Prn(Register::R0), Hlt]);
        let (cpu, sink, result) = run(&program);
        assert_eq!(result, Ok(3));
        assert_eq!(sink.text(), "8\n");
        assert!(cpu.is_halted());
        assert_eq!(cpu.sp(), 0xF4);
        assert_eq!(cpu.pc(), 5);
        assert_eq!(cpu.ir(), Some(Opcode8::new(opcodes::HLT)));
    }

    #[test]
    fn ldi_prn_prints_every_value() {
        for value in 0..=u8::MAX {
            for reg in Register::all() {
                let program = assemble(&[ldi(reg, value), Prn(reg), Hlt]);
                let (_, sink, result) = run(&program);
                assert!(result.is_ok());
                assert_eq!(sink.values(), &[Output::Number(value)]);
            }
        }
    }

    #[test]
    fn pra_prints_characters() {
        let program = assemble(&[ldi(Register::R1, b'H'), Pra(Register::R1), Hlt]);
        let (_, sink, _) = run(&program);
        assert_eq!(sink.values(), &[Output::Char('H')]);
    }

    #[test]
    fn push_pop_is_identity() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let reg = Register::new(rng.gen_range(0..8)).unwrap();
            let program = assemble(&[Push(reg), Pop(reg), Hlt]);
            let mut cpu = setup(&program);
            if reg != Register::SP {
                cpu.set_register(reg, rng.gen());
            }
            let before = cpu.registers().clone();
            cpu.run(&mut BufferSink::new(), None).unwrap();
            assert_eq!(cpu.registers(), &before);
        }
    }

    #[test]
    fn pop_restores_pushed_values_lifo() {
        let program = assemble(&[
            ldi(Register::R0, 1),
            ldi(Register::R1, 2),
            Push(Register::R0),
            Push(Register::R1),
            Pop(Register::R0),
            Pop(Register::R1),
            Hlt,
        ]);
        let (cpu, _, _) = run(&program);
        assert_eq!(cpu.register(Register::R0), 2);
        assert_eq!(cpu.register(Register::R1), 1);
        assert_eq!(cpu.sp(), 0xF4);
    }

    #[test]
    fn call_returns_to_next_instruction() {
        // 0: LDI R1,8  3: CALL R1  5: PRN R0  7: HLT  8: LDI R0,42  11: RET
        let program = assemble(&[
            ldi(Register::R1, 8),
            Call(Register::R1),
            Prn(Register::R0),
            Hlt,
            ldi(Register::R0, 42),
            Ret,
        ]);
        let mut cpu = setup(&program);
        let mut sink = BufferSink::new();

        cpu.step(&mut sink).unwrap();
        assert_eq!(cpu.step(&mut sink), Ok(Effect::Jump(8)));
        assert_eq!(cpu.sp(), 0xF3);
        assert_eq!(cpu.memory().peek(0xF3), Some(5));

        cpu.step(&mut sink).unwrap();
        assert_eq!(cpu.step(&mut sink), Ok(Effect::Jump(5)));
        assert_eq!(cpu.pc(), 5);
        assert_eq!(cpu.sp(), 0xF4);

        cpu.run(&mut sink, None).unwrap();
        assert_eq!(sink.text(), "42\n");
    }

    #[test]
    fn branches_follow_comparison() {
        let conditions = [
            Condition::Equal,
            Condition::NotEqual,
            Condition::Greater,
            Condition::GreaterOrEqual,
            Condition::Less,
            Condition::LessOrEqual,
        ];
        let mut rng = rand::thread_rng();
        let mut pairs: Vec<(u8, u8)> = vec![(0, 0), (255, 0), (0, 255), (128, 128)];
        pairs.extend((0..50).map(|_| (rng.gen(), rng.gen())));

        for (a, b) in pairs {
            for condition in conditions {
                // 0: LDI R0,a  3: LDI R1,b  6: LDI R2,15  9: CMP R0,R1  12: Jcc R2  14: HLT  15: HLT
                let program = assemble(&[
                    ldi(Register::R0, a),
                    ldi(Register::R1, b),
                    ldi(Register::R2, 15),
                    alu(AluOp::Cmp, Register::R0, Register::R1),
                    Branch {
                        condition,
                        target: Register::R2,
                    },
                    Hlt,
                    Hlt,
                ]);
                let (cpu, _, result) = run(&program);
                assert!(result.is_ok());
                assert_eq!(cpu.flags(), Flags::compare(a, b));
                assert_eq!(cpu.flags().bits().count_ones(), 1);
                let expected = if condition.holds(Flags::compare(a, b)) { 15 } else { 14 };
                assert_eq!(cpu.pc(), expected, "{:?} {} {}", condition, a, b);
                assert_eq!(cpu.register(Register::R0), a);
            }
        }
    }

    #[test]
    fn jne_loop_counts_down() {
        // 0: LDI R0,3  3: LDI R1,1  6: LDI R2,12  9: LDI R3,0
        // 12: PRN R0  14: SUB R0,R1  17: CMP R0,R3  20: JNE R2  22: HLT
        let program = assemble(&[
            ldi(Register::R0, 3),
            ldi(Register::R1, 1),
            ldi(Register::R2, 12),
            ldi(Register::R3, 0),
            Prn(Register::R0),
            alu(AluOp::Sub, Register::R0, Register::R1),
            alu(AluOp::Cmp, Register::R0, Register::R3),
            Branch {
                condition: Condition::NotEqual,
                target: Register::R2,
            },
            Hlt,
        ]);
        let (cpu, sink, _) = run(&program);
        assert_eq!(sink.text(), "3\n2\n1\n");
        assert_eq!(cpu.pc(), 22);
    }

    #[test]
    fn jmp_sets_pc() {
        // 0: LDI R0,6  3: JMP R0  5: HLT  6: PRN R0  8: HLT
        let program = assemble(&[
            ldi(Register::R0, 6),
            Jmp(Register::R0),
            Hlt,
            Prn(Register::R0),
            Hlt,
        ]);
        let (cpu, sink, _) = run(&program);
        assert_eq!(sink.text(), "6\n");
        assert_eq!(cpu.pc(), 8);
    }

    #[test]
    fn division_by_zero_faults() {
        for op in [AluOp::Div, AluOp::Mod] {
            let program = assemble(&[
                ldi(Register::R0, 10),
                ldi(Register::R1, 0),
                alu(op, Register::R0, Register::R1),
                Prn(Register::R0),
                Hlt,
            ]);
            let (cpu, sink, result) = run(&program);
            assert_eq!(
                result,
                Err(Fault::ArithmeticFault {
                    operation: op,
                    address: 6
                })
            );
            assert!(sink.values().is_empty());
            assert_eq!(cpu.register(Register::R0), 10);
            assert!(cpu.is_halted());
        }
    }

    #[test]
    fn arithmetic_wraps_through_cpu() {
        let program = assemble(&[
            ldi(Register::R0, 200),
            ldi(Register::R1, 100),
            alu(AluOp::Add, Register::R0, Register::R1),
            ldi(Register::R2, 16),
            ldi(Register::R3, 17),
            alu(AluOp::Mul, Register::R2, Register::R3),
            alu(AluOp::Dec, Register::R4, Register::R4),
            Hlt,
        ]);
        let (cpu, _, _) = run(&program);
        assert_eq!(cpu.register(Register::R0), 44);
        assert_eq!(cpu.register(Register::R1), 100);
        assert_eq!(cpu.register(Register::R2), 16);
        assert_eq!(cpu.register(Register::R4), 255);
    }

    #[test]
    fn memory_and_logic_instructions() {
        let program = assemble(&[
            ldi(Register::R0, 0x0F),
            alu(AluOp::Not, Register::R0, Register::R0),
            ldi(Register::R1, 0xE0),
            St {
                a: Register::R1,
                b: Register::R0,
            },
            Ld {
                a: Register::R2,
                b: Register::R1,
            },
            ldi(Register::R3, 4),
            alu(AluOp::Shr, Register::R2, Register::R3),
            alu(AluOp::Inc, Register::R2, Register::R2),
            ldi(Register::R4, 0b1010),
            alu(AluOp::Xor, Register::R4, Register::R3),
            alu(AluOp::Shl, Register::R3, Register::R3),
            Hlt,
        ]);
        let (cpu, _, result) = run(&program);
        assert!(result.is_ok());
        assert_eq!(cpu.register(Register::R0), 0xF0);
        assert_eq!(cpu.memory().peek(0xE0), Some(0xF0));
        assert_eq!(cpu.register(Register::R2), 0x10);
        assert_eq!(cpu.register(Register::R4), 0b1110);
        assert_eq!(cpu.register(Register::R3), 64);
    }

    #[test]
    fn invalid_instruction_faults() {
        let mut program = assemble(&[ldi(Register::R0, 5)]);
        program.extend([0b0000_0010, 0, 0]);
        let (cpu, sink, result) = run(&program);
        assert_eq!(
            result,
            Err(Fault::InvalidInstruction {
                address: 3,
                opcode: 0b0000_0010
            })
        );
        assert_eq!(cpu.register(Register::R0), 5);
        assert_eq!(cpu.pc(), 3);
        assert!(sink.values().is_empty());
    }

    #[test]
    fn halted_cpu_does_nothing() {
        let program = assemble(&[Hlt, ldi(Register::R0, 1)]);
        let mut cpu = setup(&program);
        let mut sink = BufferSink::new();
        assert_eq!(cpu.step(&mut sink), Ok(Effect::Halt));
        assert_eq!(cpu.step(&mut sink), Ok(Effect::Halt));
        assert_eq!(cpu.cycles(), 1);
        assert_eq!(cpu.register(Register::R0), 0);
    }

    #[test]
    fn invalid_register_faults() {
        let program = [opcodes::PRN, 9];
        let (_, _, result) = run(&program);
        assert_eq!(
            result,
            Err(Fault::InvalidRegister {
                address: 0,
                index: 9
            })
        );
    }

    #[test]
    fn running_off_the_end_faults() {
        // zeroed memory decodes as NOP
        let (cpu, _, result) = run(&[]);
        assert_eq!(
            result,
            Err(Fault::Memory(MemoryError::AddressOutOfRange {
                address: 256,
                size: 256
            }))
        );
        assert_eq!(cpu.cycles(), 255);
        assert_eq!(cpu.pc(), 255);
    }

    #[test]
    fn truncated_operand_faults() {
        let mut cpu = Ls8Cpu::default();
        cpu.memory_mut().write(0xFF, opcodes::PRN).unwrap();
        cpu.memory_mut().write(0x00, opcodes::LDI).unwrap();
        cpu.memory_mut().write(0x01, 0).unwrap();
        cpu.memory_mut().write(0x02, 0xFF).unwrap();
        cpu.memory_mut().write(0x03, opcodes::JMP).unwrap();
        cpu.memory_mut().write(0x04, 0).unwrap();
        let result = cpu.run(&mut BufferSink::new(), None);
        assert_eq!(
            result,
            Err(Fault::Memory(MemoryError::AddressOutOfRange {
                address: 256,
                size: 256
            }))
        );
    }

    #[test]
    fn interrupt_round_trip() {
        // 0: LDI R0,3  3: LDI R1,0x11  6: CMP R0,R1  9: INT R0  11: PRN R1  13: HLT
        // 14: LDI R1,0x99  17: LDI R2,0x77  20: CMP R1,R2  23: PRN R1  25: IRET
        let program = assemble(&[
            ldi(Register::R0, 3),
            ldi(Register::R1, 0x11),
            alu(AluOp::Cmp, Register::R0, Register::R1),
            Int(Register::R0),
            Prn(Register::R1),
            Hlt,
            ldi(Register::R1, 0x99),
            ldi(Register::R2, 0x77),
            alu(AluOp::Cmp, Register::R1, Register::R2),
            Prn(Register::R1),
            Iret,
        ]);
        let mut cpu = setup(&program);
        cpu.memory_mut().write(VECTOR_TABLE as usize + 3, 14).unwrap();
        let mut sink = BufferSink::new();

        for _ in 0..3 {
            cpu.step(&mut sink).unwrap();
        }
        assert_eq!(cpu.step(&mut sink), Ok(Effect::Jump(14)));
        assert_eq!(cpu.sp(), 0xF4 - 9);

        cpu.run(&mut sink, None).unwrap();
        assert_eq!(sink.text(), "153\n17\n");
        assert_eq!(cpu.register(Register::R1), 0x11);
        assert_eq!(cpu.register(Register::R2), 0);
        assert_eq!(cpu.flags(), Flags::compare(3, 0x11));
        assert_eq!(cpu.sp(), 0xF4);
        assert_eq!(cpu.pc(), 13);
    }

    #[test]
    fn invalid_interrupt_faults() {
        let program = assemble(&[ldi(Register::R0, 8), Int(Register::R0), Hlt]);
        let (cpu, _, result) = run(&program);
        assert_eq!(
            result,
            Err(Fault::InvalidInterrupt {
                address: 3,
                vector: 8
            })
        );
        assert_eq!(cpu.sp(), 0xF4);
    }

    #[test]
    fn faulted_cpu_stays_faulted() {
        let mut cpu = setup(&[0b0000_0010]);
        let mut sink = BufferSink::new();
        let fault = Fault::InvalidInstruction {
            address: 0,
            opcode: 0b0000_0010,
        };
        assert_eq!(cpu.run(&mut sink, None), Err(fault.clone()));
        assert_eq!(cpu.fault(), Some(&fault));
        assert_eq!(cpu.run(&mut sink, None), Err(fault.clone()));
        assert_eq!(cpu.step(&mut sink), Err(fault));
        assert_eq!(cpu.cycles(), 0);
        assert!(cpu.is_halted());
    }

    #[test]
    fn return_address_past_end_faults() {
        for opcode in [opcodes::CALL, opcodes::INT] {
            // 0: LDI R1,2  3: LDI R0,0xFE  6: JMP R0  ...  0xFE: CALL/INT R1
            let program = assemble(&[
                ldi(Register::R1, 2),
                ldi(Register::R0, 0xFE),
                Jmp(Register::R0),
            ]);
            let mut cpu = setup(&program);
            cpu.memory_mut().write(0xFE, opcode).unwrap();
            cpu.memory_mut().write(0xFF, Register::R1.index()).unwrap();
            let result = cpu.run(&mut BufferSink::new(), None);
            assert_eq!(
                result,
                Err(Fault::Memory(MemoryError::AddressOutOfRange {
                    address: 256,
                    size: 256
                })),
                "0b{:08b}",
                opcode
            );
            assert_eq!(cpu.pc(), 0xFE);
            assert_eq!(cpu.sp(), 0xF4);
        }
    }

    #[test]
    fn run_stops_at_step_limit() {
        // 0: LDI R0,0  3: JMP R0
        let program = assemble(&[ldi(Register::R0, 0), Jmp(Register::R0)]);
        let mut cpu = setup(&program);
        let mut sink = BufferSink::new();
        assert_eq!(cpu.run(&mut sink, Some(7)), Ok(7));
        assert!(!cpu.is_halted());
        assert_eq!(cpu.run(&mut sink, Some(3)), Ok(3));
        assert_eq!(cpu.cycles(), 10);
    }

    #[test]
    fn trace_line() {
        let program = assemble(&[ldi(Register::R0, 8), Hlt]);
        let cpu = setup(&program);
        assert_eq!(
            cpu.to_string(),
            "00 | 000 | 82 00 08 | 00 00 00 00 00 00 00 F4"
        );
    }
}
