use ls8_core::MemoryError;

use crate::cpu::Ls8Ram;
use crate::registers::{Ls8Registers, Register};

type Result<T> = std::result::Result<T, MemoryError>;

/// Downward-growing stack addressed by R7, living in main memory.
pub struct Stack<'a> {
    regs: &'a mut Ls8Registers,
    ram: &'a mut Ls8Ram,
}

impl<'a> Stack<'a> {
    pub fn new(regs: &'a mut Ls8Registers, ram: &'a mut Ls8Ram) -> Self {
        Self { regs, ram }
    }

    pub fn push(&mut self, value: u8) -> Result<()> {
        let sp = self.regs.sp().wrapping_sub(1);
        self.regs.set_sp(sp);
        self.ram.write(sp as usize, value)
    }

    pub fn pop(&mut self) -> Result<u8> {
        let sp = self.regs.sp();
        let value = self.ram.read(sp as usize)?;
        self.regs.set_sp(sp.wrapping_add(1));
        Ok(value)
    }

    /// SP is decremented before `reg` is read, so pushing R7 stores the new SP.
    pub fn push_register(&mut self, reg: Register) -> Result<()> {
        let sp = self.regs.sp().wrapping_sub(1);
        self.regs.set_sp(sp);
        let value = self.regs[reg];
        self.ram.write(sp as usize, value)
    }

    /// `reg` is written before SP moves, so POP R7 leaves the popped value plus one.
    pub fn pop_register(&mut self, reg: Register) -> Result<()> {
        let sp = self.regs.sp();
        self.regs[reg] = self.ram.read(sp as usize)?;
        let sp = self.regs.sp();
        self.regs.set_sp(sp.wrapping_add(1));
        Ok(())
    }
}
