use std::fmt;
use std::ops;

pub const NUM_REGISTERS: usize = 8;

/// Stack pointer value after power-on.
pub const INITIAL_SP: u8 = 0xF4;

/// Index of a general-purpose register, always in `0..NUM_REGISTERS`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u8);

impl Register {
    pub const R0: Register = Register(0);
    pub const R1: Register = Register(1);
    pub const R2: Register = Register(2);
    pub const R3: Register = Register(3);
    pub const R4: Register = Register(4);
    pub const R5: Register = Register(5);
    pub const R6: Register = Register(6);
    /// R7 doubles as the stack pointer.
    pub const SP: Register = Register(7);

    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < NUM_REGISTERS).then_some(Register(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Register> {
        (0..NUM_REGISTERS as u8).map(Register)
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Ls8Registers {
    values: [u8; NUM_REGISTERS],
}

impl fmt::Debug for Ls8Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for value in &self.values {
            list.entry(&format_args!("0x{:02X}", value));
        }
        list.finish()
    }
}

impl Default for Ls8Registers {
    fn default() -> Self {
        Self::new(INITIAL_SP)
    }
}

impl Ls8Registers {
    pub fn new(initial_sp: u8) -> Self {
        let mut values = [0; NUM_REGISTERS];
        values[Register::SP.0 as usize] = initial_sp;
        Self { values }
    }

    pub fn sp(&self) -> u8 {
        self[Register::SP]
    }

    pub fn set_sp(&mut self, value: u8) {
        self[Register::SP] = value;
    }

    pub fn values(&self) -> &[u8; NUM_REGISTERS] {
        &self.values
    }
}

impl ops::Index<Register> for Ls8Registers {
    type Output = u8;

    fn index(&self, register: Register) -> &Self::Output {
        &self.values[register.0 as usize]
    }
}

impl ops::IndexMut<Register> for Ls8Registers {
    fn index_mut(&mut self, register: Register) -> &mut Self::Output {
        &mut self.values[register.0 as usize]
    }
}
