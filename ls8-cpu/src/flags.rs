use std::cmp::Ordering;
use std::fmt;

/// One-hot comparison result written by CMP.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    pub const EQUAL: u8 = 0b001;
    pub const GREATER: u8 = 0b010;
    pub const LESS: u8 = 0b100;

    pub fn compare(a: u8, b: u8) -> Self {
        match a.cmp(&b) {
            Ordering::Equal => Flags(Self::EQUAL),
            Ordering::Greater => Flags(Self::GREATER),
            Ordering::Less => Flags(Self::LESS),
        }
    }

    /// Restores a value saved on the stack. Bits above the low three are dropped.
    pub fn from_bits(bits: u8) -> Self {
        Flags(bits & 0b111)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn equal(self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn greater(self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub fn less(self) -> bool {
        self.0 & Self::LESS != 0
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = if self.less() { 'L' } else { '-' };
        let g = if self.greater() { 'G' } else { '-' };
        let e = if self.equal() { 'E' } else { '-' };
        write!(f, "FL[{}{}{}]", l, g, e)
    }
}

/// Predicate tested by the conditional jumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Condition {
    pub fn holds(self, flags: Flags) -> bool {
        match self {
            Condition::Equal => flags.equal(),
            Condition::NotEqual => flags.greater() || flags.less(),
            Condition::Greater => flags.greater(),
            Condition::GreaterOrEqual => flags.greater() || flags.equal(),
            Condition::Less => flags.less(),
            Condition::LessOrEqual => flags.less() || flags.equal(),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Condition::Equal => "JEQ",
            Condition::NotEqual => "JNE",
            Condition::Greater => "JGT",
            Condition::GreaterOrEqual => "JGE",
            Condition::Less => "JLT",
            Condition::LessOrEqual => "JLE",
        }
    }
}
