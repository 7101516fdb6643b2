use std::fmt;

/// A single opcode byte with helpers for pulling out its bit fields.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode8 {
    value: u8,
}

impl fmt::Debug for Opcode8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("0x{:02X}", self.value))
    }
}

impl fmt::Display for Opcode8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("0b{:08b}", self.value))
    }
}

impl Opcode8 {
    pub const fn new(value: u8) -> Self {
        Self { value }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    fn bit(&self, idx: u8) -> bool {
        (self.value >> idx) & 0x01 == 0x01
    }

    /// Number of operand bytes following the opcode (bits 6-7).
    pub fn operand_count(&self) -> u8 {
        self.value >> 6
    }

    /// Total encoded length, opcode included.
    pub fn len_bytes(&self) -> usize {
        self.operand_count() as usize + 1
    }

    /// Bit 5: the instruction is carried out by the ALU.
    pub fn is_alu(&self) -> bool {
        self.bit(5)
    }

    /// Bit 4: the instruction may set the program counter itself.
    pub fn sets_pc(&self) -> bool {
        self.bit(4)
    }

    /// Low nybble: instruction identifier within its group.
    pub fn identifier(&self) -> u8 {
        self.value & 0x0F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_helpers() {
        // LDI
        let ldi = Opcode8::new(0b1000_0010);
        assert_eq!(ldi.operand_count(), 2);
        assert_eq!(ldi.len_bytes(), 3);
        assert!(!ldi.is_alu());
        assert!(!ldi.sets_pc());

        // JMP
        let jmp = Opcode8::new(0b0101_0100);
        assert_eq!(jmp.operand_count(), 1);
        assert!(jmp.sets_pc());
        assert_eq!(jmp.identifier(), 0x4);

        // CMP
        let cmp = Opcode8::new(0b1010_0111);
        assert!(cmp.is_alu());
        assert_eq!(cmp.identifier(), 0x7);

        // INC
        let inc = Opcode8::new(0b0110_0101);
        assert_eq!(inc.operand_count(), 1);
        assert!(inc.is_alu());
        assert!(!inc.sets_pc());

        // HLT
        let hlt = Opcode8::new(0b0000_0001);
        assert_eq!(hlt.len_bytes(), 1);
        assert_eq!(hlt.value(), 1);
        assert_eq!(format!("{} {:?}", hlt, hlt), "0b00000001 0x01");
    }
}
