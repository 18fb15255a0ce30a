use crate::memory::TypeAddr;

/// A fetched 16-bit word with every field view pre-extracted.
///
/// ```text
/// 0110 1100 1111 0001
/// ---- ---- ---- ----
///  id    x    y    n
///       |-- kk ----|
///      |----- nnn --|
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    pub raw: u16,
    pub nnn: TypeAddr,
    pub n: u8,
    pub x: u8,
    pub y: u8,
    pub kk: u8,
}

impl Instruction {
    pub fn new(raw: u16) -> Self {
        Self {
            raw,
            nnn: raw & 0x0FFF,
            n: (raw & 0x000F) as u8,
            x: ((raw >> 8) & 0x000F) as u8,
            y: ((raw >> 4) & 0x000F) as u8,
            kk: (raw & 0x00FF) as u8,
        }
    }

    /// Top nibble, selecting the opcode family.
    pub fn family(&self) -> u8 {
        (self.raw >> 12) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCodes {
    /// 00E0
    ClearScreen,
    /// 00EE, return
    PopSubroutine,
    /// 1NNN
    Jump(TypeAddr),
    /// 2NNN, call
    PushSubroutine(TypeAddr),

    /// 3XKK: skip if VX == KK
    SkipEqualConstant(u8, u8),
    /// 4XKK: skip if VX != KK
    SkipNotEqualConstant(u8, u8),
    /// 5XY0
    SkipEqualRegister(u8, u8),
    /// 9XY0
    SkipNotEqualRegister(u8, u8),

    /// 6XKK
    SetRegister(u8, u8),
    /// 7XKK, no carry flag
    AddToRegister(u8, u8),

    /// 8XY0..8XYE, operands are (X, Y)
    CopyRegister(u8, u8),
    Or(u8, u8),
    And(u8, u8),
    XOr(u8, u8),
    Add(u8, u8),
    /// VX = VX - VY
    SubtractForward(u8, u8),
    RightShift(u8, u8),
    /// VX = VY - VX
    SubtractBackward(u8, u8),
    LeftShift(u8, u8),

    /// ANNN
    SetIndexRegister(TypeAddr),
    /// BNNN, offset by V0
    JumpWithOffset(TypeAddr),
    /// CXKK
    Random(u8, u8),
    /// DXYN: N rows of sprite data from I, drawn at (VX, VY)
    Display(u8, u8, u8),

    /// EX9E
    SkipIfPressed(u8),
    /// EXA1
    SkipIfNotPressed(u8),

    // FX07, FX0A, FX15, FX18, FX1E, FX29, FX33, FX55, FX65 in order
    CopyDelayToRegister(u8),
    GetKey(u8),
    CopyRegisterToDelay(u8),
    CopyRegisterToSound(u8),
    AddToIndex(u8),
    PointChar(u8),
    ToDecimal(u8),
    StoreRegisterToMemory(u8),
    LoadRegisterFromMemory(u8),

    /// Anything else, carrying the raw word.
    Unknown(u16),
}

impl OpCodes {
    pub fn decode(ins: &Instruction) -> Self {
        let Instruction { raw, nnn, n, x, y, kk } = *ins;

        match ins.family() {
            0x0 => match raw {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::PopSubroutine,
                _ => Self::Unknown(raw),
            },
            0x1 => Self::Jump(nnn),
            0x2 => Self::PushSubroutine(nnn),
            0x3 => Self::SkipEqualConstant(x, kk),
            0x4 => Self::SkipNotEqualConstant(x, kk),
            0x5 if n == 0x0 => Self::SkipEqualRegister(x, y),
            0x6 => Self::SetRegister(x, kk),
            0x7 => Self::AddToRegister(x, kk),
            0x8 => match n {
                0x0 => Self::CopyRegister(x, y),
                0x1 => Self::Or(x, y),
                0x2 => Self::And(x, y),
                0x3 => Self::XOr(x, y),
                0x4 => Self::Add(x, y),
                0x5 => Self::SubtractForward(x, y),
                0x6 => Self::RightShift(x, y),
                0x7 => Self::SubtractBackward(x, y),
                0xE => Self::LeftShift(x, y),
                _ => Self::Unknown(raw),
            },
            0x9 if n == 0x0 => Self::SkipNotEqualRegister(x, y),
            0xA => Self::SetIndexRegister(nnn),
            0xB => Self::JumpWithOffset(nnn),
            0xC => Self::Random(x, kk),
            0xD => Self::Display(x, y, n),
            0xE => match kk {
                0x9E => Self::SkipIfPressed(x),
                0xA1 => Self::SkipIfNotPressed(x),
                _ => Self::Unknown(raw),
            },
            0xF => match kk {
                0x07 => Self::CopyDelayToRegister(x),
                0x0A => Self::GetKey(x),
                0x15 => Self::CopyRegisterToDelay(x),
                0x18 => Self::CopyRegisterToSound(x),
                0x1E => Self::AddToIndex(x),
                0x29 => Self::PointChar(x),
                0x33 => Self::ToDecimal(x),
                0x55 => Self::StoreRegisterToMemory(x),
                0x65 => Self::LoadRegisterFromMemory(x),
                _ => Self::Unknown(raw),
            },
            _ => Self::Unknown(raw),
        }
    }

    pub fn decode_raw(raw: u16) -> Self {
        Self::decode(&Instruction::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_views_are_extracted() {
        let ins = Instruction::new(0x4CEE);
        assert_eq!(ins.family(), 0x4);
        assert_eq!(ins.nnn, 0xCEE);
        assert_eq!(ins.x, 0xC);
        assert_eq!(ins.y, 0xE);
        assert_eq!(ins.n, 0xE);
        assert_eq!(ins.kk, 0xEE);
    }

    #[test]
    fn decodes_each_family() {
        let cases = [
            (0x00E0, OpCodes::ClearScreen),
            (0x00EE, OpCodes::PopSubroutine),
            (0x1ABC, OpCodes::Jump(0xABC)),
            (0x2ABC, OpCodes::PushSubroutine(0xABC)),
            (0x3A12, OpCodes::SkipEqualConstant(0xA, 0x12)),
            (0x4A12, OpCodes::SkipNotEqualConstant(0xA, 0x12)),
            (0x5AB0, OpCodes::SkipEqualRegister(0xA, 0xB)),
            (0x6A12, OpCodes::SetRegister(0xA, 0x12)),
            (0x7A12, OpCodes::AddToRegister(0xA, 0x12)),
            (0x8AB0, OpCodes::CopyRegister(0xA, 0xB)),
            (0x8AB1, OpCodes::Or(0xA, 0xB)),
            (0x8AB2, OpCodes::And(0xA, 0xB)),
            (0x8AB3, OpCodes::XOr(0xA, 0xB)),
            (0x8AB4, OpCodes::Add(0xA, 0xB)),
            (0x8AB5, OpCodes::SubtractForward(0xA, 0xB)),
            (0x8AB6, OpCodes::RightShift(0xA, 0xB)),
            (0x8AB7, OpCodes::SubtractBackward(0xA, 0xB)),
            (0x8ABE, OpCodes::LeftShift(0xA, 0xB)),
            (0x9AB0, OpCodes::SkipNotEqualRegister(0xA, 0xB)),
            (0xAABC, OpCodes::SetIndexRegister(0xABC)),
            (0xBABC, OpCodes::JumpWithOffset(0xABC)),
            (0xCA0F, OpCodes::Random(0xA, 0x0F)),
            (0xDAB5, OpCodes::Display(0xA, 0xB, 0x5)),
            (0xEA9E, OpCodes::SkipIfPressed(0xA)),
            (0xEAA1, OpCodes::SkipIfNotPressed(0xA)),
            (0xFA07, OpCodes::CopyDelayToRegister(0xA)),
            (0xFA0A, OpCodes::GetKey(0xA)),
            (0xFA15, OpCodes::CopyRegisterToDelay(0xA)),
            (0xFA18, OpCodes::CopyRegisterToSound(0xA)),
            (0xFA1E, OpCodes::AddToIndex(0xA)),
            (0xFA29, OpCodes::PointChar(0xA)),
            (0xFA33, OpCodes::ToDecimal(0xA)),
            (0xFA55, OpCodes::StoreRegisterToMemory(0xA)),
            (0xFA65, OpCodes::LoadRegisterFromMemory(0xA)),
        ];
        for (raw, expected) in cases {
            assert_eq!(OpCodes::decode_raw(raw), expected, "decoding {raw:04X}");
        }
    }

    #[test]
    fn malformed_encodings_are_unknown() {
        for raw in [0x0123, 0x00E1, 0x5AB1, 0x8AB8, 0x9AB3, 0xEA00, 0xFA99] {
            assert_eq!(OpCodes::decode_raw(raw), OpCodes::Unknown(raw));
        }
    }
}
