use std::fmt;

use crate::opcode::Opcode;

/// A decoded Chip-8 instruction and its operands.
///
/// `x` and `y` name registers, `kk` is an 8-bit immediate, `addr` a 12-bit address and `n` a
/// 4-bit sprite height.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` clear the screen
    Clear,
    /// `00EE` PC = STACK.pop()
    Return,
    /// `1nnn` PC = addr
    Jump(u16),
    /// `2nnn` STACK.push(PC); PC = addr
    Call(u16),
    /// `3xkk` if Vx == kk then skip
    SkipEqImm { x: u8, kk: u8 },
    /// `4xkk` if Vx != kk then skip
    SkipNeImm { x: u8, kk: u8 },
    /// `5xy0` if Vx == Vy then skip
    SkipEqReg { x: u8, y: u8 },
    /// `6xkk` Vx = kk
    LoadImm { x: u8, kk: u8 },
    /// `7xkk` Vx += kk
    AddImm { x: u8, kk: u8 },
    /// `8xy0` Vx = Vy
    Move { x: u8, y: u8 },
    /// `8xy1` Vx |= Vy
    Or { x: u8, y: u8 },
    /// `8xy2` Vx &= Vy
    And { x: u8, y: u8 },
    /// `8xy3` Vx ^= Vy
    Xor { x: u8, y: u8 },
    /// `8xy4` Vx += Vy; VF = carry
    AddReg { x: u8, y: u8 },
    /// `8xy5` Vx -= Vy; VF = !borrow
    Sub { x: u8, y: u8 },
    /// `8xy6` Vx >>= 1; VF = lsb
    ShiftRight { x: u8, y: u8 },
    /// `8xy7` Vx = Vy - Vx; VF = !borrow
    SubN { x: u8, y: u8 },
    /// `8xyE` Vx <<= 1; VF = msb
    ShiftLeft { x: u8, y: u8 },
    /// `9xy0` if Vx != Vy then skip
    SkipNeReg { x: u8, y: u8 },
    /// `Annn` I = addr
    LoadI(u16),
    /// `Bnnn` PC = V0 + addr
    JumpV0(u16),
    /// `Cxkk` Vx = random & kk
    Random { x: u8, kk: u8 },
    /// `Dxyn` draw n rows from I at (Vx, Vy); VF = collision
    Draw { x: u8, y: u8, n: u8 },
    /// `Ex9E` if key Vx is pressed then skip
    SkipKey { x: u8 },
    /// `ExA1` if key Vx is not pressed then skip
    SkipNoKey { x: u8 },
    /// `Fx07` Vx = DT
    LoadDelay { x: u8 },
    /// `Fx0A` await a keypress and store it in Vx
    WaitKey { x: u8 },
    /// `Fx15` DT = Vx
    SetDelay { x: u8 },
    /// `Fx18` ST = Vx
    SetSound { x: u8 },
    /// `Fx1E` I += Vx
    AddI { x: u8 },
    /// `Fx29` I = address of the glyph for digit Vx
    LoadGlyph { x: u8 },
    /// `Fx33` mem[I..I+3] = bcd(Vx)
    StoreBcd { x: u8 },
    /// `Fx55` mem[I..=I+x] = V0..=Vx
    StoreRegs { x: u8 },
    /// `Fx65` V0..=Vx = mem[I..=I+x]
    LoadRegs { x: u8 },
}

impl Instruction {
    /// Selects the Instruction for a given Opcode, or `None` if the word isn't a valid instruction.
    pub fn decode(op: Opcode) -> Option<Instruction> {
        use Instruction::*;

        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, ..) => Jump(addr),
            (0x2, ..) => Call(addr),
            (0x3, ..) => SkipEqImm { x, kk },
            (0x4, ..) => SkipNeImm { x, kk },
            (0x5, .., 0x0) => SkipEqReg { x, y },
            (0x6, ..) => LoadImm { x, kk },
            (0x7, ..) => AddImm { x, kk },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x, y },
            (0x8, .., 0x7) => SubN { x, y },
            (0x8, .., 0xE) => ShiftLeft { x, y },
            (0x9, .., 0x0) => SkipNeReg { x, y },
            (0xA, ..) => LoadI(addr),
            (0xB, ..) => JumpV0(addr),
            (0xC, ..) => Random { x, kk },
            (0xD, ..) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipKey { x },
            (0xE, _, 0xA, 0x1) => SkipNoKey { x },
            (0xF, _, 0x0, 0x7) => LoadDelay { x },
            (0xF, _, 0x0, 0xA) => WaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddI { x },
            (0xF, _, 0x2, 0x9) => LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => StoreBcd { x },
            (0xF, _, 0x5, 0x5) => StoreRegs { x },
            (0xF, _, 0x6, 0x5) => LoadRegs { x },
            _ => return None,
        };
        Some(instruction)
    }
}

/// Conventional assembly mnemonics, e.g. `LD VA, 0x02` or `DRW V0, V1, 5`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(addr) => write!(f, "JP {:#05X}", addr),
            Call(addr) => write!(f, "CALL {:#05X}", addr),
            SkipEqImm { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipNeImm { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddImm { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadI(addr) => write!(f, "LD I, {:#05X}", addr),
            JumpV0(addr) => write!(f, "JP V0, {:#05X}", addr),
            Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKey { x } => write!(f, "SKP V{:X}", x),
            SkipNoKey { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddI { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegs { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegs { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    fn decode(word: u16) -> Option<Instruction> {
        Instruction::decode(Opcode(word))
    }

    #[test]
    fn test_decodes_fixed_opcodes() {
        assert_eq!(decode(0x00E0), Some(Clear));
        assert_eq!(decode(0x00EE), Some(Return));
    }

    #[test]
    fn test_decodes_address_operands() {
        assert_eq!(decode(0x1ABC), Some(Jump(0xABC)));
        assert_eq!(decode(0x2123), Some(Call(0x123)));
        assert_eq!(decode(0xA2F0), Some(LoadI(0x2F0)));
        assert_eq!(decode(0xB300), Some(JumpV0(0x300)));
    }

    #[test]
    fn test_decodes_register_operands() {
        assert_eq!(decode(0x3A11), Some(SkipEqImm { x: 0xA, kk: 0x11 }));
        assert_eq!(decode(0x5120), Some(SkipEqReg { x: 0x1, y: 0x2 }));
        assert_eq!(decode(0x8AB4), Some(AddReg { x: 0xA, y: 0xB }));
        assert_eq!(decode(0x810E), Some(ShiftLeft { x: 0x1, y: 0x0 }));
        assert_eq!(decode(0xD015), Some(Draw { x: 0x0, y: 0x1, n: 0x5 }));
        assert_eq!(decode(0xE19E), Some(SkipKey { x: 0x1 }));
        assert_eq!(decode(0xF465), Some(LoadRegs { x: 0x4 }));
    }

    #[test]
    fn test_rejects_unknown_opcodes() {
        // 0nnn machine code routines aren't supported
        assert_eq!(decode(0x0123), None);
        assert_eq!(decode(0x5121), None);
        assert_eq!(decode(0x8008), None);
        assert_eq!(decode(0x9121), None);
        assert_eq!(decode(0xE1FF), None);
        assert_eq!(decode(0xF1FF), None);
    }

    #[test]
    fn test_every_decoded_family_is_covered() {
        let decoded = (0..=0xFFFFu32)
            .filter_map(|word| decode(word as u16))
            .count();
        // 2 fixed + 10 families of 4096 + 2 register-pair skips of 256 + 9 ALU ops of 256
        // + 2 key ops of 16 + 9 F ops of 16
        assert_eq!(decoded, 2 + 10 * 4096 + 2 * 256 + 9 * 256 + 2 * 16 + 9 * 16);
    }

    #[test]
    fn test_disassembles() {
        assert_eq!(decode(0x6A02).unwrap().to_string(), "LD VA, 0x02");
        assert_eq!(decode(0xD015).unwrap().to_string(), "DRW V0, V1, 5");
        assert_eq!(decode(0x12A0).unwrap().to_string(), "JP 0x2A0");
        assert_eq!(decode(0xF155).unwrap().to_string(), "LD [I], V1");
        assert_eq!(decode(0x00EE).unwrap().to_string(), "RET");
    }
}
