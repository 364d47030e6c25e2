//! CHIP-8 instruction set
//!
//! Every instruction is a big-endian 16-bit word. The top nibble picks the
//! family; families 0, 8, E and F look at the low nibble or low byte to pick
//! the exact operation. Operand naming follows Cowgod's reference:
//!
//! * `nnn` - 12-bit address
//! * `kk`  - 8-bit immediate
//! * `n`   - 4-bit immediate
//! * `x`, `y` - register indices
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 CLS
    ClearScreen,
    /// 00EE RET
    Return,
    /// 1nnn JP addr
    Jump(u16),
    /// 2nnn CALL addr
    Call(u16),
    /// 3xkk SE Vx, byte
    SkipEqImm(u8, u8),
    /// 4xkk SNE Vx, byte
    SkipNeImm(u8, u8),
    /// 5xy0 SE Vx, Vy
    SkipEqReg(u8, u8),
    /// 6xkk LD Vx, byte
    LoadImm(u8, u8),
    /// 7xkk ADD Vx, byte
    AddImm(u8, u8),
    /// 8xy0 LD Vx, Vy
    Move(u8, u8),
    /// 8xy1 OR Vx, Vy
    Or(u8, u8),
    /// 8xy2 AND Vx, Vy
    And(u8, u8),
    /// 8xy3 XOR Vx, Vy
    Xor(u8, u8),
    /// 8xy4 ADD Vx, Vy
    Add(u8, u8),
    /// 8xy5 SUB Vx, Vy
    Sub(u8, u8),
    /// 8xy6 SHR Vx
    ShiftRight(u8, u8),
    /// 8xy7 SUBN Vx, Vy
    SubReverse(u8, u8),
    /// 8xyE SHL Vx
    ShiftLeft(u8, u8),
    /// 9xy0 SNE Vx, Vy
    SkipNeReg(u8, u8),
    /// Annn LD I, addr
    LoadIndex(u16),
    /// Bnnn JP V0, addr
    JumpOffset(u16),
    /// Cxkk RND Vx, byte
    Random(u8, u8),
    /// Dxyn DRW Vx, Vy, nibble
    Draw(u8, u8, u8),
    /// Ex9E SKP Vx
    SkipKeyPressed(u8),
    /// ExA1 SKNP Vx
    SkipKeyNotPressed(u8),
    /// Fx07 LD Vx, DT
    ReadDelay(u8),
    /// Fx0A LD Vx, K
    WaitKey(u8),
    /// Fx15 LD DT, Vx
    SetDelay(u8),
    /// Fx18 LD ST, Vx
    SetSound(u8),
    /// Fx1E ADD I, Vx
    AddIndex(u8),
    /// Fx29 LD F, Vx
    FontGlyph(u8),
    /// Fx33 LD B, Vx
    Bcd(u8),
    /// Fx55 LD [I], Vx
    StoreRegs(u8),
    /// Fx65 LD Vx, [I]
    LoadRegs(u8),
}

impl Instruction {
    /// None if the word doesn't match any known opcode pattern
    pub fn decode(word: u16) -> Option<Instruction> {
        use Instruction::*;

        let nnn = word & 0x0fff;
        let kk = (word & 0x00ff) as u8;
        let n = (word & 0x000f) as u8;
        let x = ((word & 0x0f00) >> 8) as u8;
        let y = ((word & 0x00f0) >> 4) as u8;

        let instr = match word & 0xf000 {
            0x0000 => match word {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => return None,
            },
            0x1000 => Jump(nnn),
            0x2000 => Call(nnn),
            0x3000 => SkipEqImm(x, kk),
            0x4000 => SkipNeImm(x, kk),
            0x5000 if n == 0 => SkipEqReg(x, y),
            0x6000 => LoadImm(x, kk),
            0x7000 => AddImm(x, kk),
            0x8000 => match n {
                0x0 => Move(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => Add(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x, y),
                0x7 => SubReverse(x, y),
                0xe => ShiftLeft(x, y),
                _ => return None,
            },
            0x9000 if n == 0 => SkipNeReg(x, y),
            0xa000 => LoadIndex(nnn),
            0xb000 => JumpOffset(nnn),
            0xc000 => Random(x, kk),
            0xd000 => Draw(x, y, n),
            0xe000 => match kk {
                0x9e => SkipKeyPressed(x),
                0xa1 => SkipKeyNotPressed(x),
                _ => return None,
            },
            0xf000 => match kk {
                0x07 => ReadDelay(x),
                0x0a => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => FontGlyph(x),
                0x33 => Bcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(instr)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:03X}", a),
            Call(a) => write!(f, "CALL {:03X}", a),
            SkipEqImm(x, kk) => write!(f, "SE V{:X}, {:02X}", x, kk),
            SkipNeImm(x, kk) => write!(f, "SNE V{:X}, {:02X}", x, kk),
            SkipEqReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm(x, kk) => write!(f, "LD V{:X}, {:02X}", x, kk),
            AddImm(x, kk) => write!(f, "ADD V{:X}, {:02X}", x, kk),
            Move(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x, _) => write!(f, "SHR V{:X}", x),
            SubReverse(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, _) => write!(f, "SHL V{:X}", x),
            SkipNeReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(a) => write!(f, "LD I, {:03X}", a),
            JumpOffset(a) => write!(f, "JP V0, {:03X}", a),
            Random(x, kk) => write!(f, "RND V{:X}, {:02X}", x, kk),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, n),
            SkipKeyPressed(x) => write!(f, "SKP V{:X}", x),
            SkipKeyNotPressed(x) => write!(f, "SKNP V{:X}", x),
            ReadDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            FontGlyph(x) => write!(f, "LD F, V{:X}", x),
            Bcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
