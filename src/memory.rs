use crate::error::Chip8Error;
use std::io;
use std::io::Read;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc. All access is bounds-checked; a bad
/// address is a `MemoryFault`, never a panic.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"; nothing is written unless all of it fits
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        let bytes = self.get_rw_slice(addr, data.len())?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// get a single byte
    fn get_byte(&self, addr: u16) -> Result<u8, Chip8Error> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16, Chip8Error> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(((word[0] as u16) << 8) | (word[1] as u16))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error>;
}

/// how much RAM we have; every address 0x000-0xfff is addressable
pub const CHIP8_RAM_SIZE_BYTES: usize = 0x1000;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// programs must end before this address
pub const CHIP8_PROGRAM_LIMIT: u16 = 0x0fff;

/// biggest program image we'll accept
pub const CHIP8_MAX_PROGRAM_BYTES: usize = (CHIP8_PROGRAM_LIMIT - CHIP8_PROGRAM_ADDR) as usize;

pub const CHIP8_FONT_ADDR: u16 = 0x000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map
///   0x0000-0x004f  font
///   0x0050-0x01ff  reserved for the interpreter
///   0x0200-0x0ffe  program
///   0x0fff         free for program data
///
/// the stack, registers and display are held outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error> {
        let a = checked_range(addr, len)?;
        Ok(&mut self.bytes[a..(a + len)])
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let a = checked_range(addr, len)?;
        Ok(&self.bytes[a..(a + len)])
    }
}

/// fault on the first address of `addr..addr+len` that falls off the end of RAM
fn checked_range(addr: u16, len: usize) -> Result<usize, Chip8Error> {
    let a = addr as usize;
    if a + len > CHIP8_RAM_SIZE_BYTES {
        return Err(Chip8Error::MemoryFault {
            addr: a.max(CHIP8_RAM_SIZE_BYTES),
        });
    }
    Ok(a)
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap { bytes }
    }

    /// write on behalf of a running program; the interpreter area below
    /// 0x200 (font included) is off limits
    pub fn store(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        if addr < CHIP8_PROGRAM_ADDR {
            return Err(Chip8Error::MemoryFault { addr: addr as usize });
        }
        self.write(data, addr)
    }

    /// load a CHIP-8 program at 0x200, refusing anything that would run past 0xfff
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::OutOfBounds {
                len: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(program, CHIP8_PROGRAM_ADDR)
    }

    /// read a program of unknown length from somewhere and load it
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), io::Error> {
        // read one byte past the limit so oversize images get reported properly
        let mut buf = Vec::new();
        reader
            .take(CHIP8_MAX_PROGRAM_BYTES as u64 + 1)
            .read_to_end(&mut buf)?;
        self.load_program(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// address of the glyph for the low nibble of `digit`
    pub fn font_glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + (digit & 0x0f) as u16 * CHIP8_FONT_GLYPH_BYTES
    }
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
