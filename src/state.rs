//! # state
//!
//! Everything a running CHIP-8 program can see or change. The engine in
//! `cpu` is the only thing that mutates it, apart from key delivery.
//!
//! (from: http://devernay.free.fr/hacks/chip8/C8TECH10.HTM)
//!  * V0-VF: 16 8-bit registers; VF doubles as the carry/borrow/collision flag
//!  * I: 16-bit index register, only the low 12 bits are usually meaningful
//!  * PC: 16-bit program counter, starts at 0x200
//!  * SP: up to 16 levels of return address
//!  * DT, ST: delay and sound timers, count down at 60Hz
use crate::display::Framebuffer;
use crate::error::Chip8Error;
use crate::input::Keypad;
use crate::memory::{Chip8MemoryMap, CHIP8_PROGRAM_ADDR};
use log::debug;

pub const CHIP8_REGISTER_COUNT: usize = 16;
pub const CHIP8_STACK_DEPTH: usize = 16;

/// index of the flag register
pub const VF: usize = 0xf;

/// where the interpreter is in its fetch/execute state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecState {
    #[default]
    Running,
    /// an Fx0A is waiting for a key to land in the given register
    AwaitingKey(u8),
    /// the key has arrived; the next step completes the Fx0A
    KeyPending { register: u8, key: u8 },
    /// the program has faulted; nothing happens until the state is re-initialised
    Faulted(Chip8Error),
}

/// fixed-depth return address stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallStack {
    frames: [u16; CHIP8_STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    pub fn push(&mut self, addr: u16, pc: u16) -> Result<(), Chip8Error> {
        if self.sp == CHIP8_STACK_DEPTH {
            return Err(Chip8Error::StackOverflow { pc });
        }
        self.frames[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self, pc: u16) -> Result<u16, Chip8Error> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow { pc });
        }
        self.sp -= 1;
        Ok(self.frames[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }

    /// saved return addresses, oldest first
    pub fn frames(&self) -> &[u16] {
        &self.frames[..self.sp]
    }
}

pub struct Chip8State {
    pub memory: Chip8MemoryMap,
    pub v: [u8; CHIP8_REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub stack: CallStack,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub framebuffer: Framebuffer,
    pub keypad: Keypad,
    pub exec: ExecState,
    unknown_opcodes: u64,
}

impl Default for Chip8State {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8State {
    /// a freshly initialised machine
    pub fn new() -> Self {
        Chip8State {
            memory: Chip8MemoryMap::new(),
            v: [0; CHIP8_REGISTER_COUNT],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: CallStack::default(),
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: Framebuffer::new(),
            keypad: Keypad::new(),
            exec: ExecState::Running,
            unknown_opcodes: 0,
        }
    }

    /// zero memory, registers, stack, timers and screen; reinstall the font;
    /// clear any halt or fault; PC back to 0x200
    pub fn initialize(&mut self) {
        debug!("initialising interpreter state");
        *self = Self::new();
    }

    /// copy a program in at 0x200. Registers are left alone so a program can
    /// be swapped under a running machine; call `initialize` first for a clean run.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(program)?;
        debug!("loaded {} byte program at {:#05x}", program.len(), CHIP8_PROGRAM_ADDR);
        Ok(())
    }

    /// the halt flag: true while waiting on a key or after a fault
    pub fn is_halted(&self) -> bool {
        matches!(self.exec, ExecState::AwaitingKey(_) | ExecState::Faulted(_))
    }

    pub fn fault(&self) -> Option<Chip8Error> {
        match self.exec {
            ExecState::Faulted(e) => Some(e),
            _ => None,
        }
    }

    /// record a key going down; satisfies a pending Fx0A
    pub fn press_key(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.keypad.set(key, true)?;
        if let ExecState::AwaitingKey(register) = self.exec {
            debug!("key {:x} delivered to V{:X}", key, register);
            self.exec = ExecState::KeyPending { register, key };
        }
        Ok(())
    }

    pub fn release_key(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.keypad.set(key, false)
    }

    /// how many words the engine skipped because it couldn't decode them
    pub fn unknown_opcodes(&self) -> u64 {
        self.unknown_opcodes
    }

    pub(crate) fn count_unknown_opcode(&mut self) {
        self.unknown_opcodes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryMap, CHIP8_FONT};

    #[test]
    fn test_new_state() -> Result<(), Chip8Error> {
        let s = Chip8State::new();
        assert_eq!(s.pc, 0x200);
        assert_eq!(s.i, 0);
        assert_eq!(s.v, [0; 16]);
        assert_eq!(s.stack.depth(), 0);
        assert_eq!(s.exec, ExecState::Running);
        assert!(!s.is_halted());
        assert_eq!(s.memory.get_ro_slice(0, 80)?, &CHIP8_FONT);
        Ok(())
    }

    #[test]
    fn test_initialize_resets_everything() -> Result<(), Chip8Error> {
        let mut s = Chip8State::new();
        s.load_program(&[0x60, 0x05])?;
        s.v[3] = 9;
        s.i = 0x300;
        s.pc = 0x400;
        s.delay_timer = 10;
        s.sound_timer = 10;
        s.stack.push(0x200, 0x200)?;
        s.framebuffer.draw_sprite(0, 0, &[0xff]);
        s.exec = ExecState::AwaitingKey(2);
        s.count_unknown_opcode();

        s.initialize();
        assert_eq!(s.pc, 0x200);
        assert_eq!(s.v[3], 0);
        assert_eq!(s.i, 0);
        assert_eq!((s.delay_timer, s.sound_timer), (0, 0));
        assert_eq!(s.stack.depth(), 0);
        assert!(s.framebuffer.cells().iter().all(|c| !c));
        assert!(!s.is_halted());
        assert_eq!(s.unknown_opcodes(), 0);
        assert_eq!(s.memory.get_word(0x200)?, 0x0000);
        Ok(())
    }

    #[test]
    fn test_load_without_reset_keeps_registers() -> Result<(), Chip8Error> {
        let mut s = Chip8State::new();
        s.v[1] = 0x42;
        s.pc = 0x210;
        s.load_program(&[0x00, 0xe0])?;
        assert_eq!(s.v[1], 0x42);
        assert_eq!(s.pc, 0x210);
        assert_eq!(s.memory.get_word(0x200)?, 0x00e0);
        Ok(())
    }

    #[test]
    fn test_call_stack_bounds() -> Result<(), Chip8Error> {
        let mut st = CallStack::default();
        assert_eq!(st.pop(0x200), Err(Chip8Error::StackUnderflow { pc: 0x200 }));
        for n in 0..CHIP8_STACK_DEPTH as u16 {
            st.push(0x200 + 2 * n, 0x200)?;
        }
        assert_eq!(st.push(0x300, 0x2a0), Err(Chip8Error::StackOverflow { pc: 0x2a0 }));
        assert_eq!(st.depth(), 16);
        assert_eq!(st.pop(0x200)?, 0x21e);
        assert_eq!(st.frames().len(), 15);
        Ok(())
    }

    #[test]
    fn test_press_key_completes_wait() -> Result<(), Chip8Error> {
        let mut s = Chip8State::new();
        s.press_key(0x3)?;
        assert_eq!(s.exec, ExecState::Running);
        s.exec = ExecState::AwaitingKey(0);
        assert!(s.is_halted());
        s.press_key(0x4)?;
        assert_eq!(s.exec, ExecState::KeyPending { register: 0, key: 4 });
        assert!(s.keypad.is_pressed(0x4));
        s.release_key(0x4)?;
        assert!(!s.keypad.is_pressed(0x4));
        assert_eq!(s.press_key(0x11), Err(Chip8Error::InvalidKey(0x11)));
        Ok(())
    }
}
