//! # interpreter
//!
//! Owns a `Chip8State` and the random number generator, and offers the
//! operations the outside world is allowed to use: initialise, load, step,
//! tick the timers and deliver keys. Nothing here knows about displays,
//! keyboards or speakers; that's the environment's job.
use crate::config::{Config, OpcodePolicy};
use crate::cpu::{self, Step};
use crate::display::Framebuffer;
use crate::error::Chip8Error;
use crate::sound::Tone;
use crate::state::Chip8State;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;

pub struct Chip8Interpreter {
    state: Chip8State,
    rng: StdRng,
    policy: OpcodePolicy,
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Chip8Interpreter {
    pub fn new(config: &Config) -> Chip8Interpreter {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            state: Chip8State::new(),
            rng,
            policy: config.opcode_policy,
        }
    }

    /// back to the power-on state, ready for a program
    pub fn initialize(&mut self) {
        self.state.initialize();
    }

    /// load a chip8 program at 0x200; all or nothing
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.state.load_program(program)
    }

    /// load a chip8 program from a file or whatever
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), io::Error> {
        self.state.memory.load_program_from(reader)
    }

    /// run one instruction, or nothing if halted
    pub fn step(&mut self) -> Result<Step, Chip8Error> {
        cpu::step(&mut self.state, &mut self.rng, self.policy)
    }

    /// 60Hz timer interrupt
    pub fn tick_timers(&mut self) -> Tone {
        cpu::tick_timers(&mut self.state)
    }

    pub fn press_key(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.state.press_key(key)
    }

    pub fn release_key(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.state.release_key(key)
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.state.framebuffer
    }

    /// for renderers that consume the redraw flag
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.state.framebuffer
    }

    pub fn state(&self) -> &Chip8State {
        &self.state
    }
}
