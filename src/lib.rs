//!
//! ## Design
//!
//! * the interpreter core (state + engine) knows nothing about the outside
//!   world; it is driven entirely through `step()`, `tick_timers()` and key
//!   delivery
//! * map timing to instruction cycles: after `n` instructions the 60Hz timers
//!   have ticked `n * 60 / cpu_hz` times, and the environment sleeps between
//!   instructions to match wall-clock time
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * faults (bad stack use, memory access off the end of RAM) halt the
//!   program but never the host; unknown opcodes are logged and skipped
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound, config
//!  |-- interpreter(config)
//!  |    |-- state: memory, registers, stack, timers, framebuffer, keypad
//!  |    |-- cpu: fetch/decode/execute on the state
//!  |    `-- instruction set
//!  `-- main loop
//!       |-- events = input.poll_events(); deliver to interpreter
//!       |-- interpreter.step()
//!       |-- if ST > 0 { sound.follow(Sounding) }
//!       |-- for each 60Hz tick now due {
//!       |     tone = interpreter.tick_timers(); sound.follow(tone);
//!       |     if framebuffer changed { display.draw() }
//!       |   }
//!       `-- sleep(cycle time - time spent)
pub mod config;
pub mod cpu;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod sound;
pub mod state;

pub use error::Chip8Error;
pub use interpreter::Chip8Interpreter;
