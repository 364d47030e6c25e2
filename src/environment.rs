//! # environment
//!
//! Sets everything up and runs the main loop. Timing is counted in machine
//! cycles: after each instruction the 60Hz timer interrupt fires as many times
//! as `cycles * timer_hz / cpu_hz` says are due, and we sleep to keep
//! wall-clock time roughly right. The screen is only redrawn on a timer tick
//! where the framebuffer changed.
use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{Input, KeyEvent};
use crate::interpreter::Chip8Interpreter;
use crate::sound::{Sound, Tone};
use log::{debug, info, warn};
use std::error::Error;
use std::time::{Duration, Instant};

/// why the main loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// the user asked to quit
    Quit,
    /// ran for as many cycles as we were asked to
    CycleLimit,
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    cycles: u64,
    ticks: u64,
}

impl<'a> Environment<'a> {
    pub fn new(
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Environment<'a> {
        Environment {
            interpreter: Chip8Interpreter::new(&config),
            display,
            input,
            sound,
            config,
            cycles: 0,
            ticks: 0,
        }
    }

    /// reset the machine and load a fresh program into it
    pub fn load_program(&mut self, reader: &mut impl std::io::Read) -> Result<(), std::io::Error> {
        self.interpreter.initialize();
        self.interpreter.load_program_from(reader)?;
        self.cycles = 0;
        self.ticks = 0;
        Ok(())
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// run until quit, a fault, or `max_cycles` instructions (if given)
    pub fn main_loop(&mut self, max_cycles: Option<u64>) -> Result<Exit, Box<dyn Error>> {
        let cycle_time = Duration::from_secs_f64(1.0 / self.config.cpu_hz.max(1) as f64);
        info!(
            "running at {}Hz, timers at {}Hz",
            self.config.cpu_hz, self.config.timer_hz
        );

        // draw whatever is there before we start
        self.display.draw(self.interpreter.framebuffer())?;

        loop {
            if max_cycles.map_or(false, |max| self.cycles >= max) {
                return Ok(Exit::CycleLimit);
            }
            let started = Instant::now();

            if self.handle_input()? {
                return Ok(Exit::Quit);
            }
            self.interpreter.step()?;
            self.cycles += 1;

            // start the tone as soon as ST is set, even if it runs out on the
            // very next tick
            if self.interpreter.state().sound_timer > 0 {
                self.sound.follow(Tone::Sounding)?;
            }

            let due = self.config.timer_ticks_after(self.cycles);
            while self.ticks < due {
                self.interrupt()?;
                self.ticks += 1;
            }

            spin_sleep::sleep(cycle_time.saturating_sub(started.elapsed()));
        }
    }

    /// feed key events to the interpreter; true if we've been asked to quit
    fn handle_input(&mut self) -> Result<bool, Box<dyn Error>> {
        for event in self.input.poll_events()? {
            let delivered = match event {
                KeyEvent::Quit => {
                    debug!("quit requested after {} cycles", self.cycles);
                    return Ok(true);
                }
                KeyEvent::Down(key) => self.interpreter.press_key(key),
                KeyEvent::Up(key) => self.interpreter.release_key(key),
            };
            match delivered {
                Err(e @ Chip8Error::InvalidKey(_)) => warn!("dropping key event: {}", e),
                other => other?,
            }
        }
        Ok(false)
    }

    /// the 60Hz timer interrupt: timers, sound, and the screen if it changed
    fn interrupt(&mut self) -> Result<(), Box<dyn Error>> {
        let tone = self.interpreter.tick_timers();
        self.sound.follow(tone)?;
        if self.interpreter.framebuffer_mut().take_redraw() {
            self.display.draw(self.interpreter.framebuffer())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::sound::Mute;
    use crate::state::VF;

    fn fast_config() -> Config {
        Config {
            cpu_hz: 1_000_000,
            timer_hz: 60,
            seed: Some(1),
            ..Config::default()
        }
    }

    #[test]
    fn test_runs_to_cycle_limit() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut env = Environment::new(fast_config(), &mut display, &mut input, &mut sound);
        let mut prog: &[u8] = &[0x60, 0x05, 0x61, 0x05, 0x80, 0x14, 0x12, 0x06];
        env.load_program(&mut prog)?;
        assert_eq!(env.main_loop(Some(100))?, Exit::CycleLimit);
        assert_eq!(env.cycles(), 100);
        assert_eq!(env.interpreter().state().v[0], 0x0a);
        assert_eq!(env.interpreter().state().v[VF], 0);
        assert_eq!(env.interpreter().state().pc, 0x206);
        Ok(())
    }

    #[test]
    fn test_quit_stops_loop() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[&[], &[], &[KeyEvent::Quit]]);
        let mut sound = Mute::new();
        let mut env = Environment::new(fast_config(), &mut display, &mut input, &mut sound);
        let mut prog: &[u8] = &[0x12, 0x00];
        env.load_program(&mut prog)?;
        assert_eq!(env.main_loop(None)?, Exit::Quit);
        assert_eq!(env.cycles(), 2);
        Ok(())
    }

    #[test]
    fn test_draws_only_when_changed() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let config = Config {
                cpu_hz: 120,
                ..fast_config()
            };
            let mut env = Environment::new(config, &mut display, &mut input, &mut sound);
            // LD I, 000; DRW V0, V0, 5; JP 204
            let mut prog: &[u8] = &[0xa0, 0x00, 0xd0, 0x05, 0x12, 0x04];
            env.load_program(&mut prog)?;
            env.main_loop(Some(8))?;
        }
        // initial draw, then a single redraw on the first tick after the sprite
        assert_eq!(display.draw_count, 2);
        assert!(display.last_frame[0]);
        assert!(!display.last_frame[64 + 1]);
        Ok(())
    }

    #[test]
    fn test_sound_follows_timer() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let config = Config {
                cpu_hz: 60,
                ..fast_config()
            };
            let mut env = Environment::new(config, &mut display, &mut input, &mut sound);
            // LD V0, 02; LD ST, V0; JP 204
            let mut prog: &[u8] = &[0x60, 0x02, 0xf0, 0x18, 0x12, 0x04];
            env.load_program(&mut prog)?;
            env.main_loop(Some(3))?;
            assert_eq!(env.interpreter().state().sound_timer, 0);
        }
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
        Ok(())
    }

    #[test]
    fn test_short_sound_still_beeps() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let config = Config {
                cpu_hz: 60,
                ..fast_config()
            };
            let mut env = Environment::new(config, &mut display, &mut input, &mut sound);
            // LD V0, 01; LD ST, V0; JP 204
            let mut prog: &[u8] = &[0x60, 0x01, 0xf0, 0x18, 0x12, 0x04];
            env.load_program(&mut prog)?;
            env.main_loop(Some(3))?;
            assert_eq!(env.interpreter().state().sound_timer, 0);
        }
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
        Ok(())
    }

    #[test]
    fn test_timers_hold_rate_at_slow_cpu() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let config = Config {
            cpu_hz: 100,
            ..fast_config()
        };
        let mut env = Environment::new(config, &mut display, &mut input, &mut sound);
        // LD V0, FF; LD DT, V0; JP 204
        let mut prog: &[u8] = &[0x60, 0xff, 0xf0, 0x15, 0x12, 0x04];
        env.load_program(&mut prog)?;
        // half a second of cpu time is 30 ticks, all of them after DT is set
        env.main_loop(Some(50))?;
        assert_eq!(env.interpreter().state().delay_timer, 0xff - 30);
        Ok(())
    }

    #[test]
    fn test_key_wait_through_input_device() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[&[], &[], &[], &[KeyEvent::Down(0x7)], &[KeyEvent::Up(0x7)]]);
        let mut sound = Mute::new();
        let mut env = Environment::new(fast_config(), &mut display, &mut input, &mut sound);
        // LD V2, K; JP 202
        let mut prog: &[u8] = &[0xf2, 0x0a, 0x12, 0x02];
        env.load_program(&mut prog)?;
        env.main_loop(Some(6))?;
        let state = env.interpreter().state();
        assert_eq!(state.v[2], 0x7);
        assert_eq!(state.pc, 0x202);
        assert!(!state.keypad.is_pressed(0x7));
        Ok(())
    }

    #[test]
    fn test_bad_keys_are_dropped() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[&[KeyEvent::Down(0x42)]]);
        let mut sound = Mute::new();
        let mut env = Environment::new(fast_config(), &mut display, &mut input, &mut sound);
        let mut prog: &[u8] = &[0x12, 0x00];
        env.load_program(&mut prog)?;
        assert_eq!(env.main_loop(Some(2))?, Exit::CycleLimit);
        Ok(())
    }

    #[test]
    fn test_fault_ends_loop() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut env = Environment::new(fast_config(), &mut display, &mut input, &mut sound);
        let mut prog: &[u8] = &[0x00, 0xee];
        env.load_program(&mut prog)?;
        let err = env.main_loop(Some(10)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Chip8Error>(),
            Some(&Chip8Error::StackUnderflow { pc: 0x200 })
        );
        Ok(())
    }
}
