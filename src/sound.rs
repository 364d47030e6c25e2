use beep::beep;
use std::error::Error;

/// what the sound timer is doing after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// timer is zero and was already zero
    Silent,
    /// timer is still counting down
    Sounding,
    /// timer has just gone from 1 to 0
    Stopped,
}

pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_beeping(&self) -> bool;

    /// start or stop the tone to follow the sound timer
    fn follow(&mut self, tone: Tone) -> Result<(), Box<dyn Error>> {
        match tone {
            Tone::Sounding if !self.is_beeping() => self.beep(),
            Tone::Stopped | Tone::Silent if self.is_beeping() => self.stop(),
            _ => Ok(()),
        }
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// beeps through the PC speaker
#[derive(Default)]
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

/// keeps track of whether it would be beeping, but makes no noise
#[derive(Default)]
pub struct Mute {
    is_beeping: bool,
    pub beeps: usize,
}

impl Mute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = true;
        self.beeps += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}
