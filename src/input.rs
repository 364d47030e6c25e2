use crate::config::KeymapKind;
use crate::error::Chip8Error;
use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

pub const CHIP8_KEY_COUNT: usize = 16;

/// which of the 16 hex keys are held down. Written by the input adapter,
/// read by the interpreter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; CHIP8_KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: u8, pressed: bool) -> Result<(), Chip8Error> {
        let k = self.keys.get_mut(key as usize).ok_or(Chip8Error::InvalidKey(key))?;
        *k = pressed;
        Ok(())
    }

    /// keys outside 0x0-0xf are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }
}

/// map of characters read from the keyboard to what the chip8 might expect,
/// using the left-hand side of a qwerty keyboard the way the COSMAC VIP
/// keypad was laid out
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// ditto, reading the 4x4 block left-to-right, top-to-bottom as 0-f
const CHIP8_SEQUENTIAL_KEYMAP: [(char, u8); 16] = [
    ('1', 0x00),
    ('2', 0x01),
    ('3', 0x02),
    ('4', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('r', 0x07),
    ('a', 0x08),
    ('s', 0x09),
    ('d', 0x0a),
    ('f', 0x0b),
    ('z', 0x0c),
    ('x', 0x0d),
    ('c', 0x0e),
    ('v', 0x0f),
];

pub fn keymap(kind: KeymapKind) -> HashMap<char, u8> {
    match kind {
        KeymapKind::Conventional => HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        KeymapKind::Sequential => HashMap::from(CHIP8_SEQUENTIAL_KEYMAP),
    }
}

/// what an input device can tell the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(u8),
    Up(u8),
    Quit,
}

/// reads keypresses
pub trait Input {
    /// everything that has happened since the last poll, oldest first
    fn poll_events(&mut self) -> Result<Vec<KeyEvent>, io::Error>;
}

/// terminals only report presses (and auto-repeats), so a key counts as held
/// for this long after the last time we saw it
const TERM_KEY_HOLD: Duration = Duration::from_millis(150);

/// simple implementation of Input, reading the terminal with crossterm
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: HashMap<u8, Instant>,
}

impl TermInput {
    pub fn new(kind: KeymapKind) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: keymap(kind),
            held: HashMap::new(),
        })
    }

    fn read_terminal(&mut self, events: &mut Vec<KeyEvent>) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => {
                            if self.held.insert(mapped_key, Instant::now()).is_none() {
                                events.push(KeyEvent::Down(mapped_key));
                            }
                        }
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    KeyCode::Esc => events.push(KeyEvent::Quit),
                    _ => debug!("ignoring key event {:?}", evt),
                },
                other => debug!("ignoring terminal event {:?}", other),
            }
        }
        Ok(())
    }

    fn expire_held(&mut self, now: Instant, events: &mut Vec<KeyEvent>) {
        let mut expired: Vec<u8> = self
            .held
            .iter()
            .filter(|(_, t)| now.duration_since(**t) >= TERM_KEY_HOLD)
            .map(|(k, _)| *k)
            .collect();
        expired.sort_unstable();
        for k in expired {
            self.held.remove(&k);
            events.push(KeyEvent::Up(k));
        }
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("couldn't restore terminal mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn poll_events(&mut self) -> Result<Vec<KeyEvent>, io::Error> {
        let mut events = Vec::new();
        self.expire_held(Instant::now(), &mut events);
        self.read_terminal(&mut events)?;
        Ok(events)
    }
}

/// dummy Input implementation for testing: hands out one batch of events per poll
pub struct DummyInput {
    batches: Vec<Vec<KeyEvent>>,
}

impl DummyInput {
    /// each inner slice is what a single poll returns; polls after the last
    /// batch return nothing
    pub fn new(batches: &[&[KeyEvent]]) -> Self {
        let mut batches: Vec<Vec<KeyEvent>> = batches.iter().map(|b| b.to_vec()).collect();
        batches.reverse();
        DummyInput { batches }
    }
}

impl Input for DummyInput {
    fn poll_events(&mut self) -> Result<Vec<KeyEvent>, io::Error> {
        Ok(self.batches.pop().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_set_and_read() -> Result<(), Chip8Error> {
        let mut k = Keypad::new();
        assert!(!k.is_pressed(0x3));
        k.set(0x3, true)?;
        assert!(k.is_pressed(0x3));
        k.set(0x3, false)?;
        assert!(!k.is_pressed(0x3));
        Ok(())
    }

    #[test]
    fn test_keypad_rejects_bad_key() {
        let mut k = Keypad::new();
        assert_eq!(k.set(0x10, true), Err(Chip8Error::InvalidKey(0x10)));
        assert!(!k.is_pressed(0x10));
        assert!(!k.is_pressed(0xff));
    }

    #[test]
    fn test_keymaps_cover_every_key() {
        for kind in [KeymapKind::Conventional, KeymapKind::Sequential] {
            let map = keymap(kind);
            let mut keys: Vec<u8> = map.values().copied().collect();
            keys.sort_unstable();
            assert_eq!(keys, (0..16).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn test_sequential_keymap_rows() {
        let map = keymap(KeymapKind::Sequential);
        assert_eq!(map[&'1'], 0x0);
        assert_eq!(map[&'r'], 0x7);
        assert_eq!(map[&'v'], 0xf);
    }

    #[test]
    fn test_dummy_input_batches() -> Result<(), io::Error> {
        let mut i = DummyInput::new(&[&[KeyEvent::Down(1)], &[], &[KeyEvent::Up(1), KeyEvent::Quit]]);
        assert_eq!(i.poll_events()?, vec![KeyEvent::Down(1)]);
        assert!(i.poll_events()?.is_empty());
        assert_eq!(i.poll_events()?, vec![KeyEvent::Up(1), KeyEvent::Quit]);
        assert!(i.poll_events()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_term_input_releases_after_hold() {
        let start = Instant::now();
        let mut t = TermInput {
            keymap: keymap(KeymapKind::Conventional),
            held: HashMap::from([(0x5, start), (0x2, start + TERM_KEY_HOLD)]),
        };
        let mut events = Vec::new();
        t.expire_held(start + TERM_KEY_HOLD, &mut events);
        assert_eq!(events, vec![KeyEvent::Up(0x5)]);
        assert!(t.held.contains_key(&0x2));
    }
}
