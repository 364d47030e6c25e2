//! The fetch/decode/execute engine. Holds no state of its own: everything
//! lives in `Chip8State`, randomness comes from whatever `RngCore` the caller
//! hands in.
use crate::config::OpcodePolicy;
use crate::error::Chip8Error;
use crate::instruction::Instruction;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::sound::Tone;
use crate::state::{Chip8State, ExecState, VF};
use log::{debug, error, trace, warn};
use rand::RngCore;

/// what a single call to `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// one instruction ran to completion (or started waiting for a key)
    Executed(Instruction),
    /// an undecodable word was stepped over
    Skipped(u16),
    /// waiting on a key; nothing changed
    Waiting,
    /// a pending Fx0A was completed with this key
    KeyReceived { register: u8, key: u8 },
}

/// Run one fetch/decode/execute cycle. On a fault nothing is changed except
/// that the state moves to `ExecState::Faulted`; every later call returns the
/// same error until the state is re-initialised.
pub fn step(
    state: &mut Chip8State,
    rng: &mut impl RngCore,
    policy: OpcodePolicy,
) -> Result<Step, Chip8Error> {
    match state.exec {
        ExecState::Faulted(e) => return Err(e),
        ExecState::AwaitingKey(_) => return Ok(Step::Waiting),
        ExecState::KeyPending { register, key } => {
            state.v[register as usize] = key;
            state.pc = state.pc.wrapping_add(2);
            state.exec = ExecState::Running;
            return Ok(Step::KeyReceived { register, key });
        }
        ExecState::Running => {}
    }

    let result = fetch_and_execute(state, rng, policy);
    if let Err(e) = result {
        error!("halting: {}", e);
        state.exec = ExecState::Faulted(e);
    }
    result
}

fn fetch_and_execute(
    state: &mut Chip8State,
    rng: &mut impl RngCore,
    policy: OpcodePolicy,
) -> Result<Step, Chip8Error> {
    let pc = state.pc;
    let word = state.memory.get_word(pc)?;
    match Instruction::decode(word) {
        Some(instr) => {
            trace!("{:03x}: {:04x}  {}", pc, word, instr);
            execute(state, instr, rng)?;
            Ok(Step::Executed(instr))
        }
        None => {
            let unknown = Chip8Error::UnknownOpcode { opcode: word, pc };
            if policy == OpcodePolicy::Fatal {
                return Err(unknown);
            }
            warn!("skipping {}", unknown);
            state.count_unknown_opcode();
            state.pc = pc.wrapping_add(2);
            Ok(Step::Skipped(word))
        }
    }
}

fn skip_if(state: &mut Chip8State, cond: bool) {
    state.pc = state.pc.wrapping_add(if cond { 4 } else { 2 });
}

/// apply a decoded instruction. Every check that can fail happens before the
/// first write, so an error leaves the state exactly as it was.
fn execute(
    state: &mut Chip8State,
    instr: Instruction,
    rng: &mut impl RngCore,
) -> Result<(), Chip8Error> {
    use Instruction::*;

    let pc = state.pc;
    let next = pc.wrapping_add(2);
    let v = &mut state.v;

    match instr {
        ClearScreen => {
            state.framebuffer.clear();
            state.pc = next;
        }
        Return => {
            let ret = state.stack.pop(pc)?;
            state.pc = ret.wrapping_add(2);
        }
        Jump(addr) => state.pc = addr,
        Call(addr) => {
            state.stack.push(pc, pc)?;
            state.pc = addr;
        }
        SkipEqImm(x, kk) => {
            let cond = v[x as usize] == kk;
            skip_if(state, cond);
        }
        SkipNeImm(x, kk) => {
            let cond = v[x as usize] != kk;
            skip_if(state, cond);
        }
        SkipEqReg(x, y) => {
            let cond = v[x as usize] == v[y as usize];
            skip_if(state, cond);
        }
        SkipNeReg(x, y) => {
            let cond = v[x as usize] != v[y as usize];
            skip_if(state, cond);
        }
        LoadImm(x, kk) => {
            v[x as usize] = kk;
            state.pc = next;
        }
        AddImm(x, kk) => {
            v[x as usize] = v[x as usize].wrapping_add(kk);
            state.pc = next;
        }
        Move(x, y) => {
            v[x as usize] = v[y as usize];
            state.pc = next;
        }
        Or(x, y) => {
            v[x as usize] |= v[y as usize];
            state.pc = next;
        }
        And(x, y) => {
            v[x as usize] &= v[y as usize];
            state.pc = next;
        }
        Xor(x, y) => {
            v[x as usize] ^= v[y as usize];
            state.pc = next;
        }
        // flag writes come last so VF holds the flag even when it is also
        // the destination
        Add(x, y) => {
            let (sum, carry) = v[x as usize].overflowing_add(v[y as usize]);
            v[x as usize] = sum;
            v[VF] = carry as u8;
            state.pc = next;
        }
        Sub(x, y) => {
            let (a, b) = (v[x as usize], v[y as usize]);
            v[x as usize] = a.wrapping_sub(b);
            v[VF] = (a >= b) as u8;
            state.pc = next;
        }
        SubReverse(x, y) => {
            let (a, b) = (v[x as usize], v[y as usize]);
            v[x as usize] = b.wrapping_sub(a);
            v[VF] = (b >= a) as u8;
            state.pc = next;
        }
        ShiftRight(x, _) => {
            let val = v[x as usize];
            v[x as usize] = val >> 1;
            v[VF] = val & 0x01;
            state.pc = next;
        }
        ShiftLeft(x, _) => {
            let val = v[x as usize];
            v[x as usize] = val << 1;
            v[VF] = (val >> 7) & 0x01;
            state.pc = next;
        }
        LoadIndex(addr) => {
            state.i = addr;
            state.pc = next;
        }
        JumpOffset(addr) => state.pc = addr + v[0] as u16,
        Random(x, kk) => {
            v[x as usize] = (rng.next_u32() as u8) & kk;
            state.pc = next;
        }
        Draw(x, y, n) => {
            let rows = state.memory.get_ro_slice(state.i, n as usize)?;
            let collision =
                state
                    .framebuffer
                    .draw_sprite(v[x as usize] as usize, v[y as usize] as usize, rows);
            v[VF] = collision as u8;
            state.pc = next;
        }
        SkipKeyPressed(x) => {
            let cond = state.keypad.is_pressed(v[x as usize]);
            skip_if(state, cond);
        }
        SkipKeyNotPressed(x) => {
            let cond = !state.keypad.is_pressed(v[x as usize]);
            skip_if(state, cond);
        }
        ReadDelay(x) => {
            v[x as usize] = state.delay_timer;
            state.pc = next;
        }
        WaitKey(x) => {
            // PC stays put until the key arrives
            debug!("waiting for a key for V{:X}", x);
            state.exec = ExecState::AwaitingKey(x);
        }
        SetDelay(x) => {
            state.delay_timer = v[x as usize];
            state.pc = next;
        }
        SetSound(x) => {
            state.sound_timer = v[x as usize];
            state.pc = next;
        }
        AddIndex(x) => {
            state.i = state.i.wrapping_add(v[x as usize] as u16);
            state.pc = next;
        }
        FontGlyph(x) => {
            state.i = Chip8MemoryMap::font_glyph_addr(v[x as usize]);
            state.pc = next;
        }
        Bcd(x) => {
            let val = v[x as usize];
            state.memory.store(&[val / 100, (val / 10) % 10, val % 10], state.i)?;
            state.pc = next;
        }
        StoreRegs(x) => {
            let len = x as usize + 1;
            state.memory.store(&v[..len], state.i)?;
            state.i = state.i.wrapping_add(len as u16);
            state.pc = next;
        }
        LoadRegs(x) => {
            let len = x as usize + 1;
            v[..len].copy_from_slice(state.memory.get_ro_slice(state.i, len)?);
            state.i = state.i.wrapping_add(len as u16);
            state.pc = next;
        }
    }
    Ok(())
}

/// count both timers down by one; called at 60Hz regardless of how fast `step` runs
pub fn tick_timers(state: &mut Chip8State) -> Tone {
    if state.delay_timer > 0 {
        state.delay_timer -= 1;
    }
    match state.sound_timer {
        0 => Tone::Silent,
        1 => {
            state.sound_timer = 0;
            Tone::Stopped
        }
        _ => {
            state.sound_timer -= 1;
            Tone::Sounding
        }
    }
}
