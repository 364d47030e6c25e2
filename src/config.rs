/// what to do when the interpreter meets an instruction it doesn't know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpcodePolicy {
    /// count it, log it, move on to the next instruction
    #[default]
    Skip,
    /// stop the program as if it had faulted
    Fatal,
}

/// how terminal keys are laid out over the hex keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeymapKind {
    /// COSMAC VIP layout on the left of a qwerty keyboard
    #[default]
    Conventional,
    /// 1234/qwer/asdf/zxcv read in order as 0-f
    Sequential,
}

/// CHIP-8 instructions per second we aim for
pub const DEFAULT_CPU_HZ: u32 = 500;

/// delay and sound timers always count down at 60Hz
pub const DEFAULT_TIMER_HZ: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cpu_hz: u32,
    pub timer_hz: u32,
    pub opcode_policy: OpcodePolicy,
    /// fixes the random number generator for reproducible runs
    pub seed: Option<u64>,
    pub keymap: KeymapKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cpu_hz: DEFAULT_CPU_HZ,
            timer_hz: DEFAULT_TIMER_HZ,
            opcode_policy: OpcodePolicy::default(),
            seed: None,
            keymap: KeymapKind::default(),
        }
    }
}

impl Config {
    /// total timer ticks due once `cycles` instructions have run. A running
    /// total rather than a fixed stride, so the timers keep `timer_hz` even
    /// when it doesn't divide `cpu_hz`
    pub fn timer_ticks_after(&self, cycles: u64) -> u64 {
        cycles * self.timer_hz as u64 / self.cpu_hz.max(1) as u64
    }
}
