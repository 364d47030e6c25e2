use thiserror::Error;

/// Everything that can go wrong inside the interpreter core
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("program is too large ({len} bytes), max size is {max} bytes")]
    OutOfBounds { len: usize, max: usize },

    #[error("stack overflow: call at {pc:#05x} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05x} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {addr:#06x}")]
    MemoryFault { addr: usize },

    #[error("unknown opcode {opcode:#06x} at {pc:#05x}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("no such key: {0:#x}")]
    InvalidKey(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = Chip8Error::UnknownOpcode { opcode: 0x5ab1, pc: 0x204 };
        assert_eq!(e.to_string(), "unknown opcode 0x5ab1 at 0x204");
        let e = Chip8Error::MemoryFault { addr: 0x1000 };
        assert_eq!(e.to_string(), "memory access out of bounds at address 0x1000");
    }
}
