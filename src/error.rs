use crate::memory::TypeAddr;

/// Conditions that stop the interpreter for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("stack overflow: subroutine call at {pc:#05X} with all 16 return slots in use")]
    StackOverflow { pc: TypeAddr },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: TypeAddr },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("could not read ROM: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("scale must be at least 1")]
    ZeroScale,

    #[error("need at least {min} instructions per second, got {ips}")]
    TooFewInstructions { ips: u32, min: u32 },

    #[error("tone of {tone_hz} Hz cannot be produced at {sample_rate} Hz")]
    ToneOutOfRange { tone_hz: u32, sample_rate: u32 },
}
