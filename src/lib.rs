pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod rng;
pub mod sound;
pub mod timer;
pub mod window;

pub use config::{Args, Config};
pub use emulator::{Emulator, KeyWait, RunState};
pub use error::{ConfigError, Fault, LoadError};
