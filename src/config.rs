use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::timer::TIMER_DEC_PER_SECOND;

pub const DEFAULT_SCALE: u32 = 20;
pub const DEFAULT_FOREGROUND: u32 = 0xD169B6FF; // pink
pub const DEFAULT_BACKGROUND: u32 = 0x38374CFF; // dark blue
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_TONE_HZ: u32 = 440; // A4
pub const DEFAULT_AMPLITUDE: i16 = 5_000;
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub scale: u32,
    /// RGBA
    pub foreground: u32,
    /// RGBA
    pub background: u32,
    pub sample_rate: u32,
    pub tone_hz: u32,
    pub amplitude: i16,
    pub instructions_per_second: u32,
    pub outlines: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
            sample_rate: DEFAULT_SAMPLE_RATE,
            tone_hz: DEFAULT_TONE_HZ,
            amplitude: DEFAULT_AMPLITUDE,
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            outlines: true,
        }
    }
}

impl Config {
    /// Instructions executed between two 60 Hz timer ticks.
    pub fn instructions_per_frame(&self) -> u32 {
        self.instructions_per_second / TIMER_DEC_PER_SECOND as u32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        if self.instructions_per_frame() == 0 {
            return Err(ConfigError::TooFewInstructions {
                ips: self.instructions_per_second,
                min: TIMER_DEC_PER_SECOND as u32,
            });
        }
        if self.tone_hz == 0 || self.tone_hz > self.sample_rate / 2 {
            return Err(ConfigError::ToneOutOfRange {
                tone_hz: self.tone_hz,
                sample_rate: self.sample_rate,
            });
        }
        Ok(())
    }
}

fn parse_color(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches('#').trim_start_matches("0x");
    match digits.len() {
        6 => u32::from_str_radix(digits, 16)
            .map(|rgb| (rgb << 8) | 0xFF)
            .map_err(|e| e.to_string()),
        8 => u32::from_str_radix(digits, 16).map_err(|e| e.to_string()),
        _ => Err(format!("expected RRGGBB or RRGGBBAA, got {s:?}")),
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
pub struct Args {
    /// Path to the ROM file to run
    pub rom: PathBuf,

    #[arg(short, long, default_value_t = DEFAULT_SCALE, help = "Window pixels per CHIP-8 pixel")]
    pub scale: u32,

    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND, help = "Instructions per second")]
    pub ips: u32,

    #[arg(long, value_parser = parse_color, help = "Lit pixel colour, RRGGBB[AA]")]
    pub foreground: Option<u32>,

    #[arg(long, value_parser = parse_color, help = "Unlit pixel colour, RRGGBB[AA]")]
    pub background: Option<u32>,

    #[arg(long, default_value_t = DEFAULT_TONE_HZ, help = "Beep frequency in Hz")]
    pub tone: u32,

    #[arg(long, default_value_t = DEFAULT_AMPLITUDE, help = "Beep amplitude (0-32767)")]
    pub volume: i16,

    #[arg(long, help = "Draw pixels without outlines")]
    pub no_outlines: bool,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,
}

impl Args {
    pub fn config(&self) -> Config {
        let defaults = Config::default();
        Config {
            scale: self.scale,
            foreground: self.foreground.unwrap_or(defaults.foreground),
            background: self.background.unwrap_or(defaults.background),
            tone_hz: self.tone,
            amplitude: self.volume,
            instructions_per_second: self.ips,
            outlines: !self.no_outlines,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_eleven_instructions_per_frame() {
        let config = Config::default();
        assert_eq!(config.instructions_per_frame(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_settings() {
        let zero_scale = Config {
            scale: 0,
            ..Config::default()
        };
        assert_eq!(zero_scale.validate(), Err(ConfigError::ZeroScale));

        let too_slow = Config {
            instructions_per_second: 59,
            ..Config::default()
        };
        assert_eq!(
            too_slow.validate(),
            Err(ConfigError::TooFewInstructions { ips: 59, min: 60 })
        );

        let too_high = Config {
            tone_hz: 30_000,
            ..Config::default()
        };
        assert_eq!(
            too_high.validate(),
            Err(ConfigError::ToneOutOfRange {
                tone_hz: 30_000,
                sample_rate: DEFAULT_SAMPLE_RATE,
            })
        );
    }

    #[test]
    fn parses_colours() {
        assert_eq!(parse_color("#ff0000"), Ok(0xFF0000FF));
        assert_eq!(parse_color("0x11223344"), Ok(0x11223344));
        assert!(parse_color("fff").is_err());
        assert!(parse_color("zzzzzz").is_err());
    }

    #[test]
    fn args_override_defaults() {
        let args = Args::parse_from([
            "emuchip",
            "pong.ch8",
            "--ips",
            "1200",
            "--foreground",
            "00ff00",
            "--no-outlines",
        ]);
        let config = args.config();
        assert_eq!(args.rom, PathBuf::from("pong.ch8"));
        assert_eq!(config.instructions_per_frame(), 20);
        assert_eq!(config.foreground, 0x00FF00FF);
        assert_eq!(config.background, DEFAULT_BACKGROUND);
        assert!(!config.outlines);
        assert_eq!(config.scale, DEFAULT_SCALE);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
