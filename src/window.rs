use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::config::Config;
use crate::display::{HEIGHT, WIDTH};
use crate::keyboard::Keypad;

/// What the operator asked for since the last poll.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Requests {
    pub quit: bool,
    pub toggle_pause: bool,
}

pub struct Screen {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl Screen {
    pub fn new(config: &Config) -> Result<Self, minifb::Error> {
        let (width, height) = (WIDTH * config.scale as usize, HEIGHT * config.scale as usize);
        let mut window = Window::new(
            "emuchip - ESC to exit, SPACE to pause",
            width,
            height,
            WindowOptions::default(),
        )?;
        // pacing is done by the host loop
        window.limit_update_rate(None);
        Ok(Self {
            window,
            buffer: vec![to_0rgb(config.background); width * height],
            width,
            height,
        })
    }

    /// Mirrors the held host keys into `keypad`.
    pub fn poll(&mut self, keypad: &mut Keypad) -> Requests {
        keypad.update_from_host(&self.window.get_keys());
        Requests {
            quit: !self.window.is_open() || self.window.is_key_down(Key::Escape),
            toggle_pause: self.window.is_key_pressed(Key::Space, KeyRepeat::No),
        }
    }

    pub fn present(&mut self, pixels: &[bool], config: &Config) -> Result<(), minifb::Error> {
        rasterize(pixels, config, &mut self.buffer);
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
    }

    /// Pumps window events without touching the picture.
    pub fn idle(&mut self) {
        self.window.update();
    }
}

/// RGBA as configured -> 0RGB as minifb wants it.
pub fn to_0rgb(rgba: u32) -> u32 {
    rgba >> 8
}

/// Scales the 64x32 pixel buffer into `out`, one `scale`-sized square per
/// pixel, optionally outlined in the background colour.
pub fn rasterize(pixels: &[bool], config: &Config, out: &mut [u32]) {
    let scale = config.scale as usize;
    let row_len = WIDTH * scale;
    let (fg, bg) = (to_0rgb(config.foreground), to_0rgb(config.background));

    for (i, &on) in pixels.iter().enumerate() {
        let (px, py) = (i % WIDTH, i / WIDTH);
        for dy in 0..scale {
            for dx in 0..scale {
                let edge = dx == 0 || dy == 0 || dx == scale - 1 || dy == scale - 1;
                let colour = if on && !(config.outlines && edge) { fg } else { bg };
                out[(py * scale + dy) * row_len + px * scale + dx] = colour;
            }
        }
    }
}
