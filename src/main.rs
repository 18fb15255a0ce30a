// 4 KiB of memory, programs load at 0x200, font glyphs at 0x000
// 16 8-bit data registers named V0 to VF, VF doubles as the flag
// Delay & sound timers count down at 60 Hz, beep while sound is non-zero
// Display res: 64 width, 32 height
//
// Separately:
// CPU: instructions_per_second, run in batches between frames
// Display, timers and input: 60 times per second

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, warn};

use emuchip::rng::{SeededRandom, ThreadRandom};
use emuchip::sound::Tone;
use emuchip::timer::TIMER_DEC_PER_SECOND;
use emuchip::window::Screen;
use emuchip::{Args, Emulator, RunState};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.config();
    config.validate().context("invalid settings")?;

    let mut emu = match args.seed {
        Some(seed) => Emulator::with_rng(Box::new(SeededRandom::new(seed))),
        None => Emulator::with_rng(Box::new(ThreadRandom::new())),
    };
    emu.load_rom_file(&args.rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;

    let mut screen = Screen::new(&config).context("failed to open window")?;
    let tone = match Tone::new(&config) {
        Ok(tone) => Some(tone),
        Err(e) => {
            warn!("running without sound: {e}");
            None
        }
    };

    let frame = Duration::from_secs(1) / TIMER_DEC_PER_SECOND as u32;
    let per_frame = config.instructions_per_frame();
    info!("running {} at {} instructions per frame", args.rom.display(), per_frame);

    while emu.is_running() {
        let started = Instant::now();

        let requests = screen.poll(&mut emu.keypad);
        if requests.quit {
            emu.quit();
            break;
        }
        if requests.toggle_pause {
            emu.toggle_pause();
        }
        if emu.run_state() == RunState::Paused {
            if let Some(tone) = &tone {
                tone.set_active(false);
            }
            screen.idle();
            thread::sleep(frame);
            continue;
        }

        emu.run(per_frame);

        if let Some(left) = frame.checked_sub(started.elapsed()) {
            thread::sleep(left);
        }

        if emu.fb.needs_redraw() {
            screen
                .present(emu.fb.pixels(), &config)
                .context("failed to draw frame")?;
            emu.fb.mark_drawn();
        } else {
            screen.idle();
        }

        if let Some(tone) = &tone {
            tone.set_active(emu.sound_active());
        }
        emu.sync_timers();
    }

    if let Some(tone) = &tone {
        tone.set_active(false);
    }
    match emu.fault() {
        Some(fault) => Err(anyhow!(fault).context("program faulted")),
        None => Ok(()),
    }
}
