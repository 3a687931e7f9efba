//! famicore runner.
//!
//! Headless by default: loads a ROM, runs a number of frames and prints a
//! checksum of the final frame. With the `screenshot` feature it can save the
//! last frame as a PNG; with the `display` feature `--window` opens a winit
//! window driven by `pixels`.

use std::path::PathBuf;
use std::process;

use famicore::Console;
use tracing::Level;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    frames: u32,
    screenshot_path: Option<PathBuf>,
    window: bool,
    verbose: bool,
    help: bool,
}

const DEFAULT_FRAMES: u32 = 60;

fn print_usage() {
    eprintln!("Usage: famicore --rom <file.nes> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rom <file>         iNES ROM image");
    eprintln!("  --frames <n>         Frames to run headless [default: {DEFAULT_FRAMES}]");
    eprintln!("  --screenshot <file>  Save the last frame as PNG (feature `screenshot`)");
    eprintln!("  --window             Open a window (feature `display`)");
    eprintln!("  --verbose            Debug-level logging");
    eprintln!("  --help               Show this help");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    match parse_args_from(&args) {
        Ok(cli) if cli.help => {
            print_usage();
            process::exit(0);
        }
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            process::exit(1);
        }
    }
}

/// Parse `args` (program name first). Errors carry the message to print
/// before the usage text.
fn parse_args_from(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        rom_path: None,
        frames: DEFAULT_FRAMES,
        screenshot_path: None,
        window: false,
        verbose: false,
        help: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--frames" => {
                i += 1;
                let value = args.get(i).ok_or("--frames needs a value")?;
                cli.frames = value
                    .parse()
                    .map_err(|_| format!("Invalid frame count: {value}"))?;
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--window" => cli.window = true,
            "--verbose" | "-v" => cli.verbose = true,
            "--help" | "-h" => cli.help = true,
            other if cli.rom_path.is_none() && !other.starts_with('-') => {
                cli.rom_path = Some(PathBuf::from(other));
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(cli)
}

// ---------------------------------------------------------------------------
// Headless mode
// ---------------------------------------------------------------------------

/// FNV-1a over the indexed frame.
fn frame_checksum(console: &Console) -> u64 {
    console
        .screen_buffer()
        .iter()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, &b| {
            (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01B3)
        })
}

fn run_headless(cli: &CliArgs, console: &mut Console) {
    for frame in 0..cli.frames {
        if let Err(e) = console.next_frame() {
            tracing::error!(frame, "execution stopped: {e}");
            process::exit(2);
        }
    }
    println!(
        "frames={} pc={:#06X} cycles={} checksum={:016x}",
        cli.frames,
        console.cpu().pc(),
        console.cpu().cycles(),
        frame_checksum(console)
    );

    if let Some(ref path) = cli.screenshot_path {
        save_screenshot(console, path);
    }
}

#[cfg(feature = "screenshot")]
fn save_screenshot(console: &Console, path: &std::path::Path) {
    match famicore::screenshot::save_png(console, path) {
        Ok(()) => tracing::info!("screenshot saved to {}", path.display()),
        Err(e) => {
            tracing::error!("screenshot error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(not(feature = "screenshot"))]
fn save_screenshot(_console: &Console, path: &std::path::Path) {
    tracing::warn!(
        "ignoring --screenshot {}: built without the `screenshot` feature",
        path.display()
    );
}

// ---------------------------------------------------------------------------
// Windowed mode (winit + pixels)
// ---------------------------------------------------------------------------

#[cfg(feature = "display")]
mod window {
    use std::time::{Duration, Instant};

    use famicore::{Button, Console, Input, SCREEN_HEIGHT, SCREEN_WIDTH};
    use pixels::{Pixels, SurfaceTexture};
    use winit::application::ApplicationHandler;
    use winit::event::{ElementState, WindowEvent};
    use winit::event_loop::{ActiveEventLoop, EventLoop};
    use winit::keyboard::{KeyCode, PhysicalKey};
    use winit::window::{Window, WindowAttributes, WindowId};

    const SCALE: u32 = 3;
    // ~60.1 Hz NTSC
    const FRAME_DURATION: Duration = Duration::from_micros(16_639);

    struct App {
        console: Console,
        input: Input,
        window: Option<&'static Window>,
        pixels: Option<Pixels<'static>>,
        last_frame_time: Instant,
    }

    fn button_for(key: KeyCode) -> Option<Button> {
        Some(match key {
            KeyCode::KeyZ => Button::A,
            KeyCode::KeyX => Button::B,
            KeyCode::ShiftRight => Button::Select,
            KeyCode::Enter => Button::Start,
            KeyCode::ArrowUp => Button::Up,
            KeyCode::ArrowDown => Button::Down,
            KeyCode::ArrowLeft => Button::Left,
            KeyCode::ArrowRight => Button::Right,
            _ => return None,
        })
    }

    impl App {
        fn update_pixels(&mut self) {
            let Some(pixels) = self.pixels.as_mut() else {
                return;
            };
            pixels
                .frame_mut()
                .copy_from_slice(&self.console.frame_rgba());
        }
    }

    impl ApplicationHandler for App {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }
            let size = winit::dpi::LogicalSize::new(
                SCREEN_WIDTH as u32 * SCALE,
                SCREEN_HEIGHT as u32 * SCALE,
            );
            let attrs = WindowAttributes::default()
                .with_title("famicore")
                .with_inner_size(size)
                .with_resizable(false);

            match event_loop.create_window(attrs) {
                Ok(window) => {
                    let window: &'static Window = Box::leak(Box::new(window));
                    let inner = window.inner_size();
                    let surface = SurfaceTexture::new(inner.width, inner.height, window);
                    match Pixels::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, surface) {
                        Ok(pixels) => self.pixels = Some(pixels),
                        Err(e) => {
                            tracing::error!("failed to create pixels: {e}");
                            event_loop.exit();
                            return;
                        }
                    }
                    self.window = Some(window);
                }
                Err(e) => {
                    tracing::error!("failed to create window: {e}");
                    event_loop.exit();
                }
            }
        }

        fn window_event(
            &mut self,
            event_loop: &ActiveEventLoop,
            _window_id: WindowId,
            event: WindowEvent,
        ) {
            match event {
                WindowEvent::CloseRequested => event_loop.exit(),
                WindowEvent::KeyboardInput { event, .. } => {
                    let PhysicalKey::Code(key) = event.physical_key else {
                        return;
                    };
                    let pressed = event.state == ElementState::Pressed;
                    if key == KeyCode::Escape && pressed {
                        event_loop.exit();
                    } else if let Some(button) = button_for(key) {
                        self.input.set(button, pressed);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    if now.duration_since(self.last_frame_time) >= FRAME_DURATION {
                        self.console.set_input(Some(&self.input), None);
                        if let Err(e) = self.console.next_frame() {
                            tracing::error!("execution stopped: {e}");
                            event_loop.exit();
                            return;
                        }
                        self.update_pixels();
                        self.last_frame_time = now;
                    }
                    if let Some(pixels) = self.pixels.as_ref()
                        && let Err(e) = pixels.render()
                    {
                        tracing::error!("render error: {e}");
                        event_loop.exit();
                    }
                }
                _ => {}
            }
        }

        fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
            if let Some(window) = self.window {
                window.request_redraw();
            }
        }
    }

    pub fn run(console: Console) -> Result<(), winit::error::EventLoopError> {
        let mut app = App {
            console,
            input: Input::default(),
            window: None,
            pixels: None,
            last_frame_time: Instant::now(),
        };
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut app)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = parse_args();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let Some(rom_path) = cli.rom_path.as_ref() else {
        print_usage();
        process::exit(1);
    };

    let mut console = match Console::from_ines_file(rom_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load {}: {e}", rom_path.display());
            process::exit(1);
        }
    };
    tracing::info!(
        mapper = console.cartridge().mapper_id(),
        prg_banks = console.cartridge().prg_banks(),
        chr_banks = console.cartridge().chr_banks(),
        "loaded {}",
        rom_path.display()
    );

    if cli.window {
        #[cfg(feature = "display")]
        {
            if let Err(e) = window::run(console) {
                tracing::error!("event loop error: {e}");
                process::exit(1);
            }
            return;
        }
        #[cfg(not(feature = "display"))]
        tracing::warn!("--window needs the `display` feature; running headless");
    }

    run_headless(&cli, &mut console);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("famicore")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn frames_and_positional_rom() {
        let cli = parse_args_from(&args(&["game.nes", "--frames", "5", "-v"])).expect("parse");
        assert_eq!(cli.rom_path, Some(PathBuf::from("game.nes")));
        assert_eq!(cli.frames, 5);
        assert!(cli.verbose);
        assert!(!cli.help);
    }

    #[test]
    fn frames_defaults_when_absent() {
        let cli = parse_args_from(&args(&["--rom", "game.nes"])).expect("parse");
        assert_eq!(cli.frames, DEFAULT_FRAMES);
    }

    #[test]
    fn bad_frame_count_is_rejected() {
        let err = parse_args_from(&args(&["game.nes", "--frames", "abc"]))
            .err()
            .expect("non-numeric frame count");
        assert!(err.contains("abc"));
        assert!(parse_args_from(&args(&["game.nes", "--frames"])).is_err());
        assert!(parse_args_from(&args(&["game.nes", "--frames", "-3"])).is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse_args_from(&args(&["--turbo"])).is_err());
    }
}
