//! wtconsole - console state demo
//!
//! Opens a session on a standard stream, applies title, colors and cursor
//! shape from `~/.wtconsole/config.toml` and the command line, optionally
//! clears the screen, and exits. The cursor state and text attribute are
//! back to what they were before, whatever happened in between.
//!
//! # Quick Start
//!
//! ```text
//! wtconsole -i                      # Print buffer geometry
//! wtconsole --palette               # Show all sixteen colors
//! wtconsole --fg yellow --bg blue   # Print a line in yellow on blue
//! wtconsole --clear --fill .        # Fill the buffer with dots
//! ```

use std::env;
use std::io::Write;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wtconsole::config::Config as FileConfig;
use wtconsole::{Color, ColorAttribute, ConsolePort, Session, StreamKind};

/// Command line settings; anything left unset comes from the config file
#[derive(Default)]
struct Args {
    stream: Option<StreamKind>,
    title: Option<String>,
    foreground: Option<String>,
    background: Option<String>,
    fill_char: Option<char>,
    clear: bool,
    cursor_size: Option<u32>,
    hide_cursor: bool,
    palette: bool,
    info: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("wtconsole {}", VERSION);
}

fn print_help() {
    eprintln!("wtconsole {} - Scoped console state control", VERSION);
    eprintln!();
    eprintln!("Usage: wtconsole [OPTIONS]");
    eprintln!();
    eprintln!("Session options:");
    eprintln!("  -s, --stream <NAME>   Standard stream: input, output, error (default: output)");
    eprintln!("  -t, --title <TEXT>    Set the window title");
    eprintln!();
    eprintln!("Color options:");
    eprintln!("  --fg <COLOR>          Foreground color");
    eprintln!("  --bg <COLOR>          Background color");
    eprintln!("  --palette             Print a line in each of the sixteen colors");
    eprintln!();
    eprintln!("Screen options:");
    eprintln!("  --clear               Clear the whole buffer");
    eprintln!("  --fill <CHAR>         Character used by --clear (default: space)");
    eprintln!("  --cursor <SIZE>       Cursor size, 1-100");
    eprintln!("  --hide-cursor         Hide the cursor");
    eprintln!("  -i, --info            Print buffer geometry and cursor state");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Colors: black, blue, green, aqua, red, purple, yellow, white, gray,");
    eprintln!("        light blue, light green, light aqua, light red, light purple,");
    eprintln!("        light yellow, bright white (case-insensitive)");
    eprintln!();
    eprintln!("Configuration: ~/.wtconsole/config.toml");
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    // Value of the option at args[i]
    fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
        *i += 1;
        args.get(*i)
            .map(String::as_str)
            .ok_or_else(|| format!("Missing argument for {}", flag))
    }

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "--stream" => {
                let name = value(&args, &mut i, flag)?;
                parsed.stream = Some(
                    StreamKind::parse(name).ok_or_else(|| format!("Unknown stream: {}", name))?,
                );
            }
            "-t" | "--title" => {
                parsed.title = Some(value(&args, &mut i, flag)?.to_string());
            }
            "--fg" => {
                parsed.foreground = Some(value(&args, &mut i, flag)?.to_string());
            }
            "--bg" => {
                parsed.background = Some(value(&args, &mut i, flag)?.to_string());
            }
            "--fill" => {
                let text = value(&args, &mut i, flag)?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => parsed.fill_char = Some(ch),
                    _ => return Err(format!("Fill must be a single character: {:?}", text)),
                }
            }
            "--clear" => {
                parsed.clear = true;
            }
            "--cursor" => {
                let text = value(&args, &mut i, flag)?;
                let size = text
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid cursor size: {}", text))?;
                parsed.cursor_size = Some(size);
            }
            "--hide-cursor" => {
                parsed.hide_cursor = true;
            }
            "--palette" => {
                parsed.palette = true;
            }
            "-i" | "--info" => {
                parsed.info = true;
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

fn init_logging(config: &FileConfig) {
    let log_path = config.log_path();

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Logging settings live in the config, so report a bad file once the
    // subscriber is up
    let (config, config_error) = match FileConfig::try_load() {
        Ok(config) => (config, None),
        Err(e) => (FileConfig::default(), Some(e)),
    };
    init_logging(&config);

    info!("wtconsole starting...");
    if let Some(e) = config_error {
        warn!("Ignoring config file: {}", e);
        eprintln!("Warning: {}", e);
    }

    #[cfg(windows)]
    {
        run(wtconsole::Win32Console::new(), &args, &config)?;
    }

    #[cfg(not(windows))]
    {
        eprintln!("wtconsole drives the Windows console API.");
        eprintln!("Running against a simulated 80x25 console...");
        let device = wtconsole::MemoryConsole::new(80, 25);
        run(device.clone(), &args, &config)?;
        print_device(&device);
    }

    Ok(())
}

/// Apply the requested changes inside one session
fn run<P: ConsolePort>(port: P, args: &Args, config: &FileConfig) -> anyhow::Result<()> {
    let stream = args.stream.unwrap_or(config.stream);
    let title = args.title.as_ref().or(config.title.as_ref());
    let foreground = args.foreground.as_ref().or(config.colors.foreground.as_ref());
    let background = args.background.as_ref().or(config.colors.background.as_ref());
    let fill = args.fill_char.unwrap_or(config.fill_char);

    info!("Stream: {}", stream);

    let result = Session::scoped(port, stream, |console| {
        if args.info {
            let screen = console.get_screen_info()?;
            let cursor = console.get_cursor_state()?;
            println!("Buffer size:     {}x{}", screen.size.x, screen.size.y);
            println!(
                "Window:          ({}, {}) - ({}, {})",
                screen.window.left, screen.window.top, screen.window.right, screen.window.bottom
            );
            println!(
                "Max window:      {}x{}",
                screen.maximum_window_size.x, screen.maximum_window_size.y
            );
            println!("Cursor:          ({}, {})", screen.cursor_position.x, screen.cursor_position.y);
            println!("Cursor size:     {} (visible: {})", cursor.size, cursor.visible);
            let colors = ColorAttribute::from(screen.attributes);
            println!(
                "Attributes:      0x{:04X} ({} on {})",
                screen.attributes.raw(),
                colors.foreground,
                colors.background
            );
        }

        if let Some(title) = title {
            console.set_title(title)?;
        }

        if args.cursor_size.is_some() || args.hide_cursor {
            let current = console.get_cursor_state()?;
            let size = args.cursor_size.unwrap_or(current.size);
            console.set_cursor_state(size, !args.hide_cursor)?;
        } else if let Some(cursor) = config.cursor {
            console.set_cursor_state(cursor.size, cursor.visible)?;
        }

        if foreground.is_some() || background.is_some() {
            let current = ColorAttribute::from(console.get_screen_info()?.attributes);
            let fg = foreground.map_or(current.foreground.name(), String::as_str);
            let bg = background.map_or(current.background.name(), String::as_str);
            console.set_text_color(fg, bg)?;
        }

        if args.clear {
            console.clear_screen(fill)?;
        }

        if args.palette {
            let background = ColorAttribute::from(console.get_screen_info()?.attributes).background;
            for color in Color::ALL {
                console.set_colors(ColorAttribute::new(color, background))?;
                println!("{:>2}  {}", color.code(), color);
            }
        } else if foreground.is_some() || background.is_some() {
            println!("wtconsole {}", VERSION);
        }

        let _ = std::io::stdout().flush();
        Ok(())
    });

    if let Err(e) = &result {
        error!("Session failed: {}", e);
    } else {
        info!("Session closed, console state restored");
    }
    Ok(result?)
}

/// Dump the simulated console after the session
#[cfg(not(windows))]
fn print_device(device: &wtconsole::MemoryConsole) {
    use wtconsole::Position;

    let cursor = device.cursor();
    let pos: Position = device.cursor_position();
    println!();
    println!("Simulated console after session:");
    println!("  title:     {:?}", device.title());
    println!("  cursor:    ({}, {}) size {} visible {}", pos.x, pos.y, cursor.size, cursor.visible);
    println!("  attribute: 0x{:04X}", device.text_attribute().raw());
    println!("  row 0:     {:?}", device.row_text(0));
}
