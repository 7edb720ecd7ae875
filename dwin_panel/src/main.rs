/*!
# DWIN Panel Application

Drives a DWIN T5UIC1 display attached to a serial port: connects with the
handshake, then draws one of the built-in screens.

## Usage

### Demo screen
```bash
dwin_panel --port /dev/ttyUSB0 demo
```

### Clock (runs until Ctrl+C)
```bash
dwin_panel --config panel.toml clock
```

### Dry run (no hardware, frames logged as hex)
```bash
dwin_panel --dry-run demo
```
*/

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use clap::{Parser, Subcommand};
use crossbeam_channel::bounded;
use dwin_protocol::protocol::opcode;
use dwin_protocol::session::wire_frame;
use dwin_protocol::{Channel, MemoryChannel, Session};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod screens;
mod serial;

use config::AppConfig;
use serial::SerialChannel;

#[derive(Parser)]
#[command(name = "dwin_panel")]
#[command(about = "Drive a DWIN T5UIC1 printer display over a serial port")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "dwin_panel.toml")]
    config: PathBuf,

    /// Serial port, overrides the config file
    #[arg(short, long)]
    port: Option<String>,

    /// Talk to an in-memory display and log every frame instead
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the test screen
    Demo,

    /// Show a live clock until Ctrl+C
    Clock,

    /// Set the backlight level (0-255, floored at 31)
    Backlight {
        level: i32,
    },

    /// Clear the screen to an RGB565 colour given as 4 hex digits
    Clear {
        #[arg(default_value = "0841")]
        color: String,
    },

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "dwin_panel.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Log to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Commands::Config { output } = &cli.command {
        return generate_config_file(output);
    }

    let mut config = if cli.config.exists() {
        AppConfig::load_from_file(&cli.config)?
    } else {
        debug!("No config at {}, using defaults", cli.config.display());
        AppConfig::new()
    };
    if let Some(port) = cli.port {
        config.serial.port = port;
    }

    if cli.dry_run {
        let request = wire_frame(&[opcode::HANDSHAKE], config.session.frame_header);
        let wire = MemoryChannel::new().with_reply(&request, &[0xAA, 0x00, b'O', b'K']);
        let session = Session::connect(wire.clone(), config.session.clone())?;
        run_command(&session, &cli.command, &config)?;
        drop(session);

        for frame in wire.writes() {
            println!("{}", hex::encode(frame));
        }
        info!("✅ Dry run wrote {} bytes", wire.written().len());
        return Ok(());
    }

    let channel = SerialChannel::open(&config.serial, config.session.write_timeout())?;
    let session = Session::connect(channel, config.session.clone())?;
    info!("✅ Connected to display on {}", config.serial.port);

    run_command(&session, &cli.command, &config)?;
    Ok(())
}

/// Execute one subcommand against a connected session
fn run_command<C: Channel>(
    session: &Session<C>,
    command: &Commands,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Demo => screens::demo(session, &config.panel)?,

        Commands::Clock => {
            // Dropping the sender disconnects the channel and wakes every receiver.
            let (tx, rx) = bounded::<()>(0);
            let sender = Mutex::new(Some(tx));
            ctrlc::set_handler(move || {
                eprintln!("\n🛑 Received Ctrl+C, shutting down gracefully...");
                if let Ok(mut slot) = sender.lock() {
                    slot.take();
                }
            })?;
            screens::clock(session, &config.panel, rx)?;
        }

        Commands::Backlight { level } => {
            session.set_backlight(*level)?;
            println!("💡 Backlight set");
        }

        Commands::Clear { color } => {
            let color = parse_color(color)?;
            session.clear(color)?;
            session.refresh()?;
        }

        Commands::Config { .. } => {}
    }
    Ok(())
}

/// Parse an RGB565 colour such as `F800` or `0xF800`
fn parse_color(text: &str) -> Result<u16, hex::FromHexError> {
    let digits = text.trim_start_matches("0x");
    let mut bytes = [0u8; 2];
    hex::decode_to_slice(digits, &mut bytes)?;
    Ok(u16::from_be_bytes(bytes))
}

/// Generate a default configuration file
fn generate_config_file(output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new();
    config.save_to_file(output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   dwin_panel --config {} demo", output_path.display());

    Ok(())
}
