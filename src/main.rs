//! conkey - print console key events until Esc

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use conkey::{Config, Key, Keyboard};
use log::{info, warn};

/// Print help message
fn print_help() {
    println!(
        r#"conkey {} - console keyboard capture demo

USAGE:
    conkey [OPTIONS] [CONFIG]

OPTIONS:
    -h, --help       Print this help message
    -V, --version    Print version information
    -1, --single     Read a single key and exit

ARGS:
    CONFIG           Config file (default: ~/.config/conkey/config.toml)

Press Esc to quit. Set RUST_LOG=debug for pump diagnostics.
"#,
        env!("CARGO_PKG_VERSION")
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("conkey {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let single = args.iter().any(|a| a == "--single" || a == "-1");

    let config = match args.iter().find(|a| !a.starts_with('-')) {
        Some(path) => Config::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => Config::load(),
    };

    let mut keyboard = Keyboard::with_config(config);

    if single {
        let event = keyboard.get_single_key().context("Failed to read key")?;
        match event {
            Some(event) => println!("{}", event),
            None => println!("(interrupted)"),
        }
        return Ok(());
    }

    keyboard.open().context("Failed to open console input")?;
    info!("Press Esc to quit");

    let mut out = std::io::stdout();
    loop {
        let event = match keyboard.get_key() {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                if matches!(e, conkey::Error::Disconnected | conkey::Error::TooManyErrors(_)) {
                    break;
                }
                continue;
            }
        };

        // Raw mode: no output post-processing, so end lines with CR LF
        write!(out, "{:<16} {:?}\r\n", event.to_string(), event)?;
        out.flush()?;

        if event.key == Some(Key::Esc) {
            break;
        }
    }

    keyboard.close();
    Ok(())
}
