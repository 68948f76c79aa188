// Avro to macOS Keylayout CLI
// Reads an Avro .avrolayout file and writes the equivalent .keylayout file

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use keylayout_core::{convert, LayoutOptions};

/// Avro .avrolayout to macOS .keylayout converter
#[derive(Parser, Debug)]
#[command(name = "avro2keylayout")]
#[command(version)]
#[command(about = "Convert an Avro .avrolayout file to a macOS .keylayout file", long_about = None)]
struct Args {
    /// Path to the source .avrolayout file
    input: PathBuf,

    /// Path of the .keylayout file to write (parent directories are created)
    output: PathBuf,

    /// Layout name shown in the macOS input source menu
    #[arg(long, default_value = "UniJoyMac")]
    layout_name: String,

    /// Keyboard id (negative values are reserved for custom layouts)
    #[arg(long, default_value_t = -8801, allow_negative_numbers = true)]
    keyboard_id: i32,

    /// Keyboard script group id
    #[arg(long, default_value_t = 126, allow_negative_numbers = true)]
    group: i32,
}

impl Args {
    fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            name: self.layout_name.clone(),
            keyboard_id: self.keyboard_id,
            group: self.group,
        }
    }
}

/// Write the generated layout, creating missing parent directories
fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn run(args: &Args) -> Result<()> {
    log::debug!("Reading {}", args.input.display());
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let keylayout = convert(&source, &args.layout_options())
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    write_output(&args.output, &keylayout)?;
    log::info!("Wrote {}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    run(&args)
}
