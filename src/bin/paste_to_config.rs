use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use idm_queue::input::{dedupe_preserving_order, tokenize_paste};
use serde_json::Value;

/// Write pasted links or IDs into a config's `paste_input` array.
#[derive(Parser, Debug)]
#[command(name = "paste-to-config")]
#[command(
    author,
    version,
    about = "Write pasted links/IDs into config.json as a paste_input array"
)]
#[command(group(ArgGroup::new("source").args(["text", "file", "stdin", "clipboard"])))]
struct Args {
    /// Path to the JSON config to update
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Raw pasted text containing URLs/IDs
    #[arg(long)]
    text: Option<String>,

    /// Text file containing URLs/IDs
    #[arg(long)]
    file: Option<PathBuf>,

    /// Read pasted content from stdin (default when input is piped)
    #[arg(long)]
    stdin: bool,

    /// Read pasted content from the system clipboard (default at a terminal)
    #[arg(long)]
    clipboard: bool,

    /// Remove duplicate entries while preserving order
    #[arg(long)]
    dedupe: bool,
}

/// Where the pasted text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Text(String),
    File(PathBuf),
    Stdin,
    Clipboard,
}

impl Source {
    /// Explicit flags win; otherwise piped stdin, else the clipboard.
    fn select(args: &Args, stdin_is_terminal: bool) -> Self {
        if let Some(text) = &args.text {
            Self::Text(text.clone())
        } else if let Some(path) = &args.file {
            Self::File(path.clone())
        } else if args.stdin {
            Self::Stdin
        } else if args.clipboard || stdin_is_terminal {
            Self::Clipboard
        } else {
            Self::Stdin
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.config.exists() {
        bail!("Config file not found: {}", args.config.display());
    }

    let raw = read_raw_input(Source::select(&args, io::stdin().is_terminal()))?;
    let mut entries = tokenize_paste(&raw);
    if entries.is_empty() {
        bail!("No links/IDs found in the provided input");
    }
    if args.dedupe {
        entries = dedupe_preserving_order(entries);
    }

    write_paste_input(&args.config, &entries)?;
    println!(
        "Updated {} with {} item(s) in paste_input",
        args.config.display(),
        entries.len()
    );
    Ok(())
}

fn read_raw_input(source: Source) -> Result<String> {
    match source {
        Source::Text(text) => Ok(text),
        Source::File(path) => {
            if !path.exists() {
                bail!("Input file not found: {}", path.display());
            }
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))
        }
        Source::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
        Source::Clipboard => arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.get_text())
            .context("Failed to read text from the clipboard (use --text, --file or --stdin)"),
    }
}

fn write_paste_input(config_path: &Path, entries: &[String]) -> Result<()> {
    let text = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .with_context(|| format!("Invalid JSON in {}", config_path.display()))?;
    let Some(object) = config.as_object_mut() else {
        bail!("{} root must be a JSON object", config_path.display());
    };
    object.insert(
        "paste_input".to_string(),
        Value::Array(entries.iter().cloned().map(Value::String).collect()),
    );

    let mut body = serde_json::to_string_pretty(&config)?;
    body.push('\n');
    fs::write(config_path, body)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))
}
