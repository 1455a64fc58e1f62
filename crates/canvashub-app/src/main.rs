//! Command-line front end over file-backed storage.

use canvashub_app::{App, AppError};
use canvashub_core::storage::FileStorage;
use canvashub_core::{Instant, LinkOpener, StorageError};
use clap::{Parser, Subcommand};
use kurbo::{Point, Size};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "canvashub")]
#[command(about = "Inspect and edit a Canvas Hub board")]
#[command(version)]
struct Cli {
    /// Directory holding the board and config (defaults to the platform data dir)
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Viewport size used for camera placement, as WIDTHxHEIGHT
    #[arg(long, value_name = "SIZE", default_value = "1280x800", value_parser = parse_viewport, global = true)]
    viewport: Size,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List envelopes
    List,
    /// Create an envelope, centred in the viewport unless a position is given
    Add {
        #[arg(long, requires = "y", allow_hyphen_values = true)]
        x: Option<f64>,
        #[arg(long, requires = "x", allow_hyphen_values = true)]
        y: Option<f64>,
        /// Title of the new envelope
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete an envelope
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Append envelopes from a legacy groups file
    ImportLegacy { file: PathBuf },
    /// Write the board as a data script
    Export { file: PathBuf },
    /// Replace the board with a data script
    Load { file: PathBuf },
    /// Move the camera back to its home position
    ResetCamera,
    /// Show or change settings
    Config {
        /// Delay between opened team links, in milliseconds
        #[arg(long)]
        delay: Option<String>,
    },
    /// Open the selected team links of an envelope
    Open { id: String },
}

fn parse_viewport(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("invalid width: {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("invalid height: {e}"))?;
    if w <= 0.0 || h <= 0.0 {
        return Err("viewport must be positive".to_string());
    }
    Ok(Size::new(w, h))
}

/// Prints links instead of launching a browser.
struct PrintOpener;

impl LinkOpener for PrintOpener {
    fn open(&mut self, url: &str) {
        println!("{url}");
    }
}

fn prompt(question: &str) -> bool {
    print!("{question} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}

fn run(cli: Cli) -> Result<(), AppError> {
    let storage = match cli.data_dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    log::debug!("Using data directory {}", storage.base_path().display());
    let mut app = App::new(Arc::new(storage), cli.viewport);

    match cli.command {
        Command::List => {
            for env in &app.board().envelopes {
                println!(
                    "{}\t{}\t({}, {})\t{}\t{} members\t{} tags",
                    env.id,
                    env.name,
                    env.x,
                    env.y,
                    if env.is_open { "open" } else { "closed" },
                    env.team.len(),
                    env.tags.len()
                );
            }
        }
        Command::Add { x, y, name } => {
            let position = x.zip(y).map(|(x, y)| Point::new(x, y));
            let id = app.create_envelope(position)?;
            if let Some(name) = name {
                app.edit(|b| b.set_name(&id, name))?;
            }
            println!("{id}");
        }
        Command::Delete { id, yes } => {
            let mut confirm = |question: &str| yes || prompt(question);
            if !app.delete_envelope(&id, &mut confirm)? {
                println!("Nothing deleted");
            }
        }
        Command::ImportLegacy { file } => {
            let text = read_file(&file)?;
            let report = app.import_legacy(&String::from_utf8_lossy(&text))?;
            println!("Imported {} envelopes", report.count());
        }
        Command::Export { file } => {
            let bytes = app.export()?;
            std::fs::write(&file, bytes)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", file.display(), e)))?;
            log::info!("Exported board to {}", file.display());
        }
        Command::Load { file } => {
            let bytes = read_file(&file)?;
            app.load_data(&bytes)?;
            println!("Loaded {} envelopes", app.board().len());
        }
        Command::ResetCamera => app.reset_camera()?,
        Command::Config { delay } => {
            let config = match delay {
                Some(input) => app.write_config(&input)?,
                None => app.config(),
            };
            println!("delay = {} ms", config.delay);
        }
        Command::Open { id } => {
            let queued = app.open_team_links(&id, Instant::now())?;
            log::info!("Opening {} links", queued);
            let mut opener = PrintOpener;
            while let Some(due) = app.next_deadline() {
                let now = Instant::now();
                if due > now {
                    std::thread::sleep(due - now);
                }
                app.tick(Instant::now(), &mut opener)?;
            }
        }
    }
    Ok(())
}

fn read_file(path: &PathBuf) -> Result<Vec<u8>, AppError> {
    std::fs::read(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)).into())
}

fn main() {
    env_logger::init();
    log::info!("Starting Canvas Hub");

    if let Err(e) = run(Cli::parse()) {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
