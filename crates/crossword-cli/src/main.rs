mod game;
mod progress;
mod script;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossword_core::{completion, decode_puz, Direction, Puzzle, PuzzleDocument};
use game::Game;
use log::LevelFilter;
use progress::ProgressStore;
use script::Command;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Convert, inspect and play crossword puzzles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug detail (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Decode a .puz file into the JSON document format
    Convert {
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the grid, numbering and clues of a .puz or .json puzzle
    Show { input: PathBuf },
    /// Check a saved grid (JSON array of rows) against the solution
    Check {
        input: PathBuf,
        /// JSON file: `[["C","A","T"], ...]`
        grid: PathBuf,
    },
    /// Play by feeding input events, one per line
    Play {
        input: PathBuf,
        /// Event script; stdin when omitted
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Where progress is kept
        #[arg(long)]
        progress_dir: Option<PathBuf>,
        /// Ignore saved progress and start over
        #[arg(long)]
        fresh: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = try_main(cli) {
        eprintln!("Error: {e:#}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}

fn try_main(cli: Cli) -> Result<()> {
    match cli.command {
        Action::Convert { input, output } => convert(&input, output.as_deref()),
        Action::Show { input } => show(&load_puzzle(&input)?),
        Action::Check { input, grid } => check(&load_puzzle(&input)?, &grid),
        Action::Play {
            input,
            script,
            progress_dir,
            fresh,
        } => {
            let store = ProgressStore::new(progress_dir.unwrap_or_else(ProgressStore::default_dir));
            play(load_puzzle(&input)?, script.as_deref(), &store, fresh)
        }
    }
}

fn read_document(path: &Path) -> Result<PuzzleDocument> {
    let is_puz = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("puz"));

    if is_puz {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let decoded = decode_puz(&bytes).with_context(|| format!("decoding {}", path.display()))?;
        for issue in &decoded.inconsistencies {
            log::warn!("{}: {issue}", path.display());
        }
        Ok(decoded.document)
    } else {
        let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        PuzzleDocument::from_json(&json).with_context(|| format!("parsing {}", path.display()))
    }
}

fn load_puzzle(path: &Path) -> Result<Puzzle> {
    let document = read_document(path)?;
    Puzzle::load(&document).with_context(|| format!("loading {}", path.display()))
}

fn convert(input: &Path, output: Option<&Path>) -> Result<()> {
    let document = read_document(input)?;
    let json = document.to_json()?;
    match output {
        Some(path) => fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn show(puzzle: &Puzzle) -> Result<()> {
    let grid = puzzle.grid();
    println!("{} by {}", puzzle.title(), puzzle.author());
    if !puzzle.copyright().is_empty() {
        println!("{}", puzzle.copyright());
    }
    println!();

    for row in puzzle.clues().numbers().to_rows().iter().zip(grid.iter_rows()) {
        let line: Vec<String> = row
            .0
            .iter()
            .zip(row.1)
            .map(|(number, cell)| match (number, cell.is_black()) {
                (_, true) => " ##".to_string(),
                (Some(n), false) => format!("{n:>3}"),
                (None, false) => "  .".to_string(),
            })
            .collect();
        println!("{}", line.concat());
    }

    for direction in Direction::all() {
        println!("\n{}", direction.to_string().to_uppercase());
        for entry in puzzle.clues().entries(direction) {
            println!("{:>4}. {}", entry.number, entry.text);
        }
    }

    for issue in puzzle.clues().inconsistencies() {
        log::warn!("{issue}");
    }
    if !puzzle.notes().is_empty() {
        println!("\n{}", puzzle.notes());
    }
    Ok(())
}

fn check(puzzle: &Puzzle, grid_path: &Path) -> Result<()> {
    let json = fs::read_to_string(grid_path).with_context(|| format!("reading {}", grid_path.display()))?;
    let rows: Vec<Vec<String>> =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", grid_path.display()))?;
    let result = completion::check_rows(puzzle.grid(), &rows);
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn play(puzzle: Puzzle, script: Option<&Path>, store: &ProgressStore, fresh: bool) -> Result<()> {
    let mut game = match store.load(&puzzle) {
        Some(saved) if !fresh => {
            log::info!("resuming from {}", store.path_for(&puzzle).display());
            Game::resume(puzzle, saved)
        }
        _ => Game::new(puzzle),
    };

    let reader: Box<dyn BufRead> = match script {
        Some(path) => Box::new(BufReader::new(
            fs::File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => bail!("line {}: {e}", number + 1),
        };

        if command == Command::Save {
            store.save(game.puzzle(), &game.saved())?;
        } else if let Some(reply) = game.apply(&command) {
            println!("{reply}");
        }
    }

    store.save(game.puzzle(), &game.saved())?;
    let status = if game.is_solved() { "solved" } else { "in progress" };
    println!(
        "{status} in {} ({}/{} cells filled)",
        game.elapsed_string(),
        game.session().user_grid().filled_count(),
        game.puzzle().grid().playable_count()
    );
    Ok(())
}
