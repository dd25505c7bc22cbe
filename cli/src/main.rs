use std::io::{BufRead, Write};

use anyhow::Context;
use clap::Parser;
use cubesweeper_core::{Coord, GameConfig, GameStatus, Session, UncoverOutcome};

use command::{Command, HELP};

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "3D minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Cubes along x
    #[arg(long, default_value_t = 5)]
    width: i64,

    /// Cubes along y
    #[arg(long, default_value_t = 5)]
    height: i64,

    /// Cubes along z
    #[arg(long, default_value_t = 5)]
    depth: i64,

    /// Mines to place, clamped to the number of cubes
    #[arg(short, long, default_value_t = 10)]
    mines: i64,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print a JSON summary of the game on exit
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("seed: {:?}", args.seed);

    let mut session = match args.seed {
        Some(seed) => {
            let config = GameConfig::new(args.width, args.height, args.depth, args.mines)
                .context("Invalid game configuration")?;
            Session::with_seed(config, seed)
        }
        None => Session::new(args.width, args.height, args.depth, args.mines)
            .context("Invalid game configuration")?,
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    play(&mut session, stdin.lock(), stdout.lock())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.summary())?);
    }
    Ok(())
}

fn show_layer(session: &Session, z: Coord, out: &mut impl Write) -> anyhow::Result<()> {
    let layer = session.layer_view(z)?;
    write!(out, "{}", render::render_layer(z, &layer))?;
    Ok(())
}

/// Reads commands until the game ends, input runs out, or the player quits.
fn play(session: &mut Session, input: impl BufRead, mut out: impl Write) -> anyhow::Result<()> {
    let mut layer: Coord = 0;

    writeln!(out, "{}", render::status_line(session))?;
    show_layer(session, layer, &mut out)?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };
        log::debug!("command: {:?}", command);

        match command {
            Command::Uncover(coords) => match session.uncover(coords) {
                Ok(outcome) => {
                    log::debug!("uncover {:?}: {:?}", coords, outcome);
                    if outcome == UncoverOutcome::Flag {
                        writeln!(out, "cube is flagged, unflag it first")?;
                    }
                    if outcome.has_update() {
                        layer = coords.2;
                        show_layer(session, layer, &mut out)?;
                    }
                }
                Err(err) => writeln!(out, "error: {err}")?,
            },
            Command::Flag(coords) => match session.change_flag(coords) {
                Ok(outcome) => {
                    log::debug!("flag {:?}: {:?}", coords, outcome);
                    if outcome.has_update() {
                        layer = coords.2;
                        show_layer(session, layer, &mut out)?;
                    }
                }
                Err(err) => writeln!(out, "error: {err}")?,
            },
            Command::Layer(z) => match session.layer_view(z) {
                Ok(view) => {
                    layer = z;
                    write!(out, "{}", render::render_layer(z, &view))?;
                }
                Err(err) => writeln!(out, "error: {err}")?,
            },
            Command::Status => writeln!(out, "{}", render::status_line(session))?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => break,
        }

        if session.is_finished() {
            match session.status() {
                GameStatus::Won => writeln!(out, "All safe cubes cleared, you won!")?,
                _ => writeln!(out, "Boom, you lost.")?,
            }
            writeln!(out, "{}", render::status_line(session))?;
            break;
        }
    }

    Ok(())
}
