use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use web_2048::config::GameConfig;
use web_2048::game::{Action, Outcome};
use web_2048::highlight::Highlights;
use web_2048::render::{ignored_line, render_board, status_line};
use web_2048::session::Session;
use web_2048::store::FileStore;

#[derive(Parser, Debug)]
#[command(name = "web-2048", version, about = "Play 2048 in the terminal")]
struct Args {
    /// Optional TOML config (target, four_probability, ...)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed the tile RNG for a reproducible game
    #[arg(long)]
    seed: Option<u64>,
    /// Directory holding the best-score file (defaults to the platform data dir)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Log filter, e.g. "info", "debug"
    #[arg(long, default_value = "warn")]
    log: String,
}

const HELP: &str = "moves: w/a/s/d, h/j/k/l or up/down/left/right; r = reset, c = continue, q = quit";

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log.as_str())).init();

    let config = match &args.config {
        Some(path) => GameConfig::from_toml(path).with_context(|| format!("loading {}", path.display()))?,
        None => GameConfig::default(),
    };
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => directories::ProjectDirs::from("", "", "web-2048")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .context("no data directory available; pass --data-dir")?,
    };
    let store = FileStore::open(data_dir.join("scores.json"))?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session::new(&config, store, rng);

    println!("{HELP}");
    draw(&session, &Highlights::default());
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "?" | "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }
        let action: Action = match input.parse() {
            Ok(action) => action,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        let outcome = session.apply(action);
        if outcome != Outcome::Ignored {
            draw(&session, &Highlights::from_outcome(&outcome));
        } else {
            println!("{}", ignored_line(action, session.state()));
        }
    }
    Ok(())
}

fn draw<S, R>(session: &Session<S, R>, highlights: &Highlights) {
    let state = session.state();
    println!("\n{}", render_board(&state.board(), highlights));
    println!("{}", status_line(state));
    let _ = io::stdout().flush();
}
