mod utils;

use crate::utils::*;

use anyhow::{Context, Result};
use clap::Parser;
use fortune_common::layout::Layout;
use tracing::warn;

use std::{
    io::{IsTerminal, Read, stdin},
    path::PathBuf,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Deal a shuffled game from this seed
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Max states to explore before giving up (unbounded by default)
    #[arg(short = 's', long, value_name = "NUM")]
    max_states: Option<usize>,
    /// Preview initial layout without solving
    #[arg(short, long)]
    preview: bool,
    /// Print the board before every move of the solution
    #[arg(short, long)]
    boards: bool,
    /// Print every search step to stderr
    #[arg(short, long)]
    watch: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
    /// Path to a layout file to solve
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let Cli {
        seed,
        max_states,
        preview,
        boards,
        watch,
        verbose,
        file,
    } = Cli::parse();

    init_logging(verbose);

    let layout = if let Some(file) = file {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read '{}'", file.display()))?;
        Layout::parse(&content).context("Failed to parse layout")?
    } else if let Some(seed) = seed {
        Layout::new_from_seed(seed)
    } else if !stdin().is_terminal() {
        let mut content = String::new();
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        Layout::parse(&content).context("Failed to parse layout")?
    } else {
        let seed: u64 = rand::random();
        println!("Seed: {seed}");
        Layout::new_from_seed(seed)
    };

    layout.validate().context("Invalid layout")?;
    if !layout.is_complete() {
        warn!(cards = layout.card_count(), "layout does not hold the full deck");
    }
    if preview {
        println!("{}", layout.pretty_print());
        return Ok(());
    }

    let transcript = do_solve(&layout, max_states, watch)?;
    println!("{}", format_transcript(&transcript, boards));

    Ok(())
}
