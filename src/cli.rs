//! Command line parsing for the `stackfall` binary

use anyhow::{anyhow, Result};

use crate::types::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Autoplay a session and print the result
    Play,
    /// Print stored game records
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub mode: Mode,
    pub seed: Option<u32>,
    /// Stop after this many pieces have been placed
    pub pieces: u32,
    pub difficulty: Option<Difficulty>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            mode: Mode::Play,
            seed: None,
            pieces: 500,
            difficulty: None,
        }
    }
}

/// Parse arguments (without the program name)
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut i = 0usize;

    match args.first().map(String::as_str) {
        Some("play") => i = 1,
        Some("history") => {
            parsed.mode = Mode::History;
            i = 1;
        }
        _ => {}
    }

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --seed"))?;
                parsed.seed = Some(
                    v.parse::<u32>()
                        .map_err(|_| anyhow!("invalid --seed value: {}", v))?,
                );
            }
            "--pieces" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --pieces"))?;
                parsed.pieces = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --pieces value: {}", v))?;
            }
            "--difficulty" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --difficulty"))?;
                parsed.difficulty = Some(
                    Difficulty::from_str(v)
                        .ok_or_else(|| anyhow!("invalid --difficulty value: {}", v))?,
                );
            }
            other => {
                return Err(anyhow!("unknown argument: {}", other));
            }
        }
        i += 1;
    }

    Ok(parsed)
}
