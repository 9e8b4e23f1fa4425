use clap::{ArgMatches, Parser};
use session::TextChange;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "contenta")]
#[command(version = "0.1")]
#[command(about = "Edit a .cscr script as flat text")]
pub struct Cli {
    /// Write a fresh starter script to PATH before opening it
    #[arg(long)]
    pub new: bool,

    /// Print the outline instead of the flat text
    #[arg(long)]
    pub outline: bool,

    /// Insert TEXT at char position POS of the flat text
    #[arg(long = "insert", value_name = "POS=TEXT", value_parser = parse_insert)]
    pub inserts: Vec<TextChange>,

    /// Delete COUNT chars starting at char position POS
    #[arg(long = "delete", value_name = "POS:COUNT", value_parser = parse_delete)]
    pub deletes: Vec<TextChange>,

    /// Milliseconds of quiet before a burst of changes is reconciled
    #[arg(long, env = "CONTENTA_DEBOUNCE_MS", default_value_t = 300)]
    pub debounce_ms: u64,

    /// Script file
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

impl Cli {
    /// Inserts and deletes interleaved in the order they were given.
    pub fn changes(&self, matches: &ArgMatches) -> Vec<TextChange> {
        let mut indexed: Vec<(usize, &TextChange)> = Vec::new();
        for (id, values) in [("inserts", &self.inserts), ("deletes", &self.deletes)] {
            if let Some(indices) = matches.indices_of(id) {
                indexed.extend(indices.zip(values));
            }
        }
        indexed.sort_by_key(|(at, _)| *at);
        indexed.into_iter().map(|(_, change)| change.clone()).collect()
    }
}

fn parse_position(raw: &str) -> Result<usize, String> {
    raw.parse()
        .map_err(|_| format!("{raw:?} is not a char position"))
}

fn parse_insert(value: &str) -> Result<TextChange, String> {
    let (pos, text) = value
        .split_once('=')
        .ok_or_else(|| "expected POS=TEXT".to_string())?;
    Ok(TextChange::insert(parse_position(pos)?, text))
}

fn parse_delete(value: &str) -> Result<TextChange, String> {
    let (pos, count) = value
        .split_once(':')
        .ok_or_else(|| "expected POS:COUNT".to_string())?;
    Ok(TextChange::delete(parse_position(pos)?, parse_position(count)?))
}
