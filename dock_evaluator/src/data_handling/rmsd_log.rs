//! Reader for the per-exhaustiveness `rmsd.dat` logs.
//!
//! The log lines come from an external RMSD tool and their layout has
//! already changed once, so each accepted layout is a named grammar with its
//! own tests instead of an inline pattern.

use std::io::ErrorKind;
use std::path::Path;

use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RmsdConfig;
use crate::error::{EvalError, Result};
use crate::models::{LevelData, RmsdSeries};

/// Accepted line layouts of `rmsd.dat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RmsdGrammar {
    /// `RMSD <number>`
    V1,
    /// `RMSD <token> <number>`, e.g. `RMSD lig.pdb:docked.pdb 1.4428`
    #[default]
    V2,
}

impl RmsdGrammar {
    pub fn pattern(self) -> &'static str {
        match self {
            RmsdGrammar::V1 => r"RMSD\s+([\d.]+)",
            RmsdGrammar::V2 => r"RMSD\s+\S+\s+([\d.]+)",
        }
    }
}

impl std::fmt::Display for RmsdGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RmsdGrammar::V1 => write!(f, "v1"),
            RmsdGrammar::V2 => write!(f, "v2"),
        }
    }
}

/// Compiled form of an [`RmsdGrammar`].
#[derive(Debug, Clone)]
pub struct RmsdLineParser {
    grammar: RmsdGrammar,
    regex: Regex,
}

impl RmsdLineParser {
    pub fn new(grammar: RmsdGrammar) -> Result<Self> {
        Ok(Self {
            grammar,
            regex: Regex::new(grammar.pattern())?,
        })
    }

    pub fn grammar(&self) -> RmsdGrammar {
        self.grammar
    }

    /// All RMSD values of one line. Captures that are not valid numbers
    /// (`1.2.3`, a lone `.`) are dropped.
    pub fn parse_line<'a>(&'a self, line: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.regex.captures_iter(line).filter_map(|caps| {
            let token = caps.get(1)?.as_str();
            match token.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    debug!("Ignoring unparseable RMSD token '{}'", token);
                    None
                }
            }
        })
    }

    /// Values of a whole log, line by line, in file order.
    pub fn parse(&self, content: &str) -> Vec<f64> {
        content.lines().flat_map(|line| self.parse_line(line)).collect()
    }
}

/// Reads one level's log. A missing file is reported as [`LevelData::Missing`];
/// any other I/O failure is an error. Bytes that are not valid UTF-8 are
/// replaced, so a corrupt line only loses its own values.
pub fn read_level(parser: &RmsdLineParser, path: &Path) -> Result<LevelData> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(LevelData::Present(
            parser.parse(&String::from_utf8_lossy(&bytes)),
        )),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LevelData::Missing),
        Err(e) => Err(EvalError::io(path, e)),
    }
}

/// Reads every configured level, in configured order.
pub fn read_rmsd_logs(config: &RmsdConfig) -> Result<RmsdSeries> {
    let parser = RmsdLineParser::new(config.grammar)?;
    info!("--- Starting RMSD data reading (grammar {}) ---", parser.grammar());

    let mut series = RmsdSeries::new();
    for &level in &config.levels {
        let path = config.log_path(level);
        info!("Processing data from: {} (Exhaustiveness = {})", path.display(), level);

        let data = read_level(&parser, &path)?;
        match &data {
            LevelData::Missing => {
                warn!("RMSD data file not found at {}. Skipping.", path.display());
            }
            LevelData::Present(values) if values.is_empty() => {
                warn!(
                    "Could not find any RMSD values in {} (grammar {}). Panel will be empty.",
                    path.display(),
                    parser.grammar()
                );
            }
            LevelData::Present(values) => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                info!("  -> Found {} poses. Min RMSD: {:.4} Å", values.len(), min);
            }
        }
        series.push(level, data);
    }
    Ok(series)
}
