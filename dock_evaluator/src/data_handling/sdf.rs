//! Streaming reader for scored SD files as written by the docking run
//! (`gnina --score_only` / `--minimize` output, usually gzip-compressed).
//!
//! Only what scoring needs is parsed: the title line of each molblock and its
//! `> <Name>` data items. Coordinates are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::config::ScoreFields;
use crate::data_handling::labeling::ActivityLabeler;
use crate::error::{EvalError, Result};
use crate::models::ScoreRecord;

const RECORD_END: &str = "$$$$";
const CTAB_END: &str = "M  END";

/// One molblock reduced to its title and data items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdfRecord {
    pub title: String,
    pub data: HashMap<String, String>,
}

impl SdfRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).map(String::as_str)
    }

    fn from_lines(lines: &[String]) -> Self {
        let title = lines.first().map(|l| l.trim().to_string()).unwrap_or_default();

        // Data items follow the connection table; without an `M  END` marker
        // everything after the title is scanned.
        let data_start = lines
            .iter()
            .position(|l| l.trim_end() == CTAB_END)
            .map(|i| i + 1)
            .unwrap_or(1);

        let mut data = HashMap::new();
        let mut i = data_start;
        while i < lines.len() {
            let Some(name) = data_item_name(&lines[i]) else {
                i += 1;
                continue;
            };
            i += 1;
            let mut value = Vec::new();
            while i < lines.len() && !lines[i].trim().is_empty() {
                value.push(lines[i].trim_end());
                i += 1;
            }
            data.insert(name.to_string(), value.join("\n"));
        }

        SdfRecord { title, data }
    }
}

/// `>  <CNNscore>  (1)` -> `CNNscore`
fn data_item_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    let open = rest.find('<')?;
    let tail = &rest[open + 1..];
    let close = tail.find('>')?;
    Some(&tail[..close])
}

/// Lazy iterator over the molblocks of an SD stream.
pub struct SdfRecords<R> {
    lines: Lines<R>,
    path: PathBuf,
    finished: bool,
}

impl<R: BufRead> SdfRecords<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            path: path.into(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for SdfRecords<R> {
    type Item = Result<SdfRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut block = Vec::new();
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if line.trim_end() == RECORD_END {
                        return Some(Ok(SdfRecord::from_lines(&block)));
                    }
                    block.push(line);
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(EvalError::io(&self.path, e)));
                }
                None => {
                    self.finished = true;
                    if block.iter().all(|l| l.trim().is_empty()) {
                        return None;
                    }
                    // Last record without a terminator.
                    return Some(Ok(SdfRecord::from_lines(&block)));
                }
            }
        }
    }
}

/// Opens an SD file, transparently decompressing `.gz` inputs.
pub fn open_sdf(path: &Path) -> Result<SdfRecords<Box<dyn BufRead>>> {
    let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let reader: Box<dyn BufRead> = if gzipped {
        debug!("Reading {} as gzip", path.display());
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(SdfRecords::new(reader, path))
}

/// Turns SD records into [`ScoreRecord`]s, failing on the first record with a
/// missing or non-numeric score.
pub struct ScoreRecordReader<R, L> {
    records: SdfRecords<R>,
    fields: ScoreFields,
    labeler: L,
    count: usize,
}

impl<L: ActivityLabeler> ScoreRecordReader<Box<dyn BufRead>, L> {
    pub fn open(path: &Path, fields: ScoreFields, labeler: L) -> Result<Self> {
        Ok(Self::new(open_sdf(path)?, fields, labeler))
    }
}

impl<R: BufRead, L: ActivityLabeler> ScoreRecordReader<R, L> {
    pub fn new(records: SdfRecords<R>, fields: ScoreFields, labeler: L) -> Self {
        Self {
            records,
            fields,
            labeler,
            count: 0,
        }
    }

    fn convert(&self, record: SdfRecord) -> Result<ScoreRecord> {
        let score_a = self.score(&record, &self.fields.physics)?;
        let score_b = self.score(&record, &self.fields.affinity)?;
        let score_c = self.score(&record, &self.fields.probability)?;
        let label = self.labeler.is_active(&record.title);
        Ok(ScoreRecord {
            identifier: record.title,
            score_a,
            score_b,
            score_c,
            label,
        })
    }

    fn score(&self, record: &SdfRecord, field: &str) -> Result<f64> {
        let raw = record.field(field).ok_or_else(|| EvalError::MissingField {
            record: self.count,
            title: record.title.clone(),
            field: field.to_string(),
        })?;
        let token = raw.lines().next().unwrap_or("").trim();
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| EvalError::InvalidField {
                record: self.count,
                title: record.title.clone(),
                field: field.to_string(),
                value: raw.to_string(),
            })
    }
}

impl<R: BufRead, L: ActivityLabeler> Iterator for ScoreRecordReader<R, L> {
    type Item = Result<ScoreRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        self.count += 1;
        Some(self.convert(record))
    }
}

/// Reads every scored molecule of `path`; an input without records is an error.
pub fn read_score_records<L: ActivityLabeler>(
    path: &Path,
    fields: &ScoreFields,
    labeler: L,
) -> Result<Vec<ScoreRecord>> {
    info!("Reading scored molecules from {}", path.display());
    let records = ScoreRecordReader::open(path, fields.clone(), labeler)?
        .collect::<Result<Vec<_>>>()?;
    if records.is_empty() {
        return Err(EvalError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    let actives = records.iter().filter(|r| r.label).count();
    info!(
        "Read {} molecules ({} actives, {} decoys)",
        records.len(),
        actives,
        records.len() - actives
    );
    Ok(records)
}
