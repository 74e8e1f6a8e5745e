use std::fs::{create_dir_all, File};
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::error::{EvalError, Result};

/// Creates the directory an output file will be written into.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            create_dir_all(dir).map_err(|e| EvalError::io(dir, e))
        }
        _ => Ok(()),
    }
}

pub fn dataframe_to_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path).map_err(|e| EvalError::io(path, e))?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    info!("Table with {} rows saved to: {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn parent_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/out.png");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a/b").is_dir());
        ensure_parent_dir(Path::new("bare.png")).unwrap();
    }

    #[test]
    fn dataframe_is_written_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let mut df = df![
            "signal" => &["Vinardo", "Consensus"],
            "auc" => &[0.5, 0.75],
        ]
        .unwrap();
        dataframe_to_csv(&mut df, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("signal,auc\n"));
        assert!(text.contains("Consensus,0.75"));
    }
}
