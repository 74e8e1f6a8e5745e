use std::path::{Path, PathBuf};

use crate::data_handling::rmsd_log::RmsdGrammar;

pub const DEFAULT_SDF: &str = "gnina_scored_vinardo.sdf.gz";
pub const DEFAULT_ROC_PLOT: &str = "AUC.png";
pub const DEFAULT_AUC_TABLE: &str = "auc_values.csv";
pub const DEFAULT_ACTIVE_MARKER: &str = "active";

pub const DEFAULT_LEVELS: [u32; 4] = [8, 16, 24, 32];
pub const RMSD_FILE_NAME: &str = "rmsd.dat";
pub const DEFAULT_RMSD_PLOT: &str = "rmsd_pose_distribution_subplots.png";
pub const DEFAULT_RMSD_SUMMARY: &str = "rmsd_summary.json";

/// SD data-item names carrying the three scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreFields {
    pub physics: String,
    pub affinity: String,
    pub probability: String,
}

impl Default for ScoreFields {
    fn default() -> Self {
        Self {
            physics: "minimizedAffinity".to_string(),
            affinity: "CNNaffinity".to_string(),
            probability: "CNNscore".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RocConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub auc_table: PathBuf,
    pub score_table: Option<PathBuf>,
    pub active_marker: String,
    pub fields: ScoreFields,
}

impl Default for RocConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_SDF),
            output: PathBuf::from(DEFAULT_ROC_PLOT),
            auc_table: PathBuf::from(DEFAULT_AUC_TABLE),
            score_table: None,
            active_marker: DEFAULT_ACTIVE_MARKER.to_string(),
            fields: ScoreFields::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RmsdConfig {
    pub base_dir: PathBuf,
    pub levels: Vec<u32>,
    pub grammar: RmsdGrammar,
    pub output: PathBuf,
    pub summary: PathBuf,
}

impl RmsdConfig {
    /// `{base_dir}/{level}/rmsd.dat`
    pub fn log_path(&self, level: u32) -> PathBuf {
        self.base_dir.join(level.to_string()).join(RMSD_FILE_NAME)
    }
}

impl Default for RmsdConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            levels: DEFAULT_LEVELS.to_vec(),
            grammar: RmsdGrammar::default(),
            output: PathBuf::from(DEFAULT_RMSD_PLOT),
            summary: PathBuf::from(DEFAULT_RMSD_SUMMARY),
        }
    }
}

/// Places a default side file next to the main output.
pub fn sibling_of(output: &Path, file_name: &str) -> PathBuf {
    match output.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_follows_level_layout() {
        let config = RmsdConfig {
            base_dir: PathBuf::from("runs"),
            ..RmsdConfig::default()
        };
        assert_eq!(config.log_path(16), PathBuf::from("runs/16/rmsd.dat"));
    }

    #[test]
    fn sibling_of_bare_file_stays_in_cwd() {
        assert_eq!(sibling_of(Path::new("AUC.png"), "auc_values.csv"), PathBuf::from("auc_values.csv"));
        assert_eq!(
            sibling_of(Path::new("out/AUC.png"), "auc_values.csv"),
            PathBuf::from("out/auc_values.csv")
        );
    }

    #[test]
    fn defaults_reproduce_reference_layout() {
        let roc = RocConfig::default();
        assert_eq!(roc.output, PathBuf::from("AUC.png"));
        assert_eq!(roc.fields.physics, "minimizedAffinity");

        let rmsd = RmsdConfig::default();
        assert_eq!(rmsd.levels, vec![8, 16, 24, 32]);
        assert_eq!(rmsd.grammar, RmsdGrammar::V2);
    }
}
