use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use crate::config::{self, RmsdConfig, RocConfig, ScoreFields};
use crate::data_handling::rmsd_log::RmsdGrammar;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Post-processing of docking runs: ROC/AUC of scoring functions and RMSD convergence over exhaustiveness."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare Vinardo, CNNaffinity and their rank-sum consensus by ROC/AUC.
    Roc(RocArgs),
    /// Collect per-exhaustiveness RMSD logs and plot pose convergence.
    Rmsd(RmsdArgs),
}

#[derive(Args, Debug)]
pub struct RocArgs {
    /// Scored SD file (gzip-compressed when it ends in .gz).
    #[arg(short, long, default_value = config::DEFAULT_SDF, value_name = "PATH")]
    pub input: PathBuf,

    /// Output ROC figure.
    #[arg(short, long, default_value = config::DEFAULT_ROC_PLOT, value_name = "PATH")]
    pub output: PathBuf,

    /// AUC table; defaults to auc_values.csv next to the figure.
    #[arg(long, value_name = "PATH")]
    pub auc_csv: Option<PathBuf>,

    /// Also export the parsed score table.
    #[arg(long, value_name = "PATH")]
    pub scores_csv: Option<PathBuf>,

    /// Case-sensitive substring marking an identifier as a true active.
    #[arg(long, default_value = config::DEFAULT_ACTIVE_MARKER, value_name = "TEXT")]
    pub active_marker: String,

    /// SD data item holding the physics-based score.
    #[arg(long, default_value = "minimizedAffinity", value_name = "NAME")]
    pub physics_field: String,

    /// SD data item holding the learned affinity.
    #[arg(long, default_value = "CNNaffinity", value_name = "NAME")]
    pub affinity_field: String,

    /// SD data item holding the learned pose probability.
    #[arg(long, default_value = "CNNscore", value_name = "NAME")]
    pub probability_field: String,
}

#[derive(Args, Debug)]
pub struct RmsdArgs {
    /// Directory containing one sub-directory per exhaustiveness level.
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub base_dir: PathBuf,

    /// Exhaustiveness levels, in panel order.
    #[arg(long, value_delimiter = ',', default_values_t = config::DEFAULT_LEVELS, value_name = "LIST")]
    pub levels: Vec<u32>,

    /// Line grammar of rmsd.dat.
    #[arg(long, value_enum, default_value_t = RmsdGrammar::V2)]
    pub grammar: RmsdGrammar,

    /// Output convergence figure.
    #[arg(short, long, default_value = config::DEFAULT_RMSD_PLOT, value_name = "PATH")]
    pub output: PathBuf,

    /// JSON summary; defaults to rmsd_summary.json next to the figure.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,
}

impl From<RocArgs> for RocConfig {
    fn from(args: RocArgs) -> Self {
        let auc_table = args
            .auc_csv
            .unwrap_or_else(|| config::sibling_of(&args.output, config::DEFAULT_AUC_TABLE));
        RocConfig {
            input: args.input,
            output: args.output,
            auc_table,
            score_table: args.scores_csv,
            active_marker: args.active_marker,
            fields: ScoreFields {
                physics: args.physics_field,
                affinity: args.affinity_field,
                probability: args.probability_field,
            },
        }
    }
}

impl From<RmsdArgs> for RmsdConfig {
    fn from(args: RmsdArgs) -> Self {
        let summary = args
            .summary
            .unwrap_or_else(|| config::sibling_of(&args.output, config::DEFAULT_RMSD_SUMMARY));
        let mut levels: Vec<u32> = Vec::with_capacity(args.levels.len());
        for level in args.levels {
            if levels.contains(&level) {
                warn!("Exhaustiveness level {} is listed more than once; using it once", level);
            } else {
                levels.push(level);
            }
        }
        RmsdConfig {
            base_dir: args.base_dir,
            levels,
            grammar: args.grammar,
            output: args.output,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_defaults_match_reference_script() {
        let cli = Cli::try_parse_from(["dock_evaluator", "roc"]).unwrap();
        let Commands::Roc(args) = cli.command else {
            panic!("expected roc subcommand");
        };
        let config = RocConfig::from(args);
        assert_eq!(config.input, PathBuf::from("gnina_scored_vinardo.sdf.gz"));
        assert_eq!(config.output, PathBuf::from("AUC.png"));
        assert_eq!(config.auc_table, PathBuf::from("auc_values.csv"));
        assert_eq!(config.active_marker, "active");
        assert_eq!(config.fields, ScoreFields::default());
    }

    #[test]
    fn rmsd_levels_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "dock_evaluator",
            "rmsd",
            "--levels",
            "4,8",
            "--grammar",
            "v1",
            "--output",
            "figs/conv.png",
        ])
        .unwrap();
        let Commands::Rmsd(args) = cli.command else {
            panic!("expected rmsd subcommand");
        };
        let config = RmsdConfig::from(args);
        assert_eq!(config.levels, vec![4, 8]);
        assert_eq!(config.grammar, RmsdGrammar::V1);
        assert_eq!(config.summary, PathBuf::from("figs/rmsd_summary.json"));
    }

    #[test]
    fn repeated_levels_are_kept_once_in_first_order() {
        let cli =
            Cli::try_parse_from(["dock_evaluator", "rmsd", "--levels", "16,8,16,8,24"]).unwrap();
        let Commands::Rmsd(args) = cli.command else {
            panic!("expected rmsd subcommand");
        };
        assert_eq!(RmsdConfig::from(args).levels, vec![16, 8, 24]);
    }

    #[test]
    fn rmsd_default_levels() {
        let cli = Cli::try_parse_from(["dock_evaluator", "rmsd"]).unwrap();
        let Commands::Rmsd(args) = cli.command else {
            panic!("expected rmsd subcommand");
        };
        assert_eq!(args.levels, vec![8, 16, 24, 32]);
        assert_eq!(args.grammar, RmsdGrammar::V2);
    }
}
