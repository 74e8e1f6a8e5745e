//! Rank-sum consensus of the physics score and the learned affinity.
//!
//! Ranks are 1-based and ascending. Tied values share the mean of the ranks
//! they occupy, so the result never depends on input order.

use polars::prelude::*;

use crate::models::ScoreRecord;

pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}

/// `rank(score_b) + rank(-score_a)`; higher means more likely active.
pub fn consensus_scores(records: &[ScoreRecord]) -> Vec<f64> {
    let affinity: Vec<f64> = records.iter().map(|r| r.score_b).collect();
    let physics: Vec<f64> = records.iter().map(|r| -r.score_a).collect();
    average_ranks(&affinity)
        .into_iter()
        .zip(average_ranks(&physics))
        .map(|(a, b)| a + b)
        .collect()
}

/// The parsed scores as a table, one row per molecule.
pub fn score_table(records: &[ScoreRecord], consensus: &[f64]) -> PolarsResult<DataFrame> {
    let titles: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
    let cnn_score: Vec<f64> = records.iter().map(|r| r.score_c).collect();
    let cnn_affinity: Vec<f64> = records.iter().map(|r| r.score_b).collect();
    let vinardo: Vec<f64> = records.iter().map(|r| r.score_a).collect();
    let labels: Vec<bool> = records.iter().map(|r| r.label).collect();

    DataFrame::new(vec![
        Column::from(Series::new(PlSmallStr::from("title"), titles)),
        Column::from(Series::new(PlSmallStr::from("CNNscore"), cnn_score)),
        Column::from(Series::new(PlSmallStr::from("CNNaffinity"), cnn_affinity)),
        Column::from(Series::new(PlSmallStr::from("Vinardo"), vinardo)),
        Column::from(Series::new(PlSmallStr::from("label"), labels)),
        Column::from(Series::new(PlSmallStr::from("consensus"), consensus.to_vec())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, score_a: f64, score_b: f64) -> ScoreRecord {
        ScoreRecord {
            identifier: id.to_string(),
            score_a,
            score_b,
            score_c: 0.5,
            label: id.contains("active"),
        }
    }

    #[test]
    fn ties_share_average_rank() {
        assert_eq!(average_ranks(&[3.0, 1.0, 3.0, 2.0]), vec![3.5, 1.0, 3.5, 2.0]);
        assert_eq!(average_ranks(&[7.0, 7.0, 7.0]), vec![2.0, 2.0, 2.0]);
        assert!(average_ranks(&[]).is_empty());
    }

    #[test]
    fn consensus_rewards_low_physics_and_high_affinity() {
        let records = vec![
            record("a_active", -10.0, 8.0),
            record("b", -5.0, 3.0),
            record("c", -7.0, 5.0),
        ];
        assert_eq!(consensus_scores(&records), vec![6.0, 2.0, 4.0]);
    }

    #[test]
    fn consensus_is_invariant_to_monotonic_rescaling() {
        let records = vec![
            record("a", -9.3, 6.1),
            record("b", -4.2, 2.2),
            record("c", -7.7, 6.1),
            record("d", -8.0, 4.9),
        ];
        let rescaled: Vec<ScoreRecord> = records
            .iter()
            .map(|r| ScoreRecord {
                score_a: 3.0 * r.score_a - 1.0,
                score_b: r.score_b.exp(),
                ..r.clone()
            })
            .collect();
        assert_eq!(consensus_scores(&records), consensus_scores(&rescaled));
    }

    #[test]
    fn score_table_has_one_row_per_record() {
        let records = vec![record("a_active", -9.0, 6.0), record("b", -5.0, 4.0)];
        let consensus = consensus_scores(&records);
        let df = score_table(&records, &consensus).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
    }
}
