use crate::models::{GlobalMinimum, RmsdSeries};

/// Smallest RMSD over every level, or `None` when nothing was parsed.
///
/// Ties resolve to the earliest level in configured order, then to the
/// earliest pose within that level.
pub fn locate_global_minimum(series: &RmsdSeries) -> Option<GlobalMinimum> {
    series
        .observations()
        .fold(None, |best: Option<GlobalMinimum>, obs| match best {
            Some(b) if b.rmsd <= obs.rmsd => Some(b),
            _ => Some(obs.into()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LevelData;

    fn series(levels: Vec<(u32, LevelData)>) -> RmsdSeries {
        levels.into_iter().collect()
    }

    #[test]
    fn finds_minimum_across_levels() {
        let s = series(vec![
            (8, LevelData::Present(vec![2.1, 0.9, 3.0])),
            (16, LevelData::Present(vec![1.5, 0.4])),
        ]);
        assert_eq!(
            locate_global_minimum(&s),
            Some(GlobalMinimum {
                level: 16,
                pose_index: 1,
                rmsd: 0.4
            })
        );
    }

    #[test]
    fn ties_prefer_first_level_then_first_pose() {
        let s = series(vec![
            (24, LevelData::Present(vec![1.0, 0.5, 0.5])),
            (8, LevelData::Present(vec![0.5])),
        ]);
        let min = locate_global_minimum(&s).unwrap();
        assert_eq!((min.level, min.pose_index), (24, 1));
    }

    #[test]
    fn missing_and_empty_levels_are_skipped() {
        let s = series(vec![
            (8, LevelData::Missing),
            (16, LevelData::Present(vec![])),
            (32, LevelData::Present(vec![3.2, 2.7])),
        ]);
        let min = locate_global_minimum(&s).unwrap();
        assert_eq!((min.level, min.pose_index, min.rmsd), (32, 1, 2.7));
    }

    #[test]
    fn nothing_collected_is_none() {
        let s = series(vec![(8, LevelData::Missing), (16, LevelData::Present(vec![]))]);
        assert_eq!(locate_global_minimum(&s), None);
        assert_eq!(locate_global_minimum(&RmsdSeries::new()), None);
    }
}
