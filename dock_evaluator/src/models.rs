use serde::Serialize;

/// One scored molecule from the docking output.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub identifier: String,
    /// Physics-based score (Vinardo `minimizedAffinity`); lower binds better.
    pub score_a: f64,
    /// Learned affinity (`CNNaffinity`); higher binds better.
    pub score_b: f64,
    /// Learned pose probability (`CNNscore`).
    pub score_c: f64,
    pub label: bool,
}

/// A single parsed RMSD value and where it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsdObservation {
    pub level: u32,
    pub pose_index: usize,
    pub rmsd: f64,
}

/// What the reader found for one exhaustiveness level.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelData {
    /// The level's log file does not exist.
    Missing,
    /// The file exists; values are in file order and may be empty.
    Present(Vec<f64>),
}

impl LevelData {
    pub fn values(&self) -> &[f64] {
        match self {
            LevelData::Missing => &[],
            LevelData::Present(values) => values,
        }
    }

    pub fn status(&self) -> LevelStatus {
        match self {
            LevelData::Missing => LevelStatus::Missing,
            LevelData::Present(values) if values.is_empty() => LevelStatus::Empty,
            LevelData::Present(_) => LevelStatus::Ok,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStatus {
    Ok,
    Empty,
    Missing,
}

/// Per-level RMSD values, kept in the configured level order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RmsdSeries {
    levels: Vec<(u32, LevelData)>,
}

impl RmsdSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: u32, data: LevelData) {
        self.levels.push((level, data));
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &LevelData)> {
        self.levels.iter().map(|(level, data)| (*level, data))
    }

    #[cfg(test)]
    pub fn get(&self, level: u32) -> Option<&LevelData> {
        self.levels
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, data)| data)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Every value as an observation, levels first, then file order.
    pub fn observations(&self) -> impl Iterator<Item = RmsdObservation> + '_ {
        self.iter().flat_map(|(level, data)| {
            data.values()
                .iter()
                .enumerate()
                .map(move |(pose_index, &rmsd)| RmsdObservation {
                    level,
                    pose_index,
                    rmsd,
                })
        })
    }
}

impl FromIterator<(u32, LevelData)> for RmsdSeries {
    fn from_iter<I: IntoIterator<Item = (u32, LevelData)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

/// Best pose over all levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalMinimum {
    pub level: u32,
    pub pose_index: usize,
    pub rmsd: f64,
}

impl From<RmsdObservation> for GlobalMinimum {
    fn from(obs: RmsdObservation) -> Self {
        Self {
            level: obs.level,
            pose_index: obs.pose_index,
            rmsd: obs.rmsd,
        }
    }
}
