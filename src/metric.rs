use std::fmt;
use std::str::FromStr;

use crate::BtsError;

/// Metric used for extended comparisons.
///
/// `Msd` is the mean square deviation of the frames; every other variant is
/// one minus the corresponding extended similarity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    #[default]
    Msd,
    /// Baroni-Urbani-Buser
    Bub,
    /// Faith
    Fai,
    /// Gleason
    Gle,
    /// Jaccard
    Ja,
    /// Jaccard-Tanimoto
    Jt,
    /// Rogers-Tanimoto
    Rt,
    /// Russell-Rao
    Rr,
    /// Sokal-Michener
    Sm,
    /// Sokal-Sneath 1
    Ss1,
    /// Sokal-Sneath 2
    Ss2,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::Msd,
        Metric::Bub,
        Metric::Fai,
        Metric::Gle,
        Metric::Ja,
        Metric::Jt,
        Metric::Rt,
        Metric::Rr,
        Metric::Sm,
        Metric::Ss1,
        Metric::Ss2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Msd => "MSD",
            Metric::Bub => "BUB",
            Metric::Fai => "Fai",
            Metric::Gle => "Gle",
            Metric::Ja => "Ja",
            Metric::Jt => "JT",
            Metric::Rt => "RT",
            Metric::Rr => "RR",
            Metric::Sm => "SM",
            Metric::Ss1 => "SS1",
            Metric::Ss2 => "SS2",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = BtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BtsError::UnknownName {
                kind: "metric",
                value: s.to_string(),
            })
    }
}
