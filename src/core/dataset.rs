//! Dataset codes and claim classifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Statistical dataset served by the upstream tool server.
///
/// The set is fixed: the classifier may only choose among these codes.
/// Codes are parsed through [`FromStr`], so deserialization ignores case and
/// surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Dataset {
    /// Periodic Labour Force Survey: jobs, unemployment, wages.
    Plfs,
    /// Consumer Price Index: retail inflation.
    Cpi,
    /// Wholesale Price Index.
    Wpi,
    /// Index of Industrial Production.
    Iip,
    /// Annual Survey of Industries.
    Asi,
    /// National Accounts Statistics: GDP, GVA.
    Nas,
    /// Energy statistics.
    Energy,
}

impl Dataset {
    /// All dataset codes, in the order they are presented to the classifier.
    pub const ALL: [Self; 7] = [
        Self::Plfs,
        Self::Cpi,
        Self::Wpi,
        Self::Iip,
        Self::Asi,
        Self::Nas,
        Self::Energy,
    ];

    /// Upstream dataset code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Plfs => "PLFS",
            Self::Cpi => "CPI",
            Self::Wpi => "WPI",
            Self::Iip => "IIP",
            Self::Asi => "ASI",
            Self::Nas => "NAS",
            Self::Energy => "ENERGY",
        }
    }

    /// Attribution string handed to the interpreter.
    #[must_use]
    pub fn source_hint(self) -> String {
        format!("{} (MoSPI)", self.code())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown dataset code: {s}"))
    }
}

impl TryFrom<String> for Dataset {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

/// Shape of the claim as judged by the indicator selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Movement over time.
    #[default]
    Trend,
    /// A level compared against a reference group.
    Level,
    /// Comparison between groups.
    Comparison,
    /// Distribution across categories.
    Distribution,
    /// Two different quantities (possibly across datasets).
    Compound,
    /// Two series available within the same dataset.
    IntraComparison,
    /// Anything else, including unrecognized labels.
    #[serde(other)]
    Other,
}

impl ClaimType {
    /// Whether a benchmark series should be fetched for this claim type.
    #[must_use]
    pub const fn wants_benchmark(self) -> bool {
        matches!(self, Self::Level | Self::Comparison | Self::IntraComparison)
    }

    /// Label used in prompts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Level => "level",
            Self::Comparison => "comparison",
            Self::Distribution => "distribution",
            Self::Compound => "compound",
            Self::IntraComparison => "intra_comparison",
            Self::Other => "other",
        }
    }
}
