//! Closed waste category vocabulary with an explicit default case.
//!
//! Upstream payloads label categories inconsistently (Croatian labels such
//! as `Papir` next to English ones), so all of that mapping lives here and
//! nowhere else. Anything unrecognized degrades to [`WasteCategory::Other`]
//! instead of failing or falling through to mismatched defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste categories that can appear in a pickup schedule.
pub enum WasteCategory {
    /// Paper and cardboard.
    Paper,
    /// Plastics and light packaging.
    Plastic,
    /// Organic/bio waste.
    Bio,
    /// General/residual municipal waste.
    General,
    /// Any category the vocabulary does not know, kept verbatim.
    Other(String),
}

impl WasteCategory {
    /// Map a raw category string onto the vocabulary.
    ///
    /// Total function: unknown values become [`WasteCategory::Other`]
    /// carrying the trimmed original label.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "paper" | "papir" => Self::Paper,
            "plastic" | "plastika" => Self::Plastic,
            "bio" | "organic" => Self::Bio,
            "general" | "komunalni" | "residual" => Self::General,
            _ => Self::Other(raw.trim().to_owned()),
        }
    }

    /// Display/severity tag used by consumers to pick colors and icons.
    #[must_use]
    pub fn tag(&self) -> CategoryTag {
        match self {
            Self::Paper | Self::Plastic => CategoryTag::Recycling,
            Self::Bio => CategoryTag::Organic,
            Self::General => CategoryTag::Residual,
            Self::Other(_) => CategoryTag::Unclassified,
        }
    }

    /// Human-friendly label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Paper => "Paper",
            Self::Plastic => "Plastic",
            Self::Bio => "Bio",
            Self::General => "General",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Coarse display grouping for a waste category.
pub enum CategoryTag {
    /// Recyclable fractions (paper, plastic).
    Recycling,
    /// Compostable organic waste.
    Organic,
    /// Residual waste headed for disposal.
    Residual,
    /// Categories outside the known vocabulary.
    Unclassified,
}
