use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::IdentifyError;

/// Material category used to look up disposal guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Plastic,
    Paper,
    Glass,
    Metal,
    Organic,
    Electronic,
    Hazardous,
    Mixed,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Plastic,
        Category::Paper,
        Category::Glass,
        Category::Metal,
        Category::Organic,
        Category::Electronic,
        Category::Hazardous,
        Category::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plastic => "plastic",
            Category::Paper => "paper",
            Category::Glass => "glass",
            Category::Metal => "metal",
            Category::Organic => "organic",
            Category::Electronic => "electronic",
            Category::Hazardous => "hazardous",
            Category::Mixed => "mixed",
        }
    }

    /// Maps whatever a backend returned onto a known category.
    /// Anything unrecognized becomes [`Category::Mixed`].
    pub fn coerce(raw: &str) -> Category {
        raw.parse().unwrap_or(Category::Mixed)
    }
}

impl FromStr for Category {
    type Err = IdentifyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| IdentifyError::InvalidInput(format!("unknown category: {value}")))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
