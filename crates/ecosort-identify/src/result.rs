use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog;
use crate::category::Category;
use crate::request::IdentificationRequest;

/// Canonical identification outcome, whichever backend produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentificationResult {
    pub item: String,
    pub category: Category,
    pub recyclable: bool,
    pub instructions: String,
    pub alternatives: Vec<String>,
    pub impact: String,
}

impl IdentificationResult {
    /// Builds a result from a classification, resolving guidance from the
    /// static tables.
    pub fn classified(item: impl Into<String>, category: Category, recyclable: bool) -> Self {
        let guide = catalog::guide(category);
        Self {
            item: item.into(),
            category,
            recyclable,
            instructions: guide.instructions(recyclable).to_string(),
            alternatives: guide.alternatives().iter().map(|s| s.to_string()).collect(),
            impact: guide.impact.to_string(),
        }
    }

    /// Returned for image scans when no backend could answer.
    pub fn unidentified() -> Self {
        Self::degraded(
            "Unknown Item",
            "Unable to identify this item. Please check with your local recycling center for proper disposal instructions.",
            &["Consider reusable alternatives", "Reduce consumption when possible"],
            "Proper waste disposal helps protect our environment.",
        )
    }

    /// Returned for barcode scans when no backend could answer.
    pub fn unrecognized_product() -> Self {
        Self::degraded(
            "Unknown Product",
            "Barcode not recognized. Please check the product packaging for recycling symbols.",
            &[
                "Look for recycling symbols on packaging",
                "Check manufacturer's website",
            ],
            "Proper identification helps with correct recycling.",
        )
    }

    /// Returned for text searches when no backend could answer. Keeps the
    /// user's query as the item label.
    pub fn unmatched_query(query: impl Into<String>) -> Self {
        Self::degraded(
            query,
            "Unable to find specific recycling information for this item. Please check with your local recycling center.",
            &["Contact local recycling center", "Check manufacturer guidelines"],
            "Proper disposal helps protect the environment.",
        )
    }

    pub fn degraded_for(request: &IdentificationRequest) -> Self {
        match request {
            IdentificationRequest::ImageCapture { .. } => Self::unidentified(),
            IdentificationRequest::BarcodeCapture { .. } => Self::unrecognized_product(),
            IdentificationRequest::TextQuery { text } => Self::unmatched_query(text.clone()),
        }
    }

    fn degraded(
        item: impl Into<String>,
        instructions: &str,
        alternatives: &[&str],
        impact: &str,
    ) -> Self {
        Self {
            item: item.into(),
            category: Category::Mixed,
            recyclable: false,
            instructions: instructions.to_string(),
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
            impact: impact.to_string(),
        }
    }
}
