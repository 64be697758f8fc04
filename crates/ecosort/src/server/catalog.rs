use axum::{extract::Path, Json};
use ecosort_identify::{catalog, Category};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::server::error::{ApiError, ApiErrorResponse};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryGuideResponse {
    pub category: Category,
    pub recyclable_instructions: String,
    pub non_recyclable_instructions: String,
    pub impact: String,
    pub alternatives: Vec<String>,
}

impl From<Category> for CategoryGuideResponse {
    fn from(category: Category) -> Self {
        let guide = catalog::guide(category);
        Self {
            category,
            recyclable_instructions: guide.instructions(true).to_string(),
            non_recyclable_instructions: guide.instructions(false).to_string(),
            impact: guide.impact.to_string(),
            alternatives: guide.alternatives().iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/categories/{category}",
    tag = "catalog",
    params(("category" = String, Path, description = "Category name, e.g. `plastic`")),
    responses(
        (status = 200, description = "Disposal guidance for the category", body = CategoryGuideResponse),
        (status = 404, body = ApiErrorResponse),
    )
)]
pub(crate) async fn category_guide(
    Path(category): Path<String>,
) -> Result<Json<CategoryGuideResponse>, ApiError> {
    let category: Category = category
        .parse()
        .map_err(|_| ApiError::not_found(format!("unknown category: {category}")))?;
    Ok(Json(category.into()))
}
