use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::dto::application_dto::SelectedIdsQuery;
use crate::error::{Error, Result};
use crate::query::compiler::compile_filter;
use crate::services::export_service::ExportService;
use crate::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Export applications matching the same query filters as the listing
/// endpoint, without pagination. When the filters match nothing this route
/// deliberately widens to a full dump so HR never downloads an empty
/// workbook by typo; the widening is this route's decision, the query core
/// never does it on its own.
pub async fn export_applications_excel(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let predicate = compile_filter(&params);
    let mut rows = state.application_service.export_rows(&predicate).await?;
    if rows.is_empty() && !predicate.is_empty() {
        tracing::info!("no rows matched export filters, widening to full export");
        rows = state.application_service.list_all_unfiltered().await?;
    }

    let buffer = ExportService::generate_applications_xlsx(&rows)?;
    Ok(xlsx_response(
        buffer,
        &format!("applications_{}.xlsx", chrono::Utc::now().timestamp_millis()),
    ))
}

/// Export a caller-chosen set of applications (`?ids=a,b,c`).
pub async fn export_selected_excel(
    State(state): State<AppState>,
    Query(query): Query<SelectedIdsQuery>,
) -> Result<impl IntoResponse> {
    let ids: Vec<Uuid> = query
        .ids
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if ids.is_empty() {
        return Err(Error::BadRequest("No valid ids provided".to_string()));
    }

    let rows = state.application_service.export_by_ids(&ids).await?;
    let buffer = ExportService::generate_applications_xlsx(&rows)?;
    Ok(xlsx_response(
        buffer,
        &format!(
            "applications_selected_{}.xlsx",
            chrono::Utc::now().timestamp_millis()
        ),
    ))
}

fn xlsx_response(buffer: Vec<u8>, filename: &str) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
            (header::CACHE_CONTROL, "no-store, no-cache".to_string()),
        ],
        buffer,
    )
}
