//! Request handlers and router construction.

use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{
        rejection::QueryRejection, DefaultBodyLimit, FromRequest, Multipart, Request, State,
    },
    http::{header, HeaderMap},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use sheetsift_sheet::{
    FilterClause, MatchMode, Query, Record, SerializeOptions, Session, SheetError,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared server state.
///
/// Upload and sheet selection hold the write lock for their whole run, so a
/// search never sees a table mid-replacement.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub serialize: SerializeOptions,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(session: Session, serialize: SerializeOptions, max_upload_bytes: usize) -> Self {
        AppState {
            session: Arc::new(RwLock::new(session)),
            serialize,
            max_upload_bytes,
        }
    }
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Sheet names found in an uploaded workbook.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub sheets: Vec<String>,
}

/// Sheet selection request, sent as a form or JSON body.
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectSheetRequest {
    pub sheet_name: String,
}

/// Columns of the newly selected sheet.
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectSheetResponse {
    pub sheet: String,
    pub columns: Vec<String>,
}

/// Query-string parameters accepted by `/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(alias = "field_name")]
    pub field: Option<String>,
    #[serde(alias = "query")]
    pub pattern: Option<String>,
    pub filters: Option<String>,
    #[serde(rename = "matchMode", alias = "match_mode")]
    pub match_mode: Option<String>,
    pub columns: Option<String>,
    pub stringify: Option<bool>,
}

impl SearchParams {
    /// Build the engine query: the single clause first, then `filters`.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::BadRequest` for an unknown match mode, a pattern
    /// without a field, or a malformed clause list.
    pub fn to_query(&self) -> Result<Query, SheetError> {
        let mode = match &self.match_mode {
            Some(mode) => mode.parse::<MatchMode>()?,
            None => MatchMode::default(),
        };

        let mut query = Query::new();

        match (&self.field, &self.pattern) {
            (Some(field), pattern) if !field.is_empty() => {
                let pattern = pattern.clone().unwrap_or_default();
                query = query.filter(FilterClause::new(field.clone(), mode, pattern));
            }
            (_, Some(_)) => {
                return Err(SheetError::BadRequest(
                    "A search pattern needs a field".to_string(),
                ));
            }
            _ => {}
        }

        if let Some(filters) = &self.filters {
            query.filters.extend(FilterClause::parse_list(filters, mode)?);
        }

        if let Some(columns) = &self.columns {
            let projection: Vec<String> = columns
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            query = query.project(projection);
        }

        Ok(query)
    }
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Accept a workbook as a raw body or as the `file` field of a multipart form.
pub async fn upload(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<UploadResponse>, ApiError> {
    let bytes = if is_content_type(request.headers(), "multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::rejected(e.status(), e))?;
        read_multipart_file(multipart).await?
    } else {
        Bytes::from_request(request, &())
            .await
            .map_err(|e| ApiError::rejected(e.status(), e))?
    };

    let size = bytes.len();
    let mut session = state.session.write().await;
    let sheets = session.load_workbook(bytes.to_vec())?;
    tracing::info!("Loaded workbook ({} bytes) with {} sheets", size, sheets.len());

    Ok(Json(UploadResponse { sheets }))
}

/// Make a sheet of the uploaded workbook the active table.
pub async fn select_sheet(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<SelectSheetResponse>, ApiError> {
    let SelectSheetRequest { sheet_name } =
        if is_content_type(request.headers(), "application/json") {
            let Json(body) = Json::<SelectSheetRequest>::from_request(request, &())
                .await
                .map_err(ApiError::bad_request)?;
            body
        } else {
            let Form(body) = Form::<SelectSheetRequest>::from_request(request, &())
                .await
                .map_err(ApiError::bad_request)?;
            body
        };

    let mut session = state.session.write().await;
    let columns = session.select_sheet(&sheet_name)?;
    if let Some(table) = session.current_table() {
        tracing::info!(
            "Selected sheet '{}' ({} rows, {} columns)",
            sheet_name,
            table.row_count(),
            table.column_count()
        );
    }

    Ok(Json(SelectSheetResponse {
        sheet: sheet_name,
        columns,
    }))
}

/// Filter and project the active table.
pub async fn search(
    State(state): State<AppState>,
    params: Result<axum::extract::Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let axum::extract::Query(params) = params.map_err(ApiError::bad_request)?;
    let query = params.to_query()?;
    let options = params
        .stringify
        .map_or(state.serialize, |s| state.serialize.with_stringify(s));

    let session = state.session.read().await;
    let records = session.search(&query, &options)?;
    tracing::debug!(
        "Search with {} clauses returned {} records",
        query.filters.len(),
        records.len()
    );

    Ok(Json(records))
}

fn is_content_type(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with(expected))
}

/// Take the field named `file`, falling back to the first field.
async fn read_multipart_file(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::rejected(e.status(), e))?
    {
        let is_file = field.name() == Some("file");
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::rejected(e.status(), e))?;
        if is_file {
            return Ok(bytes);
        }
        fallback.get_or_insert(bytes);
    }

    fallback.ok_or_else(|| {
        ApiError::from(SheetError::InvalidWorkbook(
            "multipart upload has no file".to_string(),
        ))
    })
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/upload/", post(upload))
        .route("/select-sheet", post(select_sheet))
        .route("/select-sheet/", post(select_sheet))
        .route("/search", get(search))
        .route("/search/", get(search))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
