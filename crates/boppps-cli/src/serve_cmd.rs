use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use boppps_core::document::DOCX_MIME;
use boppps_core::{GenerationError, LessonPlanner, LessonRequest};

type SharedPlanner = Arc<LessonPlanner>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }

    /// Generation failures are reported as a bad gateway with the
    /// user-facing `Error: ...` text.
    pub fn generation(err: &GenerationError) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.user_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GeneratedPlanResponse {
    pub file_name: String,
    pub path: String,
    pub download_url: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(planner: SharedPlanner) -> Router {
    let api = Router::new()
        .route("/api/lesson-plans", post(create_lesson_plan))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate_from_form))
        .route("/files/{name}", get(download_file))
        .route("/healthz", get(healthz))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(planner)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(planner: SharedPlanner, bind: &str, port: u16) -> Result<()> {
    let app = build_router(planner);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("boppps serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("boppps serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Form page
// ---------------------------------------------------------------------------

/// `(name, label, placeholder)` for each input, laid out two per row.
const FORM_FIELDS: [(&str, &str, &str); 7] = [
    ("class", "Class", "e.g., 9th"),
    ("subject", "Subject", "e.g., Physics"),
    ("topic", "Topic", "e.g., Newton’s First Law"),
    ("students", "No. of Students", "e.g., 30"),
    ("duration", "Duration", "e.g., 40 (minutes)"),
    ("date", "Date", "e.g., 2025-05-25"),
    ("teacher", "Teacher Name", "e.g., Najaf Ali Sharqi"),
];

const PAGE_STYLE: &str = "body{font-family:sans-serif;max-width:720px;margin:2rem auto}\
.row{display:flex;gap:1rem}.row label{flex:1}\
label{display:block;margin:.5rem 0}input{width:100%;padding:.4rem}\
button{margin-top:1rem;padding:.6rem 1.2rem}.error{color:#b00020}";

fn render_page(notice: Option<&str>) -> String {
    let inputs = FORM_FIELDS
        .chunks(2)
        .map(|pair| {
            let labels = pair
                .iter()
                .map(|(name, label, placeholder)| {
                    format!(
                        "<label>{label}<input type=\"text\" name=\"{name}\" placeholder=\"{placeholder}\"></label>"
                    )
                })
                .collect::<String>();
            format!("<div class=\"row\">{labels}</div>")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let notice = notice
        .map(|msg| format!("<p class=\"error\">{}</p>", escape_html(msg)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>BOPPPS Lesson Plan Generator</title>\
<style>{PAGE_STYLE}</style></head><body>\
<h2>BOPPPS Lesson Plan Generator (English Only)</h2>\
{notice}\
<form method=\"post\" action=\"/generate\">\n{inputs}\n\
<button type=\"submit\">Generate Lesson Plan</button>\
</form></body></html>"
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Html<String> {
    Html(render_page(None))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn generate_from_form(
    State(planner): State<SharedPlanner>,
    Form(request): Form<LessonRequest>,
) -> Result<axum::response::Response, AppError> {
    let plan = match planner.generate(&request).await {
        Ok(plan) => plan,
        Err(err) => {
            tracing::warn!(stage = err.stage(), error = %err, "lesson plan generation failed");
            let page = render_page(Some(&err.user_message()));
            return Ok((StatusCode::BAD_GATEWAY, Html(page)).into_response());
        }
    };

    let bytes = tokio::fs::read(&plan.path)
        .await
        .map_err(|e| AppError::internal(e.into()))?;
    Ok(attachment(&plan.file_name, bytes))
}

async fn create_lesson_plan(
    State(planner): State<SharedPlanner>,
    Json(request): Json<LessonRequest>,
) -> Result<axum::response::Response, AppError> {
    let plan = planner.generate(&request).await.map_err(|err| {
        tracing::warn!(stage = err.stage(), error = %err, "lesson plan generation failed");
        AppError::generation(&err)
    })?;

    let response = GeneratedPlanResponse {
        download_url: format!("/files/{}", plan.file_name),
        path: plan.path.display().to_string(),
        file_name: plan.file_name,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

async fn download_file(
    State(planner): State<SharedPlanner>,
    Path(name): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let path = planner
        .output()
        .resolve(&name)
        .ok_or_else(|| AppError::not_found(format!("no lesson plan named {name:?}")))?;

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(attachment(&name, bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::not_found(format!("no lesson plan named {name:?}")))
        }
        Err(e) => Err(AppError::internal(e.into())),
    }
}

fn attachment(file_name: &str, bytes: Vec<u8>) -> axum::response::Response {
    let headers = [
        (header::CONTENT_TYPE, DOCX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ),
    ];
    (headers, bytes).into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
