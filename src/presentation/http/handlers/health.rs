//! Health Check Handlers
//!
//! - `GET /health`: process is up, with version
//! - `GET /health/live`: liveness check
//! - `GET /health/ready`: readiness check over the database and upload directory

use std::path::Path;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::startup::AppState;

static STARTED: Lazy<(Instant, DateTime<Utc>)> = Lazy::new(|| (Instant::now(), Utc::now()));

/// Latency above which the database counts as degraded.
const SLOW_DATABASE_MS: u64 = 100;

/// Pin the start time; called once the server is built.
pub fn init_server_start() {
    Lazy::force(&STARTED);
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    fn new(status: HealthStatus) -> Self {
        Self {
            status,
            latency_ms: None,
            message: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: CheckResult,
    pub uploads: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: ReadinessChecks,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Always 200 while the process serves requests
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// 503 when the database cannot be reached
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let checks = ReadinessChecks {
        database: check_database(&state).await,
        uploads: check_uploads(Path::new(&state.settings.uploads.dir)).await,
    };
    let status = overall_status(&checks);

    let (started, started_at) = &*STARTED;
    let response = ReadinessResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: started.elapsed().as_secs(),
        started_at: started_at.to_rfc3339(),
        checks,
    };

    let code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(response))
}

async fn check_database(state: &AppState) -> CheckResult {
    let start = Instant::now();
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => {
            let latency = start.elapsed().as_millis() as u64;
            let status = if latency < SLOW_DATABASE_MS {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            };
            CheckResult {
                latency_ms: Some(latency),
                ..CheckResult::new(status)
            }
        }
        Err(e) => CheckResult::new(HealthStatus::Unhealthy)
            .with_message(format!("Database connection failed: {}", e)),
    }
}

/// Missing directory is only degraded: it is created on the first upload.
async fn check_uploads(dir: &Path) -> CheckResult {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => CheckResult::new(HealthStatus::Healthy),
        Ok(_) => CheckResult::new(HealthStatus::Unhealthy).with_message("Upload path is not a directory"),
        Err(_) => CheckResult::new(HealthStatus::Degraded).with_message("Upload directory does not exist yet"),
    }
}

/// The database decides readiness; other checks can only degrade it.
fn overall_status(checks: &ReadinessChecks) -> HealthStatus {
    let uploads = checks.uploads.status.min(HealthStatus::Degraded);
    checks.database.status.max(uploads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Degraded).unwrap(), "\"degraded\"");
    }

    #[test_case(HealthStatus::Healthy, HealthStatus::Healthy, HealthStatus::Healthy)]
    #[test_case(HealthStatus::Healthy, HealthStatus::Degraded, HealthStatus::Degraded)]
    #[test_case(HealthStatus::Healthy, HealthStatus::Unhealthy, HealthStatus::Degraded ; "broken uploads only degrade")]
    #[test_case(HealthStatus::Degraded, HealthStatus::Healthy, HealthStatus::Degraded)]
    #[test_case(HealthStatus::Unhealthy, HealthStatus::Healthy, HealthStatus::Unhealthy)]
    fn test_overall_status(database: HealthStatus, uploads: HealthStatus, expected: HealthStatus) {
        let checks = ReadinessChecks {
            database: CheckResult::new(database),
            uploads: CheckResult::new(uploads),
        };
        assert_eq!(overall_status(&checks), expected);
    }

    #[tokio::test]
    async fn test_upload_directory_check() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(check_uploads(tmp.path()).await.status, HealthStatus::Healthy);
        assert_eq!(
            check_uploads(&tmp.path().join("missing")).await.status,
            HealthStatus::Degraded
        );

        let file = tmp.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert_eq!(check_uploads(&file).await.status, HealthStatus::Unhealthy);
    }
}
