use std::time::{Duration, Instant};

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use redis::AsyncCommands;
use serde::Serialize;
use sysinfo::System;

use crate::{
    constants::START_TIME,
    repositories::project::ProjectRepository,
    use_cases::extractors::AdminSession,
    AppState,
};

const HEALTH_CACHE_TTL: Duration = Duration::from_secs(5);
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
enum ComponentStatus {
    Ok,
    Unavailable,
    NotConfigured,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct HealthReport {
    status: &'static str,
    version: &'static str,
    uptime: String,
    started_at: String,
    checked_at: String,
    database: ComponentStatus,
    redis: ComponentStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostReport {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total_mb: u64,
    process_memory_mb: Option<u64>,
    upload_dir: String,
}

#[derive(Serialize)]
struct AdminHealthReport {
    #[serde(flatten)]
    health: HealthReport,
    host: HostReport,
}

static LAST_REPORT: Lazy<RwLock<Option<(Instant, HealthReport)>>> = Lazy::new(|| RwLock::new(None));

async fn probe_redis(state: &AppState) -> ComponentStatus {
    let Some(pool) = &state.redis_pool else {
        return ComponentStatus::NotConfigured;
    };
    let Ok(mut conn) = pool.get().await else {
        return ComponentStatus::Unavailable;
    };
    match conn.ping::<String>().await {
        Ok(pong) if pong == "PONG" => ComponentStatus::Ok,
        _ => ComponentStatus::Unavailable,
    }
}

async fn check(state: &AppState) -> HealthReport {
    let now = Utc::now();
    let uptime = now.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;

    let database = match state.repos.project_repo.check_connection().await {
        Ok(()) => ComponentStatus::Ok,
        Err(e) => {
            tracing::warn!("database health probe failed: {}", e);
            ComponentStatus::Unavailable
        }
    };
    let redis = probe_redis(state).await;

    HealthReport {
        status: if database == ComponentStatus::Ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_duration(Duration::from_secs(uptime)).to_string(),
        started_at: START_TIME.to_rfc3339(),
        checked_at: now.to_rfc3339(),
        database,
        redis,
    }
}

/// Public liveness report. Probes run at most once per cache window.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    if let Some((at, report)) = LAST_REPORT.read().as_ref() {
        if at.elapsed() < HEALTH_CACHE_TTL {
            return HttpResponse::Ok().json(report);
        }
    }

    let report = check(&state).await;
    *LAST_REPORT.write() = Some((Instant::now(), report.clone()));
    HttpResponse::Ok().json(report)
}

/// Uncached report with host details for the admin panel.
#[get("/health")]
pub async fn admin_health_check(_session: AdminSession, state: web::Data<AppState>) -> impl Responder {
    let health = check(&state).await;

    let mut sys = System::new_all();
    sys.refresh_all();
    let process_memory_mb = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map(|process| (process.memory() as f64 / BYTES_PER_MB) as u64);

    let host = HostReport {
        os: System::name().unwrap_or_default(),
        kernel: System::kernel_version().unwrap_or_default(),
        hostname: System::host_name().unwrap_or_default(),
        cpu_count: sys.cpus().len(),
        memory_total_mb: (sys.total_memory() as f64 / BYTES_PER_MB) as u64,
        process_memory_mb,
        upload_dir: state.storage.root().display().to_string(),
    };

    HttpResponse::Ok().json(AdminHealthReport { health, host })
}
