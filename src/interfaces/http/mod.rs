use crate::application::use_cases::result_assembler::RESULT_MIME_TYPE;
use crate::domain::error::AppError;
use crate::domain::review::ResultTable;
use crate::interfaces::state::{AppState, JobProgress, JobStatus};
use actix_cors::Cors;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use uuid::Uuid;

const MAX_LOG_ENTRIES: usize = 100;
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_columns: Option<Vec<String>>,
}

#[derive(Serialize)]
struct AnalyzeAccepted {
    job_id: Uuid,
    total_rows: usize,
    review_column: String,
}

#[derive(Serialize)]
struct JobView {
    job_id: Uuid,
    status: JobStatus,
    processed: usize,
    total: usize,
    fraction: f64,
    review_column: String,
    started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultTable>,
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = ErrorBody {
        error: err.to_string(),
        available_columns: match err {
            AppError::ColumnNotFound { available } => Some(available.clone()),
            _ => None,
        },
    };

    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        err if err.is_file_level() => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

#[post("/inspect")]
async fn inspect(data: web::Data<HttpState>, body: web::Bytes) -> impl Responder {
    match data.app_state.pipeline.inspect(&body) {
        Ok(summary) => {
            add_log(
                &data.logs,
                "INFO",
                "HttpApi",
                &format!(
                    "Loaded {} reviews, using review column '{}'",
                    summary.row_count, summary.review_column
                ),
            );
            HttpResponse::Ok().json(summary)
        }
        Err(e) => {
            add_log(&data.logs, "ERROR", "HttpApi", &format!("Inspect failed: {}", e));
            error_response(&e)
        }
    }
}

#[post("/analyze")]
async fn analyze(data: web::Data<HttpState>, body: web::Bytes) -> impl Responder {
    let upload = match data.app_state.pipeline.prepare(&body) {
        Ok(upload) => upload,
        Err(e) => {
            add_log(&data.logs, "ERROR", "HttpApi", &format!("Analysis rejected: {}", e));
            return error_response(&e);
        }
    };

    let total_rows = upload.dataset.row_count();
    let review_column = upload.review_column.clone();
    let jobs = data.app_state.jobs.clone();
    let pipeline = data.app_state.pipeline.clone();
    let logs = data.logs.clone();
    let job_id = jobs.create(total_rows, &review_column);

    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Starting analysis {} ({} reviews)", job_id, total_rows),
    );

    actix_web::rt::spawn(async move {
        let sink = JobProgress {
            registry: jobs.clone(),
            id: job_id,
        };
        match pipeline.execute(&upload, &sink).await {
            Ok(output) => {
                add_log(
                    &logs,
                    "INFO",
                    "Analyzer",
                    &format!(
                        "Analysis {} completed ({} rows, {} failed)",
                        job_id,
                        output.results.len(),
                        output.failed_rows
                    ),
                );
                jobs.complete(&job_id, output);
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Analysis failed");
                add_log(&logs, "ERROR", "Analyzer", &format!("Analysis {} failed: {}", job_id, e));
                jobs.fail(&job_id, e.to_string());
            }
        }
    });

    HttpResponse::Accepted().json(AnalyzeAccepted {
        job_id,
        total_rows,
        review_column,
    })
}

#[get("/jobs/{id}")]
async fn job_status(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    let Some(job) = data.app_state.jobs.get(&id) else {
        return error_response(&AppError::NotFound(format!("analysis job {}", id)));
    };

    let view = JobView {
        job_id: job.id,
        status: job.status,
        processed: job.progress.processed,
        total: job.progress.total,
        fraction: job.progress.fraction(),
        review_column: job.review_column,
        started_at: job.started_at.to_rfc3339(),
        failed_rows: job.output.as_ref().map(|output| output.failed_rows),
        error: job.error,
        results: job.output.map(|output| output.results.clone()),
    };

    HttpResponse::Ok().json(view)
}

#[get("/jobs/{id}/download")]
async fn download(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    let Some(job) = data.app_state.jobs.get(&id) else {
        return error_response(&AppError::NotFound(format!("analysis job {}", id)));
    };

    match (job.status, job.output) {
        (JobStatus::Completed, Some(output)) => {
            let file_name = data.app_state.config.analysis.output_file_name.clone();
            HttpResponse::Ok()
                .content_type(RESULT_MIME_TYPE)
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(file_name)],
                })
                .body(output.csv.clone())
        }
        (JobStatus::Failed, _) => HttpResponse::Conflict().json(ErrorBody {
            error: job.error.unwrap_or_else(|| "Analysis failed".to_string()),
            available_columns: None,
        }),
        _ => HttpResponse::Conflict().json(ErrorBody {
            error: format!(
                "Analysis still running ({}/{})",
                job.progress.processed, job.progress.total
            ),
            available_columns: None,
        }),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data
        .logs
        .lock()
        .map(|logs| logs.clone())
        .unwrap_or_default();
    HttpResponse::Ok().json(logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// Routes under `/api`. Shared by the server and its tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES)).service(
        web::scope("/api")
            .service(inspect)
            .service(analyze)
            .service(job_status)
            .service(download)
            .service(get_logs),
    );
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
) -> std::io::Result<Server> {
    let host = app_state.config.server.host.clone();
    let port = app_state.config.server.port;
    let state = web::Data::new(HttpState { app_state, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local tool, any origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run();

    info!(host = %host, port, "HTTP interface listening");

    Ok(server)
}
