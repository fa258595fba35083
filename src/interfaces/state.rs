use crate::application::{PipelineOutput, ProgressSink, ReviewPipeline};
use crate::domain::review::Progress;
use crate::infrastructure::config::AppConfig;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Finished jobs kept for polling and download before the oldest is evicted.
pub const MAX_FINISHED_JOBS: usize = 20;

/// Shared state behind every interface.
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: Arc<ReviewPipeline>,
    pub jobs: Arc<JobRegistry>,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: ReviewPipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
            jobs: Arc::new(JobRegistry::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: Progress,
    pub review_column: String,
    pub started_at: DateTime<Local>,
    pub output: Option<Arc<PipelineOutput>>,
    pub error: Option<String>,
}

#[derive(Default)]
struct Jobs {
    by_id: HashMap<Uuid, AnalysisJob>,
    finished: VecDeque<Uuid>,
}

impl Jobs {
    fn finish(&mut self, id: &Uuid) {
        self.finished.push_back(*id);
        while self.finished.len() > MAX_FINISHED_JOBS {
            if let Some(oldest) = self.finished.pop_front() {
                self.by_id.remove(&oldest);
            }
        }
    }
}

/// In-memory record of analysis runs started over HTTP. Running jobs are
/// never evicted; finished ones are capped at `MAX_FINISHED_JOBS`.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<Jobs>,
}

impl JobRegistry {
    fn lock(&self) -> MutexGuard<'_, Jobs> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self, total: usize, review_column: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().by_id.insert(
            id,
            AnalysisJob {
                id,
                status: JobStatus::Running,
                progress: Progress::new(0, total),
                review_column: review_column.to_string(),
                started_at: Local::now(),
                output: None,
                error: None,
            },
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<AnalysisJob> {
        self.lock().by_id.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn update_progress(&self, id: &Uuid, progress: Progress) {
        if let Some(job) = self.lock().by_id.get_mut(id) {
            job.progress = progress;
        }
    }

    pub fn complete(&self, id: &Uuid, output: PipelineOutput) {
        let mut jobs = self.lock();
        let Some(job) = jobs.by_id.get_mut(id) else {
            return;
        };
        job.status = JobStatus::Completed;
        job.progress = Progress::new(output.results.len(), output.results.len());
        job.output = Some(Arc::new(output));
        jobs.finish(id);
    }

    pub fn fail(&self, id: &Uuid, error: String) {
        let mut jobs = self.lock();
        let Some(job) = jobs.by_id.get_mut(id) else {
            return;
        };
        job.status = JobStatus::Failed;
        job.error = Some(error);
        jobs.finish(id);
    }
}

/// Publishes analyzer progress into the registry.
pub struct JobProgress {
    pub registry: Arc<JobRegistry>,
    pub id: Uuid,
}

impl ProgressSink for JobProgress {
    fn report(&self, progress: Progress) {
        self.registry.update_progress(&self.id, progress);
    }
}
