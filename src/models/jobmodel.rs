use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "job_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Draft,
    Open,
    InProgress,
    Completed,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Open => "open",
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "worker_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Selected,
    Arrived,
    Working,
    Completed,
}

impl WorkerStatus {
    pub fn to_str(&self) -> &str {
        match self {
            WorkerStatus::Selected => "selected",
            WorkerStatus::Arrived => "arrived",
            WorkerStatus::Working => "working",
            WorkerStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Applicant {
    pub job_id: Uuid,
    pub worker_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// A worker's place on a job. `job_id` points back at the owning job.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct WorkerAssignment {
    pub job_id: Uuid,
    pub worker_id: Uuid,
    pub status: WorkerStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    /// Paise per worker
    pub pay_per_worker: i64,
    pub workers_needed: i32,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub advance_paid: bool,
    pub final_paid: bool,
    #[sqlx(skip)]
    pub applicants: Vec<Applicant>,
    #[sqlx(skip)]
    pub workers: Vec<WorkerAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// `None` when the product does not fit in paise.
    pub fn total_cost(&self) -> Option<i64> {
        self.pay_per_worker.checked_mul(i64::from(self.workers_needed))
    }

    pub fn is_full(&self) -> bool {
        self.workers.len() >= self.workers_needed.max(0) as usize
    }

    pub fn applicant(&self, worker_id: Uuid) -> Option<&Applicant> {
        self.applicants.iter().find(|a| a.worker_id == worker_id)
    }

    pub fn assignment(&self, worker_id: Uuid) -> Option<&WorkerAssignment> {
        self.workers.iter().find(|w| w.worker_id == worker_id)
    }

    pub fn worker_ids(&self) -> Vec<Uuid> {
        self.workers.iter().map(|w| w.worker_id).collect()
    }

    pub fn all_workers_completed(&self) -> bool {
        !self.workers.is_empty()
            && self.workers.iter().all(|w| w.status == WorkerStatus::Completed)
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub pay_per_worker: i64,
    pub workers_needed: i32,
    pub skills: Vec<String>,
}

/// Partial update of a draft job's details. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct JobDetailsUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub pay_per_worker: Option<i64>,
    pub workers_needed: Option<i32>,
    pub skills: Option<Vec<String>>,
}

/// Result of trying to place a worker on a job.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignOutcome {
    Assigned(WorkerAssignment),
    /// `workers_needed` already reached
    Full,
    AlreadyAssigned,
    /// Job is missing or no longer open
    NotOpen,
}
