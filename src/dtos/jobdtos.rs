use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{trim_optional_skills, trim_optional_string, trim_skills, trim_string};
use crate::models::jobmodel::{
    Applicant, Job, JobStatus, WorkerAssignment, WorkerStatus,
};
use crate::service::lifecycle::{
    advance_amount, completed_steps, final_amount, job_status_steps,
};
use crate::utils::currency::paise_to_rupees;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

fn validate_date(date: &str) -> Result<(), ValidationError> {
    match parse_date(date) {
        Some(_) => Ok(()),
        None => {
            let mut error = ValidationError::new("invalid_date");
            error.message = Some(Cow::from("Date must be in YYYY-MM-DD format"));
            Err(error)
        }
    }
}

fn validate_time(time: &str) -> Result<(), ValidationError> {
    match parse_time(time) {
        Some(_) => Ok(()),
        None => {
            let mut error = ValidationError::new("invalid_time");
            error.message = Some(Cow::from("Time must be in HH:MM format"));
            Err(error)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobDto {
    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, max = 200, message = "Job title is required"))]
    pub title: String,

    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Job description is required"))]
    pub description: String,

    #[validate(custom = "validate_date")]
    pub date: String,

    #[validate(custom = "validate_time")]
    pub start_time: String,

    #[validate(custom = "validate_time")]
    pub end_time: String,

    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,

    /// Rupees
    #[validate(range(
        min = 0.01,
        max = 1000000.0,
        message = "Pay must be a positive number up to ₹10,00,000"
    ))]
    pub pay_per_worker: f64,

    #[validate(range(
        min = 1,
        max = 1000,
        message = "Number of workers must be a positive integer up to 1000"
    ))]
    pub workers_needed: i32,

    #[serde(deserialize_with = "trim_skills")]
    #[validate(length(min = 1, message = "At least one skill is required"))]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateJobDto {
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(min = 1, max = 200, message = "Job title is required"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(min = 1, message = "Job description is required"))]
    pub description: Option<String>,

    #[validate(custom = "validate_date")]
    pub date: Option<String>,

    #[validate(custom = "validate_time")]
    pub start_time: Option<String>,

    #[validate(custom = "validate_time")]
    pub end_time: Option<String>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: Option<String>,

    #[validate(range(
        min = 0.01,
        max = 1000000.0,
        message = "Pay must be a positive number up to ₹10,00,000"
    ))]
    pub pay_per_worker: Option<f64>,

    #[validate(range(
        min = 1,
        max = 1000,
        message = "Number of workers must be a positive integer up to 1000"
    ))]
    pub workers_needed: Option<i32>,

    #[serde(default, deserialize_with = "trim_optional_skills")]
    #[validate(length(min = 1, message = "At least one skill is required"))]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusUpdateDto {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerStatusUpdateDto {
    pub status: WorkerStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectWorkerDto {
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotifyWorkersDto {
    #[validate(length(min = 1, message = "At least one recipient is required"))]
    pub recipients: Vec<Uuid>,

    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobQueryDto {
    pub tab: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressStepDto {
    pub status: String,
    pub completed: bool,
    pub current: bool,
}

/// A job as the API returns it: money in rupees, date and times as the
/// strings the form accepts, plus the progress-step view.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobDto {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub pay_per_worker: f64,
    pub workers_needed: i32,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub advance_paid: bool,
    pub final_paid: bool,
    pub total_cost: Option<f64>,
    pub advance_amount: Option<f64>,
    pub final_amount: Option<f64>,
    pub applicants: Vec<Applicant>,
    pub workers: Vec<WorkerAssignment>,
    pub progress: Vec<ProgressStepDto>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl JobDto {
    pub fn from_job(job: &Job) -> Self {
        let done = completed_steps(job.status, job_status_steps());
        let progress = job_status_steps()
            .iter()
            .map(|step| ProgressStepDto {
                status: step.to_str().to_string(),
                completed: done.contains(step),
                current: *step == job.status,
            })
            .collect();

        let total = job.total_cost();

        JobDto {
            id: job.id,
            organizer_id: job.organizer_id,
            title: job.title.to_owned(),
            description: job.description.to_owned(),
            date: job.date.format(DATE_FORMAT).to_string(),
            start_time: job.start_time.format(TIME_FORMAT).to_string(),
            end_time: job.end_time.format(TIME_FORMAT).to_string(),
            location: job.location.to_owned(),
            pay_per_worker: paise_to_rupees(job.pay_per_worker),
            workers_needed: job.workers_needed,
            skills: job.skills.clone(),
            status: job.status,
            advance_paid: job.advance_paid,
            final_paid: job.final_paid,
            total_cost: total.map(paise_to_rupees),
            advance_amount: total.and_then(advance_amount).map(paise_to_rupees),
            final_amount: total.and_then(final_amount).map(paise_to_rupees),
            applicants: job.applicants.clone(),
            workers: job.workers.clone(),
            progress,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }

    pub fn from_jobs(jobs: &[Job]) -> Vec<JobDto> {
        jobs.iter().map(JobDto::from_job).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardDto {
    pub recent: Vec<JobDto>,
    pub active: Vec<JobDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateJobDto {
        CreateJobDto {
            title: "Wedding waiters".to_string(),
            description: "Serve dinner".to_string(),
            date: "2026-12-12".to_string(),
            start_time: "18:00".to_string(),
            end_time: "23:30".to_string(),
            location: "Jaipur".to_string(),
            pay_per_worker: 1200.0,
            workers_needed: 6,
            skills: vec!["serving".to_string()],
        }
    }

    fn first_message(errors: &validator::ValidationErrors, field: &str) -> String {
        errors.field_errors()[field][0]
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_valid_job_form() {
        assert!(create_dto().validate().is_ok());
    }

    #[test]
    fn test_job_form_messages() {
        let mut dto = create_dto();
        dto.title = String::new();
        dto.date = "12/12/2026".to_string();
        dto.start_time = "6pm".to_string();
        dto.pay_per_worker = 0.0;
        dto.workers_needed = 0;
        dto.skills = Vec::new();

        let errors = dto.validate().unwrap_err();
        assert_eq!(first_message(&errors, "title"), "Job title is required");
        assert_eq!(first_message(&errors, "date"), "Date must be in YYYY-MM-DD format");
        assert_eq!(first_message(&errors, "start_time"), "Time must be in HH:MM format");
        assert_eq!(
            first_message(&errors, "pay_per_worker"),
            "Pay must be a positive number up to ₹10,00,000"
        );
        assert_eq!(
            first_message(&errors, "workers_needed"),
            "Number of workers must be a positive integer up to 1000"
        );
        assert_eq!(first_message(&errors, "skills"), "At least one skill is required");
    }

    #[test]
    fn test_job_form_caps_pay_and_crew_size() {
        let mut dto = create_dto();
        dto.pay_per_worker = 1_000_000.0;
        dto.workers_needed = 1_000;
        assert!(dto.validate().is_ok());

        dto.pay_per_worker = 9.2e16;
        dto.workers_needed = 1_001;
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("pay_per_worker"));
        assert!(errors.field_errors().contains_key("workers_needed"));

        let update = UpdateJobDto {
            workers_needed: Some(i32::MAX),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_blank_title_is_rejected_after_trim() {
        let dto: CreateJobDto = serde_json::from_value(serde_json::json!({
            "title": "   ",
            "description": "Serve dinner",
            "date": "2026-12-12",
            "start_time": "18:00",
            "end_time": "23:30",
            "location": "Jaipur",
            "pay_per_worker": 1200.0,
            "workers_needed": 6,
            "skills": [" serving ", ""]
        }))
        .unwrap();
        assert_eq!(dto.skills, vec!["serving"]);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_parse_helpers_are_strict() {
        assert!(parse_date("2026-02-30").is_none());
        assert!(parse_date("2026-2-3").is_none());
        assert!(parse_time("9:00").is_none());
        assert!(parse_time("24:00").is_none());
        assert_eq!(parse_time("09:05"), NaiveTime::from_hms_opt(9, 5, 0));
    }

    #[test]
    fn test_update_dto_allows_partial_bodies() {
        let dto: UpdateJobDto = serde_json::from_value(serde_json::json!({ "title": "New" })).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.location.is_none());
    }
}
