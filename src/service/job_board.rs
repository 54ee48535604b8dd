use std::str::FromStr;

use uuid::Uuid;

use crate::models::jobmodel::{ApplicationStatus, Job, JobStatus, WorkerStatus};
use crate::models::usermodel::{User, UserRole};
use crate::service::error::ServiceError;

const RECENT_JOBS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerTab {
    Available,
    Applied,
    Selected,
    Completed,
}

impl FromStr for WorkerTab {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(WorkerTab::Available),
            "applied" => Ok(WorkerTab::Applied),
            "selected" => Ok(WorkerTab::Selected),
            "completed" => Ok(WorkerTab::Completed),
            other => Err(ServiceError::Validation(format!("Unknown tab: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizerTab {
    Active,
    Draft,
    Completed,
    All,
}

impl FromStr for OrganizerTab {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OrganizerTab::Active),
            "draft" => Ok(OrganizerTab::Draft),
            "completed" => Ok(OrganizerTab::Completed),
            "all" => Ok(OrganizerTab::All),
            other => Err(ServiceError::Validation(format!("Unknown tab: {}", other))),
        }
    }
}

/// Case-insensitive substring match on title or location. A blank query
/// matches everything.
pub fn matches_search(job: &Job, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty()
        || job.title.to_lowercase().contains(&query)
        || job.location.to_lowercase().contains(&query)
}

fn in_worker_tab(job: &Job, worker_id: Uuid, tab: WorkerTab) -> bool {
    match tab {
        WorkerTab::Available => {
            job.status == JobStatus::Open
                && job.applicant(worker_id).is_none()
                && job.assignment(worker_id).is_none()
        }
        WorkerTab::Applied => job
            .applicant(worker_id)
            .map(|a| a.status == ApplicationStatus::Pending)
            .unwrap_or(false),
        WorkerTab::Selected => job
            .assignment(worker_id)
            .map(|w| w.status != WorkerStatus::Completed)
            .unwrap_or(false),
        WorkerTab::Completed => job
            .assignment(worker_id)
            .map(|w| w.status == WorkerStatus::Completed)
            .unwrap_or(false),
    }
}

fn in_organizer_tab(job: &Job, organizer_id: Uuid, tab: OrganizerTab) -> bool {
    if job.organizer_id != organizer_id {
        return false;
    }
    match tab {
        OrganizerTab::Active => matches!(job.status, JobStatus::Open | JobStatus::InProgress),
        OrganizerTab::Draft => job.status == JobStatus::Draft,
        OrganizerTab::Completed => job.status == JobStatus::Completed,
        OrganizerTab::All => true,
    }
}

pub fn worker_jobs(jobs: Vec<Job>, worker_id: Uuid, tab: WorkerTab, query: &str) -> Vec<Job> {
    jobs.into_iter()
        .filter(|job| in_worker_tab(job, worker_id, tab) && matches_search(job, query))
        .collect()
}

pub fn organizer_jobs(jobs: Vec<Job>, organizer_id: Uuid, tab: OrganizerTab, query: &str) -> Vec<Job> {
    jobs.into_iter()
        .filter(|job| in_organizer_tab(job, organizer_id, tab) && matches_search(job, query))
        .collect()
}

/// Role-aware job list. Workers default to `available`, organizers to
/// `active`.
pub fn board_for(
    user: &User,
    jobs: Vec<Job>,
    tab: Option<&str>,
    query: Option<&str>,
) -> Result<Vec<Job>, ServiceError> {
    let query = query.unwrap_or("");
    match user.role {
        UserRole::Worker => {
            let tab = tab.map(|t| t.parse::<WorkerTab>()).transpose()?.unwrap_or(WorkerTab::Available);
            Ok(worker_jobs(jobs, user.id, tab, query))
        }
        UserRole::Organizer => {
            let tab = tab.map(|t| t.parse::<OrganizerTab>()).transpose()?.unwrap_or(OrganizerTab::Active);
            Ok(organizer_jobs(jobs, user.id, tab, query))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub recent: Vec<Job>,
    pub active: Vec<Job>,
}

/// `jobs` must be newest first.
pub fn dashboard_for(user: &User, jobs: Vec<Job>) -> Dashboard {
    match user.role {
        UserRole::Worker => {
            let recent = jobs
                .iter()
                .filter(|job| in_worker_tab(job, user.id, WorkerTab::Available))
                .take(RECENT_JOBS)
                .cloned()
                .collect();
            let active = jobs
                .into_iter()
                .filter(|job| in_worker_tab(job, user.id, WorkerTab::Selected))
                .collect();
            Dashboard { recent, active }
        }
        UserRole::Organizer => {
            let recent = jobs
                .iter()
                .filter(|job| job.organizer_id == user.id)
                .take(RECENT_JOBS)
                .cloned()
                .collect();
            let active = jobs
                .into_iter()
                .filter(|job| job.organizer_id == user.id && job.status == JobStatus::InProgress)
                .collect();
            Dashboard { recent, active }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::jobmodel::{Applicant, WorkerAssignment};
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: String::new(),
            role,
            skills: Vec::new(),
            rating: None,
            total_jobs: 0,
            reset_token: None,
            token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn job(organizer_id: Uuid, title: &str, location: &str, status: JobStatus) -> Job {
        Job {
            id: Uuid::new_v4(),
            organizer_id,
            title: title.to_string(),
            description: "desc".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            location: location.to_string(),
            pay_per_worker: 50_000,
            workers_needed: 2,
            skills: vec!["setup".to_string()],
            status,
            advance_paid: status != JobStatus::Draft,
            final_paid: false,
            applicants: Vec::new(),
            workers: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn applied(mut job: Job, worker_id: Uuid, status: ApplicationStatus) -> Job {
        job.applicants.push(Applicant {
            job_id: job.id,
            worker_id,
            status,
            applied_at: Utc::now(),
        });
        job
    }

    fn assigned(job: Job, worker_id: Uuid, status: WorkerStatus) -> Job {
        let mut job = applied(job, worker_id, ApplicationStatus::Accepted);
        job.workers.push(WorkerAssignment {
            job_id: job.id,
            worker_id,
            status,
            updated_at: Utc::now(),
        });
        job
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_and_location() {
        let j = job(Uuid::new_v4(), "Concert Security", "Bengaluru", JobStatus::Open);
        assert!(matches_search(&j, "security"));
        assert!(matches_search(&j, "BENGAL"));
        assert!(matches_search(&j, "  "));
        assert!(!matches_search(&j, "catering"));
    }

    #[test]
    fn test_worker_tabs() {
        let worker = user(UserRole::Worker);
        let org = Uuid::new_v4();
        let jobs = vec![
            job(org, "Open one", "Delhi", JobStatus::Open),
            applied(job(org, "Applied", "Delhi", JobStatus::Open), worker.id, ApplicationStatus::Pending),
            assigned(job(org, "Working", "Delhi", JobStatus::InProgress), worker.id, WorkerStatus::Working),
            assigned(job(org, "Done", "Delhi", JobStatus::Completed), worker.id, WorkerStatus::Completed),
            job(org, "Draft", "Delhi", JobStatus::Draft),
        ];

        let titles = |tab: &str| -> Vec<String> {
            board_for(&worker, jobs.clone(), Some(tab), None)
                .unwrap()
                .into_iter()
                .map(|j| j.title)
                .collect()
        };

        assert_eq!(titles("available"), vec!["Open one"]);
        assert_eq!(titles("applied"), vec!["Applied"]);
        assert_eq!(titles("selected"), vec!["Working"]);
        assert_eq!(titles("completed"), vec!["Done"]);
    }

    #[test]
    fn test_organizer_tabs_only_show_own_jobs() {
        let organizer = user(UserRole::Organizer);
        let jobs = vec![
            job(organizer.id, "Draft", "Goa", JobStatus::Draft),
            job(organizer.id, "Open", "Goa", JobStatus::Open),
            job(organizer.id, "Running", "Goa", JobStatus::InProgress),
            job(organizer.id, "Finished", "Goa", JobStatus::Completed),
            job(Uuid::new_v4(), "Someone else", "Goa", JobStatus::Open),
        ];

        assert_eq!(board_for(&organizer, jobs.clone(), None, None).unwrap().len(), 2);
        assert_eq!(board_for(&organizer, jobs.clone(), Some("draft"), None).unwrap().len(), 1);
        assert_eq!(board_for(&organizer, jobs.clone(), Some("all"), None).unwrap().len(), 4);
        assert_eq!(
            board_for(&organizer, jobs.clone(), Some("all"), Some("running")).unwrap().len(),
            1
        );
        assert!(board_for(&organizer, jobs, Some("available"), None).is_err());
    }

    #[test]
    fn test_dashboard_limits_recent_jobs() {
        let worker = user(UserRole::Worker);
        let org = Uuid::new_v4();
        let mut jobs: Vec<Job> = (0..5)
            .map(|i| job(org, &format!("Job {}", i), "Chennai", JobStatus::Open))
            .collect();
        jobs.push(assigned(
            job(org, "Mine", "Chennai", JobStatus::InProgress),
            worker.id,
            WorkerStatus::Arrived,
        ));

        let dashboard = dashboard_for(&worker, jobs);
        assert_eq!(dashboard.recent.len(), 3);
        assert_eq!(dashboard.recent[0].title, "Job 0");
        assert_eq!(dashboard.active.len(), 1);
    }
}
