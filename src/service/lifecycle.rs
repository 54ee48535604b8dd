//! Status progression rules for jobs and worker assignments, plus the
//! payment arithmetic tied to them. Everything here is pure; the services
//! call it before touching the store.

use crate::models::jobmodel::{Job, JobStatus, WorkerStatus};
use crate::models::walletmodels::SettlementPlan;
use crate::service::error::ServiceError;
use crate::utils::currency::percent_of;

/// Share of the total job cost paid up front to publish a job.
pub const ADVANCE_PERCENT: i64 = 25;

const JOB_STEPS: [JobStatus; 4] = [
    JobStatus::Draft,
    JobStatus::Open,
    JobStatus::InProgress,
    JobStatus::Completed,
];

const WORKER_STEPS: [WorkerStatus; 4] = [
    WorkerStatus::Selected,
    WorkerStatus::Arrived,
    WorkerStatus::Working,
    WorkerStatus::Completed,
];

impl JobStatus {
    pub fn next(&self) -> Option<JobStatus> {
        match self {
            JobStatus::Draft => Some(JobStatus::Open),
            JobStatus::Open => Some(JobStatus::InProgress),
            JobStatus::InProgress => Some(JobStatus::Completed),
            JobStatus::Completed => None,
        }
    }
}

impl WorkerStatus {
    pub fn next(&self) -> Option<WorkerStatus> {
        match self {
            WorkerStatus::Selected => Some(WorkerStatus::Arrived),
            WorkerStatus::Arrived => Some(WorkerStatus::Working),
            WorkerStatus::Working => Some(WorkerStatus::Completed),
            WorkerStatus::Completed => None,
        }
    }
}

pub fn job_status_steps() -> &'static [JobStatus] {
    &JOB_STEPS
}

pub fn worker_status_steps() -> &'static [WorkerStatus] {
    &WORKER_STEPS
}

/// Steps strictly before `current`.
pub fn completed_steps<T: PartialEq + Copy>(current: T, steps: &[T]) -> Vec<T> {
    steps.iter().take_while(|step| **step != current).copied().collect()
}

pub fn check_job_transition(job: &Job, to: JobStatus) -> Result<(), ServiceError> {
    if job.status.next() != Some(to) {
        return Err(ServiceError::InvalidTransition(format!(
            "job cannot move from {} to {}",
            job.status.to_str(),
            to.to_str()
        )));
    }

    match to {
        JobStatus::Open if !job.advance_paid => Err(ServiceError::InvalidTransition(
            "a job is published by paying the advance".to_string(),
        )),
        JobStatus::InProgress if job.workers.is_empty() => Err(ServiceError::InvalidTransition(
            "select at least one worker before starting the job".to_string(),
        )),
        _ => Ok(()),
    }
}

pub fn check_worker_transition(
    job: &Job,
    current: WorkerStatus,
    to: WorkerStatus,
) -> Result<(), ServiceError> {
    if job.status == JobStatus::Completed {
        return Err(ServiceError::InvalidTransition(
            "the job is already completed".to_string(),
        ));
    }

    if current.next() != Some(to) {
        return Err(ServiceError::InvalidTransition(format!(
            "worker cannot move from {} to {}",
            current.to_str(),
            to.to_str()
        )));
    }

    if to == WorkerStatus::Arrived && job.status != JobStatus::InProgress {
        return Err(ServiceError::InvalidTransition(
            "the job has not started yet".to_string(),
        ));
    }

    Ok(())
}

pub fn advance_amount(total: i64) -> Option<i64> {
    percent_of(total, ADVANCE_PERCENT)
}

pub fn final_amount(total: i64) -> Option<i64> {
    advance_amount(total).map(|advance| total - advance)
}

fn amount_too_large() -> ServiceError {
    ServiceError::Validation("The job total is larger than a payment can be".to_string())
}

/// Advance owed for the job, refusing totals that overflow.
pub fn job_advance(job: &Job) -> Result<i64, ServiceError> {
    job.total_cost()
        .and_then(advance_amount)
        .ok_or_else(amount_too_large)
}

/// Every assigned worker receives `pay_per_worker`. The organizer pays what
/// the advance does not cover, or gets back what it over-covered when fewer
/// workers were assigned than planned.
pub fn settlement_plan(job: &Job) -> Result<SettlementPlan, ServiceError> {
    let worker_payouts: Vec<_> = job
        .workers
        .iter()
        .map(|w| (w.worker_id, job.pay_per_worker))
        .collect();

    let payout_total = i64::try_from(worker_payouts.len())
        .ok()
        .and_then(|count| job.pay_per_worker.checked_mul(count))
        .ok_or_else(amount_too_large)?;
    let advance = if job.advance_paid { job_advance(job)? } else { 0 };

    Ok(SettlementPlan {
        organizer_debit: (payout_total - advance).max(0),
        organizer_refund: (advance - payout_total).max(0),
        worker_payouts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::jobmodel::WorkerAssignment;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    fn job(status: JobStatus, workers: usize) -> Job {
        let id = Uuid::new_v4();
        Job {
            id,
            organizer_id: Uuid::new_v4(),
            title: "Catering".to_string(),
            description: "Serve guests".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            location: "Pune".to_string(),
            pay_per_worker: 80_000,
            workers_needed: 4,
            skills: vec!["serving".to_string()],
            status,
            advance_paid: status != JobStatus::Draft,
            final_paid: false,
            applicants: Vec::new(),
            workers: (0..workers)
                .map(|_| WorkerAssignment {
                    job_id: id,
                    worker_id: Uuid::new_v4(),
                    status: WorkerStatus::Selected,
                    updated_at: Utc::now(),
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_job_moves_forward_one_step() {
        assert!(check_job_transition(&job(JobStatus::Open, 1), JobStatus::InProgress).is_ok());
        assert!(check_job_transition(&job(JobStatus::InProgress, 1), JobStatus::Completed).is_ok());
    }

    #[test]
    fn test_job_rejects_backward_and_skipping_moves() {
        let cases = [
            (JobStatus::Open, JobStatus::Draft),
            (JobStatus::InProgress, JobStatus::Open),
            (JobStatus::Completed, JobStatus::InProgress),
            (JobStatus::Draft, JobStatus::InProgress),
            (JobStatus::Open, JobStatus::Completed),
            (JobStatus::Open, JobStatus::Open),
        ];
        for (from, to) in cases {
            let result = check_job_transition(&job(from, 1), to);
            assert!(
                matches!(result, Err(ServiceError::InvalidTransition(_))),
                "{:?} -> {:?} should fail",
                from,
                to
            );
        }
    }

    #[test]
    fn test_draft_cannot_open_without_advance() {
        let result = check_job_transition(&job(JobStatus::Draft, 0), JobStatus::Open);
        assert!(matches!(result, Err(ServiceError::InvalidTransition(_))));
    }

    #[test]
    fn test_start_requires_a_worker() {
        let result = check_job_transition(&job(JobStatus::Open, 0), JobStatus::InProgress);
        assert!(matches!(result, Err(ServiceError::InvalidTransition(_))));
    }

    #[test]
    fn test_worker_transitions() {
        let started = job(JobStatus::InProgress, 1);
        assert!(check_worker_transition(&started, WorkerStatus::Selected, WorkerStatus::Arrived).is_ok());
        assert!(check_worker_transition(&started, WorkerStatus::Working, WorkerStatus::Completed).is_ok());
        assert!(check_worker_transition(&started, WorkerStatus::Selected, WorkerStatus::Working).is_err());
        assert!(check_worker_transition(&started, WorkerStatus::Arrived, WorkerStatus::Selected).is_err());

        let open = job(JobStatus::Open, 1);
        assert!(check_worker_transition(&open, WorkerStatus::Selected, WorkerStatus::Arrived).is_err());

        let done = job(JobStatus::Completed, 1);
        assert!(check_worker_transition(&done, WorkerStatus::Working, WorkerStatus::Completed).is_err());
    }

    #[test]
    fn test_completed_steps() {
        assert!(completed_steps(JobStatus::Draft, job_status_steps()).is_empty());
        assert_eq!(
            completed_steps(JobStatus::InProgress, job_status_steps()),
            vec![JobStatus::Draft, JobStatus::Open]
        );
        assert_eq!(
            completed_steps(WorkerStatus::Completed, worker_status_steps()).len(),
            3
        );
    }

    #[test]
    fn test_advance_is_a_quarter_rounded_half_up() {
        assert_eq!(advance_amount(320_000), Some(80_000));
        assert_eq!(advance_amount(2), Some(1));
        assert_eq!(advance_amount(1), Some(0));
        assert_eq!(final_amount(320_000), Some(240_000));
        assert_eq!(advance_amount(10).zip(final_amount(10)).map(|(a, f)| a + f), Some(10));
    }

    #[test]
    fn test_oversized_job_total_is_refused() {
        let mut huge = job(JobStatus::Draft, 0);
        huge.pay_per_worker = i64::MAX / 2;
        huge.workers_needed = 1_000;
        assert_eq!(huge.total_cost(), None);
        assert!(matches!(job_advance(&huge), Err(ServiceError::Validation(_))));

        huge.advance_paid = true;
        assert!(matches!(settlement_plan(&huge), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_settlement_plan_full_crew() {
        let full = job(JobStatus::InProgress, 4);
        let plan = settlement_plan(&full).unwrap();
        assert_eq!(plan.worker_payouts.len(), 4);
        assert_eq!(plan.organizer_debit, 240_000);
        assert_eq!(plan.organizer_refund, 0);
    }

    #[test]
    fn test_settlement_plan_refunds_unused_advance() {
        // total 320_000, advance 80_000, one worker paid 80_000
        let short = job(JobStatus::InProgress, 1);
        let plan = settlement_plan(&short).unwrap();
        assert_eq!(plan.organizer_debit, 0);
        assert_eq!(plan.organizer_refund, 0);

        let mut cheaper = job(JobStatus::InProgress, 1);
        cheaper.workers_needed = 8;
        let plan = settlement_plan(&cheaper).unwrap();
        assert_eq!(plan.organizer_debit, 0);
        assert_eq!(plan.organizer_refund, 80_000);
    }
}
