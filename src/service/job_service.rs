use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{JobExt, Store, UserExt},
    dtos::jobdtos::{parse_date, parse_time, CreateJobDto, UpdateJobDto},
    models::{
        jobmodel::*,
        notificationmodel::Notification,
        usermodel::User,
    },
    service::{
        error::ServiceError,
        job_board::{self, Dashboard},
        lifecycle,
        notification_service::NotificationService,
    },
    utils::currency::rupees_to_paise,
};

fn invalid_date() -> ServiceError {
    ServiceError::Validation("Date must be in YYYY-MM-DD format".to_string())
}

fn invalid_time() -> ServiceError {
    ServiceError::Validation("Time must be in HH:MM format".to_string())
}

fn stale(job_id: Uuid) -> ServiceError {
    ServiceError::Conflict(format!(
        "Job {} was changed by another request, please refresh and try again",
        job_id
    ))
}

#[derive(Debug, Clone)]
pub struct JobService {
    store: Arc<dyn Store>,
    notification_service: Arc<NotificationService>,
}

impl JobService {
    pub fn new(store: Arc<dyn Store>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            store,
            notification_service,
        }
    }

    pub async fn fetch_jobs(&self) -> Result<Vec<Job>, ServiceError> {
        Ok(self.store.get_jobs().await?)
    }

    pub async fn get_job_by_id(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        self.store
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }

    /// The job, provided `actor` is the organizer who posted it.
    pub async fn owned_job(&self, actor: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self.get_job_by_id(job_id).await?;
        if !actor.is_organizer() || job.organizer_id != actor.id {
            return Err(ServiceError::Forbidden(
                "Only the organizer who posted this job can manage it".to_string(),
            ));
        }
        Ok(job)
    }

    pub async fn board(
        &self,
        actor: &User,
        tab: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<Job>, ServiceError> {
        let jobs = self.fetch_jobs().await?;
        job_board::board_for(actor, jobs, tab, query)
    }

    pub async fn dashboard(&self, actor: &User) -> Result<Dashboard, ServiceError> {
        let jobs = self.fetch_jobs().await?;
        Ok(job_board::dashboard_for(actor, jobs))
    }

    pub async fn create_job(&self, actor: &User, dto: CreateJobDto) -> Result<Job, ServiceError> {
        if !actor.is_organizer() {
            return Err(ServiceError::Forbidden("Only organizers can post jobs".to_string()));
        }

        dto.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let new_job = NewJob {
            organizer_id: actor.id,
            date: parse_date(&dto.date).ok_or_else(invalid_date)?,
            start_time: parse_time(&dto.start_time).ok_or_else(invalid_time)?,
            end_time: parse_time(&dto.end_time).ok_or_else(invalid_time)?,
            pay_per_worker: rupees_to_paise(dto.pay_per_worker),
            title: dto.title,
            description: dto.description,
            location: dto.location,
            workers_needed: dto.workers_needed,
            skills: dto.skills,
        };

        let job = self.store.create_job(new_job).await?;
        tracing::info!("Job {} created by organizer {}", job.id, actor.id);

        Ok(job)
    }

    pub async fn update_job(
        &self,
        actor: &User,
        job_id: Uuid,
        dto: UpdateJobDto,
    ) -> Result<Job, ServiceError> {
        let job = self.owned_job(actor, job_id).await?;
        if job.status != JobStatus::Draft {
            return Err(ServiceError::InvalidTransition(
                "only draft jobs can be edited".to_string(),
            ));
        }

        dto.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let update = JobDetailsUpdate {
            date: dto
                .date
                .as_deref()
                .map(|d| parse_date(d).ok_or_else(invalid_date))
                .transpose()?,
            start_time: dto
                .start_time
                .as_deref()
                .map(|t| parse_time(t).ok_or_else(invalid_time))
                .transpose()?,
            end_time: dto
                .end_time
                .as_deref()
                .map(|t| parse_time(t).ok_or_else(invalid_time))
                .transpose()?,
            pay_per_worker: dto.pay_per_worker.map(rupees_to_paise),
            title: dto.title,
            description: dto.description,
            location: dto.location,
            workers_needed: dto.workers_needed,
            skills: dto.skills,
        };

        self.store
            .update_job_details(job_id, update)
            .await?
            .ok_or_else(|| stale(job_id))
    }

    pub async fn transition_job_status(
        &self,
        actor: &User,
        job_id: Uuid,
        new_status: JobStatus,
    ) -> Result<Job, ServiceError> {
        let job = self.owned_job(actor, job_id).await?;
        lifecycle::check_job_transition(&job, new_status)?;

        let updated = self
            .store
            .update_job_status(job_id, job.status, new_status)
            .await?
            .ok_or_else(|| stale(job_id))?;

        tracing::info!(
            "Job {} moved from {} to {}",
            job_id,
            job.status.to_str(),
            new_status.to_str()
        );

        match new_status {
            JobStatus::InProgress => {
                if let Err(e) = self.notification_service.notify_job_started(&updated).await {
                    tracing::error!("Failed to notify workers that job {} started: {}", job_id, e);
                }
            }
            JobStatus::Completed => self.finish_job(&updated).await,
            _ => {}
        }

        Ok(updated)
    }

    pub async fn transition_worker_status(
        &self,
        actor: &User,
        job_id: Uuid,
        worker_id: Uuid,
        new_status: WorkerStatus,
    ) -> Result<Job, ServiceError> {
        if actor.id != worker_id {
            return Err(ServiceError::Forbidden(
                "Workers can only update their own status".to_string(),
            ));
        }

        let job = self.get_job_by_id(job_id).await?;
        let current = job
            .assignment(worker_id)
            .map(|w| w.status)
            .ok_or_else(|| ServiceError::Forbidden("You are not assigned to this job".to_string()))?;

        lifecycle::check_worker_transition(&job, current, new_status)?;

        self.store
            .update_worker_status(job_id, worker_id, current, new_status)
            .await?
            .ok_or_else(|| stale(job_id))?;

        tracing::info!(
            "Worker {} on job {} moved from {} to {}",
            worker_id,
            job_id,
            current.to_str(),
            new_status.to_str()
        );

        let job = self.get_job_by_id(job_id).await?;
        if new_status == WorkerStatus::Completed
            && job.status == JobStatus::InProgress
            && job.all_workers_completed()
        {
            if let Some(done) = self
                .store
                .update_job_status(job_id, JobStatus::InProgress, JobStatus::Completed)
                .await?
            {
                tracing::info!("Job {} completed: every worker has finished", job_id);
                self.finish_job(&done).await;
                return Ok(done);
            }
            return self.get_job_by_id(job_id).await;
        }

        Ok(job)
    }

    pub async fn select_worker(
        &self,
        actor: &User,
        job_id: Uuid,
        worker_id: Uuid,
        selected: bool,
    ) -> Result<Job, ServiceError> {
        let job = self.owned_job(actor, job_id).await?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::InvalidTransition(
                "workers can only be selected while the job is open".to_string(),
            ));
        }

        if !selected {
            if !self.store.remove_worker(job_id, worker_id).await? {
                return Err(ServiceError::Conflict(format!(
                    "Worker {} is not selected for this job",
                    worker_id
                )));
            }
            tracing::info!("Worker {} unselected from job {}", worker_id, job_id);
            return self.get_job_by_id(job_id).await;
        }

        let applicant = job
            .applicant(worker_id)
            .ok_or(ServiceError::NotAnApplicant(worker_id))?;
        if applicant.status == ApplicationStatus::Rejected {
            return Err(ServiceError::Conflict(format!(
                "Worker {} was rejected for this job",
                worker_id
            )));
        }
        if job.assignment(worker_id).is_some() {
            return Err(ServiceError::AlreadySelected(worker_id));
        }

        match self.store.assign_worker(job_id, worker_id).await? {
            AssignOutcome::Assigned(_) => {}
            AssignOutcome::Full => return Err(ServiceError::JobFull(job_id)),
            AssignOutcome::AlreadyAssigned => return Err(ServiceError::AlreadySelected(worker_id)),
            AssignOutcome::NotOpen => return Err(stale(job_id)),
        }

        tracing::info!("Worker {} selected for job {}", worker_id, job_id);

        let job = self.get_job_by_id(job_id).await?;
        if let Err(e) = self
            .notification_service
            .notify_worker_selected(&job, worker_id)
            .await
        {
            tracing::error!("Failed to notify worker {} of selection: {}", worker_id, e);
        }

        Ok(job)
    }

    pub async fn reject_applicant(
        &self,
        actor: &User,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Job, ServiceError> {
        let job = self.owned_job(actor, job_id).await?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::InvalidTransition(
                "applicants can only be rejected while the job is open".to_string(),
            ));
        }
        if job.applicant(worker_id).is_none() {
            return Err(ServiceError::NotAnApplicant(worker_id));
        }
        if job.assignment(worker_id).is_some() {
            return Err(ServiceError::Conflict(
                "Unselect the worker before rejecting the application".to_string(),
            ));
        }

        self.store
            .update_applicant_status(job_id, worker_id, ApplicationStatus::Rejected)
            .await?
            .ok_or(ServiceError::NotAnApplicant(worker_id))?;

        self.get_job_by_id(job_id).await
    }

    pub async fn apply_to_job(&self, actor: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        if !actor.is_worker() {
            return Err(ServiceError::Forbidden("Only workers can apply to jobs".to_string()));
        }

        let job = self.get_job_by_id(job_id).await?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::InvalidTransition(
                "this job is not accepting applications".to_string(),
            ));
        }
        if job.applicant(actor.id).is_some() {
            return Err(ServiceError::AlreadyApplied);
        }

        self.store
            .add_applicant(job_id, actor.id)
            .await?
            .ok_or(ServiceError::AlreadyApplied)?;

        tracing::info!("Worker {} applied to job {}", actor.id, job_id);

        self.get_job_by_id(job_id).await
    }

    pub async fn send_notification_to_workers(
        &self,
        actor: &User,
        job_id: Uuid,
        recipients: &[Uuid],
        title: &str,
        message: &str,
    ) -> Result<Vec<Notification>, ServiceError> {
        let job = self.owned_job(actor, job_id).await?;

        if let Some(stranger) = recipients.iter().find(|id| job.assignment(**id).is_none()) {
            return Err(ServiceError::Validation(format!(
                "User {} is not assigned to this job",
                stranger
            )));
        }

        self.notification_service
            .send_to_workers(job_id, recipients, title, message)
            .await
    }

    /// Side effects of a job reaching `completed`. Failures are logged: the
    /// transition itself has already been stored.
    pub(crate) async fn finish_job(&self, job: &Job) {
        if let Err(e) = self.notification_service.notify_job_completed(job).await {
            tracing::error!("Failed to notify workers that job {} completed: {}", job.id, e);
        }

        let finished: Vec<Uuid> = job
            .workers
            .iter()
            .filter(|w| w.status == WorkerStatus::Completed)
            .map(|w| w.worker_id)
            .collect();

        match self.store.increment_completed_jobs(&finished).await {
            Ok(count) => tracing::debug!("Credited a completed job to {} worker(s)", count),
            Err(e) => tracing::error!("Failed to update job counts for job {}: {}", job.id, e),
        }
    }
}
