use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::*;

pub(crate) const JOB_COLUMNS: &str = "id, organizer_id, title, description, date, start_time, \
     end_time, location, pay_per_worker, workers_needed, skills, status, advance_paid, final_paid, \
     created_at, updated_at";

#[async_trait]
pub trait JobExt {
    async fn create_job(&self, job: NewJob) -> Result<Job, sqlx::Error>;

    /// Every job, newest first, with applicants and workers loaded.
    async fn get_jobs(&self) -> Result<Vec<Job>, sqlx::Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error>;

    /// Applies the update only while the job is still a draft.
    async fn update_job_details(
        &self,
        job_id: Uuid,
        update: JobDetailsUpdate,
    ) -> Result<Option<Job>, sqlx::Error>;

    /// Compare-and-set: returns `None` when the job is not currently `from`.
    async fn update_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, sqlx::Error>;

    /// Returns `None` when the worker already applied.
    async fn add_applicant(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<Applicant>, sqlx::Error>;

    async fn update_applicant_status(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Applicant>, sqlx::Error>;

    /// Capacity-checked: never lets `workers` grow past `workers_needed`.
    /// Marks the matching applicant as accepted.
    async fn assign_worker(&self, job_id: Uuid, worker_id: Uuid) -> Result<AssignOutcome, sqlx::Error>;

    /// Drops the assignment and puts the application back to pending.
    async fn remove_worker(&self, job_id: Uuid, worker_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Compare-and-set on the worker's current status. Only applies while the
    /// job itself is in progress.
    async fn update_worker_status(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        from: WorkerStatus,
        to: WorkerStatus,
    ) -> Result<Option<WorkerAssignment>, sqlx::Error>;
}

pub(crate) async fn attach_relations(
    conn: &mut PgConnection,
    mut jobs: Vec<Job>,
) -> Result<Vec<Job>, sqlx::Error> {
    if jobs.is_empty() {
        return Ok(jobs);
    }

    let ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();

    let applicants = sqlx::query_as::<_, Applicant>(
        r#"
        SELECT job_id, worker_id, status, applied_at
        FROM job_applicants
        WHERE job_id = ANY($1)
        ORDER BY applied_at
        "#,
    )
    .bind(ids.as_slice())
    .fetch_all(&mut *conn)
    .await?;

    let workers = sqlx::query_as::<_, WorkerAssignment>(
        r#"
        SELECT job_id, worker_id, status, updated_at
        FROM job_workers
        WHERE job_id = ANY($1)
        ORDER BY assigned_at
        "#,
    )
    .bind(ids.as_slice())
    .fetch_all(&mut *conn)
    .await?;

    let mut applicants_by_job: HashMap<Uuid, Vec<Applicant>> = HashMap::new();
    for applicant in applicants {
        applicants_by_job.entry(applicant.job_id).or_default().push(applicant);
    }

    let mut workers_by_job: HashMap<Uuid, Vec<WorkerAssignment>> = HashMap::new();
    for worker in workers {
        workers_by_job.entry(worker.job_id).or_default().push(worker);
    }

    for job in jobs.iter_mut() {
        job.applicants = applicants_by_job.remove(&job.id).unwrap_or_default();
        job.workers = workers_by_job.remove(&job.id).unwrap_or_default();
    }

    Ok(jobs)
}

pub(crate) async fn fetch_job(
    conn: &mut PgConnection,
    job_id: Uuid,
    for_update: bool,
) -> Result<Option<Job>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM jobs WHERE id = $1{}",
        JOB_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );

    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(job_id)
        .fetch_optional(&mut *conn)
        .await?;

    match job {
        Some(job) => Ok(attach_relations(conn, vec![job]).await?.pop()),
        None => Ok(None),
    }
}

impl DBClient {
    async fn with_relations(&self, job: Option<Job>) -> Result<Option<Job>, sqlx::Error> {
        match job {
            Some(job) => {
                let mut conn = self.pool.acquire().await?;
                Ok(attach_relations(&mut conn, vec![job]).await?.pop())
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(&self, job: NewJob) -> Result<Job, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO jobs
            (id, organizer_id, title, description, date, start_time, end_time, location,
             pay_per_worker, workers_needed, skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            JOB_COLUMNS
        );

        sqlx::query_as::<_, Job>(&sql)
            .bind(Uuid::new_v4())
            .bind(job.organizer_id)
            .bind(job.title)
            .bind(job.description)
            .bind(job.date)
            .bind(job.start_time)
            .bind(job.end_time)
            .bind(job.location)
            .bind(job.pay_per_worker)
            .bind(job.workers_needed)
            .bind(job.skills)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_jobs(&self) -> Result<Vec<Job>, sqlx::Error> {
        let sql = format!("SELECT {} FROM jobs ORDER BY created_at DESC", JOB_COLUMNS);
        let jobs = sqlx::query_as::<_, Job>(&sql).fetch_all(&self.pool).await?;

        let mut conn = self.pool.acquire().await?;
        attach_relations(&mut conn, jobs).await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_job(&mut conn, job_id, false).await
    }

    async fn update_job_details(
        &self,
        job_id: Uuid,
        update: JobDetailsUpdate,
    ) -> Result<Option<Job>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                date = COALESCE($4, date),
                start_time = COALESCE($5, start_time),
                end_time = COALESCE($6, end_time),
                location = COALESCE($7, location),
                pay_per_worker = COALESCE($8, pay_per_worker),
                workers_needed = COALESCE($9, workers_needed),
                skills = COALESCE($10, skills),
                updated_at = NOW()
            WHERE id = $1 AND status = 'draft'
            RETURNING {}
            "#,
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(job_id)
            .bind(update.title)
            .bind(update.description)
            .bind(update.date)
            .bind(update.start_time)
            .bind(update.end_time)
            .bind(update.location)
            .bind(update.pay_per_worker)
            .bind(update.workers_needed)
            .bind(update.skills)
            .fetch_optional(&self.pool)
            .await?;

        self.with_relations(job).await
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(job_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;

        self.with_relations(job).await
    }

    async fn add_applicant(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        sqlx::query_as::<_, Applicant>(
            r#"
            INSERT INTO job_applicants (job_id, worker_id, status)
            VALUES ($1, $2, 'pending')
            ON CONFLICT (job_id, worker_id) DO NOTHING
            RETURNING job_id, worker_id, status, applied_at
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_applicant_status(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        sqlx::query_as::<_, Applicant>(
            r#"
            UPDATE job_applicants
            SET status = $3
            WHERE job_id = $1 AND worker_id = $2
            RETURNING job_id, worker_id, status, applied_at
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn assign_worker(&self, job_id: Uuid, worker_id: Uuid) -> Result<AssignOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent selections on the same job
        let job = sqlx::query_as::<_, (JobStatus, i32)>(
            "SELECT status, workers_needed FROM jobs WHERE id = $1 FOR UPDATE",
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        let workers_needed = match job {
            Some((JobStatus::Open, workers_needed)) => workers_needed,
            _ => return Ok(AssignOutcome::NotOpen),
        };

        let (assigned, already): (i64, bool) = sqlx::query_as(
            r#"
            SELECT COUNT(*)::BIGINT, COALESCE(BOOL_OR(worker_id = $2), FALSE)
            FROM job_workers
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .fetch_one(&mut *tx)
        .await?;

        if already {
            return Ok(AssignOutcome::AlreadyAssigned);
        }

        if assigned >= i64::from(workers_needed) {
            return Ok(AssignOutcome::Full);
        }

        let assignment = sqlx::query_as::<_, WorkerAssignment>(
            r#"
            INSERT INTO job_workers (job_id, worker_id, status)
            VALUES ($1, $2, 'selected')
            RETURNING job_id, worker_id, status, updated_at
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE job_applicants SET status = 'accepted' WHERE job_id = $1 AND worker_id = $2",
        )
        .bind(job_id)
        .bind(worker_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE jobs SET updated_at = NOW() WHERE id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(AssignOutcome::Assigned(assignment))
    }

    async fn remove_worker(&self, job_id: Uuid, worker_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM job_workers WHERE job_id = $1 AND worker_id = $2")
            .bind(job_id)
            .bind(worker_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE job_applicants SET status = 'pending' WHERE job_id = $1 AND worker_id = $2",
        )
        .bind(job_id)
        .bind(worker_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn update_worker_status(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        from: WorkerStatus,
        to: WorkerStatus,
    ) -> Result<Option<WorkerAssignment>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Shared lock blocks a concurrent job completion until this commits
        let job_status = sqlx::query_scalar::<_, JobStatus>(
            "SELECT status FROM jobs WHERE id = $1 FOR SHARE",
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        if job_status != Some(JobStatus::InProgress) {
            return Ok(None);
        }

        let assignment = sqlx::query_as::<_, WorkerAssignment>(
            r#"
            UPDATE job_workers
            SET status = $4, updated_at = NOW()
            WHERE job_id = $1 AND worker_id = $2 AND status = $3
            RETURNING job_id, worker_id, status, updated_at
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(assignment)
    }
}
