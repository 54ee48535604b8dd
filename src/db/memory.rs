use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::{DatabaseError, ErrorKind};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{JobExt, NotificationExt, UserExt, WalletExt};
use crate::models::jobmodel::*;
use crate::models::notificationmodel::Notification;
use crate::models::usermodel::{NewUser, User};
use crate::models::walletmodels::*;
use crate::utils::reference::generate_reference;

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    jobs: Vec<Job>,
    notifications: Vec<Notification>,
    transactions: Vec<Transaction>,
}

impl MemoryState {
    fn user_mut(&mut self, user_id: Uuid) -> Result<&mut User, sqlx::Error> {
        self.users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(sqlx::Error::RowNotFound)
    }

    fn job_mut(&mut self, job_id: Uuid) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.id == job_id)
    }

    fn balance(&self, user_id: Uuid) -> i64 {
        compute_balance(self.transactions.iter().filter(|t| t.user_id == user_id))
    }

    fn push_transaction(&mut self, transaction: NewTransaction) -> Transaction {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: transaction.user_id,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            status: transaction.status,
            job_id: transaction.job_id,
            job_title: transaction.job_title,
            reference: transaction.reference,
            created_at: Utc::now(),
        };
        self.transactions.push(transaction.clone());
        transaction
    }
}

fn job_transaction(
    user_id: Uuid,
    job_id: Uuid,
    job_title: &str,
    transaction_type: TransactionType,
    amount: i64,
) -> NewTransaction {
    NewTransaction {
        user_id,
        transaction_type,
        amount,
        status: TransactionStatus::Completed,
        job_id: Some(job_id),
        job_title: Some(job_title.to_string()),
        reference: generate_reference(),
    }
}

/// Raised where Postgres would report a unique-constraint violation, so callers
/// map both backends the same way.
#[derive(Debug, thiserror::Error)]
#[error("duplicate key value violates unique constraint \"{constraint}\"")]
struct UniqueViolation {
    constraint: &'static str,
}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

/// In-process store with the same semantics as the Postgres client. Every
/// operation runs under one lock, so compound writes are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let state = self.state.read().await;

        let user = if let Some(user_id) = user_id {
            state.users.iter().find(|u| u.id == user_id)
        } else if let Some(email) = email {
            state.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
        } else if let Some(token) = token {
            state
                .users
                .iter()
                .find(|u| u.reset_token.as_deref() == Some(token))
        } else {
            None
        };

        Ok(user.cloned())
    }

    async fn save_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let mut state = self.state.write().await;

        if state.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(sqlx::Error::Database(Box::new(UniqueViolation {
                constraint: "users_email_key",
            })));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password: user.password,
            role: user.role,
            skills: Vec::new(),
            rating: None,
            total_jobs: 0,
            reset_token: None,
            token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        phone: Option<String>,
        skills: Option<Vec<String>>,
    ) -> Result<User, sqlx::Error> {
        let mut state = self.state.write().await;
        let user = state.user_mut(user_id)?;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(phone) = phone {
            user.phone = phone;
        }
        if let Some(skills) = skills {
            user.skills = skills;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password: String,
    ) -> Result<User, sqlx::Error> {
        let mut state = self.state.write().await;
        let user = state.user_mut(user_id)?;

        user.password = password;
        user.reset_token = None;
        user.token_expires_at = None;
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn add_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut state = self.state.write().await;
        let user = state.user_mut(user_id)?;

        user.reset_token = Some(token.to_string());
        user.token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();

        Ok(())
    }

    async fn increment_completed_jobs(&self, user_ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let mut state = self.state.write().await;
        let mut updated = 0;

        for user in state.users.iter_mut().filter(|u| user_ids.contains(&u.id)) {
            user.total_jobs += 1;
            user.updated_at = Utc::now();
            updated += 1;
        }

        Ok(updated)
    }
}

#[async_trait]
impl JobExt for MemoryStore {
    async fn create_job(&self, job: NewJob) -> Result<Job, sqlx::Error> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            organizer_id: job.organizer_id,
            title: job.title,
            description: job.description,
            date: job.date,
            start_time: job.start_time,
            end_time: job.end_time,
            location: job.location,
            pay_per_worker: job.pay_per_worker,
            workers_needed: job.workers_needed,
            skills: job.skills,
            status: JobStatus::Draft,
            advance_paid: false,
            final_paid: false,
            applicants: Vec::new(),
            workers: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.jobs.push(job.clone());

        Ok(job)
    }

    async fn get_jobs(&self) -> Result<Vec<Job>, sqlx::Error> {
        let state = self.state.read().await;
        Ok(state.jobs.iter().rev().cloned().collect())
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let state = self.state.read().await;
        Ok(state.jobs.iter().find(|j| j.id == job_id).cloned())
    }

    async fn update_job_details(
        &self,
        job_id: Uuid,
        update: JobDetailsUpdate,
    ) -> Result<Option<Job>, sqlx::Error> {
        let mut state = self.state.write().await;

        let job = match state.job_mut(job_id) {
            Some(job) if job.status == JobStatus::Draft => job,
            _ => return Ok(None),
        };

        if let Some(title) = update.title {
            job.title = title;
        }
        if let Some(description) = update.description {
            job.description = description;
        }
        if let Some(date) = update.date {
            job.date = date;
        }
        if let Some(start_time) = update.start_time {
            job.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            job.end_time = end_time;
        }
        if let Some(location) = update.location {
            job.location = location;
        }
        if let Some(pay_per_worker) = update.pay_per_worker {
            job.pay_per_worker = pay_per_worker;
        }
        if let Some(workers_needed) = update.workers_needed {
            job.workers_needed = workers_needed;
        }
        if let Some(skills) = update.skills {
            job.skills = skills;
        }
        job.updated_at = Utc::now();

        Ok(Some(job.clone()))
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, sqlx::Error> {
        let mut state = self.state.write().await;

        match state.job_mut(job_id) {
            Some(job) if job.status == from => {
                job.status = to;
                job.updated_at = Utc::now();
                Ok(Some(job.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn add_applicant(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        let mut state = self.state.write().await;
        let job = state.job_mut(job_id).ok_or(sqlx::Error::RowNotFound)?;

        if job.applicant(worker_id).is_some() {
            return Ok(None);
        }

        let applicant = Applicant {
            job_id,
            worker_id,
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        };
        job.applicants.push(applicant.clone());

        Ok(Some(applicant))
    }

    async fn update_applicant_status(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        let mut state = self.state.write().await;

        let applicant = state
            .job_mut(job_id)
            .and_then(|job| job.applicants.iter_mut().find(|a| a.worker_id == worker_id));

        Ok(applicant.map(|applicant| {
            applicant.status = status;
            applicant.clone()
        }))
    }

    async fn assign_worker(&self, job_id: Uuid, worker_id: Uuid) -> Result<AssignOutcome, sqlx::Error> {
        let mut state = self.state.write().await;

        let job = match state.job_mut(job_id) {
            Some(job) if job.status == JobStatus::Open => job,
            _ => return Ok(AssignOutcome::NotOpen),
        };

        if job.assignment(worker_id).is_some() {
            return Ok(AssignOutcome::AlreadyAssigned);
        }
        if job.is_full() {
            return Ok(AssignOutcome::Full);
        }

        let now = Utc::now();
        let assignment = WorkerAssignment {
            job_id,
            worker_id,
            status: WorkerStatus::Selected,
            updated_at: now,
        };
        job.workers.push(assignment.clone());

        if let Some(applicant) = job.applicants.iter_mut().find(|a| a.worker_id == worker_id) {
            applicant.status = ApplicationStatus::Accepted;
        }
        job.updated_at = now;

        Ok(AssignOutcome::Assigned(assignment))
    }

    async fn remove_worker(&self, job_id: Uuid, worker_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state.write().await;

        let job = match state.job_mut(job_id) {
            Some(job) => job,
            None => return Ok(false),
        };

        let before = job.workers.len();
        job.workers.retain(|w| w.worker_id != worker_id);
        if job.workers.len() == before {
            return Ok(false);
        }

        if let Some(applicant) = job.applicants.iter_mut().find(|a| a.worker_id == worker_id) {
            applicant.status = ApplicationStatus::Pending;
        }
        job.updated_at = Utc::now();

        Ok(true)
    }

    async fn update_worker_status(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        from: WorkerStatus,
        to: WorkerStatus,
    ) -> Result<Option<WorkerAssignment>, sqlx::Error> {
        let mut state = self.state.write().await;

        let assignment = state
            .job_mut(job_id)
            .filter(|job| job.status == JobStatus::InProgress)
            .and_then(|job| job.workers.iter_mut().find(|w| w.worker_id == worker_id));

        match assignment {
            Some(assignment) if assignment.status == from => {
                assignment.status = to;
                assignment.updated_at = Utc::now();
                Ok(Some(assignment.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl NotificationExt for MemoryStore {
    async fn create_notifications(
        &self,
        job_id: Option<Uuid>,
        recipients: &[Uuid],
        title: &str,
        message: &str,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let created: Vec<Notification> = recipients
            .iter()
            .map(|user_id| Notification {
                id: Uuid::new_v4(),
                user_id: *user_id,
                job_id,
                title: title.to_string(),
                message: message.to_string(),
                read: false,
                created_at: now,
            })
            .collect();
        state.notifications.extend(created.iter().cloned());

        Ok(created)
    }

    async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let mut state = self.state.write().await;

        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id);

        Ok(notification.map(|notification| {
            notification.read = true;
            notification.clone()
        }))
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let mut state = self.state.write().await;
        let mut updated = 0;

        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            updated += 1;
        }

        Ok(updated)
    }

    async fn get_unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }
}

#[async_trait]
impl WalletExt for MemoryStore {
    async fn create_transaction(&self, transaction: NewTransaction) -> Result<Transaction, sqlx::Error> {
        let mut state = self.state.write().await;
        Ok(state.push_transaction(transaction))
    }

    async fn get_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, sqlx::Error> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_wallet_balance(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        Ok(self.state.read().await.balance(user_id))
    }

    async fn withdraw(&self, user_id: Uuid, amount: i64) -> Result<DebitOutcome<Transaction>, sqlx::Error> {
        let mut state = self.state.write().await;
        state.user_mut(user_id)?;

        let available = state.balance(user_id);
        if amount > available {
            return Ok(DebitOutcome::InsufficientFunds {
                required: amount,
                available,
            });
        }

        Ok(DebitOutcome::Applied(state.push_transaction(NewTransaction {
            user_id,
            transaction_type: TransactionType::Withdrawal,
            amount,
            status: TransactionStatus::Pending,
            job_id: None,
            job_title: None,
            reference: generate_reference(),
        })))
    }

    async fn pay_job_advance(
        &self,
        job_id: Uuid,
        organizer_id: Uuid,
        amount: i64,
    ) -> Result<DebitOutcome<(Job, Transaction)>, sqlx::Error> {
        let mut state = self.state.write().await;
        state.user_mut(organizer_id)?;

        let (title, payable) = match state.jobs.iter().find(|j| j.id == job_id) {
            Some(job) => (
                job.title.clone(),
                job.organizer_id == organizer_id
                    && job.status == JobStatus::Draft
                    && !job.advance_paid,
            ),
            None => return Err(sqlx::Error::RowNotFound),
        };

        if !payable {
            return Ok(DebitOutcome::Conflict);
        }

        let available = state.balance(organizer_id);
        if amount > available {
            return Ok(DebitOutcome::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let transaction = state.push_transaction(job_transaction(
            organizer_id,
            job_id,
            &title,
            TransactionType::JobAdvance,
            amount,
        ));

        let job = state.job_mut(job_id).ok_or(sqlx::Error::RowNotFound)?;
        job.advance_paid = true;
        job.status = JobStatus::Open;
        job.updated_at = Utc::now();

        Ok(DebitOutcome::Applied((job.clone(), transaction)))
    }

    async fn settle_job(
        &self,
        job_id: Uuid,
        organizer_id: Uuid,
        plan: &SettlementPlan,
    ) -> Result<DebitOutcome<JobSettlement>, sqlx::Error> {
        let mut state = self.state.write().await;
        state.user_mut(organizer_id)?;

        let job = state
            .jobs
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
            .ok_or(sqlx::Error::RowNotFound)?;

        let payable = matches!(job.status, JobStatus::InProgress | JobStatus::Completed);
        if job.organizer_id != organizer_id
            || !payable
            || !job.advance_paid
            || job.final_paid
            || job.workers.is_empty()
        {
            return Ok(DebitOutcome::Conflict);
        }

        if plan.organizer_debit > 0 {
            let available = state.balance(organizer_id);
            if plan.organizer_debit > available {
                return Ok(DebitOutcome::InsufficientFunds {
                    required: plan.organizer_debit,
                    available,
                });
            }
        }

        let mut organizer_transactions = Vec::new();
        if plan.organizer_debit > 0 {
            organizer_transactions.push(state.push_transaction(job_transaction(
                organizer_id,
                job.id,
                &job.title,
                TransactionType::FinalPayment,
                plan.organizer_debit,
            )));
        }
        if plan.organizer_refund > 0 {
            organizer_transactions.push(state.push_transaction(job_transaction(
                organizer_id,
                job.id,
                &job.title,
                TransactionType::Deposit,
                plan.organizer_refund,
            )));
        }

        let worker_transactions = plan
            .worker_payouts
            .iter()
            .map(|(worker_id, amount)| {
                state.push_transaction(job_transaction(
                    *worker_id,
                    job.id,
                    &job.title,
                    TransactionType::JobPayment,
                    *amount,
                ))
            })
            .collect();

        let settled = state.job_mut(job_id).ok_or(sqlx::Error::RowNotFound)?;
        settled.final_paid = true;
        settled.status = JobStatus::Completed;
        settled.updated_at = Utc::now();

        Ok(DebitOutcome::Applied(JobSettlement {
            previous_status: job.status,
            job: settled.clone(),
            organizer_transactions,
            worker_transactions,
        }))
    }

    async fn settle_pending_withdrawals(&self, older_than: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let mut state = self.state.write().await;
        let mut settled = 0;

        for transaction in state.transactions.iter_mut().filter(|t| {
            t.transaction_type == TransactionType::Withdrawal
                && t.status == TransactionStatus::Pending
                && t.created_at < older_than
        }) {
            transaction.status = TransactionStatus::Completed;
            settled += 1;
        }

        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usermodel::UserRole;
    use chrono::{NaiveDate, NaiveTime};

    async fn seed_user(store: &MemoryStore, email: &str, role: UserRole) -> User {
        store
            .save_user(NewUser {
                name: "Test".to_string(),
                email: email.to_string(),
                phone: "9876543210".to_string(),
                password: "hash".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    async fn open_job(store: &MemoryStore, organizer_id: Uuid, workers_needed: i32) -> Job {
        let job = store
            .create_job(NewJob {
                organizer_id,
                title: "Stage crew".to_string(),
                description: "Set up".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                location: "Mumbai".to_string(),
                pay_per_worker: 100_000,
                workers_needed,
                skills: vec!["lifting".to_string()],
            })
            .await
            .unwrap();
        store
            .update_job_status(job.id, JobStatus::Draft, JobStatus::Open)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "a@example.com", UserRole::Worker).await;
        let result = store
            .save_user(NewUser {
                name: "Other".to_string(),
                email: "A@Example.com".to_string(),
                phone: "9876543210".to_string(),
                password: "hash".to_string(),
                role: UserRole::Organizer,
            })
            .await;
        assert!(matches!(
            result,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation()
        ));
    }

    #[tokio::test]
    async fn test_assign_worker_respects_capacity() {
        let store = MemoryStore::new();
        let organizer = seed_user(&store, "org@example.com", UserRole::Organizer).await;
        let job = open_job(&store, organizer.id, 1).await;

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        assert!(matches!(
            store.assign_worker(job.id, first).await.unwrap(),
            AssignOutcome::Assigned(_)
        ));
        assert_eq!(
            store.assign_worker(job.id, first).await.unwrap(),
            AssignOutcome::AlreadyAssigned
        );
        assert_eq!(store.assign_worker(job.id, second).await.unwrap(), AssignOutcome::Full);

        let job = store.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(job.workers.len(), 1);
    }

    #[tokio::test]
    async fn test_status_update_is_compare_and_set() {
        let store = MemoryStore::new();
        let organizer = seed_user(&store, "org@example.com", UserRole::Organizer).await;
        let job = open_job(&store, organizer.id, 1).await;

        let stale = store
            .update_job_status(job.id, JobStatus::Draft, JobStatus::Open)
            .await
            .unwrap();
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn test_worker_status_frozen_once_job_leaves_progress() {
        let store = MemoryStore::new();
        let organizer = seed_user(&store, "org@example.com", UserRole::Organizer).await;
        let job = open_job(&store, organizer.id, 1).await;
        let worker = Uuid::new_v4();
        store.assign_worker(job.id, worker).await.unwrap();

        // not started yet
        let early = store
            .update_worker_status(job.id, worker, WorkerStatus::Selected, WorkerStatus::Arrived)
            .await
            .unwrap();
        assert!(early.is_none());

        store
            .update_job_status(job.id, JobStatus::Open, JobStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        let arrived = store
            .update_worker_status(job.id, worker, WorkerStatus::Selected, WorkerStatus::Arrived)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(arrived.status, WorkerStatus::Arrived);

        store
            .update_job_status(job.id, JobStatus::InProgress, JobStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        let late = store
            .update_worker_status(job.id, worker, WorkerStatus::Arrived, WorkerStatus::Working)
            .await
            .unwrap();
        assert!(late.is_none());

        let job = store.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(job.workers[0].status, WorkerStatus::Arrived);
    }

    #[tokio::test]
    async fn test_withdraw_cannot_overdraw() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "w@example.com", UserRole::Worker).await;
        store
            .create_transaction(NewTransaction {
                user_id: user.id,
                transaction_type: TransactionType::Deposit,
                amount: 5_000,
                status: TransactionStatus::Completed,
                job_id: None,
                job_title: None,
                reference: generate_reference(),
            })
            .await
            .unwrap();

        assert!(matches!(
            store.withdraw(user.id, 3_000).await.unwrap(),
            DebitOutcome::Applied(_)
        ));
        match store.withdraw(user.id, 3_000).await.unwrap() {
            DebitOutcome::InsufficientFunds { required, available } => {
                assert_eq!(required, 3_000);
                assert_eq!(available, 2_000);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_settle_pending_withdrawals_only_touches_old_ones() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "w@example.com", UserRole::Worker).await;
        store
            .create_transaction(NewTransaction {
                user_id: user.id,
                transaction_type: TransactionType::Deposit,
                amount: 5_000,
                status: TransactionStatus::Completed,
                job_id: None,
                job_title: None,
                reference: generate_reference(),
            })
            .await
            .unwrap();
        store.withdraw(user.id, 1_000).await.unwrap();

        let none = store
            .settle_pending_withdrawals(Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(none, 0);

        let settled = store
            .settle_pending_withdrawals(Utc::now() + chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(settled, 1);
        assert_eq!(store.get_wallet_balance(user.id).await.unwrap(), 4_000);
    }

    #[tokio::test]
    async fn test_notifications_newest_first_and_unread_count() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store
            .create_notifications(None, &[user], "first", "one")
            .await
            .unwrap();
        store
            .create_notifications(None, &[user], "second", "two")
            .await
            .unwrap();

        let list = store.get_notifications(user).await.unwrap();
        assert_eq!(list[0].title, "second");
        assert_eq!(store.get_unread_count(user).await.unwrap(), 2);

        store.mark_notification_read(list[0].id, user).await.unwrap();
        assert_eq!(store.get_unread_count(user).await.unwrap(), 1);
        assert_eq!(store.mark_all_notifications_read(user).await.unwrap(), 1);
        assert_eq!(store.get_unread_count(user).await.unwrap(), 0);
    }
}
