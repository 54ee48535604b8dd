use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{NotificationExt, Store},
    models::{jobmodel::Job, notificationmodel::Notification},
    service::error::ServiceError,
};

pub const JOB_STARTED_TITLE: &str = "Work has started!";
pub const JOB_COMPLETED_TITLE: &str = "Work has been completed!";
pub const WORKER_SELECTED_TITLE: &str = "You've been selected for a job!";

pub fn job_started_message(job_title: &str) -> String {
    format!(
        "The organizer has started the job: {}. Please check in when you arrive.",
        job_title
    )
}

pub fn job_completed_message(job_title: &str) -> String {
    format!(
        "The organizer has marked the job: {} as completed. Your payment will be processed soon.",
        job_title
    )
}

pub fn worker_selected_message(job_title: &str) -> String {
    format!(
        "You've been selected for the job: {}. Check your dashboard for details.",
        job_title
    )
}

/// First occurrence wins, order preserved.
fn dedup_recipients(recipients: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    recipients
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Records one notification per distinct recipient.
    pub async fn send_to_workers(
        &self,
        job_id: Uuid,
        recipients: &[Uuid],
        title: &str,
        message: &str,
    ) -> Result<Vec<Notification>, ServiceError> {
        let recipients = dedup_recipients(recipients);
        if recipients.is_empty() {
            return Ok(Vec::new());
        }

        let notifications = self
            .store
            .create_notifications(Some(job_id), &recipients, title, message)
            .await?;

        tracing::info!(
            "Sent '{}' to {} worker(s) for job {}",
            title,
            notifications.len(),
            job_id
        );

        Ok(notifications)
    }

    pub async fn notify_job_started(&self, job: &Job) -> Result<Vec<Notification>, ServiceError> {
        self.send_to_workers(
            job.id,
            &job.worker_ids(),
            JOB_STARTED_TITLE,
            &job_started_message(&job.title),
        )
        .await
    }

    pub async fn notify_job_completed(&self, job: &Job) -> Result<Vec<Notification>, ServiceError> {
        self.send_to_workers(
            job.id,
            &job.worker_ids(),
            JOB_COMPLETED_TITLE,
            &job_completed_message(&job.title),
        )
        .await
    }

    pub async fn notify_worker_selected(
        &self,
        job: &Job,
        worker_id: Uuid,
    ) -> Result<Vec<Notification>, ServiceError> {
        self.send_to_workers(
            job.id,
            &[worker_id],
            WORKER_SELECTED_TITLE,
            &worker_selected_message(&job.title),
        )
        .await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.store.get_notifications(user_id).await?)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self.store.get_unread_count(user_id).await?)
    }

    pub async fn mark_as_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<Notification, ServiceError> {
        self.store
            .mark_notification_read(notification_id, user_id)
            .await?
            .ok_or(ServiceError::NotificationNotFound(notification_id))
    }

    pub async fn mark_all_as_read(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let updated = self.store.mark_all_notifications_read(user_id).await?;
        tracing::debug!("Marked {} notification(s) read for user {}", updated, user_id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_recipients(&[a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_templates() {
        assert_eq!(
            job_started_message("Stage crew"),
            "The organizer has started the job: Stage crew. Please check in when you arrive."
        );
        assert_eq!(
            worker_selected_message("Stage crew"),
            "You've been selected for the job: Stage crew. Check your dashboard for details."
        );
    }

    #[tokio::test]
    async fn test_send_to_workers_one_per_recipient() {
        let service = NotificationService::new(Arc::new(MemoryStore::new()));
        let job_id = Uuid::new_v4();
        let worker = Uuid::new_v4();

        let sent = service
            .send_to_workers(job_id, &[worker, worker], "Hello", "Bring gloves")
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user_id, worker);
        assert_eq!(sent[0].job_id, Some(job_id));

        let empty = service
            .send_to_workers(job_id, &[], "Hello", "Nobody")
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_mark_as_read_is_scoped_to_recipient() {
        let service = NotificationService::new(Arc::new(MemoryStore::new()));
        let worker = Uuid::new_v4();
        let sent = service
            .send_to_workers(Uuid::new_v4(), &[worker], "Hello", "Hi")
            .await
            .unwrap();

        let other = service.mark_as_read(Uuid::new_v4(), sent[0].id).await;
        assert!(matches!(other, Err(ServiceError::NotificationNotFound(_))));

        let read = service.mark_as_read(worker, sent[0].id).await.unwrap();
        assert!(read.read);
        // idempotent
        assert!(service.mark_as_read(worker, sent[0].id).await.unwrap().read);
        assert_eq!(service.unread_count(worker).await.unwrap(), 0);
    }
}
