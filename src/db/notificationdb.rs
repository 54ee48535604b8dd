use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::Notification;

const NOTIFICATION_COLUMNS: &str = "id, user_id, job_id, title, message, read, created_at";

#[async_trait]
pub trait NotificationExt {
    /// One record per recipient, all sharing the same title and message.
    async fn create_notifications(
        &self,
        job_id: Option<Uuid>,
        recipients: &[Uuid],
        title: &str,
        message: &str,
    ) -> Result<Vec<Notification>, sqlx::Error>;

    async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error>;

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error>;

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;

    async fn get_unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notifications(
        &self,
        job_id: Option<Uuid>,
        recipients: &[Uuid],
        title: &str,
        message: &str,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        if recipients.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = recipients.iter().map(|_| Uuid::new_v4()).collect();

        let sql = format!(
            r#"
            INSERT INTO notifications (id, user_id, job_id, title, message)
            SELECT n.id, n.user_id, $3, $4, $5
            FROM UNNEST($1::UUID[], $2::UUID[]) AS n(id, user_id)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&sql)
            .bind(ids.as_slice())
            .bind(recipients)
            .bind(job_id)
            .bind(title)
            .bind(message)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let sql = format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&sql)
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn get_unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
