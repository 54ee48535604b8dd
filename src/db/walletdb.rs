use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use super::db::DBClient;
use super::jobdb::fetch_job;
use crate::models::jobmodel::{Job, JobStatus};
use crate::models::walletmodels::*;
use crate::utils::reference::generate_reference;

const TRANSACTION_COLUMNS: &str =
    "id, user_id, transaction_type, amount, status, job_id, job_title, reference, created_at";

// Mirrors Transaction::balance_effect
const BALANCE_SQL: &str = r#"
    SELECT COALESCE(SUM(CASE
        WHEN status = 'failed' THEN 0
        WHEN transaction_type = 'withdrawal' THEN -amount
        WHEN status = 'completed' AND transaction_type IN ('deposit', 'job-payment') THEN amount
        WHEN status = 'completed' THEN -amount
        ELSE 0
    END), 0)::BIGINT
    FROM transactions
    WHERE user_id = $1
"#;

#[async_trait]
pub trait WalletExt {
    async fn create_transaction(&self, transaction: NewTransaction) -> Result<Transaction, sqlx::Error>;

    /// Newest first.
    async fn get_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, sqlx::Error>;

    async fn get_wallet_balance(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;

    /// Records a pending withdrawal if the balance covers it.
    async fn withdraw(&self, user_id: Uuid, amount: i64) -> Result<DebitOutcome<Transaction>, sqlx::Error>;

    /// Debits the advance, flags the job as advance-paid and opens it.
    async fn pay_job_advance(
        &self,
        job_id: Uuid,
        organizer_id: Uuid,
        amount: i64,
    ) -> Result<DebitOutcome<(Job, Transaction)>, sqlx::Error>;

    /// Applies a settlement plan in one step: organizer debit and refund,
    /// worker payouts, `final_paid` and the move to completed.
    async fn settle_job(
        &self,
        job_id: Uuid,
        organizer_id: Uuid,
        plan: &SettlementPlan,
    ) -> Result<DebitOutcome<JobSettlement>, sqlx::Error>;

    /// Completes pending withdrawals created before `older_than`.
    async fn settle_pending_withdrawals(&self, older_than: DateTime<Utc>) -> Result<u64, sqlx::Error>;
}

async fn lock_user(conn: &mut PgConnection, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.is_some())
}

async fn balance_of(conn: &mut PgConnection, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(BALANCE_SQL)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
}

async fn insert_transaction(
    conn: &mut PgConnection,
    transaction: NewTransaction,
) -> Result<Transaction, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO transactions
        (id, user_id, transaction_type, amount, status, job_id, job_title, reference)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        TRANSACTION_COLUMNS
    );

    sqlx::query_as::<_, Transaction>(&sql)
        .bind(Uuid::new_v4())
        .bind(transaction.user_id)
        .bind(transaction.transaction_type)
        .bind(transaction.amount)
        .bind(transaction.status)
        .bind(transaction.job_id)
        .bind(transaction.job_title)
        .bind(transaction.reference)
        .fetch_one(&mut *conn)
        .await
}

fn job_transaction(
    user_id: Uuid,
    job: &Job,
    transaction_type: TransactionType,
    amount: i64,
) -> NewTransaction {
    NewTransaction {
        user_id,
        transaction_type,
        amount,
        status: TransactionStatus::Completed,
        job_id: Some(job.id),
        job_title: Some(job.title.clone()),
        reference: generate_reference(),
    }
}

#[async_trait]
impl WalletExt for DBClient {
    async fn create_transaction(&self, transaction: NewTransaction) -> Result<Transaction, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert_transaction(&mut conn, transaction).await
    }

    async fn get_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE user_id = $1 ORDER BY created_at DESC",
            TRANSACTION_COLUMNS
        );

        sqlx::query_as::<_, Transaction>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_wallet_balance(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(BALANCE_SQL)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn withdraw(&self, user_id: Uuid, amount: i64) -> Result<DebitOutcome<Transaction>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !lock_user(&mut tx, user_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }

        let available = balance_of(&mut tx, user_id).await?;
        if amount > available {
            return Ok(DebitOutcome::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let transaction = insert_transaction(
            &mut tx,
            NewTransaction {
                user_id,
                transaction_type: TransactionType::Withdrawal,
                amount,
                status: TransactionStatus::Pending,
                job_id: None,
                job_title: None,
                reference: generate_reference(),
            },
        )
        .await?;

        tx.commit().await?;

        Ok(DebitOutcome::Applied(transaction))
    }

    async fn pay_job_advance(
        &self,
        job_id: Uuid,
        organizer_id: Uuid,
        amount: i64,
    ) -> Result<DebitOutcome<(Job, Transaction)>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !lock_user(&mut tx, organizer_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }

        let job = match fetch_job(&mut tx, job_id, true).await? {
            Some(job) => job,
            None => return Err(sqlx::Error::RowNotFound),
        };

        if job.organizer_id != organizer_id || job.status != JobStatus::Draft || job.advance_paid {
            return Ok(DebitOutcome::Conflict);
        }

        let available = balance_of(&mut tx, organizer_id).await?;
        if amount > available {
            return Ok(DebitOutcome::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let transaction = insert_transaction(
            &mut tx,
            job_transaction(organizer_id, &job, TransactionType::JobAdvance, amount),
        )
        .await?;

        sqlx::query(
            "UPDATE jobs SET advance_paid = TRUE, status = 'open', updated_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .execute(&mut *tx)
        .await?;

        let job = fetch_job(&mut tx, job_id, false)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;

        Ok(DebitOutcome::Applied((job, transaction)))
    }

    async fn settle_job(
        &self,
        job_id: Uuid,
        organizer_id: Uuid,
        plan: &SettlementPlan,
    ) -> Result<DebitOutcome<JobSettlement>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !lock_user(&mut tx, organizer_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }

        let job = match fetch_job(&mut tx, job_id, true).await? {
            Some(job) => job,
            None => return Err(sqlx::Error::RowNotFound),
        };

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
            let available = balance_of(&mut tx, organizer_id).await?;
            if plan.organizer_debit > available {
                return Ok(DebitOutcome::InsufficientFunds {
                    required: plan.organizer_debit,
                    available,
                });
            }
        }

        let mut organizer_transactions = Vec::new();
        if plan.organizer_debit > 0 {
            organizer_transactions.push(
                insert_transaction(
                    &mut tx,
                    job_transaction(organizer_id, &job, TransactionType::FinalPayment, plan.organizer_debit),
                )
                .await?,
            );
        }
        if plan.organizer_refund > 0 {
            organizer_transactions.push(
                insert_transaction(
                    &mut tx,
                    job_transaction(organizer_id, &job, TransactionType::Deposit, plan.organizer_refund),
                )
                .await?,
            );
        }

        let mut worker_transactions = Vec::with_capacity(plan.worker_payouts.len());
        for (worker_id, amount) in &plan.worker_payouts {
            worker_transactions.push(
                insert_transaction(
                    &mut tx,
                    job_transaction(*worker_id, &job, TransactionType::JobPayment, *amount),
                )
                .await?,
            );
        }

        sqlx::query(
            "UPDATE jobs SET final_paid = TRUE, status = 'completed', updated_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .execute(&mut *tx)
        .await?;

        let settled = fetch_job(&mut tx, job_id, false)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;

        Ok(DebitOutcome::Applied(JobSettlement {
            previous_status: job.status,
            job: settled,
            organizer_transactions,
            worker_transactions,
        }))
    }

    async fn settle_pending_withdrawals(&self, older_than: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'completed'
            WHERE transaction_type = 'withdrawal' AND status = 'pending' AND created_at < $1
            "#,
        )
        .bind(older_than)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
