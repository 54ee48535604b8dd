use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::{Store, WalletExt},
    models::{
        jobmodel::{Job, JobStatus},
        usermodel::User,
        walletmodels::*,
    },
    service::{error::ServiceError, job_service::JobService, lifecycle},
    utils::reference::generate_reference,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionTab {
    All,
    Deposits,
    Withdrawals,
    Payments,
}

impl TransactionTab {
    pub fn includes(&self, transaction_type: TransactionType) -> bool {
        match self {
            TransactionTab::All => true,
            TransactionTab::Deposits => matches!(
                transaction_type,
                TransactionType::Deposit | TransactionType::JobPayment
            ),
            TransactionTab::Withdrawals => transaction_type == TransactionType::Withdrawal,
            TransactionTab::Payments => matches!(
                transaction_type,
                TransactionType::JobAdvance | TransactionType::FinalPayment
            ),
        }
    }
}

impl FromStr for TransactionTab {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TransactionTab::All),
            "deposits" => Ok(TransactionTab::Deposits),
            "withdrawals" => Ok(TransactionTab::Withdrawals),
            "payments" => Ok(TransactionTab::Payments),
            other => Err(ServiceError::Validation(format!("Unknown tab: {}", other))),
        }
    }
}

/// Amounts in paise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSummary {
    pub balance: i64,
    pub pending_withdrawals: i64,
    pub pending_withdrawal_count: usize,
    pub pending_payments: i64,
    pub pending_payment_count: usize,
}

pub fn summarize(balance: i64, transactions: &[Transaction]) -> WalletSummary {
    let pending = |tab: TransactionTab| -> (i64, usize) {
        transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending && tab.includes(t.transaction_type))
            .fold((0, 0), |(sum, count), t| (sum + t.amount, count + 1))
    };

    let (pending_withdrawals, pending_withdrawal_count) = pending(TransactionTab::Withdrawals);
    let (pending_payments, pending_payment_count) = pending(TransactionTab::Payments);

    WalletSummary {
        balance,
        pending_withdrawals,
        pending_withdrawal_count,
        pending_payments,
        pending_payment_count,
    }
}

fn ensure_positive(amount: i64) -> Result<(), ServiceError> {
    if amount <= 0 {
        return Err(ServiceError::Validation("Amount must be a positive number".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct WalletService {
    store: Arc<dyn Store>,
    job_service: Arc<JobService>,
}

impl WalletService {
    pub fn new(store: Arc<dyn Store>, job_service: Arc<JobService>) -> Self {
        Self { store, job_service }
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self.store.get_wallet_balance(user_id).await?)
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<WalletSummary, ServiceError> {
        let balance = self.store.get_wallet_balance(user_id).await?;
        let transactions = self.store.get_transactions(user_id).await?;
        Ok(summarize(balance, &transactions))
    }

    /// Newest first.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        tab: Option<&str>,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let tab = tab
            .map(|t| t.parse::<TransactionTab>())
            .transpose()?
            .unwrap_or(TransactionTab::All);

        let transactions = self.store.get_transactions(user_id).await?;
        Ok(transactions
            .into_iter()
            .filter(|t| tab.includes(t.transaction_type))
            .collect())
    }

    /// There is no payment gateway: deposits complete immediately.
    pub async fn deposit(&self, user_id: Uuid, amount: i64) -> Result<Transaction, ServiceError> {
        ensure_positive(amount)?;

        let transaction = self
            .store
            .create_transaction(NewTransaction {
                user_id,
                transaction_type: TransactionType::Deposit,
                amount,
                status: TransactionStatus::Completed,
                job_id: None,
                job_title: None,
                reference: generate_reference(),
            })
            .await?;

        tracing::info!(
            "Deposit {} of {} paise for user {}",
            transaction.reference,
            amount,
            user_id
        );

        Ok(transaction)
    }

    /// Recorded as pending until the settlement job completes it.
    pub async fn withdraw(&self, user_id: Uuid, amount: i64) -> Result<Transaction, ServiceError> {
        ensure_positive(amount)?;

        match self.store.withdraw(user_id, amount).await? {
            DebitOutcome::Applied(transaction) => {
                tracing::info!(
                    "Withdrawal {} of {} paise requested by user {}",
                    transaction.reference,
                    amount,
                    user_id
                );
                Ok(transaction)
            }
            DebitOutcome::InsufficientFunds { required, available } => {
                Err(ServiceError::InsufficientFunds { required, available })
            }
            DebitOutcome::Conflict => Err(ServiceError::Conflict(
                "Withdrawal could not be applied, please try again".to_string(),
            )),
        }
    }

    /// Pays 25% of the total cost and publishes the job.
    pub async fn pay_advance(
        &self,
        actor: &User,
        job_id: Uuid,
    ) -> Result<(Job, Transaction), ServiceError> {
        let job = self.job_service.owned_job(actor, job_id).await?;
        if job.advance_paid || job.status != JobStatus::Draft {
            return Err(ServiceError::Conflict(
                "The advance for this job has already been paid".to_string(),
            ));
        }

        let amount = lifecycle::job_advance(&job)?;
        if amount <= 0 {
            return Err(ServiceError::Validation(
                "The advance for this job rounds to nothing, raise the pay".to_string(),
            ));
        }

        match self.store.pay_job_advance(job_id, actor.id, amount).await? {
            DebitOutcome::Applied((job, transaction)) => {
                tracing::info!(
                    "Advance of {} paise paid for job {}, job is now open",
                    amount,
                    job_id
                );
                Ok((job, transaction))
            }
            DebitOutcome::InsufficientFunds { required, available } => {
                Err(ServiceError::InsufficientFunds { required, available })
            }
            DebitOutcome::Conflict => Err(ServiceError::Conflict(format!(
                "Job {} changed before the advance could be paid",
                job_id
            ))),
        }
    }

    /// Pays every assigned worker and completes the job if it was still
    /// running.
    pub async fn pay_final(&self, actor: &User, job_id: Uuid) -> Result<JobSettlement, ServiceError> {
        let job = self.job_service.owned_job(actor, job_id).await?;

        if !matches!(job.status, JobStatus::InProgress | JobStatus::Completed) {
            return Err(ServiceError::InvalidTransition(
                "the final payment is due once the job has started".to_string(),
            ));
        }
        if !job.advance_paid {
            return Err(ServiceError::InvalidTransition(
                "the advance has not been paid".to_string(),
            ));
        }
        if job.final_paid {
            return Err(ServiceError::Conflict(
                "The final payment for this job has already been made".to_string(),
            ));
        }
        if job.workers.is_empty() {
            return Err(ServiceError::InvalidTransition(
                "there are no workers to pay".to_string(),
            ));
        }

        let plan = lifecycle::settlement_plan(&job)?;

        match self.store.settle_job(job_id, actor.id, &plan).await? {
            DebitOutcome::Applied(settlement) => {
                tracing::info!(
                    "Final payment for job {}: {} worker(s) paid, organizer debited {} paise",
                    job_id,
                    settlement.worker_transactions.len(),
                    plan.organizer_debit
                );
                if settlement.previous_status == JobStatus::InProgress {
                    self.job_service.finish_job(&settlement.job).await;
                }
                Ok(settlement)
            }
            DebitOutcome::InsufficientFunds { required, available } => {
                Err(ServiceError::InsufficientFunds { required, available })
            }
            DebitOutcome::Conflict => Err(ServiceError::Conflict(format!(
                "Job {} changed before the final payment could be made",
                job_id
            ))),
        }
    }

    pub async fn settle_pending_withdrawals(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        Ok(self.store.settle_pending_withdrawals(older_than).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(transaction_type: TransactionType, status: TransactionStatus, amount: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            transaction_type,
            amount,
            status,
            job_id: None,
            job_title: None,
            reference: generate_reference(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_tabs() {
        assert!(TransactionTab::Deposits.includes(TransactionType::JobPayment));
        assert!(!TransactionTab::Deposits.includes(TransactionType::Withdrawal));
        assert!(TransactionTab::Payments.includes(TransactionType::FinalPayment));
        assert!(TransactionTab::All.includes(TransactionType::JobAdvance));
        assert!("refunds".parse::<TransactionTab>().is_err());
    }

    #[test]
    fn test_summary_counts_pending() {
        let transactions = vec![
            tx(TransactionType::Withdrawal, TransactionStatus::Pending, 2_000),
            tx(TransactionType::Withdrawal, TransactionStatus::Pending, 3_000),
            tx(TransactionType::Withdrawal, TransactionStatus::Completed, 9_000),
            tx(TransactionType::JobAdvance, TransactionStatus::Pending, 1_000),
        ];
        let summary = summarize(10_000, &transactions);
        assert_eq!(summary.pending_withdrawals, 5_000);
        assert_eq!(summary.pending_withdrawal_count, 2);
        assert_eq!(summary.pending_payments, 1_000);
        assert_eq!(summary.pending_payment_count, 1);
    }
}
