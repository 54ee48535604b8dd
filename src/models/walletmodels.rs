use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jobmodel::{Job, JobStatus};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "transaction_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    JobPayment,
    JobAdvance,
    FinalPayment,
}

impl TransactionType {
    /// Money flowing into the owner's wallet.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::JobPayment)
    }

    pub fn to_str(&self) -> &str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::JobPayment => "job-payment",
            TransactionType::JobAdvance => "job-advance",
            TransactionType::FinalPayment => "final-payment",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64, // in paise
    pub status: TransactionStatus,
    pub job_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Signed effect on the owner's balance. Pending withdrawals already
    /// count so the same money cannot be withdrawn twice.
    pub fn balance_effect(&self) -> i64 {
        match (self.transaction_type, self.status) {
            (_, TransactionStatus::Failed) => 0,
            (TransactionType::Withdrawal, _) => -self.amount,
            (t, TransactionStatus::Completed) if t.is_credit() => self.amount,
            (_, TransactionStatus::Completed) => -self.amount,
            (_, TransactionStatus::Pending) => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub status: TransactionStatus,
    pub job_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub reference: String,
}

/// Result of a store operation that has to take money out of a wallet.
#[derive(Debug, Clone)]
pub enum DebitOutcome<T> {
    Applied(T),
    InsufficientFunds { required: i64, available: i64 },
    /// The job changed state before the payment could be applied
    Conflict,
}

/// Amounts moved when an organizer settles a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub organizer_debit: i64,
    pub organizer_refund: i64,
    pub worker_payouts: Vec<(Uuid, i64)>,
}

#[derive(Debug, Clone)]
pub struct JobSettlement {
    pub previous_status: JobStatus,
    pub job: Job,
    pub organizer_transactions: Vec<Transaction>,
    pub worker_transactions: Vec<Transaction>,
}

pub fn compute_balance<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> i64 {
    transactions.into_iter().map(Transaction::balance_effect).sum()
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
            reference: "TXN-TEST".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance_counts_completed_credits_and_debits() {
        let txs = vec![
            tx(TransactionType::Deposit, TransactionStatus::Completed, 10_000),
            tx(TransactionType::JobPayment, TransactionStatus::Completed, 5_000),
            tx(TransactionType::JobAdvance, TransactionStatus::Completed, 2_500),
            tx(TransactionType::FinalPayment, TransactionStatus::Completed, 1_000),
        ];
        assert_eq!(compute_balance(&txs), 11_500);
    }

    #[test]
    fn test_pending_withdrawal_reserves_funds() {
        let txs = vec![
            tx(TransactionType::Deposit, TransactionStatus::Completed, 10_000),
            tx(TransactionType::Withdrawal, TransactionStatus::Pending, 4_000),
        ];
        assert_eq!(compute_balance(&txs), 6_000);
    }

    #[test]
    fn test_failed_and_pending_credits_are_ignored() {
        let txs = vec![
            tx(TransactionType::Deposit, TransactionStatus::Pending, 10_000),
            tx(TransactionType::Deposit, TransactionStatus::Failed, 10_000),
            tx(TransactionType::Withdrawal, TransactionStatus::Failed, 3_000),
        ];
        assert_eq!(compute_balance(&txs), 0);
    }
}
