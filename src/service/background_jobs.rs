use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::{
    service::{error::ServiceError, wallet_service::WalletService},
    AppState,
};

const SETTLEMENT_TICK_SECS: u64 = 60;

/// Completes pending withdrawals older than `settle_after`.
pub async fn run_withdrawal_settlement(
    wallet_service: &WalletService,
    settle_after: Duration,
) -> Result<u64, ServiceError> {
    let delay = chrono::Duration::from_std(settle_after)
        .map_err(|e| ServiceError::Validation(format!("Invalid settlement delay: {}", e)))?;

    wallet_service
        .settle_pending_withdrawals(Utc::now() - delay)
        .await
}

/// Start background job for settling withdrawals
pub async fn start_withdrawal_settlement_job(app_state: Arc<AppState>) {
    let settle_after = Duration::from_secs(app_state.env.withdrawal_settlement_secs);
    let mut interval = interval(Duration::from_secs(SETTLEMENT_TICK_SECS));

    loop {
        interval.tick().await;

        match run_withdrawal_settlement(&app_state.wallet_service, settle_after).await {
            Ok(0) => tracing::debug!("Withdrawal settlement: nothing to settle"),
            Ok(count) => tracing::info!("Withdrawal settlement completed {} withdrawal(s)", count),
            Err(e) => tracing::error!("Withdrawal settlement job failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, Store, UserExt};
    use crate::models::usermodel::{NewUser, UserRole};
    use crate::service::{job_service::JobService, notification_service::NotificationService};

    #[tokio::test]
    async fn test_settlement_completes_due_withdrawals() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let notifications = Arc::new(NotificationService::new(store.clone()));
        let jobs = Arc::new(JobService::new(store.clone(), notifications));
        let wallet = WalletService::new(store.clone(), jobs);

        let user = store
            .save_user(NewUser {
                name: "Meera".to_string(),
                email: "meera@example.com".to_string(),
                phone: "9876543210".to_string(),
                password: "hash".to_string(),
                role: UserRole::Worker,
            })
            .await
            .unwrap();

        wallet.deposit(user.id, 10_000).await.unwrap();
        wallet.withdraw(user.id, 4_000).await.unwrap();

        let not_yet = run_withdrawal_settlement(&wallet, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(not_yet, 0);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let settled = run_withdrawal_settlement(&wallet, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(settled, 1);

        let summary = wallet.summary(user.id).await.unwrap();
        assert_eq!(summary.balance, 6_000);
        assert_eq!(summary.pending_withdrawal_count, 0);
    }
}
