pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod utils;

use std::sync::Arc;

use config::Config;
use db::Store;
use service::{
    job_service::JobService, notification_service::NotificationService,
    wallet_service::WalletService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub store: Arc<dyn Store>,
    pub notification_service: Arc<NotificationService>,
    pub job_service: Arc<JobService>,
    pub wallet_service: Arc<WalletService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let notification_service = Arc::new(NotificationService::new(store.clone()));
        let job_service = Arc::new(JobService::new(store.clone(), notification_service.clone()));
        let wallet_service = Arc::new(WalletService::new(store.clone(), job_service.clone()));

        Self {
            env: config,
            store,
            notification_service,
            job_service,
            wallet_service,
        }
    }
}
