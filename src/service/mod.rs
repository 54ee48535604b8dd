pub mod background_jobs;
pub mod error;
pub mod job_board;
pub mod job_service;
pub mod lifecycle;
pub mod notification_service;
pub mod wallet_service;
