use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        jobdtos::*,
        walletdtos::{PaymentResultDto, TransactionDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", get(get_jobs).post(create_job))
        .route("/dashboard", get(get_dashboard))
        .route("/:job_id", get(get_job).patch(update_job))
        .route("/:job_id/status", put(update_job_status))
        .route("/:job_id/apply", post(apply_to_job))
        .route("/:job_id/workers/:worker_id", put(select_worker))
        .route("/:job_id/applicants/:worker_id/reject", put(reject_applicant))
        .route("/:job_id/worker-status", put(update_worker_status))
        .route("/:job_id/notify", post(notify_workers))
        .route("/:job_id/advance", post(pay_advance))
        .route("/:job_id/final", post(pay_final))
}

pub async fn get_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<JobQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .job_service
        .board(&auth.user, params.tab.as_deref(), params.q.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        "Jobs retrieved successfully",
        JobDto::from_jobs(&jobs),
    )))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.create_job(&auth.user, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Job created successfully",
            JobDto::from_job(&job),
        )),
    ))
}

pub async fn get_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let dashboard = app_state.job_service.dashboard(&auth.user).await?;

    Ok(Json(ApiResponse::success(
        "Dashboard retrieved successfully",
        DashboardDto {
            recent: JobDto::from_jobs(&dashboard.recent),
            active: JobDto::from_jobs(&dashboard.active),
        },
    )))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.get_job_by_id(job_id).await?;

    Ok(Json(ApiResponse::success(
        "Job retrieved successfully",
        JobDto::from_job(&job),
    )))
}

pub async fn update_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .update_job(&auth.user, job_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Job updated successfully",
        JobDto::from_job(&job),
    )))
}

pub async fn update_job_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<JobStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .transition_job_status(&auth.user, job_id, body.status)
        .await?;

    Ok(Json(ApiResponse::success(
        "Job status updated successfully",
        JobDto::from_job(&job),
    )))
}

pub async fn apply_to_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.apply_to_job(&auth.user, job_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Application submitted successfully",
            JobDto::from_job(&job),
        )),
    ))
}

pub async fn select_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((job_id, worker_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<SelectWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .select_worker(&auth.user, job_id, worker_id, body.selected)
        .await?;

    let message = if body.selected {
        "Worker selected successfully"
    } else {
        "Worker unselected successfully"
    };

    Ok(Json(ApiResponse::success(message, JobDto::from_job(&job))))
}

pub async fn reject_applicant(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((job_id, worker_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .reject_applicant(&auth.user, job_id, worker_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application rejected",
        JobDto::from_job(&job),
    )))
}

pub async fn update_worker_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<WorkerStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .transition_worker_status(&auth.user, job_id, auth.user.id, body.status)
        .await?;

    Ok(Json(ApiResponse::success(
        "Status updated successfully",
        JobDto::from_job(&job),
    )))
}

pub async fn notify_workers(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<NotifyWorkersDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let notifications = app_state
        .job_service
        .send_notification_to_workers(&auth.user, job_id, &body.recipients, &body.title, &body.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Notification sent", notifications)),
    ))
}

pub async fn pay_advance(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let (job, transaction) = app_state
        .wallet_service
        .pay_advance(&auth.user, job_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Advance paid, the job is now open for applications",
        PaymentResultDto {
            job: JobDto::from_job(&job),
            transactions: vec![TransactionDto::from_transaction(&transaction)],
        },
    )))
}

pub async fn pay_final(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let settlement = app_state
        .wallet_service
        .pay_final(&auth.user, job_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Final payment completed",
        PaymentResultDto {
            job: JobDto::from_job(&settlement.job),
            transactions: TransactionDto::from_transactions(&settlement.organizer_transactions),
        },
    )))
}
