use crate::auth;
use crate::blobs;
use crate::errors::AppError;
use crate::ipinfo;
use crate::models::{
    CreatePlanRequest, FileEntry, IpLookupResponse, LoginRequest, NewProgressRequest,
    NewTaskRequest, Notification, Plan, ProgressEntry, RenameRequest, ReorderRequest,
    RunRequest, SessionResponse, SignupRequest, Stats, TimerRequest, UpdatePlanRequest,
    UpdateTaskRequest,
};
use crate::notify;
use crate::plans;
use crate::state::AppState;
use crate::stats::calculate_stats;
use crate::store;
use crate::ui;
use crate::windows::WindowDescriptor;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use tracing::error;
use uuid::Uuid;

pub async fn index() -> Html<String> {
    Html(ui::render_index())
}

// ---- session / auth ----------------------------------------------------

async fn current_user_id(state: &AppState) -> Result<Uuid, AppError> {
    let session = state.session.lock().await;
    session
        .credentials()
        .map(|(id, _)| id)
        .ok_or_else(|| AppError::auth("not logged in"))
}

fn session_response(user_id: Uuid, password: &str) -> SessionResponse {
    SessionResponse {
        user_id,
        password: password.to_string(),
        codename: ui::codename(&user_id.to_string()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = {
        let tables = state.tables.lock().await;
        auth::login(&tables.users, &req.password)?
    };
    state.session.lock().await.persist(&user).await?;
    Ok(Json(session_response(user.id, &user.password)))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let user = {
        let mut tables = state.tables.lock().await;
        let user = auth::signup(&tables.users, &req.password)?;
        tables.users.push(user.clone());
        store::persist_tables(&state.tables_path, &tables).await?;
        user
    };
    state.session.lock().await.persist(&user).await?;
    Ok((
        StatusCode::CREATED,
        Json(session_response(user.id, &user.password)),
    ))
}

/// Restores the persisted session as-is; the users table is not
/// consulted here.
pub async fn session(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let session = state.session.lock().await;
    let (user_id, password) = session
        .credentials()
        .ok_or_else(|| AppError::auth("no active session"))?;
    Ok(Json(session_response(user_id, password)))
}

pub async fn logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.session.lock().await.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- plans -------------------------------------------------------------

/// Loads the current user's copy of a plan, applies `mutate`, stamps
/// `last_updated` and persists the whole table before returning the
/// updated record. A failed mutation leaves stored state untouched.
async fn mutate_plan<F>(state: &AppState, plan_id: Uuid, mutate: F) -> Result<Plan, AppError>
where
    F: FnOnce(&mut Plan) -> Result<(), AppError>,
{
    let user_id = current_user_id(state).await?;
    let mut tables = state.tables.lock().await;
    let plan = tables
        .plan_mut(user_id, plan_id)
        .ok_or(AppError::NotFound("plan"))?;
    mutate(plan)?;
    plan.last_updated = Utc::now();
    let snapshot = plan.clone();
    store::persist_tables(&state.tables_path, &tables).await?;
    Ok(snapshot)
}

pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<Plan>>, AppError> {
    let user_id = current_user_id(&state).await?;
    let tables = state.tables.lock().await;
    Ok(Json(tables.plans_for(user_id)))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Plan>), AppError> {
    let user_id = current_user_id(&state).await?;
    let plan = plans::new_plan(user_id, req, Utc::now())?;
    let mut tables = state.tables.lock().await;
    tables.plans.push(plan.clone());
    store::persist_tables(&state.tables_path, &tables).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<UpdatePlanRequest>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate_plan(&state, plan_id, |plan| {
        plans::merge_update(plan, req);
        Ok(())
    })
    .await?;
    Ok(Json(plan))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user_id = current_user_id(&state).await?;
    let mut tables = state.tables.lock().await;
    if !tables.delete_plan(user_id, plan_id) {
        return Err(AppError::NotFound("plan"));
    }
    store::persist_tables(&state.tables_path, &tables).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Plan>), AppError> {
    let user_id = current_user_id(&state).await?;
    let mut tables = state.tables.lock().await;
    let original = tables
        .plan_mut(user_id, plan_id)
        .ok_or(AppError::NotFound("plan"))?
        .clone();
    let copy = plans::duplicate_of(&original, Utc::now());
    tables.plans.push(copy.clone());
    store::persist_tables(&state.tables_path, &tables).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn complete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate_plan(&state, plan_id, |plan| {
        plan.progress = 100;
        Ok(())
    })
    .await?;
    Ok(Json(plan))
}

pub async fn save_timer(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<TimerRequest>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate_plan(&state, plan_id, |plan| {
        plan.time_spent = plan.time_spent.saturating_add(req.seconds);
        Ok(())
    })
    .await?;
    Ok(Json(plan))
}

// ---- tasks -------------------------------------------------------------

pub async fn add_task(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<NewTaskRequest>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate_plan(&state, plan_id, |plan| {
        plans::add_task(plan, &req.title, Utc::now())
    })
    .await?;
    Ok(Json(plan))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path((plan_id, task_id)): Path<(Uuid, i64)>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate_plan(&state, plan_id, |plan| {
        plans::update_task(plan, task_id, req)
    })
    .await?;
    Ok(Json(plan))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path((plan_id, task_id)): Path<(Uuid, i64)>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate_plan(&state, plan_id, |plan| plans::delete_task(plan, task_id)).await?;
    Ok(Json(plan))
}

pub async fn reorder_tasks(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate_plan(&state, plan_id, |plan| {
        plans::reorder_tasks(plan, req.from, req.to)
    })
    .await?;
    Ok(Json(plan))
}

// ---- progress log ------------------------------------------------------

pub async fn list_progress(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<Vec<ProgressEntry>>, AppError> {
    let user_id = current_user_id(&state).await?;
    let tables = state.tables.lock().await;
    if tables
        .plans
        .iter()
        .all(|p| !(p.id == plan_id && p.user_id == user_id))
    {
        return Err(AppError::NotFound("plan"));
    }
    Ok(Json(tables.entries_for(plan_id)))
}

/// Appends one history line and bumps the plan by five percent, capped
/// at one hundred.
pub async fn add_progress(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<NewProgressRequest>,
) -> Result<(StatusCode, Json<ProgressEntry>), AppError> {
    if req.description.trim().is_empty() {
        return Err(AppError::validation("progress description is required"));
    }
    let user_id = current_user_id(&state).await?;
    let now = Utc::now();
    let mut tables = state.tables.lock().await;
    let plan = tables
        .plan_mut(user_id, plan_id)
        .ok_or(AppError::NotFound("plan"))?;
    plan.progress = plan.progress.saturating_add(5).min(100);
    plan.last_updated = now;

    let entry = ProgressEntry {
        id: Uuid::new_v4(),
        plan_id,
        user_id,
        description: req.description,
        value: req.value.unwrap_or(1.0),
        created_at: now,
    };
    tables.progress.push(entry.clone());
    store::persist_tables(&state.tables_path, &tables).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// ---- stats & notifications --------------------------------------------

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, AppError> {
    let user_id = current_user_id(&state).await?;
    let tables = state.tables.lock().await;
    Ok(Json(calculate_stats(&tables.plans_for(user_id))))
}

pub async fn get_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user_id = current_user_id(&state).await?;
    let tables = state.tables.lock().await;
    Ok(Json(notify::notifications_for(&tables.plans_for(user_id))))
}

// ---- windows -----------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Deserialize)]
pub struct DragRequest {
    pub phase: DragPhase,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

pub async fn list_windows(State(state): State<AppState>) -> Json<Vec<WindowDescriptor>> {
    Json(state.windows.lock().await.descriptors())
}

pub async fn resize_windows(
    State(state): State<AppState>,
    Json(req): Json<ResizeRequest>,
) -> Json<Vec<WindowDescriptor>> {
    let mut windows = state.windows.lock().await;
    windows.relayout(req.width, req.height);
    Json(windows.descriptors())
}

pub async fn focus_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<WindowDescriptor>> {
    let mut windows = state.windows.lock().await;
    windows.focus(&id);
    Json(windows.descriptors())
}

pub async fn close_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<WindowDescriptor>> {
    let mut windows = state.windows.lock().await;
    windows.close(&id);
    Json(windows.descriptors())
}

pub async fn minimize_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<WindowDescriptor>> {
    let mut windows = state.windows.lock().await;
    windows.minimize(&id);
    Json(windows.descriptors())
}

pub async fn drag_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DragRequest>,
) -> Json<Vec<WindowDescriptor>> {
    let mut windows = state.windows.lock().await;
    match req.phase {
        DragPhase::Start => windows.start_drag(&id, req.x, req.y),
        DragPhase::Move => windows.move_drag(req.x, req.y),
        DragPhase::End => windows.end_drag(),
    }
    Json(windows.descriptors())
}

// ---- files -------------------------------------------------------------

pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileEntry>>, AppError> {
    let user_id = current_user_id(&state).await?;
    Ok(Json(blobs::list(&state.bucket_root, user_id).await?))
}

pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let user_id = current_user_id(&state).await?;
    let name = headers
        .get("x-file-name")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::validation("missing x-file-name header"))?;
    blobs::ensure_within_limit(body.len() as u64)?;
    let object = blobs::upload(&state.bucket_root, user_id, name, &body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "name": object }))))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let user_id = current_user_id(&state).await?;
    let bytes = blobs::download(&state.bucket_root, user_id, &name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = current_user_id(&state).await?;
    blobs::remove(&state.bucket_root, user_id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rename_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = current_user_id(&state).await?;
    let renamed = blobs::rename(&state.bucket_root, user_id, &name, &req.new_name).await?;
    Ok(Json(json!({ "name": renamed })))
}

// ---- ip lookup proxy ---------------------------------------------------

pub async fn get_ipinfo(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<IpLookupResponse>, AppError> {
    let ip = ipinfo::client_ip(&headers, peer)
        .ok_or_else(|| AppError::validation("Could not determine client IP"))?;
    let info = ipinfo::lookup(&state.http, &state.ipapi_url, &ip)
        .await
        .inspect_err(|err| error!("ip lookup failed: {err}"))?;
    Ok(Json(IpLookupResponse {
        source: "server",
        ip,
        info,
    }))
}

pub async fn run_lookup(
    State(state): State<AppState>,
    Query(query): Query<RunRequest>,
    body: Option<Json<RunRequest>>,
) -> Result<Json<IpLookupResponse>, AppError> {
    let ip = body
        .and_then(|Json(req)| req.ip)
        .or(query.ip)
        .map(|ip| ip.trim().to_string())
        .filter(|ip| ipinfo::is_ipv4(ip))
        .ok_or_else(|| AppError::validation("invalid or missing ip"))?;
    let info = ipinfo::lookup(&state.http, &state.ipapi_url, &ip)
        .await
        .inspect_err(|err| error!("ip lookup failed: {err}"))?;
    Ok(Json(IpLookupResponse {
        source: "fallback",
        ip,
        info,
    }))
}
