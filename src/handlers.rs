use crate::errors::{AppError, TrackerError};
use crate::models::{
    day_key, Dataset, DayRecord, DayResponse, NoteRequest, StatsResponse, StatusResponse,
    ToggleRequest,
};
use crate::remote::RemoteStore;
use crate::state::AppState;
use crate::stats::{build_stats, completion_fraction};
use crate::sync::{DayOp, Tracker};
use crate::tasks::{TaskDefinition, TASKS};
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index<R: RemoteStore>(State(state): State<AppState<R>>) -> Html<String> {
    let tracker = &state.tracker;
    let data = tracker.current_dataset().await;
    let stats = build_stats(tracker.config(), &data);
    Html(render_index(
        tracker.config(),
        &data,
        &stats,
        &tracker.sync_status(),
    ))
}

pub async fn get_tasks() -> Json<&'static [TaskDefinition]> {
    Json(TASKS)
}

pub async fn get_days<R: RemoteStore>(State(state): State<AppState<R>>) -> Json<Dataset> {
    Json(state.tracker.current_dataset().await)
}

pub async fn get_day<R: RemoteStore>(
    State(state): State<AppState<R>>,
    Path(day): Path<usize>,
) -> Result<Json<DayResponse>, AppError> {
    let index = to_index(&state.tracker, day)?;
    let record = state.tracker.record(index).await;
    Ok(Json(to_response(&state.tracker, index, record)))
}

pub async fn get_stats<R: RemoteStore>(State(state): State<AppState<R>>) -> Json<StatsResponse> {
    let data = state.tracker.current_dataset().await;
    Json(build_stats(state.tracker.config(), &data))
}

pub async fn get_status<R: RemoteStore>(State(state): State<AppState<R>>) -> Json<StatusResponse> {
    let tracker = &state.tracker;
    Json(StatusResponse {
        status: tracker.sync_status(),
        authority: tracker.authority(),
        pending_writes: tracker.pending_writes(),
    })
}

pub async fn toggle<R: RemoteStore>(
    State(state): State<AppState<R>>,
    Path(day): Path<usize>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let task = payload.task.trim();
    if task.is_empty() {
        return Err(AppError::bad_request("task must not be empty"));
    }

    let response = apply(&state, day, DayOp::Toggle(task.to_string())).await?;
    Ok(Json(response))
}

pub async fn clear<R: RemoteStore>(
    State(state): State<AppState<R>>,
    Path(day): Path<usize>,
) -> Result<Json<DayResponse>, AppError> {
    let response = apply(&state, day, DayOp::Clear).await?;
    Ok(Json(response))
}

pub async fn save_note<R: RemoteStore>(
    State(state): State<AppState<R>>,
    Path(day): Path<usize>,
    Json(payload): Json<NoteRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let response = apply(&state, day, DayOp::SetNote(payload.note)).await?;
    Ok(Json(response))
}

pub async fn form_toggle<R: RemoteStore>(
    State(state): State<AppState<R>>,
    Path((day, task)): Path<(usize, String)>,
) -> Result<Redirect, AppError> {
    apply(&state, day, DayOp::Toggle(task)).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_clear<R: RemoteStore>(
    State(state): State<AppState<R>>,
    Path(day): Path<usize>,
) -> Result<Redirect, AppError> {
    apply(&state, day, DayOp::Clear).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_note<R: RemoteStore>(
    State(state): State<AppState<R>>,
    Path(day): Path<usize>,
    Form(payload): Form<NoteRequest>,
) -> Result<Redirect, AppError> {
    apply(&state, day, DayOp::SetNote(payload.note)).await?;
    Ok(Redirect::to("/"))
}

async fn apply<R: RemoteStore>(
    state: &AppState<R>,
    day: usize,
    op: DayOp,
) -> Result<DayResponse, AppError> {
    let index = to_index(&state.tracker, day)?;
    let record = state.tracker.mutate(index, op).await?;
    Ok(to_response(&state.tracker, index, record))
}

/// Maps a 1-based day number from the URL to a dataset index.
fn to_index<R>(tracker: &Tracker<R>, day: usize) -> Result<usize, TrackerError> {
    let total = tracker.config().total_days;
    match day.checked_sub(1) {
        Some(index) if index < total => Ok(index),
        _ => Err(TrackerError::DayOutOfRange { day, total }),
    }
}

fn to_response<R>(tracker: &Tracker<R>, index: usize, record: DayRecord) -> DayResponse {
    DayResponse {
        day: index + 1,
        key: day_key(index),
        date: tracker.config().date_of(index).to_string(),
        completed: record.completed_count(),
        fraction: completion_fraction(&record),
        note: record.note().to_string(),
        tasks: record.tasks().to_vec(),
    }
}
