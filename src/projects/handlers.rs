use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::authz::Caller;
use crate::error::ApiError;
use crate::projects::dto::{MessageResponse, ProjectBody};
use crate::projects::repo::{Project, ProjectFields};
use crate::state::AppState;

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", put(update_project).delete(delete_project))
}

#[instrument(skip(state, caller))]
async fn list_projects(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Project>>, ApiError> {
    // The gate contributes the ownership filter to the query itself rather
    // than trimming an unrestricted result.
    let projects = Project::list(&state.db, caller.project_filter()).await?;
    Ok(Json(projects))
}

#[instrument(skip(state, caller, body))]
async fn create_project(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<ProjectBody>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    body.validate()?;

    let project = Project::create(&state.db, &fields(&body), &caller.user_id).await?;

    info!(project_id = %project.id, created_by = %project.created_by, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[instrument(skip(state, caller, body))]
async fn update_project(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<ProjectBody>,
) -> Result<Json<Project>, ApiError> {
    let existing = Project::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("project"))?;
    caller.authorize_project_update(&existing.created_by)?;

    body.validate()?;
    let project = Project::update(&state.db, id, &fields(&body)).await?;

    info!(project_id = %project.id, "project updated");
    Ok(Json(project))
}

#[instrument(skip(state, caller))]
async fn delete_project(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Role check comes first: a non-admin is refused before the registry is
    // even consulted, whatever id they name.
    caller.authorize_project_delete()?;

    if !Project::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("project"));
    }

    info!(project_id = %id, "project deleted");
    Ok(Json(MessageResponse {
        message: "project deleted successfully",
    }))
}

fn fields<'a>(body: &'a ProjectBody) -> ProjectFields<'a> {
    ProjectFields {
        company_name: body.company_name.trim(),
        sector: &body.sector,
        region: &body.region,
        project_status: &body.project_status,
        contact_person: body.contact_person.trim(),
    }
}
