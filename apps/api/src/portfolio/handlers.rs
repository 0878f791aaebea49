use axum::{
    extract::{FromRequest, Path, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::{AppError, StoreError};
use crate::models::profile::{Profile, ProfileFields};
use crate::models::project::{Project, ProjectFields};
use crate::models::skill::{Skill, SkillFields};
use crate::portfolio::explore::{build_explore, ExploreFeed};
use crate::portfolio::icons::{self, IconRender};
use crate::portfolio::search::{search, SearchQuery, SearchResults};
use crate::state::AppState;

/// `Json` whose rejections (bad syntax, wrong types, missing content type)
/// come back in the same error envelope as every other failure.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Skill as returned to clients, with its icon already resolved.
#[derive(Serialize)]
pub struct SkillView {
    #[serde(flatten)]
    pub skill: Skill,
    pub icon_render: IconRender,
}

impl From<Skill> for SkillView {
    fn from(skill: Skill) -> Self {
        let icon_render = icons::resolve(skill.icon.as_deref(), &skill.name);
        SkillView { skill, icon_render }
    }
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Ids that do not parse cannot name an existing record.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// GET /api/profile
/// An absent profile is `{}` with 200, never an error.
pub async fn handle_get_profile(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let body = match state.store.get_profile().await? {
        Some(profile) => json!(profile),
        None => json!({}),
    };
    Ok(Json(body))
}

/// POST /api/profile
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    AppJson(fields): AppJson<ProfileFields>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.store.upsert_profile(fields).await?))
}

/// PUT /api/profile
pub async fn handle_replace_profile(
    State(state): State<AppState>,
    AppJson(fields): AppJson<ProfileFields>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.store.replace_profile(fields).await?))
}

/// GET /api/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillView>>, AppError> {
    let skills = state.store.list_skills().await?;
    Ok(Json(skills.into_iter().map(SkillView::from).collect()))
}

/// POST /api/skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    AppJson(fields): AppJson<SkillFields>,
) -> Result<Json<SkillView>, AppError> {
    Ok(Json(state.store.create_skill(fields).await?.into()))
}

/// PUT /api/skills/:id
pub async fn handle_update_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(fields): AppJson<SkillFields>,
) -> Result<Json<SkillView>, AppError> {
    let id = parse_id(&id).ok_or_else(|| StoreError::not_found("Skill", &id))?;
    Ok(Json(state.store.update_skill(id, fields).await?.into()))
}

/// DELETE /api/skills/:id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    if let Some(id) = parse_id(&id) {
        state.store.delete_skill(id).await?;
    }
    Ok(Json(DeleteResponse { success: true }))
}

/// GET /api/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.store.list_projects().await?))
}

/// POST /api/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    AppJson(fields): AppJson<ProjectFields>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(state.store.create_project(fields).await?))
}

/// PUT /api/projects/:id
pub async fn handle_update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(fields): AppJson<ProjectFields>,
) -> Result<Json<Project>, AppError> {
    let id = parse_id(&id).ok_or_else(|| StoreError::not_found("Project", &id))?;
    Ok(Json(state.store.update_project(id, fields).await?))
}

/// DELETE /api/projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    if let Some(id) = parse_id(&id) {
        state.store.delete_project(id).await?;
    }
    Ok(Json(DeleteResponse { success: true }))
}

/// GET /api/explore
pub async fn handle_explore(State(state): State<AppState>) -> Result<Json<ExploreFeed>, AppError> {
    let projects = state.store.list_projects().await?;
    Ok(Json(build_explore(projects)))
}

/// GET /api/search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResults>, AppError> {
    let skills = state.store.list_skills().await?;
    let projects = state.store.list_projects().await?;
    Ok(Json(search(&params.q, skills, projects)))
}
