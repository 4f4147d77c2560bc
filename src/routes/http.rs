//! HTTP endpoint handlers. These are thin wrappers that forward to `AppState`.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::domain::{ItemId, Topic, TopicId};
use crate::error::Result;
use crate::protocol::*;
use crate::routes::extract::{ApiJson, ApiPath, ApiQuery};
use crate::session::{TrainingSession, TrainingTemplate};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_profiles(State(state): State<Arc<AppState>>) -> Json<Vec<ProfileOut>> {
  Json(state.registry.iter().map(profile_out).collect())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_plan(
  State(state): State<Arc<AppState>>,
  ApiQuery(q): ApiQuery<PlanQuery>,
) -> Result<Json<PlanOut>> {
  let plan = state.plan(&q.difficulty_profile, q.amount)?;
  Ok(Json(PlanOut { difficulty_profile: q.difficulty_profile, amount: q.amount, plan }))
}

#[instrument(level = "info", skip(state, body), fields(name = %body.name))]
pub async fn http_post_topic(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<TopicIn>,
) -> (StatusCode, Json<Topic>) {
  let topic = state.add_topic(&body.name, body.items_type).await;
  (StatusCode::CREATED, Json(topic))
}

#[instrument(level = "info", skip(state, body), fields(difficulty = %body.difficulty, text_len = body.text.len()))]
pub async fn http_post_item(
  State(state): State<Arc<AppState>>,
  ApiPath(topic_id): ApiPath<TopicId>,
  ApiJson(body): ApiJson<ItemIn>,
) -> Result<(StatusCode, Json<ItemOut>)> {
  let id = state.add_item(topic_id, body.difficulty, body.kind, &body.text).await?;
  Ok((StatusCode::CREATED, Json(ItemOut { id })))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_topic_stats(
  State(state): State<Arc<AppState>>,
  ApiPath(topic_id): ApiPath<TopicId>,
) -> Result<Json<TopicStatsOut>> {
  let counts = state.topic_stats(topic_id).await?;
  Ok(Json(TopicStatsOut { topic: topic_id, counts: tier_counts(counts) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_matching_items(
  State(state): State<Arc<AppState>>,
  ApiPath(topic_id): ApiPath<TopicId>,
  ApiQuery(q): ApiQuery<MatchingQuery>,
) -> Result<Json<MatchingOut>> {
  let (plan, result) = state
    .matching_items(topic_id, &q.difficulty_profile, q.amount, q.user.as_deref())
    .await?;
  info!(target: "allocation", topic = topic_id, code = %q.difficulty_profile, returned = result.len(), shortfall = result.shortfall(), "HTTP matching items served");
  Ok(Json(MatchingOut {
    plan,
    requested: result.requested,
    shortfall: result.shortfall(),
    items: result.items,
  }))
}

#[instrument(level = "info", skip(state, body), fields(user = %body.user))]
pub async fn http_post_submission(
  State(state): State<Arc<AppState>>,
  ApiPath((topic_id, item_id)): ApiPath<(TopicId, ItemId)>,
  ApiJson(body): ApiJson<SubmissionIn>,
) -> Result<StatusCode> {
  state.record_submission(&body.user, topic_id, item_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body), fields(rules = body.rules.len()))]
pub async fn http_post_template(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<TemplateIn>,
) -> Result<(StatusCode, Json<TrainingTemplate>)> {
  let rules: Vec<(TopicId, String, i64)> = body
    .rules
    .into_iter()
    .map(|r| (r.topic, r.difficulty_profile, r.amount))
    .collect();
  let template = state.create_template(&body.name, &rules).await?;
  Ok((StatusCode::CREATED, Json(template)))
}

#[instrument(level = "info", skip(state, body), fields(template = %body.template_id, trainee = %body.trainee))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<SessionIn>,
) -> Result<(StatusCode, Json<TrainingSession>)> {
  let session = state.create_session(&body.template_id, &body.trainee).await?;
  info!(target: "allocation", session = %session.id, items = session.entries.len(), shortfall = session.shortfall(), "HTTP session created");
  Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  ApiPath(session_id): ApiPath<String>,
) -> Result<Json<TrainingSession>> {
  Ok(Json(state.get_session(&session_id).await?))
}
