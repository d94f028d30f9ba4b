use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;

use crease_engine::{
    DeliveryOutcome, InMemoryRoster, InningsAggregate, InningsSummary, MatchState, Openers,
    ReplayCheck, Scorer, TeamSnapshot, Toss, UndoOutcome,
};
use crease_ledger::{BallRecord, InMemoryBallLedger};
use crease_types::{Delivery, InningsId, MatchId, PlayerId, TypeError};

use crate::auth::{Action, AuthProvider, Credentials, Identity};
use crate::error::{ServerError, ServerResult};
use crate::extract::Payload;

pub type LiveScorer = Scorer<Arc<InMemoryRoster>, InMemoryBallLedger>;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<LiveScorer>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(scorer: LiveScorer, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            scorer: Arc::new(scorer),
            auth,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub team_a: TeamSnapshot,
    pub team_b: TeamSnapshot,
    pub overs: u32,
    pub toss: Toss,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInningsRequest {
    pub striker_id: PlayerId,
    pub non_striker_id: PlayerId,
    pub bowler_id: PlayerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    pub player_id: PlayerId,
}

/// Authenticate the caller and check `action` against its role.
async fn gate(state: &AppState, headers: &HeaderMap, action: Action) -> ServerResult<Identity> {
    let credentials = Credentials::from_headers(headers);
    let identity = state.auth.authenticate(&credentials).await?;
    if !state.auth.authorize(&identity, &action).await? {
        if matches!(credentials, Credentials::Anonymous) {
            return Err(ServerError::Unauthenticated(format!(
                "credentials required to {action}"
            )));
        }
        return Err(ServerError::Forbidden {
            action: action.to_string(),
        });
    }
    Ok(identity)
}

fn parse_id<T: FromStr<Err = TypeError>>(raw: &str) -> ServerResult<T> {
    raw.parse::<T>()
        .map_err(|e| ServerError::Engine(e.into()))
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": "crease-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---- Commands ----

pub async fn create_match(
    State(state): State<AppState>,
    headers: HeaderMap,
    Payload(request): Payload<CreateMatchRequest>,
) -> ServerResult<(StatusCode, Json<MatchState>)> {
    let identity = gate(&state, &headers, Action::Score).await?;
    let created = state.scorer.register_match_with_teams(
        request.team_a,
        request.team_b,
        request.overs,
        request.toss,
    )?;
    tracing::info!(match_id = %created.id, by = %identity.name, "match created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn start_innings(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    headers: HeaderMap,
    Payload(request): Payload<StartInningsRequest>,
) -> ServerResult<(StatusCode, Json<InningsAggregate>)> {
    gate(&state, &headers, Action::Score).await?;
    let match_id: MatchId = parse_id(&match_id)?;
    let innings = state.scorer.start_innings(
        &match_id,
        Openers {
            striker: request.striker_id,
            non_striker: request.non_striker_id,
            bowler: request.bowler_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(innings)))
}

pub async fn record_delivery(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
    Payload(delivery): Payload<Delivery>,
) -> ServerResult<(StatusCode, Json<DeliveryOutcome>)> {
    gate(&state, &headers, Action::Score).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    let outcome = state.scorer.record_delivery(&innings_id, &delivery)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn undo_delivery(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<UndoOutcome>> {
    gate(&state, &headers, Action::Score).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(state.scorer.undo_last_delivery(&innings_id)?))
}

pub async fn swap_strike(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<InningsAggregate>> {
    gate(&state, &headers, Action::Score).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(state.scorer.swap_strike(&innings_id)?))
}

pub async fn set_bowler(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
    Payload(request): Payload<PlayerRequest>,
) -> ServerResult<Json<InningsAggregate>> {
    gate(&state, &headers, Action::Score).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(
        state
            .scorer
            .set_current_bowler(&innings_id, request.player_id)?,
    ))
}

pub async fn replace_batsman(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
    Payload(request): Payload<PlayerRequest>,
) -> ServerResult<Json<InningsAggregate>> {
    gate(&state, &headers, Action::Score).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(
        state.scorer.replace_batsman(&innings_id, request.player_id)?,
    ))
}

// ---- Reads ----

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<MatchState>> {
    gate(&state, &headers, Action::Read).await?;
    let match_id: MatchId = parse_id(&match_id)?;
    Ok(Json(state.scorer.match_state(&match_id)?))
}

pub async fn get_innings(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<InningsAggregate>> {
    gate(&state, &headers, Action::Read).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(state.scorer.innings(&innings_id)?))
}

pub async fn get_balls(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<Vec<BallRecord>>> {
    gate(&state, &headers, Action::Read).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(state.scorer.ball_records(&innings_id)?))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<InningsSummary>> {
    gate(&state, &headers, Action::Read).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(state.scorer.summary(&innings_id)?))
}

pub async fn get_replay(
    State(state): State<AppState>,
    Path(innings_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<ReplayCheck>> {
    gate(&state, &headers, Action::Read).await?;
    let innings_id: InningsId = parse_id(&innings_id)?;
    Ok(Json(state.scorer.verify_replay(&innings_id)?))
}
