//! HTTP route definitions

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::app::AppState;
use crate::game::data::{
    BuildingData, BuildingType, Race, RaceData, RuleSheet, UnitData, UnitType,
};
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Upper bound for plain HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    // Read-only catalog
    let api_routes = Router::new()
        .route("/api/game/config", get(config_handler))
        .route("/api/game/races", get(races_handler))
        .route("/api/game/buildings", get(buildings_handler))
        .route("/api/game/units", get(units_handler))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_matches: usize,
    players_in_matches: usize,
    connections: usize,
    waiting_room: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_matches: state.server.registry().active_matches(),
        players_in_matches: state.server.registry().bound_players(),
        connections: state.connections.connection_count(),
        waiting_room: state.server.waiting_room_size(),
    })
}

// ============================================================================
// Catalog endpoints
// ============================================================================

async fn config_handler(State(state): State<AppState>) -> Json<RuleSheet> {
    Json(RuleSheet::new(state.config.building_phase_secs))
}

async fn races_handler() -> Json<BTreeMap<Race, RaceData>> {
    Json(Race::ALL.into_iter().map(|r| (r, RaceData::for_race(r))).collect())
}

async fn buildings_handler() -> Json<BTreeMap<BuildingType, BuildingData>> {
    Json(
        BuildingType::ALL
            .into_iter()
            .map(|b| (b, BuildingData::for_type(b)))
            .collect(),
    )
}

async fn units_handler() -> Json<BTreeMap<UnitType, UnitData>> {
    Json(
        UnitType::ALL
            .into_iter()
            .map(|u| (u, UnitData::for_type(u)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        build_router(AppState::new(config))
    }

    async fn get_json(path: &str) -> serde_json::Value {
        let response = router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_an_idle_server() {
        let json = get_json("/health").await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["active_matches"], 0);
        assert_eq!(json["waiting_room"], 0);
    }

    #[tokio::test]
    async fn catalog_is_keyed_by_wire_names() {
        let buildings = get_json("/api/game/buildings").await;
        assert_eq!(buildings.as_object().unwrap().len(), BuildingType::ALL.len());
        assert_eq!(buildings["human_barracks"]["cost"], 150);
        assert_eq!(buildings["human_market"]["incomeBonus"], 5);

        let units = get_json("/api/game/units").await;
        assert_eq!(units["fire_imp"]["category"], "ranged");

        let races = get_json("/api/game/races").await;
        assert_eq!(races.as_object().unwrap().len(), 4);

        let config = get_json("/api/game/config").await;
        assert_eq!(config["buildingPhaseDuration"], 120);
        assert_eq!(config["startingGold"], 500);
    }
}
