//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::domain::Location;
use crate::resolver::{ResolveError, shortest_route};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/geocode", get(geocode))
        .route("/route", post(route))
        .route("/matrix", post(matrix))
        .route("/shortest", post(shortest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve a free-form address.
async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<LocationResult>, AppError> {
    let location = state
        .geocoder
        .find(&query.q, state.cache())
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("Could not find '{}'", query.q),
        })?;

    Ok(Json(LocationResult::from_location(&location)))
}

/// Route between two points.
async fn route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResult>, AppError> {
    let from = point(&req.from, "from")?;
    let to = point(&req.to, "to")?;

    let route = state
        .router
        .calculate_route(&from, &to, state.cache())
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("No route from {from} to {to}"),
        })?;

    Ok(Json(RouteResult::from_route(&route)))
}

/// Durations from many starts to one destination.
async fn matrix(
    State(state): State<AppState>,
    Json(req): Json<MatrixRequest>,
) -> Result<Json<MatrixResponse>, AppError> {
    let destination = point(&req.destination, "destination")?;
    let starts = req
        .starts
        .iter()
        .enumerate()
        .map(|(i, p)| point(p, &format!("starts[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let routes = state.router.calculate_matrix(&destination, &starts).await?;
    let shortest = index_of_shortest(&routes)?;

    Ok(Json(MatrixResponse {
        routes: routes.iter().map(RouteResult::from_route).collect(),
        shortest,
    }))
}

/// Pick the fastest of the given routes.
async fn shortest(Json(req): Json<ShortestRequest>) -> Result<Json<ShortestResponse>, AppError> {
    let index = index_of_shortest(&req.routes)?;
    Ok(Json(ShortestResponse {
        index,
        route: RouteResult::from_route(&req.routes[index]),
    }))
}

fn index_of_shortest(routes: &[crate::domain::Route]) -> Result<usize, AppError> {
    let best = shortest_route(routes)?;
    Ok(routes
        .iter()
        .position(|r| std::ptr::eq(r, best))
        .unwrap_or_default())
}

fn point(input: &PointInput, field: &str) -> Result<Location, AppError> {
    if !input.is_valid() {
        return Err(AppError::BadRequest {
            message: format!(
                "Invalid coordinates for {field}: {},{}",
                input.latitude, input.longitude
            ),
        });
    }
    Ok(input.to_location())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Upstream { message: String },
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::InvalidArgument(message) => AppError::BadRequest { message },
            ResolveError::Provider { .. } => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
        };

        if status.is_server_error() {
            tracing::warn!(%status, "{message}");
        } else {
            tracing::debug!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GeoCache;
    use crate::domain::Route;
    use crate::providers::mock::{MockGeocoder, MockMatrix, MockRouter, Reply};
    use crate::providers::{GeocodeProvider, MatrixProvider, RouteProvider};
    use crate::resolver::{Geocoder, GeocoderConfig, Router as RouteResolver, RouterConfig};
    use crate::supervisor::Unmanaged;
    use axum::body::Body;
    use axum::http::{Request, header};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(matrix: Reply<Vec<f64>>) -> Router {
        let geocoders: Vec<Box<dyn GeocodeProvider>> = vec![Box::new(MockGeocoder::found(
            "mapquest",
            Location::named("Münster", 51.9625, 7.6256),
        ))];
        let routers: Vec<Box<dyn RouteProvider>> =
            vec![Box::new(MockRouter::found("osrm-local", 1800.0, 62.5))];
        let matrix: Box<dyn MatrixProvider> = Box::new(MockMatrix::new(matrix));

        let state = AppState::new(
            Geocoder::new(GeocoderConfig::default(), geocoders),
            RouteResolver::new(RouterConfig::default(), Arc::new(Unmanaged), routers, matrix),
            Some(GeoCache::in_memory(GeoCache::ONE_DAY)),
        );
        create_router(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let response = app(Reply::Ok(vec![])).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn geocode_found() {
        let (status, json) = send(app(Reply::Ok(vec![])), get("/geocode?q=M%C3%BCnster")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["label"], "Münster");
        assert_eq!(json["latitude"], 51.9625);
    }

    #[tokio::test]
    async fn geocode_blank_is_bad_request() {
        let (status, json) = send(app(Reply::Ok(vec![])), get("/geocode?q=%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn route_between_points() {
        let body = serde_json::json!({
            "from": {"latitude": 51.96, "longitude": 7.62, "name": "Home"},
            "to": {"latitude": 51.51, "longitude": 7.46, "name": "Work"}
        });
        let (status, json) = send(app(Reply::Ok(vec![])), post("/route", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["duration_secs"], 1800.0);
        assert_eq!(json["from"]["label"], "Home");
        assert_eq!(json["summary"], "[Home -> Work; 62,5 km, 00:30:00 h]");
    }

    #[tokio::test]
    async fn route_with_bad_coordinates() {
        let body = serde_json::json!({
            "from": {"latitude": 123.0, "longitude": 7.62},
            "to": {"latitude": 51.51, "longitude": 7.46}
        });
        let (status, _) = send(app(Reply::Ok(vec![])), post("/route", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn matrix_reports_shortest() {
        let body = serde_json::json!({
            "destination": {"latitude": 51.96, "longitude": 7.62},
            "starts": [
                {"latitude": 51.51, "longitude": 7.46},
                {"latitude": 51.67, "longitude": 7.81},
                {"latitude": 52.03, "longitude": 8.53}
            ]
        });
        let (status, json) =
            send(app(Reply::Ok(vec![300.0, 120.0, 450.0])), post("/matrix", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["shortest"], 1);
        assert_eq!(json["routes"].as_array().unwrap().len(), 3);
        assert!(json["routes"][0]["distance_km"].is_null());
    }

    #[tokio::test]
    async fn matrix_without_starts_is_bad_request() {
        let body = serde_json::json!({
            "destination": {"latitude": 51.96, "longitude": 7.62},
            "starts": []
        });
        let (status, _) = send(app(Reply::Ok(vec![])), post("/matrix", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn matrix_provider_failure_is_bad_gateway() {
        let body = serde_json::json!({
            "destination": {"latitude": 51.96, "longitude": 7.62},
            "starts": [{"latitude": 51.51, "longitude": 7.46}]
        });
        let (status, _) = send(
            app(Reply::Fail("table down".to_string())),
            post("/matrix", body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn shortest_of_posted_routes() {
        let routes = vec![
            Route { duration: 200.0, ..Route::empty() },
            Route { duration: 100.0, ..Route::empty() },
            Route { duration: 100.0, ..Route::empty() },
        ];
        let body = serde_json::json!({ "routes": routes });
        let (status, json) = send(app(Reply::Ok(vec![])), post("/shortest", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["index"], 1);
        assert_eq!(json["route"]["duration_secs"], 100.0);
    }

    #[tokio::test]
    async fn shortest_of_nothing_is_bad_request() {
        let body = serde_json::json!({ "routes": [] });
        let (status, _) = send(app(Reply::Ok(vec![])), post("/shortest", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
