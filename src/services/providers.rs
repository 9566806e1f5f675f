// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External collaborators consumed by the core, and trip context resolution.
//!
//! Routing, weather and road-condition lookups are black boxes behind
//! traits. [`TripContextResolver`] calls them with bounded retry and falls
//! back to documented defaults instead of failing the request:
//! - weather -> `Normal`
//! - road -> `Good`
//! - route -> last known route for the same endpoints, else a straight-line estimate
//!
//! Any fallback marks the result approximate.

use crate::models::{GeoPoint, RoadCondition, Route, TripContext, Weather};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Errors from external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("No route between the given points")]
    NoRoute,

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn get_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Route, CollaboratorError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn get(&self, location: GeoPoint) -> Result<Weather, CollaboratorError>;
}

#[async_trait]
pub trait RoadConditionProvider: Send + Sync {
    async fn get(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RoadCondition, CollaboratorError>;
}

// ─── Routing ─────────────────────────────────────────────────

/// Client for an OSRM-compatible `/route/v1/driving` endpoint.
#[derive(Clone)]
pub struct OsrmRouter {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    geometry: Option<String>,
}

impl OsrmRouter {
    /// Create a client for the given endpoint (e.g. `http://localhost:5000`).
    pub fn new(endpoint: &str) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CollaboratorError::Http(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RoutingProvider for OsrmRouter {
    async fn get_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Route, CollaboratorError> {
        // OSRM takes lng,lat pairs
        let url = format!(
            "{}/route/v1/driving/{:.6},{:.6};{:.6},{:.6}",
            self.endpoint, origin.lng, origin.lat, destination.lng, destination.lat
        );

        let response = self
            .http
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "polyline")])
            .send()
            .await
            .map_err(|e| CollaboratorError::Http(e.to_string()))?;

        if !response.status().is_success() && response.status().as_u16() != 400 {
            return Err(CollaboratorError::Http(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let parsed: OsrmRouteResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Api(format!("invalid OSRM response: {}", e)))?;

        match parsed.code.as_str() {
            "Ok" => {}
            "NoRoute" => return Err(CollaboratorError::NoRoute),
            other => {
                return Err(CollaboratorError::Api(format!(
                    "{}: {}",
                    other,
                    parsed.message.unwrap_or_default()
                )))
            }
        }

        let best = parsed
            .routes
            .into_iter()
            .next()
            .ok_or(CollaboratorError::NoRoute)?;

        Ok(Route {
            distance_meters: best.distance,
            duration_seconds: best.duration,
            polyline: best.geometry,
        })
    }
}

/// Route estimate from great-circle distance. Never fails.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRouter {
    /// Road distance / great-circle distance
    pub detour_factor: f64,
    pub average_speed_kmh: f64,
}

impl Default for StraightLineRouter {
    fn default() -> Self {
        Self {
            detour_factor: 1.3,
            average_speed_kmh: 30.0,
        }
    }
}

impl StraightLineRouter {
    pub fn estimate(&self, origin: GeoPoint, destination: GeoPoint) -> Route {
        let distance_meters = origin.distance_meters(&destination) * self.detour_factor;
        let duration_seconds = distance_meters / (self.average_speed_kmh / 3.6);
        Route {
            distance_meters,
            duration_seconds,
            polyline: None,
        }
    }
}

#[async_trait]
impl RoutingProvider for StraightLineRouter {
    async fn get_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Route, CollaboratorError> {
        Ok(self.estimate(origin, destination))
    }
}

// ─── Weather / Road ──────────────────────────────────────────

/// Weather provider that always reports the same condition.
#[derive(Debug, Clone, Copy)]
pub struct StaticWeather(pub Weather);

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn get(&self, _location: GeoPoint) -> Result<Weather, CollaboratorError> {
        Ok(self.0)
    }
}

/// Road-condition provider that always reports the same condition.
#[derive(Debug, Clone, Copy)]
pub struct StaticRoadCondition(pub RoadCondition);

#[async_trait]
impl RoadConditionProvider for StaticRoadCondition {
    async fn get(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
    ) -> Result<RoadCondition, CollaboratorError> {
        Ok(self.0)
    }
}

// ─── Resolution ──────────────────────────────────────────────

/// Run `call` up to `attempts` times with linear backoff.
pub async fn with_retry<T, F, Fut>(
    what: &'static str,
    attempts: u32,
    backoff: Duration,
    mut call: F,
) -> Result<T, CollaboratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            // A missing route will not appear on retry
            Err(CollaboratorError::NoRoute) => return Err(CollaboratorError::NoRoute),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                tracing::debug!(provider = what, attempt, error = %e, "Provider call failed, retrying");
                tokio::time::sleep(backoff * attempt).await;
                attempt += 1;
            }
        }
    }
}

/// Route plus pricing context for a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrip {
    pub route: Route,
    pub context: TripContext,
    pub approximate: bool,
}

/// Endpoints rounded to ~11 m, used to key the last-known-route cache.
type RouteKey = (i64, i64, i64, i64);

fn route_key(origin: &GeoPoint, destination: &GeoPoint) -> RouteKey {
    let q = |v: f64| (v * 10_000.0).round() as i64;
    (q(origin.lat), q(origin.lng), q(destination.lat), q(destination.lng))
}

/// Gathers route, weather and road condition for pricing.
pub struct TripContextResolver {
    routing: Arc<dyn RoutingProvider>,
    weather: Arc<dyn WeatherProvider>,
    roads: Arc<dyn RoadConditionProvider>,
    fallback: StraightLineRouter,
    last_known_routes: DashMap<RouteKey, Route>,
    max_attempts: u32,
    backoff: Duration,
}

impl TripContextResolver {
    pub fn new(
        routing: Arc<dyn RoutingProvider>,
        weather: Arc<dyn WeatherProvider>,
        roads: Arc<dyn RoadConditionProvider>,
        max_attempts: u32,
    ) -> Self {
        Self {
            routing,
            weather,
            roads,
            fallback: StraightLineRouter::default(),
            last_known_routes: DashMap::new(),
            max_attempts,
            backoff: RETRY_BACKOFF,
        }
    }

    /// Override the retry backoff (tests use zero).
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Route between two points. The flag is true when a fallback was used.
    pub async fn route(&self, origin: GeoPoint, destination: GeoPoint) -> (Route, bool) {
        let routing = &self.routing;
        let result = with_retry("routing", self.max_attempts, self.backoff, move || {
            routing.get_route(origin, destination)
        })
        .await;

        let key = route_key(&origin, &destination);
        match result {
            Ok(route) => {
                self.last_known_routes.insert(key, route.clone());
                (route, false)
            }
            Err(e) => {
                if let Some(known) = self.last_known_routes.get(&key) {
                    tracing::warn!(error = %e, "Routing failed, using last known route");
                    (known.clone(), true)
                } else {
                    tracing::warn!(error = %e, "Routing failed, using straight-line estimate");
                    (self.fallback.estimate(origin, destination), true)
                }
            }
        }
    }

    /// Weather and road condition. The flag is true when a default was used.
    pub async fn conditions(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> (Weather, RoadCondition, bool) {
        let weather = &self.weather;
        let roads = &self.roads;
        let (weather, road) = tokio::join!(
            with_retry("weather", self.max_attempts, self.backoff, move || {
                weather.get(origin)
            }),
            with_retry("road_condition", self.max_attempts, self.backoff, move || {
                roads.get(origin, destination)
            }),
        );

        let mut approximate = false;
        let weather = weather.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Weather lookup failed, assuming normal");
            approximate = true;
            Weather::Normal
        });
        let road = road.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Road condition lookup failed, assuming good");
            approximate = true;
            RoadCondition::Good
        });
        (weather, road, approximate)
    }

    /// Everything the fare engine needs for a trip starting at `at`.
    pub async fn resolve(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        at: DateTime<Utc>,
    ) -> ResolvedTrip {
        let ((route, route_approx), (weather, road_condition, conditions_approx)) = tokio::join!(
            self.route(origin, destination),
            self.conditions(origin, destination)
        );

        ResolvedTrip {
            route,
            context: TripContext {
                timestamp: at,
                weather,
                road_condition,
            },
            approximate: route_approx || conditions_approx,
        }
    }
}
