//! HTTP [`Router`] exposing the GraphQL API.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{MatchedPath, WebSocketUpgrade},
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter},
    Extension, Json, Router,
};
use axum_client_ip::InsecureClientIp;
use derive_more::{Debug, Display, Error};
use http::{header, uri::PathAndQuery, HeaderValue, Method};
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, subscriptions};
use juniper_graphql_ws::ConnectionConfig;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing as log;

use crate::{api, Context, Service};

/// Path serving GraphQL queries and mutations.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Path serving GraphQL subscriptions over WebSocket.
pub const SUBSCRIPTIONS_PATH: &str = "/subscriptions";

/// Origin allowing any other one.
const ANY_ORIGIN: &str = "*";

/// Builds the [`Router`] exposing the GraphQL API of the provided [`Service`]
/// to the provided CORS `origins`.
///
/// # Errors
///
/// If any of the `origins` is not a valid [`HeaderValue`].
pub fn router(
    service: Service,
    origins: &[String],
) -> Result<Router, InvalidOrigin> {
    let schema = api::Schema::new(api::Query, api::Mutation, api::Subscription);

    Ok(Router::new()
        .route(
            GRAPHQL_PATH,
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route(SUBSCRIPTIONS_PATH, get(graphql_ws))
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors(origins)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(record_response),
        ))
}

/// Error of an unparsable CORS origin.
#[derive(Debug, Display, Error)]
#[display("`{origin}` is not a valid CORS origin: {source}")]
pub struct InvalidOrigin {
    /// Rejected origin.
    #[error(not(source))]
    pub origin: String,

    /// Reason of the rejection.
    pub source: header::InvalidHeaderValue,
}

/// Builds the [`CorsLayer`] allowing the provided `origins`.
///
/// [`ANY_ORIGIN`] among them allows every origin.
///
/// # Errors
///
/// If any of the `origins` is not a valid [`HeaderValue`].
pub fn cors(origins: &[String]) -> Result<CorsLayer, InvalidOrigin> {
    let allowed = if origins.iter().any(|o| o == ANY_ORIGIN) {
        AllowOrigin::any()
    } else {
        origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|source| InvalidOrigin {
                    origin: origin.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?
            .into()
    };

    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(allowed))
}

/// Creates the [`tracing::Span`] of the provided HTTP request.
fn request_span(req: &http::Request<Body>) -> tracing::Span {
    let client_ip = InsecureClientIp::from(req.headers(), req.extensions())
        .ok()
        .map(|ip| ip.0.to_string());

    log::info_span!(
        "HTTP request",
        http.client_ip = client_ip,
        http.method = req.method().as_str(),
        http.route = req
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.target = req.uri().path_and_query().map(PathAndQuery::as_str),
        http.user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.status_code = log::field::Empty,
        http.latency_ms = log::field::Empty,
    )
}

/// Records the provided HTTP response into its request [`tracing::Span`].
fn record_response(
    res: &http::Response<Body>,
    latency: Duration,
    span: &tracing::Span,
) {
    let status = res.status();
    _ = span
        .record("http.status_code", status.as_u16())
        .record("http.latency_ms", log::field::display(latency.as_millis()));

    if status.is_server_error() {
        log::error!(parent: span, "responded with `{status}`");
    } else if status.is_client_error() {
        log::warn!(parent: span, "responded with `{status}`");
    } else {
        log::info!(parent: span, "responded with `{status}`");
    }
}

/// [`juniper`] GraphQL response.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response, if it contains errors.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        let status_code = if response.is_ok() {
            http::StatusCode::OK
        } else {
            status_code
        };
        (status_code, Json(response)).into_response()
    }
}

/// Executes GraphQL queries and mutations.
async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    ctx: Context,
    JuniperRequest(req): JuniperRequest,
) -> JuniperResponse {
    let response = req.execute(&*schema, &ctx).await;
    JuniperResponse {
        status_code: ctx.error_status_code(),
        response,
    }
}

/// Upgrades to a WebSocket serving GraphQL subscriptions.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
async fn graphql_ws(
    Extension(schema): Extension<Arc<api::Schema>>,
    ctx: Context,
    ws: WebSocketUpgrade,
) -> Response {
    // Both the `graphql-transport-ws` and the legacy `graphql-ws` clients are
    // served.
    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .max_frame_size(1024)
        .max_message_size(1024)
        .write_buffer_size(512)
        .max_write_buffer_size(1024)
        .on_upgrade(move |socket| {
            subscriptions::serve_ws(
                socket,
                schema,
                ConnectionConfig::new(ctx).with_max_in_flight_operations(10),
            )
        })
}

#[cfg(test)]
mod spec {
    use super::{cors, InvalidOrigin};

    #[test]
    fn allows_listed_origins() {
        let origins = [
            "http://localhost:3000".to_owned(),
            "https://dashboard.example.com".to_owned(),
        ];

        assert!(cors(&origins).is_ok());
    }

    #[test]
    fn allows_any_origin() {
        assert!(cors(&["*".to_owned()]).is_ok());
        assert!(cors(&[]).is_ok());
    }

    #[test]
    fn rejects_malformed_origin() {
        let origins =
            ["http://localhost:3000".to_owned(), "bad\norigin".to_owned()];

        let InvalidOrigin { origin, .. } = cors(&origins).unwrap_err();

        assert_eq!(origin, "bad\norigin");
    }
}
