use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    graphql::{SchemaType, SharedRegistry, Viewer},
};

const SESSION_COOKIE: &str = "hr_session";

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "hr dashboard listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

/// Credentialed CORS needs an explicit origin list; without one, cross-origin
/// requests are allowed but carry no cookies.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let layer = CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET]);
    if allowed.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_credentials(true)
            .allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/graphql", post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    // Accepted and ignored: any credentials sign in.
    #[serde(default)]
    #[allow(dead_code)]
    password: String,
}

async fn login_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(body): Json<LoginRequest>,
) -> HttpResult<(PrivateCookieJar, Json<Viewer>)> {
    let viewer = Viewer::sign_in(&body.email);
    let value =
        serde_json::to_string(&viewer).map_err(|err| HttpError::internal(err.into()))?;
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::days(7))
        .build();
    info!(email = %viewer.email, "viewer signed in");
    Ok((jar.add(cookie), Json(viewer)))
}

async fn logout_handler(jar: PrivateCookieJar) -> (PrivateCookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, StatusCode::NO_CONTENT)
}

async fn graphql_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    request: GraphQLRequest,
) -> HttpResult<GraphQLResponse> {
    let viewer = load_viewer(&jar)?;
    let req = request.into_inner().data(viewer);
    let response = state.schema.execute(req).await;
    Ok(GraphQLResponse::from(response))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let employees = match state.registry.lock() {
        Ok(registry) => Some(registry.list().len()),
        Err(_) => {
            warn!("employee registry lock poisoned");
            None
        }
    };
    Json(HealthResponse {
        ok: employees.is_some(),
        employees: employees.unwrap_or_default(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    employees: usize,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

fn load_viewer(jar: &PrivateCookieJar) -> HttpResult<Viewer> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .ok_or_else(|| HttpError::new(StatusCode::UNAUTHORIZED, "missing session"))?;
    serde_json::from_str(cookie.value())
        .map_err(|_| HttpError::new(StatusCode::UNAUTHORIZED, "invalid session"))
}

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
        }
    }

    fn internal(err: anyhow::Error) -> Self {
        warn!(error = %err, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::body::Body;
    use http_body_util::BodyExt;
    use platform_store::MemoryStore;
    use products_hr::EmployeeRegistry;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::graphql::{GraphqlData, build_schema};

    fn test_state() -> AppState {
        let registry: SharedRegistry = Arc::new(Mutex::new(EmployeeRegistry::open(Arc::new(
            MemoryStore::new(),
        ))));
        let schema = build_schema(GraphqlData {
            registry: registry.clone(),
        });
        let config = AppConfig {
            store: Default::default(),
            data_dir: None,
            cookie_key: Key::generate(),
            cors_allowed_origins: vec!["http://localhost:5173".into()],
            secure_cookies: false,
        };
        AppState {
            registry,
            schema,
            cookie_key: config.cookie_key.clone(),
            config: Arc::new(config),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn graphql_request(query: &str, cookie: Option<&str>) -> http::Request<Body> {
        let mut builder = http::Request::post("/graphql")
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(http::header::COOKIE, cookie);
        }
        builder
            .body(Body::from(json!({ "query": query }).to_string()))
            .unwrap()
    }

    async fn sign_in(router: Router) -> String {
        let response = router
            .oneshot(
                http::Request::post("/login")
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"email": "ops@company.com", "password": "x"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(http::header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap()
            .to_string();
        let viewer = body_json(response).await;
        assert_eq!(viewer["name"], json!("Admin User"));
        assert_eq!(viewer["email"], json!("ops@company.com"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_employee_count() {
        let router = build_router(test_state());
        let response = router
            .oneshot(http::Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["employees"], json!(4));
    }

    #[tokio::test]
    async fn graphql_requires_session() {
        let router = build_router(test_state());
        let response = router
            .oneshot(graphql_request("{ version }", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn forged_session_cookie_is_rejected() {
        let router = build_router(test_state());
        let response = router
            .oneshot(graphql_request("{ version }", Some("hr_session=not-encrypted")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signed_in_viewer_can_query() {
        let router = build_router(test_state());
        let cookie = sign_in(router.clone()).await;
        let response = router
            .oneshot(graphql_request(
                "{ me { email } employees { id } }",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["me"]["email"], json!("ops@company.com"));
        assert_eq!(body["data"]["employees"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn validation_errors_reach_the_client() {
        let router = build_router(test_state());
        let cookie = sign_in(router.clone()).await;
        let response = router
            .oneshot(graphql_request(
                r#"mutation { createEmployee(input: { firstName: "Ada" }) { persisted } }"#,
                Some(&cookie),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        let error = &body["errors"][0];
        assert_eq!(error["extensions"]["code"], json!("VALIDATION"));
        assert_eq!(
            error["extensions"]["fields"]["lastName"],
            json!("Last name is required")
        );
        assert!(error["extensions"]["fields"].get("firstName").is_none());
    }

    #[tokio::test]
    async fn logout_clears_session_cookie() {
        let router = build_router(test_state());
        let cookie = sign_in(router.clone()).await;
        let response = router
            .oneshot(
                http::Request::post("/logout")
                    .header(http::header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let set_cookie = response
            .headers()
            .get(http::header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert!(set_cookie.starts_with("hr_session="));
    }
}
