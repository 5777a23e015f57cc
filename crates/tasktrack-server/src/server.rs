use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware as app_middleware, state::AppState};

/// Builds the full application router.
///
/// Task routes sit behind the authentication middleware; auth routes, the
/// health endpoint, and the fallback do not.
pub fn build_app(state: AppState) -> Router {
    let task_routes = Router::new()
        .route(
            "/api/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/api/tasks/{id}",
            put(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::authenticate,
        ));

    Router::new()
        .route("/health", get(handlers::system::health))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .merge(task_routes)
        .fallback(handlers::system::route_not_found)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri()
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .with_state(state)
}

pub struct TasktrackServer {
    addr: SocketAddr,
    app: Router,
}

impl TasktrackServer {
    pub fn new(addr: SocketAddr, app: Router) -> Self {
        Self { addr, app }
    }

    /// Binds and serves until ctrl-c.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "Server listening");
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
