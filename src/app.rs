use crate::{modules, types::Context};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors, trace};

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub fn build_router(ctx: Arc<Context>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .nest("/api", modules::get_router())
        .with_state(ctx.clone())
        .layer(Extension(ctx))
        .layer(trace::TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_methods([Method::OPTIONS, Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(cors::Any),
        )
}

pub struct App {
    ctx: Arc<Context>,
    router: Router,
}

impl App {
    pub fn new(ctx: Arc<Context>) -> Self {
        let router = build_router(ctx.clone());

        Self { ctx, router }
    }

    pub async fn serve(self) {
        let listener = TcpListener::bind(format!("{}:{}", self.ctx.app.host, self.ctx.app.port))
            .await
            .unwrap_or_else(|err| {
                tracing::error!("{}", err);
                panic!(
                    "Failed to bind to {}:{}",
                    self.ctx.app.host, self.ctx.app.port
                )
            });

        tracing::info!(
            "App is running on {}:{}",
            self.ctx.app.host,
            self.ctx.app.port
        );

        axum::serve(listener, self.router)
            .await
            .unwrap_or_else(|err| {
                tracing::error!("{}", err);
                panic!("Server stopped unexpectedly")
            });
    }
}
