//! Actix Web HTTP server.
//!
//! Always-on endpoints:
//! - `GET /` and `GET /health`
//!
//! Everything else comes from the enabled providers (see [`crate::providers`]).
//! Unmatched requests get a JSON 404. CORS preflights are answered by the
//! CORS middleware before routing.

use crate::{
    config::ProxyConfig,
    provider::ProviderContext,
    providers::{self, Provider},
};
use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::header,
    web, App, HttpResponse, HttpServer,
};
use anyhow::{Context, Result};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tracing::info;

/// FIM prompts carry whole source files; actix's 256 KiB default is too small.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub async fn serve(config: ProxyConfig) -> Result<()> {
    let addr = config.listen_addr();

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .read_timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("failed to build reqwest client")?;

    let providers: Arc<[Provider]> =
        providers::enabled_providers(config.providers.as_deref()).into();
    let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();

    info!(addr = %addr, "to-ollama listening");
    info!(ollama = %config.ollama_url, "proxying to ollama");
    info!(model = %config.default_model, "default model");
    info!(providers = %names.join(", "), "providers enabled");

    let ctx = web::Data::new(ProviderContext::new(config, client));

    HttpServer::new(move || build_app(ctx.clone(), providers.clone()))
        .bind(&addr)
        .with_context(|| format!("failed to bind {}", addr))?
        .run()
        .await
        .context("server error")?;

    Ok(())
}

/// Assemble the application: CORS, request logging, health, provider routes
/// and the JSON fallback.
pub fn build_app(
    ctx: web::Data<ProviderContext>,
    providers: Arc<[Provider]>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let health = web::Data::new(HealthInfo {
        ollama: ctx.config.ollama_url.clone(),
        providers: providers.iter().map(|p| p.name()).collect(),
    });

    let mut app = App::new()
        .app_data(ctx)
        .app_data(health)
        .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .route("/", web::get().to(health_check))
        .route("/health", web::get().to(health_check));

    for provider in providers.iter().copied() {
        app = app.configure(|cfg| provider.configure(cfg));
    }

    app.default_service(web::to(fallback))
        .wrap_fn(|req, srv| {
            info!(method = %req.method(), path = %req.path(), "request");
            srv.call(req)
        })
        .wrap(cors())
}

fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
}

struct HealthInfo {
    ollama: String,
    providers: Vec<&'static str>,
}

async fn health_check(info: web::Data<HealthInfo>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "ollama": info.ollama,
        "providers": info.providers,
    }))
}

/// Default handler for unmatched paths and methods.
pub async fn fallback() -> HttpResponse {
    HttpResponse::NotFound().json(json!({"error": "Not found"}))
}
