//! Codestral provider.
//!
//! Exposes the Codestral-compatible endpoints:
//! - `GET /v1/models`
//! - `POST /v1/fim/completions`
//!
//! FIM requests are forwarded to Ollama's `/api/generate`.

pub mod stream;
pub mod transform;
pub mod types;

use crate::{error::ProxyError, provider::ProviderContext, server::fallback};
use actix_web::{web, HttpResponse};
use tracing::{error, info};
use types::{FimRequest, GenerateResponse, ModelCard, ModelList};

pub const NAME: &str = "codestral";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/v1/models")
            .route(web::get().to(handle_models))
            .default_service(web::to(fallback)),
    )
    .service(
        web::resource("/v1/fim/completions")
            .route(web::post().to(handle_fim_completions))
            .default_service(web::to(fallback)),
    );
}

async fn handle_models(ctx: web::Data<ProviderContext>) -> HttpResponse {
    HttpResponse::Ok().json(ModelList {
        object: "list".to_string(),
        data: vec![ModelCard {
            id: ctx.default_model().to_string(),
            object: "model".to_string(),
            created: ctx.now_secs(),
            owned_by: "ollama".to_string(),
        }],
    })
}

async fn handle_fim_completions(
    ctx: web::Data<ProviderContext>,
    body: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    fim_completion(&ctx, &body).await.inspect_err(|e| {
        error!(error = %e, "fim completion failed");
    })
}

async fn fim_completion(ctx: &ProviderContext, body: &[u8]) -> Result<HttpResponse, ProxyError> {
    let req: FimRequest = serde_json::from_slice(body)?;
    let generate = transform::map_request(req, ctx.default_model());

    info!(model = %generate.model, stream = generate.stream, "fim");

    let upstream = ctx
        .client
        .post(ctx.config.generate_url())
        .json(&generate)
        .send()
        .await?;

    if !upstream.status().is_success() {
        let status = upstream.status().as_u16();
        let body = upstream.text().await.unwrap_or_default();
        return Err(ProxyError::Backend { status, body });
    }

    if generate.stream {
        let frames = stream::reframe(upstream.bytes_stream(), generate.model, ctx);

        return Ok(HttpResponse::Ok()
            .content_type("text/event-stream")
            .insert_header(("cache-control", "no-cache"))
            .streaming(frames));
    }

    let resp: GenerateResponse = upstream.json().await?;
    let out = transform::map_response(
        resp,
        &generate.model,
        ctx.ids.as_ref(),
        ctx.clock.as_ref(),
    );

    Ok(HttpResponse::Ok().json(out))
}
