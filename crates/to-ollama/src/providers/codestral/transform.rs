//! Codestral <-> Ollama translation.
//!
//! - Codestral FIM request -> Ollama `/api/generate` request
//! - Ollama `/api/generate` response -> Codestral FIM response
//! - Ollama stream record -> Codestral stream chunk
//!
//! Everything here is pure apart from the injected id generator and clock.

use super::types::{
    FimChoice, FimChunk, FimRequest, FimResponse, GenerateOptions, GenerateRequest,
    GenerateResponse, Usage, TEXT_COMPLETION,
};
use crate::provider::{Clock, IdGenerator};

const DEFAULT_FINISH_REASON: &str = "stop";

/// Convert a Codestral FIM request into an Ollama generate request.
///
/// Only options the client actually sent are forwarded.
pub fn map_request(req: FimRequest, default_model: &str) -> GenerateRequest {
    let options = GenerateOptions {
        temperature: req.temperature,
        top_p: req.top_p,
        stop: req.stop.map(|s| s.into_vec()),
        num_predict: req.max_tokens,
        seed: req.random_seed,
    };

    let model = req
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_model.to_string());

    GenerateRequest {
        model,
        prompt: req.prompt,
        suffix: req.suffix,
        stream: req.stream.unwrap_or(false),
        options,
    }
}

/// Convert a complete (non-streaming) Ollama response into a Codestral response.
pub fn map_response(
    resp: GenerateResponse,
    model: &str,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> FimResponse {
    let prompt_tokens = resp.prompt_eval_count.unwrap_or(0);
    let completion_tokens = resp.eval_count.unwrap_or(0);

    FimResponse {
        id: ids.generate(),
        object: TEXT_COMPLETION.to_string(),
        model: model.to_string(),
        created: clock.now_secs(),
        choices: vec![FimChoice {
            index: 0,
            text: resp.response,
            finish_reason: Some(finish_reason(resp.done_reason)),
        }],
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    }
}

/// Convert one Ollama stream record into a Codestral stream chunk.
///
/// `finish_reason` stays `null` until the record that carries `done: true`.
pub fn map_stream_record(
    record: GenerateResponse,
    model: &str,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> FimChunk {
    let finish_reason = record.done.then(|| finish_reason(record.done_reason));

    FimChunk {
        id: ids.generate(),
        object: TEXT_COMPLETION.to_string(),
        model: model.to_string(),
        created: clock.now_secs(),
        choices: vec![FimChoice {
            index: 0,
            text: record.response,
            finish_reason,
        }],
    }
}

fn finish_reason(done_reason: Option<String>) -> String {
    done_reason
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string())
}
