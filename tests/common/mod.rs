//! In-process translation backend and asset host for integration tests
//!
//! Serves the same surface the real backend does: `POST /` for
//! translation, the engine bootstrap assets and the per-token sign
//! files under `/static`.

#![allow(dead_code)]

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use mudra_avatar::config::{AvatarConfig, TimingConfig};
use mudra_avatar::engines::HostedSignEngine;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct Backend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

#[derive(Default)]
pub struct BackendState {
    /// Number of translation requests received
    pub translate_calls: AtomicUsize,
    /// Sign file names fetched by the engine, in request order
    pub played: Mutex<Vec<String>>,
    /// Respond 500 to translation requests
    pub fail_translation: AtomicBool,
    /// Serve the engine script asset
    pub serve_script: AtomicBool,
    /// Fixed translation response instead of echoing the input words
    pub response_override: Mutex<Option<serde_json::Value>>,
}

#[derive(Deserialize)]
struct TranslateForm {
    text: String,
}

async fn translate(
    State(state): State<Arc<BackendState>>,
    Form(form): Form<TranslateForm>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state.translate_calls.fetch_add(1, Ordering::SeqCst);

    if state.fail_translation.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if let Some(value) = state.response_override.lock().unwrap().clone() {
        return Ok(Json(value));
    }

    // Echo the input words as the numeric-keyed object the real
    // backend produces
    let mut words = serde_json::Map::new();
    for (index, word) in form.text.split_whitespace().enumerate() {
        words.insert(
            index.to_string(),
            serde_json::Value::String(word.to_string()),
        );
    }
    Ok(Json(serde_json::Value::Object(words)))
}

async fn stylesheet() -> &'static str {
    "/* cwasa styles */"
}

async fn script(State(state): State<Arc<BackendState>>) -> Result<&'static str, StatusCode> {
    if state.serve_script.load(Ordering::SeqCst) {
        Ok("// cwasa engine")
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn sign_file(
    State(state): State<Arc<BackendState>>,
    Path(file): Path<String>,
) -> Result<String, StatusCode> {
    if !file.ends_with(".sigml") {
        return Err(StatusCode::NOT_FOUND);
    }

    state.played.lock().unwrap().push(file.clone());
    let gloss = file.trim_end_matches(".sigml");
    Ok(format!("<sigml><hns_sign gloss=\"{}\"/></sigml>", gloss))
}

pub async fn spawn_backend() -> Backend {
    let state = Arc::new(BackendState {
        serve_script: AtomicBool::new(true),
        ..BackendState::default()
    });

    let app = Router::new()
        .route("/", post(translate))
        .route("/static/css/cwasa.css", get(stylesheet))
        .route("/static/js/allcsa.js", get(script))
        .route("/static/SignFiles/:file", get(sign_file))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test backend");
    });

    Backend { addr, state }
}

/// Avatar config pointed at the test backend, with fast timings
pub fn test_config(addr: SocketAddr) -> AvatarConfig {
    let mut config = AvatarConfig::default();
    config.assets.base_url = format!("http://{}/static", addr);
    config.translator.endpoint = format!("http://{}/", addr);
    config.timing = TimingConfig {
        script_settle_ms: 10,
        register_poll_interval_ms: 10,
        register_poll_max_attempts: 50,
        ready_settle_ms: 10,
        sign_gap_ms: 30,
    };
    config
}

/// Hosted engine pointed at the test backend, registering quickly
pub fn test_engine(config: &AvatarConfig) -> Arc<HostedSignEngine> {
    Arc::new(
        HostedSignEngine::new(&config.assets)
            .expect("hosted engine")
            .with_registration_latency(Duration::from_millis(20)),
    )
}
