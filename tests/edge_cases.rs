//! Edge cases across the full stack

mod common;

use common::{spawn_backend, test_config, test_engine};
use mudra_avatar::avatar::IslAvatar;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_empty_and_whitespace_inputs_make_no_requests() {
    let backend = spawn_backend().await;
    let config = test_config(backend.addr);
    let engine = test_engine(&config);
    let avatar = IslAvatar::with_http_translator(config, engine).expect("avatar");

    avatar.start();
    assert!(avatar.wait_until_ready(Duration::from_secs(5)).await);

    avatar.translate("").await;
    avatar.translate("   ").await;
    avatar.translate("\n\t  \r").await;

    assert_eq!(backend.state.translate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(avatar.translated_text(), "");
    assert!(avatar.last_alert().is_none());
}

#[tokio::test]
async fn test_input_is_trimmed_before_submission() {
    let backend = spawn_backend().await;
    let config = test_config(backend.addr);
    let engine = test_engine(&config);
    let avatar = IslAvatar::with_http_translator(config, engine).expect("avatar");

    avatar.start();
    assert!(avatar.wait_until_ready(Duration::from_secs(5)).await);

    avatar.translate("  hello there  ").await;

    assert_eq!(avatar.translated_text(), "hello there");
    assert_eq!(backend.state.translate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_numeric_keys_order_past_ten_tokens() {
    let backend = spawn_backend().await;
    let config = test_config(backend.addr);
    let engine = test_engine(&config);
    let avatar = IslAvatar::with_http_translator(config, engine).expect("avatar");

    avatar.start();
    assert!(avatar.wait_until_ready(Duration::from_secs(5)).await);

    // Eleven words: the JSON object arrives with keys sorted as
    // strings ("0", "1", "10", "2", ...), so correct playback order
    // requires numeric ordering, not key iteration order
    let words: Vec<String> = (0..11).map(|i| format!("w{}", i)).collect();
    avatar.translate(&words.join(" ")).await;

    assert_eq!(avatar.translated_text(), words.join(" "));

    let played = backend.state.played.lock().unwrap().clone();
    let expected: Vec<String> = words.iter().map(|w| format!("{}.sigml", w)).collect();
    assert_eq!(played, expected);
}

#[tokio::test]
async fn test_array_response_is_accepted() {
    let backend = spawn_backend().await;
    let config = test_config(backend.addr);
    let engine = test_engine(&config);
    let avatar = IslAvatar::with_http_translator(config, engine).expect("avatar");

    avatar.start();
    assert!(avatar.wait_until_ready(Duration::from_secs(5)).await);

    *backend.state.response_override.lock().unwrap() =
        Some(serde_json::json!(["I", "love"]));

    avatar.translate("I love").await;

    assert_eq!(avatar.translated_text(), "I love");
    let played = backend.state.played.lock().unwrap().clone();
    assert_eq!(played, vec!["I.sigml", "love.sigml"]);
}

#[tokio::test]
async fn test_unicode_text_round_trip() {
    let backend = spawn_backend().await;
    let config = test_config(backend.addr);
    let engine = test_engine(&config);
    let avatar = IslAvatar::with_http_translator(config, engine).expect("avatar");

    avatar.start();
    assert!(avatar.wait_until_ready(Duration::from_secs(5)).await);

    avatar.translate("नमस्ते दुनिया").await;

    assert_eq!(avatar.translated_text(), "नमस्ते दुनिया");
    assert!(avatar.last_alert().is_none());

    let played = backend.state.played.lock().unwrap().clone();
    assert_eq!(played, vec!["नमस्ते.sigml", "दुनिया.sigml"]);
}
