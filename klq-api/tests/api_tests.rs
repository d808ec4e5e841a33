//! Integration tests for the klq-api endpoints
//!
//! Outbound dependencies (content host, translation API) are stubbed with
//! in-process axum servers bound to port 0; the app under test is exercised
//! through `tower::ServiceExt::oneshot` plus real reqwest calls from the
//! pipeline to the stubs.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use klq_api::services::{ReadingConverter, Sampler, SamplerBudgets};
use klq_api::{build_router, AppState};
use klq_common::Config;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for `oneshot`

// =============================================================================
// Stub upstreams
// =============================================================================

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

type RecordMap = Arc<HashMap<String, Value>>;

/// Content host stub: serves `{"content": <base64 with line breaks>}` for
/// known paths, 404 for everything else (the sparse-dataset common case)
async fn spawn_dataset_stub(records: HashMap<String, Value>) -> String {
    let app = Router::new()
        .route("/*path", get(serve_record))
        .with_state(Arc::new(records));
    spawn_server(app).await
}

async fn serve_record(State(records): State<RecordMap>, Path(path): Path<String>) -> Response {
    match records.get(&path) {
        Some(raw) => {
            let encoded = STANDARD.encode(raw.to_string());
            // Real host wraps base64 with embedded line breaks
            let mut wrapped = String::new();
            for (i, c) in encoded.chars().enumerate() {
                if i > 0 && i % 60 == 0 {
                    wrapped.push('\n');
                }
                wrapped.push(c);
            }
            Json(json!({ "content": wrapped })).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Clone)]
struct TranslateStub {
    /// Text batches received, one inner vec per remote call
    requests: Arc<Mutex<Vec<Vec<String>>>>,
    fail: bool,
}

/// Translation API stub: echoes each text with a `·ja` suffix, or answers
/// 500 when `fail` is set
async fn spawn_translate_stub(fail: bool) -> (String, Arc<Mutex<Vec<Vec<String>>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let stub = TranslateStub {
        requests: requests.clone(),
        fail,
    };
    let app = Router::new()
        .route("/translate", post(serve_translation))
        .with_state(stub);
    let base = spawn_server(app).await;
    (format!("{}/translate", base), requests)
}

async fn serve_translation(
    State(stub): State<TranslateStub>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let texts: Vec<String> = pairs
        .into_iter()
        .filter(|(k, _)| k == "text")
        .map(|(_, v)| v)
        .collect();
    stub.requests.lock().unwrap().push(texts.clone());

    if stub.fail {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let translations: Vec<Value> = texts
        .iter()
        .map(|t| json!({ "text": format!("{}·ja", t) }))
        .collect();
    Json(json!({ "translations": translations })).into_response()
}

// =============================================================================
// Test app wiring
// =============================================================================

/// Deterministic converter so ruby assertions don't depend on kakasi output
struct SuffixConverter;

impl ReadingConverter for SuffixConverter {
    fn prepare(&self) {}
    fn convert(&self, line: &str) -> String {
        format!("{}(r)", line)
    }
}

fn test_config(dataset_url: &str, translate_url: Option<&str>) -> Config {
    Config {
        port: 0,
        allowed_origins: Vec::new(),
        dataset_base_url: dataset_url.to_string(),
        dataset_token: None,
        translate_api_url: translate_url.unwrap_or("http://127.0.0.1:1/translate").to_string(),
        translate_api_key: translate_url.map(|_| "test-key".to_string()),
        year_min: 2020,
        year_max: 2020,
    }
}

fn setup_state(dataset_url: &str, translate_url: Option<&str>) -> AppState {
    AppState::with_converter(
        test_config(dataset_url, translate_url),
        Arc::new(SuffixConverter),
    )
    .expect("state should build")
}

/// State whose sampler scans all 100 ranks per month, so a dataset with one
/// populated rank is found deterministically
fn setup_exhaustive_state(dataset_url: &str, translate_url: Option<&str>) -> AppState {
    let mut state = setup_state(dataset_url, translate_url);
    state.sampler = Arc::new(Sampler::with_budgets(
        state.fetcher.clone(),
        state.config.year_min,
        state.config.year_max,
        SamplerBudgets {
            month_attempts: 100,
            ..SamplerBudgets::default()
        },
    ));
    state
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("should read body");
    serde_json::from_slice(&bytes).expect("should parse JSON")
}

/// A three-line record in the nested lyrics schema
fn sample_record(title: &str, genre: &str) -> Value {
    json!({
        "title": title,
        "artist": "테스트 밴드",
        "genre": genre,
        "lyrics": {"lines": ["달빛이 흐르고", "별들이 노래해", "우리 둘만의 밤"]}
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_endpoint() {
    let state = setup_state("http://127.0.0.1:1", None);
    let app = build_router(state);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true);
    assert!(body["timestamp"].is_string());
}

// =============================================================================
// Quiz by month
// =============================================================================

#[tokio::test]
async fn quiz_by_month_end_to_end() {
    // Only rank 7 of 2020-05 has a record; all other ranks are absent
    let dataset = spawn_dataset_stub(HashMap::from([(
        "2020/05/7.json".to_string(),
        sample_record("달의 노래", "K-Pop"),
    )]))
    .await;
    let (translate_url, _) = spawn_translate_stub(false).await;
    let app = build_router(setup_exhaustive_state(&dataset, Some(&translate_url)));

    let response = app
        .oneshot(get_request("/api/quiz?year=2020&month=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "202005007");
    assert_eq!(body["year"], 2020);
    assert_eq!(body["month"], 5);
    assert_eq!(body["rank"], 7);
    assert_eq!(body["title"], "달의 노래");
    assert_eq!(body["genre"], "K-Pop");

    let ko = body["lyricsKoLines"].as_array().unwrap();
    let ja = body["lyricsJaLines"].as_array().unwrap();
    let ruby = body["lyricsJaRubyLines"].as_array().unwrap();
    assert_eq!(ko.len(), 3);
    assert_eq!(ja.len(), 3);
    assert_eq!(ruby.len(), 3);
    assert_eq!(ko[0], "달빛이 흐르고");
    assert_eq!(ja[0], "달빛이 흐르고·ja");
    assert_eq!(ruby[0], "달빛이 흐르고·ja(r)");
}

#[tokio::test]
async fn quiz_by_month_missing_params() {
    let app = build_router(setup_state("http://127.0.0.1:1", None));

    let response = app
        .clone()
        .oneshot(get_request("/api/quiz?year=2020"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "bad_request");

    let response = app.oneshot(get_request("/api/quiz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quiz_by_month_exhaustion_is_502() {
    // Every rank is absent: the sampler must terminate within its attempt
    // budget and answer 502, not spin forever
    let dataset = spawn_dataset_stub(HashMap::new()).await;
    let app = build_router(setup_state(&dataset, None));

    let response = app
        .oneshot(get_request("/api/quiz?year=2020&month=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "fetch_failed");
}

// =============================================================================
// Quiz by code
// =============================================================================

#[tokio::test]
async fn quiz_by_code_fetches_same_record() {
    let dataset = spawn_dataset_stub(HashMap::from([(
        "2020/05/7.json".to_string(),
        sample_record("달의 노래", "K-Pop"),
    )]))
    .await;
    let app = build_router(setup_state(&dataset, None));

    let response = app
        .oneshot(get_request("/api/quiz/code?code=202005007"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["title"], "달의 노래");
    assert_eq!(body["code"], "202005007");
    assert_eq!(body["lyricsKoLines"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn quiz_by_code_malformed_is_400() {
    let app = build_router(setup_state("http://127.0.0.1:1", None));

    for uri in [
        "/api/quiz/code?code=123",
        "/api/quiz/code?code=abc",
        "/api/quiz/code?code=202000007",
        "/api/quiz/code",
    ] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
    }
}

#[tokio::test]
async fn quiz_by_code_absent_record_is_502() {
    let dataset = spawn_dataset_stub(HashMap::new()).await;
    let app = build_router(setup_exhaustive_state(&dataset, None));

    let response = app
        .oneshot(get_request("/api/quiz/code?code=202005007"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "fetch_failed");
}

// =============================================================================
// Quiz random / by genre
// =============================================================================

#[tokio::test]
async fn quiz_random_finds_the_populated_slot() {
    let dataset = spawn_dataset_stub(HashMap::from([(
        "2020/03/1.json".to_string(),
        sample_record("봄 노래", "Ballad"),
    )]))
    .await;
    let app = build_router(setup_exhaustive_state(&dataset, None));

    let response = app.oneshot(get_request("/api/quiz/random")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "202003001");
}

#[tokio::test]
async fn quiz_by_genre_substring_match() {
    let dataset = spawn_dataset_stub(HashMap::from([(
        "2020/03/1.json".to_string(),
        sample_record("봄 노래", "K-Pop Dance"),
    )]))
    .await;
    let app = build_router(setup_state(&dataset, None));

    // "pop" matches "K-Pop Dance" after normalization
    let response = app
        .oneshot(get_request("/api/quiz/genre?genre=pop"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["genre"], "K-Pop Dance");
}

#[tokio::test]
async fn quiz_by_genre_missing_is_400() {
    let app = build_router(setup_state("http://127.0.0.1:1", None));

    let response = app
        .clone()
        .oneshot(get_request("/api/quiz/genre"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get_request("/api/quiz/genre?genre=%20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Translation behavior
// =============================================================================

#[tokio::test]
async fn translation_failure_falls_back_to_source() {
    let dataset = spawn_dataset_stub(HashMap::from([(
        "2020/05/7.json".to_string(),
        sample_record("달의 노래", "K-Pop"),
    )]))
    .await;
    let (translate_url, _) = spawn_translate_stub(true).await;
    let app = build_router(setup_exhaustive_state(&dataset, Some(&translate_url)));

    // Remote 500 must degrade to pass-through, not fail the request
    let response = app
        .oneshot(get_request("/api/quiz?year=2020&month=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["lyricsJaLines"], body["lyricsKoLines"]);
}

#[tokio::test]
async fn no_key_means_pass_through() {
    let dataset = spawn_dataset_stub(HashMap::from([(
        "2020/05/7.json".to_string(),
        sample_record("달의 노래", "K-Pop"),
    )]))
    .await;
    let app = build_router(setup_exhaustive_state(&dataset, None));

    let response = app
        .oneshot(get_request("/api/quiz?year=2020&month=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["lyricsJaLines"], body["lyricsKoLines"]);
}

#[tokio::test]
async fn translate_endpoint() {
    let (translate_url, _) = spawn_translate_stub(false).await;
    let app = build_router(setup_state("http://127.0.0.1:1", Some(&translate_url)));

    let response = app
        .clone()
        .oneshot(post_json("/api/translate", json!({"text": "안녕"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["textJa"], "안녕·ja");

    let response = app
        .oneshot(post_json("/api/translate", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cached_lines_are_not_requested_again() {
    let (translate_url, requests) = spawn_translate_stub(false).await;
    let state = setup_state("http://127.0.0.1:1", Some(&translate_url));

    let line_a = "가사 A".to_string();
    let line_b = "가사 B".to_string();

    // First call translates and caches A
    let out = state.translator.translate_lines(&[line_a.clone()]).await;
    assert_eq!(out, vec!["가사 A·ja"]);

    // Second call must only request B; A comes from the cache
    let out = state
        .translator
        .translate_lines(&[line_a.clone(), line_b.clone()])
        .await;
    assert_eq!(out, vec!["가사 A·ja", "가사 B·ja"]);

    let log = requests.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], vec![line_a]);
    assert_eq!(log[1], vec![line_b]);
}
