// Shared harness for integration tests: a temp database and media root, and a
// wiremock server standing in for the Gemini API.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use partscout::api::graphql::{build_schema, PartscoutSchema};
use partscout::api::AppState;
use partscout::config::{
    Config, DatabaseConfig, GeminiConfig, HardwareConfig, ServerConfig, StorageConfig,
};
use partscout::db::{Database, DatabaseBackend, LibSqlBackend};
use partscout::intelligence::HardwareAssistant;
use partscout::llm::GeminiClient;
use partscout::models::{Category, Product};

pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
pub const UPLOAD_START_PATH: &str = "/upload/v1beta/files";
pub const UPLOAD_SESSION_PATH: &str = "/upload-session/test-upload";

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub struct TestApp {
    pub state: AppState,
    pub schema: PartscoutSchema,
    pub server: MockServer,
    pub dir: TempDir,
}

pub fn gemini_config(base_url: String) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("test-key".to_string()),
        base_url,
        timeout_secs: 5,
        ..GeminiConfig::default()
    }
}

pub async fn spawn_app() -> TestApp {
    init_test_logger();

    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_upload_bytes: 1024 * 1024,
        },
        database: DatabaseConfig {
            url: format!("file:{}", dir.path().join("partscout.db").display()),
            auth_token: None,
            local_path: None,
        },
        storage: StorageConfig {
            media_root: dir.path().join("media").display().to_string(),
        },
        gemini: gemini_config(server.uri()),
        hardware: HardwareConfig::default(),
    };

    let db = Database::new(&config.database)
        .await
        .expect("Failed to create database");
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(db));

    let client = GeminiClient::new(&config.gemini).expect("Failed to create Gemini client");
    let assistant = HardwareAssistant::new(Arc::new(client));

    let state = AppState::new(config, db, assistant);
    let schema = build_schema(state.clone());

    TestApp {
        state,
        schema,
        server,
        dir,
    }
}

pub fn generate_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

pub fn api_error_body(code: u16, message: &str) -> Value {
    json!({
        "error": { "code": code, "message": message, "status": "INVALID_ARGUMENT" }
    })
}

/// Mounts both legs of the resumable upload protocol.
pub async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_START_PATH))
        .and(header("x-goog-upload-command", "start"))
        .respond_with(ResponseTemplate::new(200).insert_header(
            "x-goog-upload-url",
            format!("{}{}", server.uri(), UPLOAD_SESSION_PATH),
        ))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_SESSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {
                "name": "files/test-upload",
                "uri": format!("{}/v1beta/files/test-upload", server.uri()),
                "mimeType": "image/png",
                "state": "ACTIVE"
            }
        })))
        .mount(server)
        .await;
}

/// Answers generation calls with `answers` in order; the last answer repeats.
pub async fn mount_answers(server: &MockServer, answers: &[&str]) {
    let bodies: Vec<Value> = answers.iter().map(|text| generate_body(text)).collect();
    let calls = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(move |_request: &Request| {
            let index = calls.fetch_add(1, Ordering::SeqCst).min(bodies.len() - 1);
            ResponseTemplate::new(200).set_body_json(bodies[index].clone())
        })
        .mount(server)
        .await;
}

/// Seeds `count` products `p1..=pN` in a single `gpu` category.
pub async fn seed_products(db: &dyn DatabaseBackend, count: usize) {
    db.upsert_category(&Category {
        id: "gpu".to_string(),
        name: "Graphics Cards".to_string(),
    })
    .await
    .expect("Failed to seed category");

    for i in 1..=count {
        db.upsert_product(&Product {
            id: format!("p{i}"),
            name: format!("Graphics Card {i}"),
            category_id: Some("gpu".to_string()),
            category_name: None,
            description: format!("A graphics card, model {i}"),
        })
        .await
        .expect("Failed to seed product");
    }
}

/// Writes a small PNG-named file into the temp dir for multipart uploads.
pub fn image_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::fs::File {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("Failed to write upload fixture");
    std::fs::File::open(&path).expect("Failed to open upload fixture")
}
