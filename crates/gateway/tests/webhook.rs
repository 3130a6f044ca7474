//! Integration tests for the webhook and note endpoints.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use {
    async_trait::async_trait,
    base64::{Engine as _, engine::general_purpose::STANDARD},
    hmac::{Hmac, Mac},
    secrecy::Secret,
    sha2::Sha256,
    tokio::net::TcpListener,
};

use {
    tutorbot_agents::{AnswerError, AnswerService},
    tutorbot_common::types::StudentRecord,
    tutorbot_config::{DataConfig, RoutingConfig},
    tutorbot_gateway::{GatewayState, build_gateway_app},
    tutorbot_line::ReplyOutbound,
    tutorbot_routing::{RouterSettings, SessionRouter, messages},
    tutorbot_sessions::{BindingRecord, BindingStore, InMemoryBindingStore},
    tutorbot_students::{FsNoteStore, FsStudentDirectory},
};

const SECRET: &str = "test-channel-secret";

struct StubAnswers;

#[async_trait]
impl AnswerService for StubAnswers {
    async fn generate_reply(&self, _record: &StudentRecord) -> Result<String, AnswerError> {
        Ok("summary".into())
    }

    async fn analyze_question(
        &self,
        _question: &str,
        default_subject: Option<&str>,
    ) -> Result<String, AnswerError> {
        Ok(format!("analysis for {}", default_subject.unwrap_or("everyone")))
    }

    async fn identify_student(&self, _text: &str) -> Result<Option<String>, AnswerError> {
        Ok(None)
    }
}

#[derive(Default)]
struct RecordingOutbound {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ReplyOutbound for RecordingOutbound {
    async fn reply_text(&self, reply_token: &str, text: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        Ok(())
    }
}

struct TestServer {
    addr: SocketAddr,
    store: Arc<InMemoryBindingStore>,
    outbound: Arc<RecordingOutbound>,
    dir: tempfile::TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.outbound.sent.lock().unwrap().clone()
    }
}

async fn start_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(
        dir.path().join("data/class.json"),
        r#"[{"學號": "A001", "姓名": "吳志強", "數學": 88}]"#,
    )
    .unwrap();

    let store = Arc::new(InMemoryBindingStore::new());
    let outbound = Arc::new(RecordingOutbound::default());
    let router = SessionRouter::new(
        Arc::clone(&store) as Arc<dyn BindingStore>,
        Arc::new(FsStudentDirectory::new(dir.path().join("data"), "姓名")),
        Arc::new(StubAnswers),
        RouterSettings::from_config(&RoutingConfig::default(), &DataConfig::default()),
    );
    let state = GatewayState::new(
        router,
        Arc::clone(&outbound) as Arc<dyn ReplyOutbound>,
        Arc::new(FsNoteStore::new(dir.path().join("notes"))),
        Secret::new(SECRET.into()),
    );
    let app = build_gateway_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        store,
        outbound,
        dir,
    }
}

fn sign(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

fn text_event(user: &str, token: &str, text: &str) -> String {
    serde_json::json!({
        "destination": "Ubot",
        "events": [{
            "type": "message",
            "replyToken": token,
            "source": { "type": "user", "userId": user },
            "message": { "type": "text", "id": "1", "text": text }
        }]
    })
    .to_string()
}

async fn post_signed(server: &TestServer, body: String) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url("/webhook"))
        .header("x-line-signature", sign(&body))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn index_and_health() {
    let server = start_server().await;
    let index = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(index.status(), 200);
    assert_eq!(index.text().await.unwrap(), "AI 助教系統運行中 ✅");

    let health: serde_json::Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let server = start_server().await;
    let resp = reqwest::Client::new()
        .post(server.url("/webhook"))
        .body(text_event("U1", "r1", "A001 吳志強"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert!(server.sent().is_empty());
    assert!(server.store.get("U1").await.unwrap().is_none());
}

#[tokio::test]
async fn bad_signature_is_rejected_without_processing() {
    let server = start_server().await;
    let body = text_event("U1", "r1", "A001 吳志強");
    let resp = reqwest::Client::new()
        .post(server.url("/webhook"))
        .header("x-line-signature", sign("something else"))
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert!(server.sent().is_empty());
    assert!(server.store.get("U1").await.unwrap().is_none());
}

#[tokio::test]
async fn signed_garbage_is_bad_request() {
    let server = start_server().await;
    let resp = post_signed(&server, "{not json".into()).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn login_then_query_then_logout() {
    let server = start_server().await;

    let resp = post_signed(&server, text_event("U1", "r1", "A001 吳志強")).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
    assert_eq!(
        server.store.get("U1").await.unwrap(),
        Some(BindingRecord::new("A001", "吳志強"))
    );

    post_signed(&server, text_event("U1", "r2", "吳志強數學如何")).await;
    post_signed(&server, text_event("U1", "r3", "王小明呢")).await;
    post_signed(&server, text_event("U1", "r4", "沒事了")).await;

    let sent = server.sent();
    assert_eq!(sent, vec![
        ("r1".to_string(), messages::login_success("吳志強")),
        ("r2".to_string(), "analysis for 吳志強".to_string()),
        ("r3".to_string(), messages::access_denied("吳志強")),
        ("r4".to_string(), messages::LOGOUT_CONFIRMATION.to_string()),
    ]);
    assert!(server.store.get("U1").await.unwrap().is_none());
}

#[tokio::test]
async fn non_text_events_are_acknowledged_silently() {
    let server = start_server().await;
    let body = serde_json::json!({
        "destination": "Ubot",
        "events": [{ "type": "follow", "replyToken": "r1", "source": { "type": "user", "userId": "U1" } }]
    })
    .to_string();
    let resp = post_signed(&server, body).await;
    assert_eq!(resp.status(), 200);
    assert!(server.sent().is_empty());
}

#[tokio::test]
async fn note_is_written_for_today() {
    let server = start_server().await;
    let resp = reqwest::Client::new()
        .post(server.url("/api/notes"))
        .json(&serde_json::json!({ "name": "吳志強", "comment": "上課專心" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["saved"], true);
    assert_eq!(body["name"], "吳志強");

    let path = std::path::PathBuf::from(body["path"].as_str().unwrap());
    assert!(path.starts_with(server.dir.path().join("notes")));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "上課專心");
}

#[tokio::test]
async fn note_without_name_is_rejected() {
    let server = start_server().await;
    let resp = reqwest::Client::new()
        .post(server.url("/api/notes"))
        .json(&serde_json::json!({ "name": "  ", "comment": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
