use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    routing::get,
    Json, Router,
};
use day_tracker::config::RemoteSchema;
use day_tracker::errors::RemoteError;
use day_tracker::{Authority, DayOp, DayRecord, HttpRemote, RemoteStore, Tracker, TrackerConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

#[derive(Clone)]
struct FakeStore {
    read_reply: Arc<Mutex<Value>>,
    write_reply: Arc<Mutex<Value>>,
    posts: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeStore {
    fn new(read_reply: Value) -> Self {
        Self {
            read_reply: Arc::new(Mutex::new(read_reply)),
            write_reply: Arc::new(Mutex::new(json!({ "ok": true }))),
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

async fn read(State(store): State<FakeStore>) -> Json<Value> {
    let reply = store.read_reply.lock().unwrap().clone();
    Json(reply)
}

async fn write(State(store): State<FakeStore>, headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    store.posts.lock().unwrap().push((content_type, parsed));
    let reply = store.write_reply.lock().unwrap().clone();
    Json(reply)
}

async fn spawn_store(store: FakeStore) -> String {
    let app = Router::new()
        .route("/exec", get(read).post(write))
        .route("/broken", get(|| async { "<html>maintenance</html>" }))
        .with_state(store);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(url: String, schema: RemoteSchema) -> HttpRemote {
    HttpRemote::new(url, schema, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn fetch_all_normalizes_both_schemas() {
    let store = FakeStore::new(json!({
        "ok": true,
        "data": {
            "day1": ["pushup", "journal"],
            "day2": { "tasks": ["ml"], "note": "chapter 4" },
            "day3": { "note": "rest day" },
        }
    }));
    let base = spawn_store(store).await;

    let data = client(format!("{base}/exec"), RemoteSchema::Canonical)
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data.record(0), &DayRecord::new(["pushup", "journal"], ""));
    assert_eq!(data.record(1), &DayRecord::new(["ml"], "chapter 4"));
    assert_eq!(data.record(2), &DayRecord::new(Vec::<String>::new(), "rest day"));
}

#[tokio::test]
async fn fetch_all_reports_application_error_as_unavailable() {
    let store = FakeStore::new(json!({ "ok": false, "error": "Sheet is locked" }));
    let base = spawn_store(store).await;

    let err = client(format!("{base}/exec"), RemoteSchema::Canonical)
        .fetch_all()
        .await
        .unwrap_err();
    match err {
        RemoteError::Unavailable(message) => assert_eq!(message, "Sheet is locked"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn fetch_all_treats_transport_and_parse_failures_alike() {
    let store = FakeStore::new(json!({ "ok": true }));
    let base = spawn_store(store).await;

    let broken = client(format!("{base}/broken"), RemoteSchema::Canonical)
        .fetch_all()
        .await;
    assert!(matches!(broken, Err(RemoteError::Unavailable(_))));

    let missing = client(format!("{base}/nowhere"), RemoteSchema::Canonical)
        .fetch_all()
        .await;
    assert!(matches!(missing, Err(RemoteError::Unavailable(_))));

    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let refused = client(format!("http://127.0.0.1:{port}/exec"), RemoteSchema::Canonical)
        .fetch_all()
        .await;
    assert!(matches!(refused, Err(RemoteError::Unavailable(_))));
}

#[tokio::test]
async fn save_day_posts_one_day_as_text_plain() {
    let store = FakeStore::new(json!({ "ok": true, "data": {} }));
    let base = spawn_store(store.clone()).await;
    let record = DayRecord::new(["thesis", "ts"], "draft done");

    client(format!("{base}/exec"), RemoteSchema::Canonical)
        .save_day(2, &record)
        .await
        .unwrap();
    client(format!("{base}/exec"), RemoteSchema::Legacy)
        .save_day(3, &record)
        .await
        .unwrap();

    let posts = store.posts();
    assert_eq!(posts.len(), 2);
    assert!(posts[0].0.starts_with("text/plain"));
    assert_eq!(
        posts[0].1,
        json!({ "day": "day3", "tasks": ["thesis", "ts"], "note": "draft done" })
    );
    assert_eq!(posts[1].1, json!({ "day": "day4", "tasks": ["thesis", "ts"] }));
}

#[tokio::test]
async fn save_day_error_reply_is_write_failure() {
    let store = FakeStore::new(json!({ "ok": true, "data": {} }));
    *store.write_reply.lock().unwrap() = json!({ "ok": false });
    let base = spawn_store(store).await;

    let err = client(format!("{base}/exec"), RemoteSchema::Canonical)
        .save_day(0, &DayRecord::default())
        .await
        .unwrap_err();
    match err {
        RemoteError::WriteFailed(message) => assert_eq!(message, "Save failed"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn tracker_syncs_through_http_remote() {
    let store = FakeStore::new(json!({
        "ok": true,
        "data": { "day2": ["english"] }
    }));
    let base = spawn_store(store.clone()).await;
    let tmp = TempDir::new().unwrap();
    let mut config = TrackerConfig::new(tmp.path().join("tracker42.json"));
    config.remote_url = Some(format!("{base}/exec"));
    config.remote_timeout = Duration::from_secs(2);

    let remote = HttpRemote::from_config(&config).unwrap().unwrap();
    let tracker = Tracker::boot(config, remote).await;
    assert_eq!(tracker.wait_reconciled().await, Authority::RemoteReconciled);
    assert_eq!(tracker.record(1).await, DayRecord::new(["english"], ""));

    tracker
        .mutate(1, DayOp::Toggle("linkedin".into()))
        .await
        .unwrap();
    tracker.settled().await;

    let posts = store.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].1,
        json!({ "day": "day2", "tasks": ["english", "linkedin"], "note": "" })
    );
}
