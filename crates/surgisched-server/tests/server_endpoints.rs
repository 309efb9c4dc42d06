use serde_json::{Value, json};
use surgisched_server::{AppConfig, AppState, build_app};
use tokio::task::JoinHandle;

async fn start_server() -> (String, AppState, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let cfg = AppConfig::default();
    let state = AppState::new(&cfg);
    let app = build_app(&cfg, state.clone());

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), state, tx, server)
}

#[tokio::test]
async fn health_and_info_endpoints_work() {
    let (base, _state, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "SurgiSched");
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn request_id_is_echoed() {
    let (base, _state, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/healthz"))
        .header("x-request-id", "req-abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "req-abc-123"
    );

    // Without a caller-supplied id one is generated.
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn room_crud_roundtrip() {
    let (base, _state, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // Create
    let resp = client
        .post(format!("{base}/rooms"))
        .json(&json!({
            "name": "Theatre A",
            "roomType": "operating-theatre",
            "location": "Level 2",
            "capacity": 8,
            "equipment": ["c-arm", "anesthesia-cart"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let room: Value = resp.json().await.unwrap();
    let room_id = room["id"].as_str().unwrap().to_string();
    assert_eq!(room["status"], "Active");
    assert_eq!(room["roomType"], "operating-theatre");

    // Duplicate name is a 409 with a stable kind
    let resp = client
        .post(format!("{base}/rooms"))
        .json(&json!({
            "name": "Theatre A",
            "roomType": "operating-theatre",
            "location": "Level 3"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"]["kind"], "duplicate-name");
    assert!(
        err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Theatre A")
    );

    // Read includes the upcoming-procedures projection
    let resp = client
        .get(format!("{base}/rooms/{room_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let details: Value = resp.json().await.unwrap();
    assert_eq!(details["name"], "Theatre A");
    assert!(details["upcomingProcedures"].as_array().unwrap().is_empty());

    // Update
    let resp = client
        .put(format!("{base}/rooms/{room_id}"))
        .json(&json!({"location": "Level 5"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["location"], "Level 5");
    assert_eq!(updated["name"], "Theatre A");

    // Soft-delete flips status, the room stays readable
    let resp = client
        .delete(format!("{base}/rooms/{room_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let inactive: Value = resp.json().await.unwrap();
    assert_eq!(inactive["status"], "Inactive");

    let resp = client
        .get(format!("{base}/rooms/{room_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn room_listing_paginates_and_filters() {
    let (base, _state, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    for name in ["Alpha", "Bravo", "Charlie"] {
        let resp = client
            .post(format!("{base}/rooms"))
            .json(&json!({
                "name": name,
                "roomType": "operating-theatre",
                "location": "Level 1"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }
    let resp = client
        .post(format!("{base}/rooms"))
        .json(&json!({
            "name": "Recovery 1",
            "roomType": "recovery",
            "location": "Level 1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .get(format!("{base}/rooms?limit=2&offset=1"))
        .send()
        .await
        .unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 4);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 1);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let resp = client
        .get(format!("{base}/rooms?roomType=recovery"))
        .send()
        .await
        .unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Recovery 1");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn missing_room_is_structured_404() {
    let (base, _state, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/rooms/no-such-room"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"]["kind"], "not-found");
    assert!(
        err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("no-such-room")
    );

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
