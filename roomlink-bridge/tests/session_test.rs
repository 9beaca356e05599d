use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use crate::common::fake_controller::FakeController;
use crate::common::*;

mod common;

#[tokio::test]
async fn test_simulation_after_connect_failure() {
    let mut client = TestClient::start(context(session_config(unused_port().await)));

    let error = client.recv().await;
    assert!(is_connection(&error, "error"));

    let greeting = client.recv().await;
    assert!(is_connection(&greeting, "mock_connected"));

    let info = client.recv().await;
    assert_eq!(info["type"], "info");
    assert_eq!(info["version"], "1.0.0-mock");
    assert_eq!(info["token"], TOKEN);

    let state = client.recv().await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["state"]["temperature"], 23.0);

    client.send(json!({ "type": "get_state", "roomId": "101", "token": TOKEN }));
    let response = client.recv().await;

    assert_eq!(response["type"], "state");
    assert_eq!(response["roomId"], "101");
    for field in [
        "lightsOn",
        "doorLocked",
        "channel1",
        "channel2",
        "temperature",
        "humidity",
        "pressure",
        "lastUpdated",
    ] {
        assert!(response["state"].get(field).is_some(), "missing {field}");
    }

    client.close().await;
}

#[tokio::test]
async fn test_queued_command_answered_by_simulation() {
    let mut client = TestClient::start(context(session_config(unused_port().await)));

    client.send(json!({ "type": "set_state", "roomId": "102", "state": { "lightsOn": true } }));

    let kinds: Vec<_> = [
        client.recv().await,
        client.recv().await,
        client.recv().await,
        client.recv().await,
    ]
    .iter()
    .map(|v| (v["type"].clone(), v["status"].clone()))
    .collect();
    assert_eq!(
        kinds,
        vec![
            (json!("connection"), json!("error")),
            (json!("connection"), json!("mock_connected")),
            (json!("info"), json!(null)),
            (json!("state"), json!(null)),
        ]
    );

    let answer = client.recv().await;
    assert_eq!(answer["roomId"], "102");
    assert_eq!(answer["state"]["lightsOn"], true);

    client.close().await;
}

#[tokio::test]
async fn test_malformed_frame_is_answered_locally() {
    let controller = FakeController::bind().await;
    let mut client = TestClient::start(context(session_config(controller.port())));
    let _connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));

    client.send_raw("{not json");

    assert_eq!(
        client.recv().await,
        json!({ "status": "error", "message": "Invalid command format" })
    );
}

#[tokio::test]
async fn test_invalid_token_never_reaches_controller() {
    let controller = FakeController::bind().await;
    let mut client = TestClient::start(context(session_config(controller.port())));
    let mut connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));

    client.send(json!({ "type": "door_unlock", "roomId": "101", "token": "wrong" }));
    assert_eq!(
        client.recv().await,
        json!({ "status": "error", "message": "Invalid token" })
    );

    client.send(json!({ "type": "reboot", "token": TOKEN }));
    assert_eq!(
        client.recv().await,
        json!({ "status": "error", "message": "Unknown command" })
    );

    client.send(json!({ "type": "get_info" }));
    let forwarded = connection.read_command().await;
    assert_eq!(forwarded["type"], "get_info");
}

#[tokio::test]
async fn test_missing_token_rejected_without_injection() {
    let controller = FakeController::bind().await;
    let mut config = session_config(controller.port());
    config.inject_token = false;
    let mut client = TestClient::start(context(config));
    let _connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));

    client.send(json!({ "type": "get_state", "roomId": "101" }));

    assert_eq!(
        client.recv().await,
        json!({ "status": "error", "message": "Invalid token" })
    );
}

#[tokio::test]
async fn test_relays_both_ways_and_fills_info_token() {
    let controller = FakeController::bind().await;
    let mut client = TestClient::start(context(session_config(controller.port())));
    let mut connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));

    client.send(json!({ "type": "get_state", "roomId": 101, "vendor": "x" }));
    let forwarded = connection.read_command().await;
    assert_eq!(
        forwarded,
        json!({ "type": "get_state", "roomId": "101", "token": TOKEN, "vendor": "x" })
    );

    connection
        .send(json!({ "type": "info", "mac": "00:11:22:33:44:55" }))
        .await;
    let info = client.recv().await;
    assert_eq!(info["mac"], "00:11:22:33:44:55");
    assert_eq!(info["token"], TOKEN);

    client.close().await;
}

#[tokio::test]
async fn test_reconnects_after_controller_closes() {
    let controller = FakeController::bind().await;
    let mut client = TestClient::start(context(session_config(controller.port())));

    let connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));
    drop(connection);

    let closed = client.recv().await;
    assert!(is_connection(&closed, "disconnected"));

    let mut connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));

    client.send(json!({ "type": "door_lock", "roomId": "201" }));
    assert_eq!(connection.read_command().await["type"], "door_lock");
}

#[tokio::test]
async fn test_gives_up_then_reconnects_on_demand() {
    let port = unused_port().await;
    let mut config = session_config(port);
    config.simulation = false;
    let mut client = TestClient::start(context(config));

    assert!(is_connection(&client.recv().await, "error"));

    let gave_up = client.recv().await;
    assert!(is_connection(&gave_up, "disconnected"));
    assert!(
        gave_up["message"]
            .as_str()
            .unwrap()
            .contains("gave up reconnecting after 3 attempts")
    );

    let controller = FakeController::bind_on(port).await;
    client.send(json!({ "type": "get_state", "roomId": "103" }));

    let mut connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));

    let forwarded = connection.read_command().await;
    assert_eq!(forwarded["type"], "get_state");
    assert_eq!(forwarded["roomId"], "103");
}

#[tokio::test]
async fn test_reset_mid_session_falls_back_to_simulation() {
    let controller = FakeController::bind().await;
    let mut client = TestClient::start(context(session_config(controller.port())));

    let connection = controller.accept().await;
    assert!(is_connection(&client.recv().await, "connected"));
    connection.reset();

    let error = client.recv().await;
    assert!(is_connection(&error, "error"));
    let failed_at = Instant::now();

    client.send(json!({ "type": "get_state", "roomId": "101" }));

    assert!(is_connection(&client.recv().await, "mock_connected"));
    assert!(failed_at.elapsed() < Duration::from_millis(1000));
    assert_eq!(client.recv().await["type"], "info");
    assert_eq!(client.recv().await["type"], "state");

    let answer = client.recv().await;
    assert_eq!(answer["type"], "state");
    assert_eq!(answer["roomId"], "101");

    client.close().await;
}
