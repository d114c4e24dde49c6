//! Integration tests for the message relay over real WebSocket connections.

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{config::RelayConfig, ui::Server};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CONNECTED_NOTICE: &str = "<em><small>Connected to server</small></em>";

/// Start a relay on an ephemeral port and return its address
async fn start_server() -> SocketAddr {
    start_server_with(RelayConfig::default()).await
}

async fn start_server_with(config: RelayConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let app = Server::new(config).router();
    tokio::spawn(async move { axum::serve(listener, app).await });
    addr
}

/// Connect a client and consume the connected notice
async fn connect(addr: SocketAddr) -> Client {
    let (mut client, _response) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect");
    let notice = next_json(&mut client).await;
    assert_eq!(notice["message"], CONNECTED_NOTICE);
    client
}

async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream ended")
            .expect("Read failed");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

async fn next_member_list(client: &mut Client) -> Value {
    let message = next_json(client).await;
    assert_eq!(message["action"], "list_users");
    message["connected_users"].clone()
}

#[tokio::test]
async fn test_end_to_end_chat_scenario() {
    // テスト項目: 命名・一覧更新・ブロードキャストが全クライアントに届く
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;

    // when (操作): alice が名乗る
    send_json(&mut alice, json!({"action": "username", "username": "alice"})).await;

    // then (期待する結果):
    assert_eq!(next_member_list(&mut alice).await, json!(["alice"]));

    // when (操作): bob が接続して名乗る
    let mut bob = connect(addr).await;
    send_json(&mut bob, json!({"action": "username", "username": "bob"})).await;

    // then (期待する結果):
    assert_eq!(next_member_list(&mut alice).await, json!(["alice", "bob"]));
    assert_eq!(next_member_list(&mut bob).await, json!(["alice", "bob"]));

    // when (操作): alice がメッセージを送る
    send_json(&mut alice, json!({"action": "broadcast", "message": "hi"})).await;

    // then (期待する結果):
    for client in [&mut alice, &mut bob] {
        let message = next_json(client).await;
        assert_eq!(message["action"], "broadcast");
        assert_eq!(message["message"], "<strong>alice</strong>: hi");
    }
}

#[tokio::test]
async fn test_left_action_updates_member_list() {
    // テスト項目: left を送ったクライアントは一覧から消える
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    send_json(&mut alice, json!({"action": "username", "username": "alice"})).await;
    next_member_list(&mut alice).await;
    let mut bob = connect(addr).await;
    send_json(&mut bob, json!({"action": "username", "username": "bob"})).await;
    next_member_list(&mut alice).await;

    // when (操作):
    send_json(&mut bob, json!({"action": "left", "username": "bob"})).await;

    // then (期待する結果):
    assert_eq!(next_member_list(&mut alice).await, json!(["alice"]));
}

#[tokio::test]
async fn test_disconnect_updates_member_list() {
    // テスト項目: 切断したクライアントは一覧から消える
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    send_json(&mut alice, json!({"action": "username", "username": "alice"})).await;
    next_member_list(&mut alice).await;
    let mut bob = connect(addr).await;
    send_json(&mut bob, json!({"action": "username", "username": "bob"})).await;
    next_member_list(&mut alice).await;

    // when (操作):
    bob.close(None).await.expect("Failed to close");
    drop(bob);

    // then (期待する結果):
    assert_eq!(next_member_list(&mut alice).await, json!(["alice"]));
}

#[tokio::test]
async fn test_lazy_eviction_removes_disconnected_client_on_next_broadcast() {
    // テスト項目: 切断時に Leave を積まない設定では、切断したクライアントは次の送信失敗まで一覧に残り、
    //             evict されても一覧の再配信は起きない
    // given (前提条件):
    let addr = start_server_with(RelayConfig {
        leave_on_disconnect: false,
        ..Default::default()
    })
    .await;
    let mut alice = connect(addr).await;
    send_json(&mut alice, json!({"action": "username", "username": "alice"})).await;
    next_member_list(&mut alice).await;
    let mut bob = connect(addr).await;
    send_json(&mut bob, json!({"action": "username", "username": "bob"})).await;
    next_member_list(&mut alice).await;

    // when (操作): bob が切断し、carol が名乗る
    bob.close(None).await.expect("Failed to close");
    drop(bob);
    let mut carol = connect(addr).await;
    send_json(&mut carol, json!({"action": "username", "username": "carol"})).await;

    // then (期待する結果): bob はまだ一覧に残っている
    assert_eq!(
        next_member_list(&mut alice).await,
        json!(["alice", "bob", "carol"])
    );

    // when (操作): bob への送信が失敗するまでブロードキャストを続ける
    let mut members = Value::Null;
    for attempt in 0..20 {
        send_json(&mut alice, json!({"action": "broadcast", "message": attempt.to_string()})).await;

        // then (期待する結果): eviction によって一覧が配信されることはない
        let message = next_json(&mut alice).await;
        assert_eq!(message["action"], "broadcast");
        assert_eq!(message["message"], format!("<strong>alice</strong>: {}", attempt));

        send_json(&mut alice, json!({"action": "username", "username": "alice"})).await;
        members = next_member_list(&mut alice).await;
        if members == json!(["alice", "carol"]) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // then (期待する結果): bob は evict されている
    assert_eq!(members, json!(["alice", "carol"]));
}

#[tokio::test]
async fn test_unnamed_client_is_not_listed() {
    // テスト項目: 名乗っていないクライアントは一覧に含まれないが通知は受け取る
    // given (前提条件):
    let addr = start_server().await;
    let mut lurker = connect(addr).await;
    let mut alice = connect(addr).await;

    // when (操作):
    send_json(&mut alice, json!({"action": "username", "username": "alice"})).await;

    // then (期待する結果):
    assert_eq!(next_member_list(&mut lurker).await, json!(["alice"]));
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let addr = start_server().await;

    // when (操作):
    let body: Value = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Body is not JSON");

    // then (期待する結果):
    assert_eq!(body, json!({"status": "ok"}));
}
