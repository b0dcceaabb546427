use std::net::TcpStream;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::client::IntoClientRequest;
use tungstenite::protocol::Message;
use tungstenite::stream::MaybeTlsStream;

use super::{WsActor, start_bridge_server};
use crate::actor::messages::WsMsg;
use crate::bundle::{BundleFormat, FileBundle, write_bundle};
use crate::config::BridgeConfig;

type Client = WebSocket<MaybeTlsStream<TcpStream>>;

fn connect(port: u16, origin: &str, timeout: Duration) -> Client {
    let mut request = format!("ws://127.0.0.1:{port}").into_client_request().unwrap();
    request
        .headers_mut()
        .insert("origin", origin.parse().unwrap());
    let (mut ws, _) = tungstenite::connect(request).unwrap();
    if let MaybeTlsStream::Plain(stream) = ws.get_mut() {
        stream.set_read_timeout(Some(timeout)).unwrap();
    }
    ws
}

fn read_json(ws: &mut Client) -> Option<Value> {
    loop {
        match ws.read() {
            Ok(Message::Text(text)) => return serde_json::from_str(text.as_str()).ok(),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

/// Actor + endpoint serving a bundle with one file.
async fn start() -> (TempDir, mpsc::Sender<WsMsg>, u16) {
    let temp = TempDir::new().unwrap();
    let artifact = temp.path().join("app-files.json");
    let bundle: FileBundle = [("index.html", "<div></div>")].into_iter().collect();
    write_bundle(&bundle, &artifact, BundleFormat::Json).unwrap();

    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(WsActor::new(rx, BridgeConfig::default(), artifact).run());
    let port = start_bridge_server(0, tx.clone()).unwrap();
    (temp, tx, port)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_trusted_app_gets_files_and_updates() {
    let (_temp, tx, port) = start().await;

    let ws = tokio::task::spawn_blocking(move || {
        let mut ws = connect(port, "http://localhost:3000", Duration::from_secs(5));
        ws.send(Message::Text(r#"{"type":"GET_APP_FILES_REQUEST"}"#.to_string().into()))
            .unwrap();

        let response = read_json(&mut ws).expect("files response");
        assert_eq!(response["type"], "GET_APP_FILES_RESPONSE");
        assert_eq!(response["files"]["index.html"], "<div></div>");
        ws
    })
    .await
    .unwrap();

    tx.send(WsMsg::FileUpdate).await.unwrap();

    tokio::task::spawn_blocking(move || {
        let mut ws = ws;
        let update = read_json(&mut ws).expect("file update");
        assert_eq!(update["type"], "BAIBIAN_APP_FILE_UPDATE");
        assert_eq!(update["targetAppId"], "app");
        assert!(update["timestamp"].as_u64().unwrap() > 0);
    })
    .await
    .unwrap();

    tx.send(WsMsg::Shutdown).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_untrusted_app_gets_nothing() {
    let (_temp, tx, port) = start().await;

    let ws = tokio::task::spawn_blocking(move || {
        let mut ws = connect(port, "https://evil.example", Duration::from_millis(600));
        ws.send(Message::Text(r#"{"type":"GET_APP_FILES_REQUEST"}"#.to_string().into()))
            .unwrap();
        assert!(read_json(&mut ws).is_none(), "no reply to an untrusted origin");
        ws
    })
    .await
    .unwrap();

    tx.send(WsMsg::FileUpdate).await.unwrap();

    tokio::task::spawn_blocking(move || {
        let mut ws = ws;
        assert!(read_json(&mut ws).is_none(), "push targets the iframe origin only");
    })
    .await
    .unwrap();

    tx.send(WsMsg::Shutdown).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_silent_peer_does_not_block_other_apps() {
    let (_temp, tx, port) = start().await;

    // Connects but never sends a handshake request
    let silent = TcpStream::connect(("127.0.0.1", port)).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let ws = tokio::task::spawn_blocking(move || {
        connect(port, "http://localhost:3000", Duration::from_secs(5))
    })
    .await
    .unwrap();

    tx.send(WsMsg::FileUpdate).await.unwrap();

    tokio::task::spawn_blocking(move || {
        let mut ws = ws;
        let update = read_json(&mut ws).expect("file update despite the silent peer");
        assert_eq!(update["type"], "BAIBIAN_APP_FILE_UPDATE");
    })
    .await
    .unwrap();

    drop(silent);
    tx.send(WsMsg::Shutdown).await.unwrap();
}
