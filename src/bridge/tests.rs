use super::*;
use crate::bundle::{BundleFormat, write_bundle};
use serde_json::Value;
use tempfile::TempDir;

const DEV: &str = "http://localhost:3000";

#[derive(Debug, Default)]
struct RecordingHost {
    ready: Vec<Option<String>>,
    errors: Vec<String>,
    toasts: Vec<String>,
}

impl RecordingHost {
    fn callbacks(&self) -> usize {
        self.ready.len() + self.errors.len() + self.toasts.len()
    }
}

impl BridgeHost for RecordingHost {
    fn on_ready(&mut self, app_id: Option<&str>) {
        self.ready.push(app_id.map(str::to_string));
    }

    fn on_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn on_toast(&mut self, message: &str) {
        self.toasts.push(message.to_string());
    }
}

/// Sink bound to a peer origin, dropping mismatched targets like postMessage.
struct PeerSink {
    origin: String,
    delivered: Vec<BridgeMessage>,
    dropped: usize,
}

impl PeerSink {
    fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            delivered: Vec::new(),
            dropped: 0,
        }
    }
}

impl MessageSink for PeerSink {
    fn post(&mut self, message: &BridgeMessage, target_origin: &str) -> Result<(), BridgeError> {
        if normalize_origin(&self.origin).as_deref() == Some(target_origin) {
            self.delivered.push(message.clone());
        } else {
            self.dropped += 1;
        }
        Ok(())
    }
}

fn bridge() -> IframeBridge<RecordingHost> {
    IframeBridge::new(&BridgeConfig::default(), RecordingHost::default()).unwrap()
}

fn loading_bridge() -> IframeBridge<RecordingHost> {
    let mut bridge = bridge();
    bridge.load().unwrap();
    bridge
}

fn send(bridge: &mut IframeBridge<RecordingHost>, origin: &str, data: &str) -> Dispatch {
    let mut sink = PeerSink::new(origin);
    bridge.handle(origin, data, &mut sink, &FileBundle::new())
}

#[test]
fn test_new_bridge_is_idle() {
    let bridge = bridge();
    assert_eq!(bridge.status(), &BridgeStatus::Idle);
    assert_eq!(bridge.target_origin(), DEV);
}

#[test]
fn test_load_enters_loading_with_embed_url() {
    let mut bridge = bridge();
    let url = bridge.load().unwrap();

    assert_eq!(bridge.status(), &BridgeStatus::Loading);
    assert_eq!(url.path(), "/app-runner/app");
    assert!(url.query().unwrap().ends_with("&embed=true"));
}

#[test]
fn test_ready_from_dev_origin() {
    let mut bridge = loading_bridge();
    let dispatch = send(&mut bridge, DEV, r#"{"event":"BAIBIAN_APP_READY","appId":"app"}"#);

    assert_eq!(dispatch, Dispatch::Ready);
    assert_eq!(bridge.status(), &BridgeStatus::Ready);
    assert_eq!(bridge.host().ready, vec![Some("app".to_string())]);
}

#[test]
fn test_error_from_dev_origin() {
    let mut bridge = loading_bridge();
    let dispatch = send(&mut bridge, DEV, r#"{"event":"BAIBIAN_APP_ERROR","error":"boom"}"#);

    assert_eq!(dispatch, Dispatch::Error("boom".into()));
    assert_eq!(bridge.status(), &BridgeStatus::Errored("boom".into()));
    assert_eq!(bridge.host().errors, vec!["boom".to_string()]);
    assert_eq!(bridge.host().callbacks(), 1);
}

#[test]
fn test_ready_and_error_accept_non_string_payloads() {
    let mut bridge = loading_bridge();
    let dispatch = send(&mut bridge, DEV, r#"{"event":"BAIBIAN_APP_READY","appId":42}"#);

    assert_eq!(dispatch, Dispatch::Ready);
    assert_eq!(bridge.status(), &BridgeStatus::Ready);
    assert_eq!(bridge.host().ready, vec![Some("42".to_string())]);

    bridge.reload().unwrap();
    let dispatch = send(
        &mut bridge,
        DEV,
        r#"{"event":"BAIBIAN_APP_ERROR","message":{"text":"boom"}}"#,
    );

    let expected = r#"{"text":"boom"}"#.to_string();
    assert_eq!(dispatch, Dispatch::Error(expected.clone()));
    assert_eq!(bridge.status(), &BridgeStatus::Errored(expected.clone()));
    assert_eq!(bridge.host().errors, vec![expected]);
}

#[test]
fn test_untrusted_origin_is_ignored() {
    let data = r#"{"event":"BAIBIAN_APP_ERROR","error":"boom"}"#;

    let mut bridge = loading_bridge();
    assert_eq!(send(&mut bridge, "https://evil.example", data), Dispatch::Untrusted);
    assert_eq!(bridge.status(), &BridgeStatus::Loading);
    assert_eq!(bridge.host().callbacks(), 0);

    assert_eq!(send(&mut bridge, DEV, data), Dispatch::Error("boom".into()));
    assert_eq!(bridge.host().callbacks(), 1);
}

#[test]
fn test_untrusted_file_request_gets_no_reply() {
    let mut bridge = loading_bridge();
    let mut sink = PeerSink::new("https://evil.example");
    let files: FileBundle = [("secret.txt", "x")].into_iter().collect();

    let dispatch = bridge.handle(
        "https://evil.example",
        r#"{"type":"GET_APP_FILES_REQUEST"}"#,
        &mut sink,
        &files,
    );

    assert_eq!(dispatch, Dispatch::Untrusted);
    assert!(sink.delivered.is_empty());
    assert_eq!(sink.dropped, 0);
}

#[test]
fn test_ready_outside_loading_keeps_state() {
    let mut bridge = loading_bridge();
    send(&mut bridge, DEV, r#"{"event":"BAIBIAN_APP_ERROR","message":"crash"}"#);
    assert_eq!(bridge.status(), &BridgeStatus::Errored("crash".into()));

    send(&mut bridge, DEV, r#"{"event":"BAIBIAN_APP_READY"}"#);
    assert_eq!(bridge.status(), &BridgeStatus::Errored("crash".into()));
    assert_eq!(bridge.host().ready, vec![None]);
}

#[test]
fn test_error_outside_loading_keeps_ready() {
    let mut bridge = loading_bridge();
    send(&mut bridge, DEV, r#"{"type":"BAIBIAN_APP_READY"}"#);
    send(&mut bridge, DEV, r#"{"type":"BAIBIAN_APP_ERROR","error":"late"}"#);

    assert_eq!(bridge.status(), &BridgeStatus::Ready);
    assert_eq!(bridge.host().errors, vec!["late".to_string()]);
}

#[test]
fn test_reload_from_any_state() {
    let mut bridge = loading_bridge();
    send(&mut bridge, DEV, r#"{"event":"BAIBIAN_APP_ERROR","error":"boom"}"#);

    bridge.reload().unwrap();
    assert_eq!(bridge.status(), &BridgeStatus::Loading);

    send(&mut bridge, DEV, r#"{"event":"BAIBIAN_APP_READY"}"#);
    assert_eq!(bridge.status(), &BridgeStatus::Ready);
}

#[test]
fn test_fail_load_is_error_transition() {
    let mut bridge = loading_bridge();
    bridge.fail_load("net::ERR_CONNECTION_REFUSED");

    assert_eq!(
        bridge.status(),
        &BridgeStatus::Errored("net::ERR_CONNECTION_REFUSED".into())
    );
    assert_eq!(bridge.host().errors.len(), 1);
}

#[test]
fn test_files_updated_shows_toast() {
    let mut bridge = loading_bridge();
    assert_eq!(
        send(&mut bridge, "http://127.0.0.1:5173", r#"{"event":"APP_FILES_UPDATED"}"#),
        Dispatch::Toast
    );
    assert_eq!(bridge.host().toasts.len(), 1);
    assert_eq!(bridge.status(), &BridgeStatus::Loading);
}

#[test]
fn test_sdk_and_unknown_messages_are_ignored() {
    let mut bridge = loading_bridge();

    assert_eq!(
        send(&mut bridge, DEV, r#"{"type":"BAIBIAN_SDK_CALL"}"#),
        Dispatch::Ignored("BAIBIAN_SDK_CALL".into())
    );
    assert_eq!(
        send(&mut bridge, DEV, r#"{"type":"SOMETHING_NEW"}"#),
        Dispatch::Ignored("SOMETHING_NEW".into())
    );
    assert_eq!(send(&mut bridge, DEV, "{oops"), Dispatch::Malformed);
    assert_eq!(bridge.host().callbacks(), 0);
    assert_eq!(bridge.status(), &BridgeStatus::Loading);
}

#[test]
fn test_host_bound_kind_from_app_is_unexpected() {
    let mut bridge = loading_bridge();
    let dispatch = send(
        &mut bridge,
        DEV,
        r#"{"type":"BAIBIAN_APP_FILE_UPDATE","targetAppId":"x","timestamp":1}"#,
    );
    assert_eq!(dispatch, Dispatch::Unexpected(message::APP_FILE_UPDATE));
    assert_eq!(bridge.host().callbacks(), 0);
}

#[test]
fn test_file_request_replies_with_bundle() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("app-files.json");
    let files: FileBundle = [("a.txt", "hello"), ("sub/b.txt", "world")]
        .into_iter()
        .collect();
    write_bundle(&files, &path, BundleFormat::Json).unwrap();

    let mut bridge = loading_bridge();
    let mut sink = PeerSink::new("http://localhost:5173");
    let dispatch = bridge.handle(
        "http://localhost:5173",
        r#"{"type":"GET_APP_FILES_REQUEST"}"#,
        &mut sink,
        &path,
    );

    assert_eq!(dispatch, Dispatch::FilesServed { error: None });
    assert_eq!(sink.delivered.len(), 1);
    let BridgeMessage::FilesResponse { files: served, source, error, .. } = &sink.delivered[0]
    else {
        panic!("expected a files response");
    };
    assert_eq!(served, &files);
    assert_eq!(source, message::RESPONSE_SOURCE);
    assert!(error.is_none());
    assert_eq!(bridge.host().callbacks(), 0);
}

#[test]
fn test_file_request_with_missing_bundle_reports_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.json");

    let mut bridge = loading_bridge();
    let mut sink = PeerSink::new(DEV);
    let dispatch = bridge.handle(DEV, r#"{"event":"GET_APP_FILES_REQUEST"}"#, &mut sink, &missing);

    let Dispatch::FilesServed { error: Some(_) } = dispatch else {
        panic!("expected an error, got {dispatch:?}");
    };
    let json = sink.delivered[0].to_json().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["files"], serde_json::json!({}));
    assert!(value["error"].as_str().unwrap().contains("missing.json"));
}

#[test]
fn test_notify_targets_iframe_origin() {
    let bridge = loading_bridge();

    let mut same = PeerSink::new("http://localhost:3000/app-runner/app");
    bridge.notify_file_update(&mut same).unwrap();
    assert!(matches!(
        &same.delivered[..],
        [BridgeMessage::FileUpdate { target_app_id, .. }] if target_app_id == "app"
    ));

    let mut other = PeerSink::new("http://localhost:5173");
    bridge.notify_file_update(&mut other).unwrap();
    assert!(other.delivered.is_empty());
    assert_eq!(other.dropped, 1);
}

#[test]
fn test_prod_mode_targets_prod_origin() {
    let config = BridgeConfig {
        dev: false,
        ..BridgeConfig::default()
    };
    let mut bridge = IframeBridge::new(&config, RecordingHost::default()).unwrap();
    assert_eq!(bridge.target_origin(), "https://baibian.app");
    assert_eq!(
        bridge.load().unwrap().as_str().split('?').next(),
        Some("https://baibian.app/app-runner/app")
    );
}
