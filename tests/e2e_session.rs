//! End-to-end session tests.
//!
//! These tests run full compliance checks against a scripted NETCONF
//! device on the other end of an in-memory transport.

use std::time::Duration;

use ncc::framing::{encode, read_message, FrameDecoder};
use ncc::protocol::SessionTimeouts;
use ncc::report::ReportLevel;
use ncc::{
    run_with_transport, Datastore, FramingError, MemoryReporter, MemoryTransport, NccError,
    SessionError,
};
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

const DEVICE_HELLO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
    <capability>urn:ietf:params:netconf:capability:writable-running:1.0</capability>
  </capabilities>
  <session-id>101</session-id>
</hello>"#;

/// How the fake device answers.
#[derive(Clone, Copy)]
enum Behavior {
    /// Replies correctly to everything
    Compliant,
    /// Echoes the wrong message-id
    WrongMessageId,
    /// Never acknowledges close-session
    IgnoreClose,
    /// Sends its hello and then nothing
    Silent,
}

fn timeouts() -> SessionTimeouts {
    SessionTimeouts {
        hello: Duration::from_secs(2),
        rpc: Duration::from_secs(2),
        close_grace: Duration::from_millis(200),
        ..Default::default()
    }
}

fn message_id(rpc: &str) -> String {
    rpc.split("message-id=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("rpc carries a message-id")
        .to_string()
}

/// Run a fake device; returns every document it received.
fn spawn_device(
    mut stream: DuplexStream,
    behavior: Behavior,
    configuration: &'static str,
) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut decoder = FrameDecoder::default();
        let mut received = Vec::new();

        // Hello split across two writes to exercise reassembly.
        let hello = encode(DEVICE_HELLO).unwrap();
        let (head, tail) = hello.split_at(hello.len() / 2);
        stream.write_all(head).await.unwrap();
        tokio::task::yield_now().await;
        stream.write_all(tail).await.unwrap();

        loop {
            let Ok(doc) = read_message(&mut stream, &mut decoder, Duration::from_secs(5)).await
            else {
                break;
            };
            received.push(doc.clone());

            if doc.contains("<hello") {
                continue;
            }
            if matches!(behavior, Behavior::Silent) {
                continue;
            }

            let id = message_id(&doc);
            if doc.contains("<close-session/>") {
                if matches!(behavior, Behavior::IgnoreClose) {
                    continue;
                }
                let reply = format!(r#"<rpc-reply message-id="{id}"><ok/></rpc-reply>"#);
                stream.write_all(&encode(&reply).unwrap()).await.unwrap();
                break;
            }

            let id = match behavior {
                Behavior::WrongMessageId => format!("{id}0"),
                _ => id,
            };
            let reply = format!(
                r#"<rpc-reply message-id="{id}" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><data>{configuration}</data></rpc-reply>"#
            );
            stream.write_all(&encode(&reply).unwrap()).await.unwrap();
        }

        received
    })
}

/// Compliant device, compliant configuration: full lifecycle.
#[tokio::test]
async fn test_full_check_all_rules_pass() {
    let (transport, peer) = MemoryTransport::pair(64 * 1024);
    let device = spawn_device(
        peer,
        Behavior::Compliant,
        "ntp server 1.1.1.1\nno telnet\nhostname router1",
    );
    let reporter = MemoryReporter::new();

    let result = run_with_transport(transport, timeouts(), Datastore::Running, &reporter)
        .await
        .unwrap();

    assert!(result.is_compliant());
    assert_eq!(result.passed().len(), 3);

    let received = device.await.unwrap();
    assert_eq!(received.len(), 3);
    assert!(received[0].contains("urn:ietf:params:netconf:base:1.0"));
    assert!(received[1].contains("<get-config>"));
    assert_eq!(message_id(&received[1]), "1");
    assert!(received[2].contains("<close-session/>"));
    assert_eq!(message_id(&received[2]), "2");

    let info = reporter.messages(ReportLevel::Info);
    assert!(info.contains(&"NETCONF session 101 initiated".to_string()));
    assert!(info.contains(&"NETCONF session closed".to_string()));
    assert!(reporter.messages(ReportLevel::Warn).is_empty());
}

#[tokio::test]
async fn test_check_reads_requested_datastore() {
    let (transport, peer) = MemoryTransport::pair(64 * 1024);
    let device = spawn_device(peer, Behavior::Compliant, "ntp\nhostname r1");
    let reporter = MemoryReporter::new();

    let result = run_with_transport(transport, timeouts(), Datastore::Candidate, &reporter)
        .await
        .unwrap();
    assert!(result.is_compliant());

    let received = device.await.unwrap();
    assert!(received[1].contains("<candidate/>"));
    assert!(reporter
        .messages(ReportLevel::Info)
        .contains(&"Retrieving candidate configuration...".to_string()));
}

/// Violations are a result, not an error.
#[tokio::test]
async fn test_full_check_reports_violations() {
    let (transport, peer) = MemoryTransport::pair(64 * 1024);
    let device = spawn_device(peer, Behavior::Compliant, "telnet enabled");
    let reporter = MemoryReporter::new();

    let result = run_with_transport(transport, timeouts(), Datastore::Running, &reporter)
        .await
        .unwrap();
    device.await.unwrap();

    assert!(!result.is_compliant());
    assert_eq!(
        result.failed(),
        &["NTP is not configured", "Telnet is enabled - SECURITY VIOLATION"]
    );
    // The reply envelope carries the NETCONF namespace.
    assert_eq!(result.passed(), &["Hostname follows naming convention"]);
    assert_eq!(
        reporter.messages(ReportLevel::Fail),
        vec![
            "NTP is not configured".to_string(),
            "Telnet is enabled - SECURITY VIOLATION".to_string()
        ]
    );
}

#[tokio::test]
async fn test_message_id_mismatch_aborts_run() {
    let (transport, peer) = MemoryTransport::pair(64 * 1024);
    let device = spawn_device(peer, Behavior::WrongMessageId, "ntp");

    let err = run_with_transport(
        transport,
        timeouts(),
        Datastore::Running,
        &MemoryReporter::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        NccError::Session(SessionError::MessageIdMismatch { .. })
    ));

    // Transport was released, so the device sees EOF and stops.
    let received = device.await.unwrap();
    assert_eq!(received.len(), 2);
}

#[tokio::test]
async fn test_unacknowledged_close_keeps_result() {
    let (transport, peer) = MemoryTransport::pair(64 * 1024);
    let device = spawn_device(
        peer,
        Behavior::IgnoreClose,
        "ntp server 1.1.1.1\nno telnet\nhostname router1",
    );
    let reporter = MemoryReporter::new();

    let result = run_with_transport(transport, timeouts(), Datastore::Running, &reporter)
        .await
        .unwrap();
    device.await.unwrap();

    assert!(result.is_compliant());
    let warnings = reporter.messages(ReportLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Failed to close session gracefully"));
}

#[tokio::test]
async fn test_stalled_reply_times_out() {
    let (transport, peer) = MemoryTransport::pair(64 * 1024);
    let device = spawn_device(peer, Behavior::Silent, "");

    let err = run_with_transport(
        transport,
        SessionTimeouts {
            rpc: Duration::from_millis(100),
            ..timeouts()
        },
        Datastore::Running,
        &MemoryReporter::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        NccError::Framing(FramingError::Timeout { .. })
    ));
    device.await.unwrap();
}

#[tokio::test]
async fn test_peer_hangs_up_during_handshake() {
    let (transport, peer) = MemoryTransport::pair(64 * 1024);
    drop(peer);

    let err = run_with_transport(
        transport,
        timeouts(),
        Datastore::Running,
        &MemoryReporter::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        NccError::Framing(FramingError::Io(_) | FramingError::UnexpectedEof { .. })
    ));
}
