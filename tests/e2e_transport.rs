//! Transport and framing tests against real sockets and mocked streams.

use std::time::{Duration, Instant};

use ncc::config::ConnectionConfig;
use ncc::framing::{encode, read_message, FrameDecoder};
use ncc::{run_check, Config, ConnectionError, MemoryReporter, NccError};
use proptest::prelude::*;
use tokio::net::TcpListener;

fn config_for(address: String) -> Config {
    Config {
        connection: ConnectionConfig {
            router_address: address,
            connect_timeout_secs: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A device that accepts TCP but never speaks SSH must not hang the run.
#[tokio::test]
async fn test_check_times_out_on_silent_device() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let holder = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let reporter = MemoryReporter::new();
    let started = Instant::now();
    let err = run_check(&config_for(address), &reporter)
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(
        err,
        NccError::Connection(ConnectionError::Timeout { .. })
    ));
    assert!(err.is_connection());
    holder.abort();
}

#[tokio::test]
async fn test_check_reports_refused_connection() {
    // Bind then drop to get a port nothing listens on.
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let err = run_check(&config_for(address), &MemoryReporter::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NccError::Connection(ConnectionError::Dial { .. })
    ));
}

#[tokio::test]
async fn test_check_rejects_empty_address() {
    let err = run_check(&config_for(String::new()), &MemoryReporter::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NccError::Connection(ConnectionError::InvalidAddress(_))
    ));
}

/// Two documents written back to back in one burst come out separately.
#[tokio::test]
async fn test_read_back_to_back_documents() {
    let mut burst = encode("<a/>").unwrap().to_vec();
    burst.extend_from_slice(&encode("<b/>").unwrap());

    let mut mock = tokio_test::io::Builder::new().read(&burst).build();
    let mut decoder = FrameDecoder::default();

    let first = read_message(&mut mock, &mut decoder, Duration::from_secs(1))
        .await
        .unwrap();
    let second = read_message(&mut mock, &mut decoder, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(first, "<a/>");
    assert_eq!(second, "<b/>");
}

fn split_points(len: usize, cuts: &[usize]) -> Vec<usize> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (len + 1)).collect();
    points.push(0);
    points.push(len);
    points.sort_unstable();
    points.dedup();
    points
}

proptest! {
    /// However the bytes are chunked, the same documents come out in order.
    #[test]
    fn prop_fragmentation_is_transparent(
        docs in prop::collection::vec("[a-z<>/ =\"]{0,40}", 1..5),
        cuts in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        let mut wire = Vec::new();
        for doc in &docs {
            wire.extend_from_slice(&encode(doc).unwrap());
        }

        let points = split_points(wire.len(), &cuts);
        let mut decoder = FrameDecoder::default();
        let mut decoded = Vec::new();
        for pair in points.windows(2) {
            decoder.extend(&wire[pair[0]..pair[1]]);
            while let Some(doc) = decoder.decode().unwrap() {
                decoded.push(doc);
            }
        }

        prop_assert_eq!(decoded, docs);
        prop_assert_eq!(decoder.buffered(), 0);
    }
}
