//! Call correlation and connection lifecycle against a scripted peer.

mod common;

use std::time::{Duration, Instant};

use inspector_rpc::{ConnectionOptions, Error};
use serde_json::{Value, json};

use common::{Peer, empty_result, spawn_responder, ws_pair};

#[tokio::test]
async fn test_concurrent_calls_match_replies_in_any_order() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let connection = connection.clone();
            tokio::spawn(async move { (n, connection.call("Echo", json!({ "n": n })).await) })
        })
        .collect();

    let mut calls = peer.recv_calls(8).await;
    calls.reverse();
    for call in &calls {
        peer.reply(&call["id"], json!({ "echo": call["params"]["n"] }))
            .await;
    }

    for handle in handles {
        let (n, result) = handle.await.expect("join");
        assert_eq!(result.expect("reply"), json!({ "echo": n }));
    }
    assert_eq!(connection.pending_count(), 0);
}

#[tokio::test]
async fn test_faster_reply_resolves_first() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let slow = {
        let connection = connection.clone();
        tokio::spawn(async move { connection.call("Slow", Value::Null).await })
    };
    let fast = {
        let connection = connection.clone();
        tokio::spawn(async move { connection.call("Fast", Value::Null).await })
    };

    let calls = peer.recv_calls(2).await;
    let id_of = |method: &str| {
        calls
            .iter()
            .find(|call| call["method"] == method)
            .map(|call| call["id"].clone())
            .expect("call received")
    };

    peer.reply(&id_of("Fast"), json!("b")).await;
    assert_eq!(fast.await.expect("join").expect("fast reply"), json!("b"));
    assert!(!slow.is_finished());

    tokio::time::sleep(Duration::from_millis(150)).await;
    peer.reply(&id_of("Slow"), json!("a")).await;
    assert_eq!(slow.await.expect("join").expect("slow reply"), json!("a"));
}

#[tokio::test]
async fn test_call_timeout_leaves_connection_usable() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let started = Instant::now();
    let pending = {
        let connection = connection.clone();
        tokio::spawn(async move {
            connection
                .call_with_timeout("Ping", Value::Null, Duration::from_millis(100))
                .await
        })
    };

    let ping = peer.recv_call().await;
    let err = pending.await.expect("join").unwrap_err();
    let elapsed = started.elapsed();

    match &err {
        Error::CallTimeout {
            method, timeout_ms, ..
        } => {
            assert_eq!(method, "Ping");
            assert_eq!(*timeout_ms, 100);
        }
        other => panic!("expected CallTimeout, got {other:?}"),
    }
    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    assert_eq!(connection.pending_count(), 0);

    // The late reply is dropped; the next call still works.
    peer.reply(&ping["id"], json!("late")).await;

    let next = {
        let connection = connection.clone();
        tokio::spawn(async move { connection.call("Echo", Value::Null).await })
    };
    let echo = peer.recv_call().await;
    assert_ne!(echo["id"], ping["id"]);
    peer.reply(&echo["id"], json!("fresh")).await;

    assert_eq!(next.await.expect("join").expect("reply"), json!("fresh"));
    assert!(!connection.is_closed());
}

#[tokio::test]
async fn test_socket_close_fails_every_pending_call() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let connection = connection.clone();
            tokio::spawn(async move { connection.call("Hang", Value::Null).await })
        })
        .collect();

    peer.recv_calls(3).await;
    assert_eq!(connection.pending_count(), 3);
    peer.close().await;

    for handle in handles {
        let err = handle.await.expect("join").unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed), "got {err:?}");
    }

    tokio::time::timeout(Duration::from_secs(2), connection.closed())
        .await
        .expect("closed notification");
    assert!(connection.is_closed());
    assert_eq!(connection.pending_count(), 0);

    let started = Instant::now();
    let err = connection.call("After", Value::Null).await.unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed));
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_disconnect_closes_socket_and_rejects_calls() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let pending = {
        let connection = connection.clone();
        tokio::spawn(async move { connection.call("Hang", Value::Null).await })
    };
    peer.recv_call().await;

    connection.disconnect();
    peer.expect_closed().await;

    let err = pending.await.expect("join").unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed));
    assert!(connection.is_closed());
    assert!(matches!(
        connection.call("After", Value::Null).await.unwrap_err(),
        Error::ConnectionClosed
    ));

    // Idempotent.
    connection.disconnect();
}

#[tokio::test]
async fn test_cancelled_call_does_not_disturb_siblings() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let timeout = Duration::from_secs(5);
    let first = connection
        .start_call("First", Value::Null, timeout)
        .expect("start first");
    let second = connection
        .start_call("Second", Value::Null, timeout)
        .expect("start second");
    assert!(first.id() < second.id());

    let calls = peer.recv_calls(2).await;

    assert!(first.cancel());
    assert!(!connection.cancel(first.id()));
    let err = first.wait().await.unwrap_err();
    assert!(err.is_cancelled());

    // A reply for the cancelled call is dropped.
    peer.reply(&calls[0]["id"], json!(1)).await;
    peer.reply(&calls[1]["id"], json!(2)).await;
    assert_eq!(second.wait().await.expect("reply"), json!(2));
}

#[tokio::test]
async fn test_remote_error_is_reported_with_code() {
    let (connection, peer) = ws_pair(ConnectionOptions::default()).await;
    spawn_responder(peer, |method, _| Err((-32601, format!("'{method}' wasn't found"))));

    let err = connection.call("Foo.bar", Value::Null).await.unwrap_err();
    match err {
        Error::Remote { code, message } => {
            assert_eq!(code, -32601);
            assert_eq!(message, "'Foo.bar' wasn't found");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
    assert!(!connection.is_closed());
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let pending = {
        let connection = connection.clone();
        tokio::spawn(async move { connection.call("Echo", Value::Null).await })
    };
    let call = peer.recv_call().await;

    peer.send_raw("not json").await;
    peer.send_raw(r#"{"neither":"id nor method"}"#).await;
    peer.send_raw(r#"{"id":999999,"result":{}}"#).await;
    peer.reply(&call["id"], json!("ok")).await;

    assert_eq!(pending.await.expect("join").expect("reply"), json!("ok"));
    assert!(!connection.is_closed());
}

#[tokio::test]
async fn test_call_ids_are_strictly_increasing() {
    let (connection, peer) = ws_pair(ConnectionOptions::default()).await;
    let log = spawn_responder(peer, empty_result);

    for _ in 0..5 {
        connection.call("Noop", Value::Null).await.expect("reply");
    }

    let ids: Vec<u64> = log
        .lock()
        .iter()
        .map(|call| call["id"].as_u64().expect("integer id"))
        .collect();
    assert_eq!(ids.len(), 5);
    assert!(ids[0] >= 1);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]), "{ids:?}");
}

#[tokio::test]
async fn test_params_are_omitted_when_null() {
    let (connection, peer) = ws_pair(ConnectionOptions::default()).await;
    let log = spawn_responder(peer, empty_result);

    connection.call("Page.enable", Value::Null).await.expect("reply");
    connection
        .call("Page.navigate", json!({ "url": "about:blank" }))
        .await
        .expect("reply");

    let calls = log.lock().clone();
    assert!(calls[0].get("params").is_none());
    assert_eq!(calls[1]["params"]["url"], "about:blank");
}

#[tokio::test]
async fn test_pending_limit_rejects_excess_calls() {
    let options = ConnectionOptions::new().with_max_pending(2);
    let (connection, _peer): (_, Peer) = ws_pair(options).await;

    let timeout = Duration::from_secs(5);
    let _a = connection.start_call("A", Value::Null, timeout).expect("a");
    let _b = connection.start_call("B", Value::Null, timeout).expect("b");

    let err = connection.start_call("C", Value::Null, timeout).unwrap_err();
    assert!(err.is_protocol_error(), "got {err:?}");
}

#[tokio::test]
async fn test_sweep_rejects_unawaited_expired_calls() {
    let options = ConnectionOptions::new().with_sweep_interval(Duration::from_millis(20));
    let (connection, mut peer) = ws_pair(options).await;

    let handle = connection
        .start_call("Forgotten", Value::Null, Duration::from_millis(50))
        .expect("start");
    peer.recv_call().await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(connection.pending_count(), 0);

    let err = handle.wait().await.unwrap_err();
    assert!(matches!(err, Error::CallTimeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_binary_frame_reply_is_decoded() {
    let (connection, mut peer) = ws_pair(ConnectionOptions::default()).await;

    let pending = {
        let connection = connection.clone();
        tokio::spawn(async move { connection.call("Echo", Value::Null).await })
    };
    let call = peer.recv_call().await;

    peer.send_binary(&[0xff, 0xfe, 0x00]).await;
    let reply = json!({ "id": call["id"], "result": { "via": "binary" } });
    peer.send_binary(reply.to_string().as_bytes()).await;

    assert_eq!(
        pending.await.expect("join").expect("reply"),
        json!({ "via": "binary" })
    );
    assert!(!connection.is_closed());
}
