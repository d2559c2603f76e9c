//! End-to-end probes against fake servers on the loopback interface.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::json;

use mysqlprobe_mysql::{ProbeConfig, ProbeOutcome, ReadDeadline, TailField, probe};

/// MySQL 8.4 greeting: protocol 10, "8.4.6", connection id 10,
/// capabilities 0xDFFFFFFF, utf8mb4_0900_ai_ci, autocommit,
/// caching_sha2_password.
fn mysql_8_4_greeting() -> Vec<u8> {
    let mut payload = vec![10];
    payload.extend_from_slice(b"8.4.6\0");
    payload.extend_from_slice(&10u32.to_le_bytes());
    payload.extend_from_slice(b"\x1b\x2e\x5c\x07\x41\x63\x0f\x66");
    payload.push(0);
    payload.extend_from_slice(&[0xFF, 0xFF]);
    payload.push(255);
    payload.extend_from_slice(&[0x02, 0x00]);
    payload.extend_from_slice(&[0xFF, 0xDF]);
    payload.push(21);
    payload.extend_from_slice(&[0; 10]);
    payload.extend_from_slice(b"\x12\x34\x56\x78\x1a\x2b\x3c\x4d\x5e\x6f\x70\x01\x00");
    payload.extend_from_slice(b"caching_sha2_password\0");
    frame(&payload)
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let len = u32::try_from(payload.len()).unwrap();
    let mut packet = len.to_le_bytes()[..3].to_vec();
    packet.push(0);
    packet.extend_from_slice(payload);
    packet
}

/// Accept one connection, send `chunks`, wait `hold`, then count the bytes
/// the client sent before closing.
fn serve_once(chunks: Vec<Vec<u8>>, hold: Duration) -> (u16, JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let port = listener.local_addr().expect("local addr").port();
    let handle = thread::spawn(move || {
        let (mut socket, _) = listener.accept().expect("accept probe connection");
        for chunk in chunks {
            socket.write_all(&chunk).ok();
            socket.flush().ok();
            thread::sleep(Duration::from_millis(10));
        }
        thread::sleep(hold);
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");
        let mut received = Vec::new();
        socket.read_to_end(&mut received).ok();
        received.len()
    });
    (port, handle)
}

fn config(port: u16) -> ProbeConfig {
    ProbeConfig::new()
        .host("127.0.0.1")
        .port(port)
        .timeout(Duration::from_millis(500))
}

#[test]
fn detects_mysql_greeting() {
    let greeting = mysql_8_4_greeting();
    assert_eq!(&greeting[..4], &[0x49, 0x00, 0x00, 0x00]);

    let (port, server) = serve_once(vec![greeting], Duration::ZERO);
    let outcome = probe(&config(port).verbose(true));

    let handshake = outcome.handshake().expect("greeting detected");
    assert!(handshake.is_complete());

    let mut value = serde_json::to_value(outcome.report(true)).unwrap();
    let preview = value
        .as_object_mut()
        .unwrap()
        .remove("preview_hex")
        .expect("verbose report has preview");
    assert_eq!(preview.as_str().map(str::len), Some(128));
    assert_eq!(
        value,
        json!({
            "ok": true,
            "mysql": true,
            "protocol": 10,
            "server_version": "8.4.6",
            "connection_id": 10,
            "capability_flags": 3_758_096_383_u32,
            "character_set": 255,
            "status_flags": 2,
            "auth_plugin": "caching_sha2_password"
        })
    );

    assert_eq!(server.join().unwrap(), 0, "probe must not send anything");
}

#[test]
fn detects_greeting_delivered_in_pieces() {
    let greeting = mysql_8_4_greeting();
    let chunks = vec![
        greeting[..3].to_vec(),
        greeting[3..20].to_vec(),
        greeting[20..].to_vec(),
    ];
    let (port, server) = serve_once(chunks, Duration::ZERO);
    let outcome = probe(&config(port).deadline(ReadDeadline::Overall));

    let report = outcome.report(false);
    assert!(report.mysql);
    assert_eq!(report.server_version.as_deref(), Some("8.4.6"));
    server.join().unwrap();
}

#[test]
fn short_greeting_is_partial_detection() {
    let full = mysql_8_4_greeting();
    // payload through the lower capability word, declared as such
    let packet = frame(&full[4..26]);
    let (port, server) = serve_once(vec![packet], Duration::ZERO);

    let outcome = probe(&config(port));
    let handshake = outcome.handshake().expect("greeting detected");
    assert_eq!(handshake.missing(), Some(TailField::ExtendedFlags));
    assert_eq!(handshake.info().capability_flags, 0xFFFF);
    server.join().unwrap();
}

#[test]
fn payload_cut_short_is_not_mysql() {
    let full = mysql_8_4_greeting();
    let (port, server) = serve_once(vec![full[..40].to_vec()], Duration::ZERO);

    let outcome = probe(&config(port));
    match &outcome {
        ProbeOutcome::NotMySql { reason, .. } => {
            assert_eq!(reason, "short read (payload incomplete)");
        }
        other => panic!("expected NotMySql, got {other:?}"),
    }
    assert_eq!(
        serde_json::to_value(outcome.report(false)).unwrap(),
        json!({"ok": true, "mysql": false})
    );
    server.join().unwrap();
}

#[test]
fn ssh_banner_is_not_mysql() {
    let banner = b"SSH-2.0-OpenSSH_9.6p1 Ubuntu-3ubuntu13\r\n".to_vec();
    let (port, server) = serve_once(vec![banner], Duration::ZERO);

    let outcome = probe(&config(port).verbose(true));
    let value = serde_json::to_value(outcome.report(true)).unwrap();
    assert_eq!(value["ok"], json!(true));
    assert_eq!(value["mysql"], json!(false));
    assert_eq!(value["first_bytes_hex"], json!("5353482d"));
    server.join().unwrap();
}

#[test]
fn silent_server_is_read_failure() {
    let (port, server) = serve_once(Vec::new(), Duration::from_millis(400));
    let config = config(port).read_timeout(Duration::from_millis(100));

    let outcome = probe(&config);
    match &outcome {
        ProbeOutcome::ReadFailure { error } => {
            assert!(error.starts_with("read failed: read header: "), "{error}");
        }
        other => panic!("expected ReadFailure, got {other:?}"),
    }
    assert!(!outcome.report(false).ok);
    server.join().unwrap();
}

#[test]
fn closed_port_is_dial_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };

    let outcome = probe(&config(port));
    let report = outcome.report(false);
    assert!(!report.ok);
    assert!(!report.mysql);
    let error = report.error.expect("dial error text");
    assert!(error.starts_with("dial failed: "), "{error}");
}
