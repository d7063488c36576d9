//! End-to-end tests over real TCP connections.

use ringlog_core::{FlatStore, LogStore, RingStore};
use ringlog_server::{
    LogServer, ServerConfig, ServerError, ServerResult, ServerStats, SharedStore, Shutdown,
    TIMESTAMP_PREFIX,
};
use ringlog_storage::{FileBackend, InMemoryBackend};
use std::io::{Read, Write};
use std::net::{Shutdown as SocketShutdown, SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct Running {
    addr: SocketAddr,
    shutdown: Shutdown,
    store: SharedStore,
    handle: JoinHandle<ServerResult<ServerStats>>,
}

impl Running {
    fn stop(self) -> ServerStats {
        self.shutdown.trigger();
        self.handle.join().unwrap().unwrap()
    }
}

fn local_config() -> ServerConfig {
    ServerConfig::new("127.0.0.1:0".parse().unwrap())
        .with_accept_poll_interval(Duration::from_millis(5))
}

fn start(config: ServerConfig, store: impl LogStore + 'static) -> Running {
    let server = LogServer::bind(config, SharedStore::new(store)).unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    let store = server.shared_store();
    let handle = thread::spawn(move || server.run());
    Running {
        addr,
        shutdown,
        store,
        handle,
    }
}

fn start_ring(capacity: usize) -> Running {
    start(local_config(), RingStore::new(capacity).unwrap())
}

/// Sends everything, half-closes, and returns everything echoed.
fn exchange(addr: SocketAddr, payload: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(payload).unwrap();
    stream.shutdown(SocketShutdown::Write).unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    out
}

fn send_record(stream: &mut TcpStream, record: &[u8], expected: &[u8]) {
    stream.write_all(record).unwrap();
    let mut echo = vec![0u8; expected.len()];
    stream.read_exact(&mut echo).unwrap();
    assert_eq!(echo, expected);
}

#[test]
fn single_record_echo() {
    let server = start_ring(10);
    assert_eq!(exchange(server.addr, b"hello\n"), b"hello\n");

    let stats = server.stop();
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.records, 1);
}

#[test]
fn record_split_across_writes() {
    let server = start_ring(10);
    let mut stream = TcpStream::connect(server.addr).unwrap();

    stream.write_all(b"hel").unwrap();
    stream.flush().unwrap();
    thread::sleep(Duration::from_millis(20));
    send_record(&mut stream, b"lo\n", b"hello\n");

    drop(stream);
    server.stop();
}

#[test]
fn eviction_and_seek() {
    let server = start_ring(3);
    let out = exchange(server.addr, b"a\nb\nc\nd\nSEEKCMD:1,0\ne\n");

    let expected: &[&[u8]] = &[
        b"a\n",
        b"a\nb\n",
        b"a\nb\nc\n",
        b"b\nc\nd\n",
        // cursor at offset 2, the start of "c"
        b"c\nd\n",
        // the view is now c, d, e; the cursor stays at byte 2
        b"d\ne\n",
    ];
    assert_eq!(out, expected.concat());
    assert_eq!(server.store.snapshot().unwrap(), b"c\nd\ne\n");

    server.stop();
}

#[test]
fn seek_within_entry() {
    let server = start_ring(10);
    let out = exchange(server.addr, b"alpha\nbeta\nSEEKCMD:1,2\n");
    assert_eq!(out, b"alpha\nalpha\nbeta\nta\n".as_slice());
    server.stop();
}

#[test]
fn out_of_range_seek_is_ignored() {
    let server = start_ring(3);
    let out = exchange(server.addr, b"x\nSEEKCMD:5,0\nSEEKCMD:0,9\n");
    assert_eq!(out, b"x\nx\nx\n".as_slice());
    assert_eq!(server.store.snapshot().unwrap(), b"x\n");
    server.stop();
}

#[test]
fn malformed_seek_is_stored() {
    let server = start_ring(3);
    let out = exchange(server.addr, b"SEEKCMD:one,two\n");
    assert_eq!(out, b"SEEKCMD:one,two\n".as_slice());
    server.stop();
}

#[test]
fn cursor_is_per_connection() {
    let server = start_ring(10);

    let mut first = TcpStream::connect(server.addr).unwrap();
    send_record(&mut first, b"a\n", b"a\n");
    send_record(&mut first, b"b\n", b"a\nb\n");
    send_record(&mut first, b"SEEKCMD:1,0\n", b"b\n");

    let mut second = TcpStream::connect(server.addr).unwrap();
    send_record(&mut second, b"c\n", b"a\nb\nc\n");

    send_record(&mut first, b"d\n", b"b\nc\nd\n");

    drop(first);
    drop(second);
    let stats = server.stop();
    assert_eq!(stats.connections, 2);
    assert_eq!(stats.records, 4);
}

#[test]
fn concurrent_writers_never_interleave() {
    const CLIENTS: usize = 8;
    const RECORDS: usize = 25;

    let server = start_ring(16);
    let addr = server.addr;

    let clients: Vec<_> = (0..CLIENTS)
        .map(|client| {
            thread::spawn(move || {
                let payload: String = (0..RECORDS)
                    .map(|n| format!("client-{client}-record-{n}\n"))
                    .collect();
                let out = exchange(addr, payload.as_bytes());
                (client, String::from_utf8(out).unwrap())
            })
        })
        .collect();

    for handle in clients {
        let (client, out) = handle.join().unwrap();
        assert!(out.ends_with(&format!("client-{client}-record-{}\n", RECORDS - 1)));
        for line in out.lines() {
            let rest = line.strip_prefix("client-").unwrap();
            let (who, n) = rest.split_once("-record-").unwrap();
            assert!(who.parse::<usize>().unwrap() < CLIENTS, "bad line {line:?}");
            assert!(n.parse::<usize>().unwrap() < RECORDS, "bad line {line:?}");
        }
    }

    let view = String::from_utf8(server.store.snapshot().unwrap()).unwrap();
    assert_eq!(view.lines().count(), 16);

    let stats = server.stop();
    assert_eq!(stats.connections, CLIENTS as u64);
    assert_eq!(stats.records, (CLIENTS * RECORDS) as u64);
    assert_eq!(stats.failed_connections, 0);
}

#[test]
fn shutdown_waits_for_open_connections() {
    let server = start_ring(10);
    let mut stream = TcpStream::connect(server.addr).unwrap();
    send_record(&mut stream, b"a\n", b"a\n");

    server.shutdown.trigger();
    thread::sleep(Duration::from_millis(50));
    assert!(!server.handle.is_finished());

    send_record(&mut stream, b"b\n", b"a\nb\n");
    drop(stream);

    let stats = server.handle.join().unwrap().unwrap();
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.records, 2);
}

#[test]
fn timestamps_over_flat_store() {
    let config = local_config().with_timestamps(Duration::from_millis(10));
    let server = start(config, FlatStore::new(InMemoryBackend::new()));

    thread::sleep(Duration::from_millis(80));
    let out = String::from_utf8(exchange(server.addr, b"note\n")).unwrap();
    assert!(out.lines().any(|line| line == "note"));

    let store = server.store.clone();
    let stats = server.stop();
    assert!(stats.timestamps >= 1);

    let view = String::from_utf8(store.snapshot().unwrap()).unwrap();
    let stamps = view
        .lines()
        .filter(|line| line.starts_with(TIMESTAMP_PREFIX))
        .count();
    assert_eq!(stamps as u64, stats.timestamps);
}

#[test]
fn file_store_seek() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::open(&dir.path().join("ringlog.data")).unwrap();
    let server = start(local_config(), FlatStore::new(backend));

    let out = exchange(server.addr, b"one\ntwo\nSEEKCMD:1,1\n");
    assert_eq!(out, b"one\none\ntwo\nwo\n".as_slice());

    server.stop();
    assert_eq!(
        std::fs::read(dir.path().join("ringlog.data")).unwrap(),
        b"one\ntwo\n"
    );
}

#[test]
fn second_bind_is_fatal() {
    let server = start_ring(10);
    let config = ServerConfig::new(server.addr);

    let err = LogServer::bind(config, SharedStore::new(RingStore::default())).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, ServerError::Bind { addr, .. } if addr == server.addr));

    server.stop();
}
