//! Engine integration tests over an in-memory wire

mod common;

use bytes::Bytes;
use common::{commands, drain_recv, step, transfer, Peer};
use kcp_arq::{Command, KcpConfig, KcpError, Segment};

const CONV: u32 = 0x0A0B_0C0D;
const TOKEN: u32 = 0x5EED;

fn pair(stream: bool) -> (Peer, Peer) {
    (Peer::new(CONV, TOKEN, stream), Peer::new(CONV, TOKEN, stream))
}

/// Encode a single hand-built segment addressed to the test conversation.
fn raw_push(sn: u32, frg: u8, payload: &'static [u8]) -> Vec<u8> {
    let mut seg = Segment::push(Bytes::from_static(payload), frg);
    seg.conv = CONV;
    seg.token = TOKEN;
    seg.sn = sn;
    seg.wnd = 256;
    let mut buf = vec![0u8; seg.encoded_len()];
    seg.encode(&mut buf, 0).unwrap();
    buf
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_basic_send_recv() {
    common::init_tracing();
    let (mut client, mut server) = pair(false);

    let big = pattern(3000);
    client.kcp.send(Bytes::from_static(b"hello")).unwrap();
    client.kcp.send(Bytes::from_static(b"world")).unwrap();
    client.kcp.send(Bytes::from(big.clone())).unwrap();
    server.kcp.send(Bytes::from_static(b"pong")).unwrap();

    let mut at_server = Vec::new();
    let mut at_client = Vec::new();
    for round in 0..100u32 {
        step(&mut client, &mut server, round * 100);
        at_server.extend(drain_recv(&mut server.kcp));
        at_client.extend(drain_recv(&mut client.kcp));
        if at_server.len() == 3 && at_client.len() == 1 {
            break;
        }
    }

    assert_eq!(at_server, vec![b"hello".to_vec(), b"world".to_vec(), big]);
    assert_eq!(at_client, vec![b"pong".to_vec()]);
    assert_eq!(client.kcp.wait_snd(), 0);
    assert_eq!(server.kcp.wait_snd(), 0);
}

#[test]
fn test_large_message_completes_with_last_fragment() {
    let (mut client, mut server) = pair(false);
    client.kcp.set_nodelay(false, 0, true);

    let mss = client.kcp.mss() as usize;
    let payload = pattern(mss * 5 + 17);
    client.kcp.send(Bytes::from(payload.clone())).unwrap();
    assert_eq!(client.kcp.wait_snd(), 6);

    client.kcp.update(0).unwrap();
    let chunks = client.drain_output();
    assert!(chunks.iter().all(|c| c.len() <= client.kcp.mtu() as usize));

    let (last, head) = chunks.split_last().unwrap();
    for chunk in head {
        server.kcp.input(chunk).unwrap();
        assert_eq!(server.kcp.peek_size(), None);
    }
    assert_eq!(
        server.kcp.recv(&mut vec![0u8; payload.len()]),
        Err(KcpError::IncompleteMessage)
    );

    server.kcp.input(last).unwrap();
    assert_eq!(server.kcp.peek_size(), Some(payload.len()));
    assert_eq!(drain_recv(&mut server.kcp), vec![payload]);
}

#[test]
fn test_reordered_fragments_reassemble() {
    let (mut client, mut server) = pair(false);
    client.kcp.set_nodelay(false, 0, true);

    let payload = pattern(client.kcp.mss() as usize * 3 + 5);
    client.kcp.send(Bytes::from(payload.clone())).unwrap();
    client.kcp.update(0).unwrap();

    // [WASK] [frg 3] [frg 2] [frg 1] [frg 0]
    let mut chunks = client.drain_output();
    assert_eq!(chunks.len(), 5);
    chunks.reverse();

    for chunk in &chunks[..3] {
        server.kcp.input(chunk).unwrap();
        assert_eq!(server.kcp.peek_size(), None);
    }
    assert_eq!(server.kcp.stats().rcv_buf_size, 3);

    for chunk in &chunks[3..] {
        server.kcp.input(chunk).unwrap();
    }
    assert_eq!(server.kcp.stats().rcv_buf_size, 0);
    assert_eq!(drain_recv(&mut server.kcp), vec![payload]);
}

#[test]
fn test_stream_mode_preserves_bytes() {
    let (mut client, mut server) = pair(true);

    let mut expected = Vec::new();
    for i in 0..50u8 {
        let write = vec![i; 300];
        expected.extend_from_slice(&write);
        assert_eq!(client.kcp.send(Bytes::from(write)).unwrap(), 300);
    }
    // writes are coalesced into full segments
    let mss = client.kcp.mss() as usize;
    assert_eq!(client.kcp.wait_snd(), expected.len().div_ceil(mss));

    let mut received = Vec::new();
    for round in 0..200u32 {
        step(&mut client, &mut server, round * 100);
        for chunk in drain_recv(&mut server.kcp) {
            received.extend(chunk);
        }
        if received.len() == expected.len() {
            break;
        }
    }
    assert_eq!(received, expected);
}

#[test]
fn test_empty_message() {
    let (mut client, mut server) = pair(false);
    client.kcp.set_nodelay(false, 0, true);

    assert_eq!(client.kcp.send(Bytes::new()).unwrap(), 0);
    assert_eq!(client.kcp.wait_snd(), 1);

    client.kcp.update(0).unwrap();
    transfer(&client, &mut server);
    assert_eq!(server.kcp.peek_size(), Some(0));
    assert_eq!(server.kcp.recv(&mut [0u8; 8]).unwrap(), 0);
}

#[test]
fn test_recv_buffer_too_small() {
    let (_, mut server) = pair(false);
    server.kcp.input(&raw_push(0, 0, b"0123456789")).unwrap();

    let mut small = [0u8; 4];
    assert_eq!(
        server.kcp.recv(&mut small),
        Err(KcpError::BufferTooSmall {
            needed: 10,
            available: 4
        })
    );

    // message is still there
    let mut buf = [0u8; 10];
    assert_eq!(server.kcp.recv(&mut buf).unwrap(), 10);
    assert_eq!(&buf, b"0123456789");
    assert_eq!(server.kcp.recv(&mut buf), Err(KcpError::RecvQueueEmpty));
}

#[test]
fn test_conversation_mismatch() {
    let mut other_conv = Peer::new(CONV + 1, TOKEN, false);
    let mut other_token = Peer::new(CONV, TOKEN + 1, false);
    let packet = raw_push(0, 0, b"hi");

    let err = other_conv.kcp.input(&packet).unwrap_err();
    assert_eq!(
        err,
        KcpError::ConversationMismatch {
            conv: CONV,
            token: TOKEN
        }
    );
    assert_eq!(err.code(), -1);

    assert!(matches!(
        other_token.kcp.input(&packet),
        Err(KcpError::ConversationMismatch { .. })
    ));
    assert_eq!(other_token.kcp.peek_size(), None);
}

#[test]
fn test_bad_segment_aborts_rest_of_datagram() {
    let (_, mut server) = pair(false);

    let mut datagram = raw_push(0, 0, b"first");
    let mut foreign = raw_push(1, 0, b"second");
    foreign[4..8].copy_from_slice(&(TOKEN ^ 1).to_le_bytes());
    datagram.extend_from_slice(&foreign);
    datagram.extend_from_slice(&raw_push(2, 0, b"third"));

    assert!(server.kcp.input(&datagram).is_err());
    // segments before the bad one were applied
    assert_eq!(drain_recv(&mut server.kcp), vec![b"first".to_vec()]);
    assert_eq!(server.kcp.stats().rcv_buf_size, 0);
}

#[test]
fn test_truncated_segment() {
    let (_, mut server) = pair(false);
    let packet = raw_push(0, 0, b"hello");

    let err = server.kcp.input(&packet[..packet.len() - 2]).unwrap_err();
    assert_eq!(
        err,
        KcpError::Truncated {
            declared: 5,
            available: 3
        }
    );
    assert_eq!(err.code(), -2);
}

#[test]
fn test_unknown_command() {
    let (_, mut server) = pair(false);
    let mut packet = raw_push(0, 0, b"hello");
    packet[8] = 99;

    let err = server.kcp.input(&packet).unwrap_err();
    assert_eq!(err, KcpError::UnknownCommand(99));
    assert_eq!(err.code(), -3);
}

#[test]
fn test_short_input_is_ignored() {
    let (_, mut server) = pair(false);
    assert_eq!(server.kcp.input(&[]).unwrap(), 0);
    assert_eq!(server.kcp.input(&[0u8; 27]).unwrap(), 0);
    assert_eq!(server.kcp.stats().packets_received, 0);
}

#[test]
fn test_duplicate_delivery() {
    let (mut client, mut server) = pair(false);
    client.kcp.set_nodelay(false, 0, true);
    client.kcp.send(Bytes::from_static(b"once")).unwrap();
    client.kcp.update(0).unwrap();

    let chunks = client.drain_output();
    for chunk in chunks.iter().chain(chunks.iter()) {
        server.kcp.input(chunk).unwrap();
    }
    assert_eq!(drain_recv(&mut server.kcp), vec![b"once".to_vec()]);

    // the duplicate is still acknowledged
    server.kcp.update(0).unwrap();
    let acks = server
        .drain_output()
        .iter()
        .flat_map(|c| commands(c))
        .filter(|&cmd| cmd == u8::from(Command::Ack))
        .count();
    assert_eq!(acks, 2);
}

#[test]
fn test_push_outside_window_dropped() {
    let (_, mut server) = pair(false);
    let packet = raw_push(server.kcp.rcv_wnd(), 0, b"late");

    assert_eq!(server.kcp.input(&packet).unwrap(), packet.len());
    assert_eq!(server.kcp.stats().rcv_buf_size, 0);
    assert_eq!(server.kcp.peek_size(), None);

    // not acknowledged either
    server.kcp.update(0).unwrap();
    assert!(server
        .drain_output()
        .iter()
        .all(|c| !commands(c).contains(&u8::from(Command::Ack))));
}

#[test]
fn test_check_driven_schedule() {
    let config = KcpConfig::new().fast_mode();
    let mut client = Peer::with_config(CONV, TOKEN, &config);
    let mut server = Peer::with_config(CONV, TOKEN, &config);

    for i in 0..20u8 {
        client.kcp.send(Bytes::from(vec![i; 500])).unwrap();
    }

    let mut now = 0u32;
    let mut received = Vec::new();
    for _ in 0..10_000 {
        step(&mut client, &mut server, now);
        received.extend(drain_recv(&mut server.kcp));
        if received.len() == 20 {
            break;
        }
        let wait = client.kcp.check(now).min(server.kcp.check(now));
        assert!(wait <= client.kcp.interval());
        now += wait.max(1);
    }

    assert_eq!(received.len(), 20);
    for (i, msg) in received.iter().enumerate() {
        assert_eq!(msg, &vec![i as u8; 500]);
    }
}

#[test]
fn test_stats() {
    let (mut client, mut server) = pair(false);
    let payload = pattern(2500);
    client.kcp.send(Bytes::from(payload.clone())).unwrap();

    for round in 0..50u32 {
        step(&mut client, &mut server, round * 100);
        if !drain_recv(&mut server.kcp).is_empty() {
            break;
        }
    }
    step(&mut client, &mut server, 10_000);

    let stats = client.kcp.stats();
    assert_eq!(stats.bytes_sent, payload.len() as u64);
    assert!(stats.packets_sent > 0);
    assert!(stats.packets_received > 0);
    assert_eq!(stats.retransmissions, 0);
    assert_eq!(stats.snd_buf_size, 0);
    assert_eq!(stats.rmt_wnd, 256);

    let stats = server.kcp.stats();
    assert_eq!(stats.bytes_received, payload.len() as u64);
    assert!(stats.packets_received > 0);
}
