//! Peers that send garbage, truncated replies or foreign keys must never
//! corrupt a running session

use cinesync_client::{
    shared::{ReplyError, SyncConfig, SyncMessage, WireError},
    ErrorEvent, SyncClient, SyncClientError, SyncFailedEvent, SyncState,
};
use cinesync_server::{
    ErrorEvent as ServerErrorEvent, ProbeEvent, ServerConfig, SyncServer, SyncServerError,
};
use cinesync_test::{init_logger, LocalSocketPair, SimClock, SimulatedTime, FAKE_CLIENT_ADDR};

const LATENCY: f64 = 0.0625;

fn connected_client(time: &SimulatedTime, sockets: &LocalSocketPair) -> SyncClient {
    init_logger();
    let mut client = SyncClient::new(
        SyncConfig {
            attempts: 2,
            timeout_seconds: 1.0,
            max_retries: 1,
            ..Default::default()
        },
        SimClock::new(time, 0.0),
    )
    .unwrap();
    let (sender, receiver) = sockets.client_socket();
    client.connect(sender, receiver);
    client
}

#[test]
fn truncated_reply_is_reported_and_probe_stays_in_flight() {
    let time = SimulatedTime::new(0.0);
    let sockets = LocalSocketPair::new(&time, LATENCY);
    let mut client = connected_client(&time, &sockets);
    let (host_sender, mut host_receiver) = sockets.server_socket();

    client.synchronize();
    client.receive();
    time.advance(LATENCY);

    let (address, bytes) = host_receiver.receive().unwrap().unwrap();
    let probe = SyncMessage::from_bytes(bytes).unwrap();
    let t0 = probe.t0().unwrap();
    let truncated = SyncMessage::new("sync", vec![t0, 10.0]).to_bytes().unwrap();
    host_sender.send(&address, &truncated).unwrap();
    time.advance(LATENCY);

    let mut events = client.receive();
    let errors: Vec<SyncClientError> = events.read::<ErrorEvent>().collect();
    assert_eq!(
        errors,
        vec![SyncClientError::Reply(ReplyError::MalformedReply { len: 2 })]
    );
    assert_eq!(client.offset(), 0.0);
    assert!(matches!(
        client.state(),
        SyncState::WaitingForReply { attempt: 1, .. }
    ));
}

#[test]
fn undecodable_packet_is_reported_then_session_times_out() {
    let time = SimulatedTime::new(0.0);
    let sockets = LocalSocketPair::new(&time, LATENCY);
    let mut client = connected_client(&time, &sockets);
    let (host_sender, _host_receiver) = sockets.server_socket();
    let address = FAKE_CLIENT_ADDR.parse().unwrap();

    client.synchronize();
    client.receive();
    host_sender.send(&address, &[0xff, 0x00, 0x13]).unwrap();
    time.advance(LATENCY);

    let mut events = client.receive();
    let errors: Vec<SyncClientError> = events.read::<ErrorEvent>().collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SyncClientError::Wire(WireError::Decode { .. })));

    time.advance(1.0);
    let mut events = client.receive();
    assert_eq!(events.read::<SyncFailedEvent>().count(), 1);
    assert_eq!(client.state(), SyncState::Idle);
}

#[test]
fn reply_under_another_key_is_rejected() {
    let time = SimulatedTime::new(0.0);
    let sockets = LocalSocketPair::new(&time, LATENCY);
    let mut client = connected_client(&time, &sockets);
    let (host_sender, _host_receiver) = sockets.server_socket();
    let address = FAKE_CLIENT_ADDR.parse().unwrap();

    client.synchronize();
    client.receive();
    let chat = SyncMessage::reply("chat", 0.0, 5.0, 5.0).to_bytes().unwrap();
    host_sender.send(&address, &chat).unwrap();
    time.advance(LATENCY);

    let mut events = client.receive();
    let errors: Vec<SyncClientError> = events.read::<ErrorEvent>().collect();
    assert_eq!(
        errors,
        vec![SyncClientError::Reply(ReplyError::UnknownKey {
            key: "chat".to_string()
        })]
    );
    assert!(client.engine().session().unwrap().samples().is_empty());
}

#[test]
fn host_ignores_foreign_and_empty_probes() {
    init_logger();
    let time = SimulatedTime::new(0.0);
    let sockets = LocalSocketPair::new(&time, 0.0);
    let mut server = SyncServer::new(ServerConfig::default(), SimClock::new(&time, 50.0)).unwrap();
    let (sender, receiver) = sockets.server_socket();
    server.listen(sender, receiver);
    let (client_sender, mut client_receiver) = sockets.client_socket();

    client_sender
        .send(&SyncMessage::probe("chat", 1.0).to_bytes().unwrap())
        .unwrap();
    client_sender
        .send(&SyncMessage::new("sync", Vec::new()).to_bytes().unwrap())
        .unwrap();
    client_sender.send(&[1, 2, 3]).unwrap();

    let mut events = server.receive();
    assert!(!events.has::<ProbeEvent>());
    let errors: Vec<SyncServerError> = events.read::<ServerErrorEvent>().collect();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], SyncServerError::UnknownKey { .. }));
    assert!(matches!(errors[1], SyncServerError::EmptyProbe { .. }));
    assert!(matches!(errors[2], SyncServerError::Wire { .. }));
    assert!(client_receiver.receive().unwrap().is_none());
}

#[test]
fn host_answers_with_its_own_clock() {
    init_logger();
    let time = SimulatedTime::new(2.0);
    let sockets = LocalSocketPair::new(&time, 0.0);
    let mut server = SyncServer::new(ServerConfig::default(), SimClock::new(&time, 50.0)).unwrap();
    let (sender, receiver) = sockets.server_socket();
    server.listen(sender, receiver);
    let (client_sender, mut client_receiver) = sockets.client_socket();

    client_sender
        .send(&SyncMessage::probe("sync", 1.75).to_bytes().unwrap())
        .unwrap();
    let mut events = server.receive();
    assert_eq!(
        events.read::<ProbeEvent>().map(|(_, t0)| t0).collect::<Vec<_>>(),
        vec![1.75]
    );

    let bytes = client_receiver.receive().unwrap().unwrap();
    let reply = SyncMessage::from_bytes(bytes).unwrap();
    assert_eq!(reply, SyncMessage::reply("sync", 1.75, 52.0, 52.0));
}
