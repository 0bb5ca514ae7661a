//! End-to-end command flow against a scripted messaging client.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use xpabridge::{
    ArrayValue, Bridge, BridgeConfig, BridgeError, Connector, ExitRegistrar, ReplySlot, TypeCode,
    Value, XpaClient,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Clone, Default)]
struct Fixture {
    payload: Option<Vec<u8>>,
    server: Option<String>,
    status: Option<String>,
}

impl Fixture {
    fn data(payload: &[u8], server: &str) -> Self {
        Self {
            payload: Some(payload.to_vec()),
            server: Some(server.to_string()),
            status: None,
        }
    }

    fn status(server: &str, status: &str) -> Self {
        Self {
            payload: None,
            server: Some(server.to_string()),
            status: Some(status.to_string()),
        }
    }
}

#[derive(Default)]
struct Shared {
    opens: usize,
    closes: usize,
    hooks: usize,
    sets: Vec<(String, Option<String>, Vec<u8>)>,
    script: VecDeque<Vec<Fixture>>,
}

type SharedRef = Arc<Mutex<Shared>>;

struct ScriptedConnector {
    shared: SharedRef,
}

impl Connector for ScriptedConnector {
    fn open(&self) -> Option<Box<dyn XpaClient>> {
        self.shared.lock().unwrap().opens += 1;
        Some(Box::new(ScriptedClient {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct ScriptedClient {
    shared: SharedRef,
}

impl ScriptedClient {
    fn next_replies(&self, slots: &mut [ReplySlot]) -> i32 {
        let fixtures = self
            .shared
            .lock()
            .unwrap()
            .script
            .pop_front()
            .unwrap_or_default();
        let n = fixtures.len().min(slots.len());
        for (slot, fixture) in slots.iter_mut().zip(&fixtures[..n]) {
            slot.fill(
                fixture.payload.clone().map(Bytes::from),
                fixture.server.clone(),
                fixture.status.clone(),
            );
        }
        n as i32
    }
}

impl XpaClient for ScriptedClient {
    fn get(
        &mut self,
        _access_point: &str,
        _command: Option<&str>,
        _mode: Option<&str>,
        slots: &mut [ReplySlot],
    ) -> i32 {
        self.next_replies(slots)
    }

    fn set(
        &mut self,
        access_point: &str,
        command: Option<&str>,
        _mode: Option<&str>,
        payload: &[u8],
        slots: &mut [ReplySlot],
    ) -> i32 {
        self.shared.lock().unwrap().sets.push((
            access_point.to_string(),
            command.map(str::to_string),
            payload.to_vec(),
        ));
        self.next_replies(slots)
    }

    fn close(&mut self) {
        self.shared.lock().unwrap().closes += 1;
    }
}

struct CountingExit {
    shared: SharedRef,
}

impl ExitRegistrar for CountingExit {
    fn register(&mut self, _hook: Box<dyn FnOnce()>) -> bool {
        self.shared.lock().unwrap().hooks += 1;
        true
    }
}

fn bridge_with(script: Vec<Vec<Fixture>>, config: BridgeConfig) -> (Bridge, SharedRef) {
    init_tracing();
    let shared: SharedRef = Arc::new(Mutex::new(Shared {
        script: script.into(),
        ..Shared::default()
    }));
    let bridge = Bridge::with_config(
        Box::new(ScriptedConnector {
            shared: Arc::clone(&shared),
        }),
        Box::new(CountingExit {
            shared: Arc::clone(&shared),
        }),
        config,
    );
    (bridge, shared)
}

#[test]
fn get_collects_replies_into_a_result() {
    let (mut bridge, _) = bridge_with(
        vec![vec![
            Fixture::data(b"512 512", "DS9:ds9 7f000001:45679"),
            Fixture::status("DS9:backup 7f000001:45680", "XPA$MESSAGE busy"),
        ]],
        BridgeConfig::default(),
    );

    let set = bridge.get(&[Value::from("DS9:*"), Value::from("frame")]).unwrap();
    assert_eq!(set.replies(), 2);
    assert_eq!(set.buffers(), 1);
    assert_eq!(set.messages(), 1);
    assert_eq!(set.errors(), 0);
    assert_eq!(set.payload_text(1).unwrap().as_deref(), Some("512 512"));
    assert_eq!(set.server(2).unwrap(), Some("DS9:backup 7f000001:45680"));
}

#[test]
fn connection_opens_once_and_hook_registers_once() {
    let (mut bridge, shared) = bridge_with(
        vec![vec![], vec![], vec![]],
        BridgeConfig::default(),
    );

    bridge.get(&[Value::from("a:*")]).unwrap();
    bridge.set(&[Value::from("a:*")]).unwrap();
    bridge.get(&[Value::from("a:*")]).unwrap();

    let shared = shared.lock().unwrap();
    assert_eq!(shared.opens, 1);
    assert_eq!(shared.hooks, 1);
}

#[test]
fn set_sends_the_computed_payload_bytes() {
    let (mut bridge, shared) = bridge_with(
        vec![vec![Fixture::status("srv", "XPA$MESSAGE stored")]],
        BridgeConfig::default(),
    );

    let data = ArrayValue::from_longs(&[1, 2, 3, 4]);
    let set = bridge
        .set(&[Value::from("a:*"), Value::from("array"), Value::Array(data)])
        .unwrap();
    assert_eq!(set.replies(), 1);
    assert_eq!(set.messages(), 1);

    let shared = shared.lock().unwrap();
    let (access_point, command, payload) = &shared.sets[0];
    assert_eq!(access_point, "a:*");
    assert_eq!(command.as_deref(), Some("array"));
    assert_eq!(payload.len(), 32);
}

#[test]
fn sequential_calls_never_blend_replies() {
    let (mut bridge, _) = bridge_with(
        vec![
            vec![
                Fixture::data(b"one", "first:a"),
                Fixture::data(b"two", "first:b"),
                Fixture::data(b"three", "first:c"),
            ],
            vec![Fixture::data(b"fresh", "second:a")],
        ],
        BridgeConfig::default(),
    );

    let first = bridge.get(&[Value::from("*")]).unwrap();
    assert_eq!(first.replies(), 3);

    let second = bridge.get(&[Value::from("*")]).unwrap();
    assert_eq!(second.replies(), 1);
    assert_eq!(second.server(1).unwrap(), Some("second:a"));
    assert_eq!(second.payload_text(1).unwrap().as_deref(), Some("fresh"));
    assert!(matches!(
        second.server(2),
        Err(BridgeError::Index { .. })
    ));
}

#[test]
fn replies_are_capped_at_the_configured_bound() {
    let fixtures: Vec<Fixture> = (0..5)
        .map(|i| Fixture::data(b"d", &format!("srv{i}")))
        .collect();
    let (mut bridge, _) = bridge_with(
        vec![fixtures],
        BridgeConfig {
            max_replies: 2,
            ..BridgeConfig::default()
        },
    );

    let set = bridge.get(&[Value::from("*")]).unwrap();
    assert_eq!(set.replies(), 2);
    assert_eq!(set.server(1).unwrap(), Some("srv0"));
    assert_eq!(set.server(2).unwrap(), Some("srv1"));
}

#[test]
fn error_statuses_are_counted_and_queryable() {
    let (mut bridge, _) = bridge_with(
        vec![vec![
            Fixture::status("srv1", "XPA$ERROR unknown command"),
            Fixture::data(b"ok", "srv2"),
        ]],
        BridgeConfig::default(),
    );

    let set = bridge.set(&[Value::from("*"), Value::from("quit")]).unwrap();
    assert_eq!(set.errors(), 1);
    assert_eq!(set.get_field("errors").unwrap(), 1);
    assert_eq!(
        set.eval(&mut [Value::Int(1), Value::Int(0)]).unwrap(),
        Value::Int(2)
    );
    assert_eq!(set.to_string(), "2 replies, 1 buffer, 0 messages, 1 error");
}

#[test]
fn interrupt_between_calls_aborts_and_clears() {
    let (mut bridge, _) = bridge_with(
        vec![vec![Fixture::data(b"x", "srv")], vec![]],
        BridgeConfig::default(),
    );

    bridge.get(&[Value::from("*")]).unwrap();

    let interrupt = bridge.interrupt();
    interrupt.raise();
    let err = bridge.get(&[Value::from("*")]).unwrap_err();
    assert!(matches!(err, BridgeError::Interrupted));

    interrupt.clear();
    let set = bridge.get(&[Value::from("*")]).unwrap();
    assert_eq!(set.replies(), 0);
}

#[test]
fn scatter_round_trip_through_the_bridge() {
    let doubles = ArrayValue::from_doubles(&[0.25, -4.0]);
    let (mut bridge, _) = bridge_with(
        vec![vec![Fixture::data(doubles.data(), "srv")]],
        BridgeConfig::default(),
    );

    let set = bridge.get(&[Value::from("*")]).unwrap();
    assert_eq!(set.payload_len(1).unwrap(), 16);

    let mut target = ArrayValue::zeroed(TypeCode::Double, 2).unwrap();
    set.scatter(1, &mut target).unwrap();
    assert_eq!(target.to_doubles(), vec![0.25, -4.0]);

    let mut small = ArrayValue::zeroed(TypeCode::Double, 1).unwrap();
    assert!(matches!(
        set.scatter(1, &mut small),
        Err(BridgeError::SizeMismatch { expected: 16, actual: 8 })
    ));
}

#[test]
fn explicit_disconnect_reopens_on_next_command() {
    let (mut bridge, shared) = bridge_with(vec![vec![], vec![]], BridgeConfig::default());

    bridge.get(&[Value::from("*")]).unwrap();
    assert!(bridge.is_connected());

    bridge.disconnect();
    assert!(!bridge.is_connected());

    bridge.get(&[Value::from("*")]).unwrap();
    let shared = shared.lock().unwrap();
    assert_eq!(shared.opens, 2);
    assert_eq!(shared.closes, 1);
    assert_eq!(shared.hooks, 1);
}
