//! End-to-end behavior of a started runtime against a temporary storage dir.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use flex_core::{
    Component, DEFAULT_PLACEHOLDER, Extension, Player, RegistrationError, ResolutionContext,
    ResolutionModel,
};
use flex_runtime::{
    FlexConfig, FlexRuntime, HostBridge, HostEvent, RuntimeError, Slot, SlotTarget, StoreError,
};
use parking_lot::Mutex;
use serial_test::serial;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Default)]
struct RecordingBridge {
    names: Mutex<Vec<(String, String)>>,
    broadcasts: Mutex<Vec<String>>,
}

#[async_trait]
impl HostBridge for RecordingBridge {
    async fn broadcast(&self, text: &str) {
        self.broadcasts.lock().push(text.to_string());
    }

    async fn set_display_name(&self, player_id: &str, name: &str) {
        self.names
            .lock()
            .push((player_id.to_string(), name.to_string()));
    }
}

struct ClanExtension;

impl Extension for ClanExtension {
    fn name(&self) -> &str {
        "clans"
    }

    fn provides(&self) -> Vec<&str> {
        vec!["clan:tag"]
    }

    fn resolve(&self, handler: &str, _: &ResolutionContext) -> Option<String> {
        (handler == "clan:tag").then(|| "RED".to_string())
    }
}

fn config(dir: &Path, model: ResolutionModel) -> FlexConfig {
    let mut config = FlexConfig::default();
    config.resolution = model;
    config.storage.dir = dir.join("flex");
    config
}

async fn started(dir: &Path, bridge: Arc<RecordingBridge>) -> FlexRuntime {
    let runtime =
        FlexRuntime::from_config(&config(dir, ResolutionModel::Chain), bridge).unwrap();
    runtime.start().await.unwrap();
    runtime
}

fn write_slot(runtime: &FlexRuntime, slot: Slot, json: &str) {
    std::fs::write(runtime.store().path(slot), json).unwrap();
}

// ============================================================================
// Reload
// ============================================================================

#[tokio::test]
#[serial]
async fn reload_rejects_unknown_handlers_and_keeps_active() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = started(dir.path(), Arc::new(RecordingBridge::default())).await;
    let before = runtime.store().snapshot(Slot::Chat);

    write_slot(
        &runtime,
        Slot::Chat,
        r#"[
            {"handler": "rank:title", "template": "<%VALUE%>"},
            {"handler": "flex:message", "template": "%VALUE%"},
            {"handler": "clan:tag", "template": "[%VALUE%]"}
        ]"#,
    );

    let reports = runtime.reload(SlotTarget::One(Slot::Chat)).await;
    assert_eq!(reports.len(), 1);
    match &reports[0].result {
        Err(StoreError::Unresolved { slot, ids }) => {
            assert_eq!(*slot, Slot::Chat);
            assert_eq!(ids, &["clan:tag", "rank:title"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(runtime.store().snapshot(Slot::Chat), before);
}

#[tokio::test]
#[serial]
async fn reload_accepts_handlers_of_registered_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = started(dir.path(), Arc::new(RecordingBridge::default())).await;
    runtime.register_extension(ClanExtension).unwrap();

    write_slot(
        &runtime,
        Slot::Chat,
        r#"[
            {"handler": "clan:tag", "template": "[%VALUE%] "},
            {"handler": "flex:name", "template": "%VALUE%: "},
            {"handler": "flex:message", "template": "%VALUE%"}
        ]"#,
    );
    let reports = runtime.reload(SlotTarget::One(Slot::Chat)).await;
    assert!(matches!(reports[0].result, Ok(3)));

    let ctx = ResolutionContext::with_message(Arc::new(Player::new("p1", "Alice")), "hi");
    assert_eq!(
        runtime.dispatcher().render(Slot::Chat, &ctx),
        "[RED] Alice: hi"
    );
}

#[tokio::test]
#[serial]
async fn persisted_configuration_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let custom = vec![
        Component::new("flex:admin", "[scarlet]"),
        Component::new("flex:name-colorless", "%VALUE%"),
    ];

    {
        let runtime = started(dir.path(), Arc::new(RecordingBridge::default())).await;
        let json = flex_core::encode_components(&custom).unwrap();
        write_slot(&runtime, Slot::Name, &json);
        assert!(runtime.reload(SlotTarget::One(Slot::Name)).await[0].result.is_ok());
    }

    let runtime = started(dir.path(), Arc::new(RecordingBridge::default())).await;
    assert_eq!(&*runtime.store().snapshot(Slot::Name), custom.as_slice());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn renders_never_observe_a_partial_reload() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Arc::new(started(dir.path(), Arc::new(RecordingBridge::default())).await);

    let old = r#"[
        {"handler": "flex:name", "template": "A%VALUE%"},
        {"handler": "flex:name", "template": "A%VALUE%"}
    ]"#;
    let new = r#"[
        {"handler": "flex:name", "template": "B%VALUE%"},
        {"handler": "flex:name", "template": "B%VALUE%"}
    ]"#;
    write_slot(&runtime, Slot::Join, old);
    assert!(runtime.reload(SlotTarget::One(Slot::Join)).await[0].result.is_ok());

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..2)
        .map(|_| {
            let runtime = Arc::clone(&runtime);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                let ctx = ResolutionContext::new(Arc::new(Player::new("p", "x")));
                while !stop.load(Ordering::Relaxed) {
                    let line = runtime.dispatcher().render(Slot::Join, &ctx);
                    assert!(line == "AxAx" || line == "BxBx", "mixed render: {line}");
                }
            })
        })
        .collect();

    for round in 0..20 {
        let json = if round % 2 == 0 { new } else { old };
        write_slot(&runtime, Slot::Join, json);
        assert!(runtime.reload(SlotTarget::One(Slot::Join)).await[0].result.is_ok());
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        reader.join().unwrap();
    }
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test]
#[serial]
async fn reset_all_restores_defaults_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = started(dir.path(), Arc::new(RecordingBridge::default())).await;
    write_slot(
        &runtime,
        Slot::Left,
        r#"[{"handler": "flex:none", "template": "bye"}]"#,
    );
    assert!(runtime.reload(SlotTarget::One(Slot::Left)).await[0].result.is_ok());

    for _ in 0..2 {
        let reports = runtime.reset(SlotTarget::All).await;
        assert_eq!(reports.len(), Slot::ALL.len());
        assert!(reports.iter().all(|report| report.result.is_ok()));

        for slot in Slot::ALL {
            assert_eq!(
                &*runtime.store().snapshot(slot),
                slot.defaults(DEFAULT_PLACEHOLDER).as_slice()
            );
            let on_disk = std::fs::read_to_string(runtime.store().path(slot)).unwrap();
            let decoded = flex_core::decode_components(&on_disk, DEFAULT_PLACEHOLDER).unwrap();
            assert_eq!(decoded, slot.defaults(DEFAULT_PLACEHOLDER));
        }
    }
}

// ============================================================================
// Name refresh
// ============================================================================

#[tokio::test]
#[serial]
async fn name_reload_reapplies_online_display_names() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = Arc::new(RecordingBridge::default());
    let runtime = started(dir.path(), Arc::clone(&bridge)).await;

    runtime
        .handle_event(HostEvent::PlayerJoin(Player::new("p1", "Alice")))
        .await;
    bridge.names.lock().clear();

    write_slot(
        &runtime,
        Slot::Name,
        r#"[{"handler": "flex:name", "template": "[VIP] %VALUE%"}]"#,
    );
    assert!(runtime.reload(SlotTarget::One(Slot::Name)).await[0].result.is_ok());
    assert_eq!(
        *bridge.names.lock(),
        vec![("p1".to_string(), "[VIP] Alice".to_string())]
    );

    // A rejected reload changes nothing and re-applies nothing.
    bridge.names.lock().clear();
    write_slot(
        &runtime,
        Slot::Name,
        r#"[{"handler": "ghost:id", "template": "%VALUE%"}]"#,
    );
    assert!(runtime.reload(SlotTarget::One(Slot::Name)).await[0].result.is_err());
    assert!(bridge.names.lock().is_empty());

    runtime
        .handle_event(HostEvent::PlayerLeave(Player::new("p1", "Alice")))
        .await;
    assert_eq!(
        bridge.broadcasts.lock().last().map(String::as_str),
        Some("[accent]Alice[accent] has disconnected.")
    );
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
#[serial]
fn only_one_runtime_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = Arc::new(RecordingBridge::default());
    let config = config(dir.path(), ResolutionModel::Chain);

    let first = FlexRuntime::from_config(&config, bridge.clone()).unwrap();
    let second = FlexRuntime::builder()
        .without_env()
        .search_path(dir.path())
        .merge(config.clone())
        .shared_bridge(bridge.clone())
        .build();
    assert!(matches!(second, Err(RuntimeError::AlreadyInitialized)));

    drop(first);
    assert!(FlexRuntime::from_config(&config, bridge).is_ok());
}

#[test]
#[serial]
fn models_are_mutually_exclusive() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = FlexRuntime::from_config(
        &config(dir.path(), ResolutionModel::Registry),
        Arc::new(RecordingBridge::default()),
    )
    .unwrap();

    assert!(matches!(
        runtime.register_extension(ClanExtension),
        Err(RegistrationError::WrongModel { .. })
    ));
    runtime
        .register_handler("clan:tag", |_: &ResolutionContext| Some("RED".to_string()))
        .unwrap();

    let handlers = runtime.list_handlers();
    assert!(handlers.contains(&"clan:tag".to_string()));
    assert!(handlers.contains(&"flex:name".to_string()));
    let mut sorted = handlers.clone();
    sorted.sort();
    assert_eq!(handlers, sorted);
}
