//! Error handling and edge case tests.

use crossbeam_channel::unbounded;
use std::sync::Arc;
use subscription_join::{
    CombinedKey, CombinedKeySchema, InMemorySubscriptionStore, Instruction, JoinConfig,
    JoinError, MsgPackCodec, PartitionTask, Processor, ProcessorContext, ReceiveContext, Record,
    RecordingStore, StoreFactory, StreamsMetrics, SubscriptionChange, SubscriptionStore,
    SubscriptionReceiveProcessorSupplier, SubscriptionWrapper, SubscriptionWrapperSerde, TaskId,
    TaskState, Timestamp, CURRENT_VERSION,
};

type Output = Record<CombinedKey<u64, u64>, SubscriptionChange<u64>>;

fn supplier(config: &JoinConfig) -> SubscriptionReceiveProcessorSupplier<u64, u64> {
    let factory: Arc<dyn StoreFactory<u64>> = Arc::new(config.store_factory());
    let schema: CombinedKeySchema<u64, u64> = config.key_schema(
        Arc::new(MsgPackCodec::<u64>::new()),
        Arc::new(MsgPackCodec::<u64>::new()),
    );
    SubscriptionReceiveProcessorSupplier::new(factory, schema)
}

fn context(
    config: &JoinConfig,
    store: Option<Arc<RecordingStore<u64>>>,
) -> (ReceiveContext<u64, u64>, crossbeam_channel::Receiver<Output>) {
    let (tx, rx) = unbounded();
    let mut context: ReceiveContext<u64, u64> = ProcessorContext::new(
        &config.application_id,
        TaskId::new(0, 0),
        Arc::new(StreamsMetrics::new()),
        tx,
    );
    if let Some(store) = store {
        context.add_store(store);
    }
    (context, rx)
}

fn recording_store(config: &JoinConfig) -> Arc<RecordingStore<u64>> {
    Arc::new(RecordingStore::new(Arc::new(InMemorySubscriptionStore::new(
        config.subscription_store_name.clone(),
    ))))
}

fn future_wrapper(instruction: Instruction) -> SubscriptionWrapper<u64> {
    SubscriptionWrapper::with_version(CURRENT_VERSION + 1, None, instruction, 3, Some(0)).unwrap()
}

// --- Version Gate ---

#[test]
fn test_newer_version_fails_without_store_access() {
    let config = JoinConfig::default();
    let store = recording_store(&config);
    let (ctx, rx) = context(&config, Some(store.clone()));

    let mut processor = supplier(&config).get();
    processor.init(ctx).unwrap();

    for instruction in Instruction::ALL {
        for fk in [Some(7), None] {
            let err = processor
                .process(Record::new(fk, future_wrapper(instruction), Timestamp(1)))
                .unwrap_err();
            match err {
                JoinError::UnsupportedVersion { version, supported } => {
                    assert_eq!(version, CURRENT_VERSION + 1);
                    assert_eq!(supported, CURRENT_VERSION);
                }
                other => panic!("expected UnsupportedVersion, got {:?}", other),
            }
        }
    }

    assert!(store.access().is_untouched());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_version_gate_precedes_null_key_drop() {
    let config = JoinConfig::default();
    let (ctx, _rx) = context(&config, Some(recording_store(&config)));

    let mut task = PartitionTask::new(TaskId::new(0, 0), supplier(&config).get());
    task.start(ctx).unwrap();

    let result = task.process(Record::new(
        None,
        future_wrapper(Instruction::DeleteKeyAndPropagate),
        Timestamp(1),
    ));
    assert!(matches!(result, Err(JoinError::UnsupportedVersion { .. })));
}

#[test]
fn test_halted_task_never_retries() {
    let config = JoinConfig::default();
    let store = recording_store(&config);
    let (ctx, rx) = context(&config, Some(store.clone()));

    let mut task = PartitionTask::new(TaskId::new(0, 0), supplier(&config).get());
    task.start(ctx).unwrap();
    let _ = task.process(Record::new(
        Some(7),
        future_wrapper(Instruction::PropagateOnlyIfFkValAvailable),
        Timestamp(1),
    ));

    let valid = SubscriptionWrapper::new(None, Instruction::PropagateOnlyIfFkValAvailable, 3u64, 0);
    let result = task.process(Record::new(Some(7), valid, Timestamp(2)));
    assert!(matches!(result, Err(JoinError::TaskHalted)));
    assert_eq!(store.approximate_len(), 0);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_serde_rejects_newer_version() {
    let serde = SubscriptionWrapperSerde::new(Arc::new(MsgPackCodec::<u64>::new()));
    let bytes = vec![CURRENT_VERSION + 1, 0];
    let err = serde.deserialize("subscription-registration", &bytes).unwrap_err();
    assert!(err.is_fatal());
}

// --- Initialization ---

#[test]
fn test_missing_store_fails_startup() {
    let config = JoinConfig::default();
    let (ctx, _rx) = context(&config, None);

    let mut task = PartitionTask::new(TaskId::new(0, 0), supplier(&config).get());
    let result = task.start(ctx);

    assert!(matches!(result, Err(JoinError::StoreNotFound(ref name)) if name == &config.subscription_store_name));
    assert_eq!(task.state(), TaskState::Halted);
}

#[test]
fn test_empty_application_id_fails_startup() {
    let config = JoinConfig::default();
    let store = recording_store(&config);
    let (tx, _rx) = unbounded();
    let mut ctx: ReceiveContext<u64, u64> =
        ProcessorContext::new("", TaskId::new(0, 0), Arc::new(StreamsMetrics::new()), tx);
    ctx.add_store(store);

    let mut task = PartitionTask::new(TaskId::new(0, 0), supplier(&config).get());
    assert!(matches!(task.start(ctx), Err(JoinError::InvalidConfig(_))));
}

// --- Runtime Failures ---

#[test]
fn test_store_write_failure_propagates() {
    let config = JoinConfig::default();
    let store = recording_store(&config);
    let (ctx, rx) = context(&config, Some(store.clone()));

    let mut task = PartitionTask::new(TaskId::new(0, 0), supplier(&config).get());
    task.start(ctx).unwrap();

    store.set_fail_writes(true);
    let w = SubscriptionWrapper::new(None, Instruction::PropagateOnlyIfFkValAvailable, 3u64, 0);
    let result = task.process(Record::new(Some(7), w.clone(), Timestamp(1)));

    assert!(matches!(result, Err(JoinError::Store(_))));
    assert_eq!(task.state(), TaskState::Running);
    assert!(rx.try_recv().is_err());

    // The owning task decides what to do; a later success is still possible.
    store.set_fail_writes(false);
    task.process(Record::new(Some(7), w, Timestamp(2))).unwrap();
    assert_eq!(store.approximate_len(), 1);
}

#[test]
fn test_downstream_closed_halts_task() {
    let config = JoinConfig::default();
    let store = recording_store(&config);
    let (ctx, rx) = context(&config, Some(store.clone()));
    drop(rx);

    let mut task = PartitionTask::new(TaskId::new(0, 0), supplier(&config).get());
    task.start(ctx).unwrap();

    let w = SubscriptionWrapper::new(None, Instruction::PropagateOnlyIfFkValAvailable, 0u64, 0);
    let result = task.process(Record::new(Some(7), w, Timestamp(1)));
    assert!(matches!(result, Err(JoinError::DownstreamClosed)));
    assert_eq!(task.state(), TaskState::Halted);
    assert_eq!(store.approximate_len(), 1);

    // No further store writes whose changes nobody can see.
    for pk in 1..3u64 {
        let w = SubscriptionWrapper::new(None, Instruction::PropagateOnlyIfFkValAvailable, pk, 0);
        let result = task.process(Record::new(Some(7), w, Timestamp(2)));
        assert!(matches!(result, Err(JoinError::TaskHalted)));
    }
    assert_eq!(store.approximate_len(), 1);
    assert_eq!(store.access().puts, 1);
}

// --- Config ---

#[test]
fn test_config_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("join.json");
    std::fs::write(
        &path,
        r#"{"application_id": "orders", "subscription_store_name": "orders-subscriptions"}"#,
    )
    .unwrap();

    let config = JoinConfig::from_file(&path).unwrap();
    assert_eq!(config.subscription_store_name, "orders-subscriptions");
    assert_eq!(supplier(&config).get().store_name(), "orders-subscriptions");
}

#[test]
fn test_config_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = JoinConfig::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(JoinError::Io(_))));
}
