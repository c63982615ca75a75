//! Performance benchmarks for the subscription receive path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_channel::{unbounded, Receiver};
use std::sync::Arc;
use subscription_join::{
    CombinedKey, CombinedKeySchema, InMemorySubscriptionStore, Instruction, JoinConfig,
    MsgPackCodec, Processor, ProcessorContext, ReceiveContext, Record, StreamsMetrics,
    SubscriptionChange, SubscriptionReceiveProcessor, SubscriptionStore, SubscriptionWrapper,
    SubscriptionWrapperSerde, TaskId, Timestamp, ValueHash,
};

type Output = Record<CombinedKey<u64, u64>, SubscriptionChange<u64>>;

fn key_schema(config: &JoinConfig) -> CombinedKeySchema<u64, u64> {
    config.key_schema(
        Arc::new(MsgPackCodec::<u64>::new()),
        Arc::new(MsgPackCodec::<u64>::new()),
    )
}

fn create_processor() -> (
    SubscriptionReceiveProcessor<u64, u64>,
    Arc<dyn SubscriptionStore<u64>>,
    Receiver<Output>,
) {
    let config = JoinConfig::default();
    let store: Arc<dyn SubscriptionStore<u64>> = Arc::new(InMemorySubscriptionStore::new(
        config.subscription_store_name.clone(),
    ));

    let (tx, rx) = unbounded();
    let mut context: ReceiveContext<u64, u64> = ProcessorContext::new(
        &config.application_id,
        TaskId::new(0, 0),
        Arc::new(StreamsMetrics::new()),
        tx,
    );
    context.add_store(Arc::clone(&store));

    let mut processor =
        SubscriptionReceiveProcessor::new(config.subscription_store_name.clone(), key_schema(&config));
    processor.init(context).unwrap();
    (processor, store, rx)
}

fn wrapper(pk: u64, instruction: Instruction) -> SubscriptionWrapper<u64> {
    SubscriptionWrapper::new(
        Some(ValueHash::from_bytes(&pk.to_le_bytes())),
        instruction,
        pk,
        0,
    )
}

/// Benchmark subscribe/unsubscribe cycles against a store of varying size
fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");

    for existing in [100u64, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("existing_subscriptions", existing),
            &existing,
            |b, &size| {
                let (mut processor, _store, rx) = create_processor();

                for pk in 0..size {
                    processor
                        .process(Record::new(
                            Some(pk % 64),
                            wrapper(pk, Instruction::PropagateOnlyIfFkValAvailable),
                            Timestamp(0),
                        ))
                        .unwrap();
                }
                rx.try_iter().for_each(drop);

                let subscribe = wrapper(size, Instruction::PropagateOnlyIfFkValAvailable);
                let unsubscribe = wrapper(size, Instruction::DeleteKeyAndPropagate);

                b.iter(|| {
                    processor
                        .process(Record::new(Some(7), subscribe.clone(), Timestamp(1)))
                        .unwrap();
                    processor
                        .process(Record::new(Some(7), unsubscribe.clone(), Timestamp(2)))
                        .unwrap();
                    black_box(rx.try_iter().count());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark dropping records with no foreign key
fn bench_null_key_drop(c: &mut Criterion) {
    let (mut processor, _store, _rx) = create_processor();
    let w = wrapper(1, Instruction::PropagateOnlyIfFkValAvailable);

    c.bench_function("null_key_drop", |b| {
        b.iter(|| {
            processor
                .process(Record::new(None, black_box(w.clone()), Timestamp(0)))
                .unwrap();
        });
    });
}

/// Benchmark scanning one foreign key's subscribers
fn bench_prefix_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_scan");

    for fan_out in [10u64, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("subscribers", fan_out), &fan_out, |b, &n| {
            let (mut processor, store, rx) = create_processor();
            for fk in 0..16u64 {
                for pk in 0..n {
                    processor
                        .process(Record::new(
                            Some(fk),
                            wrapper(pk, Instruction::PropagateOnlyIfFkValAvailable),
                            Timestamp(0),
                        ))
                        .unwrap();
                }
            }
            rx.try_iter().for_each(drop);

            let mut schema = key_schema(&JoinConfig::default());
            let (tx, _keep) = unbounded::<Output>();
            let context: ReceiveContext<u64, u64> = ProcessorContext::new(
                JoinConfig::default().application_id,
                TaskId::new(0, 0),
                Arc::new(StreamsMetrics::new()),
                tx,
            );
            schema.init(&context).unwrap();
            let prefix = schema.prefix_bytes(&5).unwrap();

            b.iter(|| {
                black_box(store.prefix_scan(&prefix).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark combined key and wrapper encoding
fn bench_encoding(c: &mut Criterion) {
    let config = JoinConfig::default();
    let mut schema = key_schema(&config);
    let (tx, _rx) = unbounded::<Output>();
    let context: ReceiveContext<u64, u64> = ProcessorContext::new(
        &config.application_id,
        TaskId::new(0, 0),
        Arc::new(StreamsMetrics::new()),
        tx,
    );
    schema.init(&context).unwrap();

    c.bench_function("combined_key_to_bytes", |b| {
        b.iter(|| {
            black_box(schema.to_bytes(black_box(&42), black_box(&1_000_000)).unwrap());
        });
    });

    let serde = SubscriptionWrapperSerde::new(Arc::new(MsgPackCodec::<u64>::new()));
    let w = wrapper(1_000_000, Instruction::PropagateNullIfNoFkValAvailable);
    let bytes = serde.serialize("subscription-registration", &w).unwrap();

    c.bench_function("wrapper_deserialize", |b| {
        b.iter(|| {
            black_box(
                serde
                    .deserialize("subscription-registration", black_box(&bytes))
                    .unwrap(),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_process,
    bench_null_key_drop,
    bench_prefix_scan,
    bench_encoding,
);

criterion_main!(benches);
