use criterion::{Criterion, criterion_group, criterion_main};

use chrono::Utc;
use stockledger_core::{ActorId, ProductId};
use stockledger_inventory::{Adjustment, AdjustmentAction, Product};
use stockledger_store::{
    ActorRecord, InMemoryLedgerStore, LedgerStore, LedgerWriter, LogFilter, Pagination,
};

fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
}

fn seeded_writer(rt: &tokio::runtime::Runtime) -> (LedgerWriter<InMemoryLedgerStore>, ProductId, ActorRecord) {
    let store = InMemoryLedgerStore::new();
    let product = Product {
        id: ProductId::new(),
        name: "widget".to_string(),
        price_cents: 250,
        stock_count: 0,
    };
    let actor = ActorRecord {
        id: ActorId::new(),
        name: "Bench Actor".to_string(),
        email: "bench@example.com".to_string(),
    };
    rt.block_on(store.upsert_product(product.clone())).unwrap();
    rt.block_on(store.upsert_actor(actor.clone())).unwrap();
    (LedgerWriter::new(store), product.id, actor)
}

fn bench_apply_adjustment(c: &mut Criterion) {
    let rt = rt();
    let (writer, product_id, actor) = seeded_writer(&rt);

    c.bench_function("apply_add_adjustment", |b| {
        b.iter(|| {
            let adjustment = Adjustment {
                product_id,
                action: AdjustmentAction::Add,
                quantity: 1,
                reason: "bench".to_string(),
                notes: String::new(),
                actor_id: actor.id,
            };
            rt.block_on(writer.apply(adjustment, actor.clone())).unwrap();
        })
    });
}

fn bench_query_logs(c: &mut Criterion) {
    let rt = rt();
    let (writer, product_id, actor) = seeded_writer(&rt);

    // Pre-populate a realistic history before timing the page query.
    for _ in 0..10_000 {
        let adjustment = Adjustment {
            product_id,
            action: AdjustmentAction::Add,
            quantity: 1,
            reason: "bench".to_string(),
            notes: String::new(),
            actor_id: actor.id,
        };
        rt.block_on(writer.apply(adjustment, actor.clone())).unwrap();
    }

    let store = writer.into_store();

    c.bench_function("query_logs_page_over_10k_entries", |b| {
        b.iter(|| {
            rt.block_on(store.query_logs(
                LogFilter {
                    action: Some(AdjustmentAction::Add),
                    ..Default::default()
                },
                Pagination::page(50),
            ))
            .unwrap()
        })
    });

    c.bench_function("recent_entries_over_10k_entries", |b| {
        b.iter(|| {
            rt.block_on(store.recent_entries(Utc::now() - chrono::Duration::days(30), 10))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_apply_adjustment, bench_query_logs);
criterion_main!(benches);
