use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Address, Item, Member};
use service::OrderService;
use store::{ItemStore, MemberStore, MemoryStore};

async fn seeded_store(stock: u32) -> (MemoryStore, domain::MemberId, domain::ItemId) {
    let store = MemoryStore::new();
    let member = Member::new("bench-user", Address::new("Seoul", "111", "12345"));
    store.insert_member(&member).await.unwrap();
    let item = Item::book("Bench Book", 10_000, stock, "Jane Doe", "9780000000001");
    store.insert_item(&item).await.unwrap();
    (store, member.id, item.id)
}

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("service/place_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (store, member_id, item_id) = seeded_store(u32::MAX).await;
                let service = OrderService::new(store);
                service.place(member_id, item_id, 1).await.unwrap();
            });
        });
    });
}

fn bench_place_and_cancel(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("service/place_and_cancel", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (store, member_id, item_id) = seeded_store(u32::MAX).await;
                let service = OrderService::new(store);
                let order_id = service.place(member_id, item_id, 2).await.unwrap();
                service.cancel(order_id).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_place_order, bench_place_and_cancel);
criterion_main!(benches);
