use common::{CustomerId, Money, ProductId};
use criterion::{Criterion, criterion_group, criterion_main};
use order_core::{
    InMemoryOrderStore, NewOrder, OrderService, OrderStatus, OrderStore, Product,
};

fn new_order(quantity: u32) -> NewOrder {
    NewOrder {
        customer_id: CustomerId::new("bench@example.com"),
        product_id: ProductId::new("SKU-BENCH"),
        quantity,
    }
}

async fn seeded_service() -> OrderService<InMemoryOrderStore> {
    let store = InMemoryOrderStore::new();
    store
        .insert_product(Product::new(
            ProductId::new("SKU-BENCH"),
            "Benchmark Widget",
            Money::from_cents(1000),
            u32::MAX,
        ))
        .await
        .unwrap();
    OrderService::new(store)
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = rt.block_on(seeded_service());

    c.bench_function("order_core/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.create_order(new_order(1)).await.unwrap();
            });
        });
    });
}

fn bench_conditional_transition(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = rt.block_on(seeded_service());

    c.bench_function("order_core/confirm_then_mismatch", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order = service.create_order(new_order(1)).await.unwrap();
                let result = service
                    .store()
                    .transition(order.id, OrderStatus::Created, OrderStatus::Confirmed, None)
                    .await
                    .unwrap();
                assert!(matches!(result, order_core::Transition::Applied(_)));

                // Duplicate attempt exercises the mismatch path.
                service
                    .store()
                    .transition(order.id, OrderStatus::Created, OrderStatus::Confirmed, None)
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_create_order, bench_conditional_transition);
criterion_main!(benches);
