//! Dummy-data seeding for demos and the zero-setup run mode.
//!
//! Loads a small fixture at startup: two members, two books each, one
//! two-line order each, and a category tree over the catalog. Multi-line
//! orders are assembled at the domain level and written through the store
//! in one unit of work.

use chrono::Utc;
use domain::{Address, Category, Delivery, Item, Member, Order, OrderLine};
use service::ServiceError;
use store::ShopStore;

/// Seeds the demo fixture unless members already exist.
pub async fn seed_if_empty<S: ShopStore>(store: &S) -> Result<(), ServiceError> {
    if !store.members().await?.is_empty() {
        tracing::debug!("store already populated, skipping seed");
        return Ok(());
    }
    seed(store).await
}

/// Seeds the demo fixture unconditionally.
pub async fn seed<S: ShopStore>(store: &S) -> Result<(), ServiceError> {
    let book_one = seed_member_with_order(
        store,
        "userA",
        Address::new("Seoul", "111", "12345"),
        ("Book One", 10_000, 100, 1),
        ("Book Two", 20_000, 200, 2),
    )
    .await?;

    let book_three = seed_member_with_order(
        store,
        "userB",
        Address::new("Busan", "222", "12345"),
        ("Book Three", 20_000, 200, 3),
        ("Book Four", 40_000, 300, 4),
    )
    .await?;

    let books = Category::root("Books");
    store.insert_category(&books).await?;
    let bestsellers = Category::child_of("Bestsellers", books.id);
    store.insert_category(&bestsellers).await?;

    store.add_item_to_category(books.id, book_one).await?;
    store.add_item_to_category(books.id, book_three).await?;
    store.add_item_to_category(bestsellers.id, book_one).await?;

    tracing::info!("seeded demo data");
    Ok(())
}

/// Inserts a member plus two books and places one order covering both.
/// Returns the first book's ID for category linking.
async fn seed_member_with_order<S: ShopStore>(
    store: &S,
    name: &str,
    address: Address,
    first: (&str, i64, u32, u32),
    second: (&str, i64, u32, u32),
) -> Result<domain::ItemId, ServiceError> {
    let member = Member::new(name, address);
    store.insert_member(&member).await?;

    let (name1, price1, stock1, qty1) = first;
    let (name2, price2, stock2, qty2) = second;

    let mut book1 = Item::book(name1, price1, stock1, "Jane Doe", "9780000000001");
    let mut book2 = Item::book(name2, price2, stock2, "John Roe", "9780000000002");
    store.insert_item(&book1).await?;
    store.insert_item(&book2).await?;

    let lines = vec![
        OrderLine::create(&mut book1, price1, qty1)?,
        OrderLine::create(&mut book2, price2, qty2)?,
    ];
    let order = Order::place(
        member.id,
        Delivery::ready(member.address.clone()),
        lines,
        Utc::now(),
    );
    store.create_order(&order).await?;

    Ok(book1.id)
}
