//! PostgreSQL store implementation.
//!
//! Raw sqlx queries with hand-written row mapping. Every mutating call is
//! one transaction; the stock decrement is a conditional update checked in
//! the same statement that performs it.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use domain::{
    Address, Category, CategoryId, Delivery, DeliveryId, DeliveryStatus, Item, ItemDetails,
    ItemId, Member, MemberId, Order, OrderId, OrderLine, OrderLineId, OrderStatus,
};

use crate::error::{Result, StoreError};
use crate::query::{OrderDetail, OrderGraph, OrderLineDetail, OrderSummary};
use crate::store::{
    CategoryStore, ItemStore, MAX_SEARCH_ROWS, MemberStore, OrderQueryStore, OrderSearch,
    OrderStore,
};

/// Columns shared by every order-header query.
const ORDER_HEADER_COLUMNS: &str = "o.order_id, o.member_id, o.ordered_at, o.status, \
     d.delivery_id, d.city AS delivery_city, d.street AS delivery_street, \
     d.zipcode AS delivery_zipcode, d.status AS delivery_status";

/// Member columns aliased apart from the delivery address.
const MEMBER_COLUMNS: &str = "m.name AS member_name, m.city AS member_city, \
     m.street AS member_street, m.zipcode AS member_zipcode";

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    /// Appends the search predicates to `sql`, numbering parameters from
    /// `param + 1`. Returns the new parameter count.
    fn push_search_sql(sql: &mut String, search: &OrderSearch, mut param: usize) -> usize {
        if search.status.is_some() {
            param += 1;
            sql.push_str(&format!(" AND o.status = ${param}"));
        }
        if search.member_name.is_some() {
            param += 1;
            sql.push_str(&format!(" AND m.name LIKE ${param}"));
        }
        param
    }

    /// Binds the search parameters in the order `push_search_sql` numbered
    /// them.
    fn bind_search<'q>(
        mut query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
        search: &OrderSearch,
    ) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
        if let Some(status) = search.status {
            query = query.bind(status.as_str());
        }
        if let Some(ref name) = search.member_name {
            query = query.bind(format!("%{name}%"));
        }
        query
    }

    fn row_to_member(row: &PgRow) -> Result<Member> {
        Ok(Member {
            id: MemberId::from_uuid(row.try_get("member_id")?),
            name: row.try_get("name")?,
            address: Address::new(
                row.try_get::<String, _>("city")?,
                row.try_get::<String, _>("street")?,
                row.try_get::<String, _>("zipcode")?,
            ),
        })
    }

    fn row_to_item(row: &PgRow) -> Result<Item> {
        let stock: i32 = row.try_get("stock_quantity")?;
        let stock_quantity = u32::try_from(stock)
            .map_err(|_| StoreError::Decode(format!("negative stock quantity: {stock}")))?;

        let item_type: String = row.try_get("item_type")?;
        let details = match item_type.as_str() {
            "book" => ItemDetails::Book {
                author: row
                    .try_get::<Option<String>, _>("author")?
                    .ok_or_else(|| StoreError::Decode("book row without author".into()))?,
                isbn: row
                    .try_get::<Option<String>, _>("isbn")?
                    .ok_or_else(|| StoreError::Decode("book row without isbn".into()))?,
            },
            other => {
                return Err(StoreError::Decode(format!("unknown item type: {other}")));
            }
        };

        Ok(Item {
            id: ItemId::from_uuid(row.try_get("item_id")?),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            stock_quantity,
            details,
        })
    }

    fn row_to_line(row: &PgRow) -> Result<OrderLine> {
        let quantity: i32 = row.try_get("quantity")?;
        Ok(OrderLine {
            id: OrderLineId::from_uuid(row.try_get("order_line_id")?),
            item_id: ItemId::from_uuid(row.try_get("item_id")?),
            order_price: row.try_get("order_price")?,
            quantity: u32::try_from(quantity)
                .map_err(|_| StoreError::Decode(format!("negative line quantity: {quantity}")))?,
        })
    }

    /// Parses the order-header columns shared by every graph query.
    fn row_to_order(row: &PgRow, lines: Vec<OrderLine>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let delivery_status: String = row.try_get("delivery_status")?;

        let delivery = Delivery {
            id: DeliveryId::from_uuid(row.try_get("delivery_id")?),
            address: Address::new(
                row.try_get::<String, _>("delivery_city")?,
                row.try_get::<String, _>("delivery_street")?,
                row.try_get::<String, _>("delivery_zipcode")?,
            ),
            status: DeliveryStatus::from_str(&delivery_status).map_err(StoreError::Decode)?,
        };

        Ok(Order::restore(
            OrderId::from_uuid(row.try_get("order_id")?),
            MemberId::from_uuid(row.try_get("member_id")?),
            lines,
            delivery,
            row.try_get::<DateTime<Utc>, _>("ordered_at")?,
            OrderStatus::from_str(&status).map_err(StoreError::Decode)?,
        ))
    }

    fn row_to_joined_member(row: &PgRow) -> Result<Member> {
        Ok(Member {
            id: MemberId::from_uuid(row.try_get("member_id")?),
            name: row.try_get("member_name")?,
            address: Address::new(
                row.try_get::<String, _>("member_city")?,
                row.try_get::<String, _>("member_street")?,
                row.try_get::<String, _>("member_zipcode")?,
            ),
        })
    }

    async fn lines_for_order(&self, order_id: Uuid) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query(
            "SELECT order_line_id, item_id, order_price, quantity \
             FROM order_lines WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_line).collect()
    }
}

#[async_trait]
impl MemberStore for PostgresStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        sqlx::query(
            "INSERT INTO members (member_id, name, city, street, zipcode) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(member.id.as_uuid())
        .bind(&member.name)
        .bind(&member.address.city)
        .bind(&member.address.street)
        .bind(&member.address.zipcode)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn member(&self, id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(
            "SELECT member_id, name, city, street, zipcode FROM members WHERE member_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_member).transpose()
    }

    async fn members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            "SELECT member_id, name, city, street, zipcode FROM members ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_member).collect()
    }

    async fn members_named(&self, name: &str) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            "SELECT member_id, name, city, street, zipcode FROM members WHERE name = $1",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_member).collect()
    }

    async fn rename_member(&self, id: MemberId, name: &str) -> Result<()> {
        sqlx::query("UPDATE members SET name = $1 WHERE member_id = $2")
            .bind(name)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ItemStore for PostgresStore {
    async fn insert_item(&self, item: &Item) -> Result<()> {
        let ItemDetails::Book {
            ref author,
            ref isbn,
        } = item.details;

        sqlx::query(
            "INSERT INTO items (item_id, name, price, stock_quantity, item_type, author, isbn) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(item.price)
        .bind(item.stock_quantity as i32)
        .bind("book")
        .bind(author)
        .bind(isbn)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn item(&self, id: ItemId) -> Result<Option<Item>> {
        let row = sqlx::query(
            "SELECT item_id, name, price, stock_quantity, item_type, author, isbn \
             FROM items WHERE item_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn items(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT item_id, name, price, stock_quantity, item_type, author, isbn \
             FROM items ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn update_item(&self, item: &Item) -> Result<()> {
        sqlx::query(
            "UPDATE items SET name = $1, price = $2, stock_quantity = $3 WHERE item_id = $4",
        )
        .bind(&item.name)
        .bind(item.price)
        .bind(item.stock_quantity as i32)
        .bind(item.id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CategoryStore for PostgresStore {
    async fn insert_category(&self, category: &Category) -> Result<()> {
        sqlx::query("INSERT INTO categories (category_id, name, parent_id) VALUES ($1, $2, $3)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(category.parent_id.map(|p| p.as_uuid()))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let rows =
            sqlx::query("SELECT category_id, name, parent_id FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: CategoryId::from_uuid(row.try_get("category_id")?),
                    name: row.try_get("name")?,
                    parent_id: row
                        .try_get::<Option<Uuid>, _>("parent_id")?
                        .map(CategoryId::from_uuid),
                })
            })
            .collect()
    }

    async fn add_item_to_category(&self, category_id: CategoryId, item_id: ItemId) -> Result<()> {
        sqlx::query(
            "INSERT INTO category_items (category_id, item_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(category_id.as_uuid())
        .bind(item_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn items_in_category(&self, category_id: CategoryId) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT i.item_id, i.name, i.price, i.stock_quantity, i.item_type, i.author, i.isbn \
             FROM items i \
             JOIN category_items ci ON ci.item_id = i.item_id \
             WHERE ci.category_id = $1 \
             ORDER BY i.name",
        )
        .bind(category_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn create_order(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: the stock check and the write are one
        // statement, so concurrent orders cannot both take the last units.
        for line in order.lines() {
            let updated = sqlx::query(
                "UPDATE items SET stock_quantity = stock_quantity - $1 \
                 WHERE item_id = $2 AND stock_quantity >= $1",
            )
            .bind(line.quantity as i32)
            .bind(line.item_id.as_uuid())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(StoreError::InsufficientStock {
                    item_id: line.item_id,
                });
            }
        }

        sqlx::query(
            "INSERT INTO orders (order_id, member_id, ordered_at, status) VALUES ($1, $2, $3, $4)",
        )
        .bind(order.id().as_uuid())
        .bind(order.member_id().as_uuid())
        .bind(order.ordered_at())
        .bind(order.status().as_str())
        .execute(&mut *tx)
        .await?;

        let delivery = order.delivery();
        sqlx::query(
            "INSERT INTO deliveries (delivery_id, order_id, city, street, zipcode, status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(delivery.id.as_uuid())
        .bind(order.id().as_uuid())
        .bind(&delivery.address.city)
        .bind(&delivery.address.street)
        .bind(&delivery.address.zipcode)
        .bind(delivery.status.as_str())
        .execute(&mut *tx)
        .await?;

        for line in order.lines() {
            sqlx::query(
                "INSERT INTO order_lines (order_line_id, order_id, item_id, order_price, quantity) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(line.id.as_uuid())
            .bind(order.id().as_uuid())
            .bind(line.item_id.as_uuid())
            .bind(line.order_price)
            .bind(line.quantity as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        let sql = format!(
            "SELECT {ORDER_HEADER_COLUMNS} \
             FROM orders o \
             JOIN deliveries d ON d.order_id = o.order_id \
             WHERE o.order_id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let lines = self.lines_for_order(id.as_uuid()).await?;
                Ok(Some(Self::row_to_order(&row, lines)?))
            }
            None => Ok(None),
        }
    }

    async fn cancel_order(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Guarded flip: only an ORDERED row may become CANCELLED, so a
        // concurrent cancel cannot restore stock twice.
        let updated = sqlx::query("UPDATE orders SET status = $1 WHERE order_id = $2 AND status = $3")
            .bind(OrderStatus::Cancelled.as_str())
            .bind(order.id().as_uuid())
            .bind(OrderStatus::Ordered.as_str())
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::OrderNotCancellable {
                order_id: order.id(),
            });
        }

        for line in order.lines() {
            sqlx::query("UPDATE items SET stock_quantity = stock_quantity + $1 WHERE item_id = $2")
                .bind(line.quantity as i32)
                .bind(line.item_id.as_uuid())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_delivery(&self, order_id: OrderId, status: DeliveryStatus) -> Result<()> {
        sqlx::query("UPDATE deliveries SET status = $1 WHERE order_id = $2")
            .bind(status.as_str())
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn orders(&self, search: &OrderSearch) -> Result<Vec<OrderGraph>> {
        let mut sql = format!(
            "SELECT {ORDER_HEADER_COLUMNS}, {MEMBER_COLUMNS} \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.order_id = o.order_id \
             WHERE 1=1"
        );
        Self::push_search_sql(&mut sql, search, 0);
        sql.push_str(&format!(" ORDER BY o.ordered_at LIMIT {MAX_SEARCH_ROWS}"));

        let rows = Self::bind_search(sqlx::query(&sql), search)
            .fetch_all(&self.pool)
            .await?;

        // One line read per order on top of the base read.
        let mut graphs = Vec::with_capacity(rows.len());
        for row in &rows {
            let order_id: Uuid = row.try_get("order_id")?;
            let lines = self.lines_for_order(order_id).await?;
            graphs.push(OrderGraph {
                order: Self::row_to_order(row, lines)?,
                member: Self::row_to_joined_member(row)?,
            });
        }
        Ok(graphs)
    }

    async fn orders_with_lines(&self, search: &OrderSearch) -> Result<Vec<OrderGraph>> {
        let mut sql = format!(
            "SELECT {ORDER_HEADER_COLUMNS}, {MEMBER_COLUMNS}, \
             l.order_line_id, l.item_id, l.order_price, l.quantity \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.order_id = o.order_id \
             JOIN order_lines l ON l.order_id = o.order_id \
             WHERE 1=1"
        );
        Self::push_search_sql(&mut sql, search, 0);
        sql.push_str(" ORDER BY o.ordered_at");

        let rows = Self::bind_search(sqlx::query(&sql), search)
            .fetch_all(&self.pool)
            .await?;

        // The join fans each order out to one row per line; collapse the
        // duplicates back into one graph per order ID.
        let mut graphs: Vec<OrderGraph> = Vec::new();
        let mut by_order: HashMap<Uuid, usize> = HashMap::new();
        let mut lines_by_order: Vec<Vec<OrderLine>> = Vec::new();
        let mut header_rows: Vec<&PgRow> = Vec::new();

        for row in &rows {
            let order_id: Uuid = row.try_get("order_id")?;
            let line = Self::row_to_line(row)?;
            match by_order.get(&order_id) {
                Some(&idx) => lines_by_order[idx].push(line),
                None => {
                    by_order.insert(order_id, header_rows.len());
                    header_rows.push(row);
                    lines_by_order.push(vec![line]);
                }
            }
        }

        for (row, lines) in header_rows.into_iter().zip(lines_by_order) {
            graphs.push(OrderGraph {
                order: Self::row_to_order(row, lines)?,
                member: Self::row_to_joined_member(row)?,
            });
        }
        Ok(graphs)
    }

    async fn orders_paged(
        &self,
        search: &OrderSearch,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<OrderGraph>> {
        let mut sql = format!(
            "SELECT {ORDER_HEADER_COLUMNS}, {MEMBER_COLUMNS} \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.order_id = o.order_id \
             WHERE 1=1"
        );
        let param = Self::push_search_sql(&mut sql, search, 0);
        sql.push_str(&format!(
            " ORDER BY o.ordered_at OFFSET ${} LIMIT ${}",
            param + 1,
            param + 2
        ));

        let rows = Self::bind_search(sqlx::query(&sql), search)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        // One batched line read for the whole page.
        let ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("order_id"))
            .collect::<std::result::Result<_, _>>()?;

        let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        if !ids.is_empty() {
            let line_rows = sqlx::query(
                "SELECT order_id, order_line_id, item_id, order_price, quantity \
                 FROM order_lines WHERE order_id = ANY($1)",
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

            for row in &line_rows {
                let order_id: Uuid = row.try_get("order_id")?;
                lines_by_order
                    .entry(order_id)
                    .or_default()
                    .push(Self::row_to_line(row)?);
            }
        }

        let mut graphs = Vec::with_capacity(rows.len());
        for row in &rows {
            let order_id: Uuid = row.try_get("order_id")?;
            let lines = lines_by_order.remove(&order_id).unwrap_or_default();
            graphs.push(OrderGraph {
                order: Self::row_to_order(row, lines)?,
                member: Self::row_to_joined_member(row)?,
            });
        }
        Ok(graphs)
    }
}

#[async_trait]
impl OrderQueryStore for PostgresStore {
    async fn order_summaries(&self, search: &OrderSearch) -> Result<Vec<OrderSummary>> {
        let mut sql = String::from(
            "SELECT o.order_id, m.name AS member_name, o.ordered_at, o.status, \
             d.city, d.street, d.zipcode \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.order_id = o.order_id \
             WHERE 1=1",
        );
        Self::push_search_sql(&mut sql, search, 0);
        sql.push_str(" ORDER BY o.ordered_at");

        let rows = Self::bind_search(sqlx::query(&sql), search)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let status: String = row.try_get("status")?;
                Ok(OrderSummary {
                    order_id: OrderId::from_uuid(row.try_get("order_id")?),
                    member_name: row.try_get("member_name")?,
                    ordered_at: row.try_get("ordered_at")?,
                    status: OrderStatus::from_str(&status).map_err(StoreError::Decode)?,
                    address: Address::new(
                        row.try_get::<String, _>("city")?,
                        row.try_get::<String, _>("street")?,
                        row.try_get::<String, _>("zipcode")?,
                    ),
                })
            })
            .collect()
    }

    async fn order_details(&self, search: &OrderSearch) -> Result<Vec<OrderDetail>> {
        let summaries = self.order_summaries(search).await?;

        // The collection cannot be flattened into the summary row without
        // duplicating it, so each order's lines are a separate read.
        let mut details = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let rows = sqlx::query(
                "SELECT i.name AS item_name, l.order_price, l.quantity \
                 FROM order_lines l \
                 JOIN items i ON i.item_id = l.item_id \
                 WHERE l.order_id = $1",
            )
            .bind(summary.order_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

            let lines = rows
                .iter()
                .map(|row| {
                    let quantity: i32 = row.try_get("quantity")?;
                    Ok(OrderLineDetail {
                        item_name: row.try_get("item_name")?,
                        order_price: row.try_get("order_price")?,
                        quantity: u32::try_from(quantity).map_err(|_| {
                            StoreError::Decode(format!("negative line quantity: {quantity}"))
                        })?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            details.push(OrderDetail {
                order_id: summary.order_id,
                member_name: summary.member_name,
                ordered_at: summary.ordered_at,
                status: summary.status,
                address: summary.address,
                lines,
            });
        }
        Ok(details)
    }
}
