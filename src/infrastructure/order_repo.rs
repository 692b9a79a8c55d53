use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::{DomainError, ORDER_NOT_FOUND};
use crate::domain::order::{Order, OrderChange, OrderFilter, OrderItemInput, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn insert_items(
    conn: &mut PgConnection,
    order_id: Uuid,
    items: &[OrderItemInput],
) -> Result<Vec<OrderItemRow>, DomainError> {
    let mut rows: Vec<OrderItemRow> = diesel::insert_into(order_items::table)
        .values(&NewOrderItemRow::for_order(order_id, items))
        .returning(OrderItemRow::as_returning())
        .get_results(conn)?;
    rows.sort_by_key(|r| r.position);
    Ok(rows)
}

fn load_items(conn: &mut PgConnection, order_id: Uuid) -> Result<Vec<OrderItemRow>, DomainError> {
    Ok(order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?)
}

/// The order row under `SELECT ... FOR UPDATE`, or `NotFound`.
fn lock_order(conn: &mut PgConnection, id: Uuid) -> Result<OrderRow, DomainError> {
    orders::table
        .find(id)
        .select(OrderRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found(ORDER_NOT_FOUND))
}

impl OrderRepository for DieselOrderRepository {
    fn create(
        &self,
        customer_id: Uuid,
        total: &BigDecimal,
        items: &[OrderItemInput],
    ) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let order: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    customer_id,
                    total: total.clone(),
                    status: OrderStatus::Open.as_str().to_string(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its items; neither is visible without the other.
            let items = insert_items(conn, order.id, items)?;

            order.into_domain(items)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let order: Option<OrderRow> = orders::table
                    .find(id)
                    .select(OrderRow::as_select())
                    .first(conn)
                    .optional()?;

                let Some(order) = order else {
                    return Ok(None);
                };

                let items = load_items(conn, order.id)?;
                order.into_domain(items).map(Some)
            })
    }

    fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let mut query = orders::table
                    .select(OrderRow::as_select())
                    .order((orders::created_at.desc(), orders::id.asc()))
                    .into_boxed();
                if let Some(customer_id) = filter.customer_id {
                    query = query.filter(orders::customer_id.eq(customer_id));
                }
                if let Some(status) = filter.status {
                    query = query.filter(orders::status.eq(status.as_str()));
                }
                let rows: Vec<OrderRow> = query.load(conn)?;

                let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&rows)
                    .select(OrderItemRow::as_select())
                    .order(order_items::position.asc())
                    .load(conn)?;
                let items = items.grouped_by(&rows);

                rows.into_iter()
                    .zip(items)
                    .map(|(order, items)| order.into_domain(items))
                    .collect()
            })
    }

    fn update_with<P>(&self, id: Uuid, plan: P) -> Result<Order, DomainError>
    where
        P: FnOnce(&Order) -> Result<OrderChange, DomainError>,
    {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = lock_order(conn, id)?;
            let item_rows = load_items(conn, id)?;
            let current = row.into_domain(item_rows.clone())?;

            let change = plan(&current)?;

            let item_rows = match &change.items {
                Some(replacement) => {
                    diesel::delete(order_items::table.filter(order_items::order_id.eq(id)))
                        .execute(conn)?;
                    insert_items(conn, id, replacement)?
                }
                None => item_rows,
            };

            let updated: OrderRow = diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(change.status.as_str()),
                    orders::total.eq(change.total.clone()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            updated.into_domain(item_rows)
        })
    }

    fn delete_with<G>(&self, id: Uuid, guard: G) -> Result<(), DomainError>
    where
        G: FnOnce(&Order) -> Result<(), DomainError>,
    {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = lock_order(conn, id)?;
            let items = load_items(conn, id)?;
            guard(&row.into_domain(items)?)?;

            diesel::delete(order_items::table.filter(order_items::order_id.eq(id)))
                .execute(conn)?;
            diesel::delete(orders::table.find(id)).execute(conn)?;
            Ok(())
        })
    }
}
