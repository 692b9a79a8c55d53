use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::PgTextExpressionMethods;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::customer::{Customer, CustomerFilter, CustomerInput};
use crate::domain::deletion_guard::OrderReferences;
use crate::domain::errors::{DomainError, CUSTOMER_HAS_ORDERS, CUSTOMER_NOT_FOUND};
use crate::domain::order::OrderStatus;
use crate::domain::ports::CustomerRepository;
use crate::schema::{customers, orders};

use super::contains_pattern;
use super::models::{CustomerChangeset, CustomerRow, NewCustomerRow};

#[derive(Clone)]
pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CustomerRepository for DieselCustomerRepository {
    fn insert(&self, customer: &CustomerInput) -> Result<Customer, DomainError> {
        let mut conn = self.pool.get()?;
        let row: CustomerRow = diesel::insert_into(customers::table)
            .values(&NewCustomerRow::new(Uuid::new_v4(), customer))
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<CustomerRow> = customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Customer::from))
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<CustomerRow> = customers::table
            .filter(customers::id.eq_any(ids.to_vec()))
            .select(CustomerRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<CustomerRow> = customers::table
            .filter(customers::email.eq(email))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Customer::from))
    }

    fn find_by_national_id(&self, national_id: &str) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<CustomerRow> = customers::table
            .filter(customers::national_id.eq(national_id))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Customer::from))
    }

    fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<CustomerRow> = customers::table
            .filter(customers::phone.eq(phone))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Customer::from))
    }

    fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = customers::table
            .select(CustomerRow::as_select())
            .order(customers::name.asc())
            .into_boxed();
        if let Some(name) = &filter.name {
            query = query.filter(customers::name.ilike(contains_pattern(name)));
        }
        if let Some(national_id) = &filter.national_id {
            query = query.filter(customers::national_id.like(contains_pattern(national_id)));
        }
        if let Some(active) = filter.active {
            query = query.filter(customers::active.eq(active));
        }

        let rows: Vec<CustomerRow> = query.load(&mut conn)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    fn update(&self, id: Uuid, customer: &CustomerInput) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<CustomerRow> = diesel::update(customers::table.find(id))
            .set(&CustomerChangeset::new(customer))
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Customer::from))
    }

    fn delete_with<G>(&self, id: Uuid, guard: G) -> Result<(), DomainError>
    where
        G: FnOnce(OrderReferences) -> Result<(), DomainError>,
    {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let locked = customers::table
                .find(id)
                .select(customers::id)
                .for_update()
                .first::<Uuid>(conn)
                .optional()?;
            if locked.is_none() {
                return Err(DomainError::not_found(CUSTOMER_NOT_FOUND));
            }

            let owned = orders::table.filter(orders::customer_id.eq(id));
            let has_open_order = diesel::select(exists(
                owned
                    .clone()
                    .filter(orders::status.eq(OrderStatus::Open.as_str())),
            ))
            .get_result::<bool>(conn)?;
            let has_any_order = diesel::select(exists(owned)).get_result::<bool>(conn)?;

            guard(OrderReferences {
                has_open_order,
                has_any_order,
            })?;

            // An order inserted after the check still trips the foreign key.
            diesel::delete(customers::table.find(id))
                .execute(conn)
                .map_err(|e| match e {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        DomainError::conflict(CUSTOMER_HAS_ORDERS)
                    }
                    other => other.into(),
                })?;
            Ok(())
        })
    }
}
