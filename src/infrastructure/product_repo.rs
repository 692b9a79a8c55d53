use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductCategory};
use crate::schema::products;

use super::models::ProductRow;

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<ProductRow> = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(Product::try_from).transpose()
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(ids.to_vec()))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        rows.into_iter().map(Product::try_from).collect()
    }

    fn list(&self, category: Option<ProductCategory>) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table
            .select(ProductRow::as_select())
            .order(products::name.asc())
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(products::category.eq(category.as_str()));
        }

        let rows: Vec<ProductRow> = query.load(&mut conn)?;
        rows.into_iter().map(Product::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;
    use crate::infrastructure::test_db::setup_db;

    fn seed(pool: &DbPool, name: &str, category: ProductCategory) -> Uuid {
        let mut conn = pool.get().expect("Failed to get connection");
        let id = Uuid::new_v4();
        diesel::insert_into(products::table)
            .values((
                products::id.eq(id),
                products::name.eq(name),
                products::category.eq(category.as_str()),
                products::price.eq(BigDecimal::from(12)),
            ))
            .execute(&mut conn)
            .expect("seed product failed");
        id
    }

    #[tokio::test]
    async fn find_by_ids_loads_known_products_in_one_query() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool.clone());
        let pizza = seed(&pool, "Pizza", ProductCategory::Snack);
        let juice = seed(&pool, "Juice", ProductCategory::Drink);
        seed(&pool, "Pudding", ProductCategory::Dessert);

        let mut found = repo.find_by_ids(&[juice, Uuid::new_v4(), pizza]).unwrap();
        found.sort_by(|a, b| a.name.cmp(&b.name));

        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Juice", "Pizza"]);
        assert!(repo.find_by_ids(&[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool.clone());
        seed(&pool, "Cola", ProductCategory::Drink);
        seed(&pool, "Burger", ProductCategory::Snack);

        let drinks = repo.list(Some(ProductCategory::Drink)).unwrap();
        assert!(drinks.iter().all(|p| p.category == ProductCategory::Drink));
        assert!(drinks.iter().any(|p| p.name == "Cola"));
        assert!(repo.list(None).unwrap().len() >= 2);
    }
}
