// cashbak/storefront/src/models/product.rs

use crate::errors::AppError;
use crate::models::narrow;
use cashbak::Product;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;

/// `stock` is a JSONB object of size label to units, e.g. `{"S": 3, "M": 5}`.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub cost: i64,
  pub category: i32,
  pub stock: Json<BTreeMap<String, i64>>,
}

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, description, price, cost, category, stock";

impl TryFrom<ProductRow> for Product {
  type Error = AppError;

  fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
    let stock = row
      .stock
      .0
      .into_iter()
      .map(|(size, units)| narrow::<i64, u32>(units, "products.stock").map(|units| (size, units)))
      .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      cost: row.cost,
      category: row.category,
      stock,
    })
  }
}
