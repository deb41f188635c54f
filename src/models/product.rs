use rust_decimal::Decimal;
use sqlx::FromRow;

/// Persisted catalog entry. `id` is `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_url: String,
}

impl Product {
    /// An unloaded handle to an existing row. Only the identifier is
    /// meaningful; the remaining fields are expected to be overwritten
    /// before the entity is saved.
    pub fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            name: String::new(),
            description: String::new(),
            price: Decimal::ZERO,
            img_url: String::new(),
        }
    }
}
