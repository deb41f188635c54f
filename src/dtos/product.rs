// src/dtos/product.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::extract::Validate;
use crate::models::product::Product;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 80;
const DESCRIPTION_MIN_CHARS: usize = 10;

/// `NUMERIC(12, 2)`: at most two fractional digits, below 10^10.
const PRICE_MAX_SCALE: u32 = 2;
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Wire shape of a product, used for request and response bodies alike.
/// `id` is ignored on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub img_url: String,
}

impl ProductDto {
    /// Overwrites every mutable field of `entity`. The identifier is left alone.
    /// Text fields are stored trimmed, the same way they are validated.
    pub fn copy_onto(&self, entity: &mut Product) {
        entity.name = self.name.trim().to_string();
        entity.description = self.description.trim().to_string();
        entity.price = self.price;
        entity.img_url = self.img_url.clone();
    }
}

impl Validate for ProductDto {
    /// Checks shape constraints, collecting every failing field.
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let name_len = self.name.trim().chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
            errors.push(FieldError::new(
                "name",
                format!("Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
            ));
        }

        if self.description.trim().chars().count() < DESCRIPTION_MIN_CHARS {
            errors.push(FieldError::new(
                "description",
                format!("Description must have at least {DESCRIPTION_MIN_CHARS} characters"),
            ));
        }

        if self.price <= Decimal::ZERO {
            errors.push(FieldError::new("price", "Price must be positive"));
        } else if self.price.normalize().scale() > PRICE_MAX_SCALE {
            errors.push(FieldError::new(
                "price",
                format!("Price must have at most {PRICE_MAX_SCALE} decimal places"),
            ));
        } else if self.price >= Decimal::from(PRICE_LIMIT) {
            errors.push(FieldError::new("price", format!("Price must be less than {PRICE_LIMIT}")));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// Convert from Model to DTO
impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            img_url: product.img_url,
        }
    }
}

// Convert from DTO to Model
impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name.trim().to_string(),
            description: dto.description.trim().to_string(),
            price: dto.price,
            img_url: dto.img_url,
        }
    }
}
