use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Money is stored as NUMERIC(12, 2): at most two decimals, below 10^10.
pub fn check_amount(field: &str, amount: &BigDecimal) -> Result<(), DomainError> {
    if amount.with_scale(2) != *amount {
        return Err(DomainError::validation(format!(
            "{field} must have at most 2 decimal places"
        )));
    }
    if amount.abs() >= BigDecimal::from(10_000_000_000i64) {
        return Err(DomainError::validation(format!("{field} is too large")));
    }
    Ok(())
}

/// Admin-supplied product fields, used for both create and full update.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ProductDraft {
    /// Trims the name and rejects drafts that would break catalog invariants.
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if self.price < BigDecimal::zero() {
            return Err(DomainError::validation("price must not be negative"));
        }
        check_amount("price", &self.price)?;
        if self.stock < 0 {
            return Err(DomainError::validation("stock must not be negative"));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn draft(name: &str, price: &str, stock: i32) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: None,
            price: BigDecimal::from_str(price).expect("valid decimal"),
            stock,
            category: Some("Cocina".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn valid_draft_is_trimmed() {
        let d = draft("  Grifo de Cocina  ", "25000", 15).validate().expect("valid");
        assert_eq!(d.name, "Grifo de Cocina");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            draft("   ", "1", 1).validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(matches!(
            draft("Ducha", "-0.01", 1).validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn negative_stock_is_rejected() {
        assert!(matches!(
            draft("Ducha", "10", -1).validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn price_beyond_cents_or_column_range_is_rejected() {
        for price in ["10.125", "10000000000", "0.001"] {
            assert!(
                matches!(draft("Ducha", price, 1).validate(), Err(DomainError::Validation(_))),
                "{price} accepted"
            );
        }
        assert!(draft("Ducha", "9999999999.99", 1).validate().is_ok());
        assert!(draft("Ducha", "10.50", 1).validate().is_ok());
        assert!(draft("Ducha", "10.500", 1).validate().is_ok());
    }

    #[test]
    fn zero_price_and_stock_are_allowed() {
        assert!(draft("Muestra", "0", 0).validate().is_ok());
    }
}
