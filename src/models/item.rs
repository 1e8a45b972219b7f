use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::NewItem;

/// A persisted item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating an item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ItemPayload {
    pub name: String,
    pub price: f64,
}

impl ItemPayload {
    /// Check the field values and turn them into store input.
    pub fn validate(self) -> Result<NewItem, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Field 'name' must not be empty".to_string());
        }
        if !self.price.is_finite() {
            return Err("Field 'price' must be a finite number".to_string());
        }
        if self.price < 0.0 {
            return Err("Field 'price' must not be negative".to_string());
        }
        Ok(NewItem {
            name: name.to_string(),
            price: self.price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_name() {
        let item = ItemPayload { name: "  Widget ".into(), price: 9.99 }.validate().unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.price, 9.99);
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_price() {
        assert!(ItemPayload { name: "   ".into(), price: 1.0 }.validate().is_err());
        assert!(ItemPayload { name: "a".into(), price: -0.5 }.validate().is_err());
        assert!(ItemPayload { name: "a".into(), price: f64::NAN }.validate().is_err());
        assert!(ItemPayload { name: "a".into(), price: 0.0 }.validate().is_ok());
    }

    #[test]
    fn payload_rejects_server_managed_fields() {
        let err = serde_json::from_str::<ItemPayload>(r#"{"id":4,"name":"a","price":1}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `id`"));
        assert!(serde_json::from_str::<ItemPayload>(r#"{"name":"a"}"#).is_err());
    }

    #[test]
    fn item_serializes_with_snake_case_timestamps() {
        let now = Utc::now();
        let item = Item { id: 1, name: "Widget".into(), price: 9.99, created_at: now, updated_at: now };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["price"], 9.99);
        assert!(value["created_at"].is_string());
        assert!(value["updated_at"].is_string());
    }
}
