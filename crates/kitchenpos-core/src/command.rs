//! # Command Module
//!
//! Inbound command payloads, as the transport receives them.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  JSON body ──► parse::<CreateMenuRequest>() ──► into_draft()            │
//! │                     │                               │                   │
//! │                     ▼                               ▼                   │
//! │          Malformed payload              blank name, missing or          │
//! │          (InvalidValue)                 negative price, bad quantity    │
//! │                                         (InvalidValue)                  │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                      MenuDraft ──► Store unit of work   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names are camelCase on the wire (`menuGroupId`, `orderTableIds`, ...).
//! Nothing in this module touches the Store; rules that need stored entities
//! run later in [`crate::menu`], [`crate::table`] and [`crate::order`].

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::menu::MenuDraft;
use crate::order::OrderDraft;
use crate::price::Price;
use crate::table::validate_number_of_guests;
use crate::types::{MenuProduct, OrderLineItem, OrderStatus};
use crate::validation::{validate_id, validate_name, validate_not_empty, validate_quantity};

/// Parses a JSON payload into a command.
///
/// ## Example
/// ```rust
/// use kitchenpos_core::command::{parse, CreateProductRequest};
///
/// let cmd: CreateProductRequest = parse(r#"{"name":"후라이드","price":16000}"#).unwrap();
/// let draft = cmd.into_draft().unwrap();
/// assert_eq!(draft.name, "후라이드");
///
/// assert!(parse::<CreateProductRequest>("{").is_err());
/// ```
pub fn parse<T: DeserializeOwned>(payload: &str) -> CoreResult<T> {
    serde_json::from_str(payload).map_err(|e| {
        ValidationError::Malformed {
            reason: e.to_string(),
        }
        .into()
    })
}

// =============================================================================
// Catalog Commands
// =============================================================================

/// Validated product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    /// Absent prices are rejected, not defaulted.
    #[ts(as = "Option<String>")]
    pub price: Option<Decimal>,
}

impl CreateProductRequest {
    pub fn into_draft(self) -> CoreResult<ProductDraft> {
        Ok(ProductDraft {
            name: validate_name("name", &self.name)?,
            price: Price::from_optional(self.price)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuGroupRequest {
    pub name: String,
}

impl CreateMenuGroupRequest {
    /// Returns the trimmed group name.
    pub fn into_draft(self) -> CoreResult<String> {
        Ok(validate_name("name", &self.name)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuProductRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuRequest {
    pub name: String,
    #[ts(as = "Option<String>")]
    pub price: Option<Decimal>,
    pub menu_group_id: String,
    #[serde(default)]
    pub menu_products: Vec<MenuProductRequest>,
}

impl CreateMenuRequest {
    /// Checks the payload shape. Catalog lookups happen in the Store.
    pub fn into_draft(self) -> CoreResult<MenuDraft> {
        let name = validate_name("name", &self.name)?;
        let price = Price::from_optional(self.price)?;
        validate_id("menuGroupId", &self.menu_group_id)?;
        validate_not_empty("menuProducts", &self.menu_products)?;

        let mut menu_products = Vec::with_capacity(self.menu_products.len());
        for line in self.menu_products {
            validate_id("productId", &line.product_id)?;
            validate_quantity("quantity", line.quantity)?;
            menu_products.push(MenuProduct {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }

        Ok(MenuDraft {
            name,
            price,
            menu_group_id: self.menu_group_id,
            menu_products,
        })
    }
}

// =============================================================================
// Table Commands
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderTableRequest {
    #[serde(default)]
    pub number_of_guests: i32,
    #[serde(default)]
    pub empty: bool,
}

impl CreateOrderTableRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_number_of_guests(self.number_of_guests)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmptyRequest {
    pub empty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNumberOfGuestsRequest {
    pub number_of_guests: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableGroupRequest {
    #[serde(default)]
    pub order_table_ids: Vec<String>,
}

// =============================================================================
// Order Commands
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemRequest {
    pub menu_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_table_id: String,
    #[serde(default)]
    pub order_line_items: Vec<OrderLineItemRequest>,
}

impl CreateOrderRequest {
    /// Checks ids and quantities.
    ///
    /// An empty line-item list passes here; it is reported as
    /// `EmptyLineItems` once the table has been checked.
    pub fn into_draft(self) -> CoreResult<OrderDraft> {
        validate_id("orderTableId", &self.order_table_id)?;

        let mut order_line_items = Vec::with_capacity(self.order_line_items.len());
        for item in self.order_line_items {
            validate_id("menuId", &item.menu_id)?;
            validate_quantity("quantity", item.quantity)?;
            order_line_items.push(OrderLineItem {
                menu_id: item.menu_id,
                quantity: item.quantity,
            });
        }

        Ok(OrderDraft {
            order_table_id: self.order_table_id,
            order_line_items,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOrderStatusRequest {
    pub order_status: OrderStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_product_without_price_is_invalid() {
        let cmd: CreateProductRequest = parse(r#"{"name":"후라이드"}"#).unwrap();
        assert!(matches!(
            cmd.into_draft(),
            Err(CoreError::InvalidValue(ValidationError::Required { .. }))
        ));

        let cmd: CreateProductRequest = parse(r#"{"name":"후라이드","price":-1}"#).unwrap();
        assert!(matches!(
            cmd.into_draft(),
            Err(CoreError::InvalidValue(ValidationError::Negative { .. }))
        ));
    }

    #[test]
    fn test_menu_request_uses_camel_case() {
        let cmd: CreateMenuRequest = parse(
            r#"{
                "name": "후라이드+후라이드",
                "price": 19000,
                "menuGroupId": "g-1",
                "menuProducts": [{"productId": "p-1", "quantity": 2}]
            }"#,
        )
        .unwrap();
        let draft = cmd.into_draft().unwrap();
        assert_eq!(draft.menu_group_id, "g-1");
        assert_eq!(draft.menu_products[0].quantity, 2);
        assert_eq!(draft.price.value(), Decimal::from(19000));
    }

    #[test]
    fn test_menu_request_rejects_bad_lines() {
        let base = |lines: Vec<MenuProductRequest>| CreateMenuRequest {
            name: "메뉴".to_string(),
            price: Some(Decimal::from(1000)),
            menu_group_id: "g-1".to_string(),
            menu_products: lines,
        };

        assert!(base(vec![]).into_draft().is_err());
        assert!(base(vec![MenuProductRequest {
            product_id: "p-1".to_string(),
            quantity: 0,
        }])
        .into_draft()
        .is_err());
        assert!(base(vec![MenuProductRequest {
            product_id: "p-1".to_string(),
            quantity: 1000,
        }])
        .into_draft()
        .is_err());
    }

    #[test]
    fn test_order_request_allows_empty_items_until_table_check() {
        let cmd: CreateOrderRequest = parse(r#"{"orderTableId":"t-1"}"#).unwrap();
        let draft = cmd.into_draft().unwrap();
        assert!(draft.order_line_items.is_empty());
    }

    #[test]
    fn test_order_table_request_rejects_negative_guests() {
        let cmd: CreateOrderTableRequest = parse(r#"{"numberOfGuests":-1,"empty":true}"#).unwrap();
        assert!(matches!(
            cmd.validate(),
            Err(CoreError::InvalidGuestCount { requested: -1 })
        ));
    }

    #[test]
    fn test_status_request_parses_uppercase() {
        let cmd: ChangeOrderStatusRequest = parse(r#"{"orderStatus":"MEAL"}"#).unwrap();
        assert_eq!(cmd.order_status, OrderStatus::Meal);

        let bad = parse::<ChangeOrderStatusRequest>(r#"{"orderStatus":"EATING"}"#);
        assert!(matches!(
            bad,
            Err(CoreError::InvalidValue(ValidationError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_table_group_request_parses_ids() {
        let cmd: CreateTableGroupRequest = parse(r#"{"orderTableIds":["t-1","t-2"]}"#).unwrap();
        assert_eq!(cmd.order_table_ids.len(), 2);
    }
}
