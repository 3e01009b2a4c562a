//! # Menu Module
//!
//! The menu creation rule.
//!
//! ## Composition Price
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Menu "후라이드+양념치킨" at 32000                                      │
//! │                                                                         │
//! │    후라이드   16000 × 1 = 16000                                         │
//! │    양념치킨   16000 × 1 = 16000                                         │
//! │                         ───────                                         │
//! │    composition          32000   >= 32000  ✅ accepted                   │
//! │                                                                         │
//! │  The same menu at 33000 is rejected with PriceExceedsComposition.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rule runs once, at creation. Later product price changes do not
//! invalidate existing menus.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::price::Price;
use crate::types::{Menu, MenuGroup, MenuProduct, Product};
use crate::validation::validate_quantity;

/// A validated-but-not-persisted menu.
///
/// Produced by [`crate::command::CreateMenuRequest::into_draft`]; the name,
/// price and quantities are already well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuDraft {
    pub name: String,
    pub price: Price,
    pub menu_group_id: String,
    pub menu_products: Vec<MenuProduct>,
}

/// Sums `product.price × quantity` over the menu's product lines.
///
/// Fails with `InvalidReference` when a product id is missing from
/// `products`, and with `InvalidValue` for a quantity below 1.
pub fn composition_price(
    menu_products: &[MenuProduct],
    products: &[Product],
) -> CoreResult<Price> {
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut total = Price::ZERO;
    for line in menu_products {
        let product = by_id
            .get(line.product_id.as_str())
            .ok_or_else(|| CoreError::invalid_reference("Product", &line.product_id))?;
        validate_quantity("quantity", line.quantity)?;
        total = total.add(product.price.multiply(line.quantity.unsigned_abs())?)?;
    }
    Ok(total)
}

/// Checks a menu draft against the loaded catalog.
///
/// ## Order of Checks
/// 1. `menu_group` must be present (`InvalidReference`)
/// 2. Every product id must resolve (`InvalidReference`)
/// 3. `price <= composition` (`PriceExceedsComposition`)
///
/// `menu_group` is the result of looking up `draft.menu_group_id`;
/// `products` is whatever the Store found for the draft's product ids.
pub fn validate_menu(
    draft: &MenuDraft,
    menu_group: Option<&MenuGroup>,
    products: &[Product],
) -> CoreResult<Price> {
    match menu_group {
        Some(group) if group.id == draft.menu_group_id => {}
        _ => return Err(CoreError::invalid_reference("MenuGroup", &draft.menu_group_id)),
    }

    let composition = composition_price(&draft.menu_products, products)?;

    if draft.price.greater_than(&composition) {
        return Err(CoreError::PriceExceedsComposition {
            price: draft.price,
            composition,
        });
    }

    Ok(composition)
}

impl MenuDraft {
    /// Validates the draft and assembles the menu under the given id.
    ///
    /// Nothing is returned unless every check passed.
    pub fn assemble(
        self,
        id: String,
        menu_group: Option<&MenuGroup>,
        products: &[Product],
    ) -> CoreResult<Menu> {
        validate_menu(&self, menu_group, products)?;
        Ok(Menu {
            id,
            name: self.name,
            price: self.price,
            menu_group_id: self.menu_group_id,
            menu_products: self.menu_products,
        })
    }

    /// Distinct product ids referenced by the draft, in first-seen order.
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.menu_products.len());
        for line in &self.menu_products {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id.clone());
            }
        }
        ids
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use rust_decimal::Decimal;

    fn price(v: i64) -> Price {
        Price::new(Decimal::from(v)).unwrap()
    }

    fn product(id: &str, name: &str, p: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price: price(p),
        }
    }

    fn group() -> MenuGroup {
        MenuGroup {
            id: "g-1".to_string(),
            name: "두마리메뉴".to_string(),
        }
    }

    fn draft(p: i64, lines: &[(&str, i64)]) -> MenuDraft {
        MenuDraft {
            name: "후라이드+후라이드".to_string(),
            price: price(p),
            menu_group_id: "g-1".to_string(),
            menu_products: lines
                .iter()
                .map(|(id, q)| MenuProduct {
                    product_id: id.to_string(),
                    quantity: *q,
                })
                .collect(),
        }
    }

    #[test]
    fn test_price_above_composition_is_rejected() {
        let products = vec![product("p-1", "후라이드", 16000)];
        let err = validate_menu(&draft(33000, &[("p-1", 2)]), Some(&group()), &products).unwrap_err();
        match err {
            CoreError::PriceExceedsComposition { price: p, composition } => {
                assert_eq!(p, price(33000));
                assert_eq!(composition, price(32000));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_price_equal_or_below_composition_is_accepted() {
        let products = vec![product("p-1", "후라이드", 16000)];
        assert!(validate_menu(&draft(32000, &[("p-1", 2)]), Some(&group()), &products).is_ok());
        assert!(validate_menu(&draft(30000, &[("p-1", 2)]), Some(&group()), &products).is_ok());
        assert!(validate_menu(&draft(0, &[("p-1", 1)]), Some(&group()), &products).is_ok());
    }

    #[test]
    fn test_composition_over_mixed_products() {
        let products = vec![
            product("p-1", "후라이드", 16000),
            product("p-2", "간장치킨", 17000),
        ];
        let composition =
            composition_price(&draft(0, &[("p-1", 1), ("p-2", 2)]).menu_products, &products).unwrap();
        assert_eq!(composition, price(50000));
    }

    #[test]
    fn test_composition_rejects_non_positive_quantity() {
        let products = vec![product("p-1", "후라이드", 16000)];
        for quantity in [-3, 0] {
            let err = composition_price(&draft(0, &[("p-1", quantity)]).menu_products, &products)
                .unwrap_err();
            assert!(matches!(
                err,
                CoreError::InvalidValue(ValidationError::BelowMinimum { value, .. }) if value == quantity
            ));
        }
    }

    #[test]
    fn test_composition_has_no_quantity_ceiling() {
        let products = vec![product("p-1", "후라이드", 16000)];
        let composition =
            composition_price(&draft(0, &[("p-1", 1000)]).menu_products, &products).unwrap();
        assert_eq!(composition, price(16_000_000));
        assert!(validate_menu(&draft(16000, &[("p-1", 1000)]), Some(&group()), &products).is_ok());
    }

    #[test]
    fn test_missing_menu_group_is_invalid_reference() {
        let products = vec![product("p-1", "후라이드", 16000)];
        let err = validate_menu(&draft(16000, &[("p-1", 1)]), None, &products).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReference { entity: "MenuGroup", .. }
        ));
    }

    #[test]
    fn test_missing_product_is_invalid_reference() {
        let products = vec![product("p-1", "후라이드", 16000)];
        let err = validate_menu(
            &draft(16000, &[("p-1", 1), ("p-404", 1)]),
            Some(&group()),
            &products,
        )
        .unwrap_err();
        match err {
            CoreError::InvalidReference { entity, id } => {
                assert_eq!(entity, "Product");
                assert_eq!(id, "p-404");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_assemble_keeps_product_order() {
        let products = vec![
            product("p-1", "후라이드", 16000),
            product("p-2", "양념치킨", 16000),
        ];
        let menu = draft(30000, &[("p-2", 1), ("p-1", 1)])
            .assemble("m-1".to_string(), Some(&group()), &products)
            .unwrap();
        assert_eq!(menu.id, "m-1");
        assert_eq!(menu.menu_products[0].product_id, "p-2");
        assert_eq!(menu.menu_products[1].product_id, "p-1");
    }

    #[test]
    fn test_product_ids_are_distinct() {
        let d = draft(0, &[("p-1", 1), ("p-2", 1), ("p-1", 3)]);
        assert_eq!(d.product_ids(), vec!["p-1".to_string(), "p-2".to_string()]);
    }
}
