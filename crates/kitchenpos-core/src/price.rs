//! # Price Module
//!
//! Provides the `Price` type: a non-negative, exact decimal amount.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE COMPARISON PROBLEM                                                 │
//! │                                                                         │
//! │  A menu is only valid when                                              │
//! │      menu.price <= Σ (product.price × quantity)                         │
//! │                                                                         │
//! │  With floating point the sum can land a hair above or below the         │
//! │  exact value and flip the comparison. With Decimal it cannot.           │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    16000 × 2 = 32000, exactly, every time                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kitchenpos_core::price::Price;
//! use rust_decimal::Decimal;
//!
//! let fried = Price::new(Decimal::from(16000)).unwrap();
//! let seasoned = Price::new(Decimal::from(17000)).unwrap();
//!
//! let total = Price::sum([fried.multiply(1).unwrap(), seasoned]).unwrap();
//! assert_eq!(total.value(), Decimal::from(33000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Price Type
// =============================================================================

/// A monetary amount that is never negative.
///
/// ## Invariants
/// - value >= 0, checked at every construction (including deserialization)
/// - Arithmetic never wraps; overflow is an error
///
/// ## Where Price is Used
/// ```text
/// Product.price ──► × MenuProduct.quantity ──► Σ composition price
///                                                   │
/// Menu.price ─────────────── compared against ◄─────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Creates a price, rejecting negative values.
    ///
    /// ## Example
    /// ```rust
    /// use kitchenpos_core::price::Price;
    /// use rust_decimal::Decimal;
    ///
    /// assert!(Price::new(Decimal::ZERO).is_ok());
    /// assert!(Price::new(Decimal::from(16000)).is_ok());
    /// assert!(Price::new(Decimal::from(-1)).is_err());
    /// ```
    pub fn new(value: Decimal) -> CoreResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::Negative {
                field: "price".to_string(),
                value: value.to_string(),
            }
            .into());
        }
        // -0 normalizes to 0
        Ok(Price(value.abs()))
    }

    /// Creates a price from an optional payload field.
    ///
    /// A missing price is as invalid as a negative one.
    pub fn from_optional(value: Option<Decimal>) -> CoreResult<Self> {
        match value {
            Some(v) => Price::new(v),
            None => Err(ValidationError::Required {
                field: "price".to_string(),
            }
            .into()),
        }
    }

    /// Returns the underlying decimal value.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Checks if the price is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Adds two prices. The sum goes back through [`Price::new`].
    pub fn add(self, other: Price) -> CoreResult<Price> {
        let sum = self.0.checked_add(other.0).ok_or_else(overflow)?;
        Price::new(sum)
    }

    /// Multiplies a price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kitchenpos_core::price::Price;
    /// use rust_decimal::Decimal;
    ///
    /// let fried = Price::new(Decimal::from(16000)).unwrap();
    /// assert_eq!(fried.multiply(2).unwrap().value(), Decimal::from(32000));
    /// ```
    pub fn multiply(self, quantity: u64) -> CoreResult<Price> {
        let product = self.0.checked_mul(Decimal::from(quantity)).ok_or_else(overflow)?;
        Price::new(product)
    }

    /// True when `self > other`.
    #[inline]
    pub fn greater_than(&self, other: &Price) -> bool {
        self.0 > other.0
    }

    /// Sums a sequence of prices. An empty sequence sums to zero.
    pub fn sum<I>(prices: I) -> CoreResult<Price>
    where
        I: IntoIterator<Item = Price>,
    {
        prices
            .into_iter()
            .try_fold(Price::ZERO, |acc, price| acc.add(price))
    }
}

fn overflow() -> CoreError {
    ValidationError::Overflow {
        field: "price".to_string(),
    }
    .into()
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::ZERO
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
