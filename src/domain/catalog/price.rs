//! Course pricing value objects.
//!
//! Prices are decimal major units (e.g. `500.00` roubles). Conversion to
//! integer minor units happens only at the payment processor boundary via
//! [`Price::to_minor_units`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Upper bound imposed by the `NUMERIC(10,2)` storage column.
const MAX_EXCLUSIVE: i64 = 100_000_000;

/// Decimal places stored for a price.
const SCALE: u32 = 2;

/// Strictly positive amount in major currency units with at most two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::not_positive("price"));
        }
        if amount.normalize().scale() > SCALE {
            return Err(ValidationError::invalid_format(
                "price",
                "at most 2 decimal places are allowed",
            ));
        }
        if amount >= Decimal::from(MAX_EXCLUSIVE) {
            return Err(ValidationError::invalid_format(
                "price",
                "must be below 100000000",
            ));
        }
        Ok(Self(amount))
    }

    /// Returns the amount in major units.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the amount in minor units (major × 100).
    pub fn to_minor_units(&self) -> i64 {
        let mut scaled = self.0;
        scaled.rescale(SCALE);
        // bounded by MAX_EXCLUSIVE * 100, well inside i64
        scaled.mantissa() as i64
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a course is free or sold at a price.
///
/// A paid course always has a price and a free one never does, so the
/// `(is_paid, price)` pair cannot drift out of agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "price", rename_all = "snake_case")]
pub enum CoursePricing {
    Free,
    Paid(Price),
}

impl CoursePricing {
    /// Builds pricing from the stored flag and nullable price.
    pub fn from_parts(is_paid: bool, price: Option<Decimal>) -> Result<Self, ValidationError> {
        match (is_paid, price) {
            (false, None) => Ok(CoursePricing::Free),
            (false, Some(_)) => Err(ValidationError::invalid_format(
                "price",
                "a free course cannot have a price",
            )),
            (true, None) => Err(ValidationError::empty_field("price")),
            (true, Some(amount)) => Ok(CoursePricing::Paid(Price::new(amount)?)),
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, CoursePricing::Paid(_))
    }

    pub fn price(&self) -> Option<&Price> {
        match self {
            CoursePricing::Free => None,
            CoursePricing::Paid(price) => Some(price),
        }
    }
}
