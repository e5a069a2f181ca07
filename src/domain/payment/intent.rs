//! Progress of a payment through the processor's checkout setup.
//!
//! Starting a purchase takes three processor calls (product, price,
//! checkout session). Each successful call advances the intent one stage
//! and is persisted immediately, so a failure part-way through leaves the
//! identifiers obtained so far on record for an operator.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum GatewayIntent {
    /// No processor call has succeeded yet.
    Draft,

    ProductCreated {
        product_id: String,
    },

    PriceCreated {
        product_id: String,
        price_id: String,
    },

    /// Checkout session exists; the user can be redirected.
    Linked {
        product_id: String,
        price_id: String,
        session_id: String,
        session_url: String,
    },
}

impl GatewayIntent {
    pub fn product_id(&self) -> Option<&str> {
        match self {
            GatewayIntent::Draft => None,
            GatewayIntent::ProductCreated { product_id }
            | GatewayIntent::PriceCreated { product_id, .. }
            | GatewayIntent::Linked { product_id, .. } => Some(product_id),
        }
    }

    pub fn price_id(&self) -> Option<&str> {
        match self {
            GatewayIntent::PriceCreated { price_id, .. } | GatewayIntent::Linked { price_id, .. } => {
                Some(price_id)
            }
            _ => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            GatewayIntent::Linked { session_id, .. } => Some(session_id),
            _ => None,
        }
    }

    pub fn session_url(&self) -> Option<&str> {
        match self {
            GatewayIntent::Linked { session_url, .. } => Some(session_url),
            _ => None,
        }
    }

    pub fn is_linked(&self) -> bool {
        matches!(self, GatewayIntent::Linked { .. })
    }

    pub fn stage(&self) -> &'static str {
        match self {
            GatewayIntent::Draft => "draft",
            GatewayIntent::ProductCreated { .. } => "product_created",
            GatewayIntent::PriceCreated { .. } => "price_created",
            GatewayIntent::Linked { .. } => "linked",
        }
    }

    /// Draft → ProductCreated.
    pub fn with_product(&self, product_id: impl Into<String>) -> Result<Self, ValidationError> {
        match self {
            GatewayIntent::Draft => Ok(GatewayIntent::ProductCreated {
                product_id: non_empty("product_id", product_id.into())?,
            }),
            other => Err(out_of_order("product", other)),
        }
    }

    /// ProductCreated → PriceCreated.
    pub fn with_price(&self, price_id: impl Into<String>) -> Result<Self, ValidationError> {
        match self {
            GatewayIntent::ProductCreated { product_id } => Ok(GatewayIntent::PriceCreated {
                product_id: product_id.clone(),
                price_id: non_empty("price_id", price_id.into())?,
            }),
            other => Err(out_of_order("price", other)),
        }
    }

    /// PriceCreated → Linked.
    pub fn with_session(
        &self,
        session_id: impl Into<String>,
        session_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        match self {
            GatewayIntent::PriceCreated {
                product_id,
                price_id,
            } => Ok(GatewayIntent::Linked {
                product_id: product_id.clone(),
                price_id: price_id.clone(),
                session_id: non_empty("session_id", session_id.into())?,
                session_url: non_empty("session_url", session_url.into())?,
            }),
            other => Err(out_of_order("checkout session", other)),
        }
    }

    /// Rebuilds the intent from four nullable storage columns.
    ///
    /// Only prefixes of (product, price, session + url) are valid.
    pub fn from_columns(
        product_id: Option<String>,
        price_id: Option<String>,
        session_id: Option<String>,
        session_url: Option<String>,
    ) -> Result<Self, ValidationError> {
        match (product_id, price_id, session_id, session_url) {
            (None, None, None, None) => Ok(GatewayIntent::Draft),
            (Some(product_id), None, None, None) => Ok(GatewayIntent::ProductCreated { product_id }),
            (Some(product_id), Some(price_id), None, None) => Ok(GatewayIntent::PriceCreated {
                product_id,
                price_id,
            }),
            (Some(product_id), Some(price_id), Some(session_id), Some(session_url)) => {
                Ok(GatewayIntent::Linked {
                    product_id,
                    price_id,
                    session_id,
                    session_url,
                })
            }
            _ => Err(ValidationError::invalid_format(
                "gateway_intent",
                "correlation identifiers are not a valid prefix",
            )),
        }
    }
}

impl Default for GatewayIntent {
    fn default() -> Self {
        GatewayIntent::Draft
    }
}

fn non_empty(field: &str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::empty_field(field))
    } else {
        Ok(value)
    }
}

fn out_of_order(step: &str, current: &GatewayIntent) -> ValidationError {
    ValidationError::invalid_transition(format!(
        "cannot record {} while intent is {}",
        step,
        current.stage()
    ))
}
