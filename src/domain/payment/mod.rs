//! Payment module - purchase attempts and their reconciliation state.
//!
//! A payment starts `pending` with a draft gateway intent, collects the
//! processor's product, price and checkout session ids, and is settled
//! exactly once to `succeeded` or `failed`.

mod aggregate;
mod errors;
mod external_status;
mod intent;
mod method;
mod status;

pub use aggregate::{Payment, PaymentTarget};
pub use errors::{GatewayStep, PaymentError};
pub use external_status::ExternalPaymentStatus;
pub use intent::GatewayIntent;
pub use method::PaymentMethod;
pub use status::PaymentStatus;
