pub mod models;
pub mod parsing;

pub use models::{Amount, PaymentStatus};

/// Shown when handing the intent to the platform's UPI handler fails.
pub const DIRECT_PAYMENT_FAILED: &str = "Failed to open UPI app. Please try QR code payment.";

/// Shown when the QR encoder rejects the intent.
pub const QR_GENERATION_FAILED: &str = "Failed to generate QR code";

/// Name of the page query parameter that carries a shared intent.
pub const INBOUND_INTENT_PARAM: &str = "s";

/// Name of the intent query parameter holding the payment amount.
pub const AMOUNT_PARAM: &str = "am";
