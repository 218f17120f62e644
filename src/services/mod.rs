pub mod cart;
pub mod checkout;
pub mod payments;
/// Storefront services module - cart, pricing, and checkout business logic
pub mod pricing;

// Re-export services for convenience
pub use cart::{CartService, DuplicatePolicy};
pub use checkout::{CheckoutOutcome, CheckoutService};
pub use payments::{PaymentPhase, PaymentWatcher, PollHandle};
pub use pricing::{quote, PriceBreakdown};
