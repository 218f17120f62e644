//! Pure pricing computation over a cart snapshot.
//!
//! Amounts are `Decimal` end-to-end; only the final order total is rounded
//! (two decimal places, midpoint away from zero) so repeated renders never
//! compound rounding error. These figures are presentational: the backend
//! recomputes the binding price from the submitted product ids.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::CartItem;

/// Flat delivery charge applied to every order.
pub const DELIVERY_CHARGE: Decimal = dec!(1000);
/// GST applied on the item subtotal (17%).
pub const TAX_RATE: Decimal = dec!(0.17);
/// Marketplace platform fee on the item subtotal (0.3%).
pub const PLATFORM_RATE: Decimal = dec!(0.003);

/// Itemized pricing for the current cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub delivery_charge: Decimal,
    pub tax: Decimal,
    pub platform_fee: Decimal,
    /// Grand total, rounded to 2 decimal places for display.
    pub order_total: Decimal,
}

/// Computes the pricing breakdown for a cart snapshot.
///
/// An empty cart yields a subtotal of zero and an order total of exactly
/// the delivery charge; checkout with an empty cart is a UI-level concern.
pub fn quote(items: &[CartItem]) -> PriceBreakdown {
    let subtotal: Decimal = items.iter().map(|item| item.unit_price).sum();
    let tax = subtotal * TAX_RATE;
    let platform_fee = subtotal * PLATFORM_RATE;
    let order_total = (subtotal + DELIVERY_CHARGE + tax + platform_fee)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    PriceBreakdown {
        subtotal,
        delivery_charge: DELIVERY_CHARGE,
        tax,
        platform_fee,
        order_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn item(id: &str, price: Decimal) -> CartItem {
        CartItem::new(id, format!("Phone {}", id), price, "")
    }

    #[test]
    fn test_empty_cart_total_is_delivery_charge() {
        let breakdown = quote(&[]);
        assert_eq!(breakdown.subtotal, Decimal::ZERO);
        assert_eq!(breakdown.tax, Decimal::ZERO);
        assert_eq!(breakdown.platform_fee, Decimal::ZERO);
        assert_eq!(breakdown.order_total, dec!(1000.00));
    }

    #[test]
    fn test_reference_breakdown() {
        // Prices 1000 + 2500: subtotal 3500, 17% tax 595.00,
        // 0.3% platform fee 10.50, total 5105.50.
        let breakdown = quote(&[item("p-1", dec!(1000)), item("p-2", dec!(2500))]);
        assert_eq!(breakdown.subtotal, dec!(3500));
        assert_eq!(breakdown.tax, dec!(595.00));
        assert_eq!(breakdown.platform_fee, dec!(10.50));
        assert_eq!(breakdown.order_total, dec!(5105.50));
    }

    #[rstest]
    #[case(vec![dec!(100)], dec!(1117.30))]
    #[case(vec![dec!(45000)], dec!(53785.00))]
    #[case(vec![dec!(19.99), dec!(0.01)], dec!(1023.46))]
    fn test_total_cases(#[case] prices: Vec<Decimal>, #[case] expected_total: Decimal) {
        let items: Vec<CartItem> = prices
            .iter()
            .enumerate()
            .map(|(i, p)| item(&format!("p-{}", i), *p))
            .collect();
        assert_eq!(quote(&items).order_total, expected_total);
    }

    #[test]
    fn test_breakdown_components_sum_to_total_before_rounding() {
        let items = vec![item("p-1", dec!(333.33)), item("p-2", dec!(666.67))];
        let b = quote(&items);
        let raw = b.subtotal + b.delivery_charge + b.tax + b.platform_fee;
        assert_eq!(
            b.order_total,
            raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        );
    }

    #[test]
    fn test_quote_is_stateless_across_calls() {
        let items = vec![item("p-1", dec!(1500))];
        assert_eq!(quote(&items), quote(&items));
    }
}
