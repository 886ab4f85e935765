use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::item::{percentage, LineItem};
use crate::money::{amount_or_zero, round_half_up};
use crate::order::{DiscountType, OrderOptions};

/// Monetary breakdown of an order. Always recomputed from scratch; it
/// holds no reference back to the items it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub item_count: usize,
    /// Sum of line selling totals.
    pub subtotal: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub discount_applied: Decimal,
    pub delivery_charge_applied: Decimal,
    /// `subtotal + delivery - discount`, before rounding.
    pub grand_total: Decimal,
    /// Amount payable.
    pub final_total: Decimal,
    /// `final_total - grand_total`; zero when rounding is off.
    pub round_off_delta: Decimal,
    /// Order profit as a percentage of subtotal. `None` for an empty
    /// order or a zero subtotal.
    pub overall_margin: Option<Decimal>,
}

impl Bill {
    /// Derive the bill for `items` under `options`.
    ///
    /// Discounts and delivery charges are not clamped: a discount
    /// larger than the subtotal yields a negative total.
    pub fn compute(items: &[LineItem], options: &OrderOptions) -> Bill {
        let subtotal = sum(items.iter().map(|i| i.total_selling));
        let total_cost = sum(items.iter().map(|i| i.total_cost));
        let total_profit = sum(items.iter().map(|i| i.profit));

        let discount_amount = amount_or_zero(&options.discount_amount);
        let discount_applied = match options.discount_type {
            DiscountType::Percentage => percent_of(subtotal, discount_amount),
            DiscountType::Fixed => discount_amount,
        };

        let delivery_charge_applied = if options.delivery_required {
            amount_or_zero(&options.delivery_charge)
        } else {
            Decimal::ZERO
        };

        let grand_total = subtotal
            .saturating_add(delivery_charge_applied)
            .saturating_sub(discount_applied);
        let final_total = if options.round_off {
            round_half_up(grand_total)
        } else {
            grand_total
        };

        let overall_margin = if !items.is_empty() && subtotal > Decimal::ZERO {
            Some(percentage(total_profit, subtotal))
        } else {
            None
        };

        Bill {
            item_count: items.len(),
            subtotal,
            total_cost,
            total_profit,
            discount_applied,
            delivery_charge_applied,
            grand_total,
            final_total,
            round_off_delta: final_total.saturating_sub(grand_total),
            overall_margin,
        }
    }

    pub fn has_items(&self) -> bool {
        self.item_count > 0
    }
}

fn sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `percent` percent of `value`.
fn percent_of(value: Decimal, percent: Decimal) -> Decimal {
    value
        .saturating_mul(percent)
        .checked_div(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}
