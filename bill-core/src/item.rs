use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{parse_amount, parse_quantity};

/// Creation-order identifier of a line item within one draft.
///
/// Ids come from a counter that only moves forward, so an id is never
/// handed out twice even after the item it named was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineItemId(pub u64);

impl std::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ordered product line. Figures are derived once at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub name: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub quantity: u32,
    pub total_cost: Decimal,
    pub total_selling: Decimal,
    pub profit: Decimal,
    /// Profit as a percentage of selling price; 0 when cost is 0.
    pub margin: Decimal,
}

impl LineItem {
    pub fn new(
        id: LineItemId,
        name: impl Into<String>,
        cost_price: Decimal,
        selling_price: Decimal,
        quantity: u32,
    ) -> Self {
        let qty = Decimal::from(quantity);
        LineItem {
            id,
            name: name.into(),
            cost_price,
            selling_price,
            quantity,
            total_cost: cost_price.saturating_mul(qty),
            total_selling: selling_price.saturating_mul(qty),
            profit: selling_price.saturating_sub(cost_price).saturating_mul(qty),
            margin: unit_margin(cost_price, selling_price),
        }
    }
}

/// Margin relative to selling price. Defined as 0 when no cost was
/// entered, not 100%.
pub fn unit_margin(cost_price: Decimal, selling_price: Decimal) -> Decimal {
    if cost_price > Decimal::ZERO {
        percentage(selling_price.saturating_sub(cost_price), selling_price)
    } else {
        Decimal::ZERO
    }
}

/// `part / whole * 100`, or 0 when the ratio is not representable.
pub(crate) fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Raw text of the "add item" form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub name: String,
    pub cost_price: String,
    pub selling_price: String,
    pub quantity: String,
}

impl Default for ItemEntry {
    fn default() -> Self {
        ItemEntry {
            name: String::new(),
            cost_price: String::new(),
            selling_price: String::new(),
            quantity: "1".to_string(),
        }
    }
}

/// Why an entry could not become a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRejection {
    MissingName,
    InvalidSellingPrice,
    InvalidQuantity,
}

impl std::fmt::Display for EntryRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            EntryRejection::MissingName => "item name is blank",
            EntryRejection::InvalidSellingPrice => "selling price is not a positive number",
            EntryRejection::InvalidQuantity => "quantity is not a positive integer",
        };
        f.write_str(reason)
    }
}

/// Per-unit figures shown while the entry is being typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPreview {
    pub profit_per_unit: Decimal,
    pub margin: Decimal,
}

/// Parsed, validated values of an entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidEntry {
    pub name: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub quantity: u32,
}

impl ItemEntry {
    /// Validate the entry. Cost price falls back to 0 when absent or
    /// unparseable; the other fields are required.
    pub(crate) fn validate(&self) -> Result<ValidEntry, EntryRejection> {
        if self.name.trim().is_empty() {
            return Err(EntryRejection::MissingName);
        }
        let selling_price = parse_amount(&self.selling_price)
            .filter(|v| *v > Decimal::ZERO)
            .ok_or(EntryRejection::InvalidSellingPrice)?;
        let quantity = parse_quantity(&self.quantity)
            .filter(|q| *q > 0)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or(EntryRejection::InvalidQuantity)?;
        let cost_price = parse_amount(&self.cost_price).unwrap_or(Decimal::ZERO);

        Ok(ValidEntry {
            name: self.name.clone(),
            cost_price,
            selling_price,
            quantity,
        })
    }

    /// Live per-unit profit and margin, available once both prices parse.
    ///
    /// Unlike the stored line-item margin this is the plain
    /// `(selling - cost) / selling` ratio, so a zero cost previews as 100%.
    pub fn preview(&self) -> Option<UnitPreview> {
        let cost = parse_amount(&self.cost_price)?;
        let selling = parse_amount(&self.selling_price)?;
        if selling.is_zero() {
            return None;
        }
        let profit_per_unit = selling.saturating_sub(cost);
        Some(UnitPreview {
            profit_per_unit,
            margin: percentage(profit_per_unit, selling),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    fn entry(name: &str, cost: &str, selling: &str, qty: &str) -> ItemEntry {
        ItemEntry {
            name: name.to_string(),
            cost_price: cost.to_string(),
            selling_price: selling.to_string(),
            quantity: qty.to_string(),
        }
    }

    #[test]
    fn derives_totals_at_creation() {
        let item = LineItem::new(LineItemId(1), "Cupcake", d("20"), d("50"), 4);
        assert_eq!(item.total_cost, d("80"));
        assert_eq!(item.total_selling, d("200"));
        assert_eq!(item.profit, d("120"));
        assert_eq!(item.margin, d("60"));
    }

    #[test]
    fn zero_cost_means_zero_margin() {
        let item = LineItem::new(LineItemId(1), "Cookie", Decimal::ZERO, d("30"), 2);
        assert_eq!(item.margin, Decimal::ZERO);
        assert_eq!(item.profit, d("60"));
    }

    #[test]
    fn validate_defaults_cost_to_zero() {
        let valid = entry("Brownie", "", "40", "3").validate().unwrap();
        assert_eq!(valid.cost_price, Decimal::ZERO);
        let valid = entry("Brownie", "abc", "40", "3").validate().unwrap();
        assert_eq!(valid.cost_price, Decimal::ZERO);
    }

    #[test]
    fn validate_rejects_missing_fields() {
        assert_eq!(
            entry("  ", "10", "40", "1").validate(),
            Err(EntryRejection::MissingName)
        );
        assert_eq!(
            entry("Tart", "10", "", "1").validate(),
            Err(EntryRejection::InvalidSellingPrice)
        );
        assert_eq!(
            entry("Tart", "10", "free", "1").validate(),
            Err(EntryRejection::InvalidSellingPrice)
        );
        assert_eq!(
            entry("Tart", "10", "40", "0").validate(),
            Err(EntryRejection::InvalidQuantity)
        );
        assert_eq!(
            entry("Tart", "10", "40", "").validate(),
            Err(EntryRejection::InvalidQuantity)
        );
    }

    #[test]
    fn preview_needs_both_prices() {
        assert_eq!(entry("Tart", "", "40", "1").preview(), None);
        let p = entry("Tart", "10", "40", "1").preview().unwrap();
        assert_eq!(p.profit_per_unit, d("30"));
        assert_eq!(p.margin, d("75"));
    }
}
