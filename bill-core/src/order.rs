use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bill::Bill;
use crate::item::{ItemEntry, LineItem, LineItemId};

/// Where the customer found the shop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomerSource {
    #[default]
    WalkIn,
    Instagram,
    Whatsapp,
    Referral,
}

impl CustomerSource {
    /// Form value (`"walk-in"`, `"instagram"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerSource::WalkIn => "walk-in",
            CustomerSource::Instagram => "instagram",
            CustomerSource::Whatsapp => "whatsapp",
            CustomerSource::Referral => "referral",
        }
    }

    /// Form value with its first letter upper-cased, as printed on the bill.
    pub fn label(&self) -> String {
        let value = self.as_str();
        let mut chars = value.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for CustomerSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk-in" | "walkin" => Ok(CustomerSource::WalkIn),
            "instagram" => Ok(CustomerSource::Instagram),
            "whatsapp" => Ok(CustomerSource::Whatsapp),
            "referral" => Ok(CustomerSource::Referral),
            other => Err(format!("unknown customer source: {}", other)),
        }
    }
}

/// How the discount amount is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Fixed,
    Percentage,
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(DiscountType::Fixed),
            "percentage" | "percent" | "%" => Ok(DiscountType::Percentage),
            other => Err(format!("unknown discount type: {}", other)),
        }
    }
}

/// Order-level options. Numeric fields keep the raw text that was
/// entered; they are parsed when the bill is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOptions {
    pub customer_name: String,
    pub customer_source: CustomerSource,
    /// Only meaningful when `customer_source` is `Referral`.
    pub referral_text: String,
    pub delivery_required: bool,
    /// Only meaningful when `delivery_required`.
    pub delivery_charge: String,
    /// Only meaningful when `delivery_required`.
    pub delivery_mode: String,
    pub discount_type: DiscountType,
    pub discount_amount: String,
    pub round_off: bool,
}

impl Default for OrderOptions {
    fn default() -> Self {
        OrderOptions {
            customer_name: String::new(),
            customer_source: CustomerSource::WalkIn,
            referral_text: String::new(),
            delivery_required: false,
            delivery_charge: String::new(),
            delivery_mode: String::new(),
            discount_type: DiscountType::Fixed,
            discount_amount: String::new(),
            round_off: true,
        }
    }
}

/// The single order being assembled: line items, the pending item
/// entry, and order options.
///
/// All mutation goes through methods so that cross-field rules (such
/// as clearing the discount amount when its type changes) hold no
/// matter which front end drives the draft.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    items: Vec<LineItem>,
    entry: ItemEntry,
    options: OrderOptions,
    next_id: u64,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn options(&self) -> &OrderOptions {
        &self.options
    }

    pub fn entry(&self) -> &ItemEntry {
        &self.entry
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compute the bill for the current state.
    pub fn bill(&self) -> Bill {
        Bill::compute(&self.items, &self.options)
    }

    // ---------------------------------------------------
    // Item entry
    // ---------------------------------------------------

    pub fn set_item_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry.name = name.into();
        self
    }

    pub fn set_item_cost_price(&mut self, cost: impl Into<String>) -> &mut Self {
        self.entry.cost_price = cost.into();
        self
    }

    pub fn set_item_selling_price(&mut self, selling: impl Into<String>) -> &mut Self {
        self.entry.selling_price = selling.into();
        self
    }

    pub fn set_item_quantity(&mut self, quantity: impl Into<String>) -> &mut Self {
        self.entry.quantity = quantity.into();
        self
    }

    /// Turn the pending entry into a line item.
    ///
    /// Returns the new id, or `None` when the entry is incomplete. A
    /// rejected entry is left as typed; an accepted one is cleared with
    /// quantity back to 1.
    pub fn add_line_item(&mut self) -> Option<LineItemId> {
        let valid = match self.entry.validate() {
            Ok(valid) => valid,
            Err(reason) => {
                debug!(%reason, "ignoring add-item request");
                return None;
            }
        };

        self.next_id += 1;
        let id = LineItemId(self.next_id);
        let item = LineItem::new(
            id,
            valid.name,
            valid.cost_price,
            valid.selling_price,
            valid.quantity,
        );
        debug!(id = id.0, name = %item.name, total = %item.total_selling, "line item added");
        self.items.push(item);
        self.entry = ItemEntry::default();
        Some(id)
    }

    /// Fill the entry from the given text fields and add it.
    pub fn add_item(
        &mut self,
        name: &str,
        cost_price: &str,
        selling_price: &str,
        quantity: &str,
    ) -> Option<LineItemId> {
        self.entry = ItemEntry {
            name: name.to_string(),
            cost_price: cost_price.to_string(),
            selling_price: selling_price.to_string(),
            quantity: quantity.to_string(),
        };
        self.add_line_item()
    }

    /// Remove an item by id. Unknown ids are ignored.
    pub fn remove_line_item(&mut self, id: LineItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if !removed {
            debug!(id = id.0, "remove requested for unknown line item");
        }
        removed
    }

    /// Clear items, the entry, and all options. The id counter keeps
    /// running so ids stay unique for the lifetime of the draft.
    pub fn reset(&mut self) {
        self.items.clear();
        self.entry = ItemEntry::default();
        self.options = OrderOptions::default();
    }

    // ---------------------------------------------------
    // Order options
    // ---------------------------------------------------

    pub fn set_customer_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.options.customer_name = name.into();
        self
    }

    pub fn set_customer_source(&mut self, source: CustomerSource) -> &mut Self {
        self.options.customer_source = source;
        self
    }

    pub fn set_referral_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.options.referral_text = text.into();
        self
    }

    pub fn set_delivery_required(&mut self, required: bool) -> &mut Self {
        self.options.delivery_required = required;
        self
    }

    pub fn set_delivery_charge(&mut self, charge: impl Into<String>) -> &mut Self {
        self.options.delivery_charge = charge.into();
        self
    }

    pub fn set_delivery_mode(&mut self, mode: impl Into<String>) -> &mut Self {
        self.options.delivery_mode = mode.into();
        self
    }

    /// Change the discount type. A real change clears the amount so a
    /// percentage is never read back as a fixed sum or vice versa.
    pub fn set_discount_type(&mut self, discount_type: DiscountType) -> &mut Self {
        if self.options.discount_type != discount_type {
            self.options.discount_type = discount_type;
            self.options.discount_amount.clear();
        }
        self
    }

    pub fn set_discount_amount(&mut self, amount: impl Into<String>) -> &mut Self {
        self.options.discount_amount = amount.into();
        self
    }

    pub fn set_round_off(&mut self, enabled: bool) -> &mut Self {
        self.options.round_off = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_labels_capitalise_first_letter() {
        assert_eq!(CustomerSource::WalkIn.label(), "Walk-in");
        assert_eq!(CustomerSource::Whatsapp.label(), "Whatsapp");
        assert_eq!(CustomerSource::Referral.label(), "Referral");
    }

    #[test]
    fn parses_form_values() {
        assert_eq!("walk-in".parse(), Ok(CustomerSource::WalkIn));
        assert_eq!("Instagram".parse(), Ok(CustomerSource::Instagram));
        assert!("tiktok".parse::<CustomerSource>().is_err());
        assert_eq!("percentage".parse(), Ok(DiscountType::Percentage));
        assert_eq!("fixed".parse(), Ok(DiscountType::Fixed));
        assert!("bogus".parse::<DiscountType>().is_err());
    }

    #[test]
    fn default_options() {
        let options = OrderOptions::default();
        assert_eq!(options.customer_source, CustomerSource::WalkIn);
        assert_eq!(options.discount_type, DiscountType::Fixed);
        assert!(options.round_off);
        assert!(!options.delivery_required);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut draft = OrderDraft::new();
        let a = draft.add_item("A", "1", "2", "1").unwrap();
        draft.remove_line_item(a);
        let b = draft.add_item("B", "1", "2", "1").unwrap();
        assert_ne!(a, b);
        draft.reset();
        let c = draft.add_item("C", "1", "2", "1").unwrap();
        assert!(c > b);
    }

    #[test]
    fn same_discount_type_keeps_amount() {
        let mut draft = OrderDraft::new();
        draft.set_discount_amount("15");
        draft.set_discount_type(DiscountType::Fixed);
        assert_eq!(draft.options().discount_amount, "15");
    }
}
