use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bill::Bill;
use crate::item::LineItem;
use crate::order::{CustomerSource, DiscountType, OrderDraft};

/// Maximum length of the customer part of an export file name.
const MAX_FILE_NAME_CUSTOMER: usize = 50;

/// Source of "now" for minting bills.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `INV-` followed by the last six digits of the millisecond timestamp.
///
/// Not sequential and not unique: two bills minted a multiple of
/// 1000 seconds apart share a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillNumber(String);

impl BillNumber {
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        let millis = at.timestamp_millis().rem_euclid(1_000_000);
        BillNumber(format!("INV-{:06}", millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BillNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery details shown on a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    /// Blank modes are dropped.
    pub mode: Option<String>,
}

/// Discount terms shown next to the discount line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountTerms {
    pub discount_type: DiscountType,
    /// Parsed amount (percent or currency units).
    pub amount: Decimal,
}

/// A finalized bill. Number and timestamp are fixed when the bill is
/// generated; viewing it again never changes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: BillNumber,
    pub issued_at: DateTime<Utc>,
    /// Entered name; use [`Invoice::customer_display_name`] for output.
    pub customer_name: String,
    pub customer_source: CustomerSource,
    /// Present only for referrals with non-blank text.
    pub referred_by: Option<String>,
    /// Present only when delivery was required.
    pub delivery: Option<DeliveryDetails>,
    pub discount: DiscountTerms,
    pub round_off: bool,
    pub items: Vec<LineItem>,
    pub bill: Bill,
}

impl Invoice {
    /// Snapshot `draft` as a bill issued at `issued_at`.
    pub fn from_draft(draft: &OrderDraft, issued_at: DateTime<Utc>) -> Self {
        let options = draft.options();

        let referred_by = match options.customer_source {
            CustomerSource::Referral => non_blank(&options.referral_text),
            _ => None,
        };
        let delivery = options.delivery_required.then(|| DeliveryDetails {
            mode: non_blank(&options.delivery_mode),
        });

        Invoice {
            number: BillNumber::from_timestamp(issued_at),
            issued_at,
            customer_name: options.customer_name.clone(),
            customer_source: options.customer_source,
            referred_by,
            delivery,
            discount: DiscountTerms {
                discount_type: options.discount_type,
                amount: crate::money::amount_or_zero(&options.discount_amount),
            },
            round_off: options.round_off,
            items: draft.items().to_vec(),
            bill: draft.bill(),
        }
    }

    /// Customer name, or `"Customer"` when none was entered.
    pub fn customer_display_name(&self) -> &str {
        let trimmed = self.customer_name.trim();
        if trimmed.is_empty() {
            "Customer"
        } else {
            trimmed
        }
    }

    /// Issue date and time in the given zone: `18/10/2026 02:30 pm`.
    pub fn display_timestamp(&self, zone: &FixedOffset) -> String {
        let local = self.issued_at.with_timezone(zone);
        format!(
            "{} {}",
            local.format("%-d/%-m/%Y"),
            local.format("%I:%M %P")
        )
    }

    /// Issue date in the given zone, `YYYY-MM-DD`.
    pub fn iso_date(&self, zone: &FixedOffset) -> String {
        self.issued_at.with_timezone(zone).format("%Y-%m-%d").to_string()
    }

    /// `Bill_<customer>_<date>_<number>.pdf`
    pub fn file_name(&self, zone: &FixedOffset) -> String {
        format!(
            "Bill_{}_{}_{}.pdf",
            sanitize_customer_name(&self.customer_name),
            self.iso_date(zone),
            self.number
        )
    }
}

/// Make a customer name safe for a file name.
///
/// Keeps ASCII letters, digits, whitespace, `-` and `_`; collapses each
/// whitespace run to one `_`; truncates to 50 characters. Falls back to
/// `"Customer"` when nothing usable remains.
pub fn sanitize_customer_name(name: &str) -> String {
    let kept: String = name
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();

    let mut out = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }

    let truncated: String = out.chars().take(MAX_FILE_NAME_CUSTOMER).collect();
    if truncated.is_empty() {
        "Customer".to_string()
    } else {
        truncated
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bill_number_uses_last_six_millis_digits() {
        let at = Utc.timestamp_millis_opt(1_760_000_123_456).unwrap();
        assert_eq!(BillNumber::from_timestamp(at).as_str(), "INV-123456");
        let at = Utc.timestamp_millis_opt(1_760_000_000_042).unwrap();
        assert_eq!(BillNumber::from_timestamp(at).as_str(), "INV-000042");
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_customer_name("Priya  Sharma"), "Priya_Sharma");
        assert_eq!(sanitize_customer_name("O'Brien & Co."), "OBrien_Co");
        assert_eq!(sanitize_customer_name("a-b_c"), "a-b_c");
        assert_eq!(sanitize_customer_name("   "), "Customer");
        assert_eq!(sanitize_customer_name("!!!"), "Customer");
        let long = "x".repeat(80);
        assert_eq!(sanitize_customer_name(&long).len(), 50);
    }
}
