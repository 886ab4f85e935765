use chrono::{FixedOffset, TimeZone, Utc};

use bill_core::invoice::sanitize_customer_name;
use bill_core::{layout_invoice, CustomerSource, DiscountType, Invoice, OrderDraft, ShopProfile};

fn ist() -> FixedOffset {
    FixedOffset::east_opt(330 * 60).unwrap()
}

fn invoice_for(draft: &OrderDraft) -> Invoice {
    // 2026-10-18 18:45:00.042 UTC, already the 19th in IST.
    let at = Utc.timestamp_millis_opt(1_792_349_100_042).unwrap();
    Invoice::from_draft(draft, at)
}

fn sample_draft() -> OrderDraft {
    let mut draft = OrderDraft::new();
    draft.add_item("Cupcake", "20", "50", "4").unwrap();
    draft.add_item("Chocolate Truffle Cake", "300", "650", "1").unwrap();
    draft
}

#[test]
fn timestamp_is_shown_in_shop_time() {
    let invoice = invoice_for(&sample_draft());
    assert_eq!(invoice.display_timestamp(&ist()), "19/10/2026 12:15 am");
    assert_eq!(invoice.iso_date(&ist()), "2026-10-19");
    assert_eq!(invoice.number.as_str(), "INV-100042");
}

#[test]
fn file_name_falls_back_to_customer() {
    let invoice = invoice_for(&sample_draft());
    assert_eq!(invoice.customer_display_name(), "Customer");
    assert_eq!(invoice.file_name(&ist()), "Bill_Customer_2026-10-19_INV-100042.pdf");
}

#[test]
fn file_name_sanitizes_customer() {
    let mut draft = sample_draft();
    draft.set_customer_name("  Mrs. Kaur / Table 4 ");
    let invoice = invoice_for(&draft);
    assert_eq!(invoice.file_name(&ist()), "Bill_Mrs_Kaur_Table_4_2026-10-19_INV-100042.pdf");
    assert_eq!(sanitize_customer_name("Zoë"), "Zo");
}

#[test]
fn referral_and_delivery_details_only_when_relevant() {
    let mut draft = sample_draft();
    draft
        .set_referral_text("Neha")
        .set_delivery_mode("Porter")
        .set_delivery_charge("50");
    let invoice = invoice_for(&draft);
    assert_eq!(invoice.referred_by, None);
    assert_eq!(invoice.delivery, None);

    draft
        .set_customer_source(CustomerSource::Referral)
        .set_delivery_required(true);
    let invoice = invoice_for(&draft);
    assert_eq!(invoice.referred_by.as_deref(), Some("Neha"));
    assert_eq!(
        invoice.delivery.and_then(|d| d.mode).as_deref(),
        Some("Porter")
    );
}

#[test]
fn layout_lists_items_and_totals() {
    let mut draft = sample_draft();
    draft
        .set_customer_name("Asha")
        .set_customer_source(CustomerSource::Instagram)
        .set_discount_type(DiscountType::Percentage)
        .set_discount_amount("10");
    let invoice = invoice_for(&draft);
    let surface = layout_invoice(&invoice, &ShopProfile::default());

    for text in [
        "The Lilac Confectionery",
        "INV-100042",
        "Asha",
        "Instagram",
        "Cupcake",
        "Subtotal:",
        "Discount (10%):",
        "-Rs.85.00",
        "Grand Total:",
        "Rs.765.00",
        "Have a sweet day!",
    ] {
        assert!(surface.contains_text(text), "missing {:?}", text);
    }
    assert!(!surface.contains_text("Delivery Charge"));
    assert!(!surface.contains_text("Round Off"));
    assert!(!surface.contains_text("Referred by"));
}

#[test]
fn layout_shows_round_off_when_it_changes_the_total() {
    let mut draft = OrderDraft::new();
    draft.add_item("Cookie", "", "99.75", "2").unwrap();
    let surface = layout_invoice(&invoice_for(&draft), &ShopProfile::default());
    assert!(surface.contains_text("Round Off:"));
    assert!(surface.contains_text("+0.50"));
    assert!(surface.contains_text("Rs.200.00"));
}

#[test]
fn layout_keeps_fractional_total_when_round_off_is_off() {
    let mut draft = OrderDraft::new();
    draft.add_item("Rusk", "2", "13.30", "15").unwrap();
    draft.set_round_off(false);
    let surface = layout_invoice(&invoice_for(&draft), &ShopProfile::default());
    assert!(!surface.contains_text("Round Off"));
    assert!(surface.contains_text("Rs.199.50"));
}

#[test]
fn layout_rounds_fractional_prices_exactly() {
    let mut draft = OrderDraft::new();
    draft.add_item("Rusk", "2", "4.10", "15").unwrap();
    let surface = layout_invoice(&invoice_for(&draft), &ShopProfile::default());
    assert!(surface.contains_text("Rs.61.50"));
    assert!(surface.contains_text("+0.50"));
    assert!(surface.contains_text("Rs.62.00"));
}

#[test]
fn layout_hides_negative_discount() {
    let mut draft = sample_draft();
    draft.set_discount_amount("-20");
    let surface = layout_invoice(&invoice_for(&draft), &ShopProfile::default());
    assert!(!surface.contains_text("Discount"));
    assert!(surface.contains_text("Rs.870.00"));
}

#[test]
fn layout_labels_phone() {
    let surface = layout_invoice(&invoice_for(&sample_draft()), &ShopProfile::default());
    assert!(surface.contains_text("Phone: +91 86999 22476"));
}
