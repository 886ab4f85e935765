use std::str::FromStr;

use bill_core::{Bill, Decimal, DiscountType, OrderDraft};

fn d(text: &str) -> Decimal {
    Decimal::from_str(text).unwrap()
}

#[test]
fn empty_order_has_no_margin_and_cannot_be_billed() {
    let draft = OrderDraft::new();
    let bill = draft.bill();
    assert_eq!(bill.subtotal, d("0"));
    assert_eq!(bill.overall_margin, None);
    assert!(!bill.has_items());
}

#[test]
fn single_item_totals() {
    let mut draft = OrderDraft::new();
    draft.add_item("Cupcake", "20", "50", "4").unwrap();

    let item = &draft.items()[0];
    assert_eq!(item.total_cost, d("80"));
    assert_eq!(item.total_selling, d("200"));
    assert_eq!(item.profit, d("120"));
    assert_eq!(item.margin, d("60.0"));

    let bill = draft.bill();
    assert_eq!(bill.subtotal, d("200"));
    assert_eq!(bill.overall_margin.unwrap(), d("60.0"));
}

#[test]
fn delivery_and_fixed_discount() {
    let mut draft = OrderDraft::new();
    draft.add_item("Brownie Box", "60", "100", "2").unwrap();
    draft
        .set_delivery_required(true)
        .set_delivery_charge("30")
        .set_discount_type(DiscountType::Fixed)
        .set_discount_amount("20");

    let bill = draft.bill();
    assert_eq!(bill.subtotal, d("200"));
    assert_eq!(bill.grand_total, d("210"));
    assert_eq!(bill.final_total, d("210"));
    assert_eq!(bill.round_off_delta, d("0"));
}

#[test]
fn round_off_rounds_half_up() {
    let mut draft = OrderDraft::new();
    draft.add_item("Cookie", "", "99.75", "2").unwrap();

    let bill = draft.bill();
    assert_eq!(bill.subtotal, d("199.5"));
    assert_eq!(bill.final_total, d("200"));
    assert_eq!(bill.round_off_delta, d("0.5"));
}

#[test]
fn oversized_percentage_discount_goes_negative() {
    let mut draft = OrderDraft::new();
    draft.add_item("Tart", "10", "100", "1").unwrap();
    draft
        .set_discount_type(DiscountType::Percentage)
        .set_discount_amount("150")
        .set_round_off(false);

    let bill = draft.bill();
    assert_eq!(bill.discount_applied, d("150"));
    assert_eq!(bill.grand_total, d("-50"));
    assert_eq!(bill.final_total, d("-50"));
}

#[test]
fn reset_restores_initial_state() {
    let mut draft = OrderDraft::new();
    let first = draft.add_item("Cupcake", "20", "50", "4").unwrap();
    draft.add_item("Cake", "300", "650", "1").unwrap();
    draft.remove_line_item(first);
    draft
        .set_customer_name("Asha")
        .set_delivery_required(true)
        .set_delivery_charge("40")
        .set_round_off(false);
    draft.set_item_name("half typed");

    draft.reset();

    let fresh = OrderDraft::new();
    assert!(draft.is_empty());
    assert_eq!(draft.options(), fresh.options());
    assert_eq!(draft.entry(), fresh.entry());
    assert_eq!(draft.bill(), fresh.bill());
}

#[test]
fn unparseable_amounts_count_as_zero() {
    let mut draft = OrderDraft::new();
    draft.add_item("Muffin", "abc", "40", "3").unwrap();
    draft
        .set_delivery_required(true)
        .set_delivery_charge("free")
        .set_discount_amount("-");

    let bill = draft.bill();
    assert_eq!(bill.total_cost, d("0"));
    assert_eq!(bill.delivery_charge_applied, d("0"));
    assert_eq!(bill.discount_applied, d("0"));
    assert_eq!(bill.final_total, d("120"));
}

#[test]
fn delivery_charge_ignored_when_not_required() {
    let mut draft = OrderDraft::new();
    draft.add_item("Muffin", "10", "40", "1").unwrap();
    draft.set_delivery_charge("50");
    assert_eq!(draft.bill().delivery_charge_applied, d("0"));
    assert_eq!(draft.bill().final_total, d("40"));
}

#[test]
fn totals_match_item_sums() {
    let mut draft = OrderDraft::new();
    draft.add_item("A", "1.25", "3.10", "3").unwrap();
    draft.add_item("B", "0", "7.45", "2").unwrap();
    draft.add_item("C", "12", "11", "5").unwrap();

    let bill = draft.bill();
    let selling: Decimal = draft.items().iter().map(|i| i.total_selling).sum();
    let cost: Decimal = draft.items().iter().map(|i| i.total_cost).sum();
    assert_eq!(bill.subtotal, selling);
    assert_eq!(bill.total_cost, cost);
    assert_eq!(bill.total_profit, selling - cost);
    assert_eq!(bill.final_total - bill.grand_total, bill.round_off_delta);
    assert_eq!(bill.final_total, bill.final_total.round());
    assert_eq!(bill.subtotal, d("79.20"));
}

#[test]
fn bill_is_recomputed_from_items_alone() {
    let mut draft = OrderDraft::new();
    draft.add_item("Cupcake", "20", "50", "4").unwrap();
    let items = draft.items().to_vec();
    assert_eq!(Bill::compute(&items, draft.options()), draft.bill());
}

#[test]
fn fractional_prices_are_exact() {
    let mut draft = OrderDraft::new();
    draft.add_item("Rusk", "2", "4.10", "15").unwrap();

    let bill = draft.bill();
    assert_eq!(bill.subtotal, d("61.50"));
    assert_eq!(bill.final_total, d("62"));
    assert_eq!(bill.round_off_delta, d("0.50"));
}

#[test]
fn negative_half_rounds_toward_positive() {
    let mut draft = OrderDraft::new();
    draft.add_item("Tart", "10", "100.50", "1").unwrap();
    draft.set_discount_amount("151");

    let bill = draft.bill();
    assert_eq!(bill.grand_total, d("-50.50"));
    assert_eq!(bill.final_total, d("-50"));
}

#[test]
fn fractional_total_kept_when_round_off_is_off() {
    let mut draft = OrderDraft::new();
    draft.add_item("Rusk", "2", "13.30", "15").unwrap();
    draft.set_round_off(false);

    let bill = draft.bill();
    assert_eq!(bill.grand_total, d("199.50"));
    assert_eq!(bill.final_total, d("199.50"));
    assert_eq!(bill.round_off_delta, Decimal::ZERO);
}
