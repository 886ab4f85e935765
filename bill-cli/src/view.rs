//! Plain-text views of the order and of a generated bill.

use std::io::{self, Write};

use bill_core::money::{format_fixed, format_plain, format_signed, with_currency};
use bill_core::{Decimal, DiscountType, Invoice, OrderDraft, ShopProfile};

const RULE: &str = "----------------------------------------------------------";

/// Editing view: items, the pending entry, profit analysis and totals.
pub fn write_summary<W: Write>(out: &mut W, draft: &OrderDraft, profile: &ShopProfile) -> io::Result<()> {
    let cur = profile.currency.as_str();
    let options = draft.options();
    let bill = draft.bill();

    writeln!(out, "Order for {}", display_or(&options.customer_name, "(no name)"))?;
    writeln!(out, "Source: {}", options.customer_source.label())?;
    writeln!(out, "{}", RULE)?;

    if draft.is_empty() {
        writeln!(out, "No items added yet.")?;
    }
    for item in draft.items() {
        writeln!(
            out,
            "#{} {}  {} x {} = {}",
            item.id,
            item.name,
            item.quantity,
            with_currency(cur, item.selling_price),
            with_currency(cur, item.total_selling),
        )?;
        writeln!(
            out,
            "    cost {}  profit {}  margin {}%",
            with_currency(cur, item.total_cost),
            with_currency(cur, item.profit),
            format_fixed(item.margin),
        )?;
    }

    let entry = draft.entry();
    if !entry.name.is_empty() || !entry.selling_price.is_empty() || !entry.cost_price.is_empty() {
        write!(
            out,
            "Entry: {:?} cost {:?} price {:?} qty {:?}",
            entry.name, entry.cost_price, entry.selling_price, entry.quantity
        )?;
        match entry.preview() {
            Some(p) => writeln!(
                out,
                "  ({} per unit, {}%)",
                with_currency(cur, p.profit_per_unit),
                format_fixed(p.margin)
            )?,
            None => writeln!(out)?,
        }
    }

    if let Some(margin) = bill.overall_margin {
        writeln!(out, "{}", RULE)?;
        writeln!(out, "Profit analysis")?;
        writeln!(out, "  Total cost:     {}", with_currency(cur, bill.total_cost))?;
        writeln!(out, "  Total profit:   {}", with_currency(cur, bill.total_profit))?;
        writeln!(out, "  Overall margin: {}%", format_fixed(margin))?;
    }

    writeln!(out, "{}", RULE)?;
    writeln!(out, "Subtotal:        {}", with_currency(cur, bill.subtotal))?;
    if options.delivery_required {
        writeln!(out, "Delivery:        {}", with_currency(cur, bill.delivery_charge_applied))?;
    }
    if bill.discount_applied > Decimal::ZERO {
        writeln!(out, "Discount:        {}", with_currency(cur, -bill.discount_applied))?;
    }
    writeln!(out, "Grand total:     {}", with_currency(cur, bill.grand_total))?;
    if options.round_off {
        writeln!(out, "Round off:       {}", format_signed(bill.round_off_delta))?;
    }
    writeln!(out, "Final total:     {}", with_currency(cur, bill.final_total))?;
    Ok(())
}

/// Reviewing view: the bill as the customer sees it.
pub fn write_invoice<W: Write>(out: &mut W, invoice: &Invoice, profile: &ShopProfile) -> io::Result<()> {
    let cur = profile.currency.as_str();
    let bill = &invoice.bill;
    let zone = profile.timezone_or_ist();

    writeln!(out, "{}", profile.name)?;
    if !profile.address.trim().is_empty() {
        writeln!(out, "{}", profile.address)?;
    }
    if !profile.phone.trim().is_empty() {
        writeln!(out, "Phone: {}", profile.phone.trim())?;
    }
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Bill No:  {}", invoice.number)?;
    writeln!(out, "Date:     {}", invoice.display_timestamp(&zone))?;
    writeln!(out, "Customer: {}", invoice.customer_display_name())?;
    writeln!(out, "Source:   {}", invoice.customer_source.label())?;
    if let Some(referrer) = &invoice.referred_by {
        writeln!(out, "Referred by: {}", referrer)?;
    }
    if let Some(delivery) = &invoice.delivery {
        writeln!(out, "Delivery: Yes")?;
        if let Some(mode) = &delivery.mode {
            writeln!(out, "Mode:     {}", mode)?;
        }
    }
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{:<28} {:>5} {:>10} {:>11}", "Item", "Qty", "Price", "Total")?;
    for item in &invoice.items {
        writeln!(
            out,
            "{:<28} {:>5} {:>10} {:>11}",
            item.name,
            item.quantity,
            format!("{}{}", cur, format_plain(item.selling_price)),
            with_currency(cur, item.total_selling),
        )?;
    }
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{:>40} {:>16}", "Subtotal:", with_currency(cur, bill.subtotal))?;
    if bill.delivery_charge_applied > Decimal::ZERO {
        writeln!(
            out,
            "{:>40} {:>16}",
            "Delivery Charge:",
            with_currency(cur, bill.delivery_charge_applied)
        )?;
    }
    if bill.discount_applied > Decimal::ZERO && format_fixed(bill.discount_applied) != "0.00" {
        let label = match invoice.discount.discount_type {
            DiscountType::Percentage => format!("Discount ({}%):", format_plain(invoice.discount.amount)),
            DiscountType::Fixed => "Discount:".to_string(),
        };
        writeln!(out, "{:>40} {:>16}", label, with_currency(cur, -bill.discount_applied))?;
    }
    if invoice.round_off && format_fixed(bill.round_off_delta) != "0.00" {
        writeln!(out, "{:>40} {:>16}", "Round Off:", format_signed(bill.round_off_delta))?;
    }
    writeln!(out, "{:>40} {:>16}", "Grand Total:", with_currency(cur, bill.final_total))?;
    writeln!(out, "{}", RULE)?;
    for line in &profile.thank_you_lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_summary(draft: &OrderDraft) -> String {
        let mut out = Vec::new();
        write_summary(&mut out, draft, &ShopProfile::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_summary_has_no_profit_analysis() {
        let text = render_summary(&OrderDraft::new());
        assert!(text.contains("No items added yet."));
        assert!(!text.contains("Profit analysis"));
        assert!(text.contains("Final total:     Rs.0.00"));
    }

    #[test]
    fn summary_shows_item_figures() {
        let mut draft = OrderDraft::new();
        draft.add_item("Cupcake", "20", "50", "4");
        draft.set_delivery_required(true).set_delivery_charge("30");
        let text = render_summary(&draft);
        assert!(text.contains("#1 Cupcake  4 x Rs.50.00 = Rs.200.00"));
        assert!(text.contains("margin 60.00%"));
        assert!(text.contains("Overall margin: 60.00%"));
        assert!(text.contains("Delivery:        Rs.30.00"));
        assert!(text.contains("Final total:     Rs.230.00"));
    }

    fn render_invoice(draft: OrderDraft, profile: &ShopProfile) -> String {
        let clock = bill_core::FixedClock("2026-10-18T09:00:00.123Z".parse().unwrap());
        let mut session = bill_core::BillingSession::with_clock(clock);
        *session.draft_mut().unwrap() = draft;
        let invoice = session.generate_bill().unwrap();
        let mut out = Vec::new();
        write_invoice(&mut out, invoice, profile).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn negative_discount_is_not_listed_as_discount() {
        let mut draft = OrderDraft::new();
        draft.add_item("Cupcake", "20", "50", "4");
        draft.set_discount_amount("-20");
        let summary = render_summary(&draft);
        assert!(!summary.contains("Discount:"));
        assert!(summary.contains("Final total:     Rs.220.00"));

        let invoice = render_invoice(draft, &ShopProfile::default());
        assert!(!invoice.contains("Discount"));
        assert!(invoice.contains("Rs.220.00"));
    }

    #[test]
    fn phone_is_labelled() {
        let profile = ShopProfile {
            phone: "+91 98765 43210".to_string(),
            ..ShopProfile::default()
        };
        let mut draft = OrderDraft::new();
        draft.add_item("Cupcake", "20", "50", "1");
        let text = render_invoice(draft, &profile);
        assert!(text.contains("Phone: +91 98765 43210"));
    }

    #[test]
    fn round_off_line_omitted_when_rounding_is_off() {
        let mut draft = OrderDraft::new();
        draft.add_item("Rusk", "2", "13.30", "15");
        draft.set_round_off(false);
        let summary = render_summary(&draft);
        assert!(!summary.contains("Round off:"));
        assert!(summary.contains("Final total:     Rs.199.50"));

        let invoice = render_invoice(draft, &ShopProfile::default());
        assert!(!invoice.contains("Round Off:"));
        assert!(invoice.contains("Rs.199.50"));
    }
}
