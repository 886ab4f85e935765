//! Line-oriented command language read by the `bill` front end.

use std::fmt;

use bill_core::{CustomerSource, DiscountType, LineItemId};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Customer(String),
    Source(CustomerSource),
    Referral(String),
    Delivery(bool),
    Charge(String),
    Mode(String),
    DiscountType(DiscountType),
    Discount(String),
    RoundOff(bool),
    /// Item entry fields.
    Name(String),
    Cost(String),
    Price(String),
    Qty(String),
    /// Commit the item entry.
    Add,
    /// Fill the entry and commit it in one go.
    Item {
        name: String,
        cost: String,
        price: String,
        qty: String,
    },
    Remove(LineItemId),
    Show,
    Generate,
    Export,
    New,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

fn error(msg: impl Into<String>) -> ParseError {
    ParseError(msg.into())
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Option<Result<Command, ParseError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    Some(parse_command(&word.to_ascii_lowercase(), rest))
}

fn parse_command(word: &str, rest: &str) -> Result<Command, ParseError> {
    let text = || rest.to_string();
    let cmd = match word {
        "customer" => Command::Customer(text()),
        "source" => Command::Source(rest.parse().map_err(error)?),
        "referral" => Command::Referral(text()),
        "delivery" => Command::Delivery(parse_switch(rest)?),
        "charge" => Command::Charge(text()),
        "mode" => Command::Mode(text()),
        "discount-type" => Command::DiscountType(rest.parse().map_err(error)?),
        "discount" => Command::Discount(text()),
        "round-off" => Command::RoundOff(parse_switch(rest)?),
        "name" => Command::Name(text()),
        "cost" => Command::Cost(text()),
        "price" => Command::Price(text()),
        "qty" => Command::Qty(text()),
        "add" => Command::Add,
        "item" => parse_item(rest)?,
        "remove" => {
            let id = rest
                .trim_start_matches('#')
                .parse::<u64>()
                .map_err(|_| error(format!("not an item id: {:?}", rest)))?;
            Command::Remove(LineItemId(id))
        }
        "show" => Command::Show,
        "generate" => Command::Generate,
        "export" => Command::Export,
        "new" => Command::New,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(error(format!(
                "unknown command {:?}; type `help` for a list",
                other
            )))
        }
    };
    Ok(cmd)
}

fn parse_switch(value: &str) -> Result<bool, ParseError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(error(format!("expected on or off, got {:?}", other))),
    }
}

/// `NAME | COST | PRICE | QTY`, quantity optional.
fn parse_item(rest: &str) -> Result<Command, ParseError> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let (name, cost, price, qty) = match fields.as_slice() {
        [name, cost, price] => (name, cost, price, &"1"),
        [name, cost, price, qty] => (name, cost, price, qty),
        _ => return Err(error("usage: item NAME | COST | PRICE | QTY")),
    };
    Ok(Command::Item {
        name: name.to_string(),
        cost: cost.to_string(),
        price: price.to_string(),
        qty: qty.to_string(),
    })
}

pub const HELP: &str = "\
Order:
  customer NAME            customer name
  source walk-in|instagram|whatsapp|referral
  referral TEXT            who referred the customer
  delivery on|off
  charge AMOUNT            delivery charge
  mode TEXT                delivery mode
  discount-type fixed|percentage
  discount AMOUNT
  round-off on|off
Items:
  name / cost / price / qty VALUE   fill the item entry
  add                      add the entry as a line item
  item NAME | COST | PRICE | QTY
  remove ID
Bill:
  show                     current order or bill
  generate                 finalize the bill
  export                   save the bill as PDF
  new                      start a new order
  quit";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(parse_line("   ").is_none());
        assert!(parse_line("# morning orders").is_none());
    }

    #[test]
    fn keeps_free_text_arguments() {
        assert_eq!(parse("customer  Priya Sharma "), Command::Customer("Priya Sharma".into()));
        assert_eq!(parse("customer"), Command::Customer(String::new()));
        assert_eq!(parse("CHARGE 30"), Command::Charge("30".into()));
    }

    #[test]
    fn parses_enums_and_switches() {
        assert_eq!(parse("source instagram"), Command::Source(CustomerSource::Instagram));
        assert_eq!(parse("discount-type %"), Command::DiscountType(DiscountType::Percentage));
        assert_eq!(parse("delivery on"), Command::Delivery(true));
        assert_eq!(parse("round-off off"), Command::RoundOff(false));
        assert!(parse_line("delivery maybe").unwrap().is_err());
        assert!(parse_line("source carrier-pigeon").unwrap().is_err());
    }

    #[test]
    fn parses_one_shot_items() {
        assert_eq!(
            parse("item Chocolate Cake | 300 | 650 | 2"),
            Command::Item {
                name: "Chocolate Cake".into(),
                cost: "300".into(),
                price: "650".into(),
                qty: "2".into(),
            }
        );
        assert_eq!(
            parse("item Cookie | | 25"),
            Command::Item {
                name: "Cookie".into(),
                cost: "".into(),
                price: "25".into(),
                qty: "1".into(),
            }
        );
        assert!(parse_line("item Cookie").unwrap().is_err());
    }

    #[test]
    fn parses_remove_ids() {
        assert_eq!(parse("remove 3"), Command::Remove(LineItemId(3)));
        assert_eq!(parse("remove #4"), Command::Remove(LineItemId(4)));
        assert!(parse_line("remove cake").unwrap().is_err());
    }

    #[test]
    fn unknown_commands_are_errors() {
        let err = parse_line("checkout").unwrap().unwrap_err();
        assert!(err.to_string().contains("help"));
    }
}
