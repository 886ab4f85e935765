mod commands;
mod view;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bill_core::pdf::Color;
use bill_core::{
    BillingSession, Clock, ExportConfig, LineItemId, Orientation, PageSize, PdfExporter,
    SessionError, ShopProfile, SystemClock,
};
use clap::{Parser, ValueEnum};
use tracing::{debug, error};

use crate::commands::{parse_line, Command, HELP};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Page {
    A4,
    Letter,
}

#[derive(Parser, Debug)]
#[command(name = "bill", version, about = "Bakery billing calculator")]
struct Cli {
    /// Shop profile (JSON); built-in defaults when omitted
    #[arg(long)]
    shop: Option<PathBuf>,

    /// Directory exported bills are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "a4")]
    page: Page,

    #[arg(long)]
    landscape: bool,

    /// Image resolution in pixels per point
    #[arg(long, default_value_t = 2.0)]
    scale: f64,

    /// Leave logo and QR code out of exported bills
    #[arg(long)]
    no_images: bool,

    /// Write uncompressed PDF streams
    #[arg(long)]
    no_compress: bool,

    /// Page background as `#rrggbb`
    #[arg(long, value_parser = parse_color, default_value = "#ffffff")]
    background: Color,
}

fn parse_color(text: &str) -> Result<Color, String> {
    Color::from_hex(text).ok_or_else(|| format!("`{}` is not a #rrggbb color", text))
}

impl Cli {
    fn export_config(&self) -> ExportConfig {
        ExportConfig {
            scale: self.scale,
            allow_images: !self.no_images,
            page_size: match self.page {
                Page::A4 => PageSize::A4,
                Page::Letter => PageSize::Letter,
            },
            orientation: if self.landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
            compress: !self.no_compress,
            background: self.background,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,bill_core=info".into()),
        )
        .init();

    let profile = match &cli.shop {
        Some(path) => ShopProfile::load(path)
            .with_context(|| format!("loading shop profile {}", path.display()))?,
        None => ShopProfile::default(),
    };

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening script {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut app = App {
        session: BillingSession::new(),
        profile,
        config: cli.export_config(),
        out_dir: cli.out_dir.clone(),
    };
    let stdout = io::stdout();
    app.run(input, &mut stdout.lock())
}

enum Flow {
    Continue,
    Quit,
}

/// Drives one billing session from a stream of commands.
struct App<C: Clock = SystemClock> {
    session: BillingSession<C>,
    profile: ShopProfile,
    config: ExportConfig,
    out_dir: PathBuf,
}

impl<C: Clock> App<C> {
    fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading commands")?;
            match parse_line(&line) {
                None => continue,
                Some(Err(err)) => writeln!(out, "{}", err)?,
                Some(Ok(cmd)) => {
                    if let Flow::Quit = self.execute(cmd, out)? {
                        break;
                    }
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<Flow> {
        debug!(?cmd, "command");
        match cmd {
            Command::Show => match self.session.invoice() {
                Some(invoice) => view::write_invoice(out, invoice, &self.profile)?,
                None => view::write_summary(out, self.session.draft(), &self.profile)?,
            },
            Command::Generate => match self.session.generate_bill() {
                Ok(invoice) => view::write_invoice(out, invoice, &self.profile)?,
                Err(err) => writeln!(out, "{}", err)?,
            },
            Command::Export => self.export(out)?,
            Command::New => {
                self.session.new_order();
                writeln!(out, "Started a new order.")?;
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
            edit => match self.edit(edit) {
                Ok(Some(notice)) => writeln!(out, "{}", notice)?,
                Ok(None) => {}
                Err(err) => writeln!(out, "{}", err)?,
            },
        }
        Ok(Flow::Continue)
    }

    /// Apply a command that changes the draft. Returns a notice for the
    /// user, if any.
    fn edit(&mut self, cmd: Command) -> Result<Option<String>, SessionError> {
        let draft = self.session.draft_mut()?;
        let notice = match cmd {
            Command::Customer(name) => {
                draft.set_customer_name(name);
                None
            }
            Command::Source(source) => {
                draft.set_customer_source(source);
                None
            }
            Command::Referral(text) => {
                draft.set_referral_text(text);
                None
            }
            Command::Delivery(on) => {
                draft.set_delivery_required(on);
                None
            }
            Command::Charge(amount) => {
                draft.set_delivery_charge(amount);
                None
            }
            Command::Mode(mode) => {
                draft.set_delivery_mode(mode);
                None
            }
            Command::DiscountType(kind) => {
                draft.set_discount_type(kind);
                None
            }
            Command::Discount(amount) => {
                draft.set_discount_amount(amount);
                None
            }
            Command::RoundOff(on) => {
                draft.set_round_off(on);
                None
            }
            Command::Name(name) => {
                draft.set_item_name(name);
                None
            }
            Command::Cost(cost) => {
                draft.set_item_cost_price(cost);
                None
            }
            Command::Price(price) => {
                draft.set_item_selling_price(price);
                None
            }
            Command::Qty(qty) => {
                draft.set_item_quantity(qty);
                None
            }
            Command::Add => added_notice(draft.add_line_item()),
            Command::Item {
                name,
                cost,
                price,
                qty,
            } => added_notice(draft.add_item(&name, &cost, &price, &qty)),
            Command::Remove(id) => {
                if draft.remove_line_item(id) {
                    None
                } else {
                    Some(format!("No item #{}.", id))
                }
            }
            Command::Show
            | Command::Generate
            | Command::Export
            | Command::New
            | Command::Help
            | Command::Quit => None,
        };
        Ok(notice)
    }

    fn export<W: Write>(&self, out: &mut W) -> Result<()> {
        let artifact = match self.session.export(&PdfExporter, &self.config, &self.profile) {
            Ok(artifact) => artifact,
            Err(SessionError::NotReviewing) => {
                writeln!(out, "{}", SessionError::NotReviewing)?;
                return Ok(());
            }
            Err(_) => {
                writeln!(out, "Failed to export bill")?;
                return Ok(());
            }
        };

        let path = self.out_dir.join(&artifact.file_name);
        if let Err(err) = fs::create_dir_all(&self.out_dir).and_then(|_| fs::write(&path, &artifact.bytes)) {
            error!(path = %path.display(), error = %err, "cannot save exported bill");
            writeln!(out, "Failed to export bill")?;
            return Ok(());
        }
        writeln!(
            out,
            "Saved {} ({} page{})",
            path.display(),
            artifact.page_count,
            if artifact.page_count == 1 { "" } else { "s" }
        )?;
        Ok(())
    }
}

/// An add that was silently rejected leaves the entry as typed.
fn added_notice(added: Option<LineItemId>) -> Option<String> {
    added.map(|id| format!("Added item #{}.", id))
}
