use tracing::{error, info};

use crate::error::SessionError;
use crate::export::{ExportArtifact, ExportConfig, InvoiceExporter};
use crate::invoice::{Clock, Invoice, SystemClock};
use crate::layout::layout_invoice;
use crate::order::OrderDraft;
use crate::shop::ShopProfile;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// The order is being assembled.
    Editing,
    /// A bill has been generated and is on display.
    Reviewing(Invoice),
}

/// One billing session: an order draft plus the Editing/Reviewing
/// state machine around it.
///
/// ```
/// use bill_core::{BillingSession, Decimal};
///
/// let mut session = BillingSession::new();
/// session.draft_mut().unwrap().add_item("Cupcake", "20", "50", "4");
/// let invoice = session.generate_bill().unwrap();
/// assert_eq!(invoice.bill.final_total, Decimal::from(200));
/// ```
pub struct BillingSession<C: Clock = SystemClock> {
    draft: OrderDraft,
    phase: Phase,
    clock: C,
}

impl BillingSession<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for BillingSession<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> BillingSession<C> {
    pub fn with_clock(clock: C) -> Self {
        BillingSession {
            draft: OrderDraft::new(),
            phase: Phase::Editing,
            clock,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self.phase, Phase::Reviewing(_))
    }

    /// The order draft. Readable in either phase.
    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Mutable access to the draft, only while editing.
    pub fn draft_mut(&mut self) -> Result<&mut OrderDraft, SessionError> {
        match self.phase {
            Phase::Editing => Ok(&mut self.draft),
            Phase::Reviewing(_) => Err(SessionError::BillFinalized),
        }
    }

    /// The finalized invoice, if a bill has been generated.
    pub fn invoice(&self) -> Option<&Invoice> {
        match &self.phase {
            Phase::Reviewing(invoice) => Some(invoice),
            Phase::Editing => None,
        }
    }

    /// A bill can be generated once the order has at least one item.
    pub fn can_generate_bill(&self) -> bool {
        !self.draft.is_empty()
    }

    /// Finalize the order into an invoice and switch to reviewing.
    ///
    /// The bill number and timestamp are minted here, once. Calling
    /// this again while reviewing returns the same invoice.
    pub fn generate_bill(&mut self) -> Result<&Invoice, SessionError> {
        if let Phase::Editing = self.phase {
            if !self.can_generate_bill() {
                return Err(SessionError::EmptyOrder);
            }
            let invoice = Invoice::from_draft(&self.draft, self.clock.now());
            info!(
                number = %invoice.number,
                items = invoice.items.len(),
                total = %invoice.bill.final_total,
                "bill generated"
            );
            self.phase = Phase::Reviewing(invoice);
        }
        match &self.phase {
            Phase::Reviewing(invoice) => Ok(invoice),
            Phase::Editing => Err(SessionError::NotReviewing),
        }
    }

    /// Discard the order and start over. Cannot be undone.
    pub fn new_order(&mut self) {
        self.draft.reset();
        self.phase = Phase::Editing;
        info!("new order started");
    }

    /// Lay out the current invoice and hand it to `exporter`.
    ///
    /// A failed export is logged and returned; the session stays in
    /// the reviewing phase with the same invoice so the caller can
    /// simply try again.
    pub fn export<E: InvoiceExporter + ?Sized>(
        &self,
        exporter: &E,
        config: &ExportConfig,
        profile: &ShopProfile,
    ) -> Result<ExportArtifact, SessionError> {
        let invoice = self.invoice().ok_or(SessionError::NotReviewing)?;
        let surface = layout_invoice(invoice, profile);

        match exporter.export(&surface, config) {
            Ok(document) => {
                let file_name = invoice.file_name(&profile.timezone_or_ist());
                info!(
                    file = %file_name,
                    pages = document.page_count,
                    bytes = document.bytes.len(),
                    "bill exported"
                );
                Ok(ExportArtifact {
                    file_name,
                    bytes: document.bytes,
                    page_count: document.page_count,
                })
            }
            Err(err) => {
                error!(number = %invoice.number, error = %err, "bill export failed");
                Err(SessionError::Export(err))
            }
        }
    }
}
