pub mod bill;
pub mod error;
pub mod export;
pub mod invoice;
pub mod item;
pub mod layout;
pub mod money;
pub mod order;
pub mod pdf;
pub mod session;
pub mod shop;

pub use bill::Bill;
pub use error::{ExportError, ProfileError, SessionError};
pub use export::{
    ExportArtifact, ExportConfig, ExportedDocument, InvoiceExporter, Orientation, PageSize,
    PdfExporter,
};
pub use invoice::{BillNumber, Clock, FixedClock, Invoice, SystemClock};
pub use item::{EntryRejection, ItemEntry, LineItem, LineItemId, UnitPreview};
pub use layout::{layout_invoice, InvoiceSurface, SurfaceOp};
pub use order::{CustomerSource, DiscountType, OrderDraft, OrderOptions};
pub use session::{BillingSession, Phase};
pub use shop::ShopProfile;

pub use rust_decimal::Decimal;
