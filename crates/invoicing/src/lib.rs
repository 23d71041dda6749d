//! Invoicing domain module: invoices, FIFO-backed issuance and sales returns.
//!
//! Pure logic only. Issuance turns allocation plans into invoice lines; the
//! caller depletes the lots and charges the customer in the same atomic unit.

pub mod invoice;
pub mod issuance;
pub mod sales_return;

pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use issuance::{InvoiceDraft, InvoiceLineRequest};
pub use sales_return::{ReturnLine, ReturnStatus, SalesReturn};
