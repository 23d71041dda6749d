//! Working-day session: the single global gate for calendar-scoped writes.
//!
//! At most one [`WorkingDay`] is open at a time. Invoices, collections,
//! expenses, returns, wastage and transfers may only be recorded on the open
//! day, which callers obtain as an explicit [`DaySession`] instead of reading
//! ambient global state.

pub mod reconciliation;
pub mod session;
pub mod working_day;

pub use reconciliation::{DayActivity, DaySummary, Reconciliation};
pub use session::{DaySession, ensure_no_open_day, opening_balances_for, require_open_day};
pub use working_day::{DayStatus, WorkingDay};
