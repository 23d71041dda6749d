//! Accounting module: cash accounts, expenses and account transfers.
//!
//! Pure domain logic only: no IO, no persistence concerns. Working-day
//! reconciliation consumes these records to compute expected balances.

pub mod account;
pub mod expense;
pub mod transfer;

pub use account::{AccountBalances, CashAccount, PaymentMethod};
pub use expense::{Expense, ExpenseKind, ExpenseStatus, NewExpense};
pub use transfer::AccountTransfer;
