//! Shared-expense ledger and balance engine.
//!
//! Groups of users record shared expenses and settlements; the ledger derives
//! each member's net balance from the transaction log and keeps the
//! denormalized aggregates (group running total, request paid roster)
//! consistent as records are added and removed.
//!
//! The crate is an embedded library: persistence is SQLite behind `sea-orm`,
//! identity and presentation live with the caller. All operations go through
//! [`Ledger`].

pub use currency::Currency;
pub use error::LedgerError;
pub use expenses::{Expense, ExpenseKind};
pub use groups::Group;
pub use ops::{Ledger, LedgerBuilder, MemberAddition};
pub use requests::Request;
pub use users::User;

mod currency;
mod error;
mod expenses;
mod group_members;
mod groups;
mod ops;
mod request_members;
mod request_paid;
mod requests;
mod splits;
mod users;

type ResultLedger<T> = Result<T, LedgerError>;
