//! Personal finance tracker core.
//!
//! Records income and outcome transactions per signed-in user and derives
//! the dashboard views from them: highlight cards (income, outcome, net),
//! the monthly outflow per category and a formatted transaction list.
//!
//! - [`aggregate`] holds the pure, total computations.
//! - [`ledger`] couples them with a [`storage`] backend.
//! - [`session`] remembers the signed-in user.

pub mod aggregate;
pub mod error;
pub mod ledger;
pub mod locale;
pub mod models;
pub mod session;
pub mod storage;
