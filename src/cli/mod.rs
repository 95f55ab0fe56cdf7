//! Terminal front end: command drivers and shared table/spinner styling.

pub mod rates;
pub mod setup;
pub mod ui;
