//! Terminal surface: setup and one-shot conversions

pub mod convert;
pub mod setup;
pub mod ui;
