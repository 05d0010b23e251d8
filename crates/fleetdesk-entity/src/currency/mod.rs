//! Currency entities.

pub mod model;

pub use model::{Currency, CurrencyFilter, CurrencyInput};
