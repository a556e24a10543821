//! Data models for structured fiscal receipts.

pub mod receipt;

pub use receipt::{Receipt, ReceiptItem};
