//! Core library for Brazilian receipt (NFC-e) OCR structuring.
//!
//! This crate provides:
//! - Reading-order reconstruction from unordered OCR detections
//! - Rule-based token classification (access key, CNPJ/CPF, dates,
//!   product codes, prices, quantities)
//! - Receipt assembly with derived aggregate totals
//! - OCR dump ingestion and JSON persistence

pub mod dump;
pub mod error;
pub mod extract;
pub mod layout;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use dump::{parse_dump, read_dump};
pub use error::{NfscanError, Result, StorageError};
pub use extract::FieldClassifier;
pub use layout::{Line, LineReconstructor, Token};
pub use models::{Receipt, ReceiptItem};
pub use pipeline::structure_tokens;
pub use storage::{save_receipt, to_json};
