//! Receipt field classification from reading-order token text.

mod classifier;
pub mod rules;

pub use classifier::FieldClassifier;
