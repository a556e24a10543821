//! End-to-end pipeline: raw OCR tokens to a finalized receipt.

use tracing::info;

use crate::extract::FieldClassifier;
use crate::layout::{LineReconstructor, Token};
use crate::models::Receipt;

/// Run the full structuring pipeline over one receipt's detections:
/// reconstruct reading order, classify each token, finalize.
///
/// A fresh classifier context is created per call, so consecutive
/// receipts can never leak fields into each other.
pub fn structure_tokens(tokens: Vec<Token>) -> Receipt {
    let token_count = tokens.len();
    let lines = LineReconstructor::new().reconstruct(tokens);

    let mut classifier = FieldClassifier::new();
    for line in &lines {
        for token in line {
            classifier.classify(&token.text);
        }
    }

    let receipt = classifier.finalize();
    info!(
        tokens = token_count,
        lines = lines.len(),
        items = receipt.items.len(),
        "receipt structured"
    );
    receipt
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_pipeline_orders_before_classifying() {
        // Detections arrive spatially shuffled; the price column sits
        // to the right of the description on each row.
        let tokens = vec![
            Token::new("20.00", 0.9, [300, 180, 360, 200]),
            Token::new("MERCADO BOA VISTA LTDA", 0.97, [40, 20, 400, 45]),
            Token::new("ARROZ TIPO 1", 0.95, [120, 140, 280, 165]),
            Token::new("7896419716273", 0.92, [40, 140, 110, 165]),
            Token::new("10.00", 0.9, [300, 140, 360, 165]),
        ];

        let receipt = structure_tokens(tokens);

        assert_eq!(
            receipt.establishment_name,
            Some("MERCADO BOA VISTA LTDA".to_string())
        );
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].quantity, Decimal::from_str("2.00").unwrap());
    }

    #[test]
    fn test_pipeline_empty_input() {
        let receipt = structure_tokens(Vec::new());
        assert_eq!(receipt, Receipt::new());
    }
}
