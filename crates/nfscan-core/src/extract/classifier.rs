//! Stateful token classifier building a receipt from reading-order text.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use crate::models::{Receipt, ReceiptItem};

use super::rules::{
    format_cnpj, format_cpf, parse_issue_datetime,
    patterns::{LEADING_NUMBER, PRICE, PRODUCT_CODE, WEIGHT_UNIT},
    strip_non_digits, validate_cnpj, validate_cpf,
};

/// Keywords that identify an establishment name line.
const ESTABLISHMENT_KEYWORDS: &[&str] = &[
    "padaria",
    "mercado",
    "supermercado",
    "loja",
    "restaurante",
    "ltda",
    "comercio",
];

/// Classification stage of the item under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemState {
    /// Item just opened by a product code; the next matching token is
    /// its description.
    AwaitingDescription,
    /// Description captured; waiting on prices.
    Ready,
    /// First price seen, stored as the unit price.
    UnitPriced,
    /// Second price seen; total price set and quantity derived.
    Priced,
}

/// The item currently under construction. At most one exists per
/// receipt at any time.
#[derive(Debug)]
struct OpenItem {
    item: ReceiptItem,
    state: ItemState,
}

type Recognizer = fn(&mut FieldClassifier, &str) -> bool;

/// Ordered recognizer chain; the first match wins and short-circuits
/// the rest. The order is a hard correctness requirement: the numeric
/// patterns overlap (a validated 14-digit CNPJ must never be absorbed
/// by the looser 5-14 digit product code rule).
const RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("access_key", FieldClassifier::recognize_access_key),
    ("cnpj", FieldClassifier::recognize_cnpj),
    ("cpf", FieldClassifier::recognize_cpf),
    (
        "establishment_name",
        FieldClassifier::recognize_establishment_name,
    ),
    ("issue_date", FieldClassifier::recognize_issue_date),
    ("phone", FieldClassifier::recognize_phone),
    ("product_code", FieldClassifier::recognize_product_code),
    ("description", FieldClassifier::recognize_description),
    ("price", FieldClassifier::recognize_price),
    ("weight_unit", FieldClassifier::recognize_weight_unit),
];

/// Classifies reading-order tokens into receipt fields.
///
/// One classifier holds the state of exactly one receipt. Construct a
/// fresh classifier (or call [`reset`](Self::reset)) before processing
/// the next image; reusing the state would leak fields and items from
/// the previous receipt into it.
#[derive(Debug)]
pub struct FieldClassifier {
    receipt: Receipt,
    open_item: Option<OpenItem>,
}

impl FieldClassifier {
    /// Create a classifier with an empty receipt.
    pub fn new() -> Self {
        Self {
            receipt: Receipt::new(),
            open_item: None,
        }
    }

    /// Replace all state with a fresh, empty receipt.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The recognizer chain in evaluation order, by name.
    pub fn recognizer_order() -> Vec<&'static str> {
        RECOGNIZERS.iter().map(|(name, _)| *name).collect()
    }

    /// View of the receipt under construction.
    ///
    /// Aggregates are provisional until [`finalize`](Self::finalize).
    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    /// Classify one token into exactly one semantic role and update
    /// the receipt. Unrecognized tokens are dropped; empty or
    /// whitespace-only text is a no-op. Never fails.
    pub fn classify(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        for &(name, recognize) in RECOGNIZERS {
            if recognize(self, text) {
                trace!(token = text, recognizer = name, "token classified");
                return;
            }
        }

        trace!(token = text, "token matched no recognizer");
    }

    /// Classify a sequence of tokens in reading order.
    pub fn classify_all<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.classify(token.as_ref());
        }
    }

    /// Close out the receipt: commit the open item and recompute the
    /// authoritative aggregates from the item list, overriding the
    /// provisional running sums accumulated during classification.
    ///
    /// Idempotent: a second call finds no open item and becomes a pure
    /// recompute.
    pub fn finalize(&mut self) -> Receipt {
        if let Some(open) = self.open_item.take() {
            if open.item.code.is_some() {
                self.receipt.items.push(open.item);
            }
        }

        let total: Decimal = self.receipt.items.iter().map(|i| i.total_price).sum();
        let discount: Decimal = self.receipt.items.iter().map(|i| i.discount).sum();

        self.receipt.item_count = self.receipt.items.len() as u32;
        self.receipt.total_amount = total.round_dp(2);
        self.receipt.total_discount = discount.round_dp(2);
        self.receipt.total_paid = (total - discount).round_dp(2);

        self.receipt.clone()
    }

    // -- recognizers, in chain order --

    /// 44-digit fiscal access key. Checked first: its digit count is
    /// longer than any other numeric field and unambiguous.
    fn recognize_access_key(&mut self, text: &str) -> bool {
        let digits = strip_non_digits(text);
        if digits.len() != 44 {
            return false;
        }
        self.receipt.access_key = Some(digits);
        true
    }

    /// 14 digits with valid CNPJ check digits. Must run before the
    /// product-code rule, which would otherwise absorb it.
    fn recognize_cnpj(&mut self, text: &str) -> bool {
        let digits = strip_non_digits(text);
        if digits.len() != 14 || !validate_cnpj(&digits) {
            return false;
        }
        self.receipt.cnpj = Some(format_cnpj(&digits));
        true
    }

    /// 11 digits with valid CPF check digits.
    fn recognize_cpf(&mut self, text: &str) -> bool {
        let digits = strip_non_digits(text);
        if digits.len() != 11 || !validate_cpf(&digits) {
            return false;
        }
        self.receipt.cpf = Some(format_cpf(&digits));
        true
    }

    /// Keyword containment, case-insensitive. Stores the original
    /// trimmed text, not the lower-cased form.
    fn recognize_establishment_name(&mut self, text: &str) -> bool {
        let lower = text.to_lowercase();
        if !ESTABLISHMENT_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return false;
        }
        self.receipt.establishment_name = Some(text.to_string());
        true
    }

    fn recognize_issue_date(&mut self, text: &str) -> bool {
        match parse_issue_datetime(text) {
            Some(dt) => {
                self.receipt.issued_at = Some(dt);
                true
            }
            None => false,
        }
    }

    /// 10-11 digits reads as a phone number. No field is stored; the
    /// token is consumed so the looser numeric rules below do not
    /// misfire on it.
    fn recognize_phone(&mut self, text: &str) -> bool {
        let digits = strip_non_digits(text);
        (10..=11).contains(&digits.len())
    }

    /// 5-14 digit product code. Commits the previous open item (if it
    /// has a code) and opens a new one awaiting its description.
    fn recognize_product_code(&mut self, text: &str) -> bool {
        if !PRODUCT_CODE.is_match(text) {
            return false;
        }

        if let Some(open) = self.open_item.take() {
            if open.item.code.is_some() {
                self.receipt.items.push(open.item);
                self.receipt.item_count += 1;
            }
        }

        let number = self.receipt.items.len() as u32 + 1;
        self.open_item = Some(OpenItem {
            item: ReceiptItem::new(text, number),
            state: ItemState::AwaitingDescription,
        });

        true
    }

    /// First token after a product code becomes the item description.
    fn recognize_description(&mut self, text: &str) -> bool {
        match self.open_item.as_mut() {
            Some(open) if open.state == ItemState::AwaitingDescription => {
                open.item.description = Some(text.to_string());
                open.state = ItemState::Ready;
                true
            }
            _ => false,
        }
    }

    /// Decimal amount with exactly two decimals (comma or point). The
    /// first price on an item is its unit price, the second its total;
    /// the quantity derives from their ratio.
    fn recognize_price(&mut self, text: &str) -> bool {
        let normalized = text.replace(',', ".");
        if !PRICE.is_match(&normalized) {
            return false;
        }
        let Ok(amount) = Decimal::from_str(&normalized) else {
            return false;
        };

        if let Some(open) = self.open_item.as_mut() {
            if open.item.unit_price.is_zero() {
                open.item.unit_price = amount;
                open.state = ItemState::UnitPriced;
            } else {
                open.item.total_price = amount;
                if open.item.unit_price > Decimal::ZERO {
                    open.item.quantity = (amount / open.item.unit_price).round_dp(2);
                }
                open.state = ItemState::Priced;
            }
        }

        // Provisional running sums; finalize recomputes the
        // authoritative totals from the item list.
        self.receipt.total_amount += amount;
        self.receipt.total_paid += amount;

        true
    }

    /// Quantity with a unit suffix (kg, g, l, ml, un). Overwrites any
    /// quantity previously derived from the price ratio.
    fn recognize_weight_unit(&mut self, text: &str) -> bool {
        if !WEIGHT_UNIT.is_match(text) {
            return false;
        }

        if let Some(open) = self.open_item.as_mut() {
            if let Some(m) = LEADING_NUMBER.find(text) {
                let number = m.as_str().replace(',', ".");
                if let Ok(quantity) = Decimal::from_str(&number) {
                    open.item.quantity = quantity;
                }
            }
        }

        true
    }
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_recognizer_order_is_fixed() {
        assert_eq!(
            FieldClassifier::recognizer_order(),
            vec![
                "access_key",
                "cnpj",
                "cpf",
                "establishment_name",
                "issue_date",
                "phone",
                "product_code",
                "description",
                "price",
                "weight_unit",
            ]
        );
    }

    #[test]
    fn test_valid_cnpj_never_opens_item() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("11222333000181");

        let receipt = classifier.finalize();
        assert_eq!(receipt.cnpj, Some("11.222.333/0001-81".to_string()));
        assert!(receipt.items.is_empty());
    }

    #[test]
    fn test_invalid_cnpj_falls_through_to_product_code() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("12345678901234"); // fails check digits

        let receipt = classifier.finalize();
        assert_eq!(receipt.cnpj, None);
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].code, Some("12345678901234".to_string()));
    }

    #[test]
    fn test_access_key_wins_over_everything() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("04325678901234567890123456789012345678901234");

        let receipt = classifier.finalize();
        assert_eq!(
            receipt.access_key,
            Some("04325678901234567890123456789012345678901234".to_string())
        );
        assert!(receipt.items.is_empty());
    }

    #[test]
    fn test_phone_consumed_without_storing() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("(11) 4002-8922"); // 10 digits

        let receipt = classifier.finalize();
        assert!(receipt.items.is_empty());
        assert_eq!(receipt.cpf, None);
    }

    #[test]
    fn test_establishment_name_keeps_original_case() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("  MERCADO BOA VISTA LTDA  ");

        assert_eq!(
            classifier.receipt().establishment_name,
            Some("MERCADO BOA VISTA LTDA".to_string())
        );
    }

    #[test]
    fn test_empty_text_is_noop() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("   ");
        assert_eq!(classifier.finalize(), Receipt::new());
    }

    #[test]
    fn test_unrecognized_token_dropped() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("CUPOM FISCAL ELETRONICO");
        assert_eq!(classifier.finalize(), Receipt::new());
    }

    #[test]
    fn test_end_to_end_single_item() {
        let mut classifier = FieldClassifier::new();
        classifier.classify_all([
            "04325678901234567890123456789012345678901234",
            "MERCADO BOA VISTA LTDA",
            "03-09-24 10:53:31",
            "7896419716273",
            "ARROZ TIPO 1",
            "10.00",
            "20.00",
        ]);

        let receipt = classifier.finalize();
        assert!(receipt.access_key.is_some());
        assert_eq!(
            receipt.establishment_name,
            Some("MERCADO BOA VISTA LTDA".to_string())
        );
        assert_eq!(
            receipt.issued_at,
            NaiveDate::from_ymd_opt(2024, 9, 3)
                .unwrap()
                .and_hms_opt(10, 53, 31)
        );

        assert_eq!(receipt.items.len(), 1);
        let item = &receipt.items[0];
        assert_eq!(item.code, Some("7896419716273".to_string()));
        assert_eq!(item.description, Some("ARROZ TIPO 1".to_string()));
        assert_eq!(item.unit_price, dec("10.00"));
        assert_eq!(item.total_price, dec("20.00"));
        assert_eq!(item.quantity, dec("2.00"));

        assert_eq!(receipt.total_amount, dec("20.00"));
        assert_eq!(receipt.total_paid, dec("20.00"));
        assert_eq!(receipt.item_count, 1);
    }

    #[test]
    fn test_weight_unit_overrides_derived_quantity() {
        let mut classifier = FieldClassifier::new();
        classifier.classify_all(["7896419716273", "FEIJAO", "0.5kg"]);

        let receipt = classifier.finalize();
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].quantity, dec("0.5"));
        assert_eq!(receipt.items[0].unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_comma_decimal_price() {
        let mut classifier = FieldClassifier::new();
        classifier.classify_all(["7896419716273", "LEITE", "4,59"]);

        let receipt = classifier.finalize();
        assert_eq!(receipt.items[0].unit_price, dec("4.59"));
    }

    #[test]
    fn test_new_code_commits_previous_item() {
        let mut classifier = FieldClassifier::new();
        classifier.classify_all([
            "7896419716273",
            "ARROZ TIPO 1",
            "10.00",
            "20.00",
            "7891000100103",
            "FEIJAO PRETO",
            "8.50",
            "8.50",
        ]);

        let receipt = classifier.finalize();
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.items[0].number, 1);
        assert_eq!(receipt.items[1].number, 2);
        assert_eq!(receipt.items[1].description, Some("FEIJAO PRETO".to_string()));
        assert_eq!(receipt.total_amount, dec("28.50"));
    }

    #[test]
    fn test_sequence_numbers_contiguous() {
        let mut classifier = FieldClassifier::new();
        for code in ["789641971627", "789100010010", "789191000019"] {
            classifier.classify(code);
            classifier.classify("PRODUTO");
            classifier.classify("1.00");
        }

        let receipt = classifier.finalize();
        let numbers: Vec<u32> = receipt.items.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_itemless_price_discarded_at_finalize() {
        let mut classifier = FieldClassifier::new();
        classifier.classify("99.90"); // no open item

        // The provisional running sum sees it...
        assert_eq!(classifier.receipt().total_amount, dec("99.90"));

        // ...but finalize recomputes from the (empty) item list.
        let receipt = classifier.finalize();
        assert_eq!(receipt.total_amount, Decimal::ZERO);
        assert_eq!(receipt.total_paid, Decimal::ZERO);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut classifier = FieldClassifier::new();
        classifier.classify_all(["7896419716273", "ARROZ", "10.00", "20.00"]);

        let first = classifier.finalize();
        let second = classifier.finalize();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_clears_previous_receipt() {
        let mut classifier = FieldClassifier::new();
        classifier.classify_all(["7896419716273", "ARROZ", "10.00"]);
        classifier.reset();

        let receipt = classifier.finalize();
        assert_eq!(receipt, Receipt::new());
    }

    #[test]
    fn test_description_requires_open_item() {
        let mut classifier = FieldClassifier::new();
        // No product code seen; a plain text token is just dropped.
        classifier.classify("ARROZ TIPO 1");

        let receipt = classifier.finalize();
        assert!(receipt.items.is_empty());
    }
}
