//! Regex patterns for receipt token classification.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Product code: 5 to 14 digits, nothing else.
    pub static ref PRODUCT_CODE: Regex = Regex::new(r"^\d{5,14}$").unwrap();

    // Price: integer part, decimal point, exactly two decimals.
    // Matched after comma-to-point normalization.
    pub static ref PRICE: Regex = Regex::new(r"^\d+\.\d{2}$").unwrap();

    // Weight or unit quantity: optional decimal number plus a unit
    // suffix (kilogram, gram, liter, milliliter, unit).
    pub static ref WEIGHT_UNIT: Regex = Regex::new(
        r"(?i)^\d*[.,]?\d*(kg|un|g|l|ml)$"
    ).unwrap();

    // Leading numeric portion of a weight/unit token.
    pub static ref LEADING_NUMBER: Regex = Regex::new(r"^\d*[.,]?\d*").unwrap();

    // Date glued to a time with no separator (or a single T/space),
    // as OCR often reads them off receipt headers. Tried in order.
    pub static ref GLUED_DATETIME: Vec<Regex> = vec![
        Regex::new(r"^(\d{2}[-/]\d{2}[-/]\d{2})(\d{2}:\d{2}:\d{2})").unwrap(),
        Regex::new(r"^(\d{2}[-/]\d{2}[-/]\d{4})(\d{2}:\d{2}:\d{2})").unwrap(),
        Regex::new(r"^(\d{2}[-/]\d{2}[-/]\d{2})[T\s]?(\d{2}:\d{2}:\d{2})").unwrap(),
    ];

    // OCR dump detection line: OCR='<text>', score=<f>, bbox=[x0,y0,x1,y1]
    pub static ref DETECTION_LINE: Regex = Regex::new(
        r"OCR='(.*?)', score=([\d.]+), bbox=\[(\d+),(\d+),(\d+),(\d+)\]"
    ).unwrap();
}
