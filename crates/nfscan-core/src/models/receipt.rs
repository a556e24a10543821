//! Receipt data models matching the NFC-e consumer receipt record shape.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A structured fiscal receipt (NFC-e) under construction or finalized.
///
/// The wire format uses the Portuguese field names emitted by the
/// original extraction tooling, so downstream consumers can read the
/// JSON unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// 44-digit fiscal access key.
    #[serde(rename = "chave_acesso")]
    pub access_key: Option<String>,

    /// Establishment CNPJ, mask-formatted (XX.XXX.XXX/XXXX-XX).
    #[serde(rename = "cnpj_estabelecimento")]
    pub cnpj: Option<String>,

    /// Consumer CPF, mask-formatted (XXX.XXX.XXX-XX).
    #[serde(rename = "cpf")]
    pub cpf: Option<String>,

    /// Issue date and time.
    #[serde(rename = "data_emissao", with = "datetime_format")]
    pub issued_at: Option<NaiveDateTime>,

    /// Establishment name as printed on the receipt.
    #[serde(rename = "nome_estabelecimento")]
    pub establishment_name: Option<String>,

    /// Number of line items. Derived from `items` at finalize time.
    #[serde(rename = "total_itens")]
    pub item_count: u32,

    /// Sum of item total prices. Derived at finalize time.
    #[serde(rename = "valor_total")]
    pub total_amount: Decimal,

    /// Sum of item discounts.
    #[serde(rename = "valor_total_desconto")]
    pub total_discount: Decimal,

    /// Total amount minus discounts. Derived at finalize time.
    #[serde(rename = "valor_total_pago")]
    pub total_paid: Decimal,

    /// Purchased line items, in receipt order.
    #[serde(rename = "itens")]
    pub items: Vec<ReceiptItem>,
}

/// A single purchased line item on the receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// 1-based sequential number within the receipt.
    #[serde(rename = "numero")]
    pub number: u32,

    /// Product code (5-14 digits, EAN/internal).
    #[serde(rename = "codigo")]
    pub code: Option<String>,

    /// Product description.
    #[serde(rename = "descricao")]
    pub description: Option<String>,

    /// Unit price.
    #[serde(rename = "preco_unitario")]
    pub unit_price: Decimal,

    /// Total price for the line.
    #[serde(rename = "preco_total")]
    pub total_price: Decimal,

    /// Quantity. Derived from the price ratio, or overwritten by an
    /// explicit weight/unit token (e.g. "0.5kg").
    #[serde(rename = "quantidade")]
    pub quantity: Decimal,

    /// Discount applied to the line.
    #[serde(rename = "desconto")]
    pub discount: Decimal,
}

impl Receipt {
    /// Create a new empty receipt.
    pub fn new() -> Self {
        Self {
            access_key: None,
            cnpj: None,
            cpf: None,
            issued_at: None,
            establishment_name: None,
            item_count: 0,
            total_amount: Decimal::ZERO,
            total_discount: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            items: Vec::new(),
        }
    }

    /// Check the finalized-receipt invariants, returning any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.item_count as usize != self.items.len() {
            issues.push(format!(
                "item count ({}) differs from item list length ({})",
                self.item_count,
                self.items.len()
            ));
        }

        for (idx, item) in self.items.iter().enumerate() {
            if item.number as usize != idx + 1 {
                issues.push(format!(
                    "item at position {} has sequence number {}",
                    idx + 1,
                    item.number
                ));
            }
        }

        let calculated_total: Decimal = self.items.iter().map(|i| i.total_price).sum();
        if calculated_total.round_dp(2) != self.total_amount {
            issues.push(format!(
                "item total sum ({}) differs from total amount ({})",
                calculated_total, self.total_amount
            ));
        }

        let calculated_discount: Decimal = self.items.iter().map(|i| i.discount).sum();
        let calculated_paid = (calculated_total - calculated_discount).round_dp(2);
        if calculated_paid != self.total_paid {
            issues.push(format!(
                "derived total paid ({}) differs from total paid ({})",
                calculated_paid, self.total_paid
            ));
        }

        issues
    }
}

impl Default for Receipt {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptItem {
    /// Create a new item with the given product code and sequence number.
    pub fn new(code: impl Into<String>, number: u32) -> Self {
        Self {
            number,
            code: Some(code.into()),
            description: None,
            unit_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
            quantity: Decimal::ZERO,
            discount: Decimal::ZERO,
        }
    }
}

/// Serde helper for the `"YYYY-MM-DD HH:MM:SS"` optional datetime format.
mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        value
            .map(|s| NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
