//! Numeric coercion of record fields and the operator correction workflow.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::LedgerError;
use super::types::InvoiceRecord;

/// The amount-bearing fields of an [`InvoiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Subtotal,
    Discount,
    TransferredTaxTotal,
    WithheldTaxTotal,
    Total,
    Vat16Amount,
}

impl NumericField {
    /// Every numeric field, in summary-column order.
    pub const ALL: [NumericField; 6] = [
        Self::Subtotal,
        Self::Discount,
        Self::TransferredTaxTotal,
        Self::WithheldTaxTotal,
        Self::Total,
        Self::Vat16Amount,
    ];

    /// Column header used in exports and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Subtotal => "Sub Total",
            Self::Discount => "Descuento",
            Self::TransferredTaxTotal => "Total impuesto Trasladado",
            Self::WithheldTaxTotal => "Total impuesto Retenido",
            Self::Total => "Total",
            Self::Vat16Amount => "Traslado IVA 0.160000 %",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Subtotal => "subtotal",
            Self::Discount => "discount",
            Self::TransferredTaxTotal => "transferred_tax_total",
            Self::WithheldTaxTotal => "withheld_tax_total",
            Self::Total => "total",
            Self::Vat16Amount => "vat_16_amount",
        }
    }

    /// Resolve a field from its column label or its snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.label() == name || f.key() == name)
    }

    pub fn value<'a>(&self, record: &'a InvoiceRecord) -> &'a str {
        match self {
            Self::Subtotal => &record.subtotal,
            Self::Discount => &record.discount,
            Self::TransferredTaxTotal => &record.transferred_tax_total,
            Self::WithheldTaxTotal => &record.withheld_tax_total,
            Self::Total => &record.total,
            Self::Vat16Amount => &record.vat_16_amount,
        }
    }

    pub fn value_mut<'a>(&self, record: &'a mut InvoiceRecord) -> &'a mut String {
        match self {
            Self::Subtotal => &mut record.subtotal,
            Self::Discount => &mut record.discount,
            Self::TransferredTaxTotal => &mut record.transferred_tax_total,
            Self::WithheldTaxTotal => &mut record.withheld_tax_total,
            Self::Total => &mut record.total,
            Self::Vat16Amount => &mut record.vat_16_amount,
        }
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coerce an amount string to a decimal. Accepts plain (`"116.00"`) and
/// scientific (`"1.16e2"`) notation; surrounding whitespace is ignored.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Blank values count as absent; only non-blank text that fails coercion
/// needs an operator decision.
fn needs_correction(raw: &str) -> bool {
    !raw.trim().is_empty() && parse_amount(raw).is_none()
}

/// A numeric field holding a value that could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonNumericField {
    pub field: NumericField,
    /// Originating XML entry.
    pub source_name: String,
    pub unique_id: String,
    /// The offending value, verbatim.
    pub value: String,
}

impl std::fmt::Display for NonNumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' in {} (archivo: {})",
            self.value, self.field, self.source_name
        )
    }
}

/// List every non-coercible value among `fields`, in record order.
pub fn find_non_numeric<'a, I>(records: I, fields: &[NumericField]) -> Vec<NonNumericField>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let mut issues = Vec::new();
    for record in records {
        for field in fields {
            let value = field.value(record);
            if needs_correction(value) {
                issues.push(NonNumericField {
                    field: *field,
                    source_name: record.source_name.clone(),
                    unique_id: record.unique_id.clone(),
                    value: value.to_string(),
                });
            }
        }
    }
    issues
}

/// Fail with [`LedgerError::NonNumeric`] while any value still needs correction.
pub fn ensure_numeric<'a, I>(records: I, fields: &[NumericField]) -> Result<(), LedgerError>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let issues = find_non_numeric(records, fields);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::NonNumeric(issues))
    }
}

/// An operator-supplied replacement for a non-numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub field: NumericField,
    pub source_name: String,
    pub value: Decimal,
}

impl Correction {
    pub fn new(field: NumericField, source_name: impl Into<String>, value: Decimal) -> Self {
        Self {
            field,
            source_name: source_name.into(),
            value,
        }
    }
}

/// Apply corrections to records whose `source_name` matches and whose field
/// is still non-numeric. Valid values are never overwritten.
///
/// Returns the number of values replaced.
pub fn apply_corrections(records: &mut [InvoiceRecord], corrections: &[Correction]) -> usize {
    let mut applied = 0;
    for correction in corrections {
        for record in records
            .iter_mut()
            .filter(|r| r.source_name == correction.source_name)
        {
            let slot = correction.field.value_mut(record);
            if needs_correction(slot) {
                *slot = correction.value.to_string();
                applied += 1;
            }
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(name: &str, total: &str) -> InvoiceRecord {
        let mut r = InvoiceRecord::new(name);
        r.total = total.into();
        r
    }

    #[test]
    fn parse_amount_cases() {
        assert_eq!(parse_amount("116.00"), Some(dec!(116.00)));
        assert_eq!(parse_amount(" 16.5 "), Some(dec!(16.5)));
        assert_eq!(parse_amount("-3"), Some(dec!(-3)));
        assert_eq!(parse_amount("1.5e2"), Some(dec!(150)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("12,50"), None);
    }

    #[test]
    fn field_names_resolve() {
        assert_eq!(NumericField::from_name("Total"), Some(NumericField::Total));
        assert_eq!(
            NumericField::from_name("withheld_tax_total"),
            Some(NumericField::WithheldTaxTotal)
        );
        assert_eq!(
            NumericField::from_name("Traslado IVA 0.160000 %"),
            Some(NumericField::Vat16Amount)
        );
        assert_eq!(NumericField::from_name("Folio"), None);
    }

    #[test]
    fn blank_values_are_not_issues() {
        let records = vec![record("a.xml", ""), record("b.xml", "  ")];
        assert!(find_non_numeric(&records, &NumericField::ALL).is_empty());
        assert!(ensure_numeric(&records, &NumericField::ALL).is_ok());
    }

    #[test]
    fn text_values_are_issues() {
        let records = vec![record("a.xml", "100"), record("b.xml", "cien")];
        let issues = find_non_numeric(&records, &[NumericField::Total]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].source_name, "b.xml");
        assert_eq!(issues[0].value, "cien");
        assert!(matches!(
            ensure_numeric(&records, &[NumericField::Total]),
            Err(LedgerError::NonNumeric(v)) if v.len() == 1
        ));
    }

    #[test]
    fn corrections_only_touch_bad_values() {
        let mut records = vec![record("a.xml", "100"), record("a.xml", "cien")];
        let applied = apply_corrections(
            &mut records,
            &[Correction::new(NumericField::Total, "a.xml", dec!(100.50))],
        );
        assert_eq!(applied, 1);
        assert_eq!(records[0].total, "100");
        assert_eq!(records[1].total, "100.50");
        assert!(find_non_numeric(&records, &NumericField::ALL).is_empty());
    }

    #[test]
    fn correction_for_unknown_source_is_ignored() {
        let mut records = vec![record("a.xml", "x")];
        let applied = apply_corrections(
            &mut records,
            &[Correction::new(NumericField::Total, "zzz.xml", dec!(1))],
        );
        assert_eq!(applied, 0);
        assert_eq!(records[0].total, "x");
    }
}
