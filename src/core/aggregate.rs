//! Column sums over record collections.
//!
//! Aggregation never fails on bad data: values that do not coerce to a
//! decimal contribute zero. Callers that must not sum past unresolved
//! values check [`ensure_numeric`](super::ensure_numeric) first.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::error::LedgerError;
use super::numeric::{NumericField, parse_amount};
use super::types::InvoiceRecord;

/// Per-field sums, ordered like [`NumericField::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSums(BTreeMap<NumericField, Decimal>);

impl FieldSums {
    fn zeroed(fields: &[NumericField]) -> Self {
        Self(fields.iter().map(|f| (*f, Decimal::ZERO)).collect())
    }

    fn add(&mut self, record: &InvoiceRecord) {
        for (field, sum) in self.0.iter_mut() {
            if let Some(v) = parse_amount(field.value(record)) {
                // Overflow drops the contribution like any other unusable value.
                *sum = sum.checked_add(v).unwrap_or(*sum);
            }
        }
    }

    /// Sum for `field`; zero when the field was not requested.
    pub fn get(&self, field: NumericField) -> Decimal {
        self.0.get(&field).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NumericField, Decimal)> + '_ {
        self.0.iter().map(|(f, d)| (*f, *d))
    }

    pub fn fields(&self) -> Vec<NumericField> {
        self.0.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sum `fields` over `records`.
pub fn sum_fields<'a, I>(records: I, fields: &[NumericField]) -> FieldSums
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let mut sums = FieldSums::zeroed(fields);
    for record in records {
        sums.add(record);
    }
    sums
}

/// Sum fields given by column label or snake_case name.
pub fn sum_named_fields<'a, I>(records: I, names: &[&str]) -> Result<FieldSums, LedgerError>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let fields = names
        .iter()
        .map(|n| {
            NumericField::from_name(n)
                .ok_or_else(|| LedgerError::Config(format!("unknown numeric field '{n}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sum_fields(records, &fields))
}

/// A record attribute that can partition a collection for grouped sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    IssuerTaxId,
    IssuerName,
    ReceiverTaxId,
    LineItemsSummary,
    Period,
}

impl GroupKey {
    pub fn value<'a>(&self, record: &'a InvoiceRecord) -> &'a str {
        match self {
            Self::IssuerTaxId => &record.issuer_tax_id,
            Self::IssuerName => &record.issuer_name,
            Self::ReceiverTaxId => &record.receiver_tax_id,
            Self::LineItemsSummary => &record.line_items_summary,
            Self::Period => record.period_key(),
        }
    }
}

/// Sums for one distinct combination of group-key values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRow {
    /// Key values, in the order the keys were requested.
    pub key: Vec<String>,
    pub count: usize,
    pub sums: FieldSums,
}

/// One summed row per distinct key combination, sorted by key.
pub fn group_sums<'a, I>(records: I, keys: &[GroupKey], fields: &[NumericField]) -> Vec<GroupRow>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let mut groups: BTreeMap<Vec<String>, (usize, FieldSums)> = BTreeMap::new();
    for record in records {
        let key: Vec<String> = keys.iter().map(|k| k.value(record).to_string()).collect();
        let (count, sums) = groups
            .entry(key)
            .or_insert_with(|| (0, FieldSums::zeroed(fields)));
        *count += 1;
        sums.add(record);
    }
    groups
        .into_iter()
        .map(|(key, (count, sums))| GroupRow { key, count, sums })
        .collect()
}

/// Sums split by the role flag (deductible vs. not, selected vs. not).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagSummary {
    pub flagged_count: usize,
    pub flagged: FieldSums,
    pub unflagged_count: usize,
    pub unflagged: FieldSums,
}

pub fn flag_summary<'a, I>(records: I, fields: &[NumericField]) -> FlagSummary
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let mut summary = FlagSummary {
        flagged_count: 0,
        flagged: FieldSums::zeroed(fields),
        unflagged_count: 0,
        unflagged: FieldSums::zeroed(fields),
    };
    for record in records {
        if record.flag {
            summary.flagged_count += 1;
            summary.flagged.add(record);
        } else {
            summary.unflagged_count += 1;
            summary.unflagged.add(record);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rec(issuer: &str, subtotal: &str, total: &str) -> InvoiceRecord {
        let mut r = InvoiceRecord::new(format!("{issuer}.xml"));
        r.issuer_tax_id = issuer.into();
        r.issuer_name = format!("{issuer} SA");
        r.subtotal = subtotal.into();
        r.total = total.into();
        r
    }

    #[test]
    fn sums_skip_unparsable_values() {
        let records = vec![
            rec("A", "100.00", "116.00"),
            rec("B", "abc", "58.00"),
            rec("C", "", ""),
        ];
        let sums = sum_fields(&records, &[NumericField::Subtotal, NumericField::Total]);
        assert_eq!(sums.get(NumericField::Subtotal), dec!(100.00));
        assert_eq!(sums.get(NumericField::Total), dec!(174.00));
        assert_eq!(sums.get(NumericField::Discount), dec!(0));
        assert_eq!(sums.fields(), vec![NumericField::Subtotal, NumericField::Total]);
    }

    #[test]
    fn empty_collection_sums_to_zero() {
        let sums = sum_fields(&Vec::<InvoiceRecord>::new(), &NumericField::ALL);
        assert!(sums.iter().all(|(_, v)| v.is_zero()));
        assert_eq!(sums.fields().len(), 6);
    }

    #[test]
    fn named_fields() {
        let records = vec![rec("A", "10", "11.6")];
        let sums = sum_named_fields(&records, &["Sub Total", "total"]).unwrap();
        assert_eq!(sums.get(NumericField::Subtotal), dec!(10));
        assert_eq!(sums.get(NumericField::Total), dec!(11.6));
        assert!(matches!(
            sum_named_fields(&records, &["Folio"]),
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn grouped_by_issuer() {
        let records = vec![
            rec("B", "50", "58"),
            rec("A", "100", "116"),
            rec("B", "25", "29"),
        ];
        let rows = group_sums(
            &records,
            &[GroupKey::IssuerTaxId, GroupKey::IssuerName],
            &[NumericField::Total],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, vec!["A".to_string(), "A SA".to_string()]);
        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[1].key[0], "B");
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].sums.get(NumericField::Total), dec!(87));
    }

    #[test]
    fn grouped_by_period() {
        let mut a = rec("A", "1", "1");
        a.issue_date = "2024-01-05T00:00:00".into();
        let mut b = rec("A", "2", "2");
        b.issue_date = "2024-02-05T00:00:00".into();
        let c = rec("A", "4", "4");
        let rows = group_sums(&[a, b, c], &[GroupKey::Period], &[NumericField::Total]);
        let keys: Vec<_> = rows.iter().map(|r| r.key[0].as_str()).collect();
        assert_eq!(keys, ["", "2024-01", "2024-02"]);
        assert_eq!(rows[0].sums.get(NumericField::Total), dec!(4));
    }

    #[test]
    fn flag_split() {
        let mut records = vec![rec("A", "100", "116"), rec("B", "50", "58")];
        records[1].flag = false;
        let summary = flag_summary(&records, &[NumericField::Total]);
        assert_eq!(summary.flagged_count, 1);
        assert_eq!(summary.flagged.get(NumericField::Total), dec!(116));
        assert_eq!(summary.unflagged_count, 1);
        assert_eq!(summary.unflagged.get(NumericField::Total), dec!(58));
    }
}
