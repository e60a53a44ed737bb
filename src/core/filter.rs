//! Period and attribute filters over bucket contents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::types::InvoiceRecord;

/// Conjunctive record filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Year-month key, see [`InvoiceRecord::period_key`].
    pub period: Option<String>,
    pub issuer_tax_id: Option<String>,
    /// Composite `receiver_cfdi_use` value, e.g. `"G03-Gastos en general"`.
    pub cfdi_use: Option<String>,
    /// Composite `payment_form` value.
    pub payment_form: Option<String>,
    pub flag: Option<bool>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn issuer(mut self, tax_id: impl Into<String>) -> Self {
        self.issuer_tax_id = Some(tax_id.into());
        self
    }

    pub fn cfdi_use(mut self, value: impl Into<String>) -> Self {
        self.cfdi_use = Some(value.into());
        self
    }

    pub fn payment_form(mut self, value: impl Into<String>) -> Self {
        self.payment_form = Some(value.into());
        self
    }

    pub fn flag(mut self, flag: bool) -> Self {
        self.flag = Some(flag);
        self
    }

    pub fn matches(&self, record: &InvoiceRecord) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().is_none_or(|w| w == have)
        }
        eq(&self.period, record.period_key())
            && eq(&self.issuer_tax_id, &record.issuer_tax_id)
            && eq(&self.cfdi_use, &record.receiver_cfdi_use)
            && eq(&self.payment_form, &record.payment_form)
            && self.flag.is_none_or(|f| f == record.flag)
    }

    pub fn apply<'a>(
        &'a self,
        records: &'a [InvoiceRecord],
    ) -> impl Iterator<Item = &'a InvoiceRecord> + 'a {
        records.iter().filter(move |r| self.matches(r))
    }
}

/// Distinct period keys, sorted ascending.
pub fn periods<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    records
        .into_iter()
        .map(|r| r.period_key().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The most recent non-empty period, the default selection for views.
pub fn latest_period<'a, I>(records: I) -> Option<String>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    periods(records).into_iter().rfind(|p| !p.is_empty())
}

/// Distinct `(RFC, Nombre)` issuer pairs, sorted.
pub fn issuer_options<'a, I>(records: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    records
        .into_iter()
        .map(|r| (r.issuer_tax_id.clone(), r.issuer_name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, date: &str, issuer: &str, form: &str) -> InvoiceRecord {
        let mut r = InvoiceRecord::new(name);
        r.issue_date = date.into();
        r.issuer_tax_id = issuer.into();
        r.issuer_name = format!("{issuer} SA");
        r.payment_form = form.into();
        r
    }

    fn sample() -> Vec<InvoiceRecord> {
        vec![
            rec("a.xml", "2024-02-01T00:00:00", "AAA", "03-Transferencia Electrónica de Fondos SPEI"),
            rec("b.xml", "2024-03-10T00:00:00", "BBB", "01-Efectivo"),
            rec("c.xml", "2024-03-11T00:00:00", "AAA", "01-Efectivo"),
            rec("d.xml", "", "CCC", ""),
        ]
    }

    #[test]
    fn empty_filter_matches_all() {
        let records = sample();
        assert_eq!(RecordFilter::new().apply(&records).count(), 4);
    }

    #[test]
    fn conjunctive_match() {
        let records = sample();
        let filter = RecordFilter::new().period("2024-03").payment_form("01-Efectivo");
        let hits: Vec<_> = filter.apply(&records).map(|r| r.source_name.as_str()).collect();
        assert_eq!(hits, ["b.xml", "c.xml"]);

        let filter = filter.issuer("AAA");
        let hits: Vec<_> = filter.apply(&records).map(|r| r.source_name.as_str()).collect();
        assert_eq!(hits, ["c.xml"]);
    }

    #[test]
    fn flag_filter() {
        let mut records = sample();
        records[0].flag = false;
        assert_eq!(RecordFilter::new().flag(false).apply(&records).count(), 1);
        assert_eq!(RecordFilter::new().flag(true).apply(&records).count(), 3);
    }

    #[test]
    fn empty_period_groups_together() {
        let records = sample();
        let filter = RecordFilter::new().period("");
        let hits: Vec<_> = filter.apply(&records).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source_name, "d.xml");
    }

    #[test]
    fn period_listing() {
        let records = sample();
        assert_eq!(periods(&records), ["", "2024-02", "2024-03"]);
        assert_eq!(latest_period(&records).as_deref(), Some("2024-03"));
        assert_eq!(latest_period(&records[3..]), None);
    }

    #[test]
    fn issuers_are_distinct() {
        let records = sample();
        let opts = issuer_options(&records);
        assert_eq!(opts.len(), 3);
        assert_eq!(opts[0], ("AAA".to_string(), "AAA SA".to_string()));
    }
}
