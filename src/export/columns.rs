//! Column layout shared by CSV and workbook exports.
//!
//! Headers keep the Spanish labels operators know from SAT tooling. The
//! document-type column is "Tipo Comprobante" so it never collides with
//! the bucket "Tipo" column of the combined CSV.

use crate::core::{InvoiceRecord, NumericField, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    Source,
    IssuerTaxId,
    IssuerName,
    IssuerTaxRegime,
    ReceiverTaxId,
    ReceiverName,
    ReceiverPostalCode,
    ReceiverTaxRegime,
    ReceiverCfdiUse,
    DocumentType,
    Series,
    Folio,
    IssueDate,
    Subtotal,
    Discount,
    TransferredTaxTotal,
    TaxNames,
    WithheldTaxTotal,
    Total,
    UniqueId,
    PaymentMethod,
    PaymentForm,
    Currency,
    ExchangeRate,
    CfdiVersion,
    LineItems,
    RelatedUuids,
    RelationType,
    Vat16Amount,
}

impl Column {
    pub(crate) const ALL: [Column; 29] = [
        Self::Source,
        Self::IssuerTaxId,
        Self::IssuerName,
        Self::IssuerTaxRegime,
        Self::ReceiverTaxId,
        Self::ReceiverName,
        Self::ReceiverPostalCode,
        Self::ReceiverTaxRegime,
        Self::ReceiverCfdiUse,
        Self::DocumentType,
        Self::Series,
        Self::Folio,
        Self::IssueDate,
        Self::Subtotal,
        Self::Discount,
        Self::TransferredTaxTotal,
        Self::TaxNames,
        Self::WithheldTaxTotal,
        Self::Total,
        Self::UniqueId,
        Self::PaymentMethod,
        Self::PaymentForm,
        Self::Currency,
        Self::ExchangeRate,
        Self::CfdiVersion,
        Self::LineItems,
        Self::RelatedUuids,
        Self::RelationType,
        Self::Vat16Amount,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Source => "XML",
            Self::IssuerTaxId => "Rfc Emisor",
            Self::IssuerName => "Nombre Emisor",
            Self::IssuerTaxRegime => "Régimen Fiscal Emisor",
            Self::ReceiverTaxId => "Rfc Receptor",
            Self::ReceiverName => "Nombre Receptor",
            Self::ReceiverPostalCode => "CP Receptor",
            Self::ReceiverTaxRegime => "Régimen Receptor",
            Self::ReceiverCfdiUse => "Uso Cfdi Receptor",
            Self::DocumentType => "Tipo Comprobante",
            Self::Series => "Serie",
            Self::Folio => "Folio",
            Self::IssueDate => "Fecha",
            Self::TaxNames => "Nombre Impuesto",
            Self::UniqueId => "UUID",
            Self::PaymentMethod => "Método de Pago",
            Self::PaymentForm => "Forma de Pago",
            Self::Currency => "Moneda",
            Self::ExchangeRate => "Tipo de Cambio",
            Self::CfdiVersion => "Versión",
            Self::LineItems => "Conceptos",
            Self::RelatedUuids => "Relacionados",
            Self::RelationType => "Tipo Relación",
            numeric => numeric
                .numeric()
                .map(|f| f.label())
                .unwrap_or_default(),
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// The numeric field behind this column, if any.
    pub(crate) fn numeric(&self) -> Option<NumericField> {
        match self {
            Self::Subtotal => Some(NumericField::Subtotal),
            Self::Discount => Some(NumericField::Discount),
            Self::TransferredTaxTotal => Some(NumericField::TransferredTaxTotal),
            Self::WithheldTaxTotal => Some(NumericField::WithheldTaxTotal),
            Self::Total => Some(NumericField::Total),
            Self::Vat16Amount => Some(NumericField::Vat16Amount),
            _ => None,
        }
    }

    pub(crate) fn value<'a>(&self, r: &'a InvoiceRecord) -> &'a str {
        if let Some(field) = self.numeric() {
            return field.value(r);
        }
        match self {
            Self::Source => &r.source_name,
            Self::IssuerTaxId => &r.issuer_tax_id,
            Self::IssuerName => &r.issuer_name,
            Self::IssuerTaxRegime => &r.issuer_tax_regime,
            Self::ReceiverTaxId => &r.receiver_tax_id,
            Self::ReceiverName => &r.receiver_name,
            Self::ReceiverPostalCode => &r.receiver_postal_code,
            Self::ReceiverTaxRegime => &r.receiver_tax_regime,
            Self::ReceiverCfdiUse => &r.receiver_cfdi_use,
            Self::DocumentType => &r.document_type,
            Self::Series => &r.series,
            Self::Folio => &r.folio,
            Self::IssueDate => &r.issue_date,
            Self::TaxNames => &r.tax_names,
            Self::UniqueId => &r.unique_id,
            Self::PaymentMethod => &r.payment_method,
            Self::PaymentForm => &r.payment_form,
            Self::Currency => &r.currency,
            Self::ExchangeRate => &r.exchange_rate,
            Self::CfdiVersion => &r.cfdi_version,
            Self::LineItems => &r.line_items_summary,
            Self::RelatedUuids => &r.related_uuids,
            Self::RelationType => &r.relation_type,
            _ => "",
        }
    }

    pub(crate) fn set(&self, r: &mut InvoiceRecord, value: String) {
        if let Some(field) = self.numeric() {
            *field.value_mut(r) = value;
            return;
        }
        let slot = match self {
            Self::Source => &mut r.source_name,
            Self::IssuerTaxId => &mut r.issuer_tax_id,
            Self::IssuerName => &mut r.issuer_name,
            Self::IssuerTaxRegime => &mut r.issuer_tax_regime,
            Self::ReceiverTaxId => &mut r.receiver_tax_id,
            Self::ReceiverName => &mut r.receiver_name,
            Self::ReceiverPostalCode => &mut r.receiver_postal_code,
            Self::ReceiverTaxRegime => &mut r.receiver_tax_regime,
            Self::ReceiverCfdiUse => &mut r.receiver_cfdi_use,
            Self::DocumentType => &mut r.document_type,
            Self::Series => &mut r.series,
            Self::Folio => &mut r.folio,
            Self::IssueDate => &mut r.issue_date,
            Self::TaxNames => &mut r.tax_names,
            Self::UniqueId => &mut r.unique_id,
            Self::PaymentMethod => &mut r.payment_method,
            Self::PaymentForm => &mut r.payment_form,
            Self::Currency => &mut r.currency,
            Self::ExchangeRate => &mut r.exchange_rate,
            Self::CfdiVersion => &mut r.cfdi_version,
            Self::LineItems => &mut r.line_items_summary,
            Self::RelatedUuids => &mut r.related_uuids,
            Self::RelationType => &mut r.relation_type,
            _ => return,
        };
        *slot = value;
    }
}

/// Header row for one bucket: every column, then the role flag.
pub(crate) fn header(role: Role) -> Vec<&'static str> {
    Column::ALL
        .iter()
        .map(Column::label)
        .chain(std::iter::once(role.flag_label()))
        .collect()
}

/// Render a role flag the way spreadsheets and pandas write booleans.
pub(crate) fn flag_text(flag: bool) -> &'static str {
    if flag { "True" } else { "False" }
}

/// Parse a role flag cell. Blank cells keep the ingestion default (`true`).
pub(crate) fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "falso"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique_and_resolve() {
        for c in Column::ALL {
            assert!(!c.label().is_empty(), "{c:?} has no label");
            assert_eq!(Column::from_label(c.label()), Some(c));
        }
        assert_eq!(Column::from_label("Tipo"), None);
    }

    #[test]
    fn set_then_value() {
        let mut r = InvoiceRecord::new("a.xml");
        for (i, c) in Column::ALL.iter().enumerate() {
            c.set(&mut r, format!("v{i}"));
        }
        for (i, c) in Column::ALL.iter().enumerate() {
            assert_eq!(c.value(&r), format!("v{i}"));
        }
    }

    #[test]
    fn header_ends_with_flag() {
        let h = header(Role::Received);
        assert_eq!(h[0], "XML");
        assert_eq!(h.last(), Some(&"Deducible"));
        assert_eq!(h.len(), Column::ALL.len() + 1);
    }

    #[test]
    fn flag_cells() {
        assert!(parse_flag("True"));
        assert!(parse_flag(""));
        assert!(parse_flag("1"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag(" false "));
        assert!(!parse_flag("0"));
    }
}
