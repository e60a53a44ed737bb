use serde::{Deserialize, Serialize};

/// The operator's side of a transaction, selecting the bucket a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Invoices the operator received (operator is the receptor).
    Received,
    /// Invoices the operator issued (operator is the emisor).
    Issued,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Received, Role::Issued];

    /// Bucket label, also the sheet name of the save format.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Received => "Recibidos",
            Self::Issued => "Emitidos",
        }
    }

    /// Column header of the role flag for this bucket.
    pub fn flag_label(&self) -> &'static str {
        match self {
            Self::Received => "Deducible",
            Self::Issued => "Seleccionar",
        }
    }

    /// The tax ID on `record` that must equal the operator's own RFC.
    pub fn operator_tax_id<'a>(&self, record: &'a InvoiceRecord) -> &'a str {
        match self {
            Self::Received => &record.receiver_tax_id,
            Self::Issued => &record.issuer_tax_id,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One CFDI document, flattened to the fiscal fields the ledger works with.
///
/// Numeric fields are kept as strings exactly as extracted (or as computed
/// by the parser) and are coerced with [`parse_amount`](super::parse_amount)
/// when aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Archive-relative path of the XML entry.
    pub source_name: String,
    /// Emisor/@Rfc.
    pub issuer_tax_id: String,
    /// Emisor/@Nombre.
    pub issuer_name: String,
    /// Emisor/@RegimenFiscal.
    pub issuer_tax_regime: String,
    /// Receptor/@Rfc.
    pub receiver_tax_id: String,
    /// Receptor/@Nombre.
    pub receiver_name: String,
    /// Receptor/@DomicilioFiscalReceptor.
    pub receiver_postal_code: String,
    /// Receptor/@RegimenFiscalReceptor.
    pub receiver_tax_regime: String,
    /// Receptor/@UsoCFDI as `"<code>-<description>"`.
    pub receiver_cfdi_use: String,
    /// @TipoDeComprobante (I, E, T, N, P).
    pub document_type: String,
    pub series: String,
    pub folio: String,
    /// @Fecha, ISO-like `YYYY-MM-DDThh:mm:ss`.
    pub issue_date: String,
    pub subtotal: String,
    pub discount: String,
    pub transferred_tax_total: String,
    /// Distinct transferred tax codes (001 ISR, 002 IVA, 003 IEPS).
    pub tax_names: String,
    pub withheld_tax_total: String,
    pub total: String,
    /// Fiscal stamp UUID from the TimbreFiscalDigital complement.
    pub unique_id: String,
    pub payment_method: String,
    pub payment_form: String,
    pub currency: String,
    pub exchange_rate: String,
    pub cfdi_version: String,
    pub line_items_summary: String,
    pub related_uuids: String,
    pub relation_type: String,
    /// Importe of the IVA 16% transferred line.
    pub vat_16_amount: String,
    /// Deducible (received) or Seleccionar (issued).
    pub flag: bool,
}

impl Default for InvoiceRecord {
    fn default() -> Self {
        Self::new("")
    }
}

impl InvoiceRecord {
    /// Create an empty record for `source_name` with the role flag set.
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            issuer_tax_id: String::new(),
            issuer_name: String::new(),
            issuer_tax_regime: String::new(),
            receiver_tax_id: String::new(),
            receiver_name: String::new(),
            receiver_postal_code: String::new(),
            receiver_tax_regime: String::new(),
            receiver_cfdi_use: String::new(),
            document_type: String::new(),
            series: String::new(),
            folio: String::new(),
            issue_date: String::new(),
            subtotal: String::new(),
            discount: String::new(),
            transferred_tax_total: String::new(),
            tax_names: String::new(),
            withheld_tax_total: String::new(),
            total: String::new(),
            unique_id: String::new(),
            payment_method: String::new(),
            payment_form: String::new(),
            currency: String::new(),
            exchange_rate: String::new(),
            cfdi_version: String::new(),
            line_items_summary: String::new(),
            related_uuids: String::new(),
            relation_type: String::new(),
            vat_16_amount: String::new(),
            flag: true,
        }
    }

    /// Year-month period key (`"2024-03"`), the first 7 characters of the
    /// issue date. Dates shorter than that yield an empty key.
    pub fn period_key(&self) -> &str {
        match self.issue_date.char_indices().nth(7) {
            Some((idx, _)) => &self.issue_date[..idx],
            None if self.issue_date.chars().count() == 7 => &self.issue_date,
            None => "",
        }
    }

    /// `"RFC - Nombre"` label of the issuer, as used by issuer filters.
    pub fn issuer_label(&self) -> String {
        format!("{} - {}", self.issuer_tax_id, self.issuer_name)
    }
}
