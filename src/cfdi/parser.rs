use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use rust_decimal::Decimal;

use super::{CFDI_NS, IVA_16_RATE, IVA_TAX_CODE, TFD_NS};
use crate::core::catalogs::{cfdi_use_description, compose_code, payment_form_description};
use crate::core::{InvoiceRecord, LedgerError, parse_amount};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn malformed(source_name: &str, reason: impl ToString) -> LedgerError {
    LedgerError::MalformedDocument {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse one CFDI 4.0 document into an [`InvoiceRecord`].
///
/// `source_name` is the archive-relative entry name and becomes the
/// record's `source_name`. Fails only when the content is not well-formed
/// XML; missing elements and attributes yield empty fields.
pub fn parse_cfdi(source_name: &str, content: &[u8]) -> Result<InvoiceRecord, LedgerError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = NsReader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<Frame> = Vec::new();
    let mut seen_root = false;
    let mut p = CfdiParsed::default();

    loop {
        buf.clear();
        let (resolved, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| malformed(source_name, e))?;
        let ns = Ns::of(&resolved);

        let (start, self_closing) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => {
                if path.pop().is_none() {
                    return Err(malformed(source_name, "unexpected closing tag"));
                }
                continue;
            }
            Event::Text(t) if path.is_empty() => {
                if t.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(malformed(source_name, "text outside the root element"));
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if path.is_empty() && seen_root {
            return Err(malformed(source_name, "more than one root element"));
        }
        seen_root = true;

        let ns = ns.map_err(|e| malformed(source_name, e))?;
        let attrs = Attrs::read(&start).map_err(|e| malformed(source_name, e))?;
        let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        p.element(&path, ns, &local, &attrs);
        if !self_closing {
            path.push(Frame { ns, local });
        }
    }

    if !seen_root {
        return Err(malformed(source_name, "no root element"));
    }
    if let Some(open) = path.last() {
        return Err(malformed(
            source_name,
            format!("unclosed element '{}'", open.local),
        ));
    }
    Ok(p.into_record(source_name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Cfdi,
    Tfd,
    Other,
}

impl Ns {
    fn of(resolved: &ResolveResult<'_>) -> Result<Self, String> {
        match resolved {
            ResolveResult::Bound(Namespace(uri)) if *uri == CFDI_NS.as_bytes() => Ok(Self::Cfdi),
            ResolveResult::Bound(Namespace(uri)) if *uri == TFD_NS.as_bytes() => Ok(Self::Tfd),
            ResolveResult::Unknown(prefix) => Err(format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(prefix)
            )),
            _ => Ok(Self::Other),
        }
    }
}

struct Frame {
    ns: Ns,
    local: String,
}

impl Frame {
    fn is(&self, ns: Ns, local: &str) -> bool {
        self.ns == ns && self.local == local
    }
}

struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn read(e: &BytesStart<'_>) -> Result<Self, String> {
        let mut out = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            out.push((key, value.into_owned()));
        }
        Ok(Self(out))
    }

    fn get_opt(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get(&self, key: &str) -> String {
        self.get_opt(key).unwrap_or_default().to_string()
    }
}

/// A `cfdi:Traslado` line, wherever it appears.
struct TransferLine {
    tax: String,
    rate: String,
    amount: String,
}

#[derive(Default)]
struct CfdiParsed {
    record: InvoiceRecord,
    seen_issuer: bool,
    seen_receiver: bool,
    seen_tax_summary: bool,
    seen_stamp: bool,
    /// `Impuestos/@TotalImpuestosTrasladados` of the comprobante, if declared.
    declared_transferred: Option<String>,
    transfers: Vec<TransferLine>,
    withholdings: Vec<String>,
    concepts: Vec<String>,
    related: Vec<String>,
    relation_types: Vec<String>,
}

impl CfdiParsed {
    /// Handle an opening (or self-closing) element. `path` holds its ancestors.
    fn element(&mut self, path: &[Frame], ns: Ns, local: &str, attrs: &Attrs) {
        if path.is_empty() {
            self.comprobante(attrs);
            return;
        }
        let depth = path.len();
        let parent = &path[depth - 1];
        let r = &mut self.record;

        match (ns, local) {
            (Ns::Cfdi, "Emisor") if depth == 1 && !self.seen_issuer => {
                self.seen_issuer = true;
                r.issuer_tax_id = attrs.get("Rfc");
                r.issuer_name = attrs.get("Nombre");
                r.issuer_tax_regime = attrs.get("RegimenFiscal");
            }
            (Ns::Cfdi, "Receptor") if depth == 1 && !self.seen_receiver => {
                self.seen_receiver = true;
                r.receiver_tax_id = attrs.get("Rfc");
                r.receiver_name = attrs.get("Nombre");
                r.receiver_postal_code = attrs.get("DomicilioFiscalReceptor");
                r.receiver_tax_regime = attrs.get("RegimenFiscalReceptor");
                let code = attrs.get("UsoCFDI");
                r.receiver_cfdi_use = compose_code(&code, cfdi_use_description(&code));
            }
            (Ns::Cfdi, "Impuestos") if depth == 1 && !self.seen_tax_summary => {
                self.seen_tax_summary = true;
                self.declared_transferred = attrs
                    .get_opt("TotalImpuestosTrasladados")
                    .map(str::to_string);
            }
            (Ns::Cfdi, "Concepto") if depth == 2 && parent.is(Ns::Cfdi, "Conceptos") => {
                self.concepts.push(format!(
                    "{}: {}",
                    attrs.get("Descripcion"),
                    attrs.get("Importe")
                ));
            }
            (Ns::Cfdi, "CfdiRelacionados") if depth == 1 => {
                let kind = attrs.get("TipoRelacion");
                if !kind.is_empty() && !self.relation_types.contains(&kind) {
                    self.relation_types.push(kind);
                }
            }
            (Ns::Cfdi, "CfdiRelacionado") if depth == 2 && parent.is(Ns::Cfdi, "CfdiRelacionados") => {
                let uuid = attrs.get("UUID");
                if !uuid.is_empty() {
                    self.related.push(uuid);
                }
            }
            (Ns::Cfdi, "Traslado") => self.transfers.push(TransferLine {
                tax: attrs.get("Impuesto"),
                rate: attrs.get("TasaOCuota"),
                amount: attrs.get("Importe"),
            }),
            (Ns::Cfdi, "Retencion") => self.withholdings.push(attrs.get("Importe")),
            (Ns::Tfd, "TimbreFiscalDigital") if !self.seen_stamp => {
                self.seen_stamp = true;
                r.unique_id = attrs.get("UUID");
            }
            _ => {}
        }
    }

    fn comprobante(&mut self, attrs: &Attrs) {
        let r = &mut self.record;
        r.issue_date = attrs.get("Fecha");
        r.subtotal = attrs.get("SubTotal");
        r.discount = attrs.get("Descuento");
        r.total = attrs.get("Total");
        r.payment_method = attrs.get("MetodoPago");
        let form = attrs.get("FormaPago");
        r.payment_form = compose_code(&form, payment_form_description(&form));
        r.currency = attrs.get("Moneda");
        r.exchange_rate = attrs.get("TipoCambio");
        r.cfdi_version = attrs.get("Version");
        r.series = attrs.get("Serie");
        r.folio = attrs.get("Folio");
        r.document_type = attrs.get("TipoDeComprobante");
    }

    fn into_record(self, source_name: &str) -> InvoiceRecord {
        let mut r = self.record;
        r.source_name = source_name.to_string();

        r.transferred_tax_total = match self.declared_transferred {
            Some(declared) => declared,
            None => sum_amounts(self.transfers.iter().map(|t| t.amount.as_str())).to_string(),
        };
        r.withheld_tax_total = sum_amounts(self.withholdings.iter().map(String::as_str)).to_string();

        let mut names: Vec<&str> = Vec::new();
        for t in &self.transfers {
            if !t.tax.is_empty() && !names.contains(&t.tax.as_str()) {
                names.push(&t.tax);
            }
        }
        r.tax_names = names.join(", ");

        // Last qualifying line wins.
        r.vat_16_amount = self
            .transfers
            .iter()
            .rev()
            .find(|t| t.tax == IVA_TAX_CODE && t.rate == IVA_16_RATE)
            .map(|t| t.amount.clone())
            .unwrap_or_default();

        r.line_items_summary = self.concepts.join("; ");
        r.related_uuids = self.related.join(", ");
        r.relation_type = self.relation_types.join(", ");
        r
    }
}

/// Sum amount strings; unparsable or missing amounts contribute zero.
fn sum_amounts<'a>(amounts: impl Iterator<Item = &'a str>) -> Decimal {
    amounts
        .filter_map(parse_amount)
        .fold(Decimal::ZERO, |acc, v| acc.checked_add(v).unwrap_or(acc))
}
