#![cfg(feature = "cfdi")]

use cfdi_ledger::cfdi::parse_cfdi;
use cfdi_ledger::core::*;
use rust_decimal_macros::dec;

fn cfdi(prefix: &str, root_attrs: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<{prefix}:Comprobante xmlns:{prefix}="http://www.sat.gob.mx/cfd/4" xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital" Version="4.0" {root_attrs}>
{body}
</{prefix}:Comprobante>"#
    )
}

fn transfer(prefix: &str, tax: &str, rate: &str, amount: &str) -> String {
    format!(
        r#"<{prefix}:Traslado Impuesto="{tax}" TipoFactor="Tasa" TasaOCuota="{rate}" Importe="{amount}"/>"#
    )
}

fn concept(prefix: &str, description: &str, amount: &str, taxes: &str) -> String {
    format!(
        r#"<{prefix}:Concepto Descripcion="{description}" Importe="{amount}">
  <{prefix}:Impuestos><{prefix}:Traslados>{taxes}</{prefix}:Traslados></{prefix}:Impuestos>
</{prefix}:Concepto>"#
    )
}

// --- Tax extraction ---

#[test]
fn line_sum_without_summary() {
    let body = format!(
        "<cfdi:Conceptos>{}</cfdi:Conceptos>",
        concept("cfdi", "Servicio", "100.00", &transfer("cfdi", "002", "0.160000", "16.00"))
    );
    let xml = cfdi("cfdi", r#"SubTotal="100.00" Total="116.00""#, &body);
    let r = parse_cfdi("f.xml", xml.as_bytes()).unwrap();
    assert_eq!(parse_amount(&r.transferred_tax_total), Some(dec!(16.00)));
    assert_eq!(r.vat_16_amount, "16.00");
}

#[test]
fn summary_attribute_wins() {
    let body = format!(
        r#"<cfdi:Conceptos>{}</cfdi:Conceptos>
<cfdi:Impuestos TotalImpuestosTrasladados="17.50">
  <cfdi:Traslados>{}</cfdi:Traslados>
</cfdi:Impuestos>"#,
        concept("cfdi", "Servicio", "100.00", &transfer("cfdi", "002", "0.160000", "16.00")),
        transfer("cfdi", "002", "0.160000", "16.00"),
    );
    let r = parse_cfdi("f.xml", cfdi("cfdi", "", &body).as_bytes()).unwrap();
    assert_eq!(r.transferred_tax_total, "17.50");
}

#[test]
fn non_numeric_lines_contribute_zero() {
    let taxes = transfer("cfdi", "002", "0.160000", "16.00")
        + &transfer("cfdi", "003", "0.080000", "ocho");
    let body = format!(
        "<cfdi:Conceptos>{}</cfdi:Conceptos>",
        concept("cfdi", "Mixto", "100.00", &taxes)
    );
    let r = parse_cfdi("f.xml", cfdi("cfdi", "", &body).as_bytes()).unwrap();
    assert_eq!(parse_amount(&r.transferred_tax_total), Some(dec!(16.00)));
    assert_eq!(r.tax_names, "002, 003");
}

#[test]
fn last_vat_16_line_wins() {
    let body = format!(
        "<cfdi:Conceptos>{}{}</cfdi:Conceptos>",
        concept("cfdi", "A", "10.00", &transfer("cfdi", "002", "0.160000", "1.60")),
        concept("cfdi", "B", "20.00", &transfer("cfdi", "002", "0.160000", "3.20")),
    );
    let r = parse_cfdi("f.xml", cfdi("cfdi", "", &body).as_bytes()).unwrap();
    assert_eq!(r.vat_16_amount, "3.20");
    assert_eq!(r.line_items_summary, "A: 10.00; B: 20.00");
}

#[test]
fn vat_16_requires_exact_rate() {
    let body = format!(
        "<cfdi:Conceptos>{}</cfdi:Conceptos>",
        concept("cfdi", "A", "10.00", &transfer("cfdi", "002", "0.16", "1.60")),
    );
    let r = parse_cfdi("f.xml", cfdi("cfdi", "", &body).as_bytes()).unwrap();
    assert_eq!(r.vat_16_amount, "");
}

#[test]
fn withholdings_always_summed() {
    let body = r#"<cfdi:Impuestos TotalImpuestosRetenidos="999.00">
  <cfdi:Retenciones>
    <cfdi:Retencion Impuesto="001" Importe="10.00"/>
    <cfdi:Retencion Impuesto="002" Importe="10.67"/>
  </cfdi:Retenciones>
</cfdi:Impuestos>"#;
    let r = parse_cfdi("f.xml", cfdi("cfdi", "", body).as_bytes()).unwrap();
    assert_eq!(parse_amount(&r.withheld_tax_total), Some(dec!(20.67)));
}

// --- Namespaces ---

#[test]
fn any_prefix_bound_to_cfdi_namespace() {
    let body = format!(
        r#"<c:Emisor Rfc="PRO850101XY2" Nombre="P"/>
<c:Conceptos>{}</c:Conceptos>
<c:Complemento><tfd:TimbreFiscalDigital UUID="U-1"/></c:Complemento>"#,
        concept("c", "Servicio", "100.00", &transfer("c", "002", "0.160000", "16.00"))
    );
    let r = parse_cfdi("f.xml", cfdi("c", r#"Total="116.00""#, &body).as_bytes()).unwrap();
    assert_eq!(r.issuer_tax_id, "PRO850101XY2");
    assert_eq!(r.unique_id, "U-1");
    assert_eq!(r.vat_16_amount, "16.00");
}

// --- Catalog codes ---

#[test]
fn composite_codes() {
    let xml = cfdi(
        "cfdi",
        r#"FormaPago="01""#,
        r#"<cfdi:Receptor Rfc="EMP010101AB1" UsoCFDI="ZZZ"/>"#,
    );
    let r = parse_cfdi("f.xml", xml.as_bytes()).unwrap();
    assert_eq!(r.payment_form, "01-Efectivo");
    assert_eq!(r.receiver_cfdi_use, "ZZZ");
}

// --- Malformed input ---

#[test]
fn malformed_inputs_rejected() {
    let cases: &[(&str, &[u8])] = &[
        ("plain text", b"hola mundo"),
        ("empty", b""),
        ("unclosed", br#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4">"#),
        (
            "duplicate attribute",
            br#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4" Total="1" Total="2"/>"#,
        ),
        ("unbound prefix", br#"<cfdi:Comprobante Total="1"/>"#),
        ("two roots", b"<a/><b/>"),
    ];
    for (label, input) in cases {
        let err = parse_cfdi("bad.xml", input).unwrap_err();
        assert!(
            matches!(err, LedgerError::MalformedDocument { ref source_name, .. } if source_name == "bad.xml"),
            "{label}: {err}"
        );
    }
}
