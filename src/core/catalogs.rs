//! SAT catalog lookups for CFDI 4.0 code fields.
//!
//! Covers `c_FormaPago` (payment form) and `c_UsoCFDI` (receiver's use of
//! the invoice). Tables are sorted for binary search.

/// Description of a `c_FormaPago` code, if known.
pub fn payment_form_description(code: &str) -> Option<&'static str> {
    lookup(PAYMENT_FORMS, code)
}

/// Description of a `c_UsoCFDI` code, if known.
pub fn cfdi_use_description(code: &str) -> Option<&'static str> {
    lookup(CFDI_USES, code)
}

/// Render a code field as `"<code>-<description>"`.
///
/// Unmapped codes render bare; an empty code renders empty.
pub fn compose_code(code: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) if !code.is_empty() => format!("{code}-{desc}"),
        _ => code.to_string(),
    }
}

fn lookup(table: &'static [(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .binary_search_by(|(k, _)| (*k).cmp(code))
        .ok()
        .map(|i| table[i].1)
}

/// c_FormaPago (sorted for binary search).
static PAYMENT_FORMS: &[(&str, &str)] = &[
    ("01", "Efectivo"),
    ("02", "Cheque Nominativo"),
    ("03", "Transferencia Electrónica de Fondos SPEI"),
    ("04", "Tarjeta de Crédito"),
    ("05", "Monedero Electrónico"),
    ("06", "Dinero Electrónico"),
    ("08", "Vales de Despensa"),
    ("12", "Dación en Pago"),
    ("13", "Pago por Subrogación"),
    ("14", "Pago por Consignación"),
    ("15", "Condonación"),
    ("17", "Compensación"),
    ("23", "Novación"),
    ("24", "Confusión"),
    ("25", "Remisión de Deuda"),
    ("26", "Prescripción o Caducidad"),
    ("27", "A Satisfacción del Acreedor"),
    ("28", "Tarjeta de Débito"),
    ("29", "Tarjeta de Servicios"),
    ("30", "Aplicación de Anticipos"),
    ("31", "Intermediario Pagos"),
    ("99", "Por Definir"),
];

/// c_UsoCFDI (sorted for binary search).
static CFDI_USES: &[(&str, &str)] = &[
    ("CN01", "Nómina"),
    ("CP01", "Pagos"),
    ("D01", "Honorarios médicos, dentales y gastos hospitalarios"),
    ("D02", "Gastos médicos por incapacidad o discapacidad"),
    ("D03", "Gastos funerarios"),
    ("D04", "Donativos"),
    (
        "D05",
        "Intereses reales efectivamente pagados por créditos hipotecarios (casa habitación)",
    ),
    ("D06", "Aportaciones voluntarias al SAR"),
    ("D07", "Primas por seguros de gastos médicos"),
    ("D08", "Gastos de transportación escolar obligatoria"),
    (
        "D09",
        "Depósitos en cuentas para el ahorro, primas que tengan como base planes de pensiones",
    ),
    ("D10", "Pagos por servicios educativos (colegiaturas)"),
    ("G01", "Adquisición de mercancías"),
    ("G02", "Devoluciones, descuentos o bonificaciones"),
    ("G03", "Gastos en general"),
    ("I01", "Construcciones"),
    ("I02", "Mobiliario y equipo de oficina por inversiones"),
    ("I03", "Equipo de transporte"),
    ("I04", "Equipo de computo y accesorios"),
    ("I05", "Dados, troqueles, moldes, matrices y herramental"),
    ("I06", "Comunicaciones telefónicas"),
    ("I07", "Comunicaciones satelitales"),
    ("I08", "Otra maquinaria y equipo"),
    ("S01", "Sin efectos fiscales"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted() {
        assert!(PAYMENT_FORMS.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(CFDI_USES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_codes() {
        assert_eq!(
            payment_form_description("03"),
            Some("Transferencia Electrónica de Fondos SPEI")
        );
        assert_eq!(payment_form_description("99"), Some("Por Definir"));
        assert_eq!(cfdi_use_description("G03"), Some("Gastos en general"));
        assert_eq!(cfdi_use_description("S01"), Some("Sin efectos fiscales"));
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(payment_form_description("77"), None);
        assert_eq!(cfdi_use_description("g03"), None);
        assert_eq!(cfdi_use_description(""), None);
    }

    #[test]
    fn compose() {
        assert_eq!(
            compose_code("G03", cfdi_use_description("G03")),
            "G03-Gastos en general"
        );
        assert_eq!(compose_code("ZZ9", cfdi_use_description("ZZ9")), "ZZ9");
        assert_eq!(compose_code("", None), "");
    }
}
