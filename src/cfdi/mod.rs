//! CFDI 4.0 XML parsing.
//!
//! Turns one comprobante into an [`InvoiceRecord`](crate::core::InvoiceRecord).
//! Elements are matched by namespace URI, so documents using prefixes other
//! than `cfdi:` / `tfd:` parse the same.
//!
//! # Example
//!
//! ```
//! let xml = br#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4"
//!     Version="4.0" SubTotal="100.00" Total="116.00">
//!   <cfdi:Conceptos>
//!     <cfdi:Concepto Descripcion="Servicio" Importe="100.00">
//!       <cfdi:Impuestos><cfdi:Traslados>
//!         <cfdi:Traslado Impuesto="002" TasaOCuota="0.160000" Importe="16.00"/>
//!       </cfdi:Traslados></cfdi:Impuestos>
//!     </cfdi:Concepto>
//!   </cfdi:Conceptos>
//! </cfdi:Comprobante>"#;
//!
//! let record = cfdi_ledger::cfdi::parse_cfdi("factura.xml", xml).unwrap();
//! assert_eq!(record.transferred_tax_total, "16.00");
//! assert_eq!(record.vat_16_amount, "16.00");
//! ```

mod parser;

pub use parser::parse_cfdi;

/// CFDI 4.0 namespace.
pub const CFDI_NS: &str = "http://www.sat.gob.mx/cfd/4";

/// Timbre Fiscal Digital (fiscal stamp) namespace.
pub const TFD_NS: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";

/// `Impuesto` code for IVA.
pub const IVA_TAX_CODE: &str = "002";

/// `TasaOCuota` of the general 16% IVA rate, compared verbatim.
pub const IVA_16_RATE: &str = "0.160000";
