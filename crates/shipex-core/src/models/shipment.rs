//! Shipment record models for extraction output.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// LCL product line, determined from the port codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductLine {
    /// Sea import LCL (shipping into India).
    #[serde(rename = "pl_sea_import_lcl")]
    SeaImportLcl,

    /// Sea export LCL (shipping out of India).
    #[serde(rename = "pl_sea_export_lcl")]
    SeaExportLcl,
}

impl ProductLine {
    /// Parse a product line from its wire string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "pl_sea_import_lcl" => Some(ProductLine::SeaImportLcl),
            "pl_sea_export_lcl" => Some(ProductLine::SeaExportLcl),
            _ => None,
        }
    }

    /// Wire string for this product line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductLine::SeaImportLcl => "pl_sea_import_lcl",
            ProductLine::SeaExportLcl => "pl_sea_export_lcl",
        }
    }
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Working record produced by the model and rewritten by the corrector.
///
/// Deserialization is deliberately lenient: missing keys become null,
/// an unrecognized product line parses as `None` (the corrector assigns
/// the definitive value anyway) and quantities accept numeric strings.
/// A non-numeric quantity string is the one malformed input that fails
/// the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentCandidate {
    /// Email id this record belongs to. The model response does not
    /// carry it; the caller assigns it after parsing.
    #[serde(default)]
    pub id: String,

    #[serde(default, deserialize_with = "de_product_line")]
    pub product_line: Option<ProductLine>,

    #[serde(default)]
    pub origin_port_code: Option<String>,

    #[serde(default)]
    pub origin_port_name: Option<String>,

    #[serde(default)]
    pub destination_port_code: Option<String>,

    #[serde(default)]
    pub destination_port_name: Option<String>,

    /// Defaults to FOB when the model omits it.
    #[serde(default = "default_incoterm")]
    pub incoterm: String,

    #[serde(
        default,
        deserialize_with = "de_quantity",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub cargo_weight_kg: Option<Decimal>,

    #[serde(
        default,
        deserialize_with = "de_quantity",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub cargo_cbm: Option<Decimal>,

    #[serde(default)]
    pub is_dangerous: bool,
}

impl ShipmentCandidate {
    /// The fixed null-filled record substituted when the model call
    /// fails after all retries.
    pub fn fallback(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            product_line: None,
            origin_port_code: None,
            origin_port_name: None,
            destination_port_code: None,
            destination_port_name: None,
            incoterm: default_incoterm(),
            cargo_weight_kg: None,
            cargo_cbm: None,
            is_dangerous: false,
        }
    }

    /// Freeze the corrected record into the output schema.
    ///
    /// The corrector always assigns a product line, so `MissingField`
    /// here means the record skipped correction.
    pub fn into_validated(self) -> Result<ShipmentExtraction, ExtractionError> {
        let product_line = self
            .product_line
            .ok_or_else(|| ExtractionError::MissingField("product_line".to_string()))?;

        if self.incoterm.trim().is_empty() {
            return Err(ExtractionError::Validation {
                field: "incoterm".to_string(),
                reason: "must be a non-empty string".to_string(),
            });
        }

        for (field, value) in [
            ("cargo_weight_kg", self.cargo_weight_kg),
            ("cargo_cbm", self.cargo_cbm),
        ] {
            if let Some(quantity) = value {
                if quantity < Decimal::ZERO {
                    return Err(ExtractionError::Validation {
                        field: field.to_string(),
                        reason: format!("must be >= 0, got {quantity}"),
                    });
                }
            }
        }

        Ok(ShipmentExtraction {
            id: self.id,
            product_line,
            origin_port_code: self.origin_port_code,
            origin_port_name: self.origin_port_name,
            destination_port_code: self.destination_port_code,
            destination_port_name: self.destination_port_name,
            incoterm: self.incoterm,
            cargo_weight_kg: self.cargo_weight_kg,
            cargo_cbm: self.cargo_cbm,
            is_dangerous: self.is_dangerous,
        })
    }
}

/// Validated output record.
///
/// Every field is serialized, nulls included, so downstream consumers
/// always see the full schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentExtraction {
    pub id: String,

    pub product_line: ProductLine,

    pub origin_port_code: Option<String>,

    pub origin_port_name: Option<String>,

    pub destination_port_code: Option<String>,

    pub destination_port_name: Option<String>,

    #[serde(default = "default_incoterm")]
    pub incoterm: String,

    #[serde(
        default,
        deserialize_with = "de_quantity",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub cargo_weight_kg: Option<Decimal>,

    #[serde(
        default,
        deserialize_with = "de_quantity",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub cargo_cbm: Option<Decimal>,

    #[serde(default)]
    pub is_dangerous: bool,
}

pub(crate) fn default_incoterm() -> String {
    "FOB".to_string()
}

/// Deserialize an optional quantity from a number, a numeric string, or
/// null. Non-numeric strings are a contract violation and fail.
fn de_quantity<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct QuantityVisitor;

    impl<'de> serde::de::Visitor<'de> for QuantityVisitor {
        type Value = Option<Decimal>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string, or null")
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Decimal::try_from(v).map(Some).map_err(E::custom)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(Decimal::from(v)))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(Decimal::from(v)))
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Decimal::from_str(v.trim()).map(Some).map_err(E::custom)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(QuantityVisitor)
        }
    }

    deserializer.deserialize_any(QuantityVisitor)
}

fn de_product_line<'de, D>(deserializer: D) -> Result<Option<ProductLine>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ProductLine::from_str))
}
