//! Consolidated (multi-route) inquiry detection and parsing.

use rust_decimal::Decimal;

use super::patterns::KG_VALUE;
use super::quantities::{parse_decimal_with_commas, round_quantity};

/// Known destination abbreviations in consolidated route lists,
/// checked in table order against the text after each arrow.
const DESTINATION_ABBREVIATIONS: &[(&str, &str)] = &[
    ("MAA", "Chennai"),
    ("BLR", "Bangalore"),
    ("HYD", "Hyderabad"),
];

/// Whether the body is a consolidated rate inquiry: semicolon-separated
/// routes with arrow tokens, e.g. "JED→MAA ICD 1.9 cbm; DAM→BLR 600kg".
pub fn is_consolidated_inquiry(body: &str) -> bool {
    body.contains(';') && (body.contains('→') || body.contains("->"))
}

/// Destination city order from a consolidated inquiry.
///
/// Splits on ';', takes the text after the arrow in each route, and
/// matches it against the known destination abbreviations. Segments
/// matching none are skipped, so the result may be shorter than the
/// route count.
pub fn consolidated_destination_order(body: &str) -> Vec<String> {
    let mut order = Vec::new();

    for route in body.split(';') {
        let dest_part = if route.contains('→') {
            route.split('→').nth(1)
        } else if route.contains("->") {
            route.split("->").nth(1)
        } else {
            None
        };
        let Some(dest_part) = dest_part else {
            continue;
        };
        let dest_part = dest_part.trim().to_uppercase();

        for &(abbrev, city) in DESTINATION_ABBREVIATIONS {
            if dest_part.contains(abbrev) {
                order.push(city.to_string());
                break;
            }
        }
    }

    order
}

/// First kg weight found anywhere in the body, thousands separators
/// stripped, rounded to two decimals. Fills the weight field when the
/// model left it empty on a multi-route inquiry.
pub fn extract_consolidated_weight(body: &str) -> Option<Decimal> {
    let body_lower = body.to_lowercase();
    let caps = KG_VALUE.captures(&body_lower)?;
    parse_decimal_with_commas(&caps[1]).map(round_quantity)
}
