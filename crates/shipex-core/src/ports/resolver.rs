//! Context-aware port name resolution.
//!
//! A code like INMAA carries many display names in the reference
//! (gateway port, inland depots, combined depot labels). The resolver
//! picks the one name that matches how the email talks about the port.
//! Rules run in a fixed precedence order; the first rule producing a
//! name wins, and the default rule always produces one for a known
//! code.

use super::PortIndex;
use crate::shipment::rules::patterns::{ALTERNATIVE_PORTS, SLASH_PORTS};
use crate::shipment::rules::{consolidated_destination_order, is_consolidated_inquiry};

/// UN/LOCODE shared by the Chennai gateway and its inland depots.
const CHENNAI_GATEWAY_CODE: &str = "INMAA";

/// City keywords mapped to their ICD display label, checked in table
/// order. Short keys ("blr", "hyd") match the abbreviations emails
/// use for the same depot.
const CITY_ICD_LABELS: &[(&str, &str)] = &[
    ("chennai", "Chennai ICD"),
    ("bangalore", "Bangalore ICD"),
    ("blr", "Bangalore ICD"),
    ("hyderabad", "Hyderabad ICD"),
    ("hyd", "Hyderabad ICD"),
    ("mundra", "Mundra ICD"),
    ("bangkok", "Bangkok ICD"),
    ("whitefield", "ICD Whitefield"),
];

/// Everything a resolution rule can look at.
struct ResolveContext<'a> {
    code: &'a str,
    body: &'a str,
    body_lower: &'a str,
    names: &'a [String],
    is_destination: bool,
}

type ResolveRule = fn(&ResolveContext) -> Option<String>;

/// Resolution rules in precedence order.
const RULES: &[(&str, ResolveRule)] = &[
    ("consolidated_combined", consolidated_combined_name),
    ("origin_pair_combined", origin_pair_combined_name),
    ("india_gateway", india_gateway_name),
    ("icd_keyword", icd_keyword_name),
    ("shortest_simple", shortest_simple_name),
];

/// Pick the best display name for `code` given the email it appeared
/// in. Returns `None` only when the code is empty or absent from the
/// reference.
pub fn resolve_port_name(
    index: &PortIndex,
    code: &str,
    body: &str,
    is_destination: bool,
) -> Option<String> {
    if code.is_empty() {
        return None;
    }
    let names = index.names_for_code(code)?;
    let body_lower = body.to_lowercase();
    let ctx = ResolveContext {
        code,
        body,
        body_lower: &body_lower,
        names,
        is_destination,
    };

    for &(rule, resolve) in RULES {
        if let Some(name) = resolve(&ctx) {
            tracing::debug!(code, rule, name = %name, "resolved port name");
            return Some(name);
        }
    }

    // Unreachable for a known code: the default rule always matches.
    None
}

fn first_combined(names: &[String]) -> Option<String> {
    names.iter().find(|n| n.contains(" / ")).cloned()
}

/// A consolidated inquiry with two or more recognized destinations
/// expects the combined depot label, e.g. "JED→MAA ICD; DAM→BLR ICD"
/// expects "Chennai ICD / Bangalore ICD". Exact match first, then any
/// combined name.
fn consolidated_combined_name(ctx: &ResolveContext) -> Option<String> {
    if !ctx.is_destination || !is_consolidated_inquiry(ctx.body) {
        return None;
    }

    let order = consolidated_destination_order(ctx.body);
    if order.len() < 2 {
        return None;
    }

    let expected = order
        .iter()
        .map(|city| format!("{city} ICD"))
        .collect::<Vec<_>>()
        .join(" / ");

    if let Some(name) = ctx.names.iter().find(|n| **n == expected) {
        return Some(name.clone());
    }
    first_combined(ctx.names)
}

/// Origins named as a pair ("Shenzhen or Guangzhou", "Tianjin/Xingang")
/// take the combined reference name when one exists.
fn origin_pair_combined_name(ctx: &ResolveContext) -> Option<String> {
    if ctx.is_destination {
        return None;
    }
    if ALTERNATIVE_PORTS.is_match(ctx.body_lower) || SLASH_PORTS.is_match(ctx.body_lower) {
        return first_combined(ctx.names);
    }
    None
}

/// "to India" without any ICD context selects the "India (Chennai)"
/// style name on the shared Chennai gateway code.
fn india_gateway_name(ctx: &ResolveContext) -> Option<String> {
    if !ctx.is_destination || ctx.code != CHENNAI_GATEWAY_CODE {
        return None;
    }
    if ctx.body_lower.contains(" to india")
        && !ctx.body_lower.contains("icd")
        && !ctx.body_lower.contains("ppg")
    {
        return ctx
            .names
            .iter()
            .find(|n| n.to_lowercase().contains("india"))
            .cloned();
    }
    None
}

/// Emails naming a specific "City ICD" destination, or a PPG move
/// (paid-per-gateway, which implies an inland depot), take that city's
/// ICD label when the reference has it.
fn icd_keyword_name(ctx: &ResolveContext) -> Option<String> {
    if !ctx.is_destination {
        return None;
    }
    let has_icd = ctx.body_lower.contains("icd");
    if !has_icd && !ctx.body_lower.contains("ppg") {
        return None;
    }

    if has_icd {
        for &(keyword, label) in CITY_ICD_LABELS {
            if !ctx.body_lower.contains(keyword) {
                continue;
            }
            if let Some(name) = ctx.names.iter().find(|n| n.as_str() == label) {
                return Some(name.clone());
            }
            // The reference sometimes stores the word-reordered form.
            let reversed = format!("ICD {}", label.replace(" ICD", ""));
            if let Some(name) = ctx.names.iter().find(|n| **n == reversed) {
                return Some(name.clone());
            }
        }
    }

    // No keyword resolved: first simple (not combined) ICD name, with
    // Chennai preferred on shared codes.
    let simple_icd: Vec<&String> = ctx
        .names
        .iter()
        .filter(|n| n.to_lowercase().contains("icd") && !n.contains(" / "))
        .collect();

    if let Some(name) = simple_icd
        .iter()
        .find(|n| n.to_lowercase().contains("chennai"))
    {
        return Some((**name).clone());
    }
    simple_icd.first().map(|n| (*n).clone())
}

/// Default: the shortest name without a combined separator, falling
/// back to the first name on record for the code.
fn shortest_simple_name(ctx: &ResolveContext) -> Option<String> {
    ctx.names
        .iter()
        .filter(|n| !n.contains(" / "))
        .min_by_key(|n| n.len())
        .or_else(|| ctx.names.first())
        .cloned()
}
