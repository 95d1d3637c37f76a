//! Deterministic correction of model-extracted shipment records.
//!
//! The model's output is a best-effort guess; this pipeline rewrites
//! the fields that can be derived mechanically from the email body and
//! the port reference. Steps run in a fixed order and later steps may
//! overwrite earlier ones; that order is part of the contract, not an
//! accident.

use rust_decimal::Decimal;

use super::rules::{
    extract_consolidated_weight, extract_grouped_weight, extract_plain_weight, extract_rt_value,
    is_consolidated_inquiry, round_quantity,
};
use crate::models::{EmailMessage, ProductLine, ShipmentCandidate};
use crate::ports::resolver::resolve_port_name;
use crate::ports::PortIndex;

/// Inputs shared by every correction step.
struct CorrectionContext<'a> {
    body: &'a str,
    body_lower: String,
    index: &'a PortIndex,
}

type CorrectionStep = fn(&mut ShipmentCandidate, &CorrectionContext);

/// Correction steps in application order.
const STEPS: &[(&str, CorrectionStep)] = &[
    ("assign_product_line", assign_product_line),
    ("round_quantities", round_quantities),
    ("volume_from_rt", volume_from_rt),
    ("weight_from_consolidated", weight_from_consolidated),
    ("fix_grouped_weight", fix_grouped_weight),
    ("resolve_port_names", resolve_port_names),
];

/// Apply the correction pipeline to a candidate record.
///
/// Total over any well-typed input: absent fields stay null rather
/// than failing, and applying the pipeline twice yields the same
/// record as applying it once, since every correction derives from
/// the email and the index alone.
pub fn correct(
    mut record: ShipmentCandidate,
    email: &EmailMessage,
    index: &PortIndex,
) -> ShipmentCandidate {
    let ctx = CorrectionContext {
        body: &email.body,
        body_lower: email.body.to_lowercase(),
        index,
    };

    for &(step, apply) in STEPS {
        apply(&mut record, &ctx);
        tracing::trace!(step, id = %record.id, "applied correction step");
    }

    record
}

/// Treat empty strings the same as absent codes.
fn code_present(code: &Option<String>) -> Option<&str> {
    code.as_deref().filter(|c| !c.is_empty())
}

/// Zero quantities count as unset.
fn quantity_unset(value: Option<Decimal>) -> bool {
    value.is_none_or(|v| v.is_zero())
}

/// A destination in India means import, an origin in India means
/// export, anything else defaults to import.
fn assign_product_line(record: &mut ShipmentCandidate, _ctx: &CorrectionContext) {
    let dest_in =
        code_present(&record.destination_port_code).is_some_and(|c| c.starts_with("IN"));
    let origin_in = code_present(&record.origin_port_code).is_some_and(|c| c.starts_with("IN"));

    record.product_line = Some(if dest_in {
        ProductLine::SeaImportLcl
    } else if origin_in {
        ProductLine::SeaExportLcl
    } else {
        ProductLine::SeaImportLcl
    });
}

fn round_quantities(record: &mut ShipmentCandidate, _ctx: &CorrectionContext) {
    if let Some(weight) = record.cargo_weight_kg {
        record.cargo_weight_kg = Some(round_quantity(weight));
    }
    if let Some(volume) = record.cargo_cbm {
        record.cargo_cbm = Some(round_quantity(volume));
    }
}

/// A volume stated in revenue tons fills an unset CBM field.
fn volume_from_rt(record: &mut ShipmentCandidate, ctx: &CorrectionContext) {
    if !quantity_unset(record.cargo_cbm) {
        return;
    }
    if let Some(rt) = extract_rt_value(&ctx.body_lower) {
        record.cargo_cbm = Some(rt);
    }
}

/// Multi-route inquiries often carry the weight only inside the route
/// list; fill an unset weight from the first kg figure found there.
fn weight_from_consolidated(record: &mut ShipmentCandidate, ctx: &CorrectionContext) {
    if !is_consolidated_inquiry(ctx.body) || !quantity_unset(record.cargo_weight_kg) {
        return;
    }
    if let Some(weight) = extract_consolidated_weight(ctx.body) {
        if !weight.is_zero() {
            record.cargo_weight_kg = Some(weight);
        }
    }
}

/// A grouped-thousands weight in the body ("3,200 KGS") overrides the
/// extracted value unconditionally. Otherwise a weight under 10 is
/// replaced by a plain kg figure more than 100 times larger, which
/// recovers weights that lost digits at a thousands separator.
fn fix_grouped_weight(record: &mut ShipmentCandidate, ctx: &CorrectionContext) {
    if let Some(grouped) = extract_grouped_weight(&ctx.body_lower) {
        record.cargo_weight_kg = Some(grouped);
        return;
    }

    let Some(weight) = record.cargo_weight_kg else {
        return;
    };
    if weight < Decimal::from(10) {
        if let Some(parsed) = extract_plain_weight(&ctx.body_lower) {
            if parsed > weight * Decimal::from(100) {
                record.cargo_weight_kg = Some(round_quantity(parsed));
            }
        }
    }
}

/// Overwrite the model's port names with context-resolved ones. A
/// record with no code gets no name; an unknown code keeps whatever
/// name the model produced.
fn resolve_port_names(record: &mut ShipmentCandidate, ctx: &CorrectionContext) {
    match code_present(&record.origin_port_code) {
        Some(code) => {
            if let Some(name) = resolve_port_name(ctx.index, code, ctx.body, false) {
                record.origin_port_name = Some(name);
            }
        }
        None => record.origin_port_name = None,
    }

    match code_present(&record.destination_port_code) {
        Some(code) => {
            if let Some(name) = resolve_port_name(ctx.index, code, ctx.body, true) {
                record.destination_port_name = Some(name);
            }
        }
        None => record.destination_port_name = None,
    }
}
