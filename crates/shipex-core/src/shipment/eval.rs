//! Accuracy evaluation of extraction output against ground truth.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::rules::round_quantity;
use crate::models::ShipmentExtraction;

/// Fields compared by the evaluator, in report order.
pub const EVALUATED_FIELDS: [&str; 9] = [
    "product_line",
    "origin_port_code",
    "origin_port_name",
    "destination_port_code",
    "destination_port_name",
    "incoterm",
    "cargo_weight_kg",
    "cargo_cbm",
    "is_dangerous",
];

/// Accuracy counts for one field.
#[derive(Debug, Clone)]
pub struct FieldAccuracy {
    pub field: &'static str,
    pub correct: usize,
    pub total: usize,
    /// Ids of records that got this field wrong, in input order.
    pub errors: Vec<String>,
}

impl FieldAccuracy {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

/// Accuracy report over a batch of predictions.
#[derive(Debug, Clone)]
pub struct AccuracyReport {
    /// Per-field accuracy in `EVALUATED_FIELDS` order.
    pub fields: Vec<FieldAccuracy>,
    pub overall_correct: usize,
    pub overall_total: usize,
    /// Prediction ids with no matching ground truth record; these are
    /// excluded from the counts.
    pub missing_truth: Vec<String>,
}

impl AccuracyReport {
    pub fn overall_percent(&self) -> f64 {
        if self.overall_total == 0 {
            0.0
        } else {
            self.overall_correct as f64 / self.overall_total as f64 * 100.0
        }
    }
}

/// Compare predictions against ground truth, field by field.
pub fn evaluate(predictions: &[ShipmentExtraction], truth: &[ShipmentExtraction]) -> AccuracyReport {
    let truth_by_id: HashMap<&str, &ShipmentExtraction> =
        truth.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut fields: Vec<FieldAccuracy> = EVALUATED_FIELDS
        .iter()
        .map(|&field| FieldAccuracy {
            field,
            correct: 0,
            total: 0,
            errors: Vec::new(),
        })
        .collect();
    let mut overall_correct = 0;
    let mut overall_total = 0;
    let mut missing_truth = Vec::new();

    for pred in predictions {
        let Some(expected) = truth_by_id.get(pred.id.as_str()) else {
            tracing::warn!(id = %pred.id, "no ground truth for prediction");
            missing_truth.push(pred.id.clone());
            continue;
        };

        for (stats, outcome) in fields.iter_mut().zip(field_outcomes(pred, expected)) {
            stats.total += 1;
            overall_total += 1;
            if outcome {
                stats.correct += 1;
                overall_correct += 1;
            } else {
                stats.errors.push(pred.id.clone());
            }
        }
    }

    AccuracyReport {
        fields,
        overall_correct,
        overall_total,
        missing_truth,
    }
}

/// Field-by-field comparison in `EVALUATED_FIELDS` order.
fn field_outcomes(pred: &ShipmentExtraction, truth: &ShipmentExtraction) -> [bool; 9] {
    [
        pred.product_line == truth.product_line,
        eq_text_opt(&pred.origin_port_code, &truth.origin_port_code),
        eq_text_opt(&pred.origin_port_name, &truth.origin_port_name),
        eq_text_opt(&pred.destination_port_code, &truth.destination_port_code),
        eq_text_opt(&pred.destination_port_name, &truth.destination_port_name),
        eq_text(&pred.incoterm, &truth.incoterm),
        eq_quantity(pred.cargo_weight_kg, truth.cargo_weight_kg),
        eq_quantity(pred.cargo_cbm, truth.cargo_cbm),
        pred.is_dangerous == truth.is_dangerous,
    ]
}

/// Case-insensitive, whitespace-trimmed string equality.
fn eq_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn eq_text_opt(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => eq_text(a, b),
        _ => false,
    }
}

/// Quantities match when equal after rounding to two decimals.
fn eq_quantity(a: Option<Decimal>, b: Option<Decimal>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => round_quantity(a) == round_quantity(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductLine;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample(id: &str) -> ShipmentExtraction {
        ShipmentExtraction {
            id: id.to_string(),
            product_line: ProductLine::SeaImportLcl,
            origin_port_code: Some("DEHAM".to_string()),
            origin_port_name: Some("Hamburg".to_string()),
            destination_port_code: Some("INMAA".to_string()),
            destination_port_name: Some("Chennai ICD".to_string()),
            incoterm: "FOB".to_string(),
            cargo_weight_kg: Some(dec("850")),
            cargo_cbm: None,
            is_dangerous: false,
        }
    }

    #[test]
    fn test_text_comparison_is_lenient() {
        assert!(eq_text("Chennai ICD", "  chennai icd "));
        assert!(!eq_text("Chennai", "Chennai ICD"));

        assert!(eq_text_opt(&None, &None));
        assert!(!eq_text_opt(&Some("Hamburg".to_string()), &None));
    }

    #[test]
    fn test_quantity_comparison_rounds() {
        assert!(eq_quantity(Some(dec("850.004")), Some(dec("850"))));
        assert!(!eq_quantity(Some(dec("850.006")), Some(dec("850"))));
        assert!(eq_quantity(None, None));
        assert!(!eq_quantity(Some(dec("1")), None));
    }

    #[test]
    fn test_evaluate_counts_per_field() {
        let mut wrong_incoterm = sample("EMAIL_001");
        wrong_incoterm.incoterm = "CIF".to_string();
        // Case differences alone stay correct.
        wrong_incoterm.origin_port_name = Some("HAMBURG".to_string());

        let predictions = vec![wrong_incoterm, sample("EMAIL_002")];
        let truth = vec![sample("EMAIL_001"), sample("EMAIL_002")];

        let report = evaluate(&predictions, &truth);

        assert_eq!(report.overall_total, 18);
        assert_eq!(report.overall_correct, 17);

        let incoterm = &report.fields[5];
        assert_eq!(incoterm.field, "incoterm");
        assert_eq!(incoterm.correct, 1);
        assert_eq!(incoterm.total, 2);
        assert_eq!(incoterm.errors, vec!["EMAIL_001".to_string()]);
        assert_eq!(incoterm.percent(), 50.0);

        let origin_name = &report.fields[2];
        assert_eq!(origin_name.correct, 2);
    }

    #[test]
    fn test_predictions_without_truth_are_skipped() {
        let predictions = vec![sample("EMAIL_001"), sample("EMAIL_999")];
        let truth = vec![sample("EMAIL_001")];

        let report = evaluate(&predictions, &truth);

        assert_eq!(report.overall_total, 9);
        assert_eq!(report.missing_truth, vec!["EMAIL_999".to_string()]);
    }

    #[test]
    fn test_empty_report_percent() {
        let report = evaluate(&[], &[]);
        assert_eq!(report.overall_percent(), 0.0);
    }
}
