//! Weight and volume detectors used by the correction steps.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{GROUPED_KG, PLAIN_KG, RT_VALUE};

/// Round a quantity to two decimal places. Midpoints round to even.
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Parse a decimal that may carry comma thousands separators.
pub(crate) fn parse_decimal_with_commas(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', "")).ok()
}

/// Volume stated in revenue tons ("2.4 RT"). RT equals CBM for LCL
/// cargo, so the value reads directly as a volume.
pub fn extract_rt_value(body_lower: &str) -> Option<Decimal> {
    let caps = RT_VALUE.captures(body_lower)?;
    Decimal::from_str(&caps[1]).ok().map(round_quantity)
}

/// Grouped-thousands weight ("3,200 KGS"), commas stripped. Catches
/// weights the model mis-parsed by dropping digits after the
/// separator.
pub fn extract_grouped_weight(body_lower: &str) -> Option<Decimal> {
    let caps = GROUPED_KG.captures(body_lower)?;
    parse_decimal_with_commas(&caps[1]).map(round_quantity)
}

/// First plain-digit kg weight, used by the lost-comma heuristic.
pub fn extract_plain_weight(body_lower: &str) -> Option<Decimal> {
    let caps = PLAIN_KG.captures(body_lower)?;
    Decimal::from_str(&caps[1]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_quantity() {
        let value = Decimal::from_str("850.456").unwrap();
        assert_eq!(round_quantity(value), Decimal::from_str("850.46").unwrap());

        // Rounding twice changes nothing.
        assert_eq!(
            round_quantity(round_quantity(value)),
            round_quantity(value)
        );
    }

    #[test]
    fn test_extract_rt_value() {
        assert_eq!(
            extract_rt_value("cargo is 2.4 rt, non-haz"),
            Some(Decimal::from_str("2.4").unwrap())
        );
        assert_eq!(
            extract_rt_value("3rt total"),
            Some(Decimal::from_str("3").unwrap())
        );
        assert_eq!(extract_rt_value("no volume given"), None);
    }

    #[test]
    fn test_extract_grouped_weight() {
        assert_eq!(
            extract_grouped_weight("weight: 3,200 kgs"),
            Some(Decimal::from_str("3200").unwrap())
        );
        assert_eq!(
            extract_grouped_weight("total 1,234,500 kg"),
            Some(Decimal::from_str("1234500").unwrap())
        );
        // Plain digits are not a grouped weight.
        assert_eq!(extract_grouped_weight("weight: 3200 kgs"), None);
    }

    #[test]
    fn test_extract_plain_weight() {
        assert_eq!(
            extract_plain_weight("around 850 kg of cargo"),
            Some(Decimal::from_str("850").unwrap())
        );
        assert_eq!(extract_plain_weight("no weight"), None);
    }
}
