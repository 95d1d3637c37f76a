//! Prompt templates for the extraction model.
//!
//! Three revisions are kept side by side so batch runs can be compared
//! across them: v1 is plain field extraction, v2 adds business rules
//! and port abbreviations, v3 adds edge-case handling (transshipment
//! ports, unit conversions, ICD names).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ports::PortRecord;

/// Prompt template revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVersion {
    /// Basic extraction instructions.
    V1,
    /// Business rules and port abbreviations.
    V2,
    /// Comprehensive edge-case handling.
    #[default]
    V3,
}

impl FromStr for PromptVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" => Ok(PromptVersion::V1),
            "v2" => Ok(PromptVersion::V2),
            "v3" => Ok(PromptVersion::V3),
            other => Err(format!("unknown prompt version: {other}")),
        }
    }
}

impl fmt::Display for PromptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PromptVersion::V1 => "v1",
            PromptVersion::V2 => "v2",
            PromptVersion::V3 => "v3",
        };
        f.write_str(s)
    }
}

/// Build the extraction prompt for one email.
pub fn build_extraction_prompt(
    version: PromptVersion,
    subject: &str,
    body: &str,
    records: &[PortRecord],
) -> String {
    match version {
        PromptVersion::V1 => prompt_v1(subject, body, records),
        PromptVersion::V2 => prompt_v2(subject, body, records),
        PromptVersion::V3 => prompt_v3(subject, body, records),
    }
}

fn port_examples(records: &[PortRecord], limit: usize) -> String {
    records
        .iter()
        .take(limit)
        .map(|r| format!("- {} ({})", r.name, r.code))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prompt_v1(subject: &str, body: &str, records: &[PortRecord]) -> String {
    let ports = port_examples(records, 20);

    format!(
        r#"You are an expert at extracting shipment details from freight forwarding emails.

Extract the following information from this email:

Email Subject: {subject}
Email Body: {body}

Available Port Codes (UN/LOCODE format - 5 letters: 2-letter country + 3-letter location):
{ports}
... and more ports in the reference file.

Return a JSON object with these exact fields:
- origin_port_code: 5-letter UN/LOCODE (e.g., "HKHKG") or null if not found
- origin_port_name: Port name from reference or null
- destination_port_code: 5-letter UN/LOCODE or null
- destination_port_name: Port name from reference or null
- incoterm: FOB, CIF, CFR, EXW, DDP, DAP, FCA, CPT, CIP, or DPU (default: FOB if not mentioned)
- cargo_weight_kg: Weight in kg (number or null)
- cargo_cbm: Volume in CBM (number or null)
- is_dangerous: true if mentions DG/dangerous/hazardous/Class/IMO, false otherwise

Return ONLY valid JSON, no other text. Example format:
{{"origin_port_code": "HKHKG", "origin_port_name": "Hong Kong", "destination_port_code": "INMAA", "destination_port_name": "Chennai", "incoterm": "FOB", "cargo_weight_kg": 500.0, "cargo_cbm": 5.0, "is_dangerous": false}}"#
    )
}

const V2_ABBREVIATIONS: &str = "
Common Port Abbreviations:
- SHA, CNSHA = Shanghai
- SIN, SGSIN = Singapore
- SUB, IDSUB = Surabaya
- HCM, VNSGN = Ho Chi Minh
- CPT, ZACPT = Cape Town
- HOU, USHOU = Houston
- MNL, PHMNL = Manila
- PUS, KRPUS = Busan
- JBL, AEJEA = Jebel Ali
- KEL, TWKEL = Keelung
- YOK, JPYOK = Yokohama
- HAM, DEHAM = Hamburg
- MAA, INMAA = Chennai
- BLR, INBLR = Bangalore
- HYD = Hyderabad
- HKG, HKHKG = Hong Kong
- JED, DAM, RUH, SAJED = Jeddah/Dammam/Riyadh (all use SAJED code)
- OSA, JPOSA = Osaka
- GOA, ITGOA = Genoa
- IZM, TRIZM = Izmir
- AMR, TRAMR = Ambarli
- LCH, THLCH = Laem Chabang
- BKK, THBKK = Bangkok
- NSVA, NSH, INNSA = Nhava Sheva
- MUN, INMUN = Mundra
- PKG, MYPKG = Port Klang
- DAC, BDDAC = Dhaka
- GZG, CNGZG = Guangzhou
- NSA, CNNSA = Nansha
- QIN, CNQIN = Qingdao
- SZX, CNSZX = Shenzhen
- TXG, CNTXG = Tianjin/Xingang
";

fn prompt_v2(subject: &str, body: &str, records: &[PortRecord]) -> String {
    let ports = port_examples(records, 20);

    format!(
        r#"You are an expert at extracting shipment details from freight forwarding emails.

Extract the following information from this email:

Email Subject: {subject}
Email Body: {body}

IMPORTANT RULES:
1. Body takes precedence over Subject if there are conflicts
2. If email contains multiple shipments, extract ONLY the FIRST shipment mentioned in the email body
3. Indian ports have UN/LOCODE starting with "IN" (e.g., INMAA=Chennai, INBLR=Bangalore, INNSA=Nhava Sheva, INWFD=ICD Whitefield)
4. Product line: If destination port code starts with "IN" → "pl_sea_import_lcl", if origin port code starts with "IN" → "pl_sea_export_lcl"
5. Incoterm: Default to "FOB" if not mentioned or ambiguous
6. Dangerous goods: Set is_dangerous=true if email contains: "DG", "dangerous", "hazardous", "Class" + number (e.g., Class 3), "UN" + number, "IMO", "IMDG"
7. Dangerous goods: Set is_dangerous=false if email contains negations: "non-DG", "non-hazardous", "not dangerous", "non hazardous"
8. RT (Revenue Ton): For LCL shipments, RT typically equals CBM. If only RT is mentioned (e.g., "2.4 RT"), use it as CBM value
9. Missing values should be null (not 0 or empty string)
10. Round weight and CBM to 2 decimal places

{V2_ABBREVIATIONS}

Available Port Codes (UN/LOCODE format):
{ports}
... and more ports in the reference file.

Return a JSON object with these exact fields:
- product_line: "pl_sea_import_lcl" or "pl_sea_export_lcl" (determined from port codes)
- origin_port_code: 5-letter UN/LOCODE or null
- origin_port_name: Port name from reference or null
- destination_port_code: 5-letter UN/LOCODE or null
- destination_port_name: Port name from reference or null
- incoterm: FOB, CIF, CFR, EXW, DDP, DAP, FCA, CPT, CIP, or DPU (default: FOB)
- cargo_weight_kg: Weight in kg (number rounded to 2 decimals or null)
- cargo_cbm: Volume in CBM (number rounded to 2 decimals or null)
- is_dangerous: boolean

Return ONLY valid JSON, no other text."#
    )
}

const V3_ABBREVIATIONS: &str = "
Common Port Abbreviations (use these to match port codes):
- SHA, CNSHA = Shanghai
- SIN, SGSIN = Singapore
- SUB, IDSUB = Surabaya
- HCM, SGN, VNSGN = Ho Chi Minh
- CPT, ZACPT = Cape Town
- HOU, USHOU = Houston
- LAX, USLAX = Los Angeles
- LGB, USLGB = Long Beach
- MNL, PHMNL = Manila
- PUS, KRPUS = Busan
- JBL, JEA, AEJEA = Jebel Ali
- KEL, TWKEL = Keelung
- YOK, JPYOK = Yokohama
- HAM, DEHAM = Hamburg
- MAA, INMAA = Chennai (also: Chennai ICD, ICD Chennai)
- BLR, INBLR = Bangalore ICD (also: ICD Bangalore)
- HYD, INHYD = Hyderabad ICD
- HKG, HKHKG = Hong Kong
- JED, SAJED = Jeddah
- DAM = Dammam (Saudi Arabia)
- RUH = Riyadh (Saudi Arabia)
- OSA, JPOSA = Osaka
- GOA, ITGOA = Genoa
- IZM, TRIZM = Izmir
- AMR, TRAMR = Ambarli (Istanbul)
- LCH, THLCH = Laem Chabang
- BKK, THBKK = Bangkok
- NSA, INNSA = Nhava Sheva (also: JNPT, Mumbai Port)
- MUN, INMUN = Mundra
- PKG, MYPKG = Port Klang
- CMB, LKCMB = Colombo
- DAC, BDDAC = Dhaka
- CAN, GZG, CNGZG = Guangzhou
- NSA, CNNSA = Nansha
- TAO, QIN, CNQIN = Qingdao
- SZX, CNSZX = Shenzhen
- TXG, TSN, CNTXG = Tianjin/Xingang
- WFD, INWFD = ICD Whitefield
- UKB, JPUKB = Kobe (Japan)

Special ICD Names (Indian Inland Container Depots):
- \"ICD Whitefield\" or \"Whitefield ICD\" = INWFD
- \"ICD Bangalore\" or \"Bangalore ICD\" or \"BLR ICD\" = INBLR
- \"ICD Chennai\" or \"Chennai ICD\" or \"MAA ICD\" = INMAA
- \"ICD Hyderabad\" or \"Hyderabad ICD\" or \"HYD ICD\" = INMAA (shared code with Chennai)
- \"Mundra ICD\" = INMUN
- \"Nhava Sheva\" or \"JNPT\" = INNSA
- \"Bangkok ICD\" or \"ICD Bangkok\" = THBKK
";

fn prompt_v3(subject: &str, body: &str, records: &[PortRecord]) -> String {
    let ports = port_examples(records, 25);

    format!(
        r#"You are an expert at extracting shipment details from freight forwarding emails.

Extract the following information from this email:

Email Subject: {subject}
Email Body: {body}

CRITICAL RULES (follow in order of priority):

1. **BODY OVER SUBJECT**: If Subject and Body have conflicting information (different ports, incoterms, etc.), ALWAYS use information from Body - it has more detailed context.

2. **FIRST SHIPMENT ONLY**: If email contains multiple shipments (separated by semicolons, commas, or numbered lists like "1)", "2)"), extract ONLY the FIRST shipment mentioned in the email body. Ignore all subsequent shipments.

3. **IGNORE TRANSSHIPMENT PORTS**: Ports mentioned with "via", "routed via", "transshipment", "through", "transit" are intermediate ports - NOT origin or destination. Use only the actual origin→destination pair.
   Example: "HAM to Chennai via Singapore" → origin=DEHAM, destination=INMAA (ignore Singapore)

4. **INDIA DETECTION**: Indian ports have UN/LOCODE starting with "IN" (e.g., INMAA, INBLR, INNSA, INWFD, INMUN)

5. **PRODUCT LINE**:
   - If destination port code starts with "IN" → "pl_sea_import_lcl" (importing TO India)
   - If origin port code starts with "IN" → "pl_sea_export_lcl" (exporting FROM India)

6. **INCOTERM RULES**:
   - Extract incoterm exactly as mentioned: FOB, CIF, CFR, EXW, DDP, DAP, FCA, CPT, CIP, DPU
   - Default to "FOB" only if NO incoterm is mentioned at all
   - If ambiguous (e.g., "FOB or CIF"), default to "FOB"
   - Note: FCA is a valid incoterm - extract it if mentioned

7. **DANGEROUS GOODS** (check negations FIRST):
   - If "non-DG", "non-hazardous", "not dangerous", "non hazardous" → is_dangerous=false
   - If "DG", "dangerous", "hazardous", "Class X" (number), "UN XXXX" (number), "IMO", "IMDG" → is_dangerous=true
   - No mention → is_dangerous=false

8. **RT (REVENUE TON) UNITS**: For LCL shipments, RT = CBM (volume).
   - If "X RT" is mentioned, use RT value as cargo_cbm
   - Example: "2.4 RT" → cargo_cbm=2.4, cargo_weight_kg=null (unless weight separately mentioned)

9. **UNIT CONVERSIONS**:
   - Weight in lbs → convert to kg: lbs × 0.453592, round to 2 decimals
   - Weight in tonnes/MT → convert to kg: tonnes × 1000
   - Dimensions (L×W×H) → do NOT calculate CBM, set cargo_cbm=null

10. **NULL VALUES**: Missing values should be null (not 0 or empty string). "TBD", "N/A", "to be confirmed" → null

11. **ROUNDING**: Round cargo_weight_kg and cargo_cbm to 2 decimal places

12. **PORT NAMES**: Use canonical port name from reference file for the matched code

{V3_ABBREVIATIONS}

Available Port Codes (UN/LOCODE format):
{ports}
... and more ports in the reference file.

Return a JSON object with these exact fields:
- product_line: "pl_sea_import_lcl" or "pl_sea_export_lcl"
- origin_port_code: 5-letter UN/LOCODE or null
- origin_port_name: Port name from reference or null
- destination_port_code: 5-letter UN/LOCODE or null
- destination_port_name: Port name from reference or null
- incoterm: FOB, CIF, CFR, EXW, DDP, DAP, FCA, CPT, CIP, or DPU
- cargo_weight_kg: Weight in kg (number or null)
- cargo_cbm: Volume in CBM (number or null)
- is_dangerous: boolean

Return ONLY valid JSON, no other text."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records(n: usize) -> Vec<PortRecord> {
        (0..n)
            .map(|i| PortRecord::new(format!("XXA{i:02}"), format!("Port {i}")))
            .collect()
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("v1".parse::<PromptVersion>(), Ok(PromptVersion::V1));
        assert_eq!("V3".parse::<PromptVersion>(), Ok(PromptVersion::V3));
        assert!("v9".parse::<PromptVersion>().is_err());
    }

    #[test]
    fn test_default_version() {
        assert_eq!(PromptVersion::default(), PromptVersion::V3);
        assert_eq!(PromptVersion::V2.to_string(), "v2");
    }

    #[test]
    fn test_version_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PromptVersion::V3).unwrap(),
            "\"v3\""
        );
        let parsed: PromptVersion = serde_json::from_str("\"v1\"").unwrap();
        assert_eq!(parsed, PromptVersion::V1);
    }

    #[test]
    fn test_prompt_embeds_email() {
        let prompt = build_extraction_prompt(
            PromptVersion::V1,
            "Rate request",
            "Hamburg to Chennai, 850kg",
            &records(5),
        );

        assert!(prompt.contains("Email Subject: Rate request"));
        assert!(prompt.contains("Email Body: Hamburg to Chennai, 850kg"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn test_port_example_counts() {
        let records = records(30);

        let v1 = build_extraction_prompt(PromptVersion::V1, "s", "b", &records);
        assert!(v1.contains("- Port 19 (XXA19)"));
        assert!(!v1.contains("- Port 20 (XXA20)"));

        let v3 = build_extraction_prompt(PromptVersion::V3, "s", "b", &records);
        assert!(v3.contains("- Port 24 (XXA24)"));
        assert!(!v3.contains("- Port 25 (XXA25)"));
    }

    #[test]
    fn test_later_versions_add_rules() {
        let records = records(5);

        let v2 = build_extraction_prompt(PromptVersion::V2, "s", "b", &records);
        assert!(v2.contains("IMPORTANT RULES"));
        assert!(v2.contains("Common Port Abbreviations"));

        let v3 = build_extraction_prompt(PromptVersion::V3, "s", "b", &records);
        assert!(v3.contains("CRITICAL RULES"));
        assert!(v3.contains("Special ICD Names"));
        assert!(v3.contains("IGNORE TRANSSHIPMENT PORTS"));
    }
}
