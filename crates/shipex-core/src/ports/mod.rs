//! Port reference index.
//!
//! Builds immutable lookup structures from the `{code, name}` reference
//! table: a canonical display name per code, a normalized name/alias to
//! code map, and the ordered set of every name variant seen for a code.
//! Built once at startup and read-only afterwards, so correction calls
//! can share it across tasks without synchronization.

pub mod resolver;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReferenceError;

/// Short aliases merged into the name lookup. Every reference name
/// whose normalized form contains the key as a substring registers all
/// of the key's aliases for that record's code. Later records overwrite
/// earlier bindings on collision.
const NAME_ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("hong kong", &["hk", "hkg"]),
    ("shanghai", &["sha"]),
    ("singapore", &["sin", "sg"]),
    ("surabaya", &["sub"]),
    ("ho chi minh", &["hcm", "sgn"]),
    ("cape town", &["cpt"]),
    ("houston", &["hou"]),
    ("manila", &["mnl"]),
    ("busan", &["pus"]),
    ("jebel ali", &["jbl", "dxb"]),
    ("keelung", &["kel"]),
    ("yokohama", &["yok"]),
    ("hamburg", &["ham"]),
    ("chennai", &["maa", "madras"]),
    ("bangalore", &["blr"]),
    ("hyderabad", &["hyd"]),
    ("guangzhou", &["can", "gzg"]),
    ("shenzhen", &["szx", "szn"]),
    ("xingang", &["txg"]),
    ("tianjin", &["tsn"]),
    ("qingdao", &["tao"]),
    ("osaka", &["osa"]),
    ("genoa", &["goa"]),
    ("izmir", &["izm"]),
    ("ambarli", &["amr"]),
    ("laem chabang", &["lch"]),
    ("bangkok", &["bkk"]),
    ("nhava sheva", &["nsva", "nsh"]),
    ("mundra", &["mun"]),
    ("colombo", &["cmb"]),
    ("port klang", &["pkg", "klg"]),
    ("jeddah", &["jed"]),
    ("dammam", &["dam"]),
    ("riyadh", &["ruh"]),
];

/// One entry in the port reference table. Many records may share a
/// code; aliases and inland depots reuse the UN/LOCODE of their
/// gateway port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    pub code: String,
    pub name: String,
}

impl PortRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Immutable lookup structures derived from the reference table.
#[derive(Debug, Clone)]
pub struct PortIndex {
    records: Vec<PortRecord>,
    canonical_by_code: HashMap<String, String>,
    code_by_name: HashMap<String, String>,
    names_by_code: HashMap<String, Vec<String>>,
}

impl PortIndex {
    /// Build the index from reference records.
    ///
    /// Duplicate codes and names are expected, not an error. The
    /// canonical name per code prefers a combined name (containing
    /// "/") over a simple one; between two names of the same kind the
    /// longer wins, and ties keep the earlier record.
    pub fn build(records: Vec<PortRecord>) -> Self {
        let mut canonical_by_code: HashMap<String, String> = HashMap::new();
        let mut code_by_name: HashMap<String, String> = HashMap::new();
        let mut names_by_code: HashMap<String, Vec<String>> = HashMap::new();

        for record in &records {
            let code = &record.code;
            let name = &record.name;

            let names = names_by_code.entry(code.clone()).or_default();
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }

            match canonical_by_code.get(code) {
                None => {
                    canonical_by_code.insert(code.clone(), name.clone());
                }
                Some(current) => {
                    let combined_new = name.contains('/');
                    let combined_current = current.contains('/');
                    let wins = (combined_new && !combined_current)
                        || (combined_new == combined_current && name.len() > current.len());
                    if wins {
                        canonical_by_code.insert(code.clone(), name.clone());
                    }
                }
            }

            let normalized = name.to_lowercase().trim().to_string();
            code_by_name.insert(normalized.clone(), code.clone());

            for &(key, aliases) in NAME_ABBREVIATIONS {
                if normalized.contains(key) {
                    for &alias in aliases {
                        code_by_name.insert(alias.to_string(), code.clone());
                    }
                }
            }
        }

        Self {
            records,
            canonical_by_code,
            code_by_name,
            names_by_code,
        }
    }

    /// Load the reference file and build the index in one step.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        Ok(Self::build(load_port_reference(path)?))
    }

    /// The reference records in file order.
    pub fn records(&self) -> &[PortRecord] {
        &self.records
    }

    /// Whether the code appears in the reference.
    pub fn contains_code(&self, code: &str) -> bool {
        self.names_by_code.contains_key(code)
    }

    /// Preferred display name for a code.
    pub fn canonical_name(&self, code: &str) -> Option<&str> {
        self.canonical_by_code.get(code).map(String::as_str)
    }

    /// Code for a name or alias. The input is normalized the same way
    /// the index normalizes reference names.
    pub fn code_for_name(&self, name: &str) -> Option<&str> {
        self.code_by_name
            .get(name.to_lowercase().trim())
            .map(String::as_str)
    }

    /// Every name variant seen for a code, insertion order preserved.
    pub fn names_for_code(&self, code: &str) -> Option<&[String]> {
        self.names_by_code.get(code).map(Vec::as_slice)
    }
}

/// Load the port reference table from a JSON file.
pub fn load_port_reference<P: AsRef<Path>>(path: P) -> Result<Vec<PortRecord>, ReferenceError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ReferenceError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let records: Vec<PortRecord> =
        serde_json::from_str(&content).map_err(|source| ReferenceError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    tracing::debug!(records = records.len(), "loaded port reference");
    Ok(records)
}
