//! Common regex patterns for shipment field correction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Weight patterns (matched against lower-cased bodies)
    pub static ref KG_VALUE: Regex = Regex::new(
        r"(\d+(?:,\d+)*(?:\.\d+)?)\s*kg"
    ).unwrap();

    pub static ref GROUPED_KG: Regex = Regex::new(
        r"(\d{1,3}(?:,\d{3})+)\s*(?:kg|kgs)"
    ).unwrap();

    pub static ref PLAIN_KG: Regex = Regex::new(
        r"(\d+)\s*(?:kg|kgs)"
    ).unwrap();

    // Volume patterns (RT = revenue ton)
    pub static ref RT_VALUE: Regex = Regex::new(
        r"(\d+\.?\d*)\s*rt"
    ).unwrap();

    // Paired-port patterns ("Shenzhen or Guangzhou", "Tianjin/Xingang")
    pub static ref ALTERNATIVE_PORTS: Regex = Regex::new(
        r"(\w+)\s+or\s+(\w+)"
    ).unwrap();

    pub static ref SLASH_PORTS: Regex = Regex::new(
        r"(\w+)/(\w+)"
    ).unwrap();
}
