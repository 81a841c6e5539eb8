//! Encounter mapping
//!
//! Normalizes the disclosed attributes of a medical-encounter credential
//! into the subset used for deduplication and payout.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use core_kernel::EncounterId;

use crate::attributes::FlatAttributes;

/// Encounter class used when the credential does not disclose one
pub const UNKNOWN_ENCOUNTER_CLASS: &str = "UNKNOWN";

/// Encounter class eligible for the stay-based allowance
pub const INPATIENT_CLASS: &str = "INPATIENT";

/// One medical visit, as disclosed by the holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterRecord {
    pub hospital_id: Option<String>,
    pub encounter_id: Option<EncounterId>,
    pub encounter_class: String,
    /// ISO 8601 date, kept verbatim even when unparsable
    pub admission_date: Option<String>,
    /// ISO 8601 date, kept verbatim even when unparsable
    pub discharge_date: Option<String>,
    pub diagnosis_code: Option<String>,
    pub diagnosis_display: Option<String>,
    pub procedure_code: Option<String>,
    pub procedure_display: Option<String>,
}

impl Default for EncounterRecord {
    fn default() -> Self {
        Self {
            hospital_id: None,
            encounter_id: None,
            encounter_class: UNKNOWN_ENCOUNTER_CLASS.to_string(),
            admission_date: None,
            discharge_date: None,
            diagnosis_code: None,
            diagnosis_display: None,
            procedure_code: None,
            procedure_display: None,
        }
    }
}

/// Returns the first non-blank value among the given keys
fn lookup(attrs: &FlatAttributes, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| attrs.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

impl EncounterRecord {
    /// Maps flat attributes to an encounter; absent attributes become `None`
    pub fn from_attributes(attrs: &FlatAttributes) -> Self {
        let encounter_class = lookup(attrs, &["encounter_class", "encounterClass"])
            .unwrap_or_else(|| UNKNOWN_ENCOUNTER_CLASS.to_string());

        Self {
            hospital_id: lookup(attrs, &["hospital_id", "hospitalId"]),
            encounter_id: lookup(attrs, &["encounter_id", "encounterId"]).map(EncounterId::new),
            encounter_class,
            admission_date: lookup(attrs, &["admission_date", "admissionDate"]),
            discharge_date: lookup(attrs, &["discharge_date", "dischargeDate"]),
            diagnosis_code: lookup(attrs, &["diagnosis_code", "diagnosisCode"]),
            diagnosis_display: lookup(attrs, &["diagnosis_display", "diagnosisDisplay"]),
            procedure_code: lookup(attrs, &["procedure_code", "procedureCode"]),
            procedure_display: lookup(attrs, &["procedure_display", "procedureDisplay"]),
        }
    }

    /// Exact, case-sensitive match on the disclosed class
    pub fn is_inpatient(&self) -> bool {
        self.encounter_class == INPATIENT_CLASS
    }

    /// Stay length in days, inclusive of both ends
    ///
    /// A missing discharge date counts as a same-day discharge. Missing or
    /// unparsable dates, and discharges before admission, yield zero.
    pub fn stay_days(&self) -> u64 {
        let Some(admitted) = self.admission_date.as_deref().and_then(parse_date) else {
            return 0;
        };
        let discharged = match self.discharge_date.as_deref() {
            None => admitted,
            Some(raw) => match parse_date(raw) {
                Some(date) => date,
                None => return 0,
            },
        };

        let days = (discharged - admitted).num_days() + 1;
        u64::try_from(days).unwrap_or(0)
    }
}

/// Parses `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}
