//! Payout rule engine
//!
//! Evaluates an ordered list of payout rules against an encounter. Every rule
//! contributes one justification line to the breakdown, whether or not it
//! paid out, so identical encounters always produce identical previews.
//!
//! # Standard rules
//!
//! | Order | Rule                  | Pays                                           |
//! |-------|-----------------------|------------------------------------------------|
//! | 1     | Daily allowance       | `stay_days * daily_rate` for inpatient stays of at least `min_stay_days` |
//! | 2     | Procedure bonus       | `procedure_bonus` when a procedure code is present |
//!
//! New rules are appended after the standard ones.

use serde::{Deserialize, Serialize};

use crate::encounter::EncounterRecord;

/// Monetary constants used by the standard rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSchedule {
    /// Amount paid per day of an eligible inpatient stay
    pub daily_rate: u64,
    /// One-time amount paid when a procedure was performed
    pub procedure_bonus: u64,
    /// Minimum stay length, in days, for the daily allowance
    pub min_stay_days: u64,
}

impl Default for PayoutSchedule {
    fn default() -> Self {
        Self {
            daily_rate: 100_000,
            procedure_bonus: 300_000,
            min_stay_days: 2,
        }
    }
}

/// Outcome of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub amount: u64,
    pub justification: String,
}

/// A single payout rule
pub trait PayoutRule: Send + Sync {
    /// Short rule name used in logs
    fn name(&self) -> &'static str;

    fn evaluate(&self, encounter: &EncounterRecord, schedule: &PayoutSchedule) -> RuleOutcome;
}

/// Stay-based daily allowance for inpatient encounters
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyAllowanceRule;

impl PayoutRule for DailyAllowanceRule {
    fn name(&self) -> &'static str {
        "daily_allowance"
    }

    fn evaluate(&self, encounter: &EncounterRecord, schedule: &PayoutSchedule) -> RuleOutcome {
        if !encounter.is_inpatient() {
            return RuleOutcome {
                amount: 0,
                justification: format!(
                    "Daily allowance: not applicable to encounter class {} (0)",
                    encounter.encounter_class
                ),
            };
        }

        let days = encounter.stay_days();
        if days < schedule.min_stay_days {
            return RuleOutcome {
                amount: 0,
                justification: format!(
                    "Daily allowance: {} day stay is below the {}-day minimum (0)",
                    days, schedule.min_stay_days
                ),
            };
        }

        let amount = days.saturating_mul(schedule.daily_rate);
        RuleOutcome {
            amount,
            justification: format!(
                "Daily allowance: {} days x {} = {}",
                days, schedule.daily_rate, amount
            ),
        }
    }
}

/// One-time bonus when the encounter records a procedure
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcedureBonusRule;

impl PayoutRule for ProcedureBonusRule {
    fn name(&self) -> &'static str {
        "procedure_bonus"
    }

    fn evaluate(&self, encounter: &EncounterRecord, schedule: &PayoutSchedule) -> RuleOutcome {
        match encounter
            .procedure_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
        {
            Some(code) => RuleOutcome {
                amount: schedule.procedure_bonus,
                justification: format!(
                    "Procedure bonus: procedure {} performed = {}",
                    code, schedule.procedure_bonus
                ),
            },
            None => RuleOutcome {
                amount: 0,
                justification: "Procedure bonus: no procedure recorded (0)".to_string(),
            },
        }
    }
}

/// Result of payout evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutPreview {
    pub eligible: bool,
    pub total_payout: u64,
    /// One line per evaluated rule, in rule order
    pub breakdown: Vec<String>,
}

/// Ordered set of payout rules plus the schedule they read from
pub struct PayoutEngine {
    schedule: PayoutSchedule,
    rules: Vec<Box<dyn PayoutRule>>,
}

impl PayoutEngine {
    /// Creates an engine with the standard rules
    pub fn new(schedule: PayoutSchedule) -> Self {
        Self {
            schedule,
            rules: vec![Box::new(DailyAllowanceRule), Box::new(ProcedureBonusRule)],
        }
    }

    /// Appends a rule after the existing ones
    pub fn with_rule(mut self, rule: impl PayoutRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Evaluates every rule in order
    pub fn evaluate(&self, encounter: &EncounterRecord) -> PayoutPreview {
        let mut total_payout: u64 = 0;
        let mut breakdown = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let outcome = rule.evaluate(encounter, &self.schedule);
            tracing::trace!(rule = rule.name(), amount = outcome.amount, "payout rule evaluated");
            total_payout = total_payout.saturating_add(outcome.amount);
            breakdown.push(outcome.justification);
        }

        PayoutPreview {
            eligible: total_payout > 0,
            total_payout,
            breakdown,
        }
    }
}

impl Default for PayoutEngine {
    fn default() -> Self {
        Self::new(PayoutSchedule::default())
    }
}

impl std::fmt::Debug for PayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayoutEngine")
            .field("schedule", &self.schedule)
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inpatient(admission: &str, discharge: Option<&str>) -> EncounterRecord {
        EncounterRecord {
            encounter_class: "INPATIENT".to_string(),
            admission_date: Some(admission.to_string()),
            discharge_date: discharge.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_unparsable_dates_degrade_to_zero() {
        let engine = PayoutEngine::default();
        let preview = engine.evaluate(&inpatient("yesterday", Some("today")));
        assert_eq!(preview.total_payout, 0);
        assert!(!preview.eligible);
        assert!(preview.breakdown[0].contains("0 day stay"));
    }

    #[test]
    fn test_blank_procedure_code_is_ignored() {
        let encounter = EncounterRecord {
            procedure_code: Some("   ".to_string()),
            ..Default::default()
        };
        let preview = PayoutEngine::default().evaluate(&encounter);
        assert_eq!(preview.total_payout, 0);
        assert_eq!(preview.breakdown[1], "Procedure bonus: no procedure recorded (0)");
    }

    struct FlatFee;

    impl PayoutRule for FlatFee {
        fn name(&self) -> &'static str {
            "flat_fee"
        }

        fn evaluate(&self, _: &EncounterRecord, _: &PayoutSchedule) -> RuleOutcome {
            RuleOutcome { amount: 5, justification: "Flat fee = 5".to_string() }
        }
    }

    #[test]
    fn test_appended_rule_keeps_order() {
        let engine = PayoutEngine::default().with_rule(FlatFee);
        let preview = engine.evaluate(&EncounterRecord::default());
        assert_eq!(preview.breakdown.len(), 3);
        assert_eq!(preview.breakdown[2], "Flat fee = 5");
        assert_eq!(preview.total_payout, 5);
        assert!(preview.eligible);
    }
}
