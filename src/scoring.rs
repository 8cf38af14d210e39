use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use crate::model::{EqLevel, EqResult, RiskFlags, RiskResult, SdqResult, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubScale {
    Emotional,
    Conduct,
    Hyperactivity,
    Peer,
    Prosocial,
}

/// The fixed 25-question SDQ form: (question id, sub-scale, reverse-scored).
/// Five questions per sub-scale; reversed items are 7, 11, 14, 21 and 25.
pub const SDQ_QUESTIONS: [(u8, SubScale, bool); 25] = [
    (1, SubScale::Prosocial, false),
    (2, SubScale::Hyperactivity, false),
    (3, SubScale::Emotional, false),
    (4, SubScale::Prosocial, false),
    (5, SubScale::Conduct, false),
    (6, SubScale::Peer, false),
    (7, SubScale::Conduct, true),
    (8, SubScale::Emotional, false),
    (9, SubScale::Prosocial, false),
    (10, SubScale::Hyperactivity, false),
    (11, SubScale::Peer, true),
    (12, SubScale::Conduct, false),
    (13, SubScale::Emotional, false),
    (14, SubScale::Peer, true),
    (15, SubScale::Hyperactivity, false),
    (16, SubScale::Emotional, false),
    (17, SubScale::Prosocial, false),
    (18, SubScale::Conduct, false),
    (19, SubScale::Peer, false),
    (20, SubScale::Prosocial, false),
    (21, SubScale::Hyperactivity, true),
    (22, SubScale::Conduct, false),
    (23, SubScale::Peer, false),
    (24, SubScale::Emotional, false),
    (25, SubScale::Hyperactivity, true),
];

#[derive(Debug, Clone, Serialize)]
pub struct ScoreError {
    pub code: String,
    pub message: String,
}

impl ScoreError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// EQ classification cutoffs over the three 1-4 sliders. The form variant of
/// the original uses strictly-above 11 for HIGH and strictly-below 7 for
/// NEEDS_IMPROVEMENT; kept as a value so callers never hardcode the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqThresholds {
    pub high_above: u32,
    pub low_below: u32,
}

impl Default for EqThresholds {
    fn default() -> Self {
        Self {
            high_above: 11,
            low_below: 7,
        }
    }
}

/// Reverse-scored transform over the 0..=2 response levels: 0<->2, 1 fixed.
pub fn reverse_level(level: u8) -> u8 {
    match level {
        0 => 2,
        2 => 0,
        other => other,
    }
}

pub fn classify_difficulties(total: u32) -> Status {
    if total >= 20 {
        Status::Problem
    } else if total >= 16 {
        Status::Risk
    } else {
        Status::Normal
    }
}

pub fn classify_eq(total: u32, thresholds: &EqThresholds) -> EqLevel {
    if total > thresholds.high_above {
        EqLevel::High
    } else if total < thresholds.low_below {
        EqLevel::NeedsImprovement
    } else {
        EqLevel::Normal
    }
}

pub fn classify_risk(count: u32) -> Status {
    if count >= 3 {
        Status::Problem
    } else if count >= 1 {
        Status::Risk
    } else {
        Status::Normal
    }
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}

/// Scores a full SDQ submission. All 25 questions must carry a response in
/// 0..=2; a partial or out-of-range submission is rejected before anything
/// is computed.
pub fn score_sdq(answers: &HashMap<u8, u8>) -> Result<SdqResult, ScoreError> {
    for (id, _, _) in SDQ_QUESTIONS.iter() {
        match answers.get(id) {
            None => {
                return Err(ScoreError::new(
                    "incomplete_input",
                    format!("question {} has no response; all 25 are required", id),
                ))
            }
            Some(level) if *level > 2 => {
                return Err(ScoreError::new(
                    "bad_params",
                    format!("question {} response must be 0, 1 or 2", id),
                ))
            }
            Some(_) => {}
        }
    }

    let mut emotional = 0u32;
    let mut conduct = 0u32;
    let mut hyperactivity = 0u32;
    let mut peer = 0u32;
    let mut prosocial = 0u32;

    for (id, scale, reverse) in SDQ_QUESTIONS.iter() {
        let raw = answers[id];
        let val = if *reverse { reverse_level(raw) } else { raw } as u32;
        match scale {
            SubScale::Emotional => emotional += val,
            SubScale::Conduct => conduct += val,
            SubScale::Hyperactivity => hyperactivity += val,
            SubScale::Peer => peer += val,
            SubScale::Prosocial => prosocial += val,
        }
    }

    let total_difficulties = emotional + conduct + hyperactivity + peer;
    Ok(SdqResult {
        emotional,
        conduct,
        hyperactivity,
        peer,
        prosocial,
        total_difficulties,
        status: classify_difficulties(total_difficulties),
        updated_at: now_stamp(),
    })
}

pub fn score_eq(good: u32, smart: u32, happy: u32, thresholds: &EqThresholds) -> EqResult {
    let total = good + smart + happy;
    EqResult {
        good,
        smart,
        happy,
        total,
        level: classify_eq(total, thresholds),
        updated_at: now_stamp(),
    }
}

pub fn score_risk(flags: RiskFlags) -> RiskResult {
    RiskResult {
        flags,
        status: classify_risk(flags.count_true()),
        updated_at: now_stamp(),
    }
}
