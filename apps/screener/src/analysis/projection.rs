//! Display projections over validated results. Pure functions only: nothing
//! here mutates a `CandidateResult` or touches lifecycle state.

use serde::Serialize;

use crate::analysis::models::CandidateResult;

pub const STRONG_THRESHOLD: f64 = 70.0;
pub const MODERATE_THRESHOLD: f64 = 40.0;

const NO_STRENGTHS_LABEL: &str = "Not specified";
const NO_GAPS_LABEL: &str = "No major gaps";
const NO_STRONG_MATCHES_LABEL: &str = "No strong matches identified";
const NO_GAPS_IDENTIFIED: &str = "No major gaps identified";
pub const ENCOURAGEMENT_TIP: &str =
    "Continue strengthening your existing skills and practical exposure.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

/// strong ≥ 70, moderate 40–69, weak < 40. NaN falls through to weak.
pub fn classify_score(score: f64) -> ScoreBand {
    if score >= STRONG_THRESHOLD {
        ScoreBand::Strong
    } else if score >= MODERATE_THRESHOLD {
        ScoreBand::Moderate
    } else {
        ScoreBand::Weak
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Result list
// ────────────────────────────────────────────────────────────────────────────

/// A list of tags with the neutral label shown when the list is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillGroup {
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_label: Option<&'static str>,
}

impl PillGroup {
    fn new(items: &[String], empty_label: &'static str) -> Self {
        Self {
            items: items.to_vec(),
            empty_label: items.is_empty().then_some(empty_label),
        }
    }
}

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub index: usize,
    pub candidate_name: String,
    pub score_label: String,
    pub band: ScoreBand,
    pub verdict: String,
    pub strengths: PillGroup,
    pub gaps: PillGroup,
}

pub fn project_rows(results: &[CandidateResult]) -> Vec<ResultRow> {
    results
        .iter()
        .enumerate()
        .map(|(index, r)| ResultRow {
            index,
            candidate_name: r.candidate_name.clone(),
            score_label: format!("{}%", r.final_score),
            band: classify_score(r.final_score),
            verdict: r.verdict.clone(),
            strengths: PillGroup::new(&r.strengths, NO_STRENGTHS_LABEL),
            gaps: PillGroup::new(&r.gaps, NO_GAPS_LABEL),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Detail view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateDetail {
    pub candidate_name: String,
    pub assessment: String,
    pub strength_tags: PillGroup,
    pub improvement_tips: Vec<String>,
    pub email_preview: String,
}

/// Expands one result into its detail view. Tips follow the order of `gaps`
/// as received.
pub fn project_detail(result: &CandidateResult) -> CandidateDetail {
    CandidateDetail {
        candidate_name: result.candidate_name.clone(),
        assessment: result.explanation.clone(),
        strength_tags: PillGroup::new(&result.strengths, NO_STRONG_MATCHES_LABEL),
        improvement_tips: improvement_tips(&result.gaps),
        email_preview: email_preview(&result.candidate_name, &result.gaps),
    }
}

pub fn improvement_tips(gaps: &[String]) -> Vec<String> {
    if gaps.is_empty() {
        return vec![ENCOURAGEMENT_TIP.to_string()];
    }
    gaps.iter()
        .map(|gap| format!("Build hands-on projects or real-world experience related to {gap}."))
        .collect()
}

fn email_preview(candidate_name: &str, gaps: &[String]) -> String {
    let focus = if gaps.is_empty() {
        NO_GAPS_IDENTIFIED.to_string()
    } else {
        gaps.join(", ")
    };

    format!(
        "Dear {candidate_name},\n\n\
         Thank you for applying for this role. After reviewing your profile, we found that \
         while you have good potential, strengthening the following areas would improve \
         alignment with this position:\n\n\
         {focus}.\n\n\
         We encourage you to continue learning, build practical projects, and apply again \
         in the future.\n\n\
         Regards,\n\
         Recruitment Team"
    )
}
