//! Derived values computed from the form: progress, insights, follow-up prompts
//! and the shareable summary.
//!
//! Everything here is a pure function of [`FormState`]. The UI calls
//! [`derive`] once per frame and renders the result.

use crate::form::{FormState, Stage};

/// Maximum number of follow-up prompts shown at once.
pub const MAX_PROMPTS: usize = 4;

/// Shown in place of the prompt list when there is nothing left to suggest.
pub const ALL_SET_MESSAGE: &str = "You're all set! Your question covers the essentials.";

/// Placeholder for an empty field in the summary.
const EMPTY_PLACEHOLDER: &str = "—";

/// Whether an insight is encouragement or a nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Warning,
}

/// Rule-based feedback about one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub field: Stage,
    pub title: &'static str,
    pub description: &'static str,
    pub tone: Tone,
}

/// Everything the UI needs, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    pub progress: u8,
    pub insights: Vec<Insight>,
    pub recommended_prompts: Vec<&'static str>,
    pub summary: String,
}

/// Compute all derived values for the current form.
pub fn derive(form: &FormState) -> Derived {
    Derived {
        progress: progress(form),
        insights: insights(form),
        recommended_prompts: recommended_prompts(form),
        summary: summary(form),
    }
}

fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// Completion score: 25 points per field with non-whitespace content.
pub fn progress(form: &FormState) -> u8 {
    let filled = Stage::ALL
        .iter()
        .filter(|&&stage| trimmed_len(form.field(stage)) > 0)
        .count();
    ((filled as f64 / Stage::ALL.len() as f64) * 100.0).round() as u8
}

/// Per-field feedback rule: strict trimmed-length threshold plus texts.
struct InsightRule {
    min_len_exclusive: usize,
    positive: (&'static str, &'static str),
    warning: (&'static str, &'static str),
}

fn insight_rule(stage: Stage) -> InsightRule {
    match stage {
        Stage::Question => InsightRule {
            min_len_exclusive: 10,
            positive: (
                "Great clarity!",
                "Your question has enough detail for someone to jump in and help.",
            ),
            warning: (
                "Could use more detail.",
                "Try starting with who, what, when, where, why, or how.",
            ),
        },
        Stage::Background => InsightRule {
            min_len_exclusive: 20,
            positive: (
                "Solid context!",
                "Background like this helps people give a precise answer.",
            ),
            warning: (
                "Think about edge cases.",
                "List dependencies, teammates involved, and what you've already tried.",
            ),
        },
        Stage::Goal => InsightRule {
            min_len_exclusive: 10,
            positive: (
                "Thoughtful goal!",
                "Defining success lets others tailor their answer to what you need.",
            ),
            warning: (
                "Consider scope & timing.",
                "Do you need a decision, a workaround, or validation of an approach?",
            ),
        },
        Stage::Constraints => InsightRule {
            min_len_exclusive: 5,
            positive: (
                "Nice constraints!",
                "Sharing limits early cuts down on back-and-forth.",
            ),
            warning: (
                "Clarify who is impacted.",
                "Mention time limits, available resources, or approvals you need.",
            ),
        },
    }
}

/// One insight per field, always in stage order.
pub fn insights(form: &FormState) -> Vec<Insight> {
    Stage::ALL
        .iter()
        .map(|&stage| {
            let rule = insight_rule(stage);
            let (tone, (title, description)) =
                if trimmed_len(form.field(stage)) > rule.min_len_exclusive {
                    (Tone::Positive, rule.positive)
                } else {
                    (Tone::Warning, rule.warning)
                };
            Insight {
                field: stage,
                title,
                description,
                tone,
            }
        })
        .collect()
}

/// Follow-up prompts, at most [`MAX_PROMPTS`].
///
/// Emptiness here is the raw length, so whitespace-only fields count as
/// filled. Insights and progress trim instead.
pub fn recommended_prompts(form: &FormState) -> Vec<&'static str> {
    let mut prompts = Vec::new();

    if !form.question.is_empty() {
        prompts.push("What would solving this unlock for you or your team?");
        prompts.push("Who needs to sign off once you have an answer?");
    }
    if form.background.is_empty() {
        prompts.push("What have you already tried or considered?");
    }
    if form.goal.is_empty() {
        prompts.push("How will you know you're done?");
    }
    if form.constraints.is_empty() {
        prompts.push("Are there deadlines or tools that limit your options?");
    }

    prompts.truncate(MAX_PROMPTS);
    prompts
}

fn or_placeholder(text: &str) -> &str {
    if text.is_empty() {
        EMPTY_PLACEHOLDER
    } else {
        text
    }
}

/// Plain-text summary meant for pasting elsewhere.
pub fn summary(form: &FormState) -> String {
    let mut lines = vec![
        format!("🧠 Question: {}", or_placeholder(&form.question)),
        format!("📚 Background: {}", or_placeholder(&form.background)),
        format!("🎯 Desired outcome: {}", or_placeholder(&form.goal)),
        format!("⏱️ Constraints: {}", or_placeholder(&form.constraints)),
    ];
    if !form.keywords.is_empty() {
        let joined = form.keywords.iter().collect::<Vec<_>>().join(", ");
        lines.push(format!("🏷️ Keywords: {}", joined));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(question: &str, background: &str, goal: &str, constraints: &str) -> FormState {
        let mut form = FormState::new();
        form.set_question(question);
        form.set_background(background);
        form.set_goal(goal);
        form.set_constraints(constraints);
        form
    }

    #[test]
    fn test_progress_all_combinations() {
        for mask in 0u8..16 {
            let pick = |bit: u8| if mask & (1 << bit) != 0 { "x" } else { "" };
            let form = form_with(pick(0), pick(1), pick(2), pick(3));
            let expected = 25 * mask.count_ones() as u8;
            assert_eq!(progress(&form), expected, "mask {:04b}", mask);
        }
    }

    #[test]
    fn test_progress_ignores_whitespace_only_fields() {
        let form = form_with("   ", "\n\t", "goal", "");
        assert_eq!(progress(&form), 25);
    }

    #[test]
    fn test_insights_always_four_in_stage_order() {
        for form in [
            FormState::new(),
            form_with("a long enough question", "", "", "budget"),
        ] {
            let insights = insights(&form);
            assert_eq!(insights.len(), 4);
            let fields: Vec<Stage> = insights.iter().map(|i| i.field).collect();
            assert_eq!(fields, Stage::ALL.to_vec());
        }
    }

    #[test]
    fn test_insights_independent_of_stage() {
        let mut form = form_with("What is going on?", "", "", "");
        let before = insights(&form);
        form.set_stage(Stage::Constraints);
        assert_eq!(insights(&form), before);
    }

    #[test]
    fn test_question_threshold_is_strict() {
        let at = form_with("0123456789", "", "", "");
        assert_eq!(insights(&at)[0].tone, Tone::Warning);
        assert_eq!(insights(&at)[0].title, "Could use more detail.");

        let above = form_with("0123456789a", "", "", "");
        assert_eq!(insights(&above)[0].tone, Tone::Positive);
        assert_eq!(insights(&above)[0].title, "Great clarity!");
    }

    #[test]
    fn test_background_threshold_is_strict() {
        let at = form_with("", &"b".repeat(20), "", "");
        assert_eq!(insights(&at)[1].tone, Tone::Warning);
        assert_eq!(insights(&at)[1].title, "Think about edge cases.");

        let above = form_with("", &"b".repeat(21), "", "");
        assert_eq!(insights(&above)[1].tone, Tone::Positive);
        assert_eq!(insights(&above)[1].title, "Solid context!");
    }

    #[test]
    fn test_goal_threshold_is_strict() {
        let at = form_with("", "", &"g".repeat(10), "");
        assert_eq!(insights(&at)[2].tone, Tone::Warning);
        assert_eq!(insights(&at)[2].title, "Consider scope & timing.");

        let above = form_with("", "", &"g".repeat(11), "");
        assert_eq!(insights(&above)[2].tone, Tone::Positive);
        assert_eq!(insights(&above)[2].title, "Thoughtful goal!");
    }

    #[test]
    fn test_constraints_threshold_is_strict() {
        let at = form_with("", "", "", "12345");
        assert_eq!(insights(&at)[3].tone, Tone::Warning);
        assert_eq!(insights(&at)[3].title, "Clarify who is impacted.");

        let above = form_with("", "", "", "123456");
        assert_eq!(insights(&above)[3].tone, Tone::Positive);
        assert_eq!(insights(&above)[3].title, "Nice constraints!");
    }

    #[test]
    fn test_insight_threshold_uses_trimmed_length() {
        // 10 visible chars padded with spaces stays at the threshold
        let form = form_with("   0123456789   ", "", "", "");
        assert_eq!(insights(&form)[0].tone, Tone::Warning);
    }

    #[test]
    fn test_insight_threshold_counts_chars_not_bytes() {
        // 6 chars, 12 bytes
        let form = form_with("", "", "", "éééééé");
        assert_eq!(insights(&form)[3].tone, Tone::Positive);
        let form = form_with("", "", "", "ééééé");
        assert_eq!(insights(&form)[3].tone, Tone::Warning);
    }

    #[test]
    fn test_prompts_all_empty() {
        let form = FormState::new();
        assert_eq!(
            recommended_prompts(&form),
            vec![
                "What have you already tried or considered?",
                "How will you know you're done?",
                "Are there deadlines or tools that limit your options?",
            ]
        );
    }

    #[test]
    fn test_prompts_question_only_truncated_to_four() {
        let form = form_with("Why is latency high?", "", "", "");
        assert_eq!(
            recommended_prompts(&form),
            vec![
                "What would solving this unlock for you or your team?",
                "Who needs to sign off once you have an answer?",
                "What have you already tried or considered?",
                "How will you know you're done?",
            ]
        );
    }

    #[test]
    fn test_prompts_never_exceed_max() {
        for mask in 0u8..16 {
            let pick = |bit: u8| if mask & (1 << bit) != 0 { "x" } else { "" };
            let form = form_with(pick(0), pick(1), pick(2), pick(3));
            assert!(recommended_prompts(&form).len() <= MAX_PROMPTS);
        }
    }

    #[test]
    fn test_prompts_empty_when_all_filled_except_question() {
        let form = form_with("", "tried things", "a decision", "friday");
        assert!(recommended_prompts(&form).is_empty());
    }

    #[test]
    fn test_prompts_treat_whitespace_as_filled() {
        let form = form_with("", " ", " ", " ");
        assert!(recommended_prompts(&form).is_empty());
        // The same form is zero progress and all warnings
        assert_eq!(progress(&form), 0);
        assert!(insights(&form).iter().all(|i| i.tone == Tone::Warning));
    }

    #[test]
    fn test_prompts_whitespace_question_triggers_question_rule() {
        let form = form_with(" ", "bg", "goal", "none");
        assert_eq!(
            recommended_prompts(&form),
            vec![
                "What would solving this unlock for you or your team?",
                "Who needs to sign off once you have an answer?",
            ]
        );
    }

    #[test]
    fn test_summary_without_keywords() {
        let form = form_with("X", "", "", "");
        assert_eq!(
            summary(&form),
            "🧠 Question: X\n📚 Background: —\n🎯 Desired outcome: —\n⏱️ Constraints: —"
        );
    }

    #[test]
    fn test_summary_keyword_line_in_insertion_order() {
        let mut form = form_with("X", "", "", "");
        form.toggle_keyword("frontend");
        form.toggle_keyword("product");
        let summary = summary(&form);
        assert_eq!(
            summary.lines().last(),
            Some("🏷️ Keywords: frontend, product")
        );
        assert_eq!(summary.lines().count(), 5);
    }

    #[test]
    fn test_summary_keeps_whitespace_fields_verbatim() {
        let form = form_with("  ", "", "", "");
        assert!(summary(&form).starts_with("🧠 Question:   \n"));
    }

    #[test]
    fn test_derive_is_idempotent_and_does_not_mutate() {
        let mut form = form_with("Why is latency high?", "p99 spikes", "", "by Friday");
        form.toggle_keyword("infra");
        let snapshot = form.clone();

        let first = derive(&form);
        let second = derive(&form);
        assert_eq!(first, second);
        assert_eq!(form, snapshot);
        assert_eq!(first.progress, 75);
    }
}
