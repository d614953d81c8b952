//! Moderation decision table and classifier verdict rules.
//!
//! The orchestrator in `gigboard-api` feeds this module the runtime
//! moderation flags and (when automatic moderation ran) the classifier
//! verdict, and gets back the status a freshly-submitted post should
//! receive. The functions here are pure so the full decision table is
//! unit-testable without a database or network.

use crate::status::PostStatus;

/// A category score above this threshold rejects the text.
pub const REJECT_THRESHOLD: f64 = 0.5;

/// Outcome of a classifier run over a post's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierVerdict {
    /// No category score exceeded [`REJECT_THRESHOLD`].
    Pass,
    /// At least one category score exceeded [`REJECT_THRESHOLD`].
    Fail,
}

/// Runtime moderation flags, read from the site configuration.
#[derive(Debug, Clone, Copy)]
pub struct ModerationFlags {
    pub auto_moderation_enabled: bool,
    pub manual_approval_required: bool,
}

/// Reduce per-category risk scores to a verdict.
pub fn verdict_from_scores<'a, I>(scores: I) -> ClassifierVerdict
where
    I: IntoIterator<Item = &'a f64>,
{
    let has_violation = scores.into_iter().any(|score| *score > REJECT_THRESHOLD);
    if has_violation {
        ClassifierVerdict::Fail
    } else {
        ClassifierVerdict::Pass
    }
}

/// Compute the status a Draft post receives after evaluation.
///
/// | auto | manual | behavior |
/// |---|---|---|
/// | false | false | Published |
/// | false | true | PendingManualReview |
/// | true | false | pass: Published, fail: Rejected |
/// | true | true | pass: PendingManualReview, fail: Rejected |
///
/// `verdict` is only consulted when `auto_moderation_enabled` is set;
/// callers that skipped the classifier pass [`ClassifierVerdict::Pass`].
pub fn next_status(flags: ModerationFlags, verdict: ClassifierVerdict) -> PostStatus {
    if flags.auto_moderation_enabled && verdict == ClassifierVerdict::Fail {
        return PostStatus::Rejected;
    }
    if flags.manual_approval_required {
        PostStatus::PendingManualReview
    } else {
        PostStatus::Published
    }
}

/// The status a post falls back to when the classifier call errors or
/// times out: human review, never auto-publish, never stuck in Draft.
pub fn fail_safe_status() -> PostStatus {
    PostStatus::PendingManualReview
}

/// Build the text block submitted to the classifier.
pub fn classifier_input(title: &str, description: &str) -> String {
    format!("{title}\n{description}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(auto: bool, manual: bool) -> ModerationFlags {
        ModerationFlags {
            auto_moderation_enabled: auto,
            manual_approval_required: manual,
        }
    }

    #[test]
    fn test_no_moderation_publishes() {
        assert_eq!(
            next_status(flags(false, false), ClassifierVerdict::Pass),
            PostStatus::Published
        );
        // Verdict is ignored when auto moderation is off.
        assert_eq!(
            next_status(flags(false, false), ClassifierVerdict::Fail),
            PostStatus::Published
        );
    }

    #[test]
    fn test_manual_only_routes_to_review() {
        assert_eq!(
            next_status(flags(false, true), ClassifierVerdict::Pass),
            PostStatus::PendingManualReview
        );
        assert_eq!(
            next_status(flags(false, true), ClassifierVerdict::Fail),
            PostStatus::PendingManualReview
        );
    }

    #[test]
    fn test_auto_only_publishes_or_rejects() {
        assert_eq!(
            next_status(flags(true, false), ClassifierVerdict::Pass),
            PostStatus::Published
        );
        assert_eq!(
            next_status(flags(true, false), ClassifierVerdict::Fail),
            PostStatus::Rejected
        );
    }

    #[test]
    fn test_hybrid_reviews_on_pass_rejects_on_fail() {
        assert_eq!(
            next_status(flags(true, true), ClassifierVerdict::Pass),
            PostStatus::PendingManualReview
        );
        assert_eq!(
            next_status(flags(true, true), ClassifierVerdict::Fail),
            PostStatus::Rejected
        );
    }

    #[test]
    fn test_verdict_threshold_is_exclusive() {
        assert_eq!(
            verdict_from_scores([0.0, 0.2, 0.5].iter()),
            ClassifierVerdict::Pass
        );
        assert_eq!(
            verdict_from_scores([0.0, 0.9].iter()),
            ClassifierVerdict::Fail
        );
        assert_eq!(
            verdict_from_scores(std::iter::empty::<&f64>()),
            ClassifierVerdict::Pass
        );
    }

    #[test]
    fn test_fail_safe_routes_to_human_review() {
        assert_eq!(fail_safe_status(), PostStatus::PendingManualReview);
    }

    #[test]
    fn test_classifier_input_joins_title_and_description() {
        assert_eq!(
            classifier_input("Plumber wanted", "Fix a leaking sink"),
            "Plumber wanted\nFix a leaking sink"
        );
    }
}
