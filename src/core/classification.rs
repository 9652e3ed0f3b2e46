//! Question classification results and the plan derived from them.

use std::error::Error as StdError;
use std::fmt;

use tracing::warn;

/// Raw decision returned by the classifier backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassificationResult {
    pub explanation_needed: bool,
    pub visualization_needed: bool,
    pub animation_spec: Option<String>,
}

/// What the orchestrator will do for one question. Built once, right after
/// classification, so nothing downstream looks at the raw flags again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// The classifier asked for neither an explanation nor a visualization.
    NoAction,
    ExplainOnly,
    ExplainAndAnimate(String),
}

/// A classification that cannot be followed as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// `visualization_needed` was set but no usable animation spec came back.
    MissingAnimationSpec,
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationError::MissingAnimationSpec => {
                write!(f, "visualization requested without an animation spec")
            }
        }
    }
}

impl StdError for ClassificationError {}

impl ClassificationResult {
    /// Strict conversion. Fails on inconsistent flag combinations.
    pub fn try_plan(&self) -> Result<Plan, ClassificationError> {
        if self.visualization_needed {
            return match self.animation_spec.as_deref().map(str::trim) {
                Some(spec) if !spec.is_empty() => Ok(Plan::ExplainAndAnimate(spec.to_string())),
                _ => Err(ClassificationError::MissingAnimationSpec),
            };
        }

        if self.explanation_needed {
            Ok(Plan::ExplainOnly)
        } else {
            Ok(Plan::NoAction)
        }
    }

    /// Lenient conversion used by the orchestrator: a malformed result is
    /// downgraded to [`Plan::ExplainOnly`] instead of failing the cycle.
    pub fn into_plan(self) -> Plan {
        match self.try_plan() {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, "downgrading malformed classification to explain-only");
                Plan::ExplainOnly
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(explain: bool, visualize: bool, spec: Option<&str>) -> ClassificationResult {
        ClassificationResult {
            explanation_needed: explain,
            visualization_needed: visualize,
            animation_spec: spec.map(str::to_string),
        }
    }

    #[test]
    fn visualization_with_spec_animates() {
        let plan = result(true, true, Some("draw spring")).into_plan();
        assert_eq!(plan, Plan::ExplainAndAnimate("draw spring".into()));
    }

    #[test]
    fn visualization_without_explanation_flag_still_animates() {
        let plan = result(false, true, Some("orbit")).into_plan();
        assert_eq!(plan, Plan::ExplainAndAnimate("orbit".into()));
    }

    #[test]
    fn missing_spec_is_an_error_and_downgrades() {
        let raw = result(true, true, None);
        assert_eq!(raw.try_plan(), Err(ClassificationError::MissingAnimationSpec));
        assert_eq!(raw.into_plan(), Plan::ExplainOnly);
    }

    #[test]
    fn blank_spec_counts_as_missing() {
        assert_eq!(result(true, true, Some("   ")).into_plan(), Plan::ExplainOnly);
    }

    #[test]
    fn explanation_only() {
        assert_eq!(result(true, false, None).into_plan(), Plan::ExplainOnly);
    }

    #[test]
    fn stray_spec_without_visualization_is_ignored() {
        assert_eq!(result(true, false, Some("unused")).into_plan(), Plan::ExplainOnly);
    }

    #[test]
    fn neither_flag_is_no_action() {
        assert_eq!(result(false, false, None).into_plan(), Plan::NoAction);
    }
}
