//! Thread-local analysis context.
//!
//! Records which phase of a run, and which API, the current thread is
//! working on. Rayon workers each carry their own context; the engine sets
//! the phase on the thread driving the run and the resolvers set the API on
//! whichever worker picks up the item. Guards restore the previous context
//! on drop so nesting works.

use crate::core::ApiKey;
use std::cell::RefCell;

thread_local! {
    static CURRENT_CONTEXT: RefCell<AnalysisContext> =
        const { RefCell::new(AnalysisContext::new()) };
}

/// Snapshot of what the current thread is doing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisContext {
    pub service: Option<String>,
    pub phase: Option<AnalysisPhase>,
    pub current_api: Option<ApiKey>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            service: None,
            phase: None,
            current_api: None,
        }
    }
}

/// Stages of one reconciliation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Entity validation and scope partitioning
    Validation,
    /// Baseline scenario to test matching
    CoverageResolution,
    /// Forward/reverse completeness layers and policy adjustment
    CompletenessAnalysis,
    /// Orphan classification, gap sorting, summary metrics
    Aggregation,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::CoverageResolution => write!(f, "coverage_resolution"),
            Self::CompletenessAnalysis => write!(f, "completeness_analysis"),
            Self::Aggregation => write!(f, "aggregation"),
        }
    }
}

/// Restores the previous context when dropped.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update(apply: impl FnOnce(&mut AnalysisContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

#[must_use]
pub fn set_service(service: Option<&str>) -> ContextGuard {
    update(|ctx| ctx.service = service.map(str::to_string))
}

/// Set the current phase until the guard drops.
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    update(|ctx| ctx.phase = Some(phase))
}

#[must_use]
pub fn set_current_api(api_key: &ApiKey) -> ContextGuard {
    update(|ctx| ctx.current_api = Some(api_key.clone()))
}

/// Current thread's context, used by the crash report.
#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_guard_restores_previous() {
        reset_context();

        let _phase = set_phase(AnalysisPhase::CoverageResolution);
        {
            let _inner = set_phase(AnalysisPhase::Aggregation);
            assert_eq!(get_current_context().phase, Some(AnalysisPhase::Aggregation));
        }

        assert_eq!(
            get_current_context().phase,
            Some(AnalysisPhase::CoverageResolution)
        );
    }

    #[test]
    fn test_api_guard_keeps_phase() {
        reset_context();

        let _phase = set_phase(AnalysisPhase::CompletenessAnalysis);
        let key = ApiKey::from("GET /v1/customers");
        {
            let _api = set_current_api(&key);
            let ctx = get_current_context();
            assert_eq!(ctx.phase, Some(AnalysisPhase::CompletenessAnalysis));
            assert_eq!(ctx.current_api, Some(key.clone()));
        }

        assert_eq!(get_current_context().current_api, None);
    }

    #[test]
    fn test_context_is_per_thread() {
        reset_context();
        let _phase = set_phase(AnalysisPhase::Validation);

        let other = std::thread::spawn(|| get_current_context().phase)
            .join()
            .unwrap();

        assert_eq!(other, None);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            AnalysisPhase::CompletenessAnalysis.to_string(),
            "completeness_analysis"
        );
    }
}
