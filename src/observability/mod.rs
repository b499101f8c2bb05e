//! Diagnostics for crash reports and debugging.
//!
//! - **Context tracking**: thread-local phase, service and API
//! - **Panic hook**: structured crash report built from that context
//!
//! ```ignore
//! use gapmap::observability::{set_phase, AnalysisPhase};
//!
//! let _phase = set_phase(AnalysisPhase::CoverageResolution);
//! // a panic here reports "Phase: coverage_resolution"
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, reset_context, set_current_api, set_phase, set_service,
    AnalysisContext, AnalysisPhase, ContextGuard,
};
pub use panic_hook::install_panic_hook;
