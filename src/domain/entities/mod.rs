pub mod click;
pub mod link;
pub mod profile;

pub use click::{AnalyticsSummary, ClickEvent, DIRECT_REFERRER, NewClick, UNKNOWN_BUCKET};
pub use link::{ConfidenceTier, ExpiryPolicy, Link, NewLink, SlugCandidate, SlugOrigin};
pub use profile::{AnalysisOutcome, BatchResult, CaseStyle, PatternProfile, SkipReason};
