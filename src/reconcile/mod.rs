//! Identity reconciliation against the canonical reference set
//!
//! Records coming out of the extractors carry raw station and river names.
//! The [`IdentityResolver`] maps them onto canonical names (exactly, through a
//! rename table, or approximately, through the [`SimilarityMatcher`]) and the
//! [`ReconciliationMerger`] overlays the resolved records onto a copy of the
//! canonical set. Records that fall through either step go to a
//! [`DiagnosticSink`].

pub mod diagnostics;
pub mod matcher;
pub mod merger;
pub mod resolver;

pub use diagnostics::{ChannelSink, DiagnosticSink, MemorySink, TracingSink};
pub use matcher::{SimilarityMatcher, similarity_ratio};
pub use merger::{MergeOutcome, ReconciliationMerger};
pub use resolver::IdentityResolver;
