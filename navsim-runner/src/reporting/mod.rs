//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod reports;

pub use artifacts::{ArtifactManager, ArtifactPaths, RunManifest};
pub use reports::{DiagnosticReportGenerator, PerformanceReportGenerator};
