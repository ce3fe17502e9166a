pub mod plan;
pub mod purge;
pub mod report;

pub use plan::UpdatePlan;
pub use purge::{GpkgPurge, PurgedFile};
pub use report::{ConfigSnapshot, FileReport, RefreshedFile, UpdateReport, UpdateSummary};
