//! Campaign lifecycle: target building, launch preconditions, persistence,
//! and the administrative HTTP surface.
//!
//! Everything privacy-sensitive is resolved here: rosters arrive with clear
//! names from the HR connector, and only masked renderings leave through the
//! router views.

pub mod admin;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod targeting;

#[cfg(test)]
mod tests;

pub use admin::{DndDirectory, DndDirectoryError, DndStats, NewDndEntry};
pub use domain::{
    mask_name, Campaign, CampaignId, CampaignMetrics, CampaignStatus, DepartmentBreakdown,
    Employee, EmployeeId, EmployeeStatus, SafeHoursOverride, TestResult, TrainingStatus,
};
pub use repository::{CampaignRepository, RepositoryError};
pub use router::{campaign_router, CampaignState};
pub use service::{CampaignService, CampaignServiceError, DashboardStats};
pub use targeting::{ExclusionPreview, LaunchError, LaunchOutcome, LaunchRequest};
