use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::exclusions::dnd::DndEntry;
use crate::exclusions::safe_hours::SafeHoursConfig;
use crate::hierarchy::DepartmentNode;
use crate::roster::RosterProvider;

use super::domain::{Campaign, CampaignId, CampaignStatus, EmployeeStatus, TestResult, TrainingStatus};
use super::repository::{CampaignRepository, RepositoryError};
use super::targeting::{self, LaunchError, LaunchOutcome, LaunchRequest};

static CAMPAIGN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_campaign_id() -> CampaignId {
    let id = CAMPAIGN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CampaignId(format!("camp-{id:06}"))
}

/// Service composing the target builder with the campaign repository.
pub struct CampaignService<R> {
    repository: Arc<R>,
}

impl<R> CampaignService<R>
where
    R: CampaignRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate, build, and persist a campaign, marking it running.
    ///
    /// The stored record is the launch-time snapshot; later edits to the DND
    /// directory or safe-hours config never touch it.
    pub fn launch<P: RosterProvider>(
        &self,
        request: &LaunchRequest,
        tree: &[DepartmentNode],
        provider: &P,
        entries: &[DndEntry],
        config: &SafeHoursConfig,
        now: DateTime<Utc>,
    ) -> Result<LaunchOutcome, CampaignServiceError> {
        let mut outcome = targeting::build(request, tree, provider, entries, config, now)?;
        outcome.campaign.id = next_campaign_id();
        outcome.campaign.status = CampaignStatus::Running;
        outcome.campaign.started_at = Some(now);

        let stored = self.repository.insert(outcome.campaign)?;
        info!(
            campaign = %stored.id.0,
            targeted = stored.metrics.total_targeted,
            excluded = outcome.exclusions.total_excluded,
            "campaign launched"
        );

        outcome.campaign = stored;
        Ok(outcome)
    }

    /// Transition a running campaign to completed.
    pub fn complete(
        &self,
        id: &CampaignId,
        now: DateTime<Utc>,
    ) -> Result<Campaign, CampaignServiceError> {
        let mut campaign = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if campaign.status == CampaignStatus::Running {
            campaign.status = CampaignStatus::Completed;
            campaign.completed_at = Some(now);
            self.repository.update(campaign.clone())?;
        }

        Ok(campaign)
    }

    pub fn get(&self, id: &CampaignId) -> Result<Campaign, CampaignServiceError> {
        let campaign = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(campaign)
    }

    pub fn list(&self) -> Result<Vec<Campaign>, CampaignServiceError> {
        Ok(self.repository.list()?)
    }

    /// Aggregate counters across all stored campaigns for the dashboard.
    pub fn dashboard_stats(&self) -> Result<DashboardStats, CampaignServiceError> {
        let campaigns = self.repository.list()?;

        let active_campaigns = campaigns
            .iter()
            .filter(|campaign| campaign.status == CampaignStatus::Running)
            .count() as u32;
        let total_employees_tested = campaigns
            .iter()
            .map(|campaign| campaign.employees.len() as u32)
            .sum();

        let completed: Vec<_> = campaigns
            .iter()
            .flat_map(|campaign| campaign.employees.iter())
            .filter(|employee| employee.status == EmployeeStatus::Completed)
            .collect();
        let passed = completed
            .iter()
            .filter(|employee| employee.result == Some(TestResult::Passed))
            .count() as u32;

        let pending_training = campaigns
            .iter()
            .flat_map(|campaign| campaign.employees.iter())
            .filter(|employee| {
                employee.result == Some(TestResult::Failed)
                    && employee.training_status != Some(TrainingStatus::Completed)
            })
            .count() as u32;

        Ok(DashboardStats {
            active_campaigns,
            total_employees_tested,
            overall_pass_rate: super::domain::percent(passed, completed.len() as u32),
            pending_training,
        })
    }
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub active_campaigns: u32,
    pub total_employees_tested: u32,
    pub overall_pass_rate: u32,
    pub pending_training: u32,
}

/// Error raised by the campaign service.
#[derive(Debug, thiserror::Error)]
pub enum CampaignServiceError {
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
