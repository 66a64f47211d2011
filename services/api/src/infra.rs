use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use vishguard::campaigns::{Campaign, CampaignId, CampaignRepository, RepositoryError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCampaignRepository {
    records: Arc<Mutex<HashMap<CampaignId, Campaign>>>,
}

impl CampaignRepository for InMemoryCampaignRepository {
    fn insert(&self, campaign: Campaign) -> Result<Campaign, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&campaign.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(campaign.id.clone(), campaign.clone());
        Ok(campaign)
    }

    fn update(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&campaign.id) {
            guard.insert(campaign.id.clone(), campaign);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Campaign>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut campaigns: Vec<Campaign> = guard.values().cloned().collect();
        campaigns.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(campaigns)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
