//! JSON file storage implementation.
//!
//! Stores each plan as a pretty-printed JSON file under `plans/` and the
//! latest quota snapshot as `quota.json`.

use std::path::{Path, PathBuf};
use sessionplan_core::{PlanId, QuotaSnapshot, SessionPlan};
use super::{Storage, Result, TimeRange};
use tokio::fs;
use tracing::debug;

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, creating the directory layout if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("plans")).await?;
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn plan_path(&self, id: PlanId) -> PathBuf {
        self.root.join("plans").join(format!("{}.json", id))
    }

    fn quota_path(&self) -> PathBuf {
        self.root.join("quota.json")
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_plan(&mut self, plan: &SessionPlan) -> Result<()> {
        let path = self.plan_path(plan.id);
        let json = serde_json::to_string_pretty(plan)?;
        fs::write(&path, json.as_bytes()).await?;
        debug!("Saved plan {} to {}", plan.id, path.display());
        Ok(())
    }

    async fn load_plan(&self, id: PlanId) -> Result<Option<SessionPlan>> {
        read_json(&self.plan_path(id)).await
    }

    async fn list_plans(&self, range: &TimeRange) -> Result<Vec<SessionPlan>> {
        let mut plans: Vec<SessionPlan> = list_dir(&self.root.join("plans")).await?;
        plans.retain(|p| range.contains(p.created_at));
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(plans)
    }

    async fn delete_plan(&mut self, id: PlanId) -> Result<()> {
        fs::remove_file(self.plan_path(id)).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }

    async fn save_quota_snapshot(&mut self, snapshot: &QuotaSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(self.quota_path(), json.as_bytes()).await?;
        Ok(())
    }

    async fn load_quota_snapshot(&self) -> Result<Option<QuotaSnapshot>> {
        read_json(&self.quota_path()).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Ok(Some(item)) = read_json(&entry.path()).await {
            items.push(item);
        }
    }
    Ok(items)
}
