//! Table storage for `users`, `plans` and `progress`, persisted as one
//! JSON document. This stands in for the hosted data service; domain
//! code only reaches it through the equality-filter query helpers
//! below, so the backing store could be swapped without touching
//! callers.

use crate::errors::AppError;
use crate::models::{Plan, ProgressEntry, User};
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub plans: Vec<Plan>,
    pub progress: Vec<ProgressEntry>,
}

impl Tables {
    /// `select * from plans where user_id = ? order by created_at desc`
    pub fn plans_for(&self, user_id: Uuid) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self
            .plans
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        plans
    }

    pub fn plan_mut(&mut self, user_id: Uuid, plan_id: Uuid) -> Option<&mut Plan> {
        self.plans
            .iter_mut()
            .find(|p| p.id == plan_id && p.user_id == user_id)
    }

    /// Removes the plan row. Progress entries are left behind; nothing
    /// cascades on the client side.
    pub fn delete_plan(&mut self, user_id: Uuid, plan_id: Uuid) -> bool {
        let before = self.plans.len();
        self.plans
            .retain(|p| !(p.id == plan_id && p.user_id == user_id));
        self.plans.len() != before
    }

    /// `select * from progress where plan_id = ? order by created_at asc`
    pub fn entries_for(&self, plan_id: Uuid) -> Vec<ProgressEntry> {
        let mut entries: Vec<ProgressEntry> = self
            .progress
            .iter()
            .filter(|e| e.plan_id == plan_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        entries
    }
}

pub fn resolve_data_dir() -> PathBuf {
    env::var("HACKDESK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

pub fn tables_path(data_dir: &Path) -> PathBuf {
    data_dir.join("tables.json")
}

pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join("session.json")
}

pub fn bucket_root(data_dir: &Path) -> PathBuf {
    data_dir.join("user-files")
}

pub async fn load_tables(path: &Path) -> Tables {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(tables) => tables,
            Err(err) => {
                error!("failed to parse tables file: {err}");
                Tables::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Tables::default(),
        Err(err) => {
            error!("failed to read tables file: {err}");
            Tables::default()
        }
    }
}

pub async fn persist_tables(path: &Path, tables: &Tables) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(tables)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Recurrence};
    use chrono::{Duration, TimeZone, Utc};

    fn plan(user_id: Uuid, offset_secs: i64) -> Plan {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
            + Duration::seconds(offset_secs);
        Plan {
            id: Uuid::new_v4(),
            user_id,
            name: format!("plan-{offset_secs}"),
            description: String::new(),
            category: "Personal".into(),
            priority: Priority::Medium,
            tags: Vec::new(),
            start_date: created.date_naive(),
            end_date: created.date_naive(),
            progress: 0,
            tasks: Vec::new(),
            notes: String::new(),
            time_spent: 0,
            recurrence: Recurrence::None,
            created_at: created,
            last_updated: created,
        }
    }

    #[test]
    fn plans_for_filters_by_owner_and_orders_newest_first() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut tables = Tables::default();
        tables.plans.push(plan(alice, 0));
        tables.plans.push(plan(bob, 5));
        tables.plans.push(plan(alice, 10));

        let plans = tables.plans_for(alice);
        assert_eq!(plans.len(), 2);
        assert!(plans[0].created_at > plans[1].created_at);
        assert!(plans.iter().all(|p| p.user_id == alice));
    }

    #[test]
    fn entries_for_filters_by_plan_and_orders_oldest_first() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let other_plan = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let entry = |plan: Uuid, offset: i64, text: &str| ProgressEntry {
            id: Uuid::new_v4(),
            plan_id: plan,
            user_id,
            description: text.into(),
            value: 1.0,
            created_at: base + Duration::seconds(offset),
        };

        let mut tables = Tables::default();
        tables.progress.push(entry(plan_id, 20, "later"));
        tables.progress.push(entry(other_plan, 5, "elsewhere"));
        tables.progress.push(entry(plan_id, 10, "earlier"));

        let entries = tables.entries_for(plan_id);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "earlier");
        assert_eq!(entries[1].description, "later");
    }

    #[test]
    fn delete_plan_ignores_other_users_rows() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut tables = Tables::default();
        let victim = plan(bob, 0);
        let victim_id = victim.id;
        tables.plans.push(victim);

        assert!(!tables.delete_plan(alice, victim_id));
        assert!(tables.delete_plan(bob, victim_id));
        assert!(tables.plans.is_empty());
    }
}
