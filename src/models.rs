use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user row. The plaintext password doubles as the login credential
/// and the only "username" the system has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
}

/// A checklist item embedded in a plan. Ids are epoch milliseconds,
/// `order` is an explicit index rewritten wholesale on reorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub order: usize,
    pub created_at: DateTime<Utc>,
}

/// A goal/habit record. Invariant: whenever `tasks` is non-empty,
/// `progress` equals `round(100 * completed / total)`; task mutations
/// must recompute it before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: u8,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: String,
    pub time_spent: u64,
    pub recurrence: Recurrence,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// One immutable line in a plan's progress history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub value: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub password: String,
    pub codename: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub recurrence: Option<Recurrence>,
}

/// Partial merge for PATCH; absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct TimerRequest {
    pub seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct NewProgressRequest {
    pub description: String,
    pub value: Option<f64>,
}

#[derive(Debug, Default, Serialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Aggregates derived client-side over the full plan set.
#[derive(Debug, Default, Serialize)]
pub struct Stats {
    pub total_plans: usize,
    pub active_plans: usize,
    pub completed_plans: usize,
    pub average_progress: u32,
    pub streak: u32,
    pub weekly_completion: u32,
    pub daily_completion: u32,
    pub time_spent: u64,
    pub priority_breakdown: PriorityBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub new_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    pub ip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IpLookupResponse {
    pub source: &'static str,
    pub ip: String,
    pub info: serde_json::Value,
}
