//! Derived notifications. Nothing is stored: the checker recomputes
//! the set from the plan table on every request, so the client can
//! poll and dismiss freely.

use crate::models::{Notification, NotificationKind, Plan};
use chrono::{DateTime, NaiveDate, Utc};

/// Plans ending within this many days raise a warning.
const ENDING_SOON_DAYS: i64 = 3;

pub fn notifications_for(plans: &[Plan]) -> Vec<Notification> {
    let now = Utc::now();
    notifications_at(now.date_naive(), now, plans)
}

pub fn notifications_at(
    today: NaiveDate,
    now: DateTime<Utc>,
    plans: &[Plan],
) -> Vec<Notification> {
    let mut notifications = Vec::new();
    for plan in plans {
        // completed and expired plans stay quiet
        if plan.progress >= 100 || plan.end_date < today {
            continue;
        }

        if plan.last_updated.date_naive() != today {
            notifications.push(Notification {
                id: format!("daily-{}", plan.id),
                kind: NotificationKind::Reminder,
                plan_id: plan.id,
                plan_name: plan.name.clone(),
                message: format!("You haven't updated \"{}\" today!", plan.name),
                timestamp: now,
            });
        }

        let days_until_end = (plan.end_date - today).num_days();
        if days_until_end > 0 && days_until_end <= ENDING_SOON_DAYS {
            notifications.push(Notification {
                id: format!("ending-{}", plan.id),
                kind: NotificationKind::Warning,
                plan_id: plan.id,
                plan_name: plan.name.clone(),
                message: format!("\"{}\" ends in {} days!", plan.name, days_until_end),
                timestamp: now,
            });
        }
    }
    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Recurrence};
    use chrono::Duration;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn plan(name: &str, updated: NaiveDate, end: NaiveDate, progress: u8) -> Plan {
        let stamp = updated.and_hms_opt(8, 0, 0).unwrap().and_utc();
        Plan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            category: "Personal".into(),
            priority: Priority::Medium,
            tags: Vec::new(),
            start_date: today() - Duration::days(10),
            end_date: end,
            progress,
            tasks: Vec::new(),
            notes: String::new(),
            time_spent: 0,
            recurrence: Recurrence::None,
            created_at: stamp,
            last_updated: stamp,
        }
    }

    #[test]
    fn stale_plans_raise_a_daily_reminder() {
        let plans = vec![plan(
            "read",
            today() - Duration::days(1),
            today() + Duration::days(20),
            40,
        )];
        let now = today().and_hms_opt(9, 0, 0).unwrap().and_utc();
        let notes = notifications_at(today(), now, &plans);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Reminder);
        assert!(notes[0].id.starts_with("daily-"));
    }

    #[test]
    fn plans_ending_within_three_days_raise_a_warning() {
        let plans = vec![plan("sprint", today(), today() + Duration::days(2), 40)];
        let now = today().and_hms_opt(9, 0, 0).unwrap().and_utc();
        let notes = notifications_at(today(), now, &plans);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Warning);
        assert!(notes[0].message.contains("ends in 2 days"));
    }

    #[test]
    fn completed_and_expired_plans_stay_quiet() {
        let plans = vec![
            plan("done", today() - Duration::days(2), today() + Duration::days(2), 100),
            plan("expired", today() - Duration::days(2), today() - Duration::days(1), 10),
        ];
        let now = today().and_hms_opt(9, 0, 0).unwrap().and_utc();
        assert!(notifications_at(today(), now, &plans).is_empty());
    }
}
