//! Derived dashboard aggregates. Everything here is a pure function
//! over the fetched plan set; the `*_at` variants take an explicit
//! "today" so tests stay deterministic.

use crate::models::{Plan, Priority, PriorityBreakdown, Stats};
use chrono::{Duration, NaiveDate, Utc};

pub fn calculate_stats(plans: &[Plan]) -> Stats {
    calculate_stats_at(Utc::now().date_naive(), plans)
}

pub fn calculate_stats_at(today: NaiveDate, plans: &[Plan]) -> Stats {
    let week_ago = today - Duration::days(7);
    let denominator = plans.len().max(1) as f64;

    let active_plans = plans
        .iter()
        .filter(|p| p.end_date >= today && p.progress < 100)
        .count();
    let completed_plans = plans.iter().filter(|p| p.progress >= 100).count();

    let total_progress: u64 = plans.iter().map(|p| u64::from(p.progress)).sum();
    let average_progress = (total_progress as f64 / denominator).round() as u32;

    let daily_completed = plans
        .iter()
        .filter(|p| p.progress >= 100 && p.last_updated.date_naive() >= today)
        .count();
    let weekly_completed = plans
        .iter()
        .filter(|p| p.progress >= 100 && p.last_updated.date_naive() >= week_ago)
        .count();

    let priority_breakdown = PriorityBreakdown {
        high: plans.iter().filter(|p| p.priority == Priority::High).count(),
        medium: plans
            .iter()
            .filter(|p| p.priority == Priority::Medium)
            .count(),
        low: plans.iter().filter(|p| p.priority == Priority::Low).count(),
    };

    Stats {
        total_plans: plans.len(),
        active_plans,
        completed_plans,
        average_progress,
        streak: streak_at(today, plans),
        weekly_completion: (weekly_completed as f64 / denominator * 100.0).round() as u32,
        daily_completion: (daily_completed as f64 / denominator * 100.0).round() as u32,
        time_spent: plans.iter().map(|p| p.time_spent).sum(),
        priority_breakdown,
    }
}

/// Length of the unbroken daily-activity run ending today. Walks back
/// up to a year; a day counts when any plan was updated on it. Day 0
/// may be empty without ending the run, every later gap ends it.
pub fn streak_at(today: NaiveDate, plans: &[Plan]) -> u32 {
    let mut streak = 0;
    for i in 0..365 {
        let day = today - Duration::days(i);
        let has_update = plans.iter().any(|p| p.last_updated.date_naive() == day);
        if has_update {
            streak += 1;
        } else if i > 0 {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Plan, Recurrence};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn plan_updated_on(day: NaiveDate) -> Plan {
        let updated = day.and_hms_opt(15, 0, 0).unwrap().and_utc();
        Plan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "p".into(),
            description: String::new(),
            category: "Personal".into(),
            priority: Priority::Medium,
            tags: Vec::new(),
            start_date: day,
            end_date: day + Duration::days(30),
            progress: 0,
            tasks: Vec::new(),
            notes: String::new(),
            time_spent: 0,
            recurrence: Recurrence::None,
            created_at: updated,
            last_updated: updated,
        }
    }

    #[test]
    fn streak_counts_consecutive_days_up_to_the_first_gap() {
        let plans: Vec<Plan> = [0, 1, 2]
            .iter()
            .map(|d| plan_updated_on(today() - Duration::days(*d)))
            .collect();
        // gap at today-3, activity again further back must not count
        let mut with_old = plans.clone();
        with_old.push(plan_updated_on(today() - Duration::days(5)));

        assert_eq!(streak_at(today(), &plans), 3);
        assert_eq!(streak_at(today(), &with_old), 3);
    }

    #[test]
    fn a_quiet_today_does_not_break_the_run() {
        let plans = vec![
            plan_updated_on(today() - Duration::days(1)),
            plan_updated_on(today() - Duration::days(2)),
        ];
        assert_eq!(streak_at(today(), &plans), 2);
    }

    #[test]
    fn streak_is_zero_with_no_recent_activity() {
        let plans = vec![plan_updated_on(today() - Duration::days(40))];
        assert_eq!(streak_at(today(), &plans), 0);
        assert_eq!(streak_at(today(), &[]), 0);
    }

    #[test]
    fn aggregates_over_a_mixed_plan_set() {
        let mut done = plan_updated_on(today());
        done.progress = 100;
        done.priority = Priority::High;
        done.time_spent = 3600;

        let mut active = plan_updated_on(today());
        active.progress = 40;
        active.time_spent = 1800;

        let mut expired = plan_updated_on(today() - Duration::days(20));
        expired.end_date = today() - Duration::days(1);
        expired.progress = 10;
        expired.priority = Priority::Low;

        let stats = calculate_stats_at(today(), &[done, active, expired]);
        assert_eq!(stats.total_plans, 3);
        assert_eq!(stats.active_plans, 1);
        assert_eq!(stats.completed_plans, 1);
        assert_eq!(stats.average_progress, 50);
        assert_eq!(stats.daily_completion, 33);
        assert_eq!(stats.weekly_completion, 33);
        assert_eq!(stats.time_spent, 5400);
        assert_eq!(stats.priority_breakdown.high, 1);
        assert_eq!(stats.priority_breakdown.medium, 1);
        assert_eq!(stats.priority_breakdown.low, 1);
    }

    #[test]
    fn empty_plan_set_yields_all_zeroes() {
        let stats = calculate_stats_at(today(), &[]);
        assert_eq!(stats.total_plans, 0);
        assert_eq!(stats.average_progress, 0);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.daily_completion, 0);
    }
}
