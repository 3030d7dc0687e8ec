//! Plan and task domain logic: constructors, partial merges and the
//! task mutations. Every task mutation recomputes the derived
//! `progress` field before the caller persists, so the
//! completed-ratio invariant holds no matter which path touched the
//! list.

use crate::errors::AppError;
use crate::models::{
    CreatePlanRequest, Plan, Task, UpdatePlanRequest, UpdateTaskRequest,
};
use chrono::{DateTime, Days, Utc};
use uuid::Uuid;

/// `round(100 * completed / total)`, 0 for an empty list.
pub fn progress_for(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    ((completed as f64 / tasks.len() as f64) * 100.0).round() as u8
}

pub fn new_plan(
    user_id: Uuid,
    req: CreatePlanRequest,
    now: DateTime<Utc>,
) -> Result<Plan, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("plan name is required"));
    }
    let today = now.date_naive();
    Ok(Plan {
        id: Uuid::new_v4(),
        user_id,
        name: req.name,
        description: req.description.unwrap_or_default(),
        category: req.category.unwrap_or_else(|| "Personal".to_string()),
        priority: req.priority.unwrap_or_default(),
        tags: req.tags.unwrap_or_default(),
        start_date: req.start_date.unwrap_or(today),
        end_date: req
            .end_date
            .unwrap_or_else(|| today.checked_add_days(Days::new(30)).unwrap_or(today)),
        progress: 0,
        tasks: Vec::new(),
        notes: req.notes.unwrap_or_default(),
        time_spent: 0,
        recurrence: req.recurrence.unwrap_or_default(),
        created_at: now,
        last_updated: now,
    })
}

/// Clone with fresh identity and timestamps; progress and every task's
/// completion flag reset.
pub fn duplicate_of(plan: &Plan, now: DateTime<Utc>) -> Plan {
    let mut copy = plan.clone();
    copy.id = Uuid::new_v4();
    copy.name = format!("{} (Copy)", plan.name);
    copy.progress = 0;
    for task in &mut copy.tasks {
        task.completed = false;
    }
    copy.created_at = now;
    copy.last_updated = now;
    copy
}

pub fn merge_update(plan: &mut Plan, req: UpdatePlanRequest) {
    if let Some(name) = req.name {
        plan.name = name;
    }
    if let Some(description) = req.description {
        plan.description = description;
    }
    if let Some(category) = req.category {
        plan.category = category;
    }
    if let Some(priority) = req.priority {
        plan.priority = priority;
    }
    if let Some(tags) = req.tags {
        plan.tags = tags;
    }
    if let Some(start_date) = req.start_date {
        plan.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        plan.end_date = end_date;
    }
    if let Some(notes) = req.notes {
        plan.notes = notes;
    }
    if let Some(recurrence) = req.recurrence {
        plan.recurrence = recurrence;
    }
}

pub fn add_task(plan: &mut Plan, title: &str, now: DateTime<Utc>) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation("task title is required"));
    }
    // ids are wall-clock milliseconds; bump past any task created in
    // the same millisecond so lookups stay unambiguous
    let mut id = now.timestamp_millis();
    while plan.tasks.iter().any(|t| t.id == id) {
        id += 1;
    }
    plan.tasks.push(Task {
        id,
        title: title.to_string(),
        completed: false,
        order: plan.tasks.len(),
        created_at: now,
    });
    plan.progress = progress_for(&plan.tasks);
    Ok(())
}

pub fn update_task(
    plan: &mut Plan,
    task_id: i64,
    req: UpdateTaskRequest,
) -> Result<(), AppError> {
    let task = plan
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or(AppError::NotFound("task"))?;
    if let Some(title) = req.title {
        task.title = title;
    }
    if let Some(completed) = req.completed {
        task.completed = completed;
    }
    plan.progress = progress_for(&plan.tasks);
    Ok(())
}

pub fn delete_task(plan: &mut Plan, task_id: i64) -> Result<(), AppError> {
    let before = plan.tasks.len();
    plan.tasks.retain(|t| t.id != task_id);
    if plan.tasks.len() == before {
        return Err(AppError::NotFound("task"));
    }
    plan.progress = progress_for(&plan.tasks);
    Ok(())
}

/// Splice the task at `from` in at `to`, then rewrite every `order`
/// index to match the new sequence.
pub fn reorder_tasks(plan: &mut Plan, from: usize, to: usize) -> Result<(), AppError> {
    if from >= plan.tasks.len() || to >= plan.tasks.len() {
        return Err(AppError::validation("task index out of range"));
    }
    let task = plan.tasks.remove(from);
    plan.tasks.insert(to, task);
    for (idx, task) in plan.tasks.iter_mut().enumerate() {
        task.order = idx;
    }
    plan.progress = progress_for(&plan.tasks);
    Ok(())
}
