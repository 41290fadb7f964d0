//! Filtered and aggregate read operations over the store.
//!
//! Task filters are linear scans with simple predicates; date matching
//! truncates both sides to the local calendar day. The dashboard aggregate
//! is recomputed from the collections on every call.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate};
use serde::Serialize;

use crate::models::{Product, Task, TaskPriority, TaskStatus};

use super::Storage;

/// Weekly hours goal shown next to logged hours.
const WEEKLY_HOURS_TARGET: u32 = 50;

/// Placeholder figures surfaced on the dashboard. These are deliberately
/// constants, not derived from data.
const CUSTOMER_SATISFACTION: u32 = 92;
const FIRST_TIME_FIX_RATE: u32 = 87;

/// Aggregate snapshot backing the dashboard view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Tasks scheduled today (local calendar day)
    pub todays_task_count: usize,
    /// Of today's tasks, how many are completed
    pub todays_tasks_completed: usize,
    /// Of today's tasks, how many are not yet completed
    pub todays_tasks_pending: usize,
    /// Completed tasks scheduled since the start of the week (Sunday)
    pub completed_this_week: usize,
    /// Total hours across all timesheets
    pub hours_logged: f64,
    /// Weekly hours goal (fixed)
    pub weekly_hours_target: u32,
    /// Total units consumed across all usage records
    pub materials_used: i64,
    /// Products at or below their low-stock threshold
    pub low_stock_count: usize,
    /// completed / total tasks, as a rounded percentage
    pub task_completion_rate: u32,
    /// Placeholder constant
    pub customer_satisfaction: u32,
    /// Placeholder constant
    pub first_time_fix_rate: u32,
}

/// A task's scheduled date as a local calendar day.
fn scheduled_day(task: &Task) -> NaiveDate {
    task.scheduled_date.with_timezone(&Local).date_naive()
}

impl Storage {
    /// Tasks with the given status.
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.list_tasks()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    /// Tasks with the given priority.
    pub fn tasks_by_priority(&self, priority: TaskPriority) -> Vec<Task> {
        self.list_tasks()
            .into_iter()
            .filter(|t| t.priority == priority)
            .collect()
    }

    /// Tasks scheduled on the given local calendar day.
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<Task> {
        self.list_tasks()
            .into_iter()
            .filter(|t| scheduled_day(t) == date)
            .collect()
    }

    /// Tasks the given user is assigned to, via assignment membership.
    pub fn tasks_for_user(&self, user_id: i64) -> Vec<Task> {
        self.list_tasks()
            .into_iter()
            .filter(|t| {
                self.task_assignments(t.id)
                    .iter()
                    .any(|a| a.user_id == user_id)
            })
            .collect()
    }

    /// Products at or below their low-stock threshold.
    pub fn low_stock_products(&self) -> Vec<Product> {
        self.list_products()
            .into_iter()
            .filter(|p| p.is_low_stock())
            .collect()
    }

    /// Dashboard aggregate as of now.
    pub fn dashboard_stats(&self) -> DashboardStats {
        self.dashboard_stats_at(Local::now())
    }

    /// Dashboard aggregate as of a given instant (split out for tests).
    pub fn dashboard_stats_at(&self, now: DateTime<Local>) -> DashboardStats {
        let today = now.date_naive();
        // Week starts on Sunday, calendar-local
        let start_of_week = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));

        let tasks = self.list_tasks();
        let todays: Vec<&Task> = tasks.iter().filter(|t| scheduled_day(t) == today).collect();
        let todays_completed = todays
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();

        let completed_this_week = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed && scheduled_day(t) >= start_of_week)
            .count();

        let total_minutes: i64 = self
            .list_timesheets()
            .iter()
            .filter_map(|t| t.duration_minutes)
            .sum();

        let materials_used: i64 = self.usage.values().map(|u| u.quantity).sum();

        let completed_total = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        // Empty task set counts as a denominator of 1
        let task_completion_rate =
            ((completed_total as f64 / tasks.len().max(1) as f64) * 100.0).round() as u32;

        DashboardStats {
            todays_task_count: todays.len(),
            todays_tasks_completed: todays_completed,
            todays_tasks_pending: todays.len() - todays_completed,
            completed_this_week,
            hours_logged: total_minutes as f64 / 60.0,
            weekly_hours_target: WEEKLY_HOURS_TARGET,
            materials_used,
            low_stock_count: self.low_stock_products().len(),
            task_completion_rate,
            customer_satisfaction: CUSTOMER_SATISFACTION,
            first_time_fix_rate: FIRST_TIME_FIX_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patch::TaskPatch;
    use crate::models::{NewTask, NewTimesheet};
    use chrono::{Duration, TimeZone, Utc};

    fn task_at(storage: &mut Storage, when: DateTime<Local>, status: TaskStatus) -> Task {
        storage.create_task(NewTask {
            title: "T".to_string(),
            description: None,
            location_name: "Site".to_string(),
            location_address: "1 Main St".to_string(),
            scheduled_date: when.with_timezone(&Utc),
            status,
            priority: TaskPriority::default(),
            progress: 0,
            client_id: None,
        })
    }

    fn noon(date: NaiveDate) -> DateTime<Local> {
        Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .unwrap()
    }

    #[test]
    fn test_tasks_by_status_and_priority() {
        let mut storage = Storage::new();
        let now = Local::now();
        task_at(&mut storage, now, TaskStatus::Scheduled);
        let done = task_at(&mut storage, now, TaskStatus::Completed);

        let completed = storage.tasks_by_status(TaskStatus::Completed);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
        assert_eq!(storage.tasks_by_priority(TaskPriority::Medium).len(), 2);
        assert!(storage.tasks_by_priority(TaskPriority::High).is_empty());
    }

    #[test]
    fn test_tasks_on_matches_calendar_day() {
        let mut storage = Storage::new();
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        task_at(&mut storage, noon(day), TaskStatus::Scheduled);
        task_at(&mut storage, noon(day) + Duration::hours(5), TaskStatus::Scheduled);
        task_at(
            &mut storage,
            noon(day + Days::new(1)),
            TaskStatus::Scheduled,
        );

        assert_eq!(storage.tasks_on(day).len(), 2);
        assert_eq!(storage.tasks_on(day + Days::new(1)).len(), 1);
        assert!(storage.tasks_on(day + Days::new(2)).is_empty());
    }

    #[test]
    fn test_tasks_for_user_via_assignments() {
        let mut storage = Storage::new();
        let now = Local::now();
        let a = task_at(&mut storage, now, TaskStatus::Scheduled);
        let b = task_at(&mut storage, now, TaskStatus::Scheduled);
        storage.assign_user(a.id, 1);
        storage.assign_user(b.id, 2);

        let mine = storage.tasks_for_user(1);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, a.id);
        assert!(storage.tasks_for_user(9).is_empty());
    }

    #[test]
    fn test_dashboard_today_split() {
        let mut storage = Storage::new();
        let day = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        task_at(&mut storage, noon(day), TaskStatus::Completed);
        task_at(&mut storage, noon(day), TaskStatus::InProgress);
        task_at(&mut storage, noon(day + Days::new(1)), TaskStatus::Scheduled);

        let stats = storage.dashboard_stats_at(noon(day));
        assert_eq!(stats.todays_task_count, 2);
        assert_eq!(stats.todays_tasks_completed, 1);
        assert_eq!(stats.todays_tasks_pending, 1);
    }

    #[test]
    fn test_dashboard_completed_this_week_counts_from_sunday() {
        let mut storage = Storage::new();
        // 2026-03-11 is a Wednesday; that week's Sunday is 2026-03-08
        let wednesday = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(sunday.weekday().num_days_from_sunday(), 0);

        task_at(&mut storage, noon(sunday), TaskStatus::Completed);
        task_at(&mut storage, noon(wednesday), TaskStatus::Completed);
        // Last week's completion does not count
        task_at(
            &mut storage,
            noon(sunday - Days::new(1)),
            TaskStatus::Completed,
        );
        // This week but not completed
        task_at(&mut storage, noon(wednesday), TaskStatus::InProgress);

        let stats = storage.dashboard_stats_at(noon(wednesday));
        assert_eq!(stats.completed_this_week, 2);
    }

    #[test]
    fn test_dashboard_completion_rate_increases_on_completion() {
        let mut storage = Storage::new();
        let day = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        let task = task_at(&mut storage, noon(day), TaskStatus::Scheduled);
        task_at(&mut storage, noon(day), TaskStatus::Scheduled);

        let before = storage.dashboard_stats_at(noon(day));
        assert_eq!(before.task_completion_rate, 0);
        assert_eq!(before.completed_this_week, 0);

        storage.update_task(
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        );

        let after = storage.dashboard_stats_at(noon(day));
        assert_eq!(after.task_completion_rate, 50);
        assert_eq!(after.completed_this_week, 1);
    }

    #[test]
    fn test_dashboard_empty_store_guards_division() {
        let storage = Storage::new();
        let stats = storage.dashboard_stats();
        assert_eq!(stats.task_completion_rate, 0);
        assert_eq!(stats.todays_task_count, 0);
        assert_eq!(stats.hours_logged, 0.0);
    }

    #[test]
    fn test_dashboard_hours_and_materials() {
        let mut storage = Storage::new();
        let start = Utc::now();
        storage.create_timesheet(NewTimesheet {
            task_id: 1,
            user_id: 1,
            start_time: start,
            end_time: Some(start + Duration::minutes(90)),
            duration_minutes: None,
            notes: None,
        });
        // Open session contributes nothing
        storage.create_timesheet(NewTimesheet {
            task_id: 1,
            user_id: 2,
            start_time: start,
            end_time: None,
            duration_minutes: None,
            notes: None,
        });

        let product = storage.create_product(crate::models::NewProduct {
            name: "Filter".to_string(),
            sku: "HVF-001".to_string(),
            description: None,
            unit_price: 24.99,
            stock_quantity: 10,
            low_stock_threshold: 2,
            category: None,
        });
        storage
            .record_usage(crate::models::NewProductUsage {
                task_id: 1,
                product_id: product.id,
                quantity: 3,
            })
            .unwrap();

        let stats = storage.dashboard_stats();
        assert_eq!(stats.hours_logged, 1.5);
        assert_eq!(stats.materials_used, 3);
        assert_eq!(stats.weekly_hours_target, 50);
        // Placeholders stay fixed
        assert_eq!(stats.customer_satisfaction, 92);
        assert_eq!(stats.first_time_fix_rate, 87);
    }
}
