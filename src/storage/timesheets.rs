//! Time accounting: timesheet CRUD and duration derivation.
//!
//! A timesheet with an end time and no explicit duration gets
//! `duration_minutes = round(end - start)` in minutes. The same derivation
//! reruns on update against the *effective* start/end (stored values merged
//! with the patch) unless the patch carries an explicit duration, which
//! always wins for that call. A session with no end time keeps its duration
//! unset until one arrives.
//!
//! No bound is enforced: an end time before the start yields a negative
//! duration rather than an error (see DESIGN.md).

use chrono::{DateTime, Utc};

use crate::models::patch::TimesheetPatch;
use crate::models::{NewTimesheet, Timesheet};

use super::Storage;

/// Whole minutes between two instants, rounded from milliseconds.
fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    ((end - start).num_milliseconds() as f64 / 60_000.0).round() as i64
}

impl Storage {
    /// Create a timesheet, deriving the duration when it is not supplied
    /// and an end time is present.
    pub fn create_timesheet(&mut self, new: NewTimesheet) -> Timesheet {
        let id = self.ids.timesheets.next();
        let mut sheet = Timesheet::new(id, new);
        if sheet.duration_minutes.is_none() {
            if let Some(end) = sheet.end_time {
                sheet.duration_minutes = Some(minutes_between(sheet.start_time, end));
            }
        }
        self.timesheets.insert(id, sheet.clone());
        sheet
    }

    /// Look up a timesheet by id.
    pub fn get_timesheet(&self, id: i64) -> Option<Timesheet> {
        self.timesheets.get(&id).cloned()
    }

    /// All timesheets in id order.
    pub fn list_timesheets(&self) -> Vec<Timesheet> {
        self.timesheets.values().cloned().collect()
    }

    /// Timesheets logged by a user, in id order.
    pub fn user_timesheets(&self, user_id: i64) -> Vec<Timesheet> {
        self.timesheets
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Timesheets logged against a task, in id order.
    pub fn task_timesheets(&self, task_id: i64) -> Vec<Timesheet> {
        self.timesheets
            .values()
            .filter(|t| t.task_id == task_id)
            .cloned()
            .collect()
    }

    /// Apply a patch to a timesheet, recomputing the duration from the
    /// effective start/end unless the patch supplies one explicitly.
    pub fn update_timesheet(&mut self, id: i64, patch: TimesheetPatch) -> Option<Timesheet> {
        let sheet = self.timesheets.get_mut(&id)?;
        let explicit_duration = patch.duration_minutes.is_some();

        if let Some(start) = patch.start_time {
            sheet.start_time = start;
        }
        if let Some(end) = patch.end_time {
            sheet.end_time = Some(end);
        }
        if let Some(duration) = patch.duration_minutes {
            sheet.duration_minutes = Some(duration);
        }
        if let Some(notes) = patch.notes {
            sheet.notes = Some(notes);
        }

        if !explicit_duration {
            if let Some(end) = sheet.end_time {
                sheet.duration_minutes = Some(minutes_between(sheet.start_time, end));
            }
        }
        Some(sheet.clone())
    }

    /// Delete a timesheet. Returns whether a record existed.
    pub fn delete_timesheet(&mut self, id: i64) -> bool {
        self.timesheets.remove(&id).is_some()
    }
}
