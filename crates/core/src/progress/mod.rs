//! Course completion: watched sets, percentages, and idempotent marking.

mod tracker;
mod types;

pub use tracker::*;
pub use types::*;

use crate::models::{Course, User};

/// Percentage of `total` lessons completed, rounded to the nearest integer.
///
/// Returns 0 for an empty course and never exceeds 100.
pub fn course_progress(total: usize, watched: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let watched = watched.min(total);
    let percent = (100.0 * watched as f64 / total as f64).round();
    percent as u8
}

/// Progress of `user` in `course`, 0 when the user has no record for it.
pub fn progress_for(course: &Course, user: Option<&User>) -> u8 {
    let total = course.lesson_count();
    let watched = user
        .and_then(|u| u.watched_set(&course.id))
        .map(|set| set.count_within(total))
        .unwrap_or(0);
    course_progress(total, watched)
}
