use thiserror::Error;
use tracing::{debug, info, warn};

use super::{progress_for, MarkOutcome};
use crate::api::{ApiError, Credentials};
use crate::cache::QueryKey;
use crate::client::PlatformClient;
use crate::models::User;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProgressError {
    #[error("Lesson {lesson} does not exist (course has {count} lessons)")]
    LessonOutOfRange { lesson: usize, count: usize },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Completion tracking of one signed-in user.
pub struct ProgressTracker<'a> {
    client: &'a PlatformClient,
    credentials: &'a Credentials,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(client: &'a PlatformClient, credentials: &'a Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Current completion percentage of `course_id`.
    pub async fn progress(&self, course_id: &str) -> Result<u8, ProgressError> {
        let course = self.client.course(course_id).await?;
        let user = self.client.profile(self.credentials).await?;
        Ok(progress_for(&course, Some(user.as_ref())))
    }

    /// Mark lesson `lesson` of `course_id` as watched.
    ///
    /// The watched set is checked first: an index already present sends
    /// nothing. After a successful write the profile is refetched.
    /// Overlapping marks of the same lesson wait for each other, so only
    /// the first one sends the write.
    pub async fn mark_watched(
        &self,
        course_id: &str,
        lesson: usize,
    ) -> Result<MarkOutcome, ProgressError> {
        let key = format!("{}/{}/{}", self.credentials.scope(), course_id, lesson);
        let guard = self.client.lock_mark(&key).await;
        let outcome = self.mark_exclusive(course_id, lesson).await;
        self.client.release_mark(&key, guard).await;
        outcome
    }

    async fn mark_exclusive(
        &self,
        course_id: &str,
        lesson: usize,
    ) -> Result<MarkOutcome, ProgressError> {
        let course = self.client.course(course_id).await?;
        let count = course.lesson_count();
        if lesson >= count {
            return Err(ProgressError::LessonOutOfRange { lesson, count });
        }

        let user = self.client.profile(self.credentials).await?;
        let already = user
            .watched_set(course_id)
            .is_some_and(|watched| watched.contains_index(lesson));
        if already {
            debug!("Lesson {} of {} already watched", lesson, course_id);
            return Ok(MarkOutcome::AlreadyWatched {
                progress: progress_for(&course, Some(user.as_ref())),
            });
        }

        self.client
            .api()
            .mark_lesson_watched(self.credentials, course_id, lesson)
            .await?;
        info!("Lesson {} of {} marked watched", lesson, course_id);

        let profile_key = QueryKey::Profile(self.credentials.scope());
        self.client
            .refresh(self.credentials, std::slice::from_ref(&profile_key))
            .await;

        let progress = match self.client.cache().peek::<User>(&profile_key).await {
            Some(refreshed) => progress_for(&course, Some(refreshed.as_ref())),
            None => {
                warn!("Profile refetch failed; computing progress locally");
                let mut local = (*user).clone();
                local.record_watched(course_id, lesson);
                progress_for(&course, Some(&local))
            }
        };

        Ok(MarkOutcome::Marked { progress })
    }
}
