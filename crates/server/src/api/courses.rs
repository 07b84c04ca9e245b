//! Course progress, classroom view and lesson completion.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use agora_core::models::{Course, Lesson};
use agora_core::progress::progress_for;
use agora_core::{Classroom, ContentType, MarkOutcome};

use super::error::AppError;
use super::middleware::Session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub course_id: String,
    pub lesson_count: usize,
    /// Watched lesson indices as recorded by the API.
    pub watched: Vec<String>,
    pub progress: u8,
}

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, AppError> {
    let course = state.client().course(&id).await?;
    let progress = progress_for(&course, Some(session.user.as_ref()));
    let watched = session
        .user
        .watched_set(&id)
        .map(|set| set.iter().map(str::to_string).collect())
        .unwrap_or_default();

    Ok(Json(ProgressResponse {
        course_id: course.id.clone(),
        lesson_count: course.lesson_count(),
        watched,
        progress,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassroomParams {
    /// Display index: 0 is the summary, lesson `i` is `i + 1`.
    pub lesson: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ClassroomResponse {
    pub course: Course,
    pub position: usize,
    pub last_position: usize,
    pub content_type: ContentType,
    /// Lesson shown at `position`; absent on the summary.
    pub lesson: Option<Lesson>,
    pub lesson_index: Option<usize>,
    pub watched: bool,
    pub can_next: bool,
    pub can_prev: bool,
    pub progress: u8,
}

/// Render the classroom at display position `?lesson=`.
pub async fn get_classroom(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ClassroomParams>,
) -> Result<Json<ClassroomResponse>, AppError> {
    let course = state.client().course(&id).await?;
    let mut classroom = Classroom::new((*course).clone());
    let content_type = classroom.select(params.lesson.unwrap_or(0))?;

    let lesson_index = classroom.current_lesson();
    let watched = lesson_index.is_some_and(|i| {
        session
            .user
            .watched_set(&id)
            .is_some_and(|set| set.contains_index(i))
    });

    Ok(Json(ClassroomResponse {
        position: classroom.position(),
        last_position: classroom.last_position(),
        content_type,
        lesson: lesson_index.and_then(|i| course.lesson(i).cloned()),
        lesson_index,
        watched,
        can_next: classroom.can_next(),
        can_prev: classroom.can_prev(),
        progress: progress_for(&course, Some(session.user.as_ref())),
        course: (*course).clone(),
    }))
}

/// Playback of lesson `index` reached its end.
///
/// Only hosted video lessons complete this way; other content types are
/// rejected. Re-marking a watched lesson answers `already_watched` without
/// a request to the API.
pub async fn mark_watched(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<MarkOutcome>, AppError> {
    let course = state.client().course(&id).await?;
    let mut classroom = Classroom::new((*course).clone());
    classroom.select_lesson(index)?;

    let Some(lesson) = classroom.playback_ended() else {
        return Err(AppError::Unprocessable(
            "Only video lessons are completed by playback".to_string(),
        ));
    };

    let outcome = state
        .client()
        .progress(&session.credentials)
        .mark_watched(&id, lesson)
        .await?;
    Ok(Json(outcome))
}
