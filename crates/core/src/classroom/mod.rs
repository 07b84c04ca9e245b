//! Lesson viewer state machine.
//!
//! Positions are *display indices*: 0 is the course summary, and lesson `i`
//! sits at display index `i + 1`. Conversions go through
//! [`lesson_to_display`] and [`display_to_lesson`] only.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Course, LessonContent};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassroomError {
    #[error("position {index} is out of range (last is {last})")]
    OutOfRange { index: usize, last: usize },
}

/// What the viewer renders at a display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Summary,
    Video,
    Youtube,
    Pdf,
}

impl From<&LessonContent> for ContentType {
    fn from(content: &LessonContent) -> Self {
        match content {
            LessonContent::Video { .. } => ContentType::Video,
            LessonContent::Youtube { .. } => ContentType::Youtube,
            LessonContent::Pdf { .. } => ContentType::Pdf,
        }
    }
}

/// `None` when the lesson index has no display position.
pub fn lesson_to_display(lesson: usize) -> Option<usize> {
    lesson.checked_add(1)
}

/// `None` for the summary position.
pub fn display_to_lesson(display: usize) -> Option<usize> {
    display.checked_sub(1)
}

/// One viewing session of a course.
///
/// Navigation never records progress. Only the end of playback of a `Video`
/// lesson does, and at most once per lesson per session.
#[derive(Debug, Clone)]
pub struct Classroom {
    course: Course,
    position: usize,
    reported: HashSet<usize>,
}

impl Classroom {
    /// Opens on the summary.
    pub fn new(course: Course) -> Self {
        Self {
            course,
            position: 0,
            reported: HashSet::new(),
        }
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Highest valid display index.
    pub fn last_position(&self) -> usize {
        self.course.lessons.len()
    }

    pub fn current_lesson(&self) -> Option<usize> {
        display_to_lesson(self.position)
    }

    pub fn content_type(&self) -> ContentType {
        match self.current_lesson().and_then(|i| self.course.lessons.get(i)) {
            Some(lesson) => ContentType::from(&lesson.content),
            None => ContentType::Summary,
        }
    }

    pub fn select(&mut self, display: usize) -> Result<ContentType, ClassroomError> {
        let last = self.last_position();
        if display > last {
            return Err(ClassroomError::OutOfRange {
                index: display,
                last,
            });
        }
        self.position = display;
        Ok(self.content_type())
    }

    /// Select by lesson index rather than display index.
    pub fn select_lesson(&mut self, lesson: usize) -> Result<ContentType, ClassroomError> {
        let display = lesson_to_display(lesson).ok_or(ClassroomError::OutOfRange {
            index: lesson,
            last: self.last_position(),
        })?;
        self.select(display)
    }

    pub fn can_next(&self) -> bool {
        self.position < self.last_position()
    }

    pub fn can_prev(&self) -> bool {
        self.position > 0
    }

    /// Advance one position; stays put at the last lesson.
    pub fn next(&mut self) -> ContentType {
        if self.can_next() {
            self.position += 1;
        }
        self.content_type()
    }

    /// Go back one position; stays put on the summary.
    pub fn prev(&mut self) -> ContentType {
        if self.can_prev() {
            self.position -= 1;
        }
        self.content_type()
    }

    /// Playback of the current lesson reached its end.
    ///
    /// Returns the lesson index to mark as watched, or `None` when the current
    /// content is not a self-hosted video or was already reported in this
    /// session.
    pub fn playback_ended(&mut self) -> Option<usize> {
        if self.content_type() != ContentType::Video {
            return None;
        }
        let lesson = self.current_lesson()?;
        self.reported.insert(lesson).then_some(lesson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lesson;
    use crate::testing::fixtures;

    fn mixed_course() -> Course {
        let mut course = fixtures::course("course-1", 0);
        course.lessons = vec![
            Lesson {
                title: "Intro".into(),
                summary: None,
                content: LessonContent::Video {
                    url: "https://cdn.example.com/1.mp4".into(),
                },
            },
            Lesson {
                title: "Talk".into(),
                summary: None,
                content: LessonContent::Youtube {
                    url: "https://youtube.com/watch?v=x".into(),
                },
            },
            Lesson {
                title: "Notes".into(),
                summary: Some("Reading".into()),
                content: LessonContent::Pdf {
                    url: "https://cdn.example.com/notes.pdf".into(),
                },
            },
        ];
        course
    }

    #[test]
    fn test_index_mapping() {
        assert_eq!(lesson_to_display(0), Some(1));
        assert_eq!(lesson_to_display(usize::MAX), None);
        assert_eq!(display_to_lesson(0), None);
        for i in 0..50 {
            assert_eq!(lesson_to_display(i).and_then(display_to_lesson), Some(i));
        }
    }

    #[test]
    fn test_select_lesson_rejects_huge_index() {
        let mut classroom = Classroom::new(mixed_course());
        assert_eq!(classroom.select_lesson(0), Ok(ContentType::Video));
        assert_eq!(classroom.position(), 1);

        let err = classroom.select_lesson(usize::MAX).unwrap_err();
        assert!(matches!(err, ClassroomError::OutOfRange { index: usize::MAX, .. }));
        assert_eq!(classroom.position(), 1);
    }

    #[test]
    fn test_opens_on_summary() {
        let classroom = Classroom::new(mixed_course());
        assert_eq!(classroom.position(), 0);
        assert_eq!(classroom.content_type(), ContentType::Summary);
        assert!(!classroom.can_prev());
        assert!(classroom.can_next());
    }

    #[test]
    fn test_select_renders_content_type() {
        let mut classroom = Classroom::new(mixed_course());
        assert_eq!(classroom.select(1), Ok(ContentType::Video));
        assert_eq!(classroom.select(2), Ok(ContentType::Youtube));
        assert_eq!(classroom.select(3), Ok(ContentType::Pdf));
        assert_eq!(classroom.select(0), Ok(ContentType::Summary));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut classroom = Classroom::new(mixed_course());
        classroom.select(2).unwrap();
        assert_eq!(
            classroom.select(4),
            Err(ClassroomError::OutOfRange { index: 4, last: 3 })
        );
        assert_eq!(classroom.position(), 2);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut classroom = Classroom::new(mixed_course());
        classroom.prev();
        assert_eq!(classroom.position(), 0);

        for _ in 0..10 {
            classroom.next();
        }
        assert_eq!(classroom.position(), 3);
        assert!(!classroom.can_next());

        classroom.prev();
        assert_eq!(classroom.position(), 2);
    }

    #[test]
    fn test_navigation_records_nothing() {
        let mut classroom = Classroom::new(mixed_course());
        classroom.next();
        classroom.next();
        classroom.prev();
        // First video still reports on first completion.
        assert_eq!(classroom.playback_ended(), Some(0));
    }

    #[test]
    fn test_playback_reports_once_per_lesson() {
        let mut classroom = Classroom::new(mixed_course());
        classroom.select(1).unwrap();
        assert_eq!(classroom.playback_ended(), Some(0));
        assert_eq!(classroom.playback_ended(), None);

        classroom.next();
        classroom.prev();
        assert_eq!(classroom.playback_ended(), None);
    }

    #[test]
    fn test_only_video_reports() {
        let mut classroom = Classroom::new(mixed_course());
        assert_eq!(classroom.playback_ended(), None);
        classroom.select(2).unwrap();
        assert_eq!(classroom.playback_ended(), None);
        classroom.select(3).unwrap();
        assert_eq!(classroom.playback_ended(), None);
    }

    #[test]
    fn test_empty_course_only_has_summary() {
        let mut classroom = Classroom::new(fixtures::course("empty", 0));
        assert_eq!(classroom.last_position(), 0);
        assert!(!classroom.can_next());
        assert_eq!(classroom.next(), ContentType::Summary);
        assert!(classroom.select(1).is_err());
    }
}
