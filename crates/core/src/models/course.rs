use serde::{Deserialize, Serialize};

/// What a lesson shows in the classroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LessonContent {
    /// Hosted video file; reaching its end marks the lesson watched.
    Video { url: String },
    /// Embedded YouTube video.
    Youtube { url: String },
    Pdf { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub content: LessonContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(alias = "_id")]
    pub id: String,
    /// Owning community id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Duration in weeks.
    #[serde(default, rename = "duration")]
    pub duration_weeks: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    /// Video asset references of older course records without typed lessons.
    #[serde(default)]
    pub videos: Vec<String>,
}

impl Course {
    /// Number of completable units: typed lessons when present, otherwise
    /// the legacy video list.
    pub fn lesson_count(&self) -> usize {
        if self.lessons.is_empty() {
            self.videos.len()
        } else {
            self.lessons.len()
        }
    }

    pub fn lesson(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_lessons() {
        let json = r#"{
            "_id": "k1",
            "name": "Rust 101",
            "duration": 6,
            "lessons": [
                {"title": "Intro", "type": "video", "url": "https://cdn/1.mp4"},
                {"title": "Talk", "type": "youtube", "url": "https://youtu.be/x"},
                {"title": "Notes", "type": "pdf", "url": "https://cdn/n.pdf", "summary": "read me"}
            ]
        }"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.duration_weeks, 6);
        assert_eq!(course.lesson_count(), 3);
        assert!(matches!(course.lessons[0].content, LessonContent::Video { .. }));
        assert!(matches!(course.lessons[1].content, LessonContent::Youtube { .. }));
        assert_eq!(course.lessons[2].summary.as_deref(), Some("read me"));
    }

    #[test]
    fn test_legacy_video_list_counts() {
        let course: Course =
            serde_json::from_str(r#"{"id":"k2","name":"Old","videos":["a","b","c","d"]}"#)
                .unwrap();
        assert_eq!(course.lesson_count(), 4);
    }
}
