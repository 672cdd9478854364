use serde::{Deserialize, Serialize};

/// A stored question/answer pair with optional attachments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub link: Option<String>,
    pub video: Option<String>,
    /// Blob store path of an uploaded picture
    pub picture: Option<String>,
    /// Blob store path of an uploaded document
    pub document: Option<String>,
}

/// Fields for a record that has not been stored yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    pub question: String,
    pub answer: String,
    pub link: Option<String>,
    pub video: Option<String>,
    pub picture: Option<String>,
    pub document: Option<String>,
}

impl NewRecord {
    #[cfg(test)]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ..Default::default()
        }
    }
}

/// A partial update. `None` leaves the stored value untouched.
///
/// The optional columns use `Option<Option<String>>` so an update can
/// distinguish "leave as is" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub link: Option<Option<String>>,
    pub video: Option<Option<String>>,
    pub picture: Option<Option<String>>,
    pub document: Option<Option<String>>,
}

impl RecordUpdate {
    /// Apply this update on top of an existing record
    pub fn apply(&self, record: &mut Record) {
        if let Some(question) = &self.question {
            record.question.clone_from(question);
        }
        if let Some(answer) = &self.answer {
            record.answer.clone_from(answer);
        }
        if let Some(link) = &self.link {
            record.link.clone_from(link);
        }
        if let Some(video) = &self.video {
            record.video.clone_from(video);
        }
        if let Some(picture) = &self.picture {
            record.picture.clone_from(picture);
        }
        if let Some(document) = &self.document {
            record.document.clone_from(document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            id: 1,
            question: "what are your hours".into(),
            answer: "9 to 5".into(),
            link: Some("https://example.com".into()),
            video: None,
            picture: None,
            document: None,
        }
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let mut record = sample();
        RecordUpdate::default().apply(&mut record);
        assert_eq!(record, sample());
    }

    #[test]
    fn test_update_overwrites_only_supplied_fields() {
        let mut record = sample();
        let update = RecordUpdate {
            answer: Some("10 to 6".into()),
            link: Some(None),
            picture: Some(Some("uploads/map.png".into())),
            ..Default::default()
        };
        update.apply(&mut record);

        assert_eq!(record.question, "what are your hours");
        assert_eq!(record.answer, "10 to 6");
        assert!(record.link.is_none());
        assert_eq!(record.picture.as_deref(), Some("uploads/map.png"));
        assert!(record.document.is_none());
    }
}
