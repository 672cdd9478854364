//! Multipart record forms submitted by the add and edit pages.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::types::{NewRecord, RecordUpdate};
use crate::uploads::BlobStore;

/// Why a submitted form could not become a record
#[derive(Debug, thiserror::Error)]
pub(super) enum FormError {
    #[error("{0}")]
    Invalid(String),

    #[error("Failed to store upload: {0:#}")]
    Upload(anyhow::Error),
}

struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// Text fields and file parts of one submitted form
#[derive(Default)]
pub(super) struct RecordForm {
    texts: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl RecordForm {
    /// Drain a multipart body. File parts without a filename are ignored,
    /// which is what browsers send when no file was chosen.
    pub(super) async fn read(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Invalid(format!("Invalid multipart content: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(|e| {
                        FormError::Invalid(format!("Failed to read file {name}: {e}"))
                    })?;
                    if !file_name.is_empty() {
                        form.files.insert(name, Upload { file_name, bytes });
                    }
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        FormError::Invalid(format!("Failed to read field {name}: {e}"))
                    })?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Build a new record; question and answer must be present and non-empty
    pub(super) fn to_new_record(&self, blobs: &BlobStore) -> Result<NewRecord, FormError> {
        let question = self.required("question")?;
        let answer = self.required("answer")?;

        Ok(NewRecord {
            question,
            answer,
            link: self.optional("link").flatten(),
            video: self.optional("video").flatten(),
            picture: self.save_file(blobs, "picture")?,
            document: self.save_file(blobs, "document")?,
        })
    }

    /// Build an update from whatever the form carries.
    ///
    /// Text fields overwrite when present; files overwrite only when a new
    /// file of an allowed type was supplied.
    pub(super) fn to_update(&self, blobs: &BlobStore) -> Result<RecordUpdate, FormError> {
        Ok(RecordUpdate {
            question: self.required_if_present("question")?,
            answer: self.required_if_present("answer")?,
            link: self.optional("link"),
            video: self.optional("video"),
            picture: self.save_file(blobs, "picture")?.map(Some),
            document: self.save_file(blobs, "document")?.map(Some),
        })
    }

    fn required(&self, name: &str) -> Result<String, FormError> {
        match self.texts.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.clone()),
            Some(_) => Err(FormError::Invalid(format!("Field must not be empty: {name}"))),
            None => Err(FormError::Invalid(format!("Missing required field: {name}"))),
        }
    }

    fn required_if_present(&self, name: &str) -> Result<Option<String>, FormError> {
        self.texts
            .get(name)
            .map(|_| self.required(name))
            .transpose()
    }

    /// `None` when the field is absent, `Some(None)` when it was left blank
    fn optional(&self, name: &str) -> Option<Option<String>> {
        self.texts
            .get(name)
            .map(|value| Some(value.clone()).filter(|v| !v.trim().is_empty()))
    }

    fn save_file(&self, blobs: &BlobStore, name: &str) -> Result<Option<String>, FormError> {
        match self.files.get(name) {
            Some(upload) => blobs
                .save(&upload.file_name, &upload.bytes)
                .map_err(FormError::Upload),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn form(texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> RecordForm {
        RecordForm {
            texts: texts
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            files: files
                .iter()
                .map(|(k, name, bytes)| {
                    (
                        (*k).to_string(),
                        Upload {
                            file_name: (*name).to_string(),
                            bytes: Bytes::copy_from_slice(bytes),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_new_record_requires_question_and_answer() {
        let dir = tempdir().unwrap();
        let blobs = BlobStore::new(dir.path());

        let err = form(&[("question", "q")], &[])
            .to_new_record(&blobs)
            .unwrap_err();
        assert!(err.to_string().contains("answer"));

        let err = form(&[("question", "  "), ("answer", "a")], &[])
            .to_new_record(&blobs)
            .unwrap_err();
        assert!(matches!(err, FormError::Invalid(_)));
    }

    #[test]
    fn test_new_record_blank_optionals_are_absent() {
        let dir = tempdir().unwrap();
        let blobs = BlobStore::new(dir.path());

        let record = form(
            &[("question", "q"), ("answer", "a"), ("link", ""), ("video", "https://v")],
            &[],
        )
        .to_new_record(&blobs)
        .unwrap();

        assert!(record.link.is_none());
        assert_eq!(record.video.as_deref(), Some("https://v"));
    }

    #[test]
    fn test_new_record_saves_only_allowed_files() {
        let dir = tempdir().unwrap();
        let blobs = BlobStore::new(dir.path());

        let record = form(
            &[("question", "q"), ("answer", "a")],
            &[("picture", "x.png", &b"png"[..]), ("document", "x.exe", &b"exe"[..])],
        )
        .to_new_record(&blobs)
        .unwrap();

        assert!(record.picture.unwrap().ends_with("x.png"));
        assert!(record.document.is_none());
    }

    #[test]
    fn test_update_touches_only_present_fields() {
        let dir = tempdir().unwrap();
        let blobs = BlobStore::new(dir.path());

        let update = form(&[("answer", "new"), ("link", "")], &[("picture", "bad.txt", &b""[..])])
            .to_update(&blobs)
            .unwrap();

        assert_eq!(
            update,
            RecordUpdate {
                answer: Some("new".into()),
                link: Some(None),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_update_replaces_file_with_valid_upload() {
        let dir = tempdir().unwrap();
        let blobs = BlobStore::new(dir.path());

        let update = form(&[], &[("document", "menu.pdf", &b"%PDF"[..])])
            .to_update(&blobs)
            .unwrap();

        let stored = dir.path().join("menu.pdf");
        assert_eq!(
            update.document,
            Some(Some(stored.to_string_lossy().into_owned()))
        );
        assert!(update.picture.is_none());
        assert!(update.question.is_none());
        assert_eq!(std::fs::read(stored).unwrap(), b"%PDF");
    }

    #[test]
    fn test_update_rejects_blank_question() {
        let dir = tempdir().unwrap();
        let blobs = BlobStore::new(dir.path());

        let result = form(&[("question", "")], &[]).to_update(&blobs);
        assert!(matches!(result, Err(FormError::Invalid(_))));
    }
}
