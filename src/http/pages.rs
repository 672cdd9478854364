//! HTML forms for managing records.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

use crate::types::Record;

/// Compiled page templates
pub struct Pages {
    registry: Handlebars<'static>,
}

/// A record as the templates see it, with blob paths turned into URLs
#[derive(Serialize)]
struct RecordView<'a> {
    id: i64,
    question: &'a str,
    answer: &'a str,
    link: Option<&'a str>,
    video: Option<&'a str>,
    picture_url: Option<String>,
    picture_name: Option<String>,
    document_url: Option<String>,
    document_name: Option<String>,
}

impl<'a> RecordView<'a> {
    fn new(record: &'a Record) -> Self {
        let picture_name = record.picture.as_deref().and_then(blob_name);
        let document_name = record.document.as_deref().and_then(blob_name);
        Self {
            id: record.id,
            question: &record.question,
            answer: &record.answer,
            link: record.link.as_deref(),
            video: record.video.as_deref(),
            picture_url: picture_name.as_deref().map(upload_url),
            picture_name,
            document_url: document_name.as_deref().map(upload_url),
            document_name,
        }
    }
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_partial("header", include_str!("../../templates/header.hbs"))
            .context("Failed to register header partial")?;
        for (name, source) in [
            ("add", include_str!("../../templates/add.hbs")),
            ("edit", include_str!("../../templates/edit.hbs")),
            ("view", include_str!("../../templates/view.hbs")),
        ] {
            registry
                .register_template_string(name, source)
                .with_context(|| format!("Failed to register template: {name}"))?;
        }
        Ok(Self { registry })
    }

    pub fn add(&self) -> Result<String> {
        self.render("add", &json!({}))
    }

    pub fn edit(&self, record: &Record) -> Result<String> {
        self.render("edit", &json!({ "record": RecordView::new(record) }))
    }

    pub fn view(&self, query: Option<&str>, records: &[Record]) -> Result<String> {
        let records: Vec<_> = records.iter().map(RecordView::new).collect();
        self.render(
            "view",
            &json!({ "query": query.unwrap_or_default(), "records": records }),
        )
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String> {
        self.registry
            .render(name, data)
            .with_context(|| format!("Failed to render template: {name}"))
    }
}

fn blob_name(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn upload_url(name: &str) -> String {
    format!("/uploads/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            id: 3,
            question: "<b>hours</b>".into(),
            answer: "9 to 5".into(),
            link: Some("https://example.com".into()),
            video: None,
            picture: Some("/data/.faqbot/uploads/map.png".into()),
            document: None,
        }
    }

    #[test]
    fn test_add_page_has_all_fields() {
        let html = Pages::new().unwrap().add().unwrap();
        for field in ["question", "answer", "link", "video", "picture", "document"] {
            assert!(html.contains(&format!("name=\"{field}\"")), "missing {field}");
        }
        assert!(html.contains("multipart/form-data"));
    }

    #[test]
    fn test_view_escapes_and_links_uploads() {
        let html = Pages::new().unwrap().view(Some("hours"), &[record()]).unwrap();
        assert!(html.contains("&lt;b&gt;hours&lt;/b&gt;"));
        assert!(!html.contains("<b>hours</b>"));
        assert!(html.contains("href=\"/uploads/map.png\""));
        assert!(html.contains("action=\"/delete/3\""));
        assert!(html.contains("value=\"hours\""));
    }

    #[test]
    fn test_view_without_records() {
        let html = Pages::new().unwrap().view(None, &[]).unwrap();
        assert!(html.contains("No records"));
    }

    #[test]
    fn test_edit_is_prefilled() {
        let html = Pages::new().unwrap().edit(&record()).unwrap();
        assert!(html.contains("action=\"/edit/3\""));
        assert!(html.contains("9 to 5"));
        assert!(html.contains("value=\"https://example.com\""));
        assert!(html.contains("map.png"));
    }
}
