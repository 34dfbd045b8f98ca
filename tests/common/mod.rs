//! Shared fixtures: an in-memory content store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use imgset_inspector::adapters::{ContentResolver, ResolveError};
use imgset_inspector::domain::{ContentKind, ContentRecord};

pub const GOOD_TAG: &str = "tid_test_publish";
pub const IMAGE_SET_TYPE: &str = "http://www.ft.com/ontology/content/ImageSet";

/// Resolver backed by a map; records every resolve call
#[derive(Default)]
pub struct MemoryStore {
    records: HashMap<String, Result<ContentRecord, ResolveError>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, record: ContentRecord) -> Self {
        self.records.insert(record.id.clone(), Ok(record));
        self
    }

    pub fn with_error(mut self, id: &str, error: ResolveError) -> Self {
        self.records.insert(id.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentResolver for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn resolve(&self, id: &str) -> Result<ContentRecord, ResolveError> {
        self.calls.lock().unwrap().push(id.to_string());
        self.records
            .get(id)
            .cloned()
            .unwrap_or(Err(ResolveError::NotFound))
    }
}

fn record(id: &str, kind: ContentKind) -> ContentRecord {
    ContentRecord {
        id: id.to_string(),
        kind,
        main_image_id: None,
        provenance_tag: GOOD_TAG.to_string(),
    }
}

pub fn image(id: &str) -> ContentRecord {
    record(id, ContentKind::Image)
}

pub fn graphic(id: &str) -> ContentRecord {
    record(id, ContentKind::Graphic)
}

pub fn image_set(id: &str, members: &[&str]) -> ContentRecord {
    record(
        id,
        ContentKind::ImageSet {
            members: members.iter().map(|m| m.to_string()).collect(),
        },
    )
}

pub fn article(id: &str, body: &str, main_image: Option<&str>) -> ContentRecord {
    let mut article = record(
        id,
        ContentKind::Article {
            body_markup: Some(body.to_string()),
        },
    );
    article.main_image_id = main_image.map(str::to_string);
    article
}

pub fn other(id: &str, type_name: &str) -> ContentRecord {
    record(
        id,
        ContentKind::Other {
            type_name: type_name.to_string(),
        },
    )
}

pub fn with_tag(mut record: ContentRecord, tag: &str) -> ContentRecord {
    record.provenance_tag = tag.to_string();
    record
}

/// `<ft-content>` embedding an image set by url
pub fn embed(id: &str) -> String {
    format!(
        r#"<ft-content type="{}" url="http://api.ft.com/content/{}"></ft-content>"#,
        IMAGE_SET_TYPE, id
    )
}
