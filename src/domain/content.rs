//! Content records resolved from the document store.
//!
//! A `ContentDocument` is the raw JSON shape the store returns. It is turned
//! into a `ContentRecord` whose `ContentKind` only carries the fields that are
//! meaningful for that type.

use serde::{Deserialize, Serialize};

/// Member entry of an image set as stored (`{"uuid": "..."}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    #[serde(default)]
    pub uuid: String,
}

/// Raw document-store payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentDocument {
    #[serde(default)]
    pub uuid: String,

    #[serde(default, rename = "type")]
    pub content_type: String,

    #[serde(default, rename = "mainImage")]
    pub main_image: String,

    #[serde(default)]
    pub members: Vec<MemberRef>,

    /// Newer content carries its markup here
    #[serde(default)]
    pub body: String,

    /// Older content carries its markup here instead
    #[serde(default, rename = "bodyXML")]
    pub body_xml: String,

    #[serde(default, rename = "publishReference")]
    pub publish_reference: String,
}

impl ContentDocument {
    /// Markup of the document, preferring `body` over `bodyXML`
    pub fn markup(&self) -> Option<&str> {
        if !self.body.is_empty() {
            Some(&self.body)
        } else if !self.body_xml.is_empty() {
            Some(&self.body_xml)
        } else {
            None
        }
    }
}

/// Recognised content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Image,
    Graphic,
    ImageSet,
    Article,
    Other,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Image => write!(f, "Image"),
            ContentType::Graphic => write!(f, "Graphic"),
            ContentType::ImageSet => write!(f, "ImageSet"),
            ContentType::Article => write!(f, "Article"),
            ContentType::Other => write!(f, "Other"),
        }
    }
}

impl ContentType {
    /// Map a store type string. Matching is exact; anything else is `Other`.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Image" => ContentType::Image,
            "Graphic" => ContentType::Graphic,
            "ImageSet" => ContentType::ImageSet,
            "Article" => ContentType::Article,
            _ => ContentType::Other,
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_type_name(s))
    }
}

/// Type-specific payload of a content record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Image,
    Graphic,
    ImageSet { members: Vec<String> },
    Article { body_markup: Option<String> },
    /// Type string outside the recognised set, kept verbatim
    Other { type_name: String },
}

impl ContentKind {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentKind::Image => ContentType::Image,
            ContentKind::Graphic => ContentType::Graphic,
            ContentKind::ImageSet { .. } => ContentType::ImageSet,
            ContentKind::Article { .. } => ContentType::Article,
            ContentKind::Other { .. } => ContentType::Other,
        }
    }
}

/// A resolved content item. Built fresh for every resolve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: String,
    pub kind: ContentKind,
    pub main_image_id: Option<String>,
    pub provenance_tag: String,
}

impl ContentRecord {
    /// Build a record from a store document.
    ///
    /// `requested_id` is used when the document does not carry its own uuid.
    pub fn from_document(requested_id: &str, doc: ContentDocument) -> Self {
        let body_markup = doc.markup().map(str::to_string);

        let kind = match ContentType::from_type_name(&doc.content_type) {
            ContentType::Image => ContentKind::Image,
            ContentType::Graphic => ContentKind::Graphic,
            ContentType::ImageSet => ContentKind::ImageSet {
                members: doc.members.into_iter().map(|m| m.uuid).collect(),
            },
            ContentType::Article => ContentKind::Article { body_markup },
            ContentType::Other => ContentKind::Other {
                type_name: doc.content_type,
            },
        };

        let id = if doc.uuid.is_empty() {
            requested_id.to_string()
        } else {
            doc.uuid
        };

        Self {
            id,
            kind,
            main_image_id: Some(doc.main_image).filter(|m| !m.is_empty()),
            provenance_tag: doc.publish_reference,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.kind.content_type()
    }
}
