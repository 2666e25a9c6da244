use serde::{Deserialize, Serialize};

/// Registry of supported content sources.
///
/// The numeric discriminant is part of every composite hash, so values are
/// stable and never reused once assigned.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Manhuagui = 1,
}

impl Source {
    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Source::Manhuagui => "manhuagui",
        }
    }
}

/// Publication status of a manga as advertised by the source site.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum MangaStatus {
    #[default]
    Unknown,
    Serial,
    Ended,
}

impl MangaStatus {
    /// Map a raw status label to a status value. The site uses "连载" for
    /// ongoing and "完结" for finished; anything else resolves to `Unknown`
    /// rather than an error.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "连载" => MangaStatus::Serial,
            "完结" => MangaStatus::Ended,
            _ => MangaStatus::Unknown,
        }
    }
}

/// A manga record as extracted from a listing card or a detail page.
///
/// Listing extraction leaves `chapters` empty; detail extraction populates it
/// in document order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Manga {
    pub href: String,
    pub hash: String,
    pub source: Source,
    pub source_name: String,
    pub manga_id: String,
    pub title: String,
    pub status: MangaStatus,
    pub cover: String,
    pub latest: String,
    pub update_time: String,
    pub author: String,
    pub tag: String,
    pub chapters: Vec<ChapterItem>,
}

/// One entry of a manga's chapter index.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChapterItem {
    pub hash: String,
    pub manga_id: String,
    pub chapter_id: String,
    pub href: String,
    pub title: String,
}

/// A fully decoded chapter payload, ready for the image pipeline.
///
/// `images` holds the page URLs in reading order; `headers` is the fixed
/// header set the image fetcher must send verbatim.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Chapter {
    pub hash: String,
    pub manga_id: String,
    pub chapter_id: String,
    pub name: String,
    pub title: String,
    pub headers: Vec<(String, String)>,
    pub images: Vec<String>,
    pub next_id: Option<String>,
    pub prev_id: Option<String>,
}
