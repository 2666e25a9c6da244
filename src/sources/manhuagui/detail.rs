//! Detail page extractor.
//!
//! Detail pages come in two variants. Normally the chapter index sits in a
//! plain `#chapterList` container. Audit-gated pages (`#erroraudit_show`
//! present) hide the real listing inside `#__VIEWSTATE`: an LZ-string blob in
//! base64 alphabet that decompresses to a second HTML fragment. Both variants
//! share one chapter-extraction routine; metadata is read the same way
//! regardless of variant.

use super::{absolutize, BASE_URL, SOURCE};
use crate::error::{ExtractError, ExtractResult};
use crate::identity::{chapter_hash, manga_hash};
use crate::models::{ChapterItem, Manga, MangaStatus};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const MANGA_INFO_PATTERN: &str = r"\{ bid:([0-9]*), status:[0-9]*,block_cc:'' \}";
const CHAPTER_ID_PATTERN: &str = r"^https://m\.manhuagui\.com/comic/([0-9]+)/([0-9]+)(?:\.html|$)";

pub(super) fn extract_detail(text: &str) -> ExtractResult<Manga> {
    let document = Html::parse_document(text);

    let manga_id = find_manga_id(&document)?;

    let title_sel = Selector::parse("div.main-bar > h1").unwrap();
    let title = document
        .select(&title_sel)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    if title.is_empty() {
        return Err(ExtractError::MissingField { field: "title" });
    }

    let status_sel = Selector::parse("div.book-detail div.thumb i").unwrap();
    let status_label = document
        .select(&status_sel)
        .next()
        .map(|i| i.text().collect::<String>())
        .unwrap_or_default();

    let cover_sel = Selector::parse("div.thumb img").unwrap();
    let cover = document
        .select(&cover_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(absolutize)
        .unwrap_or_default();

    // Positional metadata blocks; note the order differs from listing cards.
    let field_sel = Selector::parse("div.cont-list dl").unwrap();
    let mut fields = document
        .select(&field_sel)
        .map(|dl| dl.text().collect::<String>().trim().to_string());
    let latest = fields.next().unwrap_or_default();
    let update_time = fields.next().unwrap_or_default();
    let author = fields.next().unwrap_or_default();
    let tag = fields.next().unwrap_or_default();

    let chapters = extract_chapter_index(&document, &manga_id)?;

    Ok(Manga {
        href: format!("{BASE_URL}/comic/{manga_id}"),
        hash: manga_hash(SOURCE, &manga_id),
        source: SOURCE,
        source_name: SOURCE.name().to_string(),
        manga_id,
        title,
        status: MangaStatus::from_label(&status_label),
        cover,
        latest,
        update_time,
        author,
        tag,
        chapters,
    })
}

/// The natural id lives in an inline bootstrap script, not in the markup.
fn find_manga_id(document: &Html) -> ExtractResult<String> {
    let script_sel = Selector::parse("script:not([src])").unwrap();
    let info_re = Regex::new(MANGA_INFO_PATTERN).unwrap();

    document
        .select(&script_sel)
        .filter_map(|script| {
            let content = script.text().collect::<String>();
            info_re
                .captures(&content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .find(|id| !id.is_empty())
        .ok_or(ExtractError::MissingField { field: "manga_id" })
}

/// Select the page variant and read the chapter index.
fn extract_chapter_index(document: &Html, manga_id: &str) -> ExtractResult<Vec<ChapterItem>> {
    let audit_sel = Selector::parse("#erroraudit_show").unwrap();

    if document.select(&audit_sel).next().is_some() {
        log::debug!("audit-gated detail page for manga {manga_id}");

        let blob_sel = Selector::parse("#__VIEWSTATE").unwrap();
        let blob = document
            .select(&blob_sel)
            .next()
            .and_then(|input| input.value().attr("value"))
            .ok_or_else(|| {
                ExtractError::StructuralMismatch(
                    "audit-gated page without #__VIEWSTATE blob".to_string(),
                )
            })?;

        let fragment_html = decompress_from_base64(blob)?;
        let fragment = Html::parse_fragment(&fragment_html);
        let anchor_sel = Selector::parse("ul > li > a").unwrap();
        let chapters = collect_chapters(fragment.select(&anchor_sel));

        // A gated page that decodes to nothing is a decode problem, not a
        // manga without chapters.
        if chapters.is_empty() {
            return Err(ExtractError::DecodeFailure(
                "audit-gated chapter fragment yielded no chapters".to_string(),
            ));
        }
        Ok(chapters)
    } else {
        let anchor_sel = Selector::parse("#chapterList > ul > li > a").unwrap();
        Ok(collect_chapters(document.select(&anchor_sel)))
    }
}

/// Shared chapter-anchor extraction, used by both page variants.
fn collect_chapters<'a>(anchors: impl Iterator<Item = ElementRef<'a>>) -> Vec<ChapterItem> {
    let title_sel = Selector::parse("b").unwrap();
    let id_re = Regex::new(CHAPTER_ID_PATTERN).unwrap();

    let mut chapters = Vec::new();
    for anchor in anchors {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = absolutize(href);

        let Some(caps) = id_re.captures(&href) else {
            log::debug!("skipping chapter anchor without ids: {href}");
            continue;
        };
        let manga_id = caps[1].to_string();
        let chapter_id = caps[2].to_string();

        let title = anchor
            .select(&title_sel)
            .next()
            .map(|b| b.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        chapters.push(ChapterItem {
            hash: chapter_hash(SOURCE, &manga_id, &chapter_id),
            manga_id,
            chapter_id,
            href,
            title,
        });
    }
    chapters
}

/// Decompress an LZ-string blob in base64 alphabet into UTF-8 text.
fn decompress_from_base64(blob: &str) -> ExtractResult<String> {
    let units = lz_str::decompress_from_base64(blob).ok_or_else(|| {
        ExtractError::DecodeFailure("LZ-string blob did not decompress".to_string())
    })?;
    String::from_utf16(&units).map_err(|_| {
        ExtractError::DecodeFailure("decompressed blob is not valid UTF-16".to_string())
    })
}
