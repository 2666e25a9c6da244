//! Shared card extractor for feed and search listings.
//!
//! Both operations return the same markup: a sequence of `li > a` cards, each
//! holding a heading, a status badge, a lazy-loaded cover and four `dl`
//! blocks read positionally as {author, tag, latest, update_time}.

use super::{absolutize, SOURCE};
use crate::identity::manga_hash;
use crate::models::{Manga, MangaStatus};
use regex::Regex;
use scraper::{Html, Selector};

const MANGA_ID_PATTERN: &str = r"^https://m\.manhuagui\.com/comic/([0-9]+)";

/// Extract catalog entries in document order.
///
/// Cards without a resolvable manga id or without a title are dropped
/// silently; ads and malformed cards are expected in listings and must not
/// fail the whole page.
pub(super) fn extract_catalog(text: &str) -> Vec<Manga> {
    let document = Html::parse_document(text);

    let card_sel = Selector::parse("li > a").unwrap();
    let title_sel = Selector::parse("h3").unwrap();
    let status_sel = Selector::parse("div.thumb i").unwrap();
    let cover_sel = Selector::parse("div.thumb img").unwrap();
    let field_sel = Selector::parse("dl").unwrap();
    let id_re = Regex::new(MANGA_ID_PATTERN).unwrap();

    let mut list = Vec::new();

    for card in document.select(&card_sel) {
        let Some(href) = card.value().attr("href") else {
            continue;
        };
        let href = absolutize(href);

        let manga_id = id_re
            .captures(&href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        let Some(manga_id) = manga_id else {
            log::debug!("skipping card without manga id: {href}");
            continue;
        };

        let title = card
            .select(&title_sel)
            .next()
            .map(|h| h.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if title.is_empty() {
            log::debug!("skipping untitled card: {href}");
            continue;
        }

        let status_label = card
            .select(&status_sel)
            .next()
            .map(|i| i.text().collect::<String>())
            .unwrap_or_default();

        let cover = card
            .select(&cover_sel)
            .next()
            .and_then(|img| img.value().attr("data-src"))
            .map(absolutize)
            .unwrap_or_default();

        // Four definition-list blocks, in fixed positional order.
        let mut fields = card
            .select(&field_sel)
            .map(|dl| dl.text().collect::<String>().trim().to_string());
        let author = fields.next().unwrap_or_default();
        let tag = fields.next().unwrap_or_default();
        let latest = fields.next().unwrap_or_default();
        let update_time = fields.next().unwrap_or_default();

        list.push(Manga {
            hash: manga_hash(SOURCE, &manga_id),
            href,
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
            chapters: Vec::new(),
        });
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, title: &str) -> String {
        format!(
            r#"<li><a href="/comic/{id}/">
                 <div class="thumb"><i>连载</i><img data-src="//cf.mhgui.com/cpic/m/{id}.jpg"/></div>
                 <h3>{title}</h3>
                 <dl><dt>作者</dt><dd>尾田荣一郎</dd></dl>
                 <dl><dt>类别</dt><dd>冒险</dd></dl>
                 <dl><dt>更新至</dt><dd>第1100话</dd></dl>
                 <dl><dt>更新于</dt><dd>2024-01-05</dd></dl>
               </a></li>"#
        )
    }

    #[test]
    fn test_extracts_card_fields() {
        let html = format!("<ul>{}</ul>", card("39917", "一拳超人"));
        let list = extract_catalog(&html);
        assert_eq!(list.len(), 1);

        let entry = &list[0];
        assert_eq!(entry.manga_id, "39917");
        assert_eq!(entry.title, "一拳超人");
        assert_eq!(entry.href, "https://m.manhuagui.com/comic/39917/");
        assert_eq!(entry.cover, "https://cf.mhgui.com/cpic/m/39917.jpg");
        assert_eq!(entry.status, MangaStatus::Serial);
        assert!(entry.author.contains("尾田荣一郎"));
        assert!(entry.tag.contains("冒险"));
        assert!(entry.latest.contains("第1100话"));
        assert!(entry.update_time.contains("2024-01-05"));
        assert!(entry.chapters.is_empty());
        assert_eq!(entry.hash, manga_hash(SOURCE, "39917"));
    }

    #[test]
    fn test_untitled_card_is_dropped_in_order() {
        let html = format!(
            "<ul>{}{}{}</ul>",
            card("1", "First"),
            card("2", ""),
            card("3", "Third")
        );
        let list = extract_catalog(&html);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].manga_id, "1");
        assert_eq!(list[1].manga_id, "3");
    }

    #[test]
    fn test_card_without_manga_id_is_dropped() {
        let html = r#"<ul>
            <li><a href="/rank/"><h3>排行榜</h3></a></li>
            <li><a href="/comic/100/"><h3>Kept</h3></a></li>
        </ul>"#;
        let list = extract_catalog(html);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "Kept");
    }

    #[test]
    fn test_empty_document_yields_empty_list() {
        assert!(extract_catalog("").is_empty());
        assert!(extract_catalog("<html><body><p>nothing</p></body></html>").is_empty());
    }
}
