//! Extraction engine for m.manhuagui.com (mobile layout).
//!
//! The site has no API: catalog and search results are HTML card listings,
//! detail pages come in two structural variants (a plain chapter list, or an
//! audit-gated page hiding the list inside an LZ-string blob), and chapter
//! pages embed their payload behind an obfuscated inline script. Each
//! operation pairs a request builder with a response handler that takes the
//! raw page text and produces typed records.

mod detail;
mod images;
mod listing;
mod reader_script;

pub use images::image_headers;

use crate::config::Config;
use crate::error::ExtractResult;
use crate::models::{Chapter, Manga, Source};
use crate::request::RequestSpec;
use url::form_urlencoded;

pub const SOURCE: Source = Source::Manhuagui;
pub const BASE_URL: &str = "https://m.manhuagui.com";

/// Resolve a document-relative or protocol-relative reference against the
/// site origin. Covers href, data-src and src attributes as they appear in
/// the wild.
pub(crate) fn absolutize(reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }
    if reference.starts_with("//") {
        return format!("https:{reference}");
    }
    if reference.starts_with('/') {
        return format!("{BASE_URL}{reference}");
    }
    format!("{BASE_URL}/{}", reference.trim_start_matches("./"))
}

/// Build the feed (recently updated) request for one page.
pub fn feed_request(page: u32, cfg: &Config) -> RequestSpec {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("page", &page.to_string())
        .append_pair("ajax", "1")
        .append_pair("order", "1")
        .finish();

    let base = if cfg.use_mock {
        format!("{}/update", cfg.proxy_base)
    } else {
        format!("{BASE_URL}/update/")
    };

    RequestSpec::get(format!("{base}?{query}"))
}

/// Build the search request. The first page is a plain POST to the keyword
/// URL; later pages carry the paging parameters as a form body.
pub fn search_request(keyword: &str, page: u32, cfg: &Config) -> RequestSpec {
    let url = if cfg.use_mock {
        format!("{}/search", cfg.proxy_base)
    } else {
        format!("{BASE_URL}/s/{keyword}.html/")
    };

    let form = if page > 1 {
        vec![
            ("key".to_string(), keyword.to_string()),
            ("page".to_string(), page.to_string()),
            ("ajax".to_string(), "1".to_string()),
            ("order".to_string(), "1".to_string()),
        ]
    } else {
        Vec::new()
    };

    RequestSpec::post(url, form)
}

/// Build the detail page request for a manga.
pub fn detail_request(manga_id: &str, cfg: &Config) -> RequestSpec {
    let url = if cfg.use_mock {
        format!("{}/manga", cfg.proxy_base)
    } else {
        format!("{BASE_URL}/comic/{manga_id}")
    };
    RequestSpec::get(url)
}

/// Build the chapter page request.
pub fn chapter_request(manga_id: &str, chapter_id: &str, cfg: &Config) -> RequestSpec {
    let url = if cfg.use_mock {
        format!("{}/chapter", cfg.proxy_base)
    } else {
        format!("{BASE_URL}/comic/{manga_id}/{chapter_id}.html")
    };
    RequestSpec::get(url)
}

/// Extract catalog entries from a feed page.
pub fn handle_feed(text: &str) -> ExtractResult<Vec<Manga>> {
    Ok(listing::extract_catalog(text))
}

/// Extract catalog entries from a search result page. Search results share
/// the feed's card markup, so both handlers run the same extractor.
pub fn handle_search(text: &str) -> ExtractResult<Vec<Manga>> {
    Ok(listing::extract_catalog(text))
}

/// Extract a manga's metadata and full chapter index from a detail page.
pub fn handle_detail(text: &str) -> ExtractResult<Manga> {
    detail::extract_detail(text)
}

/// Decode a chapter page into its payload: ids, titles, ordered image URLs
/// and the fixed image-fetch header set.
pub fn handle_chapter(text: &str) -> ExtractResult<Chapter> {
    reader_script::extract_chapter(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;

    fn live() -> Config {
        Config::default()
    }

    fn mock() -> Config {
        Config {
            use_mock: true,
            proxy_base: "http://127.0.0.1:9000".to_string(),
        }
    }

    #[test]
    fn test_feed_request_is_get_with_query() {
        let spec = feed_request(3, &live());
        assert_eq!(spec.method, HttpMethod::Get);
        assert_eq!(
            spec.url,
            "https://m.manhuagui.com/update/?page=3&ajax=1&order=1"
        );
        assert!(spec.form.is_empty());
    }

    #[test]
    fn test_search_first_page_omits_body() {
        let spec = search_request("one piece", 1, &live());
        assert_eq!(spec.method, HttpMethod::Post);
        assert_eq!(spec.url, "https://m.manhuagui.com/s/one piece.html/");
        assert!(spec.form.is_empty());
    }

    #[test]
    fn test_search_later_pages_carry_form_body() {
        let spec = search_request("魔都", 2, &live());
        assert_eq!(
            spec.form,
            vec![
                ("key".to_string(), "魔都".to_string()),
                ("page".to_string(), "2".to_string()),
                ("ajax".to_string(), "1".to_string()),
                ("order".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_detail_and_chapter_requests() {
        assert_eq!(
            detail_request("39917", &live()).url,
            "https://m.manhuagui.com/comic/39917"
        );
        assert_eq!(
            chapter_request("39917", "573068", &live()).url,
            "https://m.manhuagui.com/comic/39917/573068.html"
        );
    }

    #[test]
    fn test_mock_mode_switches_origin_only() {
        assert!(feed_request(1, &mock())
            .url
            .starts_with("http://127.0.0.1:9000/update?"));
        assert_eq!(search_request("x", 1, &mock()).url, "http://127.0.0.1:9000/search");
        assert_eq!(detail_request("1", &mock()).url, "http://127.0.0.1:9000/manga");
        assert_eq!(
            chapter_request("1", "2", &mock()).url,
            "http://127.0.0.1:9000/chapter"
        );
    }

    #[test]
    fn test_absolutize_variants() {
        assert_eq!(
            absolutize("/comic/39917/"),
            "https://m.manhuagui.com/comic/39917/"
        );
        assert_eq!(
            absolutize("//cf.mhgui.com/cpic/m/39917.jpg"),
            "https://cf.mhgui.com/cpic/m/39917.jpg"
        );
        assert_eq!(absolutize("https://m.manhuagui.com/x"), "https://m.manhuagui.com/x");
        assert_eq!(absolutize("./rank/"), "https://m.manhuagui.com/rank/");
    }
}
