//! Image URL assembly and the fixed image-fetch header contract.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;
use url::form_urlencoded;

pub const IMAGE_HOST: &str = "https://i.hamreus.com";

/// Characters `encodeURI` leaves untouched; everything else in a path gets
/// percent-encoded. Running decode-then-encode with this set is idempotent,
/// so half-encoded paths from the payload come out canonical.
const ENCODE_URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Build fetchable page URLs from relative path fragments and the signing
/// parameters, preserving payload order.
pub(super) fn build_image_urls(
    paths: &[String],
    sl: &BTreeMap<String, serde_json::Value>,
) -> Vec<String> {
    let query = signing_query(sl);
    paths
        .iter()
        .map(|path| {
            let path = normalize_path(path);
            if query.is_empty() {
                format!("{IMAGE_HOST}{path}")
            } else {
                format!("{IMAGE_HOST}{path}?{query}")
            }
        })
        .collect()
}

/// Form-encode the signing parameters. BTreeMap iteration gives a stable
/// sorted key order, so the same payload always yields the same URL.
fn signing_query(sl: &BTreeMap<String, serde_json::Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in sl {
        serializer.append_pair(key, &scalar_to_string(value));
    }
    serializer.finish()
}

fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Canonicalize percent-encoding in a path fragment.
fn normalize_path(path: &str) -> String {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    utf8_percent_encode(&decoded, ENCODE_URI).to_string()
}

/// Header set the image pipeline must send verbatim when fetching pages.
/// The CDN rejects requests without the referer and mobile user-agent.
pub fn image_headers() -> Vec<(String, String)> {
    [
        ("Host", "i.hamreus.com"),
        ("referer", "https://m.manhuagui.com/"),
        ("Connection", "keep-alive"),
        (
            "accept",
            "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8",
        ),
        ("accept-encoding", "gzip, deflate, br"),
        ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8"),
        ("sec-fetch-dest", "image"),
        ("sec-fetch-mode", "no-cors"),
        ("sec-fetch-site", "cross-site"),
        ("Cache-control", "no-cache"),
        (
            "user-agent",
            "Mozilla/5.0 (iPhone; CPU iPhone OS 13_2_3 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/13.0.3 Mobile/15E148 Safari/604.1",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sl(pairs: &[(&str, serde_json::Value)]) -> BTreeMap<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_urls_preserve_order_and_signing() {
        let paths: Vec<String> = (1..=5).map(|i| format!("/ps3/o/opm/190/{i}.jpg.webp")).collect();
        let urls = build_image_urls(&paths, &sl(&[("k", json!("abc"))]));

        assert_eq!(urls.len(), 5);
        for (i, url) in urls.iter().enumerate() {
            assert_eq!(
                *url,
                format!("https://i.hamreus.com/ps3/o/opm/190/{}.jpg.webp?k=abc", i + 1)
            );
        }
    }

    #[test]
    fn test_numeric_signing_values() {
        let urls = build_image_urls(
            &["/p/1.webp".to_string()],
            &sl(&[("m", json!("tok")), ("e", json!(1693000000))]),
        );
        // BTreeMap order: e before m
        assert_eq!(urls[0], "https://i.hamreus.com/p/1.webp?e=1693000000&m=tok");
    }

    #[test]
    fn test_empty_signing_set_omits_query() {
        let urls = build_image_urls(&["/p/1.webp".to_string()], &BTreeMap::new());
        assert_eq!(urls[0], "https://i.hamreus.com/p/1.webp");
    }

    #[test]
    fn test_path_normalization_is_idempotent() {
        let once = normalize_path("/ps3/漫画 页/1.webp");
        let twice = normalize_path(&once);
        assert_eq!(once, twice);
        assert!(once.starts_with("/ps3/%E6%BC%AB%E7%94%BB%20%E9%A1%B5/"));
    }

    #[test]
    fn test_already_encoded_path_unchanged() {
        let path = "/ps3/%E6%BC%AB%E7%94%BB/1.jpg.webp";
        assert_eq!(normalize_path(path), path);
    }

    #[test]
    fn test_header_contract() {
        let headers = image_headers();
        let get = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("Host"), Some("i.hamreus.com"));
        assert_eq!(get("referer"), Some("https://m.manhuagui.com/"));
        assert_eq!(get("sec-fetch-dest"), Some("image"));
        assert_eq!(get("sec-fetch-mode"), Some("no-cors"));
        assert_eq!(get("sec-fetch-site"), Some("cross-site"));
        assert!(get("user-agent").unwrap().contains("iPhone"));
    }
}
