// Per-site extraction modules. Each source exposes request builders for its
// four operations (feed, search, detail, chapter) and matching response
// handlers that turn raw page text into domain records.

pub mod manhuagui;
