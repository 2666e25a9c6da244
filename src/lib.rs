// Content extraction engine for manga hosting sites without a stable API.
//
// The engine turns raw per-operation page text into typed domain records:
// catalog entries from feed/search listings, detail records with an ordered
// chapter index, and chapter payloads with ordered image URLs. It performs no
// network I/O; callers fetch the documents described by the request builders
// and hand the response text to the matching handler.

pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod request;
pub mod sources;
