//! Pure reductions over the extracted bookmark stream: how often each
//! domain is referenced, overall and per folder.

use std::collections::HashMap;

use crate::extractor::BookmarkRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFolderCount {
    pub domain: String,
    pub folder_path: String,
    pub count: u64,
}

/// Count bookmarks per domain. Records without a domain are skipped.
///
/// Sorted by count descending, then domain ascending — the secondary key
/// makes the order deterministic independent of map iteration order.
pub fn count_domains(records: &[BookmarkRecord]) -> Vec<DomainCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for record in records {
        if let Some(domain) = record.domain.as_deref() {
            *counts.entry(domain).or_default() += 1;
        }
    }

    let mut out: Vec<DomainCount> = counts
        .into_iter()
        .map(|(domain, count)| DomainCount { domain: domain.to_string(), count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
    out
}

/// Count bookmarks per (domain, folder path) pair, the folder path taken
/// verbatim (empty string for top-level bookmarks).
///
/// Sorted by count descending, then domain, then folder path.
pub fn count_domains_by_folder(records: &[BookmarkRecord]) -> Vec<DomainFolderCount> {
    let mut counts: HashMap<(&str, &str), u64> = HashMap::new();
    for record in records {
        if let Some(domain) = record.domain.as_deref() {
            *counts.entry((domain, record.folder_path.as_str())).or_default() += 1;
        }
    }

    let mut out: Vec<DomainFolderCount> = counts
        .into_iter()
        .map(|((domain, folder_path), count)| DomainFolderCount {
            domain: domain.to_string(),
            folder_path: folder_path.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.domain.cmp(&b.domain))
            .then_with(|| a.folder_path.cmp(&b.folder_path))
    });
    out
}
