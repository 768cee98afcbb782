use std::fs::File;
use std::path::Path;

use anyhow::Result;
use csv::Writer;
use tracing::{debug, info};

use crate::aggregate::{DomainCount, DomainFolderCount};
use crate::enrich::HostRecord;
use crate::extractor::BookmarkRecord;

/// Flat bookmark table, one row per bookmark in document order.
pub fn export_bookmarks_csv(records: &[BookmarkRecord], output_path: &Path) -> Result<()> {
    debug!("Exporting {} bookmarks to {}", records.len(), output_path.display());

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(["folder_path", "title", "url", "domain", "add_date", "last_modified"])?;
    for record in records {
        wtr.write_record([
            record.folder_path.as_str(),
            record.title.as_str(),
            record.url.as_str(),
            record.domain.as_deref().unwrap_or(""),
            record.add_date.as_deref().unwrap_or(""),
            record.last_modified.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    info!("Exported {} bookmarks to {}", records.len(), output_path.display());
    Ok(())
}

/// Per-domain bookmark counts, descending by count.
pub fn export_domain_counts_csv(counts: &[DomainCount], output_path: &Path) -> Result<()> {
    debug!("Exporting {} domain counts to {}", counts.len(), output_path.display());

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(["domain", "bookmark_count"])?;
    for entry in counts {
        wtr.write_record([entry.domain.as_str(), entry.count.to_string().as_str()])?;
    }

    wtr.flush()?;
    info!("Exported {} domain counts to {}", counts.len(), output_path.display());
    Ok(())
}

/// Per-(domain, folder) bookmark counts, descending by count.
pub fn export_domain_folder_csv(counts: &[DomainFolderCount], output_path: &Path) -> Result<()> {
    debug!(
        "Exporting {} domain/folder counts to {}",
        counts.len(),
        output_path.display()
    );

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(["domain", "folder_path", "bookmark_count"])?;
    for entry in counts {
        wtr.write_record([
            entry.domain.as_str(),
            entry.folder_path.as_str(),
            entry.count.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    info!(
        "Exported {} domain/folder counts to {}",
        counts.len(),
        output_path.display()
    );
    Ok(())
}

/// Hostmap table for the enriched top domains. Absent lookup results
/// serialize as empty fields.
pub fn export_hostmap_csv(records: &[HostRecord], output_path: &Path) -> Result<()> {
    debug!("Exporting {} host records to {}", records.len(), output_path.display());

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record([
        "domain",
        "bookmark_count",
        "ipv4",
        "asn",
        "org",
        "geo_country",
        "geo_city",
        "lat",
        "lon",
    ])?;
    for record in records {
        wtr.write_record([
            record.domain.as_str(),
            record.bookmark_count.to_string().as_str(),
            record.ipv4.map(|ip| ip.to_string()).unwrap_or_default().as_str(),
            record.asn.as_deref().unwrap_or(""),
            record.org.as_deref().unwrap_or(""),
            record.geo_country.as_deref().unwrap_or(""),
            record.geo_city.as_deref().unwrap_or(""),
            record.lat.map(|v| v.to_string()).unwrap_or_default().as_str(),
            record.lon.map(|v| v.to_string()).unwrap_or_default().as_str(),
        ])?;
    }

    wtr.flush()?;
    info!("Exported {} host records to {}", records.len(), output_path.display());
    Ok(())
}

/// End-of-run summary printed to stdout.
pub fn print_run_summary(
    bookmarks: &[BookmarkRecord],
    domains: &[DomainCount],
    enriched: Option<&[HostRecord]>,
) {
    let with_domain = bookmarks.iter().filter(|b| b.domain.is_some()).count();

    println!();
    println!("📊 Summary:");
    println!("   🔖 Bookmarks: {} ({} with a domain)", bookmarks.len(), with_domain);
    println!("   🌐 Distinct domains: {}", domains.len());
    match enriched {
        Some(records) => {
            let resolved = records.iter().filter(|r| r.ipv4.is_some()).count();
            println!("   🗺  Enriched domains: {} ({} resolved)", records.len(), resolved);
        }
        None => println!("   🗺  Enrichment skipped"),
    }
}
