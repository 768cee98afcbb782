mod common;

use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use tempfile::tempdir;
use wiremock::MockServer;

use common::wiremock_helpers::{mount_asn_response, mount_geo_response, test_config};
use hostmapper::enrich::Enricher;
use hostmapper::{aggregate, export, extractor};

const EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3>Work</H3>
    <DL><p>
        <DT><A HREF="https://example.com/dashboard" ADD_DATE="1658000001">Dashboard</A>
        <DT><A HREF="https://example.com/wiki" ADD_DATE="1658000002">Wiki</A>
    </DL><p>
    <DT><A HREF="https://example.com/" ADD_DATE="1658000003">Example</A>
    <DT><A HREF="https://other.org/page" ADD_DATE="1658000004">Other</A>
</DL><p>
"#;

#[test]
fn aggregation_counts_match_the_folder_structure() {
    let records = extractor::extract_bookmarks(EXPORT);
    assert_eq!(records.len(), 4);

    let domains = aggregate::count_domains(&records);
    let as_pairs: Vec<(&str, u64)> =
        domains.iter().map(|c| (c.domain.as_str(), c.count)).collect();
    assert_eq!(as_pairs, vec![("example.com", 3), ("other.org", 1)]);

    let by_folder = aggregate::count_domains_by_folder(&records);
    let as_triples: Vec<(&str, &str, u64)> = by_folder
        .iter()
        .map(|c| (c.domain.as_str(), c.folder_path.as_str(), c.count))
        .collect();
    assert_eq!(
        as_triples,
        vec![
            ("example.com", "Work", 2),
            ("example.com", "", 1),
            ("other.org", "", 1),
        ]
    );
}

#[test]
fn csv_tables_have_the_expected_columns_and_rows() {
    let records = extractor::extract_bookmarks(EXPORT);
    let domains = aggregate::count_domains(&records);
    let by_folder = aggregate::count_domains_by_folder(&records);

    let dir = tempdir().unwrap();

    let bookmarks_path = dir.path().join("bookmarks_flat.csv");
    export::export_bookmarks_csv(&records, &bookmarks_path).unwrap();
    let bookmarks_csv = fs::read_to_string(&bookmarks_path).unwrap();
    let mut lines = bookmarks_csv.lines();
    assert_eq!(
        lines.next(),
        Some("folder_path,title,url,domain,add_date,last_modified")
    );
    // Timestamps the export did not carry serialize as empty fields.
    assert_eq!(
        lines.next(),
        Some("Work,Dashboard,https://example.com/dashboard,example.com,1658000001,")
    );
    assert_eq!(bookmarks_csv.lines().count(), 5);

    let domains_path = dir.path().join("domains_references.csv");
    export::export_domain_counts_csv(&domains, &domains_path).unwrap();
    assert_eq!(
        fs::read_to_string(&domains_path).unwrap(),
        "domain,bookmark_count\nexample.com,3\nother.org,1\n"
    );

    let by_folder_path = dir.path().join("domains_by_folder.csv");
    export::export_domain_folder_csv(&by_folder, &by_folder_path).unwrap();
    assert_eq!(
        fs::read_to_string(&by_folder_path).unwrap(),
        "domain,folder_path,bookmark_count\n\
         example.com,Work,2\n\
         example.com,,1\n\
         other.org,,1\n"
    );
}

#[tokio::test]
async fn hostmap_serializes_absent_fields_as_empty() {
    let server = MockServer::start().await;
    mount_asn_response(&server, "192.0.2.20", 64501, "EXAMPLE-AS").await;
    mount_geo_response(&server, "192.0.2.20", "United States", "Dallas", 32.7767, -96.797).await;

    let records = extractor::extract_bookmarks(EXPORT);
    let domains = aggregate::count_domains(&records);

    // example.com resolves; other.org does not.
    let enricher = Enricher::from_config(&test_config(&server))
        .unwrap()
        .with_static_hosts(HashMap::from([(
            "example.com".to_string(),
            Ipv4Addr::new(192, 0, 2, 20),
        )]));
    let enriched = enricher.enrich_domains(&domains).await;

    let dir = tempdir().unwrap();
    let hostmap_path = dir.path().join("hostmap_references.csv");
    export::export_hostmap_csv(&enriched, &hostmap_path).unwrap();

    assert_eq!(
        fs::read_to_string(&hostmap_path).unwrap(),
        "domain,bookmark_count,ipv4,asn,org,geo_country,geo_city,lat,lon\n\
         example.com,3,192.0.2.20,64501,EXAMPLE-AS,United States,Dallas,32.7767,-96.797\n\
         other.org,1,,,,,,,\n"
    );
}

/// Two full runs over the same input and the same mocked lookups must
/// produce byte-identical tables.
#[tokio::test]
async fn pipeline_output_is_idempotent() {
    let server = MockServer::start().await;
    mount_asn_response(&server, "192.0.2.30", 64502, "STEADY-AS").await;
    mount_geo_response(&server, "192.0.2.30", "Japan", "Tokyo", 35.6762, 139.6503).await;

    let config = test_config(&server);
    let static_hosts = HashMap::from([(
        "example.com".to_string(),
        Ipv4Addr::new(192, 0, 2, 30),
    )]);

    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    run_pipeline(&config, static_hosts.clone(), first.path()).await;
    run_pipeline(&config, static_hosts, second.path()).await;

    for file in [
        "bookmarks_flat.csv",
        "domains_references.csv",
        "domains_by_folder.csv",
        "hostmap_references.csv",
    ] {
        let a = fs::read(first.path().join(file)).unwrap();
        let b = fs::read(second.path().join(file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
}

async fn run_pipeline(
    config: &hostmapper::config::AppConfig,
    static_hosts: HashMap<String, Ipv4Addr>,
    out_dir: &Path,
) {
    let records = extractor::extract_bookmarks(EXPORT);
    let domains = aggregate::count_domains(&records);
    let by_folder = aggregate::count_domains_by_folder(&records);

    export::export_bookmarks_csv(&records, &out_dir.join("bookmarks_flat.csv")).unwrap();
    export::export_domain_counts_csv(&domains, &out_dir.join("domains_references.csv")).unwrap();
    export::export_domain_folder_csv(&by_folder, &out_dir.join("domains_by_folder.csv")).unwrap();

    let enricher = Enricher::from_config(config).unwrap().with_static_hosts(static_hosts);
    let enriched = enricher.enrich_domains(&domains).await;
    export::export_hostmap_csv(&enriched, &out_dir.join("hostmap_references.csv")).unwrap();
}
