use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hostmapper::config::AppConfig;

/// Build a config whose ASN and geo endpoints point at a mock server, with
/// the inter-domain delay disabled so test batches run instantly.
pub fn test_config(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::embedded_default().expect("default template must be valid");
    config.enrichment.asn_api_url =
        format!("{}/data/prefix-overview/data.json", server.uri());
    config.enrichment.geo_api_url = format!("{}/json", server.uri());
    config.enrichment.inter_domain_delay_ms = 0;
    config.http.request_timeout_secs = 2;
    config
}

/// Mount an ASN lookup response for one IP in the prefix-overview shape:
/// a `data.asns` list of `{asn, holder}` entries.
pub async fn mount_asn_response(server: &MockServer, ip: &str, asn: u64, holder: &str) {
    let body = serde_json::json!({
        "status": "ok",
        "data": {
            "asns": [{ "asn": asn, "holder": holder }],
            "resource": ip,
        }
    });

    Mock::given(method("GET"))
        .and(path("/data/prefix-overview/data.json"))
        .and(query_param("resource", ip))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount an ASN lookup response whose `asns` list is empty (address not
/// announced by any AS).
pub async fn mount_asn_empty_response(server: &MockServer, ip: &str) {
    let body = serde_json::json!({
        "status": "ok",
        "data": { "asns": [], "resource": ip }
    });

    Mock::given(method("GET"))
        .and(path("/data/prefix-overview/data.json"))
        .and(query_param("resource", ip))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a successful geo lookup response for one IP.
pub async fn mount_geo_response(
    server: &MockServer,
    ip: &str,
    country: &str,
    city: &str,
    lat: f64,
    lon: f64,
) {
    let body = serde_json::json!({
        "status": "success",
        "country": country,
        "city": city,
        "lat": lat,
        "lon": lon,
    });

    Mock::given(method("GET"))
        .and(path(format!("/json/{}", ip)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a geo lookup response with a non-success status.
pub async fn mount_geo_failure_response(server: &MockServer, ip: &str) {
    let body = serde_json::json!({
        "status": "fail",
        "message": "private range",
    });

    Mock::given(method("GET"))
        .and(path(format!("/json/{}", ip)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

