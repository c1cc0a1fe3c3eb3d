//! End-to-end update cycles against mock DNSPod and IP-echo servers.

use std::io;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::{mpsc, watch};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use dnspod_ddns::config::Settings;
use dnspod_ddns::daemon::{CycleOutcome, Ticker, UpdateEngine};
use dnspod_ddns::dns::DnspodClient;
use dnspod_ddns::ip::{DnsLookup, ExternalIpGetter, PublicIpResolver, Resolution};
use dnspod_ddns::sign::{sign, CanonicalHeaders, Credentials};
use dnspod_ddns::Error;

fn settings(update_at_startup: bool) -> Settings {
    let mut settings: Settings = toml::from_str(
        r#"
interval_seconds = 1
secret_key = "key"
secret_id = "id"
domain = "example.com"
sub_domain = "home"
record_id = 12345
record_line = "默认"
ttl = 600
"#,
    )
    .unwrap();
    settings.update_at_startup = update_at_startup;
    settings
}

struct StaticLookup(Option<Vec<IpAddr>>);

#[async_trait]
impl DnsLookup for StaticLookup {
    async fn lookup_ip(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
        self.0
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
    }
}

struct ChannelTicker(mpsc::UnboundedReceiver<()>);

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) -> bool {
        self.0.recv().await.is_some()
    }
}

async fn provider_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-TC-Action", "ModifyDynamicDNS"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"Response":{"RequestId":"req"}}"#),
        )
        .mount(&server)
        .await;
    server
}

async fn echo_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn resolver(echo: &MockServer, dns: Option<Vec<IpAddr>>) -> PublicIpResolver {
    let getter = ExternalIpGetter::new(format!("{}/ip", echo.uri())).unwrap();
    PublicIpResolver::new("home.example.com", Box::new(StaticLookup(dns)), Box::new(getter))
}

fn engine(
    provider: &MockServer,
    resolver: Option<PublicIpResolver>,
    update_at_startup: bool,
) -> UpdateEngine {
    let client = DnspodClient::new(&settings(update_at_startup))
        .unwrap()
        .with_endpoint(provider.uri());
    UpdateEngine::new(Arc::new(client), resolver, update_at_startup)
}

async fn provider_calls(provider: &MockServer) -> Vec<Request> {
    provider.received_requests().await.unwrap()
}

fn header_value<'a>(request: &'a Request, name: &str) -> &'a str {
    request.headers.get(name).unwrap().to_str().unwrap()
}

/// Recompute the signature from what was actually sent.
fn assert_signature_verifies(request: &Request) {
    let timestamp: i64 = header_value(request, "X-TC-Timestamp").parse().unwrap();
    let signed_at = Utc.timestamp_opt(timestamp, 0).unwrap();
    let headers = CanonicalHeaders::normalize([
        ("Host", header_value(request, "Host")),
        ("Content-Type", header_value(request, "Content-Type")),
        ("X-TC-Action", header_value(request, "X-TC-Action")),
    ]);

    let expected = sign(
        "POST",
        "",
        &headers,
        &request.body,
        signed_at,
        &Credentials::new("id", "key"),
    );

    assert_eq!(header_value(request, "Authorization"), expected);
    assert_eq!(header_value(request, "X-TC-Version"), "2021-03-23");
}

#[tokio::test]
async fn getter_disabled_updates_at_startup_and_every_tick() {
    let provider = provider_server().await;
    let engine = engine(&provider, None, true);

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    tick_tx.send(()).unwrap();
    tick_tx.send(()).unwrap();
    drop(tick_tx);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    engine.run(ChannelTicker(tick_rx), shutdown_rx).await;

    let calls = provider_calls(&provider).await;
    assert_eq!(calls.len(), 3);
    for call in &calls {
        assert_signature_verifies(call);
        let body: serde_json::Value = serde_json::from_slice(&call.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "Domain": "example.com",
                "SubDomain": "home",
                "RecordId": 12345,
                "RecordLine": "默认",
                "Ttl": 600
            })
        );
    }
}

#[tokio::test]
async fn same_public_ip_twice_updates_once() {
    let provider = provider_server().await;
    let echo = echo_server("203.0.113.5").await;
    let mut engine = engine(&provider, Some(resolver(&echo, None)), false);

    assert!(matches!(engine.run_cycle().await, CycleOutcome::Updated(_)));
    assert_eq!(engine.last_public_ip(), Some(IpAddr::from([203, 0, 113, 5])));
    assert!(matches!(engine.run_cycle().await, CycleOutcome::Skipped(_)));

    assert_eq!(provider_calls(&provider).await.len(), 1);
    assert_eq!(echo.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn bad_echo_body_fails_open() {
    let provider = provider_server().await;
    let echo = echo_server("bad-ip-string").await;

    let mut state = None;
    let resolution = resolver(&echo, None).resolve(&mut state).await;
    assert!(matches!(
        resolution,
        Resolution::Unavailable(Error::InvalidIp { .. })
    ));

    let mut engine = engine(&provider, Some(resolver(&echo, None)), false);
    assert!(matches!(engine.run_cycle().await, CycleOutcome::Updated(_)));
    assert_eq!(engine.last_public_ip(), None);

    let calls = provider_calls(&provider).await;
    assert_eq!(calls.len(), 1);
    assert_signature_verifies(&calls[0]);
}

#[tokio::test]
async fn record_already_pointing_at_public_ip_is_not_updated() {
    let provider = provider_server().await;
    let echo = echo_server("203.0.113.5\n").await;
    let dns = Some(vec![IpAddr::from([203, 0, 113, 5])]);
    let mut engine = engine(&provider, Some(resolver(&echo, dns)), true);

    assert!(matches!(engine.run_cycle().await, CycleOutcome::Skipped(_)));
    assert!(provider_calls(&provider).await.is_empty());
}

#[tokio::test]
async fn provider_outage_does_not_stop_the_loop() {
    // Bind then release a port so connections to it are refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DnspodClient::new(&settings(true))
        .unwrap()
        .with_endpoint(format!("http://{}", addr));
    let mut engine = UpdateEngine::new(Arc::new(client), None, true);

    assert!(matches!(
        engine.run_cycle().await,
        CycleOutcome::Failed(Error::Http(_))
    ));
    assert!(matches!(
        engine.run_cycle().await,
        CycleOutcome::Failed(Error::Http(_))
    ));
}

#[test]
fn signature_fixture_for_new_year() {
    let payload = r#"{"Domain":"example.com","SubDomain":"www","RecordId":12345,"RecordLine":"默认","Ttl":600}"#;
    let headers = CanonicalHeaders::normalize([
        ("Host", "dnspod.tencentcloudapi.com"),
        ("Content-Type", "application/json"),
        ("X-TC-Action", "ModifyDynamicDNS"),
    ]);

    let authorization = sign(
        "POST",
        "",
        &headers,
        payload.as_bytes(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        &Credentials::new("id", "key"),
    );

    assert_eq!(
        authorization,
        "TC3-HMAC-SHA256 Credential=id/2024-01-01/dnspod/tc3_request, \
         SignedHeaders=content-type;host;x-tc-action, \
         Signature=59f0e0b17d80dc7bedabc6e7962ced4536563ea46cd356b82fc756823e38e33b"
    );
}
