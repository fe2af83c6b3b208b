//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every operation
//! over real HTTP: through `HalalScanner` with the default reqwest
//! transport, and through the sans-IO `HalalClient` with ureq playing the
//! host. Fault injection in the mock covers 429, 5xx and timeouts.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use halal_core::{
    AnalyzeStatus, HalalClient, HalalScanner, HalalStatus, HttpMethod, HttpRequest, HttpResponse,
    ScannerConfig, ScannerError, SearchParams,
};
use mock_server::{MockConfig, StatusCode};

/// Run the mock on its own thread and runtime so it outlives any one test
/// runtime.
fn spawn_mock(config: MockConfig) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, config).await
        })
        .unwrap();
    });

    addr
}

fn scanner(addr: SocketAddr) -> HalalScanner {
    HalalScanner::new(ScannerConfig::default().with_base_url(format!("http://{addr}/")))
}

#[tokio::test]
async fn search_round_trip() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    let result = scanner.search(&SearchParams::new("gelatin")).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].name, "gelatin");
    assert_eq!(result.items[0].halal_status, HalalStatus::Haram);
    assert_eq!(result.language_matches[0].language_code, "no");
}

#[tokio::test]
async fn search_filters_reach_the_server() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    let params = SearchParams {
        status: Some(HalalStatus::Haram),
        verified_only: true,
        e_number: true,
        ..SearchParams::new("e")
    };
    let result = scanner.search(&params).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].name, "E120");

    let paged = SearchParams {
        page: Some(2),
        per_page: Some(2),
        ..SearchParams::new("a")
    };
    let result = scanner.search(&paged).await.unwrap();
    assert_eq!(result.page, 2);
    assert_eq!(result.per_page, 2);
    assert_eq!(result.items.len(), 2);
}

#[tokio::test]
async fn search_miss_carries_fuzzy_suggestions() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    let result = scanner.search(&SearchParams::new("gelatine")).await.unwrap();
    assert!(result.items.is_empty());
    assert_eq!(result.fuzzy_suggestions[0].name, "gelatin");
}

#[tokio::test]
async fn check_round_trip() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    let detail = scanner.check("en", "gelatin").await.unwrap();
    assert_eq!(detail.summary.name, "gelatin");
    assert_eq!(detail.summary.halal_status, HalalStatus::Haram);
    assert!(detail.explanation.is_some());
    assert_eq!(detail.translations.len(), 2);

    let spaced = scanner.check("en", "wine-vinegar").await.unwrap();
    assert_eq!(spaced.summary.name, "wine vinegar");
}

#[tokio::test]
async fn check_slug_cannot_escape_its_segment() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    let err = scanner.check("en", "gelatin/../sugar").await.unwrap_err();
    assert_eq!(
        err,
        ScannerError::Api {
            status: 404,
            endpoint: "/v1/public/ingredients/en/gelatin%2F..%2Fsugar".to_string(),
            message: "ingredient not found: en/gelatin/../sugar".to_string(),
        }
    );
}

#[tokio::test]
async fn dot_segments_are_refused_before_sending() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    for (lang, name) in [("en", ".."), ("..", ".."), ("en", ".")] {
        let err = scanner.check(lang, name).await.unwrap_err();
        assert!(matches!(err, ScannerError::Network { .. }), "{lang}/{name}: {err:?}");
        assert_eq!(err.status_code(), None);
    }
}

#[tokio::test]
async fn analyze_round_trip() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    let result = scanner.analyze(&["gelatin", "sugar"]).await.unwrap();
    assert_eq!(result.status, AnalyzeStatus::Completed);
    assert_eq!(result.total_count, 2);
    assert_eq!(result.halal_count, 1);
    assert_eq!(result.haram_count, 1);
    let order: Vec<&str> = result.ingredients.iter().map(|i| i.original_text.as_str()).collect();
    assert_eq!(order, ["gelatin", "sugar"]);
    assert!(result.queue_id.is_some());
}

#[tokio::test]
async fn analyze_empty_batch_is_sent() {
    let scanner = scanner(spawn_mock(MockConfig::default()));

    let empty: [&str; 0] = [];
    let result = scanner.analyze(&empty).await.unwrap();
    assert_eq!(result.total_count, 0);
    assert!(result.ingredients.is_empty());
}

#[tokio::test]
async fn rate_limit_is_classified_on_every_route() {
    let config = MockConfig::default().with_forced_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
    let scanner = scanner(spawn_mock(config));

    let err = scanner.search(&SearchParams::new("x")).await.unwrap_err();
    assert_eq!(
        err,
        ScannerError::RateLimited {
            endpoint: "/v1/public/ingredients?search=x".to_string()
        }
    );
    assert!(err.is_retryable());

    let err = scanner.analyze(&["sugar"]).await.unwrap_err();
    assert!(matches!(err, ScannerError::RateLimited { .. }));
}

#[tokio::test]
async fn server_error_body_becomes_message() {
    let config = MockConfig::default()
        .with_forced_status(StatusCode::INTERNAL_SERVER_ERROR, "internal error");

    let err = scanner(spawn_mock(config)).check("en", "sugar").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.message(), "internal error");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status() {
    let config = MockConfig::default().with_forced_status(StatusCode::SERVICE_UNAVAILABLE, "");

    let err = scanner(spawn_mock(config)).check("en", "sugar").await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503");
}

#[tokio::test]
async fn slow_server_times_out_every_call() {
    let addr = spawn_mock(MockConfig::default().with_latency(Duration::from_millis(500)));
    let scanner = HalalScanner::new(
        ScannerConfig::default()
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(50)),
    );

    for _ in 0..5 {
        let err = scanner.check("en", "sugar").await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
        assert_eq!(err.to_string(), "Network error: Request timed out");
        assert_eq!(err.status_code(), None);
    }
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = scanner(addr).search(&SearchParams::new("sugar")).await.unwrap_err();
    match &err {
        ScannerError::Network { endpoint, message, timed_out } => {
            assert!(!*timed_out);
            assert_eq!(endpoint, "/v1/public/ingredients?search=sugar");
            assert!(!message.is_empty());
        }
        other => panic!("expected network error, got {other:?}"),
    }
    assert!(!err.is_timeout());
}

/// Answer a single connection with `raw` bytes, then keep the socket open
/// for `hold` before closing it.
fn spawn_raw(raw: &'static [u8], hold: Duration) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(raw).unwrap();
        stream.flush().unwrap();
        std::thread::sleep(hold);
    });

    addr
}

const SHORT_429: &[u8] =
    b"HTTP/1.1 429 Too Many Requests\r\ncontent-type: text/plain\r\ncontent-length: 100\r\n\r\nshort";

#[tokio::test]
async fn truncated_429_body_is_still_rate_limited() {
    let scanner = scanner(spawn_raw(SHORT_429, Duration::ZERO));

    let err = scanner.search(&SearchParams::new("x")).await.unwrap_err();
    assert_eq!(
        err,
        ScannerError::RateLimited {
            endpoint: "/v1/public/ingredients?search=x".to_string()
        }
    );
}

#[tokio::test]
async fn stalled_429_body_is_still_rate_limited() {
    let addr = spawn_raw(SHORT_429, Duration::from_secs(3));
    let scanner = HalalScanner::new(
        ScannerConfig::default()
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(300)),
    );

    let err = scanner.check("en", "sugar").await.unwrap_err();
    assert!(matches!(err, ScannerError::RateLimited { .. }), "got {err:?}");
}

#[tokio::test]
async fn truncated_error_body_falls_back_to_status() {
    let raw = b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nshort";
    let scanner = scanner(spawn_raw(raw, Duration::ZERO));

    let err = scanner.check("en", "sugar").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.message(), "HTTP 500");
}

/// Execute an `HttpRequest` with ureq, returning 4xx/5xx as data so the core
/// client does the status interpretation.
fn execute(req: &HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.url);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Post => {
            let mut builder = agent.post(&req.url);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.send(req.body.as_deref().unwrap_or_default().as_bytes())
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

#[test]
fn sans_io_client_with_host_transport() {
    let addr = spawn_mock(MockConfig::default());
    let client = HalalClient::new(ScannerConfig::default().with_base_url(format!("http://{addr}")));

    let req = client.build_search(&SearchParams::new("sugar")).unwrap();
    let result = client.parse_search(&req.endpoint, execute(&req)).unwrap();
    assert_eq!(result.items[0].halal_status, HalalStatus::Halal);

    let req = client.build_check("en", "E471").unwrap();
    let err = client.parse_check(&req.endpoint, execute(&req)).unwrap_err();
    assert_eq!(err.status_code(), Some(404));

    let req = client.build_check("en", "e471").unwrap();
    let detail = client.parse_check(&req.endpoint, execute(&req)).unwrap();
    assert_eq!(detail.summary.halal_status, HalalStatus::Mushbooh);

    let req = client.build_analyze(&["salt", "E120", "stardust"]).unwrap();
    let result = client.parse_analyze(&req.endpoint, execute(&req)).unwrap();
    let statuses: Vec<HalalStatus> = result.ingredients.iter().map(|i| i.halal_status).collect();
    assert_eq!(statuses, [HalalStatus::Halal, HalalStatus::Haram, HalalStatus::Unknown]);
    assert_eq!(result.unknown_count, 1);
}
