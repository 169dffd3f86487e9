//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use canton_crawler::auth::{login, AuthError, Credentials};
use canton_crawler::config::{AuthConfig, Config, CrawlerConfig, FetchConfig, OutputConfig};
use canton_crawler::crawler::{run_crawl, Coordinator, Fetch, HttpFetcher, RetryPolicy};
use canton_crawler::state::UrlState;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: "TestBot/1.0".to_string(),
        timeout_secs: 5,
        retries: 1,
        base_delay_ms: 1,
    }
}

/// Creates a test configuration crawling `base_url` with the given sections
fn create_test_config(dir: &Path, base_url: &str, sections: &str, max_links: Option<usize>) -> Config {
    let sections_file = dir.join("sections.txt");
    std::fs::write(&sections_file, sections).unwrap();

    Config {
        crawler: CrawlerConfig {
            base_url: format!("{}/", base_url),
            sections_file,
            max_workers: 3,
            max_links,
            idle_timeout_ms: 50,
            same_host_only: true,
            document_extensions: vec!["pdf".to_string()],
        },
        fetch: fetch_config(),
        auth: None,
        output: OutputConfig {
            root: dir.join("out"),
            pages_dir: Some("paginas".into()),
            ..OutputConfig::default()
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(html(
            r#"<h1>Inicio</h1>
               <a href="p1">Page 1</a>
               <a href="p2">Page 2</a>
               <a href="files/acta.pdf">Acta</a>
               <a href="http://elsewhere.invalid/x">Out</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(html(r#"<p>uno</p><a href="/p2">again</a><a href="/copia.pdf">copia</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(html("<p>dos</p><a href='/start'>home</a>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    for pdf in ["/files/acta.pdf", "/copia.pdf"] {
        Mock::given(method("GET"))
            .and(path(pdf))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"%PDF-1.4 same bytes".to_vec(), "application/pdf"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &base_url, "start\n", None);

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.documents_stored, 1);
    assert_eq!(stats.duplicates_resolved, 1);
    // start, p1, p2 and both documents
    assert_eq!(stats.urls_visited, 5);

    let out = dir.path().join("out");
    assert_eq!(file_names(&out.join("documentos")), vec!["start-1.pdf"]);
    assert_eq!(
        file_names(&out.join("paginas")),
        vec!["start-1.html", "start-2.html", "start-3.html"]
    );

    let text = std::fs::read_to_string(out.join("textos/start.txt")).unwrap();
    assert!(text.starts_with("Inicio Page 1 Page 2 Acta"));
}

#[tokio::test]
async fn test_cap_limits_visited_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(html(r#"<a href="p1">1</a><a href="p2">2</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(html(r#"<a href="p3">3</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(html("dropped"))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(html("dropped"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &base_url, "start\n", Some(2));
    let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&config.fetch).unwrap());
    let coordinator = Coordinator::new(config, fetcher).unwrap();

    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.urls_visited, 2);
    assert_eq!(stats.links_enqueued, 1);
    assert_eq!(stats.cap_hits, 2);
    assert_eq!(
        coordinator
            .frontier()
            .state_of(&format!("{}/p1", base_url)),
        UrlState::Fetched
    );
    assert_eq!(
        coordinator
            .frontier()
            .state_of(&format!("{}/p2", base_url)),
        UrlState::Unseen
    );
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string(r#"<a href="/hidden">x</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html(r#"<a href="/broken">b</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("never linked"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &base_url, "broken\n\nok\n", None);

    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.urls_visited, 2);
    assert!(!dir.path().join("out/textos/broken.txt").exists());
    assert!(dir.path().join("out/textos/ok.txt").exists());
}

#[tokio::test]
async fn test_crawl_with_login_session() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("username=socio"))
        .and(body_string_contains("password=clave"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/privado"))
        .and(header("cookie", "session=abc"))
        .respond_with(html("<p>contenido privado</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let credentials_path = dir.path().join("creds.json");
    std::fs::write(&credentials_path, r#"{"user": "socio", "password": "clave"}"#).unwrap();

    let mut config = create_test_config(dir.path(), &base_url, "privado\n", None);
    config.auth = Some(AuthConfig {
        login_url: format!("{}/login", base_url),
        credentials_path,
        retries: 3,
        base_delay_ms: 1,
    });

    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.pages_fetched, 1);
    let text = std::fs::read_to_string(dir.path().join("out/textos/privado.txt")).unwrap();
    assert_eq!(text, "contenido privado");
}

#[tokio::test]
async fn test_login_fails_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let credentials = Credentials {
        user: "u".to_string(),
        password: "p".to_string(),
    };
    let policy = RetryPolicy::new(3, Duration::from_millis(1)).unwrap();

    let result = login(
        &credentials,
        &format!("{}/login", mock_server.uri()),
        &fetch_config(),
        &policy,
    )
    .await;

    match result {
        Err(AuthError::Failed { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected login failure, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_bad_credentials_file_aborts_crawl() {
    let dir = TempDir::new().unwrap();
    let credentials_path = dir.path().join("creds.json");
    std::fs::write(&credentials_path, "not json").unwrap();

    let mut config = create_test_config(dir.path(), "http://127.0.0.1:9", "x\n", None);
    config.auth = Some(AuthConfig {
        login_url: "http://127.0.0.1:9/login".to_string(),
        credentials_path,
        retries: 1,
        base_delay_ms: 1,
    });

    let result = run_crawl(config).await;
    assert!(matches!(
        result,
        Err(canton_crawler::CantonError::Auth(AuthError::Credentials { .. }))
    ));
}
