use pretty_assertions::assert_eq;
use slot_watch::config::{Config, Settings};
use slot_watch::models::StateRecord;
use slot_watch::source::{HttpSource, PageSource, SnapshotSource};
use slot_watch::storage::{JsonFileStore, MemoryStore, StateStore};
use slot_watch::telegram::{NotifyError, TelegramNotifier};
use slot_watch::utils::http::{create_client, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use slot_watch::{run_once, RunError, RunSummary};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn listing(cyprus: &str) -> String {
    format!(
        r#"<html><body><table>
            <thead><tr><th>Country</th><th>Earliest</th></tr></thead>
            <tbody>
              <tr><td>🇬🇷 Greece</td><td><div><b>Waitlist Open</b></div></td></tr>
              <tr><td>🇨🇾 Cyprus</td><td><div><b>{cyprus}</b> <small>2 slots</small></div></td></tr>
              <tr><td>🇲🇹 Malta</td><td>No availability</td></tr>
            </tbody>
        </table></body></html>"#
    )
}

struct Harness {
    page: MockServer,
    telegram: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            page: MockServer::start().await,
            telegram: MockServer::start().await,
        }
    }

    async fn serve_page(&self, html: String) {
        self.page.reset().await;
        Mock::given(method("GET"))
            .and(path("/in/dubai/tourism"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.page)
            .await;
    }

    async fn expect_messages(&self, count: u64) {
        self.telegram.reset().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_string_contains("chat_id=42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(count)
            .mount(&self.telegram)
            .await;
    }

    fn settings(&self) -> Settings {
        Settings {
            city_slug: Some("dubai".into()),
            visa_type: Some("tourism".into()),
            target_country: Some("Cyprus".into()),
            telegram_token: Some(TOKEN.into()),
            chat_id: Some("42".into()),
            base_url: Some(self.page.uri()),
            telegram_api_base: Some(self.telegram.uri()),
            ..Settings::default()
        }
    }

    fn source(&self, config: &Config) -> HttpSource {
        let client = create_client(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        HttpSource::new(client, config.listing_url())
    }

    fn notifier(&self, config: &Config) -> TelegramNotifier {
        TelegramNotifier::from_config(config).unwrap()
    }

    async fn run(&self, config: &Config, store: &dyn StateStore) -> Result<RunSummary, RunError> {
        run_once(config, &self.source(config), store, &self.notifier(config)).await
    }

    async fn verify(&self) {
        self.telegram.verify().await;
    }
}

#[tokio::test]
async fn edge_triggered_alerts_once_per_new_slot() {
    let h = Harness::start().await;
    let config = Config::from_settings(h.settings()).unwrap();
    let store = MemoryStore::new(StateRecord::from([("cyprus", "No availability")]));

    h.serve_page(listing("03 Jun")).await;
    h.expect_messages(1).await;
    let summary = h.run(&config, &store).await.unwrap();
    h.verify().await;
    assert_eq!(
        summary,
        RunSummary {
            rows: 3,
            found: 1,
            notified: 1,
            state_written: true,
        }
    );
    assert_eq!(store.snapshot().await, StateRecord::from([("cyprus", "03 Jun")]));

    h.expect_messages(0).await;
    let summary = h.run(&config, &store).await.unwrap();
    h.verify().await;
    assert_eq!(summary.notified, 0);
    assert!(!summary.state_written);
    assert_eq!(store.save_count().await, 1);

    h.serve_page(listing("05 Jun")).await;
    h.expect_messages(1).await;
    h.run(&config, &store).await.unwrap();
    h.verify().await;
    assert_eq!(store.snapshot().await, StateRecord::from([("cyprus", "05 Jun")]));
}

#[tokio::test]
async fn level_triggered_alerts_every_run() {
    let h = Harness::start().await;
    let config = Config::from_settings(Settings {
        notify_policy: Some("level".into()),
        ..h.settings()
    })
    .unwrap();
    let store = MemoryStore::new(StateRecord::from([("cyprus", "03 Jun")]));

    h.serve_page(listing("03 Jun")).await;
    h.expect_messages(2).await;
    h.run(&config, &store).await.unwrap();
    h.run(&config, &store).await.unwrap();
    h.verify().await;
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn sentinel_status_is_stored_without_alert() {
    let h = Harness::start().await;
    let config = Config::from_settings(h.settings()).unwrap();
    let store = MemoryStore::new(StateRecord::from([("cyprus", "03 Jun")]));

    h.serve_page(listing("Waitlist Open")).await;
    h.expect_messages(0).await;
    let summary = h.run(&config, &store).await.unwrap();
    h.verify().await;
    assert!(summary.state_written);
    assert_eq!(store.snapshot().await, StateRecord::from([("cyprus", "Waitlist Open")]));
}

#[tokio::test]
async fn strict_mode_fails_on_missing_entity_without_writing_state() {
    let h = Harness::start().await;
    let config = Config::from_settings(Settings {
        target_country: Some("Iceland".into()),
        ..h.settings()
    })
    .unwrap();
    let store = MemoryStore::new(StateRecord::new());

    h.serve_page(listing("03 Jun")).await;
    h.expect_messages(0).await;
    let err = h.run(&config, &store).await.unwrap_err();
    h.verify().await;
    assert!(matches!(err, RunError::Detect(_)));
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn tolerant_mode_processes_the_entities_it_finds() {
    let h = Harness::start().await;
    let config = Config::from_settings(Settings {
        target_country: None,
        target_countries: Some("Iceland, Cyprus, Malta".into()),
        ..h.settings()
    })
    .unwrap();
    let store = MemoryStore::new(StateRecord::new());

    h.serve_page(listing("03 Jun")).await;
    h.expect_messages(1).await;
    let summary = h.run(&config, &store).await.unwrap();
    h.verify().await;
    assert_eq!(summary.found, 2);
    assert_eq!(
        store.snapshot().await,
        StateRecord::from([("cyprus", "03 Jun"), ("malta", "No availability")])
    );
}

#[tokio::test]
async fn missing_credentials_abort_before_sending_or_saving() {
    let h = Harness::start().await;
    let config = Config::from_settings(Settings {
        telegram_token: None,
        ..h.settings()
    })
    .unwrap();
    let store = MemoryStore::new(StateRecord::new());

    h.serve_page(listing("03 Jun")).await;
    h.expect_messages(0).await;
    let err = h.run(&config, &store).await.unwrap_err();
    h.verify().await;
    assert!(matches!(err, RunError::Notify(NotifyError::MissingCredentials(_))));
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn rejected_send_keeps_old_state_for_retry() {
    let h = Harness::start().await;
    let config = Config::from_settings(h.settings()).unwrap();
    let store = MemoryStore::new(StateRecord::from([("cyprus", "No availability")]));

    h.serve_page(listing("03 Jun")).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"ok":false}"#))
        .expect(1)
        .mount(&h.telegram)
        .await;

    let err = h.run(&config, &store).await.unwrap_err();
    h.verify().await;
    assert!(matches!(err, RunError::Notify(NotifyError::Rejected { .. })));
    assert_eq!(store.snapshot().await, StateRecord::from([("cyprus", "No availability")]));
}

#[tokio::test]
async fn fetch_failure_is_fatal() {
    let h = Harness::start().await;
    let config = Config::from_settings(h.settings()).unwrap();
    let store = MemoryStore::new(StateRecord::new());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.page)
        .await;
    h.expect_messages(0).await;

    let err = h.run(&config, &store).await.unwrap_err();
    h.verify().await;
    assert!(matches!(err, RunError::Fetch(_)));
}

#[tokio::test]
async fn page_without_table_is_fatal() {
    let h = Harness::start().await;
    let config = Config::from_settings(h.settings()).unwrap();
    let store = MemoryStore::new(StateRecord::new());

    h.serve_page("<html><body>Please enable JavaScript</body></html>".into()).await;
    h.expect_messages(0).await;

    let err = h.run(&config, &store).await.unwrap_err();
    h.verify().await;
    assert!(matches!(err, RunError::Extract(_)));
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn snapshot_source_with_json_state_file() {
    let h = Harness::start().await;
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("rendered.html");
    let state_file = dir.path().join("last_state.json");
    std::fs::write(&snapshot, listing("03 Jun")).unwrap();
    std::fs::write(&state_file, "{ not json").unwrap();

    let config = Config::from_settings(Settings {
        source: Some("snapshot".into()),
        snapshot_path: Some(snapshot.display().to_string()),
        state_file: Some(state_file.display().to_string()),
        ..h.settings()
    })
    .unwrap();
    let source = SnapshotSource::new(&snapshot);
    let store = JsonFileStore::new(&config.state_file);

    h.expect_messages(1).await;
    run_once(&config, &source as &dyn PageSource, &store, &h.notifier(&config))
        .await
        .unwrap();
    h.verify().await;

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_file).unwrap()).unwrap();
    assert_eq!(saved, serde_json::json!({ "cyprus": "03 Jun" }));
}
