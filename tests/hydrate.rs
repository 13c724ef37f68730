use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cloudsecrets::{
    AggregateError, DiagnosticCause, FetchError, HydrateError, HydrateOptions, MemoryProvider,
    SecretsProvider, hydrate, hydrate_blocking, hydrate_record, hydrate_with,
};
use serde_json::json;

#[derive(Debug, Default, PartialEq)]
struct AppConfig {
    db: DbConfig,
    analytics: Analytics,
    pass: String,
    jwt_secrets: Vec<String>,
    services: HashMap<String, Service>,
}

hydrate_record!(AppConfig { db, analytics, pass, jwt_secrets, services });

#[derive(Debug, Default, PartialEq)]
struct DbConfig {
    host: String,
    username: String,
    password: String,
}

hydrate_record!(DbConfig { host, username, password });

#[derive(Debug, Default, PartialEq)]
struct Analytics {
    enabled: bool,
    server: String,
    auth_token: String,
}

hydrate_record!(Analytics { enabled, server, auth_token });

#[derive(Debug, Default, Clone, PartialEq)]
struct Service {
    url: String,
    auth: String,
    pass: String,
}

hydrate_record!(Service { url, auth, pass });

#[derive(Clone)]
struct CountingProvider {
    inner: MemoryProvider,
    fetches: Arc<AtomicUsize>,
}

impl CountingProvider {
    fn new(secrets: &[(&str, &str)]) -> Self {
        Self {
            inner: secrets.iter().copied().collect(),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretsProvider for CountingProvider {
    async fn fetch_secret(&self, key: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_secret(key).await
    }
}

fn aggregate(error: HydrateError) -> AggregateError {
    match error {
        HydrateError::Aggregate(inner) => inner,
        other => panic!("expected aggregate error, got: {other}"),
    }
}

#[tokio::test]
async fn successful_replacement_across_all_node_kinds() {
    let provider: MemoryProvider = [
        ("dbPassword", "changethissecret"),
        ("analyticsPassword", "AuthTokenSecret"),
        ("pass", "secret"),
        ("jwtSecretV1", "some-old-secret"),
        ("jwtSecretV2", "changeme-now"),
        ("auth", "auth-secret"),
    ]
    .into_iter()
    .collect();

    let mut config = AppConfig {
        pass: "$SECRET:pass".to_string(),
        db: DbConfig {
            host: "localhost:9090".to_string(),
            username: "postgres".to_string(),
            password: "$SECRET:dbPassword".to_string(),
        },
        analytics: Analytics {
            enabled: true,
            server: "http://localhost:8000".to_string(),
            auth_token: "$SECRET:analyticsPassword".to_string(),
        },
        jwt_secrets: vec![
            "$SECRET:jwtSecretV2".to_string(),
            "$SECRET:jwtSecretV1".to_string(),
        ],
        services: HashMap::from([(
            "service-a".to_string(),
            Service {
                url: "http://localhost:8000".to_string(),
                auth: "$SECRET:auth".to_string(),
                pass: String::new(),
            },
        )]),
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(
        config,
        AppConfig {
            pass: "secret".to_string(),
            db: DbConfig {
                host: "localhost:9090".to_string(),
                username: "postgres".to_string(),
                password: "changethissecret".to_string(),
            },
            analytics: Analytics {
                enabled: true,
                server: "http://localhost:8000".to_string(),
                auth_token: "AuthTokenSecret".to_string(),
            },
            jwt_secrets: vec!["changeme-now".to_string(), "some-old-secret".to_string()],
            services: HashMap::from([(
                "service-a".to_string(),
                Service {
                    url: "http://localhost:8000".to_string(),
                    auth: "auth-secret".to_string(),
                    pass: String::new(),
                },
            )]),
        }
    );
}

#[tokio::test]
async fn resolved_secret_replaces_the_placeholder() {
    let provider: MemoryProvider = [("db", "p@ss")].into_iter().collect();
    let mut config = DbConfig {
        host: "x".to_string(),
        password: "$SECRET:db".to_string(),
        ..DbConfig::default()
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(config.password, "p@ss");
    assert_eq!(config.host, "x");
}

#[tokio::test]
async fn missing_secret_reports_path_and_key_and_leaves_siblings_alone() {
    let provider = MemoryProvider::default();
    let mut config = DbConfig {
        host: "x".to_string(),
        password: "$SECRET:db".to_string(),
        ..DbConfig::default()
    };

    let error = hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect_err("hydrate must fail");

    let rendered = error.to_string();
    assert!(rendered.contains("config.password"), "got: {rendered}");
    assert!(rendered.contains("\"db\""), "got: {rendered}");

    let failures = aggregate(error);
    let failures = failures.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "config.password");
    assert_eq!(failures[0].key.as_deref(), Some("db"));
    assert!(matches!(
        failures[0].cause,
        DiagnosticCause::Fetch(FetchError::NotFound(_))
    ));

    assert_eq!(config.password, "$SECRET:db");
    assert_eq!(config.host, "x");
}

#[tokio::test]
async fn repeated_key_is_fetched_once() {
    let provider = CountingProvider::new(&[("k", "v")]);
    let mut config = AppConfig {
        jwt_secrets: vec![
            "$SECRET:k".to_string(),
            "literal".to_string(),
            "$SECRET:k".to_string(),
        ],
        ..AppConfig::default()
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(provider.fetch_calls(), 1);
    assert_eq!(
        config.jwt_secrets,
        vec!["v".to_string(), "literal".to_string(), "v".to_string()]
    );
}

#[tokio::test]
async fn distinct_keys_are_fetched_exactly_once_each() {
    let provider = CountingProvider::new(&[("a", "1"), ("b", "2")]);
    let mut config = AppConfig {
        pass: "$SECRET:a".to_string(),
        db: DbConfig {
            password: "$SECRET:a".to_string(),
            ..DbConfig::default()
        },
        jwt_secrets: vec!["$SECRET:b".to_string(), "$SECRET:b".to_string()],
        ..AppConfig::default()
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(provider.fetch_calls(), 2);
}

#[tokio::test]
async fn partial_failure_writes_what_resolved_and_reports_the_rest() {
    let provider: MemoryProvider = [("x", "resolved")].into_iter().collect();
    let mut config = DbConfig {
        username: "$SECRET:x".to_string(),
        password: "$SECRET:y".to_string(),
        ..DbConfig::default()
    };

    let error = hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect_err("hydrate must fail");

    assert_eq!(config.username, "resolved");
    assert_eq!(config.password, "$SECRET:y");

    let failures = aggregate(error);
    let failures = failures.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "config.password");
    assert_eq!(failures[0].key.as_deref(), Some("y"));
}

#[tokio::test]
async fn graph_without_placeholders_is_untouched_and_fetches_nothing() {
    let provider = CountingProvider::new(&[]);
    let make = || AppConfig {
        pass: "plain".to_string(),
        db: DbConfig {
            host: "localhost".to_string(),
            username: "postgres".to_string(),
            password: "hunter2".to_string(),
        },
        jwt_secrets: vec!["not-a-placeholder".to_string()],
        ..AppConfig::default()
    };

    let mut config = make();
    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(provider.fetch_calls(), 0);
    assert_eq!(config, make());
}

#[tokio::test]
async fn secret_substring_without_the_prefix_is_ignored() {
    let provider = CountingProvider::new(&[]);
    let make = || AppConfig {
        pass: "contains SECRET: in the middle".to_string(),
        jwt_secrets: vec!["SECRET:no-dollar".to_string(), "$SECRETX:typo".to_string()],
        ..AppConfig::default()
    };

    let mut config = make();
    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(provider.fetch_calls(), 0);
    assert_eq!(config, make());
}

#[derive(Debug, Default)]
struct FrozenConfig {
    password: String,
    build_tag: String,
}

hydrate_record!(FrozenConfig { password } readonly { build_tag });

#[tokio::test]
async fn placeholder_in_readonly_field_aborts_before_any_fetch() {
    let provider = CountingProvider::new(&[("tag", "v"), ("db", "p")]);
    let mut config = FrozenConfig {
        password: "$SECRET:db".to_string(),
        build_tag: "$SECRET:tag".to_string(),
    };

    let error = hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect_err("hydrate must fail");

    match error {
        HydrateError::UnsettableField { path } => assert_eq!(path, "config.build_tag"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(provider.fetch_calls(), 0);
    assert_eq!(config.password, "$SECRET:db");
}

#[derive(Debug, Default, PartialEq)]
struct NestedConfig {
    regions: HashMap<String, HashMap<String, Service>>,
}

hydrate_record!(NestedConfig { regions });

#[tokio::test]
async fn record_nested_in_map_of_maps_is_written_back() {
    let provider: MemoryProvider = [("auth", "auth-secret")].into_iter().collect();
    let mut config = NestedConfig {
        regions: HashMap::from([(
            "eu".to_string(),
            HashMap::from([(
                "api".to_string(),
                Service {
                    url: "http://api.eu".to_string(),
                    auth: "$SECRET:auth".to_string(),
                    pass: String::new(),
                },
            )]),
        )]),
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    let service = &config.regions["eu"]["api"];
    assert_eq!(service.auth, "auth-secret");
    assert_eq!(service.url, "http://api.eu");
}

#[tokio::test]
async fn failed_leaf_in_map_entry_keeps_its_resolved_siblings() {
    let provider: MemoryProvider = [("good", "resolved")].into_iter().collect();
    let mut config = AppConfig {
        services: HashMap::from([(
            "svc".to_string(),
            Service {
                url: "http://svc".to_string(),
                auth: "$SECRET:good".to_string(),
                pass: "$SECRET:bad".to_string(),
            },
        )]),
        ..AppConfig::default()
    };

    let error = hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect_err("hydrate must fail");

    let service = &config.services["svc"];
    assert_eq!(service.auth, "resolved");
    assert_eq!(service.pass, "$SECRET:bad");

    let failures = aggregate(error);
    let failures = failures.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "config.services[svc].pass");
}

#[derive(Debug, Default)]
struct WithExtra {
    name: String,
    extra: serde_json::Value,
}

hydrate_record!(WithExtra { name, extra });

#[tokio::test]
async fn json_value_sections_hydrate_in_place() {
    let provider: MemoryProvider = [("tok", "tv"), ("tok2", "tv2")].into_iter().collect();
    let mut config = WithExtra {
        name: "app".to_string(),
        extra: json!({
            "token": "$SECRET:tok",
            "nested": { "list": ["$SECRET:tok2", 42, null] },
            "count": 7,
        }),
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(
        config.extra,
        json!({
            "token": "tv",
            "nested": { "list": ["tv2", 42, null] },
            "count": 7,
        })
    );
}

#[tokio::test]
async fn optional_and_boxed_records_hydrate_through_the_chain() {
    #[derive(Debug, Default)]
    struct Outer {
        inner: Option<Box<DbConfig>>,
        missing: Option<DbConfig>,
    }
    hydrate_record!(Outer { inner, missing });

    let provider: MemoryProvider = [("db", "p@ss")].into_iter().collect();
    let mut config = Outer {
        inner: Some(Box::new(DbConfig {
            password: "$SECRET:db".to_string(),
            ..DbConfig::default()
        })),
        missing: None,
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new())
        .await
        .expect("hydrate");

    assert_eq!(config.inner.expect("inner").password, "p@ss");
}

#[tokio::test]
async fn non_record_roots_are_invalid_input() {
    let mut text = "hello".to_string();
    let error = hydrate("", &mut text).await.expect_err("string root");
    assert!(matches!(
        error,
        HydrateError::InvalidInput { kind: "string" }
    ));

    let mut list = vec!["hello".to_string()];
    let error = hydrate("", &mut list).await.expect_err("sequence root");
    assert!(matches!(
        error,
        HydrateError::InvalidInput { kind: "sequence" }
    ));

    let mut map: HashMap<String, String> = HashMap::new();
    let error = hydrate("", &mut map).await.expect_err("map root");
    assert!(matches!(error, HydrateError::InvalidInput { kind: "map" }));

    let mut absent: Option<DbConfig> = None;
    let error = hydrate("", &mut absent).await.expect_err("absent root");
    assert!(matches!(
        error,
        HydrateError::InvalidInput {
            kind: "absent optional"
        }
    ));

    let mut present: Option<Option<DbConfig>> = Some(Some(DbConfig::default()));
    hydrate("", &mut present).await.expect("nested optional record root");
}

#[tokio::test]
async fn empty_selector_fails_on_any_placeholder() {
    let mut config = DbConfig {
        password: "$SECRET:db".to_string(),
        ..DbConfig::default()
    };

    let error = hydrate("", &mut config).await.expect_err("must fail");
    let failures = aggregate(error);
    assert!(matches!(
        failures.failures()[0].cause,
        DiagnosticCause::Fetch(FetchError::NoProvider)
    ));
    assert_eq!(config.password, "$SECRET:db");
}

#[tokio::test]
async fn unknown_selector_is_rejected_up_front() {
    let mut config = DbConfig::default();
    let error = hydrate("vault", &mut config).await.expect_err("must fail");
    assert!(matches!(error, HydrateError::UnknownProvider(_)));
}

struct SlowProvider;

#[async_trait]
impl SecretsProvider for SlowProvider {
    async fn fetch_secret(&self, _key: &str) -> Result<String, FetchError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_resolves_to_a_timeout_outcome() {
    let mut config = DbConfig {
        password: "$SECRET:db".to_string(),
        ..DbConfig::default()
    };
    let options = HydrateOptions::new().fetch_timeout(Duration::from_millis(50));

    let error = hydrate_with(&SlowProvider, &mut config, &options)
        .await
        .expect_err("must time out");

    let failures = aggregate(error);
    assert!(matches!(
        failures.failures()[0].cause,
        DiagnosticCause::Fetch(FetchError::TimedOut { .. })
    ));
    assert_eq!(config.password, "$SECRET:db");
}

#[test]
fn hydrate_blocking_runs_without_an_ambient_runtime() {
    let mut clean = DbConfig {
        host: "localhost".to_string(),
        ..DbConfig::default()
    };
    hydrate_blocking("", &mut clean).expect("no placeholders");

    let mut dirty = DbConfig {
        password: "$SECRET:db".to_string(),
        ..DbConfig::default()
    };
    hydrate_blocking("", &mut dirty).expect_err("placeholder without provider");
}
