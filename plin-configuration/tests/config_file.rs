use std::time::Duration;

use plin::offload::TimeoutPolicy;
use plin::{ControllerConfig, GenerationName};
use plin_configuration::{
    Backend, Bypass, ConfigError, ConfigFile, FeOxDb, Generation, Moka, Offload, OnTimeout,
    ValueFormat, ValueSerialization,
};
use pretty_assertions::assert_eq;
use url::Url;

const FULL: &str = r#"
generation:
  prefix: plin
  version: 1.2.0
scope: https://plin.app/
precache:
  - /
  - /index.html
  - /css/style.css
bypass:
  hosts:
    - firestore.googleapis.com
    - cloudfunctions.net
network_first:
  - "^https://api\\.open-meteo\\.com/"
offload:
  timeout: 30s
  on_timeout: Warn
backend:
  type: Moka
  max_entries: 500
  label: offline
  value:
    format: Bincode
"#;

#[test]
fn parses_full_file() {
    let file: ConfigFile = FULL.parse().unwrap();

    let expected = ConfigFile {
        generation: Generation {
            prefix: "plin".to_owned(),
            version: "1.2.0".to_owned(),
        },
        scope: "https://plin.app/".to_owned(),
        precache: vec![
            "/".to_owned(),
            "/index.html".to_owned(),
            "/css/style.css".to_owned(),
        ],
        bypass: Bypass {
            hosts: vec![
                "firestore.googleapis.com".to_owned(),
                "cloudfunctions.net".to_owned(),
            ],
            schemes: vec!["http".to_owned(), "https".to_owned()],
        },
        network_first: vec![r"^https://api\.open-meteo\.com/".to_owned()],
        offload: Offload {
            timeout: Some(Duration::from_secs(30)),
            on_timeout: OnTimeout::Warn,
        },
        backend: Some(Backend::Moka(Moka {
            max_entries: Some(500),
            max_bytes: None,
            label: Some("offline".to_owned()),
            value: ValueFormat {
                format: ValueSerialization::Bincode,
            },
        })),
    };
    assert_eq!(file, expected);
}

#[test]
fn minimal_file_uses_defaults() {
    let file: ConfigFile = r#"
generation:
  version: 2.0.0
scope: https://plin.app/
"#
    .parse()
    .unwrap();

    assert_eq!(file.generation.prefix, "plin");
    assert!(file.precache.is_empty());
    assert_eq!(file.bypass, Bypass::default());
    assert!(file.network_first.is_empty());
    assert_eq!(file.offload, Offload::default());
    assert_eq!(file.backend, None);

    let config = file.into_config().unwrap();
    assert_eq!(config.generation(), &GenerationName::new("plin-v2.0.0"));
    assert_eq!(config.deferred_timeout(), TimeoutPolicy::Unbounded);
}

#[test]
fn converts_into_controller_config() {
    let config = FULL.parse::<ConfigFile>().unwrap().into_config().unwrap();

    assert_eq!(config.generation(), &GenerationName::new("plin-v1.2.0"));
    assert_eq!(config.scope().as_str(), "https://plin.app/");
    assert_eq!(
        config
            .precache()
            .iter()
            .map(Url::as_str)
            .collect::<Vec<_>>(),
        vec![
            "https://plin.app/",
            "https://plin.app/index.html",
            "https://plin.app/css/style.css",
        ]
    );
    assert!(
        config
            .exclusions()
            .matches(&Url::parse("https://europe-west1-plin.cloudfunctions.net/share").unwrap())
    );
    assert!(
        config
            .api_patterns()
            .matches(&Url::parse("https://api.open-meteo.com/v1/forecast").unwrap())
    );
    assert_eq!(
        config.deferred_timeout(),
        TimeoutPolicy::Warn(Duration::from_secs(30))
    );
}

#[test]
fn cancel_is_the_default_timeout_action() {
    let file: ConfigFile = r#"
generation:
  version: 1.1.0
scope: https://plin.app/
offload:
  timeout: 250ms
"#
    .parse()
    .unwrap();

    let config = file.into_config().unwrap();
    assert_eq!(
        config.deferred_timeout(),
        TimeoutPolicy::Cancel(Duration::from_millis(250))
    );
}

#[test]
fn invalid_pattern_is_rejected() {
    let file: ConfigFile = r#"
generation:
  version: 1.1.0
scope: https://plin.app/
network_first:
  - "api.(open"
"#
    .parse()
    .unwrap();

    let err = file.into_config().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid(plin::ConfigError::InvalidPattern { .. })
    ));
}

#[test]
fn relative_scope_is_rejected() {
    let file: ConfigFile = r#"
generation:
  version: 1.1.0
scope: /app/
"#
    .parse()
    .unwrap();

    assert!(matches!(
        file.into_config(),
        Err(ConfigError::Invalid(plin::ConfigError::InvalidScope { .. }))
    ));
}

#[test]
fn malformed_yaml_is_a_yaml_error() {
    let err = "generation: [unterminated".parse::<ConfigFile>().unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

#[test]
fn missing_file_reports_its_path() {
    let err = ConfigFile::from_path("/nonexistent/plin.yaml").unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert_eq!(path.to_str(), Some("/nonexistent/plin.yaml")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn production_file_matches_production_config() {
    let from_file = ConfigFile::production().into_config().unwrap();
    let direct = ControllerConfig::production().unwrap();

    assert_eq!(from_file.generation(), direct.generation());
    assert_eq!(from_file.scope(), direct.scope());
    assert_eq!(from_file.precache(), direct.precache());
    assert_eq!(from_file.exclusions().hosts(), direct.exclusions().hosts());
    assert_eq!(
        from_file
            .api_patterns()
            .patterns()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>(),
        direct
            .api_patterns()
            .patterns()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
    );
}

#[cfg(feature = "moka")]
#[tokio::test]
async fn moka_section_builds_a_working_backend() {
    use http::{Method, StatusCode};
    use plin_backend::{Backend as _, CacheBackend};
    use plin_core::{FetchResponse, RequestKey, StoredResponse};

    let file: ConfigFile = FULL.parse().unwrap();
    let backend = file.backend.unwrap_or_default().into_backend().unwrap();
    assert_eq!(backend.label().as_str(), "offline");

    let generation = GenerationName::new("plin-v1.2.0");
    let url = Url::parse("https://plin.app/css/style.css").unwrap();
    let key = RequestKey::new(&Method::GET, &url);
    let response = FetchResponse::new(StatusCode::OK, url).with_body("body{}");

    backend.open(&generation).await.unwrap();
    backend
        .set(&generation, &key, &StoredResponse::capture(&response))
        .await
        .unwrap();
    let stored = backend.get(&generation, &key).await.unwrap().unwrap();
    assert_eq!(stored.body().as_ref(), b"body{}");
}

#[cfg(feature = "moka")]
#[test]
fn moka_needs_exactly_one_capacity() {
    let both = Moka {
        max_entries: Some(10),
        max_bytes: Some(1024),
        ..Moka::default()
    };
    assert!(matches!(both.into_backend(), Err(ConfigError::MokaCapacity)));

    let neither = Moka {
        max_entries: None,
        ..Moka::default()
    };
    assert!(matches!(
        neither.into_backend(),
        Err(ConfigError::MokaCapacity)
    ));
}

const FEOXDB: &str = r#"
generation:
  version: 1.2.0
scope: https://plin.app/
backend:
  type: FeOxDb
  max_memory: 16777216
  label: disk
"#;

#[test]
fn parses_feoxdb_section() {
    let file: ConfigFile = FEOXDB.parse().unwrap();

    assert_eq!(
        file.backend,
        Some(Backend::FeOxDb(FeOxDb {
            path: None,
            max_file_size: None,
            max_memory: Some(16 * 1024 * 1024),
            label: Some("disk".to_string()),
            value: ValueFormat::default(),
        }))
    );
}

#[cfg(feature = "feoxdb")]
#[tokio::test]
async fn feoxdb_section_builds_a_working_backend() {
    use http::{Method, StatusCode};
    use plin_backend::{Backend as _, CacheBackend};
    use plin_core::{FetchResponse, RequestKey, StoredResponse};

    let file: ConfigFile = FEOXDB.parse().unwrap();
    let backend = file.backend.unwrap().into_backend().unwrap();
    assert_eq!(backend.label().as_str(), "disk");

    let generation = GenerationName::new("plin-v1.2.0");
    let url = Url::parse("https://plin.app/").unwrap();
    let key = RequestKey::new(&Method::GET, &url);
    let response = FetchResponse::new(StatusCode::OK, url).with_body("<html>");

    backend
        .set(&generation, &key, &StoredResponse::capture(&response))
        .await
        .unwrap();
    assert_eq!(backend.generations().await.unwrap(), vec![generation.clone()]);
    let stored = backend.get(&generation, &key).await.unwrap().unwrap();
    assert_eq!(stored.body().as_ref(), b"<html>");
}

#[cfg(not(feature = "feoxdb"))]
#[test]
fn feoxdb_needs_its_feature() {
    let file: ConfigFile = FEOXDB.parse().unwrap();
    assert!(matches!(
        file.backend.unwrap().into_backend(),
        Err(ConfigError::BackendNotAvailable(_))
    ));
}
