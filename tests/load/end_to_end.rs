use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use search_load::{ConfigResolver, CorpusLoader, LoadDriver, Properties, ReqwestClient, RunConfig};

fn resolver(vars: Vec<(&'static str, String)>) -> ConfigResolver {
    ConfigResolver::with_env(Properties::new(), move |key| {
        vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
    })
}

#[tokio::test]
async fn test_run_against_mock_solr() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/enwiki/select"))
        .and(query_param("q", "broken query"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solr/enwiki/select"))
        .and(query_param("wt", "json"))
        .and(query_param("rows", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":{"numFound":0}}"#))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("terms.txt")).unwrap();
    write!(file, "cat\n\n  dog  \nbroken query\nsolar eclipse\n").unwrap();

    let cfg = RunConfig::resolve(&resolver(vec![
        ("CONCURRENT_USERS", "2".to_string()),
        ("TESTS_WORK_DIR", dir.path().display().to_string()),
        ("SEARCH_TERMS_FILE", "terms.txt".to_string()),
        ("COLLECTION_NAME", "enwiki".to_string()),
        ("QUERY_PARAMS", "rows=5".to_string()),
        ("ENDPOINT", server.uri()),
    ]))
    .unwrap();

    let corpus = CorpusLoader::load(&cfg.corpus_path).await.unwrap();
    assert_eq!(corpus.len(), 4);

    let client = ReqwestClient::new(&cfg.scenario_name, Some(Duration::from_secs(5))).unwrap();
    let result = LoadDriver::new(Arc::new(client))
        .run(&cfg, corpus, CancellationToken::new())
        .await;

    // 4 terms / 2 workers -> 2 requests each, every term exactly once.
    assert_eq!(result.terms_found, 4);
    assert_eq!(result.iteration_budget, 2);
    assert_eq!(result.total_requests, 4);
    assert_eq!(result.success_count, 3);
    assert_eq!(result.http_failures, 1);
    assert_eq!(result.status_counts.get(&200), Some(&3));
    assert_eq!(result.status_counts.get(&500), Some(&1));
    assert_eq!(result.latency.count, 4);
    assert!(result.latency.min <= result.latency.max);
}

#[tokio::test]
async fn test_missing_corpus_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cfg = RunConfig::resolve(&resolver(vec![
        ("TESTS_WORK_DIR", dir.path().display().to_string()),
        ("ENDPOINT", server.uri()),
    ]))
    .unwrap();

    let corpus = CorpusLoader::load(&cfg.corpus_path).await.unwrap();
    let client = ReqwestClient::new(&cfg.scenario_name, None).unwrap();
    let result = LoadDriver::new(Arc::new(client))
        .run(&cfg, corpus, CancellationToken::new())
        .await;

    assert_eq!(result.total_requests, 0);
    assert_eq!(result.concurrency, 10);
}
