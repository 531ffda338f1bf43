mod common;

use common::{config_for, full_credentials, init_test_tracing};
use serde_json::json;
use smoke_common::{FailureKind, ProbeOutcome};
use smoke_config::{Credentials, SmokeConfig};
use smoke_probes::Probe;
use smoke_probes::providers::{
    HackerNewsProbe, HuggingFaceProbe, NewsApiProbe, RedditProbe, StackExchangeProbe, TwitterProbe,
    YouTubeProbe,
};
use std::time::Duration;
use wiremock::matchers::{any, body_string_contains, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn all_probes(cfg: &SmokeConfig) -> Vec<Box<dyn Probe>> {
    vec![
        Box::new(HuggingFaceProbe::from_config(cfg)),
        Box::new(TwitterProbe::from_config(cfg)),
        Box::new(YouTubeProbe::from_config(cfg)),
        Box::new(NewsApiProbe::from_config(cfg)),
        Box::new(RedditProbe::from_config(cfg)),
        Box::new(HackerNewsProbe::from_config(cfg)),
        Box::new(StackExchangeProbe::from_config(cfg)),
    ]
}

fn authenticated_probes(cfg: &SmokeConfig) -> Vec<Box<dyn Probe>> {
    all_probes(cfg).into_iter().take(5).collect()
}

fn failure_kind(outcome: &ProbeOutcome) -> Option<FailureKind> {
    outcome.failure().map(|f| f.kind)
}

// ==============================
// Properties shared by every probe
// ==============================

#[tokio::test]
async fn missing_credentials_make_no_network_calls() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), Credentials::default());
    for probe in authenticated_probes(&cfg) {
        let outcome = probe.run().await;
        assert_eq!(
            failure_kind(&outcome),
            Some(FailureKind::MissingCredential),
            "{}",
            probe.meta().name
        );
        assert!(outcome.failure().unwrap().message.contains("not found"));
    }
}

#[tokio::test]
async fn non_200_fails_with_status_code_in_message() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    for probe in all_probes(&cfg) {
        let outcome = probe.run().await;
        let failure = outcome.failure().expect("should fail");
        assert_eq!(failure.kind, FailureKind::Rejected, "{}", probe.meta().name);
        assert!(
            failure.message.contains("503"),
            "{}: {}",
            probe.meta().name,
            failure.message
        );
    }
}

#[tokio::test]
async fn connection_refused_is_contained() {
    init_test_tracing();
    // Grab a free port, then release it so nothing is listening there.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let cfg = config_for(&format!("http://{addr}/"), full_credentials());

    for probe in all_probes(&cfg) {
        let outcome = probe.run().await;
        assert_eq!(
            failure_kind(&outcome),
            Some(FailureKind::Transport),
            "{}",
            probe.meta().name
        );
    }
}

#[tokio::test]
async fn slow_upstream_hits_the_timeout() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = HuggingFaceProbe::from_config(&cfg).run().await;
    let failure = outcome.failure().expect("should time out");
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(failure.message.contains("timed out"), "{}", failure.message);
}

// ==============================
// Per-provider happy paths
// ==============================

#[tokio::test]
async fn huggingface_posts_chat_payload() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer hf_test"))
        .and(body_string_contains("meta-llama/Llama-3.2-1B-Instruct"))
        .and(body_string_contains("\"max_tokens\":10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi there"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = HuggingFaceProbe::from_config(&cfg).run().await;
    let ev = outcome.evidence().expect("pass");
    assert!(ev.summary.starts_with("Response: {"));
    assert!(ev.summary.ends_with("..."));
}

#[tokio::test]
async fn twitter_counts_returned_tweets() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("query", "test"))
        .and(query_param("max_results", "10"))
        .and(header("authorization", "Bearer x_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1", "text": "a"}, {"id": "2", "text": "b"}, {"id": "3", "text": "c"}],
            "meta": {"result_count": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = TwitterProbe::from_config(&cfg).run().await;
    assert_eq!(outcome.evidence().unwrap().summary, "Found 3 tweets");
}

#[tokio::test]
async fn youtube_reports_total_results() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("part", "snippet"))
        .and(query_param("maxResults", "1"))
        .and(query_param("key", "yt_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pageInfo": {"totalResults": 1000000, "resultsPerPage": 1},
            "items": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = YouTubeProbe::from_config(&cfg).run().await;
    assert_eq!(outcome.evidence().unwrap().summary, "Found 1000000 results");
}

#[tokio::test]
async fn newsapi_reports_status_total_and_headline() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("country", "us"))
        .and(query_param("pageSize", "1"))
        .and(query_param("apiKey", "news_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 37,
            "articles": [{"title": "Markets rally"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = NewsApiProbe::from_config(&cfg).run().await;
    let ev = outcome.evidence().unwrap();
    assert_eq!(ev.summary, "Status: ok, Total: 37 articles");
    assert_eq!(ev.notes, vec!["Sample headline: Markets rally".to_string()]);
}

#[tokio::test]
async fn stackexchange_lists_first_five_titles_and_quota() {
    init_test_tracing();
    let server = MockServer::start().await;
    let items: Vec<_> = (1..=8).map(|i| json!({"title": format!("Question {i}")})).collect();
    Mock::given(method("GET"))
        .and(path("/2.3/questions"))
        .and(query_param(
            "tagged",
            "machine-learning;deep-learning;artificial-intelligence;neural-networks",
        ))
        .and(query_param("site", "stackoverflow"))
        .and(query_param("pagesize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": items,
            "quota_remaining": 295
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = StackExchangeProbe::from_config(&cfg).run().await;
    let ev = outcome.evidence().unwrap();
    assert_eq!(ev.summary, "Found 8 AI/ML/DL questions");
    assert_eq!(ev.notes, vec!["Quota remaining: 295".to_string()]);
    assert_eq!(ev.items.len(), 5);
    assert_eq!(ev.items[4], "Question 5");
}

#[tokio::test]
async fn stackexchange_without_questions_is_empty_result() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(path("/2.3/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = StackExchangeProbe::from_config(&cfg).run().await;
    assert_eq!(failure_kind(&outcome), Some(FailureKind::EmptyResult));
}

// ==============================
// Reddit two-step handshake
// ==============================

#[tokio::test]
async fn reddit_exchanges_token_then_reads_listing() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(header("user-agent", "research-dashboard/1.0"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=rid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "issued-token",
            "token_type": "bearer",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/Python/hot"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer issued-token"))
        .and(header("user-agent", "research-dashboard/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"children": [{}, {}, {}, {}, {}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = RedditProbe::from_config(&cfg).run().await;
    assert_eq!(outcome.evidence().unwrap().summary, "Found 5 posts");
}

#[tokio::test]
async fn reddit_auth_failure_skips_listing() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": 401})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/r/Python/hot"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = RedditProbe::from_config(&cfg).run().await;
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert!(failure.message.starts_with("authentication failed: 401"));
}

#[tokio::test]
async fn reddit_token_without_access_token_skips_listing() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;
    Mock::given(path("/r/Python/hot"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), full_credentials());
    let outcome = RedditProbe::from_config(&cfg).run().await;
    assert_eq!(failure_kind(&outcome), Some(FailureKind::Rejected));
}

#[tokio::test]
async fn reddit_names_only_the_missing_secret() {
    let mut creds = full_credentials();
    creds.reddit_client_secret = None;
    let cfg = config_for("http://127.0.0.1:1/", creds);
    let outcome = RedditProbe::from_config(&cfg).run().await;
    assert_eq!(
        outcome.failure().unwrap().message,
        "REDDIT_CLIENT_SECRET not found in configuration"
    );
}

// ==============================
// Hacker News keyword scan
// ==============================

async fn mount_top_stories(server: &MockServer, ids: &[u64]) {
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .and(query_param("limitToFirst", "30"))
        .and(query_param("orderBy", "\"$key\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_item(server: &MockServer, id: u64, title: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v0/item/{id}.json")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": id, "type": "story", "title": title})),
        )
        .mount(server)
        .await;
}

fn neutral_title(i: u64) -> String {
    format!("Rust release notes {i}")
}

#[tokio::test]
async fn hackernews_returns_exactly_the_five_matches_in_scan_order() {
    init_test_tracing();
    let server = MockServer::start().await;
    let ids: Vec<u64> = (1..=30).collect();
    mount_top_stories(&server, &ids).await;

    let hits = [
        (3, "New LLM beats benchmarks"),
        (8, "Deep Learning for cats"),
        (15, "Neural nets explained"),
        (22, "GPT rumors"),
        (29, "Transformer architectures"),
    ];
    for id in ids.iter().copied() {
        match hits.iter().find(|(hid, _)| *hid == id) {
            Some((_, title)) => mount_item(&server, id, title).await,
            None => mount_item(&server, id, &neutral_title(id)).await,
        }
    }
    // 1 list call is asserted above; items must stay within the 30-call budget.
    Mock::given(path_regex(r"^/v0/item/\d+\.json$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), Credentials::default());
    let outcome = HackerNewsProbe::from_config(&cfg).run().await;
    let ev = outcome.evidence().expect("pass");
    assert_eq!(ev.summary, "Found 5 AI/ML/DL stories");
    let expected: Vec<String> = hits.iter().map(|(_, t)| t.to_string()).collect();
    assert_eq!(ev.items, expected);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() <= 31, "made {} calls", requests.len());
    assert_eq!(requests.len(), 30, "scan ends on the 29th item");
}

#[tokio::test]
async fn hackernews_stops_after_fifth_match() {
    init_test_tracing();
    let server = MockServer::start().await;
    let ids: Vec<u64> = (100..130).collect();
    mount_top_stories(&server, &ids).await;
    for id in ids.iter().copied() {
        mount_item(&server, id, &format!("AI story {id}")).await;
    }

    let cfg = config_for(&server.uri(), Credentials::default());
    let outcome = HackerNewsProbe::from_config(&cfg).run().await;
    let ev = outcome.evidence().expect("pass");
    assert_eq!(
        ev.items,
        (100..105).map(|id| format!("AI story {id}")).collect::<Vec<_>>()
    );
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1 + 5);
}

#[tokio::test]
async fn hackernews_without_matches_fails_despite_successful_calls() {
    init_test_tracing();
    let server = MockServer::start().await;
    let ids: Vec<u64> = (1..=30).collect();
    mount_top_stories(&server, &ids).await;
    for id in ids.iter().copied() {
        mount_item(&server, id, &neutral_title(id)).await;
    }

    let cfg = config_for(&server.uri(), Credentials::default());
    let outcome = HackerNewsProbe::from_config(&cfg).run().await;
    let failure = outcome.failure().expect("fail");
    assert_eq!(failure.kind, FailureKind::EmptyResult);
    assert_eq!(failure.message, "No AI/ML/DL stories found in top 30");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 31);
}

#[tokio::test]
async fn hackernews_skips_unreadable_items() {
    init_test_tracing();
    let server = MockServer::start().await;
    mount_top_stories(&server, &[1, 2, 3, 4]).await;
    Mock::given(path("/v0/item/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    Mock::given(path("/v0/item/2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(path("/v0/item/3.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_item(&server, 4, "Machine Learning in production").await;

    let cfg = config_for(&server.uri(), Credentials::default());
    let outcome = HackerNewsProbe::from_config(&cfg).run().await;
    assert_eq!(
        outcome.evidence().expect("pass").items,
        vec!["Machine Learning in production".to_string()]
    );
}

#[tokio::test]
async fn hackernews_empty_story_list_is_empty_result() {
    init_test_tracing();
    let server = MockServer::start().await;
    mount_top_stories(&server, &[]).await;

    let cfg = config_for(&server.uri(), Credentials::default());
    let outcome = HackerNewsProbe::from_config(&cfg).run().await;
    let failure = outcome.failure().expect("fail");
    assert_eq!(failure.kind, FailureKind::EmptyResult);
    assert_eq!(failure.message, "No stories found");
}

#[tokio::test]
async fn hackernews_null_story_list_is_empty_result() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path_regex(r"^/v0/item/\d+\.json$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri(), Credentials::default());
    let outcome = HackerNewsProbe::from_config(&cfg).run().await;
    let failure = outcome.failure().expect("fail");
    assert_eq!(failure.kind, FailureKind::EmptyResult);
    assert_eq!(failure.message, "No stories found");
}

#[tokio::test]
async fn hackernews_item_timeout_aborts_the_scan() {
    init_test_tracing();
    let server = MockServer::start().await;
    mount_top_stories(&server, &[1, 2, 3, 4, 5]).await;
    mount_item(&server, 1, &neutral_title(1)).await;
    mount_item(&server, 2, "LLM agents in practice").await;
    Mock::given(path("/v0/item/3.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 3, "title": "Neural search"}))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    for id in [4, 5] {
        Mock::given(path(format!("/v0/item/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "AI news"})))
            .expect(0)
            .mount(&server)
            .await;
    }

    let cfg = config_for(&server.uri(), Credentials::default());
    let outcome = HackerNewsProbe::from_config(&cfg).run().await;
    let failure = outcome.failure().expect("an item timeout fails the probe");
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(failure.message.contains("timed out"), "{}", failure.message);
}

#[tokio::test]
async fn newsapi_missing_key_names_both_accepted_variables() {
    init_test_tracing();
    let cfg = config_for("http://127.0.0.1:1/", Credentials::default());
    let outcome = NewsApiProbe::from_config(&cfg).run().await;
    let failure = outcome.failure().expect("fail");
    assert_eq!(failure.kind, FailureKind::MissingCredential);
    assert_eq!(
        failure.message,
        "NEWSAPI_KEY or NEWS_API_KEY not found in configuration"
    );
}
