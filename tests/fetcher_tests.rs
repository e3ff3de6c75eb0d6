mod common;

use betsync::config::BROWSER_USER_AGENT;
use betsync::error::SyncError;
use betsync::fetcher::{PaginatedFetcher, Termination};
use common::{mock_page, mock_page_status, rows_body, source_config, API_PATH, NONCE};
use mockito::Matcher;

#[tokio::test]
async fn test_fetch_all_stops_on_short_page() {
    let mut server = mockito::Server::new_async().await;
    let p1 = mock_page(&mut server, 1, rows_body(1, 2000)).await;
    let p2 = mock_page(&mut server, 2, rows_body(2001, 2000)).await;
    let p3 = mock_page(&mut server, 3, rows_body(4001, 500)).await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let outcome = fetcher.fetch_all().await.unwrap();

    assert_eq!(outcome.rows.len(), 4500);
    assert_eq!(outcome.pages_requested, 3);
    assert_eq!(outcome.termination, Termination::ShortPage);
    p1.assert_async().await;
    p2.assert_async().await;
    p3.assert_async().await;
}

#[tokio::test]
async fn test_fetch_all_empty_first_page() {
    let mut server = mockito::Server::new_async().await;
    let p1 = mock_page(&mut server, 1, r#"{"rows":[]}"#.to_string()).await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let outcome = fetcher.fetch_all().await.unwrap();

    assert!(outcome.rows.is_empty());
    assert_eq!(outcome.pages_requested, 1);
    assert_eq!(outcome.termination, Termination::Exhausted);
    p1.assert_async().await;
}

#[tokio::test]
async fn test_fetch_all_missing_rows_key_is_empty() {
    let mut server = mockito::Server::new_async().await;
    let _p1 = mock_page(&mut server, 1, r#"{"total":0}"#.to_string()).await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let outcome = fetcher.fetch_all().await.unwrap();

    assert!(outcome.rows.is_empty());
    assert_eq!(outcome.termination, Termination::Exhausted);
}

#[tokio::test]
async fn test_fetch_all_full_page_then_empty() {
    let mut server = mockito::Server::new_async().await;
    let _p1 = mock_page(&mut server, 1, rows_body(1, 2000)).await;
    let _p2 = mock_page(&mut server, 2, r#"{"rows":[]}"#.to_string()).await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let outcome = fetcher.fetch_all().await.unwrap();

    assert_eq!(outcome.rows.len(), 2000);
    assert_eq!(outcome.pages_requested, 2);
    assert_eq!(outcome.termination, Termination::Exhausted);
}

#[tokio::test]
async fn test_forbidden_keeps_partial_rows() {
    let mut server = mockito::Server::new_async().await;
    let _p1 = mock_page(&mut server, 1, rows_body(1, 2000)).await;
    let p2 = mock_page_status(&mut server, 2, 403).await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let outcome = fetcher.fetch_all().await.unwrap();

    assert_eq!(outcome.rows.len(), 2000);
    assert_eq!(
        outcome.termination,
        Termination::AuthorizationRejected { page: 2 }
    );
    let cause = outcome.termination.rejection().unwrap();
    assert!(matches!(cause, SyncError::AuthorizationRejected { page: 2 }));
    assert_eq!(cause.to_string(), "authorization rejected on page 2 (HTTP 403)");
    p2.assert_async().await;
}

#[test]
fn test_normal_terminations_carry_no_rejection() {
    assert!(Termination::Exhausted.rejection().is_none());
    assert!(Termination::ShortPage.rejection().is_none());
}

#[test]
fn test_nonce_with_control_characters_is_rejected() {
    let source = betsync::config::SourceConfig {
        api_url: "http://127.0.0.1:1/bets".to_string(),
        ..Default::default()
    };

    let err = match PaginatedFetcher::new(&source, "abc\n123") {
        Ok(_) => panic!("nonce with a newline must not become a header"),
        Err(err) => err,
    };

    assert!(matches!(err, SyncError::InvalidNonce(_)));
    assert!(err.to_string().starts_with("nonce is not a valid header value"));
}

#[tokio::test]
async fn test_server_error_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _p1 = mock_page(&mut server, 1, rows_body(1, 2000)).await;
    let _p2 = mock_page_status(&mut server, 2, 500).await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let err = fetcher.fetch_all().await.unwrap_err();

    assert!(matches!(err, SyncError::SourceApi(_)));
}

#[tokio::test]
async fn test_malformed_body_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _p1 = mock_page(&mut server, 1, "<html>not json</html>".to_string()).await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let err = fetcher.fetch_all().await.unwrap_err();

    assert!(matches!(err, SyncError::SourceApi(ref msg) if msg.contains("malformed")));
}

#[tokio::test]
async fn test_request_carries_session_headers_and_cache_buster() {
    let mut server = mockito::Server::new_async().await;
    let page = server
        .mock("GET", API_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("pageSize".into(), "2000".into()),
            Matcher::UrlEncoded("mode".into(), "flat".into()),
            Matcher::Regex(r"_=\d{13}".into()),
        ]))
        .match_header("x-wp-nonce", NONCE)
        .match_header("user-agent", BROWSER_USER_AGENT)
        .with_status(200)
        .with_body(rows_body(1, 3))
        .expect(1)
        .create_async()
        .await;

    let fetcher = PaginatedFetcher::new(&source_config(&server), NONCE).unwrap();
    let outcome = fetcher.fetch_all().await.unwrap();

    assert_eq!(outcome.rows.len(), 3);
    page.assert_async().await;
}
