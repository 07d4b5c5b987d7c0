//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for tweedekamer.nl and run the full
//! listing, voting and motion cycle end-to-end.

use crate::fixtures::*;
use tk_stemmingen::ScrapeError;
use wiremock::MockServer;

#[tokio::test]
async fn test_partial_success_end_to_end() {
    let server = partial_success_site().await;
    let workspace = Workspace::new();
    let mut crawler = workspace.crawler(&server);

    let stats = crawler.run(&request()).await.unwrap();
    assert_eq!(stats.fully_resolved, 1);
    assert_eq!(stats.partially_resolved, 1);

    let x1 = workspace.item_dir("X1");
    assert_eq!(data_lines(&x1, "voting"), 1);
    assert_eq!(data_lines(&x1, "motion"), 1);
    assert_eq!(data_lines(&x1, "sponsors"), 1);
    assert_eq!(data_lines(&x1, "details"), 2);
    let motion = read(&x1, "motion");
    assert!(motion.contains("De Kamer, gehoord de beraadslaging,"));
    assert!(motion.contains(",61,31,61"));

    let x2 = workspace.item_dir("X2");
    assert_eq!(data_lines(&x2, "voting"), 1);
    for stem in ["motion", "sponsors", "details"] {
        assert_eq!(data_lines(&x2, stem), 0, "X2 {} should be empty", stem);
    }

    assert!(crawler.progress().is_complete(DATE_KEY, "X1"));
    assert!(!crawler.progress().is_complete(DATE_KEY, "X2"));

    let entries = crawler.errors().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].voting_id, "X2");
    assert!(entries[0].url.as_deref().unwrap().contains("id=M2"));
    assert!(entries[0].message.contains("Unexpected table headers"));

    // Both ledgers are on disk already
    let ledger = std::fs::read_to_string(workspace.state_dir().join("errors.csv")).unwrap();
    assert!(ledger.starts_with("voting_id,url,message"));
    assert!(ledger.contains("X2,"));
    let progress = std::fs::read_to_string(workspace.state_dir().join("progress.json")).unwrap();
    assert!(progress.contains("X1"));
    assert!(!progress.contains("X2"));
}

#[tokio::test]
async fn test_rerun_skips_completed_and_heals_partial() {
    let workspace = Workspace::new();
    {
        let server = partial_success_site().await;
        workspace.crawler(&server).run(&request()).await.unwrap();
    }
    let x1_motion = read(&workspace.item_dir("X1"), "motion");

    // M2 is fixed and now only offers its text as a download
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&["X1", "X2"])).await;
    mount_listing(&server, 1, end_of_results_page()).await;
    mount_voting(&server, "X1", voting_page("X1", &["M1"]), 0).await;
    mount_voting(&server, "X2", voting_page("X2", &["M2"]), 1).await;
    mount_motion(
        &server,
        "M2",
        motion_page(
            "M2",
            &MotionPage {
                inline_text: None,
                ..MotionPage::default()
            },
        ),
    )
    .await;
    mount_download(&server, "M2", b"%PDF-1.4\nVerzoekt   de regering\n").await;

    let mut crawler = workspace.crawler(&server);
    let stats = crawler.run(&request()).await.unwrap();

    assert_eq!(stats.skipped_completed, 1);
    assert_eq!(stats.fully_resolved, 1);
    assert!(crawler.progress().is_complete(DATE_KEY, "X2"));
    assert!(crawler.errors().is_empty());

    let x2_motion = read(&workspace.item_dir("X2"), "motion");
    assert!(x2_motion.contains("%PDF-1.4 Verzoekt de regering"));
    assert!(x2_motion.contains(",true,"));
    assert_eq!(read(&workspace.item_dir("X1"), "motion"), x1_motion);
}

#[tokio::test]
async fn test_third_run_fetches_nothing_but_listing() {
    let workspace = Workspace::new();
    {
        let server = partial_success_site().await;
        let mut crawler = workspace.crawler(&server);
        crawler.run(&request()).await.unwrap();
    }
    // Healing X2 by hand stands in for a successful retry
    {
        let server = MockServer::start().await;
        mount_listing(&server, 0, listing_page(&["X2"])).await;
        mount_listing(&server, 1, end_of_results_page()).await;
        mount_voting(&server, "X2", voting_page("X2", &["M1"]), 1).await;
        mount_motion(&server, "M1", motion_page("M1", &MotionPage::default())).await;
        workspace.crawler(&server).run(&request()).await.unwrap();
    }

    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&["X1", "X2"])).await;
    mount_listing(&server, 1, end_of_results_page()).await;
    mount_voting(&server, "X1", voting_page("X1", &["M1"]), 0).await;
    mount_voting(&server, "X2", voting_page("X2", &["M2"]), 0).await;

    let stats = workspace.crawler(&server).run(&request()).await.unwrap();
    assert_eq!(stats.skipped_completed, 2);
    assert_eq!(stats.processed(), 0);
}

#[tokio::test]
async fn test_end_of_results_on_first_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, end_of_results_page()).await;
    let workspace = Workspace::new();

    let stats = workspace.crawler(&server).run(&request()).await.unwrap();
    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.candidates_seen, 0);
    assert!(!workspace.data_dir().exists());
}

#[tokio::test]
async fn test_broken_listing_is_fatal() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, "<html><body><main></main></body></html>".to_string()).await;
    let workspace = Workspace::new();

    let err = workspace
        .crawler(&server)
        .run(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Structure { .. }));
}

#[tokio::test]
async fn test_missing_voting_page_aborts_without_checkpoint() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&["X1"])).await;
    let workspace = Workspace::new();

    let mut crawler = workspace.crawler(&server);
    let err = crawler.run(&request()).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    assert!(crawler.progress().is_empty());
    assert!(crawler.errors().is_empty());
    assert!(!workspace.item_dir("X1").exists());
}

#[tokio::test]
async fn test_resume_after_unrecorded_write() {
    let workspace = Workspace::new();
    {
        let server = partial_success_site().await;
        workspace.crawler(&server).run(&request()).await.unwrap();
    }

    // Simulate a crash between writing X1 and marking it complete
    let progress_path = workspace.state_dir().join("progress.json");
    std::fs::write(&progress_path, "{}").unwrap();

    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&["X1"])).await;
    mount_listing(&server, 1, end_of_results_page()).await;
    mount_voting(&server, "X1", voting_page("X1", &["M1"]), 1).await;
    mount_motion(&server, "M1", motion_page("M1", &MotionPage::default())).await;

    let mut crawler = workspace.crawler(&server);
    crawler.run(&request()).await.unwrap();

    assert!(crawler.progress().is_complete(DATE_KEY, "X1"));
    let x1 = workspace.item_dir("X1");
    assert_eq!(data_lines(&x1, "motion"), 1);
    assert_eq!(data_lines(&x1, "details"), 2);
}
