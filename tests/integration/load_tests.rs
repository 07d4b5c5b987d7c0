//! Loading a crawled tree into SQLite

use crate::fixtures::*;
use tk_stemmingen::state::ProgressStore;
use tk_stemmingen::storage::Loader;

#[tokio::test]
async fn test_crawl_then_load() {
    let server = partial_success_site().await;
    let workspace = Workspace::new();
    workspace.crawler(&server).run(&request()).await.unwrap();

    let database = workspace.state_dir().join("stemmingen.db");
    let mut loader = Loader::open(&database).unwrap();
    let summary = loader.load_tree(&workspace.data_dir()).unwrap();

    assert_eq!(summary.items, 2);
    assert_eq!(summary.votings, 2);
    assert_eq!(summary.motions, 1);
    assert_eq!(summary.details, 2);

    let (date, seats): (String, i64) = loader
        .connection()
        .query_row(
            "SELECT v.date, SUM(d.seats) FROM voting v JOIN details d ON d.voting_id = v.voting_id
             WHERE v.voting_id = 'X1' GROUP BY v.voting_id",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(date, "2024-01-10");
    assert_eq!(seats, 61);

    // A second load of the same tree replaces instead of duplicating
    drop(loader);
    let mut loader = Loader::open(&database).unwrap();
    loader.load_tree(&workspace.data_dir()).unwrap();
    assert_eq!(loader.row_count("voting").unwrap(), 2);
    assert_eq!(loader.row_count("details").unwrap(), 2);
}

#[tokio::test]
async fn test_rebuild_progress_from_crawled_tree() {
    let server = partial_success_site().await;
    let workspace = Workspace::new();
    workspace.crawler(&server).run(&request()).await.unwrap();

    // Rebuild trusts directory names alone, partial items included
    let rebuilt =
        ProgressStore::rebuild(workspace.state_dir().join("rebuilt.json"), &workspace.data_dir())
            .unwrap();
    assert!(rebuilt.is_complete(DATE_KEY, "X1"));
    assert!(rebuilt.is_complete(DATE_KEY, "X2"));
    assert_eq!(rebuilt.len(), 2);
}
