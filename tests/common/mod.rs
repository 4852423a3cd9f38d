use std::sync::Once;

use tournament_engine::{db, SqliteMatchStore, TeamEntry};

static INIT: Once = Once::new();

pub async fn init_test_store() -> SqliteMatchStore {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let db = db::setup("sqlite::memory:").await.expect("Failed to set up in-memory database");
    SqliteMatchStore::build(db)
}

pub fn teams(n: usize) -> Vec<TeamEntry> {
    (1..=n).map(|i| TeamEntry::build(&format!("team-{i}"), &format!("Team {i}"))).collect()
}
