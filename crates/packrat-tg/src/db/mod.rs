mod bookmark;
mod cfg;
mod memo;

use crate::prelude::*;
use crate::{err_ctx, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

pub(crate) use bookmark::*;
pub(crate) use cfg::*;
pub(crate) use memo::*;

/// Most likely unrecoverable errors from database communication layer
#[derive(Debug, thiserror::Error)]
pub(crate) enum DbError {
    #[error("Failed to connect to the database")]
    Connect { source: sqlx::Error },

    #[error("Failed to migrate the database")]
    Migrate { source: sqlx::migrate::MigrateError },

    #[error("Database query failed")]
    Query {
        #[from]
        source: sqlx::Error,
    },
}

pub(crate) struct Repo {
    pub(crate) bookmark: BookmarkRepo,
    pub(crate) memo: MemoRepo,
}

pub(crate) async fn init(cfg: Config) -> Result<Repo> {
    let opts = SqliteConnectOptions::from_str(cfg.url.as_str())
        .map_err(err_ctx!(DbError::Connect))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.pool_size)
        .connect_with(opts)
        .await
        .map_err(err_ctx!(DbError::Connect))?;

    // Verify and upgrade the schema early, before the bot goes online
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(err_ctx!(DbError::Migrate))?;

    info!(url = %cfg.url, "Connected to the database");

    Ok(Repo::new(pool))
}

impl Repo {
    pub(crate) fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            bookmark: BookmarkRepo::new(pool.clone()),
            memo: MemoRepo::new(pool),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::memo::{next_review_after, Grade};
    use assert_matches::assert_matches;
    use chrono::prelude::*;
    use chrono::Duration;

    pub(crate) async fn test_repo() -> Repo {
        // In-memory sqlite databases are per-connection, so the pool must
        // not open a second one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::migrate!().run(&pool).await.unwrap();

        Repo::new(pool)
    }

    #[test_log::test(tokio::test)]
    async fn at_most_one_bookmark_per_note() {
        let repo = test_repo().await;

        let new = |content: &str| NewBookmark {
            kind: BookmarkKind::Note,
            note: "buy milk",
            content: Some(content.to_owned()),
        };

        let first = repo.bookmark.insert(new("buy milk")).await.unwrap();
        let second = repo.bookmark.insert(new("sneaky duplicate")).await.unwrap();

        // The duplicate insert lost the conflict and returned the original row
        assert_eq!(second.id, first.id);
        assert_eq!(second.content.as_deref(), Some("buy milk"));

        let found = repo
            .bookmark
            .find_by_note("buy milk")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, first.id);
        assert_matches!(repo.bookmark.find_by_note("missing").await.unwrap(), None);
    }

    #[test_log::test(tokio::test)]
    async fn recent_bookmarks_come_newest_first() {
        let repo = test_repo().await;

        for note in ["first", "second", "third"] {
            repo.bookmark
                .insert(NewBookmark {
                    kind: BookmarkKind::Note,
                    note,
                    content: None,
                })
                .await
                .unwrap();
        }

        let recent = repo.bookmark.list_recent(2).await.unwrap();
        let notes: Vec<_> = recent.iter().map(|bookmark| &bookmark.note).collect();

        assert_eq!(notes, ["third", "second"]);
    }

    #[test_log::test(tokio::test)]
    async fn unseen_cards_come_before_due_ones() {
        let repo = test_repo().await;

        assert!(repo.memo.insert_card("q1", "a1").await.unwrap());
        assert!(repo.memo.insert_card("q2", "a2").await.unwrap());

        // A card with a duplicate question is rejected
        assert!(!repo.memo.insert_card("q1", "other answer").await.unwrap());

        let today = Utc::now().date_naive();

        let first = repo.memo.pick_unseen().await.unwrap().unwrap();
        repo.memo
            .record_review(first.id, Grade::Easy, next_review_after(today, Grade::Easy))
            .await
            .unwrap();

        // The remaining never-graded card still takes priority
        let second = repo.memo.pick_unseen().await.unwrap().unwrap();
        assert_ne!(second.id, first.id);

        repo.memo
            .record_review(second.id, Grade::Hard, next_review_after(today, Grade::Hard))
            .await
            .unwrap();

        assert_matches!(repo.memo.pick_unseen().await.unwrap(), None);
    }

    #[test_log::test(tokio::test)]
    async fn cards_come_due_on_their_review_date() {
        let repo = test_repo().await;

        assert!(repo.memo.insert_card("q1", "a1").await.unwrap());

        let today = Utc::now().date_naive();
        let card = repo.memo.pick_unseen().await.unwrap().unwrap();

        repo.memo
            .record_review(card.id, Grade::Fair, next_review_after(today, Grade::Fair))
            .await
            .unwrap();

        // Fair reschedules the card two days out
        assert_matches!(repo.memo.pick_due(today).await.unwrap(), None);
        assert_matches!(
            repo.memo.pick_due(today + Duration::days(1)).await.unwrap(),
            None
        );

        let due = repo
            .memo
            .pick_due(today + Duration::days(2))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(due.id, card.id);

        // And it stays due until reviewed again
        let still_due = repo.memo.pick_due(today + Duration::days(30)).await.unwrap();
        assert_matches!(still_due, Some(later) if later.id == card.id);
    }
}
