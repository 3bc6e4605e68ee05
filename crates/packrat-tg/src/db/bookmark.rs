use crate::prelude::*;
use crate::Result;
use chrono::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The handler class that produced the bookmark record.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    strum::Display,
    strum::IntoStaticStr,
    sqlx::Type,
)]
#[repr(i16)]
pub(crate) enum BookmarkKind {
    Note = 0,
    Tweet = 1,
    YouTube = 2,
    GitHub = 3,
    WebPage = 4,
    Photo = 5,
    PhotoOcr = 6,
    Document = 7,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct Bookmark {
    #[allow(dead_code)]
    pub(crate) id: i64,
    pub(crate) kind: BookmarkKind,
    pub(crate) note: String,
    pub(crate) content: Option<String>,
    #[allow(dead_code)]
    pub(crate) created_at: DateTime<Utc>,
}

pub(crate) struct NewBookmark<'a> {
    pub(crate) kind: BookmarkKind,
    pub(crate) note: &'a str,
    pub(crate) content: Option<String>,
}

pub(crate) struct BookmarkRepo {
    db: sqlx::SqlitePool,
}

impl BookmarkRepo {
    pub(crate) fn new(db: sqlx::SqlitePool) -> Self {
        Self { db }
    }

    pub(crate) async fn find_by_note(&self, note: &str) -> Result<Option<Bookmark>> {
        let bookmark = sqlx::query_as(
            "select id, kind, note, content, created_at
            from bookmark
            where note = ?",
        )
        .bind(note)
        .fetch_optional(&self.db)
        .with_duration_log("Looking up an existing bookmark")
        .await?;

        Ok(bookmark)
    }

    /// Inserts the record unless a bookmark with the same note sneaked in
    /// between the lookup and the insert. Returns the winning record either way.
    pub(crate) async fn insert(&self, new: NewBookmark<'_>) -> Result<Bookmark> {
        let inserted: Option<Bookmark> = sqlx::query_as(
            "insert into bookmark (kind, note, content, created_at)
            values (?, ?, ?, ?)
            on conflict (note) do nothing
            returning id, kind, note, content, created_at",
        )
        .bind(new.kind)
        .bind(new.note)
        .bind(&new.content)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        match inserted {
            Some(bookmark) => Ok(bookmark),
            None => {
                let existing = self.find_by_note(new.note).await?;
                existing.fatal_ctx(|| "Bookmark insert conflicted, but the row is gone")
            }
        }
    }

    pub(crate) async fn list_recent(&self, limit: u32) -> Result<Vec<Bookmark>> {
        let bookmarks = sqlx::query_as(
            "select id, kind, note, content, created_at
            from bookmark
            order by id desc
            limit ?",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(bookmarks)
    }
}
