use super::classify::{classify, Request};
use super::{twitter, web_page, youtube, Config};
use crate::db::{Bookmark, BookmarkKind, NewBookmark};
use crate::prelude::*;
use crate::util::slug::slugify;
use crate::{db, http, tg, util, ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use teloxide::net::Download;
use teloxide::prelude::*;

/// The outcome of a bookmark request, ready to be reported back to the chat.
#[derive(Debug)]
pub(crate) struct Bookmarked {
    pub(crate) kind: BookmarkKind,
    pub(crate) summary: String,
    pub(crate) already_existed: bool,
}

pub(crate) struct Service {
    db: Arc<db::Repo>,
    bot: tg::Bot,
    twitter: twitter::Client,
    youtube: youtube::Client,
    web: web_page::Archiver,
    output_dir: PathBuf,
}

impl Service {
    pub(crate) fn new(cfg: Config, http: http::Client, bot: tg::Bot, db: Arc<db::Repo>) -> Self {
        Self {
            twitter: twitter::Client::new(http.clone()),
            youtube: youtube::Client::new(http.clone()),
            web: web_page::Archiver::new(http, cfg.output_dir.clone()),
            output_dir: cfg.output_dir,
            bot,
            db,
        }
    }

    pub(crate) async fn bookmark_text(&self, text: &str) -> Result<Bookmarked> {
        let note = text.trim();

        if let Some(existing) = self.find_existing(note).await? {
            return Ok(existing);
        }

        let (kind, content) = match classify(note) {
            Request::Note(note) => (BookmarkKind::Note, Some(note)),
            Request::Tweet { id, .. } => {
                let tweet = self.twitter.get_tweet(id).await?;

                info!(author = tweet.author, "Fetched the tweet");

                (BookmarkKind::Tweet, Some(tweet.text))
            }
            Request::YouTube(url) => {
                let title = self.youtube.video_title(&url).await?;

                (BookmarkKind::YouTube, Some(title))
            }
            Request::GitHub(_) => (BookmarkKind::GitHub, None),
            Request::WebPage(url) => {
                let page = self.web.archive(&url).await?;

                info!(title = page.title.as_deref(), "Archived the web page");

                let content = page.snapshot_path.display().to_string();

                (BookmarkKind::WebPage, Some(content))
            }
        };

        self.persist(kind, note, content).await
    }

    pub(crate) async fn bookmark_photo(
        &self,
        note: &str,
        file_id: &str,
        ocr: bool,
    ) -> Result<Bookmarked> {
        if let Some(existing) = self.find_existing(note).await? {
            return Ok(existing);
        }

        let target = self.output_dir.join(format!("{}.png", slugify(note)));
        self.download_tg_file(file_id, &target).await?;

        info!(photo = %target.display(), "Saved the photo");

        let kind = if ocr {
            BookmarkKind::PhotoOcr
        } else {
            BookmarkKind::Photo
        };

        self.persist(kind, note, Some(target.display().to_string()))
            .await
    }

    pub(crate) async fn bookmark_document(
        &self,
        file_name: &str,
        file_id: &str,
    ) -> Result<Bookmarked> {
        if let Some(existing) = self.find_existing(file_name).await? {
            return Ok(existing);
        }

        let target = self.output_dir.join(archive_file_name(file_name));
        self.download_tg_file(file_id, &target).await?;

        info!(document = %target.display(), "Saved the document");

        self.persist(
            BookmarkKind::Document,
            file_name,
            Some(target.display().to_string()),
        )
        .await
    }

    pub(crate) async fn recent(&self, limit: u32) -> Result<Vec<Bookmark>> {
        self.db.bookmark.list_recent(limit).await
    }

    /// Fast path: skip all the network work when we already hold a bookmark
    /// with the same note. The unique index on the note column still backs
    /// this up if two requests race.
    async fn find_existing(&self, note: &str) -> Result<Option<Bookmarked>> {
        let Some(existing) = self.db.bookmark.find_by_note(note).await? else {
            return Ok(None);
        };

        info!(note, "Already bookmarked, nothing to do");

        Ok(Some(Bookmarked {
            kind: existing.kind,
            summary: summary_of(&existing),
            already_existed: true,
        }))
    }

    async fn download_tg_file(&self, file_id: &str, target: &Path) -> Result<()> {
        fs_err::tokio::create_dir_all(&self.output_dir).await?;

        // Downloads use teloxide's own client, which doesn't go through our
        // retrying middleware
        util::retry::retry_http(
            || async move {
                let file = self.bot.get_file(file_id).await?;

                let mut dst = fs_err::tokio::File::create(target).await?;
                tg::raw_bot(&self.bot)
                    .download_file(&file.path, &mut dst)
                    .await?;

                Ok(())
            },
            is_transient,
        )
        .await
    }

    async fn persist(
        &self,
        kind: BookmarkKind,
        note: &str,
        content: Option<String>,
    ) -> Result<Bookmarked> {
        let record = self
            .db
            .bookmark
            .insert(NewBookmark {
                kind,
                note,
                content,
            })
            .await?;

        info!(kind = %record.kind, note = record.note, "Recorded the bookmark");

        Ok(Bookmarked {
            kind: record.kind,
            summary: summary_of(&record),
            already_existed: false,
        })
    }
}

fn is_transient(err: &crate::Error) -> bool {
    match err.kind() {
        ErrorKind::Tg { source } => matches!(
            source,
            teloxide::RequestError::Network(_) | teloxide::RequestError::RetryAfter(_)
        ),
        ErrorKind::TgDownload { source } => {
            matches!(source, teloxide::DownloadError::Network(_))
        }
        _ => false,
    }
}

fn summary_of(bookmark: &Bookmark) -> String {
    match bookmark.kind {
        BookmarkKind::Photo | BookmarkKind::PhotoOcr => format!("Photo {}", bookmark.note),
        _ => bookmark.note.clone(),
    }
}

/// Telegram reports document names verbatim from the sender, so they can't
/// be trusted as filesystem paths. Slugify the stem and keep a plain
/// alphanumeric extension if there is one.
fn archive_file_name(file_name: &str) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (stem, Some(ext))
        }
        _ => (file_name, None),
    };

    let stem = slugify(stem);

    match ext {
        Some(ext) => format!("{stem}.{}", ext.to_ascii_lowercase()),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_names_stay_inside_the_archive_dir() {
        assert_eq!(archive_file_name("report.pdf"), "report.pdf");
        assert_eq!(archive_file_name("Report Final.PDF"), "report-final.pdf");
        assert_eq!(archive_file_name("notes.tar.gz"), "notes-tar.gz");

        // Traversal attempts collapse into a flat name
        assert_eq!(archive_file_name("../../etc/passwd"), "etc-passwd");
        assert_eq!(archive_file_name("..\\boot.ini"), "boot.ini");
        assert_eq!(archive_file_name("/etc/shadow"), "etc-shadow");

        // Degenerate names still produce something usable
        assert_eq!(archive_file_name(".bashrc"), "bashrc");
        assert_eq!(archive_file_name("..."), "untitled");
    }
}
