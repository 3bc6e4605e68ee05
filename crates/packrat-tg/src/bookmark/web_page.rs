use crate::prelude::*;
use crate::util::slug::slugify;
use crate::{http, Result};
use itertools::Itertools;
use lazy_regex::regex_captures;
use std::path::PathBuf;
use url::Url;

pub(crate) struct ArchivedPage {
    pub(crate) title: Option<String>,
    pub(crate) snapshot_path: PathBuf,
}

/// Downloads web pages and keeps an HTML snapshot of them on disk, so the
/// bookmark survives the page going away.
pub(crate) struct Archiver {
    http: http::Client,
    output_dir: PathBuf,
}

impl Archiver {
    pub(crate) fn new(http: http::Client, output_dir: PathBuf) -> Self {
        Self { http, output_dir }
    }

    pub(crate) async fn archive(&self, url: &Url) -> Result<ArchivedPage> {
        let html = self.http.get(url.clone()).read_text().await?;

        let title = extract_title(&html);
        let stem = slugify(title.as_deref().unwrap_or(url.as_str()));

        fs_err::tokio::create_dir_all(&self.output_dir).await?;

        let snapshot_path = self.output_dir.join(format!("{stem}.html"));
        fs_err::tokio::write(&snapshot_path, html).await?;

        info!(path = %snapshot_path.display(), "Saved a web page snapshot");

        Ok(ArchivedPage {
            title,
            snapshot_path,
        })
    }
}

fn extract_title(html: &str) -> Option<String> {
    let (_, title) = regex_captures!(r"(?is)<title[^>]*>(.*?)</title>", html)?;

    // Titles in the wild come wrapped in indentation and line breaks
    let title = title.split_whitespace().join(" ");

    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_extraction() {
        assert_eq!(
            extract_title("<html><head><title>Hello</title></head></html>"),
            Some("Hello".to_owned())
        );
        assert_eq!(
            extract_title("<TITLE>\n  Multi\n  line\n</TITLE>"),
            Some("Multi line".to_owned())
        );
        assert_eq!(
            extract_title(r#"<title data-rh="true">Attrs</title>"#),
            Some("Attrs".to_owned())
        );
        assert_eq!(extract_title("<title></title>"), None);
        assert_eq!(extract_title("<body>no title</body>"), None);
    }
}
