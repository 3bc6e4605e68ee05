use super::twitter::TweetId;
use lazy_regex::regex_captures;
use url::Url;

/// What an incoming text message asks us to bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Note(String),
    Tweet { url: Url, id: TweetId },
    YouTube(Url),
    GitHub(Url),
    WebPage(Url),
}

/// Routes the message text to a handler kind. Anything that is not a link
/// is a plain note; links are dispatched on their host.
pub(crate) fn classify(text: &str) -> Request {
    let text = text.trim();

    if !text.starts_with("http") {
        return Request::Note(text.to_owned());
    }

    let Ok(url) = Url::parse(text) else {
        // Something that merely looks like a link is still worth keeping
        return Request::Note(text.to_owned());
    };

    if let Some((_, id)) = regex_captures!(
        r"(?:https?://)(?:www\.|mobile\.)?(?:twitter|x)\.com/[^/]+/status/(\d+)",
        text
    ) {
        if let Ok(id) = id.parse() {
            return Request::Tweet { url, id };
        }
    }

    match url.host_str() {
        Some("youtube.com" | "www.youtube.com" | "m.youtube.com" | "youtu.be") => {
            Request::YouTube(url)
        }
        Some("github.com" | "www.github.com") => Request::GitHub(url),
        _ => Request::WebPage(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    #[track_caller]
    fn assert_classify(text: &str, expected: Expect) {
        let actual = match classify(text) {
            Request::Note(note) => format!("Note({note})"),
            Request::Tweet { id, .. } => format!("Tweet({id})"),
            Request::YouTube(url) => format!("YouTube({url})"),
            Request::GitHub(url) => format!("GitHub({url})"),
            Request::WebPage(url) => format!("WebPage({url})"),
        };

        expected.assert_eq(&actual);
    }

    #[test]
    fn plain_notes() {
        use self::assert_classify as test;

        test("buy milk", expect!["Note(buy milk)"]);
        test("  spaces around  ", expect!["Note(spaces around)"]);
        test(
            "http that goes nowhere",
            expect!["Note(http that goes nowhere)"],
        );
    }

    #[test]
    fn tweets() {
        use self::assert_classify as test;

        test(
            "https://twitter.com/rustlang/status/1609634286050623492",
            expect!["Tweet(1609634286050623492)"],
        );
        test(
            "https://x.com/rustlang/status/1609634286050623492",
            expect!["Tweet(1609634286050623492)"],
        );
        test(
            "https://mobile.twitter.com/rustlang/status/1609634286050623492",
            expect!["Tweet(1609634286050623492)"],
        );

        // A twitter link that is not a status link is just a web page
        test(
            "https://twitter.com/rustlang",
            expect!["WebPage(https://twitter.com/rustlang)"],
        );
    }

    #[test]
    fn youtube_videos() {
        use self::assert_classify as test;

        test(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            expect!["YouTube(https://www.youtube.com/watch?v=dQw4w9WgXcQ)"],
        );
        test(
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            expect!["YouTube(https://m.youtube.com/watch?v=dQw4w9WgXcQ)"],
        );
        test(
            "https://youtu.be/dQw4w9WgXcQ",
            expect!["YouTube(https://youtu.be/dQw4w9WgXcQ)"],
        );
    }

    #[test]
    fn github_links() {
        use self::assert_classify as test;

        test(
            "https://github.com/teloxide/teloxide",
            expect!["GitHub(https://github.com/teloxide/teloxide)"],
        );
        test(
            "https://www.github.com/teloxide/teloxide",
            expect!["GitHub(https://www.github.com/teloxide/teloxide)"],
        );
    }

    #[test]
    fn everything_else_is_a_web_page() {
        use self::assert_classify as test;

        test(
            "https://blog.rust-lang.org/2023/08/24/Rust-1.72.0.html",
            expect!["WebPage(https://blog.rust-lang.org/2023/08/24/Rust-1.72.0.html)"],
        );
        test(
            "http://example.com",
            expect!["WebPage(http://example.com/)"],
        );
    }
}
