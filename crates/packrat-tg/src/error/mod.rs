mod ext;
mod macros;

use crate::prelude::*;
use crate::util::DynError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing_error::SpanTrace;

pub(crate) use ext::*;
pub(crate) use macros::*;

pub(crate) mod prelude {
    pub(crate) use super::macros::{err, err_ctx, fatal};
    pub(crate) use super::{OptionExt as _, ResultExt as _};
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Describes any possible error that may happen in the application lifetime.
#[derive(Clone)]
pub struct Error {
    imp: Arc<ErrorImp>,
}

struct ErrorImp {
    /// Small identifier used for debugging purposes.
    /// It is mentioned in the chat when the error happens.
    /// This way we as developers can copy it and lookup the logs using this id.
    pub(crate) id: String,
    kind: ErrorKind,

    // Participates only in debug impl
    #[allow(dead_code)]
    pub(crate) spantrace: SpanTrace,
}

#[derive(Error, Debug)]
pub(crate) enum ErrorKind {
    #[error(transparent)]
    Bookmark {
        #[from]
        source: crate::bookmark::BookmarkError,
    },

    #[error(transparent)]
    MemoAddCommand {
        #[from]
        source: crate::tg::MemoAddCommandError,
    },

    #[error(transparent)]
    HttpClient {
        #[from]
        source: crate::http::HttpClientError,
    },

    #[error(transparent)]
    Tg {
        #[from]
        source: teloxide::RequestError,
    },

    #[error(transparent)]
    TgDownload {
        #[from]
        source: teloxide::DownloadError,
    },

    #[error(transparent)]
    Db {
        #[from]
        source: crate::db::DbError,
    },

    #[error(transparent)]
    Io {
        #[from]
        source: IoError,
    },

    /// Unrecoverable kind of error, that is not supposed to happen, but when
    /// it happens we can't do anything reasonable about it, so no structural
    /// error handling is possible, this error is just propagated to the top.
    #[error("FATAL: {message}")]
    Fatal {
        message: String,
        source: Option<Box<DynError>>,
    },
}

impl From<std::io::Error> for ErrorKind {
    fn from(err: std::io::Error) -> Self {
        Self::Io { source: err.into() }
    }
}

impl From<sqlx::Error> for ErrorKind {
    fn from(err: sqlx::Error) -> Self {
        Self::Db { source: err.into() }
    }
}

#[derive(Debug, Error)]
pub(crate) enum IoError {
    #[error(transparent)]
    Other {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn id(&self) -> &str {
        &self.imp.id
    }

    /// Errors caused by interaction with the user.
    /// These are most likely caused by humanz sending wrong input.
    pub(crate) fn is_user_error(&self) -> bool {
        match &self.imp.kind {
            ErrorKind::Bookmark { .. } | ErrorKind::MemoAddCommand { .. } => true,
            ErrorKind::HttpClient { .. }
            | ErrorKind::Tg { .. }
            | ErrorKind::TgDownload { .. }
            | ErrorKind::Db { .. }
            | ErrorKind::Io { .. }
            | ErrorKind::Fatal { .. } => false,
        }
    }

    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.imp.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error (id: {}): {}", self.imp.id, self.imp.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.imp.kind.source()
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)?;
        fmt::Display::fmt(&self.imp.spantrace, f)
    }
}

impl<T: Into<ErrorKind>> From<T> for Error {
    #[track_caller]
    fn from(kind: T) -> Self {
        let kind: ErrorKind = kind.into();

        let imp = ErrorImp {
            kind,
            id: nanoid::nanoid!(6),
            spantrace: SpanTrace::capture(),
        };

        let err = Self { imp: Arc::new(imp) };

        trace!(err = tracing_err(&err), "Created an error");

        err
    }
}
