use super::{err, ErrorKind, Result};
use crate::util::DynError;
use easy_ext::ext;

#[ext(ResultExt)]
impl<T, E> Result<T, E> {
    #[track_caller]
    pub fn fatal_ctx<S>(self, message: impl FnOnce() -> S) -> Result<T>
    where
        S: Into<String>,
        E: Into<Box<DynError>>,
    {
        // `#[track_caller]` doesn't propagate into closures, so no `map_err`
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err!(ErrorKind::Fatal {
                message: message().into(),
                source: Some(err.into()),
            })),
        }
    }
}

#[ext(OptionExt)]
impl<T> Option<T> {
    #[track_caller]
    pub fn fatal_ctx<S>(self, message: impl FnOnce() -> S) -> Result<T>
    where
        S: Into<String>,
    {
        // Same as above: `ok_or_else` would lose the caller location
        match self {
            Some(value) => Ok(value),
            None => Err(err!(ErrorKind::Fatal {
                message: message().into(),
                source: None,
            })),
        }
    }
}
