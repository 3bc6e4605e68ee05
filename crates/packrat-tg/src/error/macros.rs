/// Builds a crate-level [`Error`](super::Error) from an [`ErrorKind`] variant
/// body. Each field value goes through an [`Into`] conversion, so `source`
/// errors don't need to be converted manually at every call site.
macro_rules! err {
    (@val $variant_ident:ident $field_val:expr) => ($field_val);
    (@val $variant_ident:ident) => ($variant_ident);
    ($variant_path:path $({
        $( $field_ident:ident $(: $field_val:expr)? ),*
        $(,)?
    })?) => {{
        use $variant_path as Variant;

        $crate::error::Error::from(
            Variant $({$(
                $field_ident: ::std::convert::Into::into(
                    $crate::error::err!(@val $field_ident $($field_val)?)
                )
            ),*})?
        )
    }};
}

/// Shortcut for `map_err` closures that forward the closure argument as the
/// `source` field of the variant.
macro_rules! err_ctx {
    ($variant_path:path $({ $($variant_fields:tt)* })?) => {
        |source| $crate::error::err!($variant_path { source, $($($variant_fields)*)? })
    };
}

/// Creates an [`ErrorKind::Fatal`] error from a format string
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::error::err!($crate::ErrorKind::Fatal {
            message: format!($($arg)*),
            source: None,
        })
    };
}

pub(crate) use err;
pub(crate) use err_ctx;
pub(crate) use fatal;
