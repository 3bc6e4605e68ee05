mod bookmark;
mod config;
mod db;
mod error;
mod http;
mod memo;
mod observability;
mod tg;

pub mod util;

pub use crate::error::*;
pub use config::*;
pub use observability::*;

use std::sync::Arc;

#[allow(unused_imports)]
mod prelude {
    pub(crate) use crate::error::prelude::*;
    pub(crate) use crate::http::prelude::*;
    pub(crate) use crate::observability::logging::prelude::*;
    pub(crate) use crate::util::prelude::*;
}

/// Run the telegram bot processing loop
pub async fn run(config: Config) -> Result<()> {
    let db = Arc::new(db::init(config.db).await?);

    let opts = tg::RunBotOptions {
        tg_cfg: config.tg,
        bookmark_cfg: config.bookmark,
        db,
    };

    tg::run_bot(opts).await
}
