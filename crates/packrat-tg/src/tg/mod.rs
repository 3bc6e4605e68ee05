//! Telegram bot wiring: update dispatch, commands, and message handlers.

mod bookmark;
mod cmd;
mod config;
mod memo;

use crate::prelude::*;
use crate::{bookmark as bookmark_svc, db, http, memo as memo_svc, Result};
use dptree::di::DependencyMap;
use std::sync::Arc;
use teloxide::adaptors::{CacheMe, DefaultParseMode, Throttle, Trace};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

pub(crate) use cmd::MemoAddCommandError;
pub(crate) use config::*;

pub(crate) type Bot = Trace<CacheMe<DefaultParseMode<Throttle<teloxide::Bot>>>>;

/// The adaptors don't forward [`teloxide::net::Download`], so file downloads
/// have to go through the innermost plain bot.
pub(crate) fn raw_bot(bot: &Bot) -> &teloxide::Bot {
    bot.inner().inner().inner().inner()
}

pub(crate) struct Ctx {
    bot: Bot,
    cfg: Arc<Config>,
    bookmarks: bookmark_svc::Service,
    memo: memo_svc::Service,
}

pub(crate) struct RunBotOptions {
    pub(crate) tg_cfg: Config,
    pub(crate) bookmark_cfg: bookmark_svc::Config,
    pub(crate) db: Arc<db::Repo>,
}

pub(crate) async fn run_bot(opts: RunBotOptions) -> Result {
    let mut di = DependencyMap::new();

    let http = http::create_client();

    let bot: Bot = teloxide::Bot::new(opts.tg_cfg.token.clone())
        .throttle(Default::default())
        .parse_mode(ParseMode::Html)
        .cache_me()
        .trace(teloxide::adaptors::trace::Settings::all());

    let cfg = Arc::new(opts.tg_cfg);

    di.insert(Arc::new(Ctx {
        bookmarks: bookmark_svc::Service::new(
            opts.bookmark_cfg,
            http,
            bot.clone(),
            opts.db.clone(),
        ),
        memo: memo_svc::Service::new(opts.db),
        bot: bot.clone(),
        cfg,
    }));

    info!("Starting bot...");

    bot.set_my_commands(cmd::regular::Cmd::bot_commands())
        .await?;

    let handler = dptree::entry()
        .inspect(|update: Update| {
            metrics::counter!(
                "tg_updates_total",
                1,
                "kind" => update.kind.discriminator(),
            );
            trace!(target: "tg_update", "{update:#?}");
        })
        .branch(
            Update::filter_message()
                .filter_command::<cmd::regular::Cmd>()
                .endpoint(cmd::handle::<cmd::regular::Cmd>()),
        )
        .branch(
            Update::filter_message()
                .filter(filter_authorized)
                .chain(dptree::filter_map(memo::filter_action))
                .endpoint(memo::handle),
        )
        .branch(
            Update::filter_message()
                .filter(filter_authorized)
                .endpoint(bookmark::handle),
        )
        .inspect(|update: Update| {
            metrics::counter!(
                "tg_updates_skipped_total",
                1,
                "kind" => update.kind.discriminator(),
            );
        });

    Dispatcher::builder(bot, handler)
        .dependencies(di)
        // We don't handle all possible messages that users send,
        // so to suppress the warning that we don't do this we have
        // a noop default handler here
        .default_handler(|_| std::future::ready(()))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");

    Ok(())
}

/// Renders the error for an in-chat reply. Bad user input is reported
/// verbatim; internal failures come as a code block with the error id,
/// so the logs can be searched for it.
fn error_reply(err: &crate::Error) -> String {
    use teloxide::utils::html;

    if err.is_user_error() {
        html::escape(&err.kind().display_chain().to_string())
    } else {
        html::code_block(&err.display_chain().to_string())
    }
}

fn filter_authorized(msg: Message, ctx: Arc<Ctx>) -> bool {
    let authorized = ctx.cfg.is_authorized(msg.chat.id);

    if !authorized {
        warn!(chat = %msg.chat.debug_id(), "Ignoring a message from an unauthorized chat");
    }

    authorized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn file_downloads_reach_the_plain_bot() {
        fn assert_can_download<D: for<'w> teloxide::net::Download<'w>>(_: &D) {}

        let bot: Bot = teloxide::Bot::new("123456:TEST")
            .throttle(Default::default())
            .parse_mode(ParseMode::Html)
            .cache_me()
            .trace(teloxide::adaptors::trace::Settings::all());

        assert_can_download(raw_bot(&bot));
    }
}
