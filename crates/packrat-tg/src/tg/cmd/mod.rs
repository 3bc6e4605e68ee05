pub(crate) mod regular;

use crate::prelude::*;
use crate::util::DynResult;
use crate::{tg, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{Message, User};

pub(crate) use regular::MemoAddCommandError;

#[async_trait]
pub(crate) trait Command: fmt::Debug + Send + Sync + 'static {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result;
}

pub(crate) fn handle<'a, C: Command>(
) -> impl Fn(Arc<tg::Ctx>, Message, C) -> BoxFuture<'a, DynResult> {
    move |ctx, msg, cmd| {
        let span = info_span!(
            "handle_command",
            sender = msg.from().map(User::debug_id).as_deref(),
            msg_text = msg.text(),
            chat = %msg.chat.debug_id(),
            cmd = format_args!("{cmd:#?}")
        );

        let fut = async move {
            debug!("Processing command");

            let result = cmd.handle(&ctx, &msg).await;
            if let Err(err) = &result {
                let span = warn_span!("err", err = tracing_err(err), id = err.id());
                async {
                    if !err.is_user_error() {
                        warn!("Command handler returned an error");
                    }

                    let reply_msg = tg::error_reply(err);

                    let msg_result = ctx
                        .bot
                        .send_message(msg.chat.id, reply_msg)
                        .reply_to_message_id(msg.id)
                        .await;

                    if let Err(err) = msg_result {
                        warn!(
                            err = tracing_err(&err),
                            "Failed to reply with the error message to the user"
                        );
                    }
                }
                .instrument(span)
                .await;
            }
            result.map_err(Into::into)
        };

        Box::pin(fut.instrument(span))
    }
}
