//! The catch-all message handler: anything that is not a command or a
//! review button press is a bookmark request.

use crate::bookmark::BookmarkError;
use crate::db::BookmarkKind;
use crate::prelude::*;
use crate::tg::Ctx;
use crate::util::DynResult;
use crate::{Error, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{Message, PhotoSize, User};
use teloxide::utils::html;

/// Caption that routes a photo to the OCR queue instead of the plain
/// photo archive.
const OCR_CAPTION: &str = "ocr";

pub(crate) async fn handle(ctx: Arc<Ctx>, msg: Message) -> DynResult {
    let span = info_span!(
        "handle_bookmark",
        sender = msg.from().map(User::debug_id).as_deref(),
        msg_text = msg.text(),
        chat = %msg.chat.debug_id(),
    );

    async {
        if let Err(err) = handle_imp(&ctx, &msg).await {
            report_error(&ctx, &msg, &err).await;
        }
        Ok(())
    }
    .instrument(span)
    .await
}

async fn handle_imp(ctx: &Ctx, msg: &Message) -> Result {
    let ack = ctx
        .bot
        .send_message(
            msg.chat.id,
            format!("Got {}. 👀 at 🌎", msg.text().unwrap_or("it")),
        )
        .disable_web_page_preview(true)
        .await?;

    let bookmarked = dispatch(ctx, msg).await?;

    // Photos keep the original message in the chat, everything else is
    // replaced with the confirmation
    let keep_original = matches!(
        bookmarked.kind,
        BookmarkKind::Photo | BookmarkKind::PhotoOcr
    );

    if !keep_original {
        ctx.bot.delete_message(msg.chat.id, msg.id).await?;
    }

    ctx.bot.delete_message(ack.chat.id, ack.id).await?;

    let confirmation = if bookmarked.already_existed {
        format!("🔖 {} is already bookmarked", html::escape(&bookmarked.summary))
    } else {
        format!("🔖 {} bookmarked", html::escape(&bookmarked.summary))
    };

    ctx.bot
        .send_message(msg.chat.id, confirmation)
        .disable_web_page_preview(true)
        .await?;

    Ok(())
}

async fn dispatch(ctx: &Ctx, msg: &Message) -> Result<crate::bookmark::Bookmarked> {
    if let Some(photos) = msg.photo() {
        return bookmark_photo(ctx, msg, photos).await;
    }

    if let Some(doc) = msg.document() {
        let file_name = doc
            .file_name
            .as_deref()
            .unwrap_or(doc.file.unique_id.as_str());

        return ctx.bookmarks.bookmark_document(file_name, &doc.file.id).await;
    }

    if let Some(text) = msg.text() {
        return ctx.bookmarks.bookmark_text(text).await;
    }

    Err(BookmarkError::UnsupportedMessage.into())
}

async fn bookmark_photo(
    ctx: &Ctx,
    msg: &Message,
    photos: &[PhotoSize],
) -> Result<crate::bookmark::Bookmarked> {
    // Telegram sends several downscaled variants, the last one is the largest
    let photo = photos
        .last()
        .fatal_ctx(|| "A photo message with no photo sizes")?;

    let caption = msg.caption().map(str::trim);
    let ocr = caption == Some(OCR_CAPTION);

    // The caption names the photo, unless it is the OCR routing marker.
    // Captionless photos are named after the message id.
    let note = match caption.filter(|&caption| caption != OCR_CAPTION) {
        Some(caption) => caption.to_owned(),
        None => format!("msg-{}", msg.id.0),
    };

    ctx.bookmarks
        .bookmark_photo(&note, &photo.file.id, ocr)
        .await
}

async fn report_error(ctx: &Ctx, msg: &Message, err: &Error) {
    let span = warn_span!("err", err = tracing_err(err), id = err.id());

    async {
        if !err.is_user_error() {
            warn!("Bookmark handler returned an error");
        }

        let reply_msg = crate::tg::error_reply(err);

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
    .await
}
