//! Review session flow over a reply keyboard.

use crate::memo::{Grade, ReviewAction, ASK_NEXT_BUTTON, FLIP_BUTTON};
use crate::prelude::*;
use crate::tg::Ctx;
use crate::util::DynResult;
use crate::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, Message, User, UserId};
use teloxide::utils::html;

/// Routes reply keyboard button presses to the review flow. Any other text
/// falls through to the bookmark handler.
pub(crate) fn filter_action(msg: Message) -> Option<ReviewAction> {
    msg.text().and_then(ReviewAction::parse)
}

pub(crate) async fn handle(ctx: Arc<Ctx>, msg: Message, action: ReviewAction) -> DynResult {
    let span = info_span!(
        "handle_review",
        sender = msg.from().map(User::debug_id).as_deref(),
        chat = %msg.chat.debug_id(),
        action = format_args!("{action:?}"),
    );

    async move {
        let user_id = msg
            .from()
            .fatal_ctx(|| "A review button press with no sender")?
            .id;

        match action {
            ReviewAction::AskNext => ask_next(&ctx, &msg, user_id).await?,
            ReviewAction::Flip => flip(&ctx, &msg, user_id).await?,
            ReviewAction::Grade(grade) => {
                ctx.memo.grade(user_id, grade).await?;
                ask_next(&ctx, &msg, user_id).await?;
            }
        }

        Ok(())
    }
    .instrument(span)
    .await
    .map_err(|err: crate::Error| err.into())
}

async fn ask_next(ctx: &Ctx, msg: &Message, user_id: UserId) -> Result {
    let Some(question) = ctx.memo.next_question(user_id).await? else {
        ctx.bot
            .send_message(msg.chat.id, "🎉 Nothing to review right now")
            .reply_markup(single_button_keyboard(ASK_NEXT_BUTTON))
            .await?;
        return Ok(());
    };

    ctx.bot
        .send_message(
            msg.chat.id,
            format!("<b>Question</b>\n{}", html::escape(&question)),
        )
        .reply_markup(single_button_keyboard(FLIP_BUTTON))
        .await?;

    Ok(())
}

async fn flip(ctx: &Ctx, msg: &Message, user_id: UserId) -> Result {
    // A flip without an active card happens when the bot restarts
    // mid-session. Just move on to the next question.
    let Some(answer) = ctx.memo.flip(user_id) else {
        return ask_next(ctx, msg, user_id).await;
    };

    let grades = [Grade::Hard, Grade::Fair, Grade::Easy]
        .map(|grade| KeyboardButton::new(grade.button_label()));

    let keyboard = KeyboardMarkup::new([grades]).resize_keyboard(true);

    ctx.bot
        .send_message(
            msg.chat.id,
            format!("<b>Answer</b>\n{}", html::escape(&answer)),
        )
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

fn single_button_keyboard(label: &str) -> KeyboardMarkup {
    KeyboardMarkup::new([[KeyboardButton::new(label)]]).resize_keyboard(true)
}
