use crate::memo::ASK_NEXT_BUTTON;
use crate::prelude::*;
use crate::{tg, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, Message};
use teloxide::utils::command::BotCommands;
use teloxide::utils::html;

const GREETING: &str = "👋 Hi there. \
    ⬇️ I'm a bot to save bookmarks ⬆️. \
    Try sending me something";

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Commands:")]
pub(crate) enum Cmd {
    #[command(description = "show the greeting")]
    Start,

    #[command(description = "show this help")]
    Help,

    #[command(description = "start a memo review session")]
    Memo,

    #[command(description = "add a memo card: <question> | <answer>")]
    MemoAdd(String),

    #[command(description = "show the most recent bookmarks")]
    Recent,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum MemoAddCommandError {
    #[error("Expected `question | answer` separated with a `|` character")]
    MissingSeparator,

    #[error("The question part must not be empty")]
    EmptyQuestion,

    #[error("The answer part must not be empty")]
    EmptyAnswer,

    #[error("A card with this question already exists")]
    DuplicateQuestion,
}

fn parse_memo_card(input: &str) -> Result<(&str, &str), MemoAddCommandError> {
    let (question, answer) = input
        .split_once('|')
        .ok_or(MemoAddCommandError::MissingSeparator)?;

    let question = question.trim();
    let answer = answer.trim();

    if question.is_empty() {
        return Err(MemoAddCommandError::EmptyQuestion);
    }
    if answer.is_empty() {
        return Err(MemoAddCommandError::EmptyAnswer);
    }

    Ok((question, answer))
}

#[async_trait]
impl tg::cmd::Command for Cmd {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result {
        let chat_id = msg.chat.id;

        if !matches!(self, Cmd::Start | Cmd::Help) && !ctx.cfg.is_authorized(chat_id) {
            warn!(chat = %msg.chat.debug_id(), "Ignoring a command from an unauthorized chat");
            return Ok(());
        }

        match self {
            Cmd::Start => {
                ctx.bot.send_message(chat_id, GREETING).await?;
            }
            Cmd::Help => {
                ctx.bot
                    .send_message(chat_id, html::escape(&Cmd::descriptions().to_string()))
                    .await?;
            }
            Cmd::Memo => {
                let keyboard =
                    KeyboardMarkup::new([[KeyboardButton::new(ASK_NEXT_BUTTON)]])
                        .resize_keyboard(true);

                ctx.bot
                    .send_message(chat_id, "Press the button to ask the next question.")
                    .reply_markup(keyboard)
                    .await?;
            }
            Cmd::MemoAdd(input) => {
                let (question, answer) = parse_memo_card(&input)?;

                if !ctx.memo.add_card(question, answer).await? {
                    return Err(MemoAddCommandError::DuplicateQuestion.into());
                }

                ctx.bot
                    .send_message(chat_id, format!("📝 Added: {}", html::escape(question)))
                    .await?;
            }
            Cmd::Recent => {
                let bookmarks = ctx.bookmarks.recent(10).await?;

                if bookmarks.is_empty() {
                    ctx.bot.send_message(chat_id, "No bookmarks yet").await?;
                    return Ok(());
                }

                let list: String = bookmarks
                    .iter()
                    .map(|bookmark| {
                        format!("• [{}] {}\n", bookmark.kind, html::escape(&bookmark.note))
                    })
                    .collect();

                ctx.bot.send_message(chat_id, list).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn memo_card_parsing() {
        assert_eq!(
            parse_memo_card("  2 + 2 | 4 ").unwrap(),
            ("2 + 2", "4")
        );
        assert_matches!(
            parse_memo_card("no separator here"),
            Err(MemoAddCommandError::MissingSeparator)
        );
        assert_matches!(
            parse_memo_card(" | the answer"),
            Err(MemoAddCommandError::EmptyQuestion)
        );
        assert_matches!(
            parse_memo_card("the question | "),
            Err(MemoAddCommandError::EmptyAnswer)
        );
    }
}
