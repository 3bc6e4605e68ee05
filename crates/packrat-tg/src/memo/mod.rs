//! Spaced-repetition review flow.
//!
//! Cards are served through a reply keyboard: "Ask Next Question" shows the
//! front of a random card (never-graded cards first, then the ones whose
//! review date has come), "Flip" reveals the back, and the grade buttons
//! reschedule the card.

use crate::prelude::*;
use crate::{db, Result};
use chrono::prelude::*;
use chrono::Duration;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::UserId;

pub(crate) const ASK_NEXT_BUTTON: &str = "Ask Next Question";
pub(crate) const FLIP_BUTTON: &str = "Flip";

/// How well the user remembered the answer, in their own judgement.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    strum::Display,
    strum::IntoStaticStr,
    sqlx::Type,
)]
#[repr(i16)]
pub(crate) enum Grade {
    Hard = 0,
    Fair = 1,
    Easy = 2,
}

impl Grade {
    pub(crate) fn button_label(self) -> &'static str {
        match self {
            Self::Hard => "🔴 Hard",
            Self::Fair => "🟡 Fair",
            Self::Easy => "🟢 Easy",
        }
    }

    fn from_button_label(label: &str) -> Option<Self> {
        [Self::Hard, Self::Fair, Self::Easy]
            .into_iter()
            .find(|grade| grade.button_label() == label)
    }

    /// Days until the card comes up for review again.
    fn interval(self) -> Duration {
        match self {
            Self::Hard => Duration::days(1),
            Self::Fair => Duration::days(2),
            Self::Easy => Duration::days(4),
        }
    }
}

pub(crate) fn next_review_after(today: NaiveDate, grade: Grade) -> NaiveDate {
    today + grade.interval()
}

/// A reply-keyboard button press, parsed from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReviewAction {
    AskNext,
    Flip,
    Grade(Grade),
}

impl ReviewAction {
    pub(crate) fn parse(text: &str) -> Option<Self> {
        match text {
            ASK_NEXT_BUTTON => Some(Self::AskNext),
            FLIP_BUTTON => Some(Self::Flip),
            other => Grade::from_button_label(other).map(Self::Grade),
        }
    }
}

/// The card a user is currently looking at, between "Ask Next Question"
/// and the grade button press.
#[derive(Debug, Clone)]
pub(crate) struct ActiveCard {
    pub(crate) id: i64,
    pub(crate) answer: String,
}

pub(crate) struct Service {
    db: Arc<db::Repo>,
    sessions: Mutex<HashMap<UserId, ActiveCard>>,
}

impl Service {
    pub(crate) fn new(db: Arc<db::Repo>) -> Self {
        Self {
            db,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Picks the next card for the user and makes it their active card.
    /// Returns [`None`] when there is nothing to review.
    pub(crate) async fn next_question(&self, user_id: UserId) -> Result<Option<String>> {
        let card = match self.db.memo.pick_unseen().await? {
            Some(card) => Some(card),
            None => self.db.memo.pick_due(Utc::now().date_naive()).await?,
        };

        let Some(card) = card else {
            self.sessions.lock().remove(&user_id);
            return Ok(None);
        };

        self.sessions.lock().insert(
            user_id,
            ActiveCard {
                id: card.id,
                answer: card.answer,
            },
        );

        Ok(Some(card.question))
    }

    /// The answer side of the user's active card, if they have one.
    pub(crate) fn flip(&self, user_id: UserId) -> Option<String> {
        self.sessions
            .lock()
            .get(&user_id)
            .map(|card| card.answer.clone())
    }

    /// Reschedules the user's active card from their recall grade.
    /// A grade press without an active card is a no-op.
    pub(crate) async fn grade(&self, user_id: UserId, grade: Grade) -> Result<()> {
        let Some(card) = self.sessions.lock().remove(&user_id) else {
            return Ok(());
        };

        let next_review = next_review_after(Utc::now().date_naive(), grade);

        info!(
            card_id = card.id,
            grade = %grade,
            %next_review,
            "Recording the review result"
        );

        self.db.memo.record_review(card.id, grade, next_review).await
    }

    /// Returns `false` if a card with the same question already exists.
    pub(crate) async fn add_card(&self, question: &str, answer: &str) -> Result<bool> {
        self.db.memo.insert_card(question, answer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_action_parsing() {
        assert_eq!(ReviewAction::parse(ASK_NEXT_BUTTON), Some(ReviewAction::AskNext));
        assert_eq!(ReviewAction::parse(FLIP_BUTTON), Some(ReviewAction::Flip));
        assert_eq!(
            ReviewAction::parse("🟢 Easy"),
            Some(ReviewAction::Grade(Grade::Easy))
        );
        assert_eq!(
            ReviewAction::parse("🔴 Hard"),
            Some(ReviewAction::Grade(Grade::Hard))
        );

        // Anything else is a bookmark, not a review action
        assert_eq!(ReviewAction::parse("https://example.com"), None);
        assert_eq!(ReviewAction::parse("easy"), None);
    }

    #[test_log::test(tokio::test)]
    async fn review_session_state() {
        let service = Service::new(Arc::new(crate::db::tests::test_repo().await));
        let user = UserId(42);

        // An empty deck: nothing to ask, flip, or grade
        assert_eq!(service.next_question(user).await.unwrap(), None);
        assert_eq!(service.flip(user), None);
        service.grade(user, Grade::Easy).await.unwrap();

        assert!(service.add_card("q", "a").await.unwrap());

        let question = service.next_question(user).await.unwrap().unwrap();
        assert_eq!(question, "q");
        assert_eq!(service.flip(user).as_deref(), Some("a"));

        service.grade(user, Grade::Easy).await.unwrap();

        // Grading ends the session and schedules the card out
        assert_eq!(service.flip(user), None);
        assert_eq!(service.next_question(user).await.unwrap(), None);
    }

    #[test]
    fn review_scheduling() {
        let today = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();

        let date = |day| NaiveDate::from_ymd_opt(2023, 9, day).unwrap();

        assert_eq!(next_review_after(today, Grade::Hard), date(2));
        assert_eq!(next_review_after(today, Grade::Fair), date(3));
        assert_eq!(next_review_after(today, Grade::Easy), date(5));
    }
}
