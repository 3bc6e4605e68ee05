use crate::memo::Grade;
use crate::Result;
use chrono::prelude::*;

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct MemoCard {
    pub(crate) id: i64,
    pub(crate) question: String,
    pub(crate) answer: String,
    #[allow(dead_code)]
    pub(crate) last_grade: Option<Grade>,
    #[allow(dead_code)]
    pub(crate) next_review: Option<NaiveDate>,
}

const MEMO_CARD_COLUMNS: &str = "id, question, answer, last_grade, next_review";

pub(crate) struct MemoRepo {
    db: sqlx::SqlitePool,
}

impl MemoRepo {
    pub(crate) fn new(db: sqlx::SqlitePool) -> Self {
        Self { db }
    }

    /// Returns `false` if a card with the same question already exists.
    pub(crate) async fn insert_card(&self, question: &str, answer: &str) -> Result<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "insert into memo_card (question, answer, created_at, updated_at)
            values (?, ?, ?, ?)
            on conflict (question) do nothing",
        )
        .bind(question)
        .bind(answer)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// A random card that was never graded. These take priority over reviews.
    pub(crate) async fn pick_unseen(&self) -> Result<Option<MemoCard>> {
        let card = sqlx::query_as(&format!(
            "select {MEMO_CARD_COLUMNS}
            from memo_card
            where last_grade is null
            order by random()
            limit 1",
        ))
        .fetch_optional(&self.db)
        .await?;

        Ok(card)
    }

    /// A random card whose review date has come.
    pub(crate) async fn pick_due(&self, today: NaiveDate) -> Result<Option<MemoCard>> {
        let card = sqlx::query_as(&format!(
            "select {MEMO_CARD_COLUMNS}
            from memo_card
            where next_review is not null and next_review <= ?
            order by random()
            limit 1",
        ))
        .bind(today)
        .fetch_optional(&self.db)
        .await?;

        Ok(card)
    }

    pub(crate) async fn record_review(
        &self,
        card_id: i64,
        grade: Grade,
        next_review: NaiveDate,
    ) -> Result<()> {
        sqlx::query(
            "update memo_card
            set last_grade = ?, next_review = ?, updated_at = ?
            where id = ?",
        )
        .bind(grade)
        .bind(next_review)
        .bind(Utc::now())
        .bind(card_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
