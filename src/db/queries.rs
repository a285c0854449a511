//! Database queries for tours, inquiries, contact submissions and users

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::contact::ContactSubmission;
use crate::error::{AppError, Result};
use crate::inquiries::{InquiryParts, InquiryRecord, InquiryReply};
use crate::tours::{MealCategoryId, TourDefinition};
use crate::users::User;
use crate::validation::ValidationError;

#[derive(Debug, sqlx::FromRow)]
struct TourRow {
    document: Json<TourDefinition>,
}

/// Get a tour by id
pub async fn get_tour(pool: &PgPool, id: Uuid) -> Result<TourDefinition> {
    let row = sqlx::query_as::<_, TourRow>(
        r#"
        SELECT document
        FROM tours
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(row.document.0)
}

/// All tours, newest first
pub async fn list_tours(pool: &PgPool) -> Result<Vec<TourDefinition>> {
    let rows = sqlx::query_as::<_, TourRow>(
        r#"
        SELECT document
        FROM tours
        ORDER BY created_at DESC, title
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.document.0).collect())
}

/// Insert a tour, replacing the stored document if the id exists.
/// The original `created_at` is kept in both the column and the document.
pub async fn save_tour(pool: &PgPool, tour: &TourDefinition) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tours (id, title, document, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE
        SET title = EXCLUDED.title,
            document = jsonb_set(EXCLUDED.document, '{created_at}', to_jsonb(tours.created_at)),
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(tour.id)
    .bind(&tour.title)
    .bind(Json(tour))
    .bind(tour.created_at)
    .bind(tour.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace an existing tour
pub async fn update_tour(pool: &PgPool, tour: &TourDefinition) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE tours
        SET title = $2,
            document = $3,
            updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(tour.id)
    .bind(&tour.title)
    .bind(Json(tour))
    .bind(tour.updated_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete_tour(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM tours WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct InquiryRow {
    id: Uuid,
    name: String,
    email: String,
    phone_number: String,
    travel_date: NaiveDate,
    traveller_count: i64,
    message: String,
    tour_id: Option<Uuid>,
    selected_nights_key: Option<String>,
    selected_option: Option<String>,
    selected_meal_category: Option<i16>,
    final_price: Option<Decimal>,
    currency: String,
    submitted_at: DateTime<Utc>,
}

impl InquiryRow {
    fn into_parts(self) -> InquiryParts {
        InquiryParts {
            id: self.id,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            travel_date: self.travel_date,
            traveller_count: u32::try_from(self.traveller_count).unwrap_or(0),
            message: self.message,
            tour_id: self.tour_id,
            selected_nights_key: self.selected_nights_key,
            selected_option: self.selected_option,
            selected_meal_category: meal_from_column(self.selected_meal_category),
            final_price: self.final_price,
            currency: self.currency,
            submitted_at: self.submitted_at,
        }
    }
}

/// Reply row keyed by the inquiry or submission it belongs to
#[derive(Debug, sqlx::FromRow)]
struct ReplyRow {
    parent_id: Uuid,
    subject: String,
    message: String,
    sent_at: DateTime<Utc>,
}

fn meal_from_column(value: Option<i16>) -> Option<MealCategoryId> {
    value
        .and_then(|v| u8::try_from(v).ok())
        .and_then(|v| MealCategoryId::try_from(v).ok())
}

fn meal_to_column(value: Option<MealCategoryId>) -> Option<i16> {
    value.map(|m| i16::from(u8::from(m)))
}

/// Group replies by parent, keeping their query order
fn group_replies(rows: Vec<ReplyRow>) -> HashMap<Uuid, Vec<InquiryReply>> {
    let mut grouped: HashMap<Uuid, Vec<InquiryReply>> = HashMap::new();
    for row in rows {
        grouped.entry(row.parent_id).or_default().push(InquiryReply {
            subject: row.subject,
            message: row.message,
            sent_at: row.sent_at,
        });
    }
    grouped
}

pub async fn create_inquiry(pool: &PgPool, record: &InquiryRecord) -> Result<()> {
    let selection = record.selection();
    sqlx::query(
        r#"
        INSERT INTO inquiries (
            id, name, email, phone_number, travel_date, traveller_count, message,
            tour_id, selected_nights_key, selected_option, selected_meal_category,
            final_price, currency, submitted_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(record.id())
    .bind(record.name())
    .bind(record.email())
    .bind(record.phone_number())
    .bind(record.travel_date())
    .bind(i64::from(record.traveller_count()))
    .bind(record.message())
    .bind(record.tour_id())
    .bind(selection.nights_key)
    .bind(selection.option_label)
    .bind(meal_to_column(selection.meal_category))
    .bind(record.final_price())
    .bind(record.currency())
    .bind(record.submitted_at())
    .execute(pool)
    .await?;

    Ok(())
}

/// All inquiries with their replies, newest first
pub async fn list_inquiries(pool: &PgPool) -> Result<Vec<InquiryRecord>> {
    let rows = sqlx::query_as::<_, InquiryRow>(
        r#"
        SELECT
            id, name, email, phone_number, travel_date, traveller_count, message,
            tour_id, selected_nights_key, selected_option, selected_meal_category,
            final_price, currency, submitted_at
        FROM inquiries
        ORDER BY submitted_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let replies = sqlx::query_as::<_, ReplyRow>(
        r#"
        SELECT inquiry_id AS parent_id, subject, message, sent_at
        FROM inquiry_replies
        WHERE inquiry_id = ANY($1)
        ORDER BY sent_at, id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut replies = group_replies(replies);
    Ok(rows
        .into_iter()
        .map(|row| {
            let thread = replies.remove(&row.id).unwrap_or_default();
            InquiryRecord::from_parts(row.into_parts(), thread)
        })
        .collect())
}

pub async fn delete_inquiry(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Append a reply to an inquiry
pub async fn attach_reply(pool: &PgPool, inquiry_id: Uuid, reply: &InquiryReply) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO inquiry_replies (inquiry_id, subject, message, sent_at)
        SELECT id, $2, $3, $4
        FROM inquiries
        WHERE id = $1
        "#,
    )
    .bind(inquiry_id)
    .bind(&reply.subject)
    .bind(&reply.message)
    .bind(reply.sent_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    email: String,
    message: String,
    submitted_at: DateTime<Utc>,
}

pub async fn create_contact(pool: &PgPool, submission: &ContactSubmission) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO contact_submissions (id, name, email, message, submitted_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(submission.id)
    .bind(&submission.name)
    .bind(&submission.email)
    .bind(&submission.message)
    .bind(submission.submitted_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// All contact submissions with their replies, newest first
pub async fn list_contacts(pool: &PgPool) -> Result<Vec<ContactSubmission>> {
    let rows = sqlx::query_as::<_, ContactRow>(
        r#"
        SELECT id, name, email, message, submitted_at
        FROM contact_submissions
        ORDER BY submitted_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let replies = sqlx::query_as::<_, ReplyRow>(
        r#"
        SELECT submission_id AS parent_id, subject, message, sent_at
        FROM contact_replies
        WHERE submission_id = ANY($1)
        ORDER BY sent_at, id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut replies = group_replies(replies);
    Ok(rows
        .into_iter()
        .map(|row| ContactSubmission {
            replies: replies.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            email: row.email,
            message: row.message,
            submitted_at: row.submitted_at,
        })
        .collect())
}

pub async fn delete_contact(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Append a reply to a contact submission
pub async fn attach_contact_reply(pool: &PgPool, submission_id: Uuid, reply: &InquiryReply) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO contact_replies (submission_id, subject, message, sent_at)
        SELECT id, $2, $3, $4
        FROM contact_submissions
        WHERE id = $1
        "#,
    )
    .bind(submission_id)
    .bind(&reply.subject)
    .bind(&reply.message)
    .bind(reply.sent_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Store a new user. A taken email is reported on the `email` field.
pub async fn create_user(pool: &PgPool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await
    .map_err(duplicate_email)?;

    Ok(())
}

fn duplicate_email(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ValidationError::single("email", "An account with this email already exists.")
                .into();
        }
    }
    AppError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_column_mapping() {
        assert_eq!(meal_to_column(Some(MealCategoryId::AllInclusive)), Some(2));
        assert_eq!(meal_from_column(Some(1)), Some(MealCategoryId::FullBoard));
        assert_eq!(meal_from_column(Some(7)), None);
        assert_eq!(meal_from_column(Some(-1)), None);
        assert_eq!(meal_from_column(None), None);
    }

    #[test]
    fn test_group_replies_keeps_order_per_parent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let at = Utc::now();
        let row = |parent_id, message: &str| ReplyRow {
            parent_id,
            subject: "Re".to_string(),
            message: message.to_string(),
            sent_at: at,
        };

        let grouped = group_replies(vec![row(a, "first"), row(b, "other"), row(a, "second")]);
        let thread: Vec<&str> = grouped[&a].iter().map(|r| r.message.as_str()).collect();
        assert_eq!(thread, vec!["first", "second"]);
        assert_eq!(grouped[&b].len(), 1);
    }

    #[test]
    fn test_non_unique_errors_stay_database_errors() {
        assert!(matches!(
            duplicate_email(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }
}
