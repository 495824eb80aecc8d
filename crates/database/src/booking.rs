//! Booking operations.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::Booking;

/// Insert a booking. The range is half-open: entry inclusive, exit
/// exclusive.
pub async fn insert_booking(pool: &SqlitePool, booking: &Booking) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO bookings (property_id, entry_date, exit_date, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&booking.property_id)
    .bind(&booking.entry_date)
    .bind(&booking.exit_date)
    .bind(&booking.status)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// List bookings for a property, ordered by entry date.
pub async fn bookings_for_property(pool: &SqlitePool, property_id: &str) -> Result<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT id, property_id, entry_date, exit_date, status
        FROM bookings
        WHERE property_id = ?
        ORDER BY entry_date
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}
