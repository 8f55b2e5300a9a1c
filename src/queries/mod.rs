pub mod cart;
pub mod ingredient;
pub mod recipe;
pub mod user;

/// Seconds since the Unix epoch, used for every stored timestamp
pub fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
