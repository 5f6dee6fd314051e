use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Cinema {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub city: String,
    pub address: String,
    pub total_seats: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCinema {
    pub name: String,
    pub location: String,
    pub city: String,
    pub address: String,
    pub total_seats: i32,
    pub image_url: String,
}

/// Case-insensitive substring filters for the cinema listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CinemaFilter {
    pub city: Option<String>,
    pub name: Option<String>,
}

impl CinemaFilter {
    pub fn matches(&self, cinema: &Cinema) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref().map(str::trim) {
                Some(n) if !n.is_empty() => haystack.to_lowercase().contains(&n.to_lowercase()),
                _ => true,
            }
        }
        contains(&cinema.city, &self.city) && contains(&cinema.name, &self.name)
    }

    /// `ILIKE` pattern for a filter value, `None` when the filter is unset or blank.
    pub(crate) fn pattern(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| format!("%{}%", v.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
    }
}
