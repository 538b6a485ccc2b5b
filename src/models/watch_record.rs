use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use crate::error::AppError;

/// Star rating attached to a watch record, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's viewing of one movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecord {
    pub id: Uuid,
    /// Owning user; enforced by the store, never sent to clients
    #[serde(skip)]
    pub owner_id: Uuid,
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: String,
    pub rating: Rating,
    pub comments: Option<String>,
    pub watched_date: NaiveDate,
    #[serde(default)]
    pub genres: Vec<String>,
    /// TMDB movie id, for linking only
    pub external_id: Option<i64>,
}

impl WatchRecord {
    pub fn watched_in(&self, year: i32) -> bool {
        self.watched_date.year() == year
    }
}

/// Payload for logging a newly watched movie
///
/// `rating` is taken as a raw number because the entry form uses 0 for
/// "not rated yet"; [`NewWatchRecord::into_record`] rejects it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchRecord {
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub rating: u8,
    #[serde(default)]
    pub comments: Option<String>,
    pub watched_date: NaiveDate,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub external_id: Option<i64>,
}

impl NewWatchRecord {
    /// Validates the payload and assigns a fresh identifier owned by `owner_id`
    pub fn into_record(self, owner_id: Uuid) -> Result<WatchRecord, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
        }

        let rating = Rating::try_from(self.rating)?;

        let mut genres: Vec<String> = Vec::with_capacity(self.genres.len());
        for genre in self.genres {
            let genre = genre.trim().to_string();
            if !genre.is_empty() && !genres.contains(&genre) {
                genres.push(genre);
            }
        }

        let comments = self
            .comments
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(WatchRecord {
            id: Uuid::new_v4(),
            owner_id,
            title,
            poster_path: self.poster_path.filter(|p| !p.is_empty()),
            overview: self.overview,
            rating,
            comments,
            watched_date: self.watched_date,
            genres,
            external_id: self.external_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(title: &str, rating: u8) -> NewWatchRecord {
        NewWatchRecord {
            title: title.to_string(),
            poster_path: None,
            overview: "A thief who steals corporate secrets".to_string(),
            rating,
            comments: None,
            watched_date: NaiveDate::from_ymd_opt(2024, 7, 16).unwrap(),
            genres: vec![],
            external_id: Some(27205),
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(6).is_err());
        for value in 1..=5 {
            assert_eq!(Rating::try_from(value).unwrap().value(), value);
        }
    }

    #[test]
    fn test_rating_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().value(), 4);
    }

    #[test]
    fn test_into_record_assigns_owner_and_id() {
        let owner = Uuid::new_v4();
        let record = new_record("Inception", 5).into_record(owner).unwrap();
        assert_eq!(record.owner_id, owner);
        assert_eq!(record.title, "Inception");
        assert_eq!(record.rating.value(), 5);
        assert!(!record.id.is_nil());
    }

    #[test]
    fn test_into_record_rejects_unrated() {
        let result = new_record("Inception", 0).into_record(Uuid::new_v4());
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_into_record_rejects_blank_title() {
        let result = new_record("   ", 3).into_record(Uuid::new_v4());
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_into_record_dedupes_genres_and_drops_blank_comments() {
        let mut input = new_record("Heat", 4);
        input.genres = vec![
            "Crime".to_string(),
            " Crime ".to_string(),
            "".to_string(),
            "Drama".to_string(),
        ];
        input.comments = Some("   ".to_string());

        let record = input.into_record(Uuid::new_v4()).unwrap();
        assert_eq!(record.genres, vec!["Crime", "Drama"]);
        assert_eq!(record.comments, None);
    }

    #[test]
    fn test_json_uses_camel_case_and_hides_owner() {
        let record = new_record("Inception", 5)
            .into_record(Uuid::new_v4())
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["watchedDate"], "2024-07-16");
        assert_eq!(json["externalId"], 27205);
        assert!(json.get("ownerId").is_none());
        assert!(json.get("owner_id").is_none());
    }

    #[test]
    fn test_new_record_from_form_json() {
        let input: NewWatchRecord = serde_json::from_str(
            r#"{"title":"Up","rating":4,"watchedDate":"2024-02-29","genres":["Animation"]}"#,
        )
        .unwrap();
        assert_eq!(input.overview, "");
        assert_eq!(input.watched_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
