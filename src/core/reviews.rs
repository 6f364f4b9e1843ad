use crate::core::access::require_tenant;
use crate::domain::model::{Actor, Review, ReviewId, UnitId};
use crate::utils::error::{RentalError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub total: usize,
    pub average: f64,
    /// Always holds every rating from 1 to 5, zero counts included.
    pub distribution: BTreeMap<u8, usize>,
}

impl RatingStats {
    /// Average rounded to two decimals, the precision kept on unit records.
    pub fn rounded_average(&self) -> f64 {
        (self.average * 100.0).round() / 100.0
    }

    /// Percentage of reviews carrying `rating`; 0 when there are none.
    pub fn share(&self, rating: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = self.distribution.get(&rating).copied().unwrap_or(0);
        count as f64 / self.total as f64 * 100.0
    }
}

pub fn rating_stats(reviews: &[Review]) -> RatingStats {
    let mut distribution: BTreeMap<u8, usize> =
        (MIN_RATING..=MAX_RATING).map(|rating| (rating, 0)).collect();
    let mut sum: u64 = 0;
    let mut total = 0usize;

    for review in reviews {
        let Some(count) = distribution.get_mut(&review.rating) else {
            tracing::warn!(
                "⚠️ Review {} has out-of-range rating {}, left out of the summary",
                review.id,
                review.rating
            );
            continue;
        };
        *count += 1;
        sum += u64::from(review.rating);
        total += 1;
    }

    let average = if total == 0 {
        0.0
    } else {
        sum as f64 / total as f64
    };

    RatingStats {
        total,
        average,
        distribution,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl FromStr for ReviewSort {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(ReviewSort::Newest),
            "oldest" => Ok(ReviewSort::Oldest),
            "highest" => Ok(ReviewSort::Highest),
            "lowest" => Ok(ReviewSort::Lowest),
            other => Err(RentalError::validation(
                "sort",
                format!("unknown sort order '{}'", other),
            )),
        }
    }
}

/// Parses the rating filter select box: `"all"` (or blank) means no filter.
pub fn parse_rating_filter(value: &str) -> Result<Option<u8>> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    let rating: u8 = v
        .parse()
        .map_err(|_| RentalError::validation("rating", format!("'{}' is not a rating", v)))?;
    validate_range("rating", rating, MIN_RATING, MAX_RATING)?;
    Ok(Some(rating))
}

/// Filters by exact rating, then sorts. All sorts are stable, so reviews with
/// equal keys keep their input order.
pub fn filter_and_sort(reviews: &[Review], rating: Option<u8>, sort: ReviewSort) -> Vec<&Review> {
    let mut view: Vec<&Review> = reviews
        .iter()
        .filter(|review| rating.is_none_or(|r| review.rating == r))
        .collect();

    match sort {
        ReviewSort::Newest => view.sort_by(|a, b| b.created_on.cmp(&a.created_on)),
        ReviewSort::Oldest => view.sort_by(|a, b| a.created_on.cmp(&b.created_on)),
        ReviewSort::Highest => view.sort_by(|a, b| b.rating.cmp(&a.rating)),
        ReviewSort::Lowest => view.sort_by(|a, b| a.rating.cmp(&b.rating)),
    }
    view
}

/// Adds one helpful vote. Not idempotent: every call counts.
pub fn record_helpful_vote(reviews: &mut [Review], review_id: ReviewId) -> Result<u32> {
    let review = reviews
        .iter_mut()
        .find(|review| review.id == review_id)
        .ok_or_else(|| RentalError::not_found("review", review_id))?;
    review.helpful = review.helpful.saturating_add(1);
    Ok(review.helpful)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub unit_id: UnitId,
    pub rating: u8,
    pub body: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

pub fn submit_review(
    id: ReviewId,
    author: Option<&Actor>,
    submission: ReviewSubmission,
    today: NaiveDate,
) -> Result<Review> {
    let author = require_tenant(author, "write a review")?;
    validate_range("rating", submission.rating, MIN_RATING, MAX_RATING)?;
    validate_non_empty_string("body", &submission.body)
        .map_err(|_| RentalError::validation("body", "review text required"))?;

    Ok(Review {
        id,
        unit_id: submission.unit_id,
        author_id: author.id,
        author_name: author.name.clone(),
        rating: submission.rating,
        body: submission.body.trim().to_string(),
        photos: submission.photos,
        helpful: 0,
        verified: false,
        created_on: today,
    })
}
