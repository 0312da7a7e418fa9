use serde::Serialize;
use tracing::debug;

use crate::error::NotFound;
use crate::listing::DetailedListings;
use crate::parser::Candidate;

/// A recommendation whose listing was found in the detailed dataset.
///
/// Fields are private so the only way to obtain one is [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedRecommendation {
    identifier: u64,
    explanation: String,
    url: String,
    image: String,
}

impl ValidatedRecommendation {
    pub fn identifier(&self) -> u64 {
        self.identifier
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}

/// Match a candidate against the detailed listings and attach the listing's
/// canonical url and picture.
pub fn validate(
    candidate: Candidate,
    listings: &DetailedListings,
) -> Result<ValidatedRecommendation, NotFound> {
    let record = listings
        .find(candidate.identifier)
        .ok_or(NotFound(candidate.identifier))?;

    debug!(listing_id = record.id, url = %record.listing_url, "Candidate matched listing");

    Ok(ValidatedRecommendation {
        identifier: record.id,
        explanation: candidate.explanation,
        url: record.listing_url.clone(),
        image: record.picture_url.clone(),
    })
}
