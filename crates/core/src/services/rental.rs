//! Rental service client.
//!
//! Reports are anchored to a rental transaction. The rental service is an
//! external collaborator; this module specifies it at its interface and
//! provides an HTTP implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentmate_common::{AppError, AppResult};
use serde::Deserialize;

/// A rental transaction as seen by the moderation service.
#[derive(Debug, Clone, Deserialize)]
pub struct Rental {
    pub id: String,
    /// The user who owns the rented item.
    pub owner_id: String,
    /// The user renting the item.
    pub renter_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Rental {
    /// Whether the rental period has ended.
    #[must_use]
    pub fn is_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }
}

/// Trait for looking up rental transactions.
#[async_trait]
pub trait RentalClient: Send + Sync {
    /// Fetch a rental by ID. `None` when the rental does not exist.
    async fn get_rental(&self, id: &str) -> AppResult<Option<Rental>>;
}

/// HTTP client against the rental service.
#[derive(Clone)]
pub struct HttpRentalClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRentalClient {
    /// Create a new client for the rental service at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RentalClient for HttpRentalClient {
    async fn get_rental(&self, id: &str) -> AppResult<Option<Rental>> {
        let url = format!("{}/rentals/{id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Rental service: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Rental service returned {}",
                response.status()
            )));
        }

        let rental = response
            .json::<Rental>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Rental service: {e}")))?;

        Ok(Some(rental))
    }
}
