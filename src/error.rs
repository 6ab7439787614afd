use thiserror::Error;

use crate::models::Domain;

/// A read against the data store failed. Aborts the whole dashboard load.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {domain} records: {source}")]
    Store {
        domain: Domain,
        #[source]
        source: sqlx::Error,
    },
}

impl FetchError {
    pub fn store(domain: Domain, source: sqlx::Error) -> Self {
        FetchError::Store { domain, source }
    }

    pub fn domain(&self) -> Domain {
        match self {
            FetchError::Store { domain, .. } => *domain,
        }
    }
}
