use chrono::{DateTime, Local};

use crate::error::FetchError;
use crate::filters::{self, SiteFilter};
use crate::models::{CateringEntry, MaintenanceTicket, Room, StatsSnapshot, TransportEntry};
use crate::stats;

/// Read access to the four record collections.
#[allow(async_fn_in_trait)]
pub trait FacilityStore {
    async fn fetch_rooms(&self, filter: &SiteFilter) -> Result<Vec<Room>, FetchError>;
    async fn fetch_maintenance(
        &self,
        filter: &SiteFilter,
    ) -> Result<Vec<MaintenanceTicket>, FetchError>;
    async fn fetch_transport(&self, filter: &SiteFilter)
        -> Result<Vec<TransportEntry>, FetchError>;
    async fn fetch_catering(&self, filter: &SiteFilter) -> Result<Vec<CateringEntry>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct DashboardData {
    pub rooms: Vec<Room>,
    pub maintenance: Vec<MaintenanceTicket>,
    pub transport: Vec<TransportEntry>,
    pub catering: Vec<CateringEntry>,
}

impl DashboardData {
    /// In-memory narrowing of already loaded data to one site.
    pub fn restricted_to(&self, filter: &SiteFilter) -> DashboardData {
        DashboardData {
            rooms: filters::by_site(&self.rooms, filter),
            maintenance: filters::by_site(&self.maintenance, filter),
            transport: filters::by_site(&self.transport, filter),
            catering: filters::by_site(&self.catering, filter),
        }
    }

    pub fn stats_at(&self, now: DateTime<Local>) -> StatsSnapshot {
        stats::compute_stats_at(
            &self.rooms,
            &self.maintenance,
            &self.transport,
            &self.catering,
            now,
        )
    }
}

/// Fetches all four collections concurrently. The first failure aborts the load.
pub async fn load_all<S: FacilityStore>(
    store: &S,
    filter: &SiteFilter,
) -> Result<DashboardData, FetchError> {
    let (rooms, maintenance, transport, catering) = tokio::try_join!(
        store.fetch_rooms(filter),
        store.fetch_maintenance(filter),
        store.fetch_transport(filter),
        store.fetch_catering(filter),
    )
    .inspect_err(|err| tracing::error!(domain = %err.domain(), %err, "dashboard load aborted"))?;

    tracing::info!(
        site = filter.label(),
        rooms = rooms.len(),
        maintenance = maintenance.len(),
        transport = transport.len(),
        catering = catering.len(),
        "dashboard data loaded"
    );

    Ok(DashboardData {
        rooms,
        maintenance,
        transport,
        catering,
    })
}

pub async fn load_snapshot<S: FacilityStore>(
    store: &S,
    filter: &SiteFilter,
) -> Result<StatsSnapshot, FetchError> {
    let data = load_all(store, filter).await?;
    Ok(stats::compute_stats(
        &data.rooms,
        &data.maintenance,
        &data.transport,
        &data.catering,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Domain;
    use chrono::Utc;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryStore {
        rooms: Vec<Room>,
        failing: Option<Domain>,
    }

    impl MemoryStore {
        fn check(&self, domain: Domain) -> Result<(), FetchError> {
            if self.failing == Some(domain) {
                return Err(FetchError::store(domain, sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    impl FacilityStore for MemoryStore {
        async fn fetch_rooms(&self, filter: &SiteFilter) -> Result<Vec<Room>, FetchError> {
            self.check(Domain::Rooms)?;
            Ok(filters::by_site(&self.rooms, filter))
        }

        async fn fetch_maintenance(
            &self,
            _filter: &SiteFilter,
        ) -> Result<Vec<MaintenanceTicket>, FetchError> {
            self.check(Domain::Maintenance)?;
            Ok(Vec::new())
        }

        async fn fetch_transport(
            &self,
            _filter: &SiteFilter,
        ) -> Result<Vec<TransportEntry>, FetchError> {
            self.check(Domain::Transport)?;
            Ok(Vec::new())
        }

        async fn fetch_catering(
            &self,
            _filter: &SiteFilter,
        ) -> Result<Vec<CateringEntry>, FetchError> {
            self.check(Domain::Catering)?;
            Ok(Vec::new())
        }
    }

    fn room(site: &str, occupant: Option<&str>) -> Room {
        Room {
            id: Uuid::new_v4(),
            site: site.to_string(),
            building_name: "The Diamond".to_string(),
            room_type: "Bachelor S".to_string(),
            room_number: "DM0101".to_string(),
            occupant: occupant.map(str::to_string),
            check_in_date: None,
            check_out_date: None,
            status: "Occupied".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn snapshot_reflects_every_collection() {
        let store = MemoryStore {
            rooms: vec![
                room("Kempton Park | CJ", Some("Mabel Mulaudzi")),
                room("Pretoria CBD", None),
            ],
            failing: None,
        };

        let snapshot = load_snapshot(&store, &SiteFilter::All).await.unwrap();
        assert_eq!(snapshot.rooms.total, 2);
        assert_eq!(snapshot.rooms.occupied, 1);
        assert_eq!(snapshot.maintenance.total, 0);
    }

    #[tokio::test]
    async fn site_filter_reaches_the_store() {
        let store = MemoryStore {
            rooms: vec![
                room("Kempton Park | CJ", Some("Mabel Mulaudzi")),
                room("Pretoria CBD", None),
            ],
            failing: None,
        };

        let filter = SiteFilter::from_arg(Some("Pretoria CBD"));
        let snapshot = load_snapshot(&store, &filter).await.unwrap();
        assert_eq!(snapshot.rooms.total, 1);
        assert_eq!(snapshot.rooms.available, 1);
    }

    #[tokio::test]
    async fn one_failed_fetch_fails_the_load() {
        let store = MemoryStore {
            rooms: vec![room("Capital Park", Some("Zingisa Mabe"))],
            failing: Some(Domain::Catering),
        };

        let err = load_snapshot(&store, &SiteFilter::All).await.unwrap_err();
        assert_eq!(err.domain(), Domain::Catering);
        assert!(err.to_string().contains("catering"));
    }

    #[tokio::test]
    async fn loaded_data_narrows_in_memory() {
        let store = MemoryStore {
            rooms: vec![
                room("Kempton Park | CJ", Some("Mabel Mulaudzi")),
                room("Pretoria CBD", None),
                room("Pretoria CBD", Some("Henrie Schalk")),
            ],
            failing: None,
        };

        let data = load_all(&store, &SiteFilter::All).await.unwrap();
        let cbd = data.restricted_to(&SiteFilter::from_arg(Some("Pretoria CBD")));
        assert_eq!(cbd.rooms.len(), 2);
        assert_eq!(cbd.stats_at(Local::now()).rooms.occupied, 1);
    }

    #[tokio::test]
    async fn empty_store_gives_zeroed_snapshot() {
        let store = MemoryStore::default();
        let snapshot = load_snapshot(&store, &SiteFilter::All).await.unwrap();
        assert_eq!(snapshot, StatsSnapshot::default());
    }
}
