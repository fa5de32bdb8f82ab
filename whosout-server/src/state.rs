use std::sync::Arc;

use whosout_core::{AbsenceProjector, CalendarCache, FeedConfig, HttpFetcher, IcsParser};

pub type Projector = AbsenceProjector<HttpFetcher, IcsParser>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub projector: Arc<Projector>,
    pub workdays: usize,
}

impl AppState {
    pub fn new(config: &FeedConfig) -> anyhow::Result<Self> {
        let cache = CalendarCache::new(
            config.calendar_url.clone(),
            config.refresh_interval()?,
            HttpFetcher::default(),
        );

        Ok(AppState {
            projector: Arc::new(AbsenceProjector::new(Arc::new(cache), IcsParser)),
            workdays: config.workdays,
        })
    }
}
