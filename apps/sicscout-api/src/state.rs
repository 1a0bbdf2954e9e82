use std::sync::Arc;

use sicscout_config::Config;
use sicscout_service::SearchService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SearchService>,
}
impl AppState {
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let service = SearchService::new(config)?;

		Ok(Self { service: Arc::new(service) })
	}

	pub fn from_service(service: SearchService) -> Self {
		Self { service: Arc::new(service) }
	}
}
