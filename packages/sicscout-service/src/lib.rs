pub mod classify;
pub mod enrich;
pub mod export;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use search::{SearchPlan, SearchRequest, SearchResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use sicscout_config::{ClassifierConfig, Config};
use sicscout_domain::{Classification, FlatRecord};
use sicscout_providers::{RegistryClient, classifier};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Labels a batch of flat records. One classification per input row, in input order.
pub trait Classifier
where
	Self: Send + Sync,
{
	fn classify<'a>(
		&'a self,
		cfg: &'a ClassifierConfig,
		rows: &'a [FlatRecord],
		channel_rules: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Classification>>>;
}

pub struct SearchService {
	pub cfg: Config,
	pub registry: RegistryClient,
	pub classifier: Arc<dyn Classifier>,
}
impl SearchService {
	pub fn new(cfg: Config) -> Result<Self> {
		Self::with_classifier(cfg, Arc::new(ChatClassifier))
	}

	pub fn with_classifier(cfg: Config, classifier: Arc<dyn Classifier>) -> Result<Self> {
		let registry = RegistryClient::new(&cfg.registry)?;

		Ok(Self { cfg, registry, classifier })
	}
}

struct ChatClassifier;
impl Classifier for ChatClassifier {
	fn classify<'a>(
		&'a self,
		cfg: &'a ClassifierConfig,
		rows: &'a [FlatRecord],
		channel_rules: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Classification>>> {
		Box::pin(async move { Ok(classifier::classify(cfg, rows, channel_rules).await?) })
	}
}
