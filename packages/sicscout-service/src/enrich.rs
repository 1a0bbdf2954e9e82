use sicscout_domain::{CompanyRecord, Enrichment};

use crate::SearchService;

impl SearchService {
	/// Attaches directors and controllers to every record, one lookup pair at a time.
	///
	/// A failed lookup leaves zero-valued data for that half of the record. Records without a
	/// company number get the empty default without any call.
	pub async fn enrich(&self, records: &mut [CompanyRecord]) {
		let total = records.len();

		for (idx, record) in records.iter_mut().enumerate() {
			if !record.has_identifier() {
				record.enrichment = Some(Enrichment::default());

				continue;
			}

			let number = record.company_number.clone();
			let officers = match self.registry.officers(&number).await {
				Ok(officers) => officers,
				Err(err) => {
					tracing::warn!(error = %err, company_number = %number, "Officer lookup failed.");

					Default::default()
				},
			};

			self.registry.pause().await;

			let controllers = match self.registry.controllers(&number).await {
				Ok(controllers) => controllers,
				Err(err) => {
					tracing::warn!(
						error = %err,
						company_number = %number,
						"Controller lookup failed."
					);

					Default::default()
				},
			};

			self.registry.pause().await;

			record.enrichment = Some(Enrichment { officers, controllers });

			if (idx + 1) % 50 == 0 || idx + 1 == total {
				tracing::info!(done = idx + 1, total, "Enrichment progress.");
			}
		}
	}
}
