use sicscout_domain::{Classification, CompanyRecord, FlatRecord};

use crate::SearchService;

impl SearchService {
	/// One classification per row, in row order, whatever the classifier does.
	///
	/// Rows are sent in sub-batches of `classifier.batch_size`. A failed batch is labelled
	/// `Error` and the run carries on with the next one.
	pub async fn classifications(
		&self,
		rows: &[FlatRecord],
		channel_rules: Option<&str>,
	) -> Vec<Classification> {
		let Some(cfg) = self.cfg.classifier.as_ref() else {
			tracing::warn!(rows = rows.len(), "Classifier is not configured.");

			return vec![Classification::not_configured(); rows.len()];
		};
		let batch_size = cfg.batch_size.max(1);
		let batches = rows.len().div_ceil(batch_size);
		let mut out = Vec::with_capacity(rows.len());

		for (idx, batch) in rows.chunks(batch_size).enumerate() {
			tracing::info!(batch = idx + 1, batches, "Classifying batch.");

			match self.classifier.classify(cfg, batch, channel_rules).await {
				Ok(mut labels) => {
					if labels.len() != batch.len() {
						tracing::warn!(
							expected = batch.len(),
							received = labels.len(),
							"Classifier returned a mismatched batch."
						);
					}

					labels.resize(batch.len(), Classification::unknown());
					out.extend(labels);
				},
				Err(err) => {
					tracing::error!(error = %err, batch = idx + 1, "Classification batch failed.");

					out.extend(vec![Classification::error(); batch.len()]);
				},
			}
		}

		out
	}

	/// Appends `shop_type`, `channel` and `ai_confidence` to each row.
	pub async fn classify_rows(
		&self,
		mut rows: Vec<FlatRecord>,
		channel_rules: Option<&str>,
	) -> Vec<FlatRecord> {
		let labels = self.classifications(&rows, channel_rules).await;

		for (row, label) in rows.iter_mut().zip(labels.iter()) {
			label.write_into(row);
		}

		rows
	}

	pub async fn classify_companies(
		&self,
		records: &mut [CompanyRecord],
		channel_rules: Option<&str>,
	) {
		let rows = records.iter().map(CompanyRecord::to_row).collect::<Vec<_>>();
		let labels = self.classifications(&rows, channel_rules).await;

		for (record, label) in records.iter_mut().zip(labels) {
			record.classification = Some(label);
		}
	}
}
