use crate::company::ChainLikelihood;

/// Owner-name fragments that point at a corporate owner rather than a person.
pub const CORPORATE_KEYWORDS: [&str; 13] = [
	"ltd",
	"limited",
	"plc",
	"group",
	"holdings",
	"llp",
	"inc",
	"corporation",
	"corp",
	"partners",
	"capital",
	"investments",
	"enterprises",
];

/// Target-vertical vocabulary used for relevance ranking and the required-keyword filter.
pub const RELEVANCE_KEYWORDS: [&str; 12] = [
	"truck",
	"commercial",
	"hgv",
	"fleet",
	"lorry",
	"van",
	"trailer",
	"bus",
	"coach",
	"heavy",
	"plant",
	"industrial",
];

/// `controller_names` is the `"; "`-joined list of persons with significant control.
pub fn chain_likelihood(controller_names: &str) -> ChainLikelihood {
	if controller_names.trim().is_empty() {
		return ChainLikelihood::Unknown;
	}

	let corporate = controller_names.split(';').any(|name| {
		let name = name.trim().to_lowercase();

		CORPORATE_KEYWORDS.iter().any(|keyword| name.contains(keyword))
	});

	if corporate { ChainLikelihood::Yes } else { ChainLikelihood::No }
}

pub fn relevance_score(name: &str) -> u32 {
	let name = name.to_lowercase();

	RELEVANCE_KEYWORDS.iter().filter(|keyword| name.contains(*keyword)).count() as u32
}

pub fn mentions_relevance_keyword(name: &str) -> bool {
	relevance_score(name) > 0
}
