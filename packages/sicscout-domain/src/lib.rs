pub mod company;
pub mod filters;
pub mod scoring;
pub mod sic;
pub mod strategy;

pub use company::{
	Address, ChainLikelihood, Classification, CompanyRecord, CompanyStatus, ControllerSummary,
	Enrichment, FlatRecord, OfficerSummary, ShopType,
};
pub use strategy::Strategy;
