pub mod eligibility;
pub mod estimation;
pub mod lifecycle;
pub mod requests;
