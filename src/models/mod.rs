pub mod pricing;
pub mod request;
pub mod vehicle;
