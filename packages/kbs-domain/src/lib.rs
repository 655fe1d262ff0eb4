pub mod business;
pub mod escape;
pub mod expiry;
pub mod facet;
pub mod query;
pub mod snippet;
pub mod weights;
