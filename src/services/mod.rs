pub mod amadeus;
pub mod cache;
pub mod normalize;
pub mod validation;

pub use amadeus::{AmadeusClient, OfferSource};
pub use cache::TtlCache;
pub use normalize::normalize;
pub use validation::is_all_caps;

#[cfg(test)]
mod tests;
