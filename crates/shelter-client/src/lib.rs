pub mod client;
pub mod error;

pub use client::ShelterApiClient;
pub use error::ClientError;
