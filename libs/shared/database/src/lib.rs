pub mod firebase;
pub mod rest;

pub use firebase::FirebaseClient;
pub use rest::RestClient;
