//! Query controller and HTTP client for the photo gallery.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod transport;

pub use config::{load_settings, Settings};
pub use controller::{ControllerEvent, ControllerOptions, QueryController, QueryState};
pub use error::FetchError;
pub use transport::{HttpPhotoApi, PhotoApi};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
