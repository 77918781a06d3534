//! Adapters implementing application ports.

mod reqwest_client;
mod system_clock;

pub use reqwest_client::{MAX_RESPONSE_BODY_BYTES, ReqwestHttpClient};
pub use system_clock::SystemClock;
