//! Remote transport implementations
//!
//! - `HttpTransport` - Blocking REST client for the CMS API
//! - `MockTransport` - Recording in-memory double for tests

mod http;
mod mock;

pub(crate) use http::encode_segment;
pub use http::HttpTransport;
pub use mock::{MockTransport, TransportCall};
