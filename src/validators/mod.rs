pub mod aws;
pub mod sigv4;

pub use aws::AwsStsValidator;
pub use sigv4::{RequestSigner, SignedRequest};
