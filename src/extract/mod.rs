pub mod aws;

pub use aws::AwsExtractor;
