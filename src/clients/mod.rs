pub mod annotation_client;
pub mod transport;

pub use annotation_client::AnnotationClient;
pub use transport::{ChatTransport, HttpTransport};
