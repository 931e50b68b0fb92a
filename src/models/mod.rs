pub mod annotation;
pub mod event;
pub mod loaders;
pub mod record;

pub use annotation::{AnnotationKind, FieldShape, FieldValue};
pub use event::{AnnotationEvent, CallStatus};
pub use loaders::load_rows;
pub use record::Record;
