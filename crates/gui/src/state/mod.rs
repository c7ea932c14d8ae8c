pub mod document;
pub mod session;
pub mod settings;

pub use document::{Color, DocObject, Document, Geometry, Layer, ObjectAttributes, DOCUMENT_EXTENSION};
pub use session::{parameter_trees, EvaluationJob, Session};
pub use settings::ComputeSettings;
