pub mod loader;

pub use loader::{load_bytes, load_requirements, LoaderError, RequirementFormat};
