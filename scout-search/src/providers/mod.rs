//! Concrete search providers.

mod academic;
mod arxiv;
mod google;
mod semantic_scholar;

pub use academic::AcademicSearchProvider;
pub use arxiv::ArxivProvider;
pub use google::GoogleSearchProvider;
pub use semantic_scholar::SemanticScholarProvider;
