pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod recommend;
pub mod taxonomy;

pub use catalog::{Catalog, CatalogError};
pub use domain::interaction::{
    CellValue, ConsultationRequest, ConsultationStatus, ContactDetails, LogSheet, SheetRecord,
    UserAction, TIMESTAMP_FORMAT,
};
pub use domain::product::Product;
pub use domain::tag::{SelectedTags, TagCategory, TagGroups, TAG_MARKER};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{
    MatchScore, Recommendation, RecommendationEngine, ScoreCalculator, ScoredProduct,
    ScoringWeights,
};
pub use taxonomy::{Interest, InterestProfile};
