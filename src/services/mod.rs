pub mod auth;
pub mod booking;
pub mod catalog;
pub mod reviews;

pub use auth::{AuthError, AuthService, AuthUser};
pub use booking::{BookingDraft, BookingError, BookingService, BookingSubmission, SubmissionState};
pub use catalog::{CatalogError, CatalogService};
pub use reviews::{ReviewError, ReviewService};
