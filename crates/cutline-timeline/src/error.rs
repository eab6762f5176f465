//! Validation errors raised by edit operations.

use thiserror::Error;

use crate::element::ElementId;

/// An edit that would violate a timeline invariant.
///
/// Every variant is a non-fatal, user-visible notice: the attempted
/// operation is rolled back and the model is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// The operation needs a selected element and none is active.
    #[error("No element is selected")]
    NoSelection,

    /// The target element does not exist.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Split point outside the open interval of the element.
    #[error("Split point {split:.3}s is outside the element ({start:.3}s..{end:.3}s)")]
    SplitOutOfBounds { split: f64, start: f64, end: f64 },

    /// Resize or split would produce an element shorter than allowed.
    #[error("Duration {duration:.3}s is below the minimum of {min:.3}s")]
    BelowMinDuration { duration: f64, min: f64 },

    /// A media element whose source out point is not after its in point.
    #[error("Element {0} has an empty source range")]
    EmptySourceRange(ElementId),

    /// A NaN or infinite time was supplied.
    #[error("Time value is not finite: {0}")]
    NonFiniteTime(f64),
}

/// Result type alias for edit operations.
pub type EditResult<T> = std::result::Result<T, EditError>;
