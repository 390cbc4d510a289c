//! Application services for identity binding.

mod binding;

pub use binding::{
    IdentityBindingError, IdentityBindingResult, IdentityBindingService, SignInOutcome,
    SubmitReviewRequest,
};
