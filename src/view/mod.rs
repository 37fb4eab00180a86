pub mod auth_form;
pub mod display;
pub mod navigation;

pub use auth_form::{AuthForm, AuthMode, SubmitOutcome};
pub use navigation::{Navigation, build_navigation};
