//! Sign-in / sign-up form state.
//!
//! The form moves between `Idle` and `Submitting`; a submit only reaches the
//! gateway after local validation passes. Gateway failures arrive as tagged
//! [`GatewayError`]s and are turned into a user-facing [`Notice`].

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::auth::gateway::{AuthGateway, GatewayError, Session};
use crate::auth::session::SessionState;
use crate::model::global_error::ValidationFieldError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_FULL_NAME_LEN: usize = 2;

const EMAIL_MESSAGE: &str = "Please enter a valid email address";
const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
const FULL_NAME_MESSAGE: &str = "Full name must be at least 2 characters";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthField {
    Email,
    Password,
    FullName,
}

impl AuthField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthField::Email => "email",
            AuthField::Password => "password",
            AuthField::FullName => "fullName",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFormData {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl AuthFormData {
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.password.is_empty() && self.full_name.is_empty()
    }
}

pub type FieldErrors = BTreeMap<AuthField, &'static str>;

/// Local checks run before anything is sent to the gateway. The full name is
/// only checked when signing up.
pub fn validate_credentials(mode: AuthMode, data: &AuthFormData) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !is_valid_email(&data.email) {
        errors.insert(AuthField::Email, EMAIL_MESSAGE);
    }
    if data.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(AuthField::Password, PASSWORD_MESSAGE);
    }
    if mode == AuthMode::SignUp && data.full_name.chars().count() < MIN_FULL_NAME_LEN {
        errors.insert(AuthField::FullName, FULL_NAME_MESSAGE);
    }

    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Transient notification shown after a submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notice {
    pub title: &'static str,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    fn success(mode: AuthMode) -> Self {
        let (title, description) = match mode {
            AuthMode::SignUp => (
                "Welcome to Civic Connect!",
                "Your account has been created successfully.",
            ),
            AuthMode::SignIn => ("Welcome back!", "You have been signed in successfully."),
        };
        Notice {
            title,
            description: description.to_string(),
            variant: NoticeVariant::Default,
        }
    }

    fn failure(mode: AuthMode, error: &GatewayError) -> Self {
        let (title, description) = match error {
            GatewayError::DuplicateAccount => (
                "Account exists",
                "This email is already registered. Please sign in instead.".to_string(),
            ),
            GatewayError::InvalidCredentials => (
                "Sign in failed",
                "Invalid email or password. Please try again.".to_string(),
            ),
            GatewayError::Other(message) if message.trim().is_empty() => {
                ("Something went wrong", "Please try again later.".to_string())
            }
            GatewayError::Other(message) => match mode {
                AuthMode::SignUp => ("Sign up failed", message.clone()),
                AuthMode::SignIn => ("Sign in failed", message.clone()),
            },
        };
        Notice {
            title,
            description,
            variant: NoticeVariant::Destructive,
        }
    }
}

/// Credentials captured when a submit starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Local validation failed; see [`AuthForm::errors`].
    Invalid,
    /// A submit was already in flight.
    Ignored,
    SignedIn { session: Session, notice: Notice },
    Failed { error: GatewayError, notice: Notice },
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    phase: FormPhase,
    data: AuthFormData,
    errors: FieldErrors,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn data(&self) -> &AuthFormData {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: AuthField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn validation_errors(&self) -> Vec<ValidationFieldError> {
        self.errors
            .iter()
            .map(|(field, message)| ValidationFieldError::new(field.as_str(), message))
            .collect()
    }

    /// Editing a field clears that field's error.
    pub fn set_field(&mut self, field: AuthField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AuthField::Email => self.data.email = value,
            AuthField::Password => self.data.password = value,
            AuthField::FullName => self.data.full_name = value,
        }
        self.errors.remove(&field);
    }

    /// Switches between sign-in and sign-up, discarding values and errors.
    /// Returns false while a submit is in flight.
    pub fn toggle_mode(&mut self) -> bool {
        if self.phase == FormPhase::Submitting {
            return false;
        }
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.data = AuthFormData::default();
        self.errors.clear();
        true
    }

    pub fn validate(&mut self) -> bool {
        self.errors = validate_credentials(self.mode, &self.data);
        self.errors.is_empty()
    }

    /// Validates and, on success, enters `Submitting`.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SubmitOutcome> {
        if self.phase == FormPhase::Submitting {
            return Err(SubmitOutcome::Ignored);
        }
        if !self.validate() {
            return Err(SubmitOutcome::Invalid);
        }

        self.phase = FormPhase::Submitting;
        Ok(SubmitRequest {
            mode: self.mode,
            email: self.data.email.clone(),
            password: self.data.password.clone(),
            full_name: self.data.full_name.clone(),
        })
    }

    /// Returns to `Idle` with the gateway's answer.
    pub fn finish_submit(&mut self, result: Result<Session, GatewayError>) -> SubmitOutcome {
        self.phase = FormPhase::Idle;
        match result {
            Ok(session) => SubmitOutcome::SignedIn {
                session,
                notice: Notice::success(self.mode),
            },
            Err(error) => {
                let notice = Notice::failure(self.mode, &error);
                SubmitOutcome::Failed { error, notice }
            }
        }
    }

    pub async fn submit<G>(&mut self, gateway: &G) -> SubmitOutcome
    where
        G: AuthGateway + ?Sized,
    {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        let result = match request.mode {
            AuthMode::SignIn => gateway.sign_in(&request.email, &request.password).await,
            AuthMode::SignUp => {
                gateway
                    .sign_up(&request.email, &request.password, &request.full_name)
                    .await
            }
        };

        self.finish_submit(result)
    }

    /// Where to send the user once a session exists.
    pub fn redirect_target(session: &SessionState) -> Option<&'static str> {
        session.is_authenticated().then_some("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::gateway::SessionUser;
    use crate::entity::profile::{self, UserRole};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FakeGateway {
        result: Result<(), GatewayError>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeGateway {
        fn answering(result: Result<(), GatewayError>) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn session(email: &str) -> Session {
            let id = Uuid::new_v4();
            Session {
                access_token: "access".into(),
                refresh_token: "refresh".into(),
                user: SessionUser {
                    id,
                    email: email.to_string(),
                },
                profile: profile::Model {
                    id,
                    email: email.to_string(),
                    full_name: None,
                    role: UserRole::User,
                    department: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
            }
        }

        fn answer(&self, call: String, email: &str) -> Result<Session, GatewayError> {
            self.calls.lock().unwrap().push(call);
            self.result.clone().map(|_| Self::session(email))
        }
    }

    #[async_trait]
    impl AuthGateway for FakeGateway {
        async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, GatewayError> {
            self.answer(format!("sign_in:{email}"), email)
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            full_name: &str,
        ) -> Result<Session, GatewayError> {
            self.answer(format!("sign_up:{email}:{full_name}"), email)
        }

        async fn sign_out(&self, _user_id: Uuid) {}
    }

    fn data(email: &str, password: &str, full_name: &str) -> AuthFormData {
        AuthFormData {
            email: email.into(),
            password: password.into(),
            full_name: full_name.into(),
        }
    }

    fn fields(errors: &FieldErrors) -> Vec<AuthField> {
        errors.keys().copied().collect()
    }

    #[test]
    fn bad_email_fails_only_the_email_rule() {
        let errors = validate_credentials(AuthMode::SignIn, &data("bad", "123456", ""));
        assert_eq!(fields(&errors), vec![AuthField::Email]);
    }

    #[test]
    fn short_password_fails_only_the_password_rule() {
        let errors = validate_credentials(AuthMode::SignIn, &data("a@b.com", "12", ""));
        assert_eq!(fields(&errors), vec![AuthField::Password]);
        assert_eq!(errors[&AuthField::Password], PASSWORD_MESSAGE);
    }

    #[test]
    fn short_full_name_fails_only_on_sign_up() {
        let input = data("a@b.com", "123456", "A");
        let errors = validate_credentials(AuthMode::SignUp, &input);
        assert_eq!(fields(&errors), vec![AuthField::FullName]);

        assert!(validate_credentials(AuthMode::SignIn, &input).is_empty());
    }

    #[test]
    fn valid_sign_up_passes() {
        let errors = validate_credentials(AuthMode::SignUp, &data("a@b.com", "123456", "Al"));
        assert!(errors.is_empty());
    }

    #[test]
    fn email_format_edge_cases() {
        assert!(is_valid_email("first.last+tag@city.gov.in"));
        assert!(!is_valid_email(".lead@example.com"));
        assert!(!is_valid_email("a..b@example.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn toggling_mode_clears_values_and_errors() {
        let mut form = AuthForm::new(AuthMode::SignIn);
        form.set_field(AuthField::Email, "bad");
        form.set_field(AuthField::Password, "12");
        assert!(!form.validate());
        assert!(!form.errors().is_empty());

        assert!(form.toggle_mode());
        assert_eq!(form.mode(), AuthMode::SignUp);
        assert!(form.data().is_empty());
        assert!(form.errors().is_empty());

        assert!(form.toggle_mode());
        assert_eq!(form.mode(), AuthMode::SignIn);
    }

    #[test]
    fn editing_a_field_clears_only_its_error() {
        let mut form = AuthForm::new(AuthMode::SignUp);
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 3);

        form.set_field(AuthField::Email, "a@b.com");
        assert_eq!(form.error(AuthField::Email), None);
        assert_eq!(form.error(AuthField::Password), Some(PASSWORD_MESSAGE));
        assert_eq!(form.error(AuthField::FullName), Some(FULL_NAME_MESSAGE));
    }

    #[test]
    fn submitting_blocks_toggle_and_second_submit() {
        let mut form = AuthForm::new(AuthMode::SignIn);
        form.set_field(AuthField::Email, "a@b.com");
        form.set_field(AuthField::Password, "123456");

        let request = form.begin_submit().unwrap();
        assert_eq!(request.email, "a@b.com");
        assert_eq!(form.phase(), FormPhase::Submitting);
        assert!(!form.toggle_mode());
        assert!(matches!(form.begin_submit(), Err(SubmitOutcome::Ignored)));

        let outcome = form.finish_submit(Err(GatewayError::InvalidCredentials));
        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_gateway() {
        let gateway = FakeGateway::answering(Ok(()));
        let mut form = AuthForm::new(AuthMode::SignUp);
        form.set_field(AuthField::Email, "a@b.com");
        form.set_field(AuthField::Password, "123456");
        form.set_field(AuthField::FullName, "A");

        assert!(matches!(form.submit(&gateway).await, SubmitOutcome::Invalid));
        assert!(gateway.calls.lock().unwrap().is_empty());
        assert_eq!(form.phase(), FormPhase::Idle);
    }

    #[tokio::test]
    async fn successful_sign_up_calls_gateway_and_greets() {
        let gateway = FakeGateway::answering(Ok(()));
        let mut form = AuthForm::new(AuthMode::SignUp);
        form.set_field(AuthField::Email, "a@b.com");
        form.set_field(AuthField::Password, "123456");
        form.set_field(AuthField::FullName, "Asha");

        match form.submit(&gateway).await {
            SubmitOutcome::SignedIn { session, notice } => {
                assert_eq!(session.user.email, "a@b.com");
                assert_eq!(notice.title, "Welcome to Civic Connect!");
                assert_eq!(notice.variant, NoticeVariant::Default);
                assert_eq!(
                    AuthForm::redirect_target(&SessionState::from(&session)),
                    Some("/")
                );
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(*gateway.calls.lock().unwrap(), vec!["sign_up:a@b.com:Asha"]);
    }

    #[tokio::test]
    async fn gateway_errors_map_to_notices() {
        let cases = [
            (AuthMode::SignUp, GatewayError::DuplicateAccount, "Account exists"),
            (AuthMode::SignIn, GatewayError::InvalidCredentials, "Sign in failed"),
            (AuthMode::SignUp, GatewayError::Other("rate limited".into()), "Sign up failed"),
            (AuthMode::SignIn, GatewayError::Other(String::new()), "Something went wrong"),
        ];

        for (mode, error, title) in cases {
            let gateway = FakeGateway::answering(Err(error.clone()));
            let mut form = AuthForm::new(mode);
            form.set_field(AuthField::Email, "a@b.com");
            form.set_field(AuthField::Password, "123456");
            form.set_field(AuthField::FullName, "Asha");

            match form.submit(&gateway).await {
                SubmitOutcome::Failed { error: got, notice } => {
                    assert_eq!(got, error);
                    assert_eq!(notice.title, title);
                    assert_eq!(notice.variant, NoticeVariant::Destructive);
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }
    }

    #[test]
    fn no_redirect_without_session() {
        assert_eq!(AuthForm::redirect_target(&SessionState::signed_out()), None);
    }
}
