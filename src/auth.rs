use crate::api::client::NotesApi;
use crate::api::types::{LoginRequest, RegisterRequest};
use crate::errors::{NotesError, NotesResult};
use crate::session::Session;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> NotesResult<LoginRequest> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(NotesError::validation(FILL_ALL_FIELDS));
        }
        Ok(LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> NotesResult<RegisterRequest> {
        if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(NotesError::validation(FILL_ALL_FIELDS));
        }
        Ok(RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// Server rejections become `Auth` with the server's text or `fallback`.
/// Transport failures pass through unchanged.
fn rejection(err: NotesError, fallback: &str) -> NotesError {
    match err {
        NotesError::Api { message, .. } => NotesError::Auth(message.unwrap_or_else(|| fallback.to_string())),
        NotesError::Unauthenticated => NotesError::Auth(fallback.to_string()),
        other => other,
    }
}

/// Submits the login form and stores the returned token in the session.
pub async fn login(api: &dyn NotesApi, session: &Session, form: &LoginForm) -> NotesResult<()> {
    let request = form.validate()?;
    let response = api
        .login(&request)
        .await
        .map_err(|e| rejection(e, LOGIN_FAILED))?;

    let token = response
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| NotesError::Auth(LOGIN_FAILED.to_string()))?;
    session.store_token(&token)?;
    tracing::info!(email = %form.email, "logged in");
    Ok(())
}

/// Submits the registration form. Success is judged by status only; no token is issued.
pub async fn register(api: &dyn NotesApi, form: &RegisterForm) -> NotesResult<()> {
    let request = form.validate()?;
    api.register(&request)
        .await
        .map_err(|e| rejection(e, REGISTRATION_FAILED))?;
    tracing::info!(email = %form.email, username = %form.username, "registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ApiCall, MockNotesApi};
    use crate::api::types::LoginResponse;

    #[tokio::test]
    async fn empty_fields_never_reach_the_network() {
        let api = MockNotesApi::new();
        let session = Session::in_memory();

        for form in [LoginForm::new("", "pw"), LoginForm::new("a@b.c", "")] {
            let err = login(&api, &session, &form).await.unwrap_err();
            assert_eq!(err.to_string(), FILL_ALL_FIELDS);
        }
        for form in [
            RegisterForm::new("", "a@b.c", "pw"),
            RegisterForm::new("u", "", "pw"),
            RegisterForm::new("u", "a@b.c", ""),
        ] {
            let err = register(&api, &form).await.unwrap_err();
            assert_eq!(err.to_string(), FILL_ALL_FIELDS);
        }
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn login_stores_exact_token() {
        let api = MockNotesApi::new();
        api.push_login(Ok(LoginResponse {
            token: Some("eyJ.abc.xyz".into()),
            message: Some("Login berhasil".into()),
        }));
        let session = Session::in_memory();

        login(&api, &session, &LoginForm::new("a@b.c", "pw")).await.unwrap();

        assert_eq!(session.token().unwrap().as_deref(), Some("eyJ.abc.xyz"));
        assert_eq!(
            api.calls(),
            vec![ApiCall::Login(LoginRequest {
                email: "a@b.c".into(),
                password: "pw".into()
            })]
        );
    }

    #[tokio::test]
    async fn login_without_token_fails() {
        let api = MockNotesApi::new();
        api.push_login(Ok(LoginResponse::default()));
        let session = Session::in_memory();

        let err = login(&api, &session, &LoginForm::new("a@b.c", "pw")).await.unwrap_err();
        assert_eq!(err.to_string(), LOGIN_FAILED);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn login_rejection_prefers_server_text() {
        let api = MockNotesApi::new();
        api.push_login(Err(NotesError::Api { status: 401, message: Some("Password salah".into()) }));
        api.push_login(Err(NotesError::Api { status: 500, message: None }));
        let session = Session::in_memory();
        let form = LoginForm::new("a@b.c", "wrong");

        assert_eq!(login(&api, &session, &form).await.unwrap_err().to_string(), "Password salah");
        assert_eq!(login(&api, &session, &form).await.unwrap_err().to_string(), LOGIN_FAILED);
    }

    #[tokio::test]
    async fn register_rejection_falls_back() {
        let api = MockNotesApi::new();
        api.push_register(Err(NotesError::Api { status: 400, message: Some("Email sudah terdaftar".into()) }));
        api.push_register(Err(NotesError::Api { status: 502, message: None }));
        let form = RegisterForm::new("u", "a@b.c", "pw");

        assert_eq!(register(&api, &form).await.unwrap_err().to_string(), "Email sudah terdaftar");
        assert_eq!(register(&api, &form).await.unwrap_err().to_string(), REGISTRATION_FAILED);
        register(&api, &form).await.unwrap();
    }
}
