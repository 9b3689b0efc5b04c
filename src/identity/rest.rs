use serde::Deserialize;
use serde_json::json;
use tokio::sync::{RwLock, watch};
use url::Url;

use crate::config::{AUTH_API_KEY, AUTH_DOMAIN, IDENTITY_API_URL};
use crate::utils::http_client;

use super::errors::IdentityError;
use super::provider::IdentityProvider;
use super::types::Principal;
use async_trait::async_trait;

/// Responses from the identity backend's `accounts:*` endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthTokenResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccountResponse {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    error: BackendErrorDetail,
}

#[derive(Debug, Deserialize)]
struct BackendErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
struct BackendTokens {
    id_token: String,
    #[allow(dead_code)]
    refresh_token: Option<String>,
}

/// Client for the hosted identity backend's REST API.
///
/// Holds the current principal (published on the auth-state stream) and the
/// backend session tokens for in-place account updates.
pub struct RestIdentityProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    auth_domain: String,
    state: watch::Sender<Option<Principal>>,
    tokens: RwLock<Option<BackendTokens>>,
}

impl RestIdentityProvider {
    pub fn new(base_url: Url, api_key: impl Into<String>, auth_domain: impl Into<String>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            client: http_client(),
            base_url,
            api_key: api_key.into(),
            auth_domain: auth_domain.into(),
            state,
            tokens: RwLock::new(None),
        }
    }

    /// Build a provider from the environment-sourced connection parameters.
    pub fn from_env() -> Self {
        let base_url =
            Url::parse(&IDENTITY_API_URL).expect("IDENTITY_API_URL must be a valid URL");
        Self::new(base_url, AUTH_API_KEY.to_string(), AUTH_DOMAIN.to_string())
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.base_url.as_str().trim_end_matches('/'),
            action,
            self.api_key
        )
    }

    async fn post_accounts(
        &self,
        action: &str,
        body: serde_json::Value,
    ) -> Result<String, IdentityError> {
        let response = self
            .client
            .post(self.endpoint(action))
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Backend(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| IdentityError::Backend(e.to_string()))?;
        if status != reqwest::StatusCode::OK {
            tracing::debug!("Identity backend {action} failed: {status} {response_body}");
            return Err(classify_backend_error(status, &response_body));
        }

        tracing::debug!("Identity backend {action} response: {response_body}");
        Ok(response_body)
    }

    async fn sign_in_via(
        &self,
        action: &str,
        body: serde_json::Value,
        is_anonymous: bool,
    ) -> Result<Principal, IdentityError> {
        let response_body = self.post_accounts(action, body).await?;
        let auth: AuthTokenResponse = serde_json::from_str(&response_body)
            .map_err(|e| IdentityError::Serde(format!("Failed to deserialize response body: {e}")))?;

        let principal = Principal {
            uid: auth.local_id,
            email: auth.email,
            display_name: auth.display_name,
            is_anonymous,
        };
        *self.tokens.write().await = Some(BackendTokens {
            id_token: auth.id_token,
            refresh_token: auth.refresh_token,
        });
        self.state.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn update_account(
        &self,
        mut body: serde_json::Value,
        apply: impl FnOnce(&mut Principal),
    ) -> Result<(), IdentityError> {
        let id_token = {
            let tokens = self.tokens.read().await;
            tokens
                .as_ref()
                .map(|t| t.id_token.clone())
                .ok_or(IdentityError::NotSignedIn)?
        };
        body["idToken"] = json!(id_token);

        let response_body = self.post_accounts("update", body).await?;
        let update: UpdateAccountResponse = serde_json::from_str(&response_body)
            .map_err(|e| IdentityError::Serde(format!("Failed to deserialize response body: {e}")))?;

        // Email and password changes rotate the backend session token
        if let Some(id_token) = update.id_token {
            *self.tokens.write().await = Some(BackendTokens {
                id_token,
                refresh_token: update.refresh_token,
            });
        }
        self.state.send_modify(|principal| {
            if let Some(principal) = principal {
                apply(principal);
            }
        });
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        self.sign_in_via(
            "signUp",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
            false,
        )
        .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        self.sign_in_via(
            "signInWithPassword",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
            false,
        )
        .await
    }

    async fn sign_in_anonymously(&self) -> Result<Principal, IdentityError> {
        self.sign_in_via("signUp", json!({ "returnSecureToken": true }), true)
            .await
    }

    async fn sign_in_with_google(&self, id_token: &str) -> Result<Principal, IdentityError> {
        self.sign_in_via(
            "signInWithIdp",
            json!({
                "postBody": format!("id_token={id_token}&providerId=google.com"),
                "requestUri": format!("https://{}", self.auth_domain),
                "returnIdpCredential": true,
                "returnSecureToken": true,
            }),
            false,
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        *self.tokens.write().await = None;
        self.state.send_replace(None);
        Ok(())
    }

    async fn update_display_name(&self, display_name: &str) -> Result<(), IdentityError> {
        let name = display_name.to_string();
        self.update_account(
            json!({ "displayName": display_name, "returnSecureToken": true }),
            move |principal| principal.display_name = Some(name),
        )
        .await
    }

    async fn update_email(&self, email: &str) -> Result<(), IdentityError> {
        let email_owned = email.to_string();
        self.update_account(
            json!({ "email": email, "returnSecureToken": true }),
            move |principal| principal.email = Some(email_owned),
        )
        .await
    }

    async fn update_password(&self, password: &str) -> Result<(), IdentityError> {
        self.update_account(
            json!({ "password": password, "returnSecureToken": true }),
            |_| {},
        )
        .await
    }

    fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }
}

fn classify_backend_error(status: reqwest::StatusCode, body: &str) -> IdentityError {
    let message = serde_json::from_str::<BackendErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| status.to_string());

    if message.starts_with("EMAIL_EXISTS") {
        IdentityError::Account(message)
    } else if message.starts_with("EMAIL_NOT_FOUND")
        || message.starts_with("INVALID_PASSWORD")
        || message.starts_with("INVALID_LOGIN_CREDENTIALS")
        || message.starts_with("USER_DISABLED")
    {
        IdentityError::Authentication(message)
    } else {
        IdentityError::Backend(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test successful deserialization of a sign-in response
    #[test]
    fn test_auth_token_response_deserialization() {
        let json_data = json!({
            "localId": "uid123",
            "idToken": "token.value",
            "refreshToken": "refresh.value",
            "email": "test@example.com",
            "displayName": "Test User"
        });

        let json_str = serde_json::to_string(&json_data)
            .expect("JSON serialization should not fail for valid data");
        let auth: AuthTokenResponse =
            serde_json::from_str(&json_str).expect("Should deserialize valid sign-in response");

        assert_eq!(auth.local_id, "uid123");
        assert_eq!(auth.id_token, "token.value");
        assert_eq!(auth.email.as_deref(), Some("test@example.com"));
        assert_eq!(auth.display_name.as_deref(), Some("Test User"));
    }

    /// Anonymous sign-up responses carry no email or display name
    #[test]
    fn test_auth_token_response_without_claims() {
        let json_data = json!({
            "localId": "guest123",
            "idToken": "token.value"
        });

        let json_str =
            serde_json::to_string(&json_data).expect("JSON serialization should not fail");
        let auth: AuthTokenResponse =
            serde_json::from_str(&json_str).expect("Should deserialize anonymous response");

        assert!(auth.email.is_none());
        assert!(auth.display_name.is_none());
        assert!(auth.refresh_token.is_none());
    }

    /// Responses missing the required localId must fail to deserialize
    #[test]
    fn test_auth_token_response_missing_local_id() {
        let json_data = json!({ "idToken": "token.value" });

        let json_str =
            serde_json::to_string(&json_data).expect("JSON serialization should not fail");
        let auth: Result<AuthTokenResponse, _> = serde_json::from_str(&json_str);

        assert!(auth.is_err(), "Should fail without localId");
    }

    #[test]
    fn test_backend_error_classification() {
        let body = r#"{"error": {"message": "EMAIL_EXISTS", "code": 400}}"#;
        let err = classify_backend_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, IdentityError::Account(_)));

        let body = r#"{"error": {"message": "INVALID_PASSWORD", "code": 400}}"#;
        let err = classify_backend_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, IdentityError::Authentication(_)));

        let body = r#"{"error": {"message": "INVALID_LOGIN_CREDENTIALS", "code": 400}}"#;
        let err = classify_backend_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, IdentityError::Authentication(_)));

        let body = r#"{"error": {"message": "QUOTA_EXCEEDED", "code": 400}}"#;
        let err = classify_backend_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, IdentityError::Backend(_)));
    }

    /// Malformed error bodies fall back to the HTTP status text
    #[test]
    fn test_backend_error_classification_unparseable_body() {
        let err = classify_backend_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "<html>");

        match err {
            IdentityError::Backend(message) => {
                assert!(message.contains("503"), "Should carry the status: {message}")
            }
            other => panic!("Expected Backend error, got {other:?}"),
        }
    }
}
