use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use super::errors::IdentityError;
use super::provider::IdentityProvider;
use super::types::Principal;

#[derive(Debug, Clone)]
struct StoredAccount {
    email: Option<String>,
    password: Option<String>,
    display_name: Option<String>,
    is_anonymous: bool,
}

/// In-process identity provider for tests and offline development.
///
/// Accounts live in a `HashMap` keyed by uid; anonymous uids are random v4
/// uuids. Federated sign-in accepts stand-in tokens of the form
/// `email[:display name]` so flows can be driven without a real device token,
/// and yields a stable uid for repeated sign-ins by the same email.
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<String, StoredAccount>>,
    federated: RwLock<HashMap<String, String>>,
    state: watch::Sender<Option<Principal>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory identity provider");
        let (state, _) = watch::channel(None);
        Self {
            accounts: RwLock::new(HashMap::new()),
            federated: RwLock::new(HashMap::new()),
            state,
        }
    }

    fn principal_of(uid: &str, account: &StoredAccount) -> Principal {
        Principal {
            uid: uid.to_string(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            is_anonymous: account.is_anonymous,
        }
    }

    async fn email_taken(&self, email: &str) -> bool {
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .any(|account| account.email.as_deref() == Some(email))
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        if self.email_taken(email).await {
            return Err(IdentityError::Account(
                "email already registered".to_string(),
            ));
        }

        let uid = Uuid::new_v4().to_string();
        let account = StoredAccount {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            display_name: None,
            is_anonymous: false,
        };
        let principal = Self::principal_of(&uid, &account);

        self.accounts.write().await.insert(uid, account);
        self.state.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        let accounts = self.accounts.read().await;
        let principal = accounts
            .iter()
            .find(|(_, account)| {
                account.email.as_deref() == Some(email)
                    && account.password.as_deref() == Some(password)
            })
            .map(|(uid, account)| Self::principal_of(uid, account))
            .ok_or_else(|| {
                IdentityError::Authentication("invalid email or password".to_string())
            })?;
        drop(accounts);

        self.state.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_in_anonymously(&self) -> Result<Principal, IdentityError> {
        let uid = Uuid::new_v4().to_string();
        let account = StoredAccount {
            email: None,
            password: None,
            display_name: None,
            is_anonymous: true,
        };
        let principal = Self::principal_of(&uid, &account);

        self.accounts.write().await.insert(uid, account);
        self.state.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_in_with_google(&self, id_token: &str) -> Result<Principal, IdentityError> {
        let (email, display_name) = match id_token.split_once(':') {
            Some((email, name)) => (email, Some(name.to_string())),
            None => (id_token, None),
        };
        if email.is_empty() || !email.contains('@') {
            return Err(IdentityError::Authentication(
                "malformed federated token".to_string(),
            ));
        }

        let mut federated = self.federated.write().await;
        let mut accounts = self.accounts.write().await;
        let uid = match federated.get(email) {
            Some(uid) => uid.clone(),
            None => {
                let uid = Uuid::new_v4().to_string();
                accounts.insert(
                    uid.clone(),
                    StoredAccount {
                        email: Some(email.to_string()),
                        password: None,
                        display_name: display_name.clone(),
                        is_anonymous: false,
                    },
                );
                federated.insert(email.to_string(), uid.clone());
                uid
            }
        };
        let principal = accounts
            .get(&uid)
            .map(|account| Self::principal_of(&uid, account))
            .ok_or_else(|| IdentityError::Backend("federated account missing".to_string()))?;
        drop(accounts);
        drop(federated);

        self.state.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.state.send_replace(None);
        Ok(())
    }

    async fn update_display_name(&self, display_name: &str) -> Result<(), IdentityError> {
        let uid = self
            .current_principal()
            .ok_or(IdentityError::NotSignedIn)?
            .uid;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&uid)
            .ok_or_else(|| IdentityError::Backend("account missing".to_string()))?;
        account.display_name = Some(display_name.to_string());
        let principal = Self::principal_of(&uid, account);
        drop(accounts);

        self.state.send_replace(Some(principal));
        Ok(())
    }

    async fn update_email(&self, email: &str) -> Result<(), IdentityError> {
        let uid = self
            .current_principal()
            .ok_or(IdentityError::NotSignedIn)?
            .uid;

        let mut accounts = self.accounts.write().await;
        let taken = accounts
            .iter()
            .any(|(id, account)| id != &uid && account.email.as_deref() == Some(email));
        if taken {
            return Err(IdentityError::Account(
                "email already registered".to_string(),
            ));
        }
        let account = accounts
            .get_mut(&uid)
            .ok_or_else(|| IdentityError::Backend("account missing".to_string()))?;
        account.email = Some(email.to_string());
        let principal = Self::principal_of(&uid, account);
        drop(accounts);

        self.state.send_replace(Some(principal));
        Ok(())
    }

    async fn update_password(&self, password: &str) -> Result<(), IdentityError> {
        let uid = self
            .current_principal()
            .ok_or(IdentityError::NotSignedIn)?
            .uid;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&uid)
            .ok_or_else(|| IdentityError::Backend("account missing".to_string()))?;
        account.password = Some(password.to_string());
        // A password credential on an addressable account makes it permanent.
        if account.email.is_some() {
            account.is_anonymous = false;
        }
        let principal = Self::principal_of(&uid, account);
        drop(accounts);

        self.state.send_replace(Some(principal));
        Ok(())
    }

    fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }
}
