//! Identity Service: registration, login, profile update, and lookup.
//!
//! Orchestrates the [`CredentialStore`], [`PasswordHasher`], and
//! [`TokenIssuer`] capabilities. Uniqueness checks are check-then-act; the
//! store's unique indexes are the backstop and their violations surface as
//! [`CoreError::Conflict`].

use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{CoreError, StoreError, TokenError};
use crate::hasher::PasswordHasher;
use crate::store::{CredentialStore, UQ_USERS_PHONE};
use crate::tokens::TokenIssuer;
use crate::types::DbId;
use crate::user::{
    Credentials, LoginOutcome, NewUser, ProfileUpdate, PublicUser, Registration, StoredUser,
};

/// Conflict message when a phone number belongs to another account.
pub const PHONE_IN_USE: &str = "phone number already used";

pub struct IdentityService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Create a user and return its new id. No token is issued.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        input: &Registration,
    ) -> Result<DbId, CoreError> {
        if self.find_by_phone(ctx, &input.phone).await?.is_some() {
            return Err(CoreError::Conflict(PHONE_IN_USE.into()));
        }

        let password_hash = self.hash_password(ctx, &input.password).await?;

        let new_user = NewUser {
            name: input.name.clone(),
            phone: input.phone.clone(),
            password_hash,
        };
        let id = ctx
            .guard(async { self.store.insert(&new_user).await.map_err(store_fault) })
            .await?;

        tracing::info!(user_id = id, "User registered");
        Ok(id)
    }

    /// Authenticate by phone and password, mint a token, and record it in
    /// the ledger.
    ///
    /// An unknown phone and a wrong password fail with the same
    /// [`CoreError::InvalidCredentials`].
    pub async fn login(
        &self,
        ctx: &RequestContext,
        input: &Credentials,
    ) -> Result<LoginOutcome, CoreError> {
        let Some(user) = self.find_by_phone(ctx, &input.phone).await? else {
            tracing::warn!("Login rejected");
            return Err(CoreError::InvalidCredentials);
        };

        if !self.verify_password(ctx, &input.password, &user).await? {
            tracing::warn!("Login rejected");
            return Err(CoreError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&PublicUser::from(&user))
            .map_err(token_fault)?;

        let ledger = ctx
            .guard(async {
                self.store
                    .find_token_by_user_id(user.id)
                    .await
                    .map_err(store_fault)
            })
            .await?;

        ctx.guard(async {
            let written = match ledger {
                None => self.store.insert_token(user.id, &token).await,
                Some(row) => self.store.update_token(row.id, &token).await,
            };
            written.map_err(store_fault)
        })
        .await?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome {
            user_id: user.id,
            token,
        })
    }

    /// Replace name and phone of user `id`.
    ///
    /// Keeping one's own phone is allowed. Tokens issued earlier keep their
    /// old snapshot until the next login.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        id: DbId,
        input: &ProfileUpdate,
    ) -> Result<(), CoreError> {
        if let Some(owner) = self.find_by_phone(ctx, &input.phone).await? {
            if owner.id != id {
                return Err(CoreError::Conflict(PHONE_IN_USE.into()));
            }
        }

        ctx.guard(async {
            self.store
                .update_profile(id, &input.name, &input.phone)
                .await
                .map_err(|e| match e {
                    StoreError::RowMissing { .. } => CoreError::NotFound { entity: "user", id },
                    other => store_fault(other),
                })
        })
        .await?;

        tracing::info!(user_id = id, "User profile updated");
        Ok(())
    }

    /// Fetch the public view of user `id`.
    pub async fn get_by_id(&self, ctx: &RequestContext, id: DbId) -> Result<PublicUser, CoreError> {
        ctx.guard(async { self.store.find_by_id(id).await.map_err(store_fault) })
            .await?
            .map(PublicUser::from)
            .ok_or(CoreError::NotFound { entity: "user", id })
    }

    /// Resolve a bearer token to the identity snapshot it carries.
    pub fn authenticate(&self, token: &str) -> Result<PublicUser, CoreError> {
        self.tokens.parse(token).map_err(|_| CoreError::InvalidToken)
    }

    /// Whether the credential store answers its liveness probe.
    pub async fn store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn find_by_phone(
        &self,
        ctx: &RequestContext,
        phone: &str,
    ) -> Result<Option<StoredUser>, CoreError> {
        ctx.guard(async { self.store.find_by_phone(phone).await.map_err(store_fault) })
            .await
    }

    /// Argon2 is CPU-bound, so hashing runs on the blocking pool.
    async fn hash_password(&self, ctx: &RequestContext, password: &str) -> Result<String, CoreError> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = password.to_owned();
        ctx.guard(async move {
            tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
                .await
                .map_err(|e| CoreError::Internal(format!("Hashing task failed: {e}")))?
                .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))
        })
        .await
    }

    async fn verify_password(
        &self,
        ctx: &RequestContext,
        password: &str,
        user: &StoredUser,
    ) -> Result<bool, CoreError> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = password.to_owned();
        let hash = user.password_hash.clone();
        let user_id = user.id;
        ctx.guard(async move {
            tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
                .await
                .map_err(|e| CoreError::Internal(format!("Verification task failed: {e}")))?
                .map_err(|e| {
                    tracing::error!(user_id, error = %e, "Stored password hash is unusable");
                    CoreError::Internal(format!("Password verification error: {e}"))
                })
        })
        .await
    }
}

/// Translate a store failure into the service taxonomy.
fn store_fault(err: StoreError) -> CoreError {
    match err {
        StoreError::UniqueViolation { constraint } if constraint == UQ_USERS_PHONE => {
            CoreError::Conflict(PHONE_IN_USE.into())
        }
        other => {
            tracing::error!(error = %other, "Credential store fault");
            CoreError::Internal(other.to_string())
        }
    }
}

fn token_fault(err: TokenError) -> CoreError {
    tracing::error!(error = %err, "Token issuance failed");
    CoreError::Internal(format!("Token generation error: {err}"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::error::HashError;
    use crate::store::memory::InMemoryCredentialStore;
    use crate::user::SessionToken;

    /// Reversible stand-in for Argon2.
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plaintext: &str) -> Result<String, HashError> {
            Ok(format!("plain${plaintext}"))
        }

        fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashError> {
            let stored = hash
                .strip_prefix("plain$")
                .ok_or_else(|| HashError::Malformed(hash.to_string()))?;
            Ok(stored == plaintext)
        }
    }

    /// Encodes the snapshot in clear text with a per-issue serial number.
    #[derive(Default)]
    struct SerialIssuer {
        serial: AtomicU64,
    }

    impl TokenIssuer for SerialIssuer {
        fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
            let n = self.serial.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{n}|{}|{}|{}", user.id, user.name, user.phone))
        }

        fn parse(&self, token: &str) -> Result<PublicUser, TokenError> {
            let parts: Vec<&str> = token.split('|').collect();
            let [_, id, name, phone] = parts.as_slice() else {
                return Err(TokenError::Invalid);
            };
            Ok(PublicUser {
                id: id.parse().map_err(|_| TokenError::Invalid)?,
                name: name.to_string(),
                phone: phone.to_string(),
            })
        }
    }

    /// Which store method misbehaves, and how.
    #[derive(Clone, Copy)]
    enum Fault {
        Fail(&'static str),
        Stall(&'static str),
        /// Unique phone index rejects the write after the pre-check passed.
        PhoneTaken(&'static str),
    }

    /// Wraps the in-memory store and injects a fault into one method.
    struct FaultyStore {
        inner: InMemoryCredentialStore,
        fault: Fault,
    }

    impl FaultyStore {
        async fn trip(&self, method: &'static str) -> Result<(), StoreError> {
            match self.fault {
                Fault::Fail(m) if m == method => {
                    Err(StoreError::Backend("connection reset".to_string()))
                }
                Fault::Stall(m) if m == method => std::future::pending().await,
                Fault::PhoneTaken(m) if m == method => Err(StoreError::UniqueViolation {
                    constraint: UQ_USERS_PHONE.to_string(),
                }),
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CredentialStore for FaultyStore {
        async fn find_by_id(&self, id: DbId) -> Result<Option<StoredUser>, StoreError> {
            self.trip("find_by_id").await?;
            self.inner.find_by_id(id).await
        }

        async fn find_by_phone(&self, phone: &str) -> Result<Option<StoredUser>, StoreError> {
            self.trip("find_by_phone").await?;
            self.inner.find_by_phone(phone).await
        }

        async fn insert(&self, user: &NewUser) -> Result<DbId, StoreError> {
            self.trip("insert").await?;
            self.inner.insert(user).await
        }

        async fn update_profile(
            &self,
            id: DbId,
            name: &str,
            phone: &str,
        ) -> Result<(), StoreError> {
            self.trip("update_profile").await?;
            self.inner.update_profile(id, name, phone).await
        }

        async fn find_token_by_user_id(
            &self,
            user_id: DbId,
        ) -> Result<Option<SessionToken>, StoreError> {
            self.trip("find_token_by_user_id").await?;
            self.inner.find_token_by_user_id(user_id).await
        }

        async fn insert_token(&self, user_id: DbId, token: &str) -> Result<(), StoreError> {
            self.trip("insert_token").await?;
            self.inner.insert_token(user_id, token).await
        }

        async fn update_token(&self, token_id: DbId, token: &str) -> Result<(), StoreError> {
            self.trip("update_token").await?;
            self.inner.update_token(token_id, token).await
        }
    }

    fn service_with(store: Arc<dyn CredentialStore>) -> IdentityService {
        IdentityService::new(store, Arc::new(PlainHasher), Arc::new(SerialIssuer::default()))
    }

    fn setup() -> (IdentityService, Arc<InMemoryCredentialStore>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        (service_with(store.clone()), store)
    }

    fn rotan() -> Registration {
        Registration {
            name: "rotan".to_string(),
            phone: "+628123456789".to_string(),
            password: "Password123!".to_string(),
        }
    }

    fn rotan_credentials() -> Credentials {
        Credentials {
            phone: "+628123456789".to_string(),
            password: "Password123!".to_string(),
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::background()
    }

    // -- register ----------------------------------------------------------

    #[tokio::test]
    async fn register_returns_fresh_ids() {
        let (service, _) = setup();
        let first = service.register(&ctx(), &rotan()).await.unwrap();

        let mut other = rotan();
        other.phone = "+628123456780".to_string();
        let second = service.register(&ctx(), &other).await.unwrap();

        assert_eq!(first, 1);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let (service, store) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "Password123!");
        assert!(PlainHasher.verify("Password123!", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_duplicate_phone_conflicts_without_write() {
        let (service, store) = setup();
        service.register(&ctx(), &rotan()).await.unwrap();

        let mut dup = rotan();
        dup.name = "someone else".to_string();
        let err = service.register(&ctx(), &dup).await.unwrap_err();

        assert_matches!(err, CoreError::Conflict(msg) if msg == PHONE_IN_USE);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn register_store_fault_is_internal() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::Fail("insert"),
        });
        let service = service_with(store);

        let err = service.register(&ctx(), &rotan()).await.unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[tokio::test]
    async fn register_losing_phone_race_conflicts() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::PhoneTaken("insert"),
        });
        let service = service_with(store.clone());

        let err = service.register(&ctx(), &rotan()).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(msg) if msg == PHONE_IN_USE);
        assert_eq!(store.inner.user_count().await, 0);
    }

    #[tokio::test]
    async fn register_lookup_fault_is_internal() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::Fail("find_by_phone"),
        });
        let service = service_with(store);

        let err = service.register(&ctx(), &rotan()).await.unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[tokio::test]
    async fn register_past_deadline_writes_nothing() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::Stall("insert"),
        });
        let service = service_with(store.clone());
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));

        let err = service.register(&ctx, &rotan()).await.unwrap_err();
        assert_matches!(err, CoreError::DeadlineExceeded);
        assert_eq!(store.inner.user_count().await, 0);
    }

    #[tokio::test]
    async fn register_with_canceled_context_is_canceled() {
        let (service, store) = setup();
        let ctx = ctx();
        ctx.cancel();

        let err = service.register(&ctx, &rotan()).await.unwrap_err();
        assert_matches!(err, CoreError::Canceled);
        assert_eq!(store.user_count().await, 0);
    }

    // -- login -------------------------------------------------------------

    #[tokio::test]
    async fn login_token_carries_registration_snapshot() {
        let (service, _) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let outcome = service.login(&ctx(), &rotan_credentials()).await.unwrap();
        assert_eq!(outcome.user_id, id);

        let snapshot = service.authenticate(&outcome.token).unwrap();
        assert_eq!(
            snapshot,
            PublicUser {
                id,
                name: "rotan".to_string(),
                phone: "+628123456789".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (service, _) = setup();
        service.register(&ctx(), &rotan()).await.unwrap();

        let wrong_password = Credentials {
            phone: "+628123456789".to_string(),
            password: "Password999!".to_string(),
        };
        let unknown_phone = Credentials {
            phone: "+628999999999".to_string(),
            password: "Password123!".to_string(),
        };

        let a = service.login(&ctx(), &wrong_password).await.unwrap_err();
        let b = service.login(&ctx(), &unknown_phone).await.unwrap_err();

        assert_matches!(a, CoreError::InvalidCredentials);
        assert_matches!(b, CoreError::InvalidCredentials);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn failed_login_creates_no_ledger_row() {
        let (service, store) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let wrong = Credentials {
            phone: "+628123456789".to_string(),
            password: "nope".to_string(),
        };
        service.login(&ctx(), &wrong).await.unwrap_err();

        assert!(store.find_token_by_user_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_logins_increment_counter_and_replace_token() {
        let (service, store) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let first = service.login(&ctx(), &rotan_credentials()).await.unwrap();
        let row = store.find_token_by_user_id(id).await.unwrap().unwrap();
        assert_eq!(row.login_count, 1);
        assert_eq!(row.token, first.token);

        for expected in 2..=4 {
            let next = service.login(&ctx(), &rotan_credentials()).await.unwrap();
            let row = store.find_token_by_user_id(id).await.unwrap().unwrap();
            assert_eq!(row.login_count, expected);
            assert_eq!(row.token, next.token);
            assert_ne!(next.token, first.token);
        }
    }

    #[tokio::test]
    async fn login_with_malformed_stored_hash_is_internal() {
        let (service, store) = setup();
        store
            .insert(&NewUser {
                name: "rotan".to_string(),
                phone: "+628123456789".to_string(),
                password_hash: "not-a-hash".to_string(),
            })
            .await
            .unwrap();

        let err = service.login(&ctx(), &rotan_credentials()).await.unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[tokio::test]
    async fn login_ledger_insert_fault_is_internal() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::Fail("insert_token"),
        });
        let service = service_with(store);
        service.register(&ctx(), &rotan()).await.unwrap();

        let err = service.login(&ctx(), &rotan_credentials()).await.unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[tokio::test]
    async fn login_ledger_update_fault_is_internal() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::Fail("update_token"),
        });
        let service = service_with(store);
        service.register(&ctx(), &rotan()).await.unwrap();
        service.login(&ctx(), &rotan_credentials()).await.unwrap();

        let err = service.login(&ctx(), &rotan_credentials()).await.unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[tokio::test]
    async fn canceled_login_does_not_touch_ledger() {
        let (service, store) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let ctx = ctx();
        ctx.cancel();
        let err = service.login(&ctx, &rotan_credentials()).await.unwrap_err();

        assert_matches!(err, CoreError::Canceled);
        assert!(store.find_token_by_user_id(id).await.unwrap().is_none());
    }

    // -- update_profile ----------------------------------------------------

    #[tokio::test]
    async fn update_profile_keeping_own_phone() {
        let (service, _) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let update = ProfileUpdate {
            name: "rotan2".to_string(),
            phone: "+628123456789".to_string(),
        };
        service.update_profile(&ctx(), id, &update).await.unwrap();

        let user = service.get_by_id(&ctx(), id).await.unwrap();
        assert_eq!(user.name, "rotan2");
        assert_eq!(user.phone, "+628123456789");
    }

    #[tokio::test]
    async fn update_profile_to_other_users_phone_conflicts() {
        let (service, _) = setup();
        service.register(&ctx(), &rotan()).await.unwrap();

        let mut other = rotan();
        other.phone = "+628123456780".to_string();
        let other_id = service.register(&ctx(), &other).await.unwrap();

        let update = ProfileUpdate {
            name: "x".to_string(),
            phone: "+628123456789".to_string(),
        };
        let err = service
            .update_profile(&ctx(), other_id, &update)
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::Conflict(_));
        let unchanged = service.get_by_id(&ctx(), other_id).await.unwrap();
        assert_eq!(unchanged.phone, "+628123456780");
    }

    #[tokio::test]
    async fn update_profile_of_unknown_user_is_not_found() {
        let (service, _) = setup();
        let update = ProfileUpdate {
            name: "ghost".to_string(),
            phone: "+628123456789".to_string(),
        };

        let err = service.update_profile(&ctx(), 42, &update).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "user", id: 42 });
    }

    #[tokio::test]
    async fn update_profile_losing_phone_race_conflicts() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::PhoneTaken("update_profile"),
        });
        let service = service_with(store.clone());
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let update = ProfileUpdate {
            name: "rotan".to_string(),
            phone: "+628123456700".to_string(),
        };
        let err = service.update_profile(&ctx(), id, &update).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(msg) if msg == PHONE_IN_USE);

        let stored = store.inner.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.phone, "+628123456789");
    }

    #[tokio::test]
    async fn update_profile_store_fault_is_internal() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::Fail("update_profile"),
        });
        let service = service_with(store);
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let update = ProfileUpdate {
            name: "rotan2".to_string(),
            phone: "+628123456789".to_string(),
        };
        let err = service.update_profile(&ctx(), id, &update).await.unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[tokio::test]
    async fn token_snapshot_is_not_refreshed_by_profile_update() {
        let (service, _) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();
        let outcome = service.login(&ctx(), &rotan_credentials()).await.unwrap();

        let update = ProfileUpdate {
            name: "renamed".to_string(),
            phone: "+628123456700".to_string(),
        };
        service.update_profile(&ctx(), id, &update).await.unwrap();

        let snapshot = service.authenticate(&outcome.token).unwrap();
        assert_eq!(snapshot.name, "rotan");
        assert_eq!(snapshot.phone, "+628123456789");
    }

    // -- get_by_id ---------------------------------------------------------

    #[tokio::test]
    async fn get_by_id_returns_public_view() {
        let (service, _) = setup();
        let id = service.register(&ctx(), &rotan()).await.unwrap();

        let user = service.get_by_id(&ctx(), id).await.unwrap();
        assert_eq!(
            user,
            PublicUser {
                id: 1,
                name: "rotan".to_string(),
                phone: "+628123456789".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn get_by_id_missing_user_is_not_found() {
        let (service, _) = setup();
        let err = service.get_by_id(&ctx(), 1).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "user", id: 1 });
    }

    #[tokio::test]
    async fn get_by_id_store_fault_is_internal() {
        let store = Arc::new(FaultyStore {
            inner: InMemoryCredentialStore::new(),
            fault: Fault::Fail("find_by_id"),
        });
        let service = service_with(store);

        let err = service.get_by_id(&ctx(), 1).await.unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    // -- authenticate ------------------------------------------------------

    #[test]
    fn authenticate_rejects_garbage() {
        let (service, _) = setup();
        let err = service.authenticate("garbage").unwrap_err();
        assert_matches!(err, CoreError::InvalidToken);
    }
}
