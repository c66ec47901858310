use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, WhoAmI};
use crate::auth::Role;
use crate::models::UserProfile;
use crate::utils::SingleFlight;

// ============================================================================
// Snapshot
// ============================================================================

/// Committed view of the session at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<UserProfile>,
    pub loading: bool,
}

impl SessionSnapshot {
    /// State before the first session check completes
    pub fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn resolved(user: Option<UserProfile>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_belongs_to_family(&self) -> bool {
        self.user
            .as_ref()
            .map(|u| u.family_id.is_some())
            .unwrap_or(false)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.user
            .as_ref()
            .map(|u| u.permissions.iter().any(|p| p == permission))
            .unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .map(|u| u.role == Role::Admin)
            .unwrap_or(false)
    }

    pub fn family_id(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.family_id.as_deref())
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Holds the current session and keeps it in sync with the session endpoint.
///
/// Clone is cheap; all clones share the same state. Only `refetch` and
/// `logout` publish new snapshots.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    state: watch::Sender<SessionSnapshot>,
    /// Advanced by every logout. A session check that started under an
    /// older epoch must not publish.
    epoch: AtomicU64,
    refetch: SingleFlight<(u64, SessionSnapshot)>,
}

impl SessionStore {
    /// Create a store in the initial loading state without contacting the server
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                epoch: AtomicU64::new(0),
                refetch: SingleFlight::new(),
            }),
        }
    }

    /// Create a store and start the first session check in the background.
    pub fn start(api: ApiClient) -> Self {
        let store = Self::new(api);
        store.spawn_refetch();
        store
    }

    pub fn spawn_refetch(&self) -> JoinHandle<SessionSnapshot> {
        let store = self.clone();
        tokio::spawn(async move { store.refetch().await })
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Wait for the session check in progress (if any) and return the result.
    pub async fn resolved(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        let snapshot = match rx.wait_for(|s| !s.loading).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }

    /// Ask the session endpoint who we are and publish the answer.
    ///
    /// Overlapping calls share one request. Rejections and transport errors
    /// both resolve to a signed-out snapshot. A call made after a logout
    /// never settles for a check that started before it.
    pub async fn refetch(&self) -> SessionSnapshot {
        let wanted = self.inner.epoch.load(Ordering::SeqCst);
        loop {
            let inner = Arc::clone(&self.inner);
            let (ran_under, snapshot) = self
                .inner
                .refetch
                .run(move || async move { inner.load_user().await })
                .await;
            if ran_under >= wanted {
                return snapshot;
            }
            debug!("Joined a session check that predates a logout, checking again");
        }
    }

    /// Sign out on the server, then clear the local session regardless of
    /// the outcome. A server failure is returned for display only.
    pub async fn logout(&self) -> Result<()> {
        let result = self.inner.api.logout().await;
        if let Err(ref e) = result {
            warn!(error = %e, "Logout request failed, clearing local session anyway");
        }

        self.inner.state.send_modify(|state| {
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            *state = SessionSnapshot::resolved(None);
        });
        info!("Signed out");
        result
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_belongs_to_family(&self) -> bool {
        self.inner.state.borrow().is_belongs_to_family()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.inner.state.borrow().has_permission(permission)
    }

    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin()
    }
}

impl Inner {
    /// Returns the epoch the check started under with the current snapshot.
    async fn load_user(&self) -> (u64, SessionSnapshot) {
        let epoch = self.epoch.load(Ordering::SeqCst);

        let user = match self.api.whoami().await {
            Ok(WhoAmI::Authenticated(user)) => {
                info!(user_id = %user.id, role = user.role.as_str(), "Session active");
                Some(user)
            }
            Ok(outcome) => {
                debug!(?outcome, "No active session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Session check failed, treating as signed out");
                None
            }
        };

        let snapshot = SessionSnapshot::resolved(user);
        let published = self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            if *state == snapshot {
                return false;
            }
            *state = snapshot.clone();
            true
        });

        if !published && self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("Discarding session response that predates a logout");
        }
        (epoch, self.state.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(family_id: Option<&str>, role: Role, permissions: &[&str]) -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            role,
            family_id: family_id.map(str::to_string),
            email: None,
            name: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_initial_snapshot() {
        let snapshot = SessionSnapshot::initial();
        assert!(snapshot.loading);
        assert!(!snapshot.is_authenticated());
        assert!(!snapshot.is_belongs_to_family());
        assert!(!snapshot.is_admin());
        assert!(!snapshot.has_permission("post"));
    }

    #[test]
    fn test_authenticated_follows_user() {
        assert!(!SessionSnapshot::resolved(None).is_authenticated());
        let snapshot = SessionSnapshot::resolved(Some(profile(None, Role::Member, &[])));
        assert!(snapshot.is_authenticated());
    }

    #[test]
    fn test_belongs_to_family_follows_family_id() {
        let without = SessionSnapshot::resolved(Some(profile(None, Role::Member, &[])));
        assert!(!without.is_belongs_to_family());
        assert_eq!(without.family_id(), None);

        let with = SessionSnapshot::resolved(Some(profile(Some("f1"), Role::Member, &[])));
        assert!(with.is_belongs_to_family());
        assert_eq!(with.family_id(), Some("f1"));
    }

    #[test]
    fn test_is_admin() {
        assert!(SessionSnapshot::resolved(Some(profile(None, Role::Admin, &[]))).is_admin());
        assert!(!SessionSnapshot::resolved(Some(profile(None, Role::Member, &[]))).is_admin());
        assert!(!SessionSnapshot::resolved(Some(profile(None, Role::User, &[]))).is_admin());
    }

    #[test]
    fn test_has_permission() {
        let snapshot = SessionSnapshot::resolved(Some(profile(None, Role::Member, &["post", "invite"])));
        assert!(snapshot.has_permission("post"));
        assert!(snapshot.has_permission("invite"));
        assert!(!snapshot.has_permission("delete"));
    }
}
