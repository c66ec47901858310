use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::Member;
use crate::session::{SessionSnapshot, SessionStore};
use crate::utils::SingleFlight;

/// Fields requested from the members endpoint.
const MEMBER_FIELDS: &str = "id,name";

/// Member id -> display name
pub type MemberMap = HashMap<String, String>;

pub fn members_to_map(members: Vec<Member>) -> MemberMap {
    members.into_iter().map(|m| (m.id, m.name)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub members: Arc<MemberMap>,
    pub loading: bool,
}

impl MemberSnapshot {
    fn initial() -> Self {
        Self {
            members: Arc::new(MemberMap::new()),
            loading: true,
        }
    }

    fn empty() -> Self {
        Self {
            members: Arc::new(MemberMap::new()),
            loading: false,
        }
    }
}

/// Cached member names for the current family.
///
/// Clone is cheap; all clones share the same state.
#[derive(Clone)]
pub struct MemberDirectory {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    session: watch::Receiver<SessionSnapshot>,
    state: watch::Sender<MemberSnapshot>,
    /// Advanced whenever the session flags change. A fetch started under an
    /// older generation must not publish.
    generation: AtomicU64,
    fetch: SingleFlight<(u64, Arc<MemberMap>)>,
}

impl MemberDirectory {
    pub fn new(api: ApiClient, session: &SessionStore) -> Self {
        let (state, _) = watch::channel(MemberSnapshot::initial());
        Self {
            inner: Arc::new(Inner {
                api,
                session: session.subscribe(),
                state,
                generation: AtomicU64::new(0),
                fetch: SingleFlight::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MemberSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> MemberSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn member_name(&self, member_id: &str) -> Option<String> {
        self.inner.state.borrow().members.get(member_id).cloned()
    }

    /// Wait until no member fetch is pending and return the settled snapshot.
    pub async fn loaded(&self) -> MemberSnapshot {
        let mut rx = self.subscribe();
        let snapshot = match rx.wait_for(|s| !s.loading).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }

    /// Load member names for the current family.
    ///
    /// Resolves to an empty map without any request unless the session is
    /// authenticated and belongs to a family. Failures are logged and also
    /// resolve to an empty map.
    pub async fn fetch_members(&self) -> MemberMap {
        let session = self.inner.session.borrow().clone();
        if !(session.is_authenticated() && session.is_belongs_to_family()) {
            debug!("Not in a family, clearing member directory");
            self.inner.reset();
            return MemberMap::new();
        }

        let wanted = self.inner.generation.load(Ordering::SeqCst);
        loop {
            let inner = Arc::clone(&self.inner);
            let (ran_under, members) = self
                .inner
                .fetch
                .run(move || async move { inner.load_members().await })
                .await;
            if ran_under >= wanted {
                return (*members).clone();
            }
            debug!("Joined a member fetch that predates the session change, fetching again");
        }
    }

    /// Follow the session store, refetching whenever the pair
    /// (authenticated, belongs to family) changes value.
    ///
    /// Nothing happens while the session is still loading.
    pub fn spawn_sync(&self) -> JoinHandle<()> {
        let directory = self.clone();
        let mut session = self.inner.session.clone();

        tokio::spawn(async move {
            let mut last_flags: Option<(bool, bool)> = None;
            loop {
                let snapshot = session.borrow_and_update().clone();
                if !snapshot.loading {
                    let flags = (snapshot.is_authenticated(), snapshot.is_belongs_to_family());
                    if last_flags != Some(flags) {
                        debug!(
                            authenticated = flags.0,
                            belongs_to_family = flags.1,
                            "Session flags changed, syncing member directory"
                        );
                        last_flags = Some(flags);
                        directory.inner.generation.fetch_add(1, Ordering::SeqCst);
                        let directory = directory.clone();
                        tokio::spawn(async move {
                            directory.fetch_members().await;
                        });
                    }
                }

                if session.changed().await.is_err() {
                    debug!("Session store dropped, stopping member sync");
                    break;
                }
            }
        })
    }
}

impl Inner {
    fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = MemberSnapshot::empty();
        });
    }

    async fn load_members(&self) -> (u64, Arc<MemberMap>) {
        // Generation is read under the write lock, same as reset()
        let mut generation = 0;
        self.state.send_if_modified(|state| {
            generation = self.generation.load(Ordering::SeqCst);
            let changed = !state.loading;
            state.loading = true;
            changed
        });

        let members = match self.api.fetch_family_members(MEMBER_FIELDS).await {
            Ok(list) => {
                info!(count = list.len(), "Member directory loaded");
                members_to_map(list)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch family members");
                MemberMap::new()
            }
        };
        let members = Arc::new(members);

        let published = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = MemberSnapshot {
                members: Arc::clone(&members),
                loading: false,
            };
            true
        });

        if published {
            (generation, members)
        } else {
            debug!("Discarding member list fetched for an older session");
            (generation, Arc::clone(&self.state.borrow().members))
        }
    }
}
