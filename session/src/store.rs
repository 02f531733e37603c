//! Session state cells.
//!
//! [`SessionStore`] owns the current identity, linked profile and readiness
//! latch. Every cell is a `tokio::sync::watch` channel, so consumers holding a
//! receiver see each mutation without polling. Role flags are published on a
//! separate channel and recomputed whenever the profile changes.
//!
//! Only the session controller (and the gateway's forced logout) write to the
//! store; nothing here validates input.

use crate::models::{Identity, LinkedProfile};
use crate::roles::{RoleFlags, RoleRules};
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the session aggregate.
///
/// `profile` is only set while `identity` is set. `ready` flips to `true`
/// on the first successful identity acquisition and never reverts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub profile: Option<LinkedProfile>,
    pub ready: bool,
}

impl Session {
    /// An identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// A profile (resolved or fallback) is present.
    pub fn is_linked(&self) -> bool {
        self.profile.is_some()
    }
}

/// Shared, observable session state. Cloning is cheap and every clone sees
/// the same cells.
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<watch::Sender<Session>>,
    roles: Arc<watch::Sender<RoleFlags>>,
    rules: Arc<RoleRules>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.session.borrow())
            .field("roles", &*self.roles.borrow())
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(RoleRules::default())
    }
}

impl SessionStore {
    /// Empty store deriving roles with `rules`.
    pub fn new(rules: RoleRules) -> Self {
        let (session, _) = watch::channel(Session::default());
        let (roles, _) = watch::channel(rules.derive(None));
        Self {
            session: Arc::new(session),
            roles: Arc::new(roles),
            rules: Arc::new(rules),
        }
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Current identity, if signed in.
    pub fn identity(&self) -> Option<Identity> {
        self.session.borrow().identity.clone()
    }

    /// Current linked profile, if reconciled.
    pub fn profile(&self) -> Option<LinkedProfile> {
        self.session.borrow().profile.clone()
    }

    /// Whether identity acquisition has completed once.
    pub fn is_ready(&self) -> bool {
        self.session.borrow().ready
    }

    /// See [`Session::is_authenticated`].
    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    /// See [`Session::is_linked`].
    pub fn is_linked(&self) -> bool {
        self.session.borrow().is_linked()
    }

    /// Role flags derived from the current profile.
    pub fn role_flags(&self) -> RoleFlags {
        *self.roles.borrow()
    }

    /// Department rules used for role derivation.
    pub fn rules(&self) -> &RoleRules {
        &self.rules
    }

    /// Receiver notified on every session mutation.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Receiver notified when the derived role flags change.
    pub fn subscribe_roles(&self) -> watch::Receiver<RoleFlags> {
        self.roles.subscribe()
    }

    pub(crate) fn set_identity(&self, identity: Option<Identity>) {
        self.session.send_modify(|s| s.identity = identity);
    }

    pub(crate) fn set_profile(&self, profile: Option<LinkedProfile>) {
        self.session.send_modify(|s| s.profile = profile);
        self.recompute_roles();
    }

    /// Latch `ready`. Returns `true` if this call flipped it.
    pub(crate) fn mark_ready(&self) -> bool {
        self.session.send_if_modified(|s| {
            if s.ready {
                false
            } else {
                s.ready = true;
                true
            }
        })
    }

    /// Drop identity and profile. `ready` stays latched.
    pub(crate) fn clear(&self) {
        self.session.send_modify(|s| {
            s.identity = None;
            s.profile = None;
        });
        self.recompute_roles();
    }

    fn recompute_roles(&self) {
        let flags = self.rules.derive(self.session.borrow().profile.as_ref());
        self.roles.send_if_modified(|current| {
            if *current == flags {
                false
            } else {
                *current = flags;
                true
            }
        });
    }
}
