use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::interfaces::auth::AuthInterface;

/// Holds the signed-in user of the running client.
#[derive(Debug, Default)]
pub struct SessionAuth {
    user_id: RwLock<Option<String>>,
}

impl SessionAuth {
    pub fn signed_in(user_id: &str) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.to_string())),
        }
    }

    pub fn sign_in(&self, user_id: &str) {
        info!(user_id, "signed in");
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id.to_string());
    }

    pub fn sign_out(&self) {
        let previous = self
            .user_id
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(user_id) = previous {
            info!(user_id, "signed out");
        }
    }
}

impl AuthInterface for SessionAuth {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
