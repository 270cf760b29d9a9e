use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub chat_id: i64,
    pub display_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Who has run /start. Purely informational; lost on restart like everything
/// else.
#[derive(Default)]
pub struct UserRegistry {
    users: Mutex<HashMap<i64, UserProfile>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, chat_id: i64, display_name: String) -> UserProfile {
        let profile = UserProfile {
            chat_id,
            display_name,
            registered_at: Utc::now(),
        };
        self.users.lock().unwrap().insert(chat_id, profile.clone());
        profile
    }

    pub fn get(&self, chat_id: i64) -> Option<UserProfile> {
        self.users.lock().unwrap().get(&chat_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_get() {
        let registry = UserRegistry::new();
        registry.register(5, "Marta".to_string());
        assert_eq!(registry.get(5).unwrap().display_name, "Marta");
        assert!(registry.get(6).is_none());
    }

    #[test]
    fn reregistering_overwrites_the_profile() {
        let registry = UserRegistry::new();
        registry.register(5, "Marta".to_string());
        registry.register(5, "María".to_string());
        assert_eq!(registry.get(5).unwrap().display_name, "María");
    }
}
