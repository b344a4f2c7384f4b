use super::sequence::IdSequence;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use users_tonic_core::{
    Result,
    proto::{CreateUserRequest, UpdateUserRequest, User, UserStatus},
    types::{Clock, EPOCH, FIRST_ALLOCATED_ID, UserId, now_millis, seed_users},
};

/// Concurrency-safe mapping from id to [`User`].
///
/// A single [`RwLock`] guards the map, so every operation is linearizable
/// with respect to every other. Reads hand out clones; no guard ever escapes
/// a method, and no lock is held across an `.await`.
///
/// Iteration follows ascending id, which is also insertion order since ids
/// are allocated monotonically.
pub struct UserStore {
    users: RwLock<BTreeMap<UserId, User>>,
    ids: IdSequence,
    clock: Clock,
}

impl UserStore {
    /// Creates a store holding the two seed users, with the id sequence
    /// positioned just past them.
    pub fn new(clock: Clock) -> Self {
        let store = Self {
            users: RwLock::new(BTreeMap::new()),
            ids: IdSequence::starting_at(FIRST_ALLOCATED_ID),
            clock,
        };
        for user in seed_users(now_millis(&store.clock)) {
            store.put(user);
        }
        store
    }

    /// Inserts `user`, replacing any record already stored under its id.
    pub fn put(&self, user: User) {
        self.users.write().insert(user.id, user);
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.read().get(&id).cloned()
    }

    pub fn remove(&self, id: UserId) -> Option<User> {
        self.users.write().remove(&id)
    }

    /// Point-in-time snapshot of every stored user, ordered by id.
    pub fn values(&self) -> Vec<User> {
        self.users.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Allocates an id and stores a new, active user built from `req`.
    ///
    /// # Errors
    ///
    /// Fails only when the id space is exhausted; nothing is stored then.
    pub fn create(&self, req: CreateUserRequest) -> Result<User> {
        let id = self.ids.allocate()?;
        let now = now_millis(&self.clock);
        let user = User {
            id,
            name: req.name,
            email: req.email,
            age: req.age,
            department: req.department,
            status: UserStatus::Active.into(),
            created_at: now,
            updated_at: now,
        };
        self.put(user.clone());
        Ok(user)
    }

    /// Overwrites the mutable fields of user `req.id` and refreshes
    /// `updated_at`. `id` and `created_at` are left as they were.
    ///
    /// Returns `None`, leaving the store untouched, if no such user exists.
    pub fn update(&self, req: UpdateUserRequest) -> Option<User> {
        let mut users = self.users.write();
        let user = users.get_mut(&req.id)?;
        user.name = req.name;
        user.email = req.email;
        user.age = req.age;
        user.department = req.department;
        user.status = req.status;
        user.updated_at = now_millis(&self.clock);
        Some(user.clone())
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new(Clock::with_epoch(EPOCH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn request(name: &str, department: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            age: 33,
            department: department.to_string(),
        }
    }

    #[test]
    fn starts_with_the_two_seed_users() {
        let store = UserStore::default();
        let users = store.values();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[0].name, "John Doe");
        assert_eq!(users[0].department, "Engineering");
        assert_eq!(users[1].id, 2);
        assert_eq!(users[1].name, "Jane Smith");
        assert_eq!(users[1].department, "Marketing");
        assert!(users.iter().all(|u| u.status() == UserStatus::Active));
    }

    #[test]
    fn create_allocates_past_the_seeds_and_stamps_fields() -> Result<()> {
        let store = UserStore::default();
        let user = store.create(request("Alice Johnson", "Engineering"))?;
        assert_eq!(user.id, 3);
        assert_eq!(user.status(), UserStatus::Active);
        assert_eq!(user.created_at, user.updated_at);
        assert!(user.created_at > 0);
        assert_eq!(store.get(3), Some(user));
        assert_eq!(store.len(), 3);
        Ok(())
    }

    #[test]
    fn removed_ids_are_never_reused() -> Result<()> {
        let store = UserStore::default();
        let first = store.create(request("Temp", "Ops"))?;
        assert_eq!(store.remove(first.id).map(|u| u.name), Some("Temp".into()));
        assert_eq!(store.get(first.id), None);
        assert_eq!(store.remove(first.id), None);

        let second = store.create(request("Next", "Ops"))?;
        assert!(second.id > first.id);
        Ok(())
    }

    #[test]
    fn update_preserves_identity_and_creation_time() -> Result<()> {
        let store = UserStore::default();
        let before = store.create(request("Alice Johnson", "Engineering"))?;
        std::thread::sleep(core::time::Duration::from_millis(5));

        let after = store
            .update(UpdateUserRequest {
                id: before.id,
                name: "Alice Johnson-Smith".to_string(),
                email: "alice.smith@example.com".to_string(),
                age: 26,
                department: "Research".to_string(),
                status: UserStatus::Inactive.into(),
            })
            .expect("user exists");

        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.name, "Alice Johnson-Smith");
        assert_eq!(after.email, "alice.smith@example.com");
        assert_eq!(after.age, 26);
        assert_eq!(after.department, "Research");
        assert_eq!(after.status(), UserStatus::Inactive);
        assert_eq!(store.get(before.id), Some(after));
        Ok(())
    }

    #[test]
    fn update_of_missing_user_changes_nothing() {
        let store = UserStore::default();
        let snapshot = store.values();
        let updated = store.update(UpdateUserRequest {
            id: 404,
            name: "Ghost".to_string(),
            ..Default::default()
        });
        assert_eq!(updated, None);
        assert_eq!(store.values(), snapshot);
    }

    #[test]
    fn put_replaces_in_place() {
        let store = UserStore::default();
        let mut john = store.get(1).expect("seeded");
        john.age = 31;
        store.put(john.clone());
        assert_eq!(store.get(1), Some(john));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let store = Arc::new(UserStore::default());
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .create(request(&format!("User {i}"), "Load"))
                        .unwrap()
                        .id
                })
            })
            .collect();

        let ids: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(ids, (3..103).collect::<HashSet<_>>());
        assert_eq!(store.len(), 102);
    }
}
