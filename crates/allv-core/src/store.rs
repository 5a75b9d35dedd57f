//! In-memory users/posts directory with an optional JSON snapshot on disk.

use crate::config::AppConfig;
use crate::error::{AllvError, Result};
use crate::types::{Post, PostInput, User, UserInput, UserSummary};
use crate::validation::{validate_post, validate_user};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;

/// On-disk layout of the snapshot file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    posts: Vec<Post>,
}

/// How to revert an in-memory mutation whose save failed.
enum Undo {
    RemoveUser(String),
    RestoreUser(User),
    RestoreUserWithPosts(User, Vec<Post>),
    RemovePost(String),
    RestorePost(Post),
    RestoreAll {
        users: HashMap<String, User>,
        posts: HashMap<String, Post>,
    },
}

/// `directory.json` -> `directory.json.tmp`, in the same directory.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Users and their posts.
pub struct Directory {
    users: HashMap<String, User>,
    posts: HashMap<String, Post>,
    data_file: Option<PathBuf>,
    auto_save: bool,
}

impl Directory {
    /// An empty directory that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            users: HashMap::new(),
            posts: HashMap::new(),
            data_file: None,
            auto_save: false,
        }
    }

    /// Open the snapshot named by the configuration, creating nothing until
    /// the first save.
    pub fn open(config: &AppConfig) -> Result<Self> {
        Self::open_at(config.data_file(), config.storage.auto_save)
    }

    /// Open a snapshot at a specific path.
    pub fn open_at(path: impl Into<PathBuf>, auto_save: bool) -> Result<Self> {
        let path = path.into();
        let mut directory = Self {
            users: HashMap::new(),
            posts: HashMap::new(),
            data_file: Some(path.clone()),
            auto_save,
        };

        if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&json)?;
            directory.restore(snapshot);
            tracing::debug!(
                path = %path.display(),
                users = directory.users.len(),
                posts = directory.posts.len(),
                "Loaded directory snapshot"
            );
        }

        Ok(directory)
    }

    /// Open the configured snapshot (async / non-blocking).
    pub async fn open_async(config: &AppConfig) -> Result<Self> {
        Self::open_at_async(config.data_file(), config.storage.auto_save).await
    }

    /// Open a snapshot at a specific path (async / non-blocking).
    pub async fn open_at_async(path: impl Into<PathBuf>, auto_save: bool) -> Result<Self> {
        let path = path.into();
        let mut directory = Self {
            users: HashMap::new(),
            posts: HashMap::new(),
            data_file: Some(path.clone()),
            auto_save,
        };

        if async_fs::try_exists(&path).await.unwrap_or(false) {
            let json = async_fs::read_to_string(&path).await?;
            let snapshot: Snapshot = serde_json::from_str(&json)?;
            directory.restore(snapshot);
            tracing::debug!(
                path = %path.display(),
                users = directory.users.len(),
                posts = directory.posts.len(),
                "Loaded directory snapshot"
            );
        }

        Ok(directory)
    }

    fn restore(&mut self, snapshot: Snapshot) {
        for user in snapshot.users {
            self.users.insert(user.id.clone(), user);
        }
        for post in snapshot.posts {
            if self.users.contains_key(&post.author_id) {
                self.posts.insert(post.id.clone(), post);
            } else {
                tracing::warn!(post_id = %post.id, author_id = %post.author_id, "Dropping orphaned post");
            }
        }
    }

    /// Write the snapshot to its file. No-op for in-memory directories.
    pub fn save(&self) -> Result<()> {
        match &self.data_file {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    /// Write the snapshot to an explicit path.
    ///
    /// The JSON lands in a sibling temp file that is renamed over the target;
    /// the snapshot on disk is never half-written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.snapshot_json()?;
        let tmp = temp_path(path);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Write the snapshot to its file (async / non-blocking).
    ///
    /// Use this from async contexts (e.g. inside a `tokio::sync::RwLock`
    /// guard) to avoid blocking the Tokio runtime on disk I/O.
    pub async fn save_async(&self) -> Result<()> {
        match &self.data_file {
            Some(path) => self.save_to_async(path).await,
            None => Ok(()),
        }
    }

    /// Write the snapshot to an explicit path (async / non-blocking).
    pub async fn save_to_async(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = self.snapshot_json()?;
        let tmp = temp_path(path);
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, path).await?;
        Ok(())
    }

    fn snapshot_json(&self) -> Result<String> {
        let mut snapshot = Snapshot {
            users: self.users.values().cloned().collect(),
            posts: self.posts.values().cloned().collect(),
        };
        snapshot
            .users
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        snapshot
            .posts
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Save after a mutation. On failure the mutation is undone before the
    /// error is returned.
    fn commit(&mut self, undo: Undo) -> Result<()> {
        if !self.auto_save {
            return Ok(());
        }
        if let Err(err) = self.save() {
            self.rollback(undo, &err);
            return Err(err);
        }
        Ok(())
    }

    async fn commit_async(&mut self, undo: Undo) -> Result<()> {
        if !self.auto_save {
            return Ok(());
        }
        if let Err(err) = self.save_async().await {
            self.rollback(undo, &err);
            return Err(err);
        }
        Ok(())
    }

    fn rollback(&mut self, undo: Undo, err: &AllvError) {
        tracing::warn!(error = %err, "Snapshot save failed, reverting change");
        match undo {
            Undo::RemoveUser(id) => {
                self.users.remove(&id);
            }
            Undo::RestoreUser(user) => {
                self.users.insert(user.id.clone(), user);
            }
            Undo::RestoreUserWithPosts(user, posts) => {
                self.users.insert(user.id.clone(), user);
                for post in posts {
                    self.posts.insert(post.id.clone(), post);
                }
            }
            Undo::RemovePost(id) => {
                self.posts.remove(&id);
            }
            Undo::RestorePost(post) => {
                self.posts.insert(post.id.clone(), post);
            }
            Undo::RestoreAll { users, posts } => {
                self.users = users;
                self.posts = posts;
            }
        }
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    // ── Users ───────────────────────────────────────────────────────────

    /// All users, newest first, with their post counts.
    pub fn list_users(&self) -> Vec<UserSummary> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in self.posts.values() {
            *counts.entry(post.author_id.as_str()).or_insert(0) += 1;
        }

        let mut users: Vec<UserSummary> = self
            .users
            .values()
            .map(|u| UserSummary {
                id: u.id.clone(),
                name: u.name.clone(),
                email: u.email.clone(),
                created_at: u.created_at,
                posts_count: counts.get(u.id.as_str()).copied().unwrap_or(0),
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        users
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn create_user(&mut self, input: &UserInput) -> Result<User> {
        let user = self.apply_create_user(input)?;
        self.commit(Undo::RemoveUser(user.id.clone()))?;
        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Create a user (async / non-blocking save).
    pub async fn create_user_async(&mut self, input: &UserInput) -> Result<User> {
        let user = self.apply_create_user(input)?;
        self.commit_async(Undo::RemoveUser(user.id.clone())).await?;
        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    fn apply_create_user(&mut self, input: &UserInput) -> Result<User> {
        let valid = validate_user(input)?;
        let user = User::new(valid.name, valid.email);
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn update_user(&mut self, id: &str, input: &UserInput) -> Result<User> {
        let (user, previous) = self.apply_update_user(id, input)?;
        self.commit(Undo::RestoreUser(previous))?;
        tracing::info!(user_id = %id, "Updated user");
        Ok(user)
    }

    /// Update a user (async / non-blocking save).
    pub async fn update_user_async(&mut self, id: &str, input: &UserInput) -> Result<User> {
        let (user, previous) = self.apply_update_user(id, input)?;
        self.commit_async(Undo::RestoreUser(previous)).await?;
        tracing::info!(user_id = %id, "Updated user");
        Ok(user)
    }

    fn apply_update_user(&mut self, id: &str, input: &UserInput) -> Result<(User, User)> {
        let valid = validate_user(input)?;
        let user = self
            .users
            .get_mut(id)
            .ok_or_else(|| AllvError::user_not_found(id))?;
        let previous = user.clone();
        user.name = valid.name;
        user.email = valid.email;
        Ok((user.clone(), previous))
    }

    /// Remove a user along with every post they wrote.
    pub fn delete_user(&mut self, id: &str) -> Result<()> {
        let undo = self.apply_delete_user(id)?;
        self.commit(undo)
    }

    /// Remove a user and their posts (async / non-blocking save).
    pub async fn delete_user_async(&mut self, id: &str) -> Result<()> {
        let undo = self.apply_delete_user(id)?;
        self.commit_async(undo).await
    }

    fn apply_delete_user(&mut self, id: &str) -> Result<Undo> {
        let user = self
            .users
            .remove(id)
            .ok_or_else(|| AllvError::user_not_found(id))?;
        let post_ids: Vec<String> = self
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id.clone())
            .collect();
        let removed: Vec<Post> = post_ids
            .iter()
            .filter_map(|post_id| self.posts.remove(post_id))
            .collect();
        tracing::info!(user_id = %id, posts_removed = removed.len(), "Deleted user");
        Ok(Undo::RestoreUserWithPosts(user, removed))
    }

    /// Insert a fully-formed user, bypassing validation. Used by the seeder.
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    // ── Posts ───────────────────────────────────────────────────────────

    /// A user's posts, newest first.
    pub fn list_posts_for(&self, user_id: &str) -> Result<Vec<Post>> {
        if !self.users.contains_key(user_id) {
            return Err(AllvError::user_not_found(user_id));
        }
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(posts)
    }

    pub fn create_post(&mut self, user_id: &str, input: &PostInput) -> Result<Post> {
        let post = self.apply_create_post(user_id, input)?;
        self.commit(Undo::RemovePost(post.id.clone()))?;
        tracing::info!(user_id = %user_id, post_id = %post.id, "Created post");
        Ok(post)
    }

    /// Create a post (async / non-blocking save).
    pub async fn create_post_async(&mut self, user_id: &str, input: &PostInput) -> Result<Post> {
        let post = self.apply_create_post(user_id, input)?;
        self.commit_async(Undo::RemovePost(post.id.clone())).await?;
        tracing::info!(user_id = %user_id, post_id = %post.id, "Created post");
        Ok(post)
    }

    fn apply_create_post(&mut self, user_id: &str, input: &PostInput) -> Result<Post> {
        let valid = validate_post(input)?;
        if !self.users.contains_key(user_id) {
            return Err(AllvError::user_not_found(user_id));
        }
        let post = Post::new(user_id, valid.title, valid.body);
        self.posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    pub fn update_post(&mut self, user_id: &str, post_id: &str, input: &PostInput) -> Result<Post> {
        let (post, previous) = self.apply_update_post(user_id, post_id, input)?;
        self.commit(Undo::RestorePost(previous))?;
        tracing::info!(user_id = %user_id, post_id = %post_id, "Updated post");
        Ok(post)
    }

    /// Update a post (async / non-blocking save).
    pub async fn update_post_async(
        &mut self,
        user_id: &str,
        post_id: &str,
        input: &PostInput,
    ) -> Result<Post> {
        let (post, previous) = self.apply_update_post(user_id, post_id, input)?;
        self.commit_async(Undo::RestorePost(previous)).await?;
        tracing::info!(user_id = %user_id, post_id = %post_id, "Updated post");
        Ok(post)
    }

    fn apply_update_post(
        &mut self,
        user_id: &str,
        post_id: &str,
        input: &PostInput,
    ) -> Result<(Post, Post)> {
        let valid = validate_post(input)?;
        let post = self
            .posts
            .get_mut(post_id)
            .filter(|p| p.author_id == user_id)
            .ok_or_else(|| AllvError::post_not_found(post_id))?;
        let previous = post.clone();
        post.title = valid.title;
        post.body = valid.body;
        Ok((post.clone(), previous))
    }

    pub fn delete_post(&mut self, user_id: &str, post_id: &str) -> Result<()> {
        let removed = self.apply_delete_post(user_id, post_id)?;
        self.commit(Undo::RestorePost(removed))?;
        tracing::info!(user_id = %user_id, post_id = %post_id, "Deleted post");
        Ok(())
    }

    /// Delete a post (async / non-blocking save).
    pub async fn delete_post_async(&mut self, user_id: &str, post_id: &str) -> Result<()> {
        let removed = self.apply_delete_post(user_id, post_id)?;
        self.commit_async(Undo::RestorePost(removed)).await?;
        tracing::info!(user_id = %user_id, post_id = %post_id, "Deleted post");
        Ok(())
    }

    fn apply_delete_post(&mut self, user_id: &str, post_id: &str) -> Result<Post> {
        let owned = self
            .posts
            .get(post_id)
            .is_some_and(|p| p.author_id == user_id);
        if !owned {
            return Err(AllvError::post_not_found(post_id));
        }
        self.posts
            .remove(post_id)
            .ok_or_else(|| AllvError::post_not_found(post_id))
    }

    /// Insert a fully-formed post, bypassing validation. Used by the seeder.
    pub fn insert_post(&mut self, post: Post) -> Result<()> {
        if !self.users.contains_key(&post.author_id) {
            return Err(AllvError::user_not_found(post.author_id));
        }
        self.posts.insert(post.id.clone(), post);
        Ok(())
    }

    /// Drop every user and post.
    pub fn clear(&mut self) -> Result<()> {
        let users = std::mem::take(&mut self.users);
        let posts = std::mem::take(&mut self.posts);
        self.commit(Undo::RestoreAll { users, posts })
    }

    // ── Chart inputs ────────────────────────────────────────────────────

    /// Creation instants of every post.
    pub fn post_timestamps(&self) -> Vec<DateTime<Utc>> {
        self.posts.values().map(|p| p.created_at).collect()
    }

    /// Creation instants of every post, paired with the author id.
    pub fn post_timestamps_by_author(&self) -> Vec<(DateTime<Utc>, String)> {
        self.posts
            .values()
            .map(|p| (p.created_at, p.author_id.clone()))
            .collect()
    }

    /// Author id -> display name.
    pub fn author_names(&self) -> HashMap<String, String> {
        self.users
            .values()
            .map(|u| (u.id.clone(), u.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn user_input(name: &str) -> UserInput {
        UserInput {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn post_input(title: &str) -> PostInput {
        PostInput {
            title: title.into(),
            body: "body".into(),
        }
    }

    #[test]
    fn test_create_and_list_users() {
        let mut dir = Directory::in_memory();
        let base = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        dir.insert_user(User::created_at("Old", "old@example.com", base));
        dir.insert_user(User::created_at("New", "new@example.com", base + Duration::days(1)));

        let users = dir.list_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "New");
        assert_eq!(users[1].name, "Old");
        assert_eq!(users[0].posts_count, 0);
    }

    #[test]
    fn test_create_user_rejects_invalid_input() {
        let mut dir = Directory::in_memory();
        let err = dir
            .create_user(&UserInput {
                name: "".into(),
                email: "nope".into(),
            })
            .unwrap_err();
        assert!(matches!(err, AllvError::Validation(_)));
        assert_eq!(dir.user_count(), 0);
    }

    #[test]
    fn test_update_missing_user() {
        let mut dir = Directory::in_memory();
        let err = dir.update_user("missing", &user_input("Alex")).unwrap_err();
        assert!(matches!(err, AllvError::NotFound { kind: "User", .. }));
    }

    #[test]
    fn test_post_lifecycle() {
        let mut dir = Directory::in_memory();
        let user = dir.create_user(&user_input("Priya")).unwrap();
        let post = dir.create_post(&user.id, &post_input("Hello world")).unwrap();

        assert_eq!(dir.list_users()[0].posts_count, 1);

        let updated = dir
            .update_post(&user.id, &post.id, &post_input("Hello again"))
            .unwrap();
        assert_eq!(updated.title, "Hello again");
        assert_eq!(dir.list_posts_for(&user.id).unwrap()[0].title, "Hello again");

        dir.delete_post(&user.id, &post.id).unwrap();
        assert!(dir.list_posts_for(&user.id).unwrap().is_empty());
    }

    #[test]
    fn test_post_must_belong_to_user() {
        let mut dir = Directory::in_memory();
        let alice = dir.create_user(&user_input("Alice")).unwrap();
        let bob = dir.create_user(&user_input("Bob")).unwrap();
        let post = dir.create_post(&alice.id, &post_input("Mine")).unwrap();

        assert!(dir.update_post(&bob.id, &post.id, &post_input("Stolen")).is_err());
        assert!(dir.delete_post(&bob.id, &post.id).is_err());
        assert_eq!(dir.post_count(), 1);
    }

    #[test]
    fn test_create_post_for_missing_user() {
        let mut dir = Directory::in_memory();
        let err = dir.create_post("ghost", &post_input("Boo")).unwrap_err();
        assert!(matches!(err, AllvError::NotFound { kind: "User", .. }));
    }

    #[test]
    fn test_delete_user_cascades_posts() {
        let mut dir = Directory::in_memory();
        let alice = dir.create_user(&user_input("Alice")).unwrap();
        let bob = dir.create_user(&user_input("Bob")).unwrap();
        dir.create_post(&alice.id, &post_input("a1")).unwrap();
        dir.create_post(&alice.id, &post_input("a2")).unwrap();
        dir.create_post(&bob.id, &post_input("b1")).unwrap();

        dir.delete_user(&alice.id).unwrap();
        assert_eq!(dir.user_count(), 1);
        assert_eq!(dir.post_count(), 1);
        assert!(dir.post_timestamps_by_author().iter().all(|(_, a)| *a == bob.id));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("directory.json");

        let user_id = {
            let mut dir = Directory::open_at(&path, true).unwrap();
            let user = dir.create_user(&user_input("Samir")).unwrap();
            dir.create_post(&user.id, &post_input("Persisted")).unwrap();
            user.id
        };

        let dir = Directory::open_at(&path, true).unwrap();
        assert_eq!(dir.user_count(), 1);
        assert_eq!(dir.get_user(&user_id).unwrap().name, "Samir");
        assert_eq!(dir.list_posts_for(&user_id).unwrap()[0].title, "Persisted");
    }

    #[test]
    fn test_no_auto_save_leaves_disk_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("directory.json");

        let mut dir = Directory::open_at(&path, false).unwrap();
        dir.create_user(&user_input("Elena")).unwrap();
        assert!(!path.exists());

        dir.save().unwrap();
        assert!(path.exists());
    }

    /// A snapshot path whose parent is a regular file, so every save fails.
    fn unwritable_path(tmp: &tempfile::TempDir) -> PathBuf {
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        blocker.join("directory.json")
    }

    #[test]
    fn test_failed_save_reverts_create() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut dir = Directory::open_at(unwritable_path(&tmp), true).unwrap();

        assert!(dir.create_user(&user_input("Alex")).is_err());
        assert_eq!(dir.user_count(), 0);

        let user = User::new("Alex", "alex@example.com");
        let user_id = user.id.clone();
        dir.insert_user(user);
        assert!(dir.create_post(&user_id, &post_input("Lost")).is_err());
        assert_eq!(dir.post_count(), 0);
    }

    #[test]
    fn test_failed_save_reverts_updates_and_deletes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut dir = Directory::open_at(unwritable_path(&tmp), true).unwrap();
        let user = User::new("Alex", "alex@example.com");
        let user_id = user.id.clone();
        dir.insert_user(user);
        let post = Post::new(&user_id, "Original", "body");
        let post_id = post.id.clone();
        dir.insert_post(post).unwrap();

        assert!(dir.update_user(&user_id, &user_input("Renamed")).is_err());
        assert_eq!(dir.get_user(&user_id).unwrap().name, "Alex");

        assert!(dir.update_post(&user_id, &post_id, &post_input("Edited")).is_err());
        assert_eq!(dir.list_posts_for(&user_id).unwrap()[0].title, "Original");

        assert!(dir.delete_post(&user_id, &post_id).is_err());
        assert_eq!(dir.post_count(), 1);

        assert!(dir.delete_user(&user_id).is_err());
        assert_eq!(dir.user_count(), 1);
        assert_eq!(dir.list_posts_for(&user_id).unwrap().len(), 1);

        assert!(dir.clear().is_err());
        assert_eq!(dir.user_count(), 1);
        assert_eq!(dir.post_count(), 1);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("directory.json");

        let mut dir = Directory::open_at(&path, true).unwrap();
        dir.create_user(&user_input("Aisha")).unwrap();
        dir.create_user(&user_input("Jonas")).unwrap();

        assert!(!tmp.path().join("directory.json.tmp").exists());
        let snapshot: Snapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(snapshot.users.len(), 2);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let path = Path::new("/data/allv/directory.json");
        assert_eq!(temp_path(path), PathBuf::from("/data/allv/directory.json.tmp"));
    }

    #[tokio::test]
    async fn test_async_mutations_persist() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("directory.json");

        let user_id = {
            let mut dir = Directory::open_at_async(&path, true).await.unwrap();
            let user = dir.create_user_async(&user_input("Sofia")).await.unwrap();
            let post = dir
                .create_post_async(&user.id, &post_input("Draft"))
                .await
                .unwrap();
            dir.update_post_async(&user.id, &post.id, &post_input("Published"))
                .await
                .unwrap();
            dir.update_user_async(&user.id, &user_input("Sofia R"))
                .await
                .unwrap();
            user.id
        };

        let mut dir = Directory::open_at_async(&path, true).await.unwrap();
        assert_eq!(dir.get_user(&user_id).unwrap().name, "Sofia R");
        let posts = dir.list_posts_for(&user_id).unwrap();
        assert_eq!(posts[0].title, "Published");

        dir.delete_post_async(&user_id, &posts[0].id).await.unwrap();
        dir.delete_user_async(&user_id).await.unwrap();
        let reopened = Directory::open_at(&path, true).unwrap();
        assert_eq!(reopened.user_count(), 0);
        assert_eq!(reopened.post_count(), 0);
    }

    #[tokio::test]
    async fn test_async_failed_save_reverts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut dir = Directory::open_at_async(unwritable_path(&tmp), true)
            .await
            .unwrap();

        assert!(dir.create_user_async(&user_input("Noah")).await.is_err());
        assert_eq!(dir.user_count(), 0);
    }

    #[test]
    fn test_chart_inputs() {
        let mut dir = Directory::in_memory();
        let user = dir.create_user(&user_input("Noah")).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 9, 1, 8, 30, 0).unwrap();
        dir.insert_post(Post::created_at(&user.id, "t", "b", at)).unwrap();

        assert_eq!(dir.post_timestamps(), vec![at]);
        assert_eq!(dir.post_timestamps_by_author(), vec![(at, user.id.clone())]);
        assert_eq!(dir.author_names().get(&user.id).unwrap(), "Noah");
        assert!(dir.insert_post(Post::created_at("ghost", "t", "b", at)).is_err());
    }
}
