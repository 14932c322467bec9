//! SQLite-backed record store.
//!
//! Blogs are handed out with their owner expanded (without the owner's own
//! blog list); users are handed out with their blogs expanded (without each
//! blog's owner). Listings come back in insertion order, which the
//! aggregate statistics rely on for tie-breaking.

pub mod schema;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bloglist_core::{BlogRecord, ObjectId, Ref, UserRecord};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

/// Errors raised by the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with the same username already exists.
    #[error("username must be unique")]
    DuplicateUsername,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored comments could not be encoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Fields of a blog about to be created.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: u64,
    pub owner: Option<ObjectId>,
}

/// Replacement content for an existing blog. Owner and comments are kept.
#[derive(Debug, Clone)]
pub struct BlogUpdate {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: u64,
}

/// Fields of a user about to be registered.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub adult: bool,
}

/// A user together with their stored password hash, for login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: UserRecord,
    pub password_hash: String,
}

const BLOG_SELECT: &str = "SELECT b.id, b.title, b.author, b.url, b.likes, b.comments,
        u.id, u.username, u.name, u.adult
    FROM blogs b
    LEFT JOIN users u ON u.id = b.user_id";

/// Shared handle to the SQLite database.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ───────────────────────────────────────────────────────────────────
    // Blogs
    // ───────────────────────────────────────────────────────────────────

    pub fn list_blogs(&self) -> Result<Vec<BlogRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{BLOG_SELECT} ORDER BY b.rowid"))?;
        let blogs = stmt
            .query_map([], blog_with_owner)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(blogs)
    }

    pub fn get_blog(&self, id: ObjectId) -> Result<Option<BlogRecord>> {
        let conn = self.conn.lock();
        fetch_blog(&conn, id)
    }

    pub fn insert_blog(&self, blog: NewBlog) -> Result<BlogRecord> {
        let id = ObjectId::new();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO blogs (id, title, author, url, likes, comments, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, '[]', ?6)",
            params![
                id.to_string(),
                blog.title,
                blog.author,
                blog.url,
                blog.likes,
                blog.owner.map(|owner| owner.to_string()),
            ],
        )?;
        fetch_blog(&conn, id)?.ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Replace a blog's content. Returns `None` when the blog does not exist.
    pub fn replace_blog(&self, id: ObjectId, update: BlogUpdate) -> Result<Option<BlogRecord>> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE blogs SET title = ?2, author = ?3, url = ?4, likes = ?5 WHERE id = ?1",
            params![
                id.to_string(),
                update.title,
                update.author,
                update.url,
                update.likes
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        fetch_blog(&conn, id)
    }

    /// Append a comment and return the blog's full comment list, or `None`
    /// when the blog does not exist.
    pub fn add_comment(&self, id: ObjectId, comment: &str) -> Result<Option<Vec<String>>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let stored: Option<String> = tx
            .query_row(
                "SELECT comments FROM blogs WHERE id = ?1",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            return Ok(None);
        };

        let mut comments: Vec<String> = serde_json::from_str(&stored)?;
        comments.push(comment.to_string());
        tx.execute(
            "UPDATE blogs SET comments = ?2 WHERE id = ?1",
            params![id.to_string(), serde_json::to_string(&comments)?],
        )?;
        tx.commit()?;

        Ok(Some(comments))
    }

    /// Delete a blog. Returns whether a row was removed.
    pub fn delete_blog(&self, id: ObjectId) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM blogs WHERE id = ?1", [id.to_string()])?;
        Ok(removed > 0)
    }

    // ───────────────────────────────────────────────────────────────────
    // Users
    // ───────────────────────────────────────────────────────────────────

    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        let conn = self.conn.lock();
        let mut owned = owned_blogs(&conn, None)?;

        let mut stmt =
            conn.prepare("SELECT id, username, name, adult FROM users ORDER BY rowid")?;
        let mut users = stmt
            .query_map([], |row| user_columns(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for user in &mut users {
            user.blogs = Some(owned.remove(&user.id).unwrap_or_default());
        }
        Ok(users)
    }

    pub fn get_user(&self, id: ObjectId) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, username, name, adult FROM users WHERE id = ?1",
                [id.to_string()],
                |row| user_columns(row, 0),
            )
            .optional()?;

        let Some(mut user) = user else {
            return Ok(None);
        };
        let mut owned = owned_blogs(&conn, Some(id))?;
        user.blogs = Some(owned.remove(&id).unwrap_or_default());
        Ok(Some(user))
    }

    pub fn user_exists(&self, id: ObjectId) -> Result<bool> {
        let conn = self.conn.lock();
        let found = conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", [id.to_string()], |_| {
                Ok(())
            })
            .optional()?;
        Ok(found.is_some())
    }

    pub fn username_taken(&self, username: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let found = conn
            .query_row("SELECT 1 FROM users WHERE username = ?1", [username], |_| {
                Ok(())
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Look up a user and their password hash by username.
    pub fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                "SELECT id, username, name, adult, password_hash FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(Credentials {
                        user: user_columns(row, 0)?,
                        password_hash: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// Register a user. A new user owns no blogs yet.
    pub fn insert_user(&self, user: NewUser) -> Result<UserRecord> {
        let id = ObjectId::new();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, username, name, password_hash, adult)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                user.username,
                user.name,
                user.password_hash,
                user.adult
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
                StoreError::DuplicateUsername
            }
            other => StoreError::Sqlite(other),
        })?;

        Ok(UserRecord {
            id,
            username: user.username,
            name: user.name,
            adult: user.adult,
            blogs: Some(Vec::new()),
        })
    }
}

fn fetch_blog(conn: &Connection, id: ObjectId) -> Result<Option<BlogRecord>> {
    let blog = conn
        .query_row(
            &format!("{BLOG_SELECT} WHERE b.id = ?1"),
            [id.to_string()],
            blog_with_owner,
        )
        .optional()?;
    Ok(blog)
}

/// Blogs grouped by owner, each without its owner reference.
fn owned_blogs(
    conn: &Connection,
    owner: Option<ObjectId>,
) -> rusqlite::Result<HashMap<ObjectId, Vec<Ref<BlogRecord>>>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, author, url, likes, comments, user_id
         FROM blogs
         WHERE user_id IS NOT NULL AND (?1 IS NULL OR user_id = ?1)
         ORDER BY rowid",
    )?;
    let rows = stmt.query_map([owner.map(|id| id.to_string())], |row| {
        Ok((parse_id(row, 6)?, blog_columns(row)?))
    })?;

    let mut grouped: HashMap<ObjectId, Vec<Ref<BlogRecord>>> = HashMap::new();
    for row in rows {
        let (owner, blog) = row?;
        grouped
            .entry(owner)
            .or_default()
            .push(Ref::Expanded(Box::new(blog)));
    }
    Ok(grouped)
}

/// Map a [`BLOG_SELECT`] row.
fn blog_with_owner(row: &Row<'_>) -> rusqlite::Result<BlogRecord> {
    let mut blog = blog_columns(row)?;
    let owner_id: Option<String> = row.get(6)?;
    if owner_id.is_some() {
        blog.owner = Some(Ref::Expanded(Box::new(user_columns(row, 6)?)));
    }
    Ok(blog)
}

/// Map blog columns 0..=5 (id, title, author, url, likes, comments).
fn blog_columns(row: &Row<'_>) -> rusqlite::Result<BlogRecord> {
    let comments: String = row.get(5)?;
    let comments: Vec<String> = serde_json::from_str(&comments)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(BlogRecord {
        id: parse_id(row, 0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        url: row.get(3)?,
        likes: row.get(4)?,
        comments: Some(comments),
        owner: None,
    })
}

/// Map user columns starting at `start` (id, username, name, adult).
fn user_columns(row: &Row<'_>, start: usize) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: parse_id(row, start)?,
        username: row.get(start + 1)?,
        name: row.get(start + 2)?,
        adult: row.get(start + 3)?,
        blogs: None,
    })
}

fn parse_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<ObjectId> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(store: &Store, username: &str) -> UserRecord {
        store
            .insert_user(NewUser {
                username: username.to_string(),
                name: format!("{username} name"),
                password_hash: "hash".to_string(),
                adult: true,
            })
            .unwrap()
    }

    fn new_blog(store: &Store, title: &str, likes: u64, owner: Option<ObjectId>) -> BlogRecord {
        store
            .insert_blog(NewBlog {
                title: title.to_string(),
                author: "Author".to_string(),
                url: format!("https://example.com/{title}"),
                likes,
                owner,
            })
            .unwrap()
    }

    #[test]
    fn insert_and_get_blog_expands_owner() {
        let store = Store::open_in_memory().unwrap();
        let user = new_user(&store, "root");
        let blog = new_blog(&store, "first", 3, Some(user.id));

        let fetched = store.get_blog(blog.id).unwrap().unwrap();
        assert_eq!(fetched, blog);
        assert_eq!(fetched.comments, Some(Vec::new()));
        match fetched.owner {
            Some(Ref::Expanded(owner)) => {
                assert_eq!(owner.id, user.id);
                assert_eq!(owner.username, "root");
                assert_eq!(owner.blogs, None);
            }
            other => panic!("unexpected owner {other:?}"),
        }
    }

    #[test]
    fn ownerless_blog_has_no_owner() {
        let store = Store::open_in_memory().unwrap();
        let blog = new_blog(&store, "legacy", 0, None);
        assert_eq!(store.get_blog(blog.id).unwrap().unwrap().owner, None);
    }

    #[test]
    fn get_missing_blog_is_none() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_blog(ObjectId::new()).unwrap().is_none());
    }

    #[test]
    fn list_blogs_keeps_insertion_order() {
        let store = Store::open_in_memory().unwrap();
        let titles = ["c", "a", "b"];
        for title in titles {
            new_blog(&store, title, 1, None);
        }
        let listed: Vec<String> = store
            .list_blogs()
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(listed, titles);
    }

    #[test]
    fn replace_blog_keeps_owner_and_comments() {
        let store = Store::open_in_memory().unwrap();
        let user = new_user(&store, "owner");
        let blog = new_blog(&store, "old", 1, Some(user.id));
        store.add_comment(blog.id, "hello").unwrap();

        let updated = store
            .replace_blog(
                blog.id,
                BlogUpdate {
                    title: "new".to_string(),
                    author: "Someone".to_string(),
                    url: "https://example.com/new".to_string(),
                    likes: 9,
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.likes, 9);
        assert_eq!(updated.comments, Some(vec!["hello".to_string()]));
        assert_eq!(updated.owner.map(|o| o.id()), Some(user.id));
    }

    #[test]
    fn replace_missing_blog_is_none() {
        let store = Store::open_in_memory().unwrap();
        let result = store
            .replace_blog(
                ObjectId::new(),
                BlogUpdate {
                    title: "t".to_string(),
                    author: String::new(),
                    url: "u".to_string(),
                    likes: 1,
                },
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn comments_append_in_order() {
        let store = Store::open_in_memory().unwrap();
        let blog = new_blog(&store, "c", 0, None);
        store.add_comment(blog.id, "one").unwrap();
        let comments = store.add_comment(blog.id, "two").unwrap().unwrap();
        assert_eq!(comments, vec!["one".to_string(), "two".to_string()]);
        assert!(store.add_comment(ObjectId::new(), "x").unwrap().is_none());
    }

    #[test]
    fn delete_blog_reports_removal() {
        let store = Store::open_in_memory().unwrap();
        let blog = new_blog(&store, "gone", 0, None);
        assert!(store.delete_blog(blog.id).unwrap());
        assert!(!store.delete_blog(blog.id).unwrap());
        assert!(store.list_blogs().unwrap().is_empty());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        new_user(&store, "dup");
        let err = store
            .insert_user(NewUser {
                username: "dup".to_string(),
                name: String::new(),
                password_hash: "h".to_string(),
                adult: false,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
        assert!(store.username_taken("dup").unwrap());
        assert!(!store.username_taken("other").unwrap());
    }

    #[test]
    fn users_list_their_blogs_without_owner() {
        let store = Store::open_in_memory().unwrap();
        let alice = new_user(&store, "alice");
        let bob = new_user(&store, "bob");
        let a1 = new_blog(&store, "a1", 1, Some(alice.id));
        new_blog(&store, "free", 1, None);
        let a2 = new_blog(&store, "a2", 2, Some(alice.id));

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, alice.id);

        let alice_blogs = users[0].blogs.as_ref().unwrap();
        let ids: Vec<ObjectId> = alice_blogs.iter().map(Ref::id).collect();
        assert_eq!(ids, vec![a1.id, a2.id]);
        for blog in alice_blogs {
            let Ref::Expanded(blog) = blog else {
                panic!("expected expanded blog");
            };
            assert_eq!(blog.owner, None);
        }

        assert_eq!(users[1].id, bob.id);
        assert_eq!(users[1].blogs, Some(Vec::new()));

        let fetched = store.get_user(alice.id).unwrap().unwrap();
        assert_eq!(fetched.blogs.unwrap().len(), 2);
        assert!(store.get_user(ObjectId::new()).unwrap().is_none());
    }

    #[test]
    fn credentials_lookup() {
        let store = Store::open_in_memory().unwrap();
        let user = new_user(&store, "login");
        let creds = store.find_credentials("login").unwrap().unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "hash");
        assert!(store.find_credentials("nobody").unwrap().is_none());
        assert!(store.user_exists(user.id).unwrap());
        assert!(!store.user_exists(ObjectId::new()).unwrap());
    }
}
