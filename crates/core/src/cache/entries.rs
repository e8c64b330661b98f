//! SQLite implementation of [`CacheStorage`].
//!
//! Each store is a row in `stores`; entries hang off it with `ON DELETE CASCADE`,
//! so dropping a store is a single statement.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::identity::RequestIdentity;
use super::snapshot::{ResponseKind, ResponseSnapshot};
use super::storage::CacheStorage;
use crate::Error;

impl CacheDb {
    /// Number of entries per store, ordered by store name.
    pub async fn entry_counts(&self) -> Result<Vec<(String, u64)>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<(String, u64)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, COUNT(e.key_hash) FROM stores s
                     LEFT JOIN entries e ON e.store = s.name
                     GROUP BY s.name ORDER BY s.name",
                )?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, store: &str) -> Result<(), Error> {
        let store = store.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![store, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_store(&self, store: &str) -> Result<bool, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![store])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, store: &str, identity: &RequestIdentity, response: &ResponseSnapshot) -> Result<(), Error> {
        let store = store.to_string();
        let key_hash = identity.cache_key();
        let method = identity.method.clone();
        let url = identity.url.clone();
        let vary_json = serde_json::to_string(&identity.vary)?;
        let headers_json = serde_json::to_string(&response.headers)?;
        let status = response.status;
        let kind = response.kind.as_str();
        let body = response.body.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![&store, &now],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                        store, key_hash, method, url, vary_json,
                        status, kind, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    ON CONFLICT(store, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        vary_json = excluded.vary_json,
                        status = excluded.status,
                        kind = excluded.kind,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![&store, &key_hash, &method, &url, &vary_json, status, kind, &headers_json, &body[..], &now],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn lookup(&self, store: &str, identity: &RequestIdentity) -> Result<Option<ResponseSnapshot>, Error> {
        let store = store.to_string();
        let key_hash = identity.cache_key();
        self.conn
            .call(move |conn| -> Result<Option<ResponseSnapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, kind, headers_json, body FROM entries
                     WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                });

                let (status, kind, headers_json, body) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let kind = kind.parse::<ResponseKind>().map_err(Error::Serialization)?;
                let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
                Ok(Some(ResponseSnapshot::new(status, kind, headers, body)))
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self, store: &str) -> Result<Vec<RequestIdentity>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestIdentity>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, vary_json FROM entries
                     WHERE store = ?1 ORDER BY url, method",
                )?;
                let rows = stmt
                    .query_map(params![store], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(method, url, vary_json)| -> Result<RequestIdentity, Error> {
                        let vary = serde_json::from_str(&vary_json)?;
                        Ok(RequestIdentity { method, url, vary })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, store: &str, identity: &RequestIdentity) -> Result<bool, Error> {
        let store = store.to_string();
        let key_hash = identity.cache_key();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE store = ?1 AND key_hash = ?2",
                    params![store, key_hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
