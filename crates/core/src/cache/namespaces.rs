//! Namespace and entry operations for the SQLite store.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::Utc;
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use super::storage::CacheStorage;
use crate::Error;
use crate::http::{RequestKey, Response};

fn ensure_namespace(conn: &rusqlite::Connection, namespace: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
        params![namespace, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn upsert_entry(
    conn: &rusqlite::Connection, namespace: &str, key: &RequestKey, response: &Response, stored_at: &str,
) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&response.headers)?;
    conn.execute(
        "INSERT INTO entries (namespace, key_hash, method, url, status, status_text, headers_json, body, stored_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(namespace, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            namespace,
            key.hash(),
            &key.method,
            &key.url,
            response.status as i64,
            &response.status_text,
            headers_json,
            response.body.as_ref(),
            stored_at,
        ],
    )?;
    Ok(())
}

#[async_trait::async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> { ensure_namespace(conn, &namespace) })
            .await
            .map_err(Error::from)
    }

    async fn has(&self, namespace: &str) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM namespaces WHERE name = ?1)",
                    params![namespace],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![namespace])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let key = key.clone();
        let response = response.clone();
        let stored_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_namespace(&tx, &namespace)?;
                upsert_entry(&tx, &namespace, &key, &response, &stored_at)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, namespace: &str, entries: Vec<(RequestKey, Response)>) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let stored_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_namespace(&tx, &namespace)?;
                for (key, response) in &entries {
                    upsert_entry(&tx, &namespace, key, response, &stored_at)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn match_in(&self, namespace: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        let namespace = namespace.to_string();
        let key_hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, status_text, headers_json, body
                    FROM entries WHERE namespace = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![namespace, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                    ))
                });

                match result {
                    Ok((url, status, status_text, headers_json, body)) => {
                        let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)?;
                        Ok(Some(Response {
                            url,
                            status: u16::try_from(status).unwrap_or_default(),
                            status_text,
                            headers,
                            body: Bytes::from(body),
                        }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn entry_keys(&self, namespace: &str) -> Result<Vec<RequestKey>, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestKey>, Error> {
                let mut stmt = conn.prepare("SELECT method, url FROM entries WHERE namespace = ?1 ORDER BY url ASC")?;
                let keys = stmt
                    .query_map(params![namespace], |row| Ok(RequestKey { method: row.get(0)?, url: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn key(path: &str) -> RequestKey {
        RequestKey::new("GET", &Url::parse("https://example.com").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let response = Response::new("https://example.com/app.js", 200, "let a = 1;")
            .with_header("content-type", "text/javascript");

        db.put("portfolio-runtime-v1", &key("/app.js"), &response).await.unwrap();

        let stored = db.match_in("portfolio-runtime-v1", &key("/app.js")).await.unwrap().unwrap();
        assert_eq!(stored, response);
        assert!(db.has("portfolio-runtime-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.match_in("nope", &key("/")).await.unwrap().is_none());
        assert!(db.entry_keys("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put("rt", &key("/a"), &Response::new("https://example.com/a", 200, "old"))
            .await
            .unwrap();
        db.put("rt", &key("/a"), &Response::new("https://example.com/a", 200, "new"))
            .await
            .unwrap();

        let stored = db.match_in("rt", &key("/a")).await.unwrap().unwrap();
        assert_eq!(stored.body.as_ref(), b"new");
        assert_eq!(db.entry_keys("rt").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_keys_in_creation_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open("portfolio-cache-v1").await.unwrap();
        db.open("portfolio-runtime-v1").await.unwrap();
        db.open("portfolio-cache-v1").await.unwrap();

        assert_eq!(db.keys().await.unwrap(), vec!["portfolio-cache-v1", "portfolio-runtime-v1"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_all(
            "portfolio-cache-v1",
            vec![
                (key("/"), Response::new("https://example.com/", 200, "<html>")),
                (key("/favicon.svg"), Response::new("https://example.com/favicon.svg", 200, "<svg>")),
            ],
        )
        .await
        .unwrap();

        assert!(db.delete("portfolio-cache-v1").await.unwrap());
        assert!(!db.delete("portfolio-cache-v1").await.unwrap());
        assert!(!db.has("portfolio-cache-v1").await.unwrap());

        let orphans: i64 = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_put_all_and_entry_keys() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_all(
            "static",
            vec![
                (key("/index.html"), Response::new("https://example.com/index.html", 200, "<html>")),
                (key("/"), Response::new("https://example.com/", 200, "<html>")),
            ],
        )
        .await
        .unwrap();

        let keys = db.entry_keys("static").await.unwrap();
        assert_eq!(keys, vec![key("/"), key("/index.html")]);
    }
}
