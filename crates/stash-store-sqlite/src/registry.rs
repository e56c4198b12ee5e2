//! [`SqliteVaults`] — the vault registry plus the handle cache that opens
//! per-vault databases on demand.

use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use stash_core::{store::VaultRegistry, vault::Vault};
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  encode::{RawVault, encode_dt},
  schema::{REGISTRY_SCHEMA, VAULT_SCHEMA},
  vault::SqliteVault,
};

fn vault_row(row: &rusqlite::Row) -> rusqlite::Result<RawVault> {
  Ok(RawVault {
    id:         row.get(0)?,
    name:       row.get(1)?,
    slug:       row.get(2)?,
    created_at: row.get(3)?,
  })
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// The vault catalog (one `index.db`) and a cache of open vault handles.
///
/// Cloning is cheap; all state is shared. The cache guarantees each vault's
/// database is opened and initialised at most once per process lifetime.
#[derive(Clone)]
pub struct SqliteVaults {
  conn:       tokio_rusqlite::Connection,
  vaults_dir: PathBuf,
  handles:    Arc<Mutex<HashMap<i64, SqliteVault>>>,
}

impl SqliteVaults {
  /// Open (or create) the registry at `<data_dir>/index.db`. Per-vault
  /// databases live under `<data_dir>/vaults/<slug>.db`.
  pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
    let data_dir = data_dir.as_ref();
    let vaults_dir = data_dir.join("vaults");
    fs::create_dir_all(&vaults_dir)?;

    let conn = tokio_rusqlite::Connection::open(data_dir.join("index.db")).await?;
    let vaults = Self {
      conn,
      vaults_dir,
      handles: Arc::new(Mutex::new(HashMap::new())),
    };
    vaults.init_schema().await?;
    Ok(vaults)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(REGISTRY_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The only place outside vault creation that translates a slug to a
  /// physical location.
  fn vault_db_path(&self, slug: &str) -> PathBuf {
    self.vaults_dir.join(format!("{slug}.db"))
  }

  async fn load_vault(&self, id: i64) -> Result<Vault> {
    let raw: Option<RawVault> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, slug, created_at FROM vaults WHERE id = ?1",
              rusqlite::params![id],
              vault_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::Core(stash_core::Error::VaultNotFound(id)))?
      .into_vault()
  }
}

// ─── VaultRegistry impl ──────────────────────────────────────────────────────

impl VaultRegistry for SqliteVaults {
  type Error = Error;
  type Handle = SqliteVault;

  async fn list_vaults(&self) -> Result<Vec<Vault>> {
    let raws: Vec<RawVault> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, slug, created_at FROM vaults
           ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
          .query_map([], vault_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVault::into_vault).collect()
  }

  async fn get_vault(&self, id: i64) -> Result<Vault> {
    self.load_vault(id).await
  }

  async fn get_vault_by_slug(&self, slug: String) -> Result<Vault> {
    let slug_db = slug.clone();
    let raw: Option<RawVault> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, slug, created_at FROM vaults WHERE slug = ?1",
              rusqlite::params![slug_db],
              vault_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::Core(stash_core::Error::SlugNotFound(slug)))?
      .into_vault()
  }

  async fn create_vault(&self, name: String, slug: String) -> Result<Vault> {
    let name = name.trim().to_owned();
    let slug = slug.trim().to_owned();
    if name.is_empty() || slug.is_empty() {
      return Err(Error::Core(stash_core::Error::EmptyNameOrSlug));
    }

    let now = Utc::now();
    let at_str = encode_dt(now);
    let path = self.vault_db_path(&slug);
    let name_db = name.clone();
    let slug_db = slug.clone();

    // Registry insert and physical provisioning run inside one registry
    // transaction on the connection's dedicated thread. A provisioning
    // failure rolls the row back, so a registry row never exists without a
    // store. A leftover database file without a row is unreachable and
    // gets reinitialised on the next attempt (the DDL is idempotent).
    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: bool = tx.query_row(
          "SELECT EXISTS(SELECT 1 FROM vaults WHERE slug = ?1)",
          rusqlite::params![slug_db],
          |r| r.get(0),
        )?;
        if taken {
          return Ok(Err(stash_core::Error::SlugTaken(slug_db)));
        }
        tx.execute(
          "INSERT INTO vaults (name, slug, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![name_db, slug_db, at_str],
        )?;
        let id = tx.last_insert_rowid();

        let vault_conn = rusqlite::Connection::open(&path)?;
        vault_conn.execute_batch(VAULT_SCHEMA)?;

        tx.commit()?;
        Ok(Ok(id))
      })
      .await?
      .map_err(Error::Core)?;

    Ok(Vault { id, name, slug, created_at: now })
  }

  async fn vault(&self, id: i64) -> Result<SqliteVault> {
    // One guard across lookup and initialisation so two concurrent first
    // accesses cannot both open the same store. Nothing is cached on
    // failure.
    let mut handles = self.handles.lock().await;
    if let Some(handle) = handles.get(&id) {
      return Ok(handle.clone());
    }

    let vault = self.load_vault(id).await?;
    let handle = SqliteVault::open(self.vault_db_path(&vault.slug), id).await?;
    handles.insert(id, handle.clone());
    Ok(handle)
  }
}
