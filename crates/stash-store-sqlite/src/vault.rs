//! [`SqliteVault`] — one vault's isolated store: schema history, documents,
//! and full-text index in a single SQLite file.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use stash_core::{
  document::{self, Document, RawValues},
  schema::{self, FieldDef, Schema},
  store::VaultStore,
};

use crate::{
  Error, Result,
  encode::{RawDocument, RawSchema, encode_dt, encode_fields, encode_values},
  schema::VAULT_SCHEMA,
};

const SEARCH_LIMIT: i64 = 100;

fn schema_row(row: &rusqlite::Row) -> rusqlite::Result<RawSchema> {
  Ok(RawSchema {
    id:          row.get(0)?,
    vault_id:    row.get(1)?,
    version:     row.get(2)?,
    title:       row.get(3)?,
    fields_json: row.get(4)?,
    is_active:   row.get(5)?,
    created_at:  row.get(6)?,
  })
}

fn doc_row(row: &rusqlite::Row) -> rusqlite::Result<RawDocument> {
  Ok(RawDocument {
    id:         row.get(0)?,
    vault_id:   row.get(1)?,
    schema_id:  row.get(2)?,
    title:      row.get(3)?,
    data_json:  row.get(4)?,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An open handle to one vault's database.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// clones run their statements on the same dedicated thread, which is what
/// gives causally sequenced operations read-your-writes consistency.
#[derive(Clone, Debug)]
pub struct SqliteVault {
  conn:     tokio_rusqlite::Connection,
  vault_id: i64,
}

impl SqliteVault {
  /// Open (or create) the vault database at `path` and run the idempotent
  /// schema bootstrap.
  pub async fn open(path: impl AsRef<Path>, vault_id: i64) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let vault = Self { conn, vault_id };
    vault.init_schema().await?;
    Ok(vault)
  }

  /// Open an in-memory vault store — useful for testing.
  pub async fn open_in_memory(vault_id: i64) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let vault = Self { conn, vault_id };
    vault.init_schema().await?;
    Ok(vault)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(VAULT_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_active_schema(&self) -> Result<Option<Schema>> {
    let raw: Option<RawSchema> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, vault_id, version, title, fields_json, is_active, created_at
               FROM schemas WHERE is_active = 1
               ORDER BY version DESC LIMIT 1",
              [],
              schema_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSchema::into_schema).transpose()
  }

  async fn load_schema(&self, id: i64) -> Result<Schema> {
    let raw: Option<RawSchema> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, vault_id, version, title, fields_json, is_active, created_at
               FROM schemas WHERE id = ?1",
              rusqlite::params![id],
              schema_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::Core(stash_core::Error::SchemaNotFound(id)))?
      .into_schema()
  }

  async fn load_document(&self, id: i64) -> Result<Document> {
    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, vault_id, schema_id, title, data_json, created_at, updated_at
               FROM documents WHERE id = ?1",
              rusqlite::params![id],
              doc_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::Core(stash_core::Error::DocumentNotFound(id)))?
      .into_document()
  }

  async fn load_recent(&self, limit: i64) -> Result<Vec<Document>> {
    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, vault_id, schema_id, title, data_json, created_at, updated_at
           FROM documents ORDER BY updated_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], doc_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }
}

// ─── VaultStore impl ─────────────────────────────────────────────────────────

impl VaultStore for SqliteVault {
  type Error = Error;

  async fn activate_schema(
    &self,
    title: String,
    fields: Vec<FieldDef>,
  ) -> Result<Schema> {
    let title = title.trim().to_owned();
    if title.is_empty() {
      return Err(Error::Core(stash_core::Error::EmptySchemaTitle));
    }
    schema::validate_fields(&fields).map_err(Error::Core)?;

    let now = Utc::now();
    let vault_id = self.vault_id;
    let fields_json = encode_fields(&fields)?;
    let at_str = encode_dt(now);
    let title_db = title.clone();

    let (id, version) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let version: i64 = tx.query_row(
          "SELECT COALESCE(MAX(version), 0) + 1 FROM schemas",
          [],
          |r| r.get(0),
        )?;
        tx.execute("UPDATE schemas SET is_active = 0", [])?;
        tx.execute(
          "INSERT INTO schemas (vault_id, version, title, fields_json, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![vault_id, version, title_db, fields_json, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok((id, version))
      })
      .await?;

    Ok(Schema {
      id,
      vault_id,
      version,
      title,
      fields,
      active: true,
      created_at: now,
    })
  }

  async fn active_schema(&self) -> Result<Option<Schema>> {
    self.load_active_schema().await
  }

  async fn schema(&self, id: i64) -> Result<Schema> {
    self.load_schema(id).await
  }

  async fn create_document(
    &self,
    title: Option<String>,
    values: RawValues,
  ) -> Result<Document> {
    let schema = self
      .load_active_schema()
      .await?
      .ok_or(Error::Core(stash_core::Error::NoActiveSchema))?;

    let fields =
      document::coerce_values(&schema.fields, &values).map_err(Error::Core)?;

    let now = Utc::now();
    let title = match title.as_deref().map(str::trim) {
      Some(t) if !t.is_empty() => t.to_owned(),
      _ => document::derive_title(&schema.fields, &fields, now),
    };
    let body = document::flatten_for_index(&schema.fields, &fields);

    let vault_id = self.vault_id;
    let schema_id = schema.id;
    let data_json = encode_values(&fields)?;
    let at_str = encode_dt(now);
    let title_db = title.clone();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO documents (vault_id, schema_id, title, data_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![vault_id, schema_id, title_db, data_json, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
          "INSERT INTO document_fts (rowid, title, body) VALUES (?1, ?2, ?3)",
          rusqlite::params![id, title_db, body],
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(Document {
      id,
      vault_id,
      schema_id,
      title,
      fields,
      created_at: now,
      updated_at: now,
    })
  }

  async fn update_document(
    &self,
    id: i64,
    title: Option<String>,
    values: RawValues,
  ) -> Result<Document> {
    let existing = self.load_document(id).await?;
    // Schema pinning: validate against the version the document was
    // created under, not the currently active one.
    let schema = self.load_schema(existing.schema_id).await?;

    let fields =
      document::coerce_values(&schema.fields, &values).map_err(Error::Core)?;

    let now = Utc::now();
    let title = match title.as_deref().map(str::trim) {
      Some(t) if !t.is_empty() => t.to_owned(),
      _ => existing.title.clone(),
    };
    let body = document::flatten_for_index(&schema.fields, &fields);

    // The FTS5 'delete' command against an external-content table must
    // carry the column values as they were originally indexed.
    let old_title = existing.title.clone();
    let old_body =
      document::flatten_for_index(&schema.fields, &existing.fields);

    let data_json = encode_values(&fields)?;
    let at_str = encode_dt(now);
    let title_db = title.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE documents SET title = ?1, data_json = ?2, updated_at = ?3
           WHERE id = ?4",
          rusqlite::params![title_db, data_json, at_str, id],
        )?;
        tx.execute(
          "INSERT INTO document_fts (document_fts, rowid, title, body)
           VALUES ('delete', ?1, ?2, ?3)",
          rusqlite::params![id, old_title, old_body],
        )?;
        tx.execute(
          "INSERT INTO document_fts (rowid, title, body) VALUES (?1, ?2, ?3)",
          rusqlite::params![id, title_db, body],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(Document {
      id,
      vault_id: existing.vault_id,
      schema_id: existing.schema_id,
      title,
      fields,
      created_at: existing.created_at,
      updated_at: now,
    })
  }

  async fn get_document(&self, id: i64) -> Result<Document> {
    self.load_document(id).await
  }

  async fn recent_documents(&self, limit: usize) -> Result<Vec<Document>> {
    self.load_recent(limit as i64).await
  }

  async fn search(&self, query: String) -> Result<Vec<Document>> {
    let query = query.trim().to_owned();
    if query.is_empty() {
      // An empty MATCH expression is an FTS5 syntax error; list the most
      // recently updated documents instead.
      return self.load_recent(SEARCH_LIMIT).await;
    }

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT d.id, d.vault_id, d.schema_id, d.title, d.data_json,
                  d.created_at, d.updated_at
           FROM document_fts f
           JOIN documents d ON d.id = f.rowid
           WHERE document_fts MATCH ?1
           ORDER BY rank LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![query, SEARCH_LIMIT], doc_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }
}
