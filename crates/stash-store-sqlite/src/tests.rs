//! Integration tests for the SQLite registry and vault stores.

use serde_json::json;
use stash_core::{
  document::{FieldValue, RawValues},
  schema::{FieldDef, FieldKind},
  store::{VaultRegistry as _, VaultStore as _},
};
use tempfile::TempDir;

use crate::{Error, SqliteVault, SqliteVaults};

async fn vault() -> SqliteVault {
  SqliteVault::open_in_memory(1).await.expect("in-memory vault")
}

async fn registry() -> (TempDir, SqliteVaults) {
  let dir = TempDir::new().expect("temp dir");
  let vaults = SqliteVaults::open(dir.path()).await.expect("registry");
  (dir, vaults)
}

fn field(name: &str, label: &str, kind: FieldKind, required: bool) -> FieldDef {
  FieldDef {
    name: name.into(),
    label: label.into(),
    kind,
    required,
    options: Vec::new(),
  }
}

fn recipe_fields() -> Vec<FieldDef> {
  let mut difficulty = field("difficulty", "Difficulty", FieldKind::Select, false);
  difficulty.options = vec!["easy".into(), "hard".into()];
  vec![
    field("dish", "Dish", FieldKind::String, true),
    field("servings", "Servings", FieldKind::Number, false),
    field("vegetarian", "Vegetarian", FieldKind::Boolean, false),
    difficulty,
  ]
}

fn raw(value: serde_json::Value) -> RawValues {
  value.as_object().expect("object").clone()
}

async fn recipe_vault() -> SqliteVault {
  let v = vault().await;
  v.activate_schema("Recipe".into(), recipe_fields())
    .await
    .expect("activate");
  v
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_vault_assigns_ids_and_provisions_store() {
  let (dir, vaults) = registry().await;

  let v = vaults
    .create_vault("Recipes".into(), "recipes".into())
    .await
    .unwrap();
  assert_eq!(v.id, 1);
  assert_eq!(v.name, "Recipes");
  assert_eq!(v.slug, "recipes");
  assert!(dir.path().join("vaults/recipes.db").exists());

  let second = vaults
    .create_vault("Films".into(), "films".into())
    .await
    .unwrap();
  assert_eq!(second.id, 2);
}

#[tokio::test]
async fn create_vault_trims_inputs() {
  let (_dir, vaults) = registry().await;
  let v = vaults
    .create_vault("  Recipes ".into(), " recipes ".into())
    .await
    .unwrap();
  assert_eq!(v.name, "Recipes");
  assert_eq!(v.slug, "recipes");
}

#[tokio::test]
async fn create_vault_rejects_blank_name_or_slug() {
  let (_dir, vaults) = registry().await;
  let err = vaults
    .create_vault("   ".into(), "recipes".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::EmptyNameOrSlug)));

  let err = vaults
    .create_vault("Recipes".into(), "".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::EmptyNameOrSlug)));
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
  let (_dir, vaults) = registry().await;
  vaults
    .create_vault("Recipes".into(), "recipes".into())
    .await
    .unwrap();
  let err = vaults
    .create_vault("Other".into(), "recipes".into())
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(stash_core::Error::SlugTaken(s)) if s == "recipes")
  );
}

#[tokio::test]
async fn list_vaults_most_recent_first() {
  let (_dir, vaults) = registry().await;
  vaults
    .create_vault("First".into(), "first".into())
    .await
    .unwrap();
  vaults
    .create_vault("Second".into(), "second".into())
    .await
    .unwrap();

  let all = vaults.list_vaults().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].slug, "second");
  assert_eq!(all[1].slug, "first");
}

#[tokio::test]
async fn get_vault_by_id_and_slug_resolve_the_same_vault() {
  let (_dir, vaults) = registry().await;
  let created = vaults
    .create_vault("Recipes".into(), "recipes".into())
    .await
    .unwrap();

  let by_id = vaults.get_vault(created.id).await.unwrap();
  let by_slug = vaults.get_vault_by_slug("recipes".into()).await.unwrap();
  assert_eq!(by_id.id, by_slug.id);
  assert_eq!(by_id.slug, by_slug.slug);
}

#[tokio::test]
async fn unknown_vault_lookups_fail() {
  let (_dir, vaults) = registry().await;
  let err = vaults.get_vault(42).await.unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::VaultNotFound(42))));

  let err = vaults.get_vault_by_slug("nope".into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::SlugNotFound(_))));

  let err = vaults.vault(42).await.unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::VaultNotFound(42))));
}

#[tokio::test]
async fn cached_handles_share_one_store() {
  let (_dir, vaults) = registry().await;
  let v = vaults
    .create_vault("Recipes".into(), "recipes".into())
    .await
    .unwrap();

  let first = vaults.vault(v.id).await.unwrap();
  first
    .activate_schema("Recipe".into(), recipe_fields())
    .await
    .unwrap();
  let doc = first
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();

  // A second acquisition must observe the first handle's writes.
  let second = vaults.vault(v.id).await.unwrap();
  let fetched = second.get_document(doc.id).await.unwrap();
  assert_eq!(fetched.title, "Paella");

  let hits = second.search("paella".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
}

// ─── Schema manager ──────────────────────────────────────────────────────────

#[tokio::test]
async fn first_activation_is_version_one() {
  let v = vault().await;
  let schema = v
    .activate_schema("Recipe".into(), recipe_fields())
    .await
    .unwrap();
  assert_eq!(schema.version, 1);
  assert!(schema.active);
  assert_eq!(schema.vault_id, 1);
}

#[tokio::test]
async fn activation_supersedes_and_bumps_version() {
  let v = vault().await;
  let s1 = v
    .activate_schema("Recipe".into(), recipe_fields())
    .await
    .unwrap();
  let s2 = v
    .activate_schema("Recipe v2".into(), recipe_fields())
    .await
    .unwrap();

  assert_eq!(s2.version, s1.version + 1);

  let active = v.active_schema().await.unwrap().unwrap();
  assert_eq!(active.id, s2.id);
  assert!(active.active);

  // The superseded row lost its flag.
  let old = v.schema(s1.id).await.unwrap();
  assert!(!old.active);
}

#[tokio::test]
async fn no_schema_yet_is_a_state_not_an_error() {
  let v = vault().await;
  assert!(v.active_schema().await.unwrap().is_none());
}

#[tokio::test]
async fn activation_rejects_blank_title_and_empty_fields() {
  let v = vault().await;
  let err = v
    .activate_schema("  ".into(), recipe_fields())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::EmptySchemaTitle)));

  let err = v.activate_schema("Recipe".into(), vec![]).await.unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::NoFields)));

  // Nothing was activated by the failed attempts.
  assert!(v.active_schema().await.unwrap().is_none());
}

#[tokio::test]
async fn activation_rejects_bad_field_specs() {
  let v = vault().await;
  let fields = vec![
    field("dish", "Dish", FieldKind::String, true),
    field("rating", "Rating", FieldKind::Select, false),
  ];
  let err = v.activate_schema("Recipe".into(), fields).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(stash_core::Error::BadFieldSpec { index: 1, .. })
  ));
}

// ─── Document writer ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_without_active_schema_fails() {
  let v = vault().await;
  let err = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(stash_core::Error::NoActiveSchema)));
}

#[tokio::test]
async fn missing_required_field_names_its_label() {
  let v = recipe_vault().await;
  let err = v.create_document(None, raw(json!({}))).await.unwrap_err();
  assert!(
    matches!(err, Error::Core(stash_core::Error::FieldRequired { label }) if label == "Dish")
  );
}

#[tokio::test]
async fn payload_roundtrip_applies_coercions() {
  let v = recipe_vault().await;
  let doc = v
    .create_document(
      None,
      raw(json!({
        "dish":       "Paella",
        "servings":   "4",
        "vegetarian": "on",
        "difficulty": "easy",
        "stray":      "dropped",
      })),
    )
    .await
    .unwrap();

  let fetched = v.get_document(doc.id).await.unwrap();
  assert_eq!(fetched.fields["dish"], FieldValue::Text("Paella".into()));
  assert_eq!(fetched.fields["servings"], FieldValue::Number(4.0));
  assert_eq!(fetched.fields["vegetarian"], FieldValue::Bool(true));
  assert_eq!(fetched.fields["difficulty"], FieldValue::Text("easy".into()));
  assert!(!fetched.fields.contains_key("stray"));
  assert_eq!(fetched.schema_id, doc.schema_id);
}

#[tokio::test]
async fn invalid_select_option_rejected() {
  let v = recipe_vault().await;
  let err = v
    .create_document(None, raw(json!({"dish": "Paella", "difficulty": "medium"})))
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(stash_core::Error::InvalidOption { label }) if label == "Difficulty")
  );
}

#[tokio::test]
async fn title_is_derived_from_the_first_string_field() {
  let v = recipe_vault().await;
  let doc = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();
  assert_eq!(doc.title, "Paella");
}

#[tokio::test]
async fn explicit_title_override_wins() {
  let v = recipe_vault().await;
  let doc = v
    .create_document(
      Some("  Sunday dinner  ".into()),
      raw(json!({"dish": "Paella"})),
    )
    .await
    .unwrap();
  assert_eq!(doc.title, "Sunday dinner");
}

#[tokio::test]
async fn update_keeps_title_when_no_override_given() {
  let v = recipe_vault().await;
  let doc = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();

  let updated = v
    .update_document(doc.id, None, raw(json!({"dish": "Paella", "servings": 6})))
    .await
    .unwrap();
  assert_eq!(updated.title, "Paella");
  assert_eq!(updated.fields["servings"], FieldValue::Number(6.0));
  assert!(updated.updated_at >= doc.updated_at);
  assert_eq!(updated.created_at, doc.created_at);
}

#[tokio::test]
async fn update_unknown_document_fails() {
  let v = recipe_vault().await;
  let err = v
    .update_document(99, None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(stash_core::Error::DocumentNotFound(99))
  ));
}

#[tokio::test]
async fn documents_stay_pinned_to_their_schema_version() {
  let v = recipe_vault().await;
  let doc = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();

  // Activate a stricter v2; the old document must keep validating against
  // v1's field set.
  v.activate_schema(
    "Recipe v2".into(),
    vec![
      field("dish", "Dish", FieldKind::String, true),
      field("chef", "Chef", FieldKind::String, true),
    ],
  )
  .await
  .unwrap();

  let updated = v
    .update_document(doc.id, None, raw(json!({"dish": "Paella", "servings": 2})))
    .await
    .unwrap();
  assert_eq!(updated.schema_id, doc.schema_id);
  assert_eq!(updated.fields["servings"], FieldValue::Number(2.0));
  // v2-only fields are not part of the pinned payload.
  assert!(!updated.fields.contains_key("chef"));

  // New documents validate against v2.
  let err = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(stash_core::Error::FieldRequired { label }) if label == "Chef")
  );
}

#[tokio::test]
async fn recent_documents_orders_by_update_time() {
  let v = recipe_vault().await;
  let first = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();
  let second = v
    .create_document(None, raw(json!({"dish": "Lasagna"})))
    .await
    .unwrap();

  let recent = v.recent_documents(50).await.unwrap();
  assert_eq!(recent.len(), 2);
  assert_eq!(recent[0].id, second.id);

  // Touching the older document moves it to the front.
  v.update_document(first.id, None, raw(json!({"dish": "Paella", "servings": 8})))
    .await
    .unwrap();
  let recent = v.recent_documents(50).await.unwrap();
  assert_eq!(recent[0].id, first.id);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_finds_matching_documents_only() {
  let v = recipe_vault().await;
  let doc = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();

  let hits = v.search("paella".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, doc.id);
  assert_eq!(hits[0].title, "Paella");

  let hits = v.search("lasagna".into()).await.unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn search_matches_flattened_payload_text() {
  let v = recipe_vault().await;
  v.create_document(
    Some("Weeknight special".into()),
    raw(json!({"dish": "Gazpacho", "difficulty": "easy"})),
  )
  .await
  .unwrap();

  let hits = v.search("gazpacho".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
  let hits = v.search("easy".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn blank_query_lists_recent_documents() {
  let v = recipe_vault().await;
  v.create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();
  let newer = v
    .create_document(None, raw(json!({"dish": "Lasagna"})))
    .await
    .unwrap();

  let hits = v.search("   ".into()).await.unwrap();
  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].id, newer.id);
}

#[tokio::test]
async fn update_rewrites_the_index_entry() {
  let v = recipe_vault().await;
  // Explicit title so only the payload feeds the searchable body.
  let doc = v
    .create_document(Some("Dinner".into()), raw(json!({"dish": "Paella"})))
    .await
    .unwrap();

  v.update_document(doc.id, None, raw(json!({"dish": "Lasagna"})))
    .await
    .unwrap();

  // The old projection is gone, the new one is findable, and there is
  // exactly one entry.
  assert!(v.search("paella".into()).await.unwrap().is_empty());
  let hits = v.search("lasagna".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, doc.id);
}

#[tokio::test]
async fn reindexing_is_idempotent() {
  let v = recipe_vault().await;
  let doc = v
    .create_document(None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();

  // Two identical updates leave exactly one index entry.
  v.update_document(doc.id, None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();
  v.update_document(doc.id, None, raw(json!({"dish": "Paella"})))
    .await
    .unwrap();

  let hits = v.search("paella".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
}
