// 📚 Catalog Store - creatures keyed by case-insensitive name
// Entries are created by admin-add or bulk seed and never updated or deleted

use crate::error::{FieldError, PokedleError, Result};
use anyhow::Context as AnyhowContext;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Catalog shipped with the binary, used when no catalog file is configured
const BUNDLED_POKEDEX: &str = include_str!("../pokedex.json");

// ============================================================================
// ENTRY TYPES
// ============================================================================

/// A stored catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Row identity - also the stable creation order used by the daily pick
    pub id: i64,
    pub name: String,
    pub type1: String,
    pub type2: Option<String>,
    pub evolution_stage: i64,
    pub total_evolutions: i64,
    pub color: String,
}

impl CatalogEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CatalogEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            type1: row.get(2)?,
            type2: row.get(3)?,
            evolution_stage: row.get(4)?,
            total_evolutions: row.get(5)?,
            color: row.get(6)?,
        })
    }

    /// Case-insensitive name comparison (the catalog's identity rule)
    pub fn same_name(&self, other: &str) -> bool {
        name_key(&self.name) == name_key(other)
    }
}

/// Identity key for a name: trimmed and Unicode-lowercased.
/// Uniqueness and lookup both go through this column.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A validated entry that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub name: String,
    pub type1: String,
    #[serde(default)]
    pub type2: Option<String>,
    pub evolution_stage: i64,
    pub total_evolutions: i64,
    pub color: String,
}

impl NewEntry {
    /// Trim text fields, fold an empty secondary type into "absent",
    /// then check the catalog invariants
    pub fn normalized(self) -> Result<Self> {
        let entry = NewEntry {
            name: self.name.trim().to_string(),
            type1: self.type1.trim().to_string(),
            type2: self
                .type2
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            evolution_stage: self.evolution_stage,
            total_evolutions: self.total_evolutions,
            color: self.color.trim().to_string(),
        };

        let mut errors = Vec::new();
        if entry.name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if entry.type1.is_empty() {
            errors.push(FieldError::new("type1", "Primary type is required"));
        }
        if entry.evolution_stage < 1 {
            errors.push(FieldError::new(
                "evolution_stage",
                "Evolution stage must be an integer >= 1",
            ));
        }
        if entry.total_evolutions < 1 {
            errors.push(FieldError::new(
                "total_evolutions",
                "Total evolutions must be an integer >= 1",
            ));
        }
        if entry.color.is_empty() {
            errors.push(FieldError::new("color", "Color is required"));
        }

        if errors.is_empty() {
            Ok(entry)
        } else {
            Err(PokedleError::InvalidField(errors))
        }
    }
}

/// Raw admin-add input: every field as typed into a form or passed on the command line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type1: String,
    #[serde(default)]
    pub type2: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub evolution_stage: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub total_evolutions: String,
    #[serde(default)]
    pub color: String,
}

impl EntryForm {
    /// Parse the integer fields and validate everything, reporting all
    /// problems at once rather than the first one
    pub fn validate(self) -> Result<NewEntry> {
        let mut errors = Vec::new();

        let evolution_stage = parse_positive(&self.evolution_stage);
        if evolution_stage.is_none() {
            errors.push(FieldError::new(
                "evolution_stage",
                "Evolution stage must be an integer >= 1",
            ));
        }
        let total_evolutions = parse_positive(&self.total_evolutions);
        if total_evolutions.is_none() {
            errors.push(FieldError::new(
                "total_evolutions",
                "Total evolutions must be an integer >= 1",
            ));
        }

        // Placeholder 1s keep the text-field checks running when a number was bad
        let candidate = NewEntry {
            name: self.name,
            type1: self.type1,
            type2: self.type2,
            evolution_stage: evolution_stage.unwrap_or(1),
            total_evolutions: total_evolutions.unwrap_or(1),
            color: self.color,
        };

        match candidate.normalized() {
            Ok(entry) if errors.is_empty() => Ok(entry),
            Ok(_) => Err(PokedleError::InvalidField(errors)),
            Err(PokedleError::InvalidField(mut text_errors)) => {
                text_errors.extend(errors);
                Err(PokedleError::InvalidField(text_errors))
            }
            Err(other) => Err(other),
        }
    }
}

/// JSON clients send integers as numbers, HTML forms send them as text
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Integer(n) => n.to_string(),
        // Left as-is so validation reports it as a non-integer
        TextOrNumber::Float(f) => f.to_string(),
        TextOrNumber::Text(text) => text,
    })
}

fn parse_positive(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|n| *n >= 1)
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

const SELECT_ENTRY: &str =
    "SELECT id, name, type1, type2, evolution_stage, total_evolutions, color FROM entries";

/// Insert a new entry; a case-insensitive name collision is `DuplicateName`
pub fn insert_entry(conn: &Connection, entry: &NewEntry) -> Result<CatalogEntry> {
    let entry = entry.clone().normalized()?;

    let result = conn.execute(
        "INSERT INTO entries (name, name_key, type1, type2, evolution_stage, total_evolutions, color)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.name,
            name_key(&entry.name),
            entry.type1,
            entry.type2,
            entry.evolution_stage,
            entry.total_evolutions,
            entry.color,
        ],
    );

    match result {
        Ok(_) => {
            let id = conn.last_insert_rowid();
            tracing::debug!(id, name = %entry.name, "catalog entry inserted");
            Ok(CatalogEntry {
                id,
                name: entry.name,
                type1: entry.type1,
                type2: entry.type2,
                evolution_stage: entry.evolution_stage,
                total_evolutions: entry.total_evolutions,
                color: entry.color,
            })
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(PokedleError::DuplicateName(entry.name))
        }
        Err(e) => Err(e.into()),
    }
}

/// Case-insensitive exact match on name
pub fn lookup_entry(conn: &Connection, name: &str) -> Result<CatalogEntry> {
    let sql = format!("{} WHERE name_key = ?1", SELECT_ENTRY);
    conn.query_row(&sql, params![name_key(name)], CatalogEntry::from_row)
        .optional()?
        .ok_or_else(|| PokedleError::NotFound(name.trim().to_string()))
}

/// All entries in stable creation order
pub fn list_entries(conn: &Connection) -> Result<Vec<CatalogEntry>> {
    let sql = format!("{} ORDER BY id", SELECT_ENTRY);
    let mut stmt = conn.prepare(&sql)?;

    let entries = stmt
        .query_map([], CatalogEntry::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn count_entries(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
    Ok(count)
}

/// Seed the catalog once: does nothing when entries already exist.
/// Duplicate names inside the seed are skipped; returns how many rows were inserted.
pub fn seed_if_empty(conn: &Connection, entries: &[NewEntry]) -> Result<usize> {
    if count_entries(conn)? > 0 {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    let mut inserted = 0;

    for entry in entries {
        match insert_entry(&tx, entry) {
            Ok(_) => inserted += 1,
            Err(PokedleError::DuplicateName(name)) => {
                tracing::warn!(%name, "duplicate name in seed catalog, skipped");
            }
            Err(e) => return Err(e),
        }
    }

    tx.commit()?;
    tracing::info!(inserted, "seeded catalog into database");
    Ok(inserted)
}

// ============================================================================
// CATALOG FILES
// ============================================================================

/// Catalog bundled into the binary
pub fn bundled_catalog() -> Result<Vec<NewEntry>> {
    serde_json::from_str(BUNDLED_POKEDEX)
        .map_err(|e| PokedleError::Catalog(format!("bundled pokedex: {}", e)))
}

/// Load a catalog file: `.csv` files by header, anything else as a JSON array
pub fn load_catalog_file(path: &Path) -> Result<Vec<NewEntry>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let loaded = if is_csv {
        load_csv_catalog(path)
    } else {
        load_json_catalog(path)
    };

    loaded.map_err(|e| PokedleError::Catalog(format!("{:#}", e)))
}

fn load_json_catalog(path: &Path) -> anyhow::Result<Vec<NewEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let entries = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    Ok(entries)
}

fn load_csv_catalog(path: &Path) -> anyhow::Result<Vec<NewEntry>> {
    let mut rdr = csv::Reader::from_path(path).context("Failed to open CSV file")?;

    let mut entries = Vec::new();
    for result in rdr.deserialize() {
        let entry: NewEntry = result.context("Failed to deserialize catalog entry")?;
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn bulbasaur() -> NewEntry {
        NewEntry {
            name: "Bulbasaur".to_string(),
            type1: "Grass".to_string(),
            type2: Some("Poison".to_string()),
            evolution_stage: 1,
            total_evolutions: 3,
            color: "Green".to_string(),
        }
    }

    #[test]
    fn test_insert_and_lookup_case_insensitive() {
        let conn = test_conn();
        let stored = insert_entry(&conn, &bulbasaur()).unwrap();

        let found = lookup_entry(&conn, "  bULBASAUR ").unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.type2.as_deref(), Some("Poison"));
    }

    #[test]
    fn test_lookup_unknown_is_not_found() {
        let conn = test_conn();
        insert_entry(&conn, &bulbasaur()).unwrap();

        match lookup_entry(&conn, "Charmander") {
            Err(PokedleError::NotFound(name)) => assert_eq!(name, "Charmander"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_name_rejected_without_changing_count() {
        let conn = test_conn();
        insert_entry(&conn, &bulbasaur()).unwrap();

        let mut shouting = bulbasaur();
        shouting.name = "BULBASAUR".to_string();
        shouting.color = "Blue".to_string();

        let result = insert_entry(&conn, &shouting);
        assert!(matches!(result, Err(PokedleError::DuplicateName(_))));
        assert_eq!(count_entries(&conn).unwrap(), 1);
    }

    #[test]
    fn test_non_ascii_case_variants_are_one_name() {
        let conn = test_conn();
        let mut flabebe = bulbasaur();
        flabebe.name = "Flabébé".to_string();
        insert_entry(&conn, &flabebe).unwrap();

        let mut shouting = flabebe.clone();
        shouting.name = "FLABÉBÉ".to_string();
        let result = insert_entry(&conn, &shouting);

        assert!(matches!(result, Err(PokedleError::DuplicateName(_))));
        assert_eq!(count_entries(&conn).unwrap(), 1);

        let found = lookup_entry(&conn, "flabÉbÉ").unwrap();
        assert_eq!(found.name, "Flabébé");
        assert!(found.same_name("FLABÉBÉ"));
    }

    #[test]
    fn test_list_entries_in_creation_order() {
        let conn = test_conn();
        for name in ["Charmander", "Bulbasaur", "Squirtle"] {
            let mut entry = bulbasaur();
            entry.name = name.to_string();
            insert_entry(&conn, &entry).unwrap();
        }

        let names: Vec<String> = list_entries(&conn)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Charmander", "Bulbasaur", "Squirtle"]);
    }

    #[test]
    fn test_form_validation_collects_all_errors() {
        let form = EntryForm {
            name: "   ".to_string(),
            type1: String::new(),
            type2: None,
            evolution_stage: "zero".to_string(),
            total_evolutions: "0".to_string(),
            color: String::new(),
        };

        match form.validate() {
            Err(PokedleError::InvalidField(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(errors.len(), 5);
                assert!(fields.contains(&"name"));
                assert!(fields.contains(&"type1"));
                assert!(fields.contains(&"evolution_stage"));
                assert!(fields.contains(&"total_evolutions"));
                assert!(fields.contains(&"color"));
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_form_trims_and_drops_empty_secondary_type() {
        let form = EntryForm {
            name: " Charmander ".to_string(),
            type1: "Fire ".to_string(),
            type2: Some("  ".to_string()),
            evolution_stage: " 1".to_string(),
            total_evolutions: "3".to_string(),
            color: "Red".to_string(),
        };

        let entry = form.validate().unwrap();
        assert_eq!(entry.name, "Charmander");
        assert_eq!(entry.type1, "Fire");
        assert_eq!(entry.type2, None);
        assert_eq!(entry.evolution_stage, 1);
    }

    #[test]
    fn test_form_accepts_numbers_or_text() {
        let form: EntryForm = serde_json::from_value(serde_json::json!({
            "name": "Pikachu",
            "type1": "Electric",
            "evolution_stage": 2,
            "total_evolutions": "3",
            "color": "Yellow"
        }))
        .unwrap();

        let entry = form.validate().unwrap();
        assert_eq!(entry.evolution_stage, 2);
        assert_eq!(entry.total_evolutions, 3);

        let fractional: EntryForm = serde_json::from_value(serde_json::json!({
            "name": "Pikachu",
            "type1": "Electric",
            "evolution_stage": 1.5,
            "total_evolutions": 3,
            "color": "Yellow"
        }))
        .unwrap();
        assert!(matches!(fractional.validate(), Err(PokedleError::InvalidField(_))));
    }

    #[test]
    fn test_seed_only_once() {
        let conn = test_conn();
        let catalog = bundled_catalog().unwrap();
        assert!(!catalog.is_empty());

        let first = seed_if_empty(&conn, &catalog).unwrap();
        let second = seed_if_empty(&conn, &catalog).unwrap();

        assert_eq!(first, catalog.len());
        assert_eq!(second, 0);
        assert_eq!(count_entries(&conn).unwrap(), catalog.len() as i64);
    }

    #[test]
    fn test_seed_skips_duplicates_in_file() {
        let conn = test_conn();
        let mut twin = bulbasaur();
        twin.name = "bulbasaur".to_string();

        let seed = [bulbasaur(), twin];
        let inserted = seed_if_empty(&conn, &seed).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(seed.len() - inserted, 1);
    }

    #[test]
    fn test_load_csv_catalog() {
        let dir = std::env::temp_dir().join(format!("pokedle-csv-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.csv");
        fs::write(
            &path,
            "name,type1,type2,evolution_stage,total_evolutions,color\n\
             Pikachu,Electric,,2,3,Yellow\n\
             Oddish,Grass,Poison,1,3,Blue\n",
        )
        .unwrap();

        let entries = load_catalog_file(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].type2, None);
        assert_eq!(entries[1].type2.as_deref(), Some("Poison"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_catalog_file_is_catalog_error() {
        let result = load_catalog_file(Path::new("/nonexistent/pokedex.json"));
        assert!(matches!(result, Err(PokedleError::Catalog(_))));
    }
}
