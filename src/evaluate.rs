// 🎯 Guess Evaluator - compare a guess to the daily secret attribute by attribute

use crate::catalog::CatalogEntry;
use crate::outcomes::GuessOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown in place of an absent attribute
pub const MISSING_VALUE: &str = "-";

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Type1,
    Type2,
    EvolutionStage,
    TotalEvolutions,
    Color,
}

impl Attribute {
    /// Display order of the comparison table
    pub const ALL: [Attribute; 5] = [
        Attribute::Type1,
        Attribute::Type2,
        Attribute::EvolutionStage,
        Attribute::TotalEvolutions,
        Attribute::Color,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Attribute::Type1 => "Type 1",
            Attribute::Type2 => "Type 2",
            Attribute::EvolutionStage => "Evolution stage",
            Attribute::TotalEvolutions => "Total evolutions",
            Attribute::Color => "Color",
        }
    }

    fn value_of(&self, entry: &CatalogEntry) -> AttributeValue {
        match self {
            Attribute::Type1 => AttributeValue::Text(Some(entry.type1.clone())),
            Attribute::Type2 => AttributeValue::Text(entry.type2.clone()),
            Attribute::EvolutionStage => AttributeValue::Number(entry.evolution_stage),
            Attribute::TotalEvolutions => AttributeValue::Number(entry.total_evolutions),
            Attribute::Color => AttributeValue::Text(Some(entry.color.clone())),
        }
    }
}

/// Typed attribute value; equality is exact (case-sensitive text, numeric integers,
/// absent only equals absent)
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeValue {
    Text(Option<String>),
    Number(i64),
}

impl AttributeValue {
    fn display(&self) -> String {
        match self {
            AttributeValue::Text(Some(text)) if !text.is_empty() => text.clone(),
            AttributeValue::Text(_) => MISSING_VALUE.to_string(),
            AttributeValue::Number(n) => n.to_string(),
        }
    }
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub attribute: Attribute,
    pub label: String,
    pub guess: String,
    pub secret: String,
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub guess_name: String,
    pub secret_name: String,
    pub rows: Vec<ComparisonRow>,
    pub matched: bool,
}

impl GuessResult {
    /// Number of attributes that differ from the secret
    pub fn mismatches(&self) -> usize {
        self.rows.iter().filter(|row| !row.ok).count()
    }

    /// The log record for this evaluation
    pub fn to_outcome(&self, at: DateTime<Utc>) -> GuessOutcome {
        GuessOutcome::new(&self.guess_name, self.matched, &self.secret_name, at)
    }
}

/// Compare `guess` against `secret`. Pure: logging the outcome is the caller's job
/// (see `game::play_guess`).
pub fn evaluate(guess: &CatalogEntry, secret: &CatalogEntry) -> GuessResult {
    let rows = Attribute::ALL
        .iter()
        .map(|attribute| {
            let guessed = attribute.value_of(guess);
            let expected = attribute.value_of(secret);
            ComparisonRow {
                attribute: *attribute,
                label: attribute.label().to_string(),
                guess: guessed.display(),
                secret: expected.display(),
                ok: guessed == expected,
            }
        })
        .collect();

    GuessResult {
        guess_name: guess.name.clone(),
        secret_name: secret.name.clone(),
        rows,
        matched: guess.same_name(&secret.name),
    }
}
