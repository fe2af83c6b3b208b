//! Wire DTOs for the ingredient classification API.
//!
//! # Design
//! Response types are pure deserialization targets. The client never
//! recomputes or cross-checks their fields (aggregate counts in
//! `AnalyzeResult` are whatever the service sent). The mock-server crate
//! defines its own copies of these shapes; integration tests catch drift.

use serde::{Deserialize, Serialize};

/// Halal classification of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HalalStatus {
    Halal,
    Haram,
    /// Doubtful.
    Mushbooh,
    Unknown,
    NotFood,
}

/// Where the service got a status determination from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientSource {
    Database,
    Llm,
    Manual,
    Cache,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Query text plus optional filters for the search endpoint.
///
/// Absent filters are left off the wire entirely, as are empty strings and
/// zero page numbers; the service applies its own defaults (language "en",
/// page 1, 20 per page).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub query: String,
    pub status: Option<HalalStatus>,
    pub category: Option<String>,
    /// ISO 639-1 code.
    pub language: Option<String>,
    pub verified_only: bool,
    /// Restrict results to E-numbers (coded additives such as E471).
    pub e_number: bool,
    pub page: Option<u32>,
    /// The service caps this at 100.
    pub per_page: Option<u32>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<IngredientSummary>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
    #[serde(default)]
    pub language_matches: Vec<LanguageMatch>,
    #[serde(default)]
    pub fuzzy_suggestions: Vec<FuzzySuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSummary {
    pub id: u64,
    pub name: String,
    pub category: Option<String>,
    pub language_code: String,
    pub halal_status: HalalStatus,
    pub display_status: String,
    pub status_verified: bool,
    pub status_color: String,
    pub image_url: Option<String>,
    pub has_grounding: bool,
    pub has_elaborated_explanation: bool,
    pub is_gemini_enriched: bool,
    pub ai_review: Option<AiReviewSummary>,
    #[serde(default)]
    pub similar_items: Vec<SimilarItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReviewSummary {
    pub ai_review_count: u32,
    pub agreement_percentage: f64,
    pub consensus_status: Option<HalalStatus>,
    pub consensus_confidence: Option<f64>,
    pub analyzed_at: Option<String>,
    #[serde(default)]
    pub opinions: Vec<AiOpinion>,
    pub show_all_opinions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiOpinion {
    pub halal_status: HalalStatus,
    pub confidence: f64,
    pub explanation: String,
    pub food_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarItem {
    pub id: u64,
    pub name: String,
    pub halal_status: HalalStatus,
    pub status_verified: bool,
    pub status_color: String,
    pub ai_review_count: u32,
}

/// Number of matches for the query in another catalog language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageMatch {
    pub language_code: String,
    pub language_name: String,
    pub match_count: u32,
}

/// A near-match returned when exact matches are sparse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzySuggestion {
    pub id: u64,
    pub name: String,
    pub halal_status: HalalStatus,
    pub display_status: String,
    pub status_color: String,
    pub similarity: f64,
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

/// Full record for one ingredient: the search item shape plus explanation,
/// verification and translation fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDetail {
    #[serde(flatten)]
    pub summary: IngredientSummary,
    pub explanation: Option<String>,
    pub food_source: Option<String>,
    pub verified_at: Option<String>,
    pub verification_notes: Option<String>,
    #[serde(default)]
    pub translations: Vec<IngredientTranslation>,
    pub explanation_language: String,
    pub translation_available: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientTranslation {
    pub language_code: String,
    pub translated_name: String,
    pub is_validated: bool,
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

/// Batch submission body for the queue endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub ingredients: Vec<QueuedIngredient>,
    pub device_id: String,
}

/// One submitted name. The classification fields are placeholders that
/// mark the entry as not yet classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedIngredient {
    pub name: String,
    pub halal_status: HalalStatus,
    pub language: String,
    pub confidence: f64,
}

impl QueuedIngredient {
    pub const PLACEHOLDER_LANGUAGE: &'static str = "en";

    pub fn unclassified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            halal_status: HalalStatus::Unknown,
            language: Self::PLACEHOLDER_LANGUAGE.to_string(),
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzeStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub queue_id: Option<String>,
    pub status: AnalyzeStatus,
    pub ingredients: Vec<AnalyzedIngredient>,
    pub total_count: u32,
    pub halal_count: u32,
    pub haram_count: u32,
    pub mushbooh_count: u32,
    pub unknown_count: u32,
    pub completion_percentage: f64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedIngredient {
    pub ocr_item_id: Option<String>,
    pub ingredient_id: Option<u64>,
    pub original_text: String,
    pub display_name: String,
    pub source_language: String,
    pub halal_status: HalalStatus,
    pub confidence: f64,
    pub source: IngredientSource,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
    pub is_verified: bool,
    pub has_grounding: bool,
}
