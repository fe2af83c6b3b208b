//! In-memory stand-in for the HalalLens ingredient API.
//!
//! Serves the three endpoints the client uses over a small fixed catalog.
//! `MockConfig` lets tests slow every route down or force every route to
//! answer with a fixed status, which is how timeouts and error
//! classification get exercised end to end.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use axum::http::StatusCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HalalStatus {
    Halal,
    Haram,
    Mushbooh,
    Unknown,
    NotFood,
}

impl HalalStatus {
    fn display(self) -> &'static str {
        match self {
            HalalStatus::Halal => "Halal",
            HalalStatus::Haram => "Haram",
            HalalStatus::Mushbooh => "Doubtful",
            HalalStatus::Unknown => "Unknown",
            HalalStatus::NotFood => "Not food",
        }
    }

    fn color(self) -> &'static str {
        match self {
            HalalStatus::Halal => "green",
            HalalStatus::Haram => "red",
            HalalStatus::Mushbooh => "orange",
            HalalStatus::Unknown | HalalStatus::NotFood => "gray",
        }
    }
}

pub struct Entry {
    pub id: u64,
    pub name: &'static str,
    pub slug: &'static str,
    pub category: Option<&'static str>,
    pub language_code: &'static str,
    pub status: HalalStatus,
    pub verified: bool,
    pub explanation: Option<&'static str>,
    pub food_source: Option<&'static str>,
    pub translations: &'static [(&'static str, &'static str)],
}

impl Entry {
    /// E-numbers look like `E471` or `E160a`.
    fn is_e_number(&self) -> bool {
        let mut chars = self.name.chars();
        chars.next() == Some('E') && chars.next().is_some_and(|c| c.is_ascii_digit())
    }
}

pub const CATALOG: &[Entry] = &[
    Entry {
        id: 1,
        name: "gelatin",
        slug: "gelatin",
        category: Some("animal"),
        language_code: "en",
        status: HalalStatus::Haram,
        verified: true,
        explanation: Some("Usually produced from pork skin and bones."),
        food_source: Some("animal"),
        translations: &[("no", "gelatin"), ("ar", "جيلاتين")],
    },
    Entry {
        id: 2,
        name: "sugar",
        slug: "sugar",
        category: Some("sweetener"),
        language_code: "en",
        status: HalalStatus::Halal,
        verified: true,
        explanation: Some("Plant derived."),
        food_source: Some("plant"),
        translations: &[("no", "sukker")],
    },
    Entry {
        id: 3,
        name: "E471",
        slug: "e471",
        category: Some("emulsifier"),
        language_code: "en",
        status: HalalStatus::Mushbooh,
        verified: false,
        explanation: Some("Mono- and diglycerides; the fat may be animal or plant based."),
        food_source: None,
        translations: &[],
    },
    Entry {
        id: 4,
        name: "E120",
        slug: "e120",
        category: Some("colour"),
        language_code: "en",
        status: HalalStatus::Haram,
        verified: true,
        explanation: Some("Carmine, extracted from insects."),
        food_source: Some("insect"),
        translations: &[],
    },
    Entry {
        id: 5,
        name: "salt",
        slug: "salt",
        category: Some("mineral"),
        language_code: "en",
        status: HalalStatus::Halal,
        verified: true,
        explanation: None,
        food_source: Some("mineral"),
        translations: &[("no", "salt")],
    },
    Entry {
        id: 6,
        name: "wine vinegar",
        slug: "wine-vinegar",
        category: Some("condiment"),
        language_code: "en",
        status: HalalStatus::Mushbooh,
        verified: false,
        explanation: None,
        food_source: Some("plant"),
        translations: &[],
    },
    Entry {
        id: 7,
        name: "silica gel",
        slug: "silica-gel",
        category: None,
        language_code: "en",
        status: HalalStatus::NotFood,
        verified: true,
        explanation: Some("Desiccant packet, not an ingredient."),
        food_source: None,
        translations: &[],
    },
    Entry {
        id: 8,
        name: "sukker",
        slug: "sukker",
        category: Some("sweetener"),
        language_code: "no",
        status: HalalStatus::Halal,
        verified: true,
        explanation: None,
        food_source: Some("plant"),
        translations: &[("en", "sugar")],
    },
    Entry {
        id: 9,
        name: "gelatin",
        slug: "gelatin",
        category: Some("animal"),
        language_code: "no",
        status: HalalStatus::Haram,
        verified: false,
        explanation: None,
        food_source: Some("animal"),
        translations: &[("en", "gelatin")],
    },
];

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Summary {
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
    pub ai_review: Option<serde_json::Value>,
    pub similar_items: Vec<Similar>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Similar {
    pub id: u64,
    pub name: String,
    pub halal_status: HalalStatus,
    pub status_verified: bool,
    pub status_color: String,
    pub ai_review_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LanguageMatch {
    pub language_code: String,
    pub language_name: String,
    pub match_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuzzySuggestion {
    pub id: u64,
    pub name: String,
    pub halal_status: HalalStatus,
    pub display_status: String,
    pub status_color: String,
    pub similarity: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<Summary>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
    pub language_matches: Vec<LanguageMatch>,
    pub fuzzy_suggestions: Vec<FuzzySuggestion>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Translation {
    pub language_code: String,
    pub translated_name: String,
    pub is_validated: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Detail {
    #[serde(flatten)]
    pub summary: Summary,
    pub explanation: Option<String>,
    pub food_source: Option<String>,
    pub verified_at: Option<String>,
    pub verification_notes: Option<String>,
    pub translations: Vec<Translation>,
    pub explanation_language: String,
    pub translation_available: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: String,
    pub status: Option<HalalStatus>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub verified_only: Option<bool>,
    pub e_number: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Submission {
    pub ingredients: Vec<SubmittedIngredient>,
    pub device_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmittedIngredient {
    pub name: String,
    pub halal_status: HalalStatus,
    pub language: String,
    pub confidence: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzedItem {
    pub ocr_item_id: Option<String>,
    pub ingredient_id: Option<u64>,
    pub original_text: String,
    pub display_name: String,
    pub source_language: String,
    pub halal_status: HalalStatus,
    pub confidence: f64,
    pub source: String,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
    pub is_verified: bool,
    pub has_grounding: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub queue_id: Option<String>,
    pub status: String,
    pub ingredients: Vec<AnalyzedItem>,
    pub total_count: u32,
    pub halal_count: u32,
    pub haram_count: u32,
    pub mushbooh_count: u32,
    pub unknown_count: u32,
    pub completion_percentage: f64,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Fault injection applied to every route before it runs.
#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    pub latency: Duration,
    pub forced: Option<(StatusCode, String)>,
}

impl MockConfig {
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_forced_status(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.forced = Some((status, body.into()));
        self
    }
}

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;
const FUZZY_THRESHOLD: f64 = 0.5;
const FUZZY_LIMIT: usize = 5;

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let config = Arc::new(config);
    Router::new()
        .route("/v1/public/ingredients", get(search))
        .route("/v1/public/ingredients/{lang}/{name}", get(detail))
        .route("/v1/queue/ingredients/json", post(analyze))
        .layer(middleware::from_fn_with_state(config.clone(), inject_faults))
        .layer(TraceLayer::new_for_http())
        .with_state(config)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn inject_faults(State(config): State<Arc<MockConfig>>, request: Request, next: Next) -> Response {
    if !config.latency.is_zero() {
        tokio::time::sleep(config.latency).await;
    }
    if let Some((status, body)) = &config.forced {
        return (*status, body.clone()).into_response();
    }
    let accepts_json = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_none_or(|v| v.contains("application/json") || v.contains("*/*"));
    if !accepts_json {
        return (StatusCode::NOT_ACCEPTABLE, "only application/json is served").into_response();
    }
    next.run(request).await
}

async fn search(Query(query): Query<SearchQuery>) -> Json<SearchResponse> {
    let needle = query.search.trim().to_lowercase();
    let language = query.language.as_deref().unwrap_or("en");
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

    let matches: Vec<&Entry> = CATALOG
        .iter()
        .filter(|e| e.language_code == language && e.name.to_lowercase().contains(&needle))
        .filter(|e| query.status.is_none_or(|s| e.status == s))
        .filter(|e| {
            query
                .category
                .as_deref()
                .is_none_or(|c| e.category.is_some_and(|ec| ec.eq_ignore_ascii_case(c)))
        })
        .filter(|e| !query.verified_only.unwrap_or(false) || e.verified)
        .filter(|e| !query.e_number.unwrap_or(false) || e.is_e_number())
        .collect();

    let total = matches.len() as u32;
    let pages = total.div_ceil(per_page);
    let items = matches
        .iter()
        .skip((page - 1).saturating_mul(per_page) as usize)
        .take(per_page as usize)
        .map(|e| summary(e))
        .collect();

    let fuzzy_suggestions = if matches.is_empty() {
        fuzzy(&needle, language)
    } else {
        Vec::new()
    };

    Json(SearchResponse {
        items,
        total: u64::from(total),
        page,
        per_page,
        pages,
        language_matches: language_matches(&needle, language),
        fuzzy_suggestions,
    })
}

async fn detail(Path((lang, name)): Path<(String, String)>) -> Result<Json<Detail>, (StatusCode, String)> {
    let entry = CATALOG
        .iter()
        .find(|e| e.language_code == lang && e.slug == name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("ingredient not found: {lang}/{name}")))?;

    Ok(Json(Detail {
        summary: summary(entry),
        explanation: entry.explanation.map(str::to_string),
        food_source: entry.food_source.map(str::to_string),
        verified_at: entry.verified.then(|| "2025-01-01T00:00:00Z".to_string()),
        verification_notes: None,
        translations: entry
            .translations
            .iter()
            .map(|(code, translated)| Translation {
                language_code: code.to_string(),
                translated_name: translated.to_string(),
                is_validated: entry.verified,
            })
            .collect(),
        explanation_language: entry.language_code.to_string(),
        translation_available: !entry.translations.is_empty(),
        created_at: None,
        updated_at: None,
    }))
}

async fn analyze(Json(submission): Json<Submission>) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    if submission.device_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "device_id is required".to_string()));
    }

    let ingredients: Vec<AnalyzedItem> = submission
        .ingredients
        .iter()
        .map(|submitted| classify(&submitted.name))
        .collect();
    let count = |status: HalalStatus| ingredients.iter().filter(|i| i.halal_status == status).count() as u32;

    Ok(Json(AnalyzeResponse {
        queue_id: Some(Uuid::new_v4().to_string()),
        status: "completed".to_string(),
        total_count: ingredients.len() as u32,
        halal_count: count(HalalStatus::Halal),
        haram_count: count(HalalStatus::Haram),
        mushbooh_count: count(HalalStatus::Mushbooh),
        unknown_count: count(HalalStatus::Unknown),
        completion_percentage: 100.0,
        error: None,
        ingredients,
    }))
}

fn classify(name: &str) -> AnalyzedItem {
    let needle = name.trim();
    let entry = CATALOG
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(needle) || e.slug.eq_ignore_ascii_case(needle));
    match entry {
        Some(e) => AnalyzedItem {
            ocr_item_id: None,
            ingredient_id: Some(e.id),
            original_text: name.to_string(),
            display_name: e.name.to_string(),
            source_language: e.language_code.to_string(),
            halal_status: e.status,
            confidence: if e.verified { 1.0 } else { 0.8 },
            source: "database".to_string(),
            explanation: e.explanation.map(str::to_string),
            image_url: None,
            is_verified: e.verified,
            has_grounding: false,
        },
        None => AnalyzedItem {
            ocr_item_id: None,
            ingredient_id: None,
            original_text: name.to_string(),
            display_name: needle.to_string(),
            source_language: "en".to_string(),
            halal_status: HalalStatus::Unknown,
            confidence: 0.0,
            source: "database".to_string(),
            explanation: None,
            image_url: None,
            is_verified: false,
            has_grounding: false,
        },
    }
}

fn summary(entry: &Entry) -> Summary {
    let similar_items = CATALOG
        .iter()
        .filter(|e| e.id != entry.id && e.language_code == entry.language_code)
        .filter(|e| e.category.is_some() && e.category == entry.category)
        .map(|e| Similar {
            id: e.id,
            name: e.name.to_string(),
            halal_status: e.status,
            status_verified: e.verified,
            status_color: e.status.color().to_string(),
            ai_review_count: 0,
        })
        .collect();

    Summary {
        id: entry.id,
        name: entry.name.to_string(),
        category: entry.category.map(str::to_string),
        language_code: entry.language_code.to_string(),
        halal_status: entry.status,
        display_status: entry.status.display().to_string(),
        status_verified: entry.verified,
        status_color: entry.status.color().to_string(),
        image_url: None,
        has_grounding: false,
        has_elaborated_explanation: entry.explanation.is_some(),
        is_gemini_enriched: false,
        ai_review: None,
        similar_items,
    }
}

/// Match counts for the same needle in every other catalog language.
fn language_matches(needle: &str, language: &str) -> Vec<LanguageMatch> {
    let mut codes: Vec<&str> = CATALOG
        .iter()
        .map(|e| e.language_code)
        .filter(|code| *code != language)
        .collect();
    codes.sort_unstable();
    codes.dedup();

    codes
        .into_iter()
        .filter_map(|code| {
            let match_count = CATALOG
                .iter()
                .filter(|e| e.language_code == code && e.name.to_lowercase().contains(needle))
                .count() as u32;
            (match_count > 0).then(|| LanguageMatch {
                language_code: code.to_string(),
                language_name: language_name(code).to_string(),
                match_count,
            })
        })
        .collect()
}

fn fuzzy(needle: &str, language: &str) -> Vec<FuzzySuggestion> {
    let mut scored: Vec<(f64, &Entry)> = CATALOG
        .iter()
        .filter(|e| e.language_code == language)
        .map(|e| (similarity(needle, &e.name.to_lowercase()), e))
        .filter(|(score, _)| *score >= FUZZY_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(FUZZY_LIMIT)
        .map(|(score, e)| FuzzySuggestion {
            id: e.id,
            name: e.name.to_string(),
            halal_status: e.status,
            display_status: e.status.display().to_string(),
            status_color: e.status.color().to_string(),
            similarity: score,
        })
        .collect()
}

/// Dice coefficient over character bigrams.
fn similarity(a: &str, b: &str) -> f64 {
    let bigrams = |s: &str| -> Vec<(char, char)> {
        let chars: Vec<char> = s.chars().collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };
    let (left, mut right) = (bigrams(a), bigrams(b));
    if left.is_empty() || right.is_empty() {
        return if a == b { 1.0 } else { 0.0 };
    }
    let total = (left.len() + right.len()) as f64;
    let mut shared = 0usize;
    for pair in &left {
        if let Some(pos) = right.iter().position(|p| p == pair) {
            right.swap_remove(pos);
            shared += 1;
        }
    }
    2.0 * shared as f64 / total
}

fn language_name(code: &str) -> &'static str {
    match code {
        "en" => "English",
        "no" => "Norwegian",
        "ar" => "Arabic",
        _ => "Unknown",
    }
}
