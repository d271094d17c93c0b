//! Pure slug-analysis functions behind the pattern detection engine.
//!
//! Everything here is side-effect free: the engine takes a batch of slugs and
//! produces the inferred naming convention. Storage and concurrency live in
//! [`crate::application::services::PatternService`].

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::domain::entities::{CaseStyle, PatternProfile};

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(19|20)\d{2}").unwrap());
static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(st|nd|rd|th)$").unwrap());

/// Common retail and tech brand names; a token matching one of these marks
/// the slug as brand-led.
const BRANDS: &[&str] = &[
    "amazon", "target", "walmart", "nike", "apple", "google", "microsoft", "samsung", "sony",
    "dell", "hp", "lenovo", "adidas", "puma", "reebok", "hoka", "under", "armour", "tesla", "ford",
    "toyota", "honda", "starbucks", "mcdonalds", "coca", "cola", "pepsi",
];

/// Call-to-action words typically placed at the end of a slug.
const ACTIONS: &[&str] = &[
    "buy", "shop", "get", "save", "deal", "sale", "free", "try", "start", "join", "download",
    "subscribe", "register", "apply", "order", "purchase", "claim", "grab", "find", "explore",
    "discover", "learn", "watch", "read", "now", "today", "here",
];

/// Feature and benefit qualifiers.
const FEATURES: &[&str] = &[
    "fast", "easy", "smart", "pro", "premium", "best", "top", "new", "latest", "advanced",
    "professional", "expert", "ultimate", "deluxe", "luxury", "affordable", "cheap", "budget",
    "quality", "durable", "reliable",
];

/// Word category used to describe slug structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCategory {
    Brand,
    Action,
    Feature,
    Number,
    Year,
    Ordinal,
    Noun,
}

impl WordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordCategory::Brand => "Brand",
            WordCategory::Action => "Action",
            WordCategory::Feature => "Feature",
            WordCategory::Number => "Number",
            WordCategory::Year => "Year",
            WordCategory::Ordinal => "Ordinal",
            WordCategory::Noun => "Noun",
        }
    }
}

/// Categorizes a single slug token.
pub fn categorize_word(word: &str) -> WordCategory {
    if word.is_empty() {
        return WordCategory::Noun;
    }

    let lower = word.to_ascii_lowercase();

    if BRANDS
        .iter()
        .any(|b| lower.contains(b) || b.contains(lower.as_str()))
    {
        return WordCategory::Brand;
    }

    if ACTIONS.contains(&lower.as_str()) {
        return WordCategory::Action;
    }

    if FEATURES.contains(&lower.as_str()) {
        return WordCategory::Feature;
    }

    if word.chars().all(|c| c.is_ascii_digit()) {
        if YEAR_RE.is_match(word) {
            return WordCategory::Year;
        }
        return WordCategory::Number;
    }

    if YEAR_RE.is_match(word) {
        return WordCategory::Year;
    }

    if ORDINAL_RE.is_match(&lower) {
        return WordCategory::Ordinal;
    }

    WordCategory::Noun
}

/// Per-slug analysis result.
#[derive(Debug, Clone)]
pub struct SlugAnalysis {
    pub tokens: Vec<String>,
    pub word_count: usize,
    pub separator: char,
    pub case: CaseStyle,
    pub structure: String,
    pub ends_with_cta: bool,
}

/// Tokenizes one slug on `.`/`-`/`_` and derives its characteristics.
///
/// Returns `None` for slugs with no tokens at all.
pub fn analyze_slug(slug: &str) -> Option<SlugAnalysis> {
    let separator = ['.', '-', '_']
        .into_iter()
        .find(|sep| slug.contains(*sep))
        .unwrap_or('.');

    let tokens: Vec<String> = slug
        .split(['.', '-', '_'])
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        return None;
    }

    let structure = tokens
        .iter()
        .map(|t| categorize_word(t).as_str())
        .collect::<Vec<_>>()
        .join(".");

    let last = tokens.last().map(String::as_str).unwrap_or("");
    let ends_with_cta = matches!(categorize_word(last), WordCategory::Action);

    Some(SlugAnalysis {
        word_count: tokens.len(),
        separator,
        case: detect_case(&tokens),
        structure,
        ends_with_cta,
        tokens,
    })
}

fn detect_case(tokens: &[String]) -> CaseStyle {
    let mut title = 0usize;
    let mut lower = 0usize;
    let mut upper = 0usize;

    for t in tokens {
        if t.len() > 1 && t.chars().all(|c| !c.is_ascii_lowercase()) {
            upper += 1;
        } else if t.chars().all(|c| !c.is_ascii_uppercase()) {
            lower += 1;
        } else if t.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            title += 1;
        }
    }

    if upper > lower && upper > title {
        CaseStyle::Uppercase
    } else if lower >= title {
        CaseStyle::Lowercase
    } else {
        CaseStyle::Titlecase
    }
}

/// Most common structure string across the batch.
pub fn dominant_structure(analyses: &[SlugAnalysis]) -> String {
    most_common(analyses.iter().map(|a| a.structure.clone()))
        .unwrap_or_else(|| "Noun.Noun.Noun".to_string())
}

/// Most common separator across the batch.
pub fn dominant_separator(analyses: &[SlugAnalysis]) -> char {
    most_common(analyses.iter().map(|a| a.separator)).unwrap_or('.')
}

/// Most common capitalization style across the batch.
pub fn dominant_case(analyses: &[SlugAnalysis]) -> CaseStyle {
    most_common(analyses.iter().map(|a| a.case)).unwrap_or(CaseStyle::Lowercase)
}

/// Mean token count, rounded to one decimal.
pub fn avg_word_count(analyses: &[SlugAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }
    let sum: usize = analyses.iter().map(|a| a.word_count).sum();
    (sum as f64 / analyses.len() as f64 * 10.0).round() / 10.0
}

/// Recurring naming components: tokens appearing in at least two slugs,
/// most frequent first, numerals excluded.
///
/// These are the merchant and category names the suggestion collaborator
/// reuses when biasing new slugs toward the user's style.
pub fn recurring_components(analyses: &[SlugAnalysis], top_n: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for analysis in analyses {
        // Count each token once per slug so one repetitive slug cannot
        // dominate the profile.
        let mut seen = std::collections::HashSet::new();
        for token in &analysis.tokens {
            let lower = token.to_ascii_lowercase();
            if matches!(
                categorize_word(token),
                WordCategory::Number | WordCategory::Year | WordCategory::Ordinal
            ) {
                continue;
            }
            if seen.insert(lower.clone()) {
                *counts.entry(lower).or_default() += 1;
            }
        }
    }

    let mut recurring: Vec<(String, usize)> =
        counts.into_iter().filter(|(_, n)| *n >= 2).collect();
    recurring.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    recurring.into_iter().take(top_n).map(|(t, _)| t).collect()
}

/// Confidence score in [0, 1].
///
/// Weighted consistency: dominant-structure share 50%, word-count variance
/// 20%, separator share 15%, sample size 15%.
pub fn confidence(analyses: &[SlugAnalysis]) -> f64 {
    if analyses.len() < 5 {
        return 0.0;
    }

    let structure_share = most_common_share(analyses.iter().map(|a| a.structure.clone()));
    let separator_share = most_common_share(analyses.iter().map(|a| a.separator));

    let counts: Vec<f64> = analyses.iter().map(|a| a.word_count as f64).collect();
    let var = variance(&counts);
    let variance_score = if var < 1.0 {
        0.2
    } else if var < 2.0 {
        0.1
    } else {
        0.0
    };

    let sample_score = if analyses.len() >= 10 { 0.15 } else { 0.1 };

    (structure_share * 0.5 + variance_score + separator_share * 0.15 + sample_score).clamp(0.0, 1.0)
}

/// Runs the full analysis over a user's slug history.
///
/// Returns `None` when fewer than `min_links` slugs tokenize successfully.
pub fn build_profile(
    user_id: &str,
    slugs: &[String],
    min_links: i64,
    now: DateTime<Utc>,
) -> Option<PatternProfile> {
    let analyses: Vec<SlugAnalysis> = slugs.iter().filter_map(|s| analyze_slug(s)).collect();

    if (analyses.len() as i64) < min_links {
        return None;
    }

    Some(PatternProfile {
        user_id: user_id.to_string(),
        last_analyzed: now,
        components: recurring_components(&analyses, 5),
        structure: dominant_structure(&analyses),
        separator: dominant_separator(&analyses),
        avg_word_count: avg_word_count(&analyses),
        capitalization: dominant_case(&analyses),
        confidence: confidence(&analyses),
        links_analyzed: analyses.len() as i64,
    })
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn most_common<T: Eq + std::hash::Hash + Clone>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    counts.into_iter().max_by_key(|(_, n)| *n).map(|(t, _)| t)
}

fn most_common_share<T: Eq + std::hash::Hash>(items: impl Iterator<Item = T>) -> f64 {
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut total = 0usize;
    for item in items {
        *counts.entry(item).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    counts.values().copied().max().unwrap_or(0) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slugs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_categorize_brand() {
        assert_eq!(categorize_word("nike"), WordCategory::Brand);
        assert_eq!(categorize_word("Amazon"), WordCategory::Brand);
    }

    #[test]
    fn test_categorize_action_and_feature() {
        assert_eq!(categorize_word("buy"), WordCategory::Action);
        assert_eq!(categorize_word("premium"), WordCategory::Feature);
    }

    #[test]
    fn test_categorize_year_number_ordinal() {
        assert_eq!(categorize_word("2024"), WordCategory::Year);
        assert_eq!(categorize_word("42"), WordCategory::Number);
        assert_eq!(categorize_word("3rd"), WordCategory::Ordinal);
    }

    #[test]
    fn test_categorize_defaults_to_noun() {
        assert_eq!(categorize_word("widget"), WordCategory::Noun);
    }

    #[test]
    fn test_analyze_slug_tokenizes_mixed_separators() {
        let a = analyze_slug("nike.air-max.sale").unwrap();
        assert_eq!(a.tokens, vec!["nike", "air", "max", "sale"]);
        assert_eq!(a.word_count, 4);
        assert_eq!(a.separator, '.');
        assert!(a.ends_with_cta);
    }

    #[test]
    fn test_analyze_slug_structure() {
        let a = analyze_slug("nike.shoes.buy").unwrap();
        assert_eq!(a.structure, "Brand.Noun.Action");
    }

    #[test]
    fn test_analyze_slug_empty() {
        assert!(analyze_slug("...").is_none());
    }

    #[test]
    fn test_case_detection() {
        assert_eq!(
            analyze_slug("nike.shoes.sale").unwrap().case,
            CaseStyle::Lowercase
        );
        assert_eq!(
            analyze_slug("Nike.Shoes.Sale").unwrap().case,
            CaseStyle::Titlecase
        );
        assert_eq!(
            analyze_slug("NIKE.SHOES.SALE").unwrap().case,
            CaseStyle::Uppercase
        );
    }

    #[test]
    fn test_dominant_case_picks_majority() {
        let analyses: Vec<_> = slugs(&["nike.shoes", "adidas.boots", "Promo.Deals"])
            .iter()
            .filter_map(|s| analyze_slug(s))
            .collect();
        assert_eq!(dominant_case(&analyses), CaseStyle::Lowercase);
        assert_eq!(dominant_case(&[]), CaseStyle::Lowercase);
    }

    #[test]
    fn test_recurring_components_require_two_occurrences() {
        let analyses: Vec<_> = slugs(&[
            "nike.shoes.sale",
            "nike.jacket.buy",
            "nike.socks.deal",
            "adidas.shoes.get",
        ])
        .iter()
        .filter_map(|s| analyze_slug(s))
        .collect();

        let components = recurring_components(&analyses, 5);
        assert_eq!(components[0], "nike");
        assert!(components.contains(&"shoes".to_string()));
        assert!(!components.contains(&"jacket".to_string()));
    }

    #[test]
    fn test_recurring_components_exclude_numerals() {
        let analyses: Vec<_> = slugs(&["promo.2024.a", "promo.2024.b", "promo.2024.c"])
            .iter()
            .filter_map(|s| analyze_slug(s))
            .collect();

        let components = recurring_components(&analyses, 5);
        assert!(components.contains(&"promo".to_string()));
        assert!(!components.contains(&"2024".to_string()));
    }

    #[test]
    fn test_confidence_zero_below_min_sample() {
        let analyses: Vec<_> = slugs(&["a.b", "c.d"])
            .iter()
            .filter_map(|s| analyze_slug(s))
            .collect();
        assert_eq!(confidence(&analyses), 0.0);
    }

    #[test]
    fn test_confidence_high_for_consistent_history() {
        let raw: Vec<String> = (0..12).map(|i| format!("nike.item{i}.buy")).collect();
        let analyses: Vec<_> = raw.iter().filter_map(|s| analyze_slug(s)).collect();
        let c = confidence(&analyses);
        assert!(c > 0.9, "expected near-max confidence, got {c}");
    }

    #[test]
    fn test_confidence_lower_for_inconsistent_history() {
        let raw = slugs(&[
            "nike.shoes.buy",
            "x-y-z-w-q",
            "PROMO_2024",
            "a.b",
            "one-two-three",
            "Deals.Today",
        ]);
        let analyses: Vec<_> = raw.iter().filter_map(|s| analyze_slug(s)).collect();
        let c = confidence(&analyses);
        assert!(c < 0.6, "expected low confidence, got {c}");
    }

    #[test]
    fn test_build_profile_full() {
        let raw: Vec<String> = vec![
            "nike.air-max.sale".to_string(),
            "nike.pegasus.buy".to_string(),
            "nike.jordan.shop".to_string(),
            "nike.dunk.deal".to_string(),
            "nike.blazer.get".to_string(),
        ];
        let profile = build_profile("u1", &raw, 5, Utc::now()).unwrap();
        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.links_analyzed, 5);
        assert_eq!(profile.components[0], "nike");
        assert_eq!(profile.separator, '.');
        assert_eq!(profile.capitalization, CaseStyle::Lowercase);
        assert!(profile.confidence > 0.0);
    }

    #[test]
    fn test_build_profile_not_enough_data() {
        let raw = slugs(&["a.b", "c.d"]);
        assert!(build_profile("u1", &raw, 5, Utc::now()).is_none());
    }

    #[test]
    fn test_avg_word_count_rounding() {
        let analyses: Vec<_> = slugs(&["a.b.c", "d.e"])
            .iter()
            .filter_map(|s| analyze_slug(s))
            .collect();
        assert_eq!(avg_word_count(&analyses), 2.5);
    }
}
