//! Ordered vocabularies used by the extraction pipeline.
//!
//! Order is significant everywhere in this module: brands are matched
//! first-wins, so longer and more specific names must come before names that
//! could match inside them, and category vocabularies are checked in
//! precedence order.
use crate::model::Category;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid pattern for {what} {value:?}: {source}")]
    Pattern {
        what: &'static str,
        value: String,
        #[source]
        source: regex::Error,
    },
    #[error("catalog entry must be non-empty: {0}")]
    Empty(&'static str),
}

/// One brand with its display name and alternative spellings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrandEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Category keyword lists, checked shoes first, then accessories, then clothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryVocabularies {
    pub shoes: Vec<String>,
    pub accessories: Vec<String>,
    pub clothing: Vec<String>,
}

/// Serializable form of the catalog, as it appears under `catalog:` in the
/// config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    pub brands: Vec<BrandEntry>,
    pub sold_keywords: Vec<String>,
    pub categories: CategoryVocabularies,
}

fn brand(name: &str, aliases: &[&str]) -> BrandEntry {
    BrandEntry {
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            brands: vec![
                // multi-word names first
                brand("The North Face", &["TNF"]),
                brand("Louis Vuitton", &["LV"]),
                brand("New Balance", &[]),
                brand("Stone Island", &[]),
                brand("CP Company", &["C.P. Company", "C.P Company"]),
                brand("Off-White", &["Off White"]),
                brand("Nike", &[]),
                brand("Adidas", &[]),
                brand("Puma", &[]),
                brand("Reebok", &[]),
                brand("Supreme", &[]),
                brand("Balenciaga", &[]),
                brand("Gucci", &[]),
                brand("Yeezy", &[]),
                brand("Jordan", &[]),
                brand("Vans", &[]),
                brand("Converse", &[]),
                brand("Palace", &[]),
                brand("BAPE", &[]),
                brand("Stüssy", &["Stussy"]),
                brand("Carhartt", &[]),
                brand("Dickies", &[]),
            ],
            sold_keywords: words(&[
                "продан",
                "продано",
                "sold",
                "reserved",
                "зарезервирован",
                "не в наличии",
                "нет в наличии",
                "out of stock",
                "❌",
                "✖️",
                "забронирован",
                "бронь",
                "занято",
                "sold out",
            ]),
            categories: CategoryVocabularies {
                shoes: words(&[
                    "shoes", "sneakers", "boots", "кроссовки", "ботинки", "туфли", "обувь",
                ]),
                accessories: words(&[
                    "bag", "watch", "cap", "hat", "accessory", "сумка", "рюкзак", "часы", "очки",
                    "шапка", "кепка",
                ]),
                clothing: words(&[
                    "jacket", "hoodie", "t-shirt", "tee", "sweatshirt", "pants", "jeans", "куртка",
                    "худи", "футболка", "свитшот", "штаны", "джинсы",
                ]),
            },
        }
    }
}

/// Compiled matcher for one brand entry.
#[derive(Debug, Clone)]
pub struct BrandMatcher {
    pub name: String,
    pattern: Regex,
}

impl BrandMatcher {
    pub fn find<'t>(&self, haystack: &'t str) -> Option<regex::Match<'t>> {
        self.pattern.find(haystack)
    }
}

/// Catalog compiled once at startup and shared read-only by every extraction.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) brands: Vec<BrandMatcher>,
    pub(crate) sold_keywords: Vec<String>,
    pub(crate) categories: Vec<(Category, Regex)>,
}

impl Catalog {
    pub fn compile(cfg: &CatalogConfig) -> Result<Self, CatalogError> {
        if cfg.brands.is_empty() {
            return Err(CatalogError::Empty("brands"));
        }
        let mut brands = Vec::with_capacity(cfg.brands.len());
        for entry in &cfg.brands {
            if entry.name.trim().is_empty() {
                return Err(CatalogError::Empty("brand name"));
            }
            let alternatives: Vec<String> = std::iter::once(&entry.name)
                .chain(entry.aliases.iter())
                .filter(|s| !s.trim().is_empty())
                .map(|s| bounded_literal(s.trim()))
                .collect();
            let source = alternatives.join("|");
            let pattern = RegexBuilder::new(&source)
                .case_insensitive(true)
                .build()
                .map_err(|source| CatalogError::Pattern {
                    what: "brand",
                    value: entry.name.clone(),
                    source,
                })?;
            brands.push(BrandMatcher {
                name: entry.name.trim().to_string(),
                pattern,
            });
        }

        let sold_keywords = cfg
            .sold_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let vocabularies = [
            (Category::Shoes, &cfg.categories.shoes),
            (Category::Accessories, &cfg.categories.accessories),
            (Category::Clothing, &cfg.categories.clothing),
        ];
        let mut categories = Vec::with_capacity(vocabularies.len());
        for (category, keywords) in vocabularies {
            let keywords: Vec<String> = keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .map(|k| regex::escape(&k))
                .collect();
            if keywords.is_empty() {
                continue;
            }
            let source = format!(r"\b(?:{})", keywords.join("|"));
            let re = Regex::new(&source).map_err(|source| CatalogError::Pattern {
                what: "category",
                value: category.as_str().to_string(),
                source,
            })?;
            categories.push((category, re));
        }

        Ok(Self {
            brands,
            sold_keywords,
            categories,
        })
    }

    pub fn brands(&self) -> &[BrandMatcher] {
        &self.brands
    }
}

impl Default for Catalog {
    fn default() -> Self {
        // The built-in catalog consists of escaped literals only.
        Self::compile(&CatalogConfig::default()).expect("built-in catalog compiles")
    }
}

/// Escape `literal` and wrap it in word boundaries on whichever ends are word
/// characters. Inner whitespace matches any run of whitespace.
fn bounded_literal(literal: &str) -> String {
    let body = literal
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let starts_word = literal.chars().next().is_some_and(|c| c.is_alphanumeric());
    let ends_word = literal.chars().last().is_some_and(|c| c.is_alphanumeric());
    format!(
        "{}(?:{}){}",
        if starts_word { r"\b" } else { "" },
        body,
        if ends_word { r"\b" } else { "" }
    )
}
