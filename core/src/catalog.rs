use crate::budget::UndoBudgetPolicy;
use crate::grid::GridSpec;
use crate::rules::PuzzleRules;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnswerSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub expected: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct ChapterConfig {
    pub key: &'static str,
    pub label: &'static str,
    pub image_src: &'static str,
    pub default_token: &'static str,
    pub seed_storage_key: &'static str,
    pub solved_marker_key: &'static str,
    pub answers: &'static [AnswerSpec],
    pub next_stage: Option<&'static str>,
    pub rules: PuzzleRules,
}

// DEFAULT_CHAPTER_KEY and CHAPTER_CATALOG, generated from chapters/catalog.toml.
include!(concat!(env!("OUT_DIR"), "/chapter_catalog.rs"));

pub fn chapter_by_key(key: &str) -> Option<&'static ChapterConfig> {
    let trimmed = key.trim();
    CHAPTER_CATALOG
        .iter()
        .find(|entry| entry.key.eq_ignore_ascii_case(trimmed))
}

pub fn default_chapter() -> &'static ChapterConfig {
    chapter_by_key(DEFAULT_CHAPTER_KEY).unwrap_or(&CHAPTER_CATALOG[0])
}

pub fn chapter_or_default(key: Option<&str>) -> &'static ChapterConfig {
    key.and_then(chapter_by_key).unwrap_or_else(default_chapter)
}
