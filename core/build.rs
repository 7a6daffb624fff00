use std::collections::HashSet;
use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const ROWS_DEFAULT: u32 = 4;
const COLS_DEFAULT: u32 = 7;
const COUNTDOWN_TICKS_DEFAULT: u32 = 3;
const TICK_MS_DEFAULT: u32 = 1000;
const FAILURE_CLEAR_MS_DEFAULT: u32 = 1200;

#[derive(Deserialize)]
struct CatalogFile {
    default_chapter: Option<String>,
    chapters: Vec<ChapterEntry>,
}

#[derive(Deserialize)]
struct ChapterEntry {
    key: String,
    label: String,
    image: String,
    default_token: String,
    seed_storage_key: Option<String>,
    solved_marker_key: Option<String>,
    next_stage: Option<String>,
    rows: Option<u32>,
    cols: Option<u32>,
    move_limit: Option<u32>,
    undo_restores_moves: Option<bool>,
    countdown_ticks: Option<u32>,
    tick_ms: Option<u32>,
    failure_clear_ms: Option<u32>,
    token_mixing: Option<bool>,
    #[serde(default)]
    answers: Vec<AnswerEntry>,
}

#[derive(Deserialize)]
struct AnswerEntry {
    id: String,
    label: Option<String>,
    expected: String,
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("missing CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir.parent().unwrap_or(&manifest_dir);
    let env_path = workspace_root.join(".env");
    let env_local_path = workspace_root.join(".env.local");

    let _ = dotenvy::from_filename(&env_local_path);
    let _ = dotenvy::from_filename(&env_path);

    println!("cargo:rerun-if-env-changed=CHAPTER_CATALOG_PATH");
    println!("cargo:rerun-if-changed={}", env_path.display());
    println!("cargo:rerun-if-changed={}", env_local_path.display());

    let catalog_path = resolve_catalog_path(workspace_root);
    println!("cargo:rerun-if-changed={}", catalog_path.display());

    let contents = fs::read_to_string(&catalog_path).unwrap_or_else(|err| {
        panic!(
            "failed to read chapter catalog at {}: {err}",
            catalog_path.display()
        )
    });

    let catalog: CatalogFile = toml::from_str(&contents).unwrap_or_else(|err| {
        panic!(
            "failed to parse chapter catalog at {}: {err}",
            catalog_path.display()
        )
    });

    if catalog.chapters.is_empty() {
        panic!("chapter catalog {} has no entries", catalog_path.display());
    }

    validate_entries(&catalog.chapters, &catalog_path);

    let default_key = catalog
        .default_chapter
        .as_deref()
        .unwrap_or(catalog.chapters[0].key.as_str());
    if !catalog.chapters.iter().any(|entry| entry.key == default_key) {
        panic!(
            "default_chapter '{}' not found in {}",
            default_key,
            catalog_path.display()
        );
    }

    let mut output = String::new();
    writeln!(
        &mut output,
        "pub const DEFAULT_CHAPTER_KEY: &str = {};",
        rust_string(default_key)
    )
    .unwrap();
    writeln!(&mut output).unwrap();
    writeln!(&mut output, "pub const CHAPTER_CATALOG: &[ChapterConfig] = &[").unwrap();

    for entry in &catalog.chapters {
        let seed_key = entry
            .seed_storage_key
            .clone()
            .unwrap_or_else(|| format!("kaiten.{}.seed", entry.key));
        let marker_key = entry
            .solved_marker_key
            .clone()
            .unwrap_or_else(|| format!("kaiten.{}.solved", entry.key));
        let undo_policy = if entry.undo_restores_moves.unwrap_or(false) {
            "UndoBudgetPolicy::RestoreCount"
        } else {
            "UndoBudgetPolicy::KeepCount"
        };

        writeln!(&mut output, "    ChapterConfig {{").unwrap();
        writeln!(&mut output, "        key: {},", rust_string(&entry.key)).unwrap();
        writeln!(&mut output, "        label: {},", rust_string(&entry.label)).unwrap();
        writeln!(&mut output, "        image_src: {},", rust_string(&entry.image)).unwrap();
        writeln!(
            &mut output,
            "        default_token: {},",
            rust_string(&entry.default_token)
        )
        .unwrap();
        writeln!(&mut output, "        seed_storage_key: {},", rust_string(&seed_key)).unwrap();
        writeln!(
            &mut output,
            "        solved_marker_key: {},",
            rust_string(&marker_key)
        )
        .unwrap();
        writeln!(&mut output, "        answers: &[").unwrap();
        for answer in &entry.answers {
            let label = answer.label.as_deref().unwrap_or(answer.id.as_str());
            writeln!(
                &mut output,
                "            AnswerSpec {{ id: {}, label: {}, expected: {} }},",
                rust_string(&answer.id),
                rust_string(label),
                rust_string(&answer.expected)
            )
            .unwrap();
        }
        writeln!(&mut output, "        ],").unwrap();
        match &entry.next_stage {
            Some(target) => {
                writeln!(&mut output, "        next_stage: Some({}),", rust_string(target)).unwrap()
            }
            None => writeln!(&mut output, "        next_stage: None,").unwrap(),
        }
        writeln!(&mut output, "        rules: PuzzleRules {{").unwrap();
        writeln!(
            &mut output,
            "            grid: GridSpec {{ rows: {}, cols: {} }},",
            entry.rows.unwrap_or(ROWS_DEFAULT),
            entry.cols.unwrap_or(COLS_DEFAULT)
        )
        .unwrap();
        match entry.move_limit {
            Some(limit) => writeln!(&mut output, "            move_limit: Some({limit}),").unwrap(),
            None => writeln!(&mut output, "            move_limit: None,").unwrap(),
        }
        writeln!(&mut output, "            undo_policy: {undo_policy},").unwrap();
        writeln!(
            &mut output,
            "            countdown_ticks: {},",
            entry.countdown_ticks.unwrap_or(COUNTDOWN_TICKS_DEFAULT)
        )
        .unwrap();
        writeln!(
            &mut output,
            "            tick_ms: {},",
            entry.tick_ms.unwrap_or(TICK_MS_DEFAULT)
        )
        .unwrap();
        writeln!(
            &mut output,
            "            failure_clear_ms: {},",
            entry.failure_clear_ms.unwrap_or(FAILURE_CLEAR_MS_DEFAULT)
        )
        .unwrap();
        writeln!(
            &mut output,
            "            token_mixing: {},",
            entry.token_mixing.unwrap_or(true)
        )
        .unwrap();
        writeln!(&mut output, "        }},").unwrap();
        writeln!(&mut output, "    }},").unwrap();
    }

    writeln!(&mut output, "];").unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("missing OUT_DIR"));
    let out_path = out_dir.join("chapter_catalog.rs");
    fs::write(&out_path, output).unwrap_or_else(|err| {
        panic!("failed to write {}: {err}", out_path.display())
    });
}

fn resolve_catalog_path(workspace_root: &Path) -> PathBuf {
    let env_value = env::var("CHAPTER_CATALOG_PATH").ok();
    let raw_path = match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => workspace_root.join("chapters/catalog.toml"),
    };
    if raw_path.is_relative() {
        workspace_root.join(raw_path)
    } else {
        raw_path
    }
}

fn rust_string(value: &str) -> String {
    format!("{:?}", value)
}

fn validate_entries(entries: &[ChapterEntry], catalog_path: &Path) {
    let mut keys = HashSet::new();

    for entry in entries {
        if entry.key.trim().is_empty() {
            panic!("chapter key cannot be empty in {}", catalog_path.display());
        }
        if entry.image.trim().is_empty() {
            panic!(
                "chapter '{}' image cannot be empty in {}",
                entry.key,
                catalog_path.display()
            );
        }
        if entry.rows == Some(0) || entry.cols == Some(0) {
            panic!(
                "chapter '{}' has an empty grid in {}",
                entry.key,
                catalog_path.display()
            );
        }
        if entry.move_limit == Some(0) {
            panic!(
                "chapter '{}' move_limit must be positive (omit it for unlimited) in {}",
                entry.key,
                catalog_path.display()
            );
        }
        let mut answer_ids = HashSet::new();
        for answer in &entry.answers {
            if answer.expected.trim() != answer.expected || answer.expected.is_empty() {
                panic!(
                    "chapter '{}' answer '{}' must be non-empty without surrounding whitespace in {}",
                    entry.key,
                    answer.id,
                    catalog_path.display()
                );
            }
            if !answer_ids.insert(answer.id.clone()) {
                panic!(
                    "chapter '{}' has duplicate answer id '{}' in {}",
                    entry.key,
                    answer.id,
                    catalog_path.display()
                );
            }
        }
        if !keys.insert(entry.key.to_ascii_lowercase()) {
            panic!(
                "duplicate chapter key '{}' in {}",
                entry.key,
                catalog_path.display()
            );
        }
    }
}
