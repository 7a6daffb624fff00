use serde_json::Value;

use crate::grid::{all_upright, turns_to_values, GridSpec, QuarterTurns};

pub const SEED_KEY_SEPARATOR: &str = "::";
const TILE_SALT_BASE: u32 = 0x7117_0000;
const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

pub fn rand_unit(seed: u32, salt: u32) -> f64 {
    let mixed = splitmix32(seed ^ salt.wrapping_mul(0x9E37_79B9));
    let top = mixed >> 8;
    top as f64 / (1u32 << 24) as f64
}

pub fn hash_key(text: &str) -> u32 {
    let mut hash = FNV_OFFSET;
    for unit in text.encode_utf16() {
        hash ^= (unit & 0xFF) as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        hash ^= (unit >> 8) as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    splitmix32(hash)
}

pub fn seed_key(chapter_key: &str, token: &str) -> String {
    format!("{chapter_key}{SEED_KEY_SEPARATOR}{token}")
}

pub fn derive_seed(
    chapter_key: &str,
    token: &str,
    grid: GridSpec,
    token_mixing: bool,
) -> Vec<QuarterTurns> {
    let total = grid.tile_count();
    let seed = hash_key(&seed_key(chapter_key, token));
    let units: Vec<u16> = token.encode_utf16().collect();
    let mut turns = Vec::with_capacity(total);
    for id in 0..total {
        let draw = rand_unit(seed, TILE_SALT_BASE.wrapping_add(id as u32));
        let base = ((draw * 4.0).floor() as u8).min(3);
        let mix = if token_mixing && !units.is_empty() {
            (units[id % units.len()] % 4) as u8
        } else {
            0
        };
        turns.push(QuarterTurns::new(base + mix));
    }
    if total > 0 && all_upright(&turns) {
        turns[0] = QuarterTurns::new(1);
    }
    turns
}

pub fn parse_saved_seed(raw: &str, grid: GridSpec) -> Option<Vec<QuarterTurns>> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let items = value.as_array()?;
    if items.len() != grid.tile_count() {
        return None;
    }
    Some(items.iter().map(coerce_turn).collect())
}

pub fn encode_saved_seed(turns: &[QuarterTurns]) -> String {
    Value::from(turns_to_values(turns)).to_string()
}

fn coerce_turn(value: &Value) -> QuarterTurns {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    };
    match number {
        Some(number) if number.is_finite() => {
            QuarterTurns::from_signed((number + 0.5).floor().rem_euclid(4.0) as i64)
        }
        _ => QuarterTurns::ZERO,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOrigin {
    Saved,
    Blank,
    Derived,
}

#[derive(Clone, Copy, Debug)]
pub struct SeedRequest<'a> {
    pub chapter_key: &'a str,
    pub token: &'a str,
    pub grid: GridSpec,
    pub token_mixing: bool,
    pub setup: bool,
    pub saved: Option<&'a str>,
}

pub fn resolve_seed(request: &SeedRequest<'_>) -> (Vec<QuarterTurns>, SeedOrigin) {
    if let Some(saved) = request
        .saved
        .and_then(|raw| parse_saved_seed(raw, request.grid))
    {
        return (saved, SeedOrigin::Saved);
    }
    if request.setup {
        return (
            vec![QuarterTurns::ZERO; request.grid.tile_count()],
            SeedOrigin::Blank,
        );
    }
    (
        derive_seed(
            request.chapter_key,
            request.token,
            request.grid,
            request.token_mixing,
        ),
        SeedOrigin::Derived,
    )
}
