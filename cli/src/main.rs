use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kaiten_core::grid::turns_to_values;
use kaiten_core::{
    chapter_by_key, derive_seed, encode_saved_seed, min_moves_to_solve, ChapterConfig,
    QuarterTurns, CHAPTER_CATALOG, DEFAULT_CHAPTER_KEY,
};
use kaiten_tiles::{compose_board, encode_png, SliceConfig, TileSlicer};
use rand::Rng;
use url::Url;

const TOKEN_ALPHABET: &str = "abcdefghjkmnpqrstuvwxyz23456789";

#[derive(Parser)]
#[command(name = "kaiten", version, about = "Authoring tools for kaiten chapters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List the chapters compiled into the catalog")]
    Chapters,
    #[command(about = "Show the starting grid a chapter and token produce")]
    Seed {
        #[arg(long, default_value = DEFAULT_CHAPTER_KEY)]
        chapter: String,
        #[arg(long)]
        token: Option<String>,
        #[arg(long, env = "KAITEN_BASE_URL")]
        base_url: Option<String>,
    },
    #[command(about = "Generate a random token whose grid fits the chapter's move limit")]
    Token {
        #[arg(long, default_value = DEFAULT_CHAPTER_KEY)]
        chapter: String,
        #[arg(long, default_value_t = 6)]
        len: usize,
        #[arg(long, default_value_t = 50_000)]
        attempts: u32,
    },
    #[command(about = "Cut an image into PNG tiles the way the page does")]
    Slice {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = DEFAULT_CHAPTER_KEY)]
        chapter: String,
        #[arg(long)]
        max_dim: Option<u32>,
    },
    #[command(about = "Render the scrambled board for a chapter and token as one PNG")]
    Preview {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = DEFAULT_CHAPTER_KEY)]
        chapter: String,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        max_dim: Option<u32>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chapters => {
            for entry in CHAPTER_CATALOG {
                let limit = entry
                    .rules
                    .move_limit
                    .map(|limit| limit.to_string())
                    .unwrap_or_else(|| "none".to_string());
                println!(
                    "{}{} ({}) grid={} limit={} answers={} next={}",
                    entry.key,
                    if entry.key == DEFAULT_CHAPTER_KEY { "*" } else { "" },
                    entry.label,
                    entry.rules.grid,
                    limit,
                    entry.answers.len(),
                    entry.next_stage.unwrap_or("-"),
                );
            }
        }
        Commands::Seed {
            chapter,
            token,
            base_url,
        } => {
            let Some(entry) = lookup_chapter(&chapter) else {
                return Ok(());
            };
            let token = token.unwrap_or_else(|| entry.default_token.to_string());
            let seed = chapter_seed(entry, &token);
            print_grid(entry, &seed);
            let moves = min_moves_to_solve(&seed);
            match entry.rules.move_limit {
                Some(limit) if moves > limit => {
                    println!("min_moves: {moves} (exceeds limit {limit}, unsolvable)")
                }
                Some(limit) => println!("min_moves: {moves} (limit {limit})"),
                None => println!("min_moves: {moves}"),
            }
            println!("setup_json: {}", encode_saved_seed(&seed));
            if let Some(base_url) = base_url {
                println!("play_url: {}", build_play_url(&base_url, entry, &token)?);
            }
        }
        Commands::Token {
            chapter,
            len,
            attempts,
        } => {
            let Some(entry) = lookup_chapter(&chapter) else {
                return Ok(());
            };
            let mut rng = rand::rng();
            for _ in 0..attempts.max(1) {
                let token = generate_token(&mut rng, len.max(1));
                let seed = chapter_seed(entry, &token);
                let moves = min_moves_to_solve(&seed);
                if entry.rules.move_limit.map_or(true, |limit| moves <= limit) {
                    println!("token: {token}");
                    println!("min_moves: {moves}");
                    return Ok(());
                }
            }
            eprintln!("no token within {attempts} attempts fits the move limit");
            eprintln!("use ?setup=1 to author a seed by hand instead");
        }
        Commands::Slice {
            image,
            out,
            chapter,
            max_dim,
        } => {
            let Some(entry) = lookup_chapter(&chapter) else {
                return Ok(());
            };
            let bytes = fs::read(&image)?;
            let set = TileSlicer::new(SliceConfig { max_dim }).slice(&bytes, entry.rules.grid)?;
            fs::create_dir_all(&out)?;
            for tile in &set.tiles {
                let path = out.join(format!("tile-{:02}.png", tile.index));
                fs::write(&path, tile.to_png()?)?;
            }
            println!(
                "wrote {} tiles of {}x{} to {}",
                set.tiles.len(),
                set.tile_width,
                set.tile_height,
                out.display()
            );
        }
        Commands::Preview {
            image,
            out,
            chapter,
            token,
            max_dim,
        } => {
            let Some(entry) = lookup_chapter(&chapter) else {
                return Ok(());
            };
            let token = token.unwrap_or_else(|| entry.default_token.to_string());
            let seed = chapter_seed(entry, &token);
            let bytes = fs::read(&image)?;
            let set = TileSlicer::new(SliceConfig { max_dim }).slice(&bytes, entry.rules.grid)?;
            let board = compose_board(&set, &seed)?;
            fs::write(&out, encode_png(&board)?)?;
            println!("preview: {}", out.display());
        }
    }

    Ok(())
}

fn lookup_chapter(key: &str) -> Option<&'static ChapterConfig> {
    let found = chapter_by_key(key);
    if found.is_none() {
        eprintln!("unknown chapter: {key}");
        eprintln!("available chapters:");
        for entry in CHAPTER_CATALOG {
            eprintln!("  {} ({})", entry.key, entry.label);
        }
    }
    found
}

fn chapter_seed(entry: &ChapterConfig, token: &str) -> Vec<QuarterTurns> {
    derive_seed(entry.key, token, entry.rules.grid, entry.rules.token_mixing)
}

fn print_grid(entry: &ChapterConfig, seed: &[QuarterTurns]) {
    let values = turns_to_values(seed);
    let cols = entry.rules.grid.cols.max(1) as usize;
    println!("grid {} ({}):", entry.rules.grid, entry.key);
    for row in values.chunks(cols) {
        let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
        println!("  {}", line.join(" "));
    }
}

fn generate_token(rng: &mut impl Rng, len: usize) -> String {
    let alphabet = TOKEN_ALPHABET.as_bytes();
    let mut token = String::with_capacity(len);
    for _ in 0..len {
        let idx = rng.random_range(0..alphabet.len());
        token.push(alphabet[idx] as char);
    }
    token
}

fn build_play_url(base_url: &str, entry: &ChapterConfig, token: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    url.query_pairs_mut()
        .append_pair("chapter", entry.key)
        .append_pair("token", token);
    Ok(url)
}
