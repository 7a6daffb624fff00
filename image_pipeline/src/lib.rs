use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use img_parts::{Bytes, ImageEXIF};
use kaiten_core::{GridError, GridSpec, QuarterTurns, TileRect};

#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("expected {expected} tile rotations, got {actual}")]
    TileCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SliceConfig {
    pub max_dim: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub image: RgbaImage,
}

impl Tile {
    pub fn to_png(&self) -> Result<Vec<u8>, SliceError> {
        encode_png(&self.image)
    }
}

#[derive(Debug, Clone)]
pub struct TileSet {
    pub grid: GridSpec,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles: Vec<Tile>,
}

pub struct TileSlicer {
    config: SliceConfig,
}

impl TileSlicer {
    pub fn new(config: SliceConfig) -> Self {
        Self { config }
    }

    pub fn slice(&self, bytes: &[u8], grid: GridSpec) -> Result<TileSet, SliceError> {
        let source = decode_oriented_rgba8(bytes)?;
        let source = resize_to_max_dim(source, self.config.max_dim);
        slice_image(&source, grid)
    }
}

pub fn decode_oriented_rgba8(bytes: &[u8]) -> Result<RgbaImage, SliceError> {
    let image =
        image::load_from_memory(bytes).map_err(|err| SliceError::Decode(err.to_string()))?;
    Ok(apply_exif_orientation(
        image.to_rgba8(),
        extract_exif_orientation(bytes),
    ))
}

pub fn slice_image(source: &RgbaImage, grid: GridSpec) -> Result<TileSet, SliceError> {
    let (width, height) = source.dimensions();
    let rects = grid.tile_rects(width, height)?;
    let (tile_width, tile_height) = rects
        .first()
        .map(|rect| (rect.out_w, rect.out_h))
        .unwrap_or((0, 0));
    let tiles = rects
        .iter()
        .map(|rect| {
            let (row, col) = grid.row_col(rect.index);
            Tile {
                index: rect.index,
                row,
                col,
                image: crop_tile(source, rect),
            }
        })
        .collect();
    Ok(TileSet {
        grid,
        tile_width,
        tile_height,
        tiles,
    })
}

pub fn compose_board(set: &TileSet, turns: &[QuarterTurns]) -> Result<RgbaImage, SliceError> {
    if turns.len() != set.tiles.len() {
        return Err(SliceError::TileCount {
            expected: set.tiles.len(),
            actual: turns.len(),
        });
    }
    let (cell_w, cell_h) = (set.tile_width, set.tile_height);
    let mut board = RgbaImage::new(cell_w * set.grid.cols, cell_h * set.grid.rows);
    for (tile, turn) in set.tiles.iter().zip(turns) {
        let rotated = rotate_quarters(&tile.image, *turn);
        let (rot_w, rot_h) = rotated.dimensions();
        let vis_w = rot_w.min(cell_w);
        let vis_h = rot_h.min(cell_h);
        let visible = image::imageops::crop_imm(
            &rotated,
            (rot_w - vis_w) / 2,
            (rot_h - vis_h) / 2,
            vis_w,
            vis_h,
        )
        .to_image();
        let x = tile.col * cell_w + (cell_w - vis_w) / 2;
        let y = tile.row * cell_h + (cell_h - vis_h) / 2;
        image::imageops::replace(&mut board, &visible, x as i64, y as i64);
    }
    Ok(board)
}

pub fn rotate_quarters(image: &RgbaImage, turn: QuarterTurns) -> RgbaImage {
    match turn.get() {
        1 => image::imageops::rotate90(image),
        2 => image::imageops::rotate180(image),
        3 => image::imageops::rotate270(image),
        _ => image.clone(),
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, SliceError> {
    let (width, height) = image.dimensions();
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|err| SliceError::Encode(err.to_string()))?;
    Ok(out)
}

fn crop_tile(source: &RgbaImage, rect: &TileRect) -> RgbaImage {
    let (width, height) = source.dimensions();
    let x0 = (rect.sx.round() as u32).min(width - 1);
    let y0 = (rect.sy.round() as u32).min(height - 1);
    let x1 = ((rect.sx + rect.sw).round() as u32).clamp(x0 + 1, width);
    let y1 = ((rect.sy + rect.sh).round() as u32).clamp(y0 + 1, height);
    let cropped = image::imageops::crop_imm(source, x0, y0, x1 - x0, y1 - y0).to_image();
    if cropped.dimensions() == (rect.out_w, rect.out_h) {
        return cropped;
    }
    image::imageops::resize(&cropped, rect.out_w, rect.out_h, FilterType::Triangle)
}

fn resize_to_max_dim(image: RgbaImage, max_dim: Option<u32>) -> RgbaImage {
    let Some(max_dim) = max_dim.filter(|dim| *dim > 0) else {
        return image;
    };
    let (width, height) = image.dimensions();
    let max_axis = width.max(height);
    if max_axis <= max_dim {
        return image;
    }
    let scale = max_dim as f32 / max_axis as f32;
    let next_width = ((width as f32) * scale).round().max(1.0) as u32;
    let next_height = ((height as f32) * scale).round().max(1.0) as u32;
    image::imageops::resize(&image, next_width, next_height, FilterType::Lanczos3)
}

pub fn extract_exif(bytes: &[u8]) -> Option<Vec<u8>> {
    let data = Bytes::copy_from_slice(bytes);
    if let Ok(jpeg) = img_parts::jpeg::Jpeg::from_bytes(data.clone()) {
        if let Some(exif) = jpeg.exif() {
            return Some(exif.as_ref().to_vec());
        }
    }
    if let Ok(png) = img_parts::png::Png::from_bytes(data.clone()) {
        if let Some(exif) = png.exif() {
            return Some(exif.as_ref().to_vec());
        }
    }
    if let Ok(webp) = img_parts::webp::WebP::from_bytes(data) {
        if let Some(exif) = webp.exif() {
            return Some(exif.as_ref().to_vec());
        }
    }
    None
}

pub fn extract_exif_orientation(bytes: &[u8]) -> Option<u16> {
    let exif = extract_exif(bytes)?;
    parse_exif_orientation(&exif)
}

#[derive(Clone, Copy)]
enum ExifEndian {
    Little,
    Big,
}

const ORIENTATION_TAG: u16 = 0x0112;
const SHORT_TYPE: u16 = 3;

fn parse_exif_orientation(exif: &[u8]) -> Option<u16> {
    let data = exif.strip_prefix(b"Exif\0\0").unwrap_or(exif);
    if data.len() < 8 {
        return None;
    }
    let endian = match &data[..2] {
        b"II" => ExifEndian::Little,
        b"MM" => ExifEndian::Big,
        _ => return None,
    };
    if read_exif_u16(data, 2, endian)? != 42 {
        return None;
    }
    let ifd_offset = read_exif_u32(data, 4, endian)? as usize;
    let entries = read_exif_u16(data, ifd_offset, endian)? as usize;
    for entry in 0..entries {
        let offset = ifd_offset + 2 + entry * 12;
        if read_exif_u16(data, offset, endian)? != ORIENTATION_TAG {
            continue;
        }
        let field_type = read_exif_u16(data, offset + 2, endian)?;
        let count = read_exif_u32(data, offset + 4, endian)?;
        if field_type != SHORT_TYPE || count == 0 {
            return None;
        }
        // A single SHORT sits inline at the start of the value slot.
        let value = read_exif_u16(data, offset + 8, endian)?;
        return (value != 0).then_some(value);
    }
    None
}

fn read_exif_u16(data: &[u8], offset: usize, endian: ExifEndian) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(match endian {
        ExifEndian::Little => u16::from_le_bytes([bytes[0], bytes[1]]),
        ExifEndian::Big => u16::from_be_bytes([bytes[0], bytes[1]]),
    })
}

fn read_exif_u32(data: &[u8], offset: usize, endian: ExifEndian) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(match endian {
        ExifEndian::Little => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        ExifEndian::Big => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    })
}

fn apply_exif_orientation(image: RgbaImage, orientation: Option<u16>) -> RgbaImage {
    match orientation {
        Some(2) => image::imageops::flip_horizontal(&image),
        Some(3) => image::imageops::rotate180(&image),
        Some(4) => image::imageops::flip_vertical(&image),
        Some(5) => {
            let flipped = image::imageops::flip_horizontal(&image);
            image::imageops::rotate270(&flipped)
        }
        Some(6) => image::imageops::rotate90(&image),
        Some(7) => {
            let flipped = image::imageops::flip_horizontal(&image);
            image::imageops::rotate90(&flipped)
        }
        Some(8) => image::imageops::rotate270(&image),
        _ => image,
    }
}
