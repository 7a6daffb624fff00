use js_sys::Promise;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use kaiten_core::GridSpec;

pub(crate) fn js_err(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub(crate) async fn load_tiles(src: &str, grid: GridSpec) -> Result<Vec<String>, String> {
    let image = load_image(src).await?;
    slice_to_data_urls(&image, grid)
}

async fn load_image(src: &str) -> Result<HtmlImageElement, String> {
    let image = HtmlImageElement::new().map_err(js_err)?;
    image.set_cross_origin(Some("anonymous"));
    let promise = Promise::new(&mut |resolve, reject| {
        image.set_onload(Some(&resolve));
        image.set_onerror(Some(&reject));
    });
    image.set_src(src);
    let loaded = JsFuture::from(promise).await;
    image.set_onload(None);
    image.set_onerror(None);
    loaded.map_err(|_| format!("could not load {src}"))?;
    Ok(image)
}

pub(crate) fn slice_to_data_urls(
    image: &HtmlImageElement,
    grid: GridSpec,
) -> Result<Vec<String>, String> {
    let rects = grid
        .tile_rects(image.natural_width(), image.natural_height())
        .map_err(|err| err.to_string())?;
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| "document unavailable".to_string())?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "canvas element unavailable".to_string())?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(js_err)?
        .ok_or_else(|| "2d context unavailable".to_string())?
        .dyn_into()
        .map_err(|_| "2d context unavailable".to_string())?;

    let mut urls = Vec::with_capacity(rects.len());
    for rect in rects {
        canvas.set_width(rect.out_w);
        canvas.set_height(rect.out_h);
        let (out_w, out_h) = (rect.out_w as f64, rect.out_h as f64);
        ctx.clear_rect(0.0, 0.0, out_w, out_h);
        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            image, rect.sx, rect.sy, rect.sw, rect.sh, 0.0, 0.0, out_w, out_h,
        )
        .map_err(js_err)?;
        urls.push(canvas.to_data_url_with_type("image/png").map_err(js_err)?);
    }
    Ok(urls)
}
