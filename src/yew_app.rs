use std::rc::Rc;

use gloo::events::EventListener;
use kaiten_core::{PageShowSignal, SessionPhase, StatusTone};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlInputElement, InputEvent, MouseEvent};
use yew::prelude::*;

use crate::app_core::{AnswerView, AppCore, AppSnapshot, TileView};
use crate::app_router;
use crate::puzzle_image;

#[function_component(App)]
pub(crate) fn app() -> Html {
    let core = use_memo((), |_| AppCore::boot());
    let snapshot = use_state(|| core.snapshot());

    {
        let core = core.clone();
        let snapshot = snapshot.clone();
        use_effect_with((), move |_| {
            let core_for_cb = core.clone();
            let subscription = core.subscribe(Rc::new(move || {
                snapshot.set(core_for_cb.snapshot());
            }));
            move || drop(subscription)
        });
    }

    {
        let core = core.clone();
        use_effect_with((), move |_| {
            core.page_show(PageShowSignal::load(app_router::navigation_kind()));

            let (src, grid) = core.image_request();
            let loader = core.clone();
            spawn_local(async move {
                match puzzle_image::load_tiles(&src, grid).await {
                    Ok(tiles) => loader.tiles_loaded(tiles),
                    Err(err) => loader.tiles_failed(&err),
                }
            });

            let listeners = web_sys::window().map(|window| {
                let on_show = core.clone();
                let show = EventListener::new(&window, "pageshow", move |event: &Event| {
                    on_show.page_show(app_router::page_show_signal(event));
                });
                let on_hide = core.clone();
                let hide = EventListener::new(&window, "pagehide", move |_event: &Event| {
                    on_hide.teardown();
                });
                (show, hide)
            });
            move || {
                drop(listeners);
                core.teardown();
            }
        });
    }

    let view: &AppSnapshot = &snapshot;
    let limit_label = view
        .limit
        .map(|limit| limit.to_string())
        .unwrap_or_else(|| "∞".to_string());
    let board_style = format!("grid-template-columns: repeat({}, 1fr);", view.cols.max(1));
    let tiles: Html = view
        .tiles
        .iter()
        .map(|tile| render_tile(&core, tile))
        .collect();
    let answers: Html = view
        .answers
        .iter()
        .map(|field| render_answer(&core, field, view.locked))
        .collect();

    let on_undo = {
        let core = core.clone();
        Callback::from(move |_: MouseEvent| core.undo())
    };
    let on_submit = {
        let core = core.clone();
        Callback::from(move |_: MouseEvent| core.submit())
    };
    let setup_bar = if view.setup {
        let on_save = {
            let core = core.clone();
            Callback::from(move |_: MouseEvent| core.save_setup())
        };
        let on_clear = {
            let core = core.clone();
            Callback::from(move |_: MouseEvent| core.clear_setup())
        };
        html! {
            <div class="setup-bar">
                <span class="setup-label">{ "Setup mode" }</span>
                <button onclick={on_save}>{ "Save Setup" }</button>
                <button onclick={on_clear}>{ "Clear Setup" }</button>
            </div>
        }
    } else {
        html! {}
    };
    let (message, tone) = view
        .status
        .clone()
        .unwrap_or_else(|| (String::new(), StatusTone::Neutral));
    let tone_class = match tone {
        StatusTone::Neutral => None,
        StatusTone::Ok => Some("ok"),
        StatusTone::Bad => Some("bad"),
    };
    let ready = view.phase == SessionPhase::Ready;

    html! {
        <main class="kaiten">
            <header class="hud">
                <h1>{ view.chapter_label.clone() }</h1>
                <div class="clicks">
                    { "Clicks: " }
                    <span class="click-count">{ view.moves }</span>
                    { " / " }
                    <span class="click-limit">{ limit_label }</span>
                </div>
            </header>
            <div class="board" style={board_style}>
                { tiles }
            </div>
            <div class="answers">
                { answers }
            </div>
            <div class="actions">
                <button onclick={on_undo} disabled={!ready || view.locked}>{ "Undo" }</button>
                <button onclick={on_submit} disabled={!ready || view.locked}>{ "Submit" }</button>
            </div>
            { setup_bar }
            <p class={classes!("message", tone_class)}>{ message }</p>
        </main>
    }
}

fn render_tile(core: &Rc<AppCore>, tile: &TileView) -> Html {
    let onclick = {
        let core = core.clone();
        let index = tile.index;
        Callback::from(move |_: MouseEvent| core.rotate(index))
    };
    let style = format!("transform: rotate({}deg);", tile.degrees);
    let image = match &tile.src {
        Some(src) => html! {
            <img
                src={src.clone()}
                alt={format!("tile {}", tile.index + 1)}
                draggable="false"
                style={style}
            />
        },
        None => html! { <div class="tile-placeholder" /> },
    };
    html! {
        <div
            key={tile.index}
            class="tile"
            data-idx={tile.index.to_string()}
            data-last-col={tile.last_col.then_some("1")}
            data-last-row={tile.last_row.then_some("1")}
            {onclick}
        >
            { image }
        </div>
    }
}

fn render_answer(core: &Rc<AppCore>, field: &AnswerView, locked: bool) -> Html {
    let oninput = {
        let core = core.clone();
        let id = field.id.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            core.set_answer(&id, &input.value());
        })
    };
    html! {
        <label key={field.id.clone()} class="answer">
            <span>{ field.label.clone() }</span>
            <input
                type="text"
                value={field.value.clone()}
                disabled={locked}
                {oninput}
            />
        </label>
    }
}
