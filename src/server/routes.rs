use axum::extract::{Path, State};
use axum::response::{Html, Redirect, Result};
use axum_extra::extract::cookie::CookieJar;

use crate::server::convert_errors;
use crate::state::State as AppState;
use crate::template;
use crate::widget::WidgetSlot;

use super::responses::UnknownAuthor;

const WIDGET_PATH: &str = "/widget";

async fn render(state: &AppState, slot: &WidgetSlot) -> Result<Html<String>> {
    let view = slot.view();

    convert_errors(async { template::render_page(&state.template, &view).map(Html) }).await
}

/// A page navigation: re-initializes the visitor's widget before rendering it.
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>)> {
    let (jar, slot) = state.sessions.resolve(jar);
    state.controller.initialize(&slot, &state.widget_cfg).await;

    Ok((jar, render(&state, &slot).await?))
}

pub async fn widget(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>)> {
    let (jar, slot) = state.sessions.resolve(jar);

    Ok((jar, render(&state, &slot).await?))
}

pub async fn more(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, slot) = state.sessions.resolve(jar);
    state.controller.request_more(&slot).await;

    (jar, Redirect::to(WIDGET_PATH))
}

pub async fn spotlight(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, slot) = state.sessions.resolve(jar);
    state.controller.refresh_spotlight(&slot);

    (jar, Redirect::to(WIDGET_PATH))
}

pub async fn author(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(name): Path<String>,
) -> Result<(CookieJar, Html<String>)> {
    let (jar, slot) = state.sessions.resolve(jar);

    if !state.controller.open_author(&slot, &name) {
        return Err(UnknownAuthor { name }.into());
    }

    Ok((jar, render(&state, &slot).await?))
}

pub async fn close_modal(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, slot) = state.sessions.resolve(jar);
    state.controller.close_author(&slot);

    (jar, Redirect::to(WIDGET_PATH))
}
