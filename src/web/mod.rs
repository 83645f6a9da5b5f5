//! Web surface: a single-page form served with axum
//!
//! Every request builds a fresh `ConversionView` from the submitted fields,
//! so no state is shared between users.

pub mod page;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Form, Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::conversion::parse_amount;
use crate::core::{ConversionView, CurrencyCode, RateFetcher, ViewEvent};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: RateFetcher,
}

/// Raw form fields. Missing fields keep the view defaults.
#[derive(Debug, Default, Deserialize)]
pub struct FormInput {
    pub currency: Option<CurrencyCode>,
    pub amount: Option<String>,
}

impl FormInput {
    pub fn into_view(self) -> ConversionView {
        let mut view = ConversionView::default();
        if let Some(currency) = self.currency {
            view.dispatch(ViewEvent::SelectCurrency(currency));
        }
        if let Some(amount) = self.amount {
            view.dispatch(ViewEvent::EnterAmount(parse_amount(&amount)));
        }
        view
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form))
        .route("/convert", post(convert))
        .with_state(state)
}

async fn show_form(Query(input): Query<FormInput>) -> Html<String> {
    Html(page::render(&input.into_view()))
}

async fn convert(State(state): State<AppState>, Form(input): Form<FormInput>) -> Html<String> {
    debug!(?input, "Conversion requested");
    let mut view = input.into_view();
    view.submit(&state.fetcher).await;
    Html(page::render(&view))
}

pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    info!(listen = %listener.local_addr()?, "Converter listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Web server failed")
}
