//! Route handlers

use super::error::{HtmlError, WebError};
use super::form::{ApiSearchRequest, FormView, SearchForm};
use super::AppState;
use crate::session::export_document;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use base64::Engine;
use chrono::{Local, NaiveDateTime};
use scout_core::agent::answer::links_in;
use scout_core::output::render_sections;
use scout_core::{AgentRun, Locale, SearchQuery, StopReason};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Serialize)]
struct ItemView {
    text: String,
    href: Option<String>,
}

#[derive(Debug, Serialize)]
struct SectionView {
    title: &'static str,
    count: usize,
    is_notes: bool,
    items: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
struct ResultsView {
    query: String,
    city: String,
    summary: String,
    tools_used: Vec<String>,
    stop_notice: Option<String>,
    sections: Vec<SectionView>,
    download_name: String,
    download_href: String,
}

fn section_title(label: &str) -> &'static str {
    match label {
        "EVENTS FOUND" => "Events",
        "NEWS HIGHLIGHTS" => "News",
        "TOP RECOMMENDATIONS" => "Recommendations",
        "BUDGET-FRIENDLY OPTIONS" => "Budget Options",
        "FRIEND GROUP SUGGESTIONS" => "Friend Suggestions",
        "SOURCES" => "Sources",
        _ => "Notes",
    }
}

impl ResultsView {
    fn new(locale: &Locale, run: &AgentRun, timestamp: &NaiveDateTime) -> Self {
        let answer = &run.answer;
        let sections = render_sections(answer)
            .into_iter()
            .map(|section| SectionView {
                title: section_title(&section.label),
                count: section.items.len(),
                is_notes: section.label == "NOTES",
                items: section
                    .items
                    .into_iter()
                    .map(|text| ItemView {
                        href: links_in(&text).into_iter().next(),
                        text,
                    })
                    .collect(),
            })
            .collect();

        let stop_notice = match &run.stop_reason {
            StopReason::Completed => None,
            StopReason::TurnLimitExceeded { max_turns } => Some(format!(
                "Partial answer: the assistant did not finish within {} turns.",
                max_turns
            )),
            StopReason::ModelUnavailable { .. } => Some(
                "The assistant could not be reached; showing what was found before it stopped."
                    .to_string(),
            ),
        };

        let (download_name, contents) = export_document(locale, run, timestamp);
        let download_href = format!(
            "data:text/plain;charset=utf-8;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(contents)
        );

        Self {
            query: answer.query.clone(),
            city: answer.city.clone(),
            summary: answer.summary.clone(),
            tools_used: answer.tools_used.clone(),
            stop_notice,
            sections,
            download_name,
            download_href,
        }
    }
}

fn render_page(
    state: &AppState,
    form: FormView,
    error: Option<String>,
    results: Option<ResultsView>,
) -> Result<String, WebError> {
    let page = state.templates.render(
        "page",
        &json!({
            "city": state.config.locale.city,
            "form": form,
            "error": error,
            "results": results,
        }),
    )?;
    Ok(page)
}

/// Build a fresh agent and run the query once the gate is free
async fn run_agent(state: &AppState, query: &SearchQuery) -> Result<AgentRun, WebError> {
    let _running = state.gate.lock().await;
    let mut agent = (state.agents)().build().map_err(WebError::internal)?;
    info!(category = query.category.as_str(), "Running form query");
    Ok(agent.run(query).await)
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, HtmlError> {
    let form = FormView::blank(&state.config.locale.currency);
    Ok(Html(render_page(&state, form, None, None)?))
}

/// `POST /search`
pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, HtmlError> {
    let currency = state.config.locale.currency.clone();
    let query = match form.to_query() {
        Ok(query) => query,
        Err(e) => {
            let page = render_page(
                &state,
                FormView::from_form(&form, &currency),
                Some(e.to_string()),
                None,
            )?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    let run = run_agent(&state, &query).await?;
    let results = ResultsView::new(&state.config.locale, &run, &Local::now().naive_local());
    let page = render_page(
        &state,
        FormView::from_query(&query, &currency),
        None,
        Some(results),
    )?;
    Ok(Html(page).into_response())
}

/// `POST /api/search`
pub async fn api_search(
    State(state): State<AppState>,
    Json(request): Json<ApiSearchRequest>,
) -> Result<Json<Value>, WebError> {
    let query = request
        .to_query()
        .map_err(|e| WebError::unprocessable(e.to_string()))?;
    let run = run_agent(&state, &query).await?;

    Ok(Json(json!({
        "query": query,
        "prompt": query.to_prompt(&state.config.locale),
        "answer": run.answer,
        "stop_reason": run.stop_reason,
        "turns_used": run.turns_used,
        "tool_executions": run.tool_executions,
        "usage": run.usage,
        "duration_ms": run.duration_ms,
    })))
}

/// `GET /health`
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
