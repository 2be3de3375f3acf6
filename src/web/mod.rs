//! Web server for safely inspecting Hy source.
//!
//! Posted source is only ever read with the safe reader.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Result};
use axum::routing::{get, post};

use crate::data::{to_source, Model};
use crate::reader::{read_all_safe, ReadErr};
use crate::render::{render_graphviz, render_svg};

const STYLE: &[u8] = include_bytes!("style.css");

fn page(title: &str, body: maud::Markup) -> maud::Markup {
    maud::html!(
        (maud::DOCTYPE)
        html {
            head {
                title { (title) }
                link rel="stylesheet" href="/style.css";
            }
            body { (body) }
        }
    )
}

fn index() -> maud::Markup {
    page(
        "safehy",
        maud::html!(
            h1 { "safehy" }
            p { "Reads Hy source without running reader macros. Comments are kept." }
            ul {
                li { code { "POST /read" } ": the read nodes as HTML, with a graph of the tree" }
                li { code { "POST /graph" } ": the tree as Graphviz DOT" }
            }
            p { "For example: " code { "curl --data-binary @input.hy localhost:3000/read" } }
        ),
    )
}

/// The read nodes, their source rendering, and the tree graph (or why there isn't one).
fn read_page(models: &[Model], svg: std::result::Result<String, String>) -> maud::Markup {
    page(
        "safehy: read",
        maud::html!(
            main {
                div {
                    h3 { "Source" }
                    pre class="source" { (to_source(models)) }
                    h3 { "Nodes" }
                    table class="nodes" {
                        @for model in models {
                            tr {
                                td class=(model.kind()) { (model.kind()) }
                                td { (model) }
                            }
                        }
                    }
                }
                div class="tree" {
                    h3 { "Tree" }
                    @match svg {
                        Ok(svg) => { (maud::PreEscaped(svg)) }
                        Err(e) => { p class="error" { (e) } }
                    }
                }
            }
        ),
    )
}

fn error_page(source: &str, err: &ReadErr) -> maud::Markup {
    page(
        "safehy: error",
        maud::html!(
            p class="error" { (err) }
            pre class="source" { (source) }
        ),
    )
}

async fn read(body: String) -> Result<impl IntoResponse, (StatusCode, maud::Markup)> {
    let models = read_all_safe(&body).map_err(|e| {
        tracing::debug!("rejected input: {e}");
        (StatusCode::BAD_REQUEST, error_page(&body, &e))
    })?;
    tracing::info!(nodes = models.len(), "read input");

    let (models, svg) = tokio::task::spawn_blocking(move || {
        let svg = render_svg(&models);
        (models, svg)
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            maud::html!(p class="error" { "render task failed: " (e.to_string()) }),
        )
    })?;
    Ok(read_page(&models, svg))
}

async fn graph(body: String) -> Result<impl IntoResponse, (StatusCode, String)> {
    let models = read_all_safe(&body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/vnd.graphviz")],
        render_graphviz(&models),
    ))
}

pub fn get_server() -> axum::Router {
    axum::Router::new()
        .route("/", get(|| async { index() }))
        .route(
            "/style.css",
            get(|| async { ([(header::CONTENT_TYPE, "text/css")], STYLE) }),
        )
        .route("/read", post(read))
        .route("/graph", post(graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReadResult;

    #[test]
    fn read_page_lists_nodes() -> ReadResult<()> {
        let models = read_all_safe("; note\n(#tag <x>)")?;
        let html = read_page(&models, Err("no dot here".to_owned())).into_string();
        assert!(html.contains("; note"), "missing comment: {html}");
        assert!(html.contains("(#tag &lt;x&gt;)"), "missing expression: {html}");
        assert!(html.contains("no dot here"), "missing render error: {html}");
        Ok(())
    }

    #[tokio::test]
    async fn read_rejects_bad_input() {
        match read("(a))".to_owned()).await {
            Err((status, html)) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(html.into_string().contains("error in input"));
            }
            Ok(_) => panic!("expected an error for unbalanced input"),
        }
    }

    #[tokio::test]
    async fn graph_rejects_incomplete_input() {
        match graph("(a".to_owned()).await {
            Err((status, message)) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(message.contains("incomplete input"), "got {message}");
            }
            Ok(_) => panic!("expected an error for incomplete input"),
        }
    }
}
