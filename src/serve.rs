//! HTTP server for the file tree viewer
//!
//! `filetree serve report.json` → starts server, serves the jstree page

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::classify::{Filters, Stats};
use crate::error::{FileTreeError, Result};
use crate::filetree::{FileTree, SelectedFile};
use crate::jstree::JsTreeWidget;
use crate::prefs::CookiePreferences;
use crate::widget::CheckedNode;

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Everything the page needs to (re)build the tree
#[derive(Serialize)]
struct TreeDocument {
    target: String,
    revision: u64,
    config: Option<serde_json::Value>,
    stats: Stats,
    filters: Filters,
}

/// Data-only payload for in-place refreshes
#[derive(Serialize)]
struct RefreshDocument {
    revision: u64,
    data: serde_json::Value,
    stats: Stats,
    filters: Filters,
}

/// `POST /api/filters?simplify=false&deselect_duplicates=true`
#[derive(Debug, Default, Deserialize, PartialEq)]
struct FilterQuery {
    simplify: Option<bool>,
    deselect_duplicates: Option<bool>,
}

// Embedded viewer page (jQuery + jstree + jstree-grid from CDN)
const TREE_VIEWER_HTML: &str = include_str!("viewer.html");

/// Start the file tree viewer server; handles requests until the process stops
pub fn start_tree_server(port: u16, mut tree: FileTree<JsTreeWidget>) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| FileTreeError::Server(e.to_string()))?;

    let url = format!("http://localhost:{}", port);

    eprintln!("\n{}", "filetree".bold().green());
    eprintln!("   Tree viewer: {}", url);
    eprintln!("   Press Ctrl+C to stop\n");
    tracing::info!(%addr, "tree viewer listening");

    // Requests are handled one at a time; the tree is never shared
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(&mut tree, request) {
            tracing::warn!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

fn handle_request(tree: &mut FileTree<JsTreeWidget>, request: Request) -> std::io::Result<()> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();
    tracing::debug!(%method, path, "request");

    match (&method, path) {
        // Serve viewer UI
        (&Method::Get, "/") | (&Method::Get, "/tree") => {
            let response = Response::from_string(TREE_VIEWER_HTML);
            request.respond(with_content_type(response, "text/html; charset=utf-8"))
        }

        // API: draw the tree for this page load
        (&Method::Get, "/api/tree") => {
            let prefs = request_preferences(&request);
            match tree.draw(&prefs) {
                Ok(()) => respond_json(request, 200, &ApiResponse::success(tree_document(tree))),
                Err(e) => respond_json(request, 500, &ApiResponse::failure(e.to_string())),
            }
        }

        // API: current stats
        (&Method::Get, "/api/stats") => {
            respond_json(request, 200, &ApiResponse::success(*tree.stats()))
        }

        // API: current selection
        (&Method::Get, "/api/selected") => {
            respond_json(request, 200, &ApiResponse::success(tree.selected()))
        }

        // API: change filters and refresh (POST /api/filters?simplify=true)
        (&Method::Post, "/api/filters") => handle_filters(tree, request, query),

        // API: checked nodes reported by the page (POST /api/checked)
        (&Method::Post, "/api/checked") => handle_checked(tree, request),

        // API: jstree fired ready.jstree
        (&Method::Post, "/api/ready") => {
            tree.widget_mut().mark_ready();
            respond_json(request, 200, &ApiResponse::success(true))
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

fn handle_filters(
    tree: &mut FileTree<JsTreeWidget>,
    request: Request,
    query: &str,
) -> std::io::Result<()> {
    let filters: FilterQuery = match serde_urlencoded::from_str(query) {
        Ok(f) => f,
        Err(e) => {
            return respond_json(
                request,
                400,
                &ApiResponse::failure(format!("Invalid query: {}", e)),
            )
        }
    };

    apply_filters(tree, &filters);
    respond_json(request, 200, &ApiResponse::success(refresh_document(tree)))
}

fn apply_filters(tree: &mut FileTree<JsTreeWidget>, query: &FilterQuery) {
    if let Some(simplify) = query.simplify {
        tree.simplify(simplify);
    }
    if let Some(deselect) = query.deselect_duplicates {
        tree.deselect_duplicates(deselect);
    }
}

fn handle_checked(tree: &mut FileTree<JsTreeWidget>, mut request: Request) -> std::io::Result<()> {
    // Read request body
    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        return respond_json(
            request,
            400,
            &ApiResponse::failure(format!("Failed to read body: {}", e)),
        );
    }

    // Parse JSON body
    let checked: Vec<CheckedNode> = match serde_json::from_str(&body) {
        Ok(nodes) => nodes,
        Err(e) => {
            return respond_json(
                request,
                400,
                &ApiResponse::failure(format!("Invalid JSON: {}", e)),
            )
        }
    };

    tree.widget_mut().set_checked(checked);
    let selected: Vec<SelectedFile> = tree.selected();
    respond_json(request, 200, &ApiResponse::success(selected))
}

fn tree_document(tree: &FileTree<JsTreeWidget>) -> TreeDocument {
    TreeDocument {
        target: tree.target().to_string(),
        revision: tree.widget().revision(),
        config: tree.widget().config_document(),
        stats: *tree.stats(),
        filters: *tree.filters(),
    }
}

fn refresh_document(tree: &FileTree<JsTreeWidget>) -> RefreshDocument {
    RefreshDocument {
        revision: tree.widget().revision(),
        data: tree.widget().data_document(),
        stats: *tree.stats(),
        filters: *tree.filters(),
    }
}

fn request_preferences(request: &Request) -> CookiePreferences {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Cookie"))
        .map(|h| CookiePreferences::parse(h.value.as_str()))
        .unwrap_or_default()
}

fn with_content_type(response: Response<Cursor<Vec<u8>>>, value: &str) -> Response<Cursor<Vec<u8>>> {
    match Header::from_bytes(&b"Content-Type"[..], value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn respond_json<T: Serialize>(request: Request, status: u16, body: &T) -> std::io::Result<()> {
    let json = serde_json::to_string(body)?;
    let response = Response::from_string(json).with_status_code(status);
    request.respond(with_content_type(response, "application/json"))
}
