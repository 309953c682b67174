//! Development server with live reload
//!
//! Pages are rendered from the MDX sources on every request, so edits show
//! up without a rebuild. With watching enabled, connected browsers reload
//! when anything under the pages directory changes.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path as UrlPath, Query, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{SiteConfig, CONFIG_FILE};
use crate::content::{is_mdx_file, ContentLoader};
use crate::error::SiteError;
use crate::helpers::page_segments;
use crate::search::{search, SearchIndex};
use crate::templates::{asset, TemplateRenderer};
use crate::Blog;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state, shared read-only between handlers
pub struct ServerState {
    loader: ContentLoader,
    renderer: TemplateRenderer,
    pages_dir: PathBuf,
    config: SiteConfig,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    /// Create the state for `blog`; `live_reload` injects the reload script
    pub fn new(blog: &Blog, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            loader: ContentLoader::new(blog),
            renderer: TemplateRenderer::new(&blog.config)?,
            pages_dir: blog.pages_dir.clone(),
            config: blog.config.clone(),
            reload_tx,
            live_reload,
        })
    }

    /// Sender used to tell connected browsers to reload
    pub fn reload_sender(&self) -> broadcast::Sender<()> {
        self.reload_tx.clone()
    }

    /// Index of published posts
    ///
    /// A site without a blog directory has none. A post that fails to load
    /// is reported, and pages are still served with an empty index.
    fn search_index(&self) -> Result<SearchIndex, SiteError> {
        match self.loader.load_posts() {
            Ok(posts) => Ok(SearchIndex::from_posts(&posts, &self.config)),
            Err(SiteError::NotFound(_)) => Ok(SearchIndex::default()),
            Err(SiteError::Parse(msg)) => {
                tracing::warn!("Search index unavailable: {}", msg);
                Ok(SearchIndex::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Render the page mapped to `request_path`
    fn render_page(&self, request_path: &str) -> Result<String, SiteError> {
        let path = self.loader.resolve_page(request_path)?;
        let page = self.loader.load_page(&path)?;
        let index = self.search_index()?;
        self.renderer
            .render_page(&page.meta, &page.html, &index)
            .map_err(template_error)
    }

    /// Render the blog listing
    fn render_post_list(&self) -> Result<String, SiteError> {
        let posts = self.loader.load_posts()?;
        let index = SearchIndex::from_posts(&posts, &self.config);
        let listings: Vec<_> = posts.into_iter().map(|p| p.listing).collect();
        self.renderer
            .render_post_list(&listings, &index)
            .map_err(template_error)
    }

    fn html(&self, content: String) -> Response {
        if self.live_reload {
            Html(inject_live_reload(&content)).into_response()
        } else {
            Html(content).into_response()
        }
    }
}

fn template_error(e: anyhow::Error) -> SiteError {
    SiteError::Parse(format!("{e:#}"))
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/blog", get(post_list_handler))
        .route("/search.json", get(search_json_handler))
        .route("/search", get(search_handler))
        .route("/assets/*path", get(asset_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(blog, watch)?);
    let reload_tx = state.reload_sender();
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let pages_dir = blog.pages_dir.clone();
        let config_path = blog.base_dir.join(CONFIG_FILE);

        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(pages_dir, config_path, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch for file changes and notify connected browsers
fn watch_and_reload(
    pages_dir: PathBuf,
    config_path: PathBuf,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to coalesce bursts of editor writes
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if pages_dir.exists() {
        debouncer
            .watcher()
            .watch(&pages_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", pages_dir);
    }

    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                // Filter out editor and VCS noise
                let relevant_events: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant_events.is_empty() {
                    continue;
                }

                for event in &relevant_events {
                    tracing::info!("File changed: {}", event.path.display());
                    if event.path == config_path {
                        tracing::warn!("{} changed, restart the server to apply it", CONFIG_FILE);
                    }
                }

                // No receivers just means no browser is connected
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Run blocking content work off the async runtime
async fn blocking<T, F>(f: F) -> Result<T, SiteError>
where
    F: FnOnce() -> Result<T, SiteError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SiteError::Io(std::io::Error::other(e)))?
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Result<Response, SiteError> {
    let worker = Arc::clone(&state);
    let html = blocking(move || worker.render_page("/")).await?;
    Ok(state.html(html))
}

async fn post_list_handler(State(state): State<Arc<ServerState>>) -> Result<Response, SiteError> {
    let worker = Arc::clone(&state);
    let html = blocking(move || worker.render_post_list()).await?;
    Ok(state.html(html))
}

async fn search_json_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SearchIndex>, SiteError> {
    let index = blocking(move || state.search_index()).await?;
    Ok(Json(index))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Results list markup for `?q=`, as the search dialog renders it
async fn search_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, SiteError> {
    let html = blocking(move || {
        let index = state.search_index()?;
        Ok(search(&index, &params.q, state.config.search.limit()).to_html())
    })
    .await?;
    Ok(Html(html))
}

async fn asset_handler(UrlPath(path): UrlPath<String>) -> Result<Response, SiteError> {
    let (content, mime) =
        asset(&path).ok_or_else(|| SiteError::NotFound(format!("/assets/{path}")))?;
    Ok(([(header::CONTENT_TYPE, mime)], content).into_response())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve static files from the pages directory, otherwise render a page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Result<Response, SiteError> {
    let path = percent_decode_str(request.uri().path())
        .decode_utf8_lossy()
        .into_owned();

    if let Some(segments) = page_segments(&path) {
        let candidate = segments
            .iter()
            .fold(state.pages_dir.clone(), |p, s| p.join(s));
        if candidate.is_file() && !is_mdx_file(&candidate) {
            let mut service = ServeDir::new(&state.pages_dir);
            return match service.try_call(request).await {
                Ok(response) => Ok(response.into_response()),
                Err(e) => Err(SiteError::Io(e)),
            };
        }
    }

    let worker = Arc::clone(&state);
    let html = blocking(move || worker.render_page(&path)).await?;
    Ok(state.html(html))
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}
