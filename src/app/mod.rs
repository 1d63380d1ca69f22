//! Runtime composition: wires the store, search engine, favorites ledger,
//! and notification bus together and drives them from a line-oriented
//! front-end. This is the error boundary for the core components — any
//! failure that escapes them surfaces here as a `Result`, never a panic.

mod channels;
mod workers;

pub use channels::Channels;
pub use workers::spawn_catalog_worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::catalog::{CatalogProvider, OfflineCatalog, TmdbClient};
use crate::config::{self, Settings, Theme};
use crate::favorites::FavoritesManager;
use crate::notify::NotificationBus;
use crate::search::{self, SearchState};
use crate::session;
use crate::state::{FetchRequest, Genre, MovieSummary, Severity, UserSession};
use crate::storage::{FileBackend, PersistentStore};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Everything the command handlers mutate.
struct App {
    store: PersistentStore,
    engine: SearchState,
    favorites: FavoritesManager,
    bus: NotificationBus,
    theme: Theme,
    session: Option<UserSession>,
    genres: Vec<Genre>,
}

enum Flow {
    Continue,
    Quit,
}

/// Compose the core components against the real catalog and drive them
/// from stdin until EOF or `:quit`. With `offline` set no API key is needed
/// and every fetch fails retryably, leaving the persisted state usable.
pub async fn run(api_key_flag: Option<String>, offline: bool) -> Result<()> {
    let settings = Settings::load();
    let provider: Arc<dyn CatalogProvider> = if offline {
        println!("offline mode: catalog fetches disabled");
        Arc::new(OfflineCatalog)
    } else {
        let api_key = api_key_flag
            .or_else(|| std::env::var("CINESEA_API_KEY").ok())
            .or_else(|| settings.api_key.clone())
            .ok_or("no API key configured; pass --api-key, set CINESEA_API_KEY, or add api_key to settings.toml")?;
        Arc::new(TmdbClient::new(api_key, settings.language.clone()))
    };
    let store = PersistentStore::new(Box::new(FileBackend::open(
        config::state_dir().join("store.json"),
    )));
    run_with(provider, store, &settings).await
}

/// Same as [`run`] but with injected collaborators, the seam tests use.
pub async fn run_with(
    provider: Arc<dyn CatalogProvider>,
    store: PersistentStore,
    settings: &Settings,
) -> Result<()> {
    let favorites = FavoritesManager::load(&store);
    let session = session::load_session(&store);
    let theme = config::load_theme(&store);
    if let Some(user) = &session {
        println!("welcome back, {}", user.name);
    }

    // Genre names are display sugar; start without them if the catalog is
    // unreachable and let searches surface the error properly.
    let genres = match provider.genres().await {
        Ok(g) => g,
        Err(e) => {
            tracing::warn!(error = %e, "genre listing unavailable");
            Vec::new()
        }
    };

    let mut app = App {
        store,
        engine: SearchState::with_debounce(Duration::from_millis(settings.debounce_ms)),
        favorites,
        bus: NotificationBus::with_default_ttl(settings.notification_ttl()),
        theme,
        session,
        genres,
    };
    let mut channels = Channels::new(provider.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_millis(100));
    println!("type to search; :help lists commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    None => break,
                    Some(l) => {
                        if let Flow::Quit =
                            handle_line(&mut app, l.trim(), &channels.fetch_tx, provider.as_ref()).await
                        {
                            break;
                        }
                    }
                }
            }
            Some(outcome) = channels.outcome_rx.recv() => {
                search::apply_outcome(&mut app.engine, outcome, &app.store);
                if app.engine.error.is_some() {
                    print_error_with_retry(&app.engine);
                } else {
                    print_results(&app);
                }
            }
            _ = tick.tick() => {
                search::maybe_dispatch_search(&mut app.engine, &channels.fetch_tx);
            }
        }
    }
    tracing::info!("event loop finished");
    Ok(())
}

async fn handle_line(
    app: &mut App,
    line: &str,
    fetch_tx: &mpsc::UnboundedSender<FetchRequest>,
    provider: &dyn CatalogProvider,
) -> Flow {
    match line {
        ":quit" | ":q" => return Flow::Quit,
        ":help" => print_help(),
        ":more" => search::load_more(&mut app.engine, fetch_tx),
        ":retry" => search::retry(&mut app.engine, fetch_tx),
        ":results" => print_results(app),
        ":favorites" => print_favorites(app),
        ":clear-favorites" => app.favorites.clear(&app.store, &mut app.bus),
        ":recent" => {
            for q in crate::recent::recent_searches(&app.store) {
                println!("  {q}");
            }
        }
        ":theme" => {
            app.theme = app.theme.toggled();
            config::save_theme(&app.store, app.theme);
            println!("theme: {:?}", app.theme);
        }
        ":logout" => {
            session::logout(&app.store);
            app.session = None;
            app.bus.notify("Signed out", Severity::Info);
        }
        _ => {
            if let Some(rest) = line.strip_prefix(":fav ") {
                toggle_favorite_by_index(app, rest);
            } else if let Some(rest) = line.strip_prefix(":filter") {
                apply_filter_command(app, rest.trim());
            } else if let Some(rest) = line.strip_prefix(":login ") {
                login_command(app, rest);
            } else if let Some(rest) = line.strip_prefix(":info ") {
                info_command(app, rest, provider).await;
            } else if line.starts_with(':') {
                println!("unknown command; :help lists commands");
            } else {
                search::set_input(&mut app.engine, line);
            }
        }
    }
    flush_notification(app);
    Flow::Continue
}

fn toggle_favorite_by_index(app: &mut App, arg: &str) {
    let Some(movie) = visible_by_index(app, arg).cloned() else {
        println!("no such result");
        return;
    };
    app.favorites.toggle(&app.store, &mut app.bus, &movie);
}

fn visible_by_index<'a>(app: &'a App, arg: &str) -> Option<&'a MovieSummary> {
    let idx: usize = arg.trim().parse().ok()?;
    search::visible_results(&app.engine).into_iter().nth(idx)
}

/// `:filter genre=28 year=1999 rating=7.5`, or `:filter none` to clear.
fn apply_filter_command(app: &mut App, args: &str) {
    if args == "none" || args.is_empty() {
        search::set_filters(&mut app.engine, crate::state::FilterSet::default());
    } else {
        let mut filters = app.engine.filters.clone();
        for part in args.split_whitespace() {
            match part.split_once('=') {
                Some(("genre", v)) => filters.genre = v.parse().ok(),
                Some(("year", v)) => filters.year = v.parse().ok(),
                Some(("rating", v)) => filters.min_rating = v.parse().ok(),
                _ => println!("ignoring filter term {part:?}"),
            }
        }
        search::set_filters(&mut app.engine, filters);
    }
    print_results(app);
}

fn login_command(app: &mut App, rest: &str) {
    let mut parts = rest.split_whitespace();
    let email = parts.next().unwrap_or_default();
    let password = parts.next().unwrap_or_default();
    match session::login(&app.store, email, password) {
        Ok(user) => {
            println!("signed in as {}", user.name);
            app.session = Some(user);
        }
        Err(e) => println!("login failed: {e}"),
    }
}

async fn info_command(app: &App, arg: &str, provider: &dyn CatalogProvider) {
    let Some(movie) = visible_by_index(app, arg) else {
        println!("no such result");
        return;
    };
    match provider.details(movie.id).await {
        Ok(d) => {
            println!("{} ({})", d.title, d.release_date.as_deref().unwrap_or("?"));
            if !d.tagline.is_empty() {
                println!("  {}", d.tagline);
            }
            if let Some(minutes) = d.runtime {
                println!("  {minutes} min");
            }
            println!("  {:.1}/10 from {} votes", d.vote_average, d.vote_count);
            if let Some(key) = &d.trailer_key {
                println!("  trailer: https://www.youtube.com/watch?v={key}");
            }
        }
        Err(e) => {
            println!("details unavailable: {e}");
            return;
        }
    }
    if let Ok(cast) = provider.credits(movie.id).await {
        for member in cast.iter().take(5) {
            println!("  {} as {}", member.name, member.character);
        }
    }
    if let Ok(similar) = provider.similar(movie.id).await {
        if !similar.is_empty() {
            println!("  similar:");
        }
        for m in similar.iter().take(5) {
            println!("    {}", m.title);
        }
    }
}

fn flush_notification(app: &mut App) {
    if let Some(n) = app.bus.current() {
        println!("[{}] {}", n.severity.label(), n.message);
    }
}

fn print_help() {
    println!("  <text>            search (fetch runs once you stop typing)");
    println!("  :more             load the next page");
    println!("  :retry            retry a failed fetch");
    println!("  :filter k=v ...   genre=<id> year=<yyyy> rating=<min>; :filter none");
    println!("  :fav <n>          toggle favorite for result n");
    println!("  :favorites        list favorites  (:clear-favorites empties)");
    println!("  :info <n>         details, cast, and similar titles");
    println!("  :recent           recent searches");
    println!("  :login <email> <password> / :logout");
    println!("  :theme            toggle light/dark");
    println!("  :quit             exit");
}

fn print_results(app: &App) {
    let visible = search::visible_results(&app.engine);
    if app.engine.is_trending() {
        println!("trending:");
    } else {
        println!(
            "results for {:?} (page {}/{}):",
            app.engine.query, app.engine.page, app.engine.total_pages
        );
    }
    for (i, m) in visible.iter().enumerate() {
        let star = if app.favorites.is_favorite(m.id) {
            "*"
        } else {
            " "
        };
        let year = release_year(m.release_date.as_deref());
        println!(
            "{star} {i:>3}  {}  ({year})  {:.1}  {}",
            m.title,
            m.vote_average,
            genre_names(&app.genres, &m.genre_ids)
        );
    }
    if visible.is_empty() {
        println!("  no movies match; try a different search or filter");
    }
    if app.engine.has_more() {
        println!("  (:more for the next page)");
    }
}

fn print_error_with_retry(engine: &SearchState) {
    if let Some(e) = &engine.error {
        println!("fetch failed: {e}");
        println!("  (:retry to try again)");
    }
}

fn print_favorites(app: &App) {
    for e in app.favorites.entries() {
        println!(
            "  {}  ({})  {:.1}",
            e.title,
            e.release_date.as_deref().unwrap_or("?"),
            e.vote_average
        );
    }
    if app.favorites.entries().is_empty() {
        println!("  no favorites yet; :fav <n> adds one");
    }
}

/// Year portion of a catalog date. Dates come through the tolerant parser,
/// so this must survive arbitrary non-empty strings, multibyte included;
/// anything without a `-` separated year prints as-is.
fn release_year(date: Option<&str>) -> &str {
    match date {
        Some(d) => d.split('-').next().unwrap_or(d),
        None => "????",
    }
}

fn genre_names(genres: &[Genre], ids: &[u64]) -> String {
    let names: Vec<&str> = ids
        .iter()
        .filter_map(|id| genres.iter().find(|g| g.id == *id))
        .map(|g| g.name.as_str())
        .collect();
    names.join("/")
}
