//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Tournament snapshots are persisted as JSON under DATA_DIR (default: data).

use actix_files::Files;
use actix_web::{
    get, post,
    web::{self, Bytes, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use arm_tournament_web::{
    ordinal, roster_from_csv, BoutId, Bracket, Competitor, CompetitorId, CompletionNotifier,
    Engine, JsonFileStore, NameResolver, Rankings, SeedingPolicy, TournamentId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Notifier collaborator: final standings go to the log.
struct LogNotifier;

impl CompletionNotifier for LogNotifier {
    fn tournament_completed(&self, id: TournamentId, final_rankings: &Rankings) {
        log::info!(
            "Tournament {} complete with {} placements decided",
            id,
            final_rankings.len()
        );
    }
}

type TournamentEngine = Engine<JsonFileStore, LogNotifier>;

/// Per-tournament entry: engine + last activity time (for auto-cleanup).
struct TournamentEntry {
    engine: TournamentEngine,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries idle past the timeout
/// are evicted; their snapshots remain in the store and are restored on the
/// next request.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Where tournament snapshots live.
#[derive(Clone)]
struct StoreConfig {
    data_dir: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RosterEntry {
    name: String,
    #[serde(default)]
    weight: u32,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    competitors: Vec<RosterEntry>,
    #[serde(default)]
    policy: SeedingPolicy,
}

#[derive(Deserialize)]
struct PolicyQuery {
    #[serde(default)]
    policy: SeedingPolicy,
}

#[derive(Deserialize)]
struct SubmitResultBody {
    bout: BoutId,
    winner: CompetitorId,
}

#[derive(Deserialize)]
struct ResetBody {
    competitors: Option<Vec<RosterEntry>>,
    policy: Option<SeedingPolicy>,
}

#[derive(Deserialize)]
struct BoutsQuery {
    bracket: Option<String>,
    resolved: Option<bool>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

fn engine_json(engine: &TournamentEngine) -> serde_json::Value {
    serde_json::json!({
        "tournament": engine.tournament(),
        "current_stage": engine.current_stage_label(),
        "store_warning": engine.last_store_warning(),
    })
}

fn competitors_from_entries(entries: Vec<RosterEntry>) -> Vec<Competitor> {
    entries
        .into_iter()
        .map(|s| Competitor::new(s.name.trim(), s.weight))
        .collect()
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "arm-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a tournament from a JSON roster (client stores the returned id).
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    cfg: Data<StoreConfig>,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let store = match JsonFileStore::new(&cfg.data_dir) {
        Ok(s) => s,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let competitors = competitors_from_entries(body.competitors);
    let engine = match Engine::initialize(competitors, body.policy, store, LogNotifier) {
        Ok(e) => e,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let id = engine.tournament().id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        TournamentEntry {
            engine,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(engine_json(&g[&id].engine))
}

/// Create a tournament from a CSV roster upload (`name,weight` per line).
#[post("/api/tournaments/csv")]
async fn api_create_tournament_csv(
    state: AppState,
    cfg: Data<StoreConfig>,
    query: Query<PolicyQuery>,
    body: Bytes,
) -> HttpResponse {
    let competitors = match roster_from_csv(body.as_ref()) {
        Ok(roster) => roster,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let store = match JsonFileStore::new(&cfg.data_dir) {
        Ok(s) => s,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let engine = match Engine::initialize(competitors, query.policy, store, LogNotifier) {
        Ok(e) => e,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let id = engine.tournament().id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        TournamentEntry {
            engine,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(engine_json(&g[&id].engine))
}

/// Get a tournament by id. An entry evicted from memory is restored from the
/// snapshot store before 404ing. Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(
    state: AppState,
    cfg: Data<StoreConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if !g.contains_key(&path.id) {
        if let Some(entry) = restore_entry(&cfg, path.id) {
            g.insert(path.id, entry);
        }
    }
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(engine_json(&entry.engine))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Bouts, optionally filtered: ?bracket=winner|loser|placement&resolved=true|false
#[get("/api/tournaments/{id}/bouts")]
async fn api_get_bouts(
    state: AppState,
    path: Path<TournamentPath>,
    query: Query<BoutsQuery>,
) -> HttpResponse {
    let bracket = match query.bracket.as_deref() {
        None => None,
        Some("winner") => Some(Bracket::Winner),
        Some("loser") => Some(Bracket::Loser),
        Some("placement") => Some(Bracket::Placement),
        Some(other) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": format!("Unknown bracket '{}'", other) }))
        }
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(entry.engine.bouts(bracket, query.resolved))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Current rankings with display names resolved for presentation.
#[get("/api/tournaments/{id}/rankings")]
async fn api_get_rankings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            let t = entry.engine.tournament();
            let rows: Vec<_> = entry
                .engine
                .rankings()
                .iter()
                .map(|(rank, id)| {
                    serde_json::json!({
                        "rank": rank,
                        "place": ordinal(*rank),
                        "competitor": id,
                        "name": t.display_name(*id),
                    })
                })
                .collect();
            HttpResponse::Ok().json(serde_json::json!({
                "completed": entry.engine.is_complete(),
                "rankings": rows,
            }))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Record a bout result.
#[post("/api/tournaments/{id}/results")]
async fn api_submit_result(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SubmitResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    match entry.engine.submit_result(body.bout, body.winner) {
        Ok(_) => HttpResponse::Ok().json(engine_json(&entry.engine)),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Roll back the most recent result. A no-op when nothing can be undone.
#[post("/api/tournaments/{id}/undo")]
async fn api_undo(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    entry.engine.undo();
    HttpResponse::Ok().json(engine_json(&entry.engine))
}

/// Discard all bouts and re-seed. Defaults to the current roster and policy;
/// either can be replaced in the body.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset(
    state: AppState,
    path: Path<TournamentPath>,
    body: Option<Json<ResetBody>>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let body = body.map(Json::into_inner);
    let policy = body
        .as_ref()
        .and_then(|b| b.policy)
        .unwrap_or(entry.engine.tournament().policy);
    let competitors = match body.and_then(|b| b.competitors) {
        Some(entries) => competitors_from_entries(entries),
        None => entry.engine.tournament().competitors.clone(),
    };
    match entry.engine.reset(competitors, policy) {
        Ok(_) => HttpResponse::Ok().json(engine_json(&entry.engine)),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Try to bring an evicted tournament back from its stored snapshot.
fn restore_entry(cfg: &StoreConfig, id: TournamentId) -> Option<TournamentEntry> {
    let store = JsonFileStore::new(&cfg.data_dir).ok()?;
    match Engine::restore(id, store, LogNotifier) {
        Ok(Some(engine)) => Some(TournamentEntry {
            engine,
            last_activity: Instant::now(),
        }),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Snapshot for {} failed validation: {}", id, e);
            None
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));
    let cfg = Data::new(StoreConfig { data_dir });

    // Background task: every 30 minutes, evict tournaments inactive for 12+
    // hours. Their snapshots stay in the store.
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Evicted {} inactive tournament(s) to the store", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(cfg.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_tournament)
            .service(api_create_tournament_csv)
            .service(api_get_tournament)
            .service(api_get_bouts)
            .service(api_get_rankings)
            .service(api_submit_result)
            .service(api_undo)
            .service(api_reset)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
