//! HTTP surface: `/ask` for chat turns, `/simulate` for batch diagnostics,
//! `/refresh` to reload the catalogue file.

use actix_web::{get, post, web, HttpResponse, Responder};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::conversation::ContextTracker;
use crate::simulation::simulate;
use crate::system::{FaqSystem, Reply};

#[derive(Deserialize)]
pub struct AskRequest {
    pub user_input: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub reply: Option<Reply>,
}

#[derive(Deserialize)]
pub struct SimulateRequest {
    pub questions: String,
}

struct Session {
    tracker: Arc<Mutex<ContextTracker>>,
    last_used: u64,
}

/// Live chat sessions, bounded by evicting the least recently used.
struct Sessions {
    by_id: HashMap<Uuid, Session>,
    clock: u64,
}

impl Sessions {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            clock: 0,
        }
    }

    fn checkout(
        &mut self,
        id: Uuid,
        history_capacity: usize,
        max_sessions: usize,
    ) -> Arc<Mutex<ContextTracker>> {
        self.clock += 1;
        let now = self.clock;
        if let Some(session) = self.by_id.get_mut(&id) {
            session.last_used = now;
            return Arc::clone(&session.tracker);
        }

        while self.by_id.len() >= max_sessions {
            let oldest = self
                .by_id
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    log::debug!("Evicting idle session {}", oldest);
                    self.by_id.remove(&oldest);
                }
                None => break,
            }
        }

        let tracker = Arc::new(Mutex::new(ContextTracker::new(history_capacity)));
        self.by_id.insert(
            id,
            Session {
                tracker: Arc::clone(&tracker),
                last_used: now,
            },
        );
        tracker
    }
}

/// One engine shared by all requests, one context window per chat session.
pub struct AppState {
    system: FaqSystem,
    sessions: Mutex<Sessions>,
    history_capacity: usize,
    max_sessions: usize,
}

impl AppState {
    pub fn new(system: FaqSystem, history_capacity: usize, max_sessions: usize) -> Self {
        Self {
            system,
            sessions: Mutex::new(Sessions::new()),
            history_capacity,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn system(&self) -> &FaqSystem {
        &self.system
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().by_id.len()
    }

    pub fn has_session(&self, id: &Uuid) -> bool {
        self.sessions.lock().by_id.contains_key(id)
    }

    /// Turns currently retained for a session.
    pub fn session_turns(&self, id: &Uuid) -> Option<usize> {
        let tracker = self
            .sessions
            .lock()
            .by_id
            .get(id)
            .map(|s| Arc::clone(&s.tracker))?;
        let turns = tracker.lock().len();
        Some(turns)
    }

    /// Requests on the same session are serialized on that session's tracker;
    /// other sessions proceed in parallel.
    pub fn ask(&self, session_id: Option<Uuid>, input: &str) -> AskResponse {
        let session_id = session_id.unwrap_or_else(Uuid::new_v4);
        let tracker = self
            .sessions
            .lock()
            .checkout(session_id, self.history_capacity, self.max_sessions);
        let reply = self.system.handle_user_input(&mut tracker.lock(), input);
        AskResponse { session_id, reply }
    }
}

#[post("/ask")]
async fn ask_endpoint(req: web::Json<AskRequest>, data: web::Data<AppState>) -> impl Responder {
    let req = req.into_inner();
    HttpResponse::Ok().json(data.ask(req.session_id, &req.user_input))
}

#[post("/simulate")]
async fn simulate_endpoint(
    req: web::Json<SimulateRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let report = simulate(&data.system, &req.questions);
    HttpResponse::Ok().json(serde_json::json!({
        "rows": report.rows,
        "matched": report.matched(),
        "total": report.total(),
        "accuracy": report.accuracy(),
    }))
}

#[post("/refresh")]
async fn refresh_endpoint(data: web::Data<AppState>) -> impl Responder {
    match data.system.reload_catalogue() {
        Some(Ok(entries)) => HttpResponse::Ok().json(serde_json::json!({ "entries": entries })),
        Some(Err(e)) => {
            log::error!("Catalogue reload failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
        None => HttpResponse::Conflict()
            .json(serde_json::json!({ "error": "catalogue was not loaded from a file" })),
    }
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("index.html"))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(ask_endpoint)
        .service(simulate_endpoint)
        .service(refresh_endpoint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentTable;
    use crate::model::{Catalogue, Entry};
    use crate::resolver::ResolverConfig;

    fn state(history_capacity: usize, max_sessions: usize) -> AppState {
        let catalogue = Catalogue::new(vec![
            Entry::new("projects_list", ["projects", "portfolio"], "Projects"),
            Entry::new("greetings", ["hello"], "Hi!"),
        ]);
        let system =
            FaqSystem::new(catalogue, IntentTable::default(), ResolverConfig::default()).unwrap();
        AppState::new(system, history_capacity, max_sessions)
    }

    #[test]
    fn concurrent_asks_on_one_session_keep_every_turn() {
        let state = state(100_000, 16);
        let id = Uuid::new_v4();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        state.ask(Some(id), "show me your projects");
                    }
                });
            }
        });
        assert_eq!(state.session_count(), 1);
        assert_eq!(state.session_turns(&id), Some(8 * 100 * 2));
    }

    #[test]
    fn evicts_least_recently_used_session() {
        let state = state(10, 2);
        let first = state.ask(None, "hello").session_id;
        let second = state.ask(None, "hello").session_id;
        // touching `first` makes `second` the oldest
        state.ask(Some(first), "projects");
        let third = state.ask(None, "hello").session_id;

        assert_eq!(state.session_count(), 2);
        assert!(state.has_session(&first));
        assert!(!state.has_session(&second));
        assert!(state.has_session(&third));
        assert_eq!(state.session_turns(&first), Some(4));
    }

    #[test]
    fn session_map_stays_bounded() {
        let state = state(10, 8);
        for _ in 0..500 {
            state.ask(Some(Uuid::new_v4()), "hello");
        }
        assert_eq!(state.session_count(), 8);
    }

    #[test]
    fn evicted_session_starts_over() {
        let state = state(10, 1);
        let first = state.ask(None, "projects").session_id;
        state.ask(None, "hello");
        state.ask(Some(first), "projects");
        assert_eq!(state.session_turns(&first), Some(2));
    }
}
