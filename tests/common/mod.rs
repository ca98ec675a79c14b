//! Shared test helpers: an in-memory transport answering scripted pages,
//! and builders for the game pages the extractor understands.

#![allow(dead_code)]

use origins_pilot::core::config::PacingConfig;
use origins_pilot::core::error::{PilotError, Result};
use origins_pilot::core::types::Coord;
use origins_pilot::extract::HtmlPages;
use origins_pilot::session::Session;
use origins_pilot::transport::{Fields, Transport};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

/// One request seen by the scripted transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

type Reply = std::result::Result<String, String>;

/// Answers requests from per-(method, path) queues
///
/// When a queue runs dry the sticky page of that route is served, if any;
/// otherwise the request fails as transient.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    queues: HashMap<(Method, String), VecDeque<Reply>>,
    sticky: HashMap<(Method, String), String>,
    log: Vec<Request>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(mut self, path: &str, body: impl Into<String>) -> Self {
        self.push(Method::Get, path, Ok(body.into()));
        self
    }

    pub fn post(mut self, path: &str, body: impl Into<String>) -> Self {
        self.push(Method::Post, path, Ok(body.into()));
        self
    }

    pub fn get_fails(mut self, path: &str) -> Self {
        self.push(Method::Get, path, Err(format!("GET {} timed out", path)));
        self
    }

    pub fn post_fails(mut self, path: &str) -> Self {
        self.push(Method::Post, path, Err(format!("POST {} timed out", path)));
        self
    }

    /// Page served for `GET path` once its queue is empty
    pub fn always_get(mut self, path: &str, body: impl Into<String>) -> Self {
        self.sticky.insert((Method::Get, path.to_string()), body.into());
        self
    }

    /// Page served for `POST path` once its queue is empty
    pub fn always_post(mut self, path: &str, body: impl Into<String>) -> Self {
        self.sticky.insert((Method::Post, path.to_string()), body.into());
        self
    }

    pub fn requests(&self) -> &[Request] {
        &self.log
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.log
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Value of `action` of every POST to `path`, in order
    pub fn actions(&self, path: &str) -> Vec<String> {
        self.log
            .iter()
            .filter(|r| r.method == Method::Post && r.path == path)
            .filter_map(|r| r.param("action").map(String::from))
            .collect()
    }

    fn push(&mut self, method: Method, path: &str, reply: Reply) {
        self.queues
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    fn answer(&mut self, method: Method, path: &str, params: &Fields<'_>) -> Result<String> {
        self.log.push(Request {
            method,
            path: path.to_string(),
            params: params
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
        });

        let key = (method, path.to_string());
        let reply = match self.queues.get_mut(&key).and_then(|q| q.pop_front()) {
            Some(reply) => reply,
            None => self
                .sticky
                .get(&key)
                .cloned()
                .ok_or_else(|| format!("unscripted {:?} {}", method, path)),
        };
        reply.map_err(PilotError::Transient)
    }
}

impl Transport for ScriptedTransport {
    async fn fetch(&mut self, path: &str, params: &Fields<'_>) -> Result<String> {
        self.answer(Method::Get, path, params)
    }

    async fn submit(&mut self, path: &str, form: &Fields<'_>) -> Result<String> {
        self.answer(Method::Post, path, form)
    }
}

/// Session over scripted pages, with no pauses
pub fn session(transport: ScriptedTransport) -> Session<ScriptedTransport> {
    Session::new(transport, HtmlPages::new(), PacingConfig::immediate())
}

// Pages

pub const LOGIN_OK: &str = "<p>Vous êtes maintenant connecté.</p>";
pub const LOGIN_REFUSED: &str = "<p>Mot de passe incorrect</p>";
pub const LOGOUT_OK: &str = "<p>Votre session a bien été arretée!</p>";
pub const MISSION_DONE: &str = "<p>Votre pokémon est revenu de mission avec 120 $</p>";
pub const MISSION_REFUSED: &str = "<p>Ce pokémon est déjà en mission</p>";

/// Combatant as `(id, level, action points)`
pub type Member = (u32, u8, u32);

pub fn account_page(active: Member, reserves: &[Member]) -> String {
    let mut page = String::from("<div id=\"menu\"><b>1 200 $</b> <b>5</b>\n");
    let (id, level, ap) = active;
    page.push_str(&format!(
        "<a href=\"vos_pokemons.php?id={}\">Actif Niv. {} (PA {})</a>\n",
        id, level, ap
    ));
    for (id, level, ap) in reserves {
        page.push_str(&format!(
            "<a href=\"carte.php?pokemon_actif={}\">Réserve Niv. {} (PA {})</a>\n",
            id, level, ap
        ));
    }
    page.push_str(&format!(
        "<p>Score : 900</p><p>Classement : 42</p><p>Pokémons : {}/6</p></div>",
        reserves.len() + 1
    ));
    page
}

pub fn mission_page(missions: &[u32], combatants: &[u32]) -> String {
    let options: String = combatants
        .iter()
        .map(|id| format!("<option value=\"{}\">Pokémon {}</option>", id, id))
        .collect();
    let forms: String = missions
        .iter()
        .map(|id| {
            format!(
                "<form method=\"post\"><input type=\"hidden\" name=\"id_mission\" value=\"{}\">\
                 <select name=\"id_liste_pokemons\">{}</select></form>\n",
                id, options
            )
        })
        .collect();
    if missions.is_empty() && !combatants.is_empty() {
        // Free combatants are still listed when no mission is open
        return format!(
            "<h1>Missions</h1><p>Aucune mission</p><form><select name=\"id_liste_pokemons\">{}</select></form>",
            options
        );
    }
    format!("<h1>Missions</h1>\n{}", forms)
}

/// Map page; the game prints the position as (y,x)
pub fn map_page(at: Coord, encounters: &[u32]) -> String {
    let links: String = encounters
        .iter()
        .map(|id| format!("<a href=\"combat.php?adversaire={}\">Sauvage {}</a>\n", id, id))
        .collect();
    format!(
        "<p>Vous êtes actuellement en ({},{})</p>\n{}",
        at.y, at.x, links
    )
}

/// Battle page builder
#[derive(Debug, Clone)]
pub struct BattlePage {
    pub active: u32,
    pub life: u8,
    pub opponent_life: u8,
    pub moves: Vec<u32>,
    /// `(item id, quantity)`
    pub items: Vec<(u32, u32)>,
    pub switchable: Vec<u32>,
    pub message: Option<&'static str>,
}

impl BattlePage {
    pub fn new(active: u32, life: u8, opponent_life: u8) -> Self {
        Self {
            active,
            life,
            opponent_life,
            moves: vec![1],
            items: Vec::new(),
            switchable: Vec::new(),
            message: None,
        }
    }

    pub fn moves(mut self, moves: &[u32]) -> Self {
        self.moves = moves.to_vec();
        self
    }

    pub fn items(mut self, items: &[(u32, u32)]) -> Self {
        self.items = items.to_vec();
        self
    }

    pub fn switchable(mut self, ids: &[u32]) -> Self {
        self.switchable = ids.to_vec();
        self
    }

    pub fn message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    pub fn html(&self) -> String {
        let mut page = String::from("<div class=\"combat\">\n");
        if let Some(message) = self.message {
            page.push_str(&format!("<p class=\"message\">{}</p>\n", message));
        }
        page.push_str(&format!(
            "<input type=\"hidden\" name=\"pokemon_actif\" value=\"{}\">\n\
             <div class=\"barre vie-joueur\">{}%</div>\n\
             <div class=\"barre vie-adversaire\">{}%</div>\n",
            self.active, self.life, self.opponent_life
        ));
        for id in &self.moves {
            page.push_str(&format!(
                "<button name=\"attaque\" value=\"{}\">Attaque {}</button>\n",
                id, id
            ));
        }
        page.push_str("<select name=\"objet\">");
        for (id, quantity) in &self.items {
            page.push_str(&format!(
                "<option value=\"{}\">Objet {} (x{})</option>",
                id, id, quantity
            ));
        }
        page.push_str("</select>\n<select name=\"pokemon\">");
        for id in &self.switchable {
            page.push_str(&format!("<option value=\"{}\">Pokémon {}</option>", id, id));
        }
        page.push_str("</select>\n</div>");
        page
    }
}

impl From<BattlePage> for String {
    fn from(page: BattlePage) -> Self {
        page.html()
    }
}

// Battle messages
pub const OPPONENT_FAINTED: &str = "Le pokémon adverse est K.O. !";
pub const CAPTURE_FAILED: &str = "Le pokémon sauvage s'est libéré !";

// Result pages
pub const WON_PAGE: &str = "<p>Vous avez gagné le combat !</p>";
pub const LOST_PAGE: &str = "<p>Vous avez perdu le combat...</p>";
pub const FLED_PAGE: &str = "<p>Le pokémon sauvage s'est enfui !</p>";
pub const CAPTURED_PAGE: &str = "<p>Vous avez capturé le pokémon sauvage !</p>";
pub const TARGET_GONE_PAGE: &str = "<p>Ce pokémon n'est plus là.</p>";
pub const FLEE_PAGE: &str = "<p>Vous prenez la fuite.</p>";

pub const DIALOGUE_PAGE: &str = "<div class=\"dialogue\">Bonjour, jeune dresseur !</div>";
pub const NOTHING_TO_SAY_PAGE: &str = "<p>Il n'a rien à vous dire.</p>";
