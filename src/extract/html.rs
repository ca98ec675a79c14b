//! Extractor for the live game's HTML
//!
//! Every marker the automation relies on is listed here: confirmation
//! texts, link shapes, form field names and the classes of the life bars.
//! When the game changes its pages, this is the only file to touch.

use crate::account::{AccountSnapshot, Combatant, Role};
use crate::area::AreaCellResult;
use crate::battle::{BattleSignal, BattleSnapshot, Inventory};
use crate::core::error::{PilotError, Result};
use crate::core::types::{CombatantId, Coord, EncounterId, ItemId, MissionId, MoveId};
use crate::extract::markup::{self, Tag};
use crate::extract::PageExtractor;
use crate::missions::MissionBoard;

// Session
pub const LOGIN_OK: &str = "Vous êtes maintenant connecté.";
pub const LOGOUT_OK: &str = "Votre session a bien été arretée!";

// Account page
pub const ACTIVE_LINK: &str = "vos_pokemons.php?id=";
pub const RESERVE_LINK: &str = "carte.php?pokemon_actif=";
const LEVEL: &str = "Niv.";
const ACTION_POINTS: &str = "(PA";
const SCORE: &str = "Score :";
const RANK: &str = "Classement :";
const OWNED: &str = "Pokémons :";

// Missions
const MISSIONS_TITLE: &str = "Missions";
pub const MISSION_DONE: &str = "Votre pokémon est revenu de mission";

// Map
pub const POSITION: &str = "Vous êtes actuellement en ";
pub const ENCOUNTER_LINK: &str = "combat.php?adversaire=";

// Battle
const BATTLE_CLASS: &str = "combat";
const OWN_LIFE_CLASS: &str = "vie-joueur";
const OPPONENT_LIFE_CLASS: &str = "vie-adversaire";
const TARGET_GONE: &str = "Ce pokémon n'est plus là";
const CAPTURED: &str = "Vous avez capturé";
const WON: &str = "Vous avez gagné le combat";
const LOST: &str = "Vous avez perdu le combat";
const OPPONENT_FLED: &str = "s'est enfui";
const OPPONENT_FAINTED: &str = "Le pokémon adverse est K.O.";
const ACTIVE_FAINTED: &str = "Votre pokémon est K.O.";
const CAPTURE_FAILED: &str = "s'est libéré";

// Dialogues
const DIALOGUE_CLASS: &str = "dialogue";
const NOTHING_TO_SAY: &str = "n'a rien à vous dire";

/// Marker-based extractor for pokemon-origins pages
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPages;

impl HtmlPages {
    pub fn new() -> Self {
        Self
    }

    /// Level and action points from the link text, e.g. `Pikachu Niv. 15 (PA 3)`
    fn combatant(body: &str, link: &Tag<'_>, id: u32, role: Role) -> Result<Combatant> {
        let text = link.inner_until(body, "</a>");

        let level = markup::number_after(text, LEVEL)
            .and_then(|l| u8::try_from(l).ok())
            .filter(|l| (1..=100).contains(l))
            .ok_or_else(|| PilotError::parse(format!("no valid level for combatant {}", id)))?;

        let action_points = markup::number_after(text, ACTION_POINTS)
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| {
                PilotError::parse(format!("no action points for combatant {}", id))
            })?;

        Ok(Combatant {
            id: CombatantId(id),
            level,
            action_points,
            role,
        })
    }

    /// Dollars are the first bold amount with a `$`, gold the bold right after
    fn currency(body: &str) -> Result<(u64, u64)> {
        let bolds = markup::tags(body, "b");
        let dollars_at = bolds
            .iter()
            .position(|b| b.text_after(body).contains('$'))
            .ok_or_else(|| PilotError::parse("no dollar amount"))?;

        let dollars = markup::grouped_number(bolds[dollars_at].text_after(body))
            .ok_or_else(|| PilotError::parse("unreadable dollar amount"))?;
        let gold = bolds
            .get(dollars_at + 1)
            .and_then(|b| markup::grouped_number(b.text_after(body)))
            .ok_or_else(|| PilotError::parse("no gold amount after dollars"))?;

        Ok((dollars, gold))
    }

    fn life(body: &str, class: &str) -> Result<u8> {
        markup::tags(body, "div")
            .iter()
            .find(|d| d.has_class(class))
            .and_then(|d| markup::percent(d.text_after(body)))
            .ok_or_else(|| PilotError::parse(format!("no {} bar", class)))
    }

    fn numeric_attr(tag: &Tag<'_>, attr: &str, what: &str) -> Result<u32> {
        tag.attr(attr)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| PilotError::parse(format!("non-numeric {}", what)))
    }

    /// `(value, text)` of every option of the `<select name=...>`, if present
    fn select_options<'a>(body: &'a str, name: &str) -> Result<Vec<(u32, &'a str)>> {
        let Some(select) = markup::find_tag(body, "select", "name", name) else {
            return Ok(Vec::new());
        };
        let region = select.inner_until(body, "</select>");
        markup::tags(region, "option")
            .iter()
            .map(|option| {
                let value = Self::numeric_attr(option, "value", name)?;
                Ok((value, option.text_after(region)))
            })
            .collect()
    }

    fn moves(body: &str) -> Result<Vec<MoveId>> {
        let mut buttons: Vec<Tag<'_>> = markup::tags(body, "input");
        buttons.extend(markup::tags(body, "button"));
        buttons.retain(|t| t.attr("name") == Some("attaque") && t.attr("disabled").is_none());
        buttons.sort_by_key(|t| t.start);

        buttons
            .iter()
            .map(|t| Self::numeric_attr(t, "value", "move id").map(MoveId))
            .collect()
    }

    fn signal(body: &str) -> BattleSignal {
        let markers = [
            (TARGET_GONE, BattleSignal::TargetGone),
            (CAPTURED, BattleSignal::Captured),
            (WON, BattleSignal::Won),
            (LOST, BattleSignal::Lost),
            (OPPONENT_FLED, BattleSignal::OpponentFled),
            (OPPONENT_FAINTED, BattleSignal::OpponentFainted),
            (CAPTURE_FAILED, BattleSignal::CaptureFailed),
        ];
        markers
            .into_iter()
            .find(|(marker, _)| body.contains(marker))
            .map(|(_, signal)| signal)
            .unwrap_or(BattleSignal::None)
    }
}

impl PageExtractor for HtmlPages {
    fn login_succeeded(&self, body: &str) -> bool {
        body.contains(LOGIN_OK)
    }

    fn logout_succeeded(&self, body: &str) -> bool {
        body.contains(LOGOUT_OK)
    }

    fn account(&self, body: &str) -> Result<AccountSnapshot> {
        let mut active: Option<Combatant> = None;
        let mut reserves: Vec<Combatant> = Vec::new();

        for link in markup::tags(body, "a") {
            let Some(href) = link.attr("href") else {
                continue;
            };
            if let Some(id) = markup::id_after_prefix(href, ACTIVE_LINK) {
                match &active {
                    Some(current) if current.id != CombatantId(id) => {
                        return Err(PilotError::parse(format!(
                            "two active combatants ({} and {})",
                            current.id, id
                        )));
                    }
                    Some(_) => {}
                    None => active = Some(Self::combatant(body, &link, id, Role::Active)?),
                }
            } else if let Some(id) = markup::id_after_prefix(href, RESERVE_LINK) {
                if !reserves.iter().any(|c| c.id == CombatantId(id)) {
                    reserves.push(Self::combatant(body, &link, id, Role::Reserve)?);
                }
            }
        }

        let active = active.ok_or_else(|| PilotError::parse("no active combatant"))?;
        reserves.retain(|c| c.id != active.id);

        let (dollars, gold) = Self::currency(body)?;
        let score = markup::number_after(body, SCORE)
            .ok_or_else(|| PilotError::parse("no score"))?;
        let rank = markup::number_after(body, RANK)
            .ok_or_else(|| PilotError::parse("no rank"))?;
        let (owned, max_owned) = markup::ratio_after(body, OWNED)
            .and_then(|(o, m)| Some((u32::try_from(o).ok()?, u32::try_from(m).ok()?)))
            .ok_or_else(|| PilotError::parse("no owned/max combatant count"))?;

        Ok(AccountSnapshot {
            active,
            reserves,
            dollars,
            gold,
            score,
            rank,
            owned,
            max_owned,
        })
    }

    fn mission_board(&self, body: &str) -> Result<MissionBoard> {
        if !body.contains(MISSIONS_TITLE) {
            return Err(PilotError::parse("not a mission page"));
        }

        let mut board = MissionBoard::default();
        for form in markup::tags(body, "form") {
            let inner = form.inner_until(body, "</form>");

            if let Some(input) = markup::find_tag(inner, "input", "name", "id_mission") {
                board
                    .missions
                    .push(MissionId(Self::numeric_attr(&input, "value", "mission id")?));
            }

            // Every form lists the same free combatants; the first one is enough
            if board.combatants.is_empty() {
                for option in markup::tags(inner, "option") {
                    board
                        .combatants
                        .push(CombatantId(Self::numeric_attr(&option, "value", "combatant id")?));
                }
            }
        }

        Ok(board)
    }

    fn mission_completed(&self, body: &str) -> bool {
        body.contains(MISSION_DONE)
    }

    fn position(&self, body: &str) -> Result<Coord> {
        // The page prints (vertical,horizontal)
        markup::pair_after(body, POSITION)
            .map(|(y, x)| Coord::new(x, y))
            .ok_or_else(|| PilotError::parse("no current position"))
    }

    fn area_cell(&self, body: &str) -> Result<AreaCellResult> {
        let coord = self.position(body)?;

        let mut encounters: Vec<EncounterId> = Vec::new();
        for link in markup::tags(body, "a") {
            let Some(id) = link
                .attr("href")
                .and_then(|href| markup::id_after_prefix(href, ENCOUNTER_LINK))
            else {
                continue;
            };
            if !encounters.contains(&EncounterId(id)) {
                encounters.push(EncounterId(id));
            }
        }

        Ok(AreaCellResult {
            coord,
            encounters,
            found: true,
        })
    }

    fn battle(&self, body: &str) -> Result<BattleSnapshot> {
        let signal = Self::signal(body);
        let in_battle = markup::tags(body, "div")
            .iter()
            .any(|d| d.has_class(BATTLE_CLASS));

        if !in_battle {
            if signal == BattleSignal::None {
                return Err(PilotError::parse(
                    "page shows neither a battle nor a battle result",
                ));
            }
            // Result pages may or may not keep the bars
            return Ok(BattleSnapshot {
                in_battle: false,
                life: Self::life(body, OWN_LIFE_CLASS).unwrap_or(0),
                opponent_life: Self::life(body, OPPONENT_LIFE_CLASS).unwrap_or(0),
                active_fainted: body.contains(ACTIVE_FAINTED),
                signal,
                ..BattleSnapshot::default()
            });
        }

        let active = markup::find_tag(body, "input", "name", "pokemon_actif")
            .map(|t| Self::numeric_attr(&t, "value", "active combatant"))
            .transpose()?
            .map(CombatantId)
            .ok_or_else(|| PilotError::parse("no active combatant in battle"))?;

        let life = Self::life(body, OWN_LIFE_CLASS)?;
        let opponent_life = Self::life(body, OPPONENT_LIFE_CLASS)?;

        let items = Self::select_options(body, "objet")?
            .into_iter()
            .map(|(id, text)| {
                markup::number_after(text, "(x")
                    .and_then(|q| u32::try_from(q).ok())
                    .map(|q| (ItemId(id), q))
                    .ok_or_else(|| PilotError::parse(format!("no quantity for item {}", id)))
            })
            .collect::<Result<Inventory>>()?;

        let switchable = Self::select_options(body, "pokemon")?
            .into_iter()
            .map(|(id, _)| CombatantId(id))
            .collect();

        Ok(BattleSnapshot {
            in_battle: true,
            active: Some(active),
            usable_moves: Self::moves(body)?,
            items,
            switchable,
            life,
            opponent_life,
            active_fainted: life == 0 || body.contains(ACTIVE_FAINTED),
            signal,
        })
    }

    fn dialogue(&self, body: &str) -> Result<bool> {
        if markup::tags(body, "div")
            .iter()
            .any(|d| d.has_class(DIALOGUE_CLASS))
        {
            Ok(true)
        } else if body.contains(NOTHING_TO_SAY) {
            Ok(false)
        } else {
            Err(PilotError::parse("no dialogue on the character page"))
        }
    }

    fn bonus_available(&self, body: &str, link: &str) -> bool {
        body.contains(link)
    }
}
