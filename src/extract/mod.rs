//! Page State Extractor
//!
//! Turns raw page bodies into typed snapshots. The game's markup is an
//! undocumented schema, so this is a strict boundary: when an expected
//! marker is missing the extractor fails with `PilotError::Parse` instead of
//! filling in zeros or sentinel ids.

pub mod html;
pub mod markup;

pub use html::HtmlPages;

use crate::account::AccountSnapshot;
use crate::area::AreaCellResult;
use crate::battle::BattleSnapshot;
use crate::core::error::Result;
use crate::core::types::Coord;
use crate::missions::MissionBoard;

/// Pure functions from page body to state
pub trait PageExtractor {
    /// The login form answered with the "connected" confirmation
    fn login_succeeded(&self, body: &str) -> bool;

    /// The logout page confirmed the end of the session
    fn logout_succeeded(&self, body: &str) -> bool;

    fn account(&self, body: &str) -> Result<AccountSnapshot>;

    fn mission_board(&self, body: &str) -> Result<MissionBoard>;

    /// The mission submission came back completed
    fn mission_completed(&self, body: &str) -> bool;

    /// Current map position
    fn position(&self, body: &str) -> Result<Coord>;

    /// Position plus the encounters visible there
    fn area_cell(&self, body: &str) -> Result<AreaCellResult>;

    fn battle(&self, body: &str) -> Result<BattleSnapshot>;

    /// `Ok(true)` when a dialogue was shown, `Ok(false)` when the character
    /// explicitly had nothing to say
    fn dialogue(&self, body: &str) -> Result<bool>;

    /// The bonus page still offers `link` (e.g. `bonus1.php`)
    fn bonus_available(&self, body: &str, link: &str) -> bool;
}
