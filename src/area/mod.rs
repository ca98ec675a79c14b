//! Area Sweep Search
//!
//! Walks every cell of a rectangle of the map and records what can be
//! fought there. One cell costs a move, a position check and an encounter
//! read, so callers should keep rectangles small.

use crate::core::error::{PilotError, Result};
use crate::core::types::{Coord, EncounterId};
use crate::extract::PageExtractor;
use crate::session::{routes, Session};
use crate::transport::Transport;
use serde::Serialize;

/// Encounters visible on one map cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCellResult {
    pub coord: Coord,
    pub encounters: Vec<EncounterId>,
    /// Extraction succeeded (even if nothing was there)
    pub found: bool,
}

/// Aggregate of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AreaReport {
    /// No cell failed
    pub success: bool,
    /// Cells with at least one encounter, in scan order
    pub cells: Vec<AreaCellResult>,
    /// Cells where the move or the read failed
    pub failed: Vec<Coord>,
    /// Cells visited, failed ones included
    pub scanned: u32,
}

impl AreaReport {
    /// Every encounter seen, in scan order
    pub fn encounters(&self) -> impl Iterator<Item = (Coord, EncounterId)> + '_ {
        self.cells
            .iter()
            .flat_map(|cell| cell.encounters.iter().map(move |e| (cell.coord, *e)))
    }
}

/// Inclusive rectangle with normalised corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min: Coord,
    pub max: Coord,
}

impl Rect {
    /// Build from two opposite corners given in any order
    pub fn from_corners(a: Coord, b: Coord) -> Self {
        Self {
            min: Coord::new(a.x.min(b.x), a.y.min(b.y)),
            max: Coord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> u64 {
        u64::from(self.max.x.abs_diff(self.min.x)) + 1
    }

    pub fn height(&self) -> u64 {
        u64::from(self.max.y.abs_diff(self.min.y)) + 1
    }

    /// Saturates for rectangles spanning the whole coordinate range
    pub fn area(&self) -> u64 {
        self.width().saturating_mul(self.height())
    }

    /// Every cell, x-major from `min` to `max`
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let Rect { min, max } = *self;
        (min.x..=max.x).flat_map(move |x| (min.y..=max.y).map(move |y| Coord::new(x, y)))
    }

    pub fn contains(&self, coord: Coord) -> bool {
        (self.min.x..=self.max.x).contains(&coord.x) && (self.min.y..=self.max.y).contains(&coord.y)
    }
}

impl<T: Transport, P: PageExtractor> Session<T, P> {
    /// Move to `coord` and check the map agrees
    ///
    /// The move page answers with stale data, so the position is read from
    /// a separate map request.
    pub async fn go_to(&mut self, coord: Coord) -> Result<bool> {
        self.get(
            routes::MOVE,
            &[
                ("horizontal", coord.x.to_string()),
                ("vertical", coord.y.to_string()),
            ],
        )
        .await?;

        let body = self.get(routes::MAP, &[]).await?;
        let position = self.pages().position(&body)?;
        if position == coord {
            tracing::debug!("Moved to {}", coord);
            Ok(true)
        } else {
            tracing::warn!("Could not move to {} (still at {})", coord, position);
            Ok(false)
        }
    }

    /// Encounters visible from the current position
    pub async fn encounters_here(&mut self) -> Result<AreaCellResult> {
        let body = self.get(routes::MAP, &[]).await?;
        self.pages().area_cell(&body)
    }

    async fn scan_cell(&mut self, coord: Coord) -> Result<AreaCellResult> {
        if !self.go_to(coord).await? {
            return Err(PilotError::Unrecoverable(format!("could not reach {}", coord)));
        }
        let cell = self.encounters_here().await?;
        if cell.coord != coord {
            return Err(PilotError::Unrecoverable(format!(
                "drifted to {} while reading {}",
                cell.coord, coord
            )));
        }
        Ok(cell)
    }
}

/// Visit every cell between two opposite corners and list its encounters
///
/// A failing cell clears `success` and is listed in `failed`; the sweep
/// always goes on to the remaining cells.
pub async fn sweep_area<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    a: Coord,
    b: Coord,
) -> AreaReport {
    let rect = Rect::from_corners(a, b);
    tracing::info!(
        "Sweeping {} to {} ({} cells)",
        rect.min,
        rect.max,
        rect.area()
    );

    let mut report = AreaReport {
        success: true,
        ..AreaReport::default()
    };

    for coord in rect.cells() {
        report.scanned += 1;
        match session.scan_cell(coord).await {
            Ok(cell) if cell.encounters.is_empty() => {
                tracing::trace!("Nothing at {}", coord);
            }
            Ok(cell) => {
                tracing::info!("{} encounters at {}", cell.encounters.len(), coord);
                report.cells.push(cell);
            }
            Err(e) => {
                tracing::warn!("Cell {} failed: {}", coord, e);
                report.success = false;
                report.failed.push(coord);
            }
        }
    }

    tracing::info!(
        "Sweep done: {} cells with encounters, {} failed",
        report.cells.len(),
        report.failed.len()
    );
    report
}
