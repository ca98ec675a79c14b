//! Daily bonuses (in-game gold)

use crate::core::error::Result;
use crate::extract::PageExtractor;
use crate::session::{routes, Session};
use crate::transport::Transport;

impl<T: Transport, P: PageExtractor> Session<T, P> {
    /// Collect every daily bonus the bonus page still offers
    ///
    /// The bonus page is re-read before each bonus, since taking one may
    /// change what the page offers.
    ///
    /// # Returns
    /// The bonus links that were followed
    pub async fn collect_bonuses(&mut self) -> Result<Vec<&'static str>> {
        let mut collected = Vec::new();

        for link in routes::BONUS_LINKS {
            let page = self.get(routes::BONUS, &[]).await?;
            if self.pages().bonus_available(&page, link) {
                self.get(link, &[]).await?;
                tracing::debug!("Bonus {} done", link);
                collected.push(link);
            } else {
                tracing::warn!("No bonus possible for {} (already done)", link);
            }
        }

        Ok(collected)
    }
}
