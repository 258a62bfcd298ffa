use chrono::NaiveDate;

use super::ScheduleBoard;
use crate::services::grid::WeekWindow;
use crate::services::notification::Notice;
use crate::services::remote::RemoteError;

impl ScheduleBoard {
    /// Show the week containing `date`, fetching it on a cache miss.
    ///
    /// Any drag in progress is cancelled. Moves still being confirmed keep
    /// running and land in their own week's cache.
    pub async fn navigate(&mut self, date: NaiveDate) -> Result<WeekWindow, RemoteError> {
        let window = WeekWindow::containing(date, self.config.first_day_of_week);
        self.cancel_drag();

        if window != self.window {
            log::info!("Showing week of {}", window.start);
        }
        self.window = window;

        if !self.store().is_cached(window) {
            self.fetch(window).await?;
        }
        Ok(window)
    }

    pub async fn next_week(&mut self) -> Result<WeekWindow, RemoteError> {
        self.navigate(self.window.next().start).await
    }

    pub async fn previous_week(&mut self) -> Result<WeekWindow, RemoteError> {
        self.navigate(self.window.previous().start).await
    }

    pub async fn today_week(&mut self) -> Result<WeekWindow, RemoteError> {
        let today = self.pipeline().today();
        self.navigate(today).await
    }

    /// Refetch the active week, replacing its cached bookings.
    pub async fn refresh(&mut self) -> Result<(), RemoteError> {
        self.fetch(self.window).await
    }

    async fn fetch(&self, window: WeekWindow) -> Result<(), RemoteError> {
        log::info!("Fetching {} for week of {}", self.config.kind.resource(), window.start);

        match self.remote.fetch_window(&self.branch_id, window.start).await {
            Ok(bookings) => {
                log::info!("Loaded {} bookings for week of {}", bookings.len(), window.start);
                self.store().replace_window(window, bookings);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to fetch week of {}: {}", window.start, err);
                self.notifier.notify(Notice::error(format!(
                    "Could not load the week of {}",
                    window.start.format("%d/%m/%Y")
                )));
                Err(err)
            }
        }
    }
}
