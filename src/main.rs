// Clinic Schedule Board
// Main entry point

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};

use clinic_schedule_board::models::booking::BookingId;
use clinic_schedule_board::models::cell::Cell;
use clinic_schedule_board::services::notification::{DesktopNotifier, FanoutNotifier, Notifier};
use clinic_schedule_board::services::remote::HttpScheduler;
use clinic_schedule_board::services::settings::SettingsService;
use clinic_schedule_board::services::sync::MoveOutcome;
use clinic_schedule_board::ui::app::toast::ToastQueue;
use clinic_schedule_board::ui::ScheduleBoard;

const USAGE: &str = "usage: schedule-board [show [YYYY-MM-DD] | move <id> <YYYY-MM-DD> [HH:MM] | slots <YYYY-MM-DD>]";

enum Command {
    Show(Option<NaiveDate>),
    Move {
        id: BookingId,
        date: NaiveDate,
        time: Option<NaiveTime>,
    },
    Slots(NaiveDate),
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("Invalid date '{}'", raw))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").with_context(|| format!("Invalid time '{}'", raw))
}

fn parse_args(args: &[String]) -> Result<Command> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] | ["show"] => Ok(Command::Show(None)),
        ["show", date] => Ok(Command::Show(Some(parse_date(date)?))),
        ["move", id, date] => Ok(Command::Move {
            id: BookingId::new(*id),
            date: parse_date(date)?,
            time: None,
        }),
        ["move", id, date, time] => Ok(Command::Move {
            id: BookingId::new(*id),
            date: parse_date(date)?,
            time: Some(parse_time(time)?),
        }),
        ["slots", date] => Ok(Command::Slots(parse_date(date)?)),
        _ => bail!(USAGE),
    }
}

fn print_toasts(toasts: &ToastQueue) {
    for toast in toasts.drain() {
        println!("{} {}", toast.icon(), toast.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let settings = SettingsService::from_environment()
        .load()
        .context("Failed to load settings")?;
    log::info!(
        "Starting schedule board for branch {} ({})",
        settings.branch_id,
        settings.board.label()
    );

    let remote = Arc::new(HttpScheduler::new(&settings)?);
    let toasts = Arc::new(ToastQueue::new());
    let notifier: Arc<dyn Notifier> = Arc::new(
        FanoutNotifier::new()
            .with(toasts.clone())
            .with(Arc::new(DesktopNotifier::new(settings.desktop_notifications))),
    );

    let mut board = ScheduleBoard::from_settings(&settings, remote, notifier);

    match command {
        Command::Show(date) => {
            match date {
                Some(date) => board.navigate(date).await?,
                None => board.today_week().await?,
            };
            print!("{}", board.view().render_text());
        }
        Command::Move { id, date, time } => {
            // Load the current week too so bookings can be moved out of it.
            board.today_week().await?;
            board.navigate(date).await?;
            let cell = match (board.config().granularity.is_slotted(), time) {
                (true, Some(time)) => Cell::slot(date, time),
                (true, None) => bail!("This board needs a time, e.g. 09:30"),
                (false, _) => Cell::day(date),
            };

            if board.store().find_cell(&id).is_none() {
                bail!("Booking {} is not on this week or the week of {}", id, board.window().start);
            }

            let outcome = match board.move_booking(&id, cell) {
                Ok(ticket) => ticket.outcome().await,
                Err(rejection) => {
                    print_toasts(&toasts);
                    return Err(rejection.into());
                }
            };
            print_toasts(&toasts);
            if !matches!(outcome, MoveOutcome::Confirmed(_)) {
                bail!("Move was not saved");
            }
            print!("{}", board.view().render_text());
        }
        Command::Slots(date) => {
            for slot in board.slot_availability(date).await? {
                let state = if slot.is_booked { "booked" } else { "free" };
                println!("{:<8} {}", slot.label, state);
            }
        }
    }

    print_toasts(&toasts);
    Ok(())
}
