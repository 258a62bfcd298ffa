// Test fixtures - reusable test data
// Provides bookings, dates and a scriptable in-memory backend

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tokio::sync::Semaphore;

use clinic_schedule_board::models::board::BoardConfig;
use clinic_schedule_board::models::booking::{Booking, BookingId, ScheduledAt};
use clinic_schedule_board::models::cell::Cell;
use clinic_schedule_board::models::movement::{MoveConfirmation, MoveResponse, SlotAvailability};
use clinic_schedule_board::services::pipeline::FixedClock;
use clinic_schedule_board::services::remote::{RemoteError, RemoteScheduler};
use clinic_schedule_board::ui::app::toast::ToastQueue;
use clinic_schedule_board::ui::ScheduleBoard;

/// Sample dates for testing. The board week runs Monday 9 June to
/// Sunday 15 June 2025 and "today" is Tuesday the 10th.
pub mod dates {
    use super::*;

    pub fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    pub fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        june(10)
    }

    pub fn monday() -> NaiveDate {
        june(9)
    }

    pub fn wednesday() -> NaiveDate {
        june(11)
    }

    pub fn thursday() -> NaiveDate {
        june(12)
    }

    /// Monday of the following week.
    pub fn next_monday() -> NaiveDate {
        june(16)
    }
}

/// Sample bookings
pub mod bookings {
    use super::*;

    pub fn on_day(id: u64, name: &str, day: NaiveDate) -> Booking {
        Booking::new(id, name, ScheduledAt::on(day))
    }

    pub fn at_slot(id: u64, name: &str, day: NaiveDate, time: NaiveTime) -> Booking {
        Booking::new(id, name, ScheduledAt::at(day, time))
    }
}

/// How the fake backend answers the next confirmation for a booking.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Accept and echo the booking at the requested cell.
    Accept,
    /// Accept but place the booking somewhere else.
    AcceptAt(Cell),
    /// `{success: false, message}` in a 200 response.
    Decline(String),
    /// A 4xx rejection.
    Reject(String),
    /// The request never reached the server.
    Offline,
}

/// In-memory [`RemoteScheduler`] with scripted replies and gates that hold
/// a booking's confirmation until the test releases it.
#[derive(Default)]
pub struct FakeRemote {
    weeks: Mutex<HashMap<NaiveDate, Vec<Booking>>>,
    replies: Mutex<HashMap<BookingId, VecDeque<Reply>>>,
    gates: Mutex<HashMap<BookingId, Arc<Semaphore>>>,
    confirmations: Mutex<Vec<MoveConfirmation>>,
    fetches: Mutex<Vec<NaiveDate>>,
    active: Mutex<HashMap<BookingId, usize>>,
    overlaps: AtomicUsize,
    fetch_offline: AtomicBool,
    slots: Mutex<Vec<SlotAvailability>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_week(&self, week_start: NaiveDate, bookings: Vec<Booking>) {
        self.weeks.lock().unwrap().insert(week_start, bookings);
    }

    pub fn set_slots(&self, slots: Vec<SlotAvailability>) {
        *self.slots.lock().unwrap() = slots;
    }

    pub fn reply(&self, id: impl Into<BookingId>, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(id.into())
            .or_default()
            .push_back(reply);
    }

    /// Hold confirmations for `id` until [`FakeRemote::release`] is called.
    pub fn gate(&self, id: impl Into<BookingId>) {
        self.gates
            .lock()
            .unwrap()
            .insert(id.into(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held confirmation for `id` through.
    pub fn release(&self, id: impl Into<BookingId>) {
        if let Some(gate) = self.gates.lock().unwrap().get(&id.into()) {
            gate.add_permits(1);
        }
    }

    pub fn set_fetch_offline(&self, offline: bool) {
        self.fetch_offline.store(offline, Ordering::SeqCst);
    }

    pub fn confirmations(&self) -> Vec<MoveConfirmation> {
        self.confirmations.lock().unwrap().clone()
    }

    pub fn confirmation_count(&self) -> usize {
        self.confirmations.lock().unwrap().len()
    }

    pub fn fetches(&self) -> Vec<NaiveDate> {
        self.fetches.lock().unwrap().clone()
    }

    /// Times a confirmation started while another for the same booking
    /// was still open.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn find(&self, id: &BookingId) -> Option<Booking> {
        self.weeks
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|booking| booking.id == *id)
            .cloned()
    }

    fn answer(&self, confirmation: &MoveConfirmation) -> Result<MoveResponse, RemoteError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&confirmation.booking_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::Accept);

        let requested = Cell {
            day: confirmation.new_date,
            slot: confirmation.new_slot,
        };
        let placed = |cell: Cell| MoveResponse {
            success: true,
            message: None,
            booking: self
                .find(&confirmation.booking_id)
                .map(|booking| booking.relocated_to(&cell)),
        };

        match reply {
            Reply::Accept => Ok(placed(requested)),
            Reply::AcceptAt(cell) => Ok(placed(cell)),
            Reply::Decline(message) => Ok(MoveResponse {
                success: false,
                message: Some(message),
                booking: None,
            }),
            Reply::Reject(message) => Err(RemoteError::rejected(message)),
            Reply::Offline => Err(RemoteError::Network("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl RemoteScheduler for FakeRemote {
    async fn fetch_window(
        &self,
        _branch_id: &str,
        week_start: NaiveDate,
    ) -> Result<Vec<Booking>, RemoteError> {
        self.fetches.lock().unwrap().push(week_start);
        if self.fetch_offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        Ok(self
            .weeks
            .lock()
            .unwrap()
            .get(&week_start)
            .cloned()
            .unwrap_or_default())
    }

    async fn confirm_move(
        &self,
        _branch_id: &str,
        confirmation: &MoveConfirmation,
    ) -> Result<MoveResponse, RemoteError> {
        let id = confirmation.booking_id.clone();
        self.confirmations.lock().unwrap().push(confirmation.clone());
        {
            let mut active = self.active.lock().unwrap();
            let open = active.entry(id.clone()).or_default();
            if *open > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            *open += 1;
        }

        let gate = self.gates.lock().unwrap().get(&id).cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let answer = self.answer(confirmation);
        if let Some(open) = self.active.lock().unwrap().get_mut(&id) {
            *open -= 1;
        }
        answer
    }

    async fn slot_availability(
        &self,
        _branch_id: &str,
        _date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, RemoteError> {
        Ok(self.slots.lock().unwrap().clone())
    }
}

/// A board on `config`, with today pinned to 10 June 2025, its toast queue
/// and the fake backend behind it.
pub fn board_with(config: BoardConfig, remote: Arc<FakeRemote>) -> (ScheduleBoard, Arc<ToastQueue>) {
    let toasts = Arc::new(ToastQueue::new());
    let board = ScheduleBoard::new(
        config.with_first_day_of_week(1),
        "main",
        remote,
        toasts.clone(),
        Arc::new(FixedClock(dates::today())),
    );
    (board, toasts)
}

/// Let spawned confirmation tasks make progress.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
