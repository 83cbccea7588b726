//! Home screen booking flow: pickup, then dropoff, then tier confirmation.
//!
//! ```text
//! Idle --start--> SelectingPickup --select--> SelectingDropoff --select--> Confirming
//!  ^                   |                          |                          |
//!  +------back---------+---------back-------------+          back -> SelectingDropoff
//!  +-------------------------------------confirm-------------------------------+
//! ```
//!
//! Everything here is a local state update; there is no I/O to fail.

use tracing::{debug, info};

use crate::config::BookingSettings;
use crate::flags::FeatureFlags;
use crate::location::Location;
use crate::ride::{BookingDraft, BookingPanel, RideTier};

/// What "back" from the dropoff selector does with the chosen pickup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DropoffCancelPolicy {
    /// Forget the pickup and return to idle.
    #[default]
    ClearPickup,
    /// Return to idle but remember the pickup; the next start resumes at
    /// dropoff selection.
    KeepPickup,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingState {
    Idle { retained_pickup: Option<Location> },
    SelectingPickup,
    SelectingDropoff { pickup: Location },
    Confirming(BookingPanel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Idle,
    SelectingPickup,
    SelectingDropoff,
    Confirming,
}

/// Receives confirmed drafts. A real deployment would post them to a
/// booking API.
pub trait BookingSink {
    fn submit(&self, draft: &BookingDraft);
}

/// Logs each confirmed draft and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBookingSink;

impl BookingSink for LoggingBookingSink {
    fn submit(&self, draft: &BookingDraft) {
        info!(
            pickup = %draft.pickup.name,
            dropoff = %draft.dropoff.name,
            ride_type = draft.ride_type.id(),
            price = draft.price,
            estimated_time = %draft.estimated_time,
            "booking confirmed"
        );
    }
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    state: BookingState,
    policy: DropoffCancelPolicy,
    selector_enabled: bool,
}

impl BookingFlow {
    pub fn new(policy: DropoffCancelPolicy, selector_enabled: bool) -> Self {
        Self {
            state: BookingState::Idle {
                retained_pickup: None,
            },
            policy,
            selector_enabled,
        }
    }

    pub fn from_settings(settings: &BookingSettings, flags: &FeatureFlags) -> Self {
        let policy = if settings.keep_pickup_on_dropoff_cancel {
            DropoffCancelPolicy::KeepPickup
        } else {
            DropoffCancelPolicy::ClearPickup
        };
        Self::new(policy, flags.enable_location_selector)
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn step(&self) -> BookingStep {
        match self.state {
            BookingState::Idle { .. } => BookingStep::Idle,
            BookingState::SelectingPickup => BookingStep::SelectingPickup,
            BookingState::SelectingDropoff { .. } => BookingStep::SelectingDropoff,
            BookingState::Confirming(_) => BookingStep::Confirming,
        }
    }

    pub fn pickup(&self) -> Option<&Location> {
        match &self.state {
            BookingState::Idle { retained_pickup } => retained_pickup.as_ref(),
            BookingState::SelectingPickup => None,
            BookingState::SelectingDropoff { pickup } => Some(pickup),
            BookingState::Confirming(panel) => Some(panel.pickup()),
        }
    }

    pub fn dropoff(&self) -> Option<&Location> {
        match &self.state {
            BookingState::Confirming(panel) => Some(panel.dropoff()),
            _ => None,
        }
    }

    pub fn can_start(&self) -> bool {
        self.selector_enabled && self.step() == BookingStep::Idle
    }

    pub fn is_selector_open(&self) -> bool {
        matches!(
            self.step(),
            BookingStep::SelectingPickup | BookingStep::SelectingDropoff
        )
    }

    pub fn panel(&self) -> Option<&BookingPanel> {
        match &self.state {
            BookingState::Confirming(panel) => Some(panel),
            _ => None,
        }
    }

    /// "Book a Ride" on the map. Returns false when the flow is busy or the
    /// selector is switched off.
    pub fn start_booking(&mut self) -> bool {
        if !self.can_start() {
            debug!(step = ?self.step(), "start booking ignored");
            return false;
        }
        self.state = match self.take_state() {
            BookingState::Idle {
                retained_pickup: Some(pickup),
            } => BookingState::SelectingDropoff { pickup },
            _ => BookingState::SelectingPickup,
        };
        debug!(step = ?self.step(), "booking started");
        true
    }

    /// A location picked in the selector, stored as pickup or dropoff
    /// depending on the current step.
    pub fn location_selected(&mut self, location: Location) {
        self.state = match self.take_state() {
            BookingState::SelectingPickup => BookingState::SelectingDropoff { pickup: location },
            BookingState::SelectingDropoff { pickup } => {
                BookingState::Confirming(BookingPanel::new(pickup, location))
            }
            other => {
                debug!(state = ?other, "location selection ignored");
                other
            }
        };
        debug!(step = ?self.step(), "location selected");
    }

    /// Back from the location selector.
    pub fn selector_back(&mut self) {
        self.state = match self.take_state() {
            BookingState::SelectingPickup => BookingState::Idle {
                retained_pickup: None,
            },
            BookingState::SelectingDropoff { pickup } => BookingState::Idle {
                retained_pickup: match self.policy {
                    DropoffCancelPolicy::ClearPickup => None,
                    DropoffCancelPolicy::KeepPickup => Some(pickup),
                },
            },
            other => other,
        };
        debug!(step = ?self.step(), "location selector dismissed");
    }

    pub fn select_ride(&mut self, tier: RideTier) {
        if let BookingState::Confirming(panel) = &mut self.state {
            panel.select(tier);
        }
    }

    /// Back from the booking panel: drop the dropoff and pick it again.
    pub fn panel_back(&mut self) {
        self.state = match self.take_state() {
            BookingState::Confirming(panel) => {
                let (pickup, _) = panel.into_locations();
                BookingState::SelectingDropoff { pickup }
            }
            other => other,
        };
        debug!(step = ?self.step(), "booking panel dismissed");
    }

    /// Builds the draft, hands it to `sink`, and resets to idle. Does nothing
    /// and returns `None` until a tier is selected.
    pub fn confirm(&mut self, sink: &dyn BookingSink) -> Option<BookingDraft> {
        let draft = self.panel()?.draft()?;
        sink.submit(&draft);
        self.state = BookingState::Idle {
            retained_pickup: None,
        };
        Some(draft)
    }

    fn take_state(&mut self) -> BookingState {
        std::mem::replace(
            &mut self.state,
            BookingState::Idle {
                retained_pickup: None,
            },
        )
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new(DropoffCancelPolicy::default(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::location::LocationCatalog;

    #[derive(Default)]
    struct RecordingSink {
        drafts: RefCell<Vec<BookingDraft>>,
    }

    impl BookingSink for RecordingSink {
        fn submit(&self, draft: &BookingDraft) {
            self.drafts.borrow_mut().push(draft.clone());
        }
    }

    fn place(id: &str) -> Location {
        LocationCatalog::popular()
            .get(id)
            .expect("catalog entry")
            .clone()
    }

    #[test]
    fn start_opens_pickup_selection() {
        let mut flow = BookingFlow::default();
        assert!(flow.start_booking());
        assert_eq!(flow.step(), BookingStep::SelectingPickup);
        assert!(flow.is_selector_open());
        assert!(!flow.start_booking());
    }

    #[test]
    fn disabled_selector_blocks_start() {
        let mut flow = BookingFlow::new(DropoffCancelPolicy::ClearPickup, false);
        assert!(!flow.start_booking());
        assert_eq!(flow.step(), BookingStep::Idle);
    }

    #[test]
    fn selector_back_during_pickup_returns_to_idle() {
        let mut flow = BookingFlow::default();
        flow.start_booking();
        flow.selector_back();
        assert_eq!(flow.step(), BookingStep::Idle);
        assert!(flow.pickup().is_none());
    }

    #[test]
    fn panel_back_clears_only_dropoff() {
        let mut flow = BookingFlow::default();
        flow.start_booking();
        flow.location_selected(place("1"));
        flow.location_selected(place("2"));
        flow.select_ride(RideTier::Premium);
        flow.panel_back();
        assert_eq!(flow.step(), BookingStep::SelectingDropoff);
        assert_eq!(flow.pickup().map(|l| l.id.as_str()), Some("1"));
        assert!(flow.dropoff().is_none());
    }

    #[test]
    fn confirm_without_tier_keeps_panel_open() {
        let sink = RecordingSink::default();
        let mut flow = BookingFlow::default();
        flow.start_booking();
        flow.location_selected(place("3"));
        flow.location_selected(place("4"));
        assert!(flow.confirm(&sink).is_none());
        assert_eq!(flow.step(), BookingStep::Confirming);
        assert!(sink.drafts.borrow().is_empty());
    }

    #[test]
    fn confirm_hands_draft_to_sink_and_resets() {
        let sink = RecordingSink::default();
        let mut flow = BookingFlow::default();
        flow.start_booking();
        flow.location_selected(place("5"));
        flow.location_selected(place("3"));
        flow.select_ride(RideTier::Economy);
        let draft = flow.confirm(&sink).expect("draft");
        assert_eq!(draft.price, 15);
        assert_eq!(sink.drafts.borrow().as_slice(), &[draft]);
        assert_eq!(flow.step(), BookingStep::Idle);
        assert!(flow.pickup().is_none());
        assert!(flow.dropoff().is_none());
    }

    #[test]
    fn keep_pickup_policy_resumes_at_dropoff() {
        let mut flow = BookingFlow::new(DropoffCancelPolicy::KeepPickup, true);
        flow.start_booking();
        flow.location_selected(place("1"));
        flow.selector_back();
        assert_eq!(flow.step(), BookingStep::Idle);
        assert_eq!(flow.pickup().map(|l| l.id.as_str()), Some("1"));
        assert!(flow.start_booking());
        assert_eq!(flow.step(), BookingStep::SelectingDropoff);
    }

    #[test]
    fn selections_outside_the_selector_are_ignored() {
        let mut flow = BookingFlow::default();
        flow.location_selected(place("1"));
        assert_eq!(flow.step(), BookingStep::Idle);
        flow.select_ride(RideTier::Comfort);
        flow.panel_back();
        assert_eq!(flow.step(), BookingStep::Idle);
    }
}
