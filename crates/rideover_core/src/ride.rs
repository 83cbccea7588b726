//! Ride tiers, the booking panel model, and the booking draft it produces.

use serde::{Deserialize, Serialize};

use crate::geo::{distance_km, estimated_trip_minutes};
use crate::location::Location;

pub const CURRENCY: &str = "GHS";

/// ETA shown when an option carries none.
pub const FALLBACK_ESTIMATED_TIME: &str = "5-10 min";

/// Width of the trip time range shown in the summary, in minutes.
const TRIP_TIME_SPREAD_MIN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideTier {
    Economy,
    Comfort,
    Premium,
}

impl RideTier {
    pub fn id(self) -> &'static str {
        match self {
            RideTier::Economy => "economy",
            RideTier::Comfort => "comfort",
            RideTier::Premium => "premium",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        RIDE_OPTIONS
            .iter()
            .map(|option| option.tier)
            .find(|tier| tier.id() == id)
    }

    pub fn option(self) -> &'static RideOption {
        match self {
            RideTier::Economy => &RIDE_OPTIONS[0],
            RideTier::Comfort => &RIDE_OPTIONS[1],
            RideTier::Premium => &RIDE_OPTIONS[2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideOption {
    pub tier: RideTier,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u32,
    pub estimated_time: &'static str,
    pub icon: &'static str,
}

impl RideOption {
    pub fn estimated_time(&self) -> &'static str {
        if self.estimated_time.is_empty() {
            FALLBACK_ESTIMATED_TIME
        } else {
            self.estimated_time
        }
    }

    pub fn price_label(&self) -> String {
        format!("{CURRENCY} {}", self.price)
    }
}

pub const RIDE_OPTIONS: [RideOption; 3] = [
    RideOption {
        tier: RideTier::Economy,
        name: "Economy",
        description: "Affordable rides for everyday travel",
        price: 15,
        estimated_time: "5-10 min",
        icon: "car-outline",
    },
    RideOption {
        tier: RideTier::Comfort,
        name: "Comfort",
        description: "Newer cars with extra legroom",
        price: 25,
        estimated_time: "3-7 min",
        icon: "car-sport-outline",
    },
    RideOption {
        tier: RideTier::Premium,
        name: "Premium",
        description: "Luxury cars for special occasions",
        price: 40,
        estimated_time: "2-5 min",
        icon: "car-sport",
    },
];

pub fn ride_options() -> &'static [RideOption] {
    &RIDE_OPTIONS
}

/// Finalized pickup + dropoff + tier handed off for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub pickup: Location,
    pub dropoff: Location,
    pub ride_type: RideTier,
    pub price: u32,
    pub estimated_time: String,
}

/// Straight-line distance and a rough driving time between the two stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripSummary {
    pub distance_km: f64,
    pub minutes_low: u32,
    pub minutes_high: u32,
}

impl TripSummary {
    pub fn between(pickup: &Location, dropoff: &Location) -> Self {
        let distance_km = distance_km(pickup.coordinates, dropoff.coordinates);
        let minutes_low = (estimated_trip_minutes(distance_km).floor() as u32).max(1);
        Self {
            distance_km,
            minutes_low,
            minutes_high: minutes_low + TRIP_TIME_SPREAD_MIN,
        }
    }

    pub fn distance_label(&self) -> String {
        format!("~{:.1} km", self.distance_km)
    }

    pub fn duration_label(&self) -> String {
        format!("{}-{} min", self.minutes_low, self.minutes_high)
    }
}

/// State behind the "Confirm Ride" sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPanel {
    pickup: Location,
    dropoff: Location,
    selected: Option<RideTier>,
    summary: TripSummary,
}

impl BookingPanel {
    pub fn new(pickup: Location, dropoff: Location) -> Self {
        let summary = TripSummary::between(&pickup, &dropoff);
        Self {
            pickup,
            dropoff,
            selected: None,
            summary,
        }
    }

    pub fn pickup(&self) -> &Location {
        &self.pickup
    }

    pub fn dropoff(&self) -> &Location {
        &self.dropoff
    }

    pub fn summary(&self) -> &TripSummary {
        &self.summary
    }

    pub fn selected(&self) -> Option<RideTier> {
        self.selected
    }

    pub fn select(&mut self, tier: RideTier) {
        self.selected = Some(tier);
    }

    pub fn can_confirm(&self) -> bool {
        self.selected.is_some()
    }

    /// `None` until a tier has been chosen.
    pub fn draft(&self) -> Option<BookingDraft> {
        let option = self.selected?.option();
        Some(BookingDraft {
            pickup: self.pickup.clone(),
            dropoff: self.dropoff.clone(),
            ride_type: option.tier,
            price: option.price,
            estimated_time: option.estimated_time().to_string(),
        })
    }

    pub fn into_locations(self) -> (Location, Location) {
        (self.pickup, self.dropoff)
    }
}
