use serde::{Deserialize, Serialize};

/// A bus-trip record as submitted on creation. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BusDetails {
    pub vehicle_id: i64,
    /// Calendar date in `DD-MM-YYYY` form
    #[schema(example = "15-06-2023")]
    pub date_field: String,
    pub trip: String,
    pub front_door_entry: i64,
    pub front_door_exit: i64,
    pub back_door_entry: i64,
    pub back_door_exit: i64,
    pub trip_count: i64,
    pub distress_count: i64,
}

/// A stored record: the submitted fields plus the key the store assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BusDetailsEntry {
    pub key: String,
    #[serde(flatten)]
    pub details: BusDetails,
}

/// Partial update. Absent fields (omitted or `null`) keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BusDetailsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_door_entry: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_door_exit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_door_entry: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_door_exit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distress_count: Option<i64>,
}

impl BusDetailsPatch {
    /// The supplied integer fields, keyed by column name
    pub fn counts(&self) -> Vec<(&'static str, i64)> {
        [
            ("front_door_entry", self.front_door_entry),
            ("front_door_exit", self.front_door_exit),
            ("back_door_entry", self.back_door_entry),
            ("back_door_exit", self.back_door_exit),
            ("trip_count", self.trip_count),
            ("distress_count", self.distress_count),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.trip.is_none() && self.counts().is_empty()
    }

    /// Overwrite the fields of `details` that this patch supplies
    pub fn apply_to(&self, details: &mut BusDetails) {
        if let Some(trip) = &self.trip {
            details.trip = trip.clone();
        }
        let slots = [
            (&mut details.front_door_entry, self.front_door_entry),
            (&mut details.front_door_exit, self.front_door_exit),
            (&mut details.back_door_entry, self.back_door_entry),
            (&mut details.back_door_exit, self.back_door_exit),
            (&mut details.trip_count, self.trip_count),
            (&mut details.distress_count, self.distress_count),
        ];
        for (slot, value) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// Optional date narrowing for lookup and delete
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Only match records with this `DD-MM-YYYY` date
    pub date_field: Option<String>,
}

/// Response type for the root endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct GreetingResponse {
    pub greetings: String,
}

/// Response type for successful DELETE operations
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub task: String,
}
