//! Client (resident) records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of rooms in the home; rooms are numbered 1..=50.
pub const TOTAL_ROOMS: u32 = 50;

/// A resident of the home.
///
/// Every scoped resource carries an owning `client_id` pointing here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: String,
    pub full_name: String,
    pub age: u32,
    /// Room number as entered ("12"); at most one resident per room.
    pub room_number: String,
    pub care_type: String,
    pub admission_date: NaiveDate,
    pub nhs_number: Option<String>,
    pub gp_surgery: Option<String>,
    pub next_of_kin_name: Option<String>,
    pub next_of_kin_phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Client {
    /// Create a new client with the required intake fields.
    pub fn new(
        full_name: String,
        age: u32,
        room_number: String,
        care_type: String,
        admission_date: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            age,
            room_number,
            care_type,
            admission_date,
            nhs_number: None,
            gp_surgery: None,
            next_of_kin_name: None,
            next_of_kin_phone: None,
            notes: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Room usage summary for the home.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomOccupancy {
    pub total_rooms: u32,
    pub current_occupancy: u32,
    pub occupied_rooms: Vec<String>,
    pub available_rooms: Vec<String>,
}

impl RoomOccupancy {
    /// Build the summary from the occupied room numbers.
    pub fn from_occupied(mut occupied: Vec<String>) -> Self {
        occupied.sort();
        let available = (1..=TOTAL_ROOMS)
            .map(|n| n.to_string())
            .filter(|room| !occupied.contains(room))
            .collect();
        Self {
            total_rooms: TOTAL_ROOMS,
            current_occupancy: occupied.len() as u32,
            occupied_rooms: occupied,
            available_rooms: available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let client = Client::new("Edith Moore".into(), 84, "12".into(), "Residential".into(), date);
        assert_eq!(client.full_name, "Edith Moore");
        assert_eq!(client.room_number, "12");
        assert_eq!(client.id.len(), 36);
    }

    #[test]
    fn test_room_occupancy() {
        let occupancy = RoomOccupancy::from_occupied(vec!["3".into(), "12".into()]);
        assert_eq!(occupancy.total_rooms, 50);
        assert_eq!(occupancy.current_occupancy, 2);
        assert!(!occupancy.available_rooms.contains(&"3".to_string()));
        assert!(occupancy.available_rooms.contains(&"4".to_string()));
        assert_eq!(occupancy.available_rooms.len(), 48);
    }
}
