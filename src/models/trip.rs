use chrono::{NaiveDate, Utc};
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Usuário referenciado por uma trip (snapshot do nome)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
}

/// Trip document (armazenado na collection `trips`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub destination: String,
    pub image: String,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub duration: String,
    pub price: f64,
    #[serde(default)]
    pub participants: i32,
    pub max_participants: i32,
    pub description: String,
    #[serde(default)]
    pub itinerary: Vec<String>,
    #[serde(default)]
    pub food: String,
    #[serde(default)]
    pub accommodation: String,
    #[serde(default)]
    pub transportation: String,
    pub organizer: MemberRef,
    #[serde(default)]
    pub members: Vec<MemberRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Trip {
    pub fn is_full(&self) -> bool {
        self.participants >= self.max_participants
    }

    pub fn has_member(&self, user_id: &ObjectId) -> bool {
        self.members.iter().any(|member| &member.id == user_id)
    }

    /// Case-insensitive substring match on title or destination.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.title.to_lowercase().contains(&term)
            || self.destination.to_lowercase().contains(&term)
    }

    pub fn add_member(&mut self, member: MemberRef) {
        self.members.push(member);
        self.participants += 1;
    }
}

/// Body of `POST /api/trips`. Organizer comes from the token, not from here.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTripRequest {
    pub title: String,
    pub destination: String,
    pub image: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub price: Option<f64>,
    pub max_participants: Option<i32>,
    pub description: String,
    pub itinerary: Vec<String>,
    pub food: String,
    pub accommodation: String,
    pub transportation: String,
}

/// Parses the date formats the trip form sends.
pub fn parse_trip_date(raw: &str) -> Option<DateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(DateTime::from_millis(dt.with_timezone(&Utc).timestamp_millis()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_millis(naive.and_utc().timestamp_millis()))
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MemberResponse {
    pub id: String,
    pub name: String,
}

impl From<MemberRef> for MemberResponse {
    fn from(member: MemberRef) -> Self {
        MemberResponse {
            id: member.id.to_hex(),
            name: member.name,
        }
    }
}

/// Response de trip
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub destination: String,
    pub image: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub price: f64,
    pub participants: i32,
    pub max_participants: i32,
    pub description: String,
    pub itinerary: Vec<String>,
    pub food: String,
    pub accommodation: String,
    pub transportation: String,
    pub organizer: MemberResponse,
    pub members: Vec<MemberResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn rfc3339(dt: DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        TripResponse {
            id: trip.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: trip.title,
            destination: trip.destination,
            image: trip.image,
            start_date: rfc3339(trip.start_date),
            end_date: rfc3339(trip.end_date),
            duration: trip.duration,
            price: trip.price,
            participants: trip.participants,
            max_participants: trip.max_participants,
            description: trip.description,
            itinerary: trip.itinerary,
            food: trip.food,
            accommodation: trip.accommodation,
            transportation: trip.transportation,
            organizer: trip.organizer.into(),
            members: trip.members.into_iter().map(MemberResponse::from).collect(),
            created_at: trip.created_at.map(rfc3339),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::trip;
    use super::*;

    fn organizer() -> MemberRef {
        MemberRef {
            id: ObjectId::new(),
            name: "Ravi".into(),
        }
    }

    #[test]
    fn full_when_participants_reach_capacity() {
        let mut t = trip(&organizer(), 2);
        assert!(!t.is_full());
        t.add_member(MemberRef { id: ObjectId::new(), name: "Mia".into() });
        assert_eq!(t.participants, 2);
        assert!(t.is_full());
    }

    #[test]
    fn organizer_counts_as_member() {
        let org = organizer();
        let t = trip(&org, 5);
        assert!(t.has_member(&org.id));
        assert!(!t.has_member(&ObjectId::new()));
    }

    #[test]
    fn search_matches_title_or_destination_ignoring_case() {
        let t = trip(&organizer(), 5);
        assert!(t.matches_search("beach"));
        assert!(t.matches_search("INDIA"));
        assert!(t.matches_search("  "));
        assert!(!t.matches_search("paris"));
    }

    #[test]
    fn parses_form_dates() {
        let day = parse_trip_date("2024-06-01").unwrap();
        assert_eq!(day.timestamp_millis(), 1_717_200_000_000);

        let ts = parse_trip_date("2024-06-01T05:30:00+05:30").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_717_200_000_000);

        assert!(parse_trip_date("next friday").is_none());
        assert!(parse_trip_date("").is_none());
    }

    #[test]
    fn response_renders_ids_and_dates_as_strings() {
        let org = organizer();
        let mut t = trip(&org, 5);
        t.id = Some(ObjectId::new());
        let json = serde_json::to_value(TripResponse::from(t.clone())).unwrap();
        assert_eq!(json["_id"], t.id.unwrap().to_hex());
        assert_eq!(json["organizer"]["id"], org.id.to_hex());
        assert_eq!(json["members"][0]["name"], "Ravi");
        assert_eq!(json["maxParticipants"], 5);
        assert!(json["startDate"].as_str().unwrap().starts_with("2024-06-01T00:00:00"));
    }
}
