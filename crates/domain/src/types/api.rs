//! Remote API data transfer objects
//!
//! Request and response bodies of the catalog, recommendation, feedback,
//! session statistics, social and calendar endpoints. Unknown fields are
//! ignored and optional fields default, so additive server changes do not
//! break decoding.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/* Catalog */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmotionalGoal {
    Unwind,
    Recharge,
    LockingIn,
    Challenge,
    AdventureTime,
    ProgressOriented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interruptibility {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    Morning,
    Midday,
    Afternoon,
    Evening,
    LateNight,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocialPreference {
    Solo,
    Coop,
    Competitive,
    Both,
}

/// A catalog game (`GET /games`, `GET /games/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub min_minutes: u32,
    pub max_minutes: u32,
    #[serde(default)]
    pub emotional_goals: Vec<EmotionalGoal>,
    pub interruptibility: Interruptibility,
    pub energy_required: EnergyLevel,
    #[serde(default)]
    pub best_time_of_day: Vec<TimeOfDay>,
    #[serde(default)]
    pub social_preferences: Vec<SocialPreference>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default)]
    pub user_rating: Option<f64>,
    #[serde(default)]
    pub average_satisfaction: Option<f64>,
    #[serde(default)]
    pub session_count: Option<u32>,
}

/* -------------------------------------------------------------------------- */
/* Recommendations & Feedback */
/* -------------------------------------------------------------------------- */

/// Body of `POST /recommendations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub available_minutes: u32,
    pub desired_emotional_goals: Vec<EmotionalGoal>,
    pub current_energy_level: EnergyLevel,
    pub required_interruptibility: Interruptibility,
    pub social_preference: SocialPreference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub top_recommendation: Game,
    #[serde(default)]
    pub alternatives: Vec<Game>,
    pub reason: String,
    #[serde(default)]
    pub alternative_reasons: Vec<String>,
    #[serde(default)]
    pub top_match_percentage: Option<f64>,
    #[serde(default)]
    pub alternative_match_percentages: Vec<f64>,
    /// Session created for this recommendation; feedback refers to it
    #[serde(default)]
    pub session_id: Option<i64>,
}

/// Body of `POST /sessions/feedback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFeedback {
    pub session_id: i64,
    /// 1 to 5
    pub satisfaction_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/* -------------------------------------------------------------------------- */
/* Session Statistics */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRatingSummary {
    pub game_id: i64,
    pub game_name: String,
    pub average_rating: f64,
    pub session_count: u32,
}

/// `GET /api/users/{uid}/satisfaction-stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SatisfactionStats {
    pub total_sessions: u32,
    pub completed_sessions: u32,
    pub skipped_sessions: u32,
    pub average_rating: f64,
    pub total_playtime_minutes: u32,
    pub ratings_by_game: BTreeMap<i64, f64>,
    pub ratings_by_genre: BTreeMap<String, f64>,
    pub emotional_tag_counts: BTreeMap<String, u32>,
    pub top_emotional_tags: Vec<String>,
    pub session_length_distribution: BTreeMap<String, u32>,
    pub preferred_session_length: Option<String>,
    pub ratings_by_time_of_day: BTreeMap<String, f64>,
    pub best_time_of_day: Option<String>,
    pub sessions_by_day_of_week: BTreeMap<String, u32>,
    pub top_rated_games: Vec<GameRatingSummary>,
}

/// `GET /api/users/{uid}/summary/weekly`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklySummary {
    pub sessions_this_week: u32,
    pub sessions_with_feedback: u32,
    pub average_satisfaction: f64,
    pub total_playtime_minutes: u32,
    pub most_played_game: Option<String>,
    pub most_played_game_id: Option<i64>,
    pub most_played_count: u32,
    pub mood_distribution: BTreeMap<String, u32>,
    pub week_start: Option<NaiveDateTime>,
    pub week_end: Option<NaiveDateTime>,
}

/* -------------------------------------------------------------------------- */
/* Social Graph */
/* -------------------------------------------------------------------------- */

/// Public profile of another user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub auth_provider: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Declined,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: i64,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
    pub status: FriendshipStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Acknowledgement returned by most social and calendar mutations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionResponse {
    pub message: Option<String>,
    /// Present when a friend request was created or accepted
    pub request: Option<FriendRequest>,
    /// Participant status after responding to an invitation
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResult {
    pub user: UserSummary,
    #[serde(default)]
    pub friendship_status: Option<FriendshipStatus>,
    #[serde(default)]
    pub friendship_id: Option<i64>,
    #[serde(default)]
    pub is_requester: Option<bool>,
}

/* -------------------------------------------------------------------------- */
/* Calendar */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Task,
    Game,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipant {
    pub id: i64,
    pub user: UserSummary,
    pub status: String,
    #[serde(default)]
    pub joined_at: Option<NaiveDateTime>,
}

/// A calendar event as returned by `/calendar/events`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub game_id: Option<i64>,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<UserSummary>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub participants: Vec<EventParticipant>,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub has_joined: bool,
    #[serde(default)]
    pub can_join: bool,
}

/// Body of `POST /calendar/events` and `PUT /calendar/events/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
}

/// Optional filters of the event listing endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub friends_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInvitation {
    pub invitation_id: i64,
    pub event: CalendarEvent,
    #[serde(default)]
    pub invited_by: Option<UserSummary>,
    #[serde(default)]
    pub invited_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_request_omits_absent_optionals() {
        let request = RecommendationRequest {
            available_minutes: 45,
            desired_emotional_goals: vec![EmotionalGoal::Unwind, EmotionalGoal::LockingIn],
            current_energy_level: EnergyLevel::Low,
            required_interruptibility: Interruptibility::High,
            social_preference: SocialPreference::Solo,
            time_of_day: None,
            preferred_genres: None,
            user_id: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["desiredEmotionalGoals"], serde_json::json!(["UNWIND", "LOCKING_IN"]));
        assert_eq!(json["currentEnergyLevel"], "LOW");
        assert!(json.get("timeOfDay").is_none());
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn calendar_event_reads_type_field() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id": 4, "title": "Raid night", "startTime": "2024-06-01T20:00:00",
                "endTime": "2024-06-01T22:00:00", "type": "GAME", "gameId": 7,
                "participantCount": 2, "canJoin": true}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, EventType::Game);
        assert_eq!(event.game_id, Some(7));
        assert!(event.participants.is_empty());
        assert!(event.can_join);
    }

    #[test]
    fn satisfaction_stats_accepts_sparse_payload() {
        let stats: SatisfactionStats =
            serde_json::from_str(r#"{"totalSessions": 12, "ratingsByGame": {"3": 4.5}}"#).unwrap();
        assert_eq!(stats.total_sessions, 12);
        assert_eq!(stats.ratings_by_game.get(&3), Some(&4.5));
        assert!(stats.top_rated_games.is_empty());
    }
}
