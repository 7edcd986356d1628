pub fn readiness_event_key(trip_id: &str, user_id: &str) -> String {
    format!("readiness:{}:{}", trip_id, user_id)
}
