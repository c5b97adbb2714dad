use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for joining the waitlist.
#[derive(Debug, Deserialize)]
pub struct JoinWaitlistRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub id: Uuid,
    pub email: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_id_email_and_message() {
        let resp = WaitlistResponse {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            message: "Successfully joined the waitlist!".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["message"], "Successfully joined the waitlist!");
        assert!(json["id"].is_string());
    }
}
