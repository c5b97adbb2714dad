use serde::Deserialize;
use sqlx::types::Decimal;

/// Request body for recording an asset. `type` is free-form.
#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    #[serde(rename = "type")]
    pub asset_type: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_numeric_amounts() {
        let req: CreateAssetRequest =
            serde_json::from_str(r#"{"type":"stocks","amount":1500.50}"#).unwrap();
        assert_eq!(req.asset_type, "stocks");
        assert_eq!(req.amount, "1500.50".parse::<Decimal>().unwrap());
        assert!(req.description.is_none());
    }

    #[test]
    fn request_accepts_string_amounts_and_description() {
        let req: CreateAssetRequest = serde_json::from_str(
            r#"{"type":"savings","amount":"250000","description":"emergency fund"}"#,
        )
        .unwrap();
        assert_eq!(req.amount, "250000".parse::<Decimal>().unwrap());
        assert_eq!(req.description.as_deref(), Some("emergency fund"));
    }

    #[test]
    fn request_requires_the_type_field() {
        assert!(serde_json::from_str::<CreateAssetRequest>(r#"{"amount":1}"#).is_err());
    }
}
