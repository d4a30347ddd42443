use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_users: i64,
    pub total_rides: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}
