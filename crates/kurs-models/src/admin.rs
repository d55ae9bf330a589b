use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::courses::PopularCourse;
use crate::users::User;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    /// `admin` or `student`
    #[schema(example = "admin")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_users: i64,
    pub total_kurslar: i64,
    /// Top five courses by enrollment
    pub popular_kurslar: Vec<PopularCourse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsPayload {
    pub data: Analytics,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersPayload {
    pub users: Vec<User>,
}
