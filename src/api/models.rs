use serde::{Deserialize, Serialize};

/// One user's tracked activity for one calendar date, as computed by the server.
/// For client-side range aggregation the `date` field instead carries a
/// `"{start}..{end}"` label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: String,
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub total_active_seconds: u64,
    #[serde(default)]
    pub total_idle_seconds: u64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub apps: Vec<AppUsage>,
}

impl DailyReport {
    /// Empty report shell. Used as the accumulator seed for range aggregation.
    pub fn empty(date: String, user_id: String) -> Self {
        Self {
            date,
            total_hours: 0.,
            total_active_seconds: 0,
            total_idle_seconds: 0,
            user_id,
            apps: vec![],
        }
    }
}

/// One application's usage inside a report. `active_seconds` and
/// `duration_seconds` are separate accounting buckets reported by the server
/// and are not required to agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUsage {
    pub name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub active_seconds: u64,
    #[serde(default)]
    pub is_browser: bool,
    #[serde(default)]
    pub sub_activities: Vec<SubActivity>,
}

/// Finer-grained breakdown of an app, e.g. browser tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubActivity {
    pub name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginReply {
    pub access_token: String,
}

/// Generic `{success, message}` reply the admin endpoints answer with.
#[derive(Debug, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeeklySummary {
    pub user_id: String,
    #[serde(default)]
    pub period: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub daily_data: Vec<DailyData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyData {
    pub date: String,
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub active_hours: f64,
    #[serde(default)]
    pub total_logs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopApps {
    pub user_id: String,
    #[serde(default)]
    pub period_days: u32,
    #[serde(default)]
    pub apps: Vec<TopAppEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopAppEntry {
    pub app_name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub is_browser: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncStatus {
    #[serde(default)]
    pub total_logs: u64,
    #[serde(default)]
    pub today_logs: u64,
    pub last_sync: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum FraudSeverity {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
}

impl std::fmt::Display for FraudSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FraudSeverity::Critical => write!(f, "CRITICAL"),
            FraudSeverity::High => write!(f, "HIGH"),
            FraudSeverity::Medium => write!(f, "MEDIUM"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FraudAlert {
    pub user_id: String,
    pub user_email: String,
    pub date: String,
    #[serde(default)]
    pub fraud_count: u64,
    pub severity: FraudSeverity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub fraud_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FraudAlertReply {
    #[serde(default)]
    pub alerts: Vec<FraudAlert>,
    pub summary: FraudAlertSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FraudAlertSummary {
    #[serde(default)]
    pub total_alerts: u64,
    #[serde(default)]
    pub users_affected: u64,
    #[serde(default)]
    pub period_days: u32,
}

#[cfg(test)]
mod tests {
    use super::DailyReport;

    #[test]
    fn test_daily_report_deserialization() {
        let raw = r#"{
            "date": "2025-03-09",
            "total_hours": 6.5,
            "total_active_seconds": 18000,
            "total_idle_seconds": 5400,
            "user_id": "u-17",
            "apps": [
                {
                    "name": "Chrome",
                    "duration": "2h 10m",
                    "duration_seconds": 7800,
                    "active_seconds": 7100,
                    "is_browser": true,
                    "sub_activities": [
                        {"name": "github.com", "duration": "1h", "duration_seconds": 3600}
                    ]
                },
                {
                    "name": "Terminal",
                    "duration_seconds": 4000,
                    "active_seconds": 3900,
                    "is_browser": false
                }
            ]
        }"#;

        let report: DailyReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.total_active_seconds, 18000);
        assert_eq!(report.apps.len(), 2);
        assert_eq!(report.apps[0].sub_activities[0].name, "github.com");
        // missing sub_activities deserialize to an empty list
        assert!(report.apps[1].sub_activities.is_empty());
        assert_eq!(report.apps[1].duration, "");
    }

    #[test]
    fn test_fraud_severity() {
        let alert: super::FraudAlert = serde_json::from_str(
            r#"{
                "user_id": "u-1",
                "user_email": "a@b.c",
                "date": "2025-03-09",
                "fraud_count": 3,
                "severity": "HIGH",
                "message": "Excessive automation detected",
                "fraud_types": ["auto_clicker"]
            }"#,
        )
        .unwrap();
        assert_eq!(alert.severity, super::FraudSeverity::High);
        assert_eq!(alert.severity.to_string(), "HIGH");
    }
}
