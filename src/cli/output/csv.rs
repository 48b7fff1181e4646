//! CSV rows are assembled by hand, matching the files the web console
//! produced: a team summary sheet with an optional fraud-alert section, and a
//! per-employee per-day detail sheet.

use crate::{
    api::models::{DailyReport, FraudAlert, UserInfo},
    report::score::productivity_score,
};

/// One merged row of the detailed export.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub user_name: String,
    pub user_email: String,
    pub date: String,
    pub active_hours: f64,
    pub idle_hours: f64,
    pub total_hours: f64,
    pub unique_apps: usize,
    pub top_app: String,
    pub activity_score: u8,
}

impl SummaryRecord {
    pub fn from_report(user: &UserInfo, date: String, report: &DailyReport) -> Self {
        let hours = |seconds: u64| (seconds as f64 / 3600. * 100.).round() / 100.;
        Self {
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            date,
            active_hours: hours(report.total_active_seconds),
            idle_hours: hours(report.total_idle_seconds),
            total_hours: hours(report.total_active_seconds + report.total_idle_seconds),
            unique_apps: report.apps.len(),
            top_app: top_app_name(report),
            activity_score: productivity_score(
                report.total_active_seconds,
                report.total_idle_seconds,
            ),
        }
    }
}

/// Name of the most active app in a report, "N/A" for an empty one.
pub fn top_app_name(report: &DailyReport) -> String {
    report
        .apps
        .iter()
        .max_by_key(|app| app.active_seconds)
        .map(|app| app.name.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Quotes a field only when it has to be quoted.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Team summary sheet: one row per employee, alert section appended when any
/// alerts exist.
pub fn team_summary_csv(
    employees: &[UserInfo],
    reports: impl Fn(&str) -> Option<DailyReport>,
    alerts: &[FraudAlert],
) -> String {
    let mut lines = vec![
        "Employee Name,Email,Status,Active Time (min),Idle Time (min),Productivity %,Apps Used,Top App"
            .to_string(),
    ];

    for employee in employees {
        let report = reports(&employee.id)
            .unwrap_or_else(|| DailyReport::empty(String::new(), employee.id.clone()));
        let active = report.total_active_seconds;
        let idle = report.total_idle_seconds;
        lines.push(
            [
                field(&employee.name),
                field(&employee.email),
                if active > 0 { "Active" } else { "Inactive" }.to_string(),
                (active as f64 / 60.).round().to_string(),
                (idle as f64 / 60.).round().to_string(),
                productivity_score(active, idle).to_string(),
                report.apps.len().to_string(),
                field(&top_app_name(&report)),
            ]
            .join(","),
        );
    }

    if !alerts.is_empty() {
        lines.push(String::new());
        lines.push("Fraud Alerts".to_string());
        lines.push("Email,Severity,Message".to_string());
        for alert in alerts {
            lines.push(
                [
                    field(&alert.user_email),
                    alert.severity.to_string(),
                    field(&alert.message),
                ]
                .join(","),
            );
        }
    }

    lines.join("\n")
}

/// Detail sheet: one row per (employee, day).
pub fn summary_records_csv(records: &[SummaryRecord]) -> String {
    let mut lines = vec![
        "Employee Name,Email,Date,Active Hours,Idle Hours,Total Hours,Unique Apps,Top App,Activity Score"
            .to_string(),
    ];
    for record in records {
        lines.push(
            [
                field(&record.user_name),
                field(&record.user_email),
                record.date.clone(),
                record.active_hours.to_string(),
                record.idle_hours.to_string(),
                record.total_hours.to_string(),
                record.unique_apps.to_string(),
                field(&record.top_app),
                record.activity_score.to_string(),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use crate::api::models::{AppUsage, DailyReport, FraudAlert, FraudSeverity, UserInfo};

    use super::{summary_records_csv, team_summary_csv, top_app_name, SummaryRecord};

    fn user(id: &str, name: &str) -> UserInfo {
        UserInfo {
            id: id.to_string(),
            email: format!("{id}@corp.test"),
            name: name.to_string(),
            role: "employee".to_string(),
            is_active: true,
            is_approved: true,
            created_at: None,
        }
    }

    fn report(active: u64, idle: u64, apps: &[(&str, u64)]) -> DailyReport {
        DailyReport {
            date: "2025-03-09".to_string(),
            total_hours: 0.,
            total_active_seconds: active,
            total_idle_seconds: idle,
            user_id: "u-1".to_string(),
            apps: apps
                .iter()
                .map(|(name, seconds)| AppUsage {
                    name: name.to_string(),
                    duration: String::new(),
                    duration_seconds: *seconds,
                    active_seconds: *seconds,
                    is_browser: false,
                    sub_activities: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_team_summary_rows() {
        let employees = [user("u-1", "Ada Lovelace"), user("u-2", "Grace Hopper")];
        let with_data = report(3600, 1800, &[("Chrome", 1200), ("Terminal", 2400)]);

        let csv = team_summary_csv(
            &employees,
            |id| (id == "u-1").then(|| with_data.clone()),
            &[],
        );

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "Ada Lovelace,u-1@corp.test,Active,60,30,67,2,Terminal"
        );
        // employee without a report renders as an inactive zero row
        assert_eq!(lines[2], "Grace Hopper,u-2@corp.test,Inactive,0,0,0,0,N/A");
    }

    #[test]
    fn test_alert_section_and_quoting() {
        let employees = [user("u-1", "Ada Lovelace")];
        let alerts = [FraudAlert {
            user_id: "u-1".to_string(),
            user_email: "u-1@corp.test".to_string(),
            date: "2025-03-09".to_string(),
            fraud_count: 2,
            severity: FraudSeverity::High,
            message: "Repeated clicks, \"bot-like\"".to_string(),
            fraud_types: vec![],
        }];

        let csv = team_summary_csv(&employees, |_| None, &alerts);
        assert!(csv.contains("\nFraud Alerts\n"));
        assert!(csv.ends_with("u-1@corp.test,HIGH,\"Repeated clicks, \"\"bot-like\"\"\""));
    }

    #[test]
    fn test_summary_records() {
        let record = SummaryRecord::from_report(
            &user("u-1", "Ada Lovelace"),
            "2025-03-09".to_string(),
            &report(7200, 1800, &[("Chrome", 7000)]),
        );
        assert_eq!(record.active_hours, 2.);
        assert_eq!(record.idle_hours, 0.5);
        assert_eq!(record.total_hours, 2.5);
        assert_eq!(record.activity_score, 80);

        let csv = summary_records_csv(&[record]);
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "Ada Lovelace,u-1@corp.test,2025-03-09,2,0.5,2.5,1,Chrome,80"
        );
    }

    #[test]
    fn test_top_app_of_empty_report() {
        assert_eq!(top_app_name(&report(0, 0, &[])), "N/A");
    }
}
