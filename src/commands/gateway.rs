use crate::commands::fixtures::{submitted_update, ANONYMOUS_REPORTER};
use crate::models::report::{Priority, Report, ReportDetail, ReportStatus};
use crate::models::session::{AuthMethod, Session};
use crate::models::submission::NewReport;
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::Mutex;
use std::time::Duration;

pub const MOCK_LOCATION: &str = "Current Location - Main Street, Downtown";
pub const JUST_NOW: &str = "Just now";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Report store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Report store lock poisoned")]
    Lock,

    #[error("Report not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait CivicGateway: Send + Sync {
    async fn fetch_reports(&self, owned_by_viewer: bool) -> Result<Vec<Report>, GatewayError>;

    async fn fetch_detail(&self, id: &str) -> Result<ReportDetail, GatewayError>;

    async fn detect_location(&self) -> Result<String, GatewayError>;

    async fn submit_report(&self, report: NewReport) -> Result<Report, GatewayError>;

    async fn send_otp(&self, phone: &str) -> Result<(), GatewayError>;

    async fn verify_otp(&self, phone: &str, otp: &str) -> Result<Session, GatewayError>;

    async fn digilocker_login(&self) -> Result<Session, GatewayError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayDelays {
    pub network: Duration,
    pub location: Duration,
    pub digilocker: Duration,
}

impl GatewayDelays {
    pub const ZERO: GatewayDelays = GatewayDelays {
        network: Duration::ZERO,
        location: Duration::ZERO,
        digilocker: Duration::ZERO,
    };
}

impl Default for GatewayDelays {
    fn default() -> Self {
        Self {
            network: Duration::from_millis(2000),
            location: Duration::from_millis(2000),
            digilocker: Duration::from_millis(3000),
        }
    }
}

pub struct MockGateway {
    store: Mutex<Connection>,
    delays: GatewayDelays,
}

impl MockGateway {
    pub fn new(delays: GatewayDelays) -> Result<Self, GatewayError> {
        let conn = crate::commands::db::open_report_store()?;
        Ok(Self {
            store: Mutex::new(conn),
            delays,
        })
    }

    fn with_store<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, GatewayError> {
        let conn = self.store.lock().map_err(|_| GatewayError::Lock)?;
        Ok(f(&conn)?)
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl CivicGateway for MockGateway {
    async fn fetch_reports(&self, owned_by_viewer: bool) -> Result<Vec<Report>, GatewayError> {
        self.with_store(|conn| crate::commands::db::load_reports(conn, owned_by_viewer))
    }

    async fn fetch_detail(&self, id: &str) -> Result<ReportDetail, GatewayError> {
        self.with_store(|conn| crate::commands::db::load_report_detail(conn, id))?
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn detect_location(&self) -> Result<String, GatewayError> {
        simulate_latency(self.delays.location).await;
        Ok(MOCK_LOCATION.to_string())
    }

    async fn submit_report(&self, new_report: NewReport) -> Result<Report, GatewayError> {
        simulate_latency(self.delays.network).await;

        let images: Vec<String> = new_report
            .images
            .iter()
            .map(|image| image.file_name.clone())
            .collect();

        let report = Report {
            id: format!("report-{}", uuid::Uuid::new_v4()),
            title: new_report.title,
            description: new_report.description,
            status: ReportStatus::Pending,
            location: new_report.location,
            date: JUST_NOW.to_string(),
            upvotes: 0,
            downvotes: 0,
            category: new_report.category,
            image_url: images.first().cloned(),
            user_vote: None,
        };

        let detail = ReportDetail {
            report: report.clone(),
            reported_by: ANONYMOUS_REPORTER.to_string(),
            priority: Priority::Medium,
            estimated_resolution: None,
            images,
            updates: vec![submitted_update(JUST_NOW)],
        };

        self.with_store(|conn| crate::commands::db::insert_report(conn, &detail, true))?;
        log::info!("report {} submitted ({})", report.id, report.category);
        Ok(report)
    }

    async fn send_otp(&self, phone: &str) -> Result<(), GatewayError> {
        simulate_latency(self.delays.network).await;
        log::debug!("OTP sent to number ending {}", last_digits(phone));
        Ok(())
    }

    async fn verify_otp(&self, phone: &str, _otp: &str) -> Result<Session, GatewayError> {
        simulate_latency(self.delays.network).await;
        Ok(Session {
            method: AuthMethod::Phone,
            phone: Some(phone.to_string()),
            signed_in_at: chrono::Utc::now().timestamp(),
        })
    }

    async fn digilocker_login(&self) -> Result<Session, GatewayError> {
        simulate_latency(self.delays.digilocker).await;
        Ok(Session {
            method: AuthMethod::Digilocker,
            phone: None,
            signed_in_at: chrono::Utc::now().timestamp(),
        })
    }
}

fn last_digits(phone: &str) -> &str {
    let start = phone.len().saturating_sub(4);
    phone.get(start..).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::Category;

    fn gateway() -> MockGateway {
        MockGateway::new(GatewayDelays::ZERO).expect("mock gateway")
    }

    #[tokio::test]
    async fn submitted_report_lands_in_viewer_reports() {
        let gateway = gateway();
        let report = gateway
            .submit_report(NewReport {
                title: "Fallen tree".to_string(),
                description: "Tree blocking the footpath".to_string(),
                category: Category::ParksAndRecreation,
                location: MOCK_LOCATION.to_string(),
                images: Vec::new(),
            })
            .await
            .expect("submit");

        assert!(report.id.starts_with("report-"));
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!((report.upvotes, report.downvotes, report.user_vote), (0, 0, None));

        let mine = gateway.fetch_reports(true).await.expect("mine");
        assert_eq!(mine.last().map(|r| r.id.as_str()), Some(report.id.as_str()));

        let detail = gateway.fetch_detail(&report.id).await.expect("detail");
        assert_eq!(detail.updates, vec![submitted_update(JUST_NOW)]);
    }

    #[tokio::test]
    async fn unknown_detail_is_not_found() {
        let err = gateway().fetch_detail("nope").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn location_and_sign_in_stand_ins() {
        let gateway = gateway();
        assert_eq!(gateway.detect_location().await.unwrap(), MOCK_LOCATION);

        let session = gateway.verify_otp("9876543210", "1234").await.unwrap();
        assert_eq!(session.method, AuthMethod::Phone);
        assert_eq!(session.phone.as_deref(), Some("9876543210"));

        let session = gateway.digilocker_login().await.unwrap();
        assert_eq!(session.method, AuthMethod::Digilocker);
    }

    #[test]
    fn masks_all_but_last_digits() {
        assert_eq!(last_digits("9876543210"), "3210");
        assert_eq!(last_digits("12"), "12");
    }
}
