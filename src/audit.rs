use async_trait::async_trait;
use axum::http::HeaderMap;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
}

/// A notable event worth recording: who did what, where from.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub timestamp: OffsetDateTime,
    pub level: AuditLevel,
    pub message: String,
    pub user_id: Option<Uuid>,
    pub endpoint: Option<String>,
    pub source_ip: Option<String>,
}

impl AuditEvent {
    pub fn new(level: AuditLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            level,
            message: message.into(),
            user_id: None,
            endpoint: None,
            source_ip: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AuditLevel::Info, message)
    }

    pub fn user(mut self, id: Uuid) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn source_ip(mut self, ip: Option<String>) -> Self {
        self.source_ip = ip;
        self
    }
}

/// Sink for audit events. Injected into `AppState` so a durable backend
/// (an audit table, an external collector) can be substituted without
/// touching the handlers.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Default sink: structured log lines only. No durable audit table exists yet.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        let AuditEvent {
            timestamp,
            level,
            message,
            user_id,
            endpoint,
            source_ip,
        } = event;
        let ts = timestamp
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| timestamp.to_string());
        match level {
            AuditLevel::Info => {
                info!(audit = true, %ts, ?user_id, ?endpoint, ?source_ip, "{message}")
            }
            AuditLevel::Warning => {
                warn!(audit = true, %ts, ?user_id, ?endpoint, ?source_ip, "{message}")
            }
            AuditLevel::Error => {
                error!(audit = true, %ts, ?user_id, ?endpoint, ?source_ip, "{message}")
            }
        }
    }
}

/// Best-effort client address for audit records, taken from the proxy header.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditSink for RecordingSink {
        async fn record(&self, event: AuditEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn sink_receives_tagged_event() {
        let sink = RecordingSink {
            events: Mutex::new(Vec::new()),
        };
        let user_id = Uuid::new_v4();
        sink.record(
            AuditEvent::info("New user registered")
                .user(user_id)
                .endpoint("/api/auth/register")
                .source_ip(Some("10.0.0.1".into())),
        )
        .await;

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, Some(user_id));
        assert_eq!(events[0].endpoint.as_deref(), Some("/api/auth/register"));
        assert_eq!(events[0].source_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(events[0].level, AuditLevel::Info);
    }

    #[tokio::test]
    async fn tracing_sink_accepts_every_level() {
        // Smoke test: no panic formatting any level, subscriber or not.
        for level in [AuditLevel::Info, AuditLevel::Warning, AuditLevel::Error] {
            TracingAuditSink
                .record(AuditEvent::new(level, "event"))
                .await;
        }
    }

    #[test]
    fn client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_absent_without_header() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
