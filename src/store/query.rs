// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Read-side helpers: statistics and text export

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;

use chrono::Local;
use serde::Serialize;

use crate::network::{LogKind, LogRecord, RecordId, RECORD_SEPARATOR};

/// Aggregate view over the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Number of records held
    pub total: usize,
    /// Records with a 2xx status
    pub success: usize,
    /// Everything else
    pub failed: usize,
    /// Sum of captured response body sizes
    pub total_bytes: usize,
    /// Record count per kind
    pub by_kind: HashMap<LogKind, usize>,
}

impl Statistics {
    /// Compute statistics over a set of records
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a LogRecord>) -> Self {
        let mut stats = Statistics::default();
        for record in records {
            stats.total += 1;
            if record.is_success() {
                stats.success += 1;
            }
            stats.total_bytes += record.response_size();
            *stats.by_kind.entry(record.kind()).or_insert(0) += 1;
        }
        stats.failed = stats.total - stats.success;
        stats
    }

    /// Count for one kind
    pub fn count_of(&self, kind: LogKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Success ratio in percent
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success as f64 / self.total as f64 * 100.0
        }
    }
}

/// Render records as a text export
///
/// `records` is newest first (store order); the export lists the selected
/// records oldest first after a short header.
pub(crate) fn export_text(records: &VecDeque<LogRecord>, ids: Option<&[RecordId]>) -> String {
    let selected: Vec<&LogRecord> = records
        .iter()
        .rev()
        .filter(|r| ids.map_or(true, |ids| ids.contains(&r.id())))
        .collect();

    let mut text = String::new();
    let _ = writeln!(
        text,
        "Network Log Export - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(text, "Total Records: {}", selected.len());
    text.push_str(RECORD_SEPARATOR);
    text.push_str("\n\n");

    for record in selected {
        text.push_str(&record.to_log_text());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::HttpMethod;
    use bytes::Bytes;

    fn record(kind: LogKind, status: Option<u16>, body: &str) -> LogRecord {
        let mut record = LogRecord::new(kind, "https://a.test/x", Some(HttpMethod::Get));
        record.status_code = status;
        if !body.is_empty() {
            record.response_body = Some(Bytes::from(body.to_string()));
        }
        record
    }

    #[test]
    fn test_statistics() {
        let records = vec![
            record(LogKind::Https, Some(200), "12345"),
            record(LogKind::Https, Some(500), "123"),
            record(LogKind::SocketEvent, Some(101), ""),
            record(LogKind::Http, None, ""),
        ];

        let stats = Statistics::from_records(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.total_bytes, 8);
        assert_eq!(stats.count_of(LogKind::Https), 2);
        assert_eq!(stats.count_of(LogKind::Udp), 0);
        assert_eq!(stats.success_rate(), 25.0);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = Statistics::from_records(&Vec::<LogRecord>::new());
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_export_oldest_first() {
        let older = record(LogKind::Http, Some(200), "first");
        let newer = record(LogKind::Http, Some(200), "second");
        let records: VecDeque<_> = vec![newer.clone(), older.clone()].into();

        let text = export_text(&records, None);
        assert!(text.starts_with("Network Log Export - "));
        assert!(text.contains("Total Records: 2\n"));
        let first = text.find(&older.id().to_string()).unwrap();
        let second = text.find(&newer.id().to_string()).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_export_selected_ids() {
        let a = record(LogKind::Http, Some(200), "");
        let b = record(LogKind::Http, Some(200), "");
        let records: VecDeque<_> = vec![b.clone(), a.clone()].into();

        let text = export_text(&records, Some(&[a.id()][..]));
        assert!(text.contains("Total Records: 1\n"));
        assert!(text.contains(&a.id().to_string()));
        assert!(!text.contains(&b.id().to_string()));
    }
}
