use crate::blog::manager::ResolvedEntry;
use chrono::{DateTime, SecondsFormat};

/// ISO-8601 UTC instant at second precision, e.g. `1970-01-01T00:01:40Z`.
pub fn format_publish_time(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => secs.to_string(),
    }
}

/// Every topic followed by a single space, in insertion order.
pub fn format_topics(topics: &[String]) -> String {
    let mut out = String::new();
    for topic in topics {
        out.push_str(topic);
        out.push(' ');
    }
    out
}

pub fn detail_rows(entry: &ResolvedEntry) -> Vec<(String, String)> {
    vec![
        ("Index".to_string(), entry.position.to_string()),
        (
            "Publish".to_string(),
            format_publish_time(entry.log.publish_time),
        ),
        ("Title".to_string(), entry.log.title.clone()),
        ("Topics".to_string(), format_topics(&entry.log.topics)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::index::Log;

    #[test]
    fn rows_for_single_topic_entry() {
        let entry = ResolvedEntry {
            position: 0,
            log: Log {
                title: "A".to_string(),
                topics: vec!["x".to_string()],
                publish_time: 100,
            },
            content: String::new(),
        };

        let rows = detail_rows(&entry);
        let want = [
            ("Index", "0"),
            ("Publish", "1970-01-01T00:01:40Z"),
            ("Title", "A"),
            ("Topics", "x "),
        ];
        assert_eq!(rows.len(), want.len());
        for ((k, v), (wk, wv)) in rows.iter().zip(want) {
            assert_eq!(k, wk);
            assert_eq!(v, wv);
        }
    }

    #[test]
    fn topics_keep_order_and_trailing_space() {
        let topics = vec!["rust".to_string(), "cli".to_string()];
        assert_eq!(format_topics(&topics), "rust cli ");
        assert_eq!(format_topics(&[]), "");
    }

    #[test]
    fn unrepresentable_timestamp_falls_back_to_raw_value() {
        assert_eq!(format_publish_time(i64::MAX), i64::MAX.to_string());
    }
}
