//! Payload → renderer shapes
//!
//! Pure functions only. Each is total over well-formed payloads and yields the
//! same output, in the same order, for the same input.

use crate::snapshot::CycleData;
use crate::types::{DateRangeAggregate, EventTypeCount, Summary};
use serde::{Deserialize, Serialize};

/// One slice of the proportional (pie) chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: u64,
}

/// One bar of the categorical (bar) chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarPoint {
    pub name: String,
    pub count: u64,
}

/// Headline number shown above the charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: u64,
}

/// Pie series in source order
pub fn pie_series(event_types: &[EventTypeCount]) -> Vec<PieSlice> {
    event_types
        .iter()
        .map(|item| PieSlice {
            name: item.event_type.clone(),
            value: item.count,
        })
        .collect()
}

/// Bar series in source order
pub fn bar_series(event_types: &[EventTypeCount]) -> Vec<BarPoint> {
    event_types
        .iter()
        .map(|item| BarPoint {
            name: item.event_type.clone(),
            count: item.count,
        })
        .collect()
}

/// Breakdown table rows, ordered by event type name
pub fn breakdown_rows(aggregate: &DateRangeAggregate) -> Vec<EventTypeCount> {
    aggregate
        .event_breakdown
        .iter()
        .map(|(event_type, count)| EventTypeCount {
            event_type: event_type.clone(),
            count: *count,
        })
        .collect()
}

/// Headline cards. "Events in Range" is only present when range data is.
pub fn stat_cards(summary: &Summary, range: Option<&DateRangeAggregate>) -> Vec<StatCard> {
    let mut cards = vec![
        StatCard {
            label: "Total Users".to_string(),
            value: summary.total_users,
        },
        StatCard {
            label: "Active Users (24h)".to_string(),
            value: summary.active_users_24h,
        },
        StatCard {
            label: "Total Events".to_string(),
            value: summary.total_events,
        },
    ];
    if let Some(range) = range {
        cards.push(StatCard {
            label: "Events in Range".to_string(),
            value: range.total_events,
        });
    }
    cards
}

/// Everything a renderer needs for one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    pub cards: Vec<StatCard>,
    pub pie: Vec<PieSlice>,
    pub bar: Vec<BarPoint>,
    pub breakdown: Vec<EventTypeCount>,
    pub unique_users_in_range: u64,
    /// No event types have been observed yet
    pub is_empty: bool,
}

impl DashboardData {
    pub fn from_cycle(data: &CycleData) -> Self {
        Self {
            cards: stat_cards(&data.summary, Some(&data.date_range)),
            pie: pie_series(&data.event_types),
            bar: bar_series(&data.event_types),
            breakdown: breakdown_rows(&data.date_range),
            unique_users_in_range: data.date_range.unique_users,
            is_empty: data.event_types.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateRange, parse_date};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn event_types() -> Vec<EventTypeCount> {
        vec![
            EventTypeCount {
                event_type: "view".to_string(),
                count: 40,
            },
            EventTypeCount {
                event_type: "click".to_string(),
                count: 30,
            },
            EventTypeCount {
                event_type: "user_registered".to_string(),
                count: 2,
            },
        ]
    }

    fn range_aggregate() -> DateRangeAggregate {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("view".to_string(), 12);
        breakdown.insert("click".to_string(), 30);
        DateRangeAggregate {
            start_date: None,
            end_date: None,
            total_events: 42,
            unique_users: 5,
            event_breakdown: breakdown,
        }
    }

    #[test]
    fn test_series_preserve_source_order() {
        let input = event_types();
        let pie = pie_series(&input);
        let bar = bar_series(&input);

        let pie_names: Vec<_> = pie.iter().map(|s| s.name.as_str()).collect();
        let bar_names: Vec<_> = bar.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(pie_names, vec!["view", "click", "user_registered"]);
        assert_eq!(bar_names, pie_names);
        assert_eq!(pie[1].value, 30);
        assert_eq!(bar[1].count, 30);
    }

    #[test]
    fn test_series_are_idempotent() {
        let input = event_types();
        assert_eq!(pie_series(&input), pie_series(&input));
        assert_eq!(bar_series(&input), bar_series(&input));
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        assert!(pie_series(&[]).is_empty());
        assert!(bar_series(&[]).is_empty());
    }

    #[test]
    fn test_breakdown_rows_are_deterministic() {
        let rows = breakdown_rows(&range_aggregate());
        assert_eq!(
            rows,
            vec![
                EventTypeCount {
                    event_type: "click".to_string(),
                    count: 30
                },
                EventTypeCount {
                    event_type: "view".to_string(),
                    count: 12
                },
            ]
        );

        // Same entries inserted in the opposite order
        let json = r#"{"total_events": 42, "unique_users": 5,
                       "event_breakdown": {"view": 12, "click": 30}}"#;
        let reparsed: DateRangeAggregate = serde_json::from_str(json).unwrap();
        assert_eq!(breakdown_rows(&reparsed), rows);
    }

    #[test]
    fn test_stat_cards_with_and_without_range() {
        let summary = Summary {
            total_users: 10,
            active_users_24h: 4,
            total_events: 100,
            event_type_counts: BTreeMap::new(),
        };

        let cards = stat_cards(&summary, None);
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[1].label, "Active Users (24h)");
        assert_eq!(cards[1].value, 4);

        let cards = stat_cards(&summary, Some(&range_aggregate()));
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[3].label, "Events in Range");
        assert_eq!(cards[3].value, 42);
    }

    #[test]
    fn test_dashboard_data_from_cycle() {
        let cycle = CycleData {
            cycle_id: 1,
            fetched_at: Utc::now(),
            range: DateRange::new(
                parse_date("2024-01-01").unwrap(),
                parse_date("2024-01-07").unwrap(),
            ),
            summary: Summary {
                total_users: 5,
                active_users_24h: 2,
                total_events: 72,
                event_type_counts: BTreeMap::new(),
            },
            event_types: event_types(),
            date_range: range_aggregate(),
        };

        let data = DashboardData::from_cycle(&cycle);
        assert_eq!(data.unique_users_in_range, 5);
        assert_eq!(data.breakdown.len(), 2);
        assert_eq!(data.pie.len(), 3);
        assert!(!data.is_empty);
    }
}
