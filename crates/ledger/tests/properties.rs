use std::collections::HashSet;

use chrono::NaiveDate;
use gl_ledger::{outstanding, Transaction, TransactionId, TransactionKind};
use proptest::prelude::*;

const ITEMS: &[&str] = &["Drill", "drill", "Tripod", "FX6", "Lens 24mm"];

/// Logs with unique timestamps, so every shuffle preserves each item's chronology.
fn event_log() -> impl Strategy<Value = Vec<Transaction>> {
	prop::collection::vec((0..ITEMS.len(), any::<bool>()), 0..40).prop_map(|events| {
		events
			.into_iter()
			.enumerate()
			.map(|(n, (item, loan))| Transaction {
				id: TransactionId::from(format!("t{n}")),
				kind: if loan {
					TransactionKind::Loan
				} else {
					TransactionKind::Return
				},
				date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
				item: ITEMS[item].to_string(),
				person: "Louisa".to_string(),
				remarks: None,
				photo: None,
				timestamp: 1_000 + n as i64 * 10,
				advisory: None,
			})
			.collect()
	})
}

fn ids(transactions: &[Transaction]) -> HashSet<String> {
	transactions
		.iter()
		.map(|transaction| transaction.id.to_string())
		.collect()
}

proptest! {
	#[test]
	fn shuffling_does_not_change_the_result(
		(log, shuffled) in event_log().prop_flat_map(|log| {
			let shuffled = Just(log.clone()).prop_shuffle();
			(Just(log), shuffled)
		})
	) {
		prop_assert_eq!(ids(&outstanding(&log)), ids(&outstanding(&shuffled)));
	}

	#[test]
	fn reconciling_twice_is_identical(log in event_log()) {
		prop_assert_eq!(outstanding(&log), outstanding(&log));
	}

	#[test]
	fn every_item_appears_at_most_once(log in event_log()) {
		let result = outstanding(&log);
		let items = result.iter().map(|t| t.item.as_str()).collect::<HashSet<_>>();

		prop_assert_eq!(items.len(), result.len());
	}

	#[test]
	fn output_matches_each_items_latest_event(log in event_log()) {
		let result = outstanding(&log);

		for item in ITEMS {
			let latest = log
				.iter()
				.filter(|t| t.item == *item)
				.max_by_key(|t| t.timestamp);
			let reported = result.iter().find(|t| t.item == *item);

			match latest {
				Some(latest) if latest.kind == TransactionKind::Loan => {
					prop_assert_eq!(reported, Some(latest));
				}
				_ => prop_assert!(reported.is_none()),
			}
		}
	}

	#[test]
	fn loan_only_items_report_their_newest_loan(log in event_log()) {
		let loans_only = log
			.into_iter()
			.filter(|t| t.kind == TransactionKind::Loan)
			.collect::<Vec<_>>();
		let result = outstanding(&loans_only);

		let distinct = loans_only.iter().map(|t| t.item.as_str()).collect::<HashSet<_>>();
		prop_assert_eq!(result.len(), distinct.len());

		for reported in &result {
			let newest = loans_only
				.iter()
				.filter(|t| t.item == reported.item)
				.map(|t| t.timestamp)
				.max();
			prop_assert_eq!(Some(reported.timestamp), newest);
		}
	}
}
