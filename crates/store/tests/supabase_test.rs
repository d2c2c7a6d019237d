use std::{collections::HashMap, net::TcpListener, sync::Arc};

use axum::{
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	routing::get,
	Json, Router,
};
use chrono::NaiveDate;
use gl_ledger::{Advisory, Transaction, TransactionKind};
use gl_store::{StoreConfig, StoreError, SupabaseStore, TransactionStore};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing_test::traced_test;

const ANON_KEY: &str = "anon-key";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum InsertReply {
	#[default]
	Echo,
	/// 201 with an empty representation, as a restrictive select policy produces.
	Empty,
	Forbidden,
}

/// Just enough of PostgREST for one table.
#[derive(Debug, Default)]
struct Postgrest {
	rows: Mutex<Vec<Value>>,
	posted: Mutex<Vec<Value>>,
	insert_reply: InsertReply,
}

type Reply = (StatusCode, Json<Value>);

fn authorized(headers: &HeaderMap) -> bool {
	let bearer = format!("Bearer {ANON_KEY}");

	headers.get("apikey").is_some_and(|key| key == ANON_KEY)
		&& headers
			.get("authorization")
			.is_some_and(|value| value == bearer.as_str())
}

fn unauthorized() -> Reply {
	(
		StatusCode::UNAUTHORIZED,
		Json(json!({"message": "Invalid API key", "hint": "Double check your Supabase `anon` key"})),
	)
}

async fn select(
	State(postgrest): State<Arc<Postgrest>>,
	headers: HeaderMap,
	Query(query): Query<HashMap<String, String>>,
) -> Reply {
	if !authorized(&headers) {
		return unauthorized();
	}
	assert_eq!(query.get("order").map(String::as_str), Some("timestamp.desc"));

	let mut rows = postgrest.rows.lock().await.clone();
	rows.sort_by_key(|row| std::cmp::Reverse(row["timestamp"].as_i64()));

	(StatusCode::OK, Json(Value::Array(rows)))
}

async fn insert(
	State(postgrest): State<Arc<Postgrest>>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Reply {
	if !authorized(&headers) {
		return unauthorized();
	}
	postgrest.posted.lock().await.push(body.clone());

	match postgrest.insert_reply {
		InsertReply::Echo => {
			let rows = body.as_array().cloned().unwrap_or_default();
			postgrest.rows.lock().await.extend(rows.iter().cloned());
			(StatusCode::CREATED, Json(Value::Array(rows)))
		}
		InsertReply::Empty => (StatusCode::CREATED, Json(json!([]))),
		InsertReply::Forbidden => (
			StatusCode::FORBIDDEN,
			Json(json!({
				"code": "42501",
				"message": "new row violates row-level security policy for table \"transactions\"",
				"details": null,
				"hint": null
			})),
		),
	}
}

async fn delete(
	State(postgrest): State<Arc<Postgrest>>,
	headers: HeaderMap,
	Query(query): Query<HashMap<String, String>>,
) -> Reply {
	if !authorized(&headers) {
		return unauthorized();
	}
	let id = query
		.get("id")
		.and_then(|filter| filter.strip_prefix("eq."))
		.unwrap_or_default()
		.to_string();

	let mut rows = postgrest.rows.lock().await;
	let (removed, kept) = rows.drain(..).partition::<Vec<_>, _>(|row| row["id"] == id.as_str());
	*rows = kept;

	(StatusCode::OK, Json(Value::Array(removed)))
}

fn store_at(addr: std::net::SocketAddr, anon_key: &str) -> SupabaseStore {
	SupabaseStore::new(StoreConfig::new(format!("http://{addr}"), anon_key)).unwrap()
}

async fn serve(postgrest: Postgrest) -> (Arc<Postgrest>, std::net::SocketAddr) {
	let postgrest = Arc::new(postgrest);
	let app = Router::new()
		.route("/rest/v1/transactions", get(select).post(insert).delete(delete))
		.with_state(Arc::clone(&postgrest));

	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr = listener.local_addr().unwrap();

	tokio::spawn(async move {
		axum::Server::from_tcp(listener)
			.unwrap()
			.serve(app.into_make_service())
			.await
			.unwrap();
	});

	(postgrest, addr)
}

fn row(id: &str, item: &str, kind: &str, timestamp: i64) -> Value {
	json!({
		"id": id,
		"type": kind,
		"date": "2024-06-01",
		"item": item,
		"person": "Ida",
		"remarks": null,
		"photo": null,
		"timestamp": timestamp
	})
}

fn lend(id: &str, item: &str, timestamp: i64) -> Transaction {
	Transaction {
		id: id.into(),
		kind: TransactionKind::Loan,
		date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
		item: item.to_string(),
		person: "Ida".to_string(),
		remarks: Some("mit Akku".to_string()),
		photo: None,
		timestamp,
		advisory: Some(Advisory {
			category: Some("Audio".to_string()),
			..Default::default()
		}),
	}
}

#[tokio::test]
#[traced_test]
async fn fetch_all_decodes_rows_newest_first() {
	let (_, addr) = serve(Postgrest {
		rows: Mutex::new(vec![
			row("a", "Zoom H6", "Ausleihe", 100),
			row("b", "Zoom H6", "Rückgabe", 200),
		]),
		..Default::default()
	})
	.await;

	let transactions = store_at(addr, ANON_KEY).fetch_all().await.unwrap();

	assert_eq!(transactions.len(), 2);
	assert_eq!(transactions[0].id.as_str(), "b");
	assert_eq!(transactions[0].kind, TransactionKind::Return);
	assert_eq!(transactions[1].kind, TransactionKind::Loan);
}

#[tokio::test]
async fn wrong_key_surfaces_the_postgrest_reason() {
	let (_, addr) = serve(Postgrest::default()).await;

	let error = store_at(addr, "stale-key").fetch_all().await.unwrap_err();

	assert!(matches!(error, StoreError::Status { status: 401, .. }));
	assert_eq!(
		error.reason(),
		"Invalid API key - Double check your Supabase `anon` key"
	);
}

#[tokio::test]
#[traced_test]
async fn insert_posts_table_columns_and_accepts_the_echo() {
	let (postgrest, addr) = serve(Postgrest::default()).await;

	store_at(addr, ANON_KEY)
		.insert(&lend("a", "Rode NTG", 100))
		.await
		.unwrap();

	let posted = postgrest.posted.lock().await;
	let mut columns = posted[0][0]
		.as_object()
		.unwrap()
		.keys()
		.cloned()
		.collect::<Vec<_>>();
	columns.sort();

	assert_eq!(
		columns,
		["date", "id", "item", "person", "photo", "remarks", "timestamp", "type"]
	);
	assert_eq!(posted[0][0]["remarks"], "mit Akku");
	assert_eq!(postgrest.rows.lock().await.len(), 1);
}

#[tokio::test]
#[traced_test]
async fn insert_without_echo_is_not_written() {
	let (_, addr) = serve(Postgrest {
		insert_reply: InsertReply::Empty,
		..Default::default()
	})
	.await;

	let error = store_at(addr, ANON_KEY)
		.insert(&lend("a", "Rode NTG", 100))
		.await
		.unwrap_err();

	assert!(matches!(error, StoreError::NotWritten(id) if id.as_str() == "a"));
}

#[tokio::test]
async fn rejected_insert_carries_the_policy_message() {
	let (_, addr) = serve(Postgrest {
		insert_reply: InsertReply::Forbidden,
		..Default::default()
	})
	.await;

	let error = store_at(addr, ANON_KEY)
		.insert(&lend("a", "Rode NTG", 100))
		.await
		.unwrap_err();

	assert!(matches!(error, StoreError::Status { status: 403, .. }));
	assert_eq!(
		error.reason(),
		"new row violates row-level security policy for table \"transactions\""
	);
}

#[tokio::test]
#[traced_test]
async fn delete_by_id_reports_missing_rows() {
	let (postgrest, addr) = serve(Postgrest {
		rows: Mutex::new(vec![row("a", "Zoom H6", "Ausleihe", 100)]),
		..Default::default()
	})
	.await;
	let store = store_at(addr, ANON_KEY);

	store.delete_by_id(&"a".into()).await.unwrap();
	assert!(postgrest.rows.lock().await.is_empty());

	assert!(matches!(
		store.delete_by_id(&"a".into()).await,
		Err(StoreError::NotFound(_))
	));
}
