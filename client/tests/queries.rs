#![allow(clippy::restriction)]

use std::sync::Arc;

use common::*;
use tipjar_client::prelude::*;
use tipjar_data_model::prelude::*;

mod common;

#[tokio::test]
async fn unreachable_ledger_degrades_to_empty_values() {
    let ledger = Arc::new(MockLedger::unreachable());
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    assert_eq!(client.total_donated(&alice()).await.to_string(), "0");
    assert!(client.tip_history(&alice()).await.is_empty());
    assert!(client.leaderboard(&alice()).await.is_empty());
    assert!(!client.account_exists(&alice()).await);
    assert_eq!(client.balance(&alice()).await, None);
    assert!(client
        .recent_payments(&alice(), DEFAULT_PAYMENT_LIMIT)
        .await
        .is_empty());
}

#[tokio::test]
async fn balance_comes_from_the_account() {
    let ledger = Arc::new(MockLedger::default());
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    let balance = client.balance(&alice()).await.unwrap();
    assert_eq!(balance.to_string(), "10000");
}

#[tokio::test(start_paused = true)]
async fn recent_payments_are_newest_first_and_limited() {
    let ledger = Arc::new(MockLedger::default().with_statuses([
        TransactionStatus::Success,
        TransactionStatus::Success,
    ]));
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);
    let cancel = CancellationToken::new();
    client.pay(&alice(), BOB, "1", None, &cancel).await.unwrap();
    client.pay(&alice(), BOB, "2", None, &cancel).await.unwrap();

    let payments = client.recent_payments(&alice(), 10).await;
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0].amount.to_string(), "2");
    assert_eq!(payments[0].direction, PaymentDirection::Sent);

    let bob: Address = BOB.parse().unwrap();
    let received = client.recent_payments(&bob, 1).await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].direction, PaymentDirection::Received);
    assert_eq!(received[0].amount.to_string(), "2");
}

#[tokio::test]
async fn tip_history_decodes_partial_records() {
    let history = Value::Vec(vec![
        Value::record([
            ("from", Value::Address(alice())),
            ("amount", Value::I128(15_000_000)),
            ("message", Value::from("great work")),
            ("timestamp", Value::U64(1_700_000_000)),
        ]),
        Value::record([
            ("from", Value::Address(BOB.parse().unwrap())),
            ("message", Value::from("no amount")),
        ]),
    ]);
    let ledger = Arc::new(MockLedger::default().with_simulation(success(history)));
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    let tips = client.tip_history(&alice()).await;

    assert_eq!(tips.len(), 2);
    assert_eq!(tips[0].amount.to_string(), "1.5");
    assert_eq!(tips[0].timestamp, Some(1_700_000_000));
    assert_eq!(tips[1].amount, Amount::ZERO);
    assert_eq!(tips[1].message, "no amount");

    let call = ledger.simulated()[0].tx.contract_call().cloned().unwrap();
    assert_eq!(call.method(), "tip_history");
    assert!(call.args().is_empty());
}

#[tokio::test]
async fn leaderboard_keeps_ledger_order() {
    let board = Value::Vec(vec![
        Value::Vec(vec![Value::Address(BOB.parse().unwrap()), Value::I128(10_000_000)]),
        Value::Vec(vec![Value::Address(alice()), Value::I128(50_000_000)]),
        Value::Vec(vec![Value::Address(alice())]),
    ]);
    let ledger = Arc::new(MockLedger::default().with_simulation(success(board)));
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    let leaders = client.leaderboard(&alice()).await;

    let totals: Vec<_> = leaders
        .iter()
        .map(|entry| entry.total_donated.to_string())
        .collect();
    assert_eq!(totals, ["1", "5"]);
    assert_eq!(leaders[0].address.as_str(), BOB);
}

#[tokio::test]
async fn total_donated_is_asked_for_the_user() {
    let ledger = Arc::new(
        MockLedger::default().with_simulation(success(Value::I128(123_456_789))),
    );
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    let total = client.total_donated(&alice()).await;

    assert_eq!(total.to_string(), "12.3456789");
    let simulated = ledger.simulated();
    let call = simulated[0].tx.contract_call().unwrap();
    assert_eq!(call.args(), &[Value::Address(alice())]);
    assert_eq!(call.contract().as_str(), CONTRACT);
    assert!(!simulated[0].is_signed());
}

#[tokio::test]
async fn raw_queries_return_values() {
    let ledger = Arc::new(MockLedger::default().with_simulation(success(Value::U32(3))));
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    let value = client
        .queries()
        .query_value("tip_count", Vec::new(), &alice())
        .await;

    assert_eq!(value, Some(Value::U32(3)));
}

#[tokio::test]
async fn message_cap_comes_from_configuration() {
    let ledger = Arc::new(MockLedger::default());
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    assert!(client.check_message(&"a".repeat(100)).is_ok());
    let err = client.check_message(&"a".repeat(101)).unwrap_err();
    assert_eq!(err.len, 101);
    assert_eq!(err.cap, 100);
}

#[tokio::test]
async fn funding_without_service_is_refused() {
    let ledger = Arc::new(MockLedger::default());
    let signer = Arc::new(MockSigner::default());
    let client = client(&ledger, &signer);

    assert!(!client.fund_testnet_account(&alice()).await);
    assert!(client.account_exists(&alice()).await);
}
