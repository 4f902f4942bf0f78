// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn desktop_notify_adapter_constructs_without_blocking() {
    let _adapter = DesktopNotifyAdapter::new();
}

#[tokio::test]
async fn fake_notify_adapter_records_calls_in_order() {
    let adapter = FakeNotifyAdapter::new();
    adapter.notify("team 3 stuck", "waiting on review").await.unwrap();
    adapter.notify("team 3 resolved", "merged").await.unwrap();

    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].title, "team 3 stuck");
    assert_eq!(calls[0].message, "waiting on review");
    assert_eq!(calls[1].title, "team 3 resolved");
}

#[tokio::test]
async fn fake_notify_adapter_starts_empty() {
    let adapter = FakeNotifyAdapter::new();
    assert!(adapter.calls().is_empty());
}
