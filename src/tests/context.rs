//! End-to-end flows through AppContext: views, dispatcher, stores and transport together

use super::helpers::*;
use crate::{
    context::{AppContext, COLLECTION_ORIGIN},
    error::TchaikError,
    paths::PathKey,
    store::FetchOutcome,
    transport::{ChannelTransport, LoopbackServer},
    views::{Component, Rendered, RootGroup, Search},
    wire::InboundMessage,
};
use parking_lot::Mutex;
use std::sync::Arc;
use test_log::test;
use tokio::sync::mpsc::unbounded_channel;

fn context() -> (
    Arc<AppContext>,
    tokio::sync::mpsc::UnboundedReceiver<crate::wire::OutboundMessage>,
) {
    init_logging();
    let (transport, rx) = ChannelTransport::new();
    (AppContext::new(Arc::new(transport)), rx)
}

#[test]
fn test_root_scenario_through_inbound_json() {
    let (ctx, mut rx) = context();
    let root = path(&["Root"]);
    let (_handle, keys) = record_keys(&ctx.collections());

    assert_eq!(ctx.fetch(&root).unwrap(), FetchOutcome::Requested);
    let sent = drain_requests(&mut rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].to_json().unwrap(),
        r#"{"action":"FETCH","data":{"path":["Root"]}}"#
    );

    ctx.receive_json(
        r#"{"action":"FETCH","data":{"path":["Root"],"data":{"name":"Root","children":["Album:Foo"]}}}"#,
    )
    .unwrap();

    let node = ctx
        .collections()
        .get_collection(&root)
        .into_option()
        .unwrap();
    assert_eq!(node.name(), "Root");
    assert_eq!(*keys.lock(), vec![PathKey::encode(&root)]);
}

#[test]
fn test_unfamiliar_node_shapes_are_cached() {
    let (ctx, _rx) = context();
    let root = path(&["Root"]);
    let artist = path(&["Root", "Artist:Foo"]);
    ctx.fetch(&root).unwrap();
    ctx.fetch(&artist).unwrap();

    ctx.receive_json(
        r#"{"action":"FETCH","data":{"path":["Root"],"data":{"name":"Root","children":[["Root","Album:Foo"],["Album:Bar"]]}}}"#,
    )
    .unwrap();
    let node = ctx
        .collections()
        .get_collection(&root)
        .into_option()
        .unwrap();
    assert_eq!(
        node.child_paths(&root),
        vec![root.child("Album:Foo"), root.child("Album:Bar")]
    );
    assert!(!ctx.collections().is_pending(&root));
    assert_eq!(ctx.fetch(&root).unwrap(), FetchOutcome::Cached);

    ctx.receive_json(
        r#"{"action":"FETCH","data":{"path":["Root","Artist:Foo"],"data":{"Name":"Foo","Groups":[]}}}"#,
    )
    .unwrap();
    let node = ctx
        .collections()
        .get_collection(&artist)
        .into_option()
        .unwrap();
    assert_eq!(node.name(), "");
    assert_eq!(
        node.as_value(),
        &serde_json::json!({"Name": "Foo", "Groups": []})
    );
    assert_eq!(ctx.collections().pending_count(), 0);
}

#[test]
fn test_malformed_inbound_leaves_store_untouched() {
    let (ctx, _rx) = context();
    let root = path(&["Root"]);
    ctx.fetch(&root).unwrap();
    let (_handle, keys) = record_keys(&ctx.collections());

    let bad = [
        r#"{"action":"FETCH","data":{"path":["Root"]}}"#,
        r#"{"action":"FETCH","data":{"data":{"name":"Root"}}}"#,
        r#"{"action":"NOPE","data":{}}"#,
        r#"garbage"#,
    ];
    for text in bad {
        assert!(matches!(
            ctx.receive_json(text),
            Err(TchaikError::MalformedPayload(_))
        ));
    }

    assert!(!ctx.collections().get_collection(&root).is_present());
    assert!(ctx.collections().is_pending(&root));
    assert!(keys.lock().is_empty());
}

#[test]
fn test_listener_dispatching_during_dispatch_is_rejected() {
    let (ctx, _rx) = context();
    let root = path(&["Root"]);
    let outcome = Arc::new(Mutex::new(None));

    let weak = Arc::downgrade(&ctx);
    let sink = outcome.clone();
    ctx.collections().add_change_listener(move |_| {
        if let Some(ctx) = weak.upgrade() {
            *sink.lock() = Some(ctx.set_current_track(test_track("t1", "Intro")));
        }
    });

    ctx.fetch(&root).unwrap();
    ctx.receive(InboundMessage::collection(&root, &group("Root", &[])))
        .unwrap();

    assert!(matches!(
        *outcome.lock(),
        Some(Err(TchaikError::ReentrantDispatch(_)))
    ));
    assert!(ctx.now_playing().current_track().is_none());

    // Outside a dispatch the same action goes through.
    ctx.collections().reset();
    ctx.set_current_track(test_track("t1", "Intro")).unwrap();
    assert_eq!(
        ctx.now_playing().current_track().map(|t| t.id),
        Some("t1".to_string())
    );
    assert_eq!(ctx.now_playing().origin().as_deref(), Some(COLLECTION_ORIGIN));
}

#[test]
fn test_listener_handles_stay_with_their_store() {
    let (ctx, _rx) = context();
    let root = path(&["Root"]);
    let (collection_handle, keys) = record_keys(&ctx.collections());
    let search_handle = ctx.search_store().add_change_listener(|| {});
    let playing_handle = ctx.now_playing().add_change_listener(|| {});

    assert!(!ctx.collections().remove_change_listener(search_handle));
    assert!(!ctx.search_store().remove_change_listener(collection_handle));
    assert!(!ctx.now_playing().remove_change_listener(search_handle));
    assert_eq!(ctx.collections().listener_count(), 1);
    assert_eq!(ctx.search_store().listener_count(), 1);

    ctx.fetch(&root).unwrap();
    ctx.receive(InboundMessage::collection(&root, &group("Root", &[])))
        .unwrap();
    assert_eq!(*keys.lock(), vec![PathKey::encode(&root)]);

    assert!(ctx.collections().remove_change_listener(collection_handle));
    assert!(ctx.search_store().remove_change_listener(search_handle));
    assert!(ctx.now_playing().remove_change_listener(playing_handle));
}

#[test]
fn test_drain_processes_queued_responses_in_order() {
    let (ctx, _rx) = context();
    let a = path(&["Root", "A"]);
    let b = path(&["Root", "B"]);
    ctx.fetch(&a).unwrap();
    ctx.fetch(&b).unwrap();
    let (_handle, keys) = record_keys(&ctx.collections());

    let (tx, mut inbound) = unbounded_channel();
    tx.send(InboundMessage::collection(&b, &group("B", &[])))
        .unwrap();
    tx.send(InboundMessage {
        action: "FETCH".to_string(),
        data: serde_json::Value::Null,
    })
    .unwrap();
    tx.send(InboundMessage::collection(&a, &group("A", &[])))
        .unwrap();

    assert_eq!(ctx.drain(&mut inbound), 2);
    assert_eq!(*keys.lock(), vec![PathKey::encode(&b), PathKey::encode(&a)]);
}

#[test]
fn test_reset_isolates_runs() {
    let (ctx, mut rx) = context();
    let root = path(&["Root"]);
    ctx.fetch(&root).unwrap();
    ctx.receive(InboundMessage::collection(&root, &group("Root", &[])))
        .unwrap();
    ctx.search_store().ingest("x", vec![group("X", &[])]);

    ctx.reset();

    assert!(!ctx.collections().get_collection(&root).is_present());
    assert!(ctx.search_store().get_results().is_empty());
    drain_requests(&mut rx);
    assert_eq!(ctx.fetch(&root).unwrap(), FetchOutcome::Requested);
    assert_eq!(drain_requests(&mut rx).len(), 1);
}

#[test(tokio::test)]
async fn test_browse_against_loopback_server() {
    init_logging();
    let (transport, requests) = ChannelTransport::new();
    let (responses, inbound) = unbounded_channel();
    let ctx = AppContext::new(Arc::new(transport));
    let serving = tokio::spawn(LoopbackServer::new(sample_library()).serve(requests, responses));
    let pump = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run(inbound).await })
    };

    let root = path(&["Root"]);
    let missing = path(&["Root", "Album:Missing"]);
    let mut root_view = RootGroup::new(ctx.collections(), root.clone());
    let mut album_view = RootGroup::new(ctx.collections(), root.child("Album:Foo"));
    let mut missing_view = RootGroup::new(ctx.collections(), missing.clone());
    let mut search = Search::new(ctx.search_store());
    root_view.mount();
    album_view.mount();
    missing_view.mount();
    search.mount();
    ctx.search("intro").unwrap();

    for _ in 0..100 {
        if root_view.item().is_some()
            && album_view.item().is_some()
            && search.results().refreshes() > 0
        {
            break;
        }
        tokio::task::yield_now().await;
    }

    // Stopping the server closes the inbound channel, which ends the pump.
    serving.abort();
    let _ = serving.await;
    pump.await.unwrap();

    let Rendered::Group { children, .. } = root_view.render() else {
        panic!("root should have resolved");
    };
    assert_eq!(children, vec![root.child("Album:Foo"), root.child("Album:Bar")]);
    let Rendered::Group { item, depth, .. } = album_view.render() else {
        panic!("album should have resolved");
    };
    assert_eq!((item.name(), depth), ("Foo", 1));

    // The server never answers an unknown path, so its view keeps the placeholder.
    assert_eq!(missing_view.render(), Rendered::Nothing);
    assert_eq!(missing_view.refreshes(), 0);
    assert!(ctx.collections().is_pending(&missing));

    assert_eq!(search.results().refreshes(), 1);
    let Rendered::Collection(inner) = search.render() else {
        panic!("search always renders a collection container");
    };
    let Rendered::GroupList { list, .. } = *inner else {
        panic!("one track matches 'intro'");
    };
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "Intro");
}
