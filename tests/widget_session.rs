// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end widget sessions driven through JSON frames, the way the binary runs them.

use std::rc::Rc;

use molsync::comm::RecordingComm;
use molsync::config::ViewConfig;
use molsync::host::{FrameOutcome, HostError, WidgetHost};
use molsync::layout::ForceSimulation;
use molsync::model::{Attribute, WidgetModel};
use molsync::rpc::{Disposition, IgnoreReason, InboundFrame, OutboundFrame, OutboundMessage};
use rstest::{fixture, rstest};
use serde_json::json;

type Host = WidgetHost<ForceSimulation, RecordingComm>;

fn frame(value: serde_json::Value) -> InboundFrame {
    serde_json::from_value(value).expect("inbound frame")
}

fn benzene_ring() -> serde_json::Value {
    let nodes = (0..6).map(|id| json!({"id": id, "atom": "C"})).collect::<Vec<_>>();
    let links = (0..6)
        .map(|id| json!({"id": format!("b{id}"), "source": id, "target": (id + 1) % 6}))
        .collect::<Vec<_>>();
    json!({"nodes": nodes, "links": links})
}

#[fixture]
fn host() -> Host {
    let state = json!({"id": "benzene", "width": 320, "height": 240, "graph": benzene_ring()});
    let serde_json::Value::Object(state) = state else {
        panic!("state must be an object");
    };
    let model = WidgetModel::from_state(&state).expect("model");
    WidgetHost::new(model, ViewConfig::default(), ForceSimulation::default(), RecordingComm::new())
        .expect("host")
}

#[rstest]
fn initial_render_announces_ready(host: Host) {
    assert_eq!(host.comm().frames(), &[OutboundFrame::Custom { content: OutboundMessage::Ready }]);
    assert_eq!(host.view().index().node_count(), 6);
    assert!(host.view().index().link(0, 5).is_some());
}

#[rstest]
fn function_call_round_trip(mut host: Host) {
    host.comm_mut().take();

    let outcome = host
        .handle_frame(frame(json!({
            "method": "custom",
            "content": {
                "event": "function_call",
                "function_name": "setBondStyle",
                "arguments": [[[5, 0]], {"stroke": "orange", "stroke-width": 3}],
                "call_id": "abc",
            },
        })))
        .expect("frame");

    assert!(matches!(outcome, FrameOutcome::Dispatched(Disposition::Done { .. })));
    let sent = serde_json::to_value(host.comm().frames()).expect("json");
    assert_eq!(
        sent,
        json!([{"method": "custom", "content": {
            "event": "function_done",
            "call_id": "abc",
            "result": null,
            "function_name": "setBondStyle",
        }}])
    );

    let view = host.view();
    let group = view.index().link(0, 5).expect("bond");
    let line = view.scene().child(group, 0).and_then(|id| view.scene().get(id)).expect("line");
    assert_eq!(line.style_value("stroke"), Some("orange"));
    assert_eq!(line.style_value("stroke-width"), Some("3"));
}

#[rstest]
fn highlight_calls_are_swallowed(mut host: Host) {
    host.comm_mut().take();

    let outcome = host
        .handle_frame(frame(json!({
            "method": "custom",
            "content": {
                "event": "function_call",
                "function_name": "updateHighlightAtoms",
                "arguments": [[0, 1]],
                "call_id": 1,
            },
        })))
        .expect("frame");

    assert_eq!(outcome, FrameOutcome::Dispatched(Disposition::Ignored(IgnoreReason::Suppressed)));
    assert!(host.comm().frames().is_empty());
    assert_eq!(host.view().message_log().len(), 1);
}

#[rstest]
fn message_log_outlives_state_updates(mut host: Host) {
    host.handle_frame(frame(json!({"method": "custom", "content": {"event": "heartbeat"}})))
        .expect("heartbeat");
    assert_eq!(host.view().message_log().len(), 1);

    let outcome = host
        .handle_frame(frame(json!({"method": "update", "state": {"width": 400}})))
        .expect("update");
    assert_eq!(outcome, FrameOutcome::StateApplied { changed: vec![Attribute::Width] });
    assert_eq!(host.view().render_count(), 2);
    assert_eq!(host.view().message_log(), &[json!({"event": "heartbeat"})]);

    host.handle_frame(frame(json!({
        "method": "custom",
        "content": {"event": "function_call", "function_name": "setAtomLabel", "arguments": [1, "N"], "call_id": 9},
    })))
    .expect("call");
    assert_eq!(host.view().message_log().len(), 2);
}

#[rstest]
fn malformed_call_is_answered_over_the_channel(mut host: Host) {
    host.comm_mut().take();

    let outcome = host
        .handle_frame(frame(json!({
            "method": "custom",
            "content": {
                "event": "function_call",
                "function_name": "setAtomStyle",
                "arguments": {"atoms": [0]},
                "call_id": "x",
            },
        })))
        .expect("frame");

    assert!(matches!(outcome, FrameOutcome::Dispatched(Disposition::Failed { .. })));
    let sent = serde_json::to_value(host.comm().frames()).expect("json");
    assert_eq!(sent[0]["content"]["event"], json!("function_failed"));
    assert_eq!(sent[0]["content"]["call_id"], json!("x"));
    assert_eq!(host.view().message_log().len(), 1);
}

#[rstest]
fn state_update_reconciles_and_re_renders(mut host: Host) {
    let before = Rc::clone(&host.model().graph().nodes()[2]);
    host.comm_mut().take();

    let mut graph = benzene_ring();
    graph["nodes"][2]["atom"] = json!("N");
    let outcome = host
        .handle_frame(frame(json!({"method": "update", "state": {"graph": graph}})))
        .expect("frame");

    assert_eq!(outcome, FrameOutcome::StateApplied { changed: vec![Attribute::Graph] });
    assert!(Rc::ptr_eq(&before, &host.model().graph().nodes()[2]));
    assert_eq!(host.view().render_count(), 2);
    assert_eq!(host.comm().frames(), &[OutboundFrame::Custom { content: OutboundMessage::Ready }]);

    let view = host.view();
    let group = view.index().node(2).expect("node");
    let label = view.scene().child(group, 1).and_then(|id| view.scene().get(id)).expect("label");
    assert_eq!(label.text(), Some("N"));
}

#[rstest]
fn shrinking_the_molecule_replaces_the_collections(mut host: Host) {
    let outcome = host
        .handle_frame(frame(json!({"method": "update", "state": {"graph": {
            "nodes": [{"id": 0, "atom": "O"}, {"id": 1, "atom": "O"}],
            "links": [{"id": "o=o", "source": 0, "target": 1}],
        }}})))
        .expect("frame");

    assert!(matches!(outcome, FrameOutcome::StateApplied { .. }));
    assert_eq!(host.view().index().node_count(), 2);
    assert_eq!(host.view().index().link(1, 0), host.view().index().link(0, 1));
    assert!(host.view().index().node(2).is_none());
}

#[rstest]
fn links_without_ids_still_render(mut host: Host) {
    host.handle_frame(frame(json!({"method": "update", "state": {"graph": {
        "nodes": [{"id": 0, "atom": "C"}, {"id": 1, "atom": "O"}],
        "links": [{"source": 0, "target": 1}],
    }}})))
    .expect("frame");

    assert_eq!(host.view().index().node_count(), 2);
    assert!(host.view().index().link(1, 0).is_some());
}

#[rstest]
fn clicks_are_saved_back_to_the_kernel(mut host: Host) {
    host.comm_mut().take();

    assert!(host.click_atom(4).expect("click"));
    assert!(!host.click_atom(4).expect("same atom again"));

    let frames = host.comm_mut().take();
    assert_eq!(frames.len(), 2);
    assert_eq!(
        serde_json::to_value(&frames[0]).expect("json"),
        json!({"method": "update", "state": {"clicked_atom_index": 4}})
    );
    assert_eq!(frames[1], OutboundFrame::Custom { content: OutboundMessage::Ready });
    assert_eq!(host.model().clicked_atom_index(), Some(4));
}

#[rstest]
fn invalid_state_is_rejected_without_side_effects(mut host: Host) {
    let err = host
        .handle_frame(frame(json!({"method": "update", "state": {"width": "wide"}})))
        .unwrap_err();

    assert!(matches!(err, HostError::Model(_)));
    assert_eq!(host.model().width(), 320.0);
    assert_eq!(host.view().render_count(), 1);
}

#[rstest]
fn layout_settles_and_shutdown_detaches(mut host: Host) {
    let mut ticks = 0;
    while host.tick() {
        ticks += 1;
        assert!(ticks < 1_000, "layout never settled");
    }
    assert!(ticks > 0);
    assert_eq!(host.view().render_count(), 1);

    let (mut model, comm) = host.shutdown();
    assert_eq!(comm.frames().len(), 1);
    let event = model
        .apply_state(&serde_json::Map::from_iter([("height".to_owned(), json!(100))]))
        .expect("apply");
    assert!(event.is_some());
}
