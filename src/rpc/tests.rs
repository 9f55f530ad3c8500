// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};
use serde_json::json;

use super::{
    message_schemas, Dispatcher, Disposition, IgnoreReason, InboundFrame, InboundMessage,
    OutboundMessage,
};
use crate::comm::{Comm, RecordingComm};
use crate::config::ViewConfig;
use crate::layout::ForceSimulation;
use crate::model::fixtures::formaldehyde_model;
use crate::render::MolView;

struct DispatchCtx {
    dispatcher: Dispatcher,
    view: MolView<ForceSimulation>,
    comm: RecordingComm,
}

impl DispatchCtx {
    fn dispatch(&mut self, message: InboundMessage) -> Disposition {
        self.dispatch_raw(serde_json::to_value(message).expect("message json"))
    }

    fn dispatch_raw(&mut self, content: serde_json::Value) -> Disposition {
        self.dispatcher
            .dispatch(&mut self.view, Some(&mut self.comm as &mut dyn Comm), content)
            .expect("dispatch")
    }

    fn fill(&self, atom: usize) -> Option<String> {
        let scene = self.view.scene();
        let group = self.view.index().node(atom)?;
        let circle = scene.child(group, 0)?;
        scene.get(circle)?.style_value("fill").map(str::to_owned)
    }
}

#[fixture]
fn ctx() -> DispatchCtx {
    let model = formaldehyde_model();
    let mut view = MolView::new(ViewConfig::default(), ForceSimulation::default());
    view.render(&model, None).expect("render");
    DispatchCtx { dispatcher: Dispatcher::default(), view, comm: RecordingComm::new() }
}

#[rstest]
fn function_call_is_answered_with_its_call_id(mut ctx: DispatchCtx) {
    let disposition = ctx.dispatch(InboundMessage::function_call(
        "setAtomStyle",
        vec![json!([0]), json!({"fill": "red"})],
        json!(7),
    ));

    assert_eq!(
        disposition,
        Disposition::Done { function_name: "setAtomStyle".to_owned(), result: json!(null) }
    );
    assert_eq!(ctx.fill(0).as_deref(), Some("red"));
    assert_eq!(
        ctx.comm.messages().collect::<Vec<_>>(),
        vec![&OutboundMessage::FunctionDone {
            call_id: Some(json!(7)),
            result: json!(null),
            function_name: "setAtomStyle".to_owned(),
        }]
    );
    assert_eq!(ctx.view.message_log().len(), 1);
}

#[rstest]
fn suppressed_call_is_logged_but_not_answered(mut ctx: DispatchCtx) {
    let disposition = ctx.dispatch(InboundMessage::function_call(
        "updateHighlightAtoms",
        vec![json!([1, 2])],
        json!("c-1"),
    ));

    assert_eq!(disposition, Disposition::Ignored(IgnoreReason::Suppressed));
    assert!(ctx.comm.frames().is_empty());
    assert_eq!(ctx.view.message_log().len(), 1);
}

#[rstest]
fn other_events_are_logged_and_ignored(mut ctx: DispatchCtx) {
    let mut message = InboundMessage::new("heartbeat");
    message.extra.insert("seq".to_owned(), json!(3));

    let disposition = ctx.dispatch(message.clone());

    assert_eq!(disposition, Disposition::Ignored(IgnoreReason::NotAFunctionCall));
    assert!(ctx.comm.frames().is_empty());
    assert_eq!(ctx.view.message_log(), &[serde_json::to_value(&message).expect("json")]);
}

#[rstest]
fn call_with_non_list_arguments_is_answered_with_function_failed(mut ctx: DispatchCtx) {
    let content = json!({
        "event": "function_call",
        "function_name": "setAtomStyle",
        "arguments": {"atoms": [0]},
        "call_id": "x",
    });

    let disposition = ctx.dispatch_raw(content.clone());

    let error = "`setAtomStyle` expects its arguments as a list".to_owned();
    assert_eq!(
        disposition,
        Disposition::Failed { function_name: "setAtomStyle".to_owned(), error: error.clone() }
    );
    assert_eq!(
        ctx.comm.messages().collect::<Vec<_>>(),
        vec![&OutboundMessage::FunctionFailed {
            call_id: Some(json!("x")),
            error,
            function_name: "setAtomStyle".to_owned(),
        }]
    );
    assert_eq!(ctx.view.message_log(), &[content]);
    assert_eq!(ctx.fill(0).as_deref(), Some("silver"));
}

#[rstest]
fn call_with_unreadable_envelope_still_gets_an_answer(mut ctx: DispatchCtx) {
    let content = json!({"event": "function_call", "function_name": 42, "call_id": [1, 2]});

    let disposition = ctx.dispatch_raw(content.clone());

    assert!(matches!(
        &disposition,
        Disposition::Failed { function_name, error }
            if function_name.is_empty() && error.starts_with("malformed function call")
    ));
    let sent = ctx.comm.messages().collect::<Vec<_>>();
    assert!(matches!(
        sent.as_slice(),
        [OutboundMessage::FunctionFailed { call_id: Some(call_id), .. }] if *call_id == json!([1, 2])
    ));
    assert_eq!(ctx.view.message_log(), &[content]);
}

#[rstest]
#[case::non_string_event(json!({"event": 5, "call_id": 1}))]
#[case::not_an_object(json!(["function_call"]))]
fn unreadable_messages_are_logged_and_ignored(
    mut ctx: DispatchCtx,
    #[case] content: serde_json::Value,
) {
    let disposition = ctx.dispatch_raw(content.clone());

    assert_eq!(disposition, Disposition::Ignored(IgnoreReason::Malformed));
    assert!(ctx.comm.frames().is_empty());
    assert_eq!(ctx.view.message_log(), &[content]);
}

#[rstest]
fn message_log_survives_re_renders(mut ctx: DispatchCtx) {
    ctx.dispatch(InboundMessage::new("heartbeat"));
    assert_eq!(ctx.view.message_log().len(), 1);

    let model = formaldehyde_model();
    ctx.view.render(&model, None).expect("re-render");
    assert_eq!(ctx.view.render_count(), 2);
    assert_eq!(ctx.view.message_log().len(), 1);

    ctx.dispatch(InboundMessage::function_call(
        "setAtomStyle",
        vec![json!([0]), json!({"fill": "red"})],
        json!(2),
    ));
    assert_eq!(ctx.view.message_log().len(), 2);
    assert_eq!(ctx.view.message_log()[0]["event"], json!("heartbeat"));
}

#[rstest]
#[case::unknown_function(
    InboundMessage::function_call("explode", vec![], json!(1)),
    "unknown function `explode`"
)]
#[case::missing_atom(
    InboundMessage::function_call("setAtomStyle", vec![json!([9]), json!({"fill": "red"})], json!(1)),
    "no atom 9 in the view"
)]
#[case::bad_argument(
    InboundMessage::function_call("setAtomLabel", vec![json!({"atom": 1})], json!(1)),
    "`setAtomLabel` argument 0: expected an atom index"
)]
fn failing_calls_are_answered_with_function_failed(
    mut ctx: DispatchCtx,
    #[case] message: InboundMessage,
    #[case] expected: &str,
) {
    let function_name = message.function_name.clone().unwrap_or_default();

    let disposition = ctx.dispatch(message);

    assert_eq!(
        disposition,
        Disposition::Failed { function_name: function_name.clone(), error: expected.to_owned() }
    );
    assert_eq!(
        ctx.comm.messages().collect::<Vec<_>>(),
        vec![&OutboundMessage::FunctionFailed {
            call_id: Some(json!(1)),
            error: expected.to_owned(),
            function_name,
        }]
    );
}

#[rstest]
fn missing_bond_is_a_silent_success(mut ctx: DispatchCtx) {
    let disposition = ctx.dispatch(InboundMessage::function_call(
        "setBondLabel",
        vec![json!([2, 3]), json!("x")],
        json!(4),
    ));

    assert!(matches!(disposition, Disposition::Done { .. }));
}

#[rstest]
fn suppression_list_comes_from_config(mut ctx: DispatchCtx) {
    let config = ViewConfig { suppressed_functions: vec!["setAtomStyle".to_owned()], ..ViewConfig::default() };
    ctx.dispatcher = Dispatcher::from_config(&config);

    let disposition = ctx.dispatch(InboundMessage::function_call(
        "setAtomStyle",
        vec![json!([0]), json!({"fill": "red"})],
        json!(1),
    ));

    assert_eq!(disposition, Disposition::Ignored(IgnoreReason::Suppressed));
    assert_eq!(ctx.fill(0).as_deref(), Some("silver"));
    assert!(!ctx.dispatcher.is_suppressed("updateHighlightAtoms"));
}

#[test]
fn inbound_frames_keep_unknown_fields_and_opaque_call_ids() {
    let frame: InboundFrame = serde_json::from_value(json!({
        "method": "custom",
        "content": {
            "event": "function_call",
            "function_name": "setBondStyle",
            "arguments": [[[0, 1]], {"stroke": "red"}],
            "call_id": {"seq": 12, "origin": "kernel"},
            "extra": true,
        },
    }))
    .expect("frame");

    let InboundFrame::Custom { content } = frame else {
        panic!("expected custom frame");
    };
    let message: InboundMessage = serde_json::from_value(content).expect("message");
    assert_eq!(message.call_id, Some(json!({"seq": 12, "origin": "kernel"})));
    assert_eq!(message.extra.get("extra"), Some(&json!(true)));
    assert_eq!(message.arguments.as_ref().and_then(|arguments| arguments.as_array()).map(Vec::len), Some(2));
}

#[test]
fn custom_frames_accept_any_content() {
    let frame: InboundFrame = serde_json::from_value(json!({
        "method": "custom",
        "content": {"event": "function_call", "arguments": {"atoms": [0]}, "call_id": "x"},
    }))
    .expect("frame");

    assert!(matches!(frame, InboundFrame::Custom { content } if content["call_id"] == json!("x")));
}

#[test]
fn schemas_cover_both_directions() {
    let schemas = message_schemas().expect("schemas");
    assert!(schemas.get("inbound").is_some_and(serde_json::Value::is_object));
    assert!(schemas.get("outbound").is_some_and(serde_json::Value::is_object));
}
