//! Protocol-shape dispatch: which messages carry sources and locations.
//!
//! The dispatch is a declarative allow-list over `(shape, sub-kind)`.
//! Everything not listed passes through untouched: rewriting a field the
//! bridge merely guessed to be a source would be worse than missing one, so
//! there is deliberately no best-effort deep scan.

use serde_json::Value;

use super::{Direction, MessageRewriter};
use crate::dap::message::{MessageShape, shape_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Event,
    Request,
    Response,
}

type Handler = fn(&MessageRewriter, &mut Value, Direction);

/// The allow-list. Response entries are only reached for successful
/// responses that carry a body.
const HANDLERS: &[(Shape, &str, Handler)] = &[
    (Shape::Event, "output", event_source),
    (Shape::Event, "loadedSource", event_source),
    (Shape::Event, "breakpoint", event_breakpoint_source),
    (Shape::Request, "setBreakpoints", request_set_breakpoints),
    (Shape::Request, "breakpointLocations", request_source),
    (Shape::Request, "source", request_source),
    (Shape::Request, "gotoTargets", request_source),
    (Shape::Response, "stackTrace", response_stack_trace),
    (Shape::Response, "loadedSources", response_loaded_sources),
    (Shape::Response, "scopes", response_scopes),
    (Shape::Response, "setFunctionBreakpoints", response_breakpoints),
    (Shape::Response, "setBreakpoints", response_breakpoints),
];

pub(crate) fn rewrite(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    let Some((shape, sub_kind)) = classify(message) else {
        return;
    };
    let handler = HANDLERS
        .iter()
        .find(|(s, kind, _)| *s == shape && *kind == sub_kind)
        .map(|(_, _, handler)| *handler);
    if let Some(handler) = handler {
        handler(rewriter, message, direction);
    }
}

fn classify(message: &Value) -> Option<(Shape, String)> {
    match shape_of(message) {
        MessageShape::Event(event) => Some((Shape::Event, event.to_string())),
        MessageShape::Request(command) => Some((Shape::Request, command.to_string())),
        MessageShape::Response { command, success } => {
            let has_body = message.get("body").is_some_and(Value::is_object);
            (success && has_body).then(|| (Shape::Response, command.to_string()))
        }
        MessageShape::Other => None,
    }
}

/// `body.source`
fn event_source(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    if let Some(source) = message
        .pointer_mut("/body/source")
        .and_then(Value::as_object_mut)
    {
        rewriter.translate_source(source, direction);
    }
}

/// `body.breakpoint.source`
fn event_breakpoint_source(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    if let Some(source) = message
        .pointer_mut("/body/breakpoint/source")
        .and_then(Value::as_object_mut)
    {
        rewriter.translate_source(source, direction);
    }
}

/// `arguments.source`
fn request_source(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    if let Some(source) = message
        .pointer_mut("/arguments/source")
        .and_then(Value::as_object_mut)
    {
        rewriter.translate_source(source, direction);
    }
}

/// `arguments.source`, plus `arguments.breakpoints[*]` as locations keyed by
/// that source.
fn request_set_breakpoints(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    let Some(args) = message
        .pointer_mut("/arguments")
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    // The path is captured before the source is rewritten; it keys the
    // breakpoint remapping in the space the direction implies.
    let source_path = args
        .get("source")
        .and_then(|source| source.get("path"))
        .and_then(Value::as_str)
        .map(String::from);

    if let Some(source) = args.get_mut("source").and_then(Value::as_object_mut) {
        rewriter.translate_source(source, direction);
    }

    let Some(path) = source_path else {
        return;
    };
    if let Some(breakpoints) = args.get_mut("breakpoints").and_then(Value::as_array_mut) {
        rewriter.remap_locations(
            breakpoints.iter_mut().filter_map(Value::as_object_mut),
            &path,
            direction,
        );
    }
}

/// `body.stackFrames[*].source`, each frame itself a location.
fn response_stack_trace(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    rewrite_sourced_list(rewriter, message, "/body/stackFrames", direction);
}

/// `body.scopes[*].source`, each scope itself a location.
fn response_scopes(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    rewrite_sourced_list(rewriter, message, "/body/scopes", direction);
}

/// `body.breakpoints[*].source`, each breakpoint itself a location.
fn response_breakpoints(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    rewrite_sourced_list(rewriter, message, "/body/breakpoints", direction);
}

/// `body.sources[*]`: sources only, no locations.
fn response_loaded_sources(rewriter: &MessageRewriter, message: &mut Value, direction: Direction) {
    let Some(sources) = message
        .pointer_mut("/body/sources")
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for source in sources.iter_mut().filter_map(Value::as_object_mut) {
        rewriter.translate_source(source, direction);
    }
}

/// Shared walk for arrays whose elements carry their own `source` and are
/// themselves locations (stack frames, scopes, breakpoints). Each element's
/// locations are keyed by that element's source, since frames of one stack
/// can reference different cells.
fn rewrite_sourced_list(
    rewriter: &MessageRewriter,
    message: &mut Value,
    pointer: &str,
    direction: Direction,
) {
    let Some(items) = message.pointer_mut(pointer).and_then(Value::as_array_mut) else {
        return;
    };
    for item in items.iter_mut().filter_map(Value::as_object_mut) {
        let source_path = item
            .get("source")
            .and_then(|source| source.get("path"))
            .and_then(Value::as_str)
            .map(String::from);

        if let Some(source) = item.get_mut("source").and_then(Value::as_object_mut) {
            rewriter.translate_source(source, direction);
        }

        if let Some(path) = source_path {
            rewriter.remap_locations(std::iter::once(&mut *item), &path, direction);
        }
    }
}
