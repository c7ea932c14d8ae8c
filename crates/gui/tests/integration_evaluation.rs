//! Integration tests for the evaluation cycle.
//!
//! Each test drives a `Session` against a mock compute service on 127.0.0.1.

mod common;

use std::time::Duration;

use base64::Engine;
use serde_json::{json, Value};

use common::{line, quad, response, tree, MockCompute, Reply};
use compute_gui_lib::error::EvaluationError;
use compute_gui_lib::policy::{Operation, Policy};
use compute_gui_lib::presets;
use compute_gui_lib::state::{Color, Document, Geometry, Layer, ObjectAttributes};
use shared::{DataItem, ParamValue};

fn subdivision(value: f64) -> Vec<(String, ParamValue)> {
    vec![("subdivision".to_string(), ParamValue::Number(value))]
}

/// Per-object metadata, independent of generated ids
fn metadata(doc: &Document) -> Vec<(String, ObjectAttributes)> {
    doc.objects()
        .iter()
        .map(|o| (o.geometry.kind_name().to_string(), o.attributes.clone()))
        .collect()
}

fn line_x(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Curve(curve) => curve.points[0][0],
        other => panic!("expected a curve, got {}", other.kind_name()),
    }
}

#[tokio::test]
async fn test_slider_value_is_sent_as_root_branch() {
    let mock = MockCompute::start().await;
    let mut session = mock.session();

    session.evaluate(&subdivision(5.0)).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    assert_eq!(
        body["algo"],
        base64::engine::general_purpose::STANDARD.encode(b"definition-bytes")
    );
    assert_eq!(body["pointer"], Value::Null);
    assert_eq!(
        body["values"],
        json!([{
            "ParamName": "subdivision",
            "InnerTree": { "{0}": [{ "type": "System.Double", "data": "5.0" }] }
        }])
    );
}

#[tokio::test]
async fn test_outputs_decode_in_branch_then_value_order() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![
        tree(
            "first",
            vec![
                (vec![0, 10], vec![line(3.0).to_item()]),
                (vec![1], vec![line(4.0).to_item(), line(5.0).to_item()]),
                (vec![0, 2], vec![line(1.0).to_item(), line(2.0).to_item()]),
            ],
        ),
        tree("second", vec![(vec![0], vec![line(6.0).to_item()])]),
    ])));
    let mut session = mock.session();

    let doc = session.evaluate(&[]).await.unwrap();
    let xs: Vec<f64> = doc.objects().iter().map(|o| line_x(&o.geometry)).collect();
    assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[tokio::test]
async fn test_object_count_ignores_prior_document() {
    let mock = MockCompute::start().await;
    let mut session = mock.session();

    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(vec![0], (0..5).map(|i| line(i as f64).to_item()).collect())],
    )])));
    assert_eq!(session.evaluate(&[]).await.unwrap().len(), 5);

    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(vec![0], vec![line(9.0).to_item(), line(8.0).to_item()])],
    )])));
    assert_eq!(session.evaluate(&[]).await.unwrap().len(), 2);
    assert_eq!(session.scene().managed_count(), 2);
}

#[tokio::test]
async fn test_repeated_evaluation_is_idempotent() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(vec![0], vec![line(1.0).to_item(), line(2.0).to_item()])],
    )])));
    let mut session = mock.session();
    session.set_policy(Policy::plain().with_user_strings(), Operation::Evaluate);

    let first = metadata(session.evaluate(&subdivision(3.0)).await.unwrap());
    let second = metadata(session.evaluate(&subdivision(3.0)).await.unwrap());
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].1.user_string("index"), Some("2"));
}

#[tokio::test]
async fn test_server_error_leaves_document_unchanged() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(vec![0], vec![line(1.0).to_item()])],
    )])));
    let mut session = mock.session();
    session.evaluate(&[]).await.unwrap();
    let before = session.document().unwrap().clone();

    mock.on_evaluate(Reply::Status(500, "definition crashed".into()));
    let err = session.evaluate(&[]).await.unwrap_err();
    match err {
        EvaluationError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "definition crashed");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
    assert_eq!(session.document(), Some(&before));
    assert_eq!(session.scene().managed_count(), 1);
}

#[tokio::test]
async fn test_unreachable_service_leaves_document_unchanged() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(vec![0], vec![line(1.0).to_item()])],
    )])));
    let mut session = mock.session();
    session.evaluate(&[]).await.unwrap();
    let before = session.document().unwrap().clone();

    // Nothing listens on the discard port
    session.configure("http://127.0.0.1:9/", None).unwrap();
    let err = session.evaluate(&[]).await.unwrap_err();
    assert!(
        matches!(err, EvaluationError::Network(_) | EvaluationError::Timeout),
        "unexpected error: {err:?}"
    );
    assert_eq!(session.document(), Some(&before));
}

#[tokio::test]
async fn test_unknown_geometry_fails_whole_evaluation() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(vec![0], vec![line(3.0).to_item(), line(4.0).to_item()])],
    )])));
    let mut session = mock.session();
    session.evaluate(&[]).await.unwrap();
    let before = session.document().unwrap().clone();
    assert_eq!(before.len(), 2);

    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(
            vec![0],
            vec![
                line(1.0).to_item(),
                DataItem::new("Rhino.Geometry.Hatch", "{}"),
            ],
        )],
    )])));
    let err = session.evaluate(&[]).await.unwrap_err();
    assert!(matches!(err, EvaluationError::Decode(_)), "unexpected error: {err:?}");
    // The valid leaf before the bad one never reaches the document
    assert_eq!(session.document(), Some(&before));
    assert_eq!(session.scene().managed_count(), 2);
}

#[tokio::test]
async fn test_remote_errors_fail_evaluation() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(json!({
        "values": [],
        "errors": ["Input parameter subdivision not found"],
        "warnings": []
    })));
    let mut session = mock.session();

    let err = session.evaluate(&subdivision(1.0)).await.unwrap_err();
    match err {
        EvaluationError::Remote(messages) => assert_eq!(messages.len(), 1),
        other => panic!("expected remote errors, got {other:?}"),
    }
    assert!(session.document().is_none());
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(json!({ "values": "not a list" })));
    let mut session = mock.session();

    let err = session.evaluate(&[]).await.unwrap_err();
    assert!(
        matches!(err, EvaluationError::MalformedResponse(_)),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let mock = MockCompute::start().await;
    let mut session = mock.session();
    session.configure(&mock.url, Some("secret-key")).unwrap();

    session.evaluate(&[]).await.unwrap();
    assert_eq!(mock.requests()[0].api_key.as_deref(), Some("secret-key"));
}

#[tokio::test]
async fn test_boolean_union_replaces_document() {
    let mock = MockCompute::start().await;
    let mut session = mock.session();
    session.set_policy(Policy::plain(), Operation::MeshBooleanUnion);

    let mut model = Document::new();
    model.add(Geometry::Mesh(quad(0.0)), ObjectAttributes::default());
    model.add(Geometry::Mesh(quad(0.5)), ObjectAttributes::default());
    model.add(Geometry::Curve(line(7.0)), ObjectAttributes::default());
    session.load_model(&model.to_bytes().unwrap()).unwrap();
    assert_eq!(session.scene().managed_count(), 3);

    let merged = quad(0.0);
    mock.on_union(Reply::Json(json!([merged.to_item()])));

    let doc = session.evaluate(&[]).await.unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.objects()[0].geometry, Geometry::Mesh(merged));
    assert_eq!(session.scene().managed_count(), 1);

    let requests = mock.requests();
    assert_eq!(requests[0].route, "createbooleanunion");
    let sent = requests[0].body.as_array().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_layer_policy_colors_outputs() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![
        tree("crvs", vec![(vec![0], vec![line(1.0).to_item()])]),
        tree("crvs2", vec![(vec![0], vec![line(2.0).to_item()])]),
        tree("crvs3", vec![(vec![0], vec![line(3.0).to_item()])]),
    ])));
    let preset = presets::find("color-test").unwrap();
    let mut session = mock.session();
    session.set_policy(preset.policy(), preset.operation);

    let doc = session.evaluate(&[]).await.unwrap();
    let layers: Vec<usize> = doc.objects().iter().map(|o| o.attributes.layer_index).collect();
    assert_eq!(layers, vec![1, 2, 3]);

    let colors: Vec<Color> = session
        .scene()
        .nodes()
        .iter()
        .filter(|n| !n.is_light())
        .map(|n| n.color)
        .collect();
    assert_eq!(
        colors,
        vec![Color::rgb(0, 255, 0), Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)]
    );
}

#[tokio::test]
async fn test_user_string_color_reaches_scene() {
    let mut mesh = quad(0.0);
    mesh.user_strings = vec![("color".to_string(), "255,128,0".to_string())];

    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![tree(
        "hotdog",
        vec![(vec![0], vec![mesh.to_item()])],
    )])));
    let preset = presets::find("hotdog").unwrap();
    let mut session = mock.session();
    session.set_policy(preset.policy(), preset.operation);

    let doc = session.evaluate(&preset.default_params()).await.unwrap();
    assert_eq!(doc.objects()[0].attributes.user_string("color"), Some("255,128,0"));

    let node = session.scene().nodes().iter().find(|n| !n.is_light()).unwrap();
    assert_eq!(node.color, Color::rgb(255, 128, 0));

    let sent = &mock.requests()[0].body["values"];
    assert_eq!(sent.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_saved_document_round_trips() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Json(response(vec![tree(
        "crvs",
        vec![(vec![0], vec![line(1.0).to_item(), quad(2.0).to_item()])],
    )])));
    let mut session = mock.session();
    session.set_policy(
        Policy::plain().with_layers(vec![Layer::new("crvs", Color::rgb(0, 255, 0))]),
        Operation::Evaluate,
    );
    let doc = session.evaluate(&[]).await.unwrap().clone();

    let restored = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.len(), doc.len());
    assert_eq!(restored.layers(), doc.layers());
    assert_eq!(metadata(&restored), metadata(&doc));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock = MockCompute::start().await;
    mock.on_evaluate(Reply::Delayed(Duration::from_secs(3), response(Vec::new())));
    let mut settings = mock.settings();
    settings.timeout_secs = 1;

    let mut session = compute_gui_lib::state::Session::new(
        compute_gui_lib::compute::ComputeClient::new(&settings).unwrap(),
    );
    session.load_definition(compute_gui_lib::definition::Definition::from_bytes("weav.gh", b"x".to_vec()));

    let err = session.evaluate(&[]).await.unwrap_err();
    assert!(matches!(err, EvaluationError::Timeout), "unexpected error: {err:?}");
}
