use btt_graph::{
    graft, locate, AppIdentity, ConditionCodec, GraftError, KeyedArchiveCodec, MarkerKind, NS_OBJECTS_KEY,
};
use btt_test_utils::{condition_blob, predicate_graph, uid, vscode, vscode_exploration, vscode_insiders};
use plist::Value;
use pretty_assertions::assert_eq;

#[test]
fn test_locates_each_alternative() {
    let graph = predicate_graph();

    let safari = locate(&graph, &AppIdentity::new("com.apple.Safari", "Safari")).unwrap();
    assert_eq!((safari.copy_from, safari.copy_to, safari.center), (4, 7, 7));

    let code = locate(&graph, &vscode()).unwrap();
    assert_eq!((code.copy_from, code.copy_to, code.center), (8, 11, 11));
    assert_eq!(code.marker, MarkerKind::BundleIdentifier);
    assert_eq!(code.span(), 4);
}

#[test]
fn test_unknown_app_is_not_found() {
    let graph = predicate_graph();
    let err = locate(&graph, &AppIdentity::new("com.example.Nope", "Nope")).unwrap_err();
    assert!(matches!(err, GraftError::MarkerNotFound { .. }));
}

#[test]
fn test_decode_graft_encode() {
    let codec = KeyedArchiveCodec;
    let mut graph = codec.decode(&condition_blob()).unwrap();
    assert_eq!(graph, predicate_graph());

    let range = locate(&graph, &vscode()).unwrap();
    let report = graft(&mut graph, range, &vscode(), &[vscode_insiders(), vscode_exploration()]).unwrap();
    assert_eq!(report.roots, vec![12, 16]);

    let reencoded = codec.encode(&graph).unwrap();
    let reread = codec.decode(&reencoded).unwrap();
    assert_eq!(reread, graph);

    let roots = reread
        .get(1)
        .and_then(Value::as_dictionary)
        .and_then(|d| d.get(NS_OBJECTS_KEY))
        .and_then(Value::as_array)
        .unwrap();
    assert_eq!(roots, &vec![uid(4), uid(8), uid(12), uid(16)]);
}

#[test]
fn test_graft_twice_appends_twice() {
    let mut graph = predicate_graph();
    for _ in 0..2 {
        let range = locate(&graph, &vscode()).unwrap();
        graft(&mut graph, range, &vscode(), &[vscode_insiders()]).unwrap();
    }
    assert_eq!(graph.len(), 20);
}
