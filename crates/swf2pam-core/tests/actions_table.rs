use swf2pam_core::actions::{ActionTable, PaCommand};
use swf2pam_core::error::PamError;

const ACTIONS: &str = r#"{
    "main": {
        "0": [ { "action": "stop();" } ],
        "3": [
            { "action": "fscommand(\"playSound\", \"hit\", \"loud\")" },
            { "action": "STOP();" }
        ]
    },
    "zombie_arm": {
        "1": [ { "action": "gotoAndPlay(1);" } ],
        "2": [ { "action": "FSCommand( \"drop\" )" } ]
    }
}"#;

#[test]
fn stops_and_commands_per_sprite() {
    let table = ActionTable::from_json_str(ACTIONS).expect("parse");
    assert_eq!(table.sprite_count(), 2);

    assert!(table.is_stop("main", 0));
    assert!(table.is_stop("main", 3));
    assert!(!table.is_stop("main", 1));
    assert!(!table.is_stop("zombie_arm", 1));

    assert_eq!(
        table.commands("main", 3),
        &[PaCommand {
            command: "playSound".into(),
            param: "hit,loud".into()
        }]
    );
    assert!(table.commands("main", 0).is_empty());
    // unrecognized actions are skipped
    assert!(table.commands("zombie_arm", 1).is_empty());
    assert_eq!(
        table.commands("zombie_arm", 2),
        &[PaCommand {
            command: "drop".into(),
            param: String::new()
        }]
    );
    assert!(table.commands("missing", 0).is_empty());
}

#[test]
fn non_numeric_frame_key_is_invalid() {
    let err = ActionTable::from_json_str(r#"{ "main": { "first": [] } }"#).unwrap_err();
    assert!(matches!(err, PamError::InvalidData(_)));
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = ActionTable::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, PamError::Json(_)));
}

#[test]
fn missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = ActionTable::load(&dir.path().join("anim_actions.json")).expect("load");
    assert!(loaded.is_none());
}

#[test]
fn load_reads_existing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("anim_actions.json");
    std::fs::write(&path, ACTIONS).expect("write");
    let table = ActionTable::load(&path).expect("load").expect("present");
    assert!(table.is_stop("main", 0));
}
