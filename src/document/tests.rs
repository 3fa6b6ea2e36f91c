use super::*;
use crate::species::{validate_species, SerializedSpecies};
use crate::validation::ErrorKind;
use chrono::{DateTime, Utc};
use serde_json::json;

fn at(timestamp: &str) -> DateTime<Utc> {
    timestamp.parse().unwrap()
}

fn header(name: &str) -> SetHeader<String> {
    SetHeader {
        contributor: "Example Lab".to_string(),
        name: name.to_string(),
        published_in: None,
        description: String::new(),
        complete: false,
    }
}

fn electron() -> Value {
    json!({ "type": "Electron", "composition": "e", "charge": -1 })
}

fn nitrogen() -> Value {
    json!({
        "type": "HomonuclearDiatom",
        "composition": [["N", 2]],
        "charge": 0,
        "electronic": { "energyId": "X", "Lambda": 0, "S": 0, "parity": "g", "reflection": "+" }
    })
}

fn nitrogen_ion() -> Value {
    json!({ "type": "Unspecified", "composition": [["N", 2]], "charge": 1 })
}

fn ionization() -> Value {
    json!({
        "lhs": [{ "count": 1, "state": "e" }, { "count": 1, "state": "N2" }],
        "rhs": [{ "count": 2, "state": "e" }, { "count": 1, "state": "N2+" }],
        "reversible": false,
        "typeTags": ["Ionization"]
    })
}

fn cross_section() -> Value {
    json!({
        "type": "CrossSection",
        "threshold": 15.6,
        "references": ["phelps"],
        "data": {
            "type": "LUT",
            "labels": ["Energy", "Cross Section"],
            "units": ["eV", "m^2"],
            "values": [[15.6, 0.0], [20.0, 3.1e-21]]
        }
    })
}

fn new_document() -> Value {
    json!({
        "contributor": "Example Lab",
        "name": "Nitrogen",
        "publishedIn": "phelps",
        "description": "Electron impact cross sections",
        "complete": false,
        "references": {
            "phelps": { "id": "phelps", "type": "article-journal", "title": "Cross sections", "volume": "12" }
        },
        "states": { "e": electron(), "N2": nitrogen(), "N2+": nitrogen_ion() },
        "processes": [{ "reaction": ionization(), "info": [cross_section()] }]
    })
}

fn version_info(version: u32, status: &str) -> Value {
    json!({
        "version": version,
        "createdOn": "2024-03-01T12:00:00Z",
        "status": status,
        "commitMessage": "Initial upload"
    })
}

fn stored(payload: Value) -> Value {
    let species = validate_species(&payload).unwrap();
    serde_json::to_value(SerializedSpecies::new(species)).unwrap()
}

fn stored_info(key: &str, extra: Value) -> Value {
    let mut info = cross_section();
    info["_key"] = json!(key);
    info["versionInfo"] = version_info(1, "published");
    if let Value::Object(extra) = extra {
        for (name, value) in extra {
            info[name.as_str()] = value;
        }
    }
    info
}

fn contributor() -> Value {
    json!({
        "name": "Example Lab",
        "description": "Plasma physics group",
        "contact": "lab@example.org",
        "howToReference": "Cite the set name"
    })
}

fn stored_document() -> Value {
    json!({
        "_key": "set-1",
        "versionInfo": version_info(1, "published"),
        "contributor": contributor(),
        "name": "Nitrogen",
        "description": "Electron impact cross sections",
        "complete": true,
        "references": { "phelps": { "id": "phelps", "type": "article-journal" } },
        "states": { "e": stored(electron()), "N2": stored(nitrogen()), "N2+": stored(nitrogen_ion()) },
        "processes": [{ "reaction": ionization(), "info": [stored_info("info-1", json!({}))] }]
    })
}

fn mixture(is_part_of: &str) -> Value {
    json!({
        "sets": {
            "set-1": {
                "_key": "set-1",
                "versionInfo": version_info(2, "published"),
                "contributor": contributor(),
                "name": "Nitrogen",
                "description": "",
                "complete": false
            }
        },
        "references": { "phelps": { "id": "phelps", "type": "article-journal" } },
        "states": { "e": stored(electron()), "N2": stored(nitrogen()), "N2+": stored(nitrogen_ion()) },
        "processes": [{
            "reaction": ionization(),
            "info": [stored_info("info-1", json!({ "isPartOf": [is_part_of] }))]
        }]
    })
}

fn draft_content(keyed_info: bool) -> DraftContent {
    let mut payload = new_document();
    if keyed_info {
        payload["processes"][0]["info"][0]["_key"] = json!("info-1");
    }
    validate_edited_document(&payload).unwrap().item().clone()
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_create_starts_at_version_one() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), None);
    assert_eq!(draft.key(), "doc-1");
    assert_eq!(draft.version(), 1);
    assert_eq!(draft.status(), Status::Draft);
    assert!(draft.version_info().commit_message.is_none());
}

#[test]
fn test_publish_requires_commit_message() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), None);

    assert_eq!(publish(&draft, None, None).unwrap_err(), LifecycleError::MissingCommitMessage);
    assert_eq!(publish(&draft, None, Some("  ")).unwrap_err(), LifecycleError::MissingCommitMessage);

    let publication = publish(&draft, None, Some("Initial upload")).unwrap();
    assert_eq!(publication.published.status(), Status::Published);
    assert_eq!(
        publication.published.version_info().commit_message.as_deref(),
        Some("Initial upload")
    );
    assert!(publication.archived.is_none());
    assert_eq!(draft.status(), Status::Draft);
}

#[test]
fn test_publish_uses_draft_message() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("Add argon".into()));
    let publication = publish(&draft, None, None).unwrap();
    assert_eq!(publication.published.version_info().commit_message.as_deref(), Some("Add argon"));
}

#[test]
fn test_publish_archives_previous_version() {
    let mut keys = SequentialKeySource::new("doc");
    let first = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));
    let first = publish(&first, None, None).unwrap().published;

    let second = derive_draft(&first, header("Argon II"), &mut keys, at("2024-02-01T00:00:00Z"), None).unwrap();
    assert_eq!(second.key(), "doc-2");
    assert_eq!(second.version(), 2);
    assert_eq!(second.status(), Status::Draft);

    let publication = publish(&second, Some(&first), Some("Fix thresholds")).unwrap();
    assert_eq!(publication.published.version(), 2);
    let archived = publication.archived.unwrap();
    assert_eq!(archived.key(), "doc-1");
    assert_eq!(archived.status(), Status::Archived);
    assert_eq!(archived.body(), first.body());

    assert_eq!(first.status(), Status::Published);
}

#[test]
fn test_only_publish_from_draft() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));

    let err = retract(&draft, "wrong data").unwrap_err();
    assert_eq!(
        err,
        LifecycleError::InvalidTransition {
            from: Status::Draft,
            action: ActionKind::Retract
        }
    );
    assert_eq!(err.to_string(), "Cannot retract a draft version");

    let err = derive_draft(&draft, header("Argon"), &mut keys, at("2024-01-02T00:00:00Z"), None).unwrap_err();
    assert_eq!(err.to_string(), "Cannot derive a draft from a draft version");

    let published = publish(&draft, None, None).unwrap().published;
    assert_eq!(
        publish(&published, None, Some("again")).unwrap_err(),
        LifecycleError::InvalidTransition {
            from: Status::Published,
            action: ActionKind::Publish
        }
    );
}

#[test]
fn test_retract_requires_message() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));
    let published = publish(&draft, None, None).unwrap().published;

    assert_eq!(retract(&published, "").unwrap_err(), LifecycleError::MissingRetractMessage);

    let retracted = retract(&published, "Thresholds were wrong").unwrap();
    assert_eq!(retracted.status(), Status::Retracted);
    assert_eq!(
        retracted.version_info().retract_message.as_deref(),
        Some("Thresholds were wrong")
    );
    assert_eq!(retracted.version(), published.version());
}

#[test]
fn test_terminal_states_only_derive_drafts() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));
    let published = publish(&draft, None, None).unwrap().published;
    let retracted = retract(&published, "superseded").unwrap();

    assert!(retracted.status().is_terminal());
    assert!(matches!(
        retract(&retracted, "again").unwrap_err(),
        LifecycleError::InvalidTransition {
            from: Status::Retracted,
            ..
        }
    ));

    let derived = derive_draft(&retracted, header("Argon"), &mut keys, at("2024-03-01T00:00:00Z"), None).unwrap();
    assert_eq!(derived.version(), 2);
    assert_eq!(retracted.status(), Status::Retracted);
}

#[test]
fn test_last_version_has_no_successor() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));
    let mut published = publish(&draft, None, None).unwrap().published;
    published.version_info.version = u32::MAX;

    let err = derive_draft(&published, header("Argon"), &mut keys, at("2024-02-01T00:00:00Z"), None).unwrap_err();
    assert_eq!(err, LifecycleError::VersionOverflow(u32::MAX));
    assert_eq!(err.to_string(), "Version 4294967295 has no successor");
    // No key is spent on a failed derivation
    assert_eq!(keys.next_key(), "doc-2");

    published.version_info.version = u32::MAX - 1;
    let derived = derive_draft(&published, header("Argon"), &mut keys, at("2024-02-01T00:00:00Z"), None).unwrap();
    assert_eq!(derived.version(), u32::MAX);
}

#[test]
fn test_previous_must_be_published_predecessor() {
    let mut keys = SequentialKeySource::new("doc");
    let first = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));
    let second = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));

    assert_eq!(
        publish(&second, Some(&first), None).unwrap_err(),
        LifecycleError::InvalidTransition {
            from: Status::Draft,
            action: ActionKind::Archive
        }
    );

    let first = publish(&first, None, None).unwrap().published;
    assert_eq!(
        publish(&second, Some(&first), None).unwrap_err(),
        LifecycleError::NotPredecessor { previous: 1, draft: 1 }
    );
}

#[test]
fn test_only_drafts_are_editable() {
    let mut keys = SequentialKeySource::new("doc");
    let mut draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), None);

    draft.edit().unwrap().complete = true;
    update_draft(&mut draft, header("Neon"), at("2024-01-05T00:00:00Z"), Some("Rename".into())).unwrap();
    assert_eq!(draft.body().name, "Neon");
    assert_eq!(draft.version_info().created_on, at("2024-01-05T00:00:00Z"));
    assert_eq!(draft.key(), "doc-1");

    let mut published = publish(&draft, None, None).unwrap().published;
    assert_eq!(
        published.edit().unwrap_err(),
        LifecycleError::InvalidTransition {
            from: Status::Published,
            action: ActionKind::Edit
        }
    );
}

#[test]
fn test_publish_requires_keyed_infos() {
    let mut keys = SequentialKeySource::new("info");
    let mut draft = create(draft_content(false), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));

    assert_eq!(
        publish(&draft, None, None).unwrap_err(),
        LifecycleError::UnresolvedKeys(vec!["processes[0].info[0]".to_string()])
    );

    draft.edit().unwrap().body.assign_keys(&mut keys);
    let published = publish(&draft, None, None).unwrap().published;
    assert_eq!(published.body().body.processes[0].info[0].key(), Some("info-2"));
}

#[test]
fn test_kept_keys_survive_edits() {
    let content = draft_content(true);
    assert!(content.unresolved_keys().is_empty());
    assert_eq!(content.body.processes[0].info[0].key(), Some("info-1"));
}

#[test]
fn test_key_assigned_exactly_once() {
    let mut keys = SequentialKeySource::new("k");
    let mut entity = PartialKeyed::unkeyed("N2");
    assert_eq!(entity.key(), None);
    assert_eq!(entity.assign_key(&mut keys), "k-1");
    assert_eq!(entity.assign_key(&mut keys), "k-1");

    let keyed = PartialKeyed::keyed("fixed", "Ar").into_keyed(&mut keys);
    assert_eq!(keyed.key(), "fixed");
    assert_eq!(keys.next_key(), "k-2");
}

#[test]
fn test_uuid_keys_are_unique() {
    let mut keys = UuidKeySource;
    let first = keys.next_key();
    let second = keys.next_key();
    assert_eq!(first.len(), 32);
    assert_ne!(first, second);
}

#[test]
fn test_transition_dispatch() {
    let mut keys = SequentialKeySource::new("doc");
    let draft = create(header("Argon"), &mut keys, at("2024-01-01T00:00:00Z"), Some("v1".into()));

    let action = Action::Publish {
        commit_message: None,
        previous: None,
    };
    assert_eq!(action.kind(), ActionKind::Publish);
    let context = TransitionContext {
        now: at("2024-01-02T00:00:00Z"),
        keys: &mut keys,
    };
    let published = transition(&draft, action, context).unwrap().document;
    assert_eq!(published.status(), Status::Published);

    let context = TransitionContext {
        now: at("2024-01-03T00:00:00Z"),
        keys: &mut keys,
    };
    let derived = transition(
        &published,
        Action::DeriveDraft {
            body: header("Argon"),
            commit_message: Some("Extend range".into()),
        },
        context,
    )
    .unwrap();
    assert_eq!(derived.document.version(), 2);
    assert_eq!(derived.document.key(), "doc-2");
    assert_eq!(derived.document.version_info().created_on, at("2024-01-03T00:00:00Z"));
    assert!(derived.archived.is_none());

    let context = TransitionContext {
        now: at("2024-01-04T00:00:00Z"),
        keys: &mut keys,
    };
    let result = transition(
        &derived.document,
        Action::Retract {
            retract_message: "no".into(),
        },
        context,
    );
    assert!(matches!(result, Err(LifecycleError::InvalidTransition { .. })));
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn test_new_document() {
    let document = validate_new_document(&new_document()).unwrap();
    assert_eq!(document.header.name, "Nitrogen");
    assert_eq!(document.body.states.len(), 3);
    assert_eq!(document.body.processes[0].reaction.to_string(), "e + N2 -> 2e + N2+");
    assert_eq!(document.body.references["phelps"].extra["volume"], json!("12"));

    let reparsed = validate_new_document(&serde_json::to_value(&document).unwrap()).unwrap();
    assert_eq!(reparsed, document);
}

#[test]
fn test_dangling_keys_are_reported() {
    let mut payload = new_document();
    payload["publishedIn"] = json!("biagi");
    payload["processes"][0]["reaction"]["lhs"][1]["state"] = json!("Ar");
    payload["processes"][0]["info"][0]["references"] = json!(["phelps", "nobody"]);

    let errors = validate_new_document(&payload).unwrap_err();
    assert!(errors.iter().all(|e| e.kind == ErrorKind::ReferentialIntegrity));
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "processes[0].reaction.lhs[1].state",
            "publishedIn",
            "processes[0].info[0].references[1]"
        ]
    );
}

#[test]
fn test_structural_errors_skip_relations() {
    let mut payload = new_document();
    payload["complete"] = json!("yes");
    payload["processes"][0]["reaction"]["lhs"][1]["state"] = json!("Ar");

    let errors = validate_new_document(&payload).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].kind, ErrorKind::Structural);
    assert_eq!(errors.as_slice()[0].path.to_string(), "complete");
}

#[test]
fn test_version_info_errors() {
    let mut payload = stored_document();
    payload["versionInfo"] = json!({ "version": 0, "createdOn": "yesterday", "status": "deleted" });

    let errors = validate_document(&payload).unwrap_err();
    let found: Vec<(String, ErrorKind)> = errors.iter().map(|e| (e.path.to_string(), e.kind)).collect();
    assert_eq!(
        found,
        vec![
            ("versionInfo.version".to_string(), ErrorKind::Structural),
            ("versionInfo.createdOn".to_string(), ErrorKind::Structural),
            ("versionInfo.status".to_string(), ErrorKind::UnknownVariant),
        ]
    );
}

#[test]
fn test_stored_document() {
    let document = validate_document(&stored_document()).unwrap();
    assert_eq!(document.key(), "set-1");
    assert_eq!(document.status(), Status::Published);
    assert_eq!(document.body().header.contributor.contact, "lab@example.org");
    assert_eq!(document.body().body.states["N2"].summary(), "N2{X^1S_g^+}");

    let info = &document.body().body.processes[0].info[0];
    assert_eq!(info.key(), "info-1");
    assert_eq!(info.version(), 1);
    assert!(document.unresolved_keys().is_empty());
}

#[test]
fn test_mixture() {
    let decoded = validate_mixture(&mixture("set-1")).unwrap();
    assert_eq!(decoded.sets["set-1"].version(), 2);
    assert_eq!(decoded.body.processes[0].info[0].body().is_part_of, vec!["set-1".to_string()]);

    let errors = validate_mixture(&mixture("set-2")).unwrap_err();
    assert_eq!(errors.len(), 1);
    let error = &errors.as_slice()[0];
    assert_eq!(error.kind, ErrorKind::ReferentialIntegrity);
    assert_eq!(error.path.to_string(), "processes[0].info[0].isPartOf[0]");
}

#[test]
fn test_json_helpers() {
    let json = to_json(&validate_document(&stored_document()).unwrap()).unwrap();
    let document = document_from_json(&json).unwrap();
    assert_eq!(document.key(), "set-1");

    assert!(matches!(document_from_json("{"), Err(DocumentError::JsonError(_))));
    assert!(matches!(mixture_from_json("{}"), Err(DocumentError::ValidationError(_))));
    assert!(matches!(
        new_document_from_json(&new_document().to_string()),
        Ok(document) if document.header.name == "Nitrogen"
    ));
}
