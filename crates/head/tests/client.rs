use head::{AttrList, HeadConfig, HeadManager, Phase, PropBag, TagDescriptor};
use html::{Document, DomPatch, DomStore, Node};
use std::sync::{Arc, Mutex};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn head_html(store: &DomStore) -> String {
    let root = store.materialize().expect("materialize");
    let head = html::traverse::find_element(&root, "head").expect("head");
    html::to_html(head.children())
}

fn meta(name: &str, content: &str) -> TagDescriptor {
    TagDescriptor::new().attr("name", name).attr("content", content)
}

#[test]
fn document_head_matches_string_output() {
    init_logging();
    let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), false);
    manager.mount(
        PropBag::new()
            .title("Inbox")
            .meta(meta("description", "mail"))
            .link(TagDescriptor::new().attr("rel", "icon").attr("href", "/i.png")),
    );
    let child = manager.mount(PropBag::new().title("Inbox (3)").meta(meta("description", "3 unread")));

    let state = manager.peek();
    let store = manager.document().expect("document");
    assert_eq!(head_html(store), state.head_markup());
    let root = store.materialize().expect("materialize");
    assert_eq!(html::traverse::find_elements(&root, "title").len(), 1);
    assert_eq!(html::traverse::find_elements(&root, "meta").len(), 1);

    manager.unmount(child);
    let state = manager.peek();
    let store = manager.document().expect("document");
    assert_eq!(head_html(store), state.head_markup());
    assert_eq!(state.title_text().as_deref(), Some("Inbox"));
}

#[test]
fn unchanged_state_sends_no_patches() {
    let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), false);
    let id = manager.mount(PropBag::new().title("Same").meta(meta("a", "1")));
    let patches = manager.counters().patches;
    let version = manager.document().map(DomStore::version);

    manager.update(id, PropBag::new().title("Same").meta(meta("a", "1")));
    assert_eq!(manager.counters().patches, patches);
    assert_eq!(manager.document().map(DomStore::version), version);
    assert_eq!(manager.counters().emits, 2);
}

#[test]
fn unmanaged_html_attributes_survive_updates() {
    init_logging();
    let root = Node::Document {
        id: html::Id::INVALID,
        doctype: Some("html".to_string()),
        children: vec![Node::element(
            "html",
            vec![(Arc::from("class"), Some("no-js".to_string()))],
            vec![
                Node::element(
                    "head",
                    Vec::new(),
                    vec![Node::element(
                        "meta",
                        vec![(Arc::from("charset"), Some("utf-8".to_string()))],
                        Vec::new(),
                    )],
                ),
                Node::element("body", Vec::new(), Vec::new()),
            ],
        )],
    };
    let mut manager = HeadManager::client(HeadConfig::default(), DomStore::from_node(&root), false);
    let id = manager.mount(PropBag::new().html_attributes(AttrList::new().with("lang", "en")));
    manager.update(id, PropBag::new().html_attributes(AttrList::new().with("lang", "de")));

    let store = manager.document().expect("document");
    let html_key = store.find_element("html").expect("html");
    let attributes = store.attributes(html_key).expect("attributes");
    assert_eq!(
        attributes,
        vec![
            (Arc::from("class"), Some("no-js".to_string())),
            (Arc::from("lang"), Some("de".to_string())),
        ]
    );

    manager.unmount(id);
    let store = manager.document().expect("document");
    assert_eq!(
        store.attributes(html_key).expect("attributes"),
        vec![(Arc::from("class"), Some("no-js".to_string()))]
    );
    assert_eq!(head_html(store), r#"<meta charset="utf-8"/>"#);
}

#[test]
fn batched_manager_touches_document_once_per_commit() {
    let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), true);
    manager.mount(PropBag::new().title("a"));
    manager.mount(PropBag::new().title("b").meta(meta("x", "y")));
    assert_eq!(manager.document().map(DomStore::version), Some(0));
    assert_eq!(manager.phase(), Phase::PendingRecompute);

    manager.commit();
    assert_eq!(manager.counters().reductions, 1);
    assert_eq!(manager.document().map(DomStore::version), Some(1));
    assert_eq!(manager.phase(), Phase::Resolved);
}

#[test]
fn unmount_before_commit_never_reaches_document() {
    let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), true);
    manager.mount(PropBag::new().title("kept"));
    let transient = manager.mount(PropBag::new().meta(meta("transient", "1")));
    manager.unmount(transient);
    manager.commit();

    let store = manager.document().expect("document");
    assert_eq!(head_html(store), "<title>kept</title>");
}

#[test]
fn observer_receives_each_effective_change() {
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&log);
    let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), true);
    manager.on_change_client_state(move |state, change| {
        if let Ok(mut log) = sink.lock() {
            log.push(format!(
                "{} +{} -{}",
                state.title_text().unwrap_or_default(),
                change.added.len(),
                change.removed.len()
            ));
        }
    });

    manager.mount(PropBag::new().title("one"));
    manager.commit();
    let id = manager.mount(PropBag::new().title("two"));
    manager.commit();
    manager.unmount(id);
    manager.commit();
    manager.commit();

    assert_eq!(
        *log.lock().expect("lock"),
        vec!["one +1 -0", "two +0 -0", "one +0 -0"]
    );
}

#[test]
fn managed_marker_reaches_the_document() {
    let config = HeadConfig {
        managed_attribute: Some("data-head".to_string()),
        ..HeadConfig::default()
    };
    let mut manager = HeadManager::client(config, DomStore::new(), false);
    manager.mount(PropBag::new().meta(meta("a", "1")));
    let store = manager.document().expect("document");
    assert_eq!(
        head_html(store),
        r#"<meta data-head="true" name="a" content="1"/>"#
    );
}

#[test]
fn host_removing_a_managed_node_does_not_duplicate_the_rest() {
    init_logging();
    let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), false);
    let bag = |title: &str| PropBag::new().title(title).meta(meta("a", "1"));
    let id = manager.mount(bag("One"));

    let store = manager.document_mut().expect("document");
    let title = store.find_element("title").expect("title");
    store
        .apply(&[DomPatch::RemoveNode { key: title }])
        .expect("host removal");

    manager.update(id, bag("Two"));
    assert_eq!(manager.phase(), Phase::Resolved);
    manager.update(id, bag("Three"));

    let state = manager.peek();
    let store = manager.document().expect("document");
    assert_eq!(head_html(store), state.head_markup());
    assert_eq!(
        head_html(store),
        r#"<title>Three</title><meta name="a" content="1"/>"#
    );
    let root = store.materialize().expect("materialize");
    assert_eq!(html::traverse::find_elements(&root, "meta").len(), 1);
}
