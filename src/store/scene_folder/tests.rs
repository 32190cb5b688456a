// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{
    decode_persisted_id_segment, encode_persisted_id_segment, SceneFolder, StoreError,
    WriteDurability,
};
use crate::format::{parse_payload, Problem};
use crate::model::{ContextId, Element, Scene, SceneId, ScenePayload};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("scenepad-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct SceneFolderTestCtx {
    _tmp: TempDir,
    folder: SceneFolder,
    context: ContextId,
}

impl SceneFolderTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let folder = SceneFolder::new(tmp.path().join("workspace"));
        Self { _tmp: tmp, folder, context: ContextId::new("conv-1").unwrap() }
    }
}

#[fixture]
fn ctx() -> SceneFolderTestCtx {
    SceneFolderTestCtx::new("scene-folder")
}

fn rect_payload(name: Option<&str>) -> ScenePayload {
    let mut scene = Scene::default();
    scene.elements.push(Element::rectangle(0.0, 0.0, 100.0, 100.0));
    scene.app_state.name = name.map(str::to_owned);
    ScenePayload::new(scene, "test")
}

#[rstest]
fn save_mints_prefixed_id_and_load_round_trips(ctx: SceneFolderTestCtx) {
    let payload = rect_payload(Some("Sketch"));
    let scene_id = ctx.folder.save_scene(&ctx.context, None, &payload).unwrap();
    assert!(scene_id.as_str().starts_with("excalidraw_"));
    assert!(ctx.folder.scene_path(&scene_id).is_file());
    assert!(ctx.folder.scene_meta_path(&scene_id).is_file());

    let loaded = ctx.folder.load_scene(&scene_id).unwrap();
    assert_eq!(loaded, payload);
    let el = &loaded.scene.elements[0];
    assert_eq!(el.type_tag(), "rectangle");
    assert_eq!((el.x, el.y), (0.0, 0.0));
}

#[rstest]
fn saving_under_an_existing_id_keeps_identity_and_creation_time(ctx: SceneFolderTestCtx) {
    let first = ctx.folder.save_scene(&ctx.context, None, &rect_payload(None)).unwrap();
    let created = ctx.folder.list_scenes(&ctx.context).unwrap()[0].created_at;

    std::thread::sleep(std::time::Duration::from_millis(5));
    let second =
        ctx.folder.save_scene(&ctx.context, Some(&first), &rect_payload(Some("Renamed"))).unwrap();
    assert_eq!(first, second);

    let listed = ctx.folder.list_scenes(&ctx.context).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].created_at, created);
    assert!(listed[0].updated_at > created);
    assert_eq!(listed[0].name.as_deref(), Some("Renamed"));
}

#[rstest]
fn list_for_fresh_context_is_empty(ctx: SceneFolderTestCtx) {
    assert!(ctx.folder.list_scenes(&ctx.context).unwrap().is_empty());
}

#[rstest]
fn list_filters_by_context_and_sorts_newest_first(ctx: SceneFolderTestCtx) {
    let other = ContextId::new("conv-2").unwrap();
    let older = ctx.folder.save_scene(&ctx.context, None, &rect_payload(Some("old"))).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let newer = ctx.folder.save_scene(&ctx.context, None, &rect_payload(Some("new"))).unwrap();
    ctx.folder.save_scene(&other, None, &rect_payload(Some("elsewhere"))).unwrap();

    let listed = ctx.folder.list_scenes(&ctx.context).unwrap();
    let ids: Vec<&SceneId> = listed.iter().map(|info| &info.scene_id).collect();
    assert_eq!(ids, vec![&newer, &older]);
    assert_eq!(listed[0].element_count, 1);
    assert_eq!(listed[0].context_id.as_ref(), Some(&ctx.context));
}

#[rstest]
fn documents_without_sidecar_are_listed_for_every_context(ctx: SceneFolderTestCtx) {
    let scene_id = SceneId::new("hand-made").unwrap();
    let payload = rect_payload(Some("dropped in"));
    std::fs::create_dir_all(ctx.folder.scenes_dir()).unwrap();
    let json = crate::format::to_json_string(&payload).expect("encode");
    std::fs::write(ctx.folder.scene_path(&scene_id), json).unwrap();

    let listed = ctx.folder.list_scenes(&ctx.context).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].scene_id, scene_id);
    assert_eq!(listed[0].name.as_deref(), Some("dropped in"));
}

#[rstest]
fn unreadable_entries_are_skipped(ctx: SceneFolderTestCtx) {
    ctx.folder.save_scene(&ctx.context, None, &rect_payload(None)).unwrap();
    std::fs::write(ctx.folder.scenes_dir().join("broken.json"), "{").unwrap();
    assert_eq!(ctx.folder.list_scenes(&ctx.context).unwrap().len(), 1);
}

#[rstest]
fn load_missing_scene_is_not_found(ctx: SceneFolderTestCtx) {
    let missing = SceneId::new("nope").unwrap();
    assert!(matches!(
        ctx.folder.load_scene(&missing),
        Err(StoreError::NotFound { scene_id }) if scene_id == missing
    ));
}

#[rstest]
fn delete_removes_files_and_reports_missing(ctx: SceneFolderTestCtx) {
    let scene_id = ctx.folder.save_scene(&ctx.context, None, &rect_payload(None)).unwrap();
    ctx.folder.delete_scene(&scene_id).unwrap();
    assert!(!ctx.folder.scene_path(&scene_id).exists());
    assert!(ctx.folder.list_scenes(&ctx.context).unwrap().is_empty());
    assert!(matches!(ctx.folder.delete_scene(&scene_id), Err(StoreError::NotFound { .. })));
}

#[rstest]
fn import_of_export_is_structurally_equal(ctx: SceneFolderTestCtx) {
    let mut payload = rect_payload(Some("Original"));
    payload.scene.elements.push(Element::text(10.0, 10.0, "note", 20.0));
    let scene_id = ctx.folder.save_scene(&ctx.context, None, &payload).unwrap();

    let exported = ctx.folder.export_scene(&scene_id).unwrap();
    let imported_id = ctx.folder.import_scene(&ctx.context, &exported).unwrap();
    assert_ne!(imported_id, scene_id);

    let imported = ctx.folder.load_scene(&imported_id).unwrap();
    assert_eq!(imported.scene.elements, payload.scene.elements);
    assert_eq!(imported.source, "scenepad");
    assert_eq!(imported.version, 2);
}

#[rstest]
fn import_rejects_invalid_documents_with_field_path(ctx: SceneFolderTestCtx) {
    let err = ctx
        .folder
        .import_scene(&ctx.context, r#"{ "type": "excalidraw_scene", "version": 2 }"#)
        .unwrap_err();
    let source = match err {
        StoreError::Wire { source, .. } => source,
        other => panic!("expected a wire validation error, got {other:?}"),
    };
    assert_eq!(source.path(), "elements");
    assert_eq!(source.problem(), &Problem::Missing);
    assert!(ctx.folder.list_scenes(&ctx.context).unwrap().is_empty());
}

#[rstest]
fn exported_json_is_valid_wire_document(ctx: SceneFolderTestCtx) {
    let scene_id = ctx.folder.save_scene(&ctx.context, None, &rect_payload(None)).unwrap();
    let exported = ctx.folder.export_scene(&scene_id).unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value["type"], "excalidraw_scene");
    assert!(parse_payload(&exported).is_ok());
}

#[rstest]
fn image_exports_are_written_and_listed(ctx: SceneFolderTestCtx) {
    let scene_id = SceneId::new("scene-1").unwrap();
    let info = ctx
        .folder
        .save_export_image(&scene_id, "data:image/png;base64,iVBORw0KGgo=")
        .unwrap();
    assert!(info.filename.starts_with("excalidraw_scene-1_"));
    assert!(info.filename.ends_with(".png"));
    assert_eq!(std::fs::read(&info.path).unwrap().len() as u64, info.size);

    let other = SceneId::new("scene-2").unwrap();
    ctx.folder.save_export_image(&other, "iVBORw0KGgo=").unwrap();

    let mine = ctx.folder.list_exports(Some(&scene_id)).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].filename, info.filename);
    assert_eq!(ctx.folder.list_exports(None).unwrap().len(), 2);
}

#[rstest]
#[case("")]
#[case("data:image/gif;base64,R0lGOD")]
#[case("data:image/png;base64")]
fn image_exports_reject_bad_payloads(ctx: SceneFolderTestCtx, #[case] data: &str) {
    let scene_id = SceneId::new("scene-1").unwrap();
    assert!(matches!(
        ctx.folder.save_export_image(&scene_id, data),
        Err(StoreError::InvalidImage { .. })
    ));
}

#[rstest]
fn image_exports_reject_bad_base64(ctx: SceneFolderTestCtx) {
    let scene_id = SceneId::new("scene-1").unwrap();
    assert!(matches!(
        ctx.folder.save_export_image(&scene_id, "data:image/png;base64,@@@"),
        Err(StoreError::Base64 { .. })
    ));
}

#[rstest]
fn durable_writes_produce_the_same_files(ctx: SceneFolderTestCtx) {
    let folder = ctx.folder.clone().with_durability(WriteDurability::Durable);
    assert_eq!(folder.durability(), WriteDurability::Durable);
    let scene_id = folder.save_scene(&ctx.context, None, &rect_payload(None)).unwrap();
    assert!(folder.load_scene(&scene_id).is_ok());
}

#[cfg(unix)]
#[rstest]
fn writes_refuse_symlinked_scene_files(ctx: SceneFolderTestCtx) {
    let scene_id = SceneId::new("linked").unwrap();
    std::fs::create_dir_all(ctx.folder.scenes_dir()).unwrap();
    let target = ctx.folder.root().join("elsewhere.json");
    std::fs::write(&target, "{}").unwrap();
    std::os::unix::fs::symlink(&target, ctx.folder.scene_path(&scene_id)).unwrap();

    let err =
        ctx.folder.save_scene(&ctx.context, Some(&scene_id), &rect_payload(None)).unwrap_err();
    assert!(matches!(err, StoreError::SymlinkRefused { .. }));
}

#[test]
fn unsafe_ids_are_encoded_reversibly() {
    for raw in ["a/b", "CON", "~tilde", ".hidden", "trailing.", "plain-id"] {
        let encoded = encode_persisted_id_segment(raw);
        assert!(!encoded.contains('/'));
        assert_eq!(decode_persisted_id_segment(&encoded), raw);
    }
    assert_eq!(encode_persisted_id_segment("plain-id"), "plain-id");
}
