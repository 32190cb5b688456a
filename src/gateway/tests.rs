// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{FolderGateway, GatewayError, MemoryGateway, PersistenceGateway};
use crate::format::{Problem, ValidationError};
use crate::model::{ContextId, Element, Scene, SceneId, ScenePayload};
use crate::store::{SceneFolder, StoreError};

fn context(raw: &str) -> ContextId {
    ContextId::new(raw).unwrap()
}

fn rect_payload(name: &str) -> ScenePayload {
    let mut scene = Scene::default();
    scene.elements.push(Element::rectangle(0.0, 0.0, 100.0, 100.0));
    scene.app_state.name = Some(name.to_owned());
    ScenePayload::new(scene, "test")
}

#[tokio::test]
async fn memory_save_then_load_round_trips() {
    let gateway = MemoryGateway::new();
    let ctx = context("conv-1");
    let payload = rect_payload("one");

    let scene_id = gateway.save(&ctx, None, &payload).await.unwrap();
    assert!(!scene_id.as_str().is_empty());
    let loaded = gateway.load(&scene_id).await.unwrap();
    assert_eq!(loaded, payload);
    assert_eq!(loaded.scene.elements[0].type_tag(), "rectangle");
}

#[tokio::test]
async fn memory_list_is_scoped_and_newest_first() {
    let gateway = MemoryGateway::new();
    let ctx = context("conv-1");
    assert!(gateway.list(&ctx).await.unwrap().is_empty());

    let first = gateway.save(&ctx, None, &rect_payload("first")).await.unwrap();
    let second = gateway.save(&ctx, None, &rect_payload("second")).await.unwrap();
    gateway.save(&context("other"), None, &rect_payload("elsewhere")).await.unwrap();

    let listed = gateway.list(&ctx).await.unwrap();
    let ids: Vec<&SceneId> = listed.iter().map(|info| &info.scene_id).collect();
    assert_eq!(ids, vec![&second, &first]);

    gateway.save(&ctx, Some(&first), &rect_payload("first again")).await.unwrap();
    let listed = gateway.list(&ctx).await.unwrap();
    assert_eq!(listed[0].scene_id, first);
    assert_eq!(listed[0].name.as_deref(), Some("first again"));
    assert!(listed[0].updated_at > listed[0].created_at);
}

#[tokio::test]
async fn memory_missing_scenes_are_not_found() {
    let gateway = MemoryGateway::new();
    let missing = SceneId::new("missing").unwrap();
    assert_eq!(
        gateway.load(&missing).await.unwrap_err(),
        GatewayError::NotFound { scene_id: missing.clone() }
    );
    assert!(matches!(gateway.delete(&missing).await, Err(GatewayError::NotFound { .. })));
    assert!(matches!(gateway.export(&missing).await, Err(GatewayError::NotFound { .. })));
}

#[tokio::test]
async fn memory_import_of_export_matches_elements() {
    let gateway = MemoryGateway::new();
    let ctx = context("conv-1");
    let payload = rect_payload("source");
    let scene_id = gateway.save(&ctx, None, &payload).await.unwrap();

    let json = gateway.export(&scene_id).await.unwrap();
    let imported = gateway.import(&ctx, &json).await.unwrap();
    assert_ne!(imported, scene_id);
    let loaded = gateway.load(&imported).await.unwrap();
    assert_eq!(loaded.scene.elements, payload.scene.elements);
    assert_eq!(loaded.source, "scenepad");
    assert_eq!(gateway.len(), 2);
}

#[tokio::test]
async fn memory_import_reports_the_offending_field() {
    let gateway = MemoryGateway::new();
    let err = gateway
        .import(&context("conv-1"), r#"{"type":"excalidraw_scene","elements":[{"id":"a"}]}"#)
        .await
        .unwrap_err();
    let GatewayError::Validation(err) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(err.path(), "elements[0].type");
    assert_eq!(err.problem(), &Problem::Missing);
    assert!(gateway.is_empty());
}

#[tokio::test]
async fn folder_gateway_maps_store_errors() {
    let dir = std::env::temp_dir().join(format!(
        "scenepad-gateway-{}-{}",
        std::process::id(),
        crate::model::unix_millis()
    ));
    let gateway = FolderGateway::new(SceneFolder::new(&dir));
    let ctx = context("conv-1");

    let scene_id = gateway.save(&ctx, None, &rect_payload("on disk")).await.unwrap();
    assert_eq!(gateway.list(&ctx).await.unwrap().len(), 1);
    assert!(gateway.folder().scene_path(&scene_id).is_file());
    gateway.delete(&scene_id).await.unwrap();
    assert!(matches!(gateway.load(&scene_id).await, Err(GatewayError::NotFound { .. })));
    assert!(matches!(
        gateway.import(&ctx, "not json").await,
        Err(GatewayError::Validation(_))
    ));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn store_errors_convert_by_kind() {
    let missing = SceneId::new("gone").unwrap();
    assert_eq!(
        GatewayError::from(StoreError::NotFound { scene_id: missing.clone() }),
        GatewayError::NotFound { scene_id: missing }
    );
    let invalid = ValidationError::new("elements", Problem::Missing);
    assert_eq!(
        GatewayError::from(StoreError::Wire { path: None, source: invalid.clone() }),
        GatewayError::Validation(invalid)
    );
    let io = StoreError::SymlinkRefused { path: "x".into() };
    assert!(matches!(GatewayError::from(io), GatewayError::Persistence { .. }));
}
