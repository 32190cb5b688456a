// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::element::{Element, Point};
use super::scene::Scene;

/// A small built-in scene used by `--demo`: two labelled boxes joined by an arrow.
pub fn demo_scene() -> Scene {
    let mut scene = Scene::default();
    scene.app_state.name = Some("Demo".to_owned());

    let client = Element::rectangle(0.0, 0.0, 160.0, 80.0);
    let server = Element::rectangle(320.0, 0.0, 160.0, 80.0);
    let client_label = Element::text(20.0, 30.0, "client", 20.0);
    let server_label = Element::text(340.0, 30.0, "server", 20.0);
    let mut arrow = Element::linear(160.0, 40.0, true);
    arrow.push_point(Point::new(160.0, 40.0), None);
    arrow.push_point(Point::new(320.0, 40.0), None);
    let note = Element::ellipse(180.0, 140.0, 120.0, 60.0);
    let note_label = Element::text(205.0, 160.0, "requests", 20.0);

    scene.elements = vec![client, server, client_label, server_label, arrow, note, note_label];
    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_is_named_and_live() {
        let scene = demo_scene();
        assert_eq!(scene.app_state.name.as_deref(), Some("Demo"));
        assert_eq!(scene.live_count(), 7);
        assert!(scene.live_elements().filter(|el| el.text_data().is_some()).count() >= 3);
    }
}
