// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use scenepad::model::{Element, Point, Scene};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("scenepad_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create bench temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::Medium => "medium",
            Case::Large => "large",
        }
    }

    fn side(self) -> usize {
        match self {
            Case::Small => 4,
            Case::Medium => 16,
            Case::Large => 40,
        }
    }
}

/// A `side × side` grid of cells; each cell holds a shape, its label, and an arrow to the right.
pub fn scene(case: Case) -> Scene {
    let side = case.side();
    let mut scene = Scene::default();
    scene.elements.reserve(side * side * 3);

    for row in 0..side {
        for col in 0..side {
            let x = col as f64 * 200.0;
            let y = row as f64 * 120.0;
            let shape = if (row + col) % 2 == 0 {
                Element::rectangle(x, y, 120.0, 60.0)
            } else {
                Element::ellipse(x, y, 120.0, 60.0)
            };
            scene.elements.push(shape);
            scene.elements.push(Element::text(x + 10.0, y + 20.0, format!("n{row}_{col}"), 20.0));

            let mut arrow = Element::linear(x + 120.0, y + 30.0, true);
            arrow.push_point(Point::new(x + 120.0, y + 30.0), None);
            arrow.push_point(Point::new(x + 200.0, y + 30.0), None);
            scene.elements.push(arrow);
        }
    }
    scene
}
