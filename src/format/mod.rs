// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scene wire format.
//!
//! Scenes travel as Excalidraw-compatible JSON envelopes:
//! `{ type, version, source, elements, appState, files }`. Decoding validates required fields
//! and reports the offending field path; keys the model does not know are carried through.

pub mod scene_json;

pub use scene_json::{
    decode_payload, encode_payload, parse_payload, to_json_string, Problem, ValidationError,
};
