// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use regex::RegexBuilder;

use crate::model::{Element, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSearchMode {
    Substring,
    Regex,
}

/// Live text elements whose text matches `needle`, in paint order.
pub fn text_search<'a>(
    scene: &'a Scene,
    needle: &str,
    mode: TextSearchMode,
    case_insensitive: bool,
) -> Result<Vec<&'a Element>, regex::Error> {
    let texts = scene.live_elements().filter_map(|el| el.text_data().map(|data| (el, data)));
    match mode {
        TextSearchMode::Substring => {
            if case_insensitive {
                let needle_lower = needle.to_lowercase();
                Ok(texts
                    .filter(|(_, data)| data.text.to_lowercase().contains(&needle_lower))
                    .map(|(el, _)| el)
                    .collect())
            } else {
                Ok(texts.filter(|(_, data)| data.text.contains(needle)).map(|(el, _)| el).collect())
            }
        }
        TextSearchMode::Regex => {
            let regex = RegexBuilder::new(needle).case_insensitive(case_insensitive).build()?;
            Ok(texts.filter(|(_, data)| regex.is_match(&data.text)).map(|(el, _)| el).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{text_search, TextSearchMode};
    use crate::model::{Element, Scene};

    #[fixture]
    fn scene() -> Scene {
        let mut scene = Scene::default();
        scene.elements.push(Element::text(0.0, 0.0, "Load balancer", 20.0));
        scene.elements.push(Element::rectangle(0.0, 40.0, 100.0, 100.0));
        scene.elements.push(Element::text(0.0, 200.0, "database primary", 20.0));
        let mut gone = Element::text(0.0, 300.0, "old database", 20.0);
        gone.mark_deleted();
        scene.elements.push(gone);
        scene
    }

    fn texts(found: &[&Element]) -> Vec<String> {
        found.iter().filter_map(|el| el.text_data()).map(|data| data.text.clone()).collect()
    }

    #[rstest]
    #[case::exact_case("database", false, &["database primary"])]
    #[case::wrong_case("LOAD", false, &[])]
    #[case::ignore_case("LOAD", true, &["Load balancer"])]
    #[case::empty_needle("", false, &["Load balancer", "database primary"])]
    fn substring_search(
        scene: Scene,
        #[case] needle: &str,
        #[case] case_insensitive: bool,
        #[case] expected: &[&str],
    ) {
        let found = text_search(&scene, needle, TextSearchMode::Substring, case_insensitive)
            .expect("substring search");
        assert_eq!(texts(&found), expected);
    }

    #[rstest]
    fn regex_search_skips_tombstones(scene: Scene) {
        let found = text_search(&scene, r"^(load|data)", TextSearchMode::Regex, true)
            .expect("regex search");
        assert_eq!(texts(&found), ["Load balancer", "database primary"]);
    }

    #[rstest]
    fn invalid_regex_is_an_error(scene: Scene) {
        text_search(&scene, "(", TextSearchMode::Regex, false).unwrap_err();
    }
}
