// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Catalog fixtures.

use curriculum_core::{CatalogRow, Workload};

/// Four courses, `A -> B`, `A -> C`, `B -> D`, `C -> D`.
///
/// Depths are `A = 0`, `B = C = 1`, `D = 2`.
pub fn diamond_catalog() -> Vec<CatalogRow> {
    vec![
        CatalogRow::new("A", "Foundations", ""),
        CatalogRow::new("B", "Left Branch", "Foundations"),
        CatalogRow::new("C", "Right Branch", "Foundations"),
        CatalogRow::new("D", "Capstone", "Left Branch; Right Branch"),
    ]
}

/// A catalog whose recommendations form the loop `A -> B -> C -> A`, plus a
/// dependent `D` hanging off `C` and a row without a code.
pub fn cyclic_catalog() -> Vec<CatalogRow> {
    vec![
        CatalogRow::new("A", "Alpha", "Gamma"),
        CatalogRow::new("B", "Beta", "Alpha"),
        CatalogRow::new("C", "Gamma", "Beta"),
        CatalogRow::new("D", "Delta", "Gamma; Unknown Course"),
        CatalogRow {
            code: None,
            name: "Uncoded".to_owned(),
            recommendation: Some("Alpha".to_owned()),
            workload: None,
        },
    ]
}

/// Real-world style codes with accented names and recommendation text that
/// differs from the names only by case, accents and spacing. Every row
/// carries a TPEI workload.
pub fn accented_catalog() -> Vec<CatalogRow> {
    vec![
        CatalogRow::new("BCM0504-15", "Natureza da Informação", "")
            .with_workload(Workload::new(3, 0, 0, 4)),
        CatalogRow::new("BCN0402-15", "Funções de Uma Variável", "")
            .with_workload(Workload::new(4, 0, 0, 6)),
        CatalogRow::new(
            "BCN0407-15",
            "Funções de Várias Variáveis",
            "funcoes de uma variavel",
        )
        .with_workload(Workload::new(4, 0, 0, 4)),
        CatalogRow::new(
            "MCTA0001-17",
            "Álgebra Linear",
            "FUNÇÕES DE  UMA VARIÁVEL ; Natureza da Informacao",
        )
        .with_workload(Workload::new(6, 0, 0, 5)),
    ]
}

/// Code of the `index`-th course on `level` of a [`layered_catalog`].
pub fn layered_code(level: usize, index: usize) -> String {
    format!("L{level:02}C{index:03}")
}

/// Name of the `index`-th course on `level` of a [`layered_catalog`].
pub fn layered_name(level: usize, index: usize) -> String {
    format!("Level {level} Course {index}")
}

/// Synthetic catalog of `levels * width` courses.
///
/// Every course above level 0 recommends two courses of the level below
/// (`index` and `(index * 7 + 3) % width`), so the graph is acyclic and the
/// depth of a course equals its level.
pub fn layered_catalog(levels: usize, width: usize) -> Vec<CatalogRow> {
    let mut rows = Vec::with_capacity(levels * width);
    for level in 0..levels {
        for index in 0..width {
            let recommendation = if level == 0 {
                String::new()
            } else {
                let other = (index * 7 + 3) % width;
                format!(
                    "{}; {}",
                    layered_name(level - 1, index),
                    layered_name(level - 1, other)
                )
            };
            let workload = Workload::new(
                u32::try_from(2 + index % 3).unwrap_or(2),
                u32::try_from(level % 2).unwrap_or(0),
                0,
                4,
            );
            rows.push(
                CatalogRow::new(
                    &layered_code(level, index),
                    &layered_name(level, index),
                    &recommendation,
                )
                .with_workload(workload),
            );
        }
    }
    rows
}
