//! Shared fixtures for the integration tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `content` at `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("relative path has a parent"))
        .expect("Failed to create parent directories");
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}

/// Two blogs, one with inherited metadata, three dated articles and a
/// non-article page
pub fn create_site() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let base = temp.path();

    write_file(
        base,
        "axiomata/_metadata.yml",
        "author:\n  - name: Edison Achalma\n    email: achalmaedison@gmail.com\ncitation: true\nlicense: CC BY-SA\n",
    );
    write_file(
        base,
        "axiomata/posts/2024-01-15-pobreza/index.qmd",
        r#"---
title: "Pobreza: un análisis regional"
date: 2024-01-15
draft: false
description: Medición de la pobreza monetaria
keywords: [pobreza, desigualdad]
tags:
  - economia
  - pobreza
citation:
  type: article-journal
  container-title: Revista Andina
links:
  - icon: github
    href: https://github.com/achalmed
---

## Introducción

La pobreza es multidimensional.
"#,
    );
    write_file(
        base,
        "axiomata/posts/2024-03-02-inflacion/index.qmd",
        "---\ntitle: Inflación\ndate: 2024-03-02\ndraft: true\ncourse: Macroeconomía\nprofessor: Dr. Quispe\n---\n\nCuerpo.\n",
    );
    write_file(
        base,
        "axiomata/posts/2024-03-02-inflacion/notas.qmd",
        "---\ntitle: Not an article\n---\n",
    );
    write_file(
        base,
        "numerus/2023-11-20-regresion/index.qmd",
        "---\ntitle: Regresión lineal\nauthor:\n  - name: Ana Torres\n    orcid: 0000-0002-1825-0097\n    corresponding: true\n    affiliations:\n      - name: Universidad Nacional\n        city: Ayacucho\ndocumentmode: man\nnumbered-lines: true\n---\n\nTexto.\n",
    );
    write_file(base, "numerus/about/index.qmd", "---\ntitle: About\n---\n");

    temp
}
