// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard focus navigation over a grid of buttons.
//!
//! This example shows how to combine:
//! - `understory_keynav::headless` as a stand-in for a real element tree and input system,
//! - `understory_keynav::Navigator` with the arrow and WASD handler tables,
//! - `understory_focus` navigation intents for custom keys.
//!
//! The grid has a disabled button and a hidden row, both of which are skipped.
//!
//! Run:
//! - `cargo run -p understory_demos --example keynav_grid`
//! - `RUST_LOG=trace cargo run -p understory_demos --example keynav_grid` to see dispatch.

use std::collections::HashMap;

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use understory_focus::Navigation;
use understory_keynav::headless::{ElementFlags, ElementId, HeadlessHost, KeyBus};
use understory_keynav::{ARROW_KEY_HANDLERS, Navigator, WASD_HANDLERS};

const COLUMNS: usize = 3;
const ROWS: usize = 4;
const CELL: f64 = 60.0;
const GAP: f64 = 20.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let host = HeadlessHost::new();
    let keys = KeyBus::new();
    let root = host.root();

    // One container per row so a whole row can be hidden at once.
    let mut labels: HashMap<ElementId, String> = HashMap::new();
    let mut rows = Vec::new();
    let mut grid: Vec<Vec<ElementId>> = Vec::new();
    for row in 0..ROWS {
        let y = row as f64 * (CELL + GAP);
        let container = host.insert(
            root,
            Rect::new(0.0, y, COLUMNS as f64 * (CELL + GAP), y + CELL),
            ElementFlags::empty(),
        );
        let mut cells = Vec::new();
        for col in 0..COLUMNS {
            let x = col as f64 * (CELL + GAP);
            let id = host.insert(
                container,
                Rect::new(x, y, x + CELL, y + CELL),
                ElementFlags::FOCUS_ORDER,
            );
            labels.insert(id, format!("r{row}c{col}"));
            cells.push(id);
        }
        rows.push(container);
        grid.push(cells);
    }

    // Disable the center button and hide the last row.
    host.set_flags(grid[1][1], ElementFlags::FOCUS_ORDER | ElementFlags::DISABLED);
    host.set_flags(rows[ROWS - 1], ElementFlags::HIDDEN);

    let mut navigator = Navigator::new(host.clone(), root, keys.clone());
    navigator.handle_keys(ARROW_KEY_HANDLERS);
    navigator.handle_keys(WASD_HANDLERS);
    navigator.handle_keys(&[("tab", Navigation::NEXT)]);
    navigator.setup();

    let label = |id: Option<ElementId>| {
        id.and_then(|id| labels.get(&id).cloned())
            .unwrap_or_else(|| "<none>".to_string())
    };

    for key in [
        "ArrowRight",
        "ArrowRight",
        "ArrowDown",
        "ArrowLeft",
        "ArrowLeft",
        "s",
        "s",
        "d",
        "w",
        "Tab",
        "Escape",
    ] {
        keys.press(key);
        println!("{key:>10} -> {}", label(host.active()));
    }

    navigator.destroy();
    keys.press("ArrowRight");
    println!("after destroy, focus stays on {}", label(host.active()));
}
