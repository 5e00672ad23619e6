// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading indicator lifecycle.
//!
//! Shows a spinner over a solid overlay, hides it, and feeds the finished fade-out back to the
//! dimmer the way a toolkit's animation callback would.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_dimmer_demos --example dimmer_loading`

use kurbo::Rect;
use understory_dimmer::scene::Scene;
use understory_dimmer::{ActivityStyle, Dimmer, DimmerConfig};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let host = scene.insert(None, Rect::new(0.0, 0.0, 320.0, 480.0));
    let mut dimmer = Dimmer::with_config(DimmerConfig {
        default_alpha: 0.6,
        activity_style: ActivityStyle::WhiteLarge,
    });

    dimmer
        .show_loading_default(&mut scene, host)
        .expect("configured alpha is in range");
    scene.layout();
    let spinner = dimmer.activity_surface(host).unwrap();
    println!("== Loading ==");
    println!("  spinner {spinner:?} frame {:?}", scene.frame(spinner));
    println!("  transitions {:?}", scene.transitions());
    assert!(dimmer.is_loading(host));

    let ticket = dimmer.hide_loading(&mut scene, host).unwrap();
    println!("== Hiding ({ticket:?}) ==");
    println!("  still loading while fading: {}", dimmer.is_loading(host));

    for finished in scene.drain_completed() {
        if let Err(err) = dimmer.complete_teardown(&mut scene, finished) {
            log::warn!("{err}");
        }
    }
    println!("== Done ==");
    println!(
        "  dimming {} loading {} children {:?}",
        dimmer.is_dimming(&scene, host),
        dimmer.is_loading(host),
        scene.children(host)
    );
    assert!(!dimmer.is_loading(host));
    assert!(scene.children(host).is_empty());
}
