// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional reveal on a single host.
//!
//! Dims a host from the top, grows the overlay twice, and prints the resolved overlay frame
//! after each step.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_dimmer_demos --example dimmer_basics`

use kurbo::Rect;
use understory_dimmer::scene::Scene;
use understory_dimmer::{DimOptions, Dimmer, Direction};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let host = scene.insert(None, Rect::new(0.0, 0.0, 100.0, 50.0));
    let mut dimmer = Dimmer::new();

    println!("== Reveal from top ==");
    for ratio in [0.5, 0.8, 1.0] {
        let applied = dimmer
            .dim(
                &mut scene,
                host,
                DimOptions::new(Direction::FromTop).with_ratio(ratio),
            )
            .expect("ratio is in range");
        scene.layout();
        let overlay = dimmer.dimmer_surface(host).expect("overlay attached");
        println!(
            "  ratio {applied:.2} -> overlay {overlay:?} frame {:?}",
            scene.frame(overlay)
        );
    }

    let overlay = dimmer.dimmer_surface(host).unwrap();
    assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    assert_eq!(
        scene.install_count(),
        1,
        "constraints are installed once and retuned afterwards"
    );
}
