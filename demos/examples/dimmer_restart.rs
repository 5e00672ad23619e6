// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dimming again while a fade-out is still running.
//!
//! The second `dim` cancels the pending teardown and starts over with a fresh overlay.
//! The late completion of the first fade-out is reported as stale.
//!
//! Run:
//! - `RUST_LOG=warn cargo run -p understory_dimmer_demos --example dimmer_restart`

use kurbo::Rect;
use understory_dimmer::scene::Scene;
use understory_dimmer::{DimOptions, Dimmer, DimmerError, Direction};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let host = scene.insert(None, Rect::new(0.0, 0.0, 200.0, 100.0));
    let mut dimmer = Dimmer::new();

    let options = DimOptions::new(Direction::FromLeft).with_ratio(0.5);
    dimmer.dim(&mut scene, host, options).unwrap();
    let first = dimmer.dimmer_surface(host).unwrap();
    let ticket = dimmer.undim(&mut scene, host).unwrap();
    println!("== Fading out {first:?} with {ticket:?} ==");

    dimmer.dim(&mut scene, host, options).unwrap();
    let second = dimmer.dimmer_surface(host).unwrap();
    println!("== Restarted with {second:?} ==");

    let late = scene.drain_completed();
    for t in late {
        match dimmer.complete_teardown(&mut scene, t) {
            Ok(()) => println!("  completed {t:?}"),
            Err(DimmerError::StaleTeardown(t)) => println!("  ignored stale {t:?}"),
            Err(err) => println!("  error: {err}"),
        }
    }

    scene.layout();
    println!("  overlay frame {:?}", scene.frame(second));
    assert_ne!(first, second);
    assert!(dimmer.is_dimming(&scene, host));
    assert_eq!(scene.frame(second), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
}
