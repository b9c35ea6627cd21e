use wasm_bindgen::prelude::*;
use orrery_engine::*;

mod bodies;
mod camera_rig;
mod facts;
mod game;
mod orbit;
mod scenery;
mod ui;

pub use game::{SceneConfig, SolarSystem};

orrery_web::export_game!(SolarSystem, "solar-system", vectors);
