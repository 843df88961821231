//! Application-Layer des Werkzeugs: Use-Cases über Creator, Serialisierung und Pfadsuche.

pub mod use_cases;

pub use use_cases::file_io::{
    bake_lane_world, inspect_lane_world, load_lane_world, reserialize_lane_world, BakeOutcome,
    BakeRequest, InspectReport,
};
pub use use_cases::route::{plan_route, plan_route_in_world, RouteOutcome};
