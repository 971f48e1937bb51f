use serde::{Deserialize, Serialize};

use crate::codec::Entity;

/// Integer counter, stored the way the platform wraps an `Int64Value`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counter(pub i64);

impl Entity for Counter {
    const TYPE_URL: &'static str = "type.googleapis.com/google.protobuf.Int64Value";
    const LABEL: &'static str = "counter";
}

/// Point in 3-D space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Entity for Point {
    const TYPE_URL: &'static str = "type.googleapis.com/points.Point";
    const LABEL: &'static str = "point";
}
