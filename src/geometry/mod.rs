// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - host mesh handles and face extraction

mod face_record;
mod mesh;
mod primitives;

pub use face_record::{extract, extract_object, FaceRecord, FaceRef};
pub use mesh::{polygon_geometry, Face, MeshObject, PolygonGeometry};
pub use primitives::Primitive;
