// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI support for seamscan

pub mod reporter;

pub use reporter::Reporter;
