// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Builtin function definitions
//!
//! Split by function type; both lists are loaded by the registry.

pub mod aggregate;
pub mod scalar;
